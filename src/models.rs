use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default = "default_units")]
    pub units: Vec<u32>,
    #[serde(default = "default_calls")]
    pub calls: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_simple_triage_factor")]
    pub simple_triage_factor: f64,
    #[serde(default)]
    pub max_events: Option<u64>,
    #[serde(default)]
    pub samples: Option<SampleFiles>,
    #[serde(default)]
    pub calls_file: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            calls: default_calls(),
            seed: 0,
            simple_triage_factor: default_simple_triage_factor(),
            max_events: None,
            samples: None,
            calls_file: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SampleFiles {
    pub arrivals: PathBuf,
    pub triage: PathBuf,
    pub service: PathBuf,
}

fn default_units() -> Vec<u32> {
    vec![3, 5, 8, 10]
}

fn default_calls() -> usize {
    5000
}

fn default_simple_triage_factor() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_historical_study() {
        let config = SimConfig::default();
        assert_eq!(config.units, vec![3, 5, 8, 10]);
        assert_eq!(config.calls, 5000);
        assert_eq!(config.seed, 0);
        assert_eq!(config.simple_triage_factor, 0.5);
        assert!(config.max_events.is_none());
        assert!(config.samples.is_none());
        assert!(config.calls_file.is_none());
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config: SimConfig = toml::from_str("units = [2, 4]\nseed = 9\n").expect("parse");
        assert_eq!(config.units, vec![2, 4]);
        assert_eq!(config.seed, 9);
        assert_eq!(config.calls, 5000);
        assert_eq!(config.simple_triage_factor, 0.5);
    }

    #[test]
    fn toml_parses_sample_paths() {
        let text = concat!(
            "calls = 100\n",
            "[samples]\n",
            "arrivals = \"data/gaps.csv\"\n",
            "triage = \"data/operator.csv\"\n",
            "service = \"data/on_scene.csv\"\n",
        );
        let config: SimConfig = toml::from_str(text).expect("parse");
        let samples = config.samples.expect("samples should be present");
        assert_eq!(samples.arrivals, PathBuf::from("data/gaps.csv"));
        assert_eq!(samples.triage, PathBuf::from("data/operator.csv"));
        assert_eq!(samples.service, PathBuf::from("data/on_scene.csv"));
    }

    #[test]
    fn json_round_trips() {
        let config = SimConfig {
            units: vec![1, 2],
            calls: 10,
            seed: 3,
            simple_triage_factor: 0.25,
            max_events: Some(500),
            samples: None,
            calls_file: Some(PathBuf::from("calls.txt")),
        };
        let text = serde_json::to_string(&config).expect("serialize");
        let back: SimConfig = serde_json::from_str(&text).expect("parse");
        assert_eq!(back.units, config.units);
        assert_eq!(back.calls, config.calls);
        assert_eq!(back.max_events, Some(500));
        assert_eq!(back.calls_file, config.calls_file);
    }
}
