mod exponential;
mod gamma;
mod log_normal;
mod weibull;

use std::fmt;

use log::{debug, info, trace};
use rand::RngCore;
use rand_distr::Distribution;

use crate::error::{Error, Result};

/// One cleaned duration sample.
///
/// Construction filters the raw series down to finite, strictly positive
/// values; the fitting code can then assume positive support throughout.
#[derive(Clone, Debug)]
pub struct Sample {
    label: String,
    values: Vec<f64>,
}

impl Sample {
    pub fn from_values(label: impl Into<String>, raw: Vec<f64>) -> Result<Self> {
        let label = label.into();
        let kept: Vec<f64> = raw
            .into_iter()
            .filter(|value| value.is_finite() && *value > 0.0)
            .collect();
        if kept.is_empty() {
            return Err(Error::EmptySample(label));
        }
        Ok(Self {
            label,
            values: kept,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sufficient statistics shared by the family estimators, computed once.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SampleMoments {
    pub mean: f64,
    pub mean_ln: f64,
    pub var_ln: f64,
}

impl SampleMoments {
    pub(crate) fn of(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mean_ln = values.iter().map(|value| value.ln()).sum::<f64>() / n;
        let var_ln = values
            .iter()
            .map(|value| {
                let delta = value.ln() - mean_ln;
                delta * delta
            })
            .sum::<f64>()
            / n;
        Self {
            mean,
            mean_ln,
            var_ln,
        }
    }
}

/// Candidate families, tried in this order. The earlier family keeps a tie.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Family {
    Exponential,
    LogNormal,
    Gamma,
    Weibull,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Exponential,
        Family::LogNormal,
        Family::Gamma,
        Family::Weibull,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::Exponential => "exponential",
            Family::LogNormal => "log-normal",
            Family::Gamma => "gamma",
            Family::Weibull => "weibull",
        }
    }

    pub(crate) fn fit(
        self,
        moments: &SampleMoments,
        sorted: &[f64],
    ) -> Option<FittedDistribution> {
        match self {
            Family::Exponential => exponential::fit(moments, sorted),
            Family::LogNormal => log_normal::fit(moments, sorted),
            Family::Gamma => gamma::fit(moments, sorted),
            Family::Weibull => weibull::fit(moments, sorted),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maximum-likelihood parameters for one family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FamilyParams {
    Exponential { rate: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Gamma { shape: f64, scale: f64 },
    Weibull { shape: f64, scale: f64 },
}

impl FamilyParams {
    pub fn family(self) -> Family {
        match self {
            FamilyParams::Exponential { .. } => Family::Exponential,
            FamilyParams::LogNormal { .. } => Family::LogNormal,
            FamilyParams::Gamma { .. } => Family::Gamma,
            FamilyParams::Weibull { .. } => Family::Weibull,
        }
    }
}

impl fmt::Display for FamilyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FamilyParams::Exponential { rate } => write!(f, "rate {rate:.4}"),
            FamilyParams::LogNormal { mu, sigma } => write!(f, "mu {mu:.4}, sigma {sigma:.4}"),
            FamilyParams::Gamma { shape, scale } => write!(f, "shape {shape:.4}, scale {scale:.4}"),
            FamilyParams::Weibull { shape, scale } => {
                write!(f, "shape {shape:.4}, scale {scale:.4}")
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Sampler {
    Exponential(rand_distr::Exp<f64>),
    LogNormal(rand_distr::LogNormal<f64>),
    Gamma(rand_distr::Gamma<f64>),
    Weibull(rand_distr::Weibull<f64>),
}

/// A calibrated family: parameters, goodness of fit, and a live sampler.
#[derive(Clone, Debug)]
pub struct FittedDistribution {
    pub params: FamilyParams,
    pub ks: f64,
    sampler: Sampler,
}

impl FittedDistribution {
    pub fn family(&self) -> Family {
        self.params.family()
    }
}

impl fmt::Display for FittedDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), ks {:.4}", self.family(), self.params, self.ks)
    }
}

/// Draws one duration in minutes.
pub trait DurationSampler: Send + Sync {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;
}

impl DurationSampler for FittedDistribution {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let raw = match &self.sampler {
            Sampler::Exponential(dist) => dist.sample(rng),
            Sampler::LogNormal(dist) => dist.sample(rng),
            Sampler::Gamma(dist) => dist.sample(rng),
            Sampler::Weibull(dist) => dist.sample(rng),
        };
        if raw.is_finite() && raw >= 0.0 {
            raw
        } else {
            trace!("clamped anomalous {} draw {raw} to 0", self.family());
            0.0
        }
    }
}

/// Degenerate sampler for tests and benches.
#[derive(Clone, Copy, Debug)]
pub struct FixedSampler(pub f64);

impl DurationSampler for FixedSampler {
    fn sample(&self, _rng: &mut dyn RngCore) -> f64 {
        self.0
    }
}

/// The three calibrated streams every scenario draws from.
pub struct Samplers {
    pub arrivals: Box<dyn DurationSampler>,
    pub triage: Box<dyn DurationSampler>,
    pub service: Box<dyn DurationSampler>,
}

impl Samplers {
    pub fn fitted(
        arrivals: FittedDistribution,
        triage: FittedDistribution,
        service: FittedDistribution,
    ) -> Self {
        Self {
            arrivals: Box::new(arrivals),
            triage: Box::new(triage),
            service: Box::new(service),
        }
    }

    pub fn fixed(gap: f64, triage: f64, service: f64) -> Self {
        Self {
            arrivals: Box::new(FixedSampler(gap)),
            triage: Box::new(FixedSampler(triage)),
            service: Box::new(FixedSampler(service)),
        }
    }
}

/// Fits every candidate family to the sample and keeps the one with the
/// smallest Kolmogorov-Smirnov distance. Families that are degenerate for
/// this sample or fail to converge are skipped; all four failing is an error.
pub fn fit(sample: &Sample) -> Result<FittedDistribution> {
    let moments = SampleMoments::of(sample.values());
    let mut sorted = sample.values().to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    debug!(
        "fitting sample '{}': {} values, mean {:.4}",
        sample.label(),
        sample.len(),
        moments.mean
    );

    let mut best: Option<FittedDistribution> = None;
    for family in Family::ALL {
        match family.fit(&moments, &sorted) {
            Some(candidate) => {
                debug!("sample '{}': {candidate}", sample.label());
                best = match best {
                    Some(current) if candidate.ks < current.ks => Some(candidate),
                    Some(current) => Some(current),
                    None => Some(candidate),
                };
            }
            None => debug!("sample '{}': {family} skipped", sample.label()),
        }
    }

    match best {
        Some(winner) => {
            info!("sample '{}': best fit {winner}", sample.label());
            Ok(winner)
        }
        None => Err(Error::Calibration(sample.label().to_string())),
    }
}

/// Two-sided Kolmogorov-Smirnov distance between the fitted CDF and the
/// empirical CDF of an ascending-sorted sample.
pub(crate) fn ks_statistic(sorted: &[f64], cdf: impl Fn(f64) -> f64) -> f64 {
    let n = sorted.len() as f64;
    let mut distance = 0.0_f64;
    for (i, &x) in sorted.iter().enumerate() {
        let fitted = cdf(x);
        let below = fitted - i as f64 / n;
        let above = (i + 1) as f64 / n - fitted;
        distance = distance.max(below).max(above);
    }
    distance
}
