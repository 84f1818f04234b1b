use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Triage complexity decided for a call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Complex => write!(f, "complex"),
        }
    }
}

/// Verdict for one call narrative.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classification {
    pub call_type: String,
    pub call_type_group: String,
    pub original_priority: u8,
    pub complexity: Complexity,
}

/// Classifies call narratives into dispatch categories.
///
/// The production system fronts this with a language model. The simulator
/// relies only on the contract: the verdict is a function of the text alone,
/// carries a priority on the 1..=3 scale (3 most urgent), and classification
/// is instantaneous in simulated time.
pub trait ClassifierOracle: Send + Sync {
    fn classify(&self, call: usize, text: &str) -> Result<Classification>;
}

/// Deterministic keyword classifier over the dispatch dataset's call types.
pub struct KeywordOracle;

const FIRE: &[&str] = &["fire", "smoke", "flames", "explosion", "burning"];
const LIFE_THREAT: &[&str] = &[
    "not breathing",
    "unconscious",
    "chest pain",
    "stroke",
    "overdose",
];
const COLLISION: &[&str] = &["crash", "collision", "trapped"];
const INJURY: &[&str] = &["fell", "fall", "bleeding", "injur", "broken"];
const HAZARD: &[&str] = &["gas", "wires", "leak", "fumes"];
const ALARM: &[&str] = &["alarm", "detector"];
const SERVICE: &[&str] = &["lift assist", "locked out", "water", "cat", "noise"];

impl ClassifierOracle for KeywordOracle {
    fn classify(&self, call: usize, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(Error::Classification {
                call,
                reason: "empty call text".to_string(),
            });
        }
        let text = text.to_lowercase();
        let (call_type, call_type_group, original_priority, complexity) =
            if contains_any(&text, FIRE) {
                ("Structure Fire", "Fire", 3, Complexity::Complex)
            } else if contains_any(&text, LIFE_THREAT) {
                (
                    "Medical Incident",
                    "Potentially Life-Threatening",
                    3,
                    Complexity::Complex,
                )
            } else if contains_any(&text, COLLISION) {
                (
                    "Traffic Collision",
                    "Potentially Life-Threatening",
                    3,
                    Complexity::Complex,
                )
            } else if contains_any(&text, INJURY) {
                ("Medical Incident", "Non Life-threatening", 2, Complexity::Complex)
            } else if contains_any(&text, HAZARD) {
                ("Odor / Hazard", "Fire", 2, Complexity::Simple)
            } else if contains_any(&text, ALARM) {
                ("Alarms", "Alarm", 1, Complexity::Simple)
            } else if contains_any(&text, SERVICE) {
                (
                    "Citizen Assist / Service Call",
                    "Non Life-threatening",
                    1,
                    Complexity::Simple,
                )
            } else {
                ("Medical Incident", "Non Life-threatening", 2, Complexity::Simple)
            };

        Ok(Classification {
            call_type: call_type.to_string(),
            call_type_group: call_type_group.to_string(),
            original_priority,
            complexity,
        })
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

const DEMO_CALLS: [&str; 10] = [
    "caller reports heavy smoke and flames from a second floor window",
    "elderly resident fell in the bathroom and is bleeding heavily",
    "automatic alarm sounding at the warehouse on fifth street",
    "two car collision at the intersection with one driver trapped",
    "neighbor smells gas near the basement apartment door",
    "man on the sidewalk is unconscious and barely responsive",
    "resident locked out of the apartment with a pot on the stove",
    "child with a broken arm after a fall from the swing",
    "water pouring through the ceiling of the unit below",
    "downed power wires sparking across the driveway",
];

/// Fixed rotation of call narratives for runs without a corpus file.
pub fn demo_call_texts(count: usize) -> Vec<String> {
    DEMO_CALLS
        .iter()
        .cycle()
        .take(count)
        .map(|text| text.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_outranks_other_keywords() {
        let verdict = KeywordOracle
            .classify(0, "smoke alarm went off and there is smoke in the hall")
            .expect("classification should succeed");
        assert_eq!(verdict.call_type, "Structure Fire");
        assert_eq!(verdict.original_priority, 3);
        assert_eq!(verdict.complexity, Complexity::Complex);
    }

    #[test]
    fn alarm_without_fire_is_simple() {
        let verdict = KeywordOracle
            .classify(0, "automatic alarm sounding, no other signs")
            .expect("classification should succeed");
        assert_eq!(verdict.call_type, "Alarms");
        assert_eq!(verdict.original_priority, 1);
        assert_eq!(verdict.complexity, Complexity::Simple);
    }

    #[test]
    fn unknown_text_falls_back_to_routine_medical() {
        let verdict = KeywordOracle
            .classify(3, "person feeling unwell, asked for assistance")
            .expect("classification should succeed");
        assert_eq!(verdict.call_type, "Medical Incident");
        assert_eq!(verdict.original_priority, 2);
        assert_eq!(verdict.complexity, Complexity::Simple);
    }

    #[test]
    fn empty_text_is_a_classification_error() {
        let result = KeywordOracle.classify(7, "   ");
        assert!(matches!(
            result,
            Err(Error::Classification { call: 7, .. })
        ));
    }

    #[test]
    fn same_text_same_verdict() {
        let text = "two car collision with one driver trapped";
        let first = KeywordOracle.classify(0, text).expect("classify");
        let second = KeywordOracle.classify(99, text).expect("classify");
        assert_eq!(first, second);
    }

    #[test]
    fn demo_deck_cycles_and_classifies_cleanly() {
        let deck = demo_call_texts(25);
        assert_eq!(deck.len(), 25);
        assert_eq!(deck[0], deck[10]);
        assert_eq!(deck[4], deck[14]);

        for (call, text) in deck.iter().enumerate() {
            let verdict = KeywordOracle
                .classify(call, text)
                .expect("demo texts should classify");
            assert!((1..=3).contains(&verdict.original_priority));
        }
    }
}
