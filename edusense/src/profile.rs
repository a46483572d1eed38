//! Cognitive-emotional learning profile combining emotion analysis with
//! collaborative data.

use edusense_core::EduError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveEmotionalProfile {
    pub emotional: Value,
    pub collaborative: Value,
}

/// Entry counts for each half of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub emotional_entries: usize,
    pub collaborative_entries: usize,
}

impl CognitiveEmotionalProfile {
    /// Number of top-level entries in each half
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            emotional_entries: entry_count(&self.emotional),
            collaborative_entries: entry_count(&self.collaborative),
        }
    }
}

fn entry_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Null => 0,
        _ => 1,
    }
}

/// Combine any two serializable analyses into one profile
pub fn create_cognitive_emotional_profile(
    emotional: impl Serialize,
    collaborative: impl Serialize,
) -> Result<CognitiveEmotionalProfile, EduError> {
    Ok(CognitiveEmotionalProfile {
        emotional: serde_json::to_value(emotional)?,
        collaborative: serde_json::to_value(collaborative)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::TextSentiment;
    use serde_json::json;

    #[test]
    fn test_profile_from_typed_parts() {
        let profile = create_cognitive_emotional_profile(
            TextSentiment::placeholder(),
            vec!["action1", "action3"],
        )
        .unwrap();

        assert_eq!(profile.emotional["overall"], "neutral");
        assert_eq!(
            profile.summary(),
            ProfileSummary {
                emotional_entries: 4,
                collaborative_entries: 2,
            }
        );
    }

    #[test]
    fn test_summary_of_scalars() {
        let profile = create_cognitive_emotional_profile(json!(null), json!("abc")).unwrap();
        assert_eq!(profile.summary().emotional_entries, 0);
        assert_eq!(profile.summary().collaborative_entries, 3);

        let serialized = serde_json::to_value(&profile).unwrap();
        assert_eq!(serialized, json!({"emotional": null, "collaborative": "abc"}));
    }
}
