//! Collaborative intelligence: personalized ranking, expert chat and
//! learner profiles.
//!
//! Every call is a single pass-through with a canned answer when the backing
//! client is not configured or the call fails.

use crate::config::AppConfig;
use edusense_core::{ContentRanker, RankRequest, RankableAction, ServiceProvider};
use edusense_provider::{ExpertChatClient, PersonalizerClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const NO_PERSONALIZER: &str = "No personalizer client available";
const RANKING_ERROR: &str = "Error in recommendation engine";
const CHAT_UNAVAILABLE: &str = "Chat service not available";
const CHAT_ERROR: &str = "Unable to connect to expert chat";

/// A recommendable piece of learning content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ContentItem {
    fn new(id: &str, title: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// The fixed content catalog
pub fn content_catalog() -> Vec<ContentItem> {
    vec![
        ContentItem::new("content1", "Introduction to AI", "video"),
        ContentItem::new("content2", "Python for Data Science", "course"),
        ContentItem::new("content3", "Machine Learning Basics", "article"),
    ]
}

fn topic_actions() -> Vec<RankableAction> {
    [("action1", "math"), ("action2", "science"), ("action3", "programming")]
        .into_iter()
        .map(|(id, topic)| RankableAction {
            id: id.to_string(),
            features: vec![json!({ "topic": topic })],
        })
        .collect()
}

/// A learner's learning profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningProfile {
    pub id: String,
    pub learning_style: String,
    pub interests: Vec<String>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommended_paths: Vec<String>,
}

/// Result of analyzing a spoken contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechAnalysis {
    pub transcript: String,
    pub sentiment: String,
    pub key_phrases: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub struct CollaborativeIntelligence {
    ranker: Arc<dyn ContentRanker>,
    chat: ExpertChatClient,
}

impl std::fmt::Debug for CollaborativeIntelligence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaborativeIntelligence")
            .field("ranker", &self.ranker.id())
            .field("chat", &self.chat)
            .finish()
    }
}

impl CollaborativeIntelligence {
    pub fn new(ranker: Arc<dyn ContentRanker>, chat: ExpertChatClient) -> Self {
        Self { ranker, chat }
    }

    /// Personalizer and chat clients from the configured credentials
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(PersonalizerClient::new(
                &config.personalizer,
                config.http.timeout(),
            )),
            ExpertChatClient::new(&config.communication),
        )
    }

    /// Rank the topic actions for `context` and return the chosen action id.
    pub async fn get_personalized_recommendations(&self, context: Value) -> Vec<String> {
        if !self.ranker.state().is_ready() {
            return vec![NO_PERSONALIZER.to_string()];
        }

        let request = RankRequest {
            context_features: vec![context],
            actions: topic_actions(),
            event_id: None,
        };

        match self.ranker.rank(request).await {
            Ok(response) => vec![response.reward_action_id],
            Err(e) => {
                tracing::warn!(error = %e, "Error getting recommendations");
                vec![RANKING_ERROR.to_string()]
            }
        }
    }

    /// The content catalog, with the item the ranker picks moved to the front.
    ///
    /// Without a usable ranker the catalog keeps its fixed order.
    pub async fn recommend_content(&self, user_id: &str, preferences: Value) -> Vec<ContentItem> {
        let mut items = content_catalog();
        if !self.ranker.state().is_ready() {
            return items;
        }

        let actions = items
            .iter()
            .map(|item| RankableAction {
                id: item.id.clone(),
                features: vec![json!({ "title": item.title, "type": item.kind })],
            })
            .collect();
        let request = RankRequest {
            context_features: vec![json!({ "user_id": user_id }), preferences],
            actions,
            event_id: None,
        };

        match self.ranker.rank(request).await {
            Ok(response) => {
                if let Some(pos) = items.iter().position(|i| i.id == response.reward_action_id) {
                    let chosen = items.remove(pos);
                    items.insert(0, chosen);
                }
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Error ranking content"),
        }
        items
    }

    pub fn chat_with_expert(&self, message: &str) -> String {
        if !self.chat.state().is_ready() {
            return CHAT_UNAVAILABLE.to_string();
        }
        self.chat.reply(message).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Error in chat service");
            CHAT_ERROR.to_string()
        })
    }

    /// Build a learning profile; only the `id` is taken from `user_data`.
    pub fn create_learning_profile(&self, user_data: &Map<String, Value>) -> LearningProfile {
        let id = match user_data.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        };

        LearningProfile {
            id,
            learning_style: "visual".to_string(),
            interests: strings(&["AI", "Machine Learning", "Python"]),
            strengths: strings(&["problem-solving", "critical thinking"]),
            areas_for_improvement: strings(&["time management"]),
            recommended_paths: strings(&["AI Fundamentals", "Python Advanced"]),
        }
    }

    // TODO: run speech-to-text on the file once a speech backend is configured.
    pub fn analyze_speech(&self, audio_file: &str) -> SpeechAnalysis {
        SpeechAnalysis {
            transcript: format!("Transcription from {audio_file}"),
            sentiment: "positive".to_string(),
            key_phrases: strings(&["learning", "collaboration", "progress"]),
        }
    }
}
