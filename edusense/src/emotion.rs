//! Emotion analysis from text, images and audio.
//!
//! Text goes to the generative model first and to the cloud sentiment
//! service second. Images go to face detection first and to the generative
//! model second. Both chains end in a fixed placeholder, so every method
//! returns a usable value.

use crate::config::AppConfig;
use crate::services::layered;
use edusense_core::normalize::{FieldSpec, ResponseSchema};
use edusense_core::{
    ConfidenceScores, DetectedFace, DocumentSentiment, EduError, FaceDetector, FaceEmotions,
    FallbackChain, GenerationRuntime, Normalized, SentimentAnalyzer, ServiceProvider,
};
use edusense_provider::{FaceClient, GeminiGenerator, TextAnalyticsClient};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Allowed deviation of a score distribution from 1.0 before a warning
const SCORE_SUM_TOLERANCE: f64 = 0.05;

const TEXT_PLACEHOLDER_NOTE: &str =
    "This is a placeholder response as neither Gemini nor Azure sentiment analysis is available.";

const IMAGE_PLACEHOLDER_NOTE: &str =
    "Using placeholder data. Neither Azure Face API nor Gemini were able to analyze the image.";

const AUDIO_PLACEHOLDER_NOTE: &str =
    "Voice emotion analysis is not available; returning sample data.";

const IMAGE_PROMPT: &str = r#"Generate a realistic facial emotion analysis. Return ONLY valid JSON with this structure:
{
  "emotions": {
    "happiness": 0.4,
    "sadness": 0.05,
    "neutral": 0.2,
    "anger": 0.05,
    "fear": 0.05,
    "surprise": 0.2,
    "contempt": 0.03,
    "disgust": 0.02
  },
  "sentiment": {
    "positive": 0.6,
    "neutral": 0.2,
    "negative": 0.2
  },
  "dominant_emotion": "happiness",
  "dominant_sentiment": "positive",
  "face_count": 1
}

IMPORTANT: Values should be between 0 and 1, all emotion scores should sum to 1.0,
and all sentiment scores should sum to 1.0."#;

fn text_prompt(text: &str) -> String {
    format!(
        r#"Analyze the emotional sentiment in the following text and provide scores for positive, neutral, and negative emotions.
The scores should sum to 1.0 (or close to it due to rounding).
Also determine an overall sentiment classification (positive, neutral, negative).

Format your response as JSON with this structure:
{{
  "positive": 0.XX,
  "neutral": 0.XX,
  "negative": 0.XX,
  "overall": "positive/neutral/negative"
}}

Text to analyze: "{text}""#
    )
}

/// Overall sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    #[serde(alias = "Positive", alias = "POSITIVE")]
    Positive,
    #[serde(alias = "Neutral", alias = "NEUTRAL")]
    Neutral,
    #[serde(alias = "Negative", alias = "NEGATIVE")]
    Negative,
    #[serde(alias = "Mixed", alias = "MIXED")]
    Mixed,
}

impl SentimentLabel {
    /// Parse a label, ignoring case
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    /// Label of the strongest category
    pub fn dominant(scores: &ConfidenceScores) -> Self {
        match scores.dominant() {
            "positive" => Self::Positive,
            "negative" => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

/// Sentiment scores for a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSentiment {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub overall: SentimentLabel,
}

impl TextSentiment {
    fn scores(&self) -> ConfidenceScores {
        ConfidenceScores::new(self.positive, self.neutral, self.negative)
    }

    /// Near-uniform scores used when no provider answers
    pub fn placeholder() -> Self {
        Self {
            positive: 0.33,
            neutral: 0.34,
            negative: 0.33,
            overall: SentimentLabel::Neutral,
        }
    }
}

impl From<DocumentSentiment> for TextSentiment {
    fn from(doc: DocumentSentiment) -> Self {
        let scores = doc.confidence_scores;
        Self {
            positive: scores.positive,
            neutral: scores.neutral,
            negative: scores.negative,
            overall: SentimentLabel::parse(&doc.sentiment)
                .unwrap_or_else(|| SentimentLabel::dominant(&scores)),
        }
    }
}

/// Result of [`EmotionalIntelligence::analyze_text`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextEmotionAnalysis {
    pub emotions: TextSentiment,
    pub text: String,
}

/// Result of [`EmotionalIntelligence::analyze_image`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEmotionAnalysis {
    pub emotions: FaceEmotions,
    pub sentiment: ConfidenceScores,
    pub dominant_emotion: String,
    pub dominant_sentiment: String,
    #[serde(default)]
    pub face_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImageEmotionAnalysis {
    /// Summarize detected faces; only the first face is scored.
    pub fn from_faces(faces: &[DetectedFace]) -> Self {
        let Some(face) = faces.first() else {
            return Self {
                emotions: FaceEmotions::all_neutral(),
                sentiment: ConfidenceScores::new(0.0, 1.0, 0.0),
                dominant_emotion: "neutral".to_string(),
                dominant_sentiment: "neutral".to_string(),
                face_count: 0,
                message: Some("No faces detected in the image".to_string()),
            };
        };

        let sentiment = face.emotion.to_sentiment();
        Self {
            emotions: face.emotion,
            sentiment,
            dominant_emotion: face.emotion.dominant().to_string(),
            dominant_sentiment: sentiment.dominant().to_string(),
            face_count: faces.len() as u32,
            message: None,
        }
    }

    fn placeholder() -> Self {
        Self {
            emotions: FaceEmotions {
                happiness: 0.15,
                sadness: 0.1,
                neutral: 0.3,
                anger: 0.1,
                fear: 0.05,
                surprise: 0.15,
                contempt: 0.05,
                disgust: 0.1,
            },
            sentiment: ConfidenceScores::new(0.3, 0.3, 0.4),
            dominant_emotion: "neutral".to_string(),
            dominant_sentiment: "negative".to_string(),
            face_count: 1,
            message: None,
        }
    }
}

/// Emotion scores inferred from a voice recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEmotions {
    pub happiness: f64,
    pub sadness: f64,
    pub anger: f64,
    pub neutral: f64,
}

/// Result of [`EmotionalIntelligence::analyze_audio`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEmotionAnalysis {
    pub emotions: AudioEmotions,
    pub audio: String,
    pub transcript: String,
}

/// Input accepted by [`EmotionalIntelligence::analyze_emotions`]
#[derive(Debug, Clone)]
pub enum EmotionInput {
    Text(String),
    Image(Vec<u8>),
    ImagePath(PathBuf),
    Audio(String),
}

/// Analysis for any [`EmotionInput`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input_type", content = "analysis", rename_all = "lowercase")]
pub enum EmotionAnalysis {
    Text(Normalized<TextEmotionAnalysis>),
    Image(Normalized<ImageEmotionAnalysis>),
    Audio(Normalized<AudioEmotionAnalysis>),
}

impl EmotionAnalysis {
    /// Provider that produced the analysis
    pub fn provider(&self) -> &str {
        match self {
            EmotionAnalysis::Text(n) => &n.provider,
            EmotionAnalysis::Image(n) => &n.provider,
            EmotionAnalysis::Audio(n) => &n.provider,
        }
    }
}

fn text_sentiment_schema() -> ResponseSchema {
    ResponseSchema::object(
        "text_sentiment",
        vec![
            FieldSpec::score("positive"),
            FieldSpec::score("neutral"),
            FieldSpec::score("negative"),
            FieldSpec::required("overall"),
        ],
    )
}

fn sentiment_fields() -> Vec<FieldSpec> {
    ["positive", "neutral", "negative"]
        .into_iter()
        .map(FieldSpec::score)
        .collect()
}

fn image_emotion_schema() -> ResponseSchema {
    ResponseSchema::object(
        "image_emotion",
        vec![
            FieldSpec::required("emotions").nested(
                FaceEmotions::CATEGORIES
                    .into_iter()
                    .map(FieldSpec::score)
                    .collect(),
            ),
            FieldSpec::required("sentiment").nested(sentiment_fields()),
            FieldSpec::required("dominant_emotion"),
            FieldSpec::required("dominant_sentiment"),
            FieldSpec::with_default("face_count", serde_json::Value::from(1)),
        ],
    )
}

fn warn_if_unnormalized(operation: &str, label: &str, total: f64) {
    if (total - 1.0).abs() > SCORE_SUM_TOLERANCE {
        tracing::warn!(operation, scores = label, total, "scores do not sum to 1.0");
    }
}

fn ensure_image(bytes: &[u8]) -> Result<(), EduError> {
    if infer::is_image(bytes) {
        return Ok(());
    }
    let detected = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("unknown");
    Err(EduError::invalid_request(format!(
        "Invalid image data ({} bytes, detected type {detected})",
        bytes.len()
    )))
}

/// Emotion analysis service
pub struct EmotionalIntelligence {
    generator: GenerationRuntime,
    sentiment: Arc<dyn SentimentAnalyzer>,
    faces: Arc<dyn FaceDetector>,
}

impl std::fmt::Debug for EmotionalIntelligence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionalIntelligence")
            .field("generator", &self.generator.id())
            .field("sentiment", &self.sentiment.state())
            .field("faces", &self.faces.state())
            .finish()
    }
}

impl EmotionalIntelligence {
    pub fn new(
        generator: GenerationRuntime,
        sentiment: Arc<dyn SentimentAnalyzer>,
        faces: Arc<dyn FaceDetector>,
    ) -> Self {
        Self {
            generator,
            sentiment,
            faces,
        }
    }

    /// Connect Gemini and the Azure clients described by `config`
    pub async fn from_config(config: &AppConfig) -> Self {
        let gemini = GeminiGenerator::connect(config.gemini.clone()).await;
        Self::new(
            layered(gemini, config),
            Arc::new(TextAnalyticsClient::new(
                &config.text_analytics,
                config.http.timeout(),
            )),
            Arc::new(FaceClient::new(&config.face, config.http.timeout())),
        )
    }

    /// Sentiment of a piece of text
    pub async fn analyze_text(&self, text: &str) -> Normalized<TextEmotionAnalysis> {
        let schema = text_sentiment_schema();
        let generator = &self.generator;
        let sentiment = &self.sentiment;

        FallbackChain::new("analyze_text")
            .step(generator.id(), generator.state(), async move {
                let result: TextSentiment = generator
                    .generate_structured(text_prompt(text), &schema)
                    .await?;
                warn_if_unnormalized("analyze_text", "sentiment", result.scores().total());
                Ok(result)
            })
            .step(sentiment.id(), sentiment.state(), async move {
                let doc = sentiment.analyze_sentiment(text).await?;
                Ok(TextSentiment::from(doc))
            })
            .resolve(TEXT_PLACEHOLDER_NOTE, TextSentiment::placeholder)
            .await
            .map(|emotions| TextEmotionAnalysis {
                emotions,
                text: text.to_string(),
            })
    }

    /// Facial emotions in an image
    pub async fn analyze_image(&self, image: &[u8]) -> Normalized<ImageEmotionAnalysis> {
        let schema = image_emotion_schema();
        let generator = &self.generator;
        let faces = &self.faces;

        tracing::debug!(bytes = image.len(), "analyzing image");

        FallbackChain::new("analyze_image")
            .step(faces.id(), faces.state(), async move {
                let detected = faces.detect_faces(image).await?;
                Ok(ImageEmotionAnalysis::from_faces(&detected))
            })
            .step(generator.id(), generator.state(), async move {
                ensure_image(image)?;
                let result: ImageEmotionAnalysis =
                    generator.generate_structured(IMAGE_PROMPT, &schema).await?;
                let emotion_total: f64 = result.emotions.scores().iter().map(|(_, s)| s).sum();
                warn_if_unnormalized("analyze_image", "emotions", emotion_total);
                warn_if_unnormalized("analyze_image", "sentiment", result.sentiment.total());
                Ok(result)
            })
            .resolve(IMAGE_PLACEHOLDER_NOTE, ImageEmotionAnalysis::placeholder)
            .await
    }

    /// Voice emotion analysis. No backend exists yet, so this always
    /// returns sample data.
    pub async fn analyze_audio(&self, audio_file: &str) -> Normalized<AudioEmotionAnalysis> {
        FallbackChain::new("analyze_audio")
            .resolve(AUDIO_PLACEHOLDER_NOTE, || AudioEmotionAnalysis {
                emotions: AudioEmotions {
                    happiness: 0.7,
                    sadness: 0.1,
                    anger: 0.05,
                    neutral: 0.15,
                },
                audio: audio_file.to_string(),
                transcript: "Sample transcript from audio".to_string(),
            })
            .await
    }

    /// Dispatch on the input type
    pub async fn analyze_emotions(&self, input: EmotionInput) -> EmotionAnalysis {
        match input {
            EmotionInput::Text(text) => EmotionAnalysis::Text(self.analyze_text(&text).await),
            EmotionInput::Image(bytes) => EmotionAnalysis::Image(self.analyze_image(&bytes).await),
            EmotionInput::ImagePath(path) => {
                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Could not read image file");
                        Vec::new()
                    }
                };
                EmotionAnalysis::Image(self.analyze_image(&bytes).await)
            }
            EmotionInput::Audio(file) => EmotionAnalysis::Audio(self.analyze_audio(&file).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use edusense_core::{ProviderState, PLACEHOLDER_PROVIDER};
    use std::sync::atomic::Ordering;

    fn service(
        generator: ScriptedGenerator,
        sentiment: FixedSentiment,
        faces: FixedFaces,
    ) -> EmotionalIntelligence {
        EmotionalIntelligence::new(generator.runtime(), Arc::new(sentiment), Arc::new(faces))
    }

    #[tokio::test]
    async fn test_text_from_generator_with_surrounding_prose() {
        let generator = ScriptedGenerator::replying(
            "gemini",
            r#"Some preamble {"positive":0.9,"neutral":0.08,"negative":0.02,"overall":"positive"} trailing text"#,
        );
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::disabled());

        let result = ei.analyze_text("I love this!").await;

        assert_eq!(result.provider, "gemini");
        assert!(result.note.is_none());
        assert_eq!(
            result.value.emotions,
            TextSentiment {
                positive: 0.9,
                neutral: 0.08,
                negative: 0.02,
                overall: SentimentLabel::Positive,
            }
        );
        assert_eq!(result.value.text, "I love this!");
    }

    #[tokio::test]
    async fn test_text_without_json_and_no_cloud_is_placeholder() {
        let generator = ScriptedGenerator::replying("gemini", "I cannot help with that.");
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::disabled());

        let result = ei.analyze_text("meh").await;

        assert_eq!(result.provider, PLACEHOLDER_PROVIDER);
        assert_eq!(result.value.emotions, TextSentiment::placeholder());
        assert_eq!(result.note.as_deref(), Some(TEXT_PLACEHOLDER_NOTE));
    }

    #[tokio::test]
    async fn test_text_falls_back_to_cloud_sentiment() {
        let generator = ScriptedGenerator::failing("gemini", "quota exceeded");
        let cloud = FixedSentiment::answering("negative", ConfidenceScores::new(0.1, 0.2, 0.7));
        let ei = service(generator, cloud, FixedFaces::disabled());

        let result = ei.analyze_text("This is awful").await;

        assert_eq!(result.provider, "azure_text_analytics");
        assert_eq!(result.value.emotions.overall, SentimentLabel::Negative);
        assert_eq!(result.value.emotions.negative, 0.7);
    }

    #[tokio::test]
    async fn test_text_skips_generator_that_is_not_ready() {
        let generator = ScriptedGenerator::replying("gemini", "{}")
            .with_state(ProviderState::Uninitialized);
        let calls = generator.calls();
        let cloud = FixedSentiment::answering("mixed", ConfidenceScores::new(0.5, 0.0, 0.5));
        let ei = service(generator, cloud, FixedFaces::disabled());

        let result = ei.analyze_text("ups and downs").await;

        assert_eq!(result.provider, "azure_text_analytics");
        assert_eq!(result.value.emotions.overall, SentimentLabel::Mixed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_text_missing_overall_advances_chain() {
        let generator = ScriptedGenerator::replying(
            "gemini",
            r#"{"positive": 0.5, "neutral": 0.5, "negative": 0.0}"#,
        );
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::disabled());

        let result = ei.analyze_text("hmm").await;

        assert!(result.is_placeholder());
    }

    #[tokio::test]
    async fn test_text_missing_scores_are_zero_filled() {
        let generator =
            ScriptedGenerator::replying("gemini", r#"{"positive": 1.0, "overall": "Positive"}"#);
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::disabled());

        let result = ei.analyze_text("great").await;

        assert_eq!(result.provider, "gemini");
        assert_eq!(result.value.emotions.neutral, 0.0);
        assert_eq!(result.value.emotions.negative, 0.0);
    }

    #[tokio::test]
    async fn test_text_analysis_is_deterministic() {
        let reply = r#"{"positive":0.2,"neutral":0.7,"negative":0.1,"overall":"neutral"}"#;
        let ei = service(
            ScriptedGenerator::replying("gemini", reply),
            FixedSentiment::disabled(),
            FixedFaces::disabled(),
        );

        let first = ei.analyze_text("same input").await;
        let second = ei.analyze_text("same input").await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_image_without_faces_is_neutral_and_skips_generator() {
        let generator = ScriptedGenerator::replying("gemini", "{}");
        let calls = generator.calls();
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::answering(vec![]));

        let result = ei.analyze_image(PNG_BYTES).await;

        assert_eq!(result.provider, "azure_face");
        assert_eq!(result.value.emotions, FaceEmotions::all_neutral());
        assert_eq!(result.value.sentiment, ConfidenceScores::new(0.0, 1.0, 0.0));
        assert_eq!(result.value.dominant_emotion, "neutral");
        assert_eq!(result.value.dominant_sentiment, "neutral");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_uses_first_face() {
        let happy = DetectedFace {
            face_id: Some("f1".into()),
            emotion: FaceEmotions {
                happiness: 0.7,
                surprise: 0.1,
                neutral: 0.1,
                sadness: 0.1,
                ..FaceEmotions::default()
            },
        };
        let sad = DetectedFace {
            face_id: Some("f2".into()),
            emotion: FaceEmotions {
                sadness: 1.0,
                ..FaceEmotions::default()
            },
        };
        let ei = service(
            ScriptedGenerator::replying("gemini", "{}"),
            FixedSentiment::disabled(),
            FixedFaces::answering(vec![happy, sad]),
        );

        let result = ei.analyze_image(PNG_BYTES).await;

        assert_eq!(result.provider, "azure_face");
        assert_eq!(result.value.face_count, 2);
        assert_eq!(result.value.dominant_emotion, "happiness");
        assert_eq!(result.value.dominant_sentiment, "positive");
        assert!((result.value.sentiment.positive - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_image_falls_back_to_generator_and_fills_emotions() {
        let reply = r#"Here you go:
{
  "emotions": {"happiness": 0.6, "neutral": 0.4},
  // scores are illustrative
  "sentiment": {"positive": 0.6, "neutral": 0.4, "negative": 0.0},
  "dominant_emotion": "happiness",
  "dominant_sentiment": "positive"
}"#;
        let ei = service(
            ScriptedGenerator::replying("gemini", reply),
            FixedSentiment::disabled(),
            FixedFaces::failing(),
        );

        let result = ei.analyze_image(PNG_BYTES).await;

        assert_eq!(result.provider, "gemini");
        assert_eq!(result.value.emotions.happiness, 0.6);
        assert_eq!(result.value.emotions.contempt, 0.0);
        assert_eq!(result.value.face_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_image_bytes_skip_generator() {
        let generator = ScriptedGenerator::replying("gemini", "{}");
        let calls = generator.calls();
        let ei = service(generator, FixedSentiment::disabled(), FixedFaces::disabled());

        let result = ei.analyze_image(b"definitely not an image").await;

        assert!(result.is_placeholder());
        assert_eq!(result.value, ImageEmotionAnalysis::placeholder());
        assert_eq!(result.note.as_deref(), Some(IMAGE_PLACEHOLDER_NOTE));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_generator_missing_fields_is_placeholder() {
        let ei = service(
            ScriptedGenerator::replying("gemini", r#"{"emotions": {"happiness": 1.0}}"#),
            FixedSentiment::disabled(),
            FixedFaces::failing(),
        );

        let result = ei.analyze_image(PNG_BYTES).await;

        assert!(result.is_placeholder());
        assert_eq!(result.value.dominant_sentiment, "negative");
    }

    #[tokio::test]
    async fn test_audio_is_sample_data() {
        let ei = service(
            ScriptedGenerator::replying("gemini", ""),
            FixedSentiment::disabled(),
            FixedFaces::disabled(),
        );

        let result = ei.analyze_audio("lecture.wav").await;

        assert!(result.is_placeholder());
        assert_eq!(result.value.audio, "lecture.wav");
        assert_eq!(result.value.emotions.happiness, 0.7);
    }

    #[tokio::test]
    async fn test_dispatch_by_input_type() {
        let ei = service(
            ScriptedGenerator::replying("gemini", "no json"),
            FixedSentiment::disabled(),
            FixedFaces::answering(vec![]),
        );

        let text = ei.analyze_emotions(EmotionInput::Text("hi".into())).await;
        assert!(matches!(text, EmotionAnalysis::Text(_)));
        assert_eq!(text.provider(), PLACEHOLDER_PROVIDER);

        let image = ei.analyze_emotions(EmotionInput::Image(PNG_BYTES.to_vec())).await;
        assert_eq!(image.provider(), "azure_face");

        let missing = ei
            .analyze_emotions(EmotionInput::ImagePath("/nonexistent/face.png".into()))
            .await;
        assert!(matches!(missing, EmotionAnalysis::Image(_)));

        let audio = ei.analyze_emotions(EmotionInput::Audio("a.wav".into())).await;
        assert!(matches!(audio, EmotionAnalysis::Audio(_)));
    }
}
