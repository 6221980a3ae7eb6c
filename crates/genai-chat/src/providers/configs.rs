use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub const VERTEX_GLOBAL_HOST: &str = "https://aiplatform.googleapis.com";
pub const DEFAULT_LOCATION: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Sampling parameters sent with every request
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub seed: i64,
    pub max_output_tokens: i32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            seed: 0,
            max_output_tokens: 65535,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHateSpeech,
    HarmCategoryDangerousContent,
    HarmCategorySexuallyExplicit,
    HarmCategoryHarassment,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    #[default]
    Off,
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self {
            category,
            threshold,
        }
    }

    /// One setting per category, all with the same threshold
    pub fn all(threshold: HarmBlockThreshold) -> Vec<SafetySetting> {
        HarmCategory::iter()
            .map(|category| SafetySetting::new(category, threshold))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct VertexProviderConfig {
    pub host: String,
    pub project: String,
    pub location: String,
    pub model: String,
    pub access_token: Option<String>,
    pub generation: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
    /// Full resource name of the rag corpus used for retrieval
    pub rag_corpus: Option<String>,
}

impl VertexProviderConfig {
    pub fn new<S: Into<String>>(project: S, location: S, model: S) -> Self {
        let location = location.into();
        Self {
            host: default_host(&location),
            project: project.into(),
            location,
            model: model.into(),
            access_token: None,
            generation: GenerationConfig::default(),
            safety_settings: SafetySetting::all(HarmBlockThreshold::Off),
            rag_corpus: None,
        }
    }

    pub fn stream_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:streamGenerateContent?alt=sse",
            self.host.trim_end_matches('/'),
            self.project,
            self.location,
            self.model
        )
    }
}

/// Regional endpoints are prefixed with their location, the global one is not
pub fn default_host(location: &str) -> String {
    if location == DEFAULT_LOCATION {
        VERTEX_GLOBAL_HOST.to_string()
    } else {
        format!("https://{}-aiplatform.googleapis.com", location)
    }
}
