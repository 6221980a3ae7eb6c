use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use genai_chat::{
    adapter::{ImageRendering, DEFAULT_UPLOAD_PREFIX},
    chat::{ChatConfig, DEFAULT_PREAMBLE},
    providers::configs::{
        default_host as default_vertex_host, GenerationConfig, HarmBlockThreshold, HarmCategory,
        SafetySetting, VertexProviderConfig, DEFAULT_LOCATION,
    },
    providers::vertex::VERTEX_MODEL,
};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AccessSettings {
    /// Shared secret expected in the `key` query parameter; empty disables the check
    #[serde(default)]
    pub secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_preamble")]
    pub preamble: String,
    #[serde(default = "default_upload_prefix")]
    pub upload_prefix: String,
    #[serde(default)]
    pub image_rendering: ImageRendering,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            upload_prefix: default_upload_prefix(),
            image_rendering: ImageRendering::default(),
        }
    }
}

impl ChatSettings {
    pub fn to_config(&self) -> ChatConfig {
        ChatConfig {
            preamble: self.preamble.clone(),
            upload_prefix: self.upload_prefix.clone(),
            image_rendering: self.image_rendering,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SafetySettings {
    #[serde(default)]
    pub hate_speech: HarmBlockThreshold,
    #[serde(default)]
    pub dangerous_content: HarmBlockThreshold,
    #[serde(default)]
    pub sexually_explicit: HarmBlockThreshold,
    #[serde(default)]
    pub harassment: HarmBlockThreshold,
}

impl SafetySettings {
    pub fn into_settings(self) -> Vec<SafetySetting> {
        vec![
            SafetySetting::new(HarmCategory::HarmCategoryHateSpeech, self.hate_speech),
            SafetySetting::new(
                HarmCategory::HarmCategoryDangerousContent,
                self.dangerous_content,
            ),
            SafetySetting::new(
                HarmCategory::HarmCategorySexuallyExplicit,
                self.sexually_explicit,
            ),
            SafetySetting::new(HarmCategory::HarmCategoryHarassment, self.harassment),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    pub project: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub seed: i64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: i32,
    #[serde(default)]
    pub rag_corpus: Option<String>,
    #[serde(default)]
    pub safety: SafetySettings,
}

impl ProviderSettings {
    // Convert to the genai-chat VertexProviderConfig
    pub fn into_config(self) -> VertexProviderConfig {
        let host = self
            .host
            .unwrap_or_else(|| default_vertex_host(&self.location));
        VertexProviderConfig {
            host,
            project: self.project,
            location: self.location,
            model: self.model,
            access_token: self.access_token,
            generation: GenerationConfig {
                temperature: self.temperature,
                top_p: self.top_p,
                seed: self.seed,
                max_output_tokens: self.max_output_tokens,
            },
            safety_settings: self.safety.into_settings(),
            rag_corpus: self.rag_corpus,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub access: AccessSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    pub provider: ProviderSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.location", default_location())?
            .set_default("provider.model", default_model())?
            // Layer on the environment variables, kept as raw strings so secrets and ids
            // are never reinterpreted as numbers; serde converts the typed fields
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        // Try to deserialize the configuration
        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if let Some(field) = missing_field(&error_str) {
                    // only the provider section has required keys
                    let env_var = to_env_var(&format!("provider.{}", field));
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

/// Field name out of a serde message like "missing field `project`"
fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_preamble() -> String {
    DEFAULT_PREAMBLE.to_string()
}

fn default_upload_prefix() -> String {
    DEFAULT_UPLOAD_PREFIX.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_model() -> String {
    VERTEX_MODEL.to_string()
}

fn default_temperature() -> f32 {
    GenerationConfig::default().temperature
}

fn default_top_p() -> f32 {
    GenerationConfig::default().top_p
}

fn default_max_output_tokens() -> i32 {
    GenerationConfig::default().max_output_tokens
}
