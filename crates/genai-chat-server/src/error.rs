use thiserror::Error;

pub const ENV_PREFIX: &str = "GENAI_CHAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted config key to the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.replace('.', "__").to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_env_var() {
        assert_eq!(to_env_var("provider.project"), "GENAI_CHAT_PROVIDER__PROJECT");
        assert_eq!(to_env_var("server.port"), "GENAI_CHAT_SERVER__PORT");
    }

    #[test]
    fn test_missing_env_var_message() {
        let err = ConfigError::MissingEnvVar {
            env_var: to_env_var("provider.project"),
        };
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: GENAI_CHAT_PROVIDER__PROJECT"
        );
    }
}
