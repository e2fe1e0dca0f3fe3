use crate::core::extractor::VisionSettings;
use crate::core::generator::{GeneratorSettings, Sampling};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::{
    validate_megabytes, validate_non_empty_string, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_TEXT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_VISION_MODEL: &str = "meta-llama/Llama-3.2-11B-Vision-Instruct-Turbo";

/// Full service configuration. Every section is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generator: GeneratorConfig,
    pub vision: VisionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_mb: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub solve_temperature: f32,
    pub solve_max_tokens: u32,
    pub similar_temperature: f32,
    pub similar_max_tokens: u32,
    pub similar_count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let settings = GeneratorSettings::default();
        Self {
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_TEXT_MODEL.to_string(),
            timeout_seconds: 60,
            solve_temperature: settings.solve.temperature,
            solve_max_tokens: settings.solve.max_tokens,
            similar_temperature: settings.similar.temperature,
            similar_max_tokens: settings.similar.max_tokens,
            similar_count: crate::core::generator::DEFAULT_SIMILAR_COUNT,
        }
    }
}

impl GeneratorConfig {
    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            solve: Sampling {
                temperature: self.solve_temperature,
                max_tokens: self.solve_max_tokens,
            },
            similar: Sampling {
                temperature: self.similar_temperature,
                max_tokens: self.similar_max_tokens,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        let settings = VisionSettings::default();
        Self {
            base_url: DEFAULT_TOGETHER_BASE_URL.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            timeout_seconds: 60,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

impl VisionConfig {
    pub fn settings(&self) -> VisionSettings {
        VisionSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SolverError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SolverError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.port", self.server.port as usize, 1)?;
        validate_megabytes("server.max_upload_mb", self.server.max_upload_mb)?;

        validate_url("generator.base_url", &self.generator.base_url)?;
        validate_non_empty_string("generator.model", &self.generator.model)?;
        validate_positive_number(
            "generator.timeout_seconds",
            self.generator.timeout_seconds as usize,
            1,
        )?;
        validate_range(
            "generator.solve_temperature",
            self.generator.solve_temperature,
            0.0,
            2.0,
        )?;
        validate_range(
            "generator.similar_temperature",
            self.generator.similar_temperature,
            0.0,
            2.0,
        )?;
        validate_positive_number(
            "generator.solve_max_tokens",
            self.generator.solve_max_tokens as usize,
            1,
        )?;
        validate_positive_number(
            "generator.similar_max_tokens",
            self.generator.similar_max_tokens as usize,
            1,
        )?;
        validate_range("generator.similar_count", self.generator.similar_count, 1, 10)?;

        validate_url("vision.base_url", &self.vision.base_url)?;
        validate_non_empty_string("vision.model", &self.vision.model)?;
        validate_positive_number(
            "vision.timeout_seconds",
            self.vision.timeout_seconds as usize,
            1,
        )?;
        validate_range("vision.temperature", self.vision.temperature, 0.0, 2.0)?;
        validate_positive_number("vision.max_tokens", self.vision.max_tokens as usize, 1)?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// Keys for the two remote services, read once at startup. A missing key is
/// not fatal; the matching client reports itself as unconfigured.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub groq: Option<String>,
    pub together: Option<String>,
}

impl ApiKeys {
    pub const GROQ_ENV: &'static str = "GROQ_API_KEY";
    pub const TOGETHER_ENV: &'static str = "TOGETHER_API_KEY";

    pub fn from_env() -> Self {
        Self {
            groq: non_empty_env(Self::GROQ_ENV),
            together: non_empty_env(Self::TOGETHER_ENV),
        }
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("groq", &self.groq.as_ref().map(|_| "<redacted>"))
            .field("together", &self.together.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.generator.model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.generator.settings(), GeneratorSettings::default());
        assert_eq!(config.vision.settings(), VisionSettings::default());
        assert_eq!(config.server.max_upload_mb, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [generator]
            model = "llama-3.1-8b-instant"
            solve_temperature = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.generator.model, "llama-3.1-8b-instant");
        assert_eq!(config.generator.solve_temperature, 0.0);
        assert_eq!(config.generator.solve_max_tokens, 4000);
        assert_eq!(config.vision.model, DEFAULT_VISION_MODEL);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("MATH_SOLVER_TEST_VISION_URL", "http://127.0.0.1:9999/v1");
        let config = AppConfig::from_toml_str(
            r#"
            [vision]
            base_url = "${MATH_SOLVER_TEST_VISION_URL}"
            model = "${MATH_SOLVER_TEST_UNSET_VAR}"
            "#,
        )
        .unwrap();

        assert_eq!(config.vision.base_url, "http://127.0.0.1:9999/v1");
        assert_eq!(config.vision.model, "${MATH_SOLVER_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"\nmax_upload_mb = 4").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.max_upload_mb, 4);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, SolverError::IoError(_)));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, SolverError::ConfigError { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.generator.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.vision.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generator.similar_count = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.max_upload_mb = usize::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_keys_debug_is_redacted() {
        let keys = ApiKeys {
            groq: Some("gsk_secret".to_string()),
            together: None,
        };
        let printed = format!("{:?}", keys);
        assert!(!printed.contains("gsk_secret"));
        assert!(printed.contains("<redacted>"));
    }
}
