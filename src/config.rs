use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure for the skill hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    /// "stdio" for the terminal chat loop, "http" for the JSON API
    pub transport: String,
    pub http_bind: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// HTTP sessions idle longer than this are evicted
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_session_idle_secs() -> u64 {
    1800
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    /// OpenAI-compatible base URL; `/chat/completions` is appended
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_base: f64,
    pub jitter_factor: f64,
    pub max_elapsed_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Run specialist calls of one dispatch concurrently
    #[serde(default)]
    pub concurrent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub target_language: String,
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a config; validation problems are logged
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::warn!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("SKILL_HUB_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match Self::from_yaml(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Apply overrides looked up by variable name (the process environment in production)
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = var("GEMINI_API_KEY") {
            self.llm.api_key = api_key;
        }
        if let Some(base_url) = var("SKILL_HUB_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(model) = var("SKILL_HUB_MODEL") {
            self.llm.model = model;
        }

        if let Some(transport) = var("SKILL_HUB_TRANSPORT") {
            self.server.transport = transport;
        }
        if let Some(bind) = var("SKILL_HUB_HTTP_BIND") {
            self.server.http_bind = bind;
        }
        if let Some(token) = var("SKILL_HUB_BEARER_TOKEN") {
            self.server.bearer_token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(idle) = var("SKILL_HUB_SESSION_IDLE_SECS") {
            if let Ok(secs) = idle.parse() {
                self.server.session_idle_secs = secs;
            }
        }

        if let Some(concurrent) = var("SKILL_HUB_CONCURRENT_DISPATCH") {
            if let Some(flag) = parse_flag(&concurrent) {
                self.dispatch.concurrent = flag;
            }
        }
        if let Some(translate) = var("SKILL_HUB_TRANSLATE") {
            if let Some(flag) = parse_flag(&translate) {
                self.translator.enabled = flag;
            }
        }

        if let Some(attempts) = var("SKILL_HUB_RETRY_MAX_ATTEMPTS") {
            if let Ok(max) = attempts.parse() {
                self.retry.max_attempts = max;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.llm.api_key.is_empty() {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }
        if self.llm.base_url.is_empty() {
            return Err("llm.base_url cannot be empty".into());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err("llm.temperature must be between 0.0 and 2.0".into());
        }

        if self.retry.max_attempts == 0 {
            return Err("Retry max_attempts cannot be 0".into());
        }
        if self.retry.jitter_factor < 0.0 || self.retry.jitter_factor > 1.0 {
            return Err("Retry jitter factor must be between 0.0 and 1.0".into());
        }

        match self.server.transport.as_str() {
            "stdio" | "http" => {}
            other => {
                return Err(format!("Unknown server.transport '{other}' (expected stdio or http)").into());
            }
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "skill-hub".to_string(),
                transport: "stdio".to_string(),
                http_bind: "127.0.0.1:8787".to_string(),
                bearer_token: None,
                session_idle_secs: default_session_idle_secs(),
            },
            llm: LlmConfig {
                api_key: String::new(),
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                model: "gemini-1.5-flash".to_string(),
                temperature: 0.2,
                max_tokens: 512,
            },
            retry: RetryConfig {
                max_attempts: 5,
                initial_delay_ms: 200,
                max_delay_ms: 30_000,
                backoff_base: 2.0,
                jitter_factor: 0.2,
                max_elapsed_secs: 300,
            },
            dispatch: DispatchConfig::default(),
            translator: TranslatorConfig {
                enabled: true,
                endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
                target_language: "en".to_string(),
            },
        }
    }
}
