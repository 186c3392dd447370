use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "thoughtsort.duckdb".to_string(),
        }
    }
}

/// A bearer key and the user it authenticates as.
#[derive(Debug, Deserialize, Clone)]
pub struct UserKey {
    pub user_id: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<UserKey>,
}

impl AuthConfig {
    /// Resolve a bearer key to the user it belongs to. Empty keys never match.
    pub fn user_for_key(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.users
            .iter()
            .find(|u| u.api_key == key)
            .map(|u| u.user_id.as_str())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub gemini: Option<GeminiConfig>,
    pub openai: Option<OpenAiConfig>,
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: None,
            openai: None,
            ollama: None,
        }
    }
}

/// Per-call deadlines for generative requests, in seconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AssistantConfig {
    pub summary_timeout_secs: u64,
    pub icon_timeout_secs: u64,
    pub chat_timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            summary_timeout_secs: 15,
            icon_timeout_secs: 10,
            chat_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("THOUGHTSORT").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand values written as ${VAR}
        app_config.server.host = expand_env(&app_config.server.host);
        app_config.database.path = expand_env(&app_config.database.path);
        app_config.client.api_key = expand_env(&app_config.client.api_key);

        for user in app_config.auth.users.iter_mut() {
            user.api_key = expand_env(&user.api_key);
        }
        if let Some(ref mut gemini) = app_config.llm.gemini {
            gemini.api_key = expand_env(&gemini.api_key);
        }
        if let Some(ref mut openai) = app_config.llm.openai {
            openai.api_key = expand_env(&openai.api_key);
        }

        Ok(app_config)
    }
}

fn expand_env(val: &str) -> String {
    match val.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).unwrap_or_default(),
        None => val.to_string(),
    }
}
