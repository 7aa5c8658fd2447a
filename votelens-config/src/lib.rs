//! Loader for Votelens configuration with YAML + environment overlays.
//!
//! Precedence, lowest first:
//! 1. built-in defaults (serde `default` attributes);
//! 2. well-known process variables (`OPENAI_API_KEY`, `JWT_SECRET`, ...);
//! 3. YAML/TOML/JSON files and inline snippets, in the order attached;
//! 4. `VOTELENS__SECTION__KEY` variables.
//!
//! String values may reference `${VAR}`; placeholders are expanded after the
//! sources are merged. A value that is still an unresolved `${VAR}` after
//! expansion is treated as absent.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use votelens_common::{Facet, LlmConfig};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Process variables consulted as low-precedence defaults. The first variable
/// that is set wins for a given key.
const STANDARD_ENV: &[(&str, &[&str])] = &[
    ("openai.api_key", &["OPENAI_API_KEY"]),
    ("anthropic.api_key", &["ANTHROPIC_API_KEY"]),
    ("serpapi.api_key", &["SERPAPI_KEY"]),
    ("database.url", &["DATABASE_URL"]),
    ("auth.jwt_secret", &["JWT_SECRET"]),
    ("server.environment", &["APP_ENV", "NODE_ENV"]),
    ("server.public_url", &["PUBLIC_URL", "NEXTAUTH_URL"]),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VotelensConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub openai: ProviderConfig,
    #[serde(default)]
    pub anthropic: ProviderConfig,
    #[serde(default)]
    pub serpapi: SerpApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind", deserialize_with = "scalar::required")]
    pub bind: String,
    #[serde(default = "default_environment", deserialize_with = "scalar::required")]
    pub environment: String,
    /// Browser origin allowed by CORS (the deployed frontend URL).
    #[serde(default, deserialize_with = "scalar::optional")]
    pub public_url: Option<String>,
    /// Prebuilt frontend served for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            environment: default_environment(),
            public_url: None,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Openai,
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,
    /// Falls back to the provider's default model when unset.
    #[serde(default, deserialize_with = "scalar::optional")]
    pub model: Option<String>,
    #[serde(default = "default_temperature", deserialize_with = "scalar::required")]
    pub temperature: f32,
    /// Upper bound on every facet's token budget; facets use their own when unset.
    #[serde(default, deserialize_with = "scalar::optional")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_max_retries", deserialize_with = "scalar::required")]
    pub max_retries: usize,
    #[serde(
        default = "default_request_timeout_secs",
        deserialize_with = "scalar::required"
    )]
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            temperature: default_temperature(),
            max_tokens: None,
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LlmSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, deserialize_with = "scalar::optional")]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "scalar::optional")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerpApiConfig {
    #[serde(default, deserialize_with = "scalar::optional")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url", deserialize_with = "scalar::required")]
    pub url: String,
    #[serde(default = "default_max_connections", deserialize_with = "scalar::required")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default, deserialize_with = "scalar::optional")]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl_hours", deserialize_with = "scalar::required")]
    pub token_ttl_hours: u64,
    #[serde(default = "default_bcrypt_cost", deserialize_with = "scalar::required")]
    pub bcrypt_cost: u32,
    #[serde(default = "default_cookie_name", deserialize_with = "scalar::required")]
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: default_bcrypt_cost(),
            cookie_name: default_cookie_name(),
        }
    }
}

impl AuthConfig {
    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::Message("JWT_SECRET is not set".into()))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours * 3600)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(
        default = "default_strategy_timeout_secs",
        deserialize_with = "scalar::required"
    )]
    pub strategy_timeout_secs: u64,
    #[serde(default = "default_report_ttl_secs", deserialize_with = "scalar::required")]
    pub report_ttl_secs: u64,
    /// Extra per-facet ceilings in seconds, keyed by facet slug.
    #[serde(default, deserialize_with = "scalar::map")]
    pub facet_timeouts: BTreeMap<String, u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strategy_timeout_secs: default_strategy_timeout_secs(),
            report_ttl_secs: default_report_ttl_secs(),
            facet_timeouts: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Ceiling for one facet call, if any.
    pub fn timeout_for(&self, facet: Facet) -> Option<Duration> {
        if let Some(secs) = self.facet_timeouts.get(facet.slug()) {
            return Some(Duration::from_secs(*secs));
        }
        match facet {
            Facet::StrategyReport => Some(Duration::from_secs(self.strategy_timeout_secs)),
            _ => None,
        }
    }

    pub fn report_ttl(&self) -> Duration {
        Duration::from_secs(self.report_ttl_secs)
    }
}

impl VotelensConfig {
    /// Resolve the active provider into a client configuration.
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let (provider, env_name, default_model) = match self.llm.provider {
            LlmProvider::Openai => (&self.openai, "OPENAI_API_KEY", DEFAULT_OPENAI_MODEL),
            LlmProvider::Anthropic => (&self.anthropic, "ANTHROPIC_API_KEY", DEFAULT_ANTHROPIC_MODEL),
        };
        let api_key = provider
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Message(format!("{env_name} is not set")))?;
        let model = self
            .llm
            .model
            .clone()
            .unwrap_or_else(|| default_model.to_string());
        let base_url = provider.endpoint.clone();

        Ok(match self.llm.provider {
            LlmProvider::Openai => LlmConfig::OpenAi {
                api_key,
                model,
                base_url,
            },
            LlmProvider::Anthropic => LlmConfig::Anthropic {
                api_key,
                model,
                base_url,
            },
        })
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".into()
}
fn default_environment() -> String {
    "development".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_retries() -> usize {
    2
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_database_url() -> String {
    "sqlite://votelens.db?mode=rwc".into()
}
fn default_max_connections() -> u32 {
    5
}
fn default_token_ttl_hours() -> u64 {
    24
}
fn default_bcrypt_cost() -> u32 {
    10
}
fn default_cookie_name() -> String {
    "token".into()
}
fn default_strategy_timeout_secs() -> u64 {
    300
}
fn default_report_ttl_secs() -> u64 {
    7 * 24 * 3600
}

/// Field deserializers that accept a scalar in either spelling.
///
/// Environment overrides and `${VAR}` placeholders always arrive as strings,
/// while YAML may hand a bare `123456` to a string field.
mod scalar {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::fmt::Display;
    use std::str::FromStr;

    fn parse<T, E>(value: Value) -> Result<Option<T>, E>
    where
        T: FromStr,
        T::Err: Display,
        E: Error,
    {
        let text = match value {
            Value::Null => return Ok(None),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => return Err(E::custom(format!("expected a scalar, found {other}"))),
        };
        text.parse()
            .map(Some)
            .map_err(|e| E::custom(format!("invalid value {text:?}: {e}")))
    }

    pub fn required<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        parse(Value::deserialize(d)?)?.ok_or_else(|| D::Error::custom("value must not be null"))
    }

    pub fn optional<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        parse(Value::deserialize(d)?)
    }

    pub fn map<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let mut out = BTreeMap::new();
        for (key, value) in BTreeMap::<String, Value>::deserialize(d)? {
            if let Some(parsed) = parse(value)? {
                out.insert(key, parsed);
            }
        }
        Ok(out)
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Replace strings that are nothing but an unresolved `${VAR}` with null.
fn drop_unresolved(v: &mut Value) {
    match v {
        Value::String(s) => {
            let t = s.trim();
            if t.starts_with("${") && t.ends_with('}') && !t[2..].contains("${") {
                *v = Value::Null;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(drop_unresolved),
        Value::Object(obj) => obj.values_mut().for_each(drop_unresolved),
        _ => {}
    }
}

enum Source {
    File { path: PathBuf, required: bool },
    Inline { body: String, format: FileFormat },
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct VotelensConfigLoader {
    sources: Vec<Source>,
    env_prefix: String,
    standard_env: bool,
}

impl Default for VotelensConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VotelensConfigLoader {
    /// Start with defaults, well-known process variables and `VOTELENS__`
    /// overrides.
    ///
    /// ```
    /// use votelens_config::VotelensConfigLoader;
    ///
    /// let config = VotelensConfigLoader::new()
    ///     .without_standard_env()
    ///     .with_yaml_str("server:\n  bind: '127.0.0.1:8080'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.bind, "127.0.0.1:8080");
    /// assert_eq!(config.auth.cookie_name, "token");
    /// ```
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            env_prefix: "VOTELENS".into(),
            standard_env: true,
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: true,
        });
        self
    }

    /// Attach a file that may be absent (env-only deployments).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: false,
        });
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.sources.push(Source::Inline {
            body: yaml.to_string(),
            format: FileFormat::Yaml,
        });
        self
    }

    /// Use a different prefix for `<PREFIX>__SECTION__KEY` overrides.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Skip `OPENAI_API_KEY`, `JWT_SECRET` and friends.
    pub fn without_standard_env(mut self) -> Self {
        self.standard_env = false;
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use votelens_common::LlmConfig;
    /// use votelens_config::VotelensConfigLoader;
    ///
    /// unsafe { std::env::set_var("VL_DOC_KEY", "sk-from-env"); }
    ///
    /// let config = VotelensConfigLoader::new()
    ///     .without_standard_env()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: anthropic
    /// anthropic:
    ///   api_key: "${VL_DOC_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match config.llm_config().unwrap() {
    ///     LlmConfig::Anthropic { api_key, model, .. } => {
    ///         assert_eq!(api_key, "sk-from-env");
    ///         assert!(model.starts_with("claude"));
    ///     }
    ///     other => panic!("unexpected provider: {other:?}"),
    /// }
    ///
    /// unsafe { std::env::remove_var("VL_DOC_KEY"); }
    /// ```
    pub fn load(self) -> Result<VotelensConfig, ConfigError> {
        let mut builder = Config::builder();

        if self.standard_env {
            for (key, vars) in STANDARD_ENV {
                let found = vars
                    .iter()
                    .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
                if let Some(value) = found {
                    builder = builder.set_default(*key, value)?;
                }
            }
        }

        for source in self.sources {
            builder = match source {
                Source::File { path, required } => {
                    builder.add_source(File::from(path.as_path()).required(required))
                }
                Source::Inline { body, format } => {
                    builder.add_source(File::from_str(&body, format))
                }
            };
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix).separator("__"),
        );

        let cfg = builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);
        drop_unresolved(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
