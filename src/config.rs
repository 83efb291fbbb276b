use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE};
use crate::models::MatchWeights;
use crate::services::SupabaseTables;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub tables: TableSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which `DataStore` implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

fn default_backend() -> StoreBackend { StoreBackend::Supabase }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    pub service_role_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl SupabaseSettings {
    /// Key used for data access; the service-role key wins when present
    pub fn data_key(&self) -> &str {
        self.service_role_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(&self.anon_key)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub events: String,
    pub profiles: String,
    pub notifications: String,
    pub volunteer_history: String,
    pub volunteer_events: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        let tables = SupabaseTables::default();
        Self {
            events: tables.events,
            profiles: tables.profiles,
            notifications: tables.notifications,
            volunteer_history: tables.volunteer_history,
            volunteer_events: tables.volunteer_events,
        }
    }
}

impl From<TableSettings> for SupabaseTables {
    fn from(tables: TableSettings) -> Self {
        Self {
            events: tables.events,
            profiles: tables.profiles,
            notifications: tables.notifications,
            volunteer_history: tables.volunteer_history,
            volunteer_events: tables.volunteer_events,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_skill_weight")]
    pub skill_weight: u32,
    #[serde(default = "default_location_weight")]
    pub location_weight: u32,
    #[serde(default = "default_availability_weight")]
    pub availability_weight: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_min_score")]
    pub min_score: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            skill_weight: default_skill_weight(),
            location_weight: default_location_weight(),
            availability_weight: default_availability_weight(),
            max_results: default_max_results(),
            min_score: default_min_score(),
        }
    }
}

impl MatchingSettings {
    pub fn weights(&self) -> MatchWeights {
        MatchWeights {
            skill: self.skill_weight,
            location: self.location_weight,
            availability: self.availability_weight,
        }
    }
}

fn default_skill_weight() -> u32 { MatchWeights::default().skill }
fn default_location_weight() -> u32 { MatchWeights::default().location }
fn default_availability_weight() -> u32 { MatchWeights::default().availability }
fn default_max_results() -> usize { DEFAULT_MAX_RESULTS }
fn default_min_score() -> u32 { DEFAULT_MIN_SCORE }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret for bearer tokens; write endpoints are open when unset
    pub jwt_secret: Option<String>,
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            audience: default_audience(),
        }
    }
}

fn default_audience() -> String { "authenticated".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with VOLHUB__)
    /// 4. The plain Supabase variables (SUPABASE_URL and friends)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VOLHUB__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_supabase_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        apply_supabase_env(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("VOLHUB")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override Supabase keys from the variables the hosted dashboard hands out
fn apply_supabase_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("SUPABASE_URL", "supabase.url"),
        ("SUPABASE_ANON_KEY", "supabase.anon_key"),
        ("SUPABASE_SERVICE_ROLE_KEY", "supabase.service_role_key"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
