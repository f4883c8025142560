//! Gateway configuration
//!
//! Configuration is loaded from environment variables. Names prefixed with
//! `VUE_APP_` are accepted as aliases for the document store settings so an
//! existing client `.env` file can be reused as-is.

use std::env;
use std::time::Duration;

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Main gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Production or development mode
    pub mode: RunMode,
    /// Maximum accepted JSON body size in bytes
    pub max_body_size: usize,

    /// Segmentation service configuration
    pub segmentation: SegmentationConfig,

    /// Document store configuration
    pub store: StoreConfig,
}

/// Outbound segmentation service configuration
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Base URL of the segmentation service (`/segment` is appended)
    pub api_url: String,
    /// Total request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Record request metadata and expose `GET /api/segmentation`
    pub history_enabled: bool,
}

/// Document store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection URI; `None` selects the in-memory store in development
    pub uri: Option<String>,
    /// Database name
    pub database: String,
    /// Collection holding ratings
    pub rating_collection: String,
    /// Collection holding segmentation history records
    pub segmentation_collection: String,
    /// Connection pool size
    pub max_pool_size: u32,
    /// How long to wait for a reachable server
    pub server_selection_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            mode: RunMode::Development,
            max_body_size: 25 * 1024 * 1024, // 25 MB
            segmentation: SegmentationConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            history_enabled: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "mammogram".to_string(),
            rating_collection: "ratings".to_string(),
            segmentation_collection: "segmentations".to_string(),
            max_pool_size: 10,
            server_selection_timeout: Duration::from_secs(5),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        // First non-empty value among the given names
        let var = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|v| !v.is_empty())
        };

        // Server config
        if let Some(host) = var(&["HOST"]) {
            config.host = host;
        }
        if let Some(port) = var(&["PORT"])
            && let Ok(p) = port.parse()
        {
            config.port = p;
        }
        if let Some(mode) = var(&["APP_ENV"])
            && let Some(m) = RunMode::parse(&mode)
        {
            config.mode = m;
        }
        if let Some(val) = var(&["MAX_BODY_SIZE_MB"])
            && let Ok(mb) = val.parse::<usize>()
            && let Some(bytes) = mb.checked_mul(1024 * 1024)
        {
            config.max_body_size = bytes;
        }

        // Segmentation service config
        if let Some(url) = var(&["SEGMENTATION_API_URL"]) {
            config.segmentation.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(val) = var(&["SEGMENTATION_TIMEOUT_SECS"])
            && let Ok(secs) = val.parse::<u64>()
        {
            config.segmentation.timeout = Duration::from_secs(secs);
        }
        if let Some(val) = var(&["SEGMENTATION_CONNECT_TIMEOUT_SECS"])
            && let Ok(secs) = val.parse::<u64>()
        {
            config.segmentation.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(val) = var(&["SEGMENTATION_HISTORY_ENABLED"]) {
            config.segmentation.history_enabled = parse_flag(&val);
        }

        // Document store config
        if let Some(uri) = var(&["MONGO_URI", "VUE_APP_MONGO_URI"]) {
            config.store.uri = Some(uri);
        }
        if let Some(name) = var(&["MONGO_DB_NAME", "VUE_APP_MONGO_DB_NAME"]) {
            config.store.database = name;
        }
        if let Some(name) = var(&["MONGO_COLLECTION_NAME", "VUE_APP_MONGO_COLLECTION_NAME"]) {
            config.store.rating_collection = name;
        }
        if let Some(name) = var(&["MONGO_SEGMENTATION_COLLECTION_NAME"]) {
            config.store.segmentation_collection = name;
        }
        if let Some(val) = var(&["MONGO_MAX_POOL_SIZE"])
            && let Ok(size) = val.parse()
        {
            config.store.max_pool_size = size;
        }
        if let Some(val) = var(&["MONGO_SERVER_SELECTION_TIMEOUT_SECS"])
            && let Ok(secs) = val.parse::<u64>()
        {
            config.store.server_selection_timeout = Duration::from_secs(secs);
        }

        config
    }
}
