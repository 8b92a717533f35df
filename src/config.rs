use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoviscopeError, Result};

/// Table holding one row per (date, location) observation.
pub const TIMESERIES_TABLE: &str = "covid19";

/// Number of locations selected when a per-country chart names no countries.
pub const TOP_LOCATIONS: usize = 10;

pub const DATASET_URL: &str =
    "https://storage.googleapis.com/covid19-open-data/v3/epidemiology.csv";
pub const DATASET_FILE: &str = "epidemiology.csv";

pub const DEFAULT_PORT: u16 = 8080;

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("coviscope")
    } else {
        PathBuf::from(".coviscope-cache")
    }
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("coviscope").join("coviscope.duckdb")
    } else {
        PathBuf::from("coviscope.duckdb")
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Runtime settings for the `coviscope` binary.
///
/// Built either with [`ServerConfig::builder()`] or from the process
/// environment with [`ServerConfig::from_env()`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// DuckDB database file. `None` keeps the database in memory.
    pub database: Option<PathBuf>,
    pub cache_dir: PathBuf,
    /// Never download the dataset; only use a previously cached copy.
    pub offline: bool,
    pub timeout: Duration,
    /// Load the cached dataset into an empty store at startup.
    pub bootstrap: bool,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read settings from `COVISCOPE_*` environment variables.
    ///
    /// Unset variables fall back to the builder defaults. A `.env` file in
    /// the working directory is honoured if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `COVISCOPE_*` values resolved by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        let host = match lookup("COVISCOPE_HOST") {
            Some(h) => h.parse::<IpAddr>().map_err(|e| {
                CoviscopeError::InvalidArgument(format!("COVISCOPE_HOST '{h}': {e}"))
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match lookup("COVISCOPE_PORT") {
            Some(p) => p.parse::<u16>().map_err(|e| {
                CoviscopeError::InvalidArgument(format!("COVISCOPE_PORT '{p}': {e}"))
            })?,
            None => DEFAULT_PORT,
        };
        builder = builder.addr(SocketAddr::new(host, port));

        match lookup("COVISCOPE_DB") {
            Some(db) if db == ":memory:" => builder = builder.in_memory(),
            Some(db) => builder = builder.database(db),
            None => {}
        }
        if let Some(dir) = lookup("COVISCOPE_CACHE_DIR") {
            builder = builder.cache_dir(dir);
        }
        builder = builder
            .offline(flag(lookup("COVISCOPE_OFFLINE")))
            .bootstrap(flag(lookup("COVISCOPE_BOOTSTRAP")));

        Ok(builder.build())
    }
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

// ---------------------------------------------------------------------------
// ServerConfigBuilder
// ---------------------------------------------------------------------------

pub struct ServerConfigBuilder {
    addr: SocketAddr,
    database: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    bootstrap: bool,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database: Some(default_database_path()),
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(300),
            bootstrap: false,
        }
    }
}

impl ServerConfigBuilder {
    /// Address the HTTP listener binds to. Defaults to `0.0.0.0:8080`.
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Use a DuckDB database file at `path`.
    pub fn database<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Keep the database in memory; contents are lost on shutdown.
    pub fn in_memory(mut self) -> Self {
        self.database = None;
        self
    }

    /// Directory for the downloaded dataset. Defaults to the platform cache dir.
    pub fn cache_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for the dataset download. Defaults to 300 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn build(self) -> ServerConfig {
        ServerConfig {
            addr: self.addr,
            database: self.database,
            cache_dir: self.cache_dir.unwrap_or_else(default_cache_dir),
            offline: self.offline,
            timeout: self.timeout,
            bootstrap: self.bootstrap,
        }
    }
}
