use crate::common::ViewportBounds;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub providers: ProviderConfig,
    pub viewport: ViewportBounds,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent_count: usize,
    pub batch_size: usize,
    pub inter_batch_delay_ms: u64,
    pub initial_settle_ms: u64,
    pub endpoint_epsilon: f64,
    pub center_shift_threshold: f64,
    pub zoom_shift_threshold: f64,
    pub speed_min_kmh: f64,
    pub speed_max_kmh: f64,
    pub frame_interval_ms: u64,
    /// Fixed RNG seed for reproducible endpoint sampling.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub overpass_url: String,
    pub osrm_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Domain log file; console only when unset.
    pub file: Option<String>,
    /// Where to write the final GeoJSON snapshot on shutdown.
    pub snapshot_path: Option<String>,
}

impl SimulationConfig {
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 100,
            batch_size: 5,
            inter_batch_delay_ms: 200,
            initial_settle_ms: 1000,
            endpoint_epsilon: 0.005,
            center_shift_threshold: 0.5,
            zoom_shift_threshold: 1.5,
            speed_min_kmh: 60.0,
            speed_max_kmh: 100.0,
            frame_interval_ms: 16,
            seed: None,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            osrm_url: "https://router.project-osrm.org".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("transit-sim/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then `TRANSIT_SIM__SECTION__KEY`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?);
        if let Some(p) = path {
            builder = builder.add_source(config::File::from(p).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("TRANSIT_SIM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
