use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tokio::fs;
use tracing::{info, warn};

use crate::locale::Locale;
use crate::surface::SurfaceKind;

pub const DEFAULT_CONFIG_PATH: &str = "console.yaml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub locale: Locale,
    pub request_timeout_secs: u64,
    pub intervals: Intervals,
    /// Surface de l'éditeur de configuration (plain = indentation 4, rich = 2)
    pub config_surface: SurfaceKind,
    /// Suivi des logs via /ws/logs plutôt que par polling
    pub logs_follow: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Intervals {
    pub stats_poll_secs: u64,
    pub packets_secs: u64,
    pub logs_secs: u64,
    pub toast_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            locale: Locale::default(),
            request_timeout_secs: 10,
            intervals: Intervals::default(),
            config_surface: SurfaceKind::Plain,
            logs_follow: false,
        }
    }
}

impl Default for Intervals {
    fn default() -> Self {
        Self { stats_poll_secs: 5, packets_secs: 5, logs_secs: 10, toast_secs: 5 }
    }
}

impl Intervals {
    pub fn stats_poll(&self) -> Duration {
        secs(self.stats_poll_secs)
    }

    pub fn packets(&self) -> Duration {
        secs(self.packets_secs)
    }

    pub fn logs(&self) -> Duration {
        secs(self.logs_secs)
    }

    pub fn toast(&self) -> Duration {
        secs(self.toast_secs)
    }
}

// un intervalle nul ferait tourner tokio::time::interval en boucle
fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        secs(self.request_timeout_secs)
    }

    pub fn from_yaml(txt: &str) -> Result<Self, serde_yaml::Error> {
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(txt)
    }

    /// Applique GEX_CONSOLE_URL si présent
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var("GEX_CONSOLE_URL") {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
        self
    }
}

/// Charge la config depuis `path`, sinon GEX_CONSOLE_CONFIG, sinon console.yaml.
/// Fichier absent ou invalide => config par défaut.
pub async fn load_config(path: Option<&Path>) -> ConsoleConfig {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::var("GEX_CONSOLE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into())
            .into(),
    };

    let cfg = if path.exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        ConsoleConfig::from_yaml(&txt).unwrap_or_else(|e| {
            warn!("invalid config {}: {e}", path.display());
            ConsoleConfig::default()
        })
    } else {
        info!("no {} found, using default config", path.display());
        ConsoleConfig::default()
    };
    cfg.apply_env()
}
