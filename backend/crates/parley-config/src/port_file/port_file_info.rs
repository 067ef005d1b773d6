//! Port discovery file, `<config_dir>/server.json`.
//!
//! Written by the server after it binds, read by the `parley` client so it
//! can find the server without `--server`. A file left behind by a dead
//! process is treated as absent and removed on read.

use crate::{Config, ConfigError, ConfigErrorResult, port_file::is_process_running};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const PORT_FILENAME: &str = "server.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortFileInfo {
    pub pid: u32,
    pub port: u16,
    pub host: String,
    /// RFC 3339
    pub started_at: String,
    pub version: String,
}

impl PortFileInfo {
    /// Base URL of the server described by this file
    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }

    pub fn write(port: u16, host: &str) -> ConfigErrorResult<PathBuf> {
        Self::write_in(&Config::config_dir()?, port, host)
    }

    /// Refuses to replace the file of a server that is still running.
    pub fn write_in(config_dir: &Path, port: u16, host: &str) -> ConfigErrorResult<PathBuf> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        if let Some(existing) = Self::read_live_in(config_dir)? {
            return Err(ConfigError::config(format!(
                "Another parley-server is already running on port {} (PID {})",
                existing.port, existing.pid
            )));
        }

        let info = PortFileInfo {
            pid: std::process::id(),
            port,
            host: host.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        let content = serde_json::to_string_pretty(&info)
            .map_err(|e| ConfigError::config(format!("Failed to serialize port file: {e}")))?;

        let path = config_dir.join(PORT_FILENAME);
        std::fs::write(&path, content).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        Ok(path)
    }

    pub fn read_in(config_dir: &Path) -> ConfigErrorResult<Option<PortFileInfo>> {
        let path = config_dir.join(PORT_FILENAME);

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::config(format!("Invalid port file {}: {e}", path.display())))
    }

    pub fn read_live() -> ConfigErrorResult<Option<PortFileInfo>> {
        Self::read_live_in(&Config::config_dir()?)
    }

    /// Like `read_in`, but a file whose PID is gone is removed and
    /// reported as `None`.
    pub fn read_live_in(config_dir: &Path) -> ConfigErrorResult<Option<PortFileInfo>> {
        let Some(info) = Self::read_in(config_dir)? else {
            return Ok(None);
        };

        if is_process_running(info.pid) {
            return Ok(Some(info));
        }

        log::debug!("Removing stale port file (pid {} not running)", info.pid);
        Self::remove_in(config_dir)?;
        Ok(None)
    }

    pub fn remove() -> ConfigErrorResult<()> {
        Self::remove_in(&Config::config_dir()?)
    }

    pub fn remove_in(config_dir: &Path) -> ConfigErrorResult<()> {
        let path = config_dir.join(PORT_FILENAME);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| ConfigError::Io { path, source: e })?;
        }
        Ok(())
    }

    pub fn path() -> ConfigErrorResult<PathBuf> {
        Ok(Config::config_dir()?.join(PORT_FILENAME))
    }
}
