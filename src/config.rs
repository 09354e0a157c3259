use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::detect::DetectMode;

const DEFAULT_SERVER: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DEBOUNCE_SECS: u64 = 10;
const DEFAULT_DEVICE: &str = "stub://camera";
const DEFAULT_FPS: u32 = 10;
const DEFAULT_WIDTH: u32 = 640;
const DEFAULT_HEIGHT: u32 = 480;
const DEFAULT_CASCADE_PATH: &str = "haarcascade_frontalface_default.xml";

#[derive(Debug, Deserialize, Default)]
struct WatchConfigFile {
    highlight: Option<bool>,
    console: Option<bool>,
    faces: Option<bool>,
    upload: Option<bool>,
    threading: Option<bool>,
    debounce_secs: Option<u64>,
    cascade_path: Option<String>,
    server: Option<ServerConfigFile>,
    camera: Option<CameraConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ServerConfigFile {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Resolved configuration, immutable after startup.
///
/// Every component receives the values it needs from here; nothing mutates
/// configuration at runtime.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Draw highlight boxes on detected targets.
    pub highlight: bool,
    /// Emit a console line per detection.
    pub console: bool,
    /// What the detector scans for.
    pub mode: DetectMode,
    /// Upload annotated frames to the collector.
    pub upload: bool,
    /// Offload the report pipeline to the bounded worker pool.
    pub threading: bool,
    /// Collector hostname or IP.
    pub server: String,
    /// Collector port.
    pub port: u16,
    /// Minimum interval between detector invocations.
    pub debounce: Duration,
    /// Cascade model file used by faces mode.
    pub cascade_path: String,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

impl WatchConfig {
    /// Load configuration: defaults, then the optional JSON file named by
    /// `WATCHPOST_CONFIG`, then environment overrides. CLI flags are applied
    /// on top by the daemon.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("WATCHPOST_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: WatchConfigFile) -> Self {
        let mode = if file.faces.unwrap_or(false) {
            DetectMode::Faces
        } else {
            DetectMode::People
        };
        let server = file
            .server
            .as_ref()
            .and_then(|server| server.host.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let port = file
            .server
            .as_ref()
            .and_then(|server| server.port)
            .unwrap_or(DEFAULT_PORT);
        let camera = CameraSettings {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_HEIGHT),
        };
        Self {
            highlight: file.highlight.unwrap_or(false),
            console: file.console.unwrap_or(false),
            mode,
            upload: file.upload.unwrap_or(true),
            threading: file.threading.unwrap_or(false),
            server,
            port,
            debounce: Duration::from_secs(file.debounce_secs.unwrap_or(DEFAULT_DEBOUNCE_SECS)),
            cascade_path: file
                .cascade_path
                .unwrap_or_else(|| DEFAULT_CASCADE_PATH.to_string()),
            camera,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(server) = std::env::var("WATCHPOST_SERVER") {
            if !server.trim().is_empty() {
                self.server = server;
            }
        }
        if let Ok(port) = std::env::var("WATCHPOST_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow!("WATCHPOST_PORT must be a port number"))?;
        }
        if let Ok(debounce) = std::env::var("WATCHPOST_DEBOUNCE_SECS") {
            let seconds: u64 = debounce.parse().map_err(|_| {
                anyhow!("WATCHPOST_DEBOUNCE_SECS must be an integer number of seconds")
            })?;
            self.debounce = Duration::from_secs(seconds);
        }
        if let Ok(device) = std::env::var("WATCHPOST_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(cascade) = std::env::var("WATCHPOST_CASCADE") {
            if !cascade.trim().is_empty() {
                self.cascade_path = cascade;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            return Err(anyhow!("collector server host must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be non-zero"));
        }
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.cascade_path.trim().is_empty() {
            return Err(anyhow!("cascade model path must not be empty"));
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::from_file(WatchConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<WatchConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
