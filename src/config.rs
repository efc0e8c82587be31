//! Service configuration. Defaults are compiled in; a `maskserve.toml` file
//! and `MASKSERVE_*` environment variables override them.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Default `tracing` filter, used when `RUST_LOG` is unset
pub const RUST_LOG: &str = "maskserve=debug,actix_web=info,actix_server=info";

/// Env var naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "MASKSERVE_CONFIG";

/// Config file looked up in the working directory (any supported extension)
pub const DEFAULT_CONFIG_FILE: &str = "maskserve";

/// Mask canvas width when the request does not carry one
pub const CANVAS_WIDTH: u32 = 640;

/// Mask canvas height when the request does not carry one
pub const CANVAS_HEIGHT: u32 = 480;

/// Largest canvas, in pixels, a polygon request may ask for (4096x4096)
pub const MAX_CANVAS_PIXELS: u64 = 4096 * 4096;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub canvas: CanvasSettings,
    pub transcode: TranscodeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Directory the generated mask artifacts are written to
    pub static_dir: PathBuf,

    /// URL prefix the artifact directory is served under
    pub static_route: String,

    /// Upper bound on JSON request bodies. Images travel as base64 so this
    /// is far above actix's 32 KiB default.
    pub max_body_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".into(),
            port: 5000,
            static_dir: PathBuf::from("static"),
            static_route: "/static".into(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,

    /// Upper bound on `width * height` for client-supplied canvases
    pub max_pixels: u64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        CanvasSettings {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            max_pixels: MAX_CANVAS_PIXELS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscodeSettings {
    /// Encoder binary, resolved through `PATH` when not absolute
    pub ffmpeg: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        TranscodeSettings {
            ffmpeg: "ffmpeg".into(),
            input: PathBuf::from("input.avi"),
            output: PathBuf::from("output.mp4"),
        }
    }
}

impl Settings {
    /// Load settings from the optional config file and the environment
    pub fn load() -> Result<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => File::with_name(&path).required(true),
            Err(_) => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("MASKSERVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// The `host:port` pair the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.server.static_dir, PathBuf::from("static"));
        assert_eq!(settings.canvas.width, 640);
        assert_eq!(settings.canvas.height, 480);
        assert_eq!(settings.canvas.max_pixels, 4096 * 4096);
        assert_eq!(settings.transcode.ffmpeg, "ffmpeg");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let settings: Settings = Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 8081\n[canvas]\nwidth = 1280\nmax_pixels = 2000000\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.canvas.width, 1280);
        assert_eq!(settings.canvas.height, 480);
        assert_eq!(settings.canvas.max_pixels, 2_000_000);
    }
}
