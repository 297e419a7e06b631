//! Layered settings: built-in defaults, then the TOML config file, then the
//! command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use silk::{GpuPowerPreference, DEFAULT_DENSITY_CAP};

use crate::cli::{Cli, PowerSetting};

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "silkpaper";
const APPLICATION: &str = "silkpaper";

pub const DEFAULT_SIZE: SurfaceSize = SurfaceSize {
    width: 1280,
    height: 720,
};
pub const DEFAULT_TITLE: &str = "silkpaper";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub density_cap: Option<f64>,
    pub power: Option<PowerSetting>,
    pub title: Option<String>,
    pub log_filter: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    /// Loads the explicitly requested file, or the default one if it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match default_config_path() {
            Some(path) if path.is_file() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StillRequest {
    pub path: PathBuf,
    pub time: f32,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub size: SurfaceSize,
    pub density_cap: f64,
    pub power: GpuPowerPreference,
    pub title: String,
    pub log_filter: Option<String>,
    pub still: Option<StillRequest>,
    pub config_path: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let (file, config_path) = FileConfig::discover(cli.config.as_deref())?;
        let mut settings = Self::merge(cli, file)?;
        settings.config_path = config_path;
        Ok(settings)
    }

    /// Command-line values win over file values, which win over defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> Result<Self> {
        let size = match cli.size {
            Some(size) => size,
            None => SurfaceSize {
                width: file.width.unwrap_or(DEFAULT_SIZE.width),
                height: file.height.unwrap_or(DEFAULT_SIZE.height),
            },
        };
        if size.width == 0 || size.height == 0 {
            bail!(
                "surface dimensions must be greater than zero (got {}x{})",
                size.width,
                size.height
            );
        }

        let density_cap = cli
            .density_cap
            .or(file.density_cap)
            .unwrap_or(DEFAULT_DENSITY_CAP);
        if !density_cap.is_finite() || density_cap <= 0.0 {
            bail!("density_cap must be a positive number (got {density_cap})");
        }

        let power = match cli.power.or(file.power) {
            Some(PowerSetting::High) => GpuPowerPreference::High,
            Some(PowerSetting::Low) | None => GpuPowerPreference::Low,
        };

        let still = match (&cli.still_export, cli.still_time) {
            (Some(path), time) => Some(StillRequest {
                path: path.clone(),
                time: time.unwrap_or(0.0),
            }),
            (None, Some(_)) => return Err(anyhow!("--still-time requires --still-export")),
            (None, None) => None,
        };

        Ok(Self {
            size,
            density_cap,
            power,
            title: file.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            log_filter: file.log_filter,
            still,
            config_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["silkpaper"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = Settings::merge(&cli(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.size, DEFAULT_SIZE);
        assert_eq!(settings.density_cap, DEFAULT_DENSITY_CAP);
        assert_eq!(settings.power, GpuPowerPreference::Low);
        assert_eq!(settings.title, DEFAULT_TITLE);
        assert!(settings.still.is_none());
    }

    #[test]
    fn command_line_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            width = 1024
            height = 768
            density_cap = 2.0
            power = "high"
            title = "desk"
            log_filter = "debug"
            "#,
        )
        .unwrap();
        let settings = Settings::merge(&cli(&["--size", "640x480", "--power", "low"]), file).unwrap();
        assert_eq!(
            settings.size,
            SurfaceSize {
                width: 640,
                height: 480
            }
        );
        assert_eq!(settings.density_cap, 2.0);
        assert_eq!(settings.power, GpuPowerPreference::Low);
        assert_eq!(settings.title, "desk");
        assert_eq!(settings.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn partial_file_sizes_fall_back_per_axis() {
        let file = FileConfig {
            width: Some(300),
            ..FileConfig::default()
        };
        let settings = Settings::merge(&cli(&[]), file).unwrap();
        assert_eq!(
            settings.size,
            SurfaceSize {
                width: 300,
                height: DEFAULT_SIZE.height
            }
        );
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let zero = FileConfig {
            height: Some(0),
            ..FileConfig::default()
        };
        assert!(Settings::merge(&cli(&[]), zero).is_err());
        let negative_cap = FileConfig {
            density_cap: Some(-1.0),
            ..FileConfig::default()
        };
        assert!(Settings::merge(&cli(&[]), negative_cap).is_err());
        assert!(toml::from_str::<FileConfig>("colour = \"red\"").is_err());
    }

    #[test]
    fn still_time_needs_an_export_path() {
        assert!(Settings::merge(&cli(&["--still-time", "1"]), FileConfig::default()).is_err());
        let settings = Settings::merge(
            &cli(&["--still-export", "out.png"]),
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(
            settings.still,
            Some(StillRequest {
                path: PathBuf::from("out.png"),
                time: 0.0
            })
        );
    }

    #[test]
    fn explicit_config_file_is_loaded_and_must_exist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "width = 320\nheight = 200\n").unwrap();

        let (file, found) = FileConfig::discover(Some(&path)).unwrap();
        assert_eq!(file.width, Some(320));
        assert_eq!(found.as_deref(), Some(path.as_path()));

        assert!(FileConfig::discover(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
