use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::SurfaceSize;

#[derive(Parser, Debug)]
#[command(
    name = "silkpaper",
    author,
    version,
    about = "Animated silk background in a desktop window",
    arg_required_else_help = false
)]
pub struct Cli {
    /// TOML config file; defaults to `<config dir>/silkpaper/config.toml`.
    #[arg(long, value_name = "FILE", env = "SILKPAPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<SurfaceSize>,

    /// Upper bound on the device pixel density used for the backing store.
    #[arg(long, value_name = "FACTOR", value_parser = parse_density_cap)]
    pub density_cap: Option<f64>,

    /// GPU adapter preference.
    #[arg(long, value_enum, value_name = "POWER")]
    pub power: Option<PowerSetting>,

    /// Render one frame on the CPU to this PNG path and exit without opening a window.
    #[arg(long, value_name = "PATH")]
    pub still_export: Option<PathBuf>,

    /// Animation time, in seconds, for `--still-export`.
    #[arg(long, value_name = "SECONDS", value_parser = parse_still_time)]
    pub still_time: Option<f32>,
}

/// Adapter preference as spelled on the command line and in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    High,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<SurfaceSize, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}' in size specification", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}' in size specification", height.trim()))?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }
    Ok(SurfaceSize { width, height })
}

pub fn parse_density_cap(value: &str) -> Result<f64, String> {
    let cap: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid density cap '{value}'"))?;
    if !cap.is_finite() || cap <= 0.0 {
        return Err("density cap must be a positive number".to_string());
    }
    Ok(cap)
}

pub fn parse_still_time(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid still time '{value}'; expected seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("--still-time must be non-negative".to_string());
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(
            parse_surface_size("1920x1080").unwrap(),
            SurfaceSize {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(
            parse_surface_size(" 640 X 480 ").unwrap(),
            SurfaceSize {
                width: 640,
                height: 480
            }
        );
        assert!(parse_surface_size("1920").is_err());
        assert!(parse_surface_size("0x480").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn rejects_bad_numeric_flags() {
        assert_eq!(parse_density_cap("2").unwrap(), 2.0);
        assert!(parse_density_cap("0").is_err());
        assert!(parse_density_cap("NaN").is_err());
        assert_eq!(parse_still_time("2.5").unwrap(), 2.5);
        assert!(parse_still_time("-1").is_err());
    }

    #[test]
    fn command_line_round_trips_through_clap() {
        let cli = Cli::try_parse_from([
            "silkpaper",
            "--size",
            "800x600",
            "--power",
            "high",
            "--still-export",
            "/tmp/silk.png",
            "--still-time",
            "4",
        ])
        .unwrap();
        assert_eq!(
            cli.size,
            Some(SurfaceSize {
                width: 800,
                height: 600
            })
        );
        assert_eq!(cli.power, Some(PowerSetting::High));
        assert_eq!(cli.still_time, Some(4.0));
    }
}
