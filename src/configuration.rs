use crate::collage::GridLayout;
use config::{builder::DefaultState, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fs, io};
use thiserror::Error;

/// Name of the optional settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "collage.yaml";

/// Prefix of the environment variables read by [`get_configuration`].
pub const ENV_PREFIX: &str = "LASTFM";

pub const DEFAULT_API_BASE_URL: &str = "http://ws.audioscrobbler.com/2.0/";

/// Largest canvas, in pixels, a run may allocate (about 768 MiB of RGB).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: `{field}` must be greater than zero")]
    ZeroDimension { field: &'static str },
    #[error("Invalid configuration: a {grid_width}x{grid_height} grid of {tile_size_px}px tiles is too large")]
    DimensionOverflow {
        grid_width: u32,
        grid_height: u32,
        tile_size_px: u32,
    },
}

/// Time window of the Last.fm top albums chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Period {
    Overall,
    SevenDay,
    OneMonth,
    ThreeMonth,
    SixMonth,
    TwelveMonth,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Overall,
        Period::SevenDay,
        Period::OneMonth,
        Period::ThreeMonth,
        Period::SixMonth,
        Period::TwelveMonth,
    ];

    /// The token understood by the `period` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Overall => "overall",
            Period::SevenDay => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonth => "3month",
            Period::SixMonth => "6month",
            Period::TwelveMonth => "12month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Period::ALL
            .into_iter()
            .find(|period| period.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| {
                format!(
                    "unknown period `{}`, expected one of: overall, 7day, 1month, 3month, 6month, 12month",
                    token
                )
            })
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Everything a collage run needs, loaded once at startup.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub username: String,
    pub period: Period,
    pub grid_width: u32,
    pub grid_height: u32,
    pub tile_size_px: u32,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Overrides the HTTP client's default timeout when set.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .field("period", &self.period)
            .field("grid_width", &self.grid_width)
            .field("grid_height", &self.grid_height)
            .field("tile_size_px", &self.tile_size_px)
            .field("api_base_url", &self.api_base_url)
            .field("output_dir", &self.output_dir)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Number of albums requested from the API and placed on the canvas.
    pub fn album_limit(&self) -> u32 {
        self.grid_width * self.grid_height
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.grid_width, self.grid_height, self.tile_size_px)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("grid_width", self.grid_width),
            ("grid_height", self.grid_height),
            ("tile_size_px", self.tile_size_px),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroDimension { field });
            }
        }

        let canvas_width = u64::from(self.tile_size_px) * u64::from(self.grid_width);
        let canvas_height = u64::from(self.tile_size_px) * u64::from(self.grid_height);
        let fits = self.grid_width.checked_mul(self.grid_height).is_some()
            && u32::try_from(canvas_width).is_ok()
            && u32::try_from(canvas_height).is_ok()
            && canvas_width * canvas_height <= MAX_CANVAS_PIXELS;
        if !fits {
            return Err(ConfigError::DimensionOverflow {
                grid_width: self.grid_width,
                grid_height: self.grid_height,
                tile_size_px: self.tile_size_px,
            });
        }

        Ok(self)
    }
}

/// Loads the settings from an optional YAML file overlaid with `LASTFM_*`
/// environment variables.
pub fn get_configuration(cfg_file: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(cfg_file).format(FileFormat::Yaml).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX));

    build_settings(builder)
}

/// Builds, deserializes and validates settings from prepared sources.
pub fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()
}

pub fn create_config(cfg_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");

    if cfg_file.exists() && !confirm_overwrite(cfg_file)? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    let config_content = include_str!("config_template.yaml");
    fs::write(cfg_file, config_content)?;

    println!("\x1b[32mConfiguration file created at:");
    println!("  -> {}", cfg_file.display());
    println!("\x1b[0mPlease edit the configuration file with your Last.fm credentials.");
    println!("Any value can also be set through a LASTFM_* environment variable or a .env file.");

    Ok(())
}

fn confirm_overwrite(cfg_file: &Path) -> Result<bool, io::Error> {
    println!("\x1b[31m{} already exists.", cfg_file.display());
    println!("Do you want to overwrite it? (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
