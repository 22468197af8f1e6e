use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::Color;
use serde::Deserialize;
use thiserror::Error;

use crate::snake::Position;

const APP_DIR_NAME: &str = "grid-snake";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Default board width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 20;

/// Default board height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Smallest accepted board edge.
pub const MIN_GRID_EDGE: u16 = 2;

/// Largest accepted board edge.
pub const MAX_GRID_EDGE: u16 = 512;

/// Default duration between rule evaluations in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 120;

/// Delay between two frame callbacks of the terminal runtime.
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns the center cell, rounding toward the origin.
    #[must_use]
    pub fn center(self) -> Position {
        Position {
            x: i32::from(self.width / 2),
            y: i32::from(self.height / 2),
        }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

/// Errors raised while assembling an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "grid must be between {min}x{min} and {max}x{max}, got {width}x{height}",
        min = MIN_GRID_EDGE,
        max = MAX_GRID_EDGE
    )]
    InvalidGrid { width: u16, height: u16 },
    #[error("tick interval must be greater than zero")]
    InvalidTickInterval,
}

/// Static engine parameters: board size and rule cadence.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EngineConfig {
    pub grid: GridSize,
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl EngineConfig {
    /// Checks the board and cadence limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edges = MIN_GRID_EDGE..=MAX_GRID_EDGE;
        if !edges.contains(&self.grid.width) || !edges.contains(&self.grid.height) {
            return Err(ConfigError::InvalidGrid {
                width: self.grid.width,
                height: self.grid.height,
            });
        }

        if self.tick_interval.is_zero() {
            return Err(ConfigError::InvalidTickInterval);
        }

        Ok(())
    }
}

/// On-disk settings. Every field is optional; missing ones keep defaults.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub grid_width: Option<u16>,
    pub grid_height: Option<u16>,
    pub tick_interval_ms: Option<u64>,
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// Returns defaults when the file does not exist, and an error when it
    /// exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layers these settings over the built-in defaults.
    #[must_use]
    pub fn into_engine_config(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            grid: GridSize {
                width: self.grid_width.unwrap_or(defaults.grid.width),
                height: self.grid_height.unwrap_or(defaults.grid.height),
            },
            tick_interval: self
                .tick_interval_ms
                .map_or(defaults.tick_interval, Duration::from_millis),
        }
    }

    /// Returns a copy where every `Some` field of `overrides` wins.
    #[must_use]
    pub fn merged_with(self, overrides: Settings) -> Self {
        Self {
            grid_width: overrides.grid_width.or(self.grid_width),
            grid_height: overrides.grid_height.or(self.grid_height),
            tick_interval_ms: overrides.tick_interval_ms.or(self.tick_interval_ms),
        }
    }
}

/// Returns the platform-correct settings file path.
#[must_use]
pub fn settings_path() -> PathBuf {
    let mut base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SETTINGS_FILE_NAME);
    base
}

/// Flat colors used by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Background of even cells.
    pub board: Color,
    /// Background of odd cells, standing in for grid lines.
    pub grid: Color,
    pub snake_head: Color,
    pub snake_body: Color,
    pub fruit: Color,
    pub border: Color,
    pub text: Color,
    pub muted: Color,
}

pub const PALETTE: Palette = Palette {
    board: Color::Rgb(0x0b, 0x12, 0x20),
    grid: Color::Rgb(0x0f, 0x17, 0x2a),
    snake_head: Color::Rgb(0x22, 0xc5, 0x5e),
    snake_body: Color::Rgb(0x16, 0xa3, 0x4a),
    fruit: Color::Rgb(0xf9, 0x73, 0x16),
    border: Color::Rgb(0x33, 0x41, 0x55),
    text: Color::White,
    muted: Color::DarkGray,
};

/// Full-block glyph pair used for one board cell.
pub const GLYPH_CELL: &str = "██";

/// Glyph pair used for the fruit.
pub const GLYPH_FRUIT: &str = "●●";
