// config.rs - Command line options

use std::collections::BTreeSet;
use std::time::Duration;

use clap::Parser;
use conway_core::{Coord, SimulationConfig, patterns};
use egui::Color32;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),

    #[error("unknown pattern '{0}' (try one of: {list})", list = pattern_names())]
    UnknownPattern(String),

    #[error("grid size must be between 1 and {max}, got {0}x{1}", max = MAX_SIZE)]
    InvalidSize(i32, i32),
}

pub const MAX_SIZE: i32 = 1000;

#[derive(Parser, Debug)]
#[command(name = "conway")]
#[command(about = "Conway's Game of Life with an asynchronous generation worker")]
pub struct Args {
    /// Grid width in cells
    #[arg(short = 'W', long, default_value_t = 50)]
    pub width: i32,

    /// Grid height in cells
    #[arg(short = 'H', long, default_value_t = 50)]
    pub height: i32,

    /// Initial pattern: a preset name or "random"
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Seed for the random pattern
    #[arg(long, default_value_t = 0)]
    pub seed: u32,

    /// Colour of live cells
    #[arg(long, default_value = "#00c800")]
    pub live_color: String,

    /// Colour of dead cells
    #[arg(long, default_value = "#282828")]
    pub dead_color: String,

    /// Minimum milliseconds between generations (0 = every frame)
    #[arg(short = 'i', long, default_value_t = 0)]
    pub interval_ms: u64,

    /// Pause when the grid repeats a recent state
    #[arg(long)]
    pub stop_on_cycle: bool,

    /// Debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Everything the app needs, validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub initial: BTreeSet<Coord>,
    pub live_color: Color32,
    pub dead_color: Color32,
}

impl Args {
    pub fn into_config(self) -> Result<AppConfig, ConfigError> {
        if !(1..=MAX_SIZE).contains(&self.width) || !(1..=MAX_SIZE).contains(&self.height) {
            return Err(ConfigError::InvalidSize(self.width, self.height));
        }

        let initial = match self.pattern.as_deref() {
            None => BTreeSet::new(),
            Some(name) if name.eq_ignore_ascii_case("random") => {
                patterns::random_seed(self.width, self.height, self.seed)
            }
            Some(name) => patterns::find(name)
                .map(|p| p.centered(self.width, self.height))
                .ok_or_else(|| ConfigError::UnknownPattern(name.to_owned()))?,
        };

        Ok(AppConfig {
            simulation: SimulationConfig {
                width: self.width,
                height: self.height,
                generation_interval: Duration::from_millis(self.interval_ms),
                pause_on_repeat: self.stop_on_cycle,
                ..SimulationConfig::default()
            },
            initial,
            live_color: parse_color(&self.live_color)?,
            dead_color: parse_color(&self.dead_color)?,
        })
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_color(text: &str) -> Result<Color32, ConfigError> {
    let invalid = || ConfigError::InvalidColor(text.to_owned());
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn pattern_names() -> String {
    patterns::PATTERNS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}
