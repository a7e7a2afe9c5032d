//! Shared utilities for CLI commands: board configuration and data loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use wardmap_core::{DistrictMap, GameState};

/// Board recipe loaded from `board.yaml`.
///
/// Every field has a default so a partial (or absent) file still yields a
/// working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Background board image.
    #[serde(default = "default_image")]
    pub image: String,

    /// District boundary JSON; falls back to the built-in table.
    #[serde(default)]
    pub districts: Option<String>,

    /// Game-state JSON; unit display is disabled without it.
    #[serde(default)]
    pub game_state: Option<String>,

    /// Display box the board image is fitted into.
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Radius of the unit-marker circle, in original-image pixels.
    #[serde(default = "default_marker_spread")]
    pub marker_spread: f64,
}

fn default_image() -> String {
    "board_with_overlay.png".to_string()
}

fn default_max_width() -> u32 {
    800
}

fn default_max_height() -> u32 {
    600
}

fn default_marker_spread() -> f64 {
    30.0
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            districts: None,
            game_state: None,
            max_width: default_max_width(),
            max_height: default_max_height(),
            marker_spread: default_marker_spread(),
        }
    }
}

impl BoardConfig {
    /// Load the config, treating a missing file as "use defaults".
    /// A file that exists but doesn't parse is an operator error.
    pub fn load(path: &str) -> Result<Self, String> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path, e))?;
        serde_yaml::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path, e))
    }
}

/// Load a district table for a command.
///
/// An explicitly named file must load - anything else is an operator
/// error. With no file named, the built-in board applies.
pub fn districts_or_exit(path: Option<&str>) -> DistrictMap {
    match path {
        Some(p) => match DistrictMap::load(p) {
            Ok(map) => {
                eprintln!("Loaded {} districts from {}", map.len(), p);
                map
            }
            Err(e) => {
                eprintln!("Error loading districts from {}: {}", p, e);
                std::process::exit(1);
            }
        },
        None => {
            let map = DistrictMap::default_board();
            eprintln!("Using built-in district table ({} districts)", map.len());
            map
        }
    }
}

/// Load game state if a file was named and is readable.
///
/// A missing or unreadable file disables the unit display rather than
/// aborting - the rest of the command keeps working.
pub fn game_state_or_none(path: Option<&str>) -> Option<GameState> {
    let p = path?;
    match GameState::load(p) {
        Ok(state) => {
            eprintln!("Loaded game state for {} districts from {}", state.len(), p);
            Some(state)
        }
        Err(e) => {
            eprintln!("Game state unavailable ({}); unit display disabled", e);
            None
        }
    }
}

/// Parse a coordinate argument, exiting with a message on garbage.
pub fn parse_coord(arg: &str, what: &str) -> f64 {
    arg.parse().unwrap_or_else(|_| {
        eprintln!("Error: {} must be a number, got '{}'", what, arg);
        std::process::exit(1);
    })
}
