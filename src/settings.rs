//! Game settings
//!
//! Tunables live in a RON file so they can be tweaked without rebuilding.
//! Lookup order:
//! 1. `./settings.ron`
//! 2. `<config dir>/extinguish/settings.ron` (native only)
//!
//! A missing file means defaults. A malformed file is reported and defaults are
//! used, so a typo never keeps the game from starting. Every field has a
//! default, so a settings file only needs the values it changes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.ron";

/// Movement and collision tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub player_radius: f32,
    /// Top walking speed (px/s)
    pub max_speed: f32,
    /// How quickly velocity approaches the target (per second)
    pub acceleration: f32,
    /// 0 = slide along walls, 1 = full bounce
    pub restitution: f32,
    pub extinguisher_radius: f32,
    /// Fraction of a loose extinguisher's velocity kept per second
    pub extinguisher_friction: f32,
    /// Extra speed given to a dropped extinguisher along the aim
    pub throw_speed: f32,
    /// Health lost when falling off the ground
    pub fall_penalty: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            player_radius: 18.0,
            max_speed: 400.0,
            acceleration: 9.0,
            restitution: 0.3,
            extinguisher_radius: 12.0,
            extinguisher_friction: 0.05,
            throw_speed: 250.0,
            fall_penalty: 0.1,
        }
    }
}

/// Fire hazard tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireSettings {
    /// Intensity gained per second
    pub growth_rate: f32,
    /// Seconds a fully burning zone waits before spreading
    pub spread_interval: f32,
    /// Health lost per second at full intensity
    pub burn_rate: f32,
    /// Intensity removed by each retardant particle
    pub douse_per_particle: f32,
    pub embers_per_second: f32,
}

impl Default for FireSettings {
    fn default() -> Self {
        Self {
            growth_rate: 0.05,
            spread_interval: 6.0,
            burn_rate: 0.35,
            douse_per_particle: 0.02,
            embers_per_second: 30.0,
        }
    }
}

/// Extinguisher spray tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpraySettings {
    pub speed: f32,
    pub particles_per_second: f32,
    /// Charge used per second of spraying
    pub drain_per_second: f32,
    /// Push-back on the player while spraying (px/s²)
    pub recoil: f32,
}

impl Default for SpraySettings {
    fn default() -> Self {
        Self {
            speed: 420.0,
            particles_per_second: 90.0,
            drain_per_second: 0.08,
            recoil: 600.0,
        }
    }
}

/// Everything configurable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where F5 saves and F9 reloads the level
    pub level_path: PathBuf,
    /// Sprite for the extinguisher (drawn as a shape if missing)
    pub extinguisher_texture: PathBuf,
    /// Seed for particle jitter and fire spread
    pub seed: u64,
    pub physics: PhysicsSettings,
    pub fire: FireSettings,
    pub spray: SpraySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level_path: PathBuf::from("level.dat"),
            extinguisher_texture: PathBuf::from("resources/Fire Extinguisher.png"),
            seed: 0x5eed,
            physics: PhysicsSettings::default(),
            fire: FireSettings::default(),
            spray: SpraySettings::default(),
        }
    }
}

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SettingsError {
    fn from(e: ron::error::SpannedError) -> Self {
        SettingsError::ParseError(e)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl Settings {
    /// Load from the first settings file found, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) else {
            log::info!("No {} found, using default settings", SETTINGS_FILE);
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(s: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(s)?)
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    #[allow(unused_mut)]
    let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("extinguish").join(SETTINGS_FILE));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let s = Settings::from_ron("(physics: (max_speed: 250.0), seed: 7)").unwrap();
        assert_eq!(s.physics.max_speed, 250.0);
        assert_eq!(s.physics.player_radius, 18.0);
        assert_eq!(s.seed, 7);
        assert_eq!(s.fire, FireSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "(level_path: \"custom.dat\")").unwrap();
        let s = Settings::load_from(file.path()).unwrap();
        assert_eq!(s.level_path, PathBuf::from("custom.dat"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not settings at all").unwrap();
        assert!(matches!(Settings::load_from(file.path()), Err(SettingsError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = Settings::load_from(&dir.path().join("nope.ron"));
        assert!(matches!(result, Err(SettingsError::IoError(_))));
    }
}
