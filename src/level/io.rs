//! Level loading and saving
//!
//! Levels are RON text compressed with brotli, so files on disk are compact
//! binary blobs. Reading also accepts plain RON, which is handy for
//! hand-written test levels:
//! - Reading: auto-detects format by checking for a valid RON start
//! - Writing: always uses brotli compression

use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::{LevelFile, LEVEL_VERSION};
use crate::game::entity::{EntityKind, EntityStore};
use crate::game::geometry::Bounds;

/// Validation limits to reject corrupt or hostile files
pub mod limits {
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
    /// Maximum help label length in characters
    pub const MAX_LABEL_LEN: usize = 256;
    /// Largest font size a label may use
    pub const MAX_FONT_SIZE: u16 = 128;
}

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    CompressionError(String),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::ParseError(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::SerializeError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            LevelError::CompressionError(e) => write!(f, "Compression error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

/// Check if a float is valid (not NaN or Inf, and not absurdly large)
fn is_valid_float(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

fn is_unit(f: f32) -> bool {
    (0.0..=1.0).contains(&f)
}

/// Validate one entity record
fn validate_kind(kind: &EntityKind, context: &str) -> Result<(), String> {
    match kind {
        EntityKind::Player(p) => {
            for (name, v) in [("position", p.position), ("velocity", p.velocity), ("spawn", p.spawn)] {
                if !is_valid_float(v.x) || !is_valid_float(v.y) {
                    return Err(format!("{}: invalid {} ({}, {})", context, name, v.x, v.y));
                }
            }
            if !is_unit(p.health.fraction()) {
                return Err(format!("{}: health out of range {}", context, p.health.fraction()));
            }
        }
        EntityKind::Obstacle(b) | EntityKind::Ground(b) => validate_bounds(b, context)?,
        EntityKind::Fire(zone) => {
            validate_bounds(&zone.bounds, context)?;
            if !is_unit(zone.intensity) {
                return Err(format!("{}: intensity out of range {}", context, zone.intensity));
            }
            if !is_valid_float(zone.spread_timer) {
                return Err(format!("{}: invalid spread timer {}", context, zone.spread_timer));
            }
        }
        EntityKind::Extinguisher(ext) => {
            for (name, v) in [("position", ext.position), ("velocity", ext.velocity)] {
                if !is_valid_float(v.x) || !is_valid_float(v.y) {
                    return Err(format!("{}: invalid {} ({}, {})", context, name, v.x, v.y));
                }
            }
            if !is_unit(ext.charge.fraction()) {
                return Err(format!("{}: charge out of range {}", context, ext.charge.fraction()));
            }
        }
        EntityKind::HelpText(label) => {
            if !is_valid_float(label.position.x) || !is_valid_float(label.position.y) {
                return Err(format!("{}: invalid position", context));
            }
            let len = label.text.chars().count();
            if len > limits::MAX_LABEL_LEN {
                return Err(format!("{}: label too long ({} > {})", context, len, limits::MAX_LABEL_LEN));
            }
            if label.font_size == 0 || label.font_size > limits::MAX_FONT_SIZE {
                return Err(format!("{}: invalid font size {}", context, label.font_size));
            }
        }
    }
    Ok(())
}

fn validate_bounds(b: &Bounds, context: &str) -> Result<(), String> {
    if ![b.x, b.y, b.w, b.h].into_iter().all(is_valid_float) {
        return Err(format!("{}: invalid rectangle ({}, {}, {}, {})", context, b.x, b.y, b.w, b.h));
    }
    if b.w <= 0.0 || b.h <= 0.0 {
        return Err(format!("{}: empty rectangle ({} x {})", context, b.w, b.h));
    }
    Ok(())
}

/// Validate an entire level against a store capacity
pub fn validate_level(level: &LevelFile, capacity: usize) -> Result<(), LevelError> {
    if level.version != LEVEL_VERSION {
        return Err(LevelError::ValidationError(format!(
            "unsupported level version {} (expected {})",
            level.version, LEVEL_VERSION
        )));
    }
    if level.entities.len() > capacity {
        return Err(LevelError::ValidationError(format!(
            "too many entities ({} > {})",
            level.entities.len(),
            capacity
        )));
    }

    let players = level.entities.iter().filter(|e| e.kind.is_player()).count();
    if players > 1 {
        return Err(LevelError::ValidationError(format!("{} players (at most 1)", players)));
    }

    let mut ids: Vec<_> = level.entities.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(LevelError::ValidationError(format!("duplicate entity id {}", pair[0])));
    }
    // The id counter continues after the largest id, so that one must not be the last
    if ids.last().is_some_and(|id| id.0 == u32::MAX) {
        return Err(LevelError::ValidationError(format!("entity id {} is out of range", u32::MAX)));
    }

    for entity in &level.entities {
        validate_kind(&entity.kind, &format!("{} {}", entity.kind.name(), entity.id))
            .map_err(LevelError::ValidationError)?;
    }

    Ok(())
}

/// Serialize a level to compressed bytes
pub fn serialize_level(store: &EntityStore) -> Result<Vec<u8>, LevelError> {
    let config = ron::ser::PrettyConfig::new().depth_limit(4).indentor("  ".to_string());

    let ron_string = ron::ser::to_string_pretty(&LevelFile::from_store(store), config)?;

    // Compress with brotli (quality 6, window 22 - good balance of speed/ratio)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(ron_string.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| LevelError::CompressionError(format!("brotli compression failed: {}", e)))?;

    Ok(compressed)
}

/// Parse level data from bytes (brotli or plain RON) and validate it
pub fn parse_level_data(bytes: &[u8], capacity: usize) -> Result<LevelFile, LevelError> {
    // Detect format: RON files start with '(' or whitespace, brotli is binary
    let looks_like_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
        .unwrap_or(false);

    let level = if looks_like_ron {
        let text = std::str::from_utf8(bytes).ok();
        match text.map(ron::from_str::<LevelFile>) {
            Some(Ok(level)) => level,
            // A brotli stream can happen to start with one of those bytes
            Some(Err(e)) => decompress_and_parse(bytes).map_err(|_| LevelError::ParseError(e))?,
            None => decompress_and_parse(bytes)?,
        }
    } else {
        decompress_and_parse(bytes)?
    };

    validate_level(&level, capacity)?;
    Ok(level)
}

fn decompress_and_parse(bytes: &[u8]) -> Result<LevelFile, LevelError> {
    let mut decompressed = Vec::new();
    brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
        .map_err(|e| LevelError::CompressionError(format!("brotli decompression failed: {}", e)))?;
    let contents = String::from_utf8(decompressed)
        .map_err(|e| LevelError::ValidationError(format!("invalid UTF-8 after decompression: {}", e)))?;
    Ok(ron::from_str(&contents)?)
}

/// Save the store to a level file
pub fn save_level<P: AsRef<Path>>(store: &EntityStore, path: P) -> Result<(), LevelError> {
    let path = path.as_ref();
    let data = serialize_level(store)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}

/// Read and validate a level file
pub fn load_level<P: AsRef<Path>>(path: P, capacity: usize) -> Result<LevelFile, LevelError> {
    let bytes = fs::read(path)?;
    parse_level_data(&bytes, capacity)
}

/// Load a level file straight into a store, replacing its contents.
///
/// On error the store is left untouched.
pub fn load_into<P: AsRef<Path>>(store: &mut EntityStore, path: P) -> Result<usize, LevelError> {
    let level = load_level(path, store.capacity())?;
    let count = level.entities.len();
    store
        .replace_all(level.entities)
        .map_err(|e| LevelError::ValidationError(e.to_string()))?;
    Ok(count)
}
