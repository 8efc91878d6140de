use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{Palette, PaletteEntry, PaletteKey};

pub const DEFAULT_PALETTE_JSON: &str = include_str!("../../../../assets/palette.json");

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("failed to read palette file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse palette json at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid color for {section}.{key}: expected 3 or 4 channels, got {channels}")]
    InvalidColor {
        section: &'static str,
        key: String,
        channels: usize,
    },
}

#[derive(Debug, Deserialize)]
struct PaletteFile {
    #[serde(default)]
    tiles: BTreeMap<String, PaletteEntryDef>,
    #[serde(default)]
    walls: BTreeMap<String, PaletteEntryDef>,
}

#[derive(Debug, Deserialize)]
struct PaletteEntryDef {
    color: Vec<u8>,
    name: String,
}

pub fn load_palette(path: &Path) -> Result<Palette, PaletteError> {
    let raw = fs::read_to_string(path).map_err(|source| PaletteError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_palette_json(&raw)
}

/// Palette bundled with the crate, used when no palette file is configured.
pub fn default_palette() -> Result<Palette, PaletteError> {
    parse_palette_json(DEFAULT_PALETTE_JSON)
}

pub fn parse_palette_json(raw: &str) -> Result<Palette, PaletteError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file = serde_path_to_error::deserialize::<_, PaletteFile>(&mut deserializer).map_err(
        |error| {
            let path = error.path().to_string();
            PaletteError::Parse {
                json_path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        },
    )?;

    let mut palette = Palette::new();
    insert_section(&mut palette, "tiles", file.tiles, PaletteKey::block)?;
    insert_section(&mut palette, "walls", file.walls, PaletteKey::wall)?;
    Ok(palette)
}

fn insert_section(
    palette: &mut Palette,
    section: &'static str,
    entries: BTreeMap<String, PaletteEntryDef>,
    make_key: fn(u16) -> PaletteKey,
) -> Result<(), PaletteError> {
    for (raw_key, def) in entries {
        let Ok(id) = raw_key.parse::<u16>() else {
            debug!(section, key = raw_key.as_str(), "palette_key_not_numeric");
            continue;
        };
        let color = parse_color(&def.color).ok_or_else(|| PaletteError::InvalidColor {
            section,
            key: raw_key.clone(),
            channels: def.color.len(),
        })?;
        palette.insert(
            make_key(id),
            PaletteEntry {
                color,
                name: def.name,
            },
        );
    }
    Ok(())
}

fn parse_color(channels: &[u8]) -> Option<[u8; 4]> {
    match *channels {
        [r, g, b] => Some([r, g, b, 255]),
        [r, g, b, a] => Some([r, g, b, a]),
        _ => None,
    }
}
