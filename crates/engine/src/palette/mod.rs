mod loader;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::world::LiquidKind;

pub use loader::{
    default_palette, load_palette, parse_palette_json, PaletteError, DEFAULT_PALETTE_JSON,
};

/// Liquids are stored as pseudo-blocks directly after the real block id range.
pub const LIQUID_OFFSET: u16 = 692;
pub const BLOCK_FALLBACK_COLOR: [u8; 4] = [200, 200, 200, 255];
pub const WALL_FALLBACK_COLOR: [u8; 4] = [30, 30, 30, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Blocks and liquids share one id space.
    Block,
    Wall,
}

impl Namespace {
    pub fn label(self) -> &'static str {
        match self {
            Namespace::Block => "Tile",
            Namespace::Wall => "Wall",
        }
    }

    pub fn fallback_color(self) -> [u8; 4] {
        match self {
            Namespace::Block => BLOCK_FALLBACK_COLOR,
            Namespace::Wall => WALL_FALLBACK_COLOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteKey {
    pub namespace: Namespace,
    pub id: u16,
}

impl PaletteKey {
    pub fn block(id: u16) -> Self {
        Self {
            namespace: Namespace::Block,
            id,
        }
    }

    pub fn wall(id: u16) -> Self {
        Self {
            namespace: Namespace::Wall,
            id,
        }
    }

    pub fn liquid(kind: LiquidKind) -> Self {
        Self::block(LIQUID_OFFSET + u16::from(kind.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub color: [u8; 4],
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Palette {
    blocks: HashMap<u16, PaletteEntry>,
    walls: HashMap<u16, PaletteEntry>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: PaletteKey, entry: PaletteEntry) {
        self.table_mut(key.namespace).insert(key.id, entry);
    }

    pub fn entry(&self, id: u16, namespace: Namespace) -> Option<&PaletteEntry> {
        self.table(namespace).get(&id)
    }

    pub fn color_for(&self, id: u16, namespace: Namespace) -> [u8; 4] {
        self.entry(id, namespace)
            .map(|entry| entry.color)
            .unwrap_or_else(|| namespace.fallback_color())
    }

    pub fn name_for(&self, id: u16, namespace: Namespace) -> Cow<'_, str> {
        match self.entry(id, namespace) {
            Some(entry) => Cow::Borrowed(entry.name.as_str()),
            None => Cow::Owned(format!("{} {id}", namespace.label())),
        }
    }

    pub fn color_of(&self, key: PaletteKey) -> [u8; 4] {
        self.color_for(key.id, key.namespace)
    }

    pub fn name_of(&self, key: PaletteKey) -> Cow<'_, str> {
        self.name_for(key.id, key.namespace)
    }

    pub fn len(&self) -> usize {
        self.blocks.len() + self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, namespace: Namespace) -> &HashMap<u16, PaletteEntry> {
        match namespace {
            Namespace::Block => &self.blocks,
            Namespace::Wall => &self.walls,
        }
    }

    fn table_mut(&mut self, namespace: Namespace) -> &mut HashMap<u16, PaletteEntry> {
        match namespace {
            Namespace::Block => &mut self.blocks,
            Namespace::Wall => &mut self.walls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(color: [u8; 4], name: &str) -> PaletteEntry {
        PaletteEntry {
            color,
            name: name.to_string(),
        }
    }

    #[test]
    fn configured_entries_resolve() {
        let mut palette = Palette::new();
        palette.insert(PaletteKey::block(1), entry([128, 128, 128, 255], "Stone"));
        palette.insert(PaletteKey::wall(1), entry([52, 52, 52, 255], "Stone Wall"));

        assert_eq!(palette.color_for(1, Namespace::Block), [128, 128, 128, 255]);
        assert_eq!(palette.name_for(1, Namespace::Block), "Stone");
        assert_eq!(palette.color_for(1, Namespace::Wall), [52, 52, 52, 255]);
        assert_eq!(palette.name_for(1, Namespace::Wall), "Stone Wall");
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn namespaces_do_not_leak_into_each_other() {
        let mut palette = Palette::new();
        palette.insert(PaletteKey::block(4), entry([1, 2, 3, 255], "Torch"));

        assert_eq!(palette.color_for(4, Namespace::Wall), WALL_FALLBACK_COLOR);
        assert_eq!(palette.name_for(4, Namespace::Wall), "Wall 4");
    }

    #[test]
    fn unknown_ids_use_fallbacks() {
        let palette = Palette::new();
        assert!(palette.is_empty());
        assert_eq!(palette.color_for(9999, Namespace::Block), BLOCK_FALLBACK_COLOR);
        assert_eq!(palette.color_for(9999, Namespace::Wall), WALL_FALLBACK_COLOR);
        assert_eq!(palette.name_for(12, Namespace::Block), "Tile 12");
        assert_eq!(palette.name_for(7, Namespace::Wall), "Wall 7");
    }

    #[test]
    fn liquid_key_is_offset_into_block_namespace() {
        let key = PaletteKey::liquid(LiquidKind::SHIMMER);
        assert_eq!(key, PaletteKey::block(696));

        let mut palette = Palette::new();
        palette.insert(PaletteKey::block(693), entry([9, 9, 200, 255], "Water"));
        assert_eq!(palette.name_of(PaletteKey::liquid(LiquidKind::WATER)), "Water");
    }
}
