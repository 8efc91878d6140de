use crate::palette::PaletteKey;

/// Liquid code as stored in the world: 0 none, 1 water, 2 lava, 3 honey, 4 shimmer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LiquidKind(pub u8);

impl LiquidKind {
    pub const NONE: Self = Self(0);
    pub const WATER: Self = Self(1);
    pub const LAVA: Self = Self(2);
    pub const HONEY: Self = Self(3);
    pub const SHIMMER: Self = Self(4);

    pub fn is_present(self) -> bool {
        self.0 > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub block: Option<u16>,
    pub wall: Option<u16>,
    pub liquid: LiquidKind,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        block: None,
        wall: None,
        liquid: LiquidKind::NONE,
    };

    pub fn block(id: u16) -> Self {
        Self {
            block: Some(id),
            ..Self::EMPTY
        }
    }

    pub fn with_wall(mut self, id: u16) -> Self {
        self.wall = Some(id);
        self
    }

    pub fn with_liquid(mut self, liquid: LiquidKind) -> Self {
        self.liquid = liquid;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none() && self.wall.is_none() && !self.liquid.is_present()
    }

    /// Topmost visible layer, i.e. the last entry of [`DRAW_ORDER`] present in this cell.
    pub fn top_layer(&self) -> Option<(Layer, PaletteKey)> {
        DRAW_ORDER
            .iter()
            .rev()
            .find_map(|layer| layer.palette_key(self).map(|key| (*layer, key)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Wall,
    Liquid,
    Block,
}

/// Back-to-front paint order. Later layers occlude earlier ones.
pub const DRAW_ORDER: [Layer; 3] = [Layer::Wall, Layer::Liquid, Layer::Block];

impl Layer {
    pub fn palette_key(self, cell: &Cell) -> Option<PaletteKey> {
        match self {
            Layer::Wall => cell.wall.map(PaletteKey::wall),
            Layer::Liquid => cell
                .liquid
                .is_present()
                .then(|| PaletteKey::liquid(cell.liquid)),
            Layer::Block => cell.block.map(PaletteKey::block),
        }
    }
}
