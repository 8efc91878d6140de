use crate::camera::{Camera, Vec2};
use crate::palette::Palette;
use crate::world::{GridAccessor, Layer, LiquidKind};

pub const EMPTY_CELL_NAME: &str = "Air Block";

/// What is visually on top of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Block(u16),
    Liquid(LiquidKind),
    Wall(u16),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub cell_x: u32,
    pub cell_y: u32,
    pub target: HoverTarget,
    pub name: String,
}

/// Resolves the cell under `screen` and names its top layer.
/// Returns `None` when the point maps outside the world.
pub fn resolve_hover(
    screen: Vec2,
    camera: &Camera,
    grid: &dyn GridAccessor,
    palette: &Palette,
) -> Option<HoverInfo> {
    let (x, y) = camera.screen_to_cell(screen);
    if !grid.contains(x, y) {
        return None;
    }
    let (cell_x, cell_y) = (x as u32, y as u32);
    let cell = grid.cell(cell_x, cell_y);

    let (target, name) = match cell.top_layer() {
        Some((layer, key)) => {
            let target = match layer {
                Layer::Block => HoverTarget::Block(key.id),
                Layer::Liquid => HoverTarget::Liquid(cell.liquid),
                Layer::Wall => HoverTarget::Wall(key.id),
            };
            (target, palette.name_of(key).into_owned())
        }
        None => (HoverTarget::Empty, EMPTY_CELL_NAME.to_string()),
    };

    Some(HoverInfo {
        cell_x,
        cell_y,
        target,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{PaletteEntry, PaletteKey};
    use crate::world::{Cell, DenseGrid};

    fn palette() -> Palette {
        let mut palette = Palette::new();
        palette.insert(
            PaletteKey::liquid(LiquidKind::WATER),
            PaletteEntry {
                color: [9, 61, 191, 255],
                name: "Water".to_string(),
            },
        );
        palette.insert(
            PaletteKey::wall(5),
            PaletteEntry {
                color: [50, 40, 30, 255],
                name: "Wood Wall".to_string(),
            },
        );
        palette.insert(
            PaletteKey::block(1),
            PaletteEntry {
                color: [128, 128, 128, 255],
                name: "Stone".to_string(),
            },
        );
        palette
    }

    fn grid() -> DenseGrid {
        DenseGrid::from_fn(6, 4, (0, 0), |x, y| match (x, y) {
            (0, 0) => Cell::block(1).with_wall(5).with_liquid(LiquidKind::WATER),
            (1, 0) => Cell::EMPTY.with_wall(5).with_liquid(LiquidKind::WATER),
            (2, 0) => Cell::EMPTY.with_wall(5),
            (3, 0) => Cell::block(77),
            (4, 0) => Cell::EMPTY.with_wall(99),
            _ => Cell::EMPTY,
        })
        .expect("grid")
    }

    #[test]
    fn cell_corner_maps_to_cell_at_zero_offset() {
        let grid = grid();
        let palette = palette();
        for tile_size in [2, 7, 16, 32] {
            let camera = Camera::new(Vec2::ZERO, tile_size);
            for y in 0..4 {
                for x in 0..6 {
                    let screen = Vec2::new((x * tile_size) as f32, (y * tile_size) as f32);
                    let info = resolve_hover(screen, &camera, &grid, &palette).expect("in bounds");
                    assert_eq!((info.cell_x, info.cell_y), (x, y));
                }
            }
        }
    }

    #[test]
    fn classification_follows_visual_top_layer() {
        let grid = grid();
        let palette = palette();
        let camera = Camera::new(Vec2::ZERO, 10);
        let at = |x: u32| {
            resolve_hover(Vec2::new(x as f32 * 10.0 + 5.0, 5.0), &camera, &grid, &palette)
                .expect("in bounds")
        };

        assert_eq!(at(0).target, HoverTarget::Block(1));
        assert_eq!(at(0).name, "Stone");

        let water = at(1);
        assert_eq!(water.target, HoverTarget::Liquid(LiquidKind::WATER));
        assert_eq!(water.name, "Water");

        assert_eq!(at(2).target, HoverTarget::Wall(5));
        assert_eq!(at(2).name, "Wood Wall");

        assert_eq!(at(3).name, "Tile 77");
        assert_eq!(at(4).name, "Wall 99");

        assert_eq!(at(5).target, HoverTarget::Empty);
        assert_eq!(at(5).name, EMPTY_CELL_NAME);
    }

    #[test]
    fn offset_shifts_resolved_cell() {
        let grid = grid();
        let camera = Camera::new(Vec2::new(24.0, 8.0), 8);
        let info = resolve_hover(Vec2::new(1.0, 1.0), &camera, &grid, &palette()).expect("hit");
        assert_eq!((info.cell_x, info.cell_y), (3, 1));
    }

    #[test]
    fn outside_world_is_no_selection() {
        let grid = grid();
        let palette = palette();
        let camera = Camera::new(Vec2::ZERO, 16);
        assert!(resolve_hover(Vec2::new(6.0 * 16.0, 0.0), &camera, &grid, &palette).is_none());
        assert!(resolve_hover(Vec2::new(0.0, 4.0 * 16.0), &camera, &grid, &palette).is_none());
        assert!(resolve_hover(Vec2::new(-1.0, 0.0), &camera, &grid, &palette).is_none());
    }
}
