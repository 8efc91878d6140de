//! Deterministic procedural world used in place of a parsed save file.

use mapview_engine::{Cell, DenseGrid, GridError, LiquidKind};
use noise::{NoiseFn, Perlin};

const DIRT: u16 = 0;
const STONE: u16 = 1;
const GRASS: u16 = 2;
const IRON: u16 = 6;
const COPPER: u16 = 7;
const GOLD: u16 = 8;
const SILVER: u16 = 9;
const CLAY: u16 = 40;
const SAND: u16 = 53;
const EBONSTONE: u16 = 57;
const MUD: u16 = 59;
const JUNGLE_GRASS: u16 = 60;

const STONE_WALL: u16 = 1;
const DIRT_WALL: u16 = 2;
const MUD_WALL: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DemoWorldConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
}

impl Default for DemoWorldConfig {
    fn default() -> Self {
        Self {
            width: 4200,
            height: 1200,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Biome {
    Forest,
    Jungle,
    Corruption,
    Ocean,
}

/// One Perlin field per concern.
struct NoiseSet {
    hills: Perlin,
    detail: Perlin,
    soil: Perlin,
    clay: Perlin,
    cave: Perlin,
    tunnel: Perlin,
    ore: Perlin,
    ore_kind: Perlin,
    pool: Perlin,
}

impl NoiseSet {
    fn new(seed: u64) -> Self {
        let base = (seed ^ (seed >> 32)) as u32;
        let field = |salt: u32| Perlin::new(base.wrapping_add(salt.wrapping_mul(0x9e37_79b9)));
        Self {
            hills: field(1),
            detail: field(2),
            soil: field(3),
            clay: field(4),
            cave: field(5),
            tunnel: field(6),
            ore: field(7),
            ore_kind: field(8),
            pool: field(9),
        }
    }
}

/// Perlin output remapped from `[-1, 1]` to `[0, 1]`.
///
/// Lattice points always sample to zero, so coordinates are nudged off the grid.
fn sample(noise: &Perlin, x: f64, y: f64) -> f32 {
    let value = noise.get([x + 0.31, y + 0.17]);
    ((value + 1.0) * 0.5).clamp(0.0, 1.0) as f32
}

struct Terrain {
    config: DemoWorldConfig,
    noise: NoiseSet,
    surface: Vec<u32>,
    sea_level: u32,
    cavern_top: u32,
    underworld_top: u32,
}

pub(crate) fn generate(config: DemoWorldConfig) -> Result<DenseGrid, GridError> {
    let terrain = Terrain::new(config);
    let spawn_x = config.width / 2;
    let spawn = (
        spawn_x,
        terrain.surface_at(spawn_x).saturating_sub(1).min(config.height.saturating_sub(1)),
    );
    DenseGrid::from_fn(config.width, config.height, spawn, |x, y| terrain.cell(x, y))
}

impl Terrain {
    fn new(config: DemoWorldConfig) -> Self {
        let noise = NoiseSet::new(config.seed);
        let height = config.height as f32;
        let base = height * 0.28;
        let amplitude = (height * 0.06).max(1.0);
        let surface = (0..config.width)
            .map(|x| {
                let rolling = sample(&noise.hills, f64::from(x) / 96.0, 0.0);
                let detail = sample(&noise.detail, f64::from(x) / 17.0, 0.0);
                let offset = (rolling - 0.5) * 2.0 * amplitude + (detail - 0.5) * 4.0;
                (base + offset).clamp(1.0, (height - 1.0).max(1.0)) as u32
            })
            .collect();
        Self {
            config,
            noise,
            surface,
            sea_level: (base - amplitude * 0.5).max(0.0) as u32,
            cavern_top: (height * 0.45) as u32,
            underworld_top: (height * 0.88) as u32,
        }
    }

    fn surface_at(&self, x: u32) -> u32 {
        self.surface.get(x as usize).copied().unwrap_or(0)
    }

    fn biome(&self, x: u32) -> Biome {
        let t = x as f32 / self.config.width.max(1) as f32;
        if !(0.05..=0.95).contains(&t) {
            Biome::Ocean
        } else if (0.62..0.78).contains(&t) {
            Biome::Jungle
        } else if (0.18..0.27).contains(&t) {
            Biome::Corruption
        } else {
            Biome::Forest
        }
    }

    fn cell(&self, x: u32, y: u32) -> Cell {
        let surface = self.surface_at(x);
        let biome = self.biome(x);

        if y < surface {
            if biome == Biome::Ocean && y >= self.sea_level {
                return Cell::EMPTY.with_liquid(LiquidKind::WATER);
            }
            return Cell::EMPTY;
        }

        let depth = y - surface;
        let (fx, fy) = (f64::from(x), f64::from(y));

        let dirt_depth = 10 + (sample(&self.noise.soil, fx / 8.0, 0.0) * 8.0) as u32;
        let (block, wall) = match biome {
            Biome::Ocean => (SAND, None),
            Biome::Jungle if depth == 0 => (JUNGLE_GRASS, None),
            Biome::Jungle => (MUD, Some(MUD_WALL)),
            Biome::Corruption if depth < dirt_depth => (DIRT, Some(DIRT_WALL)),
            Biome::Corruption => (EBONSTONE, Some(STONE_WALL)),
            Biome::Forest if depth == 0 => (GRASS, None),
            Biome::Forest if depth < dirt_depth => (DIRT, Some(DIRT_WALL)),
            Biome::Forest => (STONE, Some(STONE_WALL)),
        };

        let mut cell = Cell {
            block: Some(block),
            wall,
            liquid: LiquidKind::NONE,
        };

        if block == STONE {
            cell.block = Some(self.ore_or(STONE, x, y));
        } else if block == DIRT && sample(&self.noise.clay, fx / 9.0, fy / 5.0) > 0.72 {
            cell.block = Some(CLAY);
        }

        let cave_floor = surface.saturating_add(6);
        if y > cave_floor {
            let cave = sample(&self.noise.cave, fx / 22.0, fy / 14.0);
            let tunnel = sample(&self.noise.tunnel, fx / 7.0, fy / 7.0);
            if cave * 0.8 + tunnel * 0.2 > 0.6 {
                cell.block = None;
                cell.liquid = self.cave_liquid(x, y);
            }
        }

        cell
    }

    fn ore_or(&self, fallback: u16, x: u32, y: u32) -> u16 {
        let (fx, fy) = (f64::from(x), f64::from(y));
        if sample(&self.noise.ore, fx / 4.0, fy / 4.0) < 0.74 {
            return fallback;
        }
        let deep = y >= self.cavern_top;
        let kind = sample(&self.noise.ore_kind, fx / 12.0, fy / 12.0);
        match (kind * 4.0) as u32 {
            0 => COPPER,
            1 => IRON,
            2 if deep => GOLD,
            3 | 4 if deep => SILVER,
            _ => fallback,
        }
    }

    fn cave_liquid(&self, x: u32, y: u32) -> LiquidKind {
        let pool = sample(&self.noise.pool, f64::from(x) / 30.0, f64::from(y) / 30.0);
        if pool < 0.55 {
            return LiquidKind::NONE;
        }
        if y >= self.underworld_top {
            return LiquidKind::LAVA;
        }
        match self.biome(x) {
            Biome::Jungle if pool > 0.68 => LiquidKind::HONEY,
            _ if y >= self.cavern_top && pool > 0.8 => LiquidKind::SHIMMER,
            _ if y >= self.cavern_top && pool > 0.74 => LiquidKind::LAVA,
            _ => LiquidKind::WATER,
        }
    }
}
