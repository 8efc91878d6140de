use std::collections::HashMap;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use crate::palette::Palette;
use crate::world::GridAccessor;

use super::worker::RasterResult;
use super::{rasterize_chunk, ChunkSurface, RasterWorkers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub tile_size: u32,
    pub chunk_x: i32,
    pub chunk_y: i32,
}

impl ChunkKey {
    pub fn new(tile_size: u32, chunk_x: i32, chunk_y: i32) -> Self {
        Self {
            tile_size,
            chunk_x,
            chunk_y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub bytes: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    pub rasterizations: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub stale_drops: u64,
}

#[derive(Debug)]
struct CachedChunk {
    surface: Arc<ChunkSurface>,
    last_used_frame: u64,
}

/// Rasterized chunks keyed by (tile_size, chunk_x, chunk_y).
///
/// Without workers every miss rasterizes synchronously. With [`RasterWorkers`]
/// attached, [`ChunkCache::fetch`] schedules misses in the background and keeps at most
/// one job per key in flight; results issued before the last [`ChunkCache::invalidate_all`]
/// are discarded on arrival.
///
/// The optional byte budget evicts least recently used entries, but never an entry
/// touched during the current frame.
pub struct ChunkCache {
    grid: Arc<dyn GridAccessor>,
    palette: Arc<Palette>,
    entries: LruCache<ChunkKey, CachedChunk>,
    /// Generation each outstanding job was submitted under.
    in_flight: HashMap<ChunkKey, u64>,
    workers: Option<RasterWorkers>,
    byte_budget: Option<usize>,
    bytes: usize,
    frame: u64,
    generation: u64,
    stats: CacheStats,
}

impl ChunkCache {
    pub fn new(grid: Arc<dyn GridAccessor>, palette: Arc<Palette>) -> Self {
        Self {
            grid,
            palette,
            entries: LruCache::unbounded(),
            in_flight: HashMap::new(),
            workers: None,
            byte_budget: None,
            bytes: 0,
            frame: 0,
            generation: 0,
            stats: CacheStats::default(),
        }
    }

    pub fn with_byte_budget(mut self, byte_budget: Option<usize>) -> Self {
        self.byte_budget = byte_budget;
        self
    }

    pub fn with_workers(mut self, workers: RasterWorkers) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn grid(&self) -> &dyn GridAccessor {
        self.grid.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn is_async(&self) -> bool {
        self.workers.is_some()
    }

    pub fn get_or_create(&mut self, chunk_x: i32, chunk_y: i32, tile_size: u32) -> Arc<ChunkSurface> {
        let key = ChunkKey::new(tile_size, chunk_x, chunk_y);
        if let Some(surface) = self.touch(key) {
            self.stats.hits += 1;
            return surface;
        }
        self.stats.misses += 1;
        self.stats.rasterizations += 1;
        let surface = Arc::new(rasterize_chunk(self.grid.as_ref(), &self.palette, key));
        self.store(key, Arc::clone(&surface));
        surface
    }

    /// Ready surface for `key`, or `None` while it is being rasterized in the background.
    pub fn fetch(&mut self, key: ChunkKey) -> Option<Arc<ChunkSurface>> {
        if self.workers.is_none() {
            return Some(self.get_or_create(key.chunk_x, key.chunk_y, key.tile_size));
        }
        if let Some(surface) = self.touch(key) {
            self.stats.hits += 1;
            return Some(surface);
        }
        // A job from before the last invalidation will be dropped on arrival.
        if self.in_flight.get(&key) == Some(&self.generation) {
            return None;
        }
        self.in_flight.insert(key, self.generation);
        self.stats.misses += 1;
        if let Some(workers) = self.workers.as_ref() {
            workers.submit(
                Arc::clone(&self.grid),
                Arc::clone(&self.palette),
                key,
                self.generation,
            );
        }
        None
    }

    /// Advances the LRU clock, trims last frame's overshoot and stores finished
    /// background work.
    pub fn begin_frame(&mut self) -> usize {
        self.frame += 1;
        self.enforce_budget();
        self.collect_finished()
    }

    pub fn collect_finished(&mut self) -> usize {
        let Some(workers) = self.workers.as_ref() else {
            return 0;
        };
        let finished: Vec<RasterResult> = workers.finished().collect();
        let mut stored = 0;
        for result in finished {
            if self.in_flight.get(&result.key) == Some(&result.generation) {
                self.in_flight.remove(&result.key);
            }
            self.stats.rasterizations += 1;
            if result.generation != self.generation {
                self.stats.stale_drops += 1;
                continue;
            }
            self.store(result.key, Arc::new(result.surface));
            stored += 1;
        }
        stored
    }

    pub fn invalidate_all(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.bytes = 0;
        self.generation += 1;
        self.stats.invalidations += 1;
        debug!(
            dropped,
            generation = self.generation,
            in_flight = self.in_flight.len(),
            "cache_invalidated"
        );
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.entries.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            bytes: self.bytes,
            in_flight: self.in_flight.len(),
            ..self.stats
        }
    }

    fn touch(&mut self, key: ChunkKey) -> Option<Arc<ChunkSurface>> {
        let frame = self.frame;
        self.entries.get_mut(&key).map(|entry| {
            entry.last_used_frame = frame;
            Arc::clone(&entry.surface)
        })
    }

    fn store(&mut self, key: ChunkKey, surface: Arc<ChunkSurface>) {
        self.bytes += surface.byte_len();
        let entry = CachedChunk {
            surface,
            last_used_frame: self.frame,
        };
        if let Some(previous) = self.entries.put(key, entry) {
            self.bytes -= previous.surface.byte_len();
        }
        self.enforce_budget();
    }

    fn enforce_budget(&mut self) {
        let Some(budget) = self.byte_budget else {
            return;
        };
        // Recency order matches `last_used_frame`, so stop at the first entry from this frame.
        while self.bytes > budget {
            match self.entries.peek_lru() {
                Some((_, entry)) if entry.last_used_frame < self.frame => {}
                _ => break,
            }
            if let Some((_, entry)) = self.entries.pop_lru() {
                self.bytes -= entry.surface.byte_len();
                self.stats.evictions += 1;
            }
        }
    }
}

impl std::fmt::Debug for ChunkCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkCache")
            .field("grid_size", &self.grid.size())
            .field("entries", &self.entries.len())
            .field("bytes", &self.bytes)
            .field("byte_budget", &self.byte_budget)
            .field("generation", &self.generation)
            .field("workers", &self.workers)
            .finish()
    }
}
