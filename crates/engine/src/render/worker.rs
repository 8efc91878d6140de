use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::palette::Palette;
use crate::world::GridAccessor;

use super::{rasterize_chunk, ChunkKey, ChunkSurface};

#[derive(Debug)]
pub(crate) struct RasterResult {
    pub key: ChunkKey,
    pub generation: u64,
    pub surface: ChunkSurface,
}

/// Background rasterization pool. Jobs carry the cache generation they were issued
/// under so results that outlive an invalidation can be recognised and dropped.
pub struct RasterWorkers {
    pool: ThreadPool,
    sender: Sender<RasterResult>,
    receiver: Receiver<RasterResult>,
}

impl RasterWorkers {
    /// `threads == 0` lets rayon pick one thread per logical CPU.
    pub fn new(threads: usize) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("raster-{index}"))
            .build()?;
        let (sender, receiver) = mpsc::channel();
        Ok(Self {
            pool,
            sender,
            receiver,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub(crate) fn submit(
        &self,
        grid: Arc<dyn GridAccessor>,
        palette: Arc<Palette>,
        key: ChunkKey,
        generation: u64,
    ) {
        let sender = self.sender.clone();
        self.pool.spawn(move || {
            let surface = rasterize_chunk(grid.as_ref(), &palette, key);
            // The receiver only goes away with the cache itself.
            let _ = sender.send(RasterResult {
                key,
                generation,
                surface,
            });
        });
    }

    pub(crate) fn finished(&self) -> impl Iterator<Item = RasterResult> + '_ {
        self.receiver.try_iter()
    }
}

impl std::fmt::Debug for RasterWorkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterWorkers")
            .field("threads", &self.thread_count())
            .finish()
    }
}
