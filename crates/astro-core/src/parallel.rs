//! Row-partitioned parallel loops.
//!
//! Elementwise transforms (grayscale and color-space conversion, per-sample
//! processes, geometric resampling) split their output into rows and hand
//! disjoint row ranges to worker threads. Each output sample depends only
//! on input samples, never on sibling outputs, so any partitioning gives
//! identical results.
//!
//! The thread count is an explicit [`ParallelConfig`] passed by the caller.
//! A config with two or more threads owns its worker pool: the pool is
//! built once when the config is constructed and shared by its clones, so
//! build the config once and pass it to every call.
//!
//! ```rust
//! use astro_core::ParallelConfig;
//!
//! let parallel = ParallelConfig::default();
//! let mut data = vec![0u32; 4 * 8];
//! parallel.for_each_row_mut(&mut data, 8, |row, out| {
//!     out.fill(row as u32);
//! });
//! assert_eq!(data[8 * 3], 3);
//! ```

use rayon::prelude::*;
use rayon::ThreadPool;
use std::fmt;
use std::sync::Arc;

/// Default worker count for elementwise transforms.
pub const DEFAULT_THREADS: usize = 2;

const DEFAULT_MIN_ROWS: usize = 16;

/// Threading parameters for row-partitioned loops.
///
/// `threads == 1` runs on the calling thread, `threads == 0` uses rayon's
/// global pool, and any larger count runs on a pool owned by the config.
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "ParallelSettings", into = "ParallelSettings")
)]
pub struct ParallelConfig {
    threads: usize,
    min_rows_per_task: usize,
    pool: Option<Arc<ThreadPool>>,
}

/// Serialized form of a [`ParallelConfig`]; the pool is rebuilt on load.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ParallelSettings {
    threads: usize,
    min_rows_per_task: usize,
}

#[cfg(feature = "serde")]
impl From<ParallelSettings> for ParallelConfig {
    fn from(s: ParallelSettings) -> Self {
        Self::with_threads(s.threads).with_min_rows_per_task(s.min_rows_per_task)
    }
}

#[cfg(feature = "serde")]
impl From<ParallelConfig> for ParallelSettings {
    fn from(c: ParallelConfig) -> Self {
        Self {
            threads: c.threads,
            min_rows_per_task: c.min_rows_per_task,
        }
    }
}

impl Default for ParallelConfig {
    /// [`DEFAULT_THREADS`] workers on a freshly built pool.
    fn default() -> Self {
        Self::with_threads(DEFAULT_THREADS)
    }
}

impl fmt::Debug for ParallelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelConfig")
            .field("threads", &self.threads)
            .field("min_rows_per_task", &self.min_rows_per_task)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

impl PartialEq for ParallelConfig {
    fn eq(&self, other: &Self) -> bool {
        self.threads == other.threads && self.min_rows_per_task == other.min_rows_per_task
    }
}

impl Eq for ParallelConfig {}

impl ParallelConfig {
    /// Configuration that never leaves the calling thread.
    pub const fn sequential() -> Self {
        Self {
            threads: 1,
            min_rows_per_task: 1,
            pool: None,
        }
    }

    /// Configuration running on rayon's global pool.
    pub const fn global() -> Self {
        Self {
            threads: 0,
            min_rows_per_task: DEFAULT_MIN_ROWS,
            pool: None,
        }
    }

    /// Configuration with a fixed worker count.
    ///
    /// For two or more threads this builds the worker pool. If the pool
    /// cannot be built, loops run on the calling thread.
    pub fn with_threads(threads: usize) -> Self {
        let pool = if threads >= 2 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("astro-worker-{i}"))
                .build()
                .ok()
                .map(Arc::new)
        } else {
            None
        };
        Self {
            threads,
            min_rows_per_task: if threads == 1 { 1 } else { DEFAULT_MIN_ROWS },
            pool,
        }
    }

    /// Sets the minimum number of rows handed to one task.
    pub fn with_min_rows_per_task(mut self, rows: usize) -> Self {
        self.min_rows_per_task = rows.max(1);
        self
    }

    /// Requested worker count.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Minimum number of rows handed to one task.
    #[inline]
    pub fn min_rows_per_task(&self) -> usize {
        self.min_rows_per_task
    }

    /// Whether loops run on more than one thread.
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.threads == 0 || self.pool.is_some()
    }

    /// Calls `f(row_index, row)` for every `row_len`-sized row of `data`.
    ///
    /// Rows are numbered from the start of `data`, so for a planar image the
    /// index runs across planes: `channel * rows + y`.
    pub fn for_each_row_mut<T, F>(&self, data: &mut [T], row_len: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if row_len == 0 || data.is_empty() {
            return;
        }
        if !self.is_parallel() {
            for (i, row) in data.chunks_mut(row_len).enumerate() {
                f(i, row);
            }
            return;
        }

        let rows_per_task = self.min_rows_per_task.max(1);
        let run = |data: &mut [T]| {
            data.par_chunks_mut(row_len * rows_per_task)
                .enumerate()
                .for_each(|(task, chunk)| {
                    for (j, row) in chunk.chunks_mut(row_len).enumerate() {
                        f(task * rows_per_task + j, row);
                    }
                });
        };

        match &self.pool {
            Some(pool) => pool.install(|| run(data)),
            None => run(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_rows_visited_once() {
        for cfg in [
            ParallelConfig::sequential(),
            ParallelConfig::default(),
            ParallelConfig::with_threads(3).with_min_rows_per_task(1),
            ParallelConfig::global().with_min_rows_per_task(5),
        ] {
            let mut data = vec![0usize; 37 * 5];
            cfg.for_each_row_mut(&mut data, 5, |row, out| {
                for v in out.iter_mut() {
                    *v += row + 1;
                }
            });
            for (i, chunk) in data.chunks(5).enumerate() {
                assert!(chunk.iter().all(|&v| v == i + 1), "{cfg:?}");
            }
        }
    }

    #[test]
    fn test_empty() {
        let mut data: Vec<u8> = vec![];
        ParallelConfig::default().for_each_row_mut(&mut data, 4, |_, _| panic!("no rows"));
    }

    #[test]
    fn test_pool_built_once_and_shared() {
        let cfg = ParallelConfig::with_threads(3).with_min_rows_per_task(1);
        let copy = cfg.clone();
        let (a, b) = (cfg.pool.as_ref().unwrap(), copy.pool.as_ref().unwrap());
        assert!(Arc::ptr_eq(a, b));

        // every call lands on the same workers
        let seen = Mutex::new(HashSet::new());
        for _ in 0..20 {
            let mut data = vec![0u8; 64 * 4];
            cfg.for_each_row_mut(&mut data, 4, |_, _| {
                assert_eq!(rayon::current_num_threads(), 3);
                let name = std::thread::current().name().map(str::to_owned);
                seen.lock().unwrap().insert(name);
            });
        }
        let seen = seen.into_inner().unwrap();
        assert!(seen.len() <= 3, "{seen:?}");
        assert!(seen.iter().all(|n| n.as_deref().is_some_and(|n| n.starts_with("astro-worker-"))));
    }

    #[test]
    fn test_sequential_and_global_have_no_pool() {
        assert!(ParallelConfig::sequential().pool.is_none());
        assert!(!ParallelConfig::sequential().is_parallel());
        assert!(ParallelConfig::global().pool.is_none());
        assert!(ParallelConfig::global().is_parallel());
        assert_eq!(ParallelConfig::default().threads(), DEFAULT_THREADS);
        assert_eq!(ParallelConfig::default(), ParallelConfig::with_threads(2));
    }
}
