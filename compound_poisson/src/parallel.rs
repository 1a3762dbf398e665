//! Chunk-parallel Monte Carlo trials
//!
//! Trials are split into fixed-size chunks and each chunk gets its own
//! seeded RNG. The chunks run on a rayon pool and are concatenated in
//! chunk order.
//!
//! # Example
//!
//! ```rust
//! use compound_poisson::engine::ParallelSimulation;
//! use compound_poisson::{ProcessParameters, SimulationRequest};
//!
//! let params = ProcessParameters::new(1.0, 1.0).unwrap();
//! let request = SimulationRequest::new(10.0, params, 20_000).unwrap();
//!
//! let samples = ParallelSimulation::new(request, 42)
//!     .num_threads(4)
//!     .chunk_size(1_000)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(samples.len(), 20_000);
//! ```
//!
//! # Determinism
//!
//! Chunk `i` is seeded with `seed + i`, so for a fixed seed and chunk size
//! the output is identical regardless of thread count or scheduling order.

use crate::engine::TrialSampler;
use crate::{SeverityMethod, SimulationError, SimulationRequest, DEFAULT_MAX_EXPECTED_DRAWS};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trials per chunk unless overridden
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Builder for a parallel simulation of one request
pub struct ParallelSimulation {
    request: SimulationRequest,
    seed: u64,
    method: SeverityMethod,
    chunk_size: usize,
    num_threads: Option<usize>,
    max_expected_draws: f64,
    progress_callback: Option<Arc<dyn Fn(usize, usize) + Send + Sync>>,
}

impl ParallelSimulation {
    pub fn new(request: SimulationRequest, seed: u64) -> Self {
        ParallelSimulation {
            request,
            seed,
            method: SeverityMethod::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            num_threads: None,
            max_expected_draws: DEFAULT_MAX_EXPECTED_DRAWS,
            progress_callback: None,
        }
    }

    pub fn method(mut self, method: SeverityMethod) -> Self {
        self.method = method;
        self
    }

    /// Trials per chunk (values below 1 are treated as 1)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set number of threads (defaults to rayon's global pool)
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Upper bound on expected random draws, checked before any chunk runs
    pub fn max_expected_draws(mut self, limit: f64) -> Self {
        self.max_expected_draws = limit;
        self
    }

    /// Called with `(completed_chunks, total_chunks)` after each chunk
    pub fn progress<P>(mut self, callback: P) -> Self
    where
        P: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn num_chunks(&self) -> usize {
        self.request.sample_count.div_ceil(self.chunk_size)
    }

    /// Execute all chunks and return the samples in chunk order
    pub fn run(self) -> Result<Vec<f64>, SimulationError> {
        self.request.check_cost(self.method, self.max_expected_draws)?;
        let sampler = TrialSampler::new(&self.request, self.method)?;

        let total = self.request.sample_count;
        let num_chunks = self.num_chunks();
        let progress_counter = AtomicUsize::new(0);

        let pool = match self.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimulationError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        let execute = || {
            (0..num_chunks)
                .into_par_iter()
                .map(|chunk_id| {
                    let start = chunk_id * self.chunk_size;
                    let len = self.chunk_size.min(total - start);
                    let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(chunk_id as u64));
                    let chunk = sampler.sample_many(len, &mut rng);

                    let completed = progress_counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback(completed, num_chunks);
                    }
                    chunk
                })
                .collect::<Result<Vec<Vec<f64>>, SimulationError>>()
        };

        let chunks = match pool {
            Some(pool) => pool.install(execute),
            None => execute(),
        }?;

        let mut samples = Vec::with_capacity(total);
        for chunk in chunks {
            samples.extend(chunk);
        }
        Ok(samples)
    }
}

/// Run a request in parallel with default chunking
pub fn simulate_parallel(
    request: &SimulationRequest,
    method: SeverityMethod,
    seed: u64,
    num_threads: Option<usize>,
) -> Result<Vec<f64>, SimulationError> {
    let mut builder = ParallelSimulation::new(*request, seed).method(method);
    if let Some(n) = num_threads {
        builder = builder.num_threads(n);
    }
    builder.run()
}
