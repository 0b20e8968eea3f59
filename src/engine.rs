// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time engine: validates a request, lays the sample grid
//! over the window, and drives a pool of scoped worker threads over
//! it.
//!
//! The result grid is cut into bands of whole rows.  Workers pull the
//! next band off a shared queue, so a band full of slow interior
//! points doesn't hold up the others, and each worker writes only to
//! the band it holds.  Nothing else is shared and nothing is locked
//! except the queue itself.

use log::{debug, trace};
use num::Complex;
use std::iter::Enumerate;
use std::slice::ChunksMut;
use std::sync::Mutex;
use std::time::Instant;

use crate::cancel::CancelToken;
use crate::errors::EngineError;
use crate::grid::{ResultGrid, CANCELLED};
use crate::planes::{Resolution, SampleGrid, Window};
use crate::rules::{IterationRule, Variant};
use crate::strategy::{BandEvaluator, Strategy};

type BandQueue<'a> = Mutex<Enumerate<ChunksMut<'a, u32>>>;

/// The largest iteration budget the engine accepts.  One less than
/// the cancelled sentinel.
pub const MAX_ITERATIONS: u32 = CANCELLED - 1;

/// Rejects a zero budget, and one that would collide with `CANCELLED`.
pub fn validate_iterations(max_iter: u32) -> Result<(), EngineError> {
    if max_iter == 0 || max_iter > MAX_ITERATIONS {
        return Err(EngineError::InvalidIterations {
            given: max_iter,
            max: MAX_ITERATIONS,
        });
    }
    Ok(())
}

/// How an evaluation is carried out.  None of these settings change
/// the numbers that come out, only how fast they arrive and whether
/// they arrive at all.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    strategy: Strategy,
    threads: usize,
    rows_per_band: usize,
    cancel: CancelToken,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            strategy: Strategy::default(),
            threads: num_cpus::get(),
            rows_per_band: 16,
            cancel: CancelToken::new(),
        }
    }
}

impl EngineConfig {
    /// Which evaluator fills the bands.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Worker count.  Zero is treated as one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Band height, in rows.  Zero is treated as one; anything taller
    /// than the grid makes a single band.
    pub fn rows_per_band(mut self, rows: usize) -> Self {
        self.rows_per_band = rows.max(1);
        self
    }

    /// A token the caller can trip to abandon the evaluation.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Evaluates grids.  Holds configuration only; every call builds and
/// drops its own grids.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// An engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates one of the built-in variants.
    pub fn evaluate(
        &self,
        window: Window,
        resolution: Resolution,
        variant: Variant,
        max_iter: u32,
    ) -> Result<ResultGrid, EngineError> {
        variant.validate()?;
        debug!("Evaluating {} over {:?}", variant, window);
        self.evaluate_with(window, resolution, &variant, max_iter)
    }

    /// Evaluates an arbitrary rule.  Fails only on a bad `max_iter` or
    /// a panicking worker; window and resolution are valid by
    /// construction.
    pub fn evaluate_with<R: IterationRule + ?Sized>(
        &self,
        window: Window,
        resolution: Resolution,
        rule: &R,
        max_iter: u32,
    ) -> Result<ResultGrid, EngineError> {
        validate_iterations(max_iter)?;
        let started = Instant::now();
        let samples = SampleGrid::new(window, resolution);
        let cells = self.run(&self.config.strategy, rule, &samples, max_iter)?;
        let grid = ResultGrid::new(resolution.width(), resolution.height(), max_iter, cells);
        debug!(
            "Evaluated {}x{} ({} iterations) in {:?}; {} cells bounded, {} cancelled",
            resolution.width(),
            resolution.height(),
            max_iter,
            started.elapsed(),
            grid.bounded_count(),
            grid.cancelled_count()
        );
        Ok(grid)
    }

    /// Splits the grid into bands and runs `strategy` over them on the
    /// pool.  Cells of bands no worker reaches stay `CANCELLED`.
    fn run<S, R>(
        &self,
        strategy: &S,
        rule: &R,
        samples: &SampleGrid,
        max_iter: u32,
    ) -> Result<Vec<u32>, EngineError>
    where
        S: BandEvaluator,
        R: IterationRule + ?Sized,
    {
        let width = samples.resolution().width();
        let height = samples.resolution().height();
        let rows_per_band = self.config.rows_per_band.min(height);
        let band_len = rows_per_band * width;
        let bands = (height + rows_per_band - 1) / rows_per_band;
        let threads = self.config.threads.min(bands).max(1);
        let cancel = &self.config.cancel;
        debug!(
            "{} strategy, {} bands of up to {} rows, {} threads",
            self.config.strategy, bands, rows_per_band, threads
        );

        let mut cells = vec![CANCELLED; samples.resolution().len()];
        {
            let inputs: &[Complex<f64>] = samples.as_slice();
            let queue: BandQueue = Mutex::new(cells.chunks_mut(band_len).enumerate());
            let queue = &queue;
            crossbeam::scope(|spawner| {
                for _ in 0..threads {
                    spawner.spawn(move |_| loop {
                        let band = match queue.lock() {
                            Ok(mut pending) => pending.next(),
                            Err(_) => None,
                        };
                        match band {
                            Some((index, out)) => {
                                let start = index * band_len;
                                trace!("Band {} (rows from {})", index, start / width);
                                strategy.evaluate_band(
                                    rule,
                                    &inputs[start..start + out.len()],
                                    out,
                                    max_iter,
                                    cancel,
                                );
                            }
                            None => {
                                break;
                            }
                        }
                    });
                }
            })
            .map_err(|_| EngineError::WorkerPanicked)?;
        }
        Ok(cells)
    }
}

/// Evaluates a variant with the default configuration: masked
/// strategy, one worker per CPU, no cancellation.
pub fn evaluate(
    window: Window,
    resolution: Resolution,
    variant: Variant,
    max_iter: u32,
) -> Result<ResultGrid, EngineError> {
    Engine::default().evaluate(window, resolution, variant, max_iter)
}
