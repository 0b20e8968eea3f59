#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal engine
//!
//! The Mandelbrot set, its Julia sets and the Burning Ship are all
//! drawn the same way: take a point on the complex plane, run a
//! quadratic recurrence from it, and count how many steps it takes
//! for the orbit to leave the circle of radius 2.  Points that never
//! leave within the iteration budget are "in the set."
//!
//! This crate does the counting and nothing else.  Give it a window on
//! the complex plane, a resolution, a variant and an iteration budget,
//! and it hands back a grid of counts, one per sample, in
//! `[0, max_iter]`.  Turning those counts into colors is somebody
//! else's job.
//!
//! ```no_run
//! use escapetime::{evaluate, Resolution, Variant, Window};
//!
//! let window = Window::new(-2.0, 0.5, -1.25, 1.25).unwrap();
//! let resolution = Resolution::new(800, 800).unwrap();
//! let grid = evaluate(window, resolution, Variant::Mandelbrot, 256).unwrap();
//! assert_eq!(grid.max_iter(), 256);
//! ```
//!
//! The work is split across threads by bands of rows, and each band is
//! filled by one of two strategies: the scalar loop, which runs each
//! point to completion, or the masked loop, which advances a whole
//! band one step at a time.  They produce identical grids.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod cancel;
pub mod engine;
pub mod errors;
pub mod grid;
pub mod masked;
pub mod orbit;
pub mod planes;
pub mod rules;
pub mod scalar;
pub mod strategy;

pub use cancel::CancelToken;
pub use engine::{evaluate, Engine, EngineConfig, MAX_ITERATIONS};
pub use errors::EngineError;
pub use grid::{ResultGrid, CANCELLED};
pub use masked::MaskedStrategy;
pub use orbit::Orbit;
pub use planes::{Pixel, Resolution, SampleGrid, Window, MAX_SAMPLES};
pub use rules::{BurningShip, IterationRule, Julia, JuliaPreset, Mandelbrot, Variant};
pub use scalar::{escape_time, ScalarStrategy};
pub use strategy::{BandEvaluator, Strategy};
