// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type for everything that can go wrong before an
//! evaluation starts.  Once the engine is running, nothing can fail
//! except a worker thread panicking; numeric overflow is handled as
//! an escape, not an error.

use failure::Fail;

/// Configuration errors, all detected before evaluation begins.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum EngineError {
    /// One of the window bounds is NaN or infinite.
    #[fail(display = "The {} bounds must be finite, got {} and {}", axis, min, max)]
    NonFiniteBounds {
        /// "real" or "imaginary"
        axis: &'static str,
        /// The lower bound as given.
        min: f64,
        /// The upper bound as given.
        max: f64,
    },

    /// The lower bound is not strictly below the upper bound.
    #[fail(display = "The {} bounds are inverted or empty: {} is not below {}", axis, min, max)]
    InvertedBounds {
        /// "real" or "imaginary"
        axis: &'static str,
        /// The lower bound as given.
        min: f64,
        /// The upper bound as given.
        max: f64,
    },

    /// Width or height was zero.
    #[fail(display = "The resolution must be positive, got {}x{}", width, height)]
    InvalidResolution {
        /// Requested columns.
        width: usize,
        /// Requested rows.
        height: usize,
    },

    /// Width times height overflows, or exceeds the sample cap.
    #[fail(display = "The resolution {}x{} exceeds the limit of {} samples", width, height, max)]
    ResolutionTooLarge {
        /// Requested columns.
        width: usize,
        /// Requested rows.
        height: usize,
        /// The largest accepted sample count.
        max: usize,
    },

    /// The iteration budget was zero, or collided with the cancelled
    /// sentinel.
    #[fail(display = "The iteration limit must be between 1 and {}, got {}", max, given)]
    InvalidIterations {
        /// The limit as given.
        given: u32,
        /// The largest accepted limit.
        max: u32,
    },

    /// The fixed Julia constant is NaN or infinite.
    #[fail(display = "The Julia constant must be finite, got {}+{}i", re, im)]
    NonFiniteParameter {
        /// Real part.
        re: f64,
        /// Imaginary part.
        im: f64,
    },

    /// A name that doesn't match any known variant, strategy or preset.
    #[fail(display = "Unrecognized {}: '{}'", kind, name)]
    UnknownName {
        /// What we were trying to parse.
        kind: &'static str,
        /// The offending input.
        name: String,
    },

    /// One of the pool's worker threads panicked.
    #[fail(display = "A worker thread panicked during evaluation")]
    WorkerPanicked,
}
