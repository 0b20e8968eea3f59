// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Execution strategies.  The engine cuts the grid into bands of rows
//! and hands each band to a `BandEvaluator`; how the evaluator walks
//! the band is its own business, but every evaluator must produce the
//! same numbers as the scalar reference.

use num::Complex;
use std::fmt;
use std::str::FromStr;

use crate::cancel::CancelToken;
use crate::errors::EngineError;
use crate::masked::MaskedStrategy;
use crate::rules::IterationRule;
use crate::scalar::ScalarStrategy;

/// Fills a band of the result grid.
pub trait BandEvaluator: Sync {
    /// `samples` and `out` are the same length.  Every cell of `out`
    /// gets either an iteration count in `[0, max_iter]` or, if the
    /// token trips first, `CANCELLED`.
    fn evaluate_band<R: IterationRule + ?Sized>(
        &self,
        rule: &R,
        samples: &[Complex<f64>],
        out: &mut [u32],
        max_iter: u32,
        cancel: &CancelToken,
    );
}

/// Run-time choice between the two built-in evaluators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// One point at a time, to completion.  The reference.
    Scalar,
    /// A whole band at a time, one iteration per pass, over the set of
    /// points still in play.
    Masked,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Masked
    }
}

impl Strategy {
    /// Lower-case name, as accepted by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Scalar => "scalar",
            Strategy::Masked => "masked",
        }
    }
}

impl BandEvaluator for Strategy {
    fn evaluate_band<R: IterationRule + ?Sized>(
        &self,
        rule: &R,
        samples: &[Complex<f64>],
        out: &mut [u32],
        max_iter: u32,
        cancel: &CancelToken,
    ) {
        match *self {
            Strategy::Scalar => ScalarStrategy.evaluate_band(rule, samples, out, max_iter, cancel),
            Strategy::Masked => MaskedStrategy.evaluate_band(rule, samples, out, max_iter, cancel),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scalar" => Ok(Strategy::Scalar),
            "masked" | "batched" => Ok(Strategy::Masked),
            _ => Err(EngineError::UnknownName {
                kind: "strategy",
                name: s.to_string(),
            }),
        }
    }
}
