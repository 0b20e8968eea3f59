// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The batched evaluator.  Instead of chasing one orbit to its end,
//! it advances every orbit in a band by one step per pass, keeping an
//! explicit list of the points still in play.
//!
//! A point leaves the active list on the pass where it is first seen
//! outside the bailout circle, and that pass index is written to its
//! cell exactly once.  Escaped points are never stepped again, so an
//! orbit that overflows and wraps back under the threshold can't
//! overwrite its recorded result.  The per-point sequence of
//! operations is the scalar loop's, so the results are identical.

use num::Complex;

use crate::cancel::{CancelToken, CHECK_INTERVAL};
use crate::grid::CANCELLED;
use crate::rules::IterationRule;
use crate::scalar::escaped;
use crate::strategy::BandEvaluator;

/// The iteration state for one band: the current iterate and the
/// constant for every point, plus the indices still active.  Lives
/// only as long as one `evaluate_band` call.
struct BandState {
    z: Vec<Complex<f64>>,
    c: Vec<Complex<f64>>,
    active: Vec<usize>,
}

impl BandState {
    fn seed<R: IterationRule + ?Sized>(rule: &R, samples: &[Complex<f64>]) -> Self {
        let (z, c): (Vec<_>, Vec<_>) = samples.iter().map(|sample| rule.seed(*sample)).unzip();
        BandState {
            z,
            c,
            active: (0..samples.len()).collect(),
        }
    }

    /// One pass: retire every active point that has escaped, recording
    /// `pass` as its result, and step the rest.
    fn advance<R: IterationRule + ?Sized>(&mut self, rule: &R, pass: u32, out: &mut [u32]) {
        let (z, c) = (&mut self.z, &self.c);
        self.active.retain(|&k| {
            if escaped(z[k]) {
                out[k] = pass;
                false
            } else {
                z[k] = rule.step(z[k], c[k]);
                true
            }
        });
    }
}

/// Evaluates a whole band one iteration at a time.
#[derive(Copy, Clone, Debug, Default)]
pub struct MaskedStrategy;

impl BandEvaluator for MaskedStrategy {
    fn evaluate_band<R: IterationRule + ?Sized>(
        &self,
        rule: &R,
        samples: &[Complex<f64>],
        out: &mut [u32],
        max_iter: u32,
        cancel: &CancelToken,
    ) {
        debug_assert_eq!(samples.len(), out.len());
        if cancel.is_cancelled() {
            for cell in out.iter_mut() {
                *cell = CANCELLED;
            }
            return;
        }

        let mut state = BandState::seed(rule, samples);
        for pass in 0..max_iter {
            if state.active.is_empty() {
                return;
            }
            if pass > 0 && pass % CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                for &k in &state.active {
                    out[k] = CANCELLED;
                }
                return;
            }
            state.advance(rule, pass, out);
        }

        // Survivors never escaped.
        for &k in &state.active {
            out[k] = max_iter;
        }
    }
}
