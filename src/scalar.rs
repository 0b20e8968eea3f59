// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-point reference loop.  Slow and obvious; every other way
//! of computing the grid is tested against this one.
//!
//! The escape check comes *before* the step, so a result of `i` means
//! `i` steps were completed while the orbit stayed inside the bailout
//! circle.  For the Mandelbrot, `c = 2` gives 2 (the orbit 0, 2, 6
//! escapes on seeing 6; `|2|` is on the circle, not outside it) and
//! every `|c| > 2` gives 1.

use num::Complex;

use crate::cancel::{CancelToken, CHECK_INTERVAL};
use crate::grid::CANCELLED;
use crate::rules::IterationRule;
use crate::strategy::BandEvaluator;

/// The squared bailout radius.
pub const BAILOUT_SQR: f64 = 4.0;

/// True once `|z| > 2`.  Written as a negated `<=` so that NaN, which
/// fails every comparison, counts as escaped; an infinite component
/// pushes `norm_sqr` to infinity or NaN and escapes the same way.
#[inline]
pub fn escaped(z: Complex<f64>) -> bool {
    !(z.norm_sqr() <= BAILOUT_SQR)
}

/// Runs one sample's orbit to completion and returns its escape
/// iteration, or `max_iter` if it never escaped.
pub fn escape_time<R: IterationRule + ?Sized>(
    rule: &R,
    sample: Complex<f64>,
    max_iter: u32,
) -> u32 {
    let (mut z, c) = rule.seed(sample);
    for i in 0..max_iter {
        if escaped(z) {
            return i;
        }
        z = rule.step(z, c);
    }
    max_iter
}

/// As `escape_time`, but gives up with `None` when the token trips.
fn escape_time_cancellable<R: IterationRule + ?Sized>(
    rule: &R,
    sample: Complex<f64>,
    max_iter: u32,
    cancel: &CancelToken,
) -> Option<u32> {
    let (mut z, c) = rule.seed(sample);
    for i in 0..max_iter {
        if escaped(z) {
            return Some(i);
        }
        if i > 0 && i % CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return None;
        }
        z = rule.step(z, c);
    }
    Some(max_iter)
}

/// Evaluates one point to completion before moving to the next.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScalarStrategy;

impl BandEvaluator for ScalarStrategy {
    fn evaluate_band<R: IterationRule + ?Sized>(
        &self,
        rule: &R,
        samples: &[Complex<f64>],
        out: &mut [u32],
        max_iter: u32,
        cancel: &CancelToken,
    ) {
        debug_assert_eq!(samples.len(), out.len());
        for (index, sample) in samples.iter().enumerate() {
            let result = if cancel.is_cancelled() {
                None
            } else {
                escape_time_cancellable(rule, *sample, max_iter, cancel)
            };
            match result {
                Some(iterations) => out[index] = iterations,
                None => {
                    for rest in out[index..].iter_mut() {
                        *rest = CANCELLED;
                    }
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BurningShip, Julia, Mandelbrot};

    #[test]
    fn escape_predicate_is_strictly_outside_the_circle() {
        assert!(!escaped(Complex::new(2.0, 0.0)));
        assert!(!escaped(Complex::new(0.0, -2.0)));
        assert!(escaped(Complex::new(2.0, 1e-7)));
        assert!(escaped(Complex::new(2.000_000_1, 0.0)));
        assert!(escaped(Complex::new(std::f64::NAN, 0.0)));
        assert!(escaped(Complex::new(0.0, std::f64::INFINITY)));
        assert!(escaped(Complex::new(std::f64::NEG_INFINITY, std::f64::NAN)));
    }

    #[test]
    fn known_mandelbrot_points() {
        assert_eq!(escape_time(&Mandelbrot, Complex::new(0.0, 0.0), 100), 100);
        assert_eq!(escape_time(&Mandelbrot, Complex::new(-1.0, 0.0), 100), 100);
        assert_eq!(escape_time(&Mandelbrot, Complex::new(2.0, 0.0), 100), 2);
        assert_eq!(escape_time(&Mandelbrot, Complex::new(1.5, 0.0), 256), 2);
        assert_eq!(escape_time(&Mandelbrot, Complex::new(-0.5, 0.0), 256), 256);
        assert_eq!(escape_time(&Mandelbrot, Complex::new(2.0, 2.0), 100), 1);
    }

    #[test]
    fn runaway_orbits_escape_instead_of_overflowing() {
        assert_eq!(escape_time(&Mandelbrot, Complex::new(1e300, 0.0), 50), 1);
        let origin = Julia(Complex::new(0.0, 0.0));
        assert_eq!(escape_time(&origin, Complex::new(std::f64::NAN, 0.0), 50), 0);
        assert_eq!(escape_time(&BurningShip, Complex::new(std::f64::INFINITY, 0.0), 50), 1);
    }

    #[test]
    fn julia_starts_from_the_sample() {
        let rule = Julia(Complex::new(-0.8, 0.156));
        // Already outside: no steps completed.
        assert_eq!(escape_time(&rule, Complex::new(3.0, 0.0), 100), 0);
        let z0 = Complex::new(0.1, 0.1);
        let mut z = z0;
        let mut expected = 100;
        for i in 0..100 {
            if z.norm_sqr() > 4.0 {
                expected = i;
                break;
            }
            z = z * z + Complex::new(-0.8, 0.156);
        }
        assert_eq!(escape_time(&rule, z0, 100), expected);
    }

    #[test]
    fn band_matches_point_by_point() {
        let samples: Vec<Complex<f64>> = (0..40u32)
            .map(|k| Complex::new(-2.0 + 0.1 * f64::from(k), 0.3))
            .collect();
        let mut out = vec![0; samples.len()];
        ScalarStrategy.evaluate_band(&Mandelbrot, &samples, &mut out, 64, &CancelToken::new());
        for (sample, cell) in samples.iter().zip(out.iter()) {
            assert_eq!(*cell, escape_time(&Mandelbrot, *sample, 64));
        }
    }

    #[test]
    fn cancelled_band_is_marked() {
        let samples = vec![Complex::new(0.0, 0.0); 8];
        let mut out = vec![0; 8];
        let token = CancelToken::new();
        token.cancel();
        ScalarStrategy.evaluate_band(&Mandelbrot, &samples, &mut out, 64, &token);
        assert!(out.iter().all(|&v| v == CANCELLED));
    }
}
