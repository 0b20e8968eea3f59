// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Orbit tracing for a single point, for when you want to see *why* a
//! point got the count it did.

use num::Complex;

use crate::rules::IterationRule;
use crate::scalar::escaped;

/// Walks the orbit `z0, z1, z2, ...` of one sample.  Each item is the
/// iteration index and the iterate that was tested at that index.  The
/// walk ends after yielding the first iterate outside the bailout
/// circle, or after `max_iter` bounded iterates.
pub struct Orbit<'a, R: IterationRule + ?Sized> {
    rule: &'a R,
    z: Complex<f64>,
    c: Complex<f64>,
    index: u32,
    max_iter: u32,
    done: bool,
}

impl<'a, R: IterationRule + ?Sized> Orbit<'a, R> {
    /// Starts the orbit of `sample` under `rule`.
    pub fn new(rule: &'a R, sample: Complex<f64>, max_iter: u32) -> Self {
        let (z, c) = rule.seed(sample);
        Orbit {
            rule,
            z,
            c,
            index: 0,
            max_iter,
            done: false,
        }
    }

    /// Consumes the orbit and reports the escape iteration, or
    /// `max_iter` if it never escaped.  Agrees with
    /// `scalar::escape_time`.
    pub fn escape_time(self) -> u32 {
        let max_iter = self.max_iter;
        self.last()
            .filter(|&(_, z)| escaped(z))
            .map(|(index, _)| index)
            .unwrap_or(max_iter)
    }
}

impl<'a, R: IterationRule + ?Sized> Iterator for Orbit<'a, R> {
    type Item = (u32, Complex<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.max_iter {
            return None;
        }
        let item = (self.index, self.z);
        if escaped(self.z) {
            self.done = true;
        } else {
            self.z = self.rule.step(self.z, self.c);
            self.index += 1;
        }
        Some(item)
    }
}
