// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the coordinate mapper: the relationship between a
//! rectangle on the integral plane with an origin at 0,0 and a
//! rectangle on the complex plane, expressed as a grid of sample
//! points.
//!
//! Orientation: row 0 is the bottom of the window (`ymin`), column 0
//! is its left edge (`xmin`).  The last row and column land exactly on
//! `ymax` and `xmax`.

use itertools::iproduct;
use num::Complex;

use crate::errors::EngineError;

/// The real bounds of the sampled rectangle.  Can only be built
/// through `new` or `from_corners`, so every `Window` in circulation
/// is finite and non-empty.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Window {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

fn check_axis(axis: &'static str, min: f64, max: f64) -> Result<(), EngineError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(EngineError::NonFiniteBounds { axis, min, max });
    }
    if min >= max {
        return Err(EngineError::InvertedBounds { axis, min, max });
    }
    Ok(())
}

impl Window {
    /// Validates and builds a window.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Window, EngineError> {
        check_axis("real", xmin, xmax)?;
        check_axis("imaginary", ymin, ymax)?;
        Ok(Window {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// For bounds known at compile time to be valid.
    pub(crate) fn trusted(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Window {
        debug_assert!(xmin < xmax && ymin < ymax);
        Window {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Takes the left-lower and right-upper corners of the complex
    /// plane, treating the real part as x and the imaginary part as y.
    pub fn from_corners(
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Window, EngineError> {
        Window::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// Smallest real value.
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// Largest real value.
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    /// Smallest imaginary value.
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    /// Largest imaginary value.
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// The left-lower corner as a complex number.
    pub fn leftlower(&self) -> Complex<f64> {
        Complex::new(self.xmin, self.ymin)
    }

    /// The right-upper corner as a complex number.
    pub fn rightupper(&self) -> Complex<f64> {
        Complex::new(self.xmax, self.ymax)
    }
}

/// The most samples one grid may hold.  Each sample costs a complex
/// point and a count, so this is about 5 GiB of working memory.
pub const MAX_SAMPLES: usize = 1 << 28;

/// The number of sample columns and rows.  Never zero on either axis,
/// and never more than `MAX_SAMPLES` in all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    width: usize,
    height: usize,
}

impl Resolution {
    /// Validates and builds a resolution.
    pub fn new(width: usize, height: usize) -> Result<Resolution, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidResolution { width, height });
        }
        match width.checked_mul(height) {
            Some(cells) if cells <= MAX_SAMPLES => Ok(Resolution { width, height }),
            _ => Err(EngineError::ResolutionTooLarge {
                width,
                height,
                max: MAX_SAMPLES,
            }),
        }
    }

    /// Sample columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Sample rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false for a validated resolution; here for clippy's sake.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Describes the column, row of a cell in the grid.  Names are
/// important: this is x, y on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// `count` evenly spaced values from `min` to `max` inclusive.  The
/// last value is `max` exactly, not whatever the accumulated step
/// lands on.  A single sample sits on `min`.
fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![min];
    }
    let step = (max - min) / ((count - 1) as f64);
    (0..count)
        .map(|k| if k == count - 1 { max } else { min + (k as f64) * step })
        .collect()
}

/// The immutable grid of complex sample points, one per cell, in
/// row-major order.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    window: Window,
    resolution: Resolution,
    real: Vec<f64>,
    imag: Vec<f64>,
    points: Vec<Complex<f64>>,
}

impl SampleGrid {
    /// Lays the grid over the window.  Deterministic: identical inputs
    /// give bit-identical points.
    pub fn new(window: Window, resolution: Resolution) -> SampleGrid {
        let real = linspace(window.xmin, window.xmax, resolution.width);
        let imag = linspace(window.ymin, window.ymax, resolution.height);
        let points = iproduct!(imag.iter(), real.iter())
            .map(|(im, re)| Complex::new(*re, *im))
            .collect();
        SampleGrid {
            window,
            resolution,
            real,
            imag,
            points,
        }
    }

    /// The window this grid samples.
    pub fn window(&self) -> Window {
        self.window
    }

    /// The grid's shape.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Every sample, row-major.
    pub fn as_slice(&self) -> &[Complex<f64>] {
        &self.points
    }

    /// One row of samples; all share an imaginary part.
    pub fn row(&self, row: usize) -> &[Complex<f64>] {
        let width = self.resolution.width;
        &self.points[row * width..(row + 1) * width]
    }

    /// The sample at a cell.  Panics if the cell is outside the grid,
    /// like slice indexing does.
    pub fn point(&self, row: usize, col: usize) -> Complex<f64> {
        self.points[row * self.resolution.width + col]
    }

    /// Given a pixel on the integral cartesian plane, return its
    /// sample, or `None` if the pixel is off the grid.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Option<Complex<f64>> {
        if pixel.0 >= self.resolution.width || pixel.1 >= self.resolution.height {
            return None;
        }
        Some(Complex::new(self.real[pixel.0], self.imag[pixel.1]))
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, map it to the nearest sample's pixel.
    /// Points outside the window map to `None`.
    pub fn nearest_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let w = &self.window;
        let inside_re = point.re >= w.xmin && point.re <= w.xmax;
        let inside_im = point.im >= w.ymin && point.im <= w.ymax;
        if !(inside_re && inside_im) {
            return None;
        }
        let scale = |value: f64, min: f64, max: f64, count: usize| -> usize {
            let span = (count - 1) as f64;
            (((value - min) / (max - min)) * span).round() as usize
        };
        Some(Pixel(
            scale(point.re, w.xmin, w.xmax, self.resolution.width),
            scale(point.im, w.ymin, w.ymax, self.resolution.height),
        ))
    }
}
