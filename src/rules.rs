// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Iteration rules.  Each fractal variant is one step of a quadratic
//! recurrence plus a decision about which operand comes from the
//! sample grid: for the Mandelbrot and the Burning Ship every sample
//! is its own `c` and the orbit starts at zero; for a Julia set `c`
//! is fixed and every sample is a starting point.

use num::Complex;
use std::fmt;
use std::str::FromStr;

use crate::errors::EngineError;
use crate::planes::Window;

/// One step of an escape-time recurrence.  Implementations must be
/// pure: the same inputs always give the same bits, since the scalar
/// and masked strategies rely on that to agree.
pub trait IterationRule: Sync {
    /// Given a sample from the grid, returns the starting iterate `z0`
    /// and the constant `c` for that point's orbit.
    fn seed(&self, sample: Complex<f64>) -> (Complex<f64>, Complex<f64>);

    /// Produces the next iterate.
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64>;
}

/// `z*z + c`, with `c` varying per point and `z0 = 0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Mandelbrot;

impl IterationRule for Mandelbrot {
    #[inline]
    fn seed(&self, sample: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (Complex::new(0.0, 0.0), sample)
    }

    #[inline]
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }
}

/// `z*z + c`, with `c` fixed for the whole grid and `z0` varying.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Julia(pub Complex<f64>);

impl IterationRule for Julia {
    #[inline]
    fn seed(&self, sample: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (sample, self.0)
    }

    #[inline]
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        z * z + c
    }
}

/// Folds both components to their absolute value before squaring.
/// Same seeding as the Mandelbrot.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BurningShip;

impl IterationRule for BurningShip {
    #[inline]
    fn seed(&self, sample: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (Complex::new(0.0, 0.0), sample)
    }

    #[inline]
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        let folded = Complex::new(z.re.abs(), z.im.abs());
        folded * folded + c
    }
}

/// The tagged form of the three rules, for callers that pick one at
/// run time.  Dispatches to the unit rules above.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variant {
    /// See `Mandelbrot`.
    Mandelbrot,
    /// See `Julia`; carries the fixed constant.
    Julia(Complex<f64>),
    /// See `BurningShip`.
    BurningShip,
}

impl Variant {
    /// Rejects a Julia constant that isn't finite; the other variants
    /// carry no parameters and are always valid.
    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            Variant::Julia(c) if !(c.re.is_finite() && c.im.is_finite()) => {
                Err(EngineError::NonFiniteParameter { re: c.re, im: c.im })
            }
            _ => Ok(()),
        }
    }

    /// The customary view of each fractal.
    pub fn default_window(&self) -> Window {
        let (xmin, xmax, ymin, ymax) = match *self {
            Variant::Mandelbrot => (-2.0, 0.5, -1.25, 1.25),
            Variant::Julia(_) => (-2.0, 2.0, -2.0, 2.0),
            Variant::BurningShip => (-2.5, 1.5, -2.0, 2.0),
        };
        Window::trusted(xmin, xmax, ymin, ymax)
    }

    /// Lower-case name, as accepted by `from_str`.
    pub fn name(&self) -> &'static str {
        match *self {
            Variant::Mandelbrot => "mandelbrot",
            Variant::Julia(_) => "julia",
            Variant::BurningShip => "burning-ship",
        }
    }

    /// Same variant family, with a different Julia constant.  No-op
    /// for the other families.
    pub fn with_julia_constant(self, c: Complex<f64>) -> Variant {
        match self {
            Variant::Julia(_) => Variant::Julia(c),
            other => other,
        }
    }
}

impl IterationRule for Variant {
    #[inline]
    fn seed(&self, sample: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        match *self {
            Variant::Mandelbrot => Mandelbrot.seed(sample),
            Variant::Julia(c) => Julia(c).seed(sample),
            Variant::BurningShip => BurningShip.seed(sample),
        }
    }

    #[inline]
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        match *self {
            Variant::Mandelbrot => Mandelbrot.step(z, c),
            Variant::Julia(c0) => Julia(c0).step(z, c),
            Variant::BurningShip => BurningShip.step(z, c),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Variant::Julia(c) => write!(f, "julia({}{:+}i)", c.re, c.im),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Parses a family name.  "julia" comes back with the rabbit
/// constant; use `with_julia_constant` to pick another.
impl FromStr for Variant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mandelbrot" => Ok(Variant::Mandelbrot),
            "julia" => Ok(Variant::Julia(JuliaPreset::Rabbit.constant())),
            "burning-ship" | "burningship" | "burning_ship" | "ship" => Ok(Variant::BurningShip),
            _ => Err(EngineError::UnknownName {
                kind: "variant",
                name: s.to_string(),
            }),
        }
    }
}

/// Well-known Julia constants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JuliaPreset {
    /// -0.7269 + 0.1889i
    Dragon,
    /// -0.8 + 0.156i
    Rabbit,
    /// 0.285 + 0.01i
    Cauliflower,
    /// -0.4 + 0.6i
    Lightning,
}

impl JuliaPreset {
    /// Every preset, in a stable order.
    pub const ALL: [JuliaPreset; 4] = [
        JuliaPreset::Dragon,
        JuliaPreset::Rabbit,
        JuliaPreset::Cauliflower,
        JuliaPreset::Lightning,
    ];

    /// The fixed `c` for this preset.
    pub fn constant(self) -> Complex<f64> {
        match self {
            JuliaPreset::Dragon => Complex::new(-0.7269, 0.1889),
            JuliaPreset::Rabbit => Complex::new(-0.8, 0.156),
            JuliaPreset::Cauliflower => Complex::new(0.285, 0.01),
            JuliaPreset::Lightning => Complex::new(-0.4, 0.6),
        }
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            JuliaPreset::Dragon => "dragon",
            JuliaPreset::Rabbit => "rabbit",
            JuliaPreset::Cauliflower => "cauliflower",
            JuliaPreset::Lightning => "lightning",
        }
    }
}

impl FromStr for JuliaPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        JuliaPreset::ALL
            .iter()
            .cloned()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| EngineError::UnknownName {
                kind: "Julia preset",
                name: s.to_string(),
            })
    }
}
