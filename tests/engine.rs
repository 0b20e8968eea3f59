extern crate escapetime;
extern crate num;
extern crate rand;

use escapetime::{
    escape_time, evaluate, BurningShip, CancelToken, Engine, EngineConfig, Mandelbrot,
    Resolution, SampleGrid, Strategy, Variant, Window, CANCELLED, MAX_ITERATIONS,
};
use num::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;

fn window(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Window {
    Window::new(xmin, xmax, ymin, ymax).unwrap()
}

fn resolution(width: usize, height: usize) -> Resolution {
    Resolution::new(width, height).unwrap()
}

fn engine(strategy: Strategy, threads: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .strategy(strategy)
            .threads(threads)
            .rows_per_band(3),
    )
}

/// Independent reference: z is checked before each step.
fn reference_loop(mut z: Complex<f64>, c: Complex<f64>, max_iter: u32) -> u32 {
    for i in 0..max_iter {
        if z.norm_sqr() > 4.0 || z.re.is_nan() || z.im.is_nan() {
            return i;
        }
        z = z * z + c;
    }
    max_iter
}

#[test]
fn strategies_and_pool_sizes_agree_bit_for_bit() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..12 {
        let xmin = rng.gen_range(-2.5, 0.5);
        let ymin = rng.gen_range(-1.5, 0.5);
        let w = window(
            xmin,
            xmin + rng.gen_range(0.01, 2.0),
            ymin,
            ymin + rng.gen_range(0.01, 2.0),
        );
        let r = resolution(rng.gen_range(1, 48), rng.gen_range(1, 48));
        let max_iter = rng.gen_range(1, 300);
        let variant = match rng.gen_range(0, 3) {
            0 => Variant::Mandelbrot,
            1 => Variant::BurningShip,
            _ => Variant::Julia(Complex::new(rng.gen_range(-1.0, 1.0), rng.gen_range(-1.0, 1.0))),
        };

        let scalar = engine(Strategy::Scalar, 1).evaluate(w, r, variant, max_iter).unwrap();
        let masked = engine(Strategy::Masked, 4).evaluate(w, r, variant, max_iter).unwrap();
        let again = engine(Strategy::Masked, 4).evaluate(w, r, variant, max_iter).unwrap();
        assert_eq!(scalar, masked, "{} over {:?}", variant, w);
        assert_eq!(masked, again);
    }
}

#[test]
fn every_cell_is_within_the_budget() {
    for &variant in &[
        Variant::Mandelbrot,
        Variant::BurningShip,
        Variant::Julia(Complex::new(-1.0, 0.0)),
    ] {
        let grid = evaluate(variant.default_window(), resolution(64, 48), variant, 77).unwrap();
        assert!(grid.is_complete());
        assert!(grid.as_slice().iter().all(|&v| v <= 77));
        assert!(grid.bounded_count() > 0, "{} has no interior", variant);
        assert!(grid.bounded_count() < 64 * 48, "{} has no exterior", variant);
    }
}

#[test]
fn known_points_on_the_real_axis() {
    // Samples at -1, 0, 1 and 2 on the real axis.
    let grid = evaluate(window(-1.0, 2.0, -1.0, 1.0), resolution(4, 3), Variant::Mandelbrot, 100)
        .unwrap();
    assert_eq!(grid.get(1, 0), Some(100)); // c = -1
    assert_eq!(grid.get(1, 1), Some(100)); // c = 0
    assert_eq!(grid.get(1, 3), Some(2)); // c = 2: 0, 2, 6
    let grid = evaluate(window(1.0, 2.0, -0.5, 0.5), resolution(3, 3), Variant::Mandelbrot, 100)
        .unwrap();
    assert_eq!(grid.get(1, 1), Some(2)); // c = 1.5: 0, 1.5, 3.75
}

#[test]
fn mandelbrot_is_symmetric_under_conjugation() {
    let w = window(-2.0, 0.5, -1.25, 1.25);
    let r = resolution(61, 41);
    let samples = SampleGrid::new(w, r);
    let grid = evaluate(w, r, Variant::Mandelbrot, 200).unwrap();
    for row in 0..r.height() {
        for col in 0..r.width() {
            let c = samples.point(row, col);
            assert_eq!(grid.get(row, col), Some(escape_time(&Mandelbrot, c.conj(), 200)));
        }
    }
}

#[test]
fn everything_beyond_radius_two_escapes_at_once() {
    for k in 0..16u32 {
        let angle = f64::from(k) * std::f64::consts::PI / 8.0;
        for &radius in &[2.000001, 2.5, 10.0, 1e6] {
            let c = Complex::from_polar(&radius, &angle);
            assert_eq!(escape_time(&Mandelbrot, c, 500), 1);
            assert_eq!(escape_time(&BurningShip, c, 500), 1);
        }
    }
    let grid = evaluate(window(2.5, 10.0, 2.5, 10.0), resolution(16, 16), Variant::Mandelbrot, 500)
        .unwrap();
    assert!(grid.as_slice().iter().all(|&v| v == 1));
}

#[test]
fn corner_sample_is_the_window_corner() {
    for &(width, height) in &[(1, 1), (3, 2), (800, 600), (17, 1000)] {
        let samples = SampleGrid::new(window(-2.0, 0.5, -1.25, 1.25), resolution(width, height));
        assert_eq!(samples.point(0, 0), Complex::new(-2.0, -1.25));
    }
}

#[test]
fn classic_view_has_an_interior_and_a_fast_edge() {
    let w = window(-2.0, 0.5, -1.25, 1.25);
    let r = resolution(800, 800);
    let samples = SampleGrid::new(w, r);
    let grid = evaluate(w, r, Variant::Mandelbrot, 256).unwrap();

    let body = samples.nearest_pixel(&Complex::new(-0.5, 0.0)).unwrap();
    assert_eq!(grid.get(body.1, body.0), Some(256));
    for &(dx, dy) in &[(-3i64, 0i64), (3, 0), (0, 3), (0, -3), (2, 2)] {
        let row = (body.1 as i64 + dy) as usize;
        let col = (body.0 as i64 + dx) as usize;
        assert_eq!(grid.get(row, col), Some(256));
    }

    // The right-hand edge, near c = 0.5, is well outside the set.
    let edge = samples.nearest_pixel(&Complex::new(0.5, 0.0)).unwrap();
    let count = grid.get(edge.1, edge.0).unwrap();
    assert!(count < 10, "got {}", count);
    assert_eq!(escape_time(&Mandelbrot, Complex::new(1.5, 0.0), 256), 2);
}

#[test]
fn julia_grid_follows_the_fixed_constant() {
    let c = Complex::new(-0.8, 0.156);
    let variant = Variant::Julia(c);
    for &(w, r) in &[
        (window(-2.0, 2.0, -2.0, 2.0), resolution(41, 37)),
        (window(-0.3, 0.1, 0.2, 0.9), resolution(20, 30)),
    ] {
        let samples = SampleGrid::new(w, r);
        let grid = evaluate(w, r, variant, 150).unwrap();
        for row in 0..r.height() {
            for col in 0..r.width() {
                let z0 = samples.point(row, col);
                assert_eq!(grid.get(row, col), Some(reference_loop(z0, c, 150)));
            }
        }
    }

    // The same starting point gets the same count whichever window it
    // was sampled from.
    let wide = evaluate(window(-2.0, 2.0, -2.0, 2.0), resolution(5, 5), variant, 150).unwrap();
    let tight = evaluate(window(-1.0, 1.0, -1.0, 1.0), resolution(3, 3), variant, 150).unwrap();
    assert_eq!(wide.get(2, 1), tight.get(1, 0)); // z0 = -1
    assert_eq!(wide.get(2, 2), tight.get(1, 1)); // z0 = 0
    assert_eq!(wide.get(3, 3), tight.get(2, 2)); // z0 = 1 + i
}

#[test]
fn configuration_errors_are_reported_up_front() {
    assert!(Window::new(0.5, -2.0, -1.0, 1.0).is_err());
    assert!(Window::new(-2.0, 0.5, std::f64::NAN, 1.0).is_err());
    assert!(Resolution::new(0, 800).is_err());
    let w = window(-2.0, 0.5, -1.25, 1.25);
    assert!(evaluate(w, resolution(8, 8), Variant::Mandelbrot, 0).is_err());
    assert!(evaluate(w, resolution(8, 8), Variant::Mandelbrot, CANCELLED).is_err());
}

#[test]
fn cancellation_leaves_a_distinguishable_partial_grid() {
    // Entirely inside the main cardioid: no cell can finish on its own
    // with this budget.
    let w = window(-0.5, -0.1, -0.2, 0.2);
    let r = resolution(32, 32);
    for &strategy in &[Strategy::Scalar, Strategy::Masked] {
        let token = CancelToken::new();
        let trigger = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });
        let engine = Engine::new(
            EngineConfig::default()
                .strategy(strategy)
                .threads(2)
                .cancel_token(token),
        );
        let grid = engine
            .evaluate(w, r, Variant::Mandelbrot, MAX_ITERATIONS)
            .unwrap();
        canceller.join().unwrap();
        assert!(!grid.is_complete());
        assert_eq!(grid.cancelled_count(), 32 * 32);
    }
}
