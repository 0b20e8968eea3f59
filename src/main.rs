// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate escapetime;
extern crate failure;
extern crate image;
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use escapetime::{
    CancelToken, Engine, EngineConfig, JuliaPreset, Orbit, Pixel, Resolution, ResultGrid,
    SampleGrid, Strategy, Variant, Window, CANCELLED,
};
use failure::err_msg;
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use num::Complex;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// A Julia constant is either a preset's name or a literal "re,im".
fn parse_julia(s: &str) -> Option<Complex<f64>> {
    match JuliaPreset::from_str(s) {
        Ok(preset) => Some(preset.constant()),
        Err(_) => parse_complex(s),
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_parse<T: FromStr>(s: &str) -> Result<(), String>
where
    T::Err: std::fmt::Display,
{
    T::from_str(s).map(|_| ()).map_err(|e| e.to_string())
}

const RENDER: &str = "render";
const PROBE: &str = "probe";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const VARIANT: &str = "variant";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const STRATEGY: &str = "strategy";
const JULIA: &str = "julia";
const TIMEOUT: &str = "timeout-ms";
const POINT: &str = "point";
const PIXEL: &str = "pixel";

fn variant_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(VARIANT)
        .long(VARIANT)
        .short("f")
        .takes_value(true)
        .default_value("mandelbrot")
        .validator(|s| validate_parse::<Variant>(&s))
        .help("Fractal: mandelbrot, julia or burning-ship")
}

fn iterations_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(ITERATIONS)
        .long(ITERATIONS)
        .short("i")
        .takes_value(true)
        .default_value("256")
        .validator(|s| {
            validate_range(
                &s,
                1,
                escapetime::MAX_ITERATIONS,
                "Could not parse iteration count",
                "Iteration count must be positive",
            )
        })
        .help("Maximum iterations per point")
}

fn julia_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(JULIA)
        .long(JULIA)
        .short("c")
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value("rabbit")
        .validator(|s| match parse_julia(&s) {
            Some(_) => Ok(()),
            None => Err(
                "Julia constant must be re,im or one of dragon, rabbit, cauliflower, lightning"
                    .to_string(),
            ),
        })
        .help("Fixed constant for the Julia set")
}

fn size_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(SIZE)
        .long(SIZE)
        .short("s")
        .takes_value(true)
        .default_value("800x800")
        .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
        .help("Size of output image")
}

fn leftlower_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(LEFTLOWER)
        .long(LEFTLOWER)
        .short("l")
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
        .help("Left lower corner of the window (default depends on the variant)")
}

fn rightupper_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(RIGHTUPPER)
        .long(RIGHTUPPER)
        .short("r")
        .takes_value(true)
        .allow_hyphen_values(true)
        .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
        .help("Right upper corner of the window (default depends on the variant)")
}

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get() * 4;

    App::new("escapetime")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time fractal renderer")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name(RENDER)
                .about("Evaluate a window and write it as a graymap")
                .arg(
                    Arg::with_name(OUTPUT)
                        .required(true)
                        .long(OUTPUT)
                        .short("o")
                        .takes_value(true)
                        .help("Output file"),
                )
                .arg(size_arg())
                .arg(variant_arg())
                .arg(leftlower_arg())
                .arg(rightupper_arg())
                .arg(iterations_arg())
                .arg(
                    Arg::with_name(THREADS)
                        .long(THREADS)
                        .short("t")
                        .takes_value(true)
                        .validator(move |s| {
                            validate_range(
                                &s,
                                1,
                                max_threads,
                                "Could not parse thread count",
                                &format!("Thread count must be between 1 and {}", max_threads),
                            )
                        })
                        .help("Number of threads to use in solver (default: one per CPU)"),
                )
                .arg(
                    Arg::with_name(STRATEGY)
                        .long(STRATEGY)
                        .takes_value(true)
                        .default_value("masked")
                        .validator(|s| validate_parse::<Strategy>(&s))
                        .help("Evaluation strategy: masked or scalar"),
                )
                .arg(julia_arg())
                .arg(
                    Arg::with_name(TIMEOUT)
                        .long(TIMEOUT)
                        .takes_value(true)
                        .validator(|s| validate_parse::<u64>(&s))
                        .help("Abandon unfinished cells after this many milliseconds"),
                ),
        )
        .subcommand(
            SubCommand::with_name(PROBE)
                .about("Trace the orbit of a single point")
                .arg(
                    Arg::with_name(POINT)
                        .required_unless(PIXEL)
                        .conflicts_with(PIXEL)
                        .long(POINT)
                        .short("p")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse point"))
                        .help("The sample to trace, as re,im"),
                )
                .arg(
                    Arg::with_name(PIXEL)
                        .long(PIXEL)
                        .short("x")
                        .takes_value(true)
                        .validator(|s| validate_pair::<usize>(&s, ',', "Could not parse pixel"))
                        .help("Trace the sample behind an image pixel, as x,y from the top left"),
                )
                .arg(size_arg())
                .arg(leftlower_arg())
                .arg(rightupper_arg())
                .arg(variant_arg())
                .arg(iterations_arg())
                .arg(julia_arg()),
        )
        .get_matches()
}

/// Reads the variant and, for Julia sets, folds in the constant.
fn variant_of(matches: &ArgMatches) -> Result<Variant, failure::Error> {
    let variant = Variant::from_str(matches.value_of(VARIANT).unwrap_or("mandelbrot"))?;
    let constant = matches
        .value_of(JULIA)
        .and_then(parse_julia)
        .ok_or_else(|| err_msg("Error parsing Julia constant"))?;
    Ok(variant.with_julia_constant(constant))
}

fn iterations_of(matches: &ArgMatches) -> Result<u32, failure::Error> {
    matches
        .value_of(ITERATIONS)
        .and_then(|s| u32::from_str(s).ok())
        .ok_or_else(|| err_msg("Error parsing iteration count"))
}

fn resolution_of(matches: &ArgMatches) -> Result<Resolution, failure::Error> {
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| err_msg("Error parsing image dimensions"))?;
    Ok(Resolution::new(size.0, size.1)?)
}

/// The corners given on the command line, or the variant's own view.
fn window_of(matches: &ArgMatches, variant: Variant) -> Result<Window, failure::Error> {
    let fallback = variant.default_window();
    let leftlower = match matches.value_of(LEFTLOWER) {
        Some(s) => parse_complex(s).ok_or_else(|| err_msg("Error parsing left lower point"))?,
        None => fallback.leftlower(),
    };
    let rightupper = match matches.value_of(RIGHTUPPER) {
        Some(s) => parse_complex(s).ok_or_else(|| err_msg("Error parsing right upper point"))?,
        None => fallback.rightupper(),
    };
    Ok(Window::from_corners(leftlower, rightupper)?)
}

/// The sample behind an image pixel.  Image rows run top down, grid
/// rows bottom up.
fn pixel_sample(matches: &ArgMatches, variant: Variant) -> Result<Complex<f64>, failure::Error> {
    let (x, y) = matches
        .value_of(PIXEL)
        .and_then(|s| parse_pair::<usize>(s, ','))
        .ok_or_else(|| err_msg("Error parsing pixel"))?;
    let resolution = resolution_of(matches)?;
    let samples = SampleGrid::new(window_of(matches, variant)?, resolution);
    let row = (resolution.height() - 1).checked_sub(y);
    row.and_then(|row| samples.pixel_to_point(&Pixel(x, row)))
        .ok_or_else(|| {
            err_msg(format!(
                "Pixel {},{} is outside the {}x{} image",
                x,
                y,
                resolution.width(),
                resolution.height()
            ))
        })
}

/// Maps counts to gray levels, flipping rows so the top of the image
/// is the top of the window.  Cancelled cells are black.
fn pixelate(grid: &ResultGrid) -> Vec<u8> {
    let max_iter = u64::from(grid.max_iter());
    grid.rows()
        .rev()
        .flat_map(|row| row.iter())
        .map(|&v| {
            if v == CANCELLED {
                0
            } else {
                (u64::from(v) * 255 / max_iter) as u8
            }
        })
        .collect()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::Gray(8))?;
    Ok(())
}

fn render(matches: &ArgMatches) -> Result<(), failure::Error> {
    let resolution = resolution_of(matches)?;
    let variant = variant_of(matches)?;
    let iterations = iterations_of(matches)?;
    let window = window_of(matches, variant)?;

    let threads = match matches.value_of(THREADS) {
        Some(s) => usize::from_str(s)?,
        None => num_cpus::get(),
    };
    let strategy = Strategy::from_str(matches.value_of(STRATEGY).unwrap_or("masked"))?;
    let cancel = match matches.value_of(TIMEOUT) {
        Some(s) => CancelToken::with_timeout(Duration::from_millis(u64::from_str(s)?)),
        None => CancelToken::new(),
    };

    let config = EngineConfig::default()
        .threads(threads)
        .strategy(strategy)
        .cancel_token(cancel);
    info!(
        "Rendering {} at {}x{}, {} iterations, {} strategy on {} threads",
        variant, resolution.width(), resolution.height(), iterations, strategy, threads
    );
    let started = Instant::now();
    let grid = Engine::new(config).evaluate(window, resolution, variant, iterations)?;
    info!(
        "Evaluated in {:?}: {} of {} cells bounded",
        started.elapsed(),
        grid.bounded_count(),
        resolution.len()
    );
    if !grid.is_complete() {
        eprintln!(
            "Timed out: {} of {} cells left unfinished",
            grid.cancelled_count(),
            resolution.len()
        );
    }

    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| err_msg("No output file given"))?;
    write_image(output, &pixelate(&grid), (resolution.width(), resolution.height()))?;
    info!("Wrote {}", output);
    Ok(())
}

fn probe(matches: &ArgMatches) -> Result<(), failure::Error> {
    let variant = variant_of(matches)?;
    variant.validate()?;
    let point = match matches.value_of(POINT) {
        Some(s) => parse_complex(s).ok_or_else(|| err_msg("Error parsing point"))?,
        None => pixel_sample(matches, variant)?,
    };
    let iterations = iterations_of(matches)?;
    escapetime::engine::validate_iterations(iterations)?;

    println!("Testing point {} under {}", point, variant);
    let mut last = None;
    for (index, z) in Orbit::new(&variant, point, iterations) {
        println!("Iteration {}: z = {}, magnitude = {}", index, z, z.norm());
        last = Some((index, z));
    }
    match last {
        Some((index, z)) if escapetime::scalar::escaped(z) => {
            println!("Point {} escapes after {} iterations", point, index)
        }
        _ => println!("Point {} is bounded after {} iterations", point, iterations),
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    match matches.subcommand() {
        (RENDER, Some(sub)) => render(sub),
        (PROBE, Some(sub)) => probe(sub),
        _ => Err(err_msg("No subcommand given")),
    }
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("escapetime: {}", e);
        std::process::exit(1);
    }
}
