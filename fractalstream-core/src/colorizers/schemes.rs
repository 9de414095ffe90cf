//! Built-in colour schemes.

use super::{channel, Colorizer, Rgb};

/// Name of the scheme used when a requested name is unknown.
pub const DEFAULT_SCHEME: &str = "Contrast Black";

const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];

/// Scale used by the packed-RGB schemes (255³).
const PACKED_SCALE: f64 = 16_581_375.0;

/// Divisor of the "Egg-White" scheme, independent of max iterations.
const EGG_WHITE_DIVISOR: f64 = 30_000.0;

/// All built-in schemes in picker order. The first one is the default.
pub fn builtin_schemes() -> Vec<Colorizer> {
    vec![
        Colorizer::new(DEFAULT_SCHEME, contrast_black),
        Colorizer::new("Contrast White", contrast_white),
        Colorizer::new("Frosty", frosty),
        Colorizer::new("Funky", funky),
        Colorizer::new("Egg-White", egg_white),
        Colorizer::new("Burning", burning),
        Colorizer::new("Black and White", black_and_white),
        Colorizer::new("Mystic Blue", mystic_blue),
    ]
}

/// Binary threshold: any escape iteration is white, zero is black.
fn contrast_black(sample: u32, _max_iterations: u32) -> Rgb {
    if sample >= 1 {
        WHITE
    } else {
        BLACK
    }
}

fn contrast_white(sample: u32, _max_iterations: u32) -> Rgb {
    if sample >= 1 {
        BLACK
    } else {
        WHITE
    }
}

/// The sample's own bytes as RGB, with blue lifted by 80.
fn frosty(sample: u32, _max_iterations: u32) -> Rgb {
    let [_, r, g, b] = sample.to_be_bytes();
    [r, g, b.saturating_add(80)]
}

fn funky(sample: u32, max_iterations: u32) -> Rgb {
    if max_iterations == 0 {
        return BLACK;
    }
    packed(sample as f64 / max_iterations as f64 * PACKED_SCALE)
}

fn egg_white(sample: u32, _max_iterations: u32) -> Rgb {
    packed(sample as f64 / EGG_WHITE_DIVISOR * PACKED_SCALE)
}

/// Bytes 2, 1, 0 of the truncated value as R, G, B.
fn packed(value: f64) -> Rgb {
    let n = value as i64;
    [
        ((n >> 16) & 0xFF) as u8,
        ((n >> 8) & 0xFF) as u8,
        (n & 0xFF) as u8,
    ]
}

/// Smooth logarithmic black → red → yellow → white ramp.
///
/// `c = 3 · ln(v) / ln(max − 1)` walks through three bands; points that
/// reached max iterations are black. A degenerate `c` (NaN) is black too.
fn burning(sample: u32, max_iterations: u32) -> Rgb {
    if sample >= max_iterations {
        return BLACK;
    }

    let c = 3.0 * (sample as f64).ln() / ((max_iterations as f64) - 1.0).ln();
    if c.is_nan() {
        return BLACK;
    }

    let (cr, cg, cb) = if c < 1.0 {
        (c, 0.0, 0.0)
    } else if c < 2.0 {
        (1.0, c - 1.0, 0.0)
    } else {
        (1.0, 1.0, c - 2.0)
    };

    [channel(255.0 * cr), channel(255.0 * cg), channel(255.0 * cb)]
}

/// Alternating bands by parity.
fn black_and_white(sample: u32, _max_iterations: u32) -> Rgb {
    if sample % 2 == 0 {
        WHITE
    } else {
        BLACK
    }
}

/// Linear gradient from black to blue over `[0, max]`.
fn mystic_blue(sample: u32, max_iterations: u32) -> Rgb {
    if max_iterations == 0 {
        return BLACK;
    }
    let percent = sample as f64 / max_iterations as f64;
    [0, 0, channel(percent * 255.0)]
}
