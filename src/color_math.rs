//! Channel arithmetic on [`RGB8`] colors: clamping, hex encoding,
//! HSV naming, saturation and brightness scaling.

use rgb::RGB8;

/// A half-open range of hues \[`start`, `end`) in degrees, mapped to
/// a coarse color name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueBand {
    pub start: f64,
    pub end: f64,
    pub name: &'static str,
}

const fn band(start: f64, end: f64, name: &'static str) -> HueBand {
    HueBand { start, end, name }
}

/// Hue bands used by [`approx_name`], in increasing order.
pub const HUE_BANDS: [HueBand; 10] = [
    band(0., 12., "red"),
    band(12., 35., "orange"),
    band(35., 55., "yellow"),
    band(55., 85., "lime"),
    band(85., 165., "green"),
    band(165., 200., "cyan"),
    band(200., 250., "blue"),
    band(250., 285., "indigo"),
    band(285., 320., "purple"),
    band(320., 350., "magenta"),
];

/// Name returned when the hue falls in none of the [`HUE_BANDS`].
pub const DEFAULT_HUE_NAME: &str = "pinkish";

const BLACK_VALUE_MAX: f64 = 0.12;
const WHITE_VALUE_MIN: f64 = 0.92;
const WHITE_SAT_MAX: f64 = 0.15;
const GRAY_SAT_MAX: f64 = 0.12;

/// Clamp `x` to \[0, 255\].
#[inline]
pub fn clamp_byte(x: i64) -> u8 { x.clamp(0, 255) as u8 }

/// Round `x` to the nearest integer (ties to even) and clamp it to
/// \[0, 255\].  NaN gives 0.
#[inline]
pub fn to_byte(x: f64) -> u8 {
    let x = x.round_ties_even();
    if x.is_nan() { 0 } else { x.clamp(0., 255.) as u8 }
}

/// Uppercase `#RRGGBB` encoding of `c`.
pub fn to_hex(c: RGB8) -> String {
    format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
}

/// Perceived luminance with sRGB weights, on the \[0, 255\] scale.
#[inline]
pub fn luminance(c: RGB8) -> f64 {
    0.2126 * c.r as f64 + 0.7152 * c.g as f64 + 0.0722 * c.b as f64
}

/// Hue (fraction of a turn, in \[0, 1)), saturation and value (both
/// in \[0, 1\]) of `c`.
pub fn to_hsv(c: RGB8) -> (f64, f64, f64) {
    let r = c.r as f64 / 255.;
    let g = c.g as f64 / 255.;
    let b = c.b as f64 / 255.;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min { return (0., 0., max) }
    let d = max - min;
    let s = d / max;
    let rc = (max - r) / d;
    let gc = (max - g) / d;
    let bc = (max - b) / d;
    let h = if r == max { bc - gc }
            else if g == max { 2. + rc - bc }
            else { 4. + gc - rc };
    ((h / 6.).rem_euclid(1.), s, max)
}

/// Coarse English name of `c` based on HSV thresholds: “black”,
/// “white”, “gray” or one of the [`HUE_BANDS`] names.
pub fn approx_name(c: RGB8) -> &'static str {
    let (h, s, v) = to_hsv(c);
    if v < BLACK_VALUE_MAX { return "black" }
    if v > WHITE_VALUE_MIN && s < WHITE_SAT_MAX { return "white" }
    if s < GRAY_SAT_MAX { return "gray" }
    let deg = h * 360.;
    HUE_BANDS.iter()
        .find(|b| b.start <= deg && deg < b.end)
        .map_or(DEFAULT_HUE_NAME, |b| b.name)
}

/// Move every channel away from (`mult > 1`) or towards (`mult < 1`)
/// the mean of the three channels.
pub fn apply_saturation(c: RGB8, mult: f64) -> RGB8 {
    let mean = (c.r as f64 + c.g as f64 + c.b as f64) / 3.;
    let f = |x: u8| to_byte(mean + (x as f64 - mean) * mult);
    RGB8::new(f(c.r), f(c.g), f(c.b))
}

/// Multiply every channel by `mult`.
pub fn apply_brightness(c: RGB8, mult: f64) -> RGB8 {
    let f = |x: u8| to_byte(x as f64 * mult);
    RGB8::new(f(c.r), f(c.g), f(c.b))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping() {
        assert_eq!(clamp_byte(-4), 0);
        assert_eq!(clamp_byte(300), 255);
        assert_eq!(clamp_byte(17), 17);
        assert_eq!(to_byte(255.6), 255);
        assert_eq!(to_byte(-0.7), 0);
        assert_eq!(to_byte(127.5), 128);
        assert_eq!(to_byte(126.5), 126);
        assert_eq!(to_byte(f64::NAN), 0);
    }

    #[test]
    fn hex() {
        assert_eq!(to_hex(RGB8::new(0, 10, 255)), "#000AFF");
        assert_eq!(to_hex(RGB8::new(171, 205, 239)), "#ABCDEF");
    }

    #[test]
    fn names() {
        assert_eq!(approx_name(RGB8::new(10, 20, 25)), "black");
        assert_eq!(approx_name(RGB8::new(250, 250, 245)), "white");
        assert_eq!(approx_name(RGB8::new(128, 128, 128)), "gray");
        assert_eq!(approx_name(RGB8::new(255, 0, 0)), "red");
        assert_eq!(approx_name(RGB8::new(255, 100, 0)), "orange");
        assert_eq!(approx_name(RGB8::new(255, 200, 0)), "yellow");
        assert_eq!(approx_name(RGB8::new(255, 255, 0)), "lime");
        assert_eq!(approx_name(RGB8::new(0, 255, 0)), "green");
        assert_eq!(approx_name(RGB8::new(0, 255, 255)), "cyan");
        assert_eq!(approx_name(RGB8::new(0, 0, 255)), "blue");
        assert_eq!(approx_name(RGB8::new(255, 0, 255)), "purple");
        assert_eq!(approx_name(RGB8::new(255, 0, 160)), "magenta");
        // Hue ≈ 353°, beyond the last band.
        assert_eq!(approx_name(RGB8::new(255, 0, 30)), DEFAULT_HUE_NAME);
    }

    #[test]
    fn hue_bands_are_contiguous() {
        for w in HUE_BANDS.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
        assert_eq!(HUE_BANDS[0].start, 0.);
    }

    #[test]
    fn saturation_and_brightness() {
        let c = RGB8::new(200, 100, 0);
        assert_eq!(apply_saturation(c, 1.), c);
        assert_eq!(apply_saturation(c, 0.), RGB8::new(100, 100, 100));
        assert_eq!(apply_saturation(c, 2.), RGB8::new(255, 100, 0));
        assert_eq!(apply_brightness(c, 0.5), RGB8::new(100, 50, 0));
        assert_eq!(apply_brightness(c, 2.), RGB8::new(255, 200, 0));
    }

    #[test]
    fn luminance_weights() {
        assert!((luminance(RGB8::new(255, 255, 255)) - 255.).abs() < 1e-9);
        assert_eq!(luminance(RGB8::new(0, 0, 0)), 0.);
    }
}
