//! The color of a sentence.
//!
//! [`compute`] derives a representative [`RGB8`] color from any text
//! with a deterministic pipeline:
//!
//! 1. German umlauts are transliterated ([`normalize`]);
//! 2. a base color is derived from the letters, either by the
//!    frequencies of r, g and b ([`base_frequency`]) or by votes of all
//!    letters for the nearest of three alphabet anchors
//!    ([`base_anchor`]);
//! 3. short texts are brightened ([`apply_length_floor`], frequency
//!    mode only);
//! 4. German color words pull the color towards their own
//!    ([`overrides`], [`blend_override`]);
//! 5. `!` brightens and saturates, `?` darkens and desaturates
//!    ([`apply_punctuation`]);
//! 6. the color is named ([`naming`]).
//!
//! An [`Engine`] additionally consults a remote name catalogue and
//! announces the result by [`speech`].
//!
//! ```
//! use color_sentence::{compute, Config};
//! let c = compute("Der Himmel ist blau!", &Config::default());
//! assert!(c.rgb().b >= c.rgb().r);
//! assert_eq!(c.hex().len(), 7);
//! ```

use std::fmt;
use std::sync::Arc;

use log::{trace, warn};
pub use rgb::RGB8;

pub mod color_math;
pub mod config;
pub mod error;
pub mod naming;
pub mod normalize;
pub mod overrides;
pub mod speech;

use color_math::{apply_brightness, apply_saturation, luminance, to_byte, to_hex};
pub use config::{Anchors, Config, Denominator, LengthFloor, Mode, Naming,
                 Punctuation, SpeechSettings};
use naming::{resolve_name, ColorPizza, NameResolver};
use normalize::{letters_only, transliterate, visible_len};
use speech::{Speech, SpeechRunner};

/// Color of a text, with its hex code and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputeResult {
    rgb: RGB8,
    hex: String,
    name: String,
}

impl ComputeResult {
    fn new(rgb: RGB8, name: String) -> Self {
        ComputeResult { rgb, hex: to_hex(rgb), name }
    }

    pub fn rgb(&self) -> RGB8 { self.rgb }

    /// Uppercase `#RRGGBB` code of [`Self::rgb`].
    pub fn hex(&self) -> &str { &self.hex }

    /// Human readable name; never empty.
    pub fn name(&self) -> &str { &self.name }
}

impl fmt::Display for ComputeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let RGB8 { r, g, b } = self.rgb;
        write!(f, "RGB: ({r}, {g}, {b})  HEX: {}  NAME: {}", self.hex, self.name)
    }
}

/// Base color of [`Mode::Frequency`]: the proportions of the letters
/// r, g and b (case insensitive) among the ASCII letters of `text`,
/// relative to the count selected by `denom`.  Also returns that count.
pub fn base_frequency(text: &str, denom: Denominator) -> (RGB8, usize) {
    let letters = letters_only(text);
    let count = |c: char| letters.iter().filter(|l| l.eq_ignore_ascii_case(&c)).count();
    let (r, g, b) = (count('r'), count('g'), count('b'));
    let base = match denom {
        Denominator::Visible => visible_len(text),
        Denominator::Letters => letters.len(),
        Denominator::RgbHits => (r + g + b).max(1),
    };
    let channel = |n: usize| {
        let ratio = if base > 0 { n as f64 / base as f64 } else { 0. };
        to_byte(ratio.clamp(0., 1.) * 255.)
    };
    (RGB8::new(channel(r), channel(g), channel(b)), base)
}

/// Circular distance between two positions of the 26 letter alphabet.
fn circular_distance(i: u8, j: u8) -> u8 {
    let d = (i as i16 - j as i16).rem_euclid(26) as u8;
    d.min(26 - d)
}

/// Base color of [`Mode::Anchor`].  Every ASCII letter gives one point
/// to the nearest anchor (split evenly between equidistant anchors);
/// the sums are scaled so that the largest is 255.  Black if `text`
/// has no ASCII letter.
pub fn base_anchor(text: &str, anchors: &Anchors) -> RGB8 {
    let anchors = [anchors.red % 26, anchors.green % 26, anchors.blue % 26];
    let mut sums = [0f64; 3];
    for c in text.chars().filter(char::is_ascii_alphabetic) {
        let i = c.to_ascii_lowercase() as u8 - b'a';
        let d = anchors.map(|a| circular_distance(i, a));
        let best = d.iter().copied().min().unwrap_or(0);
        let winners = d.iter().filter(|&&x| x == best).count();
        let share = 1. / winners as f64;
        for (s, &x) in sums.iter_mut().zip(&d) {
            if x == best { *s += share }
        }
    }
    let max = sums[0].max(sums[1]).max(sums[2]);
    if max == 0. { return RGB8::new(0, 0, 0) }
    let scale = 255. / max;
    RGB8::new(to_byte(sums[0] * scale), to_byte(sums[1] * scale),
              to_byte(sums[2] * scale))
}

/// Brightest channel value aimed at for a text with `visible`
/// non white space characters.
pub fn length_floor_target(visible: usize, p: &LengthFloor) -> u8 {
    if visible <= p.short_visible_max { return p.bright_at_short }
    if visible >= p.long_visible_min { return p.bright_at_long }
    let steps = (visible - p.short_visible_max) as i64;
    color_math::clamp_byte(p.bright_at_short as i64 - p.linear_step as i64 * steps)
}

/// Scale `c` up so that its brightest channel reaches
/// [`length_floor_target`].  Never darkens, and leaves black alone.
pub fn apply_length_floor(c: RGB8, visible: usize, p: &LengthFloor) -> RGB8 {
    let peak = c.r.max(c.g).max(c.b);
    let target = length_floor_target(visible, p);
    if visible == 0 || peak == 0 || peak >= target { return c }
    let factor = target as f64 / peak as f64;
    let f = |x: u8| to_byte(x as f64 * factor);
    RGB8::new(f(c.r), f(c.g), f(c.b))
}

/// Mix `c` with the color words found in the (transliterated) `text`,
/// if any.
pub fn blend_override(c: RGB8, text: &str) -> RGB8 {
    let Some(o) = overrides::find_override(text) else { return c };
    let w = o.weight;
    let mix = |x: u8, t: u8| to_byte((1. - w) * x as f64 + w * t as f64);
    RGB8::new(mix(c.r, o.color.r), mix(c.g, o.color.g), mix(c.b, o.color.b))
}

/// Brightness and saturation multipliers expressed by the `!` and `?`
/// of `text`.
pub fn punctuation_multipliers(text: &str, p: &Punctuation) -> (f64, f64) {
    let excl = text.matches('!').count() as i32;
    let quest = text.matches('?').count() as i32;
    let mut score = p.weight_exclamation * excl + p.weight_question * quest;
    let tail = text.trim_end();
    if tail.ends_with('!') { score += p.end_bonus }
    else if tail.ends_with('?') { score -= p.end_bonus }
    // Not `clamp`: it panics on an inverted range.
    let score = score.max(p.score_min).min(p.score_max) as f64;
    (1. + p.bright_per_score * score, 1. + p.sat_per_score * score)
}

/// Adjust saturation then brightness of `c` according to the
/// punctuation of the original `text`.  If the luminance moved against
/// the intended direction (desaturating a bright color may brighten
/// it), the result is rescaled to the luminance of `c`.
pub fn apply_punctuation(c: RGB8, text: &str, p: &Punctuation) -> RGB8 {
    let (bright, sat) = punctuation_multipliers(text, p);
    let pre = luminance(c);
    let out = apply_brightness(apply_saturation(c, sat), bright);
    let post = luminance(out);
    // The rescale rounds and clamps channels, so a saturated channel may
    // leave the result slightly on the wrong side of `pre`.
    if bright < 1. && post > pre && post > 0. {
        return apply_brightness(out, pre / post)
    }
    if bright > 1. && pre > post && post > 0. {
        return apply_brightness(out, pre / post)
    }
    out
}

/// Color of `text` up to (excluding) naming.
fn compute_rgb(text: &str, config: &Config) -> RGB8 {
    let trans = transliterate(text);
    let base = match config.mode {
        Mode::Frequency => {
            let (c, _) = base_frequency(&trans, config.denominator);
            if config.length_floor {
                apply_length_floor(c, visible_len(&trans), &config.length_floor_params)
            } else { c }
        }
        Mode::Anchor => base_anchor(&trans, &config.anchors),
    };
    let blended = blend_override(base, &trans);
    let out = if config.punctuation {
        apply_punctuation(blended, text, &config.punctuation_params)
    } else { blended };
    trace!("{text:?}: base {base:?}, blended {blended:?}, final {out:?}");
    out
}

/// Color of `text`, named by the HSV heuristic.
///
/// Total and deterministic: for a given `config`, the result only
/// depends on `text`.  Any remote name lookup and speech are left to
/// [`Engine`].
pub fn compute(text: &str, config: &Config) -> ComputeResult {
    let rgb = compute_rgb(text, config);
    let name = resolve_name(None, rgb, config.naming.max_distance);
    ComputeResult::new(rgb, name)
}

/// Color computation with its collaborators: an optional name
/// resolver and an optional speech backend.
pub struct Engine {
    config: Config,
    resolver: Option<Box<dyn NameResolver>>,
    speech: Option<Arc<dyn Speech>>,
    runner: Option<SpeechRunner>,
}

impl Engine {
    /// Engine for `config`.  If `config.naming.remote` is set, names
    /// are looked up in the Color.Pizza catalogue.
    pub fn new(config: Config) -> Self {
        let resolver: Option<Box<dyn NameResolver>> = if config.naming.remote {
            match ColorPizza::new(config.naming.timeout()) {
                Ok(r) => Some(Box::new(r)),
                Err(e) => {
                    warn!("remote color names unavailable: {e}");
                    None
                }
            }
        } else { None };
        Engine { config, resolver, speech: None, runner: None }
    }

    /// Use `resolver` to name colors.
    pub fn name_resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Announce results through `backend` (if speech is enabled in the
    /// configuration), from a background worker if
    /// `config.speech.background` is set.
    pub fn speech(mut self, backend: Arc<dyn Speech>) -> Self {
        self.runner = self.config.speech.background.then(|| {
            SpeechRunner::new(Arc::clone(&backend), self.config.speech.queue_capacity)
        });
        self.speech = Some(backend);
        self
    }

    pub fn config(&self) -> &Config { &self.config }

    /// Warm the speech backend up (or start its worker) to avoid a
    /// delay on the first announcement.  Does not change results.
    pub fn prepare(&self) {
        if !self.config.speech.enabled { return }
        if let Some(runner) = &self.runner {
            runner.ensure_started();
        } else if let Some(speech) = &self.speech {
            if let Err(e) = speech.warmup() { warn!("speech warmup failed: {e}") }
        }
    }

    /// Color of `text`.  Never fails: name lookup errors fall back to
    /// the HSV heuristic and speech errors are only logged.
    pub fn compute(&self, text: &str) -> ComputeResult {
        let rgb = compute_rgb(text, &self.config);
        let name = resolve_name(self.resolver.as_deref(), rgb,
                                self.config.naming.max_distance);
        let result = ComputeResult::new(rgb, name);
        self.announce(text, &result);
        result
    }

    fn announce(&self, text: &str, result: &ComputeResult) {
        let s = &self.config.speech;
        if !s.enabled { return }
        let Some(speech) = &self.speech else { return };
        let sentence = speech::utterance(text, result, &s.locale, s.include_hex);
        if let Some(runner) = &self.runner {
            runner.enqueue(sentence);
        } else if let Err(e) = speech.speak(&sentence) {
            warn!("speech failed: {e}");
        }
    }

    /// Stop the background speech worker, if any.
    pub fn shutdown(&self) {
        if let Some(runner) = &self.runner { runner.shutdown() }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Config {
        Config { punctuation: false, length_floor: false, ..Config::default() }
    }

    #[test]
    fn frequency_denominators() {
        let (c, n) = base_frequency("r--", Denominator::Visible);
        assert_eq!((c, n), (RGB8::new(85, 0, 0), 3));
        let (c, n) = base_frequency("r--", Denominator::Letters);
        assert_eq!((c, n), (RGB8::new(255, 0, 0), 1));
        let (c, n) = base_frequency("RGb xyz", Denominator::RgbHits);
        assert_eq!((c, n), (RGB8::new(85, 85, 85), 3));
        assert_eq!(base_frequency("", Denominator::RgbHits), (RGB8::new(0, 0, 0), 1));
        assert_eq!(base_frequency("", Denominator::Visible), (RGB8::new(0, 0, 0), 0));
        assert_eq!(base_frequency("!!", Denominator::Letters), (RGB8::new(0, 0, 0), 0));
    }

    #[test]
    fn anchor_votes() {
        assert_eq!(circular_distance(0, 17), 9);
        assert_eq!(circular_distance(25, 1), 2);
        let a = Anchors::default();
        assert_eq!(base_anchor("aaa", &a), RGB8::new(0, 0, 255));
        assert_eq!(base_anchor("tttt", &a), RGB8::new(255, 0, 0));
        assert_eq!(base_anchor("g", &a), RGB8::new(0, 255, 0));
        assert_eq!(base_anchor("42 ?! é", &a), RGB8::new(0, 0, 0));
        // ‘l’ (11) is 5 from ‘g’ and 6 from ‘r’.
        assert_eq!(base_anchor("l", &a), RGB8::new(0, 255, 0));
        // ‘d’ (3) is 2 from ‘b’ (1), ‘k’ (10) is 4 from ‘g’ (6).
        assert_eq!(base_anchor("dk", &a), RGB8::new(0, 255, 255));
    }

    #[test]
    fn anchor_ties_split() {
        // Anchors at 0 and 2 are both 1 away from ‘b’.
        let a = Anchors { red: 0, green: 2, blue: 13 };
        assert_eq!(base_anchor("b", &a), RGB8::new(255, 255, 0));
        assert_eq!(base_anchor("bc", &a), RGB8::new(85, 255, 0));
    }

    #[test]
    fn length_floor() {
        let p = LengthFloor::default();
        assert_eq!(length_floor_target(0, &p), 200);
        assert_eq!(length_floor_target(6, &p), 200);
        assert_eq!(length_floor_target(7, &p), 195);
        assert_eq!(length_floor_target(29, &p), 85);
        assert_eq!(length_floor_target(30, &p), 80);
        assert_eq!(length_floor_target(500, &p), 80);
        assert_eq!(apply_length_floor(RGB8::new(128, 64, 0), 2, &p),
                   RGB8::new(200, 100, 0));
        // Never darkens.
        let bright = RGB8::new(250, 10, 0);
        assert_eq!(apply_length_floor(bright, 2, &p), bright);
        assert_eq!(apply_length_floor(RGB8::new(0, 0, 0), 2, &p), RGB8::new(0, 0, 0));
        assert_eq!(apply_length_floor(RGB8::new(10, 0, 0), 0, &p), RGB8::new(10, 0, 0));
    }

    #[test]
    fn blending() {
        assert_eq!(blend_override(RGB8::new(0, 0, 64), "blau"), RGB8::new(0, 0, 198));
        let c = RGB8::new(1, 2, 3);
        assert_eq!(blend_override(c, "grey"), c);
    }

    #[test]
    fn punctuation_scores() {
        let p = Punctuation::default();
        assert_eq!(punctuation_multipliers("blau", &p), (1., 1.));
        let (b, s) = punctuation_multipliers("blau!!!", &p);
        assert!((b - 1.45).abs() < 1e-12 && (s - 1.3).abs() < 1e-12);
        let (b, _) = punctuation_multipliers("blau?? ", &p);
        assert!((b - 0.55).abs() < 1e-12);
        // 2·1 − 1·1, ends with ‘?’ → 0
        assert_eq!(punctuation_multipliers("Ja! Oder?", &p), (1., 1.));
        let inverted = Punctuation { score_min: 3, score_max: -3, ..p };
        let (b, _) = punctuation_multipliers("!", &inverted);
        assert!((b - 0.55).abs() < 1e-12);
    }

    #[test]
    fn darkening_never_brightens() {
        let p = Punctuation::default();
        let c = RGB8::new(0, 0, 191);
        let out = apply_punctuation(c, "blau??", &p);
        assert!(luminance(out) <= luminance(c));
        assert_eq!(out, RGB8::new(9, 9, 75));
    }

    #[test]
    fn brightening_never_darkens() {
        let p = Punctuation::default();
        for c in [RGB8::new(0, 0, 189), RGB8::new(250, 250, 10), RGB8::new(20, 200, 20)] {
            let out = apply_punctuation(c, "wow!!", &p);
            assert!(luminance(out) >= luminance(c), "{c:?} → {out:?}");
        }
    }

    #[test]
    fn brightening_clamped_at_full_channel() {
        let p = Punctuation::default();
        let c = RGB8::new(0, 3, 228);
        let out = apply_punctuation(c, "!", &p);
        assert_eq!(out, RGB8::new(0, 0, 255));
        // Blue cannot grow past 255 to make up for the lost green.
        assert!(luminance(out) < luminance(c));
    }

    #[test]
    fn pipeline() {
        let r = compute("blau", &plain());
        assert_eq!(r.rgb(), RGB8::new(0, 0, 198));
        assert_eq!(r.hex(), "#0000C6");
        assert_eq!(r.name(), "blue");
        assert_eq!(r.to_string(), "RGB: (0, 0, 198)  HEX: #0000C6  NAME: blue");
        let r = compute("blaeulich", &plain());
        assert_eq!(r.rgb(), RGB8::new(0, 0, 107));
    }

    #[test]
    fn empty_text() {
        for mode in [Mode::Frequency, Mode::Anchor] {
            let r = compute("", &Config { mode, ..Config::default() });
            assert_eq!(r.rgb(), RGB8::new(0, 0, 0));
            assert_eq!(r.name(), "black");
        }
    }
}
