//! Semantic overrides: German color words (“blau”, “rötlich”,
//! “goldfarben”,…) pull the computed color towards their own color.
//!
//! The text is expected to be transliterated (see
//! [`crate::normalize::transliterate`]), so “bläulich” must be given as
//! “blaeulich”.

use lazy_static::lazy_static;
use regex::Regex;

mod table;
use table::{COLOR_WORDS, SUFFIX_WEIGHTS, RGB8};
pub use table::BARE_WEIGHT;

/// Color to blend in, with its weight in \[0, [`BARE_WEIGHT`]\].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Override {
    pub color: RGB8,
    pub weight: f64,
}

struct Matcher {
    rgb: RGB8,
    re: Regex,
}

lazy_static! {
    static ref MATCHERS: Vec<Matcher> = {
        let suffixes: Vec<&str> = SUFFIX_WEIGHTS.iter().map(|&(s, _)| s).collect();
        let suffixes = suffixes.join("|");
        let mut matchers = Vec::new();
        for w in COLOR_WORDS.iter() {
            for stem in w.stems {
                let src = format!(r"(?i)\b{}({})?\w*",
                                  regex::escape(stem), suffixes);
                // Stems and suffixes are plain lowercase words.
                let re = Regex::new(&src).unwrap();
                matchers.push(Matcher { rgb: w.rgb, re });
            }
        }
        matchers
    };
}

/// Weight of a color word followed by `suffix` (empty for a bare
/// word).  Unknown suffixes weigh as much as a bare word.
pub fn suffix_weight(suffix: &str) -> f64 {
    SUFFIX_WEIGHTS.iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
        .map_or(BARE_WEIGHT, |&(_, w)| w)
}

/// Canonical keys of the recognized color words, in table order.
pub fn color_keys() -> impl Iterator<Item = &'static str> {
    COLOR_WORDS.iter().map(|w| w.key)
}

/// Scan `text` for color words and return the average of their colors
/// together with the average of their weights, or `None` if `text`
/// contains no color word.
///
/// Every match counts: a word occurring twice contributes twice, and
/// two stems matching the same word (“silber” and “silbern”) both
/// contribute.
pub fn find_override(text: &str) -> Option<Override> {
    let mut sum = [0u64; 3];
    let mut sum_weight = 0.;
    let mut n = 0u64;
    for m in MATCHERS.iter() {
        for caps in m.re.captures_iter(text) {
            let suffix = caps.get(1).map_or("", |s| s.as_str());
            sum[0] += m.rgb.r as u64;
            sum[1] += m.rgb.g as u64;
            sum[2] += m.rgb.b as u64;
            sum_weight += suffix_weight(suffix);
            n += 1;
        }
    }
    if n == 0 { return None }
    let nf = n as f64;
    let avg = |s: u64| crate::color_math::to_byte(s as f64 / nf);
    Some(Override {
        color: RGB8::new(avg(sum[0]), avg(sum[1]), avg(sum[2])),
        weight: (sum_weight / nf).clamp(0., BARE_WEIGHT),
    })
}
