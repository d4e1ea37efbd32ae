//! Parameters of a [`crate::compute`] call.
//!
//! Every numeric constant of the pipeline lives here with its
//! reference value as `Default`.  A [`Config`] can be read from a
//! (partial) JSON document; missing fields keep their default.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Count used to normalize the r/g/b letter counts in
/// [`Mode::Frequency`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denominator {
    /// All non white space characters.
    #[default]
    #[serde(rename = "visible")]
    Visible,
    /// ASCII letters only.
    #[serde(rename = "letters")]
    Letters,
    /// Occurrences of r/R, g/G and b/B only (at least 1).
    #[serde(rename = "rgb-hits")]
    RgbHits,
}

/// Algorithm deriving the base color from the text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Frequencies of the letters r, g and b.
    #[default]
    #[serde(rename = "freq")]
    Frequency,
    /// Every letter votes for the nearest of three anchors on the
    /// circular alphabet.
    #[serde(rename = "anchor")]
    Anchor,
}

macro_rules! token_enum {
    ($ty: ident, $what: literal, $($v: ident => $s: literal),+) => {
        impl $ty {
            /// Accepted spellings, as used on the command line.
            pub const TOKENS: &'static [&'static str] = &[$($s),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($ty::$v => $s),+ }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok($ty::$v),)+
                    _ => Err(format!("unknown {} “{}” (expected one of: {})",
                                     $what, s, $ty::TOKENS.join(", "))),
                }
            }
        }
    };
}

token_enum!(Denominator, "denominator",
            Visible => "visible", Letters => "letters", RgbHits => "rgb-hits");
token_enum!(Mode, "mode", Frequency => "freq", Anchor => "anchor");

/// Brightness floor for short texts in [`Mode::Frequency`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthFloor {
    /// Texts with at most this many visible characters target
    /// `bright_at_short`.
    pub short_visible_max: usize,
    /// Texts with at least this many visible characters target
    /// `bright_at_long`.
    pub long_visible_min: usize,
    pub bright_at_short: u8,
    pub bright_at_long: u8,
    /// Decrease of the target per visible character in between.
    pub linear_step: u8,
}

impl Default for LengthFloor {
    fn default() -> Self {
        LengthFloor { short_visible_max: 6, long_visible_min: 30,
                      bright_at_short: 200, bright_at_long: 80,
                      linear_step: 5 }
    }
}

/// Weights turning `!` and `?` into brightness and saturation
/// multipliers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Punctuation {
    pub weight_exclamation: i32,
    pub weight_question: i32,
    /// Added (`!`) or subtracted (`?`) when the text ends with it.
    pub end_bonus: i32,
    pub score_min: i32,
    pub score_max: i32,
    pub bright_per_score: f64,
    pub sat_per_score: f64,
}

impl Default for Punctuation {
    fn default() -> Self {
        Punctuation { weight_exclamation: 2, weight_question: -1,
                      end_bonus: 1, score_min: -3, score_max: 3,
                      bright_per_score: 0.15, sat_per_score: 0.10 }
    }
}

/// Positions (`a` = 0,… `z` = 25) of the red, green and blue anchors
/// of [`Mode::Anchor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchors {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Default for Anchors {
    fn default() -> Self { Anchors { red: 17, green: 6, blue: 1 } }
}

/// Resolution of the human readable color name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Naming {
    /// Ask the remote color name service.  Only consulted by
    /// [`crate::Engine`]; [`crate::compute`] always names locally.
    pub remote: bool,
    /// Largest distance of a remote match that is still accepted.
    pub max_distance: f64,
    /// Timeout of the remote request, in seconds.
    pub timeout_secs: f64,
}

impl Default for Naming {
    fn default() -> Self {
        Naming { remote: false, max_distance: 20.0, timeout_secs: 3.0 }
    }
}

impl Naming {
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or(Duration::from_secs(3))
    }
}

/// Spoken announcement of the result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    /// BCP-47-like tag; tags starting with “de” give German phrasing.
    pub locale: String,
    pub include_hex: bool,
    /// Speak from a background worker instead of blocking `compute`.
    pub background: bool,
    /// Capacity of the background queue.
    pub queue_capacity: usize,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        SpeechSettings { enabled: false, locale: "de-DE".to_string(),
                         include_hex: false, background: false,
                         queue_capacity: 32 }
    }
}

/// Parameters of a color computation.  Immutable during a call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub denominator: Denominator,
    pub mode: Mode,
    /// Modulate brightness and saturation by `!` and `?`.
    pub punctuation: bool,
    /// Apply the [`LengthFloor`] (frequency mode only).
    pub length_floor: bool,
    pub length_floor_params: LengthFloor,
    pub punctuation_params: Punctuation,
    pub anchors: Anchors,
    pub naming: Naming,
    pub speech: SpeechSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            denominator: Denominator::default(),
            mode: Mode::default(),
            punctuation: true,
            length_floor: true,
            length_floor_params: LengthFloor::default(),
            punctuation_params: Punctuation::default(),
            anchors: Anchors::default(),
            naming: Naming::default(),
            speech: SpeechSettings::default(),
        }
    }
}

impl Config {
    /// Read a configuration from the JSON file `path`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            ConfigError::Io { path: path.to_path_buf(), source } })?;
        serde_json::from_str(&text).map_err(|source| {
            ConfigError::Json { path: path.to_path_buf(), source } })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tokens() {
        assert_eq!("rgb-hits".parse::<Denominator>(), Ok(Denominator::RgbHits));
        assert_eq!(" Letters ".parse::<Denominator>(), Ok(Denominator::Letters));
        assert_eq!("anchor".parse::<Mode>(), Ok(Mode::Anchor));
        assert!("hsv".parse::<Mode>().is_err());
        for t in Denominator::TOKENS {
            assert_eq!(t.parse::<Denominator>().unwrap().to_string(), *t);
        }
    }

    #[test]
    fn partial_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "mode": "anchor", "denominator": "rgb-hits",
                       "punctuation_params": {{ "score_max": 5 }} }}"#).unwrap();
        let c = Config::from_json_file(f.path()).unwrap();
        assert_eq!(c.mode, Mode::Anchor);
        assert_eq!(c.denominator, Denominator::RgbHits);
        assert_eq!(c.punctuation_params.score_max, 5);
        assert_eq!(c.punctuation_params.score_min, -3);
        assert!(c.length_floor);
        assert_eq!(c.anchors, Anchors::default());
    }

    #[test]
    fn bad_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "mode": "hsv" }}"#).unwrap();
        assert!(matches!(Config::from_json_file(f.path()),
                         Err(ConfigError::Json { .. })));
        assert!(matches!(Config::from_json_file("/nonexistent/cfg.json"),
                         Err(ConfigError::Io { .. })));
    }

    #[test]
    fn naming_timeout() {
        assert_eq!(Naming::default().timeout(), Duration::from_secs(3));
        let n = Naming { timeout_secs: -1., ..Naming::default() };
        assert_eq!(n.timeout(), Duration::from_secs(3));
    }
}
