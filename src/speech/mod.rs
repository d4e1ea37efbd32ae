//! Spoken announcement of a result.
//!
//! [`Speech`] is the blocking capability; [`SpeechRunner`] feeds one
//! from a background worker.  [`Gtts`] is a backend using Google
//! text-to-speech and a local player.

use crate::error::SpeechError;
use crate::ComputeResult;

mod gtts;
mod runner;
pub use gtts::Gtts;
pub use runner::SpeechRunner;

/// A blocking text-to-speech backend.
pub trait Speech: Send + Sync {
    /// Prepare the backend so that the first [`Speech::speak`] is fast.
    fn warmup(&self) -> Result<(), SpeechError>;

    /// Say `text`; returns once it has been spoken.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

fn is_german(locale: &str) -> bool {
    locale.to_lowercase().starts_with("de")
}

fn quote(text: &str, locale: &str) -> String {
    if is_german(locale) { format!("„{text}“") }
    else { format!("“{text}”") }
}

/// Sentence announcing that `original` has the color `result`,
/// phrased in German for locales starting with “de” and in English
/// otherwise, e.g.
/// `Der Satz „Wie geht es dir?“ hat die Farbe Cerulean #24B1E0.`
pub fn utterance(original: &str, result: &ComputeResult, locale: &str,
                 include_hex: bool) -> String {
    let quoted = quote(original, locale);
    let color = if include_hex { format!("{} {}", result.name(), result.hex()) }
                else { result.name().to_string() };
    if is_german(locale) {
        format!("Der Satz {quoted} hat die Farbe {color}.")
    } else {
        format!("The sentence {quoted} has the color {color}.")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute, Config};

    #[test]
    fn phrasing() {
        let r = compute("blau", &Config::default());
        let de = utterance("blau", &r, "de-DE", false);
        assert_eq!(de, format!("Der Satz „blau“ hat die Farbe {}.", r.name()));
        let en = utterance("blau", &r, "en-US", true);
        assert_eq!(en, format!("The sentence “blau” has the color {} {}.",
                               r.name(), r.hex()));
        assert!(utterance("x", &r, "DE", false).starts_with("Der Satz „x“"));
    }
}
