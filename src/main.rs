//! Print the color of a sentence.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use color_sentence::speech::Gtts;
use color_sentence::{Config, Denominator, Engine, Mode};

#[derive(Parser, Debug)]
#[clap(name = "color-sentence",
       about = "Compute a representative color from a sentence.")]
struct Cli {
    /// Input sentence to analyze.
    text: String,

    /// Normalization base for frequency mode (visible, letters, rgb-hits).
    #[clap(long = "denom")]
    denominator: Option<Denominator>,

    /// Computation mode: letter frequency (freq) or alphabet anchors (anchor).
    #[clap(long)]
    mode: Option<Mode>,

    /// Disable punctuation-based brightness/saturation modulation.
    #[clap(long)]
    no_punct: bool,

    /// Disable the length-based brightness floor (frequency mode only).
    #[clap(long)]
    no_floor: bool,

    /// Name the color locally, without asking the Color.Pizza service.
    #[clap(long)]
    offline: bool,

    /// Announce the result with Google text-to-speech.
    #[clap(long)]
    speak: bool,

    /// Locale of the announcement (German for tags starting with “de”).
    #[clap(long)]
    locale: Option<String>,

    /// Include the hex code in the announcement.
    #[clap(long)]
    with_hex: bool,

    /// JSON file with the base configuration; flags take precedence.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Log debugging information to stderr.
    #[clap(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(d) = self.denominator { config.denominator = d }
        if let Some(m) = self.mode { config.mode = m }
        if self.no_punct { config.punctuation = false }
        if self.no_floor { config.length_floor = false }
        config.naming.remote = !self.offline;
        if self.speak { config.speech.enabled = true }
        if let Some(l) = &self.locale { config.speech.locale = l.clone() }
        if self.with_hex { config.speech.include_hex = true }
        Ok(config)
    }
}

/// Language part of a locale tag: “de-DE” → “de”.
fn language(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .init();

    let config = cli.to_config()?;
    let mut engine = Engine::new(config.clone());
    if config.speech.enabled {
        let lang = language(&config.speech.locale).to_lowercase();
        let gtts = Gtts::new(&lang)
            .with_context(|| format!("cannot set up speech for “{lang}”"))?;
        engine = engine.speech(Arc::new(gtts));
    }
    engine.prepare();

    let result = engine.compute(&cli.text);
    println!("{result}");
    engine.shutdown();
    Ok(())
}
