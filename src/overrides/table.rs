pub(crate) use rgb::RGB8;

/// A German color word: its canonical key, the color it pulls
/// towards, and the transliterated stems that name it.
pub(crate) struct ColorWord {
    pub(crate) key: &'static str,
    pub(crate) rgb: RGB8,
    pub(crate) stems: &'static [&'static str], // Invariant: non-empty
}

const fn word(key: &'static str, r: u8, g: u8, b: u8,
              stems: &'static [&'static str]) -> ColorWord {
    ColorWord { key, rgb: RGB8 { r, g, b }, stems }
}

pub(crate) static COLOR_WORDS: [ColorWord; 24] = [
    word("rot", 255, 0, 0, &["rot", "roet"]),
    word("gruen", 0, 255, 0, &["gruen"]),
    word("blau", 0, 0, 255, &["blau", "blaeu"]),
    word("gelb", 255, 255, 0, &["gelb"]),
    word("orange", 255, 165, 0, &["orange"]),
    word("lila", 180, 0, 255, &["lila"]),
    word("violett", 148, 0, 211, &["violett"]),
    word("magenta", 255, 0, 255, &["magenta"]),
    word("pink", 255, 105, 180, &["pink"]),
    word("tuerkis", 64, 224, 208, &["tuerkis"]),
    word("cyan", 0, 255, 255, &["cyan"]),
    word("braun", 150, 75, 0, &["braun", "braeun"]),
    word("grau", 128, 128, 128, &["grau"]),
    word("weiss", 255, 255, 255, &["weiss"]),
    word("schwarz", 0, 0, 0, &["schwarz"]),
    // Metals and earth tones
    word("gold", 212, 175, 55, &["gold"]),
    word("silber", 192, 192, 192, &["silber", "silbern"]),
    word("bronze", 205, 127, 50, &["bronze", "bronzen"]),
    word("kupfer", 184, 115, 51, &["kupfer"]),
    word("messing", 181, 166, 66, &["messing"]),
    word("beige", 245, 245, 220, &["beige"]),
    word("oliv", 128, 128, 0, &["oliv"]),
    word("mint", 170, 255, 195, &["mint"]),
    word("khaki", 195, 176, 145, &["khaki"]),
];

/// Blend weight of a bare color word (no suffix).  Upper bound of
/// every override weight.
pub const BARE_WEIGHT: f64 = 0.70;

/// Known suffixes with their blend weight.  The weaker the color
/// reference (“bläulich” vs “blau”), the lower the weight.
pub(crate) static SUFFIX_WEIGHTS: [(&str, f64); 4] = [
    ("farben", 0.60),
    ("farbig", 0.60),
    ("stichig", 0.50),
    ("lich", 0.35),
];
