//! Text normalization: German transliteration and letter extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ASCII_LETTER: Regex = Regex::new("[A-Za-z]").unwrap();
}

/// Replace ä, ö, ü, ß (and the capital umlauts) by their ASCII
/// digraphs `ae`, `oe`, `ue`, `ss`.  The case of the first letter is
/// kept: “Ä” becomes “Ae”.  Every other character is left untouched.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'ß' => out.push_str("ss"),
            c => out.push(c),
        }
    }
    out
}

/// Number of characters that are not Unicode white space.
pub fn visible_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// ASCII letters `a`–`z`, `A`–`Z` of `text`, in order.  Other
/// alphabetic characters (“é”, “ж”,…) are not included.
pub fn letters_only(text: &str) -> Vec<char> {
    ASCII_LETTER.find_iter(text)
        .filter_map(|m| m.as_str().chars().next())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umlauts() {
        assert_eq!(transliterate("bläulich"), "blaeulich");
        assert_eq!(transliterate("Öl, Übel, Ärger, Fuß"),
                   "Oel, Uebel, Aerger, Fuss");
        assert_eq!(transliterate("!? é"), "!? é");
    }

    #[test]
    fn visible() {
        assert_eq!(visible_len(""), 0);
        assert_eq!(visible_len(" a\tb\nc\u{00A0}\u{2003}d "), 4);
        assert_eq!(visible_len("r--"), 3);
    }

    #[test]
    fn letters() {
        assert_eq!(letters_only("R-g b!"), vec!['R', 'g', 'b']);
        assert!(letters_only("éжß 42").is_empty());
    }
}
