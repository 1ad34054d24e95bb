// src/extractors/normalize.rs
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

/// Folds accented letters to their base Latin letter.
/// Covers Turkish plus the common Western European accents.
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'ı' | 'İ' | 'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ş' | 'Ş' | 'ß' => 's',
        'ğ' | 'Ğ' => 'g',
        'ü' | 'Ü' | 'ú' | 'ù' | 'û' | 'Ú' | 'Ù' | 'Û' => 'u',
        'ö' | 'Ö' | 'ó' | 'ò' | 'ô' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Õ' => 'o',
        'ç' | 'Ç' => 'c',
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'ñ' | 'Ñ' => 'n',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => return None,
    };
    Some(folded)
}

// Combining marks left behind by lower-casing or decomposed input (e.g. "i̇")
fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

/// Canonical form used for every comparison in the engine.
///
/// Lower-cases, folds diacritics, turns punctuation into spaces, collapses
/// whitespace and trims. `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some(folded) = fold_char(c) {
            out.push(folded);
            continue;
        }
        if is_combining_mark(c) {
            continue;
        }
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                match fold_char(lower) {
                    Some(folded) => out.push(folded),
                    None if is_combining_mark(lower) => {}
                    None => out.push(lower),
                }
            }
        } else {
            // Punctuation, symbols and whitespace all separate words
            out.push(' ');
        }
    }

    WHITESPACE_RE.replace_all(out.trim(), " ").into_owned()
}

/// Containment test used by the locator, the dictionary and the classifier.
/// Both inputs must already be normalized. The contained side must be at least
/// `min_len` characters so stray one-letter cells do not match everything.
pub fn contains_either(a: &str, b: &str, min_len: usize) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    short.chars().count() >= min_len && long.contains(short)
}

/// Non-overlapping occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// True if the text has no letters at all (numbers, dates, punctuation only).
pub fn is_non_textual(text: &str) -> bool {
    !text.chars().any(char::is_alphabetic)
}
