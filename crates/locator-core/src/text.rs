// crates/locator-core/src/text.rs
//! Text folding and tokenization shared by the index, matcher and recents.

use std::cmp::Ordering;

/// Convert a string into a folded key suitable for indexing and comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII (e.g. `Zürich` -> `Zurich`)
/// 2\) Normalize to lowercase
///
/// # Examples
///
/// ```rust
/// use locator_core::text::fold_key;
///
/// assert_eq!(fold_key("Zürich"), "zurich");
/// assert_eq!(fold_key("São Paulo"), "sao paulo");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// Compares two strings for equality after Unicode folding.
pub fn equals_folded(a: &str, b: &str) -> bool {
    fold_key(a) == fold_key(b)
}

/// Folds and splits text into whitespace-separated words, in order.
///
/// ```rust
/// use locator_core::text::tokenize;
///
/// assert_eq!(tokenize("  Hong  Kong "), vec!["hong", "kong"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(s: &str) -> Vec<String> {
    fold_key(s.trim())
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Sort key for server names following the `<prefix>#<number>` convention.
///
/// Keys order by number first (`UA#9` before `UA#10`, `CH#1` before
/// `CA#2`), then by stem. Names without a numeric suffix sort after numbered
/// ones and among themselves lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    stem: String,
    number: Option<u64>,
}

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        let folded = fold_key(name.trim());
        if let Some((stem, digits)) = folded.rsplit_once('#') {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(number) = digits.parse::<u64>() {
                    return NaturalKey {
                        stem: stem.to_owned(),
                        number: Some(number),
                    };
                }
            }
        }
        NaturalKey {
            stem: folded,
            number: None,
        }
    }

    pub fn number(&self) -> Option<u64> {
        self.number
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_number = match (self.number, other.number) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number.then_with(|| self.stem.cmp(&other.stem))
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
