use std::collections::{BTreeMap, BTreeSet};

use unicode_normalization::UnicodeNormalization;

use crate::models::MovieId;

fn is_stripped(c: char) -> bool {
    matches!(
        c,
        '.' | ':'
            | ','
            | ';'
            | '!'
            | '?'
            | '\''
            | '"'
            | '`'
            | '\u{2018}' // ‘
            | '\u{2019}' // ’
            | '\u{201A}' // ‚
            | '\u{201B}' // ‛
            | '\u{201C}' // “
            | '\u{201D}' // ”
            | '\u{201E}' // „
            | '\u{201F}' // ‟
            | '\u{00AB}' // «
            | '\u{00BB}' // »
            | '\u{2039}' // ‹
            | '\u{203A}' // ›
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '-'
    )
}

pub fn normalize_key(s: &str) -> String {
    let composed: String = s.nfc().collect();
    let lowered = composed.to_lowercase();
    let stripped: String = lowered.chars().filter(|c| !is_stripped(*c)).collect();
    // Removing a mark between a letter and a combining accent can leave a
    // composable pair, so compose once more.
    stripped.split_whitespace().collect::<Vec<_>>().join(" ").nfc().collect()
}

pub fn same_title(a: &str, b: &str) -> bool {
    normalize_key(a) == normalize_key(b)
}

#[derive(Debug, Default)]
pub struct TitleIndex {
    by_key: BTreeMap<String, MovieId>,
    ambiguous: BTreeSet<String>,
}

impl TitleIndex {
    pub fn new<'a>(titles: impl IntoIterator<Item = (MovieId, &'a str)>) -> Self {
        let mut index = Self::default();
        for (id, title) in titles {
            let key = normalize_key(title);
            if key.is_empty() {
                continue;
            }
            match index.by_key.get(&key) {
                Some(existing) if *existing != id => {
                    index.ambiguous.insert(key);
                },
                Some(_) => {},
                None => {
                    index.by_key.insert(key, id);
                },
            }
        }
        index
    }

    pub fn resolve(&self, title: &str) -> Option<MovieId> {
        let key = normalize_key(title);
        if self.ambiguous.contains(&key) {
            return None;
        }
        self.by_key.get(&key).copied()
    }

    pub fn ambiguous_keys(&self) -> impl Iterator<Item = &str> {
        self.ambiguous.iter().map(String::as_str)
    }
}
