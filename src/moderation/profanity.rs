//! Static default banned-word matcher.
//!
//! Loaded once at startup and read-only afterwards. Matching is literal
//! substring containment over lower-cased text, the same policy the
//! per-guild custom tier uses.

/// Default banned tokens applied to every guild.
///
/// Kept deliberately small; per-guild lists exist for anything beyond the
/// obvious.
const DEFAULT_BANNED_WORDS: &[&str] = &[
    "arse",
    "asshole",
    "bastard",
    "bitch",
    "bollocks",
    "bullshit",
    "cock",
    "cunt",
    "dickhead",
    "douche",
    "fuck",
    "jackass",
    "motherfucker",
    "nigger",
    "piss off",
    "prick",
    "pussy",
    "shit",
    "slut",
    "twat",
    "wanker",
    "whore",
];

/// Process-wide default banned-word filter.
#[derive(Debug)]
pub struct ProfanityFilter {
    words: Vec<String>,
}

impl ProfanityFilter {
    /// Build the filter from the compiled-in default word table.
    pub fn with_default_words() -> Self {
        Self::from_words(DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()))
    }

    /// Build a filter from an arbitrary word list.
    ///
    /// Words are lower-cased; empty entries and duplicates are dropped,
    /// preserving first-seen order.
    pub fn from_words(words: impl IntoIterator<Item = String>) -> Self {
        let mut seen = Vec::new();
        for word in words {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !seen.contains(&word) {
                seen.push(word);
            }
        }
        Self { words: seen }
    }

    /// Find the first banned token contained in `normalized`.
    ///
    /// The input must already be lower-cased; the moderation pipeline
    /// normalizes once before checking both tiers.
    pub fn find_match(&self, normalized: &str) -> Option<&str> {
        self.words
            .iter()
            .find(|word| normalized.contains(word.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
