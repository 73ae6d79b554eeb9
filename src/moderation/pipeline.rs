//! Two-tier moderation pipeline.
//!
//! Classifies text against the static default filter first, then the
//! guild's custom list in storage order. The tier ordering decides which
//! rejection the user sees when both would match, so it must not change.

use std::sync::Arc;

use crate::common::error::StoreResult;
use crate::moderation::profanity::ProfanityFilter;
use crate::store::FilterStore;

/// Which moderation tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The static, process-wide default filter.
    Default,
    /// The guild's custom filter list.
    Custom,
}

/// Result of classifying a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Blocked { tier: Tier, word: String },
}

/// Composes the default filter and the per-guild store.
#[derive(Debug, Clone)]
pub struct ModerationPipeline {
    profanity: Arc<ProfanityFilter>,
    store: FilterStore,
}

impl ModerationPipeline {
    pub fn new(profanity: Arc<ProfanityFilter>, store: FilterStore) -> Self {
        Self { profanity, store }
    }

    /// Classify `text` for a guild.
    ///
    /// Custom words are re-read from the store on every call so the check
    /// always reflects committed writes. A store failure propagates; the
    /// caller fails the command rather than letting text through.
    pub async fn classify(&self, text: &str, guild_id: u64) -> StoreResult<Verdict> {
        let normalized = text.to_lowercase();

        if let Some(word) = self.profanity.find_match(&normalized) {
            return Ok(Verdict::Blocked {
                tier: Tier::Default,
                word: word.to_string(),
            });
        }

        for word in self.store.list(guild_id).await? {
            if normalized.contains(&word) {
                return Ok(Verdict::Blocked {
                    tier: Tier::Custom,
                    word,
                });
            }
        }

        Ok(Verdict::Allowed)
    }
}
