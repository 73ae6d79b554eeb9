//! Two-tier content moderation.
//!
//! The default tier is a static banned-word table compiled into the binary;
//! the custom tier is the per-guild list kept in the filter store.

pub mod pipeline;
pub mod profanity;

pub use pipeline::{ModerationPipeline, Tier, Verdict};
pub use profanity::ProfanityFilter;
