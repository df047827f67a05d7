//! Engagement aggregation: derived metrics computed from persisted facts.
//!
//! Every read takes an id and returns `Ok(None)` when the id is unknown.
//! Only store failures are errors.

mod aggregator;
mod error;
mod scoring;
mod tally;

pub use aggregator::{
    DEFAULT_TOP_ENGAGERS, compute_engagement_score, compute_event_stats, interaction_counts,
    rank_top_engagers, refresh_engagement_score, tally_poll_results,
};
pub use error::{EngagementError, is_unavailable};
pub use scoring::{InteractionCounts, ScoringPolicy};
pub use tally::tally;
