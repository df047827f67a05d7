use rust_decimal::Decimal;
use serde::Deserialize;

/// Per-participant interaction counts, as read from the interaction log.
///
/// Check-ins, poll votes and upvotes are unique per target in the store, and
/// downloads are counted by distinct resource, so recording the same
/// interaction twice leaves the counts unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionCounts {
    pub checkins: u64,
    pub poll_votes: u64,
    pub questions: u64,
    pub upvotes_given: u64,
    pub resources_downloaded: u64,
}

/// Weights of the engagement score, loaded from the `[engagement]` config section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub checkin: Decimal,
    pub poll_vote: Decimal,
    pub question: Decimal,
    pub upvote: Decimal,
    pub download: Decimal,
    /// Upper bound on a single participant's score. `None` means unbounded.
    pub max_score: Option<Decimal>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            checkin: Decimal::from(10),
            poll_vote: Decimal::from(5),
            question: Decimal::from(8),
            upvote: Decimal::from(2),
            download: Decimal::from(3),
            max_score: None,
        }
    }
}

impl ScoringPolicy {
    /// Reject policies that could make a score negative or shrink as activity grows.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("checkin", self.checkin),
            ("poll_vote", self.poll_vote),
            ("question", self.question),
            ("upvote", self.upvote),
            ("download", self.download),
        ];
        for (name, weight) in weights {
            if weight.is_sign_negative() {
                return Err(format!("engagement.{name} must be >= 0, got {weight}"));
            }
        }
        if let Some(max) = self.max_score
            && max.is_sign_negative()
        {
            return Err(format!("engagement.max_score must be >= 0, got {max}"));
        }
        Ok(())
    }

    /// Weighted sum of the counts, clamped to `max_score` and rounded to cents.
    pub fn score(&self, counts: &InteractionCounts) -> Decimal {
        let raw = self.checkin * Decimal::from(counts.checkins)
            + self.poll_vote * Decimal::from(counts.poll_votes)
            + self.question * Decimal::from(counts.questions)
            + self.upvote * Decimal::from(counts.upvotes_given)
            + self.download * Decimal::from(counts.resources_downloaded);

        let bounded = match self.max_score {
            Some(max) => raw.min(max),
            None => raw,
        };
        bounded.round_dp(2)
    }
}
