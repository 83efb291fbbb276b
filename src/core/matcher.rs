use crate::core::scoring::calculate_match_score;
use crate::models::{Event, MatchWeights, ScoredVolunteer, Volunteer};

/// Default shortlist length
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Default score threshold; only volunteers scoring strictly above it are kept
pub const DEFAULT_MIN_SCORE: u32 = 0;

/// Volunteer-to-event matcher
///
/// # Pipeline Stages
/// 1. Score every volunteer against the event
/// 2. Drop volunteers at or below the minimum score
/// 3. Stable sort by score, descending
/// 4. Truncate to the shortlist length
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: MatchWeights,
    min_score: u32,
    max_results: usize,
}

impl Matcher {
    pub fn new(weights: MatchWeights, min_score: u32, max_results: usize) -> Self {
        Self {
            weights,
            min_score,
            max_results,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(MatchWeights::default(), DEFAULT_MIN_SCORE, DEFAULT_MAX_RESULTS)
    }

    pub fn weights(&self) -> &MatchWeights {
        &self.weights
    }

    /// Rank volunteers for an event
    ///
    /// Neither input is modified. Volunteers with equal scores keep their
    /// relative input order.
    pub fn rank_volunteers(&self, event: &Event, volunteers: &[Volunteer]) -> Vec<ScoredVolunteer> {
        let mut scored: Vec<ScoredVolunteer> = volunteers
            .iter()
            .filter_map(|volunteer| {
                let (score, matched_skills) = calculate_match_score(volunteer, event, &self.weights);

                if score > self.min_score {
                    Some(ScoredVolunteer {
                        volunteer: volunteer.clone(),
                        match_score: score,
                        matched_skills,
                    })
                } else {
                    None
                }
            })
            .collect();

        // `sort_by` is stable, which keeps ties in input order
        scored.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        scored.truncate(self.max_results);

        tracing::debug!(
            "Ranked {} of {} volunteers for event {}",
            scored.len(),
            volunteers.len(),
            event.id
        );

        scored
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Rank volunteers for an event with the default weights and limits
pub fn rank_volunteers(event: &Event, volunteers: &[Volunteer]) -> Vec<ScoredVolunteer> {
    Matcher::default().rank_volunteers(event, volunteers)
}
