// Core algorithm exports
pub mod matcher;
pub mod reports;
pub mod scoring;

pub use matcher::{rank_volunteers, Matcher, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE};
pub use reports::{compute_metrics, grouped_events_report, volunteer_report};
pub use scoring::calculate_match_score;
