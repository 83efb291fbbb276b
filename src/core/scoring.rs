use crate::models::{Event, MatchWeights, Volunteer};

/// Calculate the match score of a volunteer for an event
///
/// Scoring formula:
/// score = (
///     shared_skills * weights.skill +       # every overlapping skill counts
///     location_match * weights.location +   # city == event location
///     date_match * weights.availability     # event date in availability
/// )
///
/// Returns the score and the skills the volunteer shares with the event,
/// in the volunteer's order.
pub fn calculate_match_score(
    volunteer: &Volunteer,
    event: &Event,
    weights: &MatchWeights,
) -> (u32, Vec<String>) {
    let matched_skills = shared_skills(volunteer, event);

    let skill_score = matched_skills.len() as u32 * weights.skill;

    let location_score = if matches_location(volunteer, event) {
        weights.location
    } else {
        0
    };

    let availability_score = if is_available(volunteer, event) {
        weights.availability
    } else {
        0
    };

    (skill_score + location_score + availability_score, matched_skills)
}

#[inline]
fn shared_skills(volunteer: &Volunteer, event: &Event) -> Vec<String> {
    volunteer
        .skills
        .iter()
        .filter(|skill| event.required_skills.contains(skill))
        .cloned()
        .collect()
}

/// Exact, case-sensitive comparison; a volunteer without a city never matches
#[inline]
fn matches_location(volunteer: &Volunteer, event: &Event) -> bool {
    volunteer.city.as_deref() == Some(event.location.as_str())
}

#[inline]
fn is_available(volunteer: &Volunteer, event: &Event) -> bool {
    event
        .scheduled_date()
        .is_some_and(|date| volunteer.availability.contains(&date))
}
