//! Dashboard metrics and admin reports built from store rows.

use std::collections::{HashMap, HashSet};

use crate::models::{
    parse_calendar_date, Event, EventReportRow, MetricsResponse, Notification, Participation,
    Volunteer, VolunteerHistory, VolunteerReportRow,
};

/// Compute dashboard metrics
///
/// Every participation row counts as one donated hour.
pub fn compute_metrics(events: &[Event], participations: &[Participation]) -> MetricsResponse {
    let total_events = events.len();
    let active_volunteers = participations
        .iter()
        .map(|p| p.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let hours_donated = participations.len();

    let rate = (active_volunteers as f64 / total_events.max(1) as f64) * 100.0;
    let engagement_rate = rate.round().min(100.0) as u32;

    MetricsResponse {
        total_events,
        active_volunteers,
        hours_donated,
        engagement_rate,
    }
}

/// Participation per volunteer, in order of first appearance in the history
pub fn volunteer_report(history: &[VolunteerHistory], volunteers: &[Volunteer]) -> Vec<VolunteerReportRow> {
    let names = name_index(volunteers);

    let mut rows: Vec<VolunteerReportRow> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for entry in history {
        let index = *positions.entry(entry.user_id.as_str()).or_insert_with(|| {
            rows.push(VolunteerReportRow {
                name: lookup_name(&names, &entry.user_id).to_string(),
                events_participated: 0,
                total_points: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[index];
        row.events_participated += 1;
        row.total_points += entry.points;
    }

    rows
}

/// History grouped by facility and calendar date
///
/// The description is taken from the first notification whose event name
/// matches the facility, ignoring case and surrounding whitespace.
pub fn grouped_events_report(
    history: &[VolunteerHistory],
    volunteers: &[Volunteer],
    notifications: &[Notification],
) -> Vec<EventReportRow> {
    let names = name_index(volunteers);

    let mut rows: Vec<EventReportRow> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for entry in history {
        let facility = entry.facility.trim().to_string();
        let date = parse_calendar_date(&entry.date)
            .map(|d| d.to_string())
            .unwrap_or_else(|| entry.date.trim().to_string());

        let index = *positions
            .entry((facility.clone(), date.clone()))
            .or_insert_with(|| {
                rows.push(EventReportRow {
                    description: describe(&facility, notifications),
                    event: facility,
                    date,
                    volunteers: Vec::new(),
                });
                rows.len() - 1
            });

        let name = lookup_name(&names, &entry.user_id);
        let row = &mut rows[index];
        if !row.volunteers.iter().any(|v| v == name) {
            row.volunteers.push(name.to_string());
        }
    }

    rows
}

fn name_index(volunteers: &[Volunteer]) -> HashMap<&str, &str> {
    volunteers
        .iter()
        .map(|v| (v.id.as_str(), v.display_name()))
        .collect()
}

fn lookup_name<'a>(names: &HashMap<&str, &'a str>, user_id: &str) -> &'a str {
    names.get(user_id).copied().unwrap_or("Unknown")
}

fn describe(facility: &str, notifications: &[Notification]) -> String {
    let wanted = facility.trim().to_lowercase();
    notifications
        .iter()
        .find(|n| !n.event.is_empty() && n.event.trim().to_lowercase() == wanted)
        .map(|n| n.message.clone())
        .unwrap_or_default()
}
