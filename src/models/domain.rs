use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{
    deserialize_count, deserialize_id, deserialize_or_default, deserialize_skills,
    parse_calendar_date, Availability,
};

/// Volunteer profile as stored in the `profile` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "name", alias = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(alias = "location", default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(alias = "zipCode", default)]
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_skills")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferences: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub role: Option<String>,
}

impl Volunteer {
    /// Display name, falling back to "Unknown" like the reports do
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
    }
}

/// Volunteering event as stored in the `events` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "name", default, deserialize_with = "deserialize_or_default")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub location: String,
    #[serde(alias = "requiredSkills", default, deserialize_with = "deserialize_skills")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_urgency")]
    pub urgency: Option<Urgency>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub date: String,
    #[serde(alias = "currentParticipants", default, deserialize_with = "deserialize_count")]
    pub current_participants: u32,
    #[serde(alias = "requiredParticipants", default, deserialize_with = "deserialize_count")]
    pub required_participants: u32,
}

impl Event {
    /// Scheduled calendar date with the time of day dropped
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }

    pub fn open_slots(&self) -> u32 {
        self.required_participants.saturating_sub(self.current_participants)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

/// Unknown urgency labels read back from the store become `None`
fn deserialize_urgency<'de, D>(deserializer: D) -> Result<Option<Urgency>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(format!("unknown urgency level: {}", other)),
        }
    }
}

/// Event fields written on create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub urgency: Urgency,
    pub date: String,
}

/// Profile fields written on upsert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDraft {
    pub id: String,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub skills: Vec<String>,
    pub preferences: Option<String>,
    pub availability: Availability,
    pub role: String,
}

/// Notification row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub event: String,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sent: Option<String>,
}

/// Notification fields written on send
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub event: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One volunteer's attendance at a facility, from `volunteer_history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerHistory {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub points: i64,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub facility: String,
    #[serde(default, deserialize_with = "deserialize_or_default")]
    pub date: String,
}

/// Sign-up of a volunteer to an event, from `volunteer_events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
}

/// Authenticated user as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Auth session returned on sign-in and (when confirmation is off) sign-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Outcome of a sign-up; the session is absent when email confirmation is required
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<Session>,
}

/// Volunteer decorated with its match score for one event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredVolunteer {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
    #[serde(rename = "matchedSkills")]
    pub matched_skills: Vec<String>,
}

/// Points awarded per matching criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWeights {
    /// Points per skill shared by volunteer and event
    pub skill: u32,
    /// Points when the volunteer's city equals the event location
    pub location: u32,
    /// Points when the event date is in the volunteer's availability
    pub availability: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill: 2,
            location: 3,
            availability: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_volunteer_from_profile_row() {
        let volunteer: Volunteer = serde_json::from_value(json!({
            "id": "0b5c",
            "full_name": "Jane Smith",
            "city": "Houston",
            "skills": ["Teaching", "Counseling"],
            "availability": "2024-02-25",
            "role": "user"
        }))
        .unwrap();

        assert_eq!(volunteer.display_name(), "Jane Smith");
        assert_eq!(volunteer.city.as_deref(), Some("Houston"));
        assert_eq!(volunteer.availability.len(), 1);
    }

    #[test]
    fn test_volunteer_display_name_fallback() {
        let volunteer = Volunteer {
            id: "1".to_string(),
            full_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(volunteer.display_name(), "Unknown");
    }

    #[test]
    fn test_event_numeric_id_and_string_skills() {
        let event: Event = serde_json::from_value(json!({
            "id": 42,
            "title": "Food Bank Distribution",
            "location": "Downtown Center",
            "required_skills": "[\"Driving\"]",
            "urgency": "high",
            "date": "2024-02-13T09:00:00Z",
            "current_participants": null
        }))
        .unwrap();

        assert_eq!(event.id, "42");
        assert_eq!(event.required_skills, vec!["Driving"]);
        assert_eq!(event.urgency, Some(Urgency::High));
        assert_eq!(event.current_participants, 0);
        assert_eq!(
            event.scheduled_date(),
            NaiveDate::from_ymd_opt(2024, 2, 13)
        );
    }

    #[test]
    fn test_rows_with_null_columns() {
        let events: Vec<Event> = serde_json::from_value(json!([
            { "id": 1, "title": "Food Drive", "location": null, "description": null,
              "required_skills": null, "urgency": null, "date": null,
              "current_participants": null, "required_participants": null },
            { "id": 2, "title": null, "location": "Houston", "date": "2024-03-20" }
        ]))
        .unwrap();
        assert_eq!(events[0].location, "");
        assert_eq!(events[0].date, "");
        assert!(events[0].scheduled_date().is_none());
        assert_eq!(events[1].title, "");
        assert_eq!(events[1].location, "Houston");

        let notification: Notification = serde_json::from_value(json!({
            "id": 3, "type": null, "event": null, "message": null, "status": null, "sent": null
        }))
        .unwrap();
        assert_eq!(notification.event, "");
        assert_eq!(notification.message, "");

        let history: VolunteerHistory = serde_json::from_value(json!({
            "user_id": "u1", "points": null, "facility": null, "date": null
        }))
        .unwrap();
        assert_eq!(history.points, 0);
        assert_eq!(history.facility, "");
        assert_eq!(history.date, "");
    }

    #[test]
    fn test_event_open_slots() {
        let event = Event {
            id: "1".to_string(),
            current_participants: 12,
            required_participants: 10,
            ..Default::default()
        };
        assert_eq!(event.open_slots(), 0);
    }

    #[test]
    fn test_urgency_parse() {
        assert_eq!("Critical".parse::<Urgency>(), Ok(Urgency::Critical));
        assert!("urgent".parse::<Urgency>().is_err());

        let event: Event = serde_json::from_value(json!({ "id": "e1", "urgency": "URGENT" })).unwrap();
        assert_eq!(event.urgency, None);
    }

    #[test]
    fn test_scored_volunteer_serializes_flat() {
        let scored = ScoredVolunteer {
            volunteer: Volunteer {
                id: "v1".to_string(),
                full_name: Some("John Doe".to_string()),
                ..Default::default()
            },
            match_score: 7,
            matched_skills: vec!["Driving".to_string()],
        };

        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], "v1");
        assert_eq!(value["full_name"], "John Doe");
        assert_eq!(value["matchScore"], 7);
        assert_eq!(value["matchedSkills"], json!(["Driving"]));
    }

    #[test]
    fn test_default_weights() {
        let weights = MatchWeights::default();
        assert_eq!(weights.skill, 2);
        assert_eq!(weights.location, 3);
        assert_eq!(weights.availability, 3);
    }
}
