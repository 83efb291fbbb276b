use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::domain::{EventDraft, NotificationDraft, ProfileDraft, Urgency};
use super::fields::{normalize_skills, parse_calendar_date, Availability};

/// Request to create or update an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 100, message = "Event name must be 1-100 characters"))]
    #[serde(alias = "name")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required"))]
    #[serde(default)]
    pub location: String,
    #[validate(length(min = 1, message = "At least one skill is required"))]
    #[serde(rename = "requiredSkills", alias = "required_skills", alias = "skills", default)]
    pub required_skills: Vec<String>,
    pub urgency: Urgency,
    #[validate(custom(function = "validate_date"))]
    pub date: String,
}

impl EventRequest {
    pub fn into_draft(self) -> EventDraft {
        EventDraft {
            title: self.title.trim().to_string(),
            description: self.description,
            location: self.location.trim().to_string(),
            required_skills: normalize_skills(self.required_skills),
            urgency: self.urgency,
            date: self.date,
        }
    }
}

/// Request to create or update the caller's volunteer profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Full name is required and must be under 50 characters"))]
    #[serde(alias = "fullName", alias = "name")]
    pub full_name: String,
    #[validate(length(min = 1, max = 100, message = "Address is required and must be under 100 characters"))]
    #[serde(alias = "address1")]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required and must be under 100 characters"))]
    pub city: String,
    #[validate(length(min = 1, message = "State selection is required"))]
    pub state: String,
    #[validate(custom(function = "validate_zip_code"))]
    #[serde(alias = "zipCode", alias = "zip")]
    pub zip_code: String,
    #[validate(length(min = 1, message = "At least one skill must be selected"))]
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferences: Option<String>,
    #[validate(
        length(min = 1, message = "At least one date must be selected"),
        custom(function = "validate_availability")
    )]
    #[serde(default)]
    pub availability: Vec<String>,
}

impl ProfileRequest {
    pub fn into_draft(self, id: String) -> ProfileDraft {
        ProfileDraft {
            id,
            full_name: self.full_name.trim().to_string(),
            address: self.address,
            city: self.city.trim().to_string(),
            state: self.state,
            zip_code: self.zip_code,
            skills: normalize_skills(self.skills),
            preferences: self.preferences.filter(|p| !p.trim().is_empty()),
            availability: Availability::from_strings(&self.availability),
            role: "user".to_string(),
        }
    }
}

/// Request to send a notification
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationRequest {
    #[validate(required, length(min = 1))]
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub event: Option<String>,
    #[validate(required, length(min = 1))]
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl NotificationRequest {
    /// Convert after validation; `None` if a required field is missing.
    pub fn into_draft(self) -> Option<NotificationDraft> {
        Some(NotificationDraft {
            kind: self.kind?,
            event: self.event?,
            message: self.message?,
            status: self.status.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Email and password for sign-up and sign-in
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    parse_calendar_date(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_date"))
}

fn validate_zip_code(value: &str) -> Result<(), ValidationError> {
    let is_digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());

    let valid = match value.split_once('-') {
        Some((head, tail)) => is_digits(head, 5) && is_digits(tail, 4),
        None => is_digits(value, 5),
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_zip_code"))
    }
}

fn validate_availability(dates: &[String]) -> Result<(), ValidationError> {
    if dates.iter().all(|d| parse_calendar_date(d).is_some()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_availability_date"))
    }
}
