// Model exports
pub mod domain;
pub mod fields;
pub mod requests;
pub mod responses;

pub use domain::{
    AuthUser, Event, EventDraft, MatchWeights, Notification, NotificationDraft, Participation,
    ProfileDraft, ScoredVolunteer, Session, SignUpOutcome, Urgency, Volunteer, VolunteerHistory,
};
pub use fields::{parse_calendar_date, Availability};
pub use requests::{CredentialsRequest, EventRequest, NotificationRequest, ProfileRequest};
pub use responses::{
    ErrorResponse, EventReportResponse, EventReportRow, EventResponse, EventsResponse,
    HealthResponse, MatchesResponse, MessageResponse, MetricsResponse, NotificationsResponse,
    SendNotificationResponse, SessionResponse, SignUpResponse, UserResponse,
    VolunteerReportResponse, VolunteerReportRow, VolunteerResponse, VolunteersResponse,
};
