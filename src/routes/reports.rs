use actix_web::{web, HttpResponse};

use crate::core::{compute_metrics, grouped_events_report, volunteer_report};
use crate::error::ApiError;
use crate::models::{EventReportResponse, VolunteerReportResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics))
        .route("/reports/volunteers", web::get().to(volunteers_report))
        .route("/reports/events", web::get().to(events_report));
}

/// Dashboard metrics
///
/// GET /api/metrics
async fn metrics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (events, participations) =
        tokio::try_join!(state.store.list_events(), state.store.list_participations())?;

    Ok(HttpResponse::Ok().json(compute_metrics(&events, &participations)))
}

async fn volunteers_report(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (history, volunteers) =
        tokio::try_join!(state.store.list_volunteer_history(), state.store.list_volunteers())?;

    Ok(HttpResponse::Ok().json(VolunteerReportResponse {
        report: volunteer_report(&history, &volunteers),
    }))
}

async fn events_report(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (history, volunteers, notifications) = tokio::try_join!(
        state.store.list_volunteer_history(),
        state.store.list_volunteers(),
        state.store.list_notifications()
    )?;

    Ok(HttpResponse::Ok().json(EventReportResponse {
        events: grouped_events_report(&history, &volunteers, &notifications),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, Participation, Volunteer, VolunteerHistory};
    use crate::routes::test_support::state_with;
    use crate::services::MemoryStore;
    use actix_web::{test, App};
    use serde_json::Value;
    use std::sync::Arc;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let history = |user: &str, points: i64, facility: &str| VolunteerHistory {
            user_id: user.to_string(),
            points,
            facility: facility.to_string(),
            date: "2024-02-14".to_string(),
        };
        store
            .seed(
                vec![Event::default(), Event::default()],
                vec![Volunteer {
                    id: "a".to_string(),
                    full_name: Some("Ana".to_string()),
                    ..Default::default()
                }],
                vec![history("a", 5, "Park"), history("a", 2, "Park"), history("b", 1, "Park")],
                vec![
                    Participation { user_id: "a".to_string() },
                    Participation { user_id: "b".to_string() },
                    Participation { user_id: "b".to_string() },
                ],
            )
            .await;
        store
    }

    #[actix_web::test]
    async fn test_metrics_and_reports() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(seeded_store().await)))
                .service(web::scope("/api").configure(configure)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/metrics").to_request();
        let metrics: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(metrics["totalEvents"], 2);
        assert_eq!(metrics["activeVolunteers"], 2);
        assert_eq!(metrics["hoursDonated"], 3);
        assert_eq!(metrics["engagementRate"], 100);

        let req = test::TestRequest::get().uri("/api/reports/volunteers").to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["report"][0]["name"], "Ana");
        assert_eq!(report["report"][0]["totalPoints"], 7);
        assert_eq!(report["report"][1]["name"], "Unknown");

        let req = test::TestRequest::get().uri("/api/reports/events").to_request();
        let events: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(events["events"][0]["event"], "Park");
        assert_eq!(events["events"][0]["volunteers"], serde_json::json!(["Ana", "Unknown"]));
    }
}
