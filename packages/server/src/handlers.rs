//! HTTP handler functions for the crowd planner API.

use actix_web::{HttpResponse, web};
use crowd_planner_events::{EventChannel, publish_serialized};
use crowd_planner_ingest::{EstimateError, ingest_frame as run_frame_ingest, ingest_sensor};
use crowd_planner_ingest_models::SensorReading;
use crowd_planner_server_models::{
    ApiHealth, ApiRoot, DashboardResponse, FrameQueryParams, IngestAck,
};
use crowd_planner_strategy::generate_recommendations;
use crowd_planner_zone_models::ZoneStatus;

use crate::AppState;

/// `GET /`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ApiRoot {
        message: "Crowd planner backend running".to_string(),
        api: "/api".to_string(),
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        zone_count: state.store.len(),
    })
}

/// `POST /api/ingest/frame?zone_id=...`
///
/// Runs the crowd estimator over the raw image body and records the
/// estimate for the zone.
pub async fn ingest_frame(
    state: web::Data<AppState>,
    params: web::Query<FrameQueryParams>,
    body: web::Bytes,
) -> HttpResponse {
    if params.zone_id.trim().is_empty() {
        return bad_request("zone_id must not be empty");
    }

    match run_frame_ingest(
        &state.store,
        state.estimator.as_ref(),
        state.events.as_ref(),
        &params.zone_id,
        &body,
    )
    .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(EstimateError::Decode { message }) => {
            log::warn!("Could not decode frame for zone {}: {message}", params.zone_id);
            bad_request("Could not decode image")
        }
        Err(EstimateError::Unavailable) => {
            log::error!("Frame for zone {} dropped: crowd model unavailable", params.zone_id);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "error": "Crowd model unavailable"
            }))
        }
        Err(e) => {
            log::error!("Failed to estimate crowd for zone {}: {e}", params.zone_id);
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Failed to estimate crowd"
            }))
        }
    }
}

/// `POST /api/ingest/iot`
///
/// Records a direct sensor reading.
pub async fn ingest_iot(
    state: web::Data<AppState>,
    reading: web::Json<SensorReading>,
) -> HttpResponse {
    if reading.zone_id.trim().is_empty() {
        return bad_request("zone_id must not be empty");
    }

    ingest_sensor(&state.store, state.events.as_ref(), &reading);

    HttpResponse::Ok().json(IngestAck::ok(reading.zone_id.clone()))
}

/// `GET /api/zones`
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(sorted_zones(&state))
}

/// `GET /api/zones/{zone_id}`
pub async fn zone(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.store.get(&path) {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Zone not found"
        })),
    }
}

/// `GET /api/dashboard`
///
/// Returns every zone with its recommendation and publishes the same
/// snapshot on the `zone_status` channel.
pub async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    let zones = sorted_zones(&state);
    let recommendations = generate_recommendations(&zones);
    let response = DashboardResponse {
        zones,
        recommendations,
    };

    publish_serialized(state.events.as_ref(), EventChannel::ZoneStatus, &response);

    HttpResponse::Ok().json(response)
}

/// Store snapshot ordered by zone ID so responses are stable.
fn sorted_zones(state: &AppState) -> Vec<ZoneStatus> {
    let mut zones = state.store.list_all();
    zones.sort_by(|a, b| a.zone_id.cmp(&b.zone_id));
    zones
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test};
    use crowd_planner_events::RecordingSink;
    use crowd_planner_ingest::{CrowdEstimator, UnavailableEstimator};
    use crowd_planner_ingest_models::{CrowdEstimate, FrameIngestResult};
    use crowd_planner_zone_models::{DensityLevel, Priority, ZoneObservation};
    use serde_json::json;

    use super::*;
    use crate::configure;

    struct FixedEstimator(u32);

    #[async_trait::async_trait]
    impl CrowdEstimator for FixedEstimator {
        async fn estimate(&self, frame: &[u8]) -> Result<CrowdEstimate, EstimateError> {
            if frame.is_empty() {
                return Err(EstimateError::Decode {
                    message: "empty frame".to_string(),
                });
            }
            Ok(CrowdEstimate::from_count(self.0))
        }
    }

    fn state_with(estimator: Arc<dyn CrowdEstimator>) -> (web::Data<AppState>, RecordingSink) {
        let events = RecordingSink::new();
        let state = web::Data::new(AppState::new(estimator, Arc::new(events.clone())));
        (state, events)
    }

    #[actix_web::test]
    async fn health_reports_zone_count() {
        let (state, _) = state_with(Arc::new(UnavailableEstimator));
        state
            .store
            .update("z1", ZoneObservation::new(1, DensityLevel::Low));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["zone_count"], 1);
    }

    #[actix_web::test]
    async fn root_points_at_api() {
        let (state, _) = state_with(Arc::new(UnavailableEstimator));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["api"], "/api");
    }

    #[actix_web::test]
    async fn iot_ingest_updates_zone() {
        let (state, events) = state_with(Arc::new(UnavailableEstimator));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/ingest/iot")
            .set_json(json!({
                "zone_id": "gate_a",
                "people_count": 120,
                "temperature": 28.5,
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({"status": "ok", "zone_id": "gate_a"}));
        let status = state.store.get("gate_a").unwrap();
        assert_eq!(status.density_level, DensityLevel::Critical);
        assert_eq!(status.temperature, Some(28.5));
        assert_eq!(events.events_on(EventChannel::IotEvents).len(), 1);
    }

    #[actix_web::test]
    async fn iot_ingest_rejects_empty_zone() {
        let (state, _) = state_with(Arc::new(UnavailableEstimator));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/ingest/iot")
            .set_json(json!({"zone_id": "  "}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.is_empty());
    }

    #[actix_web::test]
    async fn frame_ingest_records_estimate() {
        let (state, events) = state_with(Arc::new(FixedEstimator(64)));
        state.store.update(
            "hall",
            ZoneObservation::new(3, DensityLevel::Low).with_temperature(Some(33.0)),
        );
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/ingest/frame?zone_id=hall")
            .set_payload(&b"\xff\xd8\xff\xe0fake-jpeg"[..])
            .to_request();
        let body: FrameIngestResult = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.estimated_people, 64);
        assert_eq!(body.density_level, DensityLevel::High);
        let status = state.store.get("hall").unwrap();
        assert_eq!(status.temperature, Some(33.0));
        assert_eq!(events.events_on(EventChannel::CameraFrames).len(), 1);
    }

    #[actix_web::test]
    async fn frame_ingest_maps_estimator_errors() {
        let (state, _) = state_with(Arc::new(UnavailableEstimator));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/ingest/frame?zone_id=hall")
            .set_payload(&b"jpeg"[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (state, _) = state_with(Arc::new(FixedEstimator(5)));
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/ingest/frame?zone_id=hall")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.get("hall").is_none());
    }

    #[actix_web::test]
    async fn frame_ingest_requires_zone_id() {
        let (state, _) = state_with(Arc::new(FixedEstimator(5)));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/ingest/frame")
            .set_payload(&b"jpeg"[..])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn zone_lookup() {
        let (state, _) = state_with(Arc::new(UnavailableEstimator));
        state
            .store
            .update("z1", ZoneObservation::new(80, DensityLevel::High));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/zones/z1").to_request();
        let body: ZoneStatus = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.estimated_people, 80);

        let req = test::TestRequest::get().uri("/api/zones/Z1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn dashboard_pairs_zones_with_recommendations() {
        let (state, events) = state_with(Arc::new(UnavailableEstimator));
        state.store.update(
            "b",
            ZoneObservation::new(150, DensityLevel::Critical)
                .with_temperature(Some(36.0))
                .with_queue_length(Some(35)),
        );
        state
            .store
            .update("a", ZoneObservation::new(2, DensityLevel::Low));
        let app = test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/dashboard").to_request();
        let body: DashboardResponse = test::call_and_read_body_json(&app, req).await;

        let ids: Vec<&str> = body.zones.iter().map(|z| z.zone_id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(body.recommendations.len(), 2);
        assert_eq!(
            body.recommendations[0].message,
            "Zone a: Situation normal. Continue monitoring."
        );
        assert_eq!(body.recommendations[1].priority, Priority::Critical);

        let published = events.events_on(EventChannel::ZoneStatus);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0]["recommendations"][1]["zone_id"], "b");
    }
}
