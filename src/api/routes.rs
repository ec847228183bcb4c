use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::analyzer::VinAnalyzer;
use crate::error::AppError;
use crate::types::{DatabaseStatistics, RiskAssessment};

#[derive(Clone)]
pub struct ApiState {
    pub analyzer: Arc<VinAnalyzer>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/validate", post(validate))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/health", get(health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct VinRequest {
    pub vin: String,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub vin: String,
    pub exists: bool,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub database_statistics: DatabaseStatistics,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database_stats: DatabaseStatistics,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "VIN Risk Analyzer API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": "POST /api/v1/analyze",
            "validate": "POST /api/v1/validate",
            "stats": "GET /api/v1/stats",
            "health": "GET /api/v1/health",
        },
    }))
}

async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<VinRequest>,
) -> Result<Json<RiskAssessment>, AppError> {
    let assessment = state.analyzer.analyze(&request.vin).await?;
    Ok(Json(assessment))
}

async fn validate(
    State(state): State<ApiState>,
    Json(request): Json<VinRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let vin = crate::analyzer::normalize_vin(&request.vin)?;
    let exists = state.analyzer.vin_exists(&vin)?;
    Ok(Json(ValidateResponse {
        vin,
        exists,
        message: if exists { "VIN found in database" } else { "VIN not found in database" },
    }))
}

async fn stats(State(state): State<ApiState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        database_statistics: state.analyzer.stats().clone(),
        message: "Database statistics retrieved successfully",
    })
}

/// The store loads before the listener binds, so a process that answers at
/// all is healthy; a failed load aborts startup instead.
async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Service is operational",
        database_stats: state.analyzer.stats().clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    use crate::risk::RiskEngine;
    use crate::store::VehicleStore;
    use crate::types::VehicleRecord;

    const VIN: &str = "1HGCM82633A123456";

    fn app() -> Router {
        let store = VehicleStore::new(vec![
            VehicleRecord {
                vin: VIN.to_string(),
                year: 2023,
                make: "HONDA".to_string(),
                model: "ACCORD".to_string(),
                current_price: 10_000.0,
                price_to_market_percent: 98.0,
                days_on_lot: 10,
                mileage: 0,
                total_vdps: 250,
                sales_opportunities: 12,
            },
            VehicleRecord {
                vin: "2HGCM82633A123457".to_string(),
                year: 2019,
                make: "TOYOTA".to_string(),
                model: "CAMRY".to_string(),
                current_price: 20_000.0,
                price_to_market_percent: 105.0,
                days_on_lot: 45,
                mileage: 30_000,
                total_vdps: 75,
                sales_opportunities: 2,
            },
        ]);
        let analyzer =
            VinAnalyzer::new(store, None).with_engine(RiskEngine::with_year(2025));
        router(ApiState { analyzer: Arc::new(analyzer) })
    }

    fn post_vin(uri: &str, vin: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"vin": "{vin}"}}"#)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn analyze_known_vin_returns_assessment() {
        let response = app().oneshot(post_vin("/api/v1/analyze", VIN)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["vin"], VIN);
        assert_eq!(body["risk_score"], 1);
        assert_eq!(body["source"], "algorithmic");
        assert_eq!(body["factors"].as_array().unwrap().len(), 5);
        assert!(!body["summary"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_unknown_vin_is_404() {
        let response = app()
            .oneshot(post_vin("/api/v1/analyze", "9XGCM82633A999999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn analyze_malformed_vin_is_422() {
        let response = app().oneshot(post_vin("/api/v1/analyze", "short")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn validate_reports_existence() {
        let response = app().oneshot(post_vin("/api/v1/validate", VIN)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["exists"], true);

        let response = app()
            .oneshot(post_vin("/api/v1/validate", "9XGCM82633A999999"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["exists"], false);
    }

    #[tokio::test]
    async fn stats_reports_price_and_year_ranges() {
        let response = app()
            .oneshot(Request::get("/api/v1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let stats = &body["database_statistics"];
        assert_eq!(stats["total_vehicles"], 2);
        assert_eq!(stats["price_range"]["min"], 10_000.0);
        assert_eq!(stats["price_range"]["max"], 20_000.0);
        assert_eq!(stats["price_range"]["avg"], 15_000.0);
        assert_eq!(stats["year_range"]["min"], 2019);
        assert_eq!(stats["year_range"]["max"], 2023);
        assert_eq!(stats["makes"], serde_json::json!(["HONDA", "TOYOTA"]));
    }

    #[tokio::test]
    async fn health_is_healthy_with_loaded_store() {
        let response = app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database_stats"]["total_vehicles"], 2);
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "VIN Risk Analyzer API");
        assert!(body["endpoints"]["analyze"].is_string());
    }
}
