use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{accept_json, ApiError},
    i18n::Lang,
    mandi::{
        dto::{
            DistrictsRequest, DistrictsResponse, PriceQuery, PriceResponse, StatesResponse,
        },
        regions, services,
    },
    state::AppState,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/get-mandi-prices", post(get_mandi_prices))
        .route("/api/get-states", get(get_states))
        .route("/api/get-districts", post(get_districts))
}

#[instrument(skip(state, payload))]
pub async fn get_mandi_prices(
    State(state): State<AppState>,
    Lang(locale): Lang,
    payload: Result<Json<PriceQuery>, JsonRejection>,
) -> Result<Json<PriceResponse>, ApiError> {
    let query = accept_json(payload, locale)?;
    Ok(Json(services::get_mandi_prices(&state.prices, &query).await))
}

pub async fn get_states() -> Json<StatesResponse> {
    Json(StatesResponse {
        success: true,
        states: regions::states(),
    })
}

#[instrument(skip(payload))]
pub async fn get_districts(
    Lang(locale): Lang,
    payload: Result<Json<DistrictsRequest>, JsonRejection>,
) -> Result<Json<DistrictsResponse>, ApiError> {
    let req = accept_json(payload, locale)?;
    Ok(Json(DistrictsResponse {
        success: true,
        districts: regions::districts(req.state.trim()),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    async fn call(req: Request<Body>) -> (StatusCode, Value) {
        let (state, _) = AppState::fake().await;
        let res = api_routes().with_state(state).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn districts_for_punjab_and_unknown_state() {
        let (status, body) = call(post_json("/api/get-districts", r#"{"state":"Punjab"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["districts"].as_array().unwrap().len(), 10);
        assert_eq!(body["districts"][0], "Amritsar");

        let (_, body) = call(post_json("/api/get-districts", r#"{"state":"Nowhere"}"#)).await;
        assert_eq!(body["districts"], json!([]));
    }

    #[tokio::test]
    async fn states_are_listed() {
        let (status, body) = call(Request::get("/api/get-states").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["states"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn prices_fall_back_when_api_key_is_missing() {
        let (status, body) = call(post_json(
            "/api/get-mandi-prices",
            r#"{"state":"Punjab","district":"Ludhiana"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 3);
        assert!(body["note"].as_str().unwrap().contains("sample data"));
        assert_eq!(body["data"][0]["market"], "Ludhiana Grain Market");
        assert_eq!(body["data"][0]["modal"], 2150.0);
    }

    #[tokio::test]
    async fn malformed_price_request_reports_failure() {
        let (status, body) = call(post_json("/api/get-mandi-prices", "[1,2")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
