use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    config::PriceApiConfig,
    mandi::dto::{PriceQuery, PriceRecord},
};

pub const RESULT_LIMIT: u32 = 100;

/// Why the upstream price API could not be used.
#[derive(Debug, thiserror::Error)]
pub enum PriceApiError {
    #[error("price api key not configured")]
    NotConfigured,
    #[error("price api request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("price api returned status {0}")]
    Status(u16),
    #[error("price api response malformed: {0}")]
    Decode(String),
}

impl PriceApiError {
    /// Note attached to a response that fell back to sample data.
    pub fn fallback_note(&self) -> &'static str {
        match self {
            PriceApiError::NotConfigured => "Price API not configured - Using sample data",
            PriceApiError::Network(_) => "Network error - Using sample data",
            PriceApiError::Status(_) | PriceApiError::Decode(_) => {
                "Using sample data - API key may be invalid"
            }
        }
    }
}

#[derive(Serialize)]
struct Filters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    district: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commodity: Option<&'a str>,
}

impl<'a> Filters<'a> {
    fn from_query(q: &'a PriceQuery) -> Option<Self> {
        let keep = |s: &'a str| Some(s.trim()).filter(|s| !s.is_empty());
        let f = Filters {
            state: keep(&q.state),
            district: keep(&q.district),
            commodity: keep(&q.commodity),
        };
        (f.state.is_some() || f.district.is_some() || f.commodity.is_some()).then_some(f)
    }
}

#[derive(Deserialize)]
struct UpstreamBody {
    #[serde(default)]
    records: Vec<Map<String, Value>>,
}

/// Client for the government commodity price resource.
pub struct PriceApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PriceApi {
    pub fn new(client: reqwest::Client, cfg: &PriceApiConfig) -> Self {
        Self {
            client,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    /// One attempt, no retry. `today` fills records without an arrival date.
    pub async fn fetch(&self, query: &PriceQuery, today: &str) -> Result<Vec<PriceRecord>, PriceApiError> {
        let api_key = self.api_key.as_deref().ok_or(PriceApiError::NotConfigured)?;

        let mut params: Vec<(&str, String)> = vec![
            ("api-key", api_key.to_string()),
            ("format", "json".into()),
            ("limit", RESULT_LIMIT.to_string()),
        ];
        if let Some(filters) = Filters::from_query(query) {
            let encoded = serde_json::to_string(&filters)
                .map_err(|e| PriceApiError::Decode(e.to_string()))?;
            params.push(("filters", encoded));
        }

        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(PriceApiError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        let body: UpstreamBody =
            serde_json::from_slice(&bytes).map_err(|e| PriceApiError::Decode(e.to_string()))?;
        debug!(records = body.records.len(), "price api responded");

        body.records
            .iter()
            .map(|r| normalize(r, today))
            .collect()
    }
}

fn text(record: &Map<String, Value>, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "N/A".into(),
    }
}

// Upstream sends prices as strings ("2100") or numbers; absent means 0.
fn price(record: &Map<String, Value>, field: &str) -> Result<f64, PriceApiError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PriceApiError::Decode(format!("{field} out of range"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PriceApiError::Decode(format!("{field} is not numeric: {s:?}"))),
        Some(other) => Err(PriceApiError::Decode(format!("{field} has type {other}"))),
    }
}

fn normalize(record: &Map<String, Value>, today: &str) -> Result<PriceRecord, PriceApiError> {
    let date = match record.get("arrival_date") {
        Some(Value::String(s)) => s.clone(),
        _ => today.to_string(),
    };
    Ok(PriceRecord {
        market: text(record, "market"),
        district: text(record, "district"),
        commodity: text(record, "commodity"),
        min: price(record, "min_price")?,
        max: price(record, "max_price")?,
        modal: price(record, "modal_price")?,
        date,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn api(base_url: &str, api_key: Option<&str>) -> PriceApi {
        PriceApi::new(
            reqwest::Client::new(),
            &PriceApiConfig {
                base_url: base_url.into(),
                api_key: api_key.map(Into::into),
                timeout_secs: 1,
            },
        )
    }

    fn query(state: &str, district: &str, commodity: &str) -> PriceQuery {
        PriceQuery {
            state: state.into(),
            district: district.into(),
            commodity: commodity.into(),
        }
    }

    #[tokio::test]
    async fn sends_key_limit_and_filters_and_normalizes_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("api-key", "k"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "100"))
            .and(query_param("filters", r#"{"state":"Punjab","commodity":"Wheat"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    {
                        "market": "Khanna", "district": "Ludhiana", "commodity": "Wheat",
                        "min_price": "2100", "max_price": 2300, "modal_price": "2200.5",
                        "arrival_date": "06/10/2025"
                    },
                    { "commodity": "Wheat", "min_price": null }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rows = api(&server.uri(), Some("k"))
            .fetch(&query("Punjab", " ", "Wheat"), "2025-10-18")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].market, "Khanna");
        assert_eq!(rows[0].min, 2100.0);
        assert_eq!(rows[0].max, 2300.0);
        assert_eq!(rows[0].modal, 2200.5);
        assert_eq!(rows[0].date, "06/10/2025");
        assert_eq!(rows[1].market, "N/A");
        assert_eq!(rows[1].min, 0.0);
        assert_eq!(rows[1].date, "2025-10-18");
    }

    #[tokio::test]
    async fn no_filters_param_without_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
            .mount(&server)
            .await;

        let rows = api(&server.uri(), Some("k"))
            .fetch(&PriceQuery::default(), "2025-10-18")
            .await
            .unwrap();
        assert!(rows.is_empty());

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "filters"));
    }

    #[tokio::test]
    async fn failures_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        let err = api(&server.uri(), Some("k"))
            .fetch(&PriceQuery::default(), "2025-10-18")
            .await
            .unwrap_err();
        assert!(matches!(err, PriceApiError::Status(403)));
        assert_eq!(err.fallback_note(), "Using sample data - API key may be invalid");

        let err = api(&server.uri(), None)
            .fetch(&PriceQuery::default(), "2025-10-18")
            .await
            .unwrap_err();
        assert!(matches!(err, PriceApiError::NotConfigured));
    }

    #[tokio::test]
    async fn non_numeric_price_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{ "min_price": "n/a" }]
            })))
            .mount(&server)
            .await;
        let err = api(&server.uri(), Some("k"))
            .fetch(&PriceQuery::default(), "2025-10-18")
            .await
            .unwrap_err();
        assert!(matches!(err, PriceApiError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "records": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
        let err = api(&server.uri(), Some("k"))
            .fetch(&PriceQuery::default(), "2025-10-18")
            .await
            .unwrap_err();
        assert!(matches!(err, PriceApiError::Network(_)));
        assert_eq!(err.fallback_note(), "Network error - Using sample data");
    }
}
