use time::OffsetDateTime;
use tracing::{info, warn};

use crate::mandi::{
    client::PriceApi,
    dto::{PriceQuery, PriceResponse},
    fallback::sample_prices,
};

fn today() -> String {
    let d = OffsetDateTime::now_utc().date();
    format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
}

/// Live prices when the upstream API cooperates, filtered sample rows otherwise.
///
/// Upstream failures are never an error for the caller; they only add a note.
pub async fn get_mandi_prices(api: &PriceApi, query: &PriceQuery) -> PriceResponse {
    match api.fetch(query, &today()).await {
        Ok(data) => {
            info!(count = data.len(), "mandi prices from price api");
            PriceResponse {
                success: true,
                count: data.len(),
                data,
                note: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "price api unavailable, using sample data");
            let data = sample_prices(query.district.trim(), query.commodity.trim());
            PriceResponse {
                success: true,
                count: data.len(),
                data,
                note: Some(e.fallback_note()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::PriceApiConfig;

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

    fn query(district: &str, commodity: &str) -> PriceQuery {
        PriceQuery {
            state: "Punjab".into(),
            district: district.into(),
            commodity: commodity.into(),
        }
    }

    #[tokio::test]
    async fn live_data_has_no_note() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{ "market": "Khanna", "min_price": "1", "max_price": "2", "modal_price": "1.5" }]
            })))
            .mount(&server)
            .await;

        let res = get_mandi_prices(&api(&server.uri(), Some("k")), &query("", "")).await;
        assert!(res.success);
        assert_eq!(res.count, 1);
        assert!(res.note.is_none());
        assert_eq!(res.data[0].date, today());
    }

    #[tokio::test]
    async fn upstream_error_falls_back_to_filtered_samples() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let res = get_mandi_prices(&api(&server.uri(), Some("k")), &query("Ludhiana", "")).await;
        assert!(res.success);
        assert_eq!(res.count, 3);
        assert_eq!(res.note, Some("Using sample data - API key may be invalid"));
    }

    #[tokio::test]
    async fn timeout_falls_back_with_network_note() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
            .mount(&server)
            .await;

        let res = get_mandi_prices(&api(&server.uri(), Some("k")), &query("", "rice")).await;
        assert!(res.success);
        let names: Vec<_> = res.data.iter().map(|r| r.commodity.as_str()).collect();
        assert_eq!(names, vec!["Rice (Basmati)", "Rice"]);
        assert_eq!(res.note, Some("Network error - Using sample data"));
    }

    #[tokio::test]
    async fn missing_key_uses_samples_without_calling_upstream() {
        let res = get_mandi_prices(&api("http://127.0.0.1:9", None), &query("", "")).await;
        assert!(res.success);
        assert_eq!(res.count, 9);
        assert_eq!(res.note, Some("Price API not configured - Using sample data"));
    }
}
