use serde::{Deserialize, Serialize};

/// Optional filters; blank values are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PriceQuery {
    pub state: String,
    pub district: String,
    pub commodity: String,
}

/// One normalized market price row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub market: String,
    pub district: String,
    pub commodity: String,
    pub min: f64,
    pub max: f64,
    pub modal: f64,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub success: bool,
    pub data: Vec<PriceRecord>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct StatesResponse {
    pub success: bool,
    pub states: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DistrictsRequest {
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct DistrictsResponse {
    pub success: bool,
    pub districts: Vec<&'static str>,
}
