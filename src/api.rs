//! HTTP client for the JDM Pulse prediction service.
//!
//! The backend owns every interesting computation: bid prediction, quantile
//! spreads, and the full Bangladesh duty calculation. This module only
//! models the wire shapes and moves JSON across one POST endpoint, so the
//! response types mirror the service contract field for field.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestCache, RequestInit, Response};

use crate::Vehicle;

/// Backend address used when no override is baked in at build time.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8001";

/// Base URL of the prediction service, overridable via the `API_BASE_URL`
/// environment variable at compile time.
pub fn api_base() -> &'static str {
    option_env!("API_BASE_URL").unwrap_or(DEFAULT_API_BASE)
}

/// Body of `POST /predict`. Vehicle fields sit at the top level of the JSON
/// object; `user_bid_jpy` is serialized as `null` when absent because the
/// backend treats null as "cost out your own recommendation".
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub user_bid_jpy: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_win_prob: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyConversion {
    pub jpy_to_bdt_rate: f64,
    #[serde(default)]
    pub total_japan_cost_jpy: u64,
    #[serde(default)]
    pub total_japan_cost_bdt: u64,
}

/// Japan-side acquisition costs, all in JPY.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JapanCosts {
    pub winning_bid: u64,
    pub auction_fee: u64,
    pub export_certificate: u64,
    pub freight_inspection: u64,
    pub shipping: u64,
    pub total: u64,
}

/// Bangladesh customs assessment, all in BDT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DutyBreakdown {
    pub cif_value: u64,
    pub customs_duty: u64,
    pub supplementary_duty: u64,
    pub vat: u64,
    pub advance_tax: u64,
    pub ait: u64,
    pub regulatory_duty: u64,
    pub environmental_surcharge: u64,
    pub total_duties: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalCosts {
    pub clearing_agent_fee: u64,
    pub brta_registration: u64,
    pub documentation_fee: u64,
    pub total: u64,
}

/// Everything `POST /predict` returns. The optional tail fields arrived in a
/// later backend revision, so they default to `None` against older servers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictResponse {
    pub predicted_winning_bid_jpy: u64,
    pub user_bid_jpy: Option<u64>,
    pub bid_used_for_calculation: u64,
    pub currency_conversion: CurrencyConversion,
    pub japan_costs_jpy: JapanCosts,
    pub bangladesh_duties_bdt: DutyBreakdown,
    pub local_costs_bdt: LocalCosts,
    pub total_landed_cost_bdt: u64,
    pub total_landed_cost_usd: u64,
    pub duty_percentage: f64,
    #[serde(default)]
    pub q20_jpy: Option<u64>,
    #[serde(default)]
    pub q50_jpy: Option<u64>,
    #[serde(default)]
    pub q80_jpy: Option<u64>,
    #[serde(default)]
    pub recommended_bid_jpy: Option<u64>,
    #[serde(default)]
    pub platform_fee_bdt: Option<u64>,
    #[serde(default)]
    pub total_incl_platform_bdt: Option<u64>,
}

impl PredictResponse {
    /// True when the backend supplied the full q20/q50/q80 spread.
    pub fn has_quantiles(&self) -> bool {
        self.q20_jpy.is_some() && self.q50_jpy.is_some() && self.q80_jpy.is_some()
    }

    /// Final price including the platform fee. The server value wins when
    /// present; otherwise it is derived by summation, leaving the
    /// server-provided duty figures untouched.
    pub fn total_incl_platform(&self) -> u64 {
        self.total_incl_platform_bdt
            .unwrap_or_else(|| self.total_landed_cost_bdt + self.platform_fee_bdt.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub is_model_loaded: bool,
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never completed: DNS, CORS, connection refused, ...
    Network(String),
    /// The backend answered with a non-2xx status; body kept verbatim.
    Status { code: u16, body: String },
    /// A 2xx answer whose body did not match the expected shape.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "{}", msg),
            ApiError::Status { code, body } => write!(f, "API error {}: {}", code, body),
            ApiError::Decode(msg) => write!(f, "Unexpected response from backend: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Best-effort message out of a thrown JS value.
fn js_message(value: JsValue, fallback: &str) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

async fn response_body_text(response: &Response) -> String {
    match response.text() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

async fn check_and_decode<T: for<'de> Deserialize<'de>>(
    response: Response,
) -> Result<T, ApiError> {
    if !response.ok() {
        let body = response_body_text(&response).await;
        return Err(ApiError::Status {
            code: response.status(),
            body,
        });
    }
    let promise = response
        .json()
        .map_err(|e| ApiError::Decode(js_message(e, "response body was not JSON")))?;
    let json = JsFuture::from(promise)
        .await
        .map_err(|e| ApiError::Decode(js_message(e, "response body was not JSON")))?;
    serde_wasm_bindgen::from_value(json).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn fetch_response(url: &str, init: &RequestInit) -> Result<Response, ApiError> {
    let window = gloo_utils::window();
    JsFuture::from(window.fetch_with_str_and_init(url, init))
        .await
        .map_err(|e| ApiError::Network(js_message(e, "network request failed")))?
        .dyn_into()
        .map_err(|_| ApiError::Network("fetch did not yield a Response".to_string()))
}

/// Submit a vehicle for prediction and landed-cost calculation.
pub async fn analyze_vehicle(request: &PredictRequest) -> Result<PredictResponse, ApiError> {
    let url = format!("{}/predict", api_base());
    debug!(
        "POST {} bid={:?} target={:?}",
        url, request.user_bid_jpy, request.target_win_prob
    );

    let body = serde_json::to_string(request).map_err(|e| ApiError::Decode(e.to_string()))?;
    let headers =
        Headers::new().map_err(|e| ApiError::Network(js_message(e, "failed to build request")))?;
    headers
        .append("Content-Type", "application/json")
        .map_err(|e| ApiError::Network(js_message(e, "failed to build request")))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    init.set_cache(RequestCache::NoStore);

    let response = fetch_response(&url, &init).await?;
    check_and_decode(response).await
}

/// Probe the backend's health endpoint.
pub async fn fetch_health() -> Result<HealthResponse, ApiError> {
    let url = format!("{}/health", api_base());
    let init = RequestInit::new();
    init.set_method("GET");
    init.set_cache(RequestCache::NoStore);

    let response = fetch_response(&url, &init).await?;
    check_and_decode(response).await
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use serde_json::{json, Value};

    /// A `/predict` answer shaped like the live backend's, every optional
    /// field present. Figures are the real duty math for a ¥5,000,000 bid on
    /// a 3500cc 2022 vehicle.
    pub fn full_payload() -> Value {
        json!({
            "predicted_winning_bid_jpy": 5_000_000u64,
            "user_bid_jpy": null,
            "bid_used_for_calculation": 5_266_667u64,
            "currency_conversion": {
                "jpy_to_bdt_rate": 0.72,
                "total_japan_cost_jpy": 5_440_000u64,
                "total_japan_cost_bdt": 3_916_800u64
            },
            "japan_costs_jpy": {
                "winning_bid": 5_000_000u64,
                "auction_fee": 250_000u64,
                "export_certificate": 15_000u64,
                "freight_inspection": 25_000u64,
                "shipping": 150_000u64,
                "total": 5_440_000u64
            },
            "bangladesh_duties_bdt": {
                "cif_value": 3_916_800u64,
                "customs_duty": 19_584_000u64,
                "supplementary_duty": 10_575_360u64,
                "vat": 5_111_424u64,
                "advance_tax": 1_703_808u64,
                "ait": 1_022_284u64,
                "regulatory_duty": 156_672u64,
                "environmental_surcharge": 78_336u64,
                "total_duties": 38_231_884u64
            },
            "local_costs_bdt": {
                "clearing_agent_fee": 50_000u64,
                "brta_registration": 85_000u64,
                "documentation_fee": 15_000u64,
                "total": 150_000u64
            },
            "total_landed_cost_bdt": 42_298_684u64,
            "total_landed_cost_usd": 384_533u64,
            "duty_percentage": 976.1,
            "q20_jpy": 4_600_000u64,
            "q50_jpy": 5_000_000u64,
            "q80_jpy": 5_400_000u64,
            "recommended_bid_jpy": 5_266_667u64,
            "platform_fee_bdt": 72_000u64,
            "total_incl_platform_bdt": 42_370_684u64
        })
    }

    /// The same answer from a backend predating quantiles and platform fees.
    pub fn minimal_payload() -> Value {
        let mut payload = full_payload();
        let obj = payload.as_object_mut().unwrap();
        for key in [
            "q20_jpy",
            "q50_jpy",
            "q80_jpy",
            "recommended_bid_jpy",
            "platform_fee_bdt",
            "total_incl_platform_bdt",
        ] {
            obj.remove(key);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::{full_payload, minimal_payload};
    use super::*;
    use serde_json::json;

    fn sample_vehicle() -> Vehicle {
        Vehicle {
            make: "Toyota".to_string(),
            model: "Land Cruiser 300".to_string(),
            year: 2022,
            mileage_km: 15_000,
            engine_cc: 3500,
            auction_grade: 4.5,
        }
    }

    #[test]
    fn request_flattens_vehicle_and_sends_null_bid() {
        let request = PredictRequest {
            vehicle: sample_vehicle(),
            user_bid_jpy: None,
            target_win_prob: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["make"], json!("Toyota"));
        assert_eq!(value["engine_cc"], json!(3500));
        assert_eq!(value["user_bid_jpy"], serde_json::Value::Null);
        assert!(value.get("target_win_prob").is_none());
    }

    #[test]
    fn request_carries_target_win_prob_when_set() {
        let request = PredictRequest {
            vehicle: sample_vehicle(),
            user_bid_jpy: Some(5_500_000),
            target_win_prob: Some(0.75),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["user_bid_jpy"], json!(5_500_000u64));
        assert_eq!(value["target_win_prob"], json!(0.75));
    }

    #[test]
    fn full_backend_payload_decodes() {
        let analysis: PredictResponse = serde_json::from_value(full_payload()).unwrap();
        assert_eq!(analysis.predicted_winning_bid_jpy, 5_000_000);
        assert_eq!(analysis.bangladesh_duties_bdt.vat, 5_111_424);
        assert_eq!(analysis.local_costs_bdt.brta_registration, 85_000);
        assert_eq!(analysis.japan_costs_jpy.auction_fee, 250_000);
        assert!((analysis.currency_conversion.jpy_to_bdt_rate - 0.72).abs() < 1e-12);
        assert!(analysis.has_quantiles());
        assert_eq!(analysis.recommended_bid_jpy, Some(5_266_667));
    }

    #[test]
    fn legacy_payload_defaults_optional_fields() {
        let analysis: PredictResponse = serde_json::from_value(minimal_payload()).unwrap();
        assert!(!analysis.has_quantiles());
        assert_eq!(analysis.recommended_bid_jpy, None);
        assert_eq!(analysis.platform_fee_bdt, None);
        assert_eq!(analysis.total_incl_platform(), analysis.total_landed_cost_bdt);
    }

    #[test]
    fn partial_quantiles_do_not_count_as_full_spread() {
        let mut payload = minimal_payload();
        payload["q50_jpy"] = json!(5_000_000u64);
        let analysis: PredictResponse = serde_json::from_value(payload).unwrap();
        assert!(!analysis.has_quantiles());
    }

    #[test]
    fn inclusive_total_prefers_server_value() {
        let mut payload = full_payload();
        // deliberately inconsistent with landed + fee: the server value wins
        payload["total_incl_platform_bdt"] = json!(99u64);
        let analysis: PredictResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(analysis.total_incl_platform(), 99);
    }

    #[test]
    fn inclusive_total_derived_from_platform_fee_when_missing() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("total_incl_platform_bdt");
        let analysis: PredictResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(analysis.total_incl_platform(), 42_298_684 + 72_000);
    }

    #[test]
    fn status_error_display_carries_code_and_body() {
        let err = ApiError::Status {
            code: 500,
            body: "error".to_string(),
        };
        let shown = err.to_string();
        assert!(shown.contains("500"));
        assert!(shown.contains("error"));
    }
}
