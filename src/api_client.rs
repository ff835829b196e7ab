//! # API Client Module
//!
//! Kentik topxdata HTTP client and the response shapes it returns
//!
//! ## Key Components
//! - [`ApiClient`] - Authenticated POST client for the topxdata endpoint
//! - [`TopxResponse`] - Top-level response body
//! - [`FlowSample`] - One (timestamp, rate, duration) bucket of a series

use reqwest::Client;
use serde::Deserialize;

use crate::errors::FlowError;

pub struct ApiClient {
    http: Client,
    url: String,
    email: String,
    token: String,
}

impl ApiClient {
    pub fn new(url: String, email: String, token: String) -> Result<Self, FlowError> {
        let http = Client::builder()
            .user_agent(concat!("flowtimer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            url,
            email,
            token,
        })
    }

    /// POST one materialized query body and parse the reply.
    pub async fn fetch_window(&self, body: String) -> Result<TopxResponse, FlowError> {
        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-CH-Auth-Email", &self.email)
            .header("X-CH-Auth-API-Token", &self.token)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FlowError::TransportStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TopxResponse = serde_json::from_str(&text)?;
        Ok(parsed)
    }
}

#[derive(Debug, Deserialize)]
pub struct TopxResponse {
    pub results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResult {
    pub data: Vec<TalkerSeries>,
}

/// One top talker's slice of a result set. Aggregate-only rows carry no series.
#[derive(Debug, Deserialize)]
pub struct TalkerSeries {
    pub key: String,
    #[serde(rename = "timeSeries")]
    pub time_series: Option<TimeSeries>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    pub both_bits_per_sec: BitsSeries,
}

#[derive(Debug, Deserialize)]
pub struct BitsSeries {
    pub flow: Vec<FlowSample>,
}

/// One bucket: [timestamp in ms, both-direction bits/s, bucket width in s].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FlowSample(pub i64, pub f64, pub i64);

impl FlowSample {
    pub fn timestamp_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// Volume carried in this bucket, floored to whole kilobytes.
    pub fn kilobytes(&self) -> u64 {
        (((self.1 / 8.0) / 1000.0) * self.2 as f64) as u64
    }

    pub fn duration_secs(&self) -> i64 {
        self.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topx_response() {
        let json = r#"{
            "results": [{
                "data": [
                    {
                        "key": "10.0.0.1 ---- 10.0.0.2",
                        "timeSeries": {
                            "both_bits_per_sec": {
                                "flow": [[1700000000000, 8000.0, 5], [1700000005000, 0.0, 5]]
                            }
                        }
                    },
                    {"key": "Total"}
                ]
            }]
        }"#;

        let response: TopxResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);

        let data = &response.results[0].data;
        assert_eq!(data.len(), 2);
        assert!(data[1].time_series.is_none());

        let flow = &data[0].time_series.as_ref().unwrap().both_bits_per_sec.flow;
        assert_eq!(flow.len(), 2);
        assert_eq!(flow[0].timestamp_secs(), 1_700_000_000);
        assert_eq!(flow[0].duration_secs(), 5);
    }

    #[test]
    fn test_missing_results_is_malformed() {
        let json = r#"{"status": "postponed"}"#;
        assert!(serde_json::from_str::<TopxResponse>(json).is_err());
    }

    #[test]
    fn test_empty_results_is_valid() {
        let response: TopxResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_kilobytes_floors_partial_units() {
        // 8000 bits/s over 5 s is exactly 5 kB.
        assert_eq!(FlowSample(0, 8000.0, 5).kilobytes(), 5);
        // 12345 bits/s over 7 s is 10.8 kB, floored to 10.
        assert_eq!(FlowSample(0, 12345.0, 7).kilobytes(), 10);
        assert_eq!(FlowSample(0, 0.0, 5).kilobytes(), 0);
    }

    #[test]
    fn test_kilobytes_clamps_negative_rates() {
        assert_eq!(FlowSample(0, -8000.0, 5).kilobytes(), 0);
    }

    #[test]
    fn test_timestamp_drops_milliseconds() {
        assert_eq!(FlowSample(1700000000999, 0.0, 1).timestamp_secs(), 1_700_000_000);
    }
}
