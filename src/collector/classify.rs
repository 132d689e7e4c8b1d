use std::collections::HashMap;

use serde::Deserialize;

const MISSING_SYMBOL_MARKER: &str = "Invalid API call.";
const LIMIT_REACHED_MARKER: &str = "You have reached the 100 requests/day limit";

/// Weekly series as returned by the provider, field names included.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTimeSeries {
    #[serde(rename = "Meta Data")]
    pub meta: MetaData,
    #[serde(rename = "Time Series (Digital Currency Weekly)")]
    pub series: HashMap<String, WeeklyEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaData {
    #[serde(rename = "6. Last Refreshed")]
    pub last_refreshed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyEntry {
    #[serde(rename = "4a. close (EUR)")]
    pub close: String,
}

/// Outcome of looking at one API response.
#[derive(Debug)]
pub enum Classification {
    AllGood(RawTimeSeries),
    LimitReached,
    MissingSymbol,
    JsonBroken,
}

/// Classify a raw response body.
///
/// The textual sniff runs before any decoding: both the limit notice and the
/// unknown-symbol notice arrive as well-formed JSON, so decoding first would
/// misread them.
pub fn classify(response: &[u8]) -> Classification {
    let text = String::from_utf8_lossy(response);

    if text.contains(MISSING_SYMBOL_MARKER) {
        return Classification::MissingSymbol;
    }
    if text.contains(LIMIT_REACHED_MARKER) {
        return Classification::LimitReached;
    }

    match serde_json::from_slice::<RawTimeSeries>(response) {
        Ok(raw) => Classification::AllGood(raw),
        Err(_) => Classification::JsonBroken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> String {
        r#"{
            "Meta Data": {
                "1. Information": "Weekly Prices and Volumes for Digital Currency",
                "2. Digital Currency Code": "BTC",
                "6. Last Refreshed": "2023-04-20 00:00:00",
                "7. Time Zone": "UTC"
            },
            "Time Series (Digital Currency Weekly)": {
                "2023-04-16": { "4a. close (EUR)": "24718.225436" },
                "2023-04-09": { "4a. close (EUR)": "25962.209862" }
            }
        }"#
        .to_string()
    }

    #[test]
    fn good_payload_decodes() {
        match classify(sample_payload().as_bytes()) {
            Classification::AllGood(raw) => {
                assert_eq!(raw.meta.last_refreshed, "2023-04-20 00:00:00");
                assert_eq!(raw.series.len(), 2);
                assert_eq!(raw.series["2023-04-16"].close, "24718.225436");
            }
            other => panic!("expected AllGood, got {other:?}"),
        }
    }

    #[test]
    fn invalid_symbol_notice_wins() {
        let body = br#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        assert!(matches!(classify(body), Classification::MissingSymbol));
    }

    #[test]
    fn limit_notice_wins_even_inside_decodable_json() {
        // A body carrying the limit marker must never classify as AllGood,
        // no matter how plausible the rest of the document looks.
        let mut body = sample_payload();
        body = body.replacen(
            "\"7. Time Zone\": \"UTC\"",
            "\"7. Time Zone\": \"You have reached the 100 requests/day limit\"",
            1,
        );
        assert!(matches!(
            classify(body.as_bytes()),
            Classification::LimitReached
        ));
    }

    #[test]
    fn undecodable_body_is_json_broken() {
        assert!(matches!(
            classify(b"<html>service unavailable</html>"),
            Classification::JsonBroken
        ));
        assert!(matches!(classify(b"{}"), Classification::JsonBroken));
    }
}
