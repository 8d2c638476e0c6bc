use config_manager::EnvelopeShape;
use serde_json::{Map, Value};
use token_core::{parse_records, TokenRecord};
use tracing::debug;

/// Decode a feed response body and unwrap its success envelope.
///
/// `Err` carries the reason the payload is unusable. Callers treat every such
/// reason as "no new data", never as an outage.
pub fn parse_feed_envelope(body: &[u8], shape: EnvelopeShape) -> Result<Vec<TokenRecord>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("response body is not JSON: {}", e))?;

    let Value::Object(envelope) = value else {
        return Err("response body is not a JSON object".to_string());
    };

    let verdict = match shape {
        EnvelopeShape::SuccessFlag => success_flag(&envelope),
        EnvelopeShape::StatusField => status_field(&envelope),
        // Any marker reporting failure wins over the other reporting success.
        EnvelopeShape::Either => match (success_flag(&envelope), status_field(&envelope)) {
            (Verdict::Failure(reason), _) | (_, Verdict::Failure(reason)) => Verdict::Failure(reason),
            (Verdict::Success, _) | (_, Verdict::Success) => Verdict::Success,
            _ => Verdict::Missing,
        },
    };

    match verdict {
        Verdict::Success => {}
        Verdict::Failure(reason) => return Err(reason),
        Verdict::Missing => {
            return Err(format!("envelope does not match the {:?} shape", shape));
        }
    }

    let data = match envelope.get("data") {
        Some(Value::Array(items)) => items.clone(),
        Some(_) => return Err("envelope data is not a list".to_string()),
        None => return Err("envelope has no data".to_string()),
    };

    let (records, dropped) = parse_records(data);
    if dropped > 0 {
        debug!("Envelope carried {} entries that are not token records", dropped);
    }
    Ok(records)
}

enum Verdict {
    Success,
    Failure(String),
    Missing,
}

fn success_flag(envelope: &Map<String, Value>) -> Verdict {
    match envelope.get("success") {
        Some(Value::Bool(true)) => Verdict::Success,
        Some(other) => Verdict::Failure(failure_reason(envelope, &format!("success = {}", other))),
        None => Verdict::Missing,
    }
}

fn status_field(envelope: &Map<String, Value>) -> Verdict {
    match envelope.get("status") {
        Some(Value::String(status)) if status.eq_ignore_ascii_case("success") => Verdict::Success,
        Some(other) => Verdict::Failure(failure_reason(envelope, &format!("status = {}", other))),
        None => Verdict::Missing,
    }
}

fn failure_reason(envelope: &Map<String, Value>, marker: &str) -> String {
    let detail = envelope
        .get("message")
        .or_else(|| envelope.get("error"))
        .and_then(Value::as_str);
    match detail {
        Some(detail) => format!("backend reported failure ({}): {}", marker, detail),
        None => format!("backend reported failure ({})", marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_success_flag_envelope() {
        let payload = body(json!({"success": true, "data": [{"tokenTicker": "AAA"}, {"tokenTicker": "BBB"}]}));
        let records = parse_feed_envelope(&payload, EnvelopeShape::SuccessFlag).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].token_ticker.as_deref(), Some("BBB"));
    }

    #[test]
    fn test_status_envelope_depends_on_shape() {
        let payload = body(json!({"status": "Success", "data": [{"tokenTicker": "AAA"}]}));
        assert_eq!(parse_feed_envelope(&payload, EnvelopeShape::StatusField).unwrap().len(), 1);
        assert_eq!(parse_feed_envelope(&payload, EnvelopeShape::Either).unwrap().len(), 1);
        assert!(parse_feed_envelope(&payload, EnvelopeShape::SuccessFlag).is_err());

        let lowercase = body(json!({"status": "success", "data": []}));
        assert!(parse_feed_envelope(&lowercase, EnvelopeShape::StatusField).unwrap().is_empty());
    }

    #[test]
    fn test_failure_envelopes() {
        let failed = body(json!({"success": false, "message": "upstream busy"}));
        let reason = parse_feed_envelope(&failed, EnvelopeShape::Either).unwrap_err();
        assert!(reason.contains("upstream busy"));

        let status_error = body(json!({"status": "Error", "data": [{"tokenTicker": "AAA"}]}));
        assert!(parse_feed_envelope(&status_error, EnvelopeShape::Either).is_err());

        let no_marker = body(json!({"data": []}));
        assert!(parse_feed_envelope(&no_marker, EnvelopeShape::Either).is_err());

        let contradictory = body(json!({"success": false, "status": "Success", "data": [{"tokenTicker": "STALE"}]}));
        let reason = parse_feed_envelope(&contradictory, EnvelopeShape::Either).unwrap_err();
        assert!(reason.contains("success = false"));

        let flipped = body(json!({"success": true, "status": "Error", "data": [{"tokenTicker": "STALE"}]}));
        assert!(parse_feed_envelope(&flipped, EnvelopeShape::Either).is_err());

        let agreeing = body(json!({"success": true, "status": "success", "data": [{"tokenTicker": "OK"}]}));
        assert_eq!(parse_feed_envelope(&agreeing, EnvelopeShape::Either).unwrap().len(), 1);
    }

    #[test]
    fn test_data_must_be_a_list() {
        let missing = body(json!({"success": true}));
        assert!(parse_feed_envelope(&missing, EnvelopeShape::SuccessFlag).is_err());

        let object = body(json!({"success": true, "data": {"tokenTicker": "AAA"}}));
        assert!(parse_feed_envelope(&object, EnvelopeShape::SuccessFlag).is_err());
    }

    #[test]
    fn test_non_json_body() {
        assert!(parse_feed_envelope(b"<html>502 Bad Gateway</html>", EnvelopeShape::Either).is_err());
        assert!(parse_feed_envelope(b"[1,2,3]", EnvelopeShape::Either).is_err());
    }

    #[test]
    fn test_non_object_entries_are_dropped() {
        let payload = body(json!({"success": true, "data": ["junk", 7, {"tokenTicker": "OK"}]}));
        let records = parse_feed_envelope(&payload, EnvelopeShape::SuccessFlag).unwrap();
        assert_eq!(records.len(), 1);
    }
}
