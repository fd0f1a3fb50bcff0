//! API client trait and the response decoding shared by implementations.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub const CLUSTERS_ENDPOINT: &str = "/clusters";
pub const KEYSPACES_ENDPOINT: &str = "/keyspaces";
pub const TABLETS_ENDPOINT: &str = "/tablets";
pub const SCHEMAS_ENDPOINT: &str = "/schemas";

/// The VTAdmin API surface used by the dashboard: GET only.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Fetch `endpoint` (a path beginning with `/`) relative to the base URL
    /// and return the JSON payload with any `result` envelope removed.
    async fn fetch(&self, endpoint: &str) -> Result<Value, FetchError>;
}

/// `/vschema/{cluster}/{keyspace}` with both segments percent-encoded.
#[must_use]
pub fn vschema_endpoint(cluster_id: &str, keyspace: &str) -> String {
    format!(
        "/vschema/{}/{}",
        utf8_percent_encode(cluster_id, PATH_SEGMENT),
        utf8_percent_encode(keyspace, PATH_SEGMENT)
    )
}

/// Remove the `result` envelope some endpoints wrap their payload in.
/// Values without a (non-null) `result` field pass through unchanged.
#[must_use]
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("result").is_some_and(|r| !r.is_null()) => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Turn a raw HTTP response into a payload: status check, JSON parse,
/// envelope unwrap.
pub fn decode_response(status: u16, status_text: &str, body: &[u8]) -> Result<Value, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::status(status, status_text));
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|err| FetchError::decode(err.to_string()))?;
    Ok(unwrap_envelope(value))
}

/// Decode an already-unwrapped payload into a typed shape.
pub fn decode_payload<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|err| FetchError::decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_is_unwrapped() {
        let value = unwrap_envelope(json!({"result": [1, 2, 3]}));
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn bare_array_passes_through() {
        let value = unwrap_envelope(json!([{"id": "c1"}]));
        assert_eq!(value, json!([{"id": "c1"}]));
    }

    #[test]
    fn object_without_result_passes_through() {
        let value = unwrap_envelope(json!({"clusters": []}));
        assert_eq!(value, json!({"clusters": []}));
    }

    #[test]
    fn null_result_keeps_outer_object() {
        let value = unwrap_envelope(json!({"result": null, "ok": true}));
        assert_eq!(value, json!({"result": null, "ok": true}));
    }

    #[test]
    fn decode_response_rejects_non_success_status() {
        let err = decode_response(503, "Service Unavailable", b"{}").unwrap_err();
        assert_eq!(err, FetchError::status(503, "Service Unavailable"));
    }

    #[test]
    fn decode_response_reports_malformed_json() {
        let err = decode_response(200, "OK", b"{not json").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }), "err={err}");
    }

    #[test]
    fn decode_response_unwraps_result() {
        let value = decode_response(200, "OK", br#"{"result":{"clusters":[]}}"#).unwrap();
        assert_eq!(value, json!({"clusters": []}));
    }

    #[test]
    fn decode_payload_maps_shape_errors() {
        #[derive(Debug, Deserialize)]
        struct Shape {
            #[allow(dead_code)]
            count: u32,
        }
        let err = decode_payload::<Shape>(json!({"count": "many"})).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn vschema_endpoint_escapes_segments() {
        assert_eq!(vschema_endpoint("c1", "commerce"), "/vschema/c1/commerce");
        assert_eq!(vschema_endpoint("c 1", "a/b"), "/vschema/c%201/a%2Fb");
    }
}
