//! Request body preparation for forwarding.
//!
//! JSON bodies on non-GET requests are buffered and parsed; when the parsed
//! payload carries at least one field it is re-serialized and sent with an
//! exact `Content-Length`. Everything else keeps its original bytes.

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, Method,
    },
};
use futures_util::StreamExt;
use serde_json::Value;

use crate::http::response::EdgeError;

/// Body to send upstream, with the headers that describe it.
#[derive(Debug)]
pub enum OutgoingBody {
    /// Original stream, untouched.
    Stream {
        body: Body,
        content_type: Option<HeaderValue>,
        content_length: Option<HeaderValue>,
    },
    /// Original bytes, buffered by the JSON stage but not reconstructed.
    Buffered {
        bytes: Bytes,
        content_type: Option<HeaderValue>,
    },
    /// Re-serialized JSON payload.
    Reconstructed(Vec<u8>),
}

impl OutgoingBody {
    /// Write the describing headers and return the body to send.
    pub fn into_body(self, headers: &mut HeaderMap) -> Body {
        match self {
            OutgoingBody::Stream {
                body,
                content_type,
                content_length,
            } => {
                if let Some(value) = content_type {
                    headers.insert(CONTENT_TYPE, value);
                }
                if let Some(value) = content_length {
                    headers.insert(CONTENT_LENGTH, value);
                }
                body
            }
            OutgoingBody::Buffered {
                bytes,
                content_type,
            } => {
                if let Some(value) = content_type {
                    headers.insert(CONTENT_TYPE, value);
                }
                headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                Body::from(bytes)
            }
            OutgoingBody::Reconstructed(payload) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));
                Body::from(payload)
            }
        }
    }
}

/// Whether a `Content-Type` is plain `application/json`.
///
/// Structured suffixes (`+json`) carry their own semantics and are streamed
/// with their media type intact.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            essence == "application/json"
        })
        .unwrap_or(false)
}

/// Whether a parsed payload has at least one field (object key or array element).
pub fn has_fields(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Read a body fully, failing once more than `limit` bytes arrive.
async fn buffer(body: Body, limit: usize) -> Result<Bytes, EdgeError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| EdgeError::Internal(format!("failed to read request body: {e}")))?;
        if buf.len() + chunk.len() > limit {
            return Err(EdgeError::PayloadTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Decide what to send upstream for this request body.
pub async fn prepare_body(
    method: &Method,
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<OutgoingBody, EdgeError> {
    let content_type = headers.get(CONTENT_TYPE).cloned();

    if *method == Method::GET || !is_json(headers) {
        return Ok(OutgoingBody::Stream {
            body,
            content_type,
            content_length: headers.get(CONTENT_LENGTH).cloned(),
        });
    }

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(EdgeError::PayloadTooLarge { limit });
    }

    let bytes = buffer(body, limit).await?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) if has_fields(&value) => {
            let payload = serde_json::to_vec(&value)
                .map_err(|e| EdgeError::Internal(format!("failed to serialize body: {e}")))?;
            Ok(OutgoingBody::Reconstructed(payload))
        }
        _ => Ok(OutgoingBody::Buffered {
            bytes,
            content_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(&json_headers()));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        assert!(!is_json(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
        assert!(!is_json(&HeaderMap::new()));
    }

    #[test]
    fn test_has_fields() {
        assert!(has_fields(&json!({"a": 1})));
        assert!(has_fields(&json!([1])));
        assert!(!has_fields(&json!({})));
        assert!(!has_fields(&json!([])));
        assert!(!has_fields(&json!("text")));
    }

    #[tokio::test]
    async fn test_non_empty_json_is_reconstructed() {
        let body = Body::from(r#"{ "name" : "café",  "zone": 3 }"#);

        let prepared = prepare_body(&Method::POST, &json_headers(), body, 1024)
            .await
            .unwrap();

        match prepared {
            OutgoingBody::Reconstructed(payload) => {
                assert_eq!(payload, r#"{"name":"café","zone":3}"#.as_bytes().to_vec());
            }
            other => panic!("expected reconstruction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reconstructed_headers_use_byte_length() {
        let mut headers = HeaderMap::new();
        let payload = serde_json::to_vec(&json!({"name": "café"})).unwrap();
        let expected = payload.len();

        let _ = OutgoingBody::Reconstructed(payload).into_body(&mut headers);

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(CONTENT_LENGTH).unwrap(), &expected.to_string());
    }

    #[tokio::test]
    async fn test_empty_object_is_not_reconstructed() {
        let prepared = prepare_body(&Method::POST, &json_headers(), Body::from("{}"), 1024)
            .await
            .unwrap();

        match prepared {
            OutgoingBody::Buffered { bytes, content_type } => {
                assert_eq!(&bytes[..], b"{}");
                assert_eq!(content_type.unwrap(), "application/json; charset=utf-8");
            }
            other => panic!("expected original bytes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_and_non_json_bodies_stream() {
        let prepared = prepare_body(&Method::GET, &json_headers(), Body::from(r#"{"a":1}"#), 1024)
            .await
            .unwrap();
        assert!(matches!(prepared, OutgoingBody::Stream { .. }));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        let prepared = prepare_body(&Method::POST, &headers, Body::from("a,b"), 1024)
            .await
            .unwrap();
        assert!(matches!(prepared, OutgoingBody::Stream { .. }));
    }

    #[tokio::test]
    async fn test_merge_patch_keeps_media_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/merge-patch+json"),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(10usize));

        let prepared = prepare_body(&Method::PATCH, &headers, Body::from(r#"{"a":null}"#), 1024)
            .await
            .unwrap();
        assert!(matches!(prepared, OutgoingBody::Stream { .. }));

        let mut outgoing = HeaderMap::new();
        let body = prepared.into_body(&mut outgoing);
        assert_eq!(outgoing.get(CONTENT_TYPE).unwrap(), "application/merge-patch+json");
        assert_eq!(outgoing.get(CONTENT_LENGTH).unwrap(), "10");

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":null}"#);
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_original_bytes() {
        let prepared = prepare_body(&Method::PUT, &json_headers(), Body::from("{not json"), 1024)
            .await
            .unwrap();
        assert!(matches!(prepared, OutgoingBody::Buffered { .. }));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let body = Body::from(format!(r#"{{"blob":"{}"}}"#, "x".repeat(64)));
        let err = prepare_body(&Method::POST, &json_headers(), body, 16)
            .await
            .unwrap_err();
        assert!(matches!(err, EdgeError::PayloadTooLarge { limit: 16 }));

        let mut headers = json_headers();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(4096usize));
        let err = prepare_body(&Method::POST, &headers, Body::from("{}"), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, EdgeError::PayloadTooLarge { .. }));
    }
}
