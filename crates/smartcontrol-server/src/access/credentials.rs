//! Reading the actor payload out of a buffered request body
//!
//! JSON requests carry the actor as `currentUser` inside the body. Multipart
//! uploads carry it as a `currentUser` form field holding a JSON string, and
//! are normalized here to the same `{ "currentUser": ... }` shape.

use super::guard::ACTOR_FIELD;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap, Request},
};
use serde_json::{json, Value as JsonValue};

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Parse the payload the guard decides on
///
/// `None` means the body could not be read as a payload at all.
pub async fn actor_payload(parts: &Parts, body: &Bytes) -> Option<JsonValue> {
    if is_multipart(&parts.headers) {
        return multipart_payload(parts, body.clone()).await;
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    serde_json::from_slice::<JsonValue>(body)
        .ok()
        .filter(|value| !value.is_null())
}

async fn multipart_payload(parts: &Parts, body: Bytes) -> Option<JsonValue> {
    let probe = Request::from_parts(parts.clone(), Body::from(body));
    let mut multipart = Multipart::from_request(probe, &()).await.ok()?;

    while let Some(field) = multipart.next_field().await.ok()? {
        if field.name() != Some(ACTOR_FIELD) {
            continue;
        }
        let text = field.text().await.ok()?;
        let actor = serde_json::from_str::<JsonValue>(&text).ok()?;
        return Some(json!({ ACTOR_FIELD: actor }));
    }

    // a readable form without the actor field
    Some(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(content_type: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri("/devices/import")
            .header(CONTENT_TYPE, content_type)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn form(boundary: &str, fields: &[(&str, &str)]) -> Bytes {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));
        Bytes::from(body)
    }

    #[tokio::test]
    async fn test_json_body() {
        let body = Bytes::from_static(br#"{"currentUser":{"id":3},"model":"X"}"#);
        let payload = actor_payload(&parts("application/json"), &body).await.unwrap();
        assert_eq!(payload["currentUser"]["id"], 3);
    }

    #[tokio::test]
    async fn test_empty_or_invalid_body() {
        let json = parts("application/json");
        assert!(actor_payload(&json, &Bytes::new()).await.is_none());
        assert!(actor_payload(&json, &Bytes::from_static(b"  \n")).await.is_none());
        assert!(actor_payload(&json, &Bytes::from_static(b"{oops")).await.is_none());
        assert!(actor_payload(&json, &Bytes::from_static(b"null")).await.is_none());
    }

    #[tokio::test]
    async fn test_multipart_actor_field() {
        let body = form(
            "XyZ",
            &[("file", "model,imei1,condition"), ("currentUser", r#"{"id":5,"nome":"Rui"}"#)],
        );
        let payload = actor_payload(&parts("multipart/form-data; boundary=XyZ"), &body)
            .await
            .unwrap();
        assert_eq!(payload["currentUser"]["id"], 5);
        assert_eq!(payload["currentUser"]["nome"], "Rui");
    }

    #[tokio::test]
    async fn test_multipart_without_actor() {
        let body = form("XyZ", &[("file", "a,b,c")]);
        let payload = actor_payload(&parts("multipart/form-data; boundary=XyZ"), &body)
            .await
            .unwrap();
        assert!(payload.get("currentUser").is_none());
    }

    #[tokio::test]
    async fn test_multipart_with_garbage_actor() {
        let body = form("XyZ", &[("currentUser", "{not json")]);
        let payload = actor_payload(&parts("multipart/form-data; boundary=XyZ"), &body).await;
        assert!(payload.is_none());
    }
}
