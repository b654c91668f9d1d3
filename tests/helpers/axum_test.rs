// ABOUTME: Axum HTTP testing utilities for integration tests
// ABOUTME: Provides helpers to test Axum routes without running a full server

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde::Serialize;
use tower::ServiceExt;

/// Helper to build and execute HTTP requests against Axum routers
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl AxumTestRequest {
    /// Create a new GET request
    pub fn get(uri: &str) -> Self {
        Self {
            method: Method::GET,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a new POST request
    pub fn post(uri: &str) -> Self {
        Self {
            method: Method::POST,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add JSON body to the request
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    /// Add a form-encoded body, the way Twilio posts webhooks
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let encoded = fields
            .iter()
            .map(|(key, value)| format!("{key}={}", form_escape(value)))
            .collect::<Vec<_>>()
            .join("&");
        self.body = Some(encoded);
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/x-www-form-urlencoded".to_owned(),
        ));
        self
    }

    /// Send the request to the router and return the response
    pub async fn send(self, router: Router) -> AxumTestResponse {
        let mut request = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            request = request.header(key, value);
        }
        let request = request
            .body(self.body.map_or_else(Body::empty, Body::from))
            .expect("Failed to build request");

        let response = router
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        AxumTestResponse {
            status,
            headers,
            body: bytes.to_vec(),
        }
    }
}

fn form_escape(value: &str) -> String {
    value
        .bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (byte as char).to_string()
            }
            b' ' => "+".to_owned(),
            other => format!("%{other:02X}"),
        })
        .collect()
}

/// Response captured from a router
pub struct AxumTestResponse {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    /// Status code as u16
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// A header value, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not UTF-8")
    }

    /// Body parsed as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }
}
