use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::ApiResponse;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf8";

/// Sends authenticated JSON requests and classifies the outcome by status code.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    token: Option<String>,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// An empty token means requests go out without an `Authorization` header.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), token)
    }

    pub fn with_client(http: reqwest::Client, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            http,
            token: (!token.is_empty()).then_some(token),
        }
    }

    pub async fn send<T>(&self, method: Method, url: &str, payload: Option<&T>) -> Result<ApiResponse>
    where
        T: Serialize + ?Sized,
    {
        let mut req = self.http.request(method.clone(), url);

        if let Some(payload) = payload {
            let body = serde_json::to_string_pretty(payload).map_err(Error::Encode)?;
            tracing::info!("{method} {url}\n{body}");
            req = req.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body);
        } else {
            tracing::debug!("{method} {url}");
        }

        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let res = req
            .send()
            .await
            .map_err(|e| Error::transport("failed to make request", e))?;

        let status = res.status();
        let is_json = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let bytes = res
            .bytes()
            .await
            .map_err(|e| Error::transport("failed to read response", e))?;

        let body = if !is_json {
            ApiResponse::Text(String::from_utf8_lossy(&bytes).into_owned())
        } else if bytes.iter().all(u8::is_ascii_whitespace) {
            ApiResponse::Json(serde_json::Value::Null)
        } else {
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| Error::transport("failed to read json response", e))?;
            ApiResponse::Json(value)
        };

        tracing::debug!("{method} {url} -> {status}");

        if status.as_u16() >= 400 {
            return Err(Error::Api { status, body });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn created_json_is_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/things/"))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "application/json; charset=utf8"))
            .and(body_json(json!({ "name": "x" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = Transport::new("secret");
        let url = format!("{}/things/", mock_server.uri());
        let body = transport
            .send(Method::POST, &url, Some(&json!({ "name": "x" })))
            .await
            .unwrap();

        assert_eq!(body, ApiResponse::Json(json!({ "id": "abc" })));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn request_body_is_logged_even_when_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let url = format!("{}/api/0/organizations/acme/releases/", mock_server.uri());
        let err = Transport::new("secret")
            .send(Method::POST, &url, Some(&json!({ "version": "1.2.3" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);

        let logs = captured.contents();
        assert!(logs.contains(&format!("POST {url}")), "{logs}");
        assert!(logs.contains("{\n  \"version\": \"1.2.3\"\n}"), "{logs}");
        assert!(!logs.contains("secret"), "{logs}");
    }

    #[test]
    fn debug_output_hides_the_token() {
        let rendered = format!("{:?}", Transport::new("secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn request_body_is_indented() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({ "a": 1 })))
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(String::from_utf8_lossy(&requests[0].body), "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn error_status_carries_text_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let err = Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({})))
            .await
            .unwrap_err();

        match err {
            Error::Api { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, ApiResponse::Text("not found".into()));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_carries_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "bad version" })),
            )
            .mount(&mock_server)
            .await;

        let err = Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.response(), Some(&ApiResponse::Json(json!({ "detail": "bad version" }))));
    }

    #[tokio::test]
    async fn already_exists_is_not_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(208).set_body_json(json!({ "version": "1.0" })))
            .mount(&mock_server)
            .await;

        let body = Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({})))
            .await
            .unwrap();
        assert_eq!(body.as_json().unwrap()["version"], "1.0");
    }

    #[tokio::test]
    async fn no_payload_and_no_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let body = Transport::new("")
            .send::<()>(Method::GET, &mock_server.uri(), None)
            .await
            .unwrap();
        assert_eq!(body, ApiResponse::Text("ok".into()));

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
        assert!(requests[0].headers.get("content-type").is_none());
        assert!(requests[0].body.is_empty());
    }

    #[tokio::test]
    async fn empty_json_body_decodes_to_null() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204).insert_header("content-type", "application/json"))
            .mount(&mock_server)
            .await;

        let body = Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({})))
            .await
            .unwrap();
        assert_eq!(body, ApiResponse::Json(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn malformed_json_is_a_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
            .mount(&mock_server)
            .await;

        let err = Transport::new("secret")
            .send(Method::POST, &mock_server.uri(), Some(&json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "failed to read json response");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let err = Transport::new("secret")
            .send(Method::POST, "http://127.0.0.1:1/", Some(&json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.response().is_none());
    }
}
