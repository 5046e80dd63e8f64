//! HttpCrimeBackend - REST implementation of `CrimeBackend`.
//!
//! Talks JSON to the Crime Chronicles backend:
//!
//! - `POST /login`, `POST /signup` -> `{message}`
//! - `POST /query` -> `{message?, data}`
//! - `GET /history?user_email=..&page_no=..` -> `[{user_query, response}]`
//!
//! Non-success answers carry `{detail}`; it becomes the `Backend` error detail.

use std::time::Duration;

use async_trait::async_trait;
use chronicles_core::api::{
    CrimeBackend, ErrorResponse, MessageResponse, QueryRequest, QueryResponse,
};
use chronicles_core::config::BackendSettings;
use chronicles_core::history::HistoryEntry;
use chronicles_core::session::{LoginForm, SignupForm};
use chronicles_core::{ChroniclesError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCrimeBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCrimeBackend {
    /// Creates a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ChroniclesError::config("backend base_url is empty"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChroniclesError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<Self> {
        Self::new(settings.base_url.clone(), settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        self.read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(&self, response: Response) -> Result<R> {
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "backend returned an error status");
            return Err(map_http_error(status, &body_text));
        }

        response.json::<R>().await.map_err(|err| {
            ChroniclesError::transport(format!("Failed to parse backend response: {err}"))
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ChroniclesError {
        if err.is_timeout() {
            ChroniclesError::timeout(self.timeout)
        } else {
            ChroniclesError::transport(format!("Backend request failed: {err}"))
        }
    }
}

#[async_trait]
impl CrimeBackend for HttpCrimeBackend {
    async fn login(&self, form: &LoginForm) -> Result<MessageResponse> {
        self.post_json("login", form).await
    }

    async fn signup(&self, form: &SignupForm) -> Result<MessageResponse> {
        self.post_json("signup", form).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.post_json("query", request).await
    }

    async fn history(&self, user_email: &str, offset: usize) -> Result<Vec<HistoryEntry>> {
        let url = self.url("history");
        let page_no = offset.to_string();
        tracing::debug!(%url, offset, "GET");

        let response = self
            .client
            .get(&url)
            .query(&[("user_email", user_email), ("page_no", page_no.as_str())])
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        self.read_json(response).await
    }
}

/// Builds a `Backend` error from a non-success answer. The detail is empty
/// when the body has no usable `detail`, leaving the choice of message to
/// the caller's fallback.
fn map_http_error(status: StatusCode, body: &str) -> ChroniclesError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|wrapper| wrapper.detail)
        .unwrap_or_default();

    ChroniclesError::backend(Some(status.as_u16()), detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicles_core::ChartKind;
    use chronicles_core::query::QueryData;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HttpCrimeBackend {
        HttpCrimeBackend::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"email": "a@b.com", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend(&server)
            .login(&LoginForm::new("a@b.com", "x"))
            .await
            .unwrap();

        assert_eq!(response.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_error_detail_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/signup"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered."})),
            )
            .mount(&server)
            .await;

        let err = backend(&server)
            .signup(&SignupForm::new("a@b.com", "555", "Ann", "pw"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ChroniclesError::backend(Some(400), "Email already registered.")
        );
    }

    #[tokio::test]
    async fn test_error_without_detail_has_empty_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = backend(&server)
            .login(&LoginForm::new("a@b.com", "x"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[tokio::test]
    async fn test_query_decodes_chart_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({
                "user_query": "thefts",
                "user_email": "a@b.com",
                "is_chart": true,
                "chart_type": "pie"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"title": {"text": "T"}, "series": [{"data": [{"name": "Theft", "y": 5}]}]}
            })))
            .mount(&server)
            .await;

        let response = backend(&server)
            .query(&QueryRequest {
                user_query: "thefts".into(),
                user_email: "a@b.com".into(),
                is_chart: true,
                chart_type: Some(ChartKind::Pie),
            })
            .await
            .unwrap();

        let chart = response.data.as_ref().and_then(QueryData::as_chart).unwrap();
        assert_eq!(chart.title.as_deref(), Some("T"));
        assert_eq!(chart.points[0].value, 5.0);
    }

    #[tokio::test]
    async fn test_history_sends_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("user_email", "a@b.com"))
            .and(query_param("page_no", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"user_query": "thefts", "response": "Theft leads."}
            ])))
            .mount(&server)
            .await;

        let page = backend(&server).history("a@b.com", 5).await.unwrap();

        assert_eq!(page, vec![HistoryEntry::new("thefts", "Theft leads.")]);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let backend = HttpCrimeBackend::new(server.uri(), Duration::from_millis(200)).unwrap();
        let err = backend.history("a@b.com", 0).await.unwrap_err();

        assert_eq!(err, ChroniclesError::Timeout { seconds: 1 });
    }

    #[test]
    fn test_trailing_slash_is_normalised() {
        let backend =
            HttpCrimeBackend::new("http://localhost:5100/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url("/query"), "http://localhost:5100/query");
    }

    #[test]
    fn test_zero_timeout_setting_is_usable() {
        let settings = BackendSettings {
            base_url: "http://localhost:5100".into(),
            timeout_secs: 0,
        };
        let backend = HttpCrimeBackend::from_settings(&settings).unwrap();
        assert_eq!(backend.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        assert!(HttpCrimeBackend::new("", Duration::from_secs(1)).is_err());
    }
}
