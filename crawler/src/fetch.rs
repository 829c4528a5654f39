use reqwest::{header, Client, StatusCode};
use reviewdex_core::config::HttpConfig;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeader { name: &'static str, value: String },
}

#[derive(Debug)]
pub enum FetchOutcome {
    Ok(String),
    NotFound,
    Error(FetchError),
}

/// Single-attempt GET with a fixed browser-like identity. Callers pace their
/// own requests; the fetcher never sleeps or retries.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(http: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header_value("accept", &http.accept)?);
        headers.insert(header::ACCEPT_LANGUAGE, header_value("accept_language", &http.accept_language)?);
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(http.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let resp = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => return FetchOutcome::Error(e.into()),
        };
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return FetchOutcome::NotFound;
        }
        // anything but a plain 200 (after redirects) is a failed fetch
        if status != StatusCode::OK {
            return FetchOutcome::Error(FetchError::Status(status));
        }
        match resp.text().await {
            Ok(body) => FetchOutcome::Ok(body),
            Err(e) => FetchOutcome::Error(e.into()),
        }
    }
}

fn header_value(name: &'static str, value: &str) -> Result<header::HeaderValue, FetchError> {
    header::HeaderValue::from_str(value).map_err(|_| FetchError::InvalidHeader { name, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn classifies_ok_not_found_and_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let f = fetcher();
        assert!(matches!(f.fetch(&format!("{}/ok", server.uri())).await, FetchOutcome::Ok(b) if b == "hello"));
        assert!(matches!(f.fetch(&format!("{}/gone", server.uri())).await, FetchOutcome::NotFound));
        assert!(matches!(
            f.fetch(&format!("{}/boom", server.uri())).await,
            FetchOutcome::Error(FetchError::Status(s)) if s == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn sends_browser_identity_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("user-agent"))
            .and(header_exists("accept-language"))
            .and(header_exists("accept"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let f = fetcher();
        assert!(matches!(f.fetch(&server.uri()).await, FetchOutcome::Ok(_)));
    }

    #[tokio::test]
    async fn non_200_success_codes_are_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let outcome = fetcher().fetch(&format!("{}/empty", server.uri())).await;
        assert!(matches!(outcome, FetchOutcome::Error(FetchError::Status(s)) if s == StatusCode::NO_CONTENT));
    }

    #[test]
    fn rejects_header_values_that_cannot_be_sent() {
        let http = HttpConfig { accept_language: "ru\nX-Injected: 1".into(), ..HttpConfig::default() };
        assert!(matches!(Fetcher::new(&http), Err(FetchError::InvalidHeader { name: "accept_language", .. })));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let f = fetcher();
        assert!(matches!(f.fetch("http://127.0.0.1:9/").await, FetchOutcome::Error(FetchError::Transport(_))));
    }
}
