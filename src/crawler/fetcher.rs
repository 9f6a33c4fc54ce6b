//! HTTP implementations of the rendering and probing capabilities
//!
//! This module handles all HTTP requests for the sweep, including:
//! - Building the shared HTTP client with a proper user agent string
//! - Fetching item pages and replaying their image requests
//! - HEAD probes for full-size variants

use crate::config::UserAgentConfig;
use crate::crawler::capability::{
    Emission, ExistenceProbe, RenderSession, Renderer, RequestStream,
};
use crate::crawler::parser::extract_image_requests;
use crate::CapabilityError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use shutter_sweep::config::UserAgentConfig;
/// use shutter_sweep::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ShutterSweep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders item pages over plain HTTP
///
/// The page is fetched once; its image requests are then replayed one at a
/// time through the session's [`RequestStream`]. Replay stops at the first
/// aborted request.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Renderer for HttpRenderer {
    type Session = HttpSession;

    async fn open_session(&self) -> Result<HttpSession, CapabilityError> {
        Ok(HttpSession {
            client: self.client.clone(),
            replay: None,
        })
    }
}

/// One page render; owns the replay task
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    replay: Option<JoinHandle<()>>,
}

impl HttpSession {
    fn stop_replay(&mut self) {
        if let Some(replay) = self.replay.take() {
            replay.abort();
        }
    }
}

impl RenderSession for HttpSession {
    async fn render(&mut self, address: &Url) -> Result<RequestStream, CapabilityError> {
        self.stop_replay();

        let navigation_error = |reason: String| CapabilityError::Navigation {
            address: address.to_string(),
            reason,
        };

        let response = self
            .client
            .get(address.clone())
            .send()
            .await
            .map_err(|e| navigation_error(classify_request_error(&e)))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(navigation_error(format!("HTTP {}", status.as_u16())));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        let requests = extract_image_requests(&body, &final_url);
        tracing::trace!("{} image requests on {}", requests.len(), final_url);

        let (emitter, stream) = RequestStream::channel(1);
        self.replay = Some(tokio::spawn(async move {
            for url in requests {
                match emitter.emit(url).await {
                    Emission::Continued => continue,
                    Emission::Aborted | Emission::Detached => break,
                }
            }
        }));

        Ok(stream)
    }

    async fn close(mut self) {
        self.stop_replay();
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        self.stop_replay();
    }
}

/// Probes resources with HEAD requests
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ExistenceProbe for HttpProbe {
    async fn exists(&self, url: &str) -> Result<bool, CapabilityError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| CapabilityError::Probe {
                url: url.to_string(),
                reason: classify_request_error(&e),
            })?;

        tracing::trace!("HEAD {} -> {}", url, response.status());
        Ok(response.status().is_success())
    }
}

/// Turns a reqwest error into a short log-friendly reason
fn classify_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestSweep".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn client() -> Client {
        build_http_client(&create_test_config()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&create_test_config()).is_ok());
    }

    #[tokio::test]
    async fn test_render_replays_until_abort() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/alice/101"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body>
                <img src="/static/logo.png">
                <img src="/c/101_ab_s.jpg">
                <img src="/c/101_ab_m.jpg">
                </body></html>"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(client());
        let mut session = renderer.open_session().await.unwrap();
        let address = Url::parse(&format!("{}/photos/alice/101", server.uri())).unwrap();
        let mut stream = session.render(&address).await.unwrap();

        let first = stream.next().await.unwrap();
        assert_eq!(first.url(), format!("{}/static/logo.png", server.uri()));
        first.proceed();

        let second = stream.next().await.unwrap();
        assert_eq!(second.url(), format!("{}/c/101_ab_s.jpg", server.uri()));
        second.abort();

        assert!(stream.next().await.is_none());
        session.close().await;
    }

    #[tokio::test]
    async fn test_render_http_error_is_navigation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let renderer = HttpRenderer::new(client());
        let mut session = renderer.open_session().await.unwrap();
        let address = Url::parse(&format!("{}/photos/alice/404", server.uri())).unwrap();

        let result = session.render(&address).await;
        assert!(matches!(
            result,
            Err(CapabilityError::Navigation { ref reason, .. }) if reason == "HTTP 404"
        ));
    }

    #[tokio::test]
    async fn test_probe_uses_head() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/c/101_ab.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/c/102_ab.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(client());
        assert!(probe
            .exists(&format!("{}/c/101_ab.jpg", server.uri()))
            .await
            .unwrap());
        assert!(!probe
            .exists(&format!("{}/c/102_ab.jpg", server.uri()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_probe_connection_failure_is_error() {
        let probe = HttpProbe::new(client());
        let result = probe.exists("http://127.0.0.1:1/c/101.jpg").await;
        assert!(matches!(result, Err(CapabilityError::Probe { .. })));
    }
}
