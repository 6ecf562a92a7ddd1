//! One-shot HTTP health probe for the ingest service.

use thiserror::Error;
use tracing::debug;

/// Health probe failures.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The request could not be sent or the response body could not be read.
    #[error("health request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("health check returned {status}")]
    Status {
        /// HTTP status code returned by the service.
        status: reqwest::StatusCode,
    },
}

/// Probe `url` and return the response body as the status string.
///
/// A non-2xx response is an error even if the body is readable.
pub async fn check_health(url: &str) -> Result<String, HealthError> {
    check_health_with_client(url, &reqwest::Client::new()).await
}

/// [`check_health`] with a caller-supplied client, for connection reuse.
pub async fn check_health_with_client(
    url: &str,
    client: &reqwest::Client,
) -> Result<String, HealthError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HealthError::Status { status });
    }
    let body = response.text().await?;
    debug!(%status, body = %body, "health probe ok");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/health"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let body = check_health(&format!("{}/health", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = check_health(&format!("{}/health", server.uri()))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            HealthError::Status { status } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        // Port 1 is reserved and nothing listens there.
        let err = check_health("http://127.0.0.1:1/health").await.unwrap_err();
        assert_matches!(err, HealthError::Http(_));
    }
}
