use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use tokio::time::{sleep, Duration};

use crate::config::HttpConfig;

/// One client per run: browser-like headers, request timeout and a bounded redirect chain.
pub fn build_client(http: &HttpConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&http.accept_language).context("Invalid Accept-Language header")?,
    );

    Client::builder()
        .user_agent(http.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(http.timeout_secs))
        .redirect(Policy::limited(http.max_redirects))
        .build()
        .context("Failed to build HTTP client")
}

struct AttemptError {
    error: anyhow::Error,
    retryable: bool,
}

/// Downloads a page body, retrying transient failures with exponential backoff.
///
/// Connect errors, timeouts, 429 and 5xx responses are retried up to
/// `max_retries` times; any other failure is returned straight away.
pub async fn fetch_page(client: &Client, url: &str, http: &HttpConfig) -> Result<String> {
    let max_attempts = http.max_retries.saturating_add(1);
    let mut attempt: u32 = 0;

    loop {
        let failure = match try_fetch(client, url).await {
            Ok(body) => return Ok(body),
            Err(failure) => failure,
        };
        attempt += 1;

        if !failure.retryable || attempt >= max_attempts {
            return Err(failure.error)
                .with_context(|| format!("Failed to fetch {} after {} attempt(s)", url, attempt));
        }

        let delay = backoff_delay(http.retry_delay_ms, attempt - 1);
        eprintln!(
            "{} {} ({:#}). Retrying in {} ms (attempt {}/{})",
            "Warning: request failed for".yellow(),
            url,
            failure.error,
            delay.as_millis(),
            attempt + 1,
            max_attempts
        );
        sleep(delay).await;
    }
}

async fn try_fetch(client: &Client, url: &str) -> Result<String, AttemptError> {
    let response = client.get(url).send().await.map_err(|e| AttemptError {
        retryable: is_transient(&e),
        error: e.into(),
    })?;

    let status = response.status();
    if let Err(e) = response.error_for_status_ref() {
        return Err(AttemptError {
            retryable: is_retryable_status(status),
            error: e.into(),
        });
    }

    response.text().await.map_err(|e| AttemptError {
        retryable: is_transient(&e),
        error: anyhow::Error::new(e).context("Failed to read response body"),
    })
}

fn is_transient(error: &reqwest::Error) -> bool {
    if error.is_builder() || error.is_redirect() {
        return false;
    }
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// `base_ms * 2^retry`, saturating instead of overflowing.
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(2u64.saturating_pow(retry)))
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};

    use super::*;

    fn fast_http(max_retries: u32) -> HttpConfig {
        HttpConfig {
            timeout_secs: 5,
            max_retries,
            retry_delay_ms: 1,
            ..HttpConfig::default()
        }
    }

    #[test]
    fn backoff_doubles_per_retry() {
        assert_eq!(backoff_delay(1000, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1000, 1), Duration::from_millis(2000));
        assert_eq!(backoff_delay(1000, 3), Duration::from_millis(8000));
        assert_eq!(backoff_delay(u64::MAX, 4), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn only_throttling_and_server_errors_are_retried() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn transport_failures_are_transient_but_malformed_requests_are_not() {
        let malformed = Client::new().get("not a url").build().unwrap_err();
        assert!(!is_transient(&malformed));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let refused = Client::new()
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();
        assert!(is_transient(&refused));
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let mut server = Server::new_async().await;
        let unavailable = server
            .mock("GET", "/item")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body("<p>R$ 10,00</p>")
            .expect(1)
            .create_async()
            .await;
        let http = fast_http(2);
        let client = build_client(&http).unwrap();

        let body = fetch_page(&client, &format!("{}/item", server.url()), &http)
            .await
            .unwrap();

        assert_eq!(body, "<p>R$ 10,00</p>");
        unavailable.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn retries_throttled_requests() {
        let mut server = Server::new_async().await;
        let throttled = server
            .mock("GET", "/item")
            .with_status(429)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/item")
            .with_status(200)
            .with_body("x")
            .expect(1)
            .create_async()
            .await;
        let http = fast_http(2);
        let client = build_client(&http).unwrap();

        let body = fetch_page(&client, &format!("{}/item", server.url()), &http)
            .await
            .unwrap();

        assert_eq!(body, "x");
        throttled.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn gives_up_after_the_last_retry() {
        let mut server = Server::new_async().await;
        let unavailable = server
            .mock("GET", "/item")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;
        let http = fast_http(2);
        let client = build_client(&http).unwrap();

        let err = fetch_page(&client, &format!("{}/item", server.url()), &http)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("after 3 attempt(s)"), "{}", message);
        assert!(message.contains("503"), "{}", message);
        unavailable.assert_async().await;
    }

    #[tokio::test]
    async fn retries_refused_connections() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let http = fast_http(2);
        let client = build_client(&http).unwrap();

        let err = fetch_page(&client, &format!("http://{}/item", addr), &http)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("after 3 attempt(s)"), "{}", message);
    }

    #[tokio::test]
    async fn client_errors_fail_without_retry() {
        let mut server = Server::new_async().await;
        let gone = server
            .mock("GET", "/gone")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let http = fast_http(2);
        let client = build_client(&http).unwrap();

        let err = fetch_page(&client, &format!("{}/gone", server.url()), &http)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("404"), "{}", message);
        assert!(message.contains("after 1 attempt(s)"), "{}", message);
        gone.assert_async().await;
    }

    #[tokio::test]
    async fn follows_redirects() {
        let mut server = Server::new_async().await;
        let moved = server
            .mock("GET", "/p/old")
            .with_status(302)
            .with_header("location", &format!("{}/p/final", server.url()))
            .expect(1)
            .create_async()
            .await;
        let target = server
            .mock("GET", "/p/final")
            .with_status(200)
            .with_body("<p>final</p>")
            .expect(1)
            .create_async()
            .await;
        let http = fast_http(0);
        let client = build_client(&http).unwrap();

        let body = fetch_page(&client, &format!("{}/p/old", server.url()), &http)
            .await
            .unwrap();

        assert_eq!(body, "<p>final</p>");
        moved.assert_async().await;
        target.assert_async().await;
    }

    #[tokio::test]
    async fn too_many_redirects_fail_without_retry() {
        let mut server = Server::new_async().await;
        // Initial request plus three followed redirects.
        let looping = server
            .mock("GET", "/loop")
            .with_status(302)
            .with_header("location", &format!("{}/loop", server.url()))
            .expect(4)
            .create_async()
            .await;
        let http = HttpConfig {
            max_redirects: 3,
            ..fast_http(2)
        };
        let client = build_client(&http).unwrap();

        let err = fetch_page(&client, &format!("{}/loop", server.url()), &http)
            .await
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("after 1 attempt(s)"), "{}", message);
        looping.assert_async().await;
    }

    #[tokio::test]
    async fn sends_configured_headers() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/")
            .match_header("accept-language", "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7")
            .match_header("user-agent", Matcher::Regex("^Mozilla/5.0 ".to_string()))
            .with_status(200)
            .with_body("ok")
            .expect(1)
            .create_async()
            .await;
        let http = fast_http(0);
        let client = build_client(&http).unwrap();

        let body = fetch_page(&client, &format!("{}/", server.url()), &http)
            .await
            .unwrap();

        assert_eq!(body, "ok");
        page.assert_async().await;
    }
}
