//! Shared HTTP foundation for the package index adapters
//!
//! Wraps reqwest with a configured timeout and User-Agent, exponential
//! backoff on transient failures, and translation of HTTP status codes
//! into the registry error taxonomy (404 -> PackageNotFound, 429 ->
//! RateLimitExceeded).

use crate::error::RegistryError;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for index requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depbump/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts for transient failures
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom timeout and User-Agent
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network("", "http client", format!("failed to build client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// GET a JSON document, retrying transient failures with exponential
    /// backoff; `package` and `index` are carried into error values
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        index: &str,
    ) -> Result<T, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(RegistryError::package_not_found(package, index));
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RegistryError::rate_limit_exceeded(index));
                    } else if !status.is_success() {
                        return Err(RegistryError::network(
                            package,
                            index,
                            format!("HTTP {}", status),
                        ));
                    } else {
                        match response.json::<T>().await {
                            Ok(parsed) => return Ok(parsed),
                            Err(e) => {
                                last_error = Some(RegistryError::invalid_response(
                                    package,
                                    index,
                                    format!("failed to parse JSON: {}", e),
                                ));
                            }
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        RegistryError::timeout(package, index)
                    } else {
                        RegistryError::network(package, index, e.to_string())
                    });
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network(package, index, "unknown error".to_string())))
    }
}
