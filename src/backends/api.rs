//! HTTP API scanning backend.
//!
//! Posts the file as multipart form data to a Cloudmersive-compatible
//! scanning API and inspects the response body for a clean-result
//! marker.
//!
//! The body check is a deliberate substring match, not JSON parsing:
//! any response (or empty body) without `"CleanResult":true` reads as
//! infected. Under the default [`ApiOutageVerdict::FailClosed`] this
//! extends to transport failures; configure
//! [`ApiOutageVerdict::Unchecked`] to separate outages from verdicts.

use crate::audit::{EventLevel, EventSink, ScanEvent};
use crate::backends::Engine;
use crate::core::{ApiConfig, ApiOutageVerdict, FileReference, ScanError, ScanVerdict};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;

/// Substring identifying a clean result in the API response body.
const CLEAN_MARKER: &str = "\"CleanResult\":true";

/// Path of the file-scan operation, relative to the configured endpoint.
const SCAN_PATH: &str = "/virus/scan/file";

/// Name of the multipart form field carrying the file bytes.
const FILE_FIELD: &str = "inputFile";

/// Fixed placeholder returned by `version`; the remote service is not
/// queried.
const API_VERSION_PLACEHOLDER: &str = "1";

/// Maximum number of redirect hops followed per request.
const MAX_REDIRECTS: usize = 10;

/// Scanning backend backed by an HTTPS multipart upload.
#[derive(Debug)]
pub struct ApiClient {
    params: ApiConfig,
    outage_verdict: ApiOutageVerdict,
    client: reqwest::Client,
    events: Arc<dyn EventSink>,
}

impl ApiClient {
    /// Creates an API backend.
    ///
    /// The HTTP client is built once with the configured total timeout
    /// and a redirect limit of ten hops.
    pub fn new(
        params: ApiConfig,
        outage_verdict: ApiOutageVerdict,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, crate::core::ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(params.timeout_secs())))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|err| crate::core::ConfigError::HttpClient(err.to_string()))?;

        Ok(Self {
            params,
            outage_verdict,
            client,
            events,
        })
    }

    fn scan_url(&self) -> String {
        format!("{}{}", self.params.endpoint.trim_end_matches('/'), SCAN_PATH)
    }

    /// Uploads the file and returns the raw response body.
    async fn upload(&self, file: &FileReference) -> Result<String, ScanError> {
        let data = tokio::fs::read(file.path()).await?;

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file.file_name().unwrap_or("upload").to_string());
        let form = reqwest::multipart::Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(self.scan_url())
            .header("Apikey", self.params.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|err| ScanError::transport("api", err.to_string()))?;

        response
            .text()
            .await
            .map_err(|err| ScanError::transport("api", err.to_string()))
    }

    /// Interprets the raw response body.
    ///
    /// The API backend never surfaces a virus name, so its infected
    /// verdicts carry none.
    fn parse_body(body: &str) -> ScanVerdict {
        if body.contains(CLEAN_MARKER) {
            ScanVerdict::Clean
        } else {
            ScanVerdict::Infected { virus_name: None }
        }
    }
}

#[async_trait]
impl Engine for ApiClient {
    fn name(&self) -> &str {
        "api"
    }

    async fn scan(&self, file: &FileReference) -> ScanVerdict {
        match self.upload(file).await {
            Ok(body) => Self::parse_body(&body),
            Err(err) => {
                self.events.emit(
                    &ScanEvent::new(
                        EventLevel::Warning,
                        format!("Scan request for {} failed: {}", file.uri(), err),
                    )
                    .with_file(file)
                    .with_target(self.scan_url())
                    .with_backend(self.name()),
                );

                match self.outage_verdict {
                    ApiOutageVerdict::FailClosed => ScanVerdict::Infected { virus_name: None },
                    ApiOutageVerdict::Unchecked => ScanVerdict::Unchecked,
                }
            }
        }
    }

    async fn version(&self) -> Option<String> {
        Some(API_VERSION_PLACEHOLDER.to_string())
    }
}
