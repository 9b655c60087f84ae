use crate::COMPOSER_INSTALLER_URL;
use crate::error::InstallError;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default connect timeout for the installer download
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default overall timeout for the installer download
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Where the bootstrap installer bytes come from.
pub trait InstallerSource {
    /// Fetch the complete installer script.
    ///
    /// # Errors
    ///
    /// `DownloadFailed` on any transport or protocol failure. Implementations
    /// must not retry.
    fn fetch(&self) -> Result<Vec<u8>, InstallError>;

    /// Human-readable origin for logs and error messages.
    fn describe(&self) -> String;
}

/// Downloads the installer with a single HTTPS GET.
#[derive(Debug, Clone)]
pub struct HttpInstallerSource {
    url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Default for HttpInstallerSource {
    fn default() -> Self {
        Self::new(COMPOSER_INSTALLER_URL)
    }
}

impl HttpInstallerSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn failure(&self, reason: impl Into<String>) -> InstallError {
        InstallError::DownloadFailed {
            url: self.url.clone(),
            reason: reason.into(),
        }
    }

    async fn download(&self) -> Result<Vec<u8>, InstallError> {
        let client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| self.failure(format!("failed to build HTTP client: {e}")))?;

        debug!(url = %self.url, "Downloading installer");
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(format!("HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.failure(format!("failed to read response body: {e}")))?;
        debug!(url = %self.url, bytes = body.len(), "Downloaded installer");
        Ok(body.to_vec())
    }
}

impl InstallerSource for HttpInstallerSource {
    fn fetch(&self) -> Result<Vec<u8>, InstallError> {
        // The runner API is synchronous; drive the request on a private runtime
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.failure(format!("failed to create tokio runtime: {e}")))?;
        runtime.block_on(self.download())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
