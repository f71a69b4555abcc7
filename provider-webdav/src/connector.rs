//! WebDAV connector for Nextcloud-style servers
//!
//! URL layout:
//!
//! - status document: `<server>/status.php`
//! - DAV root: `<server>/remote.php/dav`
//! - user files: `<server>/remote.php/dav/files/<user>/<path>`

use bridge_traits::http::{
    AttemptReport, HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy,
};
use bytes::Bytes;
use core_auth::ServerCredentials;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, WebDavError};
use crate::mime::content_type_for;
use crate::multistatus;
use crate::types::{RemoteDirectory, RemoteInventory, ServerStatus};

/// Path of the DAV endpoint below the server root
const DAV_PATH: &str = "remote.php/dav";

/// Properties requested by every PROPFIND
const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

/// Timeout for PROPFIND and status requests
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// WebDAV connector
///
/// Holds the credentials for one server. All requests use HTTP Basic
/// authentication. Only uploads are retried; connectivity checks and
/// listings make a single attempt.
///
/// # Example
///
/// ```ignore
/// use provider_webdav::{RemoteDirectory, WebDavConnector};
///
/// let connector = WebDavConnector::new(http_client, credentials);
/// connector.check_connectivity().await?;
/// let inventory = connector.list_file_names(&RemoteDirectory::new("/Photos/Backup")).await;
/// ```
pub struct WebDavConnector {
    http_client: Arc<dyn HttpClient>,
    credentials: ServerCredentials,
    retry_policy: RetryPolicy,
    upload_timeout: Duration,
}

impl WebDavConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, credentials: ServerCredentials) -> Self {
        Self {
            http_client,
            credentials,
            retry_policy: RetryPolicy::default(),
            upload_timeout: Duration::from_secs(120),
        }
    }

    /// Retry policy used for uploads
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Per-attempt timeout for uploads
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn credentials(&self) -> &ServerCredentials {
        &self.credentials
    }

    // ========================================================================
    // URLs
    // ========================================================================

    /// `<server>/remote.php/dav`
    pub fn dav_base_url(&self) -> String {
        format!("{}/{}", self.credentials.server_root(), DAV_PATH)
    }

    /// `<server>/remote.php/dav/files/<user>`
    pub fn user_root_url(&self) -> String {
        format!(
            "{}/files/{}",
            self.dav_base_url(),
            urlencoding::encode(&self.credentials.username)
        )
    }

    /// URL of a directory below the user root, each segment percent-encoded.
    pub fn directory_url(&self, directory: &RemoteDirectory) -> String {
        let mut url = self.user_root_url();
        for segment in directory.segments() {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    pub fn file_url(&self, directory: &RemoteDirectory, file_name: &str) -> String {
        format!(
            "{}/{}",
            self.directory_url(directory),
            urlencoding::encode(file_name)
        )
    }

    /// Decoded DAV-relative path of a directory (`files/<user>/<dir>`).
    fn dav_relative_path(&self, directory: &RemoteDirectory) -> String {
        let normalized = directory.normalized();
        if normalized.is_empty() {
            format!("files/{}", self.credentials.username)
        } else {
            format!("files/{}/{}", self.credentials.username, normalized)
        }
    }

    fn propfind(&self, url: String) -> HttpRequest {
        HttpRequest::new(HttpMethod::Propfind, url)
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .basic_auth(&self.credentials.username, &self.credentials.password)
            .body(Bytes::from_static(PROPFIND_BODY.as_bytes()))
            .timeout(METADATA_TIMEOUT)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Fetch the public `status.php` document.
    ///
    /// Needs no authentication; only proves the URL points at a live server.
    /// The body is parsed best-effort.
    #[instrument(skip(self), fields(server = %self.credentials.server_root()))]
    pub async fn check_server_status(&self) -> Result<ServerStatus> {
        let url = format!("{}/status.php", self.credentials.server_root());
        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(METADATA_TIMEOUT);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| WebDavError::Unreachable(e.to_string()))?;

        if response.status != 200 {
            warn!(status = response.status, "Status check failed");
            return Err(WebDavError::from_status(response.status, &response.body));
        }

        let status = response.json::<ServerStatus>().unwrap_or_else(|e| {
            debug!(error = %e, "status.php body is not a status document");
            ServerStatus::default()
        });

        info!(
            product = %status.product_name,
            version = %status.version,
            "Server reachable"
        );
        Ok(status)
    }

    /// Authenticated `PROPFIND` on the user root; succeeds only on `207`.
    #[instrument(skip(self), fields(server = %self.credentials.server_root()))]
    pub async fn check_connectivity(&self) -> Result<()> {
        let response = self
            .http_client
            .execute(self.propfind(self.user_root_url()))
            .await
            .map_err(|e| {
                warn!(error = %e, "Connectivity check failed");
                WebDavError::Unreachable(e.to_string())
            })?;

        if !response.is_multi_status() {
            warn!(status = response.status, "Connectivity check rejected");
            return Err(WebDavError::from_status(response.status, &response.body));
        }

        debug!("Connectivity check succeeded");
        Ok(())
    }

    /// Names of the entries directly inside `directory`.
    ///
    /// Never fails: transport errors, non-207 responses and malformed bodies
    /// produce an incomplete inventory holding whatever could be read.
    #[instrument(skip(self, directory), fields(directory = %directory))]
    pub async fn list_file_names(&self, directory: &RemoteDirectory) -> RemoteInventory {
        let response = match self
            .http_client
            .execute(self.propfind(self.directory_url(directory)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Remote listing failed, assuming empty directory");
                return RemoteInventory::default();
            }
        };

        if !response.is_multi_status() {
            warn!(
                status = response.status,
                "Remote listing returned no multistatus, assuming empty directory"
            );
            return RemoteInventory::default();
        }

        self.parse_inventory(&response, directory)
    }

    fn parse_inventory(&self, response: &HttpResponse, directory: &RemoteDirectory) -> RemoteInventory {
        let body = String::from_utf8_lossy(&response.body);
        let (names, error) =
            multistatus::child_names(&body, &self.dav_relative_path(directory));

        if let Some(error) = &error {
            warn!(error = %error, parsed = names.len(), "Remote listing only partially parsed");
        } else {
            debug!(count = names.len(), "Remote listing parsed");
        }

        RemoteInventory {
            names,
            complete: error.is_none(),
        }
    }

    /// Upload one file with `PUT`, retrying per the configured policy.
    ///
    /// Any 2xx status counts as success and is returned.
    pub async fn upload(
        &self,
        directory: &RemoteDirectory,
        file_name: &str,
        content: Bytes,
    ) -> Result<u16> {
        self.upload_observed(directory, file_name, content, &|_: &AttemptReport| {})
            .await
    }

    /// [`upload`](Self::upload) with a callback after every attempt.
    #[instrument(skip(self, directory, content, observer), fields(directory = %directory, bytes = content.len()))]
    pub async fn upload_observed(
        &self,
        directory: &RemoteDirectory,
        file_name: &str,
        content: Bytes,
        observer: &(dyn for<'a> Fn(&'a AttemptReport) + Send + Sync),
    ) -> Result<u16> {
        let request = HttpRequest::new(HttpMethod::Put, self.file_url(directory, file_name))
            .header("Content-Type", content_type_for(file_name))
            .basic_auth(&self.credentials.username, &self.credentials.password)
            .body(content)
            .timeout(self.upload_timeout);

        let traced = |report: &AttemptReport| {
            if report.will_retry {
                warn!(
                    attempt = report.attempt,
                    status = ?report.status,
                    error = ?report.error,
                    "Upload attempt failed, retrying"
                );
            }
            observer(report);
        };

        let response = self
            .http_client
            .execute_with_retry_observed(request, self.retry_policy.clone(), &traced)
            .await?;

        if !response.is_success() {
            warn!(status = response.status, file_name, "Upload rejected");
            return Err(WebDavError::from_status(response.status, &response.body));
        }

        debug!(status = response.status, file_name, "Upload accepted");
        Ok(response.status)
    }
}
