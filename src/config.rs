//! Client configuration.

/// Base URL for Google Drive API v3.
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API v3.
pub const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Endpoints and HTTP settings used by [`DriveClient`](crate::DriveClient).
///
/// The defaults talk to the public Drive API. Overriding the bases is meant
/// for tests and proxies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    pub api_base: String,
    pub upload_base: String,
    pub user_agent: Option<String>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: UPLOAD_API_BASE.to_string(),
            user_agent: None,
        }
    }
}

impl DriveConfig {
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = trim_base(base.into());
        self
    }

    pub fn with_upload_base(mut self, base: impl Into<String>) -> Self {
        self.upload_base = trim_base(base.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// `{api_base}/files{suffix}`
    pub(crate) fn files_url(&self, suffix: &str) -> String {
        format!("{}/files{}", self.api_base, suffix)
    }

    /// `{upload_base}/files{suffix}`
    pub(crate) fn upload_files_url(&self, suffix: &str) -> String {
        format!("{}/files{}", self.upload_base, suffix)
    }
}

fn trim_base(mut base: String) -> String {
    while base.ends_with('/') {
        base.pop();
    }
    base
}
