//! drive_bridge - a thin async bridge to the Google Drive v3 files API.
//!
//! This library provides:
//! - A session credential set once via `initialize` and shared by every call
//! - List, search, upload, download, update, delete, create-folder and
//!   get-metadata operations, each mapped onto one or two REST calls
//! - A uniform method-call surface (`bridge::call`) returning JSON results or
//!   `{code, message, status}` errors
//!
//! Content is treated as UTF-8 text. OAuth flows, token refresh and retries
//! are left to the caller.
//!
//! # Example
//!
//! ```no_run
//! use drive_bridge::{DriveClient, ListFilesOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DriveClient::new();
//!     client.initialize("ya29.access-token-from-your-oauth-flow").await?;
//!
//!     let page = client.list_files(&ListFilesOptions::default()).await?;
//!     for file in page.files {
//!         println!("{}", file);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod multipart;
pub mod session;

// Re-exports for convenience
pub use client::DriveClient;
pub use config::DriveConfig;
pub use error::{DriveError, ErrorPayload, Result};
pub use ids::extract_id;
pub use models::{
    CreateFolderOptions, DriveFile, FileList, ListFilesOptions, SearchFilesOptions,
    UpdateFileOptions, UploadFileOptions,
};
