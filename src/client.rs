//! Google Drive API client.
//!
//! Every operation checks the session credential, validates caller input,
//! then issues one request (two for downloads) through `perform_request`.
//! Nothing is retried.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::DriveConfig;
use crate::error::{DriveError, IdField, Result};
use crate::ids::{validate_id, validate_optional_id};
use crate::models::{
    ApiErrorResponse, CreateFolderOptions, CreateFolderResult, CreatedFile, DownloadMetadata,
    DownloadResult, FileList, FileMetadataResult, ListFilesOptions, SearchFilesOptions,
    SuccessResult, UpdateFileOptions, UploadFileOptions, UploadResult, DEFAULT_PAGE_SIZE,
    FOLDER_MIME_TYPE,
};
use crate::multipart::{self, UpdateMetadata, UploadMetadata};
use crate::session::Session;

/// Field projection for a single file resource.
pub const FILE_FIELDS: &str =
    "id,name,mimeType,createdTime,modifiedTime,size,webViewLink,webContentLink,iconLink,thumbnailLink,parents";

/// Field projection fetched before downloading content.
const DOWNLOAD_METADATA_FIELDS: &str = "id,name,mimeType";

/// Request body variants understood by `perform_request`.
#[derive(Debug)]
enum RequestBody {
    Json(serde_json::Value),
    Multipart(String),
}

/// Client for the Drive files API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session
/// credential.
#[derive(Clone, Debug)]
pub struct DriveClient {
    session: Session,
    http: Client,
    config: Arc<DriveConfig>,
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveClient {
    /// Create a client against the public Drive API.
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            http: Client::new(),
            config: Arc::new(DriveConfig::default()),
        }
    }

    /// Create a client with custom endpoints or user agent.
    pub fn with_config(config: DriveConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            session: Session::new(),
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Store the access token used by every subsequent call.
    ///
    /// Fails with `MissingToken` for an empty token and `InvalidToken` for
    /// one of 20 characters or fewer. A rejected token leaves the previous
    /// credential in place.
    pub async fn initialize(&self, access_token: &str) -> Result<SuccessResult> {
        self.session.set_token(access_token).await?;
        info!("Drive session initialized");
        Ok(SuccessResult { success: true })
    }

    /// List files, one page at a time.
    #[instrument(skip(self, options))]
    pub async fn list_files(&self, options: &ListFilesOptions) -> Result<FileList> {
        let token = self.session.access_token().await?;

        let url = self.config.files_url("");
        let response = self
            .perform_request(&token, Method::GET, &url, &list_query(options), None)
            .await?;

        read_json_or_default(response).await
    }

    /// `listFiles` with a caller-supplied search expression.
    pub async fn search_files(&self, options: &SearchFilesOptions) -> Result<FileList> {
        self.session.access_token().await?;
        if options.query.is_empty() {
            return Err(DriveError::MissingArgument { field: "query" });
        }

        self.list_files(&options.clone().into()).await
    }

    /// Create a file with the given text content.
    #[instrument(skip(self, options), fields(name = %options.name))]
    pub async fn upload_file(&self, options: &UploadFileOptions) -> Result<UploadResult> {
        let token = self.session.access_token().await?;
        require("name", &options.name)?;
        require("mimeType", &options.mime_type)?;
        validate_optional_id(IdField::FolderId, options.folder_id.as_deref())?;

        let metadata = UploadMetadata {
            name: &options.name,
            mime_type: &options.mime_type,
            parents: options.folder_id.as_deref().map(|id| [id]),
        };
        let body = multipart::build_body(&metadata, &options.mime_type, &options.content)?;

        let url = self.config.upload_files_url("");
        let response = self
            .perform_request(
                &token,
                Method::POST,
                &url,
                &[("uploadType", "multipart".to_string())],
                Some(RequestBody::Multipart(body)),
            )
            .await?;

        let created: CreatedFile = read_json(response).await?;
        info!(file_id = %created.id, "Uploaded file");
        Ok(UploadResult {
            file_id: created.id,
            web_view_link: created.web_view_link,
        })
    }

    /// Fetch a file's name and type, then its content as UTF-8 text.
    ///
    /// The content request is only issued once the metadata request has
    /// succeeded.
    #[instrument(skip(self))]
    pub async fn download_file(&self, file_id: &str) -> Result<DownloadResult> {
        let token = self.session.access_token().await?;
        validate_id(IdField::FileId, file_id)?;

        let url = self.config.files_url(&format!("/{}", file_id));

        let response = self
            .perform_request(
                &token,
                Method::GET,
                &url,
                &[("fields", DOWNLOAD_METADATA_FIELDS.to_string())],
                None,
            )
            .await?;
        let metadata: DownloadMetadata = read_json_or_default(response).await?;

        let response = self
            .perform_request(
                &token,
                Method::GET,
                &url,
                &[("alt", "media".to_string())],
                None,
            )
            .await?;
        let content = response.text().await?;

        Ok(DownloadResult {
            content,
            name: metadata.name,
            mime_type: metadata.mime_type,
        })
    }

    /// Replace a file's content. Name and parents are not touched.
    #[instrument(skip(self, options), fields(file_id = %options.file_id))]
    pub async fn update_file(&self, options: &UpdateFileOptions) -> Result<UploadResult> {
        let token = self.session.access_token().await?;
        validate_id(IdField::FileId, &options.file_id)?;
        require("mimeType", &options.mime_type)?;

        let metadata = UpdateMetadata {
            mime_type: &options.mime_type,
        };
        let body = multipart::build_body(&metadata, &options.mime_type, &options.content)?;

        let url = self.config.upload_files_url(&format!("/{}", options.file_id));
        let response = self
            .perform_request(
                &token,
                Method::PATCH,
                &url,
                &[("uploadType", "multipart".to_string())],
                Some(RequestBody::Multipart(body)),
            )
            .await?;

        let updated: CreatedFile = read_json(response).await?;
        info!(file_id = %updated.id, "Updated file");
        Ok(UploadResult {
            file_id: updated.id,
            web_view_link: updated.web_view_link,
        })
    }

    /// Delete a file. Any 2xx status counts as success.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> Result<SuccessResult> {
        let token = self.session.access_token().await?;
        validate_id(IdField::FileId, file_id)?;

        let url = self.config.files_url(&format!("/{}", file_id));
        self.perform_request(&token, Method::DELETE, &url, &[], None).await?;

        info!("Deleted file");
        Ok(SuccessResult { success: true })
    }

    /// Create a folder, optionally under `parent_folder_id`.
    #[instrument(skip(self, options), fields(name = %options.name))]
    pub async fn create_folder(&self, options: &CreateFolderOptions) -> Result<CreateFolderResult> {
        let token = self.session.access_token().await?;
        require("name", &options.name)?;
        validate_optional_id(IdField::ParentFolderId, options.parent_folder_id.as_deref())?;

        let mut metadata = json!({
            "name": options.name,
            "mimeType": FOLDER_MIME_TYPE,
        });
        if let Some(parent) = &options.parent_folder_id {
            metadata["parents"] = json!([parent]);
        }

        let url = self.config.files_url("");
        let response = self
            .perform_request(&token, Method::POST, &url, &[], Some(RequestBody::Json(metadata)))
            .await?;

        let created: CreatedFile = read_json(response).await?;
        info!(folder_id = %created.id, "Created folder");
        Ok(CreateFolderResult {
            folder_id: created.id,
        })
    }

    /// Fetch the full metadata projection for one file.
    #[instrument(skip(self))]
    pub async fn get_file_metadata(&self, file_id: &str) -> Result<FileMetadataResult> {
        let token = self.session.access_token().await?;
        validate_id(IdField::FileId, file_id)?;

        let url = self.config.files_url(&format!("/{}", file_id));
        let response = self
            .perform_request(
                &token,
                Method::GET,
                &url,
                &[("fields", FILE_FIELDS.to_string())],
                None,
            )
            .await?;

        Ok(FileMetadataResult {
            file: read_json_or_default(response).await?,
        })
    }

    /// Send one authenticated request and fail on any non-2xx status.
    async fn perform_request(
        &self,
        token: &str,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<RequestBody>,
    ) -> Result<Response> {
        debug!(%method, url, ?query, "Drive API request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Multipart(text)) => request
                .header(CONTENT_TYPE, multipart::content_type())
                .body(text),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err = error_from_response(response).await;
            warn!(%method, url, status = status.as_u16(), "Drive API error: {}", err);
            return Err(err);
        }

        Ok(response)
    }
}

/// Build the `files.list` query. Unset options are left out entirely.
pub(crate) fn list_query(options: &ListFilesOptions) -> Vec<(&'static str, String)> {
    let page_size = options
        .page_size
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let mut query = vec![
        ("pageSize", page_size.to_string()),
        ("fields", format!("files({}),nextPageToken", FILE_FIELDS)),
    ];

    let optional = [
        ("q", &options.query),
        ("orderBy", &options.order_by),
        ("pageToken", &options.page_token),
    ];
    for (key, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            query.push((key, value.to_string()));
        }
    }

    query
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DriveError::MissingArgument { field });
    }
    Ok(())
}

/// Parse a 2xx body, failing with `Parse` if it is empty or malformed.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Parse a 2xx body, falling back to an empty result if it is empty or malformed.
async fn read_json_or_default<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let text = response.text().await?;
    Ok(parse_or_default(&text))
}

fn parse_or_default<T>(text: &str) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_str(text).unwrap_or_else(|err| {
        if !text.trim().is_empty() {
            warn!("Unparseable response body treated as empty: {}", err);
        }
        T::default()
    })
}

/// Turn a non-2xx response into an `Http` error, preferring the upstream
/// `error.message`, then the raw body, then the status text.
async fn error_from_response(response: Response) -> DriveError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|api_error| api_error.error.message)
        .filter(|m| !m.is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.clone()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    DriveError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DriveFile;

    fn value_of<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_list_query_defaults() {
        let query = list_query(&ListFilesOptions::default());

        assert_eq!(value_of(&query, "pageSize"), Some("100"));
        assert_eq!(
            value_of(&query, "fields"),
            Some("files(id,name,mimeType,createdTime,modifiedTime,size,webViewLink,webContentLink,iconLink,thumbnailLink,parents),nextPageToken")
        );
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_list_query_with_search() {
        let options = ListFilesOptions {
            page_size: Some(50),
            query: Some("name contains 'report'".to_string()),
            ..Default::default()
        };
        let query = list_query(&options);

        assert_eq!(value_of(&query, "pageSize"), Some("50"));
        assert_eq!(value_of(&query, "q"), Some("name contains 'report'"));
        assert!(value_of(&query, "orderBy").is_none());
        assert!(value_of(&query, "pageToken").is_none());
    }

    #[test]
    fn test_list_query_skips_empty_strings_and_zero_page_size() {
        let options = ListFilesOptions {
            page_size: Some(0),
            query: Some(String::new()),
            order_by: Some("modifiedTime desc".to_string()),
            page_token: Some("tok".to_string()),
        };
        let query = list_query(&options);

        assert_eq!(value_of(&query, "pageSize"), Some("100"));
        assert!(value_of(&query, "q").is_none());
        assert_eq!(value_of(&query, "orderBy"), Some("modifiedTime desc"));
        assert_eq!(value_of(&query, "pageToken"), Some("tok"));
    }

    #[test]
    fn test_unparseable_body_falls_back_to_default() {
        let list: FileList = parse_or_default("");
        assert!(list.files.is_empty());

        let file: DriveFile = parse_or_default("<html>");
        assert_eq!(file, DriveFile::default());

        let list: FileList = parse_or_default(r#"{"files":[{"id":"a"}],"nextPageToken":"n"}"#);
        assert_eq!(list.files[0].id, "a");
        assert_eq!(list.next_page_token.as_deref(), Some("n"));
    }

    #[test]
    fn test_require() {
        assert!(require("name", "x").is_ok());
        assert_eq!(require("name", "").unwrap_err().code(), "MISSING_NAME");
    }
}
