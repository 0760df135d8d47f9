//! Uniform method-call surface.
//!
//! Host bindings (mobile plugins, desktop shells, web workers) forward a
//! method name and a JSON options object here and get back either a JSON
//! result or an [`ErrorPayload`]. They hold no request logic of their own.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::DriveClient;
use crate::error::{DriveError, ErrorPayload, Result};
use crate::models::{
    CreateFolderOptions, FileIdOptions, InitializeOptions, ListFilesOptions, SearchFilesOptions,
    UpdateFileOptions, UploadFileOptions,
};

/// Method names accepted by [`call`].
pub const METHODS: &[&str] = &[
    "initialize",
    "listFiles",
    "uploadFile",
    "downloadFile",
    "updateFile",
    "deleteFile",
    "createFolder",
    "getFileMetadata",
    "searchFiles",
];

/// Dispatch `method` with `options` against `client`.
///
/// `null` options are treated as `{}`.
pub async fn call(
    client: &DriveClient,
    method: &str,
    options: Value,
) -> std::result::Result<Value, ErrorPayload> {
    debug!(method, "bridge call");
    dispatch(client, method, options)
        .await
        .map_err(ErrorPayload::from)
}

async fn dispatch(client: &DriveClient, method: &str, options: Value) -> Result<Value> {
    // The credential check outranks option decoding for every known method.
    if method != "initialize" && METHODS.contains(&method) {
        client.session().access_token().await?;
    }

    match method {
        "initialize" => {
            let opts: InitializeOptions = parse_options(options)?;
            to_value(client.initialize(&opts.access_token).await?)
        }
        "listFiles" => {
            let opts: ListFilesOptions = parse_options(options)?;
            to_value(client.list_files(&opts).await?)
        }
        "searchFiles" => {
            let opts: SearchFilesOptions = parse_options(options)?;
            to_value(client.search_files(&opts).await?)
        }
        "uploadFile" => {
            let opts: UploadFileOptions = parse_options(options)?;
            to_value(client.upload_file(&opts).await?)
        }
        "downloadFile" => {
            let opts: FileIdOptions = parse_options(options)?;
            to_value(client.download_file(&opts.file_id).await?)
        }
        "updateFile" => {
            let opts: UpdateFileOptions = parse_options(options)?;
            to_value(client.update_file(&opts).await?)
        }
        "deleteFile" => {
            let opts: FileIdOptions = parse_options(options)?;
            to_value(client.delete_file(&opts.file_id).await?)
        }
        "createFolder" => {
            let opts: CreateFolderOptions = parse_options(options)?;
            to_value(client.create_folder(&opts).await?)
        }
        "getFileMetadata" => {
            let opts: FileIdOptions = parse_options(options)?;
            to_value(client.get_file_metadata(&opts.file_id).await?)
        }
        other => Err(DriveError::UnknownMethod(other.to_string())),
    }
}

fn parse_options<T: DeserializeOwned>(options: Value) -> Result<T> {
    let options = match options {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(options).map_err(|e| DriveError::InvalidOptions(e.to_string()))
}

fn to_value<T: Serialize>(result: T) -> Result<Value> {
    Ok(serde_json::to_value(result)?)
}
