//! drive_bridge CLI - call the Drive bridge from a shell.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use drive_bridge::{
    bridge, extract_id, CreateFolderOptions, DriveClient, DriveConfig, FileList, ListFilesOptions,
    SearchFilesOptions, UpdateFileOptions, UploadFileOptions,
};

/// CLI for the Google Drive bridge.
#[derive(Parser)]
#[command(name = "drive_bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OAuth access token with a Drive scope.
    #[arg(long, env = "GOOGLE_DRIVE_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Override the Drive API base URL.
    #[arg(long, env = "DRIVE_API_BASE", hide = true)]
    api_base: Option<String>,

    /// Override the Drive upload base URL.
    #[arg(long, env = "DRIVE_UPLOAD_BASE", hide = true)]
    upload_base: Option<String>,

    /// Log requests to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files.
    List {
        /// Drive query expression, e.g. "'<folder id>' in parents".
        #[arg(long, short = 'q')]
        query: Option<String>,

        #[arg(long)]
        page_size: Option<u32>,

        #[arg(long)]
        order_by: Option<String>,

        #[arg(long)]
        page_token: Option<String>,

        /// Print raw JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Search files with a Drive query expression.
    Search {
        query: String,

        #[arg(long)]
        page_size: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Upload text files (supports glob patterns like *.md, notes_{1,2}.txt).
    Upload {
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder URL or ID.
        #[arg(long, short = 't')]
        to: Option<String>,

        /// MIME type; guessed from the file name when omitted.
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Download a file's text content.
    Download {
        /// File URL or ID.
        file: String,

        /// Write content here instead of printing the JSON result.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace a file's content with a local text file.
    Update {
        /// File URL or ID.
        file: String,

        /// Local file with the new content.
        source: PathBuf,

        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Delete a file.
    Delete {
        /// File URL or ID.
        file: String,
    },

    /// Create a folder.
    Mkdir {
        name: String,

        /// Parent folder URL or ID.
        #[arg(long, short = 'p')]
        parent: Option<String>,
    },

    /// Show file metadata.
    Info {
        /// File URL or ID.
        file: String,
    },

    /// Invoke a bridge method directly, e.g. `call listFiles '{"pageSize":5}'`.
    Call {
        method: String,

        /// JSON options object.
        #[arg(default_value = "{}")]
        options: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = DriveConfig::default();
    if let Some(base) = &cli.api_base {
        config = config.with_api_base(base);
    }
    if let Some(base) = &cli.upload_base {
        config = config.with_upload_base(base);
    }
    config = config.with_user_agent(concat!("drive_bridge/", env!("CARGO_PKG_VERSION")));

    let client = DriveClient::with_config(config).context("Failed to build HTTP client")?;

    if let Some(token) = &cli.token {
        client
            .initialize(token)
            .await
            .context("Failed to initialize session")?;
    }

    match cli.command {
        Commands::List {
            query,
            page_size,
            order_by,
            page_token,
            json,
        } => {
            let options = ListFilesOptions {
                page_size,
                query,
                order_by,
                page_token,
            };
            let page = client
                .list_files(&options)
                .await
                .context("Failed to list files")?;
            print_listing(&page, json)?;
        }

        Commands::Search {
            query,
            page_size,
            json,
        } => {
            let page = client
                .search_files(&SearchFilesOptions { query, page_size })
                .await
                .context("Failed to search files")?;
            print_listing(&page, json)?;
        }

        Commands::Upload {
            patterns,
            to,
            mime_type,
        } => {
            let folder_id = to
                .map(|to| {
                    extract_id(&to).with_context(|| format!("Invalid folder URL or ID: {}", to))
                })
                .transpose()?;

            let files_to_upload = expand_patterns(&patterns)?;
            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }

            eprintln!("Uploading {} file(s)...", files_to_upload.len());

            let mut failures = 0usize;
            for (idx, file_path) in files_to_upload.iter().enumerate() {
                let name = file_name(file_path)?;
                eprint!("[{}/{}] Uploading {}... ", idx + 1, files_to_upload.len(), name);

                let options = UploadFileOptions {
                    name: name.clone(),
                    content: read_text(file_path).await?,
                    mime_type: mime_type.clone().unwrap_or_else(|| guess_mime(file_path)),
                    folder_id: folder_id.clone(),
                };

                match client.upload_file(&options).await {
                    Ok(result) => {
                        eprintln!("OK");
                        print_json(&result)?;
                    }
                    Err(e) => {
                        failures += 1;
                        eprintln!("FAILED");
                        eprintln!("  Error: {}", e);
                    }
                }
            }

            if failures > 0 {
                anyhow::bail!("{} upload(s) failed", failures);
            }
        }

        Commands::Download { file, output } => {
            let file_id =
                extract_id(&file).with_context(|| format!("Invalid file URL or ID: {}", file))?;

            let result = client
                .download_file(&file_id)
                .await
                .with_context(|| format!("Failed to download file: {}", file_id))?;

            match output {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(&result.name)
                    } else {
                        path
                    };
                    tokio::fs::write(&path, result.content.as_bytes())
                        .await
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("Saved to: {:?}", path);
                }
                None => print_json(&result)?,
            }
        }

        Commands::Update {
            file,
            source,
            mime_type,
        } => {
            let file_id =
                extract_id(&file).with_context(|| format!("Invalid file URL or ID: {}", file))?;

            let options = UpdateFileOptions {
                file_id,
                content: read_text(&source).await?,
                mime_type: mime_type.unwrap_or_else(|| guess_mime(&source)),
            };
            let result = client
                .update_file(&options)
                .await
                .context("Failed to update file")?;
            print_json(&result)?;
        }

        Commands::Delete { file } => {
            let file_id =
                extract_id(&file).with_context(|| format!("Invalid file URL or ID: {}", file))?;
            let result = client
                .delete_file(&file_id)
                .await
                .with_context(|| format!("Failed to delete file: {}", file_id))?;
            print_json(&result)?;
        }

        Commands::Mkdir { name, parent } => {
            let parent_folder_id = parent
                .map(|p| extract_id(&p).with_context(|| format!("Invalid folder URL or ID: {}", p)))
                .transpose()?;

            let result = client
                .create_folder(&CreateFolderOptions {
                    name,
                    parent_folder_id,
                })
                .await
                .context("Failed to create folder")?;
            print_json(&result)?;
        }

        Commands::Info { file } => {
            let file_id =
                extract_id(&file).with_context(|| format!("Invalid file URL or ID: {}", file))?;
            let result = client
                .get_file_metadata(&file_id)
                .await
                .with_context(|| format!("Failed to get metadata: {}", file_id))?;
            print_json(&result)?;
        }

        Commands::Call { method, options } => {
            let options: serde_json::Value =
                serde_json::from_str(&options).context("Options must be a JSON object")?;

            match bridge::call(&client, &method, options).await {
                Ok(value) => print_json(&value)?,
                Err(payload) => {
                    print_json(&payload)?;
                    anyhow::bail!("{}", payload);
                }
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries results only.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "drive_bridge=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_listing(page: &FileList, json: bool) -> Result<()> {
    if json {
        return print_json(page);
    }

    if page.files.is_empty() {
        println!("No files found.");
    } else {
        println!("{:<44} {:>10} {:<30} {}", "ID", "SIZE", "TYPE", "NAME");
        println!("{}", "-".repeat(100));
        for file in &page.files {
            println!("{}", file);
        }
    }
    if let Some(token) = &page.next_page_token {
        println!("\nNext page token: {}", token);
    }
    Ok(())
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?} as UTF-8 text", path))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("Invalid file name: {:?}", path))
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("text/plain")
        .to_string()
}

/// Expand glob and brace patterns into a sorted, de-duplicated file list.
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        for expanded_pattern in expand_braces(pattern) {
            let matches: Vec<PathBuf> = glob(&expanded_pattern)
                .with_context(|| format!("Invalid glob pattern: {}", expanded_pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();

            if matches.is_empty() {
                let path = PathBuf::from(&expanded_pattern);
                if path.is_file() {
                    files.push(path);
                } else {
                    tracing::warn!("No files matched pattern: {}", expanded_pattern);
                }
            } else {
                files.extend(matches);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Expand brace patterns like file_{1,2,3}.txt into multiple patterns.
fn expand_braces(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let alternatives = &pattern[start + 1..end];

            return alternatives
                .split(',')
                .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt.trim(), suffix)))
                .collect();
        }
    }

    vec![pattern.to_string()]
}
