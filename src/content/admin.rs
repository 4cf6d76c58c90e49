//! Command line administration of uploaded pictures
//!
//! Every command that changes the store also rewrites the cached snapshot,
//! so a viewer started offline right afterwards shows the same pages.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::content::cache::{write_snapshot, FileCache, LocalCache};
use crate::content::record::{MetadataPatch, NewImage, RemoteImageRecord};
use crate::content::store::{ContentStore, DirectoryStore};
use crate::core::cli::{AdminCommand, CliArgs};
use crate::core::errors::{ensure, BookContext, BookResult, Context};

/// Picture formats the viewer can decode
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Caption part of an export, keyed by picture id
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedContent {
    pub title: String,
    pub event_name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub images: Vec<RemoteImageRecord>,
    pub content: BTreeMap<String, ExportedContent>,
    pub exported_at: DateTime<Utc>,
}

impl Export {
    pub fn new(images: Vec<RemoteImageRecord>, exported_at: DateTime<Utc>) -> Self {
        let content = images
            .iter()
            .map(|record| {
                (
                    record.id.clone(),
                    ExportedContent {
                        title: record.title.clone(),
                        event_name: record.event_name.clone(),
                        lines: record.lines.clone(),
                    },
                )
            })
            .collect();
        Self {
            images,
            content,
            exported_at,
        }
    }

    pub fn default_file_name(exported_at: DateTime<Utc>) -> String {
        format!("magazine_data_{}.json", exported_at.format("%Y-%m-%d"))
    }
}

/// Runs one admin command against the store and cache under `--data-dir`
pub fn run_admin(args: &CliArgs, command: &AdminCommand) -> BookResult<()> {
    let store = DirectoryStore::open(args.store_dir())?;
    let cache = FileCache::open(args.cache_path());
    execute(&store, &cache, command)
}

pub fn execute(
    store: &dyn ContentStore,
    cache: &dyn LocalCache,
    command: &AdminCommand,
) -> BookResult<()> {
    match command {
        AdminCommand::List => {
            let snapshot = store.list()?;
            if snapshot.is_empty() {
                println!("No uploaded pictures");
            }
            for record in snapshot.records() {
                println!(
                    "{}  {}  {} ({})",
                    record.id,
                    record.uploaded_at.format("%Y-%m-%d %H:%M"),
                    record.title,
                    record.event_name
                );
            }
            return Ok(());
        }
        AdminCommand::Upload {
            file,
            title,
            event_name,
            lines,
        } => {
            let id = upload(store, file, title, event_name, lines)?;
            println!("Uploaded {} as {}", file.display(), id);
        }
        AdminCommand::Edit {
            id,
            title,
            event_name,
            line1,
            line2,
        } => {
            let patch = MetadataPatch {
                title: title.clone(),
                event_name: event_name.clone(),
                line1: line1.clone(),
                line2: line2.clone(),
            };
            ensure!(!patch.is_empty(), "Nothing to change for '{}'", id);
            store
                .update(id, &patch)
                .with_context(|| format!("Failed to update record '{id}'"))?;
            println!("Updated {id}");
        }
        AdminCommand::Delete { id } => {
            store
                .delete(id)
                .with_context(|| format!("Failed to delete record '{id}'"))?;
            println!("Deleted {id}");
        }
        AdminCommand::Export { out } => {
            let path = export(store, out.as_deref())?;
            println!("Exported to {}", path.display());
            return Ok(());
        }
    }
    write_snapshot(cache, &store.list()?)
}

fn upload(
    store: &dyn ContentStore,
    file: &Path,
    title: &str,
    event_name: &str,
    lines: &[String],
) -> BookResult<String> {
    ensure!(!title.trim().is_empty(), "A title is required");
    ensure!(!event_name.trim().is_empty(), "An event name is required");
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    ensure!(
        SUPPORTED_EXTENSIONS.contains(&extension.as_str()),
        "Unsupported picture format '{}', expected one of {:?}",
        file.display(),
        SUPPORTED_EXTENSIONS
    );

    let binary = fs::read(file).with_file_context("read", file)?;
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    store.create(
        &binary,
        NewImage {
            name,
            title: title.to_string(),
            event_name: event_name.to_string(),
            lines: lines.to_vec(),
        },
    )
}

fn export(store: &dyn ContentStore, out: Option<&Path>) -> BookResult<PathBuf> {
    let now = Utc::now();
    let export = Export::new(store.list()?.into_records(), now);
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(Export::default_file_name(now)));
    let text = serde_json::to_string_pretty(&export)?;
    fs::write(&path, text).with_file_context("write", &path)?;
    Ok(path)
}
