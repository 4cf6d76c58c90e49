//! Command line arguments for the application

use crate::core::errors::{ensure, BookResult};
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// command line arguments for the memory book viewer and its admin tools
#[derive(Parser, Debug, Clone, Resource)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// asset folder (inside assets/) holding the page textures
    #[arg(long = "asset-root", default_value = "textures")]
    pub asset_root: String,

    /// directory for the local cache and the content store
    #[arg(long = "data-dir", default_value = "memory-book-data")]
    pub data_dir: PathBuf,

    /// number of built-in pictures, named 1.jpg through N.jpg
    #[arg(long = "local-pages", default_value_t = 20)]
    pub local_pages: usize,

    /// seconds between reconciliation polls of the content store
    #[arg(long = "poll-secs", default_value_t = 15)]
    pub poll_secs: u64,

    /// display debug information
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// manage uploaded pictures instead of opening the book
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    /// list uploaded pictures in page order
    List,
    /// upload a picture with its caption
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long = "event")]
        event_name: String,
        /// description line, may be given more than once
        #[arg(long = "line")]
        lines: Vec<String>,
    },
    /// change the caption of an uploaded picture
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "event")]
        event_name: Option<String>,
        #[arg(long)]
        line1: Option<String>,
        #[arg(long)]
        line2: Option<String>,
    },
    /// remove an uploaded picture and its record
    Delete { id: String },
    /// write every record and caption to a JSON file
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl CliArgs {
    pub fn validate(&self) -> BookResult<()> {
        ensure!(
            !self.asset_root.trim().is_empty(),
            "--asset-root must not be empty"
        );
        ensure!(
            !self.asset_root.ends_with('/'),
            "--asset-root must not end with '/', got: {}",
            self.asset_root
        );
        ensure!(self.poll_secs > 0, "--poll-secs must be at least 1");
        if self.data_dir.exists() {
            ensure!(
                self.data_dir.is_dir(),
                "Data path must be a directory: {}",
                self.data_dir.display()
            );
        }
        Ok(())
    }

    /// Identifiers of the built-in pictures, "1" through "N"
    pub fn local_ids(&self) -> Vec<String> {
        (1..=self.local_pages).map(|n| n.to_string()).collect()
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("cache.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_and_validate() {
        let args = CliArgs::parse_from(["memory-book"]);
        assert_eq!(args.asset_root, "textures");
        assert_eq!(args.local_pages, 20);
        assert!(args.command.is_none());
        assert!(args.validate().is_ok());
        assert_eq!(args.local_ids().first().map(String::as_str), Some("1"));
        assert_eq!(args.local_ids().last().map(String::as_str), Some("20"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let args = CliArgs::parse_from(["memory-book", "--poll-secs", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn admin_upload_collects_lines() {
        let args = CliArgs::parse_from([
            "memory-book",
            "admin",
            "upload",
            "photo.jpg",
            "--title",
            "Stage",
            "--event",
            "Launch",
            "--line",
            "first",
            "--line",
            "second",
        ]);
        match args.command {
            Some(Command::Admin(AdminCommand::Upload { lines, title, .. })) => {
                assert_eq!(title, "Stage");
                assert_eq!(lines, vec!["first", "second"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
