//! Picks the picture and caption for an image id
//!
//! Resolution order for pictures:
//! 1. no id: placeholder
//! 2. the two covers: `{root}/book-cover.png` and `{root}/book-back.jpg`
//! 3. built-in pictures: `{root}/{id}.jpg`
//! 4. the latest content snapshot: the first loadable url of the record,
//!    hosted url before embedded data
//! 5. the snapshot mirrored in the local cache, same preference
//! 6. placeholder
//!
//! Both functions only read their inputs, so calling them again with the
//! same inputs always gives the same answer.

use std::collections::HashSet;
use std::fmt;

use bevy::prelude::*;

use crate::book::catalog::{BACK_ID, COVER_ID};
use crate::content::builtin::{builtin_content, default_content, PageContent};
use crate::content::cache::{read_snapshot, LocalCache};
use crate::content::record::{ContentSnapshot, RemoteImageRecord};
use crate::core::settings::STORE_ASSET_SOURCE;

/// Where a page face gets its picture from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// Path for the asset server, in the default source or the store source
    Asset(String),
    /// A `data:` url carrying the encoded picture
    Embedded(String),
    /// Untextured page
    Placeholder,
}

impl ImageSource {
    /// Classifies a record url. Only the asset sources the app registers can
    /// be loaded; anything else gives `None`.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("data:") {
            return Some(ImageSource::Embedded(url.to_string()));
        }
        match url.split_once("://") {
            None => Some(ImageSource::Asset(url.to_string())),
            Some((scheme, _)) if scheme == STORE_ASSET_SOURCE => {
                Some(ImageSource::Asset(url.to_string()))
            }
            Some(_) => None,
        }
    }

    /// First url of `record` that can be loaded
    pub fn from_record(record: &RemoteImageRecord) -> Option<Self> {
        record.image_urls().find_map(ImageSource::from_url)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Asset(path) => write!(f, "asset '{path}'"),
            ImageSource::Embedded(data) => {
                let header = data.split(',').next().unwrap_or_default();
                write!(f, "embedded {} ({} bytes)", header, data.len())
            }
            ImageSource::Placeholder => write!(f, "placeholder"),
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct ImageResolver {
    asset_root: String,
    local_ids: HashSet<String>,
}

impl ImageResolver {
    pub fn new(asset_root: impl Into<String>, local_ids: &[String]) -> Self {
        Self {
            asset_root: asset_root.into(),
            local_ids: local_ids.iter().cloned().collect(),
        }
    }

    pub fn is_local(&self, id: &str) -> bool {
        self.local_ids.contains(id)
    }

    pub fn resolve(
        &self,
        id: Option<&str>,
        snapshot: Option<&ContentSnapshot>,
        cache: &dyn LocalCache,
    ) -> ImageSource {
        let Some(id) = id else {
            return ImageSource::Placeholder;
        };
        if id == COVER_ID {
            return ImageSource::Asset(format!("{}/book-cover.png", self.asset_root));
        }
        if id == BACK_ID {
            return ImageSource::Asset(format!("{}/book-back.jpg", self.asset_root));
        }
        if self.is_local(id) {
            return ImageSource::Asset(format!("{}/{}.jpg", self.asset_root, id));
        }

        if let Some(source) = snapshot
            .and_then(|s| s.get(id))
            .and_then(ImageSource::from_record)
        {
            return source;
        }
        read_snapshot(cache)
            .and_then(|cached| cached.get(id).and_then(ImageSource::from_record))
            .unwrap_or(ImageSource::Placeholder)
    }
}

/// Caption for an image id: uploaded record (live, then cached), then the
/// built-in table, then the default caption
pub fn resolve_content(
    id: &str,
    snapshot: Option<&ContentSnapshot>,
    cache: &dyn LocalCache,
) -> PageContent {
    let to_content = |record: &RemoteImageRecord| PageContent {
        title: record.title.clone(),
        event_name: record.event_name.clone(),
        lines: record.lines.clone(),
    };
    if let Some(record) = snapshot.and_then(|s| s.get(id)) {
        return to_content(record);
    }
    if let Some(record) = read_snapshot(cache).and_then(|cached| cached.get(id).map(to_content)) {
        return record;
    }
    builtin_content(id).unwrap_or_else(default_content)
}
