//! Uploaded picture records and the ordered snapshot of them

use std::collections::hash_map::{Entry, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded picture as stored in the content store and the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImageRecord {
    pub id: String,
    /// File name the picture was uploaded with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub lines: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl RemoteImageRecord {
    /// Every url the picture can be fetched from, hosted copy first
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        [self.image_url.as_deref(), self.data_url.as_deref()]
            .into_iter()
            .flatten()
            .filter(|url| !url.is_empty())
    }
}

/// Caption and file details for a new upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewImage {
    pub name: String,
    pub title: String,
    pub event_name: String,
    pub lines: Vec<String>,
}

/// Metadata edit; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub title: Option<String>,
    pub event_name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.event_name.is_none()
            && self.line1.is_none()
            && self.line2.is_none()
    }

    pub fn apply(&self, record: &mut RemoteImageRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(event_name) = &self.event_name {
            record.event_name = event_name.clone();
        }
        for (index, line) in [&self.line1, &self.line2].into_iter().enumerate() {
            let Some(line) = line else {
                continue;
            };
            if record.lines.len() <= index {
                record.lines.resize(index + 1, String::new());
            }
            record.lines[index] = line.clone();
        }
    }
}

/// The uploaded pictures in page order: oldest upload first, ties by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentSnapshot {
    records: Vec<RemoteImageRecord>,
}

impl ContentSnapshot {
    /// Orders the records for paging. An id listed more than once keeps
    /// only its most recent upload.
    pub fn new(records: Vec<RemoteImageRecord>) -> Self {
        let mut newest: HashMap<String, RemoteImageRecord> = HashMap::new();
        for record in records {
            match newest.entry(record.id.clone()) {
                Entry::Occupied(mut kept) => {
                    if record.uploaded_at > kept.get().uploaded_at {
                        kept.insert(record);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
        let mut records: Vec<RemoteImageRecord> = newest.into_values().collect();
        records.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { records }
    }

    pub fn get(&self, id: &str) -> Option<&RemoteImageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|record| record.id.clone()).collect()
    }

    pub fn records(&self) -> &[RemoteImageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RemoteImageRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn record(id: &str, seconds: i64) -> RemoteImageRecord {
        RemoteImageRecord {
            id: id.to_string(),
            name: None,
            image_url: None,
            data_url: None,
            title: format!("Title {id}"),
            event_name: "Event".to_string(),
            lines: vec!["one".to_string(), "two".to_string()],
            uploaded_at: Utc.timestamp_opt(seconds, 0).unwrap(),
        }
    }

    #[test]
    fn snapshot_orders_by_upload_time_then_id() {
        let snapshot =
            ContentSnapshot::new(vec![record("b", 20), record("c", 10), record("a", 20)]);
        assert_eq!(snapshot.ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn repeated_id_keeps_only_its_latest_upload() {
        let mut latest = record("a", 3);
        latest.title = "Retaken".into();
        let snapshot = ContentSnapshot::new(vec![record("a", 1), record("b", 2), latest]);
        assert_eq!(snapshot.ids(), vec!["b", "a"]);
        assert_eq!(snapshot.get("a").map(|r| r.title.as_str()), Some("Retaken"));
    }

    #[test]
    fn record_json_uses_camel_case() {
        let mut rec = record("42", 0);
        rec.data_url = Some("data:image/png;base64,AAAA".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["eventName"], "Event");
        assert_eq!(json["dataUrl"], "data:image/png;base64,AAAA");
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("uploadedAt").is_some());
    }

    #[test]
    fn hosted_url_comes_before_embedded_data() {
        let mut rec = record("1", 0);
        rec.data_url = Some("data:image/png;base64,AAAA".into());
        rec.image_url = Some(String::new());
        let urls: Vec<&str> = rec.image_urls().collect();
        assert_eq!(urls, vec!["data:image/png;base64,AAAA"]);

        rec.image_url = Some("store://images/1.png".into());
        let urls: Vec<&str> = rec.image_urls().collect();
        assert_eq!(urls, vec!["store://images/1.png", "data:image/png;base64,AAAA"]);
    }

    #[test]
    fn patch_edits_only_given_fields() {
        let mut rec = record("1", 0);
        rec.lines.clear();
        MetadataPatch {
            line2: Some("second".into()),
            ..Default::default()
        }
        .apply(&mut rec);
        assert_eq!(rec.title, "Title 1");
        assert_eq!(rec.lines, vec!["", "second"]);
    }
}
