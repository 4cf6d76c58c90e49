//! The content store holding uploaded pictures
//!
//! `DirectoryStore` keeps every record in `records.json` and every picture
//! under `images/`. The directory is also registered as the `store` asset
//! source, so a record's `image_url` can be handed straight to the asset
//! server.
//!
//! While anyone is subscribed the directory is watched, so writes made by
//! another process (the admin commands) are pushed to the subscribers just
//! like writes made through this store.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use chrono::{TimeZone, Utc};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::content::record::{ContentSnapshot, MetadataPatch, NewImage, RemoteImageRecord};
use crate::core::errors::{anyhow, ensure, BookContext, BookResult};
use crate::core::settings::STORE_ASSET_SOURCE;
use crate::record_not_found;

const RECORDS_FILE: &str = "records.json";
const IMAGES_DIR: &str = "images";

/// Receives the full, ordered snapshot after every change
pub type SnapshotCallback = Box<dyn Fn(ContentSnapshot) + Send + Sync>;

pub trait ContentStore: Send + Sync {
    fn list(&self) -> BookResult<ContentSnapshot>;

    /// Delivers the current snapshot right away and again after every
    /// change, until the returned guard is dropped.
    fn subscribe(&self, callback: SnapshotCallback) -> BookResult<Subscription>;

    /// Stores a new picture and returns its id
    fn create(&self, binary: &[u8], image: NewImage) -> BookResult<String>;

    fn update(&self, id: &str, patch: &MetadataPatch) -> BookResult<()>;

    fn delete(&self, id: &str) -> BookResult<()>;
}

/// Keeps a subscription alive; dropping it unsubscribes
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: BTreeMap<u64, Arc<SnapshotCallback>>,
    /// Watches the store directory while anyone is subscribed
    watcher: Option<RecommendedWatcher>,
    last_delivered: Option<ContentSnapshot>,
}

/// State shared between the store, its subscriptions and the file watcher
struct Notifier {
    root: PathBuf,
    subscribers: Mutex<Subscribers>,
    /// Held while listing and delivering, so deliveries go out in the order
    /// the records file was read
    delivery: Mutex<()>,
}

impl Notifier {
    fn list(&self) -> BookResult<ContentSnapshot> {
        Ok(ContentSnapshot::new(read_records(&self.root)?))
    }

    /// Sends the current snapshot to every subscriber, unless they already
    /// have it
    fn notify(&self) {
        let Ok(_delivery) = self.delivery.lock() else {
            return;
        };
        let snapshot = match self.list() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Could not list content after a change: {e:#}");
                return;
            }
        };
        let callbacks: Vec<Arc<SnapshotCallback>> = {
            let Ok(mut subscribers) = self.subscribers.lock() else {
                return;
            };
            if subscribers.callbacks.is_empty()
                || subscribers.last_delivered.as_ref() == Some(&snapshot)
            {
                return;
            }
            subscribers.last_delivered = Some(snapshot.clone());
            subscribers.callbacks.values().cloned().collect()
        };
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

/// True for events that replace or remove the records file
fn touches_records(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event
        .paths
        .iter()
        .any(|path| path.file_name() == Some(OsStr::new(RECORDS_FILE)))
}

/// Starts watching the store directory so that writes from other processes
/// (the admin commands) reach the subscribers
fn watch_records(notifier: &Arc<Notifier>) -> BookResult<RecommendedWatcher> {
    let weak: Weak<Notifier> = Arc::downgrade(notifier);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if touches_records(&event) => {
            if let Some(notifier) = weak.upgrade() {
                notifier.notify();
            }
        }
        Ok(_) => {}
        Err(e) => log::warn!("Content store watcher error: {e}"),
    })?;
    watcher.watch(&notifier.root, RecursiveMode::NonRecursive)?;
    log::debug!("Watching {} for content changes", notifier.root.display());
    Ok(watcher)
}

fn read_records(root: &Path) -> BookResult<Vec<RemoteImageRecord>> {
    let path = root.join(RECORDS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).with_file_context("read", &path)?;
    let records = serde_json::from_str(&text).with_file_context("parse", &path)?;
    Ok(records)
}

/// File system backed content store
pub struct DirectoryStore {
    root: PathBuf,
    notifier: Arc<Notifier>,
    /// Serializes read-modify-write cycles on the records file
    write_lock: Mutex<()>,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> BookResult<Self> {
        let root = root.into();
        let images = root.join(IMAGES_DIR);
        fs::create_dir_all(&images).with_file_context("create", &images)?;
        Ok(Self {
            notifier: Arc::new(Notifier {
                root: root.clone(),
                subscribers: Mutex::new(Subscribers::default()),
                delivery: Mutex::new(()),
            }),
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    fn read_records(&self) -> BookResult<Vec<RemoteImageRecord>> {
        read_records(&self.root)
    }

    fn write_records(&self, records: &[RemoteImageRecord]) -> BookResult<()> {
        let path = self.records_path();
        let temp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(records)?;
        fs::write(&temp, text).with_file_context("write", &temp)?;
        fs::rename(&temp, &path).with_file_context("replace", &path)?;
        Ok(())
    }

    /// Location on disk of a picture addressed through the store source
    fn image_path(&self, image_url: &str) -> Option<PathBuf> {
        let prefix = format!("{STORE_ASSET_SOURCE}://");
        image_url
            .strip_prefix(&prefix)
            .map(|relative| self.root.join(relative))
    }

    fn notify(&self) {
        self.notifier.notify();
    }
}

impl ContentStore for DirectoryStore {
    fn list(&self) -> BookResult<ContentSnapshot> {
        self.notifier.list()
    }

    fn subscribe(&self, callback: SnapshotCallback) -> BookResult<Subscription> {
        let _delivery = self
            .notifier
            .delivery
            .lock()
            .map_err(|_| anyhow!("Delivery lock poisoned"))?;
        let initial = self.list()?;
        let callback = Arc::new(callback);
        let id = {
            let mut subscribers = self
                .notifier
                .subscribers
                .lock()
                .map_err(|_| anyhow!("Subscriber list lock poisoned"))?;
            if subscribers.watcher.is_none() {
                match watch_records(&self.notifier) {
                    Ok(watcher) => subscribers.watcher = Some(watcher),
                    // The reconciliation poll still picks up outside writes
                    Err(e) => log::warn!("Could not watch {}: {e:#}", self.root.display()),
                }
            }
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.callbacks.insert(id, callback.clone());
            id
        };
        callback(initial);

        let notifier: Weak<Notifier> = Arc::downgrade(&self.notifier);
        Ok(Subscription::new(move || {
            let Some(notifier) = notifier.upgrade() else {
                return;
            };
            // Dropped outside the lock, the watcher thread may be waiting on it
            let watcher = match notifier.subscribers.lock() {
                Ok(mut subscribers) => {
                    subscribers.callbacks.remove(&id);
                    if subscribers.callbacks.is_empty() {
                        subscribers.last_delivered = None;
                        subscribers.watcher.take()
                    } else {
                        None
                    }
                }
                Err(_) => None,
            };
            drop(watcher);
        }))
    }

    fn create(&self, binary: &[u8], image: NewImage) -> BookResult<String> {
        ensure!(!binary.is_empty(), "Picture '{}' is empty", image.name);
        let id = {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| anyhow!("Store lock poisoned"))?;
            let mut records = self.read_records()?;

            let mut millis = Utc::now().timestamp_millis();
            while records.iter().any(|r| r.id == millis.to_string()) {
                millis += 1;
            }
            let id = millis.to_string();
            let uploaded_at = Utc
                .timestamp_millis_opt(millis)
                .single()
                .unwrap_or_else(Utc::now);

            let extension = Path::new(&image.name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "jpg".to_string());
            let relative = format!("{IMAGES_DIR}/{id}.{extension}");
            let target = self.root.join(&relative);
            fs::write(&target, binary).with_file_context("write", &target)?;

            records.push(RemoteImageRecord {
                id: id.clone(),
                name: Some(image.name),
                image_url: Some(format!("{STORE_ASSET_SOURCE}://{relative}")),
                data_url: None,
                title: image.title,
                event_name: image.event_name,
                lines: image.lines,
                uploaded_at,
            });
            self.write_records(&records)?;
            log::info!("Stored picture {} as {}", id, target.display());
            id
        };
        self.notify();
        Ok(id)
    }

    fn update(&self, id: &str, patch: &MetadataPatch) -> BookResult<()> {
        {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| anyhow!("Store lock poisoned"))?;
            let mut records = self.read_records()?;
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| record_not_found!(id))?;
            patch.apply(record);
            self.write_records(&records)?;
        }
        self.notify();
        Ok(())
    }

    fn delete(&self, id: &str) -> BookResult<()> {
        {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| anyhow!("Store lock poisoned"))?;
            let mut records = self.read_records()?;
            let index = records
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| record_not_found!(id))?;
            let record = records.remove(index);
            self.write_records(&records)?;

            if let Some(path) = record.image_url.as_deref().and_then(|u| self.image_path(u)) {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
                }
            }
        }
        self.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn upload(store: &DirectoryStore, name: &str, title: &str) -> String {
        store
            .create(
                b"not really a jpeg",
                NewImage {
                    name: name.into(),
                    title: title.into(),
                    event_name: "Launch".into(),
                    lines: vec!["first".into()],
                },
            )
            .unwrap()
    }

    #[test]
    fn uploads_get_unique_ids_in_upload_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        let a = upload(&store, "a.JPG", "A");
        let b = upload(&store, "b.png", "B");
        assert_ne!(a, b);

        let snapshot = store.list().unwrap();
        assert_eq!(snapshot.ids(), vec![a.clone(), b.clone()]);
        let first = snapshot.get(&a).unwrap();
        assert_eq!(
            first.image_url.as_deref(),
            Some(format!("store://images/{a}.jpg").as_str())
        );
        assert!(dir.path().join(format!("images/{b}.png")).exists());
    }

    #[test]
    fn update_and_delete_change_the_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        let id = upload(&store, "a.jpg", "Old");

        store
            .update(
                &id,
                &MetadataPatch {
                    title: Some("New".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(store.list().unwrap().get(&id).unwrap().title, "New");

        store.delete(&id).unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(!dir.path().join(format!("images/{id}.jpg")).exists());
        assert!(store.delete(&id).is_err());
    }

    #[test]
    fn writes_from_another_process_reach_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let viewer = DirectoryStore::open(dir.path()).unwrap();
        let admin = DirectoryStore::open(dir.path()).unwrap();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let _subscription = viewer
            .subscribe(Box::new(move |snapshot| {
                let _ = sender.send(snapshot);
            }))
            .unwrap();
        assert!(receiver.recv_timeout(Duration::from_secs(1)).unwrap().is_empty());

        let id = upload(&admin, "a.jpg", "A");
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            let snapshot = receiver
                .recv_timeout(wait)
                .expect("the upload was never pushed to the viewer");
            if snapshot.get(&id).is_some() {
                break;
            }
        }
    }

    #[test]
    fn only_records_file_changes_trigger_deliveries() {
        use notify::event::{AccessKind, ModifyKind};
        let event = |kind: EventKind, name: &str| {
            Event::new(kind).add_path(PathBuf::from("/data/store").join(name))
        };
        assert!(touches_records(&event(
            EventKind::Modify(ModifyKind::Any),
            RECORDS_FILE
        )));
        assert!(!touches_records(&event(
            EventKind::Modify(ModifyKind::Any),
            "records.json.tmp"
        )));
        assert!(!touches_records(&event(
            EventKind::Access(AccessKind::Any),
            RECORDS_FILE
        )));
    }

    #[test]
    fn dropping_the_subscription_stops_deliveries() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        let deliveries = Arc::new(AtomicUsize::new(0));

        let counter = deliveries.clone();
        let subscription = store
            .subscribe(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert_eq!(deliveries.load(Ordering::SeqCst), 1);

        upload(&store, "a.jpg", "A");
        assert_eq!(deliveries.load(Ordering::SeqCst), 2);

        drop(subscription);
        upload(&store, "b.jpg", "B");
        assert_eq!(deliveries.load(Ordering::SeqCst), 2);
    }
}
