//! Keeps the book in step with the content store
//!
//! Snapshots reach the ECS over a channel, pushed by the store subscription
//! and pulled by a slower reconciliation poll. A push is numbered when it is
//! sent, after the store has read the records; a poll takes its number
//! before it reads. Only the newest delivery is ever applied, so a poll that
//! was already under way cannot undo a fresher push.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use crossbeam_channel::{Receiver, Sender};

use crate::book::catalog::PageCatalog;
use crate::content::cache::{read_snapshot, write_snapshot, LocalCache};
use crate::content::record::ContentSnapshot;
use crate::content::store::{ContentStore, Subscription};

/// Shared handles to the content store and the local cache
#[derive(Resource, Clone)]
pub struct ContentServices {
    pub store: Arc<dyn ContentStore>,
    pub cache: Arc<dyn LocalCache>,
}

/// Ids of the pictures that ship with the book, in page order
#[derive(Resource, Debug, Clone, Default)]
pub struct LocalPictures(pub Vec<String>);

/// The content snapshot currently shown by the book
#[derive(Resource, Debug, Clone, Default)]
pub struct RemoteContent {
    snapshot: Option<ContentSnapshot>,
}

impl RemoteContent {
    pub fn snapshot(&self) -> Option<&ContentSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn ids(&self) -> Vec<String> {
        self.snapshot.as_ref().map(|s| s.ids()).unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Delivery {
    pub sequence: u64,
    pub snapshot: ContentSnapshot,
}

#[derive(Resource)]
pub struct ContentFeed {
    sender: Sender<Delivery>,
    receiver: Receiver<Delivery>,
    sequence: Arc<AtomicU64>,
    last_applied: Option<u64>,
    subscription: Option<Subscription>,
    poll: Timer,
}

impl ContentFeed {
    pub fn new(poll_interval: Duration) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            sequence: Arc::new(AtomicU64::new(0)),
            last_applied: None,
            subscription: None,
            poll: Timer::new(poll_interval, TimerMode::Repeating),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Sending half that numbers each snapshot as it is sent
    fn deliverer(&self) -> impl Fn(ContentSnapshot) + Send + Sync + 'static {
        let sender = self.sender.clone();
        let sequence = self.sequence.clone();
        move |snapshot| {
            let delivery = Delivery {
                sequence: sequence.fetch_add(1, Ordering::SeqCst),
                snapshot,
            };
            // The receiver only goes away with the app
            let _ = sender.send(delivery);
        }
    }

    /// Newest delivery that is newer than the last applied one
    fn take_latest(&mut self) -> Option<ContentSnapshot> {
        let latest = self.receiver.try_iter().max_by_key(|d| d.sequence)?;
        if self.last_applied.is_some_and(|applied| latest.sequence <= applied) {
            return None;
        }
        self.last_applied = Some(latest.sequence);
        Some(latest.snapshot)
    }
}

impl Default for ContentFeed {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

/// Paints uploaded pages from the cache before the store answers
pub fn seed_from_cache(
    services: Res<ContentServices>,
    local: Res<LocalPictures>,
    mut remote: ResMut<RemoteContent>,
    mut catalog: ResMut<PageCatalog>,
) {
    remote.snapshot = read_snapshot(services.cache.as_ref());
    let ids = remote.ids();
    *catalog = PageCatalog::new(&local.0, &ids);
    info!(
        "Book starts with {} leaves ({} cached uploads)",
        catalog.len(),
        ids.len()
    );
}

pub fn subscribe_to_store(services: Res<ContentServices>, mut feed: ResMut<ContentFeed>) {
    let deliver = feed.deliverer();
    match services.store.subscribe(Box::new(deliver)) {
        Ok(subscription) => {
            feed.subscription = Some(subscription);
            debug!("Subscribed to the content store");
        }
        Err(e) => warn!("Could not subscribe to the content store: {e:#}"),
    }
    feed.poll.reset();
}

pub fn unsubscribe_from_store(mut feed: ResMut<ContentFeed>) {
    if feed.subscription.take().is_some() {
        debug!("Unsubscribed from the content store");
    }
}

/// Lists the store in the background every poll interval
pub fn poll_store(time: Res<Time>, services: Res<ContentServices>, mut feed: ResMut<ContentFeed>) {
    if !feed.poll.tick(time.delta()).just_finished() {
        return;
    }
    let store = services.store.clone();
    let sender = feed.sender.clone();
    let sequence = feed.sequence.clone();
    IoTaskPool::get()
        .spawn(async move {
            let number = sequence.fetch_add(1, Ordering::SeqCst);
            match store.list() {
                Ok(snapshot) => {
                    let _ = sender.send(Delivery {
                        sequence: number,
                        snapshot,
                    });
                }
                Err(e) => warn!("Content poll failed: {e:#}"),
            }
        })
        .detach();
}

/// Applies the newest delivered snapshot, mirrors it to the cache and
/// regenerates the catalog when the uploaded ids changed
pub fn apply_snapshots(
    services: Res<ContentServices>,
    local: Res<LocalPictures>,
    mut feed: ResMut<ContentFeed>,
    mut remote: ResMut<RemoteContent>,
    mut catalog: ResMut<PageCatalog>,
) {
    let Some(snapshot) = feed.take_latest() else {
        return;
    };
    if remote.snapshot.as_ref() == Some(&snapshot) {
        return;
    }
    if let Err(e) = write_snapshot(services.cache.as_ref(), &snapshot) {
        warn!("Could not mirror content into the local cache: {e:#}");
    }

    let ids = snapshot.ids();
    remote.snapshot = Some(snapshot);
    if catalog.bypass_change_detection().remote_ids() != ids.as_slice()
        && catalog.refresh(&local.0, &ids)
    {
        info!("Book now has {} leaves", catalog.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::cache::MemoryCache;
    use crate::content::record::tests::record;
    use crate::content::store::DirectoryStore;
    use crate::core::state::AppView;

    fn app_with(store: Arc<dyn ContentStore>, cache: Arc<dyn LocalCache>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, bevy::state::app::StatesPlugin))
            .init_state::<AppView>()
            .insert_resource(ContentServices { store, cache })
            .insert_resource(LocalPictures(vec!["1".into(), "2".into()]))
            .init_resource::<RemoteContent>()
            .init_resource::<PageCatalog>()
            .init_resource::<ContentFeed>()
            .add_systems(Startup, seed_from_cache)
            .add_systems(OnEnter(AppView::Home), subscribe_to_store)
            .add_systems(OnExit(AppView::Home), unsubscribe_from_store)
            .add_systems(Update, apply_snapshots);
        app
    }

    #[test]
    fn newest_delivery_wins_and_stale_ones_are_dropped() {
        let mut feed = ContentFeed::default();
        let old = ContentSnapshot::new(vec![record("a", 1)]);
        let new = ContentSnapshot::new(vec![record("a", 1), record("b", 2)]);
        let sender = feed.sender.clone();
        sender
            .send(Delivery {
                sequence: 4,
                snapshot: new.clone(),
            })
            .unwrap();
        sender
            .send(Delivery {
                sequence: 3,
                snapshot: old.clone(),
            })
            .unwrap();
        assert_eq!(feed.take_latest(), Some(new));

        sender
            .send(Delivery {
                sequence: 2,
                snapshot: old,
            })
            .unwrap();
        assert_eq!(feed.take_latest(), None);
    }

    #[test]
    fn cached_snapshot_seeds_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MemoryCache::default());
        write_snapshot(cache.as_ref(), &ContentSnapshot::new(vec![record("9", 1)])).unwrap();
        let store = Arc::new(DirectoryStore::open(dir.path()).unwrap());

        let mut app = app_with(store, cache);
        app.world_mut().run_schedule(Startup);

        let catalog = app.world().resource::<PageCatalog>();
        // cover, [1, 2], [9, back], back
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.remote_ids(), ["9".to_string()]);
    }

    #[test]
    fn uploads_reach_the_catalog_and_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MemoryCache::default());
        let store = Arc::new(DirectoryStore::open(dir.path()).unwrap());
        let mut app = app_with(store.clone(), cache.clone());
        app.update();
        assert!(app.world().resource::<ContentFeed>().is_subscribed());

        let id = store
            .create(
                b"jpeg bytes",
                crate::content::record::NewImage {
                    name: "stage.jpg".into(),
                    title: "Stage".into(),
                    event_name: "Launch".into(),
                    lines: vec![],
                },
            )
            .unwrap();
        app.update();

        assert_eq!(app.world().resource::<RemoteContent>().ids(), vec![id.clone()]);
        assert_eq!(app.world().resource::<PageCatalog>().remote_ids(), [id.clone()]);
        let cached = read_snapshot(cache.as_ref()).unwrap();
        assert!(cached.get(&id).is_some());
    }

    #[test]
    fn leaving_home_drops_the_subscription() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DirectoryStore::open(dir.path()).unwrap());
        let mut app = app_with(store, Arc::new(MemoryCache::default()));
        app.update();
        assert!(app.world().resource::<ContentFeed>().is_subscribed());

        app.world_mut()
            .resource_mut::<NextState<AppView>>()
            .set(AppView::Ticket);
        app.update();
        assert!(!app.world().resource::<ContentFeed>().is_subscribed());
    }
}
