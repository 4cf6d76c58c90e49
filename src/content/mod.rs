//! Pictures and captions
//!
//! - Uploaded picture records and the content store that holds them
//! - The local cache mirroring the last known snapshot
//! - Resolution of an image id to a picture source and a caption
//! - Syncing store changes into the book

pub mod admin;
pub mod builtin;
pub mod cache;
pub mod record;
pub mod resolve;
pub mod store;
pub mod sync;

pub use builtin::PageContent;
pub use cache::{FileCache, LocalCache, MemoryCache};
pub use record::{ContentSnapshot, RemoteImageRecord};
pub use resolve::{resolve_content, ImageResolver, ImageSource};
pub use store::{ContentStore, DirectoryStore, Subscription};
pub use sync::{ContentFeed, ContentServices, LocalPictures, RemoteContent};

use bevy::prelude::*;

use crate::book::{BookSet, PageCatalog};
use crate::core::state::AppView;

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RemoteContent>()
            .init_resource::<PageCatalog>()
            .init_resource::<ContentFeed>()
            .add_systems(Startup, sync::seed_from_cache)
            .add_systems(OnEnter(AppView::Home), sync::subscribe_to_store)
            .add_systems(OnExit(AppView::Home), sync::unsubscribe_from_store)
            .add_systems(
                Update,
                (sync::poll_store, sync::apply_snapshots)
                    .chain()
                    .in_set(BookSet::Content)
                    .run_if(in_state(AppView::Home)),
            );
    }
}
