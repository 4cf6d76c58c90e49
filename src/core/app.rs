//! Application initialization and configuration

use std::sync::Arc;
use std::time::Duration;

use bevy::asset::io::AssetSourceBuilder;
use bevy::asset::AssetApp;
use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::prelude::*;
use bevy::winit::WinitSettings;

use crate::content::{
    ContentFeed, ContentServices, DirectoryStore, FileCache, ImageResolver, LocalPictures,
};
use crate::core::cli::CliArgs;
use crate::core::errors::{BookContext, BookResult};
use crate::core::settings::STORE_ASSET_SOURCE;
use crate::core::state::{AppView, SelectedPage};
use crate::systems::{configure_default_plugins, MemoryBookSystems};
use crate::ui::theme::BACKGROUND_COLOR;

/// Creates a fully configured Bevy GUI application ready to run
pub fn create_app(cli_args: CliArgs) -> BookResult<App> {
    cli_args.validate()?;

    let store = DirectoryStore::open(cli_args.store_dir())?;
    let cache = FileCache::open(cli_args.cache_path());

    let mut app = App::new();
    register_store_source(&mut app, &store)?;
    app.add_plugins((configure_default_plugins(), MeshPickingPlugin));
    configure_app_settings(&mut app, cli_args, store, cache);
    app.add_plugins(MemoryBookSystems);
    Ok(app)
}

/// Serves uploaded pictures to the asset server as `store://images/...`.
/// Has to happen before the asset plugin is added.
fn register_store_source(app: &mut App, store: &DirectoryStore) -> BookResult<()> {
    let root = store
        .root()
        .canonicalize()
        .with_file_context("resolve", store.root())?;
    let root = root.to_string_lossy().into_owned();
    info!("Serving uploaded pictures from {}", root);
    app.register_asset_source(
        STORE_ASSET_SOURCE,
        AssetSourceBuilder::platform_default(&root, None),
    );
    Ok(())
}

/// Sets up application resources and configuration
fn configure_app_settings(
    app: &mut App,
    cli_args: CliArgs,
    store: DirectoryStore,
    cache: FileCache,
) {
    let local_ids = cli_args.local_ids();
    let resolver = ImageResolver::new(cli_args.asset_root.clone(), &local_ids);
    let services = ContentServices {
        store: Arc::new(store),
        cache: Arc::new(cache),
    };

    app.init_state::<AppView>()
        .init_resource::<SelectedPage>()
        .insert_resource(ClearColor(BACKGROUND_COLOR))
        // The book animates every frame, so the app never waits for input
        .insert_resource(WinitSettings::game())
        .insert_resource(resolver)
        .insert_resource(services)
        .insert_resource(LocalPictures(local_ids))
        .insert_resource(ContentFeed::new(Duration::from_secs(cli_args.poll_secs)))
        .insert_resource(cli_args);
}
