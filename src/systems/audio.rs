//! Page turn sound

use bevy::prelude::*;

use crate::book::BookNavigation;
use crate::core::settings::PAGE_FLIP_SOUND;

/// Plays the page flip clip whenever a different page is requested.
/// A missing clip only shows up as an asset load warning.
pub fn play_page_flip(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    navigation: Res<BookNavigation>,
    mut last_requested: Local<Option<usize>>,
) {
    let requested = navigation.requested();
    let previous = last_requested.replace(requested);
    if previous.is_none() || previous == Some(requested) {
        return;
    }
    commands.spawn((
        Name::new("Page Flip Sound"),
        AudioPlayer::new(asset_server.load(PAGE_FLIP_SOUND)),
        PlaybackSettings::DESPAWN,
    ));
}
