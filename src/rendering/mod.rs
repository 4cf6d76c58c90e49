//! Rendering
//!
//! - Camera, lights and the shadow ground of the book scene
//! - Page face textures

pub mod cameras;
pub mod textures;

use bevy::prelude::*;

use crate::book::BookSet;
use crate::core::state::AppView;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, cameras::spawn_scene)
            .add_systems(OnEnter(AppView::Home), cameras::spawn_shadow_ground)
            .add_systems(OnExit(AppView::Home), cameras::despawn_shadow_ground)
            .add_systems(Update, cameras::fit_camera_to_window)
            .add_systems(
                Update,
                (textures::resolve_face_textures, textures::poll_face_textures)
                    .chain()
                    .after(BookSet::Pages)
                    .run_if(in_state(AppView::Home)),
            );
    }
}
