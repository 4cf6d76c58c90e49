//! Page face textures
//!
//! Each face resolves its image id to a source, then either waits on the
//! asset server or decodes an embedded data url on the compute pool. The
//! face keeps whatever it showed before until the new picture is ready, and
//! a failure only ever turns that one face into the placeholder.

use base64::Engine;
use bevy::asset::{LoadState, RenderAssetUsages};
use bevy::image::{CompressedImageFormats, ImageSampler, ImageType};
use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};

use crate::book::PageFace;
use crate::content::{ContentServices, ImageResolver, ImageSource, RemoteContent};
use crate::core::errors::{anyhow, ensure, BookResult};
use crate::ui::theme::PAGE_PLACEHOLDER_COLOR;

/// What a page face is currently showing or waiting for
#[derive(Component)]
pub struct FaceTexture {
    source: ImageSource,
    state: TextureState,
}

impl FaceTexture {
    pub fn is_pending(&self) -> bool {
        matches!(
            self.state,
            TextureState::Loading(_) | TextureState::Decoding(_)
        )
    }
}

enum TextureState {
    Loading(Handle<Image>),
    Decoding(Task<BookResult<Image>>),
    Shown,
    Failed,
}

/// Splits a `data:` url into its mime type and decoded bytes
pub fn parse_data_url(url: &str) -> BookResult<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("Not a data url"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("Data url has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("Only base64 data urls are supported, got '{header}'"))?;
    ensure!(
        mime.starts_with("image/"),
        "Data url does not hold an image: '{mime}'"
    );
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    Ok((mime.to_string(), bytes))
}

pub fn decode_data_url(url: &str) -> BookResult<Image> {
    let (mime, bytes) = parse_data_url(url)?;
    let image = Image::from_buffer(
        &bytes,
        ImageType::MimeType(&mime),
        CompressedImageFormats::NONE,
        true,
        ImageSampler::Default,
        RenderAssetUsages::default(),
    )?;
    Ok(image)
}

fn show(
    materials: &mut Assets<StandardMaterial>,
    material: &Handle<StandardMaterial>,
    texture: Option<Handle<Image>>,
) {
    let Some(material) = materials.get_mut(material) else {
        return;
    };
    material.base_color = if texture.is_some() {
        Color::WHITE
    } else {
        PAGE_PLACEHOLDER_COLOR
    };
    material.base_color_texture = texture;
}

/// Picks a source for new faces, for faces whose image id changed and for
/// every face after a content snapshot arrives
pub fn resolve_face_textures(
    mut commands: Commands,
    resolver: Res<ImageResolver>,
    services: Res<ContentServices>,
    remote: Res<RemoteContent>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    faces: Query<(Entity, Ref<PageFace>, Option<&FaceTexture>)>,
) {
    let snapshot_changed = remote.is_changed();
    for (entity, face, texture) in &faces {
        if texture.is_some() && !face.is_changed() && !snapshot_changed {
            continue;
        }
        let source = resolver.resolve(
            Some(&face.image_id),
            remote.snapshot(),
            services.cache.as_ref(),
        );
        if texture.is_some_and(|t| t.source == source) {
            continue;
        }
        debug!("Face of '{}' uses {}", face.image_id, source);

        let state = match &source {
            ImageSource::Asset(path) => TextureState::Loading(asset_server.load(path.clone())),
            ImageSource::Embedded(url) => {
                let url = url.clone();
                TextureState::Decoding(
                    AsyncComputeTaskPool::get().spawn(async move { decode_data_url(&url) }),
                )
            }
            ImageSource::Placeholder => {
                show(&mut materials, &face.material, None);
                TextureState::Shown
            }
        };
        commands.entity(entity).insert(FaceTexture { source, state });
    }
}

/// Swaps finished textures into the face materials
pub fn poll_face_textures(
    asset_server: Res<AssetServer>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut faces: Query<(&PageFace, &mut FaceTexture)>,
) {
    for (face, mut texture) in &mut faces {
        if !texture.is_pending() {
            continue;
        }
        let texture = &mut *texture;
        let outcome: Option<BookResult<Handle<Image>>> = match &mut texture.state {
            TextureState::Loading(handle) => match asset_server.get_load_state(handle.id()) {
                Some(LoadState::Loaded) => Some(Ok(handle.clone())),
                Some(LoadState::Failed(e)) => Some(Err(anyhow!("{e}"))),
                _ => None,
            },
            TextureState::Decoding(task) => {
                block_on(future::poll_once(task)).map(|decoded| decoded.map(|i| images.add(i)))
            }
            TextureState::Shown | TextureState::Failed => None,
        };

        match outcome {
            Some(Ok(handle)) => {
                show(&mut materials, &face.material, Some(handle));
                texture.state = TextureState::Shown;
            }
            Some(Err(e)) => {
                warn!(
                    "Showing a blank page for '{}', {} failed: {e:#}",
                    face.image_id, texture.source
                );
                show(&mut materials, &face.material, None);
                texture.state = TextureState::Failed;
            }
            None => {}
        }
    }
}
