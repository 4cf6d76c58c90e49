//! Camera and lights for the book scene
//!
//! The camera looks at the book from slightly left and above. Narrow windows
//! push it further back so the open book still fits.

use bevy::picking::Pickable;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::ui::theme::{
    AMBIENT_LIGHT_BRIGHTNESS, DIRECTIONAL_LIGHT_ILLUMINANCE, SHADOW_GROUND_COLOR,
};

const CAMERA_FOV_DEGREES: f32 = 45.0;
const CAMERA_OFFSET: Vec3 = Vec3::new(-0.5, 1.0, 0.0);
const WIDE_CAMERA_DISTANCE: f32 = 4.0;
const NARROW_CAMERA_DISTANCE: f32 = 9.0;
/// Windows at most this wide (logical pixels) use the far camera
const NARROW_WINDOW_WIDTH: f32 = 800.0;

const LIGHT_POSITION: Vec3 = Vec3::new(2.0, 5.0, 2.0);
const GROUND_HEIGHT: f32 = -1.5;
const GROUND_SIZE: f32 = 100.0;

/// Marks the camera that renders the book
#[derive(Component)]
pub struct BookCamera;

/// Marks the plane that catches the book's shadow
#[derive(Component)]
pub struct ShadowGround;

pub fn camera_distance(window_width: f32) -> f32 {
    if window_width > NARROW_WINDOW_WIDTH {
        WIDE_CAMERA_DISTANCE
    } else {
        NARROW_CAMERA_DISTANCE
    }
}

fn camera_transform(window_width: f32) -> Transform {
    let position = CAMERA_OFFSET + Vec3::Z * camera_distance(window_width);
    Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y)
}

/// Spawns the camera and the lights that stay for the whole session
pub fn spawn_scene(mut commands: Commands, windows: Query<&Window, With<PrimaryWindow>>) {
    let width = windows
        .single()
        .map(|window| window.width())
        .unwrap_or(NARROW_WINDOW_WIDTH + 1.0);

    commands.spawn((
        Name::new("Book Camera"),
        BookCamera,
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        camera_transform(width),
    ));

    commands.spawn((
        Name::new("Key Light"),
        DirectionalLight {
            illuminance: DIRECTIONAL_LIGHT_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(LIGHT_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(AmbientLight {
        brightness: AMBIENT_LIGHT_BRIGHTNESS,
        ..default()
    });
}

pub fn spawn_shadow_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Name::new("Shadow Ground"),
        ShadowGround,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: SHADOW_GROUND_COLOR,
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_xyz(0.0, GROUND_HEIGHT, 0.0),
        Pickable::IGNORE,
    ));
}

pub fn despawn_shadow_ground(mut commands: Commands, ground: Query<Entity, With<ShadowGround>>) {
    for entity in &ground {
        commands.entity(entity).despawn();
    }
}

/// Moves the camera back or forth when the window crosses the narrow width
pub fn fit_camera_to_window(
    mut resized: EventReader<WindowResized>,
    mut cameras: Query<&mut Transform, With<BookCamera>>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    let target = camera_transform(event.width);
    for mut transform in &mut cameras {
        if transform.translation != target.translation {
            *transform = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_windows_pull_the_camera_back() {
        assert_eq!(camera_distance(1280.0), 4.0);
        assert_eq!(camera_distance(800.0), 9.0);
        assert_eq!(camera_distance(390.0), 9.0);
    }

    #[test]
    fn camera_sits_left_of_and_above_the_book() {
        let transform = camera_transform(1280.0);
        assert_eq!(transform.translation, Vec3::new(-0.5, 1.0, 4.0));
        let forward = transform.forward();
        assert!(forward.z < 0.0 && forward.y < 0.0);
    }
}
