// Settings ///////////////////////////////////////////////////////////////////
// This module contains all the compile-time settings for the book.

use std::time::Duration;

// Page Geometry //////////////////////////////////////////////////////////////

/// Width of one leaf, spine to free edge (world units)
pub const PAGE_WIDTH: f32 = 1.28;
/// Height of one leaf (world units)
pub const PAGE_HEIGHT: f32 = 1.71;
/// Thickness of one leaf, also the z spacing between stacked leaves
pub const PAGE_DEPTH: f32 = 0.003;
/// Number of bendable columns along the width of a leaf
pub const PAGE_SEGMENTS: usize = 30;
/// Rows along the height of a leaf (the page never bends vertically)
pub const PAGE_HEIGHT_SEGMENTS: usize = 2;

// Turn Animation /////////////////////////////////////////////////////////////

/// Length of the easing pulse that follows an open/close toggle
pub const TURN_DURATION: Duration = Duration::from_millis(400);
/// Smooth time of the main turn axis (seconds)
pub const TURN_SMOOTH_TIME: f32 = 0.5;
/// Smooth time of the fold axis (seconds)
pub const FOLD_SMOOTH_TIME: f32 = 0.3;

pub const INSIDE_CURVE_STRENGTH: f32 = 0.18;
pub const OUTSIDE_CURVE_STRENGTH: f32 = 0.05;
pub const TURNING_CURVE_STRENGTH: f32 = 0.09;

/// Joints below this index bend with the inside curve, the rest with the outside one
pub const INSIDE_CURVE_JOINTS: usize = 8;
/// Only joints past this index buckle along the fold axis
pub const FOLD_START_JOINT: usize = 8;
/// Maximum buckle angle in degrees
pub const FOLD_ANGLE_DEGREES: f32 = 2.0;
/// Extra rotation per stacked leaf while the book is open, in degrees
pub const STACK_FAN_DEGREES: f32 = 0.8;

// Highlight //////////////////////////////////////////////////////////////////

/// Emissive intensity of a hovered page
pub const HIGHLIGHT_INTENSITY: f32 = 0.22;
/// Fraction of the remaining distance covered per frame at 60 Hz
pub const HIGHLIGHT_LERP_PER_FRAME: f32 = 0.1;

// Page Navigation ////////////////////////////////////////////////////////////

/// Delay between steps of the rendered page while close to the target
pub const PAGE_STEP_SLOW: Duration = Duration::from_millis(150);
/// Delay between steps of the rendered page during a large jump
pub const PAGE_STEP_FAST: Duration = Duration::from_millis(50);
/// Gaps larger than this use the fast step
pub const FAST_STEP_GAP: usize = 2;

/// Window in which a second click turns into a double click
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(250);

// Content ////////////////////////////////////////////////////////////////////

/// Cache key under which the remote snapshot is mirrored
pub const UPLOADED_IMAGES_KEY: &str = "admin_uploaded_images";
/// Name of the Bevy asset source that serves the content store directory
pub const STORE_ASSET_SOURCE: &str = "store";

pub const PAGE_FLIP_SOUND: &str = "audios/page-flip-01a.mp3";
