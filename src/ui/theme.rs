use bevy::prelude::Color;

// Window Configuration
pub const WINDOW_TITLE: &str = "Memory Book";
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 800.0;

pub const BACKGROUND_COLOR: Color = Color::srgb(0.055, 0.055, 0.07);

// Scene
pub const PAGE_EDGE_COLOR: Color = Color::WHITE;
/// Face color while no picture is shown
pub const PAGE_PLACEHOLDER_COLOR: Color = Color::srgb(0.92, 0.9, 0.86);
/// Emissive tint of a hovered page
pub const HIGHLIGHT_EMISSIVE_COLOR: Color = Color::srgb(1.0, 0.647, 0.0);
pub const SHADOW_GROUND_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.2);
pub const AMBIENT_LIGHT_BRIGHTNESS: f32 = 500.0;
pub const DIRECTIONAL_LIGHT_ILLUMINANCE: f32 = 4_000.0;

// Font Sizes
pub const TITLE_FONT_SIZE: f32 = 32.0;
pub const HEADING_FONT_SIZE: f32 = 24.0;
pub const BODY_FONT_SIZE: f32 = 16.0;
pub const BUTTON_FONT_SIZE: f32 = 14.0;

// Text Colors
pub const TEXT_COLOR: Color = Color::srgb(0.92, 0.92, 0.92);
pub const MUTED_TEXT_COLOR: Color = Color::srgb(0.6, 0.6, 0.6);
pub const ACCENT_TEXT_COLOR: Color = Color::srgb(1.0, 0.75, 0.3);

// Panel Visual Style
pub const PANEL_BACKGROUND_COLOR: Color = Color::srgba(0.1, 0.1, 0.1, 0.9);
pub const PANEL_BORDER_COLOR: Color = Color::srgba(0.5, 0.5, 0.5, 1.0);
pub const PANEL_BORDER_WIDTH: f32 = 2.0;
pub const PANEL_PADDING: f32 = 24.0;
pub const PANEL_ROW_GAP: f32 = 12.0;

// HUD Layout
pub const HUD_MARGIN: f32 = 16.0;
pub const HUD_ITEM_SPACING: f32 = 8.0;
pub const BUTTON_PADDING_X: f32 = 16.0;
pub const BUTTON_PADDING_Y: f32 = 8.0;
pub const BUTTON_BORDER_WIDTH: f32 = 2.0;
/// Largest width of the detail view picture, in logical pixels
pub const DETAIL_IMAGE_MAX_WIDTH: f32 = 480.0;

// Button Colors
pub const NORMAL_BUTTON: Color = Color::srgb(0.1, 0.1, 0.1);
pub const HOVERED_BUTTON: Color = Color::srgb(0.25, 0.25, 0.25);
pub const PRESSED_BUTTON: Color = Color::srgb(1.0, 0.4, 0.0);

// Button Outline Colors
pub const NORMAL_BUTTON_OUTLINE_COLOR: Color = Color::srgb(0.5, 0.5, 0.5);
pub const HOVERED_BUTTON_OUTLINE_COLOR: Color = Color::srgb(0.75, 0.75, 0.75);
pub const PRESSED_BUTTON_OUTLINE_COLOR: Color = Color::srgb(1.0, 0.8, 0.3);
pub const PRESSED_BUTTON_TEXT_COLOR: Color = Color::srgb(1.0, 0.9, 0.8);
