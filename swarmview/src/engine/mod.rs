mod rendering;

pub use rendering::{cell_to_screen, direction_endpoint, tile_color, AgentPalette, Renderer};

use macroquad::prelude::Color;
use shared::{GRID_HEIGHT, GRID_WIDTH};

use crate::config::{WINDOW_HEIGHT, WINDOW_WIDTH};

// Cell geometry on screen; the grid is centered in the window.
pub const BLOCK_SIZE: i32 = 20;
pub const HORIZONTAL_BORDER: i32 = (WINDOW_WIDTH - BLOCK_SIZE * GRID_WIDTH as i32) / 2;
pub const VERTICAL_BORDER: i32 = (WINDOW_HEIGHT - BLOCK_SIZE * GRID_HEIGHT as i32) / 2;

pub const FONT_SIZE: f32 = 20.0;

// Tile fill colors
pub const COLOR_SAFE: Color = Color::new(0.0, 0.784, 0.0, 1.0); // green
pub const COLOR_EMPTY: Color = Color::new(0.941, 0.941, 0.941, 1.0); // near-white
pub const COLOR_DANGER: Color = Color::new(0.784, 0.0, 0.0, 1.0); // red
pub const COLOR_UNKNOWN: Color = Color::new(0.196, 0.196, 0.196, 1.0); // dark gray
pub const COLOR_WALL: Color = Color::new(0.0, 0.0, 0.0, 1.0); // black
pub const COLOR_GOLD: Color = Color::new(1.0, 1.0, 0.196, 1.0); // yellow
pub const COLOR_POWERUP: Color = Color::new(0.392, 0.392, 1.0, 1.0); // blue
pub const COLOR_MIDPOINT: Color = Color::new(1.0, 0.392, 0.0, 1.0); // orange

pub const COLOR_TEXT: Color = Color::new(0.0, 0.0, 0.0, 1.0);
