use std::collections::HashMap;

use macroquad::prelude::*;
use macroquad::rand::gen_range;

use shared::{CellId, Direction, TerrainCell};

use super::{
    BLOCK_SIZE, COLOR_DANGER, COLOR_EMPTY, COLOR_GOLD, COLOR_MIDPOINT, COLOR_POWERUP, COLOR_SAFE,
    COLOR_TEXT, COLOR_UNKNOWN, COLOR_WALL, FONT_SIZE, HORIZONTAL_BORDER, VERTICAL_BORDER,
};
use crate::snapshot::{AgentMarker, Snapshot, Tile};

/// Stable per-agent colors: the first sighting of an identifier rolls a
/// random color, which is then memoized for the rest of the run. Owned by
/// the render context alone, so no locking.
pub struct AgentPalette {
    colors: HashMap<String, Color>,
}

impl AgentPalette {
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: &str) -> Color {
        if let Some(color) = self.colors.get(id) {
            return *color;
        }
        let color = Color::new(
            gen_range(0.0, 1.0),
            gen_range(0.0, 1.0),
            gen_range(0.0, 1.0),
            1.0,
        );
        self.colors.insert(id.to_string(), color);
        color
    }
}

impl Default for AgentPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen position of a cell's top-left corner.
#[inline(always)]
pub fn cell_to_screen(x: i16, y: i16) -> (f32, f32) {
    (
        (HORIZONTAL_BORDER + BLOCK_SIZE * x as i32) as f32,
        (VERTICAL_BORDER + BLOCK_SIZE * y as i32) as f32,
    )
}

/// Fill color for one terrain tile.
pub fn tile_color(tile: Tile) -> Color {
    match tile {
        Tile::Midpoint => COLOR_MIDPOINT,
        Tile::Terrain(TerrainCell::Safe) => COLOR_SAFE,
        Tile::Terrain(TerrainCell::Empty) => COLOR_EMPTY,
        Tile::Terrain(TerrainCell::Danger) => COLOR_DANGER,
        Tile::Terrain(TerrainCell::Unknown) => COLOR_UNKNOWN,
        Tile::Terrain(TerrainCell::Wall) => COLOR_WALL,
        Tile::Terrain(TerrainCell::Gold) => COLOR_GOLD,
        Tile::Terrain(TerrainCell::Powerup) => COLOR_POWERUP,
    }
}

/// Endpoint of the heading line drawn from an agent's cell center toward
/// the neighbouring cell it is facing.
pub fn direction_endpoint(center: (f32, f32), dir: Direction) -> (f32, f32) {
    let block = BLOCK_SIZE as f32;
    match dir {
        Direction::North => (center.0, center.1 - block),
        Direction::South => (center.0, center.1 + block),
        Direction::East => (center.0 + block, center.1),
        Direction::West => (center.0 - block, center.1),
    }
}

/// Paints snapshots onto the window. The palette memo is the only state
/// carried across frames.
pub struct Renderer {
    palette: AgentPalette,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            palette: AgentPalette::new(),
        }
    }

    /// Draws one snapshot in fixed layer order, terrain first and agents
    /// last, so markers and labels stay visible above the grid.
    pub fn render(&mut self, snapshot: &Snapshot) {
        clear_background(BLACK);
        self.draw_terrain(&snapshot.terrain);
        self.draw_labels(&snapshot.labels);
        self.draw_paths(&snapshot.paths);
        self.draw_agents(&snapshot.agents);
    }

    fn draw_terrain(&self, terrain: &HashMap<CellId, Tile>) {
        let block = BLOCK_SIZE as f32;
        for (&coords, &tile) in terrain {
            let (x, y) = coords.decode();
            let (sx, sy) = cell_to_screen(x, y);
            draw_rectangle(sx, sy, block, block, tile_color(tile));
        }
    }

    fn draw_labels(&self, labels: &HashMap<CellId, String>) {
        let block = BLOCK_SIZE as f32;
        for (&coords, text) in labels {
            let (x, y) = coords.decode();
            let (sx, sy) = cell_to_screen(x, y);
            let dims = measure_text(text, None, FONT_SIZE as u16, 1.0);
            draw_text(
                text,
                sx - (dims.width - block) / 2.0,
                sy + FONT_SIZE * 0.75,
                FONT_SIZE,
                COLOR_TEXT,
            );
        }
    }

    fn draw_paths(&mut self, paths: &HashMap<String, Vec<(i16, i16)>>) {
        let half = BLOCK_SIZE as f32 / 2.0;
        let radius = BLOCK_SIZE as f32 / 3.0;
        for (id, path) in paths {
            if path.len() < 2 {
                continue;
            }
            let color = self.palette.get(id);
            // The first entry is the origin; it gets no dot.
            for &(x, y) in &path[1..] {
                let (sx, sy) = cell_to_screen(x, y);
                draw_circle(sx + half, sy + half, radius, color);
            }
        }
    }

    fn draw_agents(&mut self, agents: &HashMap<CellId, AgentMarker>) {
        let block = BLOCK_SIZE as f32;
        for (&coords, marker) in agents {
            let (x, y) = coords.decode();
            let (sx, sy) = cell_to_screen(x, y);
            let color = self.palette.get(&marker.id);

            draw_rectangle(sx + 1.0, sy + 1.0, block - 1.0, block - 1.0, color);

            let center = (sx + block / 2.0, sy + block / 2.0);
            let tip = direction_endpoint(center, marker.dir);
            draw_line(center.0, center.1, tip.0, tip.1, 4.0, COLOR_TEXT);

            let dims = measure_text(&marker.id, None, FONT_SIZE as u16, 1.0);
            draw_text(
                &marker.id,
                sx - dims.width,
                sy + FONT_SIZE * 0.75,
                FONT_SIZE,
                COLOR_TEXT,
            );

            let energy = format!("e: {}", marker.energy);
            let dims = measure_text(&energy, None, FONT_SIZE as u16, 1.0);
            draw_text(
                &energy,
                sx - (dims.width - block) / 2.0,
                sy - block + FONT_SIZE * 0.75,
                FONT_SIZE,
                COLOR_POWERUP,
            );

            let score = format!("s: {}", marker.score);
            let dims = measure_text(&score, None, FONT_SIZE as u16, 1.0);
            draw_text(
                &score,
                sx - (dims.width - block) / 2.0,
                sy + block + FONT_SIZE * 0.75,
                FONT_SIZE,
                COLOR_MIDPOINT,
            );

            draw_text(
                &marker.state,
                sx + block,
                sy + FONT_SIZE * 0.75,
                FONT_SIZE,
                COLOR_DANGER,
            );
        }
    }
}
