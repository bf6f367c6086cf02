use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use macroquad::prelude::*;

use crate::config::ViewerConfig;
use crate::engine::Renderer;
use crate::snapshot::Snapshot;
use crate::state::WorldState;

/// The spectator application: a fixed-cadence poll/render loop over the
/// shared world state.
pub struct ViewerApp {
    config: ViewerConfig,
    state: Arc<WorldState>,
    shutdown: Arc<AtomicBool>,
    renderer: Renderer,
    snapshot: Snapshot,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig, state: Arc<WorldState>, shutdown: Arc<AtomicBool>) -> Self {
        let snapshot = state.snapshot(config.deterministic_order);
        Self {
            config,
            state,
            shutdown,
            renderer: Renderer::new(),
            snapshot,
        }
    }

    /// Runs until the host window asks to close. Every tick polls the
    /// dirty flag and rebuilds the snapshot only when something changed;
    /// the window is double-buffered, so the previous snapshot is
    /// repainted on quiet ticks.
    pub async fn run(&mut self) {
        prevent_quit();
        let tick = Duration::from_millis(self.config.tick_ms);
        info!("render loop started, {}ms tick", self.config.tick_ms);

        loop {
            let frame_start = Instant::now();

            if is_quit_requested() || is_key_pressed(KeyCode::Escape) {
                break;
            }

            if self.state.poll_dirty() {
                self.snapshot = self.state.snapshot(self.config.deterministic_order);
            }
            self.renderer.render(&self.snapshot);

            // Cap the cadence; vsync alone can tick far faster than the
            // report stream warrants.
            if let Some(remaining) = tick.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
            next_frame().await;
        }

        self.shutdown.store(true, Ordering::SeqCst);
        info!("render loop closed");
    }
}
