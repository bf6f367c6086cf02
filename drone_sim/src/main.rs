use std::collections::HashMap;
use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use shared::{
    AgentReport, Direction, DroneReport, FieldReport, TerrainCell, GRID_HEIGHT, GRID_WIDTH,
};

/// How many trailing cells of a drone's route go into each report.
const PATH_TAIL: usize = 15;

/// Publishes scripted exploration reports to a running SwarmView, so the
/// viewer can be exercised without a live match.
#[derive(Parser)]
#[command(name = "drone_sim", version, about = "Synthetic agent feed for SwarmView")]
struct Cli {
    /// Viewer report address to connect to.
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Number of synthetic drones.
    #[arg(short = 'n', long, default_value_t = 3)]
    drones: usize,

    /// Delay between report batches, in milliseconds.
    #[arg(short, long, default_value_t = 200)]
    interval_ms: u64,

    /// Stop after this many batches; 0 keeps going until the viewer closes.
    #[arg(short, long, default_value_t = 0)]
    steps: u64,
}

/// Fixed terrain script: what a drone "finds" when it looks at a cell.
fn classify(x: i16, y: i16) -> TerrainCell {
    if x == 0 || y == 0 || x == GRID_WIDTH - 1 || y == GRID_HEIGHT - 1 {
        TerrainCell::Wall
    } else if (x * 7 + y * 13) % 31 == 0 {
        TerrainCell::Danger
    } else if (x * 5 + y * 3) % 43 == 0 {
        TerrainCell::Gold
    } else if (x + y * 11) % 53 == 0 {
        TerrainCell::Powerup
    } else if (x + y) % 2 == 0 {
        TerrainCell::Safe
    } else {
        TerrainCell::Empty
    }
}

/// One synthetic drone sweeping its band of the arena in a lawnmower
/// pattern, accumulating discoveries as it goes.
struct ScriptedDrone {
    id: String,
    x: i16,
    y: i16,
    band_top: i16,
    band_bottom: i16,
    heading_east: bool,
    dir: Direction,
    energy: i32,
    score: i64,
    known: HashMap<(i16, i16), TerrainCell>,
    route: Vec<(i16, i16)>,
}

impl ScriptedDrone {
    fn new(index: usize, count: usize) -> Self {
        let band_height = (GRID_HEIGHT - 2) / count as i16;
        let band_top = 1 + band_height * index as i16;
        let band_bottom = if index == count - 1 {
            GRID_HEIGHT - 1
        } else {
            band_top + band_height
        };
        let start = (1, band_top);

        let mut drone = Self {
            id: format!("d{}", index + 1),
            x: start.0,
            y: start.1,
            band_top,
            band_bottom,
            heading_east: true,
            dir: Direction::East,
            energy: 100,
            score: 0,
            known: HashMap::new(),
            route: vec![start],
        };
        drone.look_around();
        drone
    }

    fn step(&mut self) {
        if self.heading_east {
            if self.x + 1 < GRID_WIDTH - 1 {
                self.x += 1;
                self.dir = Direction::East;
            } else {
                self.descend();
            }
        } else if self.x > 1 {
            self.x -= 1;
            self.dir = Direction::West;
        } else {
            self.descend();
        }

        self.route.push((self.x, self.y));
        self.look_around();

        self.energy -= 1;
        if self.energy < 20 {
            self.energy = 100;
        }
    }

    fn descend(&mut self) {
        self.heading_east = !self.heading_east;
        self.dir = Direction::South;
        self.y += 1;
        if self.y >= self.band_bottom {
            // Band swept; start over from the top.
            self.y = self.band_top;
            self.dir = Direction::North;
        }
    }

    fn look_around(&mut self) {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let (cx, cy) = (self.x + dx, self.y + dy);
                if cx < 0 || cy < 0 || cx >= GRID_WIDTH || cy >= GRID_HEIGHT {
                    continue;
                }
                let cell = classify(cx, cy);
                if self.known.insert((cx, cy), cell).is_none() && cell == TerrainCell::Gold {
                    self.score += 1;
                }
            }
        }
    }

    fn report(&self) -> AgentReport {
        let map = self
            .known
            .iter()
            .map(|(&(x, y), &cell)| (x, y, cell))
            .collect();
        let finds = |wanted: TerrainCell| -> Vec<(i16, i16, i64)> {
            self.known
                .iter()
                .filter(|&(_, &cell)| cell == wanted)
                .map(|(&(x, y), _)| (x, y, ((x as i64 % 5) + 1) * 1000))
                .collect()
        };

        let tail_start = self.route.len().saturating_sub(PATH_TAIL);
        let field = FieldReport {
            map,
            midpoint: self.route[0],
            gold: finds(TerrainCell::Gold),
            powerup: finds(TerrainCell::Powerup),
            current_path: self.route[tail_start..].to_vec(),
        };
        let bot = DroneReport {
            x: self.x,
            y: self.y,
            energy: self.energy,
            score: self.score,
            dir: self.dir,
            state: if self.energy < 40 { "RECHARGE" } else { "EXPLORE" }.to_string(),
        };

        AgentReport {
            id: self.id.clone(),
            field: Some(field),
            bot: Some(bot),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut stream = TcpStream::connect(&cli.addr)
        .with_context(|| format!("failed to connect to viewer at {}", cli.addr))?;
    info!("connected to viewer at {}", cli.addr);

    let count = cli.drones.max(1);
    let mut drones: Vec<ScriptedDrone> = (0..count).map(|i| ScriptedDrone::new(i, count)).collect();

    let mut batch: u64 = 0;
    loop {
        for drone in &mut drones {
            let line = serde_json::to_string(&drone.report())
                .context("failed to encode agent report")?;
            if writeln!(stream, "{line}").is_err() {
                info!("viewer closed the connection, stopping");
                return Ok(());
            }
            drone.step();
        }
        if stream.flush().is_err() {
            info!("viewer closed the connection, stopping");
            return Ok(());
        }

        batch += 1;
        if cli.steps > 0 && batch >= cli.steps {
            info!("sent {batch} batches, done");
            return Ok(());
        }
        thread::sleep(Duration::from_millis(cli.interval_ms));
    }
}
