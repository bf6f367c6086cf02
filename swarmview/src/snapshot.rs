use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::warn;
use shared::{grid, CellId, Direction, DroneReport, FieldReport, TerrainCell};

/// One cell of the terrain layer: merged terrain, or an agent's home
/// midpoint, which paints over whatever terrain was reported there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Terrain(TerrainCell),
    Midpoint,
}

/// Status tuple rendered at an agent's current cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMarker {
    pub id: String,
    pub energy: i32,
    pub score: i64,
    pub dir: Direction,
    pub state: String,
}

/// The four derived layers for one render pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub terrain: HashMap<CellId, Tile>,
    pub labels: HashMap<CellId, String>,
    pub agents: HashMap<CellId, AgentMarker>,
    pub paths: HashMap<String, Vec<(i16, i16)>>,
}

/// Builds all four layers from one consistent view of the report maps.
///
/// Layers are derived independently: a malformed entry fails only its own
/// layer, which degrades to its empty default, and the other three come
/// out intact. With `deterministic` set, agents are processed in
/// identifier order so same-cell conflicts resolve the same way every
/// frame; otherwise the incidental `HashMap` order decides.
pub fn build(
    fields: &HashMap<String, FieldReport>,
    drones: &HashMap<String, DroneReport>,
    deterministic: bool,
) -> Snapshot {
    let terrain = terrain_layer(fields, deterministic).unwrap_or_else(|e| {
        warn!("terrain layer dropped this frame: {e:#}");
        undiscovered_grid()
    });
    let labels = label_layer(fields, deterministic).unwrap_or_else(|e| {
        warn!("label layer dropped this frame: {e:#}");
        HashMap::new()
    });
    let agents = agent_layer(drones, deterministic).unwrap_or_else(|e| {
        warn!("agent layer dropped this frame: {e:#}");
        HashMap::new()
    });
    let paths = path_layer(fields);

    Snapshot {
        terrain,
        labels,
        agents,
        paths,
    }
}

/// The full arena with nothing discovered yet; also the terrain layer's
/// fallback when a report poisons the merge.
pub fn undiscovered_grid() -> HashMap<CellId, Tile> {
    grid::arena_cells()
        .map(|cell| (cell, Tile::Terrain(TerrainCell::Unknown)))
        .collect()
}

/// Iteration order over agents decides who wins conflicting writes.
fn agent_order<T>(map: &HashMap<String, T>, deterministic: bool) -> Vec<&String> {
    let mut ids: Vec<&String> = map.keys().collect();
    if deterministic {
        ids.sort();
    }
    ids
}

fn terrain_layer(
    fields: &HashMap<String, FieldReport>,
    deterministic: bool,
) -> Result<HashMap<CellId, Tile>> {
    let mut terrain = undiscovered_grid();

    for id in agent_order(fields, deterministic) {
        let field = &fields[id];
        for &(x, y, cell) in &field.map {
            let coords = CellId::new(x, y)
                .ok_or_else(|| anyhow!("agent {id} reported unencodable cell ({x}, {y})"))?;

            // An EMPTY observation is a clearer signal than another
            // agent's SAFE; never let SAFE paint over it.
            if terrain.get(&coords) == Some(&Tile::Terrain(TerrainCell::Empty))
                && cell == TerrainCell::Safe
            {
                continue;
            }
            terrain.insert(coords, Tile::Terrain(cell));
        }

        let (mx, my) = field.midpoint;
        let midpoint = CellId::new(mx, my)
            .ok_or_else(|| anyhow!("agent {id} reported unencodable midpoint ({mx}, {my})"))?;
        terrain.insert(midpoint, Tile::Midpoint);
    }

    Ok(terrain)
}

fn label_layer(
    fields: &HashMap<String, FieldReport>,
    deterministic: bool,
) -> Result<HashMap<CellId, String>> {
    let mut labels = HashMap::new();

    for id in agent_order(fields, deterministic) {
        let field = &fields[id];
        for &(x, y, value) in field.gold.iter().chain(field.powerup.iter()) {
            let coords = CellId::new(x, y)
                .ok_or_else(|| anyhow!("agent {id} reported unencodable find at ({x}, {y})"))?;
            labels.insert(coords, format!("{}s", value / 1000));
        }
    }

    Ok(labels)
}

fn agent_layer(
    drones: &HashMap<String, DroneReport>,
    deterministic: bool,
) -> Result<HashMap<CellId, AgentMarker>> {
    let mut agents = HashMap::new();

    for id in agent_order(drones, deterministic) {
        let drone = &drones[id];
        let coords = CellId::new(drone.x, drone.y).ok_or_else(|| {
            anyhow!(
                "agent {id} reported unencodable position ({}, {})",
                drone.x,
                drone.y
            )
        })?;
        agents.insert(
            coords,
            AgentMarker {
                id: id.clone(),
                energy: drone.energy,
                score: drone.score,
                dir: drone.dir,
                state: drone.state.clone(),
            },
        );
    }

    Ok(agents)
}

/// Paths are keyed per agent, not per cell; the route is carried verbatim
/// and the renderer decides which cells get dots. Copying typed sequences
/// cannot fail, so this layer has no error path.
fn path_layer(fields: &HashMap<String, FieldReport>) -> HashMap<String, Vec<(i16, i16)>> {
    fields
        .iter()
        .map(|(id, field)| (id.clone(), field.current_path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(map: Vec<(i16, i16, TerrainCell)>, midpoint: (i16, i16)) -> FieldReport {
        FieldReport {
            map,
            midpoint,
            gold: vec![],
            powerup: vec![],
            current_path: vec![],
        }
    }

    fn drone(x: i16, y: i16) -> DroneReport {
        DroneReport {
            x,
            y,
            energy: 100,
            score: 0,
            dir: Direction::North,
            state: "IDLE".to_string(),
        }
    }

    fn cell(x: i16, y: i16) -> CellId {
        CellId::new(x, y).unwrap()
    }

    #[test]
    fn test_unreported_cells_default_to_unknown() {
        let snapshot = build(&HashMap::new(), &HashMap::new(), true);
        assert_eq!(
            snapshot.terrain.get(&cell(0, 0)),
            Some(&Tile::Terrain(TerrainCell::Unknown))
        );
        assert_eq!(
            snapshot.terrain.len(),
            (shared::GRID_WIDTH as usize) * (shared::GRID_HEIGHT as usize)
        );
    }

    #[test]
    fn test_empty_beats_later_safe() {
        let mut fields = HashMap::new();
        // Processed in id order: "a" writes EMPTY first, "b" then reports
        // SAFE for the same cell.
        fields.insert(
            "a".to_string(),
            field(vec![(5, 5, TerrainCell::Empty)], (0, 0)),
        );
        fields.insert(
            "b".to_string(),
            field(vec![(5, 5, TerrainCell::Safe)], (1, 0)),
        );

        let terrain = terrain_layer(&fields, true).unwrap();
        assert_eq!(
            terrain.get(&cell(5, 5)),
            Some(&Tile::Terrain(TerrainCell::Empty))
        );
    }

    #[test]
    fn test_safe_then_empty_overwrites() {
        let mut fields = HashMap::new();
        fields.insert(
            "a".to_string(),
            field(vec![(5, 5, TerrainCell::Safe)], (0, 0)),
        );
        fields.insert(
            "b".to_string(),
            field(vec![(5, 5, TerrainCell::Empty)], (1, 0)),
        );

        let terrain = terrain_layer(&fields, true).unwrap();
        assert_eq!(
            terrain.get(&cell(5, 5)),
            Some(&Tile::Terrain(TerrainCell::Empty))
        );
    }

    #[test]
    fn test_non_safe_conflicts_resolve_to_last_agent() {
        let mut fields = HashMap::new();
        fields.insert(
            "a".to_string(),
            field(vec![(7, 3, TerrainCell::Danger)], (0, 0)),
        );
        fields.insert(
            "b".to_string(),
            field(vec![(7, 3, TerrainCell::Wall)], (1, 0)),
        );

        let terrain = terrain_layer(&fields, true).unwrap();
        assert_eq!(
            terrain.get(&cell(7, 3)),
            Some(&Tile::Terrain(TerrainCell::Wall))
        );
    }

    #[test]
    fn test_midpoint_overwrites_any_terrain() {
        let mut fields = HashMap::new();
        fields.insert(
            "a".to_string(),
            field(
                vec![(2, 2, TerrainCell::Wall), (3, 2, TerrainCell::Gold)],
                (2, 2),
            ),
        );

        let terrain = terrain_layer(&fields, true).unwrap();
        assert_eq!(terrain.get(&cell(2, 2)), Some(&Tile::Midpoint));
        assert_eq!(
            terrain.get(&cell(3, 2)),
            Some(&Tile::Terrain(TerrainCell::Gold))
        );
    }

    #[test]
    fn test_labels_cover_gold_and_powerup() {
        let mut fields = HashMap::new();
        let mut f = field(vec![], (0, 0));
        f.gold = vec![(4, 2, 2000)];
        f.powerup = vec![(6, 2, 5500)];
        fields.insert("a".to_string(), f);

        let labels = label_layer(&fields, true).unwrap();
        assert_eq!(labels.get(&cell(4, 2)), Some(&"2s".to_string()));
        assert_eq!(labels.get(&cell(6, 2)), Some(&"5s".to_string()));
    }

    #[test]
    fn test_one_agent_marker_per_cell() {
        let mut drones = HashMap::new();
        drones.insert("a".to_string(), drone(9, 9));
        drones.insert("b".to_string(), drone(9, 9));

        let agents = agent_layer(&drones, true).unwrap();
        assert_eq!(agents.len(), 1);
        // Identifier order makes "b" the last writer.
        assert_eq!(agents.get(&cell(9, 9)).unwrap().id, "b");
    }

    #[test]
    fn test_malformed_gold_empties_only_the_label_layer() {
        let mut fields = HashMap::new();
        let mut broken = field(vec![(1, 1, TerrainCell::Safe)], (1, 1));
        broken.gold = vec![(4, 250, 2000)]; // y >= 100 cannot be encoded
        fields.insert("a".to_string(), broken);

        let mut ok = field(vec![(2, 2, TerrainCell::Danger)], (2, 2));
        ok.gold = vec![(5, 5, 1000)];
        ok.current_path = vec![(0, 0), (2, 2)];
        fields.insert("b".to_string(), ok);

        let mut drones = HashMap::new();
        drones.insert("b".to_string(), drone(2, 2));

        let snapshot = build(&fields, &drones, true);
        assert!(snapshot.labels.is_empty(), "broken layer must come out empty");
        assert_eq!(
            snapshot.terrain.get(&cell(2, 2)),
            Some(&Tile::Midpoint),
            "terrain layer must be unaffected"
        );
        assert_eq!(snapshot.agents.len(), 1);
        assert_eq!(snapshot.paths.get("b").unwrap().len(), 2);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // A field report followed by a status report for the same agent.
        let mut fields = HashMap::new();
        fields.insert(
            "a".to_string(),
            FieldReport {
                map: vec![(1, 1, TerrainCell::Unknown)],
                midpoint: (1, 1),
                gold: vec![],
                powerup: vec![],
                current_path: vec![(0, 0), (1, 1)],
            },
        );
        let mut drones = HashMap::new();
        drones.insert(
            "a".to_string(),
            DroneReport {
                x: 1,
                y: 1,
                energy: 80,
                score: 0,
                dir: Direction::East,
                state: "IDLE".to_string(),
            },
        );

        let snapshot = build(&fields, &drones, true);

        assert_eq!(snapshot.terrain.get(&cell(1, 1)), Some(&Tile::Midpoint));
        let marker = snapshot.agents.get(&cell(1, 1)).unwrap();
        assert_eq!(
            (
                marker.id.as_str(),
                marker.energy,
                marker.score,
                marker.dir,
                marker.state.as_str()
            ),
            ("a", 80, 0, Direction::East, "IDLE")
        );
        assert_eq!(snapshot.paths.get("a").unwrap(), &vec![(0, 0), (1, 1)]);
    }
}
