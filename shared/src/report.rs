use serde::{Deserialize, Serialize};

/// One decoded spectator message.
///
/// `id` is the only required part. A report carrying neither payload is
/// still a valid observation of that agent; the viewer treats it as a no-op
/// update that marks the world dirty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<DroneReport>,
}

/// An agent's self-reported partial view of the arena, replaced wholesale
/// on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    /// Discovered cells as `(x, y, classification)` triples.
    pub map: Vec<(i16, i16, TerrainCell)>,
    /// The agent's home/reference cell, always rendered highlighted.
    pub midpoint: (i16, i16),
    /// Gold finds as `(x, y, value)`; value in score-thousands.
    pub gold: Vec<(i16, i16, i64)>,
    /// Powerup finds, same shape as `gold`.
    pub powerup: Vec<(i16, i16, i64)>,
    /// Travelled route; the first entry is the origin.
    pub current_path: Vec<(i16, i16)>,
}

/// An agent's self-reported status, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneReport {
    pub x: i16,
    pub y: i16,
    pub energy: i32,
    pub score: i64,
    #[serde(default)]
    pub dir: Direction,
    /// Free-form status label, shown next to the agent marker.
    pub state: String,
}

/// Terrain classification as agents report it. Labels the viewer does not
/// recognize decode as `Empty`, the same way the display has always painted
/// them; cells never reported at all are `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum TerrainCell {
    Safe,
    Empty,
    Danger,
    Unknown,
    Wall,
    Gold,
    Powerup,
}

impl From<String> for TerrainCell {
    fn from(label: String) -> Self {
        match label.as_str() {
            "SAFE" => TerrainCell::Safe,
            "EMPTY" => TerrainCell::Empty,
            "DANGER" => TerrainCell::Danger,
            "UNKNOWN" => TerrainCell::Unknown,
            "WALL" => TerrainCell::Wall,
            "GOLD" => TerrainCell::Gold,
            "POWERUP" => TerrainCell::Powerup,
            _ => TerrainCell::Empty,
        }
    }
}

/// Heading of a drone. Absent or unrecognized values decode as `North`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Direction {
    #[default]
    North,
    South,
    East,
    West,
}

impl From<String> for Direction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "SOUTH" => Direction::South,
            "EAST" => Direction::East,
            "WEST" => Direction::West,
            _ => Direction::North,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_report_decodes() {
        let line = r#"{
            "id": "a",
            "field": {
                "map": [[1, 1, "UNKNOWN"], [2, 1, "WALL"]],
                "midpoint": [1, 1],
                "gold": [[4, 2, 2000]],
                "powerup": [],
                "current_path": [[0, 0], [1, 1]]
            },
            "bot": {"x": 1, "y": 1, "energy": 80, "score": 0, "dir": "EAST", "state": "IDLE"}
        }"#;

        let report: AgentReport = serde_json::from_str(line).unwrap();
        assert_eq!(report.id, "a");

        let field = report.field.unwrap();
        assert_eq!(field.map[0], (1, 1, TerrainCell::Unknown));
        assert_eq!(field.map[1], (2, 1, TerrainCell::Wall));
        assert_eq!(field.midpoint, (1, 1));
        assert_eq!(field.gold, vec![(4, 2, 2000)]);
        assert_eq!(field.current_path, vec![(0, 0), (1, 1)]);

        let bot = report.bot.unwrap();
        assert_eq!((bot.x, bot.y), (1, 1));
        assert_eq!(bot.dir, Direction::East);
        assert_eq!(bot.state, "IDLE");
    }

    #[test]
    fn test_report_without_payloads_decodes() {
        let report: AgentReport = serde_json::from_str(r#"{"id": "ghost"}"#).unwrap();
        assert_eq!(report.id, "ghost");
        assert!(report.field.is_none());
        assert!(report.bot.is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let line = r#"{"bot": {"x": 0, "y": 0, "energy": 1, "score": 0, "state": "IDLE"}}"#;
        assert!(serde_json::from_str::<AgentReport>(line).is_err());
    }

    #[test]
    fn test_unrecognized_terrain_decodes_as_empty() {
        let cell: TerrainCell = serde_json::from_str(r#""LAVA""#).unwrap();
        assert_eq!(cell, TerrainCell::Empty);
    }

    #[test]
    fn test_terrain_round_trips_through_wire_labels() {
        for cell in [
            TerrainCell::Safe,
            TerrainCell::Empty,
            TerrainCell::Danger,
            TerrainCell::Unknown,
            TerrainCell::Wall,
            TerrainCell::Gold,
            TerrainCell::Powerup,
        ] {
            let label = serde_json::to_string(&cell).unwrap();
            let back: TerrainCell = serde_json::from_str(&label).unwrap();
            assert_eq!(back, cell, "label {} did not survive", label);
        }
    }

    #[test]
    fn test_direction_defaults_to_north() {
        let absent = r#"{"x": 0, "y": 0, "energy": 1, "score": 0, "state": "IDLE"}"#;
        let bot: DroneReport = serde_json::from_str(absent).unwrap();
        assert_eq!(bot.dir, Direction::North);

        let odd: Direction = serde_json::from_str(r#""UPWARDS""#).unwrap();
        assert_eq!(odd, Direction::North);
    }
}
