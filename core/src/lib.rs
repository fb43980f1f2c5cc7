#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lux agent.
//!
//! This crate defines the value types that connect the observation snapshot,
//! the authoritative world, and the planning systems. The world crate turns
//! observations into a grid of [`Position`]-addressed cells, systems read that
//! grid together with their own persistent state, and respond exclusively with
//! [`Action`] values that adapters serialise for the host process.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Amount of a single resource a worker must carry before it may found a city tile.
pub const BUILD_RESOURCE_THRESHOLD: u32 = 100;

/// Total cargo a worker can carry across all resource kinds.
pub const WORKER_CARGO_CAPACITY: u32 = 100;

/// Total cargo a cart can carry across all resource kinds.
pub const CART_CARGO_CAPACITY: u32 = 2_000;

/// Research points required before coal deposits may be mined.
pub const COAL_RESEARCH_POINTS: u32 = 50;

/// Research points required before uranium deposits may be mined.
pub const URANIUM_RESEARCH_POINTS: u32 = 200;

/// Location of a single grid cell expressed as signed column and row coordinates.
///
/// Coordinates are signed so that a translation off the edge of the grid is
/// representable and can be rejected by bounds checks instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from column and row coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Euclidean distance between the centres of two cells.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// Reports whether `other` is this position or one of its orthogonal neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan_distance(other) <= 1
    }

    /// Returns the position reached by a single step in `direction`.
    #[must_use]
    pub const fn translate(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        self.offset(dx, dy)
    }

    /// Greedy single-step heuristic toward `target`.
    ///
    /// Tries north, east, south and west in that order and keeps the first
    /// direction whose destination is strictly closer (Euclidean) than the
    /// best found so far. Returns [`Direction::Center`] when no step improves
    /// on staying put. Obstacles are ignored; use the world's path search
    /// when they matter.
    #[must_use]
    pub fn direction_to(self, target: Position) -> Direction {
        let mut closest_distance = self.distance_to(target);
        let mut closest_direction = Direction::Center;

        for direction in Direction::CARDINAL {
            let distance = self.translate(direction).distance_to(target);
            if distance < closest_distance {
                closest_distance = distance;
                closest_direction = direction;
            }
        }

        closest_direction
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement directions available to units, including staying in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// No movement.
    Center,
}

impl Direction {
    /// The four compass directions in the order used by greedy heuristics.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row displacement produced by a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::Center => (0, 0),
        }
    }

    /// Maps a unit displacement onto its direction.
    ///
    /// Anything other than a single orthogonal step maps to [`Direction::Center`].
    #[must_use]
    pub const fn from_offset(dx: i32, dy: i32) -> Self {
        match (dx, dy) {
            (0, -1) => Self::North,
            (1, 0) => Self::East,
            (0, 1) => Self::South,
            (-1, 0) => Self::West,
            _ => Self::Center,
        }
    }

    /// Direction of the single step leading from `from` to `to`.
    #[must_use]
    pub const fn between(from: Position, to: Position) -> Self {
        Self::from_offset(to.x() - from.x(), to.y() - from.y())
    }

    /// Single-character code used by the textual action format.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::North => 'n',
            Self::East => 'e',
            Self::South => 's',
            Self::West => 'w',
            Self::Center => 'c',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Stable identifier assigned to a unit by the host.
///
/// Objectives are keyed by this identifier so they survive the unit
/// snapshots being rebuilt from every observation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Creates a unit identifier from its host-assigned name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier assigned to a city by the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(String);

impl CityId {
    /// Creates a city identifier from its host-assigned name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a competing team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u32);

impl TeamId {
    /// Creates a team identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of resource deposits found on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Freely minable from the first turn.
    Wood,
    /// Minable once [`COAL_RESEARCH_POINTS`] have been accumulated.
    Coal,
    /// Minable once [`URANIUM_RESEARCH_POINTS`] have been accumulated.
    Uranium,
}

impl ResourceKind {
    /// Every resource kind in ascending research order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Wood,
        ResourceKind::Coal,
        ResourceKind::Uranium,
    ];

    /// Research points a player needs before deposits of this kind may be mined.
    #[must_use]
    pub const fn research_requirement(self) -> u32 {
        match self {
            Self::Wood => 0,
            Self::Coal => COAL_RESEARCH_POINTS,
            Self::Uranium => URANIUM_RESEARCH_POINTS,
        }
    }
}

/// Resources carried by a unit, per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Cargo {
    /// Carried wood.
    pub wood: u32,
    /// Carried coal.
    pub coal: u32,
    /// Carried uranium.
    pub uranium: u32,
}

impl Cargo {
    /// Creates a cargo manifest with explicit amounts.
    #[must_use]
    pub const fn new(wood: u32, coal: u32, uranium: u32) -> Self {
        Self {
            wood,
            coal,
            uranium,
        }
    }

    /// Amount carried of a single resource kind.
    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Coal => self.coal,
            ResourceKind::Uranium => self.uranium,
        }
    }

    /// Sum of all carried resources.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.wood.saturating_add(self.coal).saturating_add(self.uranium)
    }
}

/// Types of mobile units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Gathers resources and founds city tiles.
    Worker,
    /// Hauls large amounts of cargo; never builds.
    Cart,
}

impl UnitKind {
    /// Total cargo the unit kind can carry.
    #[must_use]
    pub const fn cargo_capacity(self) -> u32 {
        match self {
            Self::Worker => WORKER_CARGO_CAPACITY,
            Self::Cart => CART_CARGO_CAPACITY,
        }
    }
}

/// Actions emitted by the planner for the host to execute.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Moves a unit one step, or keeps it in place with [`Direction::Center`].
    Move {
        /// Unit performing the move.
        unit: UnitId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Founds a city tile on the unit's current cell.
    BuildCity {
        /// Worker spending its cargo on the new tile.
        unit: UnitId,
    },
    /// Orders the city tile at `position` to produce a worker.
    BuildWorker {
        /// Location of the producing city tile.
        position: Position,
    },
    /// Debug marker drawn on a cell; has no game effect.
    Annotate {
        /// Cell the marker is drawn on.
        position: Position,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { unit, direction } => write!(f, "m {unit} {direction}"),
            Self::BuildCity { unit } => write!(f, "bcity {unit}"),
            Self::BuildWorker { position } => write!(f, "bw {} {}", position.x(), position.y()),
            Self::Annotate { position } => write!(f, "dc {} {}", position.x(), position.y()),
        }
    }
}

/// Tuning limits supplied by the host when a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// City tile count the planner stops expanding at. Defaults to 3.
    pub max_cities: usize,
    /// Worker count the production pass stops at. Defaults to 2.
    pub max_units: usize,
}

impl PlannerConfig {
    /// Default value of [`PlannerConfig::max_cities`].
    pub const DEFAULT_MAX_CITIES: usize = 3;
    /// Default value of [`PlannerConfig::max_units`].
    pub const DEFAULT_MAX_UNITS: usize = 2;

    /// Checks that every limit permits at least some activity.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_cities == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_cities",
            });
        }
        if self.max_units == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_units" });
        }
        Ok(self)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_cities: Self::DEFAULT_MAX_CITIES,
            max_units: Self::DEFAULT_MAX_UNITS,
        }
    }
}

/// Reasons a planner configuration is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A limit was configured as zero.
    #[error("{field} must be at least 1")]
    ZeroLimit {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Reasons a grid access is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The position lies outside the grid; positions are never clamped.
    #[error("position {position} lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending position.
        position: Position,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        Action, Cargo, ConfigError, Direction, PlannerConfig, Position, ResourceKind, UnitId,
        UnitKind,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn euclidean_distance_uses_cell_centres() {
        let origin = Position::new(0, 0);
        assert!((origin.distance_to(Position::new(3, 4)) - 5.0).abs() < f64::EPSILON);
        assert!(origin.distance_to(origin).abs() < f64::EPSILON);
    }

    #[test]
    fn adjacency_includes_self_and_orthogonal_neighbours() {
        let origin = Position::new(2, 2);
        assert!(origin.is_adjacent(origin));
        assert!(origin.is_adjacent(Position::new(2, 3)));
        assert!(!origin.is_adjacent(Position::new(3, 3)));
    }

    #[test]
    fn translate_follows_compass() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.translate(Direction::North), Position::new(3, 2));
        assert_eq!(origin.translate(Direction::East), Position::new(4, 3));
        assert_eq!(origin.translate(Direction::South), Position::new(3, 4));
        assert_eq!(origin.translate(Direction::West), Position::new(2, 3));
        assert_eq!(origin.translate(Direction::Center), origin);
    }

    #[test]
    fn from_offset_round_trips_every_direction() {
        for direction in Direction::CARDINAL {
            let (dx, dy) = direction.offset();
            assert_eq!(Direction::from_offset(dx, dy), direction);
        }
        assert_eq!(Direction::from_offset(1, 1), Direction::Center);
        assert_eq!(Direction::from_offset(2, 0), Direction::Center);
    }

    #[test]
    fn direction_to_prefers_first_improving_direction() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.direction_to(Position::new(2, 0)), Direction::North);
        assert_eq!(origin.direction_to(Position::new(5, 2)), Direction::East);
        // Both north and east improve equally; north is tried first.
        assert_eq!(origin.direction_to(Position::new(4, 0)), Direction::North);
        assert_eq!(origin.direction_to(origin), Direction::Center);
    }

    #[test]
    fn cargo_capacity_depends_on_unit_kind() {
        assert_eq!(UnitKind::Worker.cargo_capacity(), 100);
        assert_eq!(UnitKind::Cart.cargo_capacity(), 2_000);
        let cargo = Cargo::new(40, 30, 20);
        assert_eq!(cargo.total(), 90);
        assert_eq!(cargo.amount(ResourceKind::Coal), 30);
    }

    #[test]
    fn actions_render_textual_commands() {
        let unit = UnitId::new("u_7");
        let rendered: Vec<String> = [
            Action::Move {
                unit: unit.clone(),
                direction: Direction::West,
            },
            Action::BuildCity { unit },
            Action::BuildWorker {
                position: Position::new(4, 9),
            },
            Action::Annotate {
                position: Position::new(0, 1),
            },
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(rendered, ["m u_7 w", "bcity u_7", "bw 4 9", "dc 0 1"]);
    }

    #[test]
    fn default_config_matches_documented_limits() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_cities, 3);
        assert_eq!(config.max_units, 2);
        assert_eq!(config.validate(), Ok(config));
    }

    #[test]
    fn config_rejects_zero_limits() {
        let config = PlannerConfig {
            max_cities: 0,
            ..PlannerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit {
                field: "max_cities"
            })
        );

        let config = PlannerConfig {
            max_units: 0,
            ..PlannerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit { field: "max_units" })
        );
    }

    #[test]
    fn partial_toml_config_falls_back_to_defaults() {
        let config: PlannerConfig = toml::from_str("max_units = 5").expect("parse config");
        assert_eq!(config.max_units, 5);
        assert_eq!(config.max_cities, PlannerConfig::DEFAULT_MAX_CITIES);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn action_round_trips_through_bincode() {
        assert_round_trip(&Action::Move {
            unit: UnitId::new("u_3"),
            direction: Direction::South,
        });
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(-1, 12));
    }
}
