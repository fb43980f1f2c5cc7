#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for the Lux agent.
//!
//! The world owns the fixed-size [`Grid`] created on the first observation
//! together with the per-turn entity snapshots of every player. Observations
//! are folded into the state through [`apply`], which rewrites cell contents in
//! place without ever resizing the grid. Systems read the state through the
//! [`query`] module and the [`navigation`] path search.

use std::collections::{BTreeMap, BTreeSet};

use lux_agent_core::{
    Cargo, CityId, GridError, Position, ResourceKind, TeamId, UnitId, UnitKind,
    BUILD_RESOURCE_THRESHOLD,
};
use thiserror::Error;

pub mod navigation;
mod observation;

pub use observation::{
    ObservedCity, ObservedCityTile, ObservedPlayer, ObservedResource, ObservedRoad, ObservedUnit,
    Observation,
};

/// Resource deposit sitting on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Kind of resource in the deposit.
    pub kind: ResourceKind,
    /// Remaining amount; only ever decreased by the host.
    pub amount: u32,
}

/// City tile owned by a team.
#[derive(Clone, Debug, PartialEq)]
pub struct CityTile {
    /// Team owning the tile.
    pub team: TeamId,
    /// City the tile belongs to.
    pub city_id: CityId,
    /// Cell occupied by the tile.
    pub position: Position,
    /// Turns remaining before the tile may act again.
    pub cooldown: f32,
}

impl CityTile {
    /// Reports whether the tile may produce or research this turn.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.cooldown < 1.0
    }
}

/// Group of city tiles sharing fuel accounting.
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    /// Identifier assigned by the host.
    pub id: CityId,
    /// Team owning the city.
    pub team: TeamId,
    /// Aggregate fuel stored by the city.
    pub fuel: f32,
    /// Fuel consumed by the city every night turn.
    pub light_upkeep: f32,
    /// Member tiles in snapshot order.
    pub tiles: Vec<CityTile>,
}

/// Mobile unit snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    /// Stable identifier assigned by the host.
    pub id: UnitId,
    /// Team owning the unit.
    pub team: TeamId,
    /// Worker or cart.
    pub kind: UnitKind,
    /// Cell currently occupied by the unit.
    pub position: Position,
    /// Resources carried by the unit.
    pub cargo: Cargo,
    /// Turns remaining before the unit may act again.
    pub cooldown: f32,
}

impl Unit {
    /// Reports whether the unit is off cooldown this turn.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.cooldown < 1.0
    }

    /// Reports whether the unit is a worker.
    #[must_use]
    pub fn is_worker(&self) -> bool {
        self.kind == UnitKind::Worker
    }

    /// Cargo still available before the unit is full.
    #[must_use]
    pub fn cargo_space_left(&self) -> u32 {
        self.kind.cargo_capacity().saturating_sub(self.cargo.total())
    }

    /// Reports whether the unit carries enough of a single resource to found a city tile.
    ///
    /// Carts never build, so they never qualify.
    #[must_use]
    pub fn has_enough_resource(&self) -> bool {
        if !self.is_worker() {
            return false;
        }

        ResourceKind::ALL
            .iter()
            .any(|kind| self.cargo.amount(*kind) >= BUILD_RESOURCE_THRESHOLD)
    }
}

/// Everything a single team controls.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Team identifier.
    pub team: TeamId,
    /// Accumulated research points.
    pub research_points: u32,
    /// Units in snapshot order.
    pub units: Vec<Unit>,
    /// Cities keyed by identifier, iterated in identifier order.
    pub cities: BTreeMap<CityId, City>,
}

impl Player {
    /// Creates a player without units, cities or research.
    #[must_use]
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            research_points: 0,
            units: Vec::new(),
            cities: BTreeMap::new(),
        }
    }

    /// Reports whether deposits of `kind` may be mined at the current research level.
    #[must_use]
    pub fn researched(&self, kind: ResourceKind) -> bool {
        self.research_points >= kind.research_requirement()
    }

    /// Total number of tiles across every city.
    #[must_use]
    pub fn city_tile_count(&self) -> usize {
        self.cities.values().map(|city| city.tiles.len()).sum()
    }

    /// Iterator over every city tile, city by city in identifier order.
    pub fn city_tiles(&self) -> impl Iterator<Item = &CityTile> {
        self.cities.values().flat_map(|city| city.tiles.iter())
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.iter().find(|unit| &unit.id == id)
    }
}

/// A single grid square and its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    position: Position,
    resource: Option<Resource>,
    city_tile: Option<CityTile>,
    road: f32,
}

impl Cell {
    fn empty(position: Position) -> Self {
        Self {
            position,
            resource: None,
            city_tile: None,
            road: 0.0,
        }
    }

    /// Location of the cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Resource deposit on the cell, including depleted ones.
    #[must_use]
    pub const fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    /// City tile built on the cell.
    #[must_use]
    pub const fn city_tile(&self) -> Option<&CityTile> {
        self.city_tile.as_ref()
    }

    /// Road level of the cell.
    #[must_use]
    pub const fn road(&self) -> f32 {
        self.road
    }

    /// True iff a deposit with a positive remaining amount is present.
    #[must_use]
    pub fn has_resource(&self) -> bool {
        self.resource.is_some_and(|resource| resource.amount > 0)
    }

    /// True iff the cell holds neither a live deposit nor a city tile.
    #[must_use]
    pub fn is_buildable(&self) -> bool {
        !self.has_resource() && self.city_tile.is_none()
    }

    fn clear(&mut self) {
        self.resource = None;
        self.city_tile = None;
        self.road = 0.0;
    }
}

/// Fixed-size rectangular grid of cells stored in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let cells = Positions::new(width, height).map(Cell::empty).collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether `position` lies inside the grid.
    #[must_use]
    pub fn is_valid(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Cell at `position`.
    pub fn cell_at(&self, position: Position) -> Result<&Cell, GridError> {
        let index = self.index(position).ok_or(self.out_of_bounds(position))?;
        Ok(&self.cells[index])
    }

    /// Mutable cell at `position`.
    pub fn cell_at_mut(&mut self, position: Position) -> Result<&mut Cell, GridError> {
        let index = self.index(position).ok_or(self.out_of_bounds(position))?;
        Ok(&mut self.cells[index])
    }

    /// Every valid position in row-major order.
    #[must_use]
    pub fn positions(&self) -> Positions {
        Positions::new(self.width, self.height)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Orthogonal in-bounds neighbours of `position` that are free to build on.
    ///
    /// Neighbours holding a live deposit or a city tile are filtered out, so
    /// this is not a raw adjacency query; see [`Grid::cardinal_neighbors`].
    #[must_use]
    pub fn plus_neighbors(&self, position: Position) -> Vec<Position> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .map(|(dx, dy)| position.offset(dx, dy))
            .filter(|neighbor| {
                self.index(*neighbor)
                    .is_some_and(|index| self.cells[index].is_buildable())
            })
            .collect()
    }

    /// Orthogonal in-bounds neighbours of `position` in `+x, -x, +y, -y` order.
    pub fn cardinal_neighbors(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(move |(dx, dy)| position.offset(dx, dy))
            .filter(|neighbor| self.is_valid(*neighbor))
    }

    /// Places or removes the deposit on a cell.
    pub fn set_resource(
        &mut self,
        position: Position,
        resource: Option<Resource>,
    ) -> Result<(), GridError> {
        self.cell_at_mut(position)?.resource = resource;
        Ok(())
    }

    /// Places or removes the city tile on a cell.
    pub fn set_city_tile(
        &mut self,
        position: Position,
        city_tile: Option<CityTile>,
    ) -> Result<(), GridError> {
        self.cell_at_mut(position)?.city_tile = city_tile;
        Ok(())
    }

    /// Sets the road level of a cell.
    pub fn set_road(&mut self, position: Position, level: f32) -> Result<(), GridError> {
        self.cell_at_mut(position)?.road = level;
        Ok(())
    }

    /// Removes every deposit, city tile and road while keeping the dimensions.
    pub fn clear_contents(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    fn out_of_bounds(&self, position: Position) -> GridError {
        GridError::OutOfBounds {
            position,
            width: self.width,
            height: self.height,
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        let column = u32::try_from(position.x()).ok()?;
        let row = u32::try_from(position.y()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

/// Restartable row-major iterator over the positions of a grid.
#[derive(Clone, Debug)]
pub struct Positions {
    width: u32,
    height: u32,
    column: u32,
    row: u32,
}

impl Positions {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            column: 0,
            row: if width == 0 { height } else { 0 },
        }
    }
}

impl Iterator for Positions {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.height {
            return None;
        }

        let position = Position::new(
            i32::try_from(self.column).ok()?,
            i32::try_from(self.row).ok()?,
        );
        self.column += 1;
        if self.column >= self.width {
            self.column = 0;
            self.row += 1;
        }
        Some(position)
    }
}

/// Represents the authoritative game state assembled from observations.
#[derive(Clone, Debug)]
pub struct GameState {
    turn: u32,
    grid: Grid,
    players: Vec<Player>,
}

impl GameState {
    /// Creates an empty state around a grid of the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            turn: 0,
            grid: Grid::new(width, height),
            players: Vec::new(),
        }
    }

    /// Builds the state for the first observation of a game.
    pub fn from_observation(observation: &Observation) -> Result<Self, WorldError> {
        let mut state = Self::new(observation.width, observation.height);
        apply(&mut state, observation)?;
        Ok(state)
    }
}

/// Reasons an observation cannot be folded into the game state.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// The observation describes a grid of a different size; grids never resize.
    #[error("observation grid is {found_width}x{found_height} but the game grid is {width}x{height}")]
    DimensionMismatch {
        /// Width of the existing grid.
        width: u32,
        /// Height of the existing grid.
        height: u32,
        /// Width reported by the observation.
        found_width: u32,
        /// Height reported by the observation.
        found_height: u32,
    },
    /// An entity of the observation lies outside the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Two units share the same identifier.
    #[error("unit {0} appears more than once in the observation")]
    DuplicateUnit(UnitId),
    /// Two cities share the same identifier.
    #[error("city {0} appears more than once in the observation")]
    DuplicateCity(CityId),
}

/// Folds an observation into the game state, rewriting every cell in place.
///
/// The observation is validated in full before anything is written, so a
/// rejected observation leaves the previous state untouched.
pub fn apply(state: &mut GameState, observation: &Observation) -> Result<(), WorldError> {
    validate(&state.grid, observation)?;

    state.grid.clear_contents();
    for deposit in &observation.resources {
        state.grid.set_resource(
            deposit.position(),
            Some(Resource {
                kind: deposit.kind,
                amount: deposit.amount,
            }),
        )?;
    }
    for road in &observation.roads {
        state.grid.set_road(road.position(), road.level)?;
    }

    let mut players = Vec::with_capacity(observation.players.len());
    for observed in &observation.players {
        let player = observed.to_player();
        for tile in player.city_tiles() {
            state.grid.set_city_tile(tile.position, Some(tile.clone()))?;
        }
        players.push(player);
    }

    state.turn = observation.turn;
    state.players = players;
    tracing::trace!(
        turn = state.turn,
        players = state.players.len(),
        "applied observation"
    );
    Ok(())
}

fn validate(grid: &Grid, observation: &Observation) -> Result<(), WorldError> {
    if observation.width != grid.width() || observation.height != grid.height() {
        return Err(WorldError::DimensionMismatch {
            width: grid.width(),
            height: grid.height(),
            found_width: observation.width,
            found_height: observation.height,
        });
    }

    let positions = observation
        .resources
        .iter()
        .map(ObservedResource::position)
        .chain(observation.roads.iter().map(ObservedRoad::position))
        .chain(observation.players.iter().flat_map(|player| {
            player
                .units
                .iter()
                .map(ObservedUnit::position)
                .chain(player.cities.iter().flat_map(|city| {
                    city.tiles.iter().map(ObservedCityTile::position)
                }))
        }));
    for position in positions {
        let _ = grid.cell_at(position)?;
    }

    let mut unit_ids = BTreeSet::new();
    let mut city_ids = BTreeSet::new();
    for player in &observation.players {
        for unit in &player.units {
            if !unit_ids.insert(&unit.id) {
                return Err(WorldError::DuplicateUnit(unit.id.clone()));
            }
        }
        for city in &player.cities {
            if !city_ids.insert(&city.id) {
                return Err(WorldError::DuplicateCity(city.id.clone()));
            }
        }
    }

    Ok(())
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use lux_agent_core::{Position, TeamId};

    use super::{Cell, GameState, Grid, Player};

    /// Turn number of the latest observation.
    #[must_use]
    pub fn turn(state: &GameState) -> u32 {
        state.turn
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(state: &GameState) -> &Grid {
        &state.grid
    }

    /// Every player in observation order.
    #[must_use]
    pub fn players(state: &GameState) -> &[Player] {
        &state.players
    }

    /// Player controlling `team`, if the observation contained it.
    #[must_use]
    pub fn player(state: &GameState, team: TeamId) -> Option<&Player> {
        state.players.iter().find(|player| player.team == team)
    }

    /// Cells holding a live deposit, in row-major order.
    pub fn resource_cells(state: &GameState) -> impl Iterator<Item = &Cell> {
        state.grid.cells().filter(|cell| cell.has_resource())
    }

    /// Cells holding a city tile owned by `team`, in row-major order.
    pub fn city_cells(state: &GameState, team: TeamId) -> impl Iterator<Item = &Cell> {
        state
            .grid
            .cells()
            .filter(move |cell| cell.city_tile().is_some_and(|tile| tile.team == team))
    }

    /// Reports whether a city tile of a team other than those in `allowed` sits on `position`.
    #[must_use]
    pub fn is_foreign_city(state: &GameState, position: Position, allowed: &[TeamId]) -> bool {
        state
            .grid
            .cell_at(position)
            .ok()
            .and_then(Cell::city_tile)
            .is_some_and(|tile| !allowed.contains(&tile.team))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wood(amount: u32) -> Option<Resource> {
        Some(Resource {
            kind: ResourceKind::Wood,
            amount,
        })
    }

    fn tile(team: u32, x: i32, y: i32) -> Option<CityTile> {
        Some(CityTile {
            team: TeamId::new(team),
            city_id: CityId::new("c_1"),
            position: Position::new(x, y),
            cooldown: 0.0,
        })
    }

    #[test]
    fn cell_at_rejects_out_of_bounds_positions() {
        let grid = Grid::new(3, 2);

        assert!(grid.cell_at(Position::new(2, 1)).is_ok());
        assert_eq!(
            grid.cell_at(Position::new(3, 0)),
            Err(GridError::OutOfBounds {
                position: Position::new(3, 0),
                width: 3,
                height: 2,
            })
        );
        assert!(grid.cell_at(Position::new(0, -1)).is_err());
        assert!(!grid.is_valid(Position::new(-1, 0)));
    }

    #[test]
    fn positions_iterate_row_major_and_restart() {
        let grid = Grid::new(2, 2);
        let expected = vec![
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(0, 1),
            Position::new(1, 1),
        ];

        assert_eq!(grid.positions().collect::<Vec<_>>(), expected);
        assert_eq!(grid.positions().collect::<Vec<_>>(), expected);
        assert_eq!(Grid::new(0, 3).positions().count(), 0);
    }

    #[test]
    fn has_resource_requires_positive_amount() {
        let mut grid = Grid::new(2, 1);
        grid.set_resource(Position::new(0, 0), wood(0)).unwrap();
        grid.set_resource(Position::new(1, 0), wood(20)).unwrap();

        assert!(!grid.cell_at(Position::new(0, 0)).unwrap().has_resource());
        assert!(grid.cell_at(Position::new(1, 0)).unwrap().has_resource());
    }

    #[test]
    fn plus_neighbors_skip_resources_cities_and_edges() {
        let mut grid = Grid::new(3, 3);
        grid.set_resource(Position::new(0, 1), wood(50)).unwrap();
        grid.set_city_tile(Position::new(1, 0), tile(1, 1, 0)).unwrap();

        let neighbors = grid.plus_neighbors(Position::new(1, 1));
        assert_eq!(neighbors, vec![Position::new(2, 1), Position::new(1, 2)]);

        let corner = grid.plus_neighbors(Position::new(0, 0));
        assert!(corner.is_empty());
    }

    #[test]
    fn depleted_deposits_do_not_block_building() {
        let mut grid = Grid::new(2, 1);
        grid.set_resource(Position::new(1, 0), wood(0)).unwrap();

        assert_eq!(grid.plus_neighbors(Position::new(0, 0)), vec![Position::new(1, 0)]);
    }

    #[test]
    fn clear_contents_keeps_dimensions() {
        let mut grid = Grid::new(2, 2);
        grid.set_resource(Position::new(1, 1), wood(10)).unwrap();
        grid.set_road(Position::new(0, 0), 2.0).unwrap();

        grid.clear_contents();

        assert_eq!((grid.width(), grid.height()), (2, 2));
        assert!(grid.cells().all(Cell::is_buildable));
        assert_eq!(grid.cell_at(Position::new(0, 0)).unwrap().road(), 0.0);
    }

    #[test]
    fn worker_needs_one_full_resource_stack_to_build() {
        let mut unit = Unit {
            id: UnitId::new("u_1"),
            team: TeamId::new(0),
            kind: UnitKind::Worker,
            position: Position::new(0, 0),
            cargo: Cargo::new(60, 40, 0),
            cooldown: 0.0,
        };
        assert!(!unit.has_enough_resource());
        assert_eq!(unit.cargo_space_left(), 0);

        unit.cargo = Cargo::new(0, 100, 0);
        assert!(unit.has_enough_resource());

        unit.kind = UnitKind::Cart;
        assert!(!unit.has_enough_resource());
        assert_eq!(unit.cargo_space_left(), 1_900);
    }

    #[test]
    fn research_gates_coal_and_uranium() {
        let mut player = Player::new(TeamId::new(0));
        assert!(player.researched(ResourceKind::Wood));
        assert!(!player.researched(ResourceKind::Coal));

        player.research_points = 50;
        assert!(player.researched(ResourceKind::Coal));
        assert!(!player.researched(ResourceKind::Uranium));

        player.research_points = 200;
        assert!(player.researched(ResourceKind::Uranium));
    }
}
