//! Serde snapshot of a single turn as handed over by the host.

use std::collections::BTreeMap;

use lux_agent_core::{Cargo, CityId, Position, ResourceKind, TeamId, UnitId, UnitKind};
use serde::{Deserialize, Serialize};

use crate::{City, CityTile, Player, Unit};

/// Complete per-turn snapshot of the grid and every player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Turn number, starting at zero.
    #[serde(default)]
    pub turn: u32,
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Resource deposits on the grid.
    #[serde(default)]
    pub resources: Vec<ObservedResource>,
    /// Cells with a non-zero road level.
    #[serde(default)]
    pub roads: Vec<ObservedRoad>,
    /// Every player taking part in the game.
    #[serde(default)]
    pub players: Vec<ObservedPlayer>,
}

/// Deposit entry of an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedResource {
    /// Kind of resource.
    pub kind: ResourceKind,
    /// Column of the deposit.
    pub x: i32,
    /// Row of the deposit.
    pub y: i32,
    /// Remaining amount.
    pub amount: u32,
}

impl ObservedResource {
    /// Cell holding the deposit.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Road entry of an observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedRoad {
    /// Column of the road.
    pub x: i32,
    /// Row of the road.
    pub y: i32,
    /// Road level.
    pub level: f32,
}

impl ObservedRoad {
    /// Cell holding the road.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Player entry of an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedPlayer {
    /// Team identifier.
    pub team: TeamId,
    /// Accumulated research points.
    #[serde(default)]
    pub research_points: u32,
    /// Units in host order.
    #[serde(default)]
    pub units: Vec<ObservedUnit>,
    /// Cities in host order.
    #[serde(default)]
    pub cities: Vec<ObservedCity>,
}

impl ObservedPlayer {
    pub(crate) fn to_player(&self) -> Player {
        let units = self
            .units
            .iter()
            .map(|unit| Unit {
                id: unit.id.clone(),
                team: self.team,
                kind: unit.kind,
                position: unit.position(),
                cargo: unit.cargo,
                cooldown: unit.cooldown,
            })
            .collect();

        let cities: BTreeMap<CityId, City> = self
            .cities
            .iter()
            .map(|city| {
                let tiles = city
                    .tiles
                    .iter()
                    .map(|tile| CityTile {
                        team: self.team,
                        city_id: city.id.clone(),
                        position: tile.position(),
                        cooldown: tile.cooldown,
                    })
                    .collect();
                let city = City {
                    id: city.id.clone(),
                    team: self.team,
                    fuel: city.fuel,
                    light_upkeep: city.light_upkeep,
                    tiles,
                };
                (city.id.clone(), city)
            })
            .collect();

        Player {
            team: self.team,
            research_points: self.research_points,
            units,
            cities,
        }
    }
}

/// Unit entry of an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedUnit {
    /// Stable identifier assigned by the host.
    pub id: UnitId,
    /// Worker or cart.
    pub kind: UnitKind,
    /// Column of the unit.
    pub x: i32,
    /// Row of the unit.
    pub y: i32,
    /// Turns remaining before the unit may act.
    #[serde(default)]
    pub cooldown: f32,
    /// Carried resources.
    #[serde(default)]
    pub cargo: Cargo,
}

impl ObservedUnit {
    /// Cell occupied by the unit.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// City entry of an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedCity {
    /// Identifier assigned by the host.
    pub id: CityId,
    /// Aggregate fuel.
    #[serde(default)]
    pub fuel: f32,
    /// Fuel burnt per night turn.
    #[serde(default)]
    pub light_upkeep: f32,
    /// Member tiles.
    #[serde(default)]
    pub tiles: Vec<ObservedCityTile>,
}

/// City tile entry of an observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservedCityTile {
    /// Column of the tile.
    pub x: i32,
    /// Row of the tile.
    pub y: i32,
    /// Turns remaining before the tile may act.
    #[serde(default)]
    pub cooldown: f32,
}

impl ObservedCityTile {
    /// Cell occupied by the tile.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}
