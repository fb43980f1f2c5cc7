//! Nearest-cell and poorest-city selection helpers.
//!
//! "Nearest" always means Euclidean distance between cell centres; among
//! equally near candidates the first one yielded wins.

use std::collections::BTreeSet;

use lux_agent_core::{Position, TeamId};
use lux_agent_world::{query, Cell, City, CityTile, GameState, Player, Unit};

/// Anything that occupies a single grid cell.
pub trait HasPosition {
    /// Cell occupied by the value.
    fn position(&self) -> Position;
}

impl HasPosition for Position {
    fn position(&self) -> Position {
        *self
    }
}

impl HasPosition for Cell {
    fn position(&self) -> Position {
        Cell::position(self)
    }
}

impl HasPosition for Unit {
    fn position(&self) -> Position {
        self.position
    }
}

impl HasPosition for CityTile {
    fn position(&self) -> Position {
        self.position
    }
}

impl<T: HasPosition + ?Sized> HasPosition for &T {
    fn position(&self) -> Position {
        (**self).position()
    }
}

/// Candidate nearest to `origin`; the earliest candidate wins ties.
pub fn closest<I>(origin: Position, candidates: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: HasPosition,
{
    let mut best: Option<(f64, I::Item)> = None;
    for candidate in candidates {
        let distance = origin.distance_to(candidate.position());
        let improves = best
            .as_ref()
            .map_or(true, |(best_distance, _)| distance < *best_distance);
        if improves {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Nearest live deposit `player` has the research to mine.
///
/// Cells for which `is_claimed` returns true are skipped.
pub fn nearest_resource<'a, F>(
    state: &'a GameState,
    player: &Player,
    origin: Position,
    mut is_claimed: F,
) -> Option<&'a Cell>
where
    F: FnMut(Position) -> bool,
{
    closest(
        origin,
        query::resource_cells(state).filter(|cell| {
            cell.resource()
                .is_some_and(|resource| player.researched(resource.kind))
                && !is_claimed(cell.position())
        }),
    )
}

/// Cell on which a unit standing at `origin` should found the next city tile.
///
/// Prefers free cells bordering the team's existing city tiles, scanned in
/// row-major order of those tiles. Falls back to the first free neighbour of
/// `origin` when the team has no such cell. Cells for which `is_claimed`
/// returns true are skipped in both passes.
pub fn next_city_site<F>(
    state: &GameState,
    team: TeamId,
    origin: Position,
    mut is_claimed: F,
) -> Option<Position>
where
    F: FnMut(Position) -> bool,
{
    let grid = query::grid(state);
    let mut seen = BTreeSet::new();
    let candidates: Vec<Position> = query::city_cells(state, team)
        .flat_map(|cell| grid.plus_neighbors(cell.position()))
        .filter(|candidate| seen.insert(*candidate) && !is_claimed(*candidate))
        .collect();

    closest(origin, candidates).or_else(|| {
        grid.plus_neighbors(origin)
            .into_iter()
            .find(|candidate| !is_claimed(*candidate))
    })
}

/// City with the least fuel; the lowest identifier wins ties.
#[must_use]
pub fn poorest_city(player: &Player) -> Option<&City> {
    player.cities.values().fold(None, |poorest, city| match poorest {
        Some(current) if current.fuel <= city.fuel => Some(current),
        _ => Some(city),
    })
}

/// Tile of the poorest city nearest to `origin`.
#[must_use]
pub fn closest_poorest_city_tile(player: &Player, origin: Position) -> Option<&CityTile> {
    poorest_city(player).and_then(|city| closest(origin, &city.tiles))
}

#[cfg(test)]
mod tests {
    use lux_agent_core::CityId;

    use super::*;

    fn city(id: &str, fuel: f32, tiles: &[(i32, i32)]) -> City {
        let id = CityId::new(id);
        City {
            id: id.clone(),
            team: TeamId::new(0),
            fuel,
            light_upkeep: 0.0,
            tiles: tiles
                .iter()
                .map(|&(x, y)| CityTile {
                    team: TeamId::new(0),
                    city_id: id.clone(),
                    position: Position::new(x, y),
                    cooldown: 0.0,
                })
                .collect(),
        }
    }

    fn player_with(cities: Vec<City>) -> Player {
        let mut player = Player::new(TeamId::new(0));
        for city in cities {
            let _ = player.cities.insert(city.id.clone(), city);
        }
        player
    }

    #[test]
    fn closest_keeps_the_first_of_equal_candidates() {
        let origin = Position::new(1, 1);
        let candidates = [
            Position::new(0, 1),
            Position::new(2, 1),
            Position::new(1, 0),
        ];

        assert_eq!(closest(origin, candidates), Some(Position::new(0, 1)));
        assert_eq!(closest(origin, Vec::<Position>::new()), None);
    }

    #[test]
    fn closest_uses_euclidean_distance() {
        let origin = Position::new(0, 0);
        // Manhattan ties at 4; Euclidean prefers the diagonal.
        let candidates = [Position::new(4, 0), Position::new(2, 2)];

        assert_eq!(closest(origin, &candidates), Some(&Position::new(2, 2)));
    }

    #[test]
    fn poorest_city_prefers_lowest_fuel_then_lowest_id() {
        let player = player_with(vec![
            city("c_3", 10.0, &[(0, 0)]),
            city("c_1", 50.0, &[(1, 0)]),
            city("c_2", 10.0, &[(2, 0)]),
        ]);

        let poorest = poorest_city(&player).expect("player has cities");
        assert_eq!(poorest.id, CityId::new("c_2"));
        assert!(poorest_city(&Player::new(TeamId::new(1))).is_none());
    }

    #[test]
    fn closest_poorest_city_tile_ignores_nearer_rich_cities() {
        let player = player_with(vec![
            city("c_1", 50.0, &[(1, 0)]),
            city("c_2", 10.0, &[(5, 0), (4, 0)]),
        ]);

        let tile = closest_poorest_city_tile(&player, Position::new(0, 0)).expect("tile exists");
        assert_eq!(tile.position, Position::new(4, 0));
    }
}
