#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Production pass that orders idle city tiles to train workers.

use lux_agent_core::Action;
use lux_agent_world::Player;

/// Pure system deciding which city tiles produce a worker this turn.
///
/// A tile produces only while the player has more city tiles than units and
/// the forecast unit count stays below the configured ceiling. Tiles that do
/// not produce stay idle; research is not ordered.
#[derive(Clone, Copy, Debug)]
pub struct Production {
    max_units: usize,
}

impl Production {
    /// Creates a production pass that stops once `max_units` units are forecast.
    #[must_use]
    pub const fn new(max_units: usize) -> Self {
        Self { max_units }
    }

    /// Emits [`Action::BuildWorker`] for every eligible tile of `player`.
    ///
    /// Cities are visited in identifier order and tiles in snapshot order.
    /// Returns the number of workers ordered.
    pub fn handle(&self, player: &Player, out: &mut Vec<Action>) -> usize {
        let tile_count = player.city_tile_count();
        let unit_count = player.units.len();
        let mut unit_forecast = unit_count;
        let mut ordered = 0;

        for tile in player.city_tiles() {
            if !tile.can_act() {
                continue;
            }
            if tile_count <= unit_count || unit_forecast >= self.max_units {
                continue;
            }

            out.push(Action::BuildWorker {
                position: tile.position,
            });
            unit_forecast += 1;
            ordered += 1;
            tracing::debug!(
                city = %tile.city_id,
                position = %tile.position,
                unit_forecast,
                "ordered worker"
            );
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use lux_agent_core::{Cargo, CityId, Position, TeamId, UnitId, UnitKind};
    use lux_agent_world::{City, CityTile, Unit};

    use super::*;

    fn player(tiles: &[(i32, i32, f32)], units: usize) -> Player {
        let team = TeamId::new(0);
        let mut player = Player::new(team);
        let id = CityId::new("c_1");
        let tiles = tiles
            .iter()
            .map(|&(x, y, cooldown)| CityTile {
                team,
                city_id: id.clone(),
                position: Position::new(x, y),
                cooldown,
            })
            .collect();
        let _ = player.cities.insert(
            id.clone(),
            City {
                id,
                team,
                fuel: 0.0,
                light_upkeep: 0.0,
                tiles,
            },
        );
        player.units = (0..units)
            .map(|index| Unit {
                id: UnitId::new(format!("u_{index}")),
                team,
                kind: UnitKind::Worker,
                position: Position::new(0, 0),
                cargo: Cargo::default(),
                cooldown: 0.0,
            })
            .collect();
        player
    }

    #[test]
    fn stops_at_unit_ceiling() {
        let player = player(&[(0, 0, 0.0), (1, 0, 0.0), (2, 0, 0.0)], 0);
        let mut out = Vec::new();

        let ordered = Production::new(2).handle(&player, &mut out);

        assert_eq!(ordered, 2);
        assert_eq!(
            out,
            vec![
                Action::BuildWorker {
                    position: Position::new(0, 0)
                },
                Action::BuildWorker {
                    position: Position::new(1, 0)
                },
            ]
        );
    }

    #[test]
    fn requires_more_tiles_than_units() {
        let player = player(&[(0, 0, 0.0)], 1);
        let mut out = Vec::new();

        assert_eq!(Production::new(5).handle(&player, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn skips_tiles_on_cooldown() {
        let player = player(&[(0, 0, 1.0), (1, 0, 0.5)], 0);
        let mut out = Vec::new();

        let _ = Production::new(5).handle(&player, &mut out);

        assert_eq!(
            out,
            vec![Action::BuildWorker {
                position: Position::new(1, 0)
            }]
        );
    }
}
