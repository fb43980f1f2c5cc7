//! Per-unit decision tree run once per turn.

use std::collections::HashSet;

use lux_agent_core::{Action, Direction, PlannerConfig, Position, TeamId};
use lux_agent_world::{navigation::PathSearch, query, Cell, GameState, Player, Unit};

use crate::{ranking, ObjectiveStore, ReservationSet, TurnSummary};

/// Which city tiles a unit may walk through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObstaclePolicy {
    /// Every city tile blocks.
    AvoidCities,
    /// Tiles of the given team are passable, all others block.
    EnterOwnCities(TeamId),
}

impl ObstaclePolicy {
    fn allowed_teams(&self) -> &[TeamId] {
        match self {
            Self::AvoidCities => &[],
            Self::EnterOwnCities(team) => std::slice::from_ref(team),
        }
    }
}

/// Borrowed planning context for a single turn.
pub(crate) struct TurnPlanner<'a> {
    state: &'a GameState,
    player: &'a Player,
    config: PlannerConfig,
    objectives: &'a mut ObjectiveStore,
    search: &'a mut PathSearch,
    reservations: ReservationSet,
    city_tile_forecast: usize,
}

impl<'a> TurnPlanner<'a> {
    pub(crate) fn new(
        state: &'a GameState,
        player: &'a Player,
        config: PlannerConfig,
        objectives: &'a mut ObjectiveStore,
        search: &'a mut PathSearch,
    ) -> Self {
        Self {
            state,
            player,
            config,
            objectives,
            search,
            reservations: ReservationSet::seeded(&player.units),
            city_tile_forecast: player.city_tile_count(),
        }
    }

    /// Plans every acting worker in snapshot order.
    pub(crate) fn plan_units(&mut self, out: &mut Vec<Action>, summary: &mut TurnSummary) {
        let player = self.player;
        for unit in &player.units {
            if !unit.is_worker() || !unit.can_act() {
                continue;
            }
            summary.units_considered += 1;
            self.plan_unit(unit, out, summary);
        }
    }

    fn plan_unit(&mut self, unit: &Unit, out: &mut Vec<Action>, summary: &mut TurnSummary) {
        let may_build =
            self.city_tile_forecast < self.config.max_cities && unit.has_enough_resource();
        let mut objective = self.current_objective(unit);

        if objective.is_none() && may_build {
            let claimed = self.build_site_claims(unit);
            objective = ranking::next_city_site(
                self.state,
                self.player.team,
                unit.position,
                |site| claimed.contains(&site),
            );
            if let Some(site) = objective {
                self.objectives.set(unit.id.clone(), site);
                tracing::debug!(unit = %unit.id, %site, "assigned build objective");
            }
        }

        match objective {
            Some(site) if may_build => {
                self.city_tile_forecast += 1;
                out.push(Action::Annotate { position: site });
                if site == unit.position {
                    out.push(Action::BuildCity {
                        unit: unit.id.clone(),
                    });
                    let _ = self.objectives.clear(&unit.id);
                    summary.cities_built += 1;
                    tracing::debug!(unit = %unit.id, %site, "building city tile");
                } else {
                    self.move_toward(unit, site, ObstaclePolicy::AvoidCities, out);
                    summary.moves += 1;
                }
            }
            _ if unit.cargo_space_left() > 0 => {
                let claimed = self.reservations.claims_of_others(&unit.id);
                let deposit = ranking::nearest_resource(
                    self.state,
                    self.player,
                    unit.position,
                    |position| position != unit.position && claimed.contains(&position),
                )
                .map(|cell| cell.position());
                let Some(deposit) = deposit else {
                    tracing::debug!(unit = %unit.id, "no permissible deposit");
                    return;
                };
                self.move_toward(unit, deposit, ObstaclePolicy::AvoidCities, out);
                summary.moves += 1;
            }
            _ => {
                let Some(tile) = ranking::closest_poorest_city_tile(self.player, unit.position)
                else {
                    return;
                };
                let target = tile.position;
                self.move_toward(
                    unit,
                    target,
                    ObstaclePolicy::EnterOwnCities(self.player.team),
                    out,
                );
                summary.moves += 1;
            }
        }
    }

    /// Stored objective of `unit`, dropping it when the target is no longer buildable.
    fn current_objective(&mut self, unit: &Unit) -> Option<Position> {
        let target = self.objectives.get(&unit.id)?;
        let buildable = query::grid(self.state)
            .cell_at(target)
            .is_ok_and(Cell::is_buildable);
        if buildable {
            return Some(target);
        }

        let _ = self.objectives.clear(&unit.id);
        tracing::debug!(unit = %unit.id, %target, "dropped stale objective");
        None
    }

    /// Cells another unit will stand on or has already picked as its build site.
    fn build_site_claims(&self, unit: &Unit) -> HashSet<Position> {
        let mut claimed = self.reservations.claims_of_others(&unit.id);
        claimed.extend(
            self.objectives
                .iter()
                .filter(|(owner, _)| *owner != &unit.id)
                .map(|(_, target)| target),
        );
        claimed
    }

    /// Steps `unit` toward `target` and reserves the cell it lands on.
    ///
    /// The goal is always enterable during the search, so a step onto a goal
    /// another unit has claimed is downgraded to staying put.
    fn move_toward(
        &mut self,
        unit: &Unit,
        target: Position,
        policy: ObstaclePolicy,
        out: &mut Vec<Action>,
    ) {
        let state = self.state;
        let claimed = self.reservations.claims_of_others(&unit.id);
        let allowed = policy.allowed_teams();
        let mut direction =
            self.search
                .next_step(query::grid(state), unit.position, target, |position| {
                    query::is_foreign_city(state, position, allowed) || claimed.contains(&position)
                });
        if claimed.contains(&unit.position.translate(direction)) {
            tracing::debug!(unit = %unit.id, %target, "goal already claimed, holding position");
            direction = Direction::Center;
        }

        self.reservations
            .reserve(&unit.id, unit.position.translate(direction));
        tracing::debug!(unit = %unit.id, %target, %direction, "planned move");
        out.push(Action::Move {
            unit: unit.id.clone(),
            direction,
        });
    }
}
