#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn planner that assigns objectives to units and resolves their moves.
//!
//! A [`Session`] owns everything that outlives a single turn: the game state
//! built from observations, the [`ObjectiveStore`] and the validated
//! [`PlannerConfig`]. Each call to [`Session::play_turn`] walks the player's
//! units in snapshot order, claims next cells in a fresh [`ReservationSet`]
//! so units never plan into each other, then runs the production pass.

use lux_agent_core::{Action, ConfigError, PlannerConfig, TeamId};
use lux_agent_system_production::Production;
use lux_agent_world::{
    self as world, navigation::PathSearch, query, GameState, Observation, WorldError,
};
use thiserror::Error;

mod objectives;
pub mod ranking;
mod reservations;
mod turn;

pub use objectives::ObjectiveStore;
pub use reservations::ReservationSet;

use turn::TurnPlanner;

/// Counters describing the outcome of a planned turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// Workers that were off cooldown and went through the decision tree.
    pub units_considered: usize,
    /// Move actions emitted, including moves that keep a unit in place.
    pub moves: usize,
    /// City tiles founded.
    pub cities_built: usize,
    /// Workers ordered by the production pass.
    pub workers_produced: usize,
    /// Objectives still pending once the turn is planned.
    pub objectives_outstanding: usize,
}

/// Actions decided for a single turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnPlan {
    /// Turn number of the observation the plan answers.
    pub turn: u32,
    /// Actions in emission order.
    pub actions: Vec<Action>,
    /// Counters describing the plan.
    pub summary: TurnSummary,
}

/// Reasons a session cannot start or plan a turn.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The observation could not be applied.
    #[error(transparent)]
    World(#[from] WorldError),
    /// A turn was requested before any observation arrived.
    #[error("no observation has been applied yet")]
    NotObserved,
    /// The latest observation does not describe the session's team.
    #[error("team {0} is missing from the latest observation")]
    UnknownTeam(TeamId),
}

/// Planning state of one team across a whole game.
#[derive(Debug)]
pub struct Session {
    team: TeamId,
    config: PlannerConfig,
    state: Option<GameState>,
    objectives: ObjectiveStore,
    search: PathSearch,
}

impl Session {
    /// Starts a session for `team`, validating `config` once.
    pub fn new(team: TeamId, config: PlannerConfig) -> Result<Self, SessionError> {
        Ok(Self {
            team,
            config: config.validate()?,
            state: None,
            objectives: ObjectiveStore::new(),
            search: PathSearch::new(),
        })
    }

    /// Team the session plays for.
    #[must_use]
    pub const fn team(&self) -> TeamId {
        self.team
    }

    /// Validated configuration.
    #[must_use]
    pub const fn config(&self) -> PlannerConfig {
        self.config
    }

    /// Game state built from the observations so far.
    #[must_use]
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Objectives carried over between turns.
    #[must_use]
    pub fn objectives(&self) -> &ObjectiveStore {
        &self.objectives
    }

    /// Folds the next observation into the game state.
    ///
    /// The first observation fixes the grid dimensions for the rest of the game.
    pub fn observe(&mut self, observation: &Observation) -> Result<(), SessionError> {
        match &mut self.state {
            Some(state) => world::apply(state, observation)?,
            None => self.state = Some(GameState::from_observation(observation)?),
        }
        Ok(())
    }

    /// Plans the actions of every unit and city tile for the latest observation.
    pub fn play_turn(&mut self) -> Result<TurnPlan, SessionError> {
        let state = self.state.as_ref().ok_or(SessionError::NotObserved)?;
        let player =
            query::player(state, self.team).ok_or(SessionError::UnknownTeam(self.team))?;

        let dropped = self
            .objectives
            .retain_alive(player.units.iter().map(|unit| &unit.id));
        if dropped > 0 {
            tracing::debug!(dropped, "dropped objectives of lost units");
        }

        let mut actions = Vec::new();
        let mut summary = TurnSummary::default();
        TurnPlanner::new(
            state,
            player,
            self.config,
            &mut self.objectives,
            &mut self.search,
        )
        .plan_units(&mut actions, &mut summary);

        summary.workers_produced =
            Production::new(self.config.max_units).handle(player, &mut actions);
        summary.objectives_outstanding = self.objectives.len();

        let turn = query::turn(state);
        tracing::info!(
            turn,
            team = %self.team,
            actions = actions.len(),
            units = summary.units_considered,
            moves = summary.moves,
            cities_built = summary.cities_built,
            workers_produced = summary.workers_produced,
            objectives = summary.objectives_outstanding,
            "planned turn"
        );

        Ok(TurnPlan {
            turn,
            actions,
            summary,
        })
    }
}
