//! Per-turn ledger of the cell each unit will occupy after its move.

use std::collections::{BTreeMap, HashSet};

use lux_agent_core::{Position, UnitId};
use lux_agent_world::Unit;

/// Planned next position of every unit for the turn being planned.
///
/// Seeded with the current position of every unit so units that have not
/// been planned yet still block their cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationSet {
    planned: BTreeMap<UnitId, Position>,
}

impl ReservationSet {
    /// Creates a set holding the current position of each unit.
    #[must_use]
    pub fn seeded<'a, I>(units: I) -> Self
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        let planned = units
            .into_iter()
            .map(|unit| (unit.id.clone(), unit.position))
            .collect();
        Self { planned }
    }

    /// Records `position` as the cell `unit` occupies once the turn resolves.
    pub fn reserve(&mut self, unit: &UnitId, position: Position) {
        let _ = self.planned.insert(unit.clone(), position);
    }

    /// Cell `unit` is expected to occupy after this turn.
    #[must_use]
    pub fn planned(&self, unit: &UnitId) -> Option<Position> {
        self.planned.get(unit).copied()
    }

    /// Reports whether a unit other than `unit` has claimed `position`.
    #[must_use]
    pub fn claimed_by_other(&self, position: Position, unit: &UnitId) -> bool {
        self.planned
            .iter()
            .any(|(owner, planned)| *planned == position && owner != unit)
    }

    /// Cells claimed by every unit except `unit`, collected once for repeated lookups.
    #[must_use]
    pub fn claims_of_others(&self, unit: &UnitId) -> HashSet<Position> {
        self.planned
            .iter()
            .filter(|(owner, _)| *owner != unit)
            .map(|(_, position)| *position)
            .collect()
    }

    /// Every reservation in unit identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, Position)> {
        self.planned.iter().map(|(unit, position)| (unit, *position))
    }
}
