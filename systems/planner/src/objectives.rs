//! Persistent per-unit targets that survive from one turn to the next.

use std::collections::{BTreeMap, BTreeSet};

use lux_agent_core::{Position, UnitId};

/// Remembers the target cell assigned to each unit.
///
/// Keys are stable unit identifiers so the store outlives the per-turn
/// snapshots. Targets are not validated on read; the planner re-checks them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectiveStore {
    targets: BTreeMap<UnitId, Position>,
}

impl ObjectiveStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target currently assigned to `unit`.
    #[must_use]
    pub fn get(&self, unit: &UnitId) -> Option<Position> {
        self.targets.get(unit).copied()
    }

    /// Assigns `target` to `unit`, replacing any previous target.
    pub fn set(&mut self, unit: UnitId, target: Position) {
        let _ = self.targets.insert(unit, target);
    }

    /// Removes the target of `unit`; does nothing when none is assigned.
    pub fn clear(&mut self, unit: &UnitId) -> Option<Position> {
        self.targets.remove(unit)
    }

    /// Drops every target whose unit is not in `alive`. Returns how many were dropped.
    pub fn retain_alive<'a, I>(&mut self, alive: I) -> usize
    where
        I: IntoIterator<Item = &'a UnitId>,
    {
        let alive: BTreeSet<&UnitId> = alive.into_iter().collect();
        let before = self.targets.len();
        self.targets.retain(|unit, _| alive.contains(unit));
        before - self.targets.len()
    }

    /// Number of units with a target.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Reports whether no unit has a target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Assigned targets in unit identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, Position)> {
        self.targets.iter().map(|(unit, target)| (unit, *target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear_round_trip() {
        let mut store = ObjectiveStore::new();
        let unit = UnitId::new("u_1");

        store.set(unit.clone(), Position::new(2, 3));
        assert_eq!(store.get(&unit), Some(Position::new(2, 3)));

        store.set(unit.clone(), Position::new(0, 1));
        assert_eq!(store.get(&unit), Some(Position::new(0, 1)));
        assert_eq!(store.len(), 1);

        assert_eq!(store.clear(&unit), Some(Position::new(0, 1)));
        assert_eq!(store.get(&unit), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clearing_a_missing_objective_is_a_no_op() {
        let mut store = ObjectiveStore::new();
        store.set(UnitId::new("u_1"), Position::new(1, 1));

        assert_eq!(store.clear(&UnitId::new("u_9")), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn retain_alive_drops_dead_units() {
        let mut store = ObjectiveStore::new();
        store.set(UnitId::new("u_1"), Position::new(0, 0));
        store.set(UnitId::new("u_2"), Position::new(1, 0));
        store.set(UnitId::new("u_3"), Position::new(2, 0));
        let alive = [UnitId::new("u_2")];

        assert_eq!(store.retain_alive(&alive), 2);
        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            vec![(&UnitId::new("u_2"), Position::new(1, 0))]
        );
    }
}
