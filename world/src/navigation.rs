//! Breadth-first path search that turns a start/goal pair into a single step.

use std::collections::VecDeque;

use lux_agent_core::{Direction, Position};

use crate::Grid;

const NO_PARENT: usize = usize::MAX;

/// Reusable breadth-first search over a grid-sized traversability matrix.
///
/// The search is obstacle-policy agnostic: callers describe forbidden cells
/// through a predicate. Every call rebuilds the matrix from scratch; only the
/// buffers are kept between calls to avoid reallocating them for every unit.
#[derive(Clone, Debug, Default)]
pub struct PathSearch {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
    parents: Vec<usize>,
    queue: VecDeque<usize>,
}

impl PathSearch {
    /// Creates a search with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First step of a shortest path from `start` to `goal`.
    ///
    /// Returns [`Direction::Center`] when the unit is already at the goal,
    /// when the goal cannot be reached, or when either end lies off the grid.
    /// Staying put is an expected outcome, not an error.
    pub fn next_step<F>(
        &mut self,
        grid: &Grid,
        start: Position,
        goal: Position,
        is_forbidden: F,
    ) -> Direction
    where
        F: FnMut(Position) -> bool,
    {
        if start == goal {
            return Direction::Center;
        }

        let direction = match self.path(grid, start, goal, is_forbidden) {
            Some(path) if path.len() >= 2 => Direction::between(path[0], path[1]),
            _ => Direction::Center,
        };
        tracing::trace!(%start, %goal, %direction, "path search resolved step");
        direction
    }

    /// Shortest path from `start` to `goal`, both ends included.
    ///
    /// Neighbours are expanded in `+x, -x, +y, -y` order, which fixes the
    /// tie-break between equally short paths. The start cell is always
    /// passable and the goal always enterable, whatever `is_forbidden` says.
    pub fn path<F>(
        &mut self,
        grid: &Grid,
        start: Position,
        goal: Position,
        mut is_forbidden: F,
    ) -> Option<Vec<Position>>
    where
        F: FnMut(Position) -> bool,
    {
        if !grid.is_valid(start) || !grid.is_valid(goal) {
            return None;
        }

        self.rebuild(grid, &mut is_forbidden);
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;
        self.blocked[start_index] = false;
        self.blocked[goal_index] = false;

        self.parents[start_index] = start_index;
        self.queue.push_back(start_index);

        while let Some(current_index) = self.queue.pop_front() {
            if current_index == goal_index {
                return Some(self.reconstruct(start_index, goal_index));
            }

            let current = self.position(current_index)?;
            for neighbor in grid.cardinal_neighbors(current) {
                let Some(neighbor_index) = self.index(neighbor) else {
                    continue;
                };

                if self.blocked[neighbor_index] || self.parents[neighbor_index] != NO_PARENT {
                    continue;
                }

                self.parents[neighbor_index] = current_index;
                self.queue.push_back(neighbor_index);
            }
        }

        None
    }

    fn rebuild<F>(&mut self, grid: &Grid, is_forbidden: &mut F)
    where
        F: FnMut(Position) -> bool,
    {
        self.width = grid.width();
        self.height = grid.height();

        self.blocked.clear();
        self.blocked
            .extend(grid.positions().map(|position| is_forbidden(position)));

        self.parents.clear();
        self.parents.resize(self.blocked.len(), NO_PARENT);
        self.queue.clear();
    }

    fn reconstruct(&self, start_index: usize, goal_index: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cursor = goal_index;
        while cursor != start_index {
            if let Some(position) = self.position(cursor) {
                path.push(position);
            }
            cursor = self.parents[cursor];
        }
        if let Some(position) = self.position(start_index) {
            path.push(position);
        }
        path.reverse();
        path
    }

    fn index(&self, position: Position) -> Option<usize> {
        let column = usize::try_from(position.x()).ok()?;
        let row = usize::try_from(position.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        if column >= width || row >= height {
            return None;
        }
        row.checked_mul(width)?.checked_add(column)
    }

    fn position(&self, index: usize) -> Option<Position> {
        let width = usize::try_from(self.width).ok()?;
        if width == 0 {
            return None;
        }
        let column = i32::try_from(index % width).ok()?;
        let row = i32::try_from(index / width).ok()?;
        Some(Position::new(column, row))
    }
}

/// Convenience wrapper running a one-off [`PathSearch::next_step`].
pub fn next_step<F>(grid: &Grid, start: Position, goal: Position, is_forbidden: F) -> Direction
where
    F: FnMut(Position) -> bool,
{
    PathSearch::new().next_step(grid, start, goal, is_forbidden)
}
