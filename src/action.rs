use thiserror::Error;
use crate::cache::ScheduleState;
use crate::model::entity::{Golfer, Score, Week};

pub type Index = usize;

/// Where a golfer sits within one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub group_index: Index,
    pub member_index: Index,
}

/// Exchanges the groups of two golfers in one week. Both groups keep their
/// size, so every swap maps a feasible schedule onto a feasible schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub week: Week,
    pub first: Golfer,
    pub second: Golfer,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid position: week {week}, golfer {golfer}")]
    InvalidPosition { week: Week, golfer: Golfer },
}

impl Swap {
    pub fn new(week: Week, first: Golfer, second: Golfer) -> Swap {
        Swap { week, first, second }
    }

    /// Applies the swap and returns the change of the objective. Applying the
    /// same swap a second time undoes it.
    pub fn apply(&self, state: &mut ScheduleState) -> Result<Score, ActionError> {
        state.apply_swap(self.week, self.first, self.second)
    }
}
