use rand::Rng;

use crate::action::Swap;
use crate::model::instance::Instance;
use crate::model::schedule::Assignment;

/// Samples swaps between golfers of different groups.
#[derive(Debug, Clone)]
pub struct SwapGenerator {
    nb_weeks: usize,
    nb_groups: usize,
    group_size: usize,
    nb_golfers: usize,
}

impl SwapGenerator {
    /// `None` when there is a single group, since then no swap can change
    /// anything.
    pub fn new(instance: &Instance) -> Option<SwapGenerator> {
        if instance.nb_groups() < 2 {
            return None;
        }
        Some(SwapGenerator {
            nb_weeks: instance.nb_weeks(),
            nb_groups: instance.nb_groups(),
            group_size: instance.group_size(),
            nb_golfers: instance.nb_golfers(),
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, assignment: &Assignment, rng: &mut R) -> Swap {
        let week = rng.gen_range(0..self.nb_weeks);
        let group = rng.gen_range(0..self.nb_groups);
        let first = assignment.group(week, group)[rng.gen_range(0..self.group_size)];
        // any slot of the week outside `group`
        let mut slot = rng.gen_range(0..self.nb_golfers - self.group_size);
        if slot >= group * self.group_size {
            slot += self.group_size;
        }
        let second = assignment.week(week)[slot];
        Swap { week, first, second }
    }
}
