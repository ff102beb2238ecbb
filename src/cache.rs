use crate::action::{ActionError, Position};
use crate::model::entity::{Golfer, Score, Week};
use crate::model::instance::Instance;
use crate::model::meeting::MeetingCount;
use crate::model::schedule::Assignment;


/// Best schedule recorded so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    pub assignment: Assignment,
    pub objective: Score,
}

/// A schedule under search together with its meeting counts and objective,
/// which are kept up to date move by move.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    assignment: Assignment,
    locations: Vec<Position>,
    meetings: MeetingCount,
    objective: Score,
    best: Incumbent,
}

fn locate(assignment: &Assignment) -> Vec<Position> {
    let instance = assignment.instance();
    let n = instance.nb_golfers();
    let mut locations = vec![Position { group_index: 0, member_index: 0 }; instance.nb_weeks() * n];
    for week in 0..instance.nb_weeks() {
        for (group_index, group) in assignment.groups(week).enumerate() {
            for (member_index, golfer) in group.iter().enumerate() {
                locations[week * n + golfer] = Position { group_index, member_index };
            }
        }
    }
    locations
}

impl ScheduleState {
    pub fn new(assignment: Assignment) -> ScheduleState {
        let locations = locate(&assignment);
        let meetings = assignment.meeting_counts();
        let objective = meetings.redundant();
        let best = Incumbent { assignment: assignment.clone(), objective };
        ScheduleState { assignment, locations, meetings, objective, best }
    }

    /// Replaces the current schedule with a fresh one. The incumbent is kept
    /// and only replaced if the fresh schedule beats it, in which case `true`
    /// is returned.
    pub fn restart(&mut self, assignment: Assignment) -> bool {
        debug_assert_eq!(assignment.instance(), self.assignment.instance());
        self.locations = locate(&assignment);
        self.meetings = assignment.meeting_counts();
        self.objective = self.meetings.redundant();
        self.assignment = assignment;
        self.snapshot_if_best()
    }

    pub fn instance(&self) -> &Instance {
        self.assignment.instance()
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn meetings(&self) -> &MeetingCount {
        &self.meetings
    }

    pub fn objective(&self) -> Score {
        self.objective
    }

    pub fn position(&self, week: Week, golfer: Golfer) -> Option<Position> {
        let instance = self.instance();
        if week >= instance.nb_weeks() || golfer >= instance.nb_golfers() {
            return None;
        }
        Some(self.locations[week * instance.nb_golfers() + golfer])
    }

    /// Swaps the groups of `a` and `b` in `week` and returns the objective
    /// delta. Golfers already sharing a group leave the state untouched.
    pub fn apply_swap(&mut self, week: Week, a: Golfer, b: Golfer) -> Result<Score, ActionError> {
        for golfer in [a, b] {
            if self.position(week, golfer).is_none() {
                return Err(ActionError::InvalidPosition { week, golfer });
            }
        }
        Ok(self.swap(week, a, b))
    }

    /// Reverts `apply_swap(week, a, b)`.
    pub fn undo_swap(&mut self, week: Week, a: Golfer, b: Golfer) -> Result<Score, ActionError> {
        self.apply_swap(week, a, b)
    }

    /// Index-unchecked swap for moves produced by the neighborhood.
    pub(crate) fn swap(&mut self, week: Week, a: Golfer, b: Golfer) -> Score {
        let n = self.assignment.instance().nb_golfers();
        let size = self.assignment.instance().group_size();
        let pos_a = self.locations[week * n + a];
        let pos_b = self.locations[week * n + b];
        if pos_a.group_index == pos_b.group_index {
            return 0;
        }

        let start_a = week * n + pos_a.group_index * size;
        let start_b = week * n + pos_b.group_index * size;
        let slots = &mut self.assignment.slots;
        let meetings = &mut self.meetings;
        let mut delta = 0;
        for i in (0..size).filter(|i| *i != pos_a.member_index) {
            let mate = slots[start_a + i];
            delta += meetings.part(a, mate) + meetings.meet(b, mate);
        }
        for i in (0..size).filter(|i| *i != pos_b.member_index) {
            let mate = slots[start_b + i];
            delta += meetings.part(b, mate) + meetings.meet(a, mate);
        }
        slots.swap(start_a + pos_a.member_index, start_b + pos_b.member_index);
        self.locations[week * n + a] = pos_b;
        self.locations[week * n + b] = pos_a;
        self.objective += delta;
        delta
    }

    /// Records the current schedule as incumbent if it is strictly better.
    pub fn snapshot_if_best(&mut self) -> bool {
        if self.objective < self.best.objective {
            self.best.assignment.clone_from(&self.assignment);
            self.best.objective = self.objective;
            true
        } else {
            false
        }
    }

    pub fn incumbent(&self) -> &Incumbent {
        &self.best
    }

    pub fn into_incumbent(self) -> Incumbent {
        self.best
    }

    /// Compares the incrementally maintained counts with a full recount.
    pub fn is_consistent(&self) -> bool {
        let meetings = self.assignment.meeting_counts();
        let objective = meetings.redundant();
        self.assignment.is_partition()
            && meetings == self.meetings
            && objective == self.objective
            && locate(&self.assignment) == self.locations
            && self.best.assignment.objective() == self.best.objective
    }
}


#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::ScheduleState;
    use crate::action::{ActionError, Swap};
    use crate::construct::random_assignment;
    use crate::model::instance::Instance;
    use crate::model::schedule::Assignment;

    fn fixed_state() -> ScheduleState {
        let instance = Instance::new(2, 2, 2).unwrap();
        let weeks = vec![
            vec![vec![0, 1], vec![2, 3]],
            vec![vec![0, 2], vec![1, 3]],
        ];
        ScheduleState::new(Assignment::from_weeks(instance, weeks).unwrap())
    }

    #[test]
    fn swap_updates_objective_incrementally() {
        let mut state = fixed_state();
        assert_eq!(state.objective(), 0);
        // week 1 becomes {0, 1} {2, 3}, repeating both pairs of week 0
        let delta = state.apply_swap(1, 1, 2).unwrap();
        assert_eq!(delta, 2);
        assert_eq!(state.objective(), 2);
        assert_eq!(state.assignment().group(1, 0), &[0, 1]);
        assert_eq!(state.meetings().get(0, 1), 2);
        assert_eq!(state.meetings().get(3, 2), 2);
        assert_eq!(state.meetings().get(0, 2), 0);
        assert!(state.is_consistent());
    }

    #[test]
    fn swap_within_group_is_a_no_op() {
        let mut state = fixed_state();
        let before = state.assignment().clone();
        assert_eq!(state.apply_swap(0, 0, 1), Ok(0));
        assert_eq!(state.assignment(), &before);
    }

    #[test]
    fn swap_rejects_out_of_range_indices() {
        let mut state = fixed_state();
        assert_eq!(state.apply_swap(2, 0, 1), Err(ActionError::InvalidPosition { week: 2, golfer: 0 }));
        assert_eq!(state.apply_swap(0, 0, 4), Err(ActionError::InvalidPosition { week: 0, golfer: 4 }));
    }

    #[test]
    fn swap_is_an_involution() {
        let instance = Instance::new(5, 4, 9).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut state = ScheduleState::new(random_assignment(&instance, &mut rng));
        for _ in 0..200 {
            let before = state.assignment().clone();
            let objective = state.objective();
            let swap = Swap::new(rng.gen_range(0..9), rng.gen_range(0..20), rng.gen_range(0..20));
            let delta = swap.apply(&mut state).unwrap();
            let undo = state.undo_swap(swap.week, swap.first, swap.second).unwrap();
            assert_eq!(delta, -undo);
            assert_eq!(state.assignment(), &before);
            assert_eq!(state.objective(), objective);
        }
        assert!(state.is_consistent());
    }

    #[test]
    fn random_walk_stays_consistent() {
        let instance = Instance::new(4, 3, 6).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut state = ScheduleState::new(random_assignment(&instance, &mut rng));
        for step in 0..2_000 {
            let week = rng.gen_range(0..instance.nb_weeks());
            let a = rng.gen_range(0..instance.nb_golfers());
            let b = rng.gen_range(0..instance.nb_golfers());
            state.apply_swap(week, a, b).unwrap();
            if step % 100 == 0 {
                assert!(state.is_consistent());
                assert!(state.assignment().is_partition());
            }
        }
        assert!(state.is_consistent());
        assert_eq!(state.objective(), state.assignment().objective());
    }

    #[test]
    fn snapshot_keeps_strictly_better_schedules_only() {
        let mut state = fixed_state();
        state.apply_swap(1, 1, 2).unwrap();
        assert!(!state.snapshot_if_best());
        assert_eq!(state.incumbent().objective, 0);
        state.apply_swap(1, 1, 2).unwrap();
        assert!(!state.snapshot_if_best());

        state.apply_swap(1, 1, 2).unwrap();
        let worse = state.assignment().clone();
        let mut restarted = ScheduleState::new(worse);
        assert_eq!(restarted.incumbent().objective, 2);
        restarted.apply_swap(1, 1, 2).unwrap();
        assert!(restarted.snapshot_if_best());
        assert_eq!(restarted.incumbent().objective, 0);
        assert_eq!(restarted.incumbent().assignment, *restarted.assignment());
    }

    #[test]
    fn restart_keeps_the_incumbent() {
        let instance = Instance::new(1, 3, 2).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut state = ScheduleState::new(random_assignment(&instance, &mut rng));
        // one group per week: every pair meets in both weeks
        assert_eq!(state.objective(), 3);
        assert!(!state.restart(random_assignment(&instance, &mut rng)));
        assert_eq!(state.incumbent().objective, 3);
        assert!(state.is_consistent());
    }
}
