pub mod entity {
    pub type Golfer = usize;
    pub type GroupId = usize;
    pub type Week = usize;

    /// Redundant-meeting count, and the signed change of it caused by a move.
    pub type Score = i64;
}


pub mod instance {
    use std::fmt;
    use thiserror::Error;
    use super::entity::Score;

    #[derive(Debug, Clone, Error, PartialEq, Eq)]
    pub enum InvalidInstance {
        #[error("number of groups must be at least 1")]
        ZeroGroups,
        #[error("group size must be at least 1")]
        ZeroGroupSize,
        #[error("number of weeks must be at least 1")]
        ZeroWeeks,
        #[error("{nb_groups} groups of {group_size} golfers over {nb_weeks} weeks is too large")]
        TooLarge { nb_groups: usize, group_size: usize, nb_weeks: usize },
    }

    /// Parameters of a Social Golfer instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Instance {
        nb_groups: usize,
        group_size: usize,
        nb_weeks: usize,
        nb_golfers: usize,
    }

    impl Instance {
        pub fn new(nb_groups: usize, group_size: usize, nb_weeks: usize) -> Result<Instance, InvalidInstance> {
            if nb_groups == 0 {
                return Err(InvalidInstance::ZeroGroups);
            }
            if group_size == 0 {
                return Err(InvalidInstance::ZeroGroupSize);
            }
            if nb_weeks == 0 {
                return Err(InvalidInstance::ZeroWeeks);
            }
            // the meeting matrix is nb_golfers^2 and the schedule nb_weeks * nb_golfers
            let nb_golfers = nb_groups.checked_mul(group_size)
                .filter(|n| n.checked_mul(*n).is_some() && n.checked_mul(nb_weeks).is_some())
                .ok_or(InvalidInstance::TooLarge { nb_groups, group_size, nb_weeks })?;
            Ok(Instance { nb_groups, group_size, nb_weeks, nb_golfers })
        }

        pub fn nb_groups(&self) -> usize {
            self.nb_groups
        }

        pub fn group_size(&self) -> usize {
            self.group_size
        }

        pub fn nb_weeks(&self) -> usize {
            self.nb_weeks
        }

        pub fn nb_golfers(&self) -> usize {
            self.nb_golfers
        }

        /// No schedule has fewer redundant meetings: each golfer meets
        /// `nb_weeks * (group_size - 1)` partners but only `nb_golfers - 1`
        /// of them can be distinct.
        pub fn lower_bound(&self) -> Score {
            let meetings = self.nb_weeks as u128 * (self.group_size as u128 - 1);
            let excess = meetings.saturating_sub(self.nb_golfers as u128 - 1);
            let bound = (self.nb_golfers as u128 * excess).div_ceil(2);
            Score::try_from(bound).unwrap_or(Score::MAX)
        }
    }

    impl fmt::Display for Instance {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}-{}-{}", self.nb_groups, self.group_size, self.nb_weeks)
        }
    }
}


pub mod meeting {
    use itertools::Itertools;
    use super::entity::{Golfer, Score};

    /// Symmetric matrix of how many weeks each pair of golfers shared a group.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MeetingCount {
        nb_golfers: usize,
        counts: Vec<u32>,
    }

    impl MeetingCount {
        pub fn new(nb_golfers: usize) -> MeetingCount {
            MeetingCount { nb_golfers, counts: vec![0; nb_golfers * nb_golfers] }
        }

        pub fn get(&self, a: Golfer, b: Golfer) -> u32 {
            self.counts[a * self.nb_golfers + b]
        }

        fn set(&mut self, a: Golfer, b: Golfer, count: u32) {
            self.counts[a * self.nb_golfers + b] = count;
            self.counts[b * self.nb_golfers + a] = count;
        }

        /// Records one more meeting of `a` and `b` and returns the change of
        /// the redundant-meeting total.
        pub fn meet(&mut self, a: Golfer, b: Golfer) -> Score {
            let count = self.get(a, b);
            self.set(a, b, count + 1);
            if count >= 1 { 1 } else { 0 }
        }

        /// Forgets one meeting of `a` and `b` and returns the change of the
        /// redundant-meeting total.
        pub fn part(&mut self, a: Golfer, b: Golfer) -> Score {
            let count = self.get(a, b);
            debug_assert!(count > 0, "golfers {} and {} never met", a, b);
            self.set(a, b, count.saturating_sub(1));
            if count >= 2 { -1 } else { 0 }
        }

        pub fn redundant(&self) -> Score {
            (0..self.nb_golfers).tuple_combinations()
                .map(|(a, b)| Score::from(self.get(a, b).saturating_sub(1)))
                .sum()
        }
    }
}


pub mod schedule {
    use std::collections::HashSet;
    use std::slice::Chunks;
    use itertools::Itertools;
    use thiserror::Error;

    use super::entity::{Golfer, GroupId, Score, Week};
    use super::instance::Instance;
    use super::meeting::MeetingCount;

    #[derive(Debug, Clone, Error, PartialEq, Eq)]
    pub enum PartitionError {
        #[error("expected {expected} weeks, found {found}")]
        WeekCount { expected: usize, found: usize },
        #[error("week {week}: expected {expected} groups, found {found}")]
        GroupCount { week: Week, expected: usize, found: usize },
        #[error("week {week}, group {group}: expected {expected} golfers, found {found}")]
        GroupSize { week: Week, group: GroupId, expected: usize, found: usize },
        #[error("week {week}: golfer {golfer} does not exist")]
        UnknownGolfer { week: Week, golfer: Golfer },
        #[error("week {week}: golfer {golfer} plays more than once")]
        DuplicateGolfer { week: Week, golfer: Golfer },
    }

    /// Groups of every week, stored week after week and group after group,
    /// so `slots[(week * nb_groups + group) * group_size + i]` is the i-th
    /// member of `group` in `week`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Assignment {
        instance: Instance,
        pub(crate) slots: Vec<Golfer>,
    }

    impl Assignment {
        pub(crate) fn from_slots(instance: Instance, slots: Vec<Golfer>) -> Assignment {
            debug_assert_eq!(slots.len(), instance.nb_weeks() * instance.nb_golfers());
            Assignment { instance, slots }
        }

        /// Builds an assignment from explicit groups, checking that every week
        /// is a partition of all golfers into groups of the right size.
        pub fn from_weeks(instance: Instance, weeks: Vec<Vec<Vec<Golfer>>>) -> Result<Assignment, PartitionError> {
            if weeks.len() != instance.nb_weeks() {
                return Err(PartitionError::WeekCount { expected: instance.nb_weeks(), found: weeks.len() });
            }
            let mut slots = Vec::with_capacity(instance.nb_weeks() * instance.nb_golfers());
            for (week, groups) in weeks.into_iter().enumerate() {
                if groups.len() != instance.nb_groups() {
                    return Err(PartitionError::GroupCount { week, expected: instance.nb_groups(), found: groups.len() });
                }
                let mut seen = HashSet::with_capacity(instance.nb_golfers());
                for (group, members) in groups.into_iter().enumerate() {
                    if members.len() != instance.group_size() {
                        return Err(PartitionError::GroupSize {
                            week, group, expected: instance.group_size(), found: members.len(),
                        });
                    }
                    for golfer in members {
                        if golfer >= instance.nb_golfers() {
                            return Err(PartitionError::UnknownGolfer { week, golfer });
                        }
                        if !seen.insert(golfer) {
                            return Err(PartitionError::DuplicateGolfer { week, golfer });
                        }
                        slots.push(golfer);
                    }
                }
            }
            Ok(Assignment { instance, slots })
        }

        pub fn instance(&self) -> &Instance {
            &self.instance
        }

        /// All golfers of `week`, group after group.
        pub fn week(&self, week: Week) -> &[Golfer] {
            let n = self.instance.nb_golfers();
            &self.slots[week * n..(week + 1) * n]
        }

        pub fn groups(&self, week: Week) -> Chunks<'_, Golfer> {
            self.week(week).chunks(self.instance.group_size())
        }

        pub fn group(&self, week: Week, group: GroupId) -> &[Golfer] {
            let size = self.instance.group_size();
            &self.week(week)[group * size..(group + 1) * size]
        }

        pub fn group_of(&self, week: Week, golfer: Golfer) -> Option<GroupId> {
            self.week(week).iter()
                .position(|g| *g == golfer)
                .map(|slot| slot / self.instance.group_size())
        }

        pub fn to_weeks(&self) -> Vec<Vec<Vec<Golfer>>> {
            (0..self.instance.nb_weeks())
                .map(|week| self.groups(week).map(<[Golfer]>::to_vec).collect())
                .collect()
        }

        /// Every week covers each golfer exactly once.
        pub fn is_partition(&self) -> bool {
            let n = self.instance.nb_golfers();
            self.slots.len() == n * self.instance.nb_weeks()
                && (0..self.instance.nb_weeks()).all(|week| {
                    let mut seen = vec![false; n];
                    self.week(week).iter().all(|&golfer| {
                        golfer < n && !std::mem::replace(&mut seen[golfer], true)
                    })
                })
        }

        /// Counts meetings by scanning every group of every week.
        pub fn meeting_counts(&self) -> MeetingCount {
            let mut meetings = MeetingCount::new(self.instance.nb_golfers());
            for week in 0..self.instance.nb_weeks() {
                for group in self.groups(week) {
                    for (a, b) in group.iter().tuple_combinations() {
                        meetings.meet(*a, *b);
                    }
                }
            }
            meetings
        }

        pub fn objective(&self) -> Score {
            self.meeting_counts().redundant()
        }
    }
}
