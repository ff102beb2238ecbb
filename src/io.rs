use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::SplitWhitespace;

use itertools::Itertools;
use thiserror::Error;

use crate::cache::Incumbent;
use crate::model::entity::{Golfer, Score};
use crate::model::instance::{Instance, InvalidInstance};
use crate::model::schedule::{Assignment, PartitionError};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("expected {expected} but the input ended")]
    MissingToken { expected: &'static str },
    #[error("expected {expected}, found `{token}`")]
    MalformedToken { expected: &'static str, token: String },
    #[error("invalid instance: {0}")]
    Instance(#[from] InvalidInstance),
    #[error("expected {expected} group lines, found {found}")]
    GroupLines { expected: usize, found: usize },
    #[error("infeasible schedule: {0}")]
    Partition(#[from] PartitionError),
}

fn next_number<T: std::str::FromStr>(tokens: &mut SplitWhitespace<'_>, expected: &'static str) -> Result<T, ReadError> {
    let token = tokens.next().ok_or(ReadError::MissingToken { expected })?;
    token.parse().map_err(|_| ReadError::MalformedToken { expected, token: token.to_string() })
}

/// Reads the first three integers of `text`; anything after them is ignored.
pub fn parse_instance(text: &str) -> Result<Instance, ReadError> {
    let mut tokens = text.split_whitespace();
    let nb_groups = next_number(&mut tokens, "the number of groups")?;
    let group_size = next_number(&mut tokens, "the group size")?;
    let nb_weeks = next_number(&mut tokens, "the number of weeks")?;
    Ok(Instance::new(nb_groups, group_size, nb_weeks)?)
}

pub fn read_instance(path: impl AsRef<Path>) -> Result<Instance, ReadError> {
    parse_instance(&fs::read_to_string(path)?)
}

pub fn write_solution<W: Write>(mut writer: W, incumbent: &Incumbent) -> io::Result<()> {
    let assignment = &incumbent.assignment;
    writeln!(writer, "{}", incumbent.objective)?;
    for week in 0..assignment.instance().nb_weeks() {
        for group in assignment.groups(week) {
            writeln!(writer, "{}", group.iter().sorted().join(" "))?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

pub fn save_solution(path: impl AsRef<Path>, incumbent: &Incumbent) -> io::Result<()> {
    write_solution(io::BufWriter::new(fs::File::create(path)?), incumbent)
}

/// Parses a written solution back into its reported objective and schedule.
pub fn parse_solution(text: &str, instance: &Instance) -> Result<(Score, Assignment), ReadError> {
    let mut lines = text.lines();
    let objective = next_number(&mut lines.next().unwrap_or("").split_whitespace(), "the objective")?;
    let groups = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|token| token.parse::<Golfer>()
                    .map_err(|_| ReadError::MalformedToken { expected: "a golfer", token: token.to_string() }))
                .collect::<Result<Vec<Golfer>, ReadError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    let expected = instance.nb_weeks() * instance.nb_groups();
    if groups.len() != expected {
        return Err(ReadError::GroupLines { expected, found: groups.len() });
    }
    let weeks = groups.chunks(instance.nb_groups()).map(<[Vec<Golfer>]>::to_vec).collect();
    Ok((objective, Assignment::from_weeks(*instance, weeks)?))
}

/// Result of checking a written solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub reported: Score,
    /// `None` if the groups do not form a feasible schedule.
    pub computed: Option<Score>,
}

impl Verification {
    /// Feasible, and the first line matches the recount.
    pub fn is_consistent(&self) -> bool {
        self.computed == Some(self.reported)
    }

    /// Consistent, and no pair of golfers meets twice.
    pub fn is_valid(&self) -> bool {
        self.is_consistent() && self.computed == Some(0)
    }
}

pub fn verify_solution(text: &str, instance: &Instance) -> Result<Verification, ReadError> {
    match parse_solution(text, instance) {
        Ok((reported, assignment)) => Ok(Verification { reported, computed: Some(assignment.objective()) }),
        Err(ReadError::Partition(_)) | Err(ReadError::GroupLines { .. }) => {
            let reported = next_number(&mut text.lines().next().unwrap_or("").split_whitespace(), "the objective")?;
            Ok(Verification { reported, computed: None })
        }
        Err(err) => Err(err),
    }
}


#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::{parse_instance, parse_solution, verify_solution, write_solution, ReadError};
    use crate::cache::{Incumbent, ScheduleState};
    use crate::construct::random_assignment;
    use crate::model::instance::{Instance, InvalidInstance};
    use crate::model::schedule::Assignment;

    fn written(incumbent: &Incumbent) -> String {
        let mut buffer = Vec::new();
        write_solution(&mut buffer, incumbent).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn reads_three_integers() {
        let instance = parse_instance("5 4\n9\n").unwrap();
        assert_eq!(instance, Instance::new(5, 4, 9).unwrap());
        assert_eq!(parse_instance("2 2 1 trailing").unwrap(), Instance::new(2, 2, 1).unwrap());
    }

    #[test]
    fn rejects_missing_and_malformed_tokens() {
        assert!(matches!(parse_instance("5 4"), Err(ReadError::MissingToken { .. })));
        assert!(matches!(parse_instance(""), Err(ReadError::MissingToken { .. })));
        assert!(matches!(
            parse_instance("5 four 9"),
            Err(ReadError::MalformedToken { ref token, .. }) if token == "four"
        ));
        assert!(matches!(parse_instance("5 -4 9"), Err(ReadError::MalformedToken { .. })));
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(parse_instance("0 4 9"), Err(ReadError::Instance(InvalidInstance::ZeroGroups))));
        assert!(matches!(parse_instance("5 4 0"), Err(ReadError::Instance(InvalidInstance::ZeroWeeks))));
    }

    #[test]
    fn writes_one_line_per_group() {
        let instance = Instance::new(2, 2, 2).unwrap();
        let weeks = vec![
            vec![vec![1, 0], vec![3, 2]],
            vec![vec![0, 2], vec![3, 1]],
        ];
        let assignment = Assignment::from_weeks(instance, weeks).unwrap();
        let incumbent = Incumbent { objective: assignment.objective(), assignment };
        assert_eq!(written(&incumbent), "0\n0 1\n2 3\n\n0 2\n1 3\n\n");
    }

    #[test]
    fn written_solution_reads_back() {
        let instance = Instance::new(5, 4, 9).unwrap();
        let mut rng = SmallRng::seed_from_u64(12);
        let incumbent = ScheduleState::new(random_assignment(&instance, &mut rng)).into_incumbent();
        let text = written(&incumbent);
        let (objective, assignment) = parse_solution(&text, &instance).unwrap();
        assert_eq!(objective, incumbent.objective);
        assert_eq!(assignment.objective(), objective);
        let verification = verify_solution(&text, &instance).unwrap();
        assert!(verification.is_consistent());
        // repeated pairs make a consistent schedule invalid
        assert!(objective > 0);
        assert!(!verification.is_valid());
    }

    #[test]
    fn only_repeat_free_schedules_are_valid() {
        let instance = Instance::new(2, 2, 2).unwrap();
        let repeat_free = verify_solution("0\n0 1\n2 3\n\n0 2\n1 3\n\n", &instance).unwrap();
        assert!(repeat_free.is_consistent());
        assert!(repeat_free.is_valid());

        let repeated = verify_solution("2\n0 1\n2 3\n\n0 1\n2 3\n\n", &instance).unwrap();
        assert_eq!(repeated.computed, Some(2));
        assert!(repeated.is_consistent());
        assert!(!repeated.is_valid());
    }

    #[test]
    fn verification_catches_bad_solutions() {
        let instance = Instance::new(2, 2, 1).unwrap();
        let wrong_objective = verify_solution("3\n0 1\n2 3\n\n", &instance).unwrap();
        assert_eq!(wrong_objective.computed, Some(0));
        assert!(!wrong_objective.is_consistent());
        assert!(!wrong_objective.is_valid());

        let duplicate = verify_solution("0\n0 1\n1 3\n\n", &instance).unwrap();
        assert_eq!(duplicate.computed, None);
        assert!(!duplicate.is_valid());

        let short = verify_solution("0\n0 1\n\n", &instance).unwrap();
        assert!(!short.is_valid());

        assert!(matches!(verify_solution("zero\n0 1\n2 3\n", &instance), Err(ReadError::MalformedToken { .. })));
    }
}
