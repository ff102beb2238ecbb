//! Simulated annealing over swap moves.

use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::cache::{Incumbent, ScheduleState};
use crate::construct::random_assignment;
use crate::incumbent::SharedIncumbent;
use crate::model::entity::Score;
use crate::model::instance::Instance;
use crate::neighborhood::SwapGenerator;


#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub time_limit: Duration,
    pub max_iterations: Option<u64>,
    pub initial_temperature: f64,
    pub final_temperature: f64,
    /// Iterations without a new incumbent before starting over from a random
    /// schedule. `None` disables restarts.
    pub restart_after: Option<u64>,
    /// The clock is read once every this many iterations.
    pub clock_check_interval: u64,
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            time_limit: Duration::from_secs(10),
            max_iterations: None,
            initial_temperature: 2.0,
            final_temperature: 0.05,
            restart_after: None,
            clock_check_interval: 64,
            seed: None,
        }
    }
}

impl SearchParams {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_temperatures(mut self, initial: f64, last: f64) -> Self {
        self.initial_temperature = initial;
        self.final_temperature = last;
        self
    }

    pub fn with_restart_after(mut self, iterations: u64) -> Self {
        self.restart_after = Some(iterations);
        self
    }

    pub fn with_clock_check_interval(mut self, interval: u64) -> Self {
        self.clock_check_interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Share of the budget spent, in `[0, 1]`.
    fn progress(&self, elapsed: Duration, iterations: u64) -> f64 {
        let by_time = if self.time_limit.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / self.time_limit.as_secs_f64()
        };
        let by_iterations = match self.max_iterations {
            Some(0) => 1.0,
            Some(max) => iterations as f64 / max as f64,
            None => 0.0,
        };
        by_time.max(by_iterations).clamp(0.0, 1.0)
    }

    /// Non-increasing in `progress`; zero once the budget is spent.
    pub fn temperature_at(&self, progress: f64) -> f64 {
        if progress >= 1.0 {
            return 0.0;
        }
        let start = self.initial_temperature.max(0.0);
        let end = self.final_temperature.clamp(0.0, start);
        if start == 0.0 {
            return 0.0;
        }
        if end == 0.0 {
            return start * (1.0 - progress);
        }
        start * (end / start).powf(progress)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructing,
    Searching,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    TimeLimit,
    IterationLimit,
    /// The lower bound of the instance was reached, here or by another worker.
    Optimal,
    /// A single group per week leaves nothing to move.
    NoMoves,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub iterations: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub improvements: u64,
    pub restarts: u64,
    pub elapsed: Duration,
    /// `(iteration, objective)` for every new incumbent, starting with the
    /// constructed schedule.
    pub trace: Vec<(u64, Score)>,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub incumbent: Incumbent,
    pub termination: Termination,
    pub stats: SearchStats,
}

struct State {
    schedule: ScheduleState,
    n_iterations: u64,
    temperature: f64,
    since_improvement: u64,
    unpublished: bool,
}

pub struct Annealer {
    params: SearchParams,
    rng: SmallRng,
    phase: Phase,
}

impl Annealer {
    pub fn new(params: SearchParams) -> Annealer {
        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Annealer { params, rng, phase: Phase::Constructing }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&mut self, instance: &Instance) -> Outcome {
        self.run_from(instance, Instant::now(), None)
    }

    /// Runs with the budget counted from `started`, publishing incumbents to
    /// `shared` if given.
    pub fn run_from(&mut self, instance: &Instance, started: Instant, shared: Option<&SharedIncumbent>) -> Outcome {
        self.phase = Phase::Constructing;
        let schedule = ScheduleState::new(random_assignment(instance, &mut self.rng));
        info!("{}: initial schedule with {} redundant meetings", instance, schedule.objective());
        let mut stats = SearchStats { trace: vec![(0, schedule.objective())], ..SearchStats::default() };
        let mut state = State {
            temperature: self.params.temperature_at(0.0),
            schedule,
            n_iterations: 0,
            since_improvement: 0,
            unpublished: true,
        };
        let generator = SwapGenerator::new(instance);
        let interval = self.params.clock_check_interval.max(1);
        let bound = instance.lower_bound();

        self.phase = Phase::Searching;
        let termination = loop {
            if state.n_iterations % interval == 0 {
                if let Some(shared) = shared {
                    if state.unpublished {
                        shared.try_install(state.schedule.incumbent());
                        state.unpublished = false;
                    }
                    if shared.objective() <= bound {
                        break Termination::Optimal;
                    }
                }
            }
            let Some(generator) = generator.as_ref() else {
                break Termination::NoMoves;
            };
            if state.schedule.incumbent().objective <= bound {
                break Termination::Optimal;
            }
            if self.params.max_iterations.is_some_and(|max| state.n_iterations >= max) {
                break Termination::IterationLimit;
            }
            if state.n_iterations % interval == 0 {
                let elapsed = started.elapsed();
                if elapsed >= self.params.time_limit {
                    break Termination::TimeLimit;
                }
                state.temperature = self.params.temperature_at(self.params.progress(elapsed, state.n_iterations));
            }

            let swap = generator.sample(state.schedule.assignment(), &mut self.rng);
            let delta = state.schedule.swap(swap.week, swap.first, swap.second);
            state.n_iterations += 1;

            if self.accepts(delta, state.temperature) {
                stats.accepted += 1;
                if delta < 0 && state.schedule.snapshot_if_best() {
                    record_improvement(&mut state, &mut stats);
                    continue;
                }
            } else {
                state.schedule.swap(swap.week, swap.first, swap.second);
                stats.rejected += 1;
            }

            state.since_improvement += 1;
            if self.params.restart_after.is_some_and(|limit| state.since_improvement >= limit) {
                stats.restarts += 1;
                if self.restart(instance, &mut state) {
                    record_improvement(&mut state, &mut stats);
                }
            }
        };

        self.phase = Phase::Terminated;
        debug_assert!(state.schedule.is_consistent(), "incremental objective diverged from recount");
        if let Some(shared) = shared {
            shared.try_install(state.schedule.incumbent());
        }
        stats.iterations = state.n_iterations;
        stats.elapsed = started.elapsed();
        info!(
            "{}: stopped ({:?}) after {} iterations in {:.2?}, best {} redundant meetings",
            instance, termination, stats.iterations, stats.elapsed, state.schedule.incumbent().objective,
        );
        Outcome { incumbent: state.schedule.into_incumbent(), termination, stats }
    }

    fn restart(&mut self, instance: &Instance, state: &mut State) -> bool {
        self.phase = Phase::Constructing;
        let improved = state.schedule.restart(random_assignment(instance, &mut self.rng));
        debug!(
            "iteration {}: restarting from {} redundant meetings, incumbent {}",
            state.n_iterations, state.schedule.objective(), state.schedule.incumbent().objective,
        );
        state.since_improvement = 0;
        self.phase = Phase::Searching;
        improved
    }

    fn accepts(&mut self, delta: Score, temperature: f64) -> bool {
        if delta <= 0 {
            return true;
        }
        if temperature <= 0.0 {
            return false;
        }
        let probability = (-(delta as f64) / temperature).exp();
        trace!("worsening move {} accepted with probability {:.4}", delta, probability);
        self.rng.gen::<f64>() < probability
    }
}

fn record_improvement(state: &mut State, stats: &mut SearchStats) {
    let objective = state.schedule.objective();
    debug!("iteration {}: new incumbent {} (T = {:.4})", state.n_iterations, objective, state.temperature);
    stats.improvements += 1;
    stats.trace.push((state.n_iterations, objective));
    state.since_improvement = 0;
    state.unpublished = true;
}

/// Anneals `instance` once on the current thread.
pub fn solve(instance: &Instance, params: SearchParams) -> Outcome {
    Annealer::new(params).run(instance)
}
