use std::panic;
use std::thread;
use std::time::Instant;

use log::info;

use crate::anneal::{Annealer, Outcome, SearchParams};
use crate::incumbent::SharedIncumbent;
use crate::model::instance::Instance;

/// Runs `threads` independent annealers with consecutive seeds under one
/// shared deadline and returns the outcome of the worker that found the best
/// schedule. Workers stop early once any of them reaches an objective of zero.
pub fn solve_parallel(instance: &Instance, params: &SearchParams, threads: usize) -> Outcome {
    let threads = threads.max(1);
    let started = Instant::now();
    let base_seed = params.seed.unwrap_or_else(rand::random);
    let worker_params = |worker: usize| params.clone().with_seed(base_seed.wrapping_add(worker as u64));
    if threads == 1 {
        return Annealer::new(worker_params(0)).run_from(instance, started, None);
    }

    info!("{}: starting {} workers from seed {}", instance, threads, base_seed);
    let shared = SharedIncumbent::new();
    let (first, others) = thread::scope(|scope| {
        let handles: Vec<_> = (1..threads)
            .map(|worker| {
                let params = worker_params(worker);
                let shared = &shared;
                scope.spawn(move || Annealer::new(params).run_from(instance, started, Some(shared)))
            })
            .collect();
        let first = Annealer::new(worker_params(0)).run_from(instance, started, Some(&shared));
        let others: Vec<Outcome> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect();
        (first, others)
    });

    let mut iterations = first.stats.iterations;
    let mut best = first;
    for outcome in others {
        iterations += outcome.stats.iterations;
        if outcome.incumbent.objective < best.incumbent.objective {
            best = outcome;
        }
    }
    debug_assert_eq!(shared.objective(), best.incumbent.objective);
    info!(
        "{}: {} workers ran {} iterations in total, best {} redundant meetings",
        instance, threads, iterations, best.incumbent.objective,
    );
    best
}
