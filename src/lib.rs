//! Simulated annealing for the Social Golfer Problem: schedule golfers into
//! equal-size groups week after week so that as few pairs as possible meet
//! more than once.

pub mod action;
pub mod anneal;
pub mod cache;
pub mod construct;
pub mod incumbent;
pub mod io;
pub mod model;
pub mod neighborhood;
pub mod portfolio;

pub use anneal::{solve, Annealer, Outcome, SearchParams, Termination};
pub use cache::{Incumbent, ScheduleState};
pub use model::instance::{Instance, InvalidInstance};
pub use portfolio::solve_parallel;
