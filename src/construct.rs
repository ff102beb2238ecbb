use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::entity::Golfer;
use crate::model::instance::Instance;
use crate::model::schedule::Assignment;

/// Shuffles all golfers independently for every week; consecutive chunks of
/// `group_size` golfers of a week form its groups.
pub fn random_assignment<R: Rng + ?Sized>(instance: &Instance, rng: &mut R) -> Assignment {
    let mut golfers: Vec<Golfer> = (0..instance.nb_golfers()).collect();
    let mut slots = Vec::with_capacity(instance.nb_weeks() * instance.nb_golfers());
    for _ in 0..instance.nb_weeks() {
        golfers.shuffle(rng);
        slots.extend_from_slice(&golfers);
    }
    Assignment::from_slots(*instance, slots)
}
