//! Expands a profile selection and round count into the run queue.

use super::types::QueueEntry;

/// Upper bound for rounds in a single run.
pub const MAX_ROUNDS: u32 = 100;

/// Clamp a requested round count into `[1, max]`.
///
/// Anything below 1 coerces to 1.
pub fn clamp_rounds(requested: i64, max: u32) -> u32 {
    let max = max.clamp(1, MAX_ROUNDS);
    if requested < 1 {
        1
    } else {
        requested.min(max as i64) as u32
    }
}

/// Build the queue for a run.
///
/// Produces `rounds x profiles` pending entries, round-major: every selected
/// profile for round 1, then every profile for round 2, and so on. Returns an
/// empty queue when nothing was selected; callers treat that as a request
/// error. Profile names are not checked here.
pub fn build_queue(selected_profiles: &[String], rounds: u32) -> Vec<QueueEntry> {
    if selected_profiles.is_empty() {
        return Vec::new();
    }

    let rounds = rounds.clamp(1, MAX_ROUNDS);
    let mut queue = Vec::with_capacity(selected_profiles.len() * rounds as usize);
    for round in 1..=rounds {
        for name in selected_profiles {
            queue.push(QueueEntry::new(name.clone(), round));
        }
    }
    queue
}
