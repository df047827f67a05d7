use std::collections::HashMap;

use common::{OptionTally, PollTally};

/// Build a poll tally from per-option vote counts.
///
/// The poll's own option list drives the output, so options nobody picked
/// still appear with a zero count. Counts keyed by an index outside the
/// option list are left out of both the options and the total.
pub fn tally(poll_id: i32, labels: &[String], counts: &HashMap<i32, u64>) -> PollTally {
    let per_option: Vec<u64> = (0..labels.len())
        .map(|index| {
            i32::try_from(index)
                .ok()
                .and_then(|key| counts.get(&key).copied())
                .unwrap_or(0)
        })
        .collect();
    let total: u64 = per_option.iter().sum();

    let options = labels
        .iter()
        .zip(per_option)
        .enumerate()
        .map(|(option, (label, count))| OptionTally {
            option,
            label: label.clone(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    PollTally {
        poll_id,
        total_responses: total,
        options,
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
