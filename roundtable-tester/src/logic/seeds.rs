use anyhow::{Result, bail};
use chrono::Utc;
use std::collections::HashSet;

/// Seed used when nothing usable was requested.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into concrete seeds.
///
/// Supports literal integers (negative values use their magnitude) and the
/// keyword `now`, which seeds from the current wall-clock time so repeated
/// runs explore fresh deals. Duplicates are dropped, first occurrence wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let seed = if token.eq_ignore_ascii_case("now") {
            Utc::now().timestamp_millis().unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}

/// Seed for one iteration of a scenario.
#[must_use]
pub fn iteration_seed(base: u64, iteration: usize) -> u64 {
    base.wrapping_add(u64::try_from(iteration).unwrap_or(u64::MAX))
}
