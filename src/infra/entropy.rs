//! Default entropy source for the master seed.

use std::env;

/// Environment variable consulted when no explicit seed is configured.
pub const SEED_ENV: &str = "MATRIX_STRESS_SEED";

/// Returns `seed` unless it is `0`, in which case the default source is used.
/// 除非 `seed` 为 `0`，否则原样返回；为 `0` 时使用默认熵源。
pub fn resolve_seed(seed: u64) -> u64 {
    if seed == 0 { default_seed() } else { seed }
}

/// `MATRIX_STRESS_SEED` if it holds a non-zero integer (negative values are
/// taken as their two's complement), otherwise fresh random entropy.
pub fn default_seed() -> u64 {
    env::var(SEED_ENV)
        .ok()
        .and_then(|raw| parse_seed(&raw))
        .filter(|seed| *seed != 0)
        .unwrap_or_else(random_seed)
}

pub fn parse_seed(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<i64>().ok().map(|s| s as u64))
}

fn random_seed() -> u64 {
    loop {
        let seed = rand::random::<u64>();
        if seed != 0 {
            return seed;
        }
    }
}
