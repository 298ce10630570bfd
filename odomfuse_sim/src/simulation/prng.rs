// odomfuse_sim/src/simulation/prng.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The single deterministic random source for a run. Every sensor draws from it in a
/// fixed order, so a seed reproduces a run exactly.
#[derive(Debug, Clone)]
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Picks the seed for a run: explicit seed first, then the scenario's, then a fresh one.
pub fn resolve_seed(cli_seed: Option<u64>, scenario_seed: Option<u64>) -> u64 {
    cli_seed.or(scenario_seed).unwrap_or_else(rand::random)
}
