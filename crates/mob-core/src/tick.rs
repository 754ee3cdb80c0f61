use crate::{rng, AgentId, SplitMix64};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    /// Stream RNG that is stable across ticks for a given `(agent, stream)` pair.
    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }

    /// Stream RNG that also folds the current tick in, for per-tick sampling
    /// decisions (probe dice, duration draws). Two agents with the same stream
    /// still draw independently.
    pub fn sampling_rng<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed, agent.stable_id(), stream ^ rng::mix64(self.tick));
        SplitMix64::new(seed)
    }
}
