//! # Simulation Runs
//!
//! Long random runs with invariant checks after every block, and the
//! determinism check: the same seed must produce the same state.

#[cfg(test)]
mod tests {
    use crate::simulation::{simulate, SimConfig};
    use qc_18_peggy::PeggyQuery;

    #[test]
    fn test_full_simulation_keeps_invariants() {
        let chain = simulate(SimConfig::new(7));

        // The run must have exercised the interesting paths.
        assert!(chain.stats.delivered > 0);
        assert!(chain.stats.observed > 0, "no attestation was ever observed");
        assert!(chain.stats.batches_created > 0);
        assert!(chain.stats.batches_finalized > 0);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        for seed in [1u64, 42, 1_000_003] {
            let mut config = SimConfig::new(seed);
            config.blocks = config.blocks.min(100);

            let first = simulate(config.clone());
            let second = simulate(config);
            assert_eq!(first.stats, second.stats, "seed {seed}: stats differ");
            assert_eq!(first.store.dump(), second.store.dump(), "seed {seed}: state differs");
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SimConfig::new(3);
        a.blocks = 30;
        let mut b = SimConfig::new(4);
        b.blocks = 30;
        assert_ne!(simulate(a).store.dump(), simulate(b).store.dump());
    }

    #[test]
    fn test_byzantine_tampering_is_recorded() {
        let mut config = SimConfig::new(11);
        config.blocks = config.blocks.max(150);
        let chain = simulate(config);

        // Tampered votes never win: voucher supply tracks honest deposits,
        // which check_invariants asserted every block. The evidence log
        // catches tampered votes cast after the honest payload was observed.
        for evidence in chain.service.fork_evidence() {
            assert_eq!(evidence.validator, chain.validators[0].validator);
        }
    }
}
