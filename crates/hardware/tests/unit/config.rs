//! # Configuration Tests
//!
//! Defaults, partial JSON documents and validation of every constraint the
//! core depends on.

use rstest::rstest;
use rvsched_core::common::{ConfigError, SimError};
use rvsched_core::config::*;

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn default_core_sizes() {
    let config = Config::default();
    assert_eq!(config.core.arch_regs, 32);
    assert_eq!(config.core.phys_regs, 64);
    assert_eq!(config.core.rob_size, 32);
    assert_eq!(config.core.rs_size, 16);
    assert_eq!(config.core.age_max, 15);
    assert_eq!(config.core.recovery_hold_cycles, 2);
    assert_eq!(config.core.exception_vector, 0x100);
}

#[test]
fn default_units_and_predictor() {
    let config = Config::default();
    assert_eq!(config.general.start_pc, 0x1000);
    assert!(!config.general.trace_instructions);
    assert_eq!(config.units.alu_latency, 1);
    assert_eq!(config.units.alu_capacity, 4);
    assert_eq!(config.units.bru_latency, 1);
    assert_eq!(config.units.bru_capacity, 2);
    assert_eq!(config.units.lsu_latency, 3);
    assert_eq!(config.units.memory_size, 64 * 1024);
    assert_eq!(config.predictor.kind, BranchPredictor::Static);
    assert_eq!(config.predictor.btb_size, 256);
    assert_eq!(config.predictor.bimodal_size, 1024);
}

#[test]
fn default_config_is_valid() {
    assert_eq!(Config::default().validate(), Ok(()));
}

// ══════════════════════════════════════════════════════════
// 2. JSON parsing
// ══════════════════════════════════════════════════════════

#[test]
fn partial_json_keeps_other_defaults() {
    let config = Config::from_json(r#"{ "core": { "rob_size": 8 } }"#).unwrap();
    assert_eq!(config.core.rob_size, 8);
    assert_eq!(config.core.rs_size, 16, "unspecified fields keep their defaults");
    assert_eq!(config.units.lsu_latency, 3);
}

#[test]
fn empty_document_is_default() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.core.phys_regs, 64);
    assert_eq!(config.general.max_cycles, Config::default().general.max_cycles);
}

#[test]
fn predictor_kind_parses() {
    let config = Config::from_json(r#"{ "predictor": { "kind": "Bimodal" } }"#).unwrap();
    assert_eq!(config.predictor.kind, BranchPredictor::Bimodal);
}

#[test]
fn malformed_json_is_reported() {
    let err = Config::from_json(r#"{ "core": { "rob_size": "big" } }"#).unwrap_err();
    assert!(matches!(err, SimError::Json { what: "config", .. }), "got {err:?}");
}

#[test]
fn invalid_values_are_rejected_on_parse() {
    let err = Config::from_json(r#"{ "core": { "phys_regs": 32 } }"#).unwrap_err();
    assert!(matches!(
        err,
        SimError::Config(ConfigError::NoRenameHeadroom { arch: 32, phys: 32 })
    ));
}

// ══════════════════════════════════════════════════════════
// 3. Validation
// ══════════════════════════════════════════════════════════

fn with(f: impl FnOnce(&mut Config)) -> Config {
    let mut config = Config::default();
    f(&mut config);
    config
}

#[rstest]
#[case::one_arch_reg(with(|c| c.core.arch_regs = 1))]
#[case::free_list_narrower_than_rename(with(|c| c.core.phys_regs = 33))]
#[case::rob_narrower_than_commit(with(|c| c.core.rob_size = 1))]
#[case::rs_narrower_than_issue(with(|c| c.core.rs_size = 1))]
#[case::zero_alu_capacity(with(|c| c.units.alu_capacity = 0))]
fn too_small_structures(#[case] config: Config) {
    assert!(
        matches!(config.validate(), Err(ConfigError::TooSmall { .. })),
        "got {:?}",
        config.validate()
    );
}

#[rstest]
#[case::alu(with(|c| c.units.alu_latency = 0), "alu")]
#[case::bru(with(|c| c.units.bru_latency = 0), "bru")]
#[case::lsu(with(|c| c.units.lsu_latency = 0), "lsu")]
fn zero_latency(#[case] config: Config, #[case] unit: &'static str) {
    assert_eq!(config.validate(), Err(ConfigError::ZeroLatency { unit }));
}

#[rstest]
#[case::btb(with(|c| c.predictor.btb_size = 100), "btb", 100)]
#[case::bimodal(with(|c| c.predictor.bimodal_size = 3), "bimodal", 3)]
fn table_sizes_are_powers_of_two(
    #[case] config: Config,
    #[case] table: &'static str,
    #[case] got: usize,
) {
    assert_eq!(config.validate(), Err(ConfigError::NotPowerOfTwo { table, got }));
}

#[rstest]
#[case::zero(0, false)]
#[case::one(1, true)]
#[case::four_bits(15, true)]
#[case::past_four_bits(16, false)]
#[case::wide(200, false)]
fn age_bound_fits_four_bits(#[case] age_max: u8, #[case] valid: bool) {
    let config = with(|c| c.core.age_max = age_max);
    let expected = if valid {
        Ok(())
    } else {
        Err(ConfigError::AgeBound {
            got: age_max,
            limit: 15,
        })
    };
    assert_eq!(config.validate(), expected);
}

#[test]
fn age_bound_is_checked_on_parse() {
    let err = Config::from_json(r#"{ "core": { "age_max": 0 } }"#).unwrap_err();
    assert!(
        matches!(err, SimError::Config(ConfigError::AgeBound { got: 0, .. })),
        "got {err:?}"
    );
}

#[test]
fn misaligned_exception_vector() {
    let config = with(|c| c.core.exception_vector = 0x102);
    assert_eq!(config.validate(), Err(ConfigError::MisalignedVector(0x102)));
}

#[test]
fn minimal_machine_is_valid() {
    let config = with(|c| {
        c.core.phys_regs = 34;
        c.core.rob_size = 2;
        c.core.rs_size = 2;
        c.core.recovery_hold_cycles = 0;
        c.units.alu_capacity = 1;
        c.units.bru_capacity = 1;
    });
    assert_eq!(config.validate(), Ok(()));
}
