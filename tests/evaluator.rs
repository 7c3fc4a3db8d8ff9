use labsim::{
    MISSIONS,
    primer::{MISSING_PRIMERS, validate_primer_pair},
    protocol::{
        ExtractionInput, OutcomeStatus, PerformanceRecord, PrimerPair, SafetyEquipment,
        StepVolumes,
    },
    scoring::{SAFETY_BREACH_REASON, calculate_enhanced_results_default},
};

const VALID_FORWARD: &str = "AGCTGACCTGAAGCTTCAGG";
const VALID_REVERSE: &str = "TCGAGGCATCAGTCCTAGAC";

fn mission_a_run(safety_equipment: SafetyEquipment) -> ExtractionInput {
    ExtractionInput {
        performance: PerformanceRecord {
            correct_enzyme_volume: true,
            cryo_grinding: false,
            ethanol_added: true,
            dry_spin_performed: true,
            lysate_clarified: true,
            safety_compliant: safety_equipment.is_complete(),
        },
        step_volumes: StepVolumes {
            enzyme: 20.0,
            lysis_buffer: 200.0,
            binding_buffer: 200.0,
            ethanol: 200.0,
            wash_buffer: 500.0,
            elution: 50.0,
        },
        mission_id: "A".to_string(),
        sample_mass: 100.0,
        elution_warmed: false,
        safety_equipment,
        lysate_clarified: true,
    }
}

#[test]
fn valid_primer_pair_has_no_errors() {
    let res = validate_primer_pair(&PrimerPair::new(VALID_FORWARD, VALID_REVERSE));
    assert!(res.is_valid, "{:?}", res.errors);
    assert!(res.errors.is_empty());
}

#[test]
fn any_foreign_character_fails_the_pair() {
    for idx in 0..VALID_FORWARD.len() {
        for bad in ['N', 'U', 'x', '-', ' ', '\t'] {
            let mut forward: Vec<char> = VALID_FORWARD.chars().collect();
            forward[idx] = bad;
            let forward: String = forward.into_iter().collect();
            let res = validate_primer_pair(&PrimerPair::new(&forward, VALID_REVERSE));
            assert!(!res.is_valid, "{forward}");
            assert!(
                res.errors.iter().any(|e| e.contains("invalid characters")),
                "{forward}: {:?}",
                res.errors
            );
        }
    }
}

#[test]
fn empty_primer_reports_only_the_missing_message() {
    let res = validate_primer_pair(&PrimerPair::new(VALID_FORWARD, ""));
    assert!(!res.is_valid);
    assert_eq!(res.errors, vec![MISSING_PRIMERS.to_string()]);
}

#[test]
fn mission_a_with_full_ppe_earns_mastery() {
    let result = calculate_enhanced_results_default(&mission_a_run(SafetyEquipment::full()));
    assert_eq!(result.status, OutcomeStatus::Mastery);
    assert!(result.concentration >= 200.0);
    assert!(result.a260_280 >= 1.7);
    assert!(result.mastery_badge.earned);
    assert!(result.mastery_badge.technical_success);
    assert!(result.mastery_badge.protocol_precision);
    assert!(result.mastery_badge.safety_excellence);
}

#[test]
fn mission_a_without_goggles_is_blocked_by_safety() {
    let ppe = SafetyEquipment {
        goggles: false,
        ..SafetyEquipment::full()
    };
    let result = calculate_enhanced_results_default(&mission_a_run(ppe));
    assert_eq!(result.status, OutcomeStatus::TechnicalSuccess);
    assert!(!result.mastery_badge.earned);
    assert!(!result.mastery_badge.safety_excellence);
    assert_eq!(
        result.mastery_badge.block_reason.as_deref(),
        Some(SAFETY_BREACH_REASON)
    );
}

#[test]
fn each_missing_ppe_item_blocks_mastery() {
    let variants = [
        SafetyEquipment {
            goggles: false,
            ..SafetyEquipment::full()
        },
        SafetyEquipment {
            gloves: false,
            ..SafetyEquipment::full()
        },
        SafetyEquipment {
            lab_coat: false,
            ..SafetyEquipment::full()
        },
    ];
    for ppe in variants {
        let result = calculate_enhanced_results_default(&mission_a_run(ppe));
        assert_eq!(result.status, OutcomeStatus::TechnicalSuccess);
        assert!(!result.mastery_badge.safety_excellence);
    }
}

#[test]
fn no_ethanol_zeroes_every_metric() {
    let mut input = mission_a_run(SafetyEquipment::full());
    input.performance.ethanol_added = false;
    let result = calculate_enhanced_results_default(&input);
    assert_eq!(result.status, OutcomeStatus::CriticalFailure);
    assert_eq!(
        (result.yield_ug, result.concentration, result.a260_280, result.a260_230),
        (0.0, 0.0, 0.0, 0.0)
    );
}

#[test]
fn result_serializes_in_client_shape() {
    let result = calculate_enhanced_results_default(&mission_a_run(SafetyEquipment::full()));
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["status"], "mastery");
    assert_eq!(value["masteryBadge"]["earned"], true);
    assert_eq!(value["comparisons"][0]["phase"], "Lysis & digestion");
    assert_eq!(value["comparisons"][0]["status"], "good");
    assert!(value["yield"].as_f64().unwrap() > 0.0);
}

#[test]
fn builtin_catalog_is_shared() {
    assert_eq!(MISSIONS.resolve("A").yield_multiplier, 0.4);
    assert_eq!(MISSIONS.resolve("anything else").yield_multiplier, 0.18);
}
