//! Primer pair validation against the PCR design rules used in the primer
//! design exercise.

use crate::sequence::{gc_percent, is_acgt, melting_temp, normalize};
use labsim_protocol::{PrimerMetrics, PrimerPair, PrimerPairReport, PrimerValidationResult};
use serde::{Deserialize, Serialize};

pub const MISSING_PRIMERS: &str = "Both forward and reverse primers are required";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerRules {
    pub min_length: usize,
    pub max_length: usize,
    pub min_gc_percent: f64,
    pub max_gc_percent: f64,
    pub max_tm_difference: f64,
}

impl Default for PrimerRules {
    fn default() -> Self {
        Self {
            min_length: 18,
            max_length: 30,
            min_gc_percent: 40.0,
            max_gc_percent: 60.0,
            max_tm_difference: 5.0,
        }
    }
}

#[derive(Clone, Copy)]
enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    fn label(self) -> &'static str {
        match self {
            Self::Forward => "Forward",
            Self::Reverse => "Reverse",
        }
    }
}

struct StrandCheck {
    sequence: String,
    length: usize,
    alphabet_ok: bool,
}

impl StrandCheck {
    fn new(raw: &str) -> Self {
        let sequence = normalize(raw);
        Self {
            length: sequence.chars().count(),
            alphabet_ok: is_acgt(&sequence),
            sequence,
        }
    }
}

pub fn validate_primer_pair(pair: &PrimerPair) -> PrimerValidationResult {
    validate_primer_pair_with(pair, &PrimerRules::default())
}

/// Applies every rule that is applicable and collects all violations.
///
/// GC content is only judged on strands with a clean alphabet, and the Tm
/// balance only once both strands are clean and long enough.
pub fn validate_primer_pair_with(pair: &PrimerPair, rules: &PrimerRules) -> PrimerValidationResult {
    let forward = StrandCheck::new(&pair.forward);
    let reverse = StrandCheck::new(&pair.reverse);
    if forward.sequence.is_empty() || reverse.sequence.is_empty() {
        return PrimerValidationResult {
            is_valid: false,
            errors: vec![MISSING_PRIMERS.to_string()],
        };
    }

    let strands = [(Strand::Forward, &forward), (Strand::Reverse, &reverse)];
    let mut errors = vec![];

    for (strand, check) in strands {
        if !check.alphabet_ok {
            errors.push(format!(
                "{} primer contains invalid characters (only A, T, C, G allowed)",
                strand.label()
            ));
        }
    }

    for (strand, check) in strands {
        if check.length < rules.min_length || check.length > rules.max_length {
            errors.push(format!(
                "{} primer length must be {}-{} nt (got {})",
                strand.label(),
                rules.min_length,
                rules.max_length,
                check.length
            ));
        }
    }

    for (strand, check) in strands {
        if !check.alphabet_ok {
            continue;
        }
        let gc = gc_percent(&check.sequence);
        if gc < rules.min_gc_percent || gc > rules.max_gc_percent {
            errors.push(format!(
                "{} primer GC content must be {}-{}% (got {:.1}%)",
                strand.label(),
                rules.min_gc_percent,
                rules.max_gc_percent,
                gc
            ));
        }
    }

    let tm_comparable = strands
        .iter()
        .all(|(_, check)| check.alphabet_ok && check.length >= rules.min_length);
    if tm_comparable {
        let tm_forward = melting_temp(&forward.sequence);
        let tm_reverse = melting_temp(&reverse.sequence);
        if (tm_forward - tm_reverse).abs() > rules.max_tm_difference {
            errors.push(format!(
                "Primer melting temperatures differ by more than {}°C (forward {:.1}°C, reverse {:.1}°C)",
                rules.max_tm_difference, tm_forward, tm_reverse
            ));
        }
    }

    PrimerValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn strand_metrics(raw: &str) -> PrimerMetrics {
    let check = StrandCheck::new(raw);
    let (gc_percent, melting_temp) = if check.alphabet_ok {
        (
            Some(gc_percent(&check.sequence)),
            Some(melting_temp(&check.sequence)),
        )
    } else {
        (None, None)
    };
    PrimerMetrics {
        length: check.length,
        gc_percent,
        melting_temp,
    }
}

/// Validation plus the per-strand numbers a designer wants to see next to it.
pub fn analyze_primer_pair(pair: &PrimerPair) -> PrimerPairReport {
    let forward = strand_metrics(&pair.forward);
    let reverse = strand_metrics(&pair.reverse);
    let tm_difference = match (forward.melting_temp, reverse.melting_temp) {
        (Some(f), Some(r)) => Some((f - r).abs()),
        _ => None,
    };
    PrimerPairReport {
        validation: validate_primer_pair(pair),
        forward,
        reverse,
        tm_difference,
    }
}
