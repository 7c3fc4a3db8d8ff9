//! Machine-readable contracts shared between the labsim evaluator and the
//! applications that feed it simulation runs and primer designs.
//!
//! Field names serialize in camelCase so the shapes match what the training
//! web client sends and stores. The purity ratios keep their literal names.

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "v1";

/// What the student did during one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceRecord {
    pub correct_enzyme_volume: bool,
    pub cryo_grinding: bool,
    pub ethanol_added: bool,
    pub dry_spin_performed: bool,
    pub lysate_clarified: bool,
    /// Derived by the client from its own checklist; carried through unchanged.
    pub safety_compliant: bool,
}

/// Reagent volumes in microliters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepVolumes {
    pub enzyme: f64,
    pub lysis_buffer: f64,
    pub binding_buffer: f64,
    pub ethanol: f64,
    pub wash_buffer: f64,
    pub elution: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafetyEquipment {
    pub goggles: bool,
    pub gloves: bool,
    pub lab_coat: bool,
}

impl SafetyEquipment {
    pub fn full() -> Self {
        Self {
            goggles: true,
            gloves: true,
            lab_coat: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.goggles && self.gloves && self.lab_coat
    }

    /// Names of the items that were not worn, in display order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut ret = vec![];
        if !self.goggles {
            ret.push("goggles");
        }
        if !self.gloves {
            ret.push("gloves");
        }
        if !self.lab_coat {
            ret.push("lab coat");
        }
        ret
    }
}

/// Everything the scorer needs for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionInput {
    pub performance: PerformanceRecord,
    pub step_volumes: StepVolumes,
    pub mission_id: String,
    /// Sample mass in mg.
    pub sample_mass: f64,
    #[serde(default)]
    pub elution_warmed: bool,
    #[serde(default)]
    pub safety_equipment: SafetyEquipment,
    #[serde(default)]
    pub lysate_clarified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Mastery,
    TechnicalSuccess,
    OptimizationRequired,
    CriticalFailure,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mastery => "mastery",
            Self::TechnicalSuccess => "technical_success",
            Self::OptimizationRequired => "optimization_required",
            Self::CriticalFailure => "critical_failure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Good,
    Warning,
    Error,
}

/// One ideal-versus-actual line of the protocol review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub phase: String,
    pub ideal: String,
    pub actual: String,
    pub status: ComparisonStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Chemistry,
    Technique,
    Contamination,
    Yield,
    Safety,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryBadge {
    pub earned: bool,
    pub technical_success: bool,
    pub protocol_precision: bool,
    pub safety_excellence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Graded outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedResult {
    /// DNA yield in µg.
    #[serde(rename = "yield")]
    pub yield_ug: f64,
    /// ng/µL
    pub concentration: f64,
    #[serde(rename = "a260_280")]
    pub a260_280: f64,
    #[serde(rename = "a260_230")]
    pub a260_230: f64,
    pub status: OutcomeStatus,
    pub comparisons: Vec<Comparison>,
    pub insights: Vec<Insight>,
    pub mastery_badge: MasteryBadge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimerPair {
    pub forward: String,
    pub reverse: String,
}

impl PrimerPair {
    pub fn new(forward: &str, reverse: &str) -> Self {
        Self {
            forward: forward.to_string(),
            reverse: reverse.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimerValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimerMetrics {
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub melting_temp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimerPairReport {
    pub validation: PrimerValidationResult,
    pub forward: PrimerMetrics,
    pub reverse: PrimerMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tm_difference: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhanced_result_field_names() {
        let result = EnhancedResult {
            yield_ug: 40.0,
            concentration: 800.0,
            a260_280: 1.85,
            a260_230: 2.1,
            status: OutcomeStatus::TechnicalSuccess,
            comparisons: vec![],
            insights: vec![Insight {
                kind: InsightKind::Safety,
                severity: Severity::Warning,
                message: "x".to_string(),
            }],
            mastery_badge: MasteryBadge::default(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["yield"], 40.0);
        assert_eq!(value["a260_280"], 1.85);
        assert_eq!(value["a260_230"], 2.1);
        assert_eq!(value["status"], "technical_success");
        assert_eq!(value["insights"][0]["type"], "safety");
        assert_eq!(value["insights"][0]["severity"], "warning");
        assert_eq!(value["masteryBadge"]["earned"], false);
        assert!(value["masteryBadge"].get("blockReason").is_none());
    }

    #[test]
    fn test_extraction_input_defaults() {
        let input: ExtractionInput = serde_json::from_str(
            r#"{
                "performance": {"ethanolAdded": true},
                "stepVolumes": {"elution": 50},
                "missionId": "A",
                "sampleMass": 25
            }"#,
        )
        .unwrap();
        assert!(input.performance.ethanol_added);
        assert!(!input.performance.dry_spin_performed);
        assert_eq!(input.step_volumes.elution, 50.0);
        assert_eq!(input.safety_equipment, SafetyEquipment::default());
        assert!(!input.elution_warmed);
    }

    #[test]
    fn test_safety_equipment_missing() {
        let ppe = SafetyEquipment {
            goggles: false,
            gloves: true,
            lab_coat: false,
        };
        assert!(!ppe.is_complete());
        assert_eq!(ppe.missing(), vec!["goggles", "lab coat"]);
        assert!(SafetyEquipment::full().is_complete());
    }
}
