//! Grades a DNA extraction run against the reference protocol of its mission.
//!
//! The scorer never fails: every input combination produces a complete
//! [`EnhancedResult`]. Adverse runs are expressed through the status, zeroed
//! metrics, comparisons and insights.
//!
//! Penalties do not share one combination rule. Yield penalties multiply,
//! a missed dry spin overwrites A260/230 and an unclarified lysate subtracts
//! from A260/280 without a floor. Stored results depend on these exact
//! semantics.

use crate::missions::{MissionCatalog, MissionProfile, RequiredTechnique, Tolerances};
use crate::MISSIONS;
use labsim_protocol::{
    Comparison, ComparisonStatus, EnhancedResult, ExtractionInput, Insight, InsightKind,
    MasteryBadge, OutcomeStatus, Severity, StepVolumes,
};
use tracing::{debug, warn};

const BASE_A260_280: f64 = 1.85;
const BASE_A260_230: f64 = 2.1;

const WRONG_ENZYME_VOLUME_FACTOR: f64 = 0.2;
const NO_CRYO_GRINDING_FACTOR: f64 = 0.3;
const NO_DRY_SPIN_FACTOR: f64 = 0.6;
const COLD_ELUTION_FACTOR: f64 = 0.85;
const ETHANOL_CARRYOVER_A260_230: f64 = 0.5;
const DEBRIS_A260_280_DROP: f64 = 0.3;

pub const MIN_CONCENTRATION: f64 = 200.0;
pub const MIN_A260_280: f64 = 1.7;

pub const SAFETY_BREACH_REASON: &str =
    "Mastery blocked: safety protocol breach (goggles, gloves and lab coat are required)";
pub const PROTOCOL_DEVIATION_REASON: &str =
    "Mastery blocked: protocol deviations from the reference method";

#[derive(Default)]
struct Review {
    comparisons: Vec<Comparison>,
    insights: Vec<Insight>,
}

impl Review {
    fn compare(&mut self, phase: &str, ideal: String, actual: String, status: ComparisonStatus) {
        self.comparisons.push(Comparison {
            phase: phase.to_string(),
            ideal,
            actual,
            status,
        });
    }

    fn insight(&mut self, kind: InsightKind, severity: Severity, message: &str) {
        self.insights.push(Insight {
            kind,
            severity,
            message: message.to_string(),
        });
    }

    fn into_failure(self) -> EnhancedResult {
        EnhancedResult {
            yield_ug: 0.0,
            concentration: 0.0,
            a260_280: 0.0,
            a260_230: 0.0,
            status: OutcomeStatus::CriticalFailure,
            comparisons: self.comparisons,
            insights: self.insights,
            mastery_badge: MasteryBadge::default(),
        }
    }
}

fn microliters(volume: f64) -> String {
    format!("{volume} µL")
}

fn within(actual: f64, ideal: f64, tolerance: f64) -> bool {
    (actual - ideal).abs() <= tolerance
}

fn grade(ok: bool) -> ComparisonStatus {
    if ok {
        ComparisonStatus::Good
    } else {
        ComparisonStatus::Warning
    }
}

fn volumes_match(actual: &StepVolumes, ideal: &StepVolumes, tolerances: Tolerances) -> bool {
    within(actual.lysis_buffer, ideal.lysis_buffer, tolerances.buffer)
        && within(actual.binding_buffer, ideal.binding_buffer, tolerances.buffer)
        && within(actual.ethanol, ideal.ethanol, tolerances.buffer)
        && within(actual.wash_buffer, ideal.wash_buffer, tolerances.buffer)
        && within(actual.elution, ideal.elution, tolerances.elution)
}

fn ethanol_failure() -> EnhancedResult {
    let mut review = Review::default();
    review.insight(
        InsightKind::Chemistry,
        Severity::Error,
        "DNA only adsorbs to the silica membrane in the presence of ethanol and chaotropic salts. \
         Without ethanol the DNA passed straight through the column and was discarded with the flow-through.",
    );
    review.compare(
        "Binding preparation",
        "Ethanol added to the lysate before column loading".to_string(),
        "No ethanol added".to_string(),
        ComparisonStatus::Error,
    );
    review.into_failure()
}

fn invalid_elution(volume: f64) -> EnhancedResult {
    let mut review = Review::default();
    review.insight(
        InsightKind::Input,
        Severity::Error,
        "No elution buffer was applied to the column, so no DNA could be recovered or quantified.",
    );
    review.compare(
        "Elution",
        "Positive elution buffer volume".to_string(),
        microliters(volume),
        ComparisonStatus::Error,
    );
    review.into_failure()
}

fn unquantifiable(volume: f64, sample_mass: f64) -> EnhancedResult {
    let mut review = Review::default();
    review.insight(
        InsightKind::Input,
        Severity::Error,
        "The recorded sample mass and elution volume do not give a measurable DNA concentration.",
    );
    review.compare(
        "Elution",
        "Concentration measurable for the loaded sample".to_string(),
        format!("{} from {sample_mass} mg", microliters(volume)),
        ComparisonStatus::Error,
    );
    review.into_failure()
}

/// Scores a run with the built-in mission tables.
pub fn calculate_enhanced_results_default(input: &ExtractionInput) -> EnhancedResult {
    calculate_enhanced_results(&MISSIONS, input)
}

pub fn calculate_enhanced_results(catalog: &MissionCatalog, input: &ExtractionInput) -> EnhancedResult {
    let performance = &input.performance;
    let volumes = &input.step_volumes;

    if !performance.ethanol_added {
        debug!(mission = %input.mission_id, "ethanol never added, binding failed");
        return ethanol_failure();
    }
    if !volumes.elution.is_finite() || volumes.elution <= 0.0 {
        warn!(elution = volumes.elution, "refusing to score run without a positive elution volume");
        return invalid_elution(volumes.elution);
    }

    let profile = catalog.resolve(&input.mission_id);
    let tolerances = catalog.tolerances();
    let ideal = &profile.ideal;
    let mut review = Review::default();
    let mut penalty = 1.0;
    let mut a260_280 = BASE_A260_280;
    let mut a260_230 = BASE_A260_230;
    let lysate_clarified = input.lysate_clarified || performance.lysate_clarified;

    match profile.technique {
        RequiredTechnique::EnzymeVolume if !performance.correct_enzyme_volume => {
            debug!("incorrect proteinase K volume");
            penalty *= WRONG_ENZYME_VOLUME_FACTOR;
            review.insight(
                InsightKind::Technique,
                Severity::Warning,
                "Proteinase K was not dosed at the reference volume. Incomplete digestion leaves \
                 DNA trapped in protein complexes and sharply reduces yield.",
            );
            review.compare(
                "Proteinase K digestion",
                microliters(ideal.enzyme),
                microliters(volumes.enzyme),
                ComparisonStatus::Error,
            );
        }
        RequiredTechnique::CryoGrinding if !performance.cryo_grinding => {
            debug!("sample not ground under liquid nitrogen");
            penalty *= NO_CRYO_GRINDING_FACTOR;
            review.insight(
                InsightKind::Technique,
                Severity::Warning,
                "Plant cell walls were not broken by cryogenic grinding, so most cells never \
                 released their DNA into the lysis buffer.",
            );
            review.compare(
                "Sample disruption",
                "Cryogenic grinding in liquid nitrogen".to_string(),
                "Ground at room temperature".to_string(),
                ComparisonStatus::Error,
            );
        }
        _ => {}
    }

    if !performance.dry_spin_performed {
        debug!("post-wash dry spin skipped");
        penalty *= NO_DRY_SPIN_FACTOR;
        a260_230 = ETHANOL_CARRYOVER_A260_230;
        review.insight(
            InsightKind::Contamination,
            Severity::Error,
            "Residual wash ethanol was carried into the eluate. Ethanol and salt carryover \
             depress A260/230 and inhibit downstream enzymes such as polymerases.",
        );
        review.compare(
            "Post-wash dry spin",
            "Empty spin to dry the membrane".to_string(),
            "Skipped".to_string(),
            ComparisonStatus::Error,
        );
    }

    if !lysate_clarified {
        debug!("lysate transferred without clarification");
        a260_280 -= DEBRIS_A260_280_DROP;
        review.insight(
            InsightKind::Contamination,
            Severity::Warning,
            "Cell debris was loaded onto the column. Protein carryover lowers A260/280.",
        );
        review.compare(
            "Lysate clarification",
            "Centrifuge and transfer the clear supernatant".to_string(),
            "Debris transferred to the column".to_string(),
            ComparisonStatus::Warning,
        );
    }

    if profile.technique == RequiredTechnique::CryoGrinding && !input.elution_warmed {
        debug!("elution buffer not warmed");
        penalty *= COLD_ELUTION_FACTOR;
        review.insight(
            InsightKind::Yield,
            Severity::Info,
            "Pre-warming the elution buffer releases more DNA from the membrane.",
        );
        review.compare(
            "Elution temperature",
            "Pre-warmed elution buffer".to_string(),
            "Room temperature elution buffer".to_string(),
            ComparisonStatus::Warning,
        );
    }

    let sample_mass = if input.sample_mass.is_finite() {
        input.sample_mass.max(0.0)
    } else {
        0.0
    };
    let yield_ug = sample_mass * profile.yield_multiplier * penalty;
    let concentration = yield_ug * 1000.0 / volumes.elution;
    if !yield_ug.is_finite() || !concentration.is_finite() {
        warn!(
            elution = volumes.elution,
            sample_mass, "concentration overflowed, run not quantifiable"
        );
        return unquantifiable(volumes.elution, sample_mass);
    }

    append_phase_comparisons(&mut review, profile, volumes, input.elution_warmed, tolerances);

    let technique_ok = match profile.technique {
        RequiredTechnique::EnzymeVolume => performance.correct_enzyme_volume,
        RequiredTechnique::CryoGrinding => performance.cryo_grinding,
    };
    let technical_success = concentration >= MIN_CONCENTRATION && a260_280 >= MIN_A260_280;
    let protocol_precision =
        volumes_match(volumes, ideal, tolerances) && technique_ok && performance.dry_spin_performed;
    let safety_excellence = input.safety_equipment.is_complete();

    let (status, block_reason) = if technical_success && protocol_precision && safety_excellence {
        (OutcomeStatus::Mastery, None)
    } else if technical_success && protocol_precision {
        review.insight(
            InsightKind::Safety,
            Severity::Warning,
            &format!(
                "The extraction was flawless, but it was run without {}. Mastery requires full personal protective equipment.",
                input.safety_equipment.missing().join(", ")
            ),
        );
        (
            OutcomeStatus::TechnicalSuccess,
            Some(SAFETY_BREACH_REASON.to_string()),
        )
    } else if technical_success {
        (
            OutcomeStatus::TechnicalSuccess,
            Some(PROTOCOL_DEVIATION_REASON.to_string()),
        )
    } else if concentration > 0.0 {
        review.insight(
            InsightKind::Yield,
            Severity::Info,
            &format!(
                "DNA was recovered ({concentration:.1} ng/µL, A260/280 {a260_280:.2}) but is below the \
                 {MIN_CONCENTRATION} ng/µL and {MIN_A260_280} purity targets. Review the flagged steps and repeat."
            ),
        );
        (OutcomeStatus::OptimizationRequired, None)
    } else {
        (OutcomeStatus::CriticalFailure, None)
    };

    debug!(
        mission = %profile.id,
        status = status.as_str(),
        concentration,
        a260_280,
        a260_230,
        "scored extraction run"
    );

    EnhancedResult {
        yield_ug,
        concentration,
        a260_280,
        a260_230,
        status,
        comparisons: review.comparisons,
        insights: review.insights,
        mastery_badge: MasteryBadge {
            earned: status == OutcomeStatus::Mastery,
            technical_success,
            protocol_precision,
            safety_excellence,
            block_reason,
        },
    }
}

/// Lysis (enzyme missions only), binding, then elution. The order is part of
/// the result contract.
fn append_phase_comparisons(
    review: &mut Review,
    profile: &MissionProfile,
    volumes: &StepVolumes,
    elution_warmed: bool,
    tolerances: Tolerances,
) {
    let ideal = &profile.ideal;
    if profile.technique == RequiredTechnique::EnzymeVolume {
        review.compare(
            "Lysis & digestion",
            format!(
                "{} lysis buffer + {} Proteinase K",
                microliters(ideal.lysis_buffer),
                microliters(ideal.enzyme)
            ),
            format!(
                "{} lysis buffer + {} Proteinase K",
                microliters(volumes.lysis_buffer),
                microliters(volumes.enzyme)
            ),
            grade(within(volumes.lysis_buffer, ideal.lysis_buffer, tolerances.buffer)),
        );
    }

    review.compare(
        "Binding preparation",
        format!(
            "{} binding buffer + {} ethanol",
            microliters(ideal.binding_buffer),
            microliters(ideal.ethanol)
        ),
        format!(
            "{} binding buffer + {} ethanol",
            microliters(volumes.binding_buffer),
            microliters(volumes.ethanol)
        ),
        grade(
            within(volumes.binding_buffer, ideal.binding_buffer, tolerances.buffer)
                && within(volumes.ethanol, ideal.ethanol, tolerances.buffer),
        ),
    );

    let temperature_ok = elution_warmed || !profile.warm_elution_recommended;
    let condition = |warmed: bool| if warmed { "pre-warmed" } else { "room temperature" };
    review.compare(
        "Elution",
        format!(
            "{} elution buffer, {}",
            microliters(ideal.elution),
            condition(profile.warm_elution_recommended)
        ),
        format!(
            "{} elution buffer, {}",
            microliters(volumes.elution),
            condition(elution_warmed)
        ),
        grade(within(volumes.elution, ideal.elution, tolerances.elution) && temperature_ok),
    );
}
