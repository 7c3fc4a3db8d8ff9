use crate::{
    missions::{MissionCatalog, MissionProfile},
    primer::{analyze_primer_pair, validate_primer_pair},
    scoring::calculate_enhanced_results,
};
use labsim_protocol::{EnhancedResult, ExtractionInput, PROTOCOL_VERSION, PrimerPair};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};
use tracing::debug;

pub type OpId = String;
pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    ValidatePrimerPair { forward: String, reverse: String },
    AnalyzePrimerPair { forward: String, reverse: String },
    ScoreExtraction(ExtractionInput),
    ScoreBatch { runs: Vec<ExtractionInput> },
    ListMissions,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidatePrimerPair { .. } => "ValidatePrimerPair",
            Self::AnalyzePrimerPair { .. } => "AnalyzePrimerPair",
            Self::ScoreExtraction(_) => "ScoreExtraction",
            Self::ScoreBatch { .. } => "ScoreBatch",
            Self::ListMissions => "ListMissions",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub operation: String,
    pub output: serde_json::Value,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl EngineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for EngineError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub mission_ids: Vec<String>,
    pub fallback_mission: String,
    pub deterministic_operation_log: bool,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn operation_log(&self) -> &[OperationRecord];
}

/// Scores independent runs in parallel. Results keep the input order.
pub fn score_batch(catalog: &MissionCatalog, inputs: &[ExtractionInput]) -> Vec<EnhancedResult> {
    inputs
        .par_iter()
        .map(|input| calculate_enhanced_results(catalog, input))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct LabEngine {
    catalog: MissionCatalog,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl LabEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: MissionCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            protocol_version: PROTOCOL_VERSION.to_string(),
            supported_operations: vec![
                "ValidatePrimerPair".to_string(),
                "AnalyzePrimerPair".to_string(),
                "ScoreExtraction".to_string(),
                "ScoreBatch".to_string(),
                "ListMissions".to_string(),
            ],
            mission_ids: self.catalog.ids_sorted(),
            fallback_mission: self.catalog.fallback().id.clone(),
            deterministic_operation_log: true,
        }
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn to_output<T: Serialize>(value: &T) -> Result<serde_json::Value, EngineError> {
        serde_json::to_value(value).map_err(|e| {
            EngineError::new(ErrorCode::Internal, format!("Could not serialize result: {e}"))
        })
    }

    fn fallback_warning(&self, mission_id: &str) -> Option<String> {
        if self.catalog.get(mission_id).is_some() {
            return None;
        }
        Some(format!(
            "Mission '{mission_id}' is not in the catalog; scored against fallback profile '{}'",
            self.catalog.fallback().id
        ))
    }

    fn apply_internal(&mut self, op: &Operation, run_id: &str) -> Result<OpResult, EngineError> {
        let mut warnings = vec![];
        let mut messages = vec![];
        let output = match op {
            Operation::ValidatePrimerPair { forward, reverse } => {
                let res = validate_primer_pair(&PrimerPair::new(forward, reverse));
                messages.push(if res.is_valid {
                    "Primer pair is valid".to_string()
                } else {
                    format!("Primer pair has {} issue(s)", res.errors.len())
                });
                Self::to_output(&res)?
            }
            Operation::AnalyzePrimerPair { forward, reverse } => {
                Self::to_output(&analyze_primer_pair(&PrimerPair::new(forward, reverse)))?
            }
            Operation::ScoreExtraction(input) => {
                warnings.extend(self.fallback_warning(&input.mission_id));
                let result = calculate_enhanced_results(&self.catalog, input);
                messages.push(format!("Outcome: {}", result.status.as_str()));
                Self::to_output(&result)?
            }
            Operation::ScoreBatch { runs } => {
                if runs.is_empty() {
                    return Err(EngineError::new(
                        ErrorCode::InvalidInput,
                        "ScoreBatch needs at least one run",
                    ));
                }
                for run in runs {
                    warnings.extend(self.fallback_warning(&run.mission_id));
                }
                warnings.sort();
                warnings.dedup();
                let results = score_batch(&self.catalog, runs);
                messages.push(format!("Scored {} run(s)", results.len()));
                Self::to_output(&results)?
            }
            Operation::ListMissions => {
                let missions: Vec<&MissionProfile> = self.catalog.iter().collect();
                Self::to_output(&missions)?
            }
        };
        let op_id = self.next_op_id();
        debug!(%op_id, run_id, operation = op.name(), "applied operation");
        Ok(OpResult {
            op_id,
            operation: op.name().to_string(),
            output,
            warnings,
            messages,
        })
    }
}

impl Engine for LabEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(&op, &run_id)?;
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in wf.ops {
            let result = self.apply_internal(&op, &wf.run_id)?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op,
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }
}
