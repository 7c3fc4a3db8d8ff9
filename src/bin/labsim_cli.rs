use labsim::{
    about,
    engine::{Engine, LabEngine, Operation, Workflow, score_batch},
    missions::{MissionCatalog, MissionProfile},
    primer::analyze_primer_pair,
    protocol::{ExtractionInput, PrimerPair},
    scoring::calculate_enhanced_results,
};
use serde::Serialize;
use std::{env, fs};
use tracing_subscriber::EnvFilter;

const MISSIONS_ENV: &str = "LABSIM_MISSIONS";

fn usage() {
    eprintln!(
        "Usage:\n  \
  labsim_cli --version\n  \
  labsim_cli [--missions PATH] capabilities\n  \
  labsim_cli [--missions PATH] missions\n  \
  labsim_cli primers FORWARD REVERSE\n  \
  labsim_cli [--missions PATH] score '<extraction-json>'\n  \
  labsim_cli [--missions PATH] score-batch '<extraction-json-array>'\n  \
  labsim_cli [--missions PATH] op '<operation-json>'\n  \
  labsim_cli [--missions PATH] workflow '<workflow-json>'\n\n  \
  Tip: pass @file.json instead of inline JSON\n  \
  Mission tables can also be set with {MISSIONS_ENV}=PATH; RUST_LOG controls logging"
    );
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_missions_arg(args: &[String]) -> (Option<String>, usize) {
    if args.len() >= 3 && args[1] == "--missions" {
        return (Some(args[2].clone()), 3);
    }
    (env::var(MISSIONS_ENV).ok().filter(|p| !p.is_empty()), 1)
}

fn load_catalog(path: Option<&str>) -> Result<MissionCatalog, String> {
    MissionCatalog::load(path).map_err(|e| format!("{e:#}"))
}

fn required_arg<'a>(args: &'a [String], idx: usize, what: &str) -> Result<&'a str, String> {
    match args.get(idx) {
        Some(arg) => Ok(arg.as_str()),
        None => {
            usage();
            Err(format!("Missing {what}"))
        }
    }
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (missions_path, cmd_idx) = parse_global_missions_arg(&args);
    let command = required_arg(&args, cmd_idx, "command")?;

    match command {
        "capabilities" => {
            let engine = LabEngine::with_catalog(load_catalog(missions_path.as_deref())?);
            print_json(&engine.capabilities())
        }
        "missions" => {
            let catalog = load_catalog(missions_path.as_deref())?;
            let missions: Vec<&MissionProfile> = catalog.iter().collect();
            print_json(&missions)
        }
        "primers" => {
            let forward = required_arg(&args, cmd_idx + 1, "forward primer")?;
            let reverse = required_arg(&args, cmd_idx + 2, "reverse primer")?;
            print_json(&analyze_primer_pair(&PrimerPair::new(forward, reverse)))
        }
        "score" => {
            let json = load_json_arg(required_arg(&args, cmd_idx + 1, "extraction JSON")?)?;
            let input: ExtractionInput =
                serde_json::from_str(&json).map_err(|e| format!("Invalid extraction JSON: {e}"))?;
            let catalog = load_catalog(missions_path.as_deref())?;
            print_json(&calculate_enhanced_results(&catalog, &input))
        }
        "score-batch" => {
            let json = load_json_arg(required_arg(&args, cmd_idx + 1, "extraction JSON array")?)?;
            let inputs: Vec<ExtractionInput> = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid extraction JSON array: {e}"))?;
            let catalog = load_catalog(missions_path.as_deref())?;
            print_json(&score_batch(&catalog, &inputs))
        }
        "op" => {
            let json = load_json_arg(required_arg(&args, cmd_idx + 1, "operation JSON")?)?;
            let op: Operation =
                serde_json::from_str(&json).map_err(|e| format!("Invalid operation JSON: {e}"))?;
            let mut engine = LabEngine::with_catalog(load_catalog(missions_path.as_deref())?);
            let result = engine.apply(op).map_err(|e| e.to_string())?;
            print_json(&result)
        }
        "workflow" => {
            let json = load_json_arg(required_arg(&args, cmd_idx + 1, "workflow JSON")?)?;
            let workflow: Workflow =
                serde_json::from_str(&json).map_err(|e| format!("Invalid workflow JSON: {e}"))?;
            let mut engine = LabEngine::with_catalog(load_catalog(missions_path.as_deref())?);
            let results = engine.apply_workflow(workflow).map_err(|e| e.to_string())?;
            print_json(&results)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
