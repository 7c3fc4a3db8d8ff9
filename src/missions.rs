use anyhow::{Context, Result, anyhow};
use labsim_protocol::StepVolumes;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs};
use tracing::info;

const BUILTIN_MISSIONS_JSON: &str = include_str!("../assets/missions.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Tissue,
    Plant,
}

/// The technique flag a mission insists on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredTechnique {
    /// Proteinase K dosed at the reference volume.
    EnzymeVolume,
    /// Sample ground under liquid nitrogen.
    CryoGrinding,
}

/// Allowed deviation from the ideal volumes, in µL.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub buffer: f64,
    pub elution: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            buffer: 50.0,
            elution: 10.0,
        }
    }
}

/// Reference protocol for one extraction mission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionProfile {
    pub id: String,
    pub name: String,
    pub sample: SampleKind,
    pub technique: RequiredTechnique,
    pub yield_multiplier: f64,
    #[serde(default)]
    pub warm_elution_recommended: bool,
    pub ideal: StepVolumes,
}

#[derive(Deserialize)]
struct CatalogFile {
    fallback: String,
    #[serde(default)]
    tolerances: Tolerances,
    missions: Vec<MissionProfile>,
}

#[derive(Clone, Debug)]
pub struct MissionCatalog {
    missions: Vec<MissionProfile>,
    fallback_index: usize,
    tolerances: Tolerances,
}

impl MissionCatalog {
    pub fn from_json_str(json_text: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json_text).context("Mission catalog is not valid JSON")?;
        Self::new(file.missions, &file.fallback, file.tolerances)
    }

    pub fn from_json_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read mission catalog '{path}'"))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid mission catalog '{path}'"))
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_MISSIONS_JSON)
    }

    /// Runtime catalog file if one is given, built-in tables otherwise.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let catalog = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::builtin()?,
        };
        info!(
            source = path.unwrap_or("built-in"),
            missions = catalog.missions.len(),
            fallback = %catalog.fallback().id,
            "loaded mission catalog"
        );
        Ok(catalog)
    }

    pub fn new(missions: Vec<MissionProfile>, fallback: &str, tolerances: Tolerances) -> Result<Self> {
        if missions.is_empty() {
            return Err(anyhow!("Mission catalog has no missions"));
        }
        let mut seen = HashSet::new();
        for mission in &missions {
            if !seen.insert(mission.id.as_str()) {
                return Err(anyhow!("Duplicate mission id '{}'", mission.id));
            }
            if !mission.yield_multiplier.is_finite() || mission.yield_multiplier <= 0.0 {
                return Err(anyhow!(
                    "Mission '{}' has invalid yield multiplier {}",
                    mission.id,
                    mission.yield_multiplier
                ));
            }
            if !mission.ideal.elution.is_finite() || mission.ideal.elution <= 0.0 {
                return Err(anyhow!(
                    "Mission '{}' needs a positive ideal elution volume",
                    mission.id
                ));
            }
        }
        if !(tolerances.buffer >= 0.0 && tolerances.elution >= 0.0) {
            return Err(anyhow!("Tolerances must be non-negative"));
        }
        let fallback_index = missions
            .iter()
            .position(|m| m.id == fallback)
            .ok_or_else(|| anyhow!("Fallback mission '{fallback}' is not in the catalog"))?;
        Ok(Self {
            missions,
            fallback_index,
            tolerances,
        })
    }

    pub fn get(&self, id: &str) -> Option<&MissionProfile> {
        self.missions.iter().find(|m| m.id == id)
    }

    /// Exact match on the id, otherwise the fallback profile.
    pub fn resolve(&self, id: &str) -> &MissionProfile {
        self.get(id).unwrap_or_else(|| self.fallback())
    }

    pub fn fallback(&self) -> &MissionProfile {
        &self.missions[self.fallback_index]
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissionProfile> {
        self.missions.iter()
    }

    pub fn ids_sorted(&self) -> Vec<String> {
        let mut ids = self.missions.iter().map(|m| m.id.clone()).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}

impl Default for MissionCatalog {
    fn default() -> Self {
        Self::builtin().expect("Built-in mission catalog is valid")
    }
}
