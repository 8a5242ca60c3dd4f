//! Scheduler reward snapshot: tiers of surveys, their basis functions and
//! the sparse reward maps each survey exposes.

use std::{collections::BTreeMap, fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    field::{aggregate, Field, Observation, Reward, SENTINEL},
};

/// Name of the map chosen by default when a survey provides it.
pub const REWARD_MAP: &str = "reward";

/// Upstream supplier of sparse reward observations.
pub trait RewardSource {
    /// Resolution the observations are indexed against.
    fn nside(&self) -> i64;

    fn observations(&self, selection: &MapSelection) -> Result<Vec<Observation>, Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default = "default_true")]
    pub feasible: bool,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub doc_url: Option<String>,
    #[serde(default)]
    pub map: Option<Vec<Observation>>,
}

fn default_true() -> bool {
    true
}

fn default_reward() -> Reward {
    Reward::Infeasible
}

impl BasisFunction {
    pub fn field(&self, nside: i64) -> Result<Field, Error> {
        Ok(aggregate(nside, self.map.as_deref().unwrap_or_default())?)
    }
}

/// One row of the basis function table of a survey.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisFunctionSummary {
    pub name: String,
    pub max_basis_reward: Option<f64>,
    pub basis_area: f64,
    pub max_accum_reward: Option<f64>,
    pub accum_area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub tier: usize,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_reward")]
    pub reward: Reward,
    #[serde(default)]
    pub basis_functions: Vec<BasisFunction>,
    #[serde(default)]
    pub maps: BTreeMap<String, Vec<Observation>>,
}

impl Survey {
    pub fn is_feasible(&self) -> bool {
        matches!(self.reward, Reward::Value(_))
    }

    pub fn map_names(&self) -> Vec<&str> {
        self.maps.keys().map(String::as_str).collect()
    }

    /// `reward` when present, otherwise the first map.
    pub fn default_map(&self) -> Option<&str> {
        if self.maps.contains_key(REWARD_MAP) {
            Some(REWARD_MAP)
        } else {
            self.maps.keys().next().map(String::as_str)
        }
    }

    /// Weighted running sum of the basis function maps in snapshot order,
    /// one field per basis function.
    ///
    /// A basis function without a map adds nothing, unless it is flagged
    /// infeasible, in which case every pixel of the running sum becomes
    /// infeasible from there on.
    pub fn accumulated_fields(&self, nside: i64) -> Result<Vec<Field>, Error> {
        let mut acc = aggregate(nside, &[])?;
        acc.fill(0.0);
        let mut fields = Vec::with_capacity(self.basis_functions.len());
        for bf in self.basis_functions.iter() {
            match &bf.map {
                Some(_) => acc.accumulate(&bf.field(nside)?, bf.weight),
                None if !bf.feasible => acc.fill(SENTINEL),
                None => {}
            }
            fields.push(acc.clone());
        }
        Ok(fields)
    }

    pub fn basis_function_summaries(&self, nside: i64) -> Result<Vec<BasisFunctionSummary>, Error> {
        self.basis_functions
            .iter()
            .zip(self.accumulated_fields(nside)?)
            .map(|(bf, accum)| -> Result<BasisFunctionSummary, Error> {
                let basis = bf.field(nside)?;
                Ok(BasisFunctionSummary {
                    name: bf.name.clone(),
                    max_basis_reward: basis.max_value(),
                    basis_area: basis.feasible_area_deg2(),
                    max_accum_reward: accum.max_value(),
                    accum_area: accum.feasible_area_deg2(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurveyKey {
    pub tier: usize,
    /// Position within the tier, in snapshot order.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapTarget {
    Map(String),
    BasisFunction(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSelection {
    pub survey: SurveyKey,
    pub target: MapTarget,
}

impl MapSelection {
    pub fn map(tier: usize, index: usize, name: &str) -> Self {
        Self {
            survey: SurveyKey { tier, index },
            target: MapTarget::Map(name.to_string()),
        }
    }

    pub fn basis_function(tier: usize, index: usize, bf: usize) -> Self {
        Self {
            survey: SurveyKey { tier, index },
            target: MapTarget::BasisFunction(bf),
        }
    }

    pub fn title(&self, snapshot: &SchedulerSnapshot) -> Result<String, Error> {
        let survey = snapshot.survey(&self.survey)?;
        let tail = match &self.target {
            MapTarget::Map(name) => format!("Map {}", name),
            MapTarget::BasisFunction(i) => {
                let bf = basis_function(survey, *i)?;
                format!("Basis function {}: {}", i, bf.name)
            }
        };
        Ok(format!("Survey {}\n{}", survey.name, tail))
    }
}

fn basis_function(survey: &Survey, index: usize) -> Result<&BasisFunction, Error> {
    survey
        .basis_functions
        .get(index)
        .ok_or_else(|| Error::UnknownBasisFunction {
            survey: survey.name.clone(),
            index,
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub nside: i64,
    #[serde(default)]
    pub mjd: Option<f64>,
    pub surveys: Vec<Survey>,
}

impl SchedulerSnapshot {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        log::info!("loading scheduler snapshot from {}", path.display());
        let snapshot: Self = serde_yaml::from_reader(File::open(path)?)?;
        log::debug!(
            "snapshot has {} surveys in {} tiers",
            snapshot.surveys.len(),
            snapshot.tiers().len()
        );
        Ok(snapshot)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn tiers(&self) -> Vec<usize> {
        let mut tiers: Vec<_> = self.surveys.iter().map(|s| s.tier).collect();
        tiers.sort_unstable();
        tiers.dedup();
        tiers
    }

    pub fn surveys_in_tier(&self, tier: usize) -> Result<Vec<&Survey>, Error> {
        let surveys: Vec<_> = self.surveys.iter().filter(|s| s.tier == tier).collect();
        if surveys.is_empty() {
            Err(Error::UnknownTier(tier))
        } else {
            Ok(surveys)
        }
    }

    pub fn survey(&self, key: &SurveyKey) -> Result<&Survey, Error> {
        self.surveys_in_tier(key.tier)?
            .get(key.index)
            .copied()
            .ok_or(Error::UnknownSurvey {
                tier: key.tier,
                index: key.index,
            })
    }
}

impl RewardSource for SchedulerSnapshot {
    fn nside(&self) -> i64 {
        self.nside
    }

    fn observations(&self, selection: &MapSelection) -> Result<Vec<Observation>, Error> {
        let survey = self.survey(&selection.survey)?;
        match &selection.target {
            MapTarget::Map(name) => survey.maps.get(name).cloned().ok_or_else(|| {
                Error::UnknownMap {
                    survey: survey.name.clone(),
                    map: name.clone(),
                }
            }),
            MapTarget::BasisFunction(i) => {
                let bf = basis_function(survey, *i)?;
                if bf.map.is_none() {
                    log::warn!(
                        "basis function '{}' of survey '{}' has no map",
                        bf.name,
                        survey.name
                    );
                }
                Ok(bf.map.clone().unwrap_or_default())
            }
        }
    }
}
