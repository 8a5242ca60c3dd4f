use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{conditions::Site, error::Error, horizon::HorizonGrid, snapshot::REWARD_MAP};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCfg {
    #[serde(default)]
    pub site: Site,
    #[serde(default)]
    pub horizon: HorizonGrid,
    #[serde(default = "default_nside_choices")]
    pub nside_choices: Vec<i64>,
    #[serde(default = "default_map")]
    pub default_map: String,
}

fn default_nside_choices() -> Vec<i64> {
    vec![8, 16, 32]
}

fn default_map() -> String {
    REWARD_MAP.to_string()
}

impl Default for DashboardCfg {
    fn default() -> Self {
        Self {
            site: Site::default(),
            horizon: HorizonGrid::default(),
            nside_choices: default_nside_choices(),
            default_map: default_map(),
        }
    }
}

impl DashboardCfg {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let cfg: Self = serde_yaml::from_reader(File::open(path)?)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(-90.0..=90.0).contains(&self.site.lat_deg) {
            return Err(Error::InvalidConfig(format!(
                "site latitude {} out of range",
                self.site.lat_deg
            )));
        }
        if self.nside_choices.is_empty() || self.nside_choices.iter().any(|&n| n <= 0) {
            return Err(Error::InvalidConfig(
                "nside_choices must be non-empty and positive".to_string(),
            ));
        }
        self.horizon.validate()
    }

    pub fn allows_nside(&self, nside: i64) -> bool {
        self.nside_choices.contains(&nside)
    }

    /// Accept a requested display resolution only if it is one of `nside_choices`.
    pub fn check_nside(&self, nside: i64) -> Result<i64, Error> {
        if self.allows_nside(nside) {
            Ok(nside)
        } else {
            Err(Error::InvalidConfig(format!(
                "nside={} is not one of {:?}",
                nside, self.nside_choices
            )))
        }
    }
}
