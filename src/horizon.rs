//! Projection of a sky field onto an altitude/azimuth grid.

use std::io::Write;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use scorus::coordinates::SphCoord;

use crate::{
    conditions::Conditions,
    error::Error,
    field::{Field, SENTINEL},
    tessellation::{nearest_pixel, Tessellation},
};

/// Finest grid step accepted, in degrees.
pub const MIN_STEP_DEG: f64 = 1e-3;

/// Downstream consumer of an aggregated field.
pub trait FieldRenderer {
    type Output;

    fn render(&self, field: &Field) -> Result<Self::Output, Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonGrid {
    pub alt_min_deg: f64,
    pub alt_step_deg: f64,
    pub az_step_deg: f64,
}

impl Default for HorizonGrid {
    fn default() -> Self {
        Self {
            alt_min_deg: 0.0,
            alt_step_deg: 1.0,
            az_step_deg: 1.0,
        }
    }
}

impl HorizonGrid {
    pub fn validate(&self) -> Result<(), Error> {
        if !(-90.0..90.0).contains(&self.alt_min_deg) {
            return Err(Error::InvalidConfig(format!(
                "alt_min_deg={} not in [-90, 90)",
                self.alt_min_deg
            )));
        }
        if !(self.alt_step_deg >= MIN_STEP_DEG && self.az_step_deg >= MIN_STEP_DEG) {
            return Err(Error::InvalidConfig(format!(
                "grid steps must be at least {} deg, got alt={} az={}",
                MIN_STEP_DEG, self.alt_step_deg, self.az_step_deg
            )));
        }
        Ok(())
    }

    pub fn alt_deg(&self) -> Vec<f64> {
        let n = ((90.0 - self.alt_min_deg) / self.alt_step_deg + 1e-9).floor() as usize + 1;
        (0..n)
            .map(|i| self.alt_min_deg + i as f64 * self.alt_step_deg)
            .collect()
    }

    pub fn az_deg(&self) -> Vec<f64> {
        let n = (360.0 / self.az_step_deg - 1e-9).ceil() as usize;
        (0..n).map(|j| j as f64 * self.az_step_deg).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizonMap {
    pub alt_deg: Vec<f64>,
    pub az_deg: Vec<f64>,
    /// Rows follow `alt_deg`, columns follow `az_deg`.
    pub values: Array2<f64>,
}

impl HorizonMap {
    fn nearest(axis: &[f64], x: f64) -> Option<usize> {
        axis.iter()
            .enumerate()
            .min_by(|a, b| (a.1 - x).abs().total_cmp(&(b.1 - x).abs()))
            .map(|(i, _)| i)
    }

    /// Value of the grid cell closest to (alt, az), `None` below the grid.
    pub fn value_at(&self, alt_deg: f64, az_deg: f64) -> Option<f64> {
        let lowest = *self.alt_deg.first()?;
        if alt_deg < lowest || alt_deg > 90.0 {
            return None;
        }
        let az = az_deg.rem_euclid(360.0);
        let i = Self::nearest(&self.alt_deg, alt_deg)?;
        // az wraps, so 359.9 is closer to 0 than to the last column
        let j = match Self::nearest(&self.az_deg, az) {
            Some(j) if (self.az_deg[j] - az).abs() <= 360.0 - az => j,
            _ => 0,
        };
        self.values.get((i, j)).cloned()
    }

    pub fn feasible_fraction(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().filter(|x| x.is_finite()).count() as f64 / self.values.len() as f64
    }

    pub fn write_text<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        for (i, &alt) in self.alt_deg.iter().enumerate() {
            for (j, &az) in self.az_deg.iter().enumerate() {
                writeln!(w, "{} {} {}", alt, az, self.values[(i, j)])?;
            }
        }
        Ok(())
    }
}

pub struct HorizonProjector {
    pub conditions: Conditions,
    pub grid: HorizonGrid,
}

impl HorizonProjector {
    pub fn new(conditions: Conditions, grid: HorizonGrid) -> Self {
        Self { conditions, grid }
    }

    /// RING pixel seen by every grid cell.
    pub fn pixel_lookup(&self, nside: usize) -> Array2<usize> {
        let alts = self.grid.alt_deg();
        let azs = self.grid.az_deg();
        Array2::from_shape_fn((alts.len(), azs.len()), |(i, j)| {
            let (ra, dec) = self
                .conditions
                .equatorial_from_alt_az(alts[i].to_radians(), azs[j].to_radians());
            nearest_pixel(nside, SphCoord::new(std::f64::consts::FRAC_PI_2 - dec, ra))
        })
    }

    /// Render a raw dense RING map whose length must be a HEALPix pixel count.
    pub fn render_values(&self, values: &[f64]) -> Result<HorizonMap, Error> {
        let tessellation = Tessellation::from_npix(values.len())?;
        self.project(tessellation, values)
    }

    fn project(&self, tessellation: Tessellation, values: &[f64]) -> Result<HorizonMap, Error> {
        self.grid.validate()?;
        let lookup = self.pixel_lookup(tessellation.nside());
        let values = lookup.map(|&p| values.get(p).cloned().unwrap_or(SENTINEL));
        log::debug!(
            "projected nside={} onto {}x{} horizon grid at mjd={}",
            tessellation.nside(),
            values.nrows(),
            values.ncols(),
            self.conditions.mjd
        );
        Ok(HorizonMap {
            alt_deg: self.grid.alt_deg(),
            az_deg: self.grid.az_deg(),
            values,
        })
    }
}

impl FieldRenderer for HorizonProjector {
    type Output = HorizonMap;

    fn render(&self, field: &Field) -> Result<HorizonMap, Error> {
        self.project(field.tessellation(), field.values())
    }
}
