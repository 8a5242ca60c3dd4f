//! Dense reward fields built from sparse per-pixel observations.

use serde::{Deserialize, Serialize};

use scorus::healpix::pix::pix2ang_ring;

use crate::{
    error::AggregateError,
    tessellation::{nearest_pixel, Tessellation},
};

/// Value written to every pixel without a usable reward.
pub const SENTINEL: f64 = f64::NEG_INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Reward {
    Value(f64),
    Infeasible,
}

impl From<f64> for Reward {
    fn from(x: f64) -> Self {
        if x.is_finite() {
            Reward::Value(x)
        } else {
            Reward::Infeasible
        }
    }
}

impl From<Option<f64>> for Reward {
    fn from(x: Option<f64>) -> Self {
        x.map_or(Reward::Infeasible, Reward::from)
    }
}

impl From<Reward> for Option<f64> {
    fn from(r: Reward) -> Self {
        match r {
            Reward::Value(x) => Some(x),
            Reward::Infeasible => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, Reward)", into = "(i64, Reward)")]
pub struct Observation {
    pub pixel: i64,
    pub reward: Reward,
}

impl Observation {
    pub fn new(pixel: i64, reward: impl Into<Reward>) -> Self {
        Self {
            pixel,
            reward: reward.into(),
        }
    }

    pub fn infeasible(pixel: i64) -> Self {
        Self {
            pixel,
            reward: Reward::Infeasible,
        }
    }
}

impl From<(i64, Reward)> for Observation {
    fn from((pixel, reward): (i64, Reward)) -> Self {
        Self { pixel, reward }
    }
}

impl From<Observation> for (i64, Reward) {
    fn from(o: Observation) -> Self {
        (o.pixel, o.reward)
    }
}

/// One value per pixel of a tessellation, RING ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    tessellation: Tessellation,
    values: Vec<f64>,
}

impl Field {
    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_feasible(&self, pixel: usize) -> bool {
        self.values.get(pixel).map_or(false, |x| x.is_finite())
    }

    pub fn feasible_pixels(&self) -> usize {
        self.values.iter().filter(|x| x.is_finite()).count()
    }

    pub fn feasible_area_deg2(&self) -> f64 {
        self.feasible_pixels() as f64 * self.tessellation.pixel_area_deg2()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .cloned()
            .filter(|x| x.is_finite())
            .fold(None, |acc, x| Some(acc.map_or(x, |m: f64| m.max(x))))
    }

    /// Resample onto another resolution, each new pixel taking the value of
    /// the old pixel nearest its centre.
    pub fn regrid(&self, nside: i64) -> Result<Field, AggregateError> {
        let target = Tessellation::new(nside)?;
        if target == self.tessellation {
            return Ok(self.clone());
        }
        let observations: Vec<_> = (0..target.npix())
            .map(|i| {
                let dir = pix2ang_ring::<f64>(target.nside(), i);
                let p = nearest_pixel(self.tessellation.nside(), dir);
                Observation::new(i as i64, self.values[p])
            })
            .collect();
        aggregate(nside, &observations)
    }

    pub(crate) fn fill(&mut self, x: f64) {
        self.values.iter_mut().for_each(|v| *v = x);
    }

    /// `self += weight * other` pixel by pixel. A sentinel on either side,
    /// or any non-finite result, leaves the pixel at the sentinel.
    pub(crate) fn accumulate(&mut self, other: &Field, weight: f64) {
        debug_assert_eq!(self.tessellation, other.tessellation);
        for (a, &b) in self.values.iter_mut().zip(other.values.iter()) {
            let x = *a + weight * b;
            *a = if x.is_finite() { x } else { SENTINEL };
        }
    }
}

/// Build a dense field from sparse observations.
///
/// Everything is validated before the output is allocated, so the call
/// either returns a complete field or fails without partial work. Pixels
/// that are never observed, or whose last observation is infeasible, hold
/// [`SENTINEL`].
pub fn aggregate(nside: i64, observations: &[Observation]) -> Result<Field, AggregateError> {
    let tessellation = Tessellation::new(nside)?;
    let npix = tessellation.npix();
    if let Some(bad) = observations
        .iter()
        .find(|o| !tessellation.contains(o.pixel))
    {
        return Err(AggregateError::PixelIndexOutOfRange {
            index: bad.pixel,
            npix,
        });
    }

    let mut values = Vec::new();
    values
        .try_reserve_exact(npix)
        .map_err(|_| AggregateError::InvalidResolution { nside })?;
    values.resize(npix, SENTINEL);
    for o in observations {
        values[o.pixel as usize] = match o.reward {
            Reward::Value(x) if x.is_finite() => x,
            _ => SENTINEL,
        };
    }
    Ok(Field {
        tessellation,
        values,
    })
}
