//! HEALPix resolution bookkeeping.
//!
//! Only the pixel count matters for aggregation; geometry is looked up
//! through `scorus::healpix` when a field is projected or resampled.

use scorus::{coordinates::SphCoord, healpix::interp::get_interpol_ring};

use crate::error::AggregateError;

/// Solid angle of the full sphere in square degrees.
pub const FULL_SKY_DEG2: f64 = 41_252.961_249_419_27;

/// Largest resolution HEALPix defines.
pub const NSIDE_MAX: i64 = 1 << 29;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tessellation {
    nside: usize,
    npix: usize,
}

impl Tessellation {
    pub fn new(nside: i64) -> Result<Self, AggregateError> {
        let invalid = AggregateError::InvalidResolution { nside };
        if !(1..=NSIDE_MAX).contains(&nside) {
            return Err(invalid);
        }
        let n = usize::try_from(nside).map_err(|_| invalid)?;
        // a dense f64 map must stay addressable
        let npix = n
            .checked_mul(n)
            .and_then(|n2| n2.checked_mul(12))
            .filter(|&npix| npix <= isize::MAX as usize / std::mem::size_of::<f64>())
            .ok_or(invalid)?;
        Ok(Self { nside: n, npix })
    }

    /// Recover the tessellation from the length of a dense map.
    pub fn from_npix(npix: usize) -> Result<Self, AggregateError> {
        let invalid = AggregateError::InvalidResolution {
            nside: i64::try_from(npix / 12).unwrap_or(i64::MAX),
        };
        if npix == 0 || npix % 12 != 0 {
            return Err(invalid);
        }
        let n2 = npix / 12;
        let nside = (n2 as f64).sqrt().round() as usize;
        if nside * nside != n2 {
            return Err(invalid);
        }
        Ok(Self { nside, npix })
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    pub fn npix(&self) -> usize {
        self.npix
    }

    pub fn contains(&self, pixel: i64) -> bool {
        usize::try_from(pixel).map_or(false, |p| p < self.npix)
    }

    pub fn pixel_area_deg2(&self) -> f64 {
        FULL_SKY_DEG2 / self.npix as f64
    }
}

/// RING pixel whose centre is closest to `dir` (largest interpolation weight).
pub fn nearest_pixel(nside: usize, dir: SphCoord<f64>) -> usize {
    let (pix, wgt) = get_interpol_ring(nside, dir);
    pix.iter()
        .zip(wgt.iter())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(&p, _)| p)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorus::healpix::utils::nside2npix;

    #[test]
    fn test_pixel_count() {
        for nside in [1_i64, 2, 8, 16, 32] {
            let t = Tessellation::new(nside).unwrap();
            assert_eq!(t.npix(), 12 * (nside * nside) as usize);
            assert_eq!(t.npix(), nside2npix(nside as usize));
        }
    }

    #[test]
    fn test_non_positive_nside() {
        assert_eq!(
            Tessellation::new(0),
            Err(AggregateError::InvalidResolution { nside: 0 })
        );
        assert_eq!(
            Tessellation::new(-3),
            Err(AggregateError::InvalidResolution { nside: -3 })
        );
    }

    #[test]
    fn test_overflowing_nside() {
        assert!(Tessellation::new(i64::MAX).is_err());
        assert_eq!(
            Tessellation::new(NSIDE_MAX + 1),
            Err(AggregateError::InvalidResolution { nside: NSIDE_MAX + 1 })
        );
        // 12 * 2^58 f64 values do not fit in an address space
        assert!(Tessellation::new(NSIDE_MAX).is_err());
    }

    #[test]
    fn test_from_npix() {
        assert_eq!(Tessellation::from_npix(3072).unwrap().nside(), 16);
        assert!(Tessellation::from_npix(0).is_err());
        assert!(Tessellation::from_npix(13).is_err());
        assert!(Tessellation::from_npix(24).is_err());
    }

    #[test]
    fn test_contains() {
        let t = Tessellation::new(1).unwrap();
        assert!(t.contains(0));
        assert!(t.contains(11));
        assert!(!t.contains(12));
        assert!(!t.contains(-1));
    }

    #[test]
    fn test_nearest_pixel_of_centres() {
        use scorus::healpix::pix::pix2ang_ring;
        for i in [0_usize, 5, 40, 100, 191] {
            assert_eq!(nearest_pixel(4, pix2ang_ring::<f64>(4, i)), i);
        }
    }

    #[test]
    fn test_pixel_area() {
        let t = Tessellation::new(1).unwrap();
        assert!((t.pixel_area_deg2() * 12.0 - FULL_SKY_DEG2).abs() < 1e-9);
    }
}
