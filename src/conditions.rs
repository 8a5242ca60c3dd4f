//! Observing site, time and the horizon <-> equatorial transform.
//!
//! Angles are radians unless the name says otherwise. Azimuth is measured
//! clockwise from north; longitude is east-positive.

use std::f64::consts::PI;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const MJD_UNIX_EPOCH: f64 = 40587.0;
pub const MJD_J2000: f64 = 51544.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            name: "Cerro Pachon".to_string(),
            lat_deg: -30.2444,
            lon_deg: -70.7494,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub site: Site,
    pub mjd: f64,
}

impl Conditions {
    pub fn new(site: Site, mjd: f64) -> Self {
        Self { site, mjd }
    }

    pub fn lst(&self) -> f64 {
        lst_rad(self.mjd, self.site.lon_deg)
    }

    /// (ra, dec) of a horizon direction at this site and time.
    pub fn equatorial_from_alt_az(&self, alt: f64, az: f64) -> (f64, f64) {
        equatorial_from_alt_az(alt, az, self.site.lat_deg.to_radians(), self.lst())
    }
}

/// RFC 3339 timestamp with an explicit UTC offset, e.g. `2023-08-01T23:00:00-04:00`.
pub fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, Error> {
    Ok(DateTime::parse_from_rfc3339(s.trim())?)
}

pub fn mjd_from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    secs / 86400.0 + MJD_UNIX_EPOCH
}

fn limit_to_two_pi(x: f64) -> f64 {
    x.rem_euclid(2.0 * PI)
}

/// Greenwich mean sidereal time (IAU 1982 polynomial).
pub fn gmst_rad(mjd: f64) -> f64 {
    let d = mjd - MJD_J2000;
    let t = d / 36525.0;
    let gmst_deg =
        280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38710000.0;
    limit_to_two_pi(gmst_deg.to_radians())
}

pub fn lst_rad(mjd: f64, lon_deg: f64) -> f64 {
    limit_to_two_pi(gmst_rad(mjd) + lon_deg.to_radians())
}

/// Returns (ra, dec); ra is in `[0, 2pi)`.
pub fn equatorial_from_alt_az(alt: f64, az: f64, lat: f64, lst: f64) -> (f64, f64) {
    let sin_dec = alt.sin() * lat.sin() + alt.cos() * lat.cos() * az.cos();
    let dec = num::clamp(sin_dec, -1.0, 1.0).asin();
    let hour_angle = f64::atan2(
        -az.sin() * alt.cos(),
        alt.sin() * lat.cos() - alt.cos() * az.cos() * lat.sin(),
    );
    (limit_to_two_pi(lst - hour_angle), dec)
}
