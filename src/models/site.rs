use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// A point location inside the HRRR CONUS domain.
///
/// Longitude is stored in the HRRR grid convention, degrees east of the
/// prime meridian (0-360); western-hemisphere inputs given as negative
/// degrees are normalized on construction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Site {
    pub name: String,

    #[validate(range(min = 21.14, max = 52.6))]
    pub latitude: f64,

    #[validate(range(min = 225.9, max = 299.0))]
    pub longitude: f64,

    /// Meters above sea level, written into the EPW LOCATION header
    pub elevation: Option<f64>,
}

impl Site {
    pub fn new(
        name: Option<String>,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
    ) -> Result<Self> {
        let longitude = if longitude < 0.0 {
            360.0 + longitude
        } else {
            longitude
        };

        let name = name.unwrap_or_else(|| format!("{:.2} N {:.2} E", latitude, longitude));

        let site = Self {
            name,
            latitude,
            longitude,
            elevation,
        };
        site.validate()?;
        Ok(site)
    }

    /// Longitude in the -180..180 convention used by the EPW LOCATION line.
    pub fn longitude_signed(&self) -> f64 {
        if self.longitude > 180.0 {
            self.longitude - 360.0
        } else {
            self.longitude
        }
    }

    /// Filesystem-safe name for the per-site cache directory.
    pub fn cache_key(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_longitude_is_normalized() {
        let site = Site::new(None, 29.25, -98.31, None).unwrap();
        assert!((site.longitude - 261.69).abs() < 1e-9);
        assert!((site.longitude_signed() - (-98.31)).abs() < 1e-9);
    }

    #[test]
    fn test_default_name_from_coordinates() {
        let site = Site::new(None, 29.25, 261.69, None).unwrap();
        assert_eq!(site.name, "29.25 N 261.69 E");
        assert_eq!(site.cache_key(), "29.25_n_261.69_e");
    }

    #[test]
    fn test_out_of_domain_rejected() {
        // Hawaii is outside the HRRR CONUS grid
        assert!(Site::new(None, 21.3, -157.85, None).is_err());
        assert!(Site::new(None, 60.0, -98.0, None).is_err());
    }

    #[test]
    fn test_explicit_name_kept() {
        let site = Site::new(Some("San Antonio".to_string()), 29.25, -98.31, None).unwrap();
        assert_eq!(site.name, "San Antonio");
        assert_eq!(site.cache_key(), "san_antonio");
    }
}
