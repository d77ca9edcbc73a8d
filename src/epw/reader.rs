use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::epw::fields::FIELDS;
use crate::error::{GnomyError, Result};

/// Summary of an existing EPW file, for `gnomy inspect`.
#[derive(Debug, Clone)]
pub struct EpwSummary {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub records: usize,
    pub missing_dry_bulb: usize,
    pub dry_bulb_min: Option<f64>,
    pub dry_bulb_max: Option<f64>,
    pub dry_bulb_mean: Option<f64>,
}

impl EpwSummary {
    pub fn detailed_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Location: {} ({}) at {:.2}, {:.2}\n",
            self.city, self.country, self.latitude, self.longitude
        ));
        out.push_str(&format!("Data rows: {}\n", self.records));
        out.push_str(&format!(
            "Missing dry bulb hours: {}\n",
            self.missing_dry_bulb
        ));
        match (self.dry_bulb_min, self.dry_bulb_mean, self.dry_bulb_max) {
            (Some(min), Some(mean), Some(max)) => {
                out.push_str(&format!(
                    "Dry bulb: min={:.1}C, mean={:.1}C, max={:.1}C",
                    min, mean, max
                ));
            }
            _ => out.push_str("Dry bulb: no valid data"),
        }
        out
    }
}

/// Reads back EPW files written by this crate (or any conforming file).
pub struct EpwReader;

impl EpwReader {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, path: &Path) -> Result<EpwSummary> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut lines = reader.lines();
        let location = lines
            .next()
            .transpose()?
            .ok_or_else(|| GnomyError::InvalidFormat("empty EPW file".to_string()))?;

        let (city, country, latitude, longitude) = parse_location_line(&location)?;

        // skip remaining header lines through DATA PERIODS
        let mut in_body = false;
        let mut records = 0usize;
        let mut missing = 0usize;
        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for line in lines {
            let line = line?;
            if !in_body {
                if line.starts_with("DATA PERIODS") {
                    in_body = true;
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let cols: Vec<&str> = line.split(',').collect();
            if cols.len() < FIELDS.len() {
                return Err(GnomyError::InvalidFormat(format!(
                    "EPW row has {} columns, expected {}",
                    cols.len(),
                    FIELDS.len()
                )));
            }
            records += 1;

            let dry_bulb = cols[6];
            if dry_bulb == FIELDS[6].missing {
                missing += 1;
                continue;
            }
            let value: f64 = dry_bulb.parse().map_err(|_| {
                GnomyError::InvalidFormat(format!("unparseable dry bulb value '{}'", dry_bulb))
            })?;
            sum += value;
            count += 1;
            min = min.min(value);
            max = max.max(value);
        }

        if !in_body {
            return Err(GnomyError::InvalidFormat(
                "no DATA PERIODS header line found".to_string(),
            ));
        }

        Ok(EpwSummary {
            city,
            country,
            latitude,
            longitude,
            records,
            missing_dry_bulb: missing,
            dry_bulb_min: (count > 0).then_some(min),
            dry_bulb_max: (count > 0).then_some(max),
            dry_bulb_mean: (count > 0).then(|| sum / count as f64),
        })
    }

    /// First `n` data rows, verbatim.
    pub fn sample_rows(&self, path: &Path, n: usize) -> Result<Vec<String>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut in_body = false;
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !in_body {
                in_body = line.starts_with("DATA PERIODS");
                continue;
            }
            if rows.len() >= n {
                break;
            }
            if !line.trim().is_empty() {
                rows.push(line);
            }
        }
        Ok(rows)
    }
}

impl Default for EpwReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_location_line(line: &str) -> Result<(String, String, f64, f64)> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 10 || parts[0] != "LOCATION" {
        return Err(GnomyError::InvalidFormat(
            "first line is not a LOCATION header".to_string(),
        ));
    }
    let latitude: f64 = parts[6]
        .parse()
        .map_err(|_| GnomyError::InvalidFormat(format!("bad latitude '{}'", parts[6])))?;
    let longitude: f64 = parts[7]
        .parse()
        .map_err(|_| GnomyError::InvalidFormat(format!("bad longitude '{}'", parts[7])))?;
    Ok((parts[1].to_string(), parts[3].to_string(), latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epw::{EpwHeader, EpwRecord, EpwWriter};
    use crate::models::Site;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_summarize_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.epw");

        let site = Site::new(Some("Austin".to_string()), 30.27, -97.74, None).unwrap();
        let day = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
        let header = EpwHeader::for_site(&site, day, day);

        let mut records = Vec::new();
        for (i, temp) in [Some(20.0), Some(30.0), None].iter().enumerate() {
            let t = Utc
                .with_ymd_and_hms(2022, 6, 1, (i + 1) as u32, 0, 0)
                .unwrap();
            let mut rec = EpwRecord::from_timestamp(t, "NOAA HRRR");
            rec.dry_bulb = *temp;
            records.push(rec);
        }
        EpwWriter::new().write(&header, &records, &path).unwrap();

        let summary = EpwReader::new().summarize(&path).unwrap();
        assert_eq!(summary.city, "Austin");
        assert_eq!(summary.records, 3);
        assert_eq!(summary.missing_dry_bulb, 1);
        assert_eq!(summary.dry_bulb_min, Some(20.0));
        assert_eq!(summary.dry_bulb_max, Some(30.0));
        assert_eq!(summary.dry_bulb_mean, Some(25.0));

        let rows = EpwReader::new().sample_rows(&path, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("2022,6,1,1,0,"));
    }
}
