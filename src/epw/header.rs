use std::io::Write;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::Result;
use crate::models::Site;

/// The eight EPW header lines.
///
/// Measured-year output carries empty DESIGN CONDITIONS, TYPICAL/EXTREME
/// PERIODS, and GROUND TEMPERATURES sections; the statistics they would hold
/// only exist for typical-year files.
#[derive(Debug, Clone, PartialEq)]
pub struct EpwHeader {
    pub city: String,
    pub state: String,
    pub country: String,
    pub source: String,
    pub wmo: String,
    pub latitude: f64,
    /// Degrees east positive, west negative (-180..180)
    pub longitude: f64,
    /// Hours offset from UTC of the data timestamps
    pub time_zone: f64,
    /// Meters above sea level
    pub elevation: f64,
    pub comments_1: String,
    pub comments_2: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EpwHeader {
    /// Header for an AMY build: timestamps stay UTC, so the time zone field
    /// is written as 0.0 and COMMENTS 1 records the convention.
    pub fn for_site(site: &Site, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            city: site.name.clone(),
            state: "-".to_string(),
            country: "USA".to_string(),
            source: "NOAA HRRR analysis".to_string(),
            wmo: "999999".to_string(),
            latitude: site.latitude,
            longitude: site.longitude_signed(),
            time_zone: 0.0,
            elevation: site.elevation.unwrap_or(0.0),
            comments_1: format!(
                "Actual Meteorological Year assembled by gnomy from NOAA HRRR analyses; all timestamps UTC; period {} to {}",
                start, end
            ),
            comments_2: String::new(),
            start,
            end,
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(
            w,
            "LOCATION,{},{},{},{},{},{:.2},{:.2},{:.1},{:.1}",
            self.city,
            self.state,
            self.country,
            self.source,
            self.wmo,
            self.latitude,
            self.longitude,
            self.time_zone,
            self.elevation
        )?;
        writeln!(w, "DESIGN CONDITIONS,0")?;
        writeln!(w, "TYPICAL/EXTREME PERIODS,0")?;
        writeln!(w, "GROUND TEMPERATURES,0")?;
        writeln!(w, "HOLIDAYS/DAYLIGHT SAVINGS,No,0,0,0")?;
        writeln!(w, "COMMENTS 1,{}", self.comments_1)?;
        writeln!(w, "COMMENTS 2,{}", self.comments_2)?;
        writeln!(
            w,
            "DATA PERIODS,1,1,Data,{},{}/{},{}/{}",
            weekday_name(self.start.weekday()),
            self.start.month(),
            self.start.day(),
            self.end.month(),
            self.end.day()
        )?;
        Ok(())
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> EpwHeader {
        let site = Site::new(Some("San Antonio".to_string()), 29.25, -98.31, Some(247.0)).unwrap();
        EpwHeader::for_site(
            &site,
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_header_has_eight_lines() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 8);
    }

    #[test]
    fn test_location_line() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(
            first,
            "LOCATION,San Antonio,-,USA,NOAA HRRR analysis,999999,29.25,-98.31,0.0,247.0"
        );
    }

    #[test]
    fn test_data_periods_weekday() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        // 2022-01-01 was a Saturday
        assert_eq!(
            text.lines().last().unwrap(),
            "DATA PERIODS,1,1,Data,Saturday,1/1,12/31"
        );
    }
}
