use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::compute::weather_codes::{
    present_weather_codes, present_weather_observation, WeatherInputs,
};
use crate::compute::{sky, solar, wind};
use crate::epw::EpwRecord;
use crate::error::{GnomyError, Result};
use crate::hrrr::{SiteCache, SiteMeta};
use crate::models::{HourlyRecord, Site};
use crate::utils::constants::DATA_SOURCE_FLAG;

const KELVIN_OFFSET: f64 = 273.15;

/// Turns a range of cached hours into EPW records: derived solar, sky,
/// wind, and weather-code quantities are computed here; unit conversions
/// land the raw HRRR values in the columns' documented units.
pub struct AmyBuilder {
    site: Site,
    strict: bool,
    data_flags: String,
}

/// What the assembly pass had to work around.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub hours: usize,
    pub missing_hours: Vec<DateTime<Utc>>,
    /// Column name -> count of values replaced by the missing sentinel
    pub out_of_range: BTreeMap<&'static str, usize>,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Assembled {} hours ({} missing from cache)",
            self.hours,
            self.missing_hours.len()
        );
        if !self.out_of_range.is_empty() {
            out.push_str("\nOut-of-range values written as missing:");
            for (name, count) in &self.out_of_range {
                out.push_str(&format!("\n  {}: {}", name, count));
            }
        }
        out
    }
}

impl AmyBuilder {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            strict: false,
            data_flags: DATA_SOURCE_FLAG.to_string(),
        }
    }

    /// Error on uncached hours instead of emitting all-sentinel rows.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(
        &self,
        cache: &SiteCache,
        hours: &[DateTime<Utc>],
    ) -> Result<(Vec<EpwRecord>, BuildReport)> {
        let meta = cache.read_metadata()?.unwrap_or(SiteMeta {
            vegetation_type: None,
            albedo: None,
        });
        let raw = cache.read_range(hours)?;

        if self.strict {
            let missing: Vec<_> = hours
                .iter()
                .zip(&raw)
                .filter(|(_, slot)| slot.is_none())
                .map(|(t, _)| *t)
                .collect();
            if !missing.is_empty() {
                return Err(GnomyError::MissingData(format!(
                    "{} uncached hours in range (first: {})",
                    missing.len(),
                    missing[0]
                )));
            }
        }

        let snow_days = snow_days(&raw);

        let mut records = Vec::with_capacity(hours.len());
        let mut report = BuildReport {
            hours: hours.len(),
            ..Default::default()
        };

        for (t, slot) in hours.iter().zip(raw.iter()) {
            let mut record = EpwRecord::from_timestamp(*t, self.data_flags.clone());
            match slot {
                None => report.missing_hours.push(*t),
                Some(hourly) => self.fill(&mut record, hourly, *t, &meta, &snow_days),
            }
            for name in record.sanitize() {
                *report.out_of_range.entry(name).or_insert(0) += 1;
            }
            records.push(record);
        }

        Ok((records, report))
    }

    fn fill(
        &self,
        record: &mut EpwRecord,
        hourly: &HourlyRecord,
        t: DateTime<Utc>,
        meta: &SiteMeta,
        snow_days: &BTreeSet<NaiveDate>,
    ) {
        let zenith = solar::mean_zenith(t, self.site.latitude, self.site.longitude);
        let cos_zenith = zenith.to_radians().cos().max(0.0);
        let normal = solar::extraterrestrial_direct_normal(t.ordinal());
        record.extraterrestrial_direct_normal = Some(normal);
        record.extraterrestrial_horizontal = Some(solar::extraterrestrial_horizontal(zenith, normal));

        record.dry_bulb = hourly.t2m.map(|k| k - KELVIN_OFFSET);
        record.dew_point = hourly.d2m.map(|k| k - KELVIN_OFFSET);
        record.relative_humidity = hourly.r2;
        record.station_pressure = hourly.sp;

        let opaque = match (hourly.lcc, hourly.mcc, hourly.tcc) {
            (Some(low), Some(mid), Some(total)) => Some(sky::opaque_sky_cover(low, mid, total)),
            _ => None,
        };
        record.total_sky_cover = hourly.tcc.map(|pct| pct / 10.0);
        record.opaque_sky_cover = opaque;
        if let (Some(dry), Some(dew), Some(opaque)) = (hourly.t2m, hourly.d2m, opaque) {
            record.horizontal_infrared = Some(sky::horizontal_infrared(dry, dew, opaque));
        }

        record.direct_normal = hourly.vbdsf;
        record.diffuse_horizontal = hourly.vddsf;
        let global = match (hourly.vbdsf, hourly.vddsf) {
            (Some(beam), Some(diffuse)) => Some(beam * cos_zenith + diffuse),
            _ => None,
        };
        record.global_horizontal = global;
        record.global_illuminance = global.map(solar::irradiance_to_illuminance);
        record.direct_illuminance = hourly.vbdsf.map(solar::irradiance_to_illuminance);
        record.diffuse_illuminance = hourly.vddsf.map(solar::irradiance_to_illuminance);
        record.zenith_luminance = hourly
            .vbdsf
            .map(|beam| solar::irradiance_to_illuminance(beam * cos_zenith));

        if let (Some(u), Some(v)) = (hourly.u10, hourly.v10) {
            let (east, north) = wind::rotate_to_earth(u, v, hourly.wind_rot.unwrap_or(0.0));
            record.wind_direction = Some(wind::wind_direction(east, north));
            record.wind_speed = Some(wind::wind_speed(east, north));
        }

        record.visibility = hourly.vis.map(|m| m / 1000.0);
        record.ceiling_height = hourly.gh;
        record.precipitable_water = hourly.pwat;
        record.aerosol_optical_depth = hourly.aotk;
        record.snow_depth = hourly.sde.map(|m| m * 100.0);
        record.albedo = meta.albedo;
        record.liquid_precip_depth = hourly.tp;
        // each f01 accumulation covers exactly one hour
        record.liquid_precip_quantity = hourly.tp.and_then(|p| (p > 0.0).then_some(1.0));

        let inputs = WeatherInputs {
            precip_mm: hourly.tp.unwrap_or(0.0),
            freezing_rain: flag(hourly.cfrzr),
            ice_pellets: flag(hourly.cicep),
            lightning: flag(hourly.ltng),
            rain: flag(hourly.crain),
            snow: flag(hourly.csnow),
            pct_frozen: hourly.cpofp.unwrap_or(0.0),
            visibility_km: hourly.vis.map_or(20.0, |m| m / 1000.0),
            gust: hourly.gust.unwrap_or(0.0),
            smoke: hourly.colmd.unwrap_or(0.0),
        };
        let codes = present_weather_codes(&inputs);
        record.present_weather_observation = Some(present_weather_observation(&codes));
        record.present_weather_codes = Some(codes);

        record.days_since_snowfall = days_since_snowfall(t, snow_days);
    }
}

fn flag(value: Option<f64>) -> bool {
    value.is_some_and(|v| v > 0.5)
}

/// Calendar days on which any hour reported categorical snow.
fn snow_days(raw: &[Option<HourlyRecord>]) -> BTreeSet<NaiveDate> {
    raw.iter()
        .flatten()
        .filter(|r| r.snowed())
        .map(|r| r.valid_time.date_naive())
        .collect()
}

/// Days since the most recent snow day at or before `t`, clipped to 99.
/// None before the first snowfall in the built period.
fn days_since_snowfall(t: DateTime<Utc>, snow_days: &BTreeSet<NaiveDate>) -> Option<f64> {
    let date = t.date_naive();
    let last = snow_days.range(..=date).next_back()?;
    Some(((date - *last).num_days().min(99)) as f64)
}
