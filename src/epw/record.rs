use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::epw::fields::FIELDS;

/// One hour of an EPW data body.
///
/// Values are `None` until computed; formatting substitutes each column's
/// missing sentinel. Timestamps follow the EPW convention of hours 1-24,
/// where hour h covers the interval ending at h:00.
#[derive(Debug, Clone, PartialEq)]
pub struct EpwRecord {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub data_flags: String,

    pub dry_bulb: Option<f64>,
    pub dew_point: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub station_pressure: Option<f64>,
    pub extraterrestrial_horizontal: Option<f64>,
    pub extraterrestrial_direct_normal: Option<f64>,
    pub horizontal_infrared: Option<f64>,
    pub global_horizontal: Option<f64>,
    pub direct_normal: Option<f64>,
    pub diffuse_horizontal: Option<f64>,
    pub global_illuminance: Option<f64>,
    pub direct_illuminance: Option<f64>,
    pub diffuse_illuminance: Option<f64>,
    pub zenith_luminance: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub total_sky_cover: Option<f64>,
    pub opaque_sky_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub ceiling_height: Option<f64>,
    pub present_weather_observation: Option<u8>,
    pub present_weather_codes: Option<String>,
    pub precipitable_water: Option<f64>,
    pub aerosol_optical_depth: Option<f64>,
    pub snow_depth: Option<f64>,
    pub days_since_snowfall: Option<f64>,
    pub albedo: Option<f64>,
    pub liquid_precip_depth: Option<f64>,
    pub liquid_precip_quantity: Option<f64>,
}

impl EpwRecord {
    /// Empty record labeled for the hour ending at `t` (UTC). Midnight maps
    /// to hour 24 of the previous calendar day.
    pub fn from_timestamp(t: DateTime<Utc>, data_flags: impl Into<String>) -> Self {
        let (date, hour) = if t.hour() == 0 {
            (t.date_naive() - Duration::days(1), 24)
        } else {
            (t.date_naive(), t.hour())
        };

        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            hour,
            minute: 0,
            data_flags: data_flags.into(),
            dry_bulb: None,
            dew_point: None,
            relative_humidity: None,
            station_pressure: None,
            extraterrestrial_horizontal: None,
            extraterrestrial_direct_normal: None,
            horizontal_infrared: None,
            global_horizontal: None,
            direct_normal: None,
            diffuse_horizontal: None,
            global_illuminance: None,
            direct_illuminance: None,
            diffuse_illuminance: None,
            zenith_luminance: None,
            wind_direction: None,
            wind_speed: None,
            total_sky_cover: None,
            opaque_sky_cover: None,
            visibility: None,
            ceiling_height: None,
            present_weather_observation: None,
            present_weather_codes: None,
            precipitable_water: None,
            aerosol_optical_depth: None,
            snow_depth: None,
            days_since_snowfall: None,
            albedo: None,
            liquid_precip_depth: None,
            liquid_precip_quantity: None,
        }
    }

    /// Clear values outside their column's documented limits, returning the
    /// names of the cleared columns. Cleared values format as the sentinel.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let mut cleared = Vec::new();
        for (position, value) in self.numeric_slots() {
            if let Some(v) = *value {
                let field = &FIELDS[position];
                if !field.in_range(v) {
                    *value = None;
                    cleared.push(field.name);
                }
            }
        }
        cleared
    }

    fn numeric_slots(&mut self) -> [(usize, &mut Option<f64>); 27] {
        [
            (6, &mut self.dry_bulb),
            (7, &mut self.dew_point),
            (8, &mut self.relative_humidity),
            (9, &mut self.station_pressure),
            (10, &mut self.extraterrestrial_horizontal),
            (11, &mut self.extraterrestrial_direct_normal),
            (12, &mut self.horizontal_infrared),
            (13, &mut self.global_horizontal),
            (14, &mut self.direct_normal),
            (15, &mut self.diffuse_horizontal),
            (16, &mut self.global_illuminance),
            (17, &mut self.direct_illuminance),
            (18, &mut self.diffuse_illuminance),
            (19, &mut self.zenith_luminance),
            (20, &mut self.wind_direction),
            (21, &mut self.wind_speed),
            (22, &mut self.total_sky_cover),
            (23, &mut self.opaque_sky_cover),
            (24, &mut self.visibility),
            (25, &mut self.ceiling_height),
            (28, &mut self.precipitable_water),
            (29, &mut self.aerosol_optical_depth),
            (30, &mut self.snow_depth),
            (31, &mut self.days_since_snowfall),
            (32, &mut self.albedo),
            (33, &mut self.liquid_precip_depth),
            (34, &mut self.liquid_precip_quantity),
        ]
    }

    /// Render the record as an EPW data row (35 comma-separated columns).
    pub fn to_row(&self) -> String {
        let mut cols: Vec<String> = Vec::with_capacity(FIELDS.len());
        cols.push(self.year.to_string());
        cols.push(self.month.to_string());
        cols.push(self.day.to_string());
        cols.push(self.hour.to_string());
        cols.push(self.minute.to_string());
        cols.push(self.data_flags.clone());

        cols.push(FIELDS[6].format(self.dry_bulb));
        cols.push(FIELDS[7].format(self.dew_point));
        cols.push(FIELDS[8].format(self.relative_humidity));
        cols.push(FIELDS[9].format(self.station_pressure));
        cols.push(FIELDS[10].format(self.extraterrestrial_horizontal));
        cols.push(FIELDS[11].format(self.extraterrestrial_direct_normal));
        cols.push(FIELDS[12].format(self.horizontal_infrared));
        cols.push(FIELDS[13].format(self.global_horizontal));
        cols.push(FIELDS[14].format(self.direct_normal));
        cols.push(FIELDS[15].format(self.diffuse_horizontal));
        cols.push(FIELDS[16].format(self.global_illuminance));
        cols.push(FIELDS[17].format(self.direct_illuminance));
        cols.push(FIELDS[18].format(self.diffuse_illuminance));
        cols.push(FIELDS[19].format(self.zenith_luminance));
        cols.push(FIELDS[20].format(self.wind_direction));
        cols.push(FIELDS[21].format(self.wind_speed));
        cols.push(FIELDS[22].format(self.total_sky_cover));
        cols.push(FIELDS[23].format(self.opaque_sky_cover));
        cols.push(FIELDS[24].format(self.visibility));
        cols.push(FIELDS[25].format(self.ceiling_height));
        cols.push(match self.present_weather_observation {
            Some(code) => code.to_string(),
            None => FIELDS[26].missing.to_string(),
        });
        cols.push(
            self.present_weather_codes
                .clone()
                .unwrap_or_else(|| FIELDS[27].missing.to_string()),
        );
        cols.push(FIELDS[28].format(self.precipitable_water));
        cols.push(FIELDS[29].format(self.aerosol_optical_depth));
        cols.push(FIELDS[30].format(self.snow_depth));
        cols.push(FIELDS[31].format(self.days_since_snowfall));
        cols.push(FIELDS[32].format(self.albedo));
        cols.push(FIELDS[33].format(self.liquid_precip_depth));
        cols.push(FIELDS[34].format(self.liquid_precip_quantity));

        cols.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_midnight_becomes_hour_24() {
        let t = Utc.with_ymd_and_hms(2022, 1, 2, 0, 0, 0).unwrap();
        let rec = EpwRecord::from_timestamp(t, "NOAA HRRR");
        assert_eq!((rec.year, rec.month, rec.day, rec.hour), (2022, 1, 1, 24));

        let t = Utc.with_ymd_and_hms(2022, 1, 1, 13, 0, 0).unwrap();
        let rec = EpwRecord::from_timestamp(t, "NOAA HRRR");
        assert_eq!((rec.day, rec.hour), (1, 13));
    }

    #[test]
    fn test_empty_record_is_all_sentinels() {
        let t = Utc.with_ymd_and_hms(2022, 7, 4, 15, 0, 0).unwrap();
        let row = EpwRecord::from_timestamp(t, "NOAA HRRR").to_row();
        let cols: Vec<&str> = row.split(',').collect();

        assert_eq!(cols.len(), 35);
        assert_eq!(cols[5], "NOAA HRRR");
        assert_eq!(cols[6], "99.9");
        assert_eq!(cols[9], "999999");
        assert_eq!(cols[26], "9");
        assert_eq!(cols[27], "999999999");
        assert_eq!(cols[34], "99");
    }

    #[test]
    fn test_sanitize_clears_out_of_range() {
        let t = Utc.with_ymd_and_hms(2022, 7, 4, 15, 0, 0).unwrap();
        let mut rec = EpwRecord::from_timestamp(t, "NOAA HRRR");
        rec.dry_bulb = Some(31.2);
        rec.relative_humidity = Some(140.0);
        rec.wind_speed = Some(61.0);

        let cleared = rec.sanitize();
        assert_eq!(cleared, vec!["relative humidity", "wind speed"]);
        assert_eq!(rec.dry_bulb, Some(31.2));
        assert_eq!(rec.relative_humidity, None);
    }

    #[test]
    fn test_row_formatting() {
        let t = Utc.with_ymd_and_hms(2022, 7, 4, 15, 0, 0).unwrap();
        let mut rec = EpwRecord::from_timestamp(t, "NOAA HRRR");
        rec.dry_bulb = Some(30.04);
        rec.wind_direction = Some(182.6);
        rec.wind_speed = Some(4.27);
        rec.present_weather_observation = Some(0);
        rec.present_weather_codes = Some("909999999".to_string());

        let row = rec.to_row();
        let cols: Vec<&str> = row.split(',').collect();
        assert_eq!(cols[0..5], ["2022", "7", "4", "15", "0"]);
        assert_eq!(cols[6], "30.0");
        assert_eq!(cols[20], "183");
        assert_eq!(cols[21], "4.3");
        assert_eq!(cols[26], "0");
        assert_eq!(cols[27], "909999999");
    }
}
