use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// Solar constant, W/m2 (recent literature value)
pub const SOLAR_CONSTANT: f64 = 1361.0;

/// Linear luminous-efficacy approximation: 1 W/m2 of broadband solar
/// irradiance is about 122 lux outdoors (https://dx.doi.org/10.21227/mxr7-p365)
pub const LUMINOUS_EFFICACY: f64 = 122.0;

/// Solar zenith angle in degrees at a UTC instant, from the NOAA general
/// solar position equations (fractional year, equation of time,
/// declination, hour angle).
pub fn solar_zenith(t: DateTime<Utc>, latitude: f64, longitude_east: f64) -> f64 {
    let gamma = fractional_year(t);

    // equation of time [minutes] and declination [radians]
    let eqtime = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());
    let decl = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let longitude = if longitude_east > 180.0 {
        longitude_east - 360.0
    } else {
        longitude_east
    };
    let time_offset = eqtime + 4.0 * longitude;
    let true_solar_minutes =
        t.hour() as f64 * 60.0 + t.minute() as f64 + t.second() as f64 / 60.0 + time_offset;
    let hour_angle = (true_solar_minutes / 4.0 - 180.0).to_radians();

    let lat = latitude.to_radians();
    let cos_zenith = lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos();
    cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

fn fractional_year(t: DateTime<Utc>) -> f64 {
    2.0 * std::f64::consts::PI / 365.0
        * (t.ordinal() as f64 - 1.0 + (t.hour() as f64 - 12.0) / 24.0)
}

/// Mean zenith angle over the hour ending at `hour_end`, sampled at
/// 5-minute steps (right-labeled).
pub fn mean_zenith(hour_end: DateTime<Utc>, latitude: f64, longitude_east: f64) -> f64 {
    let mut sum = 0.0;
    for k in 0..12 {
        let t = hour_end - Duration::minutes(5 * k);
        sum += solar_zenith(t, latitude, longitude_east);
    }
    sum / 12.0
}

/// Normal-incidence radiation at the top of the atmosphere for a day of
/// the year, W/m2.
pub fn extraterrestrial_direct_normal(day_of_year: u32) -> f64 {
    SOLAR_CONSTANT * (1.0 + 0.033 * (360.0 * day_of_year as f64 / 365.0).to_radians().cos())
}

/// Horizontal projection of the extraterrestrial normal radiation; zero
/// when the sun is below the horizon.
pub fn extraterrestrial_horizontal(zenith_deg: f64, normal: f64) -> f64 {
    (normal * zenith_deg.to_radians().cos()).max(0.0)
}

pub fn irradiance_to_illuminance(irradiance: f64) -> f64 {
    irradiance * LUMINOUS_EFFICACY
}
