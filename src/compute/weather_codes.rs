//! The EPW "present weather codes" column: nine digits, one per phenomenon
//! group, 9 meaning not observed. Intensity thresholds follow the EnergyPlus
//! data dictionary (light < 2.5 mm/hr, moderate < 7.6 mm/hr).

/// Everything the code groups can be derived from for one hour.
#[derive(Debug, Clone, Copy)]
pub struct WeatherInputs {
    /// Hour-accumulated precipitation [mm]
    pub precip_mm: f64,
    pub freezing_rain: bool,
    pub ice_pellets: bool,
    pub lightning: bool,
    pub rain: bool,
    pub snow: bool,
    /// Percent of precipitation that is frozen [%]
    pub pct_frozen: f64,
    pub visibility_km: f64,
    /// Surface gust [m/s]
    pub gust: f64,
    /// Vertically integrated smoke [kg/m2]
    pub smoke: f64,
}

pub fn present_weather_codes(w: &WeatherInputs) -> String {
    let mut code = [b'9'; 9];

    if w.lightning {
        code[0] = thunderstorm_code(w.gust);
    }

    if w.precip_mm > 0.0 {
        if w.rain {
            code[1] = rain_code(w.precip_mm, w.freezing_rain);
            code[2] = drizzle_code(w.precip_mm, w.pct_frozen, w.visibility_km, w.gust);
        }
        if w.snow {
            code[3] = snow_code(w.precip_mm, w.ice_pellets);
            code[4] = snow_shower_code(w.precip_mm, w.gust, w.ice_pellets);
        }
        if w.ice_pellets {
            let sleet = sleet_code(w.precip_mm);
            code[5] = sleet;
            code[8] = sleet;
        }
    }

    // smoke and haze are only recorded when they restrict visibility
    if w.visibility_km < 11.0 {
        if let Some(smoke) = smoke_code(w.smoke) {
            code[7] = smoke;
        }
    }

    code.iter().map(|&b| b as char).collect()
}

/// The companion "present weather observation" column: 0 when any group
/// reported, the missing sentinel 9 otherwise.
pub fn present_weather_observation(codes: &str) -> u8 {
    if codes.chars().any(|c| c != '9') {
        0
    } else {
        9
    }
}

/// Ordinary vs heavy/severe thunderstorm on the 25.7 m/s gust threshold.
fn thunderstorm_code(gust: f64) -> u8 {
    if gust > 25.7 {
        b'1'
    } else {
        b'0'
    }
}

fn rain_code(precip_mm: f64, freezing: bool) -> u8 {
    match (freezing, precip_mm) {
        (false, p) if p < 2.5 => b'0',
        (false, p) if p < 7.6 => b'1',
        (false, _) => b'2',
        (true, p) if p < 2.5 => b'6',
        (true, p) if p < 7.6 => b'7',
        (true, _) => b'8',
    }
}

/// Rain squalls when gusty, otherwise drizzle graded by visibility
/// (freezing drizzle when any of the precipitation is frozen).
fn drizzle_code(precip_mm: f64, pct_frozen: f64, visibility_km: f64, gust: f64) -> u8 {
    if gust > 15.0 {
        return if precip_mm < 2.5 { b'0' } else { b'1' };
    }
    if pct_frozen <= 0.0 {
        if visibility_km > 1.0 {
            b'3'
        } else if visibility_km > 0.5 {
            b'4'
        } else {
            b'5'
        }
    } else if visibility_km > 1.0 {
        b'6'
    } else if visibility_km > 0.5 {
        b'7'
    } else {
        b'8'
    }
}

fn snow_code(precip_mm: f64, ice_pellets: bool) -> u8 {
    if ice_pellets {
        // any ice crystal occurrence is recorded as 7
        b'7'
    } else if precip_mm < 2.5 {
        b'0'
    } else if precip_mm < 7.6 {
        b'1'
    } else {
        b'2'
    }
}

fn snow_shower_code(precip_mm: f64, gust: f64, ice_pellets: bool) -> u8 {
    if ice_pellets {
        if precip_mm < 2.5 {
            b'6'
        } else {
            b'7'
        }
    } else if gust > 15.0 {
        if precip_mm < 2.5 {
            b'3'
        } else if precip_mm < 7.6 {
            b'4'
        } else {
            b'5'
        }
    } else if precip_mm < 2.5 {
        b'0'
    } else if precip_mm < 7.6 {
        b'1'
    } else {
        b'2'
    }
}

fn sleet_code(precip_mm: f64) -> u8 {
    if precip_mm < 2.5 {
        b'0'
    } else if precip_mm < 7.6 {
        b'1'
    } else {
        b'2'
    }
}

fn smoke_code(smoke_kg_m2: f64) -> Option<u8> {
    if smoke_kg_m2 > 5e-4 {
        Some(b'1')
    } else if smoke_kg_m2 > 1e-5 {
        Some(b'0')
    } else {
        None
    }
}
