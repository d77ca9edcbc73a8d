use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw HRRR point values for a single analysis hour.
///
/// Field names are the GRIB short names, which double as the column headers
/// of the hourly cache CSVs. Instant fields come from the f00 analysis valid
/// at `valid_time`; accumulated and categorical fields come from the f01
/// forecast of the previous cycle and cover the hour ending at `valid_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub valid_time: DateTime<Utc>,

    // f00 analysis
    pub t2m: Option<f64>,   // 2 m temperature [K]
    pub d2m: Option<f64>,   // 2 m dew point [K]
    pub r2: Option<f64>,    // 2 m relative humidity [%]
    pub sp: Option<f64>,    // surface pressure [Pa]
    pub vbdsf: Option<f64>, // visible beam downward solar flux [W/m2]
    pub vddsf: Option<f64>, // visible diffuse downward solar flux [W/m2]
    pub u10: Option<f64>,   // 10 m u wind, grid-relative [m/s]
    pub v10: Option<f64>,   // 10 m v wind, grid-relative [m/s]
    pub tcc: Option<f64>,   // total cloud cover [%]
    pub lcc: Option<f64>,   // low cloud cover [%]
    pub mcc: Option<f64>,   // mid cloud cover [%]
    pub hcc: Option<f64>,   // high cloud cover [%]
    pub vis: Option<f64>,   // surface visibility [m]
    pub gh: Option<f64>,    // cloud ceiling height [gpm]
    pub pwat: Option<f64>,  // precipitable water [kg/m2]
    pub aotk: Option<f64>,  // aerosol optical thickness
    pub sde: Option<f64>,   // snow depth [m]
    pub gust: Option<f64>,  // surface gust [m/s]
    pub snowc: Option<f64>, // snow cover [%]
    pub tsfc: Option<f64>,  // surface temperature [K]
    pub mdens: Option<f64>, // near-surface smoke [kg/m3]
    pub colmd: Option<f64>, // vertically integrated smoke [kg/m2]

    // f01 forecast, hour-ending accumulations and categorical flags
    pub tp: Option<f64>,    // accumulated precipitation [kg/m2]
    pub ltng: Option<f64>,  // lightning [0/1]
    pub cpofp: Option<f64>, // percent frozen precipitation [%]
    pub prate: Option<f64>, // precipitation rate [kg/m2/s]
    pub csnow: Option<f64>, // categorical snow [0/1]
    pub cicep: Option<f64>, // categorical ice pellets [0/1]
    pub crain: Option<f64>, // categorical rain [0/1]
    pub cfrzr: Option<f64>, // categorical freezing rain [0/1]

    /// Local grid-to-earth wind rotation angle at the site [rad], derived
    /// from the grid definition of the wind message when it was decoded
    pub wind_rot: Option<f64>,
}

impl HourlyRecord {
    pub fn new(valid_time: DateTime<Utc>) -> Self {
        Self {
            valid_time,
            t2m: None,
            d2m: None,
            r2: None,
            sp: None,
            vbdsf: None,
            vddsf: None,
            u10: None,
            v10: None,
            tcc: None,
            lcc: None,
            mcc: None,
            hcc: None,
            vis: None,
            gh: None,
            pwat: None,
            aotk: None,
            sde: None,
            gust: None,
            snowc: None,
            tsfc: None,
            mdens: None,
            colmd: None,
            tp: None,
            ltng: None,
            cpofp: None,
            prate: None,
            csnow: None,
            cicep: None,
            crain: None,
            cfrzr: None,
            wind_rot: None,
        }
    }

    /// Assign a decoded value by GRIB short name. Unknown names are ignored
    /// so a widened variable table cannot corrupt older cache files.
    pub fn set(&mut self, short_name: &str, value: f64) {
        let slot = match short_name {
            "t2m" => &mut self.t2m,
            "d2m" => &mut self.d2m,
            "r2" => &mut self.r2,
            "sp" => &mut self.sp,
            "vbdsf" => &mut self.vbdsf,
            "vddsf" => &mut self.vddsf,
            "u10" => &mut self.u10,
            "v10" => &mut self.v10,
            "tcc" => &mut self.tcc,
            "lcc" => &mut self.lcc,
            "mcc" => &mut self.mcc,
            "hcc" => &mut self.hcc,
            "vis" => &mut self.vis,
            "gh" => &mut self.gh,
            "pwat" => &mut self.pwat,
            "aotk" => &mut self.aotk,
            "sde" => &mut self.sde,
            "gust" => &mut self.gust,
            "snowc" => &mut self.snowc,
            "tsfc" => &mut self.tsfc,
            "mdens" => &mut self.mdens,
            "colmd" => &mut self.colmd,
            "tp" => &mut self.tp,
            "ltng" => &mut self.ltng,
            "cpofp" => &mut self.cpofp,
            "prate" => &mut self.prate,
            "csnow" => &mut self.csnow,
            "cicep" => &mut self.cicep,
            "crain" => &mut self.crain,
            "cfrzr" => &mut self.cfrzr,
            _ => return,
        };
        *slot = Some(value);
    }

    /// True when an hour of categorical snow was reported.
    pub fn snowed(&self) -> bool {
        self.csnow.is_some_and(|v| v > 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_set_by_short_name() {
        let mut rec = HourlyRecord::new(Utc.with_ymd_and_hms(2022, 1, 1, 12, 0, 0).unwrap());
        rec.set("t2m", 285.4);
        rec.set("csnow", 1.0);
        rec.set("nonsense", 1.0);

        assert_eq!(rec.t2m, Some(285.4));
        assert!(rec.snowed());
        assert_eq!(rec.d2m, None);
    }
}
