/// Metadata for one column of an EPW data row.
///
/// `missing` is the sentinel written when a value is absent or rejected;
/// `min`/`max` are the documented physical limits for the column, where the
/// format defines them.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub units: &'static str,
    pub position: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub missing: &'static str,
    pub decimals: usize,
    /// Whether EnergyPlus reads the column during simulation
    pub ep_used: bool,
}

impl FieldSpec {
    pub fn in_range(&self, value: f64) -> bool {
        self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }

    /// Format a value for this column, substituting the missing sentinel for
    /// absent and out-of-range values.
    pub fn format(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if self.in_range(v) => format!("{:.*}", self.decimals, v),
            _ => self.missing.to_string(),
        }
    }
}

const fn spec(
    name: &'static str,
    units: &'static str,
    position: usize,
    min: Option<f64>,
    max: Option<f64>,
    missing: &'static str,
    decimals: usize,
    ep_used: bool,
) -> FieldSpec {
    FieldSpec {
        name,
        units,
        position,
        min,
        max,
        missing,
        decimals,
        ep_used,
    }
}

/// Every column of an EPW data row, in file order.
pub const FIELDS: [FieldSpec; 35] = [
    spec("year", "years", 0, None, None, "", 0, false),
    spec("month", "months", 1, None, None, "", 0, false),
    spec("day", "day", 2, None, None, "", 0, false),
    spec("hour", "hours", 3, None, None, "", 0, false),
    spec("minute", "minutes", 4, None, None, "", 0, false),
    spec("data flags", "none", 5, None, None, "", 0, false),
    spec("dry bulb temperature", "C", 6, Some(-70.0), Some(70.0), "99.9", 1, true),
    spec("dew point temperature", "C", 7, Some(-70.0), Some(70.0), "99.9", 1, true),
    spec("relative humidity", "%", 8, Some(0.0), Some(110.0), "999", 0, true),
    spec("atmospheric station pressure", "Pa", 9, Some(31000.0), Some(120000.0), "999999", 0, true),
    spec("extraterrestrial horizontal radiation", "Wh/m^2", 10, Some(0.0), None, "9999", 0, false),
    spec("extraterrestrial direct normal radiation", "Wh/m^2", 11, Some(0.0), None, "9999", 0, false),
    spec("horizontal infrared radiation intensity", "Wh/m^2", 12, Some(0.0), None, "9999", 0, true),
    spec("global horizontal radiation", "Wh/m^2", 13, Some(0.0), None, "9999", 0, false),
    spec("direct normal radiation", "Wh/m^2", 14, Some(0.0), None, "9999", 0, true),
    spec("diffuse horizontal radiation", "Wh/m^2", 15, Some(0.0), None, "9999", 0, true),
    spec("global horizontal illuminance", "lux", 16, Some(0.0), Some(999998.0), "999999", 0, false),
    spec("direct normal illuminance", "lux", 17, Some(0.0), Some(999998.0), "999999", 0, false),
    spec("diffuse horizontal illuminance", "lux", 18, Some(0.0), Some(999998.0), "999999", 0, false),
    spec("zenith luminance", "Cd/m^2", 19, Some(0.0), Some(9998.0), "9999", 0, false),
    spec("wind direction", "degrees", 20, Some(0.0), Some(360.0), "999", 0, true),
    spec("wind speed", "m/s", 21, Some(0.0), Some(40.0), "999", 1, true),
    spec("total sky cover", "tenths", 22, Some(0.0), Some(10.0), "99", 0, false),
    spec("opaque sky cover", "tenths", 23, Some(0.0), Some(10.0), "99", 0, false),
    spec("visibility", "km", 24, None, None, "999", 1, false),
    spec("ceiling height", "m", 25, None, None, "99999", 0, false),
    spec("present weather observation", "code", 26, None, None, "9", 0, true),
    spec("present weather codes", "code", 27, None, None, "999999999", 0, true),
    spec("precipitable water", "mm", 28, None, None, "999", 1, false),
    spec("aerosol optical depth", "thousandths", 29, None, None, "0.999", 3, false),
    spec("snow depth", "cm", 30, None, None, "999", 0, true),
    spec("days since last snowfall", "days", 31, Some(0.0), Some(99.0), "99", 0, false),
    spec("albedo", "none", 32, None, None, "999", 2, false),
    spec("liquid precipitation depth", "mm", 33, None, None, "999", 1, false),
    spec("liquid precipitation quantity", "hr", 34, None, None, "99", 1, false),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_match_indices() {
        for (i, field) in FIELDS.iter().enumerate() {
            assert_eq!(field.position, i, "field {} out of order", field.name);
        }
    }

    #[test]
    fn test_missing_value_substitution() {
        let dry_bulb = &FIELDS[6];
        assert_eq!(dry_bulb.format(Some(21.55)), "21.6");
        assert_eq!(dry_bulb.format(None), "99.9");
        // beyond the documented limits collapses to the sentinel
        assert_eq!(dry_bulb.format(Some(85.0)), "99.9");

        let wind_speed = &FIELDS[21];
        assert_eq!(wind_speed.format(Some(3.0)), "3.0");
        assert_eq!(wind_speed.format(Some(55.0)), "999");
    }

    #[test]
    fn test_ep_used_flags() {
        // spot-check against the documented table
        assert!(FIELDS[6].ep_used);
        assert!(!FIELDS[10].ep_used);
        assert!(FIELDS[30].ep_used);
        assert!(!FIELDS[34].ep_used);
    }
}
