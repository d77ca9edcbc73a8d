/// One field to pull from an HRRR file: the inventory line to match and the
/// short name it lands under in [`crate::models::HourlyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GribVariable {
    pub short_name: &'static str,
    pub search: &'static str,
}

const fn var(short_name: &'static str, search: &'static str) -> GribVariable {
    GribVariable { short_name, search }
}

/// Instant fields, read from the f00 analysis valid at the hour.
pub const ANALYSIS_VARIABLES: &[GribVariable] = &[
    var("t2m", ":TMP:2 m above ground:anl"),   // [K]
    var("d2m", ":DPT:2 m above ground:anl"),   // [K]
    var("r2", ":RH:2 m above ground:anl"),     // [%]
    var("sp", ":PRES:surface:anl"),            // [Pa]
    var("vbdsf", ":VBDSF:surface:anl"),        // [W/m2]
    var("vddsf", ":VDDSF:surface:anl"),        // [W/m2]
    var("u10", ":UGRD:10 m above ground:anl"), // [m/s]
    var("v10", ":VGRD:10 m above ground:anl"), // [m/s]
    var("tcc", ":TCDC:entire atmosphere:anl"), // [%]
    var("vis", ":VIS:surface:anl"),            // [m]
    var("gh", ":HGT:cloud ceiling:anl"),       // [gpm]
    var("pwat", ":PWAT:"),                     // [kg/m2]
    var("aotk", ":AOTK:"),                     // optical thickness
    var("sde", ":SNOD:surface:anl"),           // [m]
    // fields needed for the present-weather codes
    var("gust", ":GUST:surface:anl"),            // [m/s]
    var("snowc", ":SNOWC:surface:anl"),          // [%]
    var("tsfc", ":TMP:surface:anl"),             // [K]
    var("lcc", ":LCDC:low cloud layer:anl"),     // [%]
    var("mcc", ":MCDC:middle cloud layer:anl"),  // [%]
    var("hcc", ":HCDC:high cloud layer:anl"),    // [%]
    var("mdens", ":MASSDEN:8 m above ground:anl"), // [kg/m3]
    var("colmd", ":COLMD:"),                     // [kg/m2]
];

/// Hour-accumulated and categorical fields, read from the f01 forecast of
/// the previous cycle so the accumulation covers the hour ending at T.
pub const FORECAST_VARIABLES: &[GribVariable] = &[
    var("tp", ":APCP:"),      // [kg/m2]
    var("ltng", ":LTNG:"),    // [0/1]
    var("cpofp", ":CPOFP:"),  // [%]
    var("prate", ":PRATE:"),  // [kg/m2/s]
    var("csnow", ":CSNOW:"),  // [0/1]
    var("cicep", ":CICEP:"),  // [0/1]
    var("crain", ":CRAIN:"),  // [0/1]
    var("cfrzr", ":CFRZR:"),  // [0/1]
];

/// Land-use category, read once per site for the albedo lookup.
pub const VEGETATION_TYPE: GribVariable = var("vgtyp", ":VGTYP:surface:anl");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_short_names_are_unique() {
        let mut seen = HashSet::new();
        for v in ANALYSIS_VARIABLES.iter().chain(FORECAST_VARIABLES) {
            assert!(seen.insert(v.short_name), "duplicate {}", v.short_name);
        }
    }
}
