pub const STEFAN_BOLTZMANN: f64 = 5.6697e-8;

/// Opaque sky cover (tenths) from layer cloud cover (%).
///
/// Cloud above the low and mid layers scatters rather than blocks; half of
/// it is treated as translucent (https://doi.org/10.1016/0038-092X(74)90017-6).
pub fn opaque_sky_cover(lcc: f64, mcc: f64, tcc: f64) -> f64 {
    let translucent = (tcc - lcc - mcc).clamp(0.0, 100.0) * 0.5;
    (tcc - translucent) / 10.0
}

/// Clark & Allen clear-sky emissivity with Walton's opaque-cover correction.
pub fn sky_emissivity(t_dew_k: f64, opaque_tenths: f64) -> f64 {
    (0.787 + 0.767 * (t_dew_k / 273.0).ln()) + 0.0224 * opaque_tenths
        - 0.0035 * opaque_tenths.powi(2)
        + 0.00028 * opaque_tenths.powi(3)
}

/// Horizontal infrared radiation intensity, W/m2.
pub fn horizontal_infrared(t_dry_k: f64, t_dew_k: f64, opaque_tenths: f64) -> f64 {
    sky_emissivity(t_dew_k, opaque_tenths) * STEFAN_BOLTZMANN * t_dry_k.powi(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_sky_cover_discounts_high_cloud() {
        // overcast low cloud is fully opaque
        assert!((opaque_sky_cover(100.0, 0.0, 100.0) - 10.0).abs() < 1e-9);
        // pure high cloud is half translucent
        assert!((opaque_sky_cover(0.0, 0.0, 100.0) - 5.0).abs() < 1e-9);
        assert_eq!(opaque_sky_cover(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_emissivity_increases_with_cloud() {
        let clear = sky_emissivity(283.15, 0.0);
        let overcast = sky_emissivity(283.15, 10.0);
        assert!(clear > 0.75 && clear < 0.9);
        assert!(overcast > clear);
    }

    #[test]
    fn test_horizontal_infrared_magnitude() {
        // mild clear night: roughly 300-360 W/m2
        let hir = horizontal_infrared(293.15, 283.15, 0.0);
        assert!(hir > 280.0 && hir < 380.0, "hir was {}", hir);
    }
}
