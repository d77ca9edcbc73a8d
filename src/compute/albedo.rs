//! Surface albedo by MODIS-modified IGBP land-use category, the
//! classification carried in the HRRR VGTYP field.

const LAND_USE: &[(u32, &str, f64)] = &[
    (1, "Evergreen Needleleaf Forest", 0.12),
    (2, "Evergreen Broadleaf Forest", 0.12),
    (3, "Deciduous Needleleaf Forest", 0.15),
    (4, "Deciduous Broadleaf Forest", 0.15),
    (5, "Mixed Forests", 0.12),
    (6, "Closed Shrublands", 0.18),
    (7, "Open Shrublands", 0.15),
    (8, "Woody Savannas", 0.18),
    (9, "Savannas", 0.12),
    (10, "Grasslands", 0.20),
    (11, "Permanent Wetlands", 0.18),
    (12, "Croplands", 0.18),
    (13, "Urban and Built-up", 0.18),
    (14, "Cropland/Natural Vegetation Mosaic", 0.18),
    (15, "Snow and Ice", 0.8),
    (16, "Barren or Sparsely Vegetated", 0.18),
    (17, "Water", 0.08),
    (18, "Wooded Tundra", 0.18),
    (19, "Mixed Tundra", 0.18),
    (20, "Barren Tundra", 0.18),
    (21, "Lakes", 0.08),
];

pub fn albedo_for_vegetation_type(category: u32) -> Option<f64> {
    LAND_USE
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|(_, _, a)| *a)
}

pub fn vegetation_description(category: u32) -> Option<&'static str> {
    LAND_USE
        .iter()
        .find(|(c, _, _)| *c == category)
        .map(|(_, d, _)| *d)
}
