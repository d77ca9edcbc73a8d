/// Rotate grid-relative wind components to earth-relative east/north using
/// the local rotation angle (radians) of the grid projection.
pub fn rotate_to_earth(u: f64, v: f64, rotation: f64) -> (f64, f64) {
    let (sin, cos) = rotation.sin_cos();
    (u * cos + v * sin, v * cos - u * sin)
}

pub fn wind_speed(east: f64, north: f64) -> f64 {
    east.hypot(north)
}

/// Meteorological from-direction, degrees clockwise from north.
/// Calm air reports 0.
pub fn wind_direction(east: f64, north: f64) -> f64 {
    if wind_speed(east, north) < 0.05 {
        return 0.0;
    }
    (180.0 + east.atan2(north).to_degrees()).rem_euclid(360.0)
}
