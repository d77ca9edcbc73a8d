/// Lambert conformal conic grid (GRIB2 grid definition template 3.30),
/// the projection used by the HRRR CONUS domain.
#[derive(Debug, Clone, PartialEq)]
pub struct LambertGrid {
    pub nx: usize,
    pub ny: usize,
    /// First grid point, degrees
    pub la1: f64,
    pub lo1: f64,
    /// Latitude where dx/dy apply, degrees
    pub lad: f64,
    /// Orientation longitude, degrees east
    pub lov: f64,
    /// Grid spacing, meters
    pub dx: f64,
    pub dy: f64,
    pub latin1: f64,
    pub latin2: f64,
    pub earth_radius: f64,
    pub winds_grid_relative: bool,
    pub scan_negative_i: bool,
    pub scan_positive_j: bool,
}

impl LambertGrid {
    /// Cone constant n of the projection.
    pub fn cone(&self) -> f64 {
        let phi1 = self.latin1.to_radians();
        let phi2 = self.latin2.to_radians();
        if (self.latin1 - self.latin2).abs() < 1e-9 {
            phi1.sin()
        } else {
            (phi1.cos() / phi2.cos()).ln()
                / ((std::f64::consts::FRAC_PI_4 + phi2 / 2.0).tan()
                    / (std::f64::consts::FRAC_PI_4 + phi1 / 2.0).tan())
                .ln()
        }
    }

    /// Forward projection to map coordinates in meters (Snyder, spherical
    /// Lambert conformal conic).
    fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let n = self.cone();
        let phi = lat.to_radians();
        let phi1 = self.latin1.to_radians();
        let phi0 = self.lad.to_radians();
        let theta = n * normalize_lon(lon - self.lov).to_radians();

        let f = phi1.cos() * (std::f64::consts::FRAC_PI_4 + phi1 / 2.0).tan().powf(n) / n;
        let rho = self.earth_radius * f / (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().powf(n);
        let rho0 = self.earth_radius * f / (std::f64::consts::FRAC_PI_4 + phi0 / 2.0).tan().powf(n);

        (rho * theta.sin(), rho0 - rho * theta.cos())
    }

    /// Grid indices (i, j) of the point nearest the given location, or None
    /// when the location falls outside the grid.
    pub fn nearest_index(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let (x1, y1) = self.project(self.la1, self.lo1);
        let (x, y) = self.project(lat, lon);

        let mut di = (x - x1) / self.dx;
        let mut dj = (y - y1) / self.dy;
        if self.scan_negative_i {
            di = -di;
        }
        if !self.scan_positive_j {
            dj = -dj;
        }

        let i = di.round();
        let j = dj.round();
        if i < 0.0 || j < 0.0 || i as usize >= self.nx || j as usize >= self.ny {
            return None;
        }
        Some((i as usize, j as usize))
    }

    /// Angle (radians) rotating grid-relative wind components to
    /// earth-relative east/north at the given longitude.
    pub fn wind_rotation(&self, lon: f64) -> f64 {
        self.cone() * normalize_lon(lon - self.lov).to_radians()
    }
}

fn normalize_lon(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}
