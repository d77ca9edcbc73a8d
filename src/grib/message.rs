use crate::error::{GnomyError, Result};
use crate::grib::grid::LambertGrid;
use crate::grib::packing::{
    unpack_complex, unpack_simple, ComplexParams, PackingParams, SpatialDiff,
};

const INDICATOR_LEN: usize = 16;

/// A single decoded GRIB2 message: grid definition plus the unpacked field.
/// Bitmapped-out points are held as NaN internally and surface as `None`.
pub struct GribMessage {
    pub discipline: u8,
    pub grid: LambertGrid,
    values: Vec<f64>,
}

impl GribMessage {
    /// Decode one GRIB2 message from the start of `buf` (trailing bytes are
    /// ignored, so a byte range slightly wider than the message is fine).
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < INDICATOR_LEN || &buf[0..4] != b"GRIB" {
            return Err(GnomyError::Grib("missing GRIB indicator".to_string()));
        }
        if buf[7] != 2 {
            return Err(GnomyError::Grib(format!(
                "unsupported GRIB edition {}",
                buf[7]
            )));
        }
        let discipline = buf[6];
        let total_len = read_u64(buf, 8)? as usize;
        if buf.len() < total_len {
            return Err(GnomyError::Grib(format!(
                "message truncated: {} of {} bytes",
                buf.len(),
                total_len
            )));
        }
        let msg = &buf[..total_len];

        let mut grid: Option<(LambertGrid, usize)> = None;
        let mut representation: Option<Representation> = None;
        let mut bitmap: Option<Vec<bool>> = None;
        let mut data: Option<&[u8]> = None;

        let mut pos = INDICATOR_LEN;
        while pos + 4 <= msg.len() {
            if &msg[pos..pos + 4] == b"7777" {
                break;
            }
            let sec_len = read_u32(msg, pos)? as usize;
            if sec_len < 5 || pos + sec_len > msg.len() {
                return Err(GnomyError::Grib(format!(
                    "bad section length {} at offset {}",
                    sec_len, pos
                )));
            }
            let section = &msg[pos..pos + sec_len];
            match section[4] {
                1 | 2 | 4 => {}
                3 => grid = Some(parse_grid_section(section)?),
                5 => representation = Some(parse_representation_section(section)?),
                6 => bitmap = parse_bitmap_section(section, grid_points(&grid)?)?,
                7 => {
                    data = Some(&section[5..]);
                    break;
                }
                other => {
                    return Err(GnomyError::Grib(format!("unexpected section {}", other)));
                }
            }
            pos += sec_len;
        }

        let (grid, num_points) =
            grid.ok_or_else(|| GnomyError::Grib("no grid definition section".to_string()))?;
        let representation = representation
            .ok_or_else(|| GnomyError::Grib("no data representation section".to_string()))?;
        let data = data.ok_or_else(|| GnomyError::Grib("no data section".to_string()))?;

        if grid.nx * grid.ny != num_points {
            return Err(GnomyError::Grib(format!(
                "grid is {}x{} but section 3 declares {} points",
                grid.nx, grid.ny, num_points
            )));
        }

        let packed = representation.unpack(data)?;
        let values = match &bitmap {
            None => {
                if packed.len() != num_points {
                    return Err(GnomyError::Grib(format!(
                        "unpacked {} values for {} grid points",
                        packed.len(),
                        num_points
                    )));
                }
                packed
            }
            Some(map) => {
                let mut full = Vec::with_capacity(num_points);
                let mut it = packed.into_iter();
                for &present in map {
                    if present {
                        full.push(it.next().ok_or_else(|| {
                            GnomyError::Grib("bitmap claims more values than packed".to_string())
                        })?);
                    } else {
                        full.push(f64::NAN);
                    }
                }
                full
            }
        };

        Ok(Self {
            discipline,
            grid,
            values,
        })
    }

    /// Field value at the grid point nearest the location, `None` where the
    /// bitmap marks the point missing.
    pub fn value_near(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        let (i, j) = self
            .grid
            .nearest_index(lat, lon)
            .ok_or_else(|| GnomyError::Grib("location outside the message grid".to_string()))?;
        let v = self.values[j * self.grid.nx + i];
        Ok((!v.is_nan()).then_some(v))
    }
}

struct Representation {
    num_packed: usize,
    params: PackingParams,
    template: u16,
    complex: Option<ComplexParams>,
    spatial: Option<SpatialDiff>,
}

impl Representation {
    fn unpack(&self, data: &[u8]) -> Result<Vec<f64>> {
        match self.template {
            0 => unpack_simple(data, self.num_packed, &self.params),
            2 | 3 => unpack_complex(
                data,
                self.num_packed,
                &self.params,
                self.complex.as_ref().ok_or_else(|| {
                    GnomyError::Grib("complex template without group layout".to_string())
                })?,
                self.spatial.as_ref(),
            ),
            other => Err(GnomyError::UnsupportedTemplate {
                kind: "data representation",
                number: other,
            }),
        }
    }
}

fn grid_points(grid: &Option<(LambertGrid, usize)>) -> Result<usize> {
    grid.as_ref()
        .map(|(_, n)| *n)
        .ok_or_else(|| GnomyError::Grib("bitmap section before grid definition".to_string()))
}

/// Section 3, template 3.30 (Lambert conformal).
fn parse_grid_section(section: &[u8]) -> Result<(LambertGrid, usize)> {
    let num_points = read_u32(section, 6)? as usize;
    let template = read_u16(section, 12)?;
    if template != 30 {
        return Err(GnomyError::UnsupportedTemplate {
            kind: "grid definition",
            number: template,
        });
    }
    if section.len() < 73 {
        return Err(GnomyError::Grib("grid definition section too short".to_string()));
    }

    let shape = section[14];
    let earth_radius = match shape {
        0 => 6_367_470.0,
        1 => {
            let factor = section[15] as i32;
            let scaled = read_u32(section, 16)? as f64;
            scaled / 10f64.powi(factor)
        }
        6 => 6_371_229.0,
        other => {
            return Err(GnomyError::Grib(format!(
                "unsupported earth shape {}",
                other
            )));
        }
    };

    let nx = read_u32(section, 30)? as usize;
    let ny = read_u32(section, 34)? as usize;
    let la1 = read_i32_sm(section, 38)? as f64 * 1e-6;
    let lo1 = read_u32(section, 42)? as f64 * 1e-6;
    let resolution_flags = section[46];
    let lad = read_i32_sm(section, 47)? as f64 * 1e-6;
    let lov = read_u32(section, 51)? as f64 * 1e-6;
    let dx = read_u32(section, 55)? as f64 * 1e-3;
    let dy = read_u32(section, 59)? as f64 * 1e-3;
    let scanning_mode = section[64];
    let latin1 = read_i32_sm(section, 65)? as f64 * 1e-6;
    let latin2 = read_i32_sm(section, 69)? as f64 * 1e-6;

    let grid = LambertGrid {
        nx,
        ny,
        la1,
        lo1,
        lad,
        lov,
        dx,
        dy,
        latin1,
        latin2,
        earth_radius,
        winds_grid_relative: resolution_flags & 0x08 != 0,
        scan_negative_i: scanning_mode & 0x80 != 0,
        scan_positive_j: scanning_mode & 0x40 != 0,
    };
    Ok((grid, num_points))
}

/// Section 5, templates 5.0 / 5.2 / 5.3.
fn parse_representation_section(section: &[u8]) -> Result<Representation> {
    let num_packed = read_u32(section, 5)? as usize;
    let template = read_u16(section, 9)?;

    if !matches!(template, 0 | 2 | 3) {
        return Err(GnomyError::UnsupportedTemplate {
            kind: "data representation",
            number: template,
        });
    }
    if section.len() < 21 {
        return Err(GnomyError::Grib("representation section too short".to_string()));
    }

    let params = PackingParams {
        reference: read_f32(section, 11)? as f64,
        binary_scale: read_i16_sm(section, 15)?,
        decimal_scale: read_i16_sm(section, 17)?,
        bits: section[19] as u32,
    };

    let mut complex = None;
    let mut spatial = None;
    if template == 2 || template == 3 {
        if section.len() < 47 {
            return Err(GnomyError::Grib("complex packing section too short".to_string()));
        }
        let missing_management = section[22];
        if missing_management != 0 {
            return Err(GnomyError::Grib(format!(
                "missing value management {} not supported",
                missing_management
            )));
        }
        complex = Some(ComplexParams {
            num_groups: read_u32(section, 31)? as usize,
            group_width_reference: section[35] as u32,
            group_width_bits: section[36] as u32,
            group_length_reference: read_u32(section, 37)?,
            group_length_increment: section[41] as u32,
            last_group_length: read_u32(section, 42)?,
            group_length_bits: section[46] as u32,
        });
        if template == 3 {
            if section.len() < 49 {
                return Err(GnomyError::Grib(
                    "spatial differencing section too short".to_string(),
                ));
            }
            spatial = Some(SpatialDiff {
                order: section[47],
                extra_octets: section[48],
            });
        }
    }

    Ok(Representation {
        num_packed,
        params,
        template,
        complex,
        spatial,
    })
}

/// Section 6. Returns the expanded bitmap, or None when every point is
/// present (indicator 255).
fn parse_bitmap_section(section: &[u8], num_points: usize) -> Result<Option<Vec<bool>>> {
    match section[5] {
        255 => Ok(None),
        0 => {
            let data = &section[6..];
            if data.len() * 8 < num_points {
                return Err(GnomyError::Grib("bitmap shorter than grid".to_string()));
            }
            let mut map = Vec::with_capacity(num_points);
            for k in 0..num_points {
                map.push((data[k >> 3] >> (7 - (k & 7))) & 1 == 1);
            }
            Ok(Some(map))
        }
        other => Err(GnomyError::Grib(format!(
            "bitmap indicator {} not supported",
            other
        ))),
    }
}

fn checked(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buf.get(offset..offset + len)
        .ok_or_else(|| GnomyError::Grib(format!("read past end at offset {}", offset)))
}

fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    let b = checked(buf, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    let b = checked(buf, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64> {
    let b = checked(buf, offset, 8)?;
    Ok(u64::from_be_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}

fn read_f32(buf: &[u8], offset: usize) -> Result<f32> {
    Ok(f32::from_bits(read_u32(buf, offset)?))
}

/// GRIB2 signed integers are sign-magnitude: the top bit carries the sign.
fn read_i16_sm(buf: &[u8], offset: usize) -> Result<i32> {
    let raw = read_u16(buf, offset)?;
    if raw & 0x8000 != 0 {
        Ok(-((raw & 0x7fff) as i32))
    } else {
        Ok(raw as i32)
    }
}

fn read_i32_sm(buf: &[u8], offset: usize) -> Result<i32> {
    let raw = read_u32(buf, offset)?;
    if raw & 0x8000_0000 != 0 {
        Ok(-((raw & 0x7fff_ffff) as i32))
    } else {
        Ok(raw as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a minimal GRIB2 message: 2x2 Lambert grid, simple packing.
    fn build_message(values: [u8; 4], bitmap: Option<[bool; 4]>) -> Vec<u8> {
        let mut msg: Vec<u8> = Vec::new();

        // section 1 (identification) - minimal 21-byte body
        let mut sec1 = vec![0u8; 21];
        sec1[..4].copy_from_slice(&21u32.to_be_bytes());
        sec1[4] = 1;

        // section 3: template 3.30
        let mut sec3 = vec![0u8; 81];
        sec3[4] = 3;
        sec3[5] = 0;
        sec3[6..10].copy_from_slice(&4u32.to_be_bytes()); // 2x2 points
        sec3[12..14].copy_from_slice(&30u16.to_be_bytes());
        sec3[14] = 6; // spherical earth, r = 6371229
        sec3[30..34].copy_from_slice(&2u32.to_be_bytes()); // nx
        sec3[34..38].copy_from_slice(&2u32.to_be_bytes()); // ny
        sec3[38..42].copy_from_slice(&38_000_000u32.to_be_bytes()); // la1 = 38.0
        sec3[42..46].copy_from_slice(&262_000_000u32.to_be_bytes()); // lo1 = 262.0
        sec3[46] = 0x08; // winds grid-relative
        sec3[47..51].copy_from_slice(&38_500_000u32.to_be_bytes()); // lad
        sec3[51..55].copy_from_slice(&262_500_000u32.to_be_bytes()); // lov
        sec3[55..59].copy_from_slice(&3_000_000u32.to_be_bytes()); // dx = 3000 m
        sec3[59..63].copy_from_slice(&3_000_000u32.to_be_bytes()); // dy
        sec3[64] = 0x40; // scan +i, +j
        sec3[65..69].copy_from_slice(&38_500_000u32.to_be_bytes()); // latin1
        sec3[69..73].copy_from_slice(&38_500_000u32.to_be_bytes()); // latin2
        let len3 = sec3.len() as u32;
        sec3[..4].copy_from_slice(&len3.to_be_bytes());

        // section 4 (product definition) - skipped content
        let mut sec4 = vec![0u8; 34];
        sec4[..4].copy_from_slice(&34u32.to_be_bytes());
        sec4[4] = 4;

        // section 5: template 5.0, 8 bits per value, R=0, E=0, D=0
        let packed: Vec<u8> = match &bitmap {
            None => values.to_vec(),
            Some(map) => values
                .iter()
                .zip(map.iter())
                .filter(|(_, &m)| m)
                .map(|(&v, _)| v)
                .collect(),
        };
        let mut sec5 = vec![0u8; 21];
        sec5[4] = 5;
        sec5[5..9].copy_from_slice(&(packed.len() as u32).to_be_bytes());
        sec5[9..11].copy_from_slice(&0u16.to_be_bytes());
        sec5[11..15].copy_from_slice(&0f32.to_bits().to_be_bytes());
        sec5[19] = 8;
        let len5 = sec5.len() as u32;
        sec5[..4].copy_from_slice(&len5.to_be_bytes());

        // section 6: bitmap
        let sec6 = match &bitmap {
            None => {
                let mut s = vec![0u8; 6];
                s[..4].copy_from_slice(&6u32.to_be_bytes());
                s[4] = 6;
                s[5] = 255;
                s
            }
            Some(map) => {
                let mut byte = 0u8;
                for (k, &m) in map.iter().enumerate() {
                    if m {
                        byte |= 1 << (7 - k);
                    }
                }
                let mut s = vec![0u8; 7];
                s[..4].copy_from_slice(&7u32.to_be_bytes());
                s[4] = 6;
                s[5] = 0;
                s[6] = byte;
                s
            }
        };

        // section 7: data
        let mut sec7 = vec![0u8; 5];
        sec7.extend_from_slice(&packed);
        let len7 = sec7.len() as u32;
        sec7[..4].copy_from_slice(&len7.to_be_bytes());
        sec7[4] = 7;

        let body_len: usize = sec1.len() + sec3.len() + sec4.len() + sec5.len() + sec6.len() + sec7.len();
        let total = INDICATOR_LEN + body_len + 4;

        msg.extend_from_slice(b"GRIB");
        msg.extend_from_slice(&[0, 0]);
        msg.push(0); // discipline: meteorological
        msg.push(2); // edition
        msg.extend_from_slice(&(total as u64).to_be_bytes());
        msg.extend_from_slice(&sec1);
        msg.extend_from_slice(&sec3);
        msg.extend_from_slice(&sec4);
        msg.extend_from_slice(&sec5);
        msg.extend_from_slice(&sec6);
        msg.extend_from_slice(&sec7);
        msg.extend_from_slice(b"7777");
        msg
    }

    #[test]
    fn test_parse_and_sample_simple_message() {
        let msg = build_message([10, 20, 30, 40], None);
        let decoded = GribMessage::parse(&msg).unwrap();

        assert_eq!(decoded.grid.nx, 2);
        assert_eq!(decoded.grid.ny, 2);
        assert!(decoded.grid.winds_grid_relative);

        // the first grid point holds the first value
        let v = decoded
            .value_near(decoded.grid.la1, decoded.grid.lo1)
            .unwrap();
        assert_eq!(v, Some(10.0));
    }

    #[test]
    fn test_bitmapped_point_is_missing() {
        let msg = build_message([10, 0, 30, 40], Some([true, false, true, true]));
        let decoded = GribMessage::parse(&msg).unwrap();

        assert_eq!(
            decoded
                .value_near(decoded.grid.la1, decoded.grid.lo1)
                .unwrap(),
            Some(10.0)
        );

        // grid point (1, 0) sits one dx east of the origin
        let lon_step = 3000.0 / 6_371_229.0 / decoded.grid.la1.to_radians().cos();
        let lon = decoded.grid.lo1 + lon_step.to_degrees();
        assert_eq!(decoded.value_near(decoded.grid.la1, lon).unwrap(), None);
    }

    #[test]
    fn test_truncated_message_rejected() {
        let msg = build_message([1, 2, 3, 4], None);
        assert!(GribMessage::parse(&msg[..msg.len() - 10]).is_err());
    }

    #[test]
    fn test_non_grib_bytes_rejected() {
        assert!(GribMessage::parse(b"NOT A GRIB MESSAGE AT ALL").is_err());
    }
}
