use crate::error::{GnomyError, Result};

/// Big-endian bit stream over a byte slice.
pub struct BitReader<'a> {
    buf: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, bit: 0 }
    }

    pub fn read(&mut self, bits: u32) -> Result<u64> {
        if bits == 0 {
            return Ok(0);
        }
        if bits > 64 {
            return Err(GnomyError::Grib(format!("cannot read {} bits at once", bits)));
        }
        if self.bit + bits as usize > self.buf.len() * 8 {
            return Err(GnomyError::Grib("bit stream exhausted".to_string()));
        }

        let mut value = 0u64;
        for _ in 0..bits {
            let byte = self.buf[self.bit >> 3];
            let bit = (byte >> (7 - (self.bit & 7))) & 1;
            value = (value << 1) | bit as u64;
            self.bit += 1;
        }
        Ok(value)
    }

    /// Read a sign-magnitude integer (GRIB2 convention: MSB is the sign).
    pub fn read_signed(&mut self, bits: u32) -> Result<i64> {
        let raw = self.read(bits)?;
        if bits == 0 {
            return Ok(0);
        }
        let sign = 1u64 << (bits - 1);
        if raw & sign != 0 {
            Ok(-((raw & (sign - 1)) as i64))
        } else {
            Ok(raw as i64)
        }
    }
}

/// Scaling shared by the data representation templates:
/// Y = (R + X * 2^E) / 10^D
#[derive(Debug, Clone, Copy)]
pub struct PackingParams {
    pub reference: f64,
    pub binary_scale: i32,
    pub decimal_scale: i32,
    pub bits: u32,
}

impl PackingParams {
    pub fn decode(&self, x: i64) -> f64 {
        (self.reference + x as f64 * 2f64.powi(self.binary_scale)) / 10f64.powi(self.decimal_scale)
    }
}

/// Data template 7.0: fixed-width values.
pub fn unpack_simple(data: &[u8], n: usize, params: &PackingParams) -> Result<Vec<f64>> {
    if params.bits == 0 {
        return Ok(vec![params.decode(0); n]);
    }
    let mut reader = BitReader::new(data);
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let x = reader.read(params.bits)?;
        values.push(params.decode(x as i64));
    }
    Ok(values)
}

/// Group layout for data templates 7.2/7.3 (complex packing).
#[derive(Debug, Clone, Copy)]
pub struct ComplexParams {
    pub num_groups: usize,
    pub group_width_reference: u32,
    pub group_width_bits: u32,
    pub group_length_reference: u32,
    pub group_length_increment: u32,
    pub last_group_length: u32,
    pub group_length_bits: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct SpatialDiff {
    pub order: u8,
    pub extra_octets: u8,
}

/// Data templates 7.2 and 7.3: group-split values, optionally recorded as
/// first- or second-order spatial differences.
pub fn unpack_complex(
    data: &[u8],
    n: usize,
    params: &PackingParams,
    complex: &ComplexParams,
    spatial: Option<&SpatialDiff>,
) -> Result<Vec<f64>> {
    let mut reader = BitReader::new(data);

    // spatial differencing descriptors precede the groups
    let mut initial = Vec::new();
    let mut overall_min = 0i64;
    if let Some(sd) = spatial {
        if sd.order == 0 || sd.order > 2 {
            return Err(GnomyError::Grib(format!(
                "unsupported spatial differencing order {}",
                sd.order
            )));
        }
        let bits = sd.extra_octets as u32 * 8;
        for _ in 0..sd.order {
            initial.push(reader.read_signed(bits)?);
        }
        overall_min = reader.read_signed(bits)?;
    }

    let ng = complex.num_groups;
    let mut references = Vec::with_capacity(ng);
    for _ in 0..ng {
        references.push(reader.read(params.bits)? as i64);
    }

    let mut widths = Vec::with_capacity(ng);
    for _ in 0..ng {
        widths.push(complex.group_width_reference + reader.read(complex.group_width_bits)? as u32);
    }

    let mut lengths = Vec::with_capacity(ng);
    for _ in 0..ng {
        let scaled = reader.read(complex.group_length_bits)? as u32;
        lengths.push(complex.group_length_reference + complex.group_length_increment * scaled);
    }
    if let Some(last) = lengths.last_mut() {
        *last = complex.last_group_length;
    }

    let total: u64 = lengths.iter().map(|&l| l as u64).sum();
    if total != n as u64 {
        return Err(GnomyError::Grib(format!(
            "group lengths sum to {} but {} points are packed",
            total, n
        )));
    }

    let mut xs = Vec::with_capacity(n);
    for g in 0..ng {
        for _ in 0..lengths[g] {
            let raw = reader.read(widths[g])? as i64;
            xs.push(references[g] + raw);
        }
    }

    if let Some(sd) = spatial {
        match sd.order {
            1 => {
                xs[0] = initial[0];
                for k in 1..n {
                    xs[k] += overall_min + xs[k - 1];
                }
            }
            2 => {
                if n < 2 {
                    return Err(GnomyError::Grib(
                        "second-order differencing needs at least two points".to_string(),
                    ));
                }
                xs[0] = initial[0];
                xs[1] = initial[1];
                for k in 2..n {
                    xs[k] += overall_min + 2 * xs[k - 1] - xs[k - 2];
                }
            }
            _ => unreachable!(),
        }
    }

    Ok(xs.into_iter().map(|x| params.decode(x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Append `bits` low bits of `value` to a big-endian bit buffer.
    fn push_bits(buf: &mut Vec<u8>, cursor: &mut usize, value: u64, bits: u32) {
        for i in (0..bits).rev() {
            let bit = ((value >> i) & 1) as u8;
            if *cursor % 8 == 0 {
                buf.push(0);
            }
            let byte = buf.last_mut().unwrap();
            *byte |= bit << (7 - (*cursor % 8));
            *cursor += 1;
        }
    }

    #[test]
    fn test_bit_reader_crosses_byte_boundaries() {
        let mut buf = Vec::new();
        let mut cursor = 0;
        push_bits(&mut buf, &mut cursor, 0b101, 3);
        push_bits(&mut buf, &mut cursor, 0x3ff, 10);
        push_bits(&mut buf, &mut cursor, 0, 3);

        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.read(3).unwrap(), 0b101);
        assert_eq!(reader.read(10).unwrap(), 0x3ff);
        assert_eq!(reader.read(3).unwrap(), 0);
        assert!(reader.read(1).is_err());
    }

    #[test]
    fn test_read_signed_sign_magnitude() {
        // 16-bit sign-magnitude: 0x8005 = -5, 0x0005 = 5
        let buf = [0x80, 0x05, 0x00, 0x05];
        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.read_signed(16).unwrap(), -5);
        assert_eq!(reader.read_signed(16).unwrap(), 5);
    }

    #[test]
    fn test_simple_packing() {
        let params = PackingParams {
            reference: 250.0,
            binary_scale: 0,
            decimal_scale: 1,
            bits: 8,
        };
        let data = [0u8, 10, 255];
        let values = unpack_simple(&data, 3, &params).unwrap();
        assert_eq!(values, vec![25.0, 26.0, 50.5]);
    }

    #[test]
    fn test_simple_packing_constant_field() {
        let params = PackingParams {
            reference: 101325.0,
            binary_scale: 0,
            decimal_scale: 0,
            bits: 0,
        };
        let values = unpack_simple(&[], 4, &params).unwrap();
        assert_eq!(values, vec![101325.0; 4]);
    }

    #[test]
    fn test_complex_packing_two_groups() {
        // two groups of three 4-bit values each, no spatial differencing
        let params = PackingParams {
            reference: 0.0,
            binary_scale: 0,
            decimal_scale: 0,
            bits: 6,
        };
        let complex = ComplexParams {
            num_groups: 2,
            group_width_reference: 0,
            group_width_bits: 4,
            group_length_reference: 0,
            group_length_increment: 1,
            last_group_length: 3,
            group_length_bits: 8,
        };

        let mut buf = Vec::new();
        let mut cursor = 0;
        // group references (6 bits each)
        push_bits(&mut buf, &mut cursor, 10, 6);
        push_bits(&mut buf, &mut cursor, 40, 6);
        // group widths (4 bits each)
        push_bits(&mut buf, &mut cursor, 4, 4);
        push_bits(&mut buf, &mut cursor, 4, 4);
        // scaled group lengths (8 bits each, last overridden)
        push_bits(&mut buf, &mut cursor, 3, 8);
        push_bits(&mut buf, &mut cursor, 0, 8);
        // values: group 1 offsets 0,1,2; group 2 offsets 5,0,2
        for v in [0u64, 1, 2, 5, 0, 2] {
            push_bits(&mut buf, &mut cursor, v, 4);
        }

        let values = unpack_complex(&buf, 6, &params, &complex, None).unwrap();
        assert_eq!(values, vec![10.0, 11.0, 12.0, 45.0, 40.0, 42.0]);
    }

    #[test]
    fn test_complex_packing_second_order_differences() {
        // encode the ramp 5,7,9,11: second differences are all zero
        let params = PackingParams {
            reference: 0.0,
            binary_scale: 0,
            decimal_scale: 0,
            bits: 4,
        };
        let complex = ComplexParams {
            num_groups: 1,
            group_width_reference: 0,
            group_width_bits: 4,
            group_length_reference: 0,
            group_length_increment: 1,
            last_group_length: 4,
            group_length_bits: 8,
        };
        let spatial = SpatialDiff {
            order: 2,
            extra_octets: 2,
        };

        let mut buf = Vec::new();
        let mut cursor = 0;
        // ival1, ival2, overall minimum (16 bits, sign-magnitude)
        push_bits(&mut buf, &mut cursor, 5, 16);
        push_bits(&mut buf, &mut cursor, 7, 16);
        push_bits(&mut buf, &mut cursor, 0, 16);
        // group reference
        push_bits(&mut buf, &mut cursor, 0, 4);
        // group width
        push_bits(&mut buf, &mut cursor, 1, 4);
        // scaled group length (overridden by last_group_length)
        push_bits(&mut buf, &mut cursor, 0, 8);
        // four packed values; first two are placeholders
        for v in [0u64, 0, 0, 0] {
            push_bits(&mut buf, &mut cursor, v, 1);
        }

        let values = unpack_complex(&buf, 4, &params, &complex, Some(&spatial)).unwrap();
        assert_eq!(values, vec![5.0, 7.0, 9.0, 11.0]);
    }
}
