//! 80-bit ieee extended float, as used for the AIFF sample rate
//!
//! layout: 1 sign bit, 15 exponent bits (bias 16383), 64 bit mantissa
//! with an explicit integer bit. all big-endian.

const EXTENDED_BIAS: i32 = 16383;
const DOUBLE_BIAS: i32 = 1023;

/// decode an extended float
pub fn extended_to_f64(bytes: &[u8; 10]) -> f64 {
    let sign_exp = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut mantissa_bytes = [0u8; 8];
    mantissa_bytes.copy_from_slice(&bytes[2..10]);
    let mantissa = u64::from_be_bytes(mantissa_bytes);

    let negative = sign_exp & 0x8000 != 0;
    let exponent = (sign_exp & 0x7FFF) as i32;

    if exponent == 0 && mantissa == 0 {
        return if negative { -0.0 } else { 0.0 };
    }
    if exponent == 0x7FFF {
        return if mantissa << 1 == 0 {
            if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        } else {
            f64::NAN
        };
    }

    let value = mantissa as f64 * 2f64.powi(exponent - EXTENDED_BIAS - 63);
    if negative {
        -value
    } else {
        value
    }
}

/// encode an f64 as an extended float
pub fn f64_to_extended(value: f64) -> [u8; 10] {
    let mut out = [0u8; 10];
    let bits = value.to_bits();
    let sign: u16 = if bits >> 63 != 0 { 0x8000 } else { 0 };
    let exp11 = ((bits >> 52) & 0x7FF) as i32;
    let frac = bits & ((1u64 << 52) - 1);

    let (exponent, mantissa): (u16, u64) = if exp11 == 0 && frac == 0 {
        (0, 0)
    } else if exp11 == 0x7FF {
        // inf / nan
        let m = if frac == 0 { 1u64 << 63 } else { (1u64 << 63) | (frac << 11) };
        (0x7FFF, m)
    } else if exp11 == 0 {
        // subnormal double, normalize it
        let shift = frac.leading_zeros() as i32 - 11;
        let exp = 1 - DOUBLE_BIAS - shift + EXTENDED_BIAS;
        (exp as u16, frac << (11 + shift))
    } else {
        let exp = exp11 - DOUBLE_BIAS + EXTENDED_BIAS;
        (exp as u16, (1u64 << 63) | (frac << 11))
    };

    out[0..2].copy_from_slice(&(sign | exponent).to_be_bytes());
    out[2..10].copy_from_slice(&mantissa.to_be_bytes());
    out
}
