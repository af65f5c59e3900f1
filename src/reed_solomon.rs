//! Reed–Solomon error correction over GF(2^8/0x11D) with generator element 0x02.

use crate::error::{QrError, Result};

/// Returns the product of the two given field elements modulo GF(2^8/0x11D).
/// All inputs are valid.
pub fn multiply(x: u8, y: u8) -> u8 {
    // Russian peasant multiplication
    let mut z: u8 = 0;
    for i in (0..8).rev() {
        z = (z << 1) ^ ((z >> 7) * 0x1d);
        z ^= ((y >> i) & 1) * x;
    }
    z
}

/// Returns a Reed–Solomon ECC generator polynomial for the given degree.
///
/// The polynomial is the product (x - r^0)(x - r^1)...(x - r^{degree-1}) with r = 0x02.
/// Coefficients are stored from highest to lowest power, excluding the leading term which
/// is always 1. For example the polynomial x^2 + 3x + 2 is returned as `[3, 2]`.
///
/// # Errors
///
/// Returns [`QrError::InvalidArgument`] if `degree` is not in [1, 255].
pub fn compute_divisor(degree: usize) -> Result<Vec<u8>> {
    if !(1..=255).contains(&degree) {
        return Err(QrError::invalid(format!("degree {degree} out of range [1, 255]")));
    }
    // Start off with the monomial x^0
    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;

    // Multiply the current product by (x - r^i) for each i, dropping the highest
    // monomial term which is always 1x^degree
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = multiply(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = multiply(root, 0x02);
    }
    Ok(result)
}

/// Returns the Reed–Solomon error correction codeword for the given data and divisor
/// polynomials. The result has the same length as `divisor`.
pub fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for b in data {
        // Polynomial division
        let factor: u8 = b ^ result[0];
        result.remove(0);
        result.push(0);
        for (x, &y) in result.iter_mut().zip(divisor.iter()) {
            *x ^= multiply(y, factor);
        }
    }
    result
}

/// Caches a generator polynomial so that many blocks of one ECC length can be processed.
pub struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self {
            divisor: compute_divisor(degree)?,
        })
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        compute_remainder(data, &self.divisor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_multiply() {
        assert_eq!(multiply(0, 0x53), 0);
        assert_eq!(multiply(1, 0x53), 0x53);
        assert_eq!(multiply(0x02, 0x80), 0x1d);
        assert_eq!(multiply(0x53, 0xca), multiply(0xca, 0x53));
    }

    #[test]
    fn test_multiply_by_generator_has_order_255() {
        let mut x: u8 = 1;
        for i in 1..=255 {
            x = multiply(x, 0x02);
            assert_eq!(x == 1, i == 255, "step {i}");
        }
    }

    #[test]
    fn test_compute_divisor_small() {
        assert_eq!(compute_divisor(1).unwrap(), vec![1]);
        // (x - 1)(x - 2) = x^2 + 3x + 2
        assert_eq!(compute_divisor(2).unwrap(), vec![3, 2]);
        assert!(compute_divisor(0).is_err());
        assert!(compute_divisor(256).is_err());
    }

    #[test]
    fn test_generator_degree() {
        for degree in [1, 7, 30, 255] {
            let rs = ReedSolomonGenerator::new(degree).unwrap();
            assert_eq!(rs.degree(), degree);
            assert_eq!(rs.compute_remainder(&[0x42; 4]).len(), degree);
        }
        assert!(ReedSolomonGenerator::new(0).is_err());
    }

    #[test]
    fn test_known_ecc_block() {
        // Version 1-M block for the numeric payload "01234567"
        let data = [
            0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec,
            0x11,
        ];
        let rs = ReedSolomonGenerator::new(10).unwrap();
        assert_eq!(
            rs.compute_remainder(&data),
            vec![0xa5, 0x24, 0xd4, 0xc1, 0xed, 0x36, 0xc7, 0x87, 0x2c, 0x55]
        );
    }

    #[test]
    fn test_codeword_with_ecc_divides_evenly() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for degree in [7, 10, 17, 22, 30] {
            let divisor = compute_divisor(degree).unwrap();
            for _ in 0..20 {
                let len = rng.random_range(1..100);
                let data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
                let ecc = compute_remainder(&data, &divisor);
                assert_eq!(ecc.len(), degree);
                let mut codeword = data.clone();
                codeword.extend_from_slice(&ecc);
                assert!(compute_remainder(&codeword, &divisor).iter().all(|&b| b == 0));
            }
        }
    }
}
