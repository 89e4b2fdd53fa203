//! Reed-Solomon error correction over GF(256) and block interleaving.
//!
//! The field uses the primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D). A generator of
//! degree n has the roots α^0 .. α^(n-1).

use crate::version::{ErrorCorrectionLevel, Version};

/// GF(256) arithmetic backed by log/antilog tables.
pub struct Gf256;

static TABLES: ([u8; 256], [u8; 256]) = build_tables();

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= 0x11D;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

impl Gf256 {
    /// α^power.
    pub fn exp(power: usize) -> u8 {
        TABLES.0[power % 255]
    }

    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let (exp, log) = &TABLES;
        exp[(usize::from(log[usize::from(a)]) + usize::from(log[usize::from(b)])) % 255]
    }
}

/// Divisor polynomial for a fixed number of error correction codewords.
///
/// Coefficients are stored from highest to lowest power; the leading 1 is implicit.
pub struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    /// Builds the generator `(x - α^0)(x - α^1)...(x - α^(degree-1))`.
    pub fn new(degree: usize) -> Self {
        assert!((1..=255).contains(&degree), "Degree out of range");
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        for power in 0..degree {
            let root = Gf256::exp(power);
            for j in 0..degree {
                divisor[j] = Gf256::mul(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
        }
        Self { divisor }
    }

    pub fn degree(&self) -> usize {
        self.divisor.len()
    }

    /// Remainder of `data · x^degree` divided by the generator: the EC codewords.
    pub fn remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; self.degree()];
        for &b in data {
            let factor = b ^ result[0];
            result.rotate_left(1);
            if let Some(last) = result.last_mut() {
                *last = 0;
            }
            for (r, &d) in result.iter_mut().zip(&self.divisor) {
                *r ^= Gf256::mul(d, factor);
            }
        }
        result
    }
}

/// Splits `data` into blocks, appends EC codewords to each and interleaves the result.
///
/// The returned stream holds every data codeword column first, then every EC codeword
/// column. Remainder bits are not included; they are zero modules in the matrix.
pub fn add_ecc_and_interleave(data: &[u8], version: Version, ecl: ErrorCorrectionLevel) -> Vec<u8> {
    assert_eq!(data.len(), version.data_codewords(ecl), "Illegal argument");
    let layout = version.block_layout(ecl);
    let rs = ReedSolomonGenerator::new(layout.ecc_per_block);

    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(layout.num_blocks());
    let mut rest = data;
    for i in 0..layout.num_blocks() {
        let (block, tail) = rest.split_at(layout.data_len(i));
        blocks.push((block, rs.remainder(block)));
        rest = tail;
    }
    debug_assert!(rest.is_empty());

    let mut result = Vec::with_capacity(version.total_codewords());
    for i in 0..=layout.short_data_len {
        for (block, _) in &blocks {
            if let Some(&b) = block.get(i) {
                result.push(b);
            }
        }
    }
    for i in 0..layout.ecc_per_block {
        for (_, ecc) in &blocks {
            result.push(ecc[i]);
        }
    }
    debug_assert_eq!(result.len(), version.total_codewords());
    result
}
