//! QR symbol construction.
//!
//! This module lays the interleaved codeword stream into the module grid. It draws the
//! function patterns, places data bits in the zig-zag order, and picks the mask with the
//! lowest penalty. The result is an immutable [`QrCode`].

use crate::error::EncodeError;
use crate::reed_solomon::add_ecc_and_interleave;
use crate::segment::{Mode, Segment};
use crate::version::{ErrorCorrectionLevel, Version};
use tracing::debug;

/// A finished QR Code symbol: a square grid of dark and light modules.
///
/// Instances are immutable after creation. Use [`QrCode::encode_text`] (or the crate level
/// [`encode`](crate::encode)) to build one.
///
/// # Example
///
/// ```rust
/// use qrgen::{ErrorCorrectionLevel, QrCode};
///
/// let qr = QrCode::encode_text("HELLO", ErrorCorrectionLevel::Medium).unwrap();
/// assert_eq!(qr.version().value(), 1);
/// assert_eq!(qr.size(), 21);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrCode {
    version: Version,
    ecl: ErrorCorrectionLevel,
    mask: Mask,
    mode: Mode,
    /// Side length in modules, `version * 4 + 17`.
    size: usize,
    /// Row-major modules, `true` = dark.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string at the given level, choosing mode, version and mask automatically.
    pub fn encode_text(text: &str, ecl: ErrorCorrectionLevel) -> Result<Self, EncodeError> {
        Self::encode_text_with_mask(text, ecl, None)
    }

    /// Like [`QrCode::encode_text`], but with an optional forced mask.
    ///
    /// `None` evaluates all eight masks and keeps the one with the lowest penalty.
    pub fn encode_text_with_mask(
        text: &str,
        ecl: ErrorCorrectionLevel,
        mask: Option<Mask>,
    ) -> Result<Self, EncodeError> {
        if text.is_empty() {
            return Err(EncodeError::InvalidInput("payload is empty".into()));
        }
        Self::encode_segment(&Segment::from_text(text), ecl, mask)
    }

    /// Encodes an already packed segment.
    pub fn encode_segment(
        seg: &Segment,
        ecl: ErrorCorrectionLevel,
        mask: Option<Mask>,
    ) -> Result<Self, EncodeError> {
        let version = seg.plan(ecl)?;
        let data = seg.data_codewords(version, ecl);
        let codewords = add_ecc_and_interleave(&data, version, ecl);
        Ok(Self::encode_codewords(&codewords, version, ecl, seg.mode(), mask))
    }

    /// Builds the symbol from the final interleaved codeword stream.
    fn encode_codewords(
        codewords: &[u8],
        version: Version,
        ecl: ErrorCorrectionLevel,
        mode: Mode,
        msk: Option<Mask>,
    ) -> Self {
        let mut grid = Grid::new(version);
        grid.draw_function_patterns();
        grid.draw_codewords(codewords);

        let msk = msk.unwrap_or_else(|| {
            let mut best = Mask::new(0);
            let mut minpenalty = i32::MAX;
            for i in 0u8..8 {
                let candidate = Mask::new(i);
                grid.apply_mask(candidate);
                grid.draw_format_bits(ecl, candidate);
                let penalty = penalty_score(&grid.modules, grid.size);
                if penalty < minpenalty {
                    best = candidate;
                    minpenalty = penalty;
                }
                grid.apply_mask(candidate); // XOR undoes the mask
            }
            debug!(mask = best.value(), penalty = minpenalty, "selected mask");
            best
        });
        grid.apply_mask(msk);
        grid.draw_format_bits(ecl, msk);

        Self {
            version,
            ecl,
            mask: msk,
            mode,
            size: grid.size,
            modules: grid.modules,
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size in modules, in the range [21, 177].
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> ErrorCorrectionLevel {
        self.ecl
    }

    /// Returns the mask applied to the data modules.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the mode the payload was packed in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the color of the module at the given coordinates: `true` for dark.
    ///
    /// Coordinates outside the symbol (the quiet zone, for instance) are light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size as i32;
        range.contains(&x)
            && range.contains(&y)
            && self.modules[y as usize * self.size + x as usize]
    }

    /// Penalty score of the finished symbol under the standard four rules.
    pub fn penalty_score(&self) -> i32 {
        penalty_score(&self.modules, self.size)
    }

    /// Iterates over rows of modules, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }
}

/// Working module grid plus the map of function modules.
struct Grid {
    version: Version,
    size: usize,
    modules: Vec<bool>,
    is_function: Vec<bool>,
}

impl Grid {
    fn new(version: Version) -> Self {
        let size = version.side();
        Self {
            version,
            size,
            modules: vec![false; size * size],
            is_function: vec![false; size * size],
        }
    }

    fn set_function(&mut self, x: usize, y: usize, isdark: bool) {
        let index = y * self.size + x;
        self.modules[index] = isdark;
        self.is_function[index] = true;
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;
        for i in 0..size {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }

        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size as i32 - 4, 3);
        self.draw_finder_pattern(3, size as i32 - 4);

        let positions = self.version.alignment_positions();
        let last = positions.len().saturating_sub(1);
        for (i, &cx) in positions.iter().enumerate() {
            for (j, &cy) in positions.iter().enumerate() {
                // Skip the three corners occupied by finder patterns.
                if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                    continue;
                }
                self.draw_alignment_pattern(usize::from(cx), usize::from(cy));
            }
        }

        // Reserve the format areas; real bits are written once the mask is known.
        self.draw_format_bits(ErrorCorrectionLevel::Low, Mask::new(0));
        self.draw_version();
    }

    /// Draws a 9x9 finder (with separator) centered at (x, y), clipped at the edges.
    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let (xx, yy) = (x + dx, y + dy);
                let range = 0..self.size as i32;
                if range.contains(&xx) && range.contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function(xx as usize, yy as usize, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: usize, y: usize) {
        for dy in 0..5 {
            for dx in 0..5 {
                let dist = (dx as i32 - 2).abs().max((dy as i32 - 2).abs());
                self.set_function(x + dx - 2, y + dy - 2, dist != 1);
            }
        }
    }

    /// Writes both copies of the 15-bit format information and the dark module.
    fn draw_format_bits(&mut self, ecl: ErrorCorrectionLevel, mask: Mask) {
        let bits = format_bits(ecl, mask);
        let size = self.size;

        // Around the top-left finder.
        for i in 0..6 {
            self.set_function(8, i, get_bit(bits, i as u8));
        }
        self.set_function(8, 7, get_bit(bits, 6));
        self.set_function(8, 8, get_bit(bits, 7));
        self.set_function(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function(14 - i, 8, get_bit(bits, i as u8));
        }

        // Split between the top-right and bottom-left finders.
        for i in 0..8 {
            self.set_function(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function(8, size - 8, true);
    }

    /// Writes both 6x3 version information blocks (version 7 and up).
    fn draw_version(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        for i in 0u8..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + usize::from(i % 3);
            let b = usize::from(i / 3);
            self.set_function(a, b, bit);
            self.set_function(b, a, bit);
        }
    }

    /// Fills data modules in the two-column zig-zag, starting bottom-right.
    fn draw_codewords(&mut self, data: &[u8]) {
        debug_assert_eq!(data.len(), self.version.total_codewords());
        let size = self.size;
        let total_bits = data.len() * 8;
        let mut i = 0usize;
        let mut right = size as i32 - 1;
        while right >= 1 {
            if right == 6 {
                right = 5; // skip the vertical timing column
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = (right - j) as usize;
                    let index = y * size + x;
                    if self.is_function[index] {
                        continue;
                    }
                    // Remainder bits past the stream stay light.
                    self.modules[index] =
                        i < total_bits && get_bit(u32::from(data[i >> 3]), 7 - (i & 7) as u8);
                    i += 1;
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, self.version.raw_data_modules());
    }

    /// XORs the mask pattern onto every data module. Applying it twice restores the grid.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let index = y * self.size + x;
                if !self.is_function[index] && mask.inverts(x, y) {
                    self.modules[index] = !self.modules[index];
                }
            }
        }
    }
}

/// BCH(15,5) format word for the level and mask, XORed with 0x5412.
fn format_bits(ecl: ErrorCorrectionLevel, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    ((data << 10) | rem) ^ 0x5412
}

/// BCH(18,6) version word.
fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    (ver << 12) | rem
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Scores a module grid; lower is better.
///
/// Adds up runs of five or more same-colored modules, 2x2 same-colored blocks,
/// finder-like 1:1:3:1:1 patterns with a light margin, and the deviation of the
/// dark ratio from one half.
fn penalty_score(modules: &[bool], size: usize) -> i32 {
    let at = |x: usize, y: usize| modules[y * size + x];
    let mut result = 0;

    for y in 0..size {
        result += line_penalty((0..size).map(|x| at(x, y)), size);
    }
    for x in 0..size {
        result += line_penalty((0..size).map(|y| at(x, y)), size);
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color = at(x, y);
            if color == at(x + 1, y) && color == at(x, y + 1) && color == at(x + 1, y + 1) {
                result += PENALTY_N2;
            }
        }
    }

    let dark = modules.iter().filter(|&&m| m).count() as i32;
    let total = (size * size) as i32;
    // Smallest k with |dark/total - 1/2| <= (k+1)/20.
    let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Run-length and finder-like penalties for one row or column.
fn line_penalty(line: impl Iterator<Item = bool>, size: usize) -> i32 {
    let mut result = 0;
    let mut runcolor = false;
    let mut runlen = 0i32;
    let mut history = RunHistory::new(size);
    for color in line {
        if color == runcolor {
            runlen += 1;
            if runlen == 5 {
                result += PENALTY_N1;
            } else if runlen > 5 {
                result += 1;
            }
        } else {
            history.push(runlen);
            if !runcolor {
                result += history.count_finder_like() * PENALTY_N3;
            }
            runcolor = color;
            runlen = 1;
        }
    }
    result + history.terminate(runcolor, runlen) * PENALTY_N3
}

/// The last seven run lengths of a line, most recent first. The light border outside
/// the symbol counts as part of the first and last light runs.
struct RunHistory {
    border: i32,
    runs: [i32; 7],
}

impl RunHistory {
    fn new(size: usize) -> Self {
        Self {
            border: size as i32,
            runs: [0; 7],
        }
    }

    fn push(&mut self, mut runlen: i32) {
        if self.runs[0] == 0 {
            runlen += self.border;
        }
        self.runs.copy_within(0..6, 1);
        self.runs[0] = runlen;
    }

    /// 1 if the latest runs end a dark 1:1:3:1:1 pattern with 4 light modules on a side.
    fn count_finder_like(&self) -> i32 {
        let rh = &self.runs;
        let n = rh[1];
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    fn terminate(mut self, runcolor: bool, mut runlen: i32) -> i32 {
        if runcolor {
            self.push(runlen);
            runlen = 0;
        }
        runlen += self.border;
        self.push(runlen);
        self.count_finder_like()
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this mask flips the module at column `x`, row `y`.
    pub fn inverts(self, x: usize, y: usize) -> bool {
        match self.0 {
            0 => (x + y) % 2 == 0,
            1 => y % 2 == 0,
            2 => x % 3 == 0,
            3 => (x + y) % 3 == 0,
            4 => (x / 3 + y / 2) % 2 == 0,
            5 => (x * y) % 2 + (x * y) % 3 == 0,
            6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
            7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
            _ => unreachable!(),
        }
    }
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder_at(qr: &QrCode, left: i32, top: i32) -> bool {
        (0..7).all(|dy| {
            (0..7).all(|dx| {
                let dist = (dx - 3i32).abs().max((dy - 3i32).abs());
                qr.get_module(left + dx, top + dy) == (dist != 2)
            })
        })
    }

    #[test]
    fn test_hello_medium_is_version_one() {
        let qr = QrCode::encode_text("HELLO", ErrorCorrectionLevel::Medium).unwrap();
        assert_eq!(qr.version(), Version::MIN);
        assert_eq!(qr.mode(), Mode::Alphanumeric);
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.rows().count(), 21);
    }

    #[test]
    fn test_function_patterns() {
        let qr = QrCode::encode_text("https://example.com/qr", ErrorCorrectionLevel::High).unwrap();
        let size = qr.size() as i32;
        assert!(finder_at(&qr, 0, 0));
        assert!(finder_at(&qr, size - 7, 0));
        assert!(finder_at(&qr, 0, size - 7));
        for i in 8..size - 8 {
            assert_eq!(qr.get_module(i, 6), i % 2 == 0);
            assert_eq!(qr.get_module(6, i), i % 2 == 0);
        }
        assert!(qr.get_module(8, size - 8));
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, size));
    }

    #[test]
    fn test_format_bits_known_values() {
        // Level L (01), mask 4 -> 110011000101111 from the standard's table.
        assert_eq!(format_bits(ErrorCorrectionLevel::Low, Mask::new(4)), 0b110011000101111);
        // Level M (00), mask 0.
        assert_eq!(format_bits(ErrorCorrectionLevel::Medium, Mask::new(0)), 0b101010000010010);
    }

    #[test]
    fn test_version_bits_known_value() {
        assert_eq!(version_bits(Version::new(7)), 0x07C94);
    }

    #[test]
    fn test_format_information_readable() {
        let qr = QrCode::encode_text("12345", ErrorCorrectionLevel::Highest).unwrap();
        let mut bits = 0u32;
        for i in 0..6 {
            bits |= u32::from(qr.get_module(8, i)) << i;
        }
        bits |= u32::from(qr.get_module(8, 7)) << 6;
        bits |= u32::from(qr.get_module(8, 8)) << 7;
        bits |= u32::from(qr.get_module(7, 8)) << 8;
        for i in 9..15 {
            bits |= u32::from(qr.get_module(14 - i, 8)) << i;
        }
        assert_eq!(bits, format_bits(ErrorCorrectionLevel::Highest, qr.mask()));
    }

    #[test]
    fn test_version_information_drawn() {
        let text = "A".repeat(200);
        let qr = QrCode::encode_text(&text, ErrorCorrectionLevel::Medium).unwrap();
        assert!(qr.version().value() >= 7);
        let bits = version_bits(qr.version());
        let size = qr.size() as i32;
        for i in 0..18 {
            let a = size - 11 + i % 3;
            let b = i / 3;
            assert_eq!(qr.get_module(a, b), get_bit(bits, i as u8));
            assert_eq!(qr.get_module(b, a), get_bit(bits, i as u8));
        }
    }

    #[test]
    fn test_auto_mask_is_minimum_penalty() {
        for text in ["HELLO", "0123456789", "hello, world!"] {
            let auto = QrCode::encode_text(text, ErrorCorrectionLevel::Medium).unwrap();
            let penalties: Vec<i32> = (0..8)
                .map(|m| {
                    let mask = Some(Mask::new(m));
                    QrCode::encode_text_with_mask(text, ErrorCorrectionLevel::Medium, mask)
                        .unwrap()
                        .penalty_score()
                })
                .collect();
            let min = *penalties.iter().min().unwrap();
            let first_min = penalties.iter().position(|&p| p == min).unwrap();
            assert_eq!(auto.penalty_score(), min, "{}", text);
            assert_eq!(usize::from(auto.mask().value()), first_min, "{}", text);
        }
    }

    #[test]
    fn test_forced_mask_is_kept() {
        let qr =
            QrCode::encode_text_with_mask("HELLO", ErrorCorrectionLevel::Low, Some(Mask::new(5)))
                .unwrap();
        assert_eq!(qr.mask().value(), 5);
    }

    #[test]
    fn test_deterministic() {
        let a = QrCode::encode_text("deterministic?", ErrorCorrectionLevel::High).unwrap();
        let b = QrCode::encode_text("deterministic?", ErrorCorrectionLevel::High).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(
            QrCode::encode_text("", ErrorCorrectionLevel::Low),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_run_penalty() {
        // A run of 7 scores N1 + 2.
        let line = [true, true, true, true, true, true, true, false];
        assert_eq!(line_penalty(line.iter().copied(), 8), PENALTY_N1 + 2);
    }

    #[test]
    fn test_finder_like_penalty() {
        // 4 light, then dark:light:dark:light:dark = 1:1:3:1:1, then 4 light.
        let line = [
            false, false, false, false, true, false, true, true, true, false, true, false, false,
            false, false,
        ];
        // Two light runs of 4 at the border (N1 not reached), one finder-like match per side.
        assert_eq!(line_penalty(line.iter().copied(), line.len()), 2 * PENALTY_N3);
    }
}
