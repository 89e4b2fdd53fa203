//! Symbol versions, error correction levels and the capacity tables that tie them together.

/// Error correction level of a symbol.
///
/// The names follow the command line vocabulary; they correspond to the standard
/// L, M, Q and H levels in that order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum ErrorCorrectionLevel {
    /// Tolerates ~7% erroneous codewords (L).
    Low,
    /// Tolerates ~15% erroneous codewords (M).
    Medium,
    /// Tolerates ~25% erroneous codewords (Q).
    High,
    /// Tolerates ~30% erroneous codewords (H).
    Highest,
}

impl ErrorCorrectionLevel {
    /// Parses a quality name such as `low`, `m` or `highest`.
    ///
    /// Anything unrecognized falls back to [`ErrorCorrectionLevel::Medium`].
    pub fn from_quality(quality: &str) -> Self {
        match quality.trim().to_ascii_lowercase().as_str() {
            "low" | "l" => Self::Low,
            "medium" | "m" => Self::Medium,
            "high" | "h" => Self::High,
            "highest" | "hh" => Self::Highest,
            _ => Self::Medium,
        }
    }

    /// Row index into the capacity tables.
    fn ordinal(self) -> usize {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 0,
            Medium => 1,
            High => 2,
            Highest => 3,
        }
    }

    /// The 2-bit code written into the format information.
    pub(crate) fn format_bits(self) -> u8 {
        use ErrorCorrectionLevel::*;
        match self {
            Low => 0b01,
            Medium => 0b00,
            High => 0b11,
            Highest => 0b10,
        }
    }
}

impl core::fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Highest => "highest",
        };
        f.write_str(name)
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The smallest symbol, 21×21 modules.
    pub const MIN: Version = Version(1);

    /// The largest symbol, 177×177 modules.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length of the module grid, `4 * version + 17`.
    pub const fn side(self) -> usize {
        self.0 as usize * 4 + 17
    }

    /// All versions in ascending order.
    pub fn all() -> impl Iterator<Item = Version> {
        (Self::MIN.0..=Self::MAX.0).map(Version)
    }

    /// Center coordinates shared by rows and columns of the alignment patterns.
    pub fn alignment_positions(self) -> &'static [u8] {
        ALIGNMENT_PATTERN_POSITIONS[usize::from(self.0)]
    }

    /// Number of modules available for codewords and remainder bits, after all
    /// function patterns and format/version areas are excluded.
    pub fn raw_data_modules(self) -> usize {
        let ver = usize::from(self.0);
        let side = self.side();
        // Finder corners: 9x9 top-left, 8x9 top-right, 9x8 bottom-left. The
        // format areas and the dark module sit inside them.
        let mut function = 81 + 72 + 72;
        // Timing modules outside the corner regions.
        function += 2 * (side - 17);
        if ver >= 2 {
            let count = self.alignment_positions().len();
            let patterns = count * count - 3;
            // Alignment patterns crossing the timing patterns overlap them by 5 modules.
            function += patterns * 25 - 2 * (count - 2) * 5;
        }
        if ver >= 7 {
            function += 2 * 18;
        }
        side * side - function
    }

    /// Total codewords (data plus error correction) carried by the symbol.
    pub fn total_codewords(self) -> usize {
        self.raw_data_modules() / 8
    }

    /// Zero bits placed after the last codeword.
    pub fn remainder_bits(self) -> usize {
        self.raw_data_modules() % 8
    }

    /// Data codewords available at the given level.
    pub fn data_codewords(self, ecl: ErrorCorrectionLevel) -> usize {
        let layout = self.block_layout(ecl);
        self.total_codewords() - layout.ecc_per_block * layout.num_blocks()
    }

    /// Block structure used for Reed-Solomon coding at the given level.
    pub fn block_layout(self, ecl: ErrorCorrectionLevel) -> BlockLayout {
        let ecc_per_block = table_get(&ECC_CODEWORDS_PER_BLOCK, self, ecl);
        let num_blocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, self, ecl);
        let total = self.total_codewords();
        let long_blocks = total % num_blocks;
        BlockLayout {
            ecc_per_block,
            short_blocks: num_blocks - long_blocks,
            short_data_len: total / num_blocks - ecc_per_block,
            long_blocks,
        }
    }
}

/// How the codewords of one version/level pair split into Reed-Solomon blocks.
///
/// Short blocks come first; long blocks carry one more data codeword each.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockLayout {
    /// Error correction codewords appended to every block.
    pub ecc_per_block: usize,
    /// Number of blocks carrying `short_data_len` data codewords.
    pub short_blocks: usize,
    /// Data codewords in a short block.
    pub short_data_len: usize,
    /// Number of blocks carrying `short_data_len + 1` data codewords.
    pub long_blocks: usize,
}

impl BlockLayout {
    /// Total number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.short_blocks + self.long_blocks
    }

    /// Data codewords in the block at `index`.
    pub fn data_len(&self, index: usize) -> usize {
        self.short_data_len + usize::from(index >= self.short_blocks)
    }
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

static ALIGNMENT_PATTERN_POSITIONS: [&[u8]; 41] = [
    &[],
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

// Index: [level][version], column 0 unused.
static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Highest
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // High
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // Highest
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_data_modules_matches_closed_form() {
        for ver in Version::all() {
            let v = usize::from(ver.value());
            let mut expected = (16 * v + 128) * v + 64;
            if v >= 2 {
                let numalign = v / 7 + 2;
                expected -= (25 * numalign - 10) * numalign - 55;
                if v >= 7 {
                    expected -= 36;
                }
            }
            assert_eq!(ver.raw_data_modules(), expected, "version {}", v);
        }
    }

    #[test]
    fn test_known_capacities() {
        use ErrorCorrectionLevel::*;
        assert_eq!(Version::new(1).total_codewords(), 26);
        assert_eq!(Version::new(1).data_codewords(Low), 19);
        assert_eq!(Version::new(1).data_codewords(Medium), 16);
        assert_eq!(Version::new(1).data_codewords(High), 13);
        assert_eq!(Version::new(1).data_codewords(Highest), 9);
        assert_eq!(Version::new(40).data_codewords(Low), 2956);
        assert_eq!(Version::new(40).data_codewords(Highest), 1276);
        assert_eq!(Version::new(2).remainder_bits(), 7);
        assert_eq!(Version::new(14).remainder_bits(), 3);
    }

    #[test]
    fn test_block_layout_with_mixed_sizes() {
        // 5-Q: 2 blocks of 15 and 2 blocks of 16 data codewords, 18 EC each.
        let layout = Version::new(5).block_layout(ErrorCorrectionLevel::High);
        assert_eq!(layout.ecc_per_block, 18);
        assert_eq!(layout.short_blocks, 2);
        assert_eq!(layout.short_data_len, 15);
        assert_eq!(layout.long_blocks, 2);
        assert_eq!(layout.data_len(1), 15);
        assert_eq!(layout.data_len(2), 16);
    }

    #[test]
    fn test_alignment_positions_end_near_edge() {
        for ver in Version::all().skip(1) {
            let pos = ver.alignment_positions();
            assert_eq!(pos[0], 6);
            assert_eq!(usize::from(*pos.last().unwrap()), ver.side() - 7);
            assert_eq!(pos.len(), usize::from(ver.value()) / 7 + 2);
        }
    }

    #[test]
    fn test_quality_names() {
        use ErrorCorrectionLevel::*;
        assert_eq!(ErrorCorrectionLevel::from_quality("L"), Low);
        assert_eq!(ErrorCorrectionLevel::from_quality("medium"), Medium);
        assert_eq!(ErrorCorrectionLevel::from_quality("h"), High);
        assert_eq!(ErrorCorrectionLevel::from_quality("HH"), Highest);
        assert_eq!(ErrorCorrectionLevel::from_quality("ultra"), Medium);
    }
}
