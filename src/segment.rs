//! Mode classification, bit packing and data codeword assembly.
//!
//! A payload is encoded as exactly one segment whose [`Mode`] is chosen once by scanning
//! the text. The planner then picks the smallest [`Version`] whose data capacity holds the
//! segment, and [`Segment::data_codewords`] lays out the final data codeword sequence.

use crate::error::EncodeError;
use crate::version::{ErrorCorrectionLevel, Version};
use tracing::debug;

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Encoding mode of a segment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Decimal digits, 10 bits per 3 digits.
    Numeric,
    /// Digits, upper-case letters and ` $%*+-./:`, 11 bits per 2 characters.
    Alphanumeric,
    /// Raw UTF-8 bytes, 8 bits each.
    Byte,
}

impl Mode {
    /// Picks the most compact mode able to represent every character of `text`.
    pub fn classify(text: &str) -> Self {
        if is_numeric(text) {
            Mode::Numeric
        } else if is_alphanumeric(text) {
            Mode::Alphanumeric
        } else {
            Mode::Byte
        }
    }

    /// The 4-bit mode indicator.
    fn mode_bits(self) -> u32 {
        match self {
            Mode::Numeric => 0x1,
            Mode::Alphanumeric => 0x2,
            Mode::Byte => 0x4,
        }
    }

    /// Width of the character count field for the given version.
    pub fn char_count_bits(self, ver: Version) -> u8 {
        let widths = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
        };
        widths[usize::from((ver.value() + 7) / 17)]
    }
}

pub fn is_numeric(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
}

/// An append-only big-endian bit sequence.
#[derive(Clone, Debug, Default)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            data: Vec::with_capacity(bits.div_ceil(8)),
            length: 0,
        }
    }

    /// Number of bits written so far.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        debug_assert!(len <= 31 && (val >> len) == 0);
        for i in (0..len).rev() {
            if self.length % 8 == 0 {
                self.data.push(0);
            }
            let bit = ((val >> i) & 1) as u8;
            let shift = 7 - (self.length % 8);
            if let Some(last) = self.data.last_mut() {
                *last |= bit << shift;
            }
            self.length += 1;
        }
    }

    /// Returns the bit at `index` (0 is the first appended).
    pub fn bit(&self, index: usize) -> bool {
        (self.data[index >> 3] >> (7 - (index & 7))) & 1 != 0
    }

    /// Consumes the buffer, returning its bytes with the trailing partial byte zero-filled.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// A payload packed under a single mode, without header fields.
#[derive(Clone, Debug)]
pub struct Segment {
    mode: Mode,
    numchars: usize,
    bits: BitBuffer,
}

impl Segment {
    /// Classifies `text` and packs it under the chosen mode.
    pub fn from_text(text: &str) -> Self {
        match Mode::classify(text) {
            Mode::Numeric => Self::make_numeric(text),
            Mode::Alphanumeric => Self::make_alphanumeric(text),
            Mode::Byte => Self::make_bytes(text.as_bytes()),
        }
    }

    /// Packs arbitrary bytes in byte mode.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bits = BitBuffer::with_capacity(data.len() * 8);
        for &b in data {
            bits.append_bits(u32::from(b), 8);
        }
        Self {
            mode: Mode::Byte,
            numchars: data.len(),
            bits,
        }
    }

    /// Packs decimal digits, three per 10 bits with a 4 or 7 bit tail.
    ///
    /// Non-digit characters must have been ruled out by [`Mode::classify`].
    pub fn make_numeric(text: &str) -> Self {
        let mut bits = BitBuffer::with_capacity(text.len() * 10 / 3 + 7);
        for chunk in text.as_bytes().chunks(3) {
            let value = chunk
                .iter()
                .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
            bits.append_bits(value, chunk.len() as u8 * 3 + 1);
        }
        Self {
            mode: Mode::Numeric,
            numchars: text.len(),
            bits,
        }
    }

    /// Packs alphanumeric characters, two per 11 bits with a 6 bit tail.
    pub fn make_alphanumeric(text: &str) -> Self {
        let codes: Vec<u32> = text
            .chars()
            .filter_map(|c| ALPHANUMERIC_CHARSET.find(c))
            .map(|i| i as u32)
            .collect();
        debug_assert_eq!(codes.len(), text.chars().count());
        let mut bits = BitBuffer::with_capacity(codes.len() * 11 / 2 + 6);
        for pair in codes.chunks(2) {
            match pair {
                &[a, b] => bits.append_bits(a * 45 + b, 11),
                &[a] => bits.append_bits(a, 6),
                _ => unreachable!(),
            }
        }
        Self {
            mode: Mode::Alphanumeric,
            numchars: codes.len(),
            bits,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Length in mode-native units (digits, characters or bytes).
    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Bits needed for this segment in the given version: header plus payload.
    ///
    /// Returns `None` when the character count overflows the version's count field.
    pub fn total_bits(&self, version: Version) -> Option<usize> {
        let ccbits = self.mode.char_count_bits(version);
        if self.numchars >= 1usize << ccbits {
            return None;
        }
        Some(4 + usize::from(ccbits) + self.bits.len())
    }

    /// Finds the smallest version whose data capacity at `ecl` holds this segment.
    pub fn plan(&self, ecl: ErrorCorrectionLevel) -> Result<Version, EncodeError> {
        let mut needed = usize::MAX;
        for version in Version::all() {
            let capacity = version.data_codewords(ecl) * 8;
            match self.total_bits(version) {
                Some(bits) if bits <= capacity => {
                    debug!(
                        mode = ?self.mode,
                        version = version.value(),
                        bits,
                        capacity,
                        "selected symbol version"
                    );
                    return Ok(version);
                }
                Some(bits) => needed = bits,
                None => needed = usize::MAX,
            }
        }
        Err(EncodeError::PayloadTooLarge {
            needed,
            capacity: Version::MAX.data_codewords(ecl) * 8,
        })
    }

    /// Lays out the data codewords: header, payload, terminator, byte alignment and pad bytes.
    ///
    /// `version` must come from [`Segment::plan`] (or otherwise fit the segment).
    pub fn data_codewords(&self, version: Version, ecl: ErrorCorrectionLevel) -> Vec<u8> {
        let capacity = version.data_codewords(ecl) * 8;
        let mut bb = BitBuffer::with_capacity(capacity);
        bb.append_bits(self.mode.mode_bits(), 4);
        bb.append_bits(self.numchars as u32, self.mode.char_count_bits(version));
        for i in 0..self.bits.len() {
            bb.append_bits(u32::from(self.bits.bit(i)), 1);
        }
        debug_assert!(bb.len() <= capacity);

        // Terminator, shortened when the symbol is full.
        let terminator = (capacity - bb.len()).min(4);
        bb.append_bits(0, terminator as u8);
        let align = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, align as u8);

        for &pad in [0xEC, 0x11].iter().cycle() {
            if bb.len() >= capacity {
                break;
            }
            bb.append_bits(pad, 8);
        }
        bb.into_bytes()
    }
}
