use crate::bitbuffer::BitBuffer;
use crate::error::{QrError, Result};
use crate::tables::Version;

/// A segment of character/binary/control data in a QR Code symbol.
///
/// Supports numeric, alphanumeric, byte, or ECI modes. Segments are immutable and created
/// using factory functions like [`QrSegment::make_numeric`], [`QrSegment::make_alphanumeric`]
/// or [`QrSegment::make_bytes`]. The bit payload is only exposed as a shared borrow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: BitBuffer,
}

impl QrSegment {
    /// Creates a segment for binary data in byte mode.
    ///
    /// # Arguments
    ///
    /// * `data` - The byte data to encode.
    pub fn make_bytes(data: &[u8]) -> Self {
        QrSegment::new(QrSegmentMode::Byte, data.len(), BitBuffer::from_bytes(data))
    }

    /// Creates a segment for a string of decimal digits in numeric mode.
    ///
    /// # Arguments
    ///
    /// * `text` - A string containing only digits (0–9).
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidArgument`] if `text` contains non-digit characters.
    pub fn make_numeric(text: &str) -> Result<Self> {
        if !QrSegment::is_numeric(text) {
            return Err(QrError::invalid("String contains non-numeric characters"));
        }
        let mut bb = BitBuffer::new();
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10)?;
                accumdata = 0;
                accumcount = 0;
            }
        }
        // 1 or 2 digits remaining
        if accumcount > 0 {
            bb.append_bits(accumdata, accumcount * 3 + 1)?;
        }
        Ok(QrSegment::new(QrSegmentMode::Numeric, text.len(), bb))
    }

    /// Creates a segment for alphanumeric text.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidArgument`] if `text` contains characters outside that set.
    pub fn make_alphanumeric(text: &str) -> Result<Self> {
        let mut bb = BitBuffer::new();
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let i = ALPHANUMERIC_CHARSET.find(c).ok_or_else(|| {
                QrError::invalid("String contains unencodable characters in alphanumeric mode")
            })?;
            accumdata = accumdata * 45 + i as u32;
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11)?;
                accumdata = 0;
                accumcount = 0;
            }
        }
        // 1 character remaining
        if accumcount > 0 {
            bb.append_bits(accumdata, 6)?;
        }
        Ok(QrSegment::new(QrSegmentMode::Alphanumeric, text.chars().count(), bb))
    }

    /// Returns a list of zero or one segments to represent the given Unicode text.
    ///
    /// Picks numeric mode if every character is a digit, alphanumeric mode if every character
    /// is in the alphanumeric set, and byte mode over the UTF-8 encoding otherwise. Empty text
    /// yields an empty list.
    pub fn make_segments(text: &str) -> Result<Vec<Self>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let seg = if QrSegment::is_numeric(text) {
            QrSegment::make_numeric(text)?
        } else if QrSegment::is_alphanumeric(text) {
            QrSegment::make_alphanumeric(text)?
        } else {
            QrSegment::make_bytes(text.as_bytes())
        };
        Ok(vec![seg])
    }

    /// Creates a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidArgument`] if `assignval` is 1 000 000 or larger.
    pub fn make_eci(assignval: u32) -> Result<Self> {
        let mut bb = BitBuffer::new();
        if assignval < 1 << 7 {
            bb.append_bits(assignval, 8)?;
        } else if assignval < 1 << 14 {
            bb.append_bits(0b10, 2)?;
            bb.append_bits(assignval, 14)?;
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3)?;
            bb.append_bits(assignval, 21)?;
        } else {
            return Err(QrError::invalid("ECI assignment value out of range"));
        }
        Ok(QrSegment::new(QrSegmentMode::Eci, 0, bb))
    }

    /// Creates a new segment from already-packed bits. The character count is checked
    /// against the length field only when the segment is encoded at a concrete version.
    pub fn new(mode: QrSegmentMode, numchars: usize, data: BitBuffer) -> Self {
        Self {
            mode,
            numchars,
            data,
        }
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    /// Calculates the number of bits needed to encode the given segments at the given version.
    ///
    /// Returns `None` if a segment has too many characters to fit its length field, or if the
    /// total would exceed `i32::MAX`.
    pub fn get_total_bits(segs: &[Self], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            // ccbits can be as large as 16, but usize can be as small as 16
            if let Some(limit) = 1usize.checked_shl(ccbits.into()) {
                if seg.numchars >= limit {
                    return None;
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
            if result > i32::MAX as usize {
                return None;
            }
        }
        Some(result)
    }

    /// Tests whether the given string can be encoded as a segment in numeric mode.
    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    /// Tests whether the given string can be encoded as a segment in alphanumeric mode.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

/// The set of all legal characters in alphanumeric mode, where each character value maps to
/// the index in the string.
static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Describes how a segment's data bits are interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
    Eci,
}

impl QrSegmentMode {
    /// Returns the 4-bit mode indicator.
    pub fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Kanji => 0x8,
            Eci => 0x7,
        }
    }

    /// Returns the bit width of the character count field for a segment in this mode
    /// in a QR Code at the given version number.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Kanji => [8, 10, 12],
            Eci => [0, 0, 0],
        })[usize::from((ver.value() + 7) / 17)]
    }
}
