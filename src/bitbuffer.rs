use crate::error::{QrError, Result};

/// An appendable sequence of bits (0s and 1s).
///
/// Mainly used by [`QrSegment`](crate::segment::QrSegment) and the encoder to pack
/// segment headers, payloads and padding before they are split into codewords.
/// The only mutating operations append; cloning yields an independent copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitBuffer(Vec<bool>);

impl BitBuffer {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a buffer holding every bit of `data`, most significant bit of each byte first.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(
            data.iter()
                .flat_map(|&b| (0..8).rev().map(move |i| get_bit(b.into(), i)))
                .collect(),
        )
    }

    /// Returns the number of bits in this buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the bit at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::IndexOutOfRange`] if `index` is not in `[0, len)`.
    pub fn get_bit(&self, index: usize) -> Result<bool> {
        self.0.get(index).copied().ok_or(QrError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Appends the low `len` bits of `val`, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidArgument`] if `len > 31` or if `val` has a set bit at or
    /// above position `len`.
    pub fn append_bits(&mut self, val: u32, len: u8) -> Result<()> {
        if len > 31 || (val >> len) != 0 {
            return Err(QrError::invalid(format!("value {val} does not fit in {len} bits")));
        }
        self.0.extend((0..len).rev().map(|i| get_bit(val, i)));
        Ok(())
    }

    /// Appends every bit of `other` to this buffer.
    pub fn append_data(&mut self, other: &BitBuffer) {
        self.0.extend_from_slice(&other.0);
    }

    /// Iterates over the bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Packs the bits into bytes, most significant bit first. A trailing partial byte is
    /// padded with zero bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = vec![0u8; self.len().div_ceil(8)];
        for (i, bit) in self.iter().enumerate() {
            result[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }
        result
    }
}

/// Returns true iff the i'th bit of x is set to 1.
pub(crate) fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}
