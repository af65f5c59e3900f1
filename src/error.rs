//! Error types shared by the encoder and the renderers.

use thiserror::Error;

/// Error type for when data exceeds QR code capacity.
///
/// Ways to handle this error include:
///
/// - Decrease the error correction level if it was greater than `QrCodeEcc::Low`.
/// - Increase the maxversion argument if it was less than `Version::MAX`.
/// - Split the text data into better or optimal segments to reduce the number of bits required.
/// - Change the text or binary data to be shorter.
/// - Change the text to fit the character set of a particular segment mode (e.g. alphanumeric).
/// - Propagate the error upward to the caller/user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataTooLong {
    /// A segment's character count does not fit its length field.
    #[error("Segment too long")]
    SegmentTooLong,

    /// Data length exceeds capacity: (bits needed, bits available).
    #[error("Data length = {0} bits, Max capacity = {1} bits")]
    DataOverCapacity(usize, usize),
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("Invalid argument - {0}")]
    InvalidArgument(String),

    #[error("Bit index {index} out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    DataTooLong(#[from] DataTooLong),

    #[error("Image error - {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error - {0}")]
    Io(#[from] std::io::Error),
}

impl QrError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, QrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_too_long_messages() {
        assert_eq!(DataTooLong::SegmentTooLong.to_string(), "Segment too long");
        assert_eq!(
            DataTooLong::DataOverCapacity(300, 152).to_string(),
            "Data length = 300 bits, Max capacity = 152 bits"
        );
    }

    #[test]
    fn data_too_long_converts_transparently() {
        let err: QrError = DataTooLong::SegmentTooLong.into();
        assert!(matches!(err, QrError::DataTooLong(DataTooLong::SegmentTooLong)));
        assert_eq!(err.to_string(), "Segment too long");
    }
}
