//! QR code encoding functionality.
//!
//! This module ties the encoder together: it picks a version for the given segments,
//! packs them into data codewords, adds error correction, draws the symbol and masks it.
//! The only artifact handed out is the immutable [`QrCode`].

use tracing::debug;

use crate::bitbuffer::BitBuffer;
use crate::error::{DataTooLong, QrError, Result};
use crate::layer::Layer;
use crate::masking::finish_masking;
use crate::patterns::draw_function_patterns;
use crate::placement::{add_ecc_and_interleave, draw_codewords};
use crate::segment::QrSegment;
use crate::tables::{get_num_data_codewords, Mask, QrCodeEcc, Version};

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// This struct supports QR Code Model 2, covering versions 1 to 40, all four error correction
/// levels, and four encoding modes (numeric, alphanumeric, byte, ECI). Instances are
/// immutable after creation.
///
/// # Creation
///
/// - High-level: Use [`QrCode::encode_text`] or [`QrCode::encode_binary`].
/// - Mid-level: Use [`QrCode::encode_segments`] or [`QrCode::encode_segments_advanced`].
/// - Low-level: Directly construct with [`QrCode::encode_codewords`].
///
/// # Example
///
/// ```rust
/// use quark::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// println!("Version: {}", qr.version().value());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: Version,

    errorcorrectionlevel: QrCodeEcc,

    mask: Mask,

    /// The modules of this QR Code (false = light, true = dark), row-major.
    /// Immutable after constructor finishes. Accessed through get_module().
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string into a QR code at the given error correction level.
    ///
    /// The smallest possible version is chosen and the error correction level may be boosted
    /// when that does not increase the version. The segment mode is picked automatically.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::DataTooLong`] if the text does not fit in version 40.
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self> {
        let segs = QrSegment::make_segments(text)?;
        QrCode::encode_segments(&segs, ecl)
    }

    /// Encodes binary data into a QR code, always in byte mode.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::DataTooLong`] if the data does not fit in version 40.
    pub fn encode_binary(data: &[u8], ecl: QrCodeEcc) -> Result<Self> {
        let segs = [QrSegment::make_bytes(data)];
        QrCode::encode_segments(&segs, ecl)
    }

    /// Encodes the given segments with the default [`EncodeOptions`].
    pub fn encode_segments(segs: &[QrSegment], ecl: QrCodeEcc) -> Result<Self> {
        QrCode::encode_segments_with(segs, ecl, &EncodeOptions::default())
    }

    /// Encodes the given segments with explicit encoding parameters.
    ///
    /// The smallest possible QR Code version within the given range is automatically
    /// chosen for the output. If `boostecl` is `true`, the ECC level may be higher than the
    /// `ecl` argument if it can be done without increasing the version. The `mask` can be
    /// `None` for automatic selection or a value from 0 to 7.
    ///
    /// # Arguments
    ///
    /// * `segs` - Segments to encode, in order.
    /// * `ecl` - Error correction level.
    /// * `minversion` - Minimum QR code version.
    /// * `maxversion` - Maximum QR code version.
    /// * `mask` - Optional mask pattern.
    /// * `boostecl` - Whether to boost error correction if possible.
    pub fn encode_segments_advanced(
        segs: &[QrSegment],
        ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<Self> {
        let options = EncodeOptions {
            minversion,
            maxversion,
            mask,
            boostecl,
        };
        QrCode::encode_segments_with(segs, ecl, &options)
    }

    /// Encodes the given segments using the given options.
    ///
    /// # Errors
    ///
    /// Returns [`QrError::InvalidArgument`] if `minversion > maxversion`, and
    /// [`QrError::DataTooLong`] if no version in the range can hold the segments.
    pub fn encode_segments_with(
        segs: &[QrSegment],
        ecl: QrCodeEcc,
        options: &EncodeOptions,
    ) -> Result<Self> {
        options.validate()?;
        let (version, ecl, datausedbits) = QrCode::choose_version(segs, ecl, options)?;
        debug!(
            version = version.value(),
            ecl = ?ecl,
            datausedbits,
            "selected symbol version"
        );
        let datacodewords = QrCode::encode_segments_to_codewords(segs, version, ecl, datausedbits)?;
        QrCode::encode_codewords(version, ecl, &datacodewords, options.mask)
    }

    /// Finds the smallest version in range that fits the segments, then the strongest error
    /// correction level that still fits that version when boosting is enabled.
    fn choose_version(
        segs: &[QrSegment],
        mut ecl: QrCodeEcc,
        options: &EncodeOptions,
    ) -> Result<(Version, QrCodeEcc, usize)> {
        let mut version: Version = options.minversion;
        let datausedbits: usize = loop {
            let datacapacitybits: usize = get_num_data_codewords(version, ecl) * 8;
            let dataused: Option<usize> = QrSegment::get_total_bits(segs, version);
            match dataused {
                Some(n) if n <= datacapacitybits => break n,
                _ if version >= options.maxversion => {
                    return Err(match dataused {
                        None => DataTooLong::SegmentTooLong,
                        Some(n) => DataTooLong::DataOverCapacity(n, datacapacitybits),
                    }
                    .into());
                }
                _ => {}
            }
            version = Version::new(version.value() + 1);
        };

        // Increase the error correction level while the data still fits
        if options.boostecl {
            for newecl in QrCodeEcc::ALL {
                if newecl > ecl && datausedbits <= get_num_data_codewords(version, newecl) * 8 {
                    ecl = newecl;
                }
            }
        }
        Ok((version, ecl, datausedbits))
    }

    /// Concatenates the segments with their headers, then adds the terminator, bit padding
    /// and pad bytes up to the data capacity of the given version and level.
    fn encode_segments_to_codewords(
        segs: &[QrSegment],
        version: Version,
        ecl: QrCodeEcc,
        datausedbits: usize,
    ) -> Result<Vec<u8>> {
        let datacapacitybits: usize = get_num_data_codewords(version, ecl) * 8;
        let mut bb = BitBuffer::new();
        for seg in segs {
            bb.append_bits(seg.mode().mode_bits(), 4)?;
            let numchars = u32::try_from(seg.num_chars())
                .map_err(|_| QrError::from(DataTooLong::SegmentTooLong))?;
            bb.append_bits(numchars, seg.mode().num_char_count_bits(version))?;
            bb.append_data(seg.data());
        }
        assert_eq!(bb.len(), datausedbits, "Segment bit count mismatch");

        // Add terminator and pad up to a byte if applicable
        let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
        bb.append_bits(0, numzerobits as u8)?;
        let numzerobits: usize = bb.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8)?;
        debug_assert_eq!(bb.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        let mut padbyte: u32 = 0xec;
        while bb.len() < datacapacitybits {
            bb.append_bits(padbyte, 8)?;
            padbyte ^= 0xec ^ 0x11;
        }
        Ok(bb.to_bytes())
    }

    /// Creates a new QR Code with the given version number,
    /// error correction level, data codeword bytes, and mask number.
    ///
    /// This is a low-level API that most users should not use directly.
    /// A mid-level API is the `encode_segments_advanced()` function.
    ///
    /// # Arguments
    ///
    /// * `version` - QR code version.
    /// * `ecl` - Error correction level.
    /// * `datacodewords` - Exactly `get_num_data_codewords(version, ecl)` bytes, without ECC.
    /// * `mask` - Optional mask pattern; `None` picks the lowest-penalty mask.
    pub fn encode_codewords(
        version: Version,
        ecl: QrCodeEcc,
        datacodewords: &[u8],
        mask: Option<Mask>,
    ) -> Result<Self> {
        let mut layer = QrCode::unmasked_layer(version, ecl, datacodewords)?;
        let mask = finish_masking(&mut layer, ecl, mask);
        Ok(Self {
            version,
            errorcorrectionlevel: ecl,
            mask,
            modules: layer.into_canvas().into_modules(),
        })
    }

    /// Draws function patterns and codewords, leaving the data area unmasked.
    pub(crate) fn unmasked_layer(
        version: Version,
        ecl: QrCodeEcc,
        datacodewords: &[u8],
    ) -> Result<Layer> {
        let allcodewords = add_ecc_and_interleave(datacodewords, version, ecl)?;
        let mut layer = Layer::new(version.size());
        draw_function_patterns(&mut layer, version, ecl);
        draw_codewords(&mut layer, version, &allcodewords);
        Ok(layer)
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.version.size() as i32
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.errorcorrectionlevel
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size();
        range.contains(&x)
            && range.contains(&y)
            && self.modules[(y as usize) * self.version.size() + (x as usize)]
    }
}

/// Encoding parameters for [`QrCode::encode_segments_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub minversion: Version,
    pub maxversion: Version,
    /// `None` selects the mask automatically.
    pub mask: Option<Mask>,
    pub boostecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            minversion: Version::MIN,
            maxversion: Version::MAX,
            mask: None,
            boostecl: true,
        }
    }
}

impl EncodeOptions {
    pub fn with_version_range(mut self, minversion: Version, maxversion: Version) -> Self {
        self.minversion = minversion;
        self.maxversion = maxversion;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_boostecl(mut self, boostecl: bool) -> Self {
        self.boostecl = boostecl;
        self
    }

    /// Checks that the version range is not empty.
    pub fn validate(&self) -> Result<()> {
        if self.minversion > self.maxversion {
            return Err(QrError::invalid(format!(
                "minversion {} is greater than maxversion {}",
                self.minversion.value(),
                self.maxversion.value()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::{apply_mask, penalty_score};
    use crate::patterns::{draw_format_bits, format_bits};
    use crate::segment::QrSegmentMode;

    /// Reads the first copy of the format information back out of the symbol.
    fn read_format_bits(qr: &QrCode) -> u32 {
        let mut bits: u32 = 0;
        let mut put = |i: u32, x: i32, y: i32| bits |= u32::from(qr.get_module(x, y)) << i;
        for i in 0..6 {
            put(i, 8, i as i32);
        }
        put(6, 8, 7);
        put(7, 8, 8);
        put(8, 7, 8);
        for i in 9..15 {
            put(i, 14 - i as i32, 8);
        }
        bits
    }

    #[test]
    fn test_hello_world() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        assert_eq!(segs[0].mode(), QrSegmentMode::Alphanumeric);

        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version(), Version::new(1));
        assert_eq!(qr.size(), 21);
        // 74 data bits fit version 1 up to Quartile, so the level is boosted
        assert_eq!(qr.error_correction_level(), QrCodeEcc::Quartile);

        for (cx, cy) in [(3, 3), (17, 3), (3, 17)] {
            for dy in -4i32..=4 {
                for dx in -4i32..=4 {
                    let dist = dx.abs().max(dy.abs());
                    assert_eq!(
                        qr.get_module(cx + dx, cy + dy),
                        dist != 2 && dist != 4,
                        "({}, {})",
                        cx + dx,
                        cy + dy
                    );
                }
            }
        }
    }

    #[test]
    fn test_hello_world_without_boost() {
        let segs = QrSegment::make_segments("HELLO WORLD").unwrap();
        let qr = QrCode::encode_segments_advanced(
            &segs,
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            None,
            false,
        )
        .unwrap();
        assert_eq!(qr.error_correction_level(), QrCodeEcc::Low);
        assert_eq!(qr.version(), Version::new(1));
    }

    #[test]
    fn test_boost_stops_at_strongest_fitting_level() {
        // 74 data bits: version 1-Q holds 104, version 1-H only 72
        for (ecl, expected) in [
            (QrCodeEcc::Low, QrCodeEcc::Quartile),
            (QrCodeEcc::Medium, QrCodeEcc::Quartile),
            (QrCodeEcc::Quartile, QrCodeEcc::Quartile),
        ] {
            let qr = QrCode::encode_text("HELLO WORLD", ecl).unwrap();
            assert_eq!(qr.version(), Version::new(1));
            assert_eq!(qr.error_correction_level(), expected, "{ecl:?}");
        }
        // High never fits version 1, so it grows the version instead of dropping a level
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::High).unwrap();
        assert_eq!(qr.version(), Version::new(2));
        assert_eq!(qr.error_correction_level(), QrCodeEcc::High);
    }

    #[test]
    fn test_format_bits_match_fields() {
        for text in ["HELLO WORLD", "314159265358979", "Hello, world!"] {
            let qr = QrCode::encode_text(text, QrCodeEcc::Medium).unwrap();
            assert_eq!(
                read_format_bits(&qr),
                format_bits(qr.error_correction_level(), qr.mask()),
                "{text}"
            );
        }
    }

    #[test]
    fn test_empty_binary() {
        let qr = QrCode::encode_binary(&[], QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version(), Version::MIN);
        assert_eq!(qr.size(), 21);
        let qr = QrCode::encode_text("", QrCodeEcc::High).unwrap();
        assert_eq!(qr.version(), Version::MIN);
    }

    #[test]
    fn test_version_grows_with_data() {
        let qr = QrCode::encode_binary(&[0x41; 100], QrCodeEcc::Low).unwrap();
        // 4 + 8 + 800 bits needs more than version 4-L's 80 bytes
        assert_eq!(qr.version(), Version::new(5));
        assert_eq!(qr.size(), 37);
    }

    #[test]
    fn test_max_version_too_small() {
        let segs = [QrSegment::make_bytes(&[0u8; 30])];
        let result = QrCode::encode_segments_advanced(
            &segs,
            QrCodeEcc::Low,
            Version::MIN,
            Version::MIN,
            None,
            true,
        );
        match result {
            Err(QrError::DataTooLong(DataTooLong::DataOverCapacity(needed, available))) => {
                assert_eq!(needed, 4 + 8 + 240);
                assert_eq!(available, 152);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_segment_too_long_for_count_field() {
        // 300 bytes overflow the 8-bit count field of versions 1-9
        let segs = [QrSegment::make_bytes(&[0u8; 300])];
        let options = EncodeOptions::default().with_version_range(Version::MIN, Version::new(9));
        let result = QrCode::encode_segments_with(&segs, QrCodeEcc::Low, &options);
        assert!(matches!(
            result,
            Err(QrError::DataTooLong(DataTooLong::SegmentTooLong))
        ));
    }

    #[test]
    fn test_too_long_for_any_version() {
        let data = vec![0u8; 3000];
        assert!(matches!(
            QrCode::encode_binary(&data, QrCodeEcc::Low),
            Err(QrError::DataTooLong(_))
        ));
        // The largest byte payload at version 40-L
        assert_eq!(
            QrCode::encode_binary(&data[..2953], QrCodeEcc::Low).unwrap().version(),
            Version::MAX
        );
    }

    #[test]
    fn test_invalid_version_range() {
        let options = EncodeOptions::default().with_version_range(Version::new(5), Version::new(2));
        let result = QrCode::encode_segments_with(&[], QrCodeEcc::Low, &options);
        assert!(matches!(result, Err(QrError::InvalidArgument(_))));
    }

    #[test]
    fn test_min_version_respected() {
        let options = EncodeOptions::default().with_version_range(Version::new(7), Version::MAX);
        let segs = QrSegment::make_segments("A").unwrap();
        let qr = QrCode::encode_segments_with(&segs, QrCodeEcc::Low, &options).unwrap();
        assert_eq!(qr.version(), Version::new(7));
        assert_eq!(qr.size(), 45);
    }

    #[test]
    fn test_forced_mask() {
        for m in 0..8 {
            let options = EncodeOptions::default().with_mask(Mask::new(m));
            let segs = QrSegment::make_segments("forced mask").unwrap();
            let qr = QrCode::encode_segments_with(&segs, QrCodeEcc::Medium, &options).unwrap();
            assert_eq!(qr.mask(), Mask::new(m));
        }
    }

    #[test]
    fn test_padding_bytes() {
        let segs = QrSegment::make_segments("01234567").unwrap();
        let ver = Version::new(1);
        let bits = QrSegment::get_total_bits(&segs, ver).unwrap();
        let codewords =
            QrCode::encode_segments_to_codewords(&segs, ver, QrCodeEcc::Medium, bits).unwrap();
        assert_eq!(
            codewords,
            vec![
                0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec,
                0x11, 0xec, 0x11
            ]
        );
    }

    #[test]
    fn test_terminator_truncated_at_capacity() {
        // 17 bytes at version 1-L use 4 + 8 + 136 = 148 of 152 bits
        let segs = [QrSegment::make_bytes(&[0xff; 17])];
        let ver = Version::new(1);
        let codewords =
            QrCode::encode_segments_to_codewords(&segs, ver, QrCodeEcc::Low, 148).unwrap();
        assert_eq!(codewords.len(), 19);
        assert_eq!(codewords[18], 0xf0);
    }

    #[test]
    fn test_encode_codewords_rejects_wrong_length() {
        let result = QrCode::encode_codewords(Version::new(1), QrCodeEcc::Low, &[0u8; 5], None);
        assert!(matches!(result, Err(QrError::InvalidArgument(_))));
    }

    #[test]
    fn test_auto_mask_is_argmin_penalty() {
        let ver = Version::new(2);
        let ecl = QrCodeEcc::Medium;
        let data: Vec<u8> = (0..get_num_data_codewords(ver, ecl) as u8).collect();
        let layer = QrCode::unmasked_layer(ver, ecl, &data).unwrap();
        let scores: Vec<i32> = Mask::ALL
            .iter()
            .map(|&m| {
                let mut trial = layer.clone();
                apply_mask(&mut trial, m);
                draw_format_bits(&mut trial, ecl, m);
                penalty_score(trial.canvas())
            })
            .collect();
        let min = *scores.iter().min().unwrap();
        let qr = QrCode::encode_codewords(ver, ecl, &data, None).unwrap();
        assert_eq!(scores[qr.mask().value() as usize], min);
        assert_eq!(scores.iter().position(|&s| s == min), Some(qr.mask().value() as usize));
    }

    #[test]
    fn test_out_of_range_is_light() {
        let qr = QrCode::encode_text("out of range", QrCodeEcc::Low).unwrap();
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, qr.size()));
        assert!(qr.get_module(0, 0));
    }

    #[test]
    fn test_deterministic() {
        let a = QrCode::encode_text("https://example.com", QrCodeEcc::Quartile).unwrap();
        let b = QrCode::encode_text("https://example.com", QrCodeEcc::Quartile).unwrap();
        assert_eq!(a, b);
    }
}
