//! # quark
//!
//! A Rust library for encoding text or binary data into QR Code symbols.
//!
//! `quark` implements the QR Code Model 2 symbol encoder: segment packing, Reed–Solomon error
//! correction with block interleaving, function pattern drawing, data placement and masking
//! with penalty-based mask selection. It supports versions 1 to 40, four error correction
//! levels and numeric, alphanumeric, byte and ECI segments. The finished [`QrCode`] is an
//! immutable grid that can be rendered as SVG, text, or an image.
//!
//! ## Features
//!
//! - Encode data in numeric, alphanumeric, byte, or ECI modes.
//! - Support four error correction levels: Low, Medium, Quartile, High.
//! - Pick the smallest version automatically and boost the error correction level for free.
//! - Render QR codes as ASCII art, PNG images, SVGs, or in-memory image buffers.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! ```rust
//! use quark::{QrCode, QrCodeEcc};
//! use quark::helper::to_svg_string;
//!
//! let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
//! assert_eq!(qr.size(), 21);
//! let svg = to_svg_string(&qr, 4).unwrap();
//! assert!(svg.contains("viewBox=\"0 0 29 29\""));
//! ```
//!
//! Encoding with explicit options:
//!
//! ```rust
//! use quark::{EncodeOptions, Mask, QrCode, QrCodeEcc, QrSegment, Version};
//!
//! let segs = QrSegment::make_segments("3141592653589793238").unwrap();
//! let options = EncodeOptions::default()
//!     .with_version_range(Version::new(2), Version::new(10))
//!     .with_mask(Mask::new(3))
//!     .with_boostecl(false);
//! let qr = QrCode::encode_segments_with(&segs, QrCodeEcc::Medium, &options).unwrap();
//! assert_eq!(qr.version(), Version::new(2));
//! assert_eq!(qr.mask(), Mask::new(3));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Top-level encoding and the finished [`QrCode`].
//! - [`segment`]: Segment construction and bit length accounting.
//! - [`bitbuffer`], [`reed_solomon`], [`tables`]: Building blocks of the encoder.
//! - [`layer`], [`patterns`], [`placement`], [`masking`]: Symbol drawing.
//! - [`helper`]: Utilities for rendering QR codes in various formats.

#![forbid(unsafe_code)]

pub mod bitbuffer;
pub mod error;
pub mod helper;
pub mod layer;
pub mod masking;
pub mod patterns;
pub mod placement;
pub mod qrcode;
pub mod reed_solomon;
pub mod segment;
pub mod tables;

pub use crate::bitbuffer::BitBuffer;
pub use crate::error::{DataTooLong, QrError, Result};
pub use crate::qrcode::{EncodeOptions, QrCode};
pub use crate::segment::{QrSegment, QrSegmentMode};
pub use crate::tables::{Mask, QrCodeEcc, Version};
