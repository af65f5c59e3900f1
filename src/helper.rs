use crate::error::{QrError, Result};
use crate::qrcode::QrCode;
use crate::tables::QrCodeEcc;

use image::{ImageBuffer, Luma};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/*---- Utilities ----*/

/// Raster output parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
	/// Side length in pixels of one module; must be positive.
	pub scale: u32,
	/// Number of light modules around the symbol; must be non-negative.
	pub border: i32,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self { scale: 1, border: 4 }
	}
}

impl RenderOptions {
	fn validate(&self) -> Result<()> {
		if self.scale == 0 {
			return Err(QrError::invalid("scale must be positive"));
		}
		check_border(self.border)
	}
}

fn check_border(border: i32) -> Result<()> {
	if border < 0 {
		return Err(QrError::invalid("border must be non-negative"));
	}
	Ok(())
}

/// Returns a string of SVG code for an image depicting the given QR Code, with the given
/// number of border modules. The string always uses Unix newlines (\n), regardless of the
/// platform.
pub fn to_svg_string(qr: &QrCode, border: i32) -> Result<String> {
	check_border(border)?;
	let dimension = i64::from(qr.size()) + i64::from(border) * 2;
	let mut result = String::new();
	result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
	result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
	result += &format!(
		"<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n", dimension);
	result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
	result += "\t<path d=\"";
	let mut first = true;
	for y in 0 .. qr.size() {
		for x in 0 .. qr.size() {
			if qr.get_module(x, y) {
				if !first {
					result += " ";
				}
				first = false;
				result += &format!("M{},{}h1v1h-1z", i64::from(x) + i64::from(border), i64::from(y) + i64::from(border));
			}
		}
	}
	result += "\" fill=\"#000000\"/>\n";
	result += "</svg>\n";
	Ok(result)
}

/// Returns the QR Code as text, two characters per module, with exactly `border` light
/// rows above and below and `border` light modules on either side.
pub fn to_ascii_string(qr: &QrCode, border: i32) -> Result<String> {
	check_border(border)?;
	let mut result = String::new();
	for y in -border .. qr.size() + border {
		for x in -border .. qr.size() + border {
			let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
			result.push(c);
			result.push(c);
		}
		result.push('\n');
	}
	Ok(result)
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode) {
	let border: i32 = 4;
	// A non-negative border never fails
	if let Ok(text) = to_ascii_string(qr, border) {
		println!("{}", text);
	}
}

/// Renders the QR Code into a grayscale image: black modules are 0, light modules and the
/// border are 255.
///
/// # Errors
///
/// Returns [`QrError::InvalidArgument`] if the scale is zero, the border is negative, or the
/// image would be too large.
pub fn to_image_buffer(qr: &QrCode, options: &RenderOptions) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
	options.validate()?;
	let border = options.border;
	let scale = options.scale;
	let size = border
		.checked_mul(2)
		.and_then(|b| b.checked_add(qr.size()))
		.and_then(|modules| u32::try_from(modules).ok())
		.and_then(|modules| modules.checked_mul(scale))
		.ok_or_else(|| QrError::invalid("scale or border too large"))?;
	let mut img = ImageBuffer::new(size, size);

	for (x, y, pixel) in img.enumerate_pixels_mut() {
		let qr_x = (x / scale) as i32 - border;
		let qr_y = (y / scale) as i32 - border;
		*pixel = if qr.get_module(qr_x, qr_y) {
			Luma([0u8]) // Black
		} else {
			Luma([255u8]) // White
		};
	}

	Ok(img)
}

/// Converts a QR Code object to an image and saves it as PNG.
///
/// # Arguments
///
/// * `qr` - The QR Code object to convert.
/// * `options` - Scale and border of the image.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
///
/// # Returns
///
/// The path of the written file.
///
/// # Example
///
/// ```no_run
/// use quark::helper::{qr_to_image_and_save, RenderOptions};
/// use quark::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
/// qr_to_image_and_save(&qr, &RenderOptions::default(), Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn qr_to_image_and_save(
	qr: &QrCode,
	options: &RenderOptions,
	directory_path: Option<&str>,
	filename: Option<&str>,
) -> Result<PathBuf> {
	let img = to_image_buffer(qr, options)?;

	let directory_path = directory_path.unwrap_or("generated");
	let filename = match filename {
		Some(name) => name.to_string(),
		None => {
			let since_the_epoch = SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.unwrap_or_default();
			format!("{}", since_the_epoch.as_nanos())
		},
	};

	// Check if the directory exists, create it if it doesn't
	if !Path::new(directory_path).exists() {
		fs::create_dir_all(directory_path)?;
	}

	let file_path = Path::new(directory_path).join(format!("{}.png", filename));
	img.save(&file_path)?;
	debug!(path = %file_path.display(), version = qr.version().value(), "saved QR code image");
	Ok(file_path)
}

/// Generates a QR Code image from the provided content and saves it to a file.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
/// * `directory` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file. If not provided, a timestamp-based filename will be used.
///
/// # Example
///
/// ```no_run
/// use quark::helper::generate_image;
///
/// generate_image("Hello, World!", Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn generate_image(content: &str, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
	let qr: QrCode = QrCode::encode_text(content, QrCodeEcc::Low)?;
	qr_to_image_and_save(&qr, &RenderOptions::default(), directory, filename)
}

/// Generates a QR Code SVG from the provided content.
///
/// # Example
///
/// ```
/// use quark::helper::generate_svg_string;
///
/// let svg_string = generate_svg_string("Hello, World!").unwrap();
/// assert!(svg_string.ends_with("</svg>\n"));
/// ```
pub fn generate_svg_string(content: &str) -> Result<String> {
	let qr: QrCode = QrCode::encode_text(content, QrCodeEcc::Low)?;
	to_svg_string(&qr, 4)
}

/// Generates a QR Code image buffer from the provided content.
///
/// # Example
///
/// ```
/// use quark::helper::generate_image_buffer;
///
/// let img_buffer = generate_image_buffer("Hello, World!").unwrap();
/// assert_eq!(img_buffer.dimensions(), (29, 29));
/// ```
pub fn generate_image_buffer(content: &str) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
	let qr: QrCode = QrCode::encode_text(content, QrCodeEcc::Low)?;
	to_image_buffer(&qr, &RenderOptions::default())
}

// Tests
#[cfg(test)]
mod tests {
	use super::*;

	fn hello() -> QrCode {
		QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap()
	}

	#[test]
	fn test_to_svg_string() {
		let qr = hello();
		let svg = to_svg_string(&qr, 4).unwrap();

		assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
		assert!(svg.contains("viewBox=\"0 0 29 29\""));
		// The top left module is dark and sits at the border offset
		assert!(svg.contains("d=\"M4,4h1v1h-1z M5,4h1v1h-1z"));
		let dark = (0..qr.size())
			.flat_map(|y| (0..qr.size()).map(move |x| (x, y)))
			.filter(|&(x, y)| qr.get_module(x, y))
			.count();
		assert_eq!(svg.matches("h1v1h-1z").count(), dark);
	}

	#[test]
	fn test_negative_border_rejected() {
		let qr = hello();
		assert!(matches!(to_svg_string(&qr, -1), Err(QrError::InvalidArgument(_))));
		assert!(matches!(to_ascii_string(&qr, -1), Err(QrError::InvalidArgument(_))));
		let options = RenderOptions { scale: 0, border: 4 };
		assert!(matches!(to_image_buffer(&qr, &options), Err(QrError::InvalidArgument(_))));
	}

	#[test]
	fn test_ascii_border_rows() {
		let qr = hello();
		let text = to_ascii_string(&qr, 2).unwrap();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines.len(), 21 + 4);
		assert!(lines.iter().all(|line| line.chars().count() == (21 + 4) * 2));
		assert!(lines[0].trim().is_empty());
		assert!(lines[1].trim().is_empty());
		assert!(lines[23].trim().is_empty());
		assert!(lines[24].trim().is_empty());
		assert!(lines[2].starts_with("    ██"));
	}

	#[test]
	fn test_generate_image_buffer() {
		let content = "Hello, world!";
		let img = generate_image_buffer(content).unwrap();

		// The QR code for "Hello, world!" with a low error correction level
		// and a border of 4 should be 29x29 pixels.
		assert_eq!(img.dimensions(), (29, 29));
	}

	#[test]
	fn test_image_scale() {
		let qr = hello();
		let options = RenderOptions { scale: 3, border: 1 };
		let img = to_image_buffer(&qr, &options).unwrap();
		assert_eq!(img.dimensions(), (69, 69));
		// Border pixels are white, the finder corner is black
		assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
		assert_eq!(img.get_pixel(3, 3), &Luma([0u8]));
		assert_eq!(img.get_pixel(5, 5), &Luma([0u8]));
	}

	#[test]
	fn test_qr_to_image_and_save() {
		let dir = std::env::temp_dir().join(format!("quark-test-{}", std::process::id()));
		let dir_str = dir.to_str().unwrap();
		let path = qr_to_image_and_save(&hello(), &RenderOptions::default(), Some(dir_str), Some("hello")).unwrap();
		assert!(path.exists());
		assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
		let decoded = image::open(&path).unwrap().to_luma8();
		assert_eq!(decoded.dimensions(), (29, 29));
		fs::remove_dir_all(&dir).unwrap();
	}
}
