//! Error correction block splitting, interleaving and zigzag placement of codewords.

use crate::bitbuffer::get_bit;
use crate::error::{QrError, Result};
use crate::layer::Layer;
use crate::reed_solomon::ReedSolomonGenerator;
use crate::tables::{
    get_num_data_codewords, get_num_raw_data_modules, table_get, QrCodeEcc, Version,
    ECC_CODEWORDS_PER_BLOCK, NUM_ERROR_CORRECTION_BLOCKS,
};

/// Returns the given data with the Reed–Solomon codewords of every block appended, with the
/// bytes of all blocks interleaved into a single sequence.
///
/// # Errors
///
/// Returns [`QrError::InvalidArgument`] if `data` is not exactly
/// `get_num_data_codewords(ver, ecl)` bytes long.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Result<Vec<u8>> {
    let expected = get_num_data_codewords(ver, ecl);
    if data.len() != expected {
        return Err(QrError::invalid(format!(
            "expected {expected} data codewords, got {}",
            data.len()
        )));
    }

    let numblocks: usize = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
    let blockecclen: usize = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
    let rawcodewords: usize = get_num_raw_data_modules(ver) / 8;
    let numshortblocks: usize = numblocks - rawcodewords % numblocks;
    let shortblocklen: usize = rawcodewords / numblocks;

    // Split data into blocks and append ECC to each block
    let rs = ReedSolomonGenerator::new(blockecclen)?;
    debug_assert_eq!(rs.degree(), blockecclen);
    let mut blocks = Vec::<Vec<u8>>::with_capacity(numblocks);
    let mut k: usize = 0;
    for i in 0..numblocks {
        let datlen: usize = shortblocklen - blockecclen + usize::from(i >= numshortblocks);
        let mut dat = data[k..k + datlen].to_vec();
        k += datlen;
        let ecc = rs.compute_remainder(&dat);
        if i < numshortblocks {
            dat.push(0);
        }
        dat.extend_from_slice(&ecc);
        blocks.push(dat);
    }

    // Interleave (not concatenate) the bytes from every block into a single sequence
    let mut result = Vec::<u8>::with_capacity(rawcodewords);
    for i in 0..=shortblocklen {
        for (j, block) in blocks.iter().enumerate() {
            // Skip the padding byte in short blocks
            if i != shortblocklen - blockecclen || j >= numshortblocks {
                result.push(block[i]);
            }
        }
    }
    assert_eq!(result.len(), rawcodewords, "Interleaved codeword count mismatch");
    Ok(result)
}

/// Draws the given sequence of 8-bit codewords (data and error correction) onto the entire
/// data area of the layer. Function modules must be marked before this is called.
///
/// # Panics
///
/// Panics if `data` does not fill the data area exactly; this indicates a broken encoder
/// rather than bad input.
pub fn draw_codewords(layer: &mut Layer, ver: Version, data: &[u8]) {
    assert_eq!(
        data.len(),
        get_num_raw_data_modules(ver) / 8,
        "Codeword count does not match version"
    );
    let size = layer.size() as i32;
    let totalbits = data.len() * 8;
    let mut i: usize = 0; // Bit index into the data

    // Zigzag scan over column pairs, right to left
    let mut right: i32 = size - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let upward: bool = ((right + 1) & 2) == 0;
        for vert in 0..size {
            for j in 0..2 {
                let x = (right - j) as usize;
                let y = (if upward { size - 1 - vert } else { vert }) as usize;
                if !layer.is_protected(x, y) && i < totalbits {
                    layer.canvas.set(x, y, get_bit(data[i >> 3].into(), 7 - (i & 7) as u8));
                    i += 1;
                }
                // Any remainder bits (0 to 7) stay light
            }
        }
        right -= 2;
    }
    assert_eq!(i, totalbits, "Not every codeword bit was placed");
}
