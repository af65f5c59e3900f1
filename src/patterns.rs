//! Drawing of the function patterns: timing, finder, alignment, format and version information.

use crate::bitbuffer::get_bit;
use crate::layer::Layer;
use crate::tables::{Mask, QrCodeEcc, Version};

/// Draws and marks every function module of a symbol of the given version. The format bits
/// are drawn with a dummy mask and must be redrawn once the real mask is known.
pub fn draw_function_patterns(layer: &mut Layer, ver: Version, ecl: QrCodeEcc) {
    assert_eq!(layer.size(), ver.size(), "Layer size does not match version");
    let size = layer.size();

    // Timing patterns along row 6 and column 6
    for i in 0..size {
        layer.set_function_module(6, i, i % 2 == 0);
        layer.set_function_module(i, 6, i % 2 == 0);
    }

    // Finder patterns in three corners; these overwrite some timing modules
    let far = size as i32 - 4;
    draw_finder_pattern(layer, 3, 3);
    draw_finder_pattern(layer, far, 3);
    draw_finder_pattern(layer, 3, far);

    let alignpatpos = alignment_pattern_positions(ver);
    let numalign = alignpatpos.len();
    for (i, &pos0) in alignpatpos.iter().enumerate() {
        for (j, &pos1) in alignpatpos.iter().enumerate() {
            // Skip the three finder corners
            if (i == 0 && j == 0) || (i == 0 && j == numalign - 1) || (i == numalign - 1 && j == 0)
            {
                continue;
            }
            draw_alignment_pattern(layer, pos0, pos1);
        }
    }

    draw_format_bits(layer, ecl, Mask::new(0));
    draw_version(layer, ver);
}

/// Draws a 9*9 finder pattern including the separator, centered at (x, y). Modules that
/// fall outside the grid are skipped.
fn draw_finder_pattern(layer: &mut Layer, x: i32, y: i32) {
    for dy in -4i32..=4 {
        for dx in -4i32..=4 {
            let dist: i32 = dx.abs().max(dy.abs());
            layer.set_function_module_unbounded(x + dx, y + dy, dist != 2 && dist != 4);
        }
    }
}

/// Draws a 5*5 alignment pattern centered at (x, y). All modules must be in bounds.
fn draw_alignment_pattern(layer: &mut Layer, x: usize, y: usize) {
    for dy in 0usize..5 {
        for dx in 0usize..5 {
            let dist = dx.abs_diff(2).max(dy.abs_diff(2));
            layer.set_function_module(x + dx - 2, y + dy - 2, dist != 1);
        }
    }
}

/// Draws both copies of the 15-bit format information for the given level and mask.
pub fn draw_format_bits(layer: &mut Layer, ecl: QrCodeEcc, mask: Mask) {
    let bits: u32 = format_bits(ecl, mask);
    let size = layer.size();

    // First copy, around the top left finder
    for i in 0..6 {
        layer.set_function_module(8, i, get_bit(bits, i as u8));
    }
    layer.set_function_module(8, 7, get_bit(bits, 6));
    layer.set_function_module(8, 8, get_bit(bits, 7));
    layer.set_function_module(7, 8, get_bit(bits, 8));
    for i in 9..15 {
        layer.set_function_module(14 - i, 8, get_bit(bits, i as u8));
    }

    // Second copy, split between the top right and bottom left finders
    for i in 0..8 {
        layer.set_function_module(size - 1 - i, 8, get_bit(bits, i as u8));
    }
    for i in 8..15 {
        layer.set_function_module(8, size - 15 + i, get_bit(bits, i as u8));
    }
    layer.set_function_module(8, size - 8, true);
}

/// Returns the masked 15-bit format word: 2 bits of level, 3 bits of mask, 10 bits of BCH
/// remainder.
pub fn format_bits(ecl: QrCodeEcc, mask: Mask) -> u32 {
    let data = u32::from((ecl.format_bits() << 3) | mask.value());
    let mut rem: u32 = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    let bits = ((data << 10) | rem) ^ 0x5412;
    debug_assert_eq!(bits >> 15, 0);
    bits
}

/// Draws both copies of the 18-bit version information, for versions 7 and up.
fn draw_version(layer: &mut Layer, ver: Version) {
    let Some(bits) = version_bits(ver) else {
        return;
    };
    let size = layer.size();
    for i in 0u8..18 {
        let bit: bool = get_bit(bits, i);
        let a = size - 11 + usize::from(i % 3);
        let b = usize::from(i / 3);
        layer.set_function_module(a, b, bit);
        layer.set_function_module(b, a, bit);
    }
}

/// Returns the 18-bit version word (6 bits of version, 12 bits of remainder), or `None`
/// below version 7 where no version information is drawn.
pub fn version_bits(ver: Version) -> Option<u32> {
    let ver = u32::from(ver.value());
    if ver < 7 {
        return None;
    }
    let mut rem: u32 = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
    }
    Some((ver << 12) | rem)
}

/// Returns an ascending list of alignment pattern center positions for the given version.
/// Each position is used on both axes. Version 1 has none.
pub fn alignment_pattern_positions(ver: Version) -> Vec<usize> {
    let v = usize::from(ver.value());
    if v == 1 {
        return Vec::new();
    }
    let numalign = v / 7 + 2;
    let step = if v == 32 {
        26
    } else {
        // ceil((size - 13) / (numalign * 2 - 2)) * 2
        (v * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
    };
    let mut result: Vec<usize> = (0..numalign - 1).map(|i| ver.size() - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}
