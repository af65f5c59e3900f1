//! Mask patterns, the penalty score and mask selection.

use tracing::{debug, trace};

use crate::layer::{Grid, Layer};
use crate::patterns::draw_format_bits;
use crate::tables::{Mask, QrCodeEcc};

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// Returns whether the given mask pattern inverts the module at (x, y).
pub fn mask_bit(mask: Mask, x: usize, y: usize) -> bool {
    match mask.value() {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => ((x * y) % 2) + ((x * y) % 3) == 0,
        6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
        7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
        _ => unreachable!("Mask is always in [0, 7]"),
    }
}

/// XORs every non-function module with the given mask pattern. Applying the same mask a
/// second time undoes it.
pub fn apply_mask(layer: &mut Layer, mask: Mask) {
    let size = layer.size();
    for y in 0..size {
        for x in 0..size {
            if layer.is_protected(x, y) {
                continue;
            }
            let color = layer.canvas.get(x, y);
            layer.canvas.set(x, y, color ^ mask_bit(mask, x, y));
        }
    }
}

/// Evaluates every mask on its own copy of the unmasked layer and returns the one with
/// the lowest penalty score. Ties go to the lowest mask number.
pub fn choose_mask(layer: &Layer, ecl: QrCodeEcc) -> Mask {
    let mut best: Option<(i32, Mask)> = None;
    for mask in Mask::ALL {
        let mut trial = layer.clone();
        apply_mask(&mut trial, mask);
        draw_format_bits(&mut trial, ecl, mask);
        let penalty = penalty_score(trial.canvas());
        trace!(mask = mask.value(), penalty, "evaluated mask");
        if best.map_or(true, |(min, _)| penalty < min) {
            best = Some((penalty, mask));
        }
    }
    let (penalty, mask) = best.unwrap_or((0, Mask::new(0)));
    debug!(mask = mask.value(), penalty, "selected mask");
    mask
}

/// Applies the requested mask, or the best one when `mask` is `None`, exactly once to the
/// unmasked layer and draws the matching format bits. Returns the mask that was applied.
pub fn finish_masking(layer: &mut Layer, ecl: QrCodeEcc, mask: Option<Mask>) -> Mask {
    let mask = mask.unwrap_or_else(|| choose_mask(layer, ecl));
    apply_mask(layer, mask);
    draw_format_bits(layer, ecl, mask);
    mask
}

/// Calculates the penalty score of the given grid. Lower is better for scanners.
pub fn penalty_score(grid: &Grid) -> i32 {
    let size = grid.size();
    let mut result: i32 = 0;

    // Adjacent modules in rows, then columns, having the same color, and finder-like patterns
    for transpose in [false, true] {
        for a in 0..size {
            let module = |b: usize| if transpose { grid.get(a, b) } else { grid.get(b, a) };
            let mut runcolor = false;
            let mut runlen: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for b in 0..size {
                let color = module(b);
                if color == runcolor {
                    runlen += 1;
                    if runlen == 5 {
                        result += PENALTY_N1;
                    } else if runlen > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runlen);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = color;
                    runlen = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runlen) * PENALTY_N3;
        }
    }

    // 2*2 blocks of modules having the same color
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let color: bool = grid.get(x, y);
            if color == grid.get(x + 1, y)
                && color == grid.get(x, y + 1)
                && color == grid.get(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Balance of dark and light modules
    let dark = grid.count_dark() as i32;
    let total = (size * size) as i32;
    // Smallest k >= 0 such that (45-5k)% <= dark/total <= (55+5k)%
    let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
    result += k * PENALTY_N4;
    result
}

/// Sliding history of the last seven run lengths in a row or column, used to spot
/// 1:1:3:1:1 finder-like patterns.
struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: usize) -> Self {
        Self {
            qr_size: size as i32,
            run_history: [0; 7],
        }
    }

    /// Pushes the given run length to the front; the first run of a line is padded with a
    /// light border as wide as the symbol.
    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size;
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    /// Can only be called immediately after a light run is added. Returns 0, 1 or 2.
    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        debug_assert!(n <= self.qr_size * 3);
        let core = n > 0 && rh[2] == n && rh[3] == n * 3 && rh[4] == n && rh[5] == n;
        i32::from(core && rh[0] >= n * 4 && rh[6] >= n)
            + i32::from(core && rh[6] >= n * 4 && rh[0] >= n)
    }

    /// Must be called at the end of a line of modules.
    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        // Terminate a dark run
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        // Light border after the final run
        currentrunlength += self.qr_size;
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}
