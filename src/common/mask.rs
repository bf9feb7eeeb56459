use std::ops::Deref;

use itertools::Itertools;
use log::trace;

use super::metadata::Color;
use crate::builder::QRCode;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub const fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i16, i16) -> bool {
        match self.0 {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid pattern"),
        }
    }
}

// Mask evaluation
//------------------------------------------------------------------------------

pub fn apply_best_mask(qr: &mut QRCode) -> MaskPattern {
    // min_by_key keeps the first minimum, so ties go to the lowest pattern
    let best = (0..8)
        .min_by_key(|&m| {
            let mut candidate = qr.clone();
            candidate.apply_mask(MaskPattern::new(m));
            let penalty = compute_total_penalty(&candidate);
            trace!("Mask {m}: penalty {penalty}");
            penalty
        })
        .expect("Should return atleast 1 mask");
    let best = MaskPattern::new(best);
    qr.apply_mask(best);
    best
}

pub fn compute_total_penalty(qr: &QRCode) -> u32 {
    compute_run_penalty(qr)
        + compute_block_penalty(qr)
        + compute_finder_pattern_penalty(qr)
        + compute_balance_penalty(qr)
}

// Rule 1: every same-colored run of n >= 5 modules scores 3 + (n - 5)
fn compute_run_penalty(qr: &QRCode) -> u32 {
    let w = qr.width() as i16;
    let mut pen = 0;
    for i in 0..w {
        pen += line_run_penalty((0..w).map(|j| *qr.get(i, j)));
        pen += line_run_penalty((0..w).map(|j| *qr.get(j, i)));
    }
    pen
}

fn line_run_penalty(line: impl Iterator<Item = Color>) -> u32 {
    line.dedup_with_count().filter(|&(n, _)| n >= 5).map(|(n, _)| n as u32 - 2).sum()
}

// Rule 2: every uniformly colored 2x2 block scores 3, scanning all starts
fn compute_block_penalty(qr: &QRCode) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// Rule 3: 40 per finder-like sequence, in either direction, in any line
fn compute_finder_pattern_penalty(qr: &QRCode) -> u32 {
    static PATTERN: [Color; 11] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Light,
        Color::Light,
        Color::Light,
        Color::Light,
    ];
    let w = qr.width() as i16;
    let mut pen = 0;
    for i in 0..w {
        let row = (0..w).map(|j| *qr.get(i, j)).collect::<Vec<_>>();
        let col = (0..w).map(|j| *qr.get(j, i)).collect::<Vec<_>>();
        for line in [row, col] {
            for window in line.windows(11) {
                if *window == PATTERN {
                    pen += 40;
                }
                if window.iter().rev().eq(PATTERN.iter()) {
                    pen += 40;
                }
            }
        }
    }
    pen
}

// Rule 4: 10 points per 5% deviation of the dark module share from 50%.
// The ratio is kept exact and floored only once at the end.
fn compute_balance_penalty(qr: &QRCode) -> u32 {
    let total = qr.width() * qr.width();
    let dark = qr.count_dark_modules();
    ((dark * 100).abs_diff(50 * total) / (5 * total) * 10) as u32
}
