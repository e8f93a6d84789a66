// SPDX-License-Identifier: GPL-3.0-only

//! Ocean palette
//!
//! 256-entry lookup table going from black through deep blue and cyan to
//! white. Blue rises over the whole range, green over the upper two thirds
//! and red over the upper third, the same shape as the classic "ocean" map.

/// Ocean palette in RGB order, indexed by 8-bit intensity
pub static OCEAN: [[u8; 3]; 256] = build_ocean();

const fn build_ocean() -> [[u8; 3]; 256] {
    let mut table = [[0u8; 3]; 256];
    let mut i = 0usize;
    while i < 256 {
        let r = if i > 170 { (i - 170) * 3 } else { 0 };
        let g = if i > 85 { (i - 85) * 3 / 2 } else { 0 };
        table[i] = [r as u8, g as u8, i as u8];
        i += 1;
    }
    table
}

/// Palette color for an intensity
#[inline]
pub fn ocean(intensity: u8) -> [u8; 3] {
    OCEAN[intensity as usize]
}
