//! CLUT (palette) reordering.
//!
//! The GS stores 256-color CLUTs with the two middle 8-color runs of every
//! 32-color group exchanged (CSM1 storage). Both routines here are pure
//! permutations of the entry positions; no color data is lost.

use sh3x_core::texture::Color;

use crate::SwizzleError;

/// Byte length of a full 256-entry 32 bpp palette
pub const PALETTE32_SIZE: usize = 1024;

fn csm1_position(p: usize) -> usize {
	(p & 231) + ((p & 8) << 1) + ((p & 16) >> 1)
}

/// Reorders a flat 256-entry 32 bpp palette out of CSM1 storage order.
/// The permutation swaps bits 3 and 4 of the entry index, so it is its own
/// inverse.
pub fn unswizzle_palette(pal: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	if pal.len() < PALETTE32_SIZE {
		return Err(SwizzleError::BufferSize {
			need: PALETTE32_SIZE,
			have: pal.len(),
		});
	}

	let mut out = vec![0; PALETTE32_SIZE];

	for p in 0..256 {
		let pos = csm1_position(p);
		out[pos * 4..pos * 4 + 4].copy_from_slice(&pal[p * 4..p * 4 + 4]);
	}

	Ok(out)
}

/// Reorders a flat 256-entry 32 bpp palette into CSM1 storage order
pub fn swizzle_palette(pal: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	if pal.len() < PALETTE32_SIZE {
		return Err(SwizzleError::BufferSize {
			need: PALETTE32_SIZE,
			have: pal.len(),
		});
	}

	let mut out = vec![0; PALETTE32_SIZE];

	for p in 0..256 {
		let pos = csm1_position(p);
		out[p * 4..p * 4 + 4].copy_from_slice(&pal[pos * 4..pos * 4 + 4]);
	}

	Ok(out)
}

/// Rearranges a 16x16 CLUT stored as a sequence of 8x2 tiles into row-major
/// order. Supports 32 bpp and 16 bpp entries.
pub fn unswizzle_clut(clut: &[u8], bits_per_pixel: u8) -> Result<Vec<u8>, SwizzleError> {
	let bytes_per_pixel = match bits_per_pixel {
		32 => 4,
		16 => 2,
		other => return Err(SwizzleError::UnsupportedDepth(other)),
	};

	let width = 16;
	let height = 16;
	let tile_w = 8;
	let tile_h = 2;
	let tile_line_size = tile_w * bytes_per_pixel;

	if clut.len() < width * height * bytes_per_pixel {
		return Err(SwizzleError::BufferSize {
			need: width * height * bytes_per_pixel,
			have: clut.len(),
		});
	}

	let mut out = vec![0; width * height * bytes_per_pixel];
	let mut offset = 0;

	for y in 0..(height / tile_h) {
		for x in 0..(width / tile_w) {
			for ty in 0..tile_h {
				let cur_height = y * tile_h + ty;
				let cur_width = x * tile_w;
				let dst = (cur_height * width + cur_width) * bytes_per_pixel;
				out[dst..dst + tile_line_size].copy_from_slice(&clut[offset..offset + tile_line_size]);
				offset += tile_line_size;
			}
		}
	}

	Ok(out)
}

/// Decodes raw RGBA palette bytes into colors, rescaling the 7 bit alpha.
/// Trailing bytes that do not form a whole entry are dropped.
pub fn decode_colors(data: &[u8]) -> Vec<Color> {
	data.chunks_exact(4)
		.map(|e| Color::from_rgba_bytes([e[0], e[1], e[2], e[3]]))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index_palette() -> Vec<u8> {
		let mut pal = vec![0; PALETTE32_SIZE];
		for p in 0..256 {
			pal[p * 4] = p as u8;
		}
		pal
	}

	#[test]
	fn test_palette_permutation_is_bijective() {
		let pal = index_palette();
		let once = unswizzle_palette(&pal).unwrap();
		assert_ne!(once, pal);

		// Swapping index bits 3 and 4 twice restores the original order.
		let twice = unswizzle_palette(&once).unwrap();
		assert_eq!(twice, pal);

		// The explicit inverse agrees.
		assert_eq!(swizzle_palette(&once).unwrap(), pal);
	}

	#[test]
	fn test_palette_swaps_middle_runs() {
		let pal = index_palette();
		let out = unswizzle_palette(&pal).unwrap();

		// Entries 0..8 stay put, 8..16 and 16..24 change places.
		assert_eq!(out[0 * 4], 0);
		assert_eq!(out[7 * 4], 7);
		assert_eq!(out[16 * 4], 8);
		assert_eq!(out[8 * 4], 16);
		assert_eq!(out[24 * 4], 24);
	}

	#[test]
	fn test_unswizzle_clut_tile_order() {
		// 32 bpp CLUT whose entries carry their source index.
		let mut clut = vec![0; 1024];
		for i in 0..256 {
			clut[i * 4] = i as u8;
		}
		let out = unswizzle_clut(&clut, 32).unwrap();

		// First tile line lands at row 0, the second at row 1.
		assert_eq!(out[0], 0);
		assert_eq!(out[16 * 4], 8);
		// Second tile starts at row 0, column 8.
		assert_eq!(out[8 * 4], 16);

		assert!(matches!(unswizzle_clut(&clut, 8), Err(SwizzleError::UnsupportedDepth(8))));
	}

	#[test]
	fn test_decode_colors() {
		let colors = decode_colors(&[1, 2, 3, 0x80, 4, 5, 6, 0x20, 0xFF]);
		assert_eq!(colors.len(), 2);
		assert_eq!(colors[0].alpha, 255);
		assert_eq!(colors[1].alpha, 0x40);
		assert_eq!(colors[1].red, 4);
	}
}
