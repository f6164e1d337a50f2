//! GS local-memory address translation.
//!
//! The GS stores textures in a page/block/column hierarchy whose layout
//! depends on the pixel storage mode. The permutation tables below encode
//! the hardware block and column ordering and must not be derived
//! algorithmically; they are taken verbatim from the GS layout.
//!
//! `write_*` functions place linear raster data into a GS memory image,
//! `read_*` functions pull linear raster data back out. A 4 bpp texture can
//! be unswizzled by writing its bytes as a PSMCT32 image of
//! (width / 2) x (height / 4) and reading it back as PSMT4 at full size.

use crate::{
	check_dimensions_4,
	check_dimensions_8,
	check_input_len,
	SwizzleError
};

/// Size of GS local memory: 4 MiB
pub const GS_MEM_SIZE: usize = 1024 * 1024 * 4;

static BLOCK32: [usize; 32] = [
	0, 1, 4, 5, 16, 17, 20, 21,
	2, 3, 6, 7, 18, 19, 22, 23,
	8, 9, 12, 13, 24, 25, 28, 29,
	10, 11, 14, 15, 26, 27, 30, 31
];

static COLUMN_WORD32: [usize; 16] = [
	0, 1, 4, 5, 8, 9, 12, 13,
	2, 3, 6, 7, 10, 11, 14, 15
];

static BLOCK4: [usize; 32] = [
	0, 2, 8, 10,
	1, 3, 9, 11,
	4, 6, 12, 14,
	5, 7, 13, 15,
	16, 18, 24, 26,
	17, 19, 25, 27,
	20, 22, 28, 30,
	21, 23, 29, 31
];

static COLUMN_WORD4: [[usize; 128]; 2] = [
	[
		0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13,
		2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15,

		8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5,
		10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7
	],
	[
		8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5,
		10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7,

		0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13,
		2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15
	]
];

static COLUMN_BYTE4: [usize; 128] = [
	0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2, 2, 4, 4, 4, 4, 4, 4, 4, 4, 6, 6, 6, 6, 6, 6, 6, 6,
	0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2, 2, 4, 4, 4, 4, 4, 4, 4, 4, 6, 6, 6, 6, 6, 6, 6, 6,

	1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 5, 5, 5, 5, 5, 5, 5, 5, 7, 7, 7, 7, 7, 7, 7, 7,
	1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 5, 5, 5, 5, 5, 5, 5, 5, 7, 7, 7, 7, 7, 7, 7, 7
];

static BLOCK8: [usize; 32] = [
	0, 1, 4, 5, 16, 17, 20, 21,
	2, 3, 6, 7, 18, 19, 22, 23,
	8, 9, 12, 13, 24, 25, 28, 29,
	10, 11, 14, 15, 26, 27, 30, 31
];

static COLUMN_WORD8: [[usize; 64]; 2] = [
	[
		0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13,
		2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15,

		8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5,
		10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7
	],
	[
		8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5,
		10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7,

		0, 1, 4, 5, 8, 9, 12, 13, 0, 1, 4, 5, 8, 9, 12, 13,
		2, 3, 6, 7, 10, 11, 14, 15, 2, 3, 6, 7, 10, 11, 14, 15
	]
];

static COLUMN_BYTE8: [usize; 64] = [
	0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2, 2,
	0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2, 2,

	1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3,
	1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3
];

/// Word address of the pixel at (x, y) in a PSMCT32 image with base block
/// pointer `dbp` and buffer width `dbw` (in units of 64 pixels)
fn word_address_32(dbp: usize, dbw: usize, x: usize, y: usize) -> usize {
	let page_x = x / 64;
	let page_y = y / 32;
	let page = page_x + page_y * dbw;

	let px = x - page_x * 64;
	let py = y - page_y * 32;

	let block_x = px / 8;
	let block_y = py / 8;
	let block = BLOCK32[block_x + block_y * 8];

	let bx = px - block_x * 8;
	let by = py - block_y * 8;

	let column = by / 2;
	let cw = COLUMN_WORD32[bx + (by - column * 2) * 8];

	dbp * 64 + page * 2048 + block * 64 + column * 16 + cw
}

/// Writes a linear RGBA raster into a fresh GS memory image as PSMCT32
pub fn write_psmct32(dbp: usize, dbw: usize, dsax: usize, dsay: usize, rrw: usize, rrh: usize, data: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	if rrw == 0 || rrh == 0 {
		return Err(SwizzleError::UnsupportedDimensions(rrw, rrh));
	}
	check_input_len(data, (dsay + rrh) * (dsax + rrw) * 4)?;

	let mut gsmem = vec![0; GS_MEM_SIZE];
	let mut src = 0;

	for y in 0..(dsay + rrh) {
		for x in 0..(dsax + rrw) {
			let pos = word_address_32(dbp, dbw, x, y) * 4;
			if pos + 4 > gsmem.len() {
				return Err(SwizzleError::BufferSize {
					need: pos + 4,
					have: gsmem.len(),
				});
			}

			gsmem[pos..pos + 4].copy_from_slice(&data[src..src + 4]);
			src += 4;
		}
	}

	Ok(gsmem)
}

/// Reads a linear RGBA raster back out of a PSMCT32 GS memory image
pub fn read_psmct32(dbp: usize, dbw: usize, dsax: usize, dsay: usize, rrw: usize, rrh: usize, gsmem: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	if rrw == 0 || rrh == 0 {
		return Err(SwizzleError::UnsupportedDimensions(rrw, rrh));
	}

	let mut data = vec![0; (dsay + rrh) * (dsax + rrw) * 4];
	let mut dst = 0;

	for y in 0..(dsay + rrh) {
		for x in 0..(dsax + rrw) {
			let pos = word_address_32(dbp, dbw, x, y) * 4;
			if pos + 4 > gsmem.len() {
				return Err(SwizzleError::BufferSize {
					need: pos + 4,
					have: gsmem.len(),
				});
			}

			data[dst..dst + 4].copy_from_slice(&gsmem[pos..pos + 4]);
			dst += 4;
		}
	}

	Ok(data)
}

/// Reads a linear 8 bpp raster out of a PSMT8 GS memory image.
/// `dbw` is given in units of 64 pixels, as the GS registers hold it.
pub fn read_psmt8(dbp: usize, dbw: usize, dsax: usize, dsay: usize, rrw: usize, rrh: usize, gsmem: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	check_dimensions_8(rrw, rrh)?;

	let dbw = dbw >> 1;
	let start_block_pos = dbp * 64;

	let mut data = vec![0; (dsay + rrh) * (dsax + rrw)];
	let mut dst = 0;

	for y in 0..(dsay + rrh) {
		for x in 0..(dsax + rrw) {
			let page_x = x / 128;
			let page_y = y / 64;
			let page = page_x + page_y * dbw;

			let px = x - page_x * 128;
			let py = y - page_y * 64;

			let block_x = px / 16;
			let block_y = py / 16;
			let block = BLOCK8[block_x + block_y * 8];

			let bx = px - block_x * 16;
			let by = py - block_y * 16;

			let column = by / 4;
			let cx = bx;
			let cy = by - column * 4;
			let cw = COLUMN_WORD8[column & 1][cx + cy * 16];
			let cb = COLUMN_BYTE8[cx + cy * 16];

			let pos = (start_block_pos + page * 2048 + block * 64 + column * 16 + cw) * 4 + cb;
			if pos >= gsmem.len() {
				return Err(SwizzleError::BufferSize {
					need: pos + 1,
					have: gsmem.len(),
				});
			}

			data[dst] = gsmem[pos];
			dst += 1;
		}
	}

	Ok(data)
}

/// Reads a linear nibble-packed 4 bpp raster out of a PSMT4 GS memory image.
///
/// Two adjacent output pixels can come from nibbles of different GS bytes,
/// so the output pixel parity is tracked across the whole scan.
pub fn read_psmt4(dbp: usize, dbw: usize, dsax: usize, dsay: usize, rrw: usize, rrh: usize, gsmem: &[u8]) -> Result<Vec<u8>, SwizzleError> {
	check_dimensions_4(rrw, rrh)?;

	let dbw = dbw >> 1;
	let start_block_pos = dbp * 64;

	let total = (dsay + rrh) * (dsax + rrw);
	let mut data = vec![0; (total + 1) / 2];
	let mut dst = 0;
	let mut odd = false;

	for y in 0..(dsay + rrh) {
		for x in 0..(dsax + rrw) {
			let page_x = x / 128;
			let page_y = y / 128;
			let page = page_x + page_y * dbw;

			let px = x - page_x * 128;
			let py = y - page_y * 128;

			let block_x = px / 32;
			let block_y = py / 16;
			let block = BLOCK4[block_x + block_y * 4];

			let bx = px - block_x * 32;
			let by = py - block_y * 16;

			let column = by / 4;
			let cx = bx;
			let cy = by - column * 4;
			let cw = COLUMN_WORD4[column & 1][cx + cy * 32];
			let cb = COLUMN_BYTE4[cx + cy * 32];

			let pos = (start_block_pos + page * 2048 + block * 64 + column * 16 + cw) * 4 + (cb >> 1);
			if pos >= gsmem.len() {
				return Err(SwizzleError::BufferSize {
					need: pos + 1,
					have: gsmem.len(),
				});
			}

			let pix = gsmem[pos];
			let pen = if cb & 1 == 1 {
				(pix >> 4) & 0xF
			} else {
				pix & 0xF
			};

			if odd {
				data[dst] = data[dst] & 0xF | (pen << 4) & 0xF0;
				dst += 1;
			} else {
				data[dst] = data[dst] & 0xF0 | pen;
			}

			odd = !odd;
		}
	}

	Ok(data)
}
