//! Single-pass swizzle schemes for textures stored without the full GS
//! page decomposition.
//!
//! The 8 bpp transform handles any width that is a multiple of 16 and any
//! height that is a multiple of 4; the page-aware 4 bpp transform handles
//! widths of 32/64/96 or multiples of 128 and heights that are multiples of
//! 16 below 128 or multiples of 128 above.

use crate::{
	check_dimensions_4,
	check_dimensions_8,
	check_input_len,
	SwizzleError
};

/// Byte offset of the texel at (x, y) inside a single-pass swizzled 8 bpp
/// buffer.
fn swizzled_offset_8(x: usize, y: usize, width: usize) -> usize {
	let block_location = (y & !0xF) * width + (x & !0xF) * 2;
	let swap_selector = (((y + 2) >> 2) & 1) * 4;
	let pos_y = (((y & !3) >> 1) + (y & 1)) & 7;
	let column_location = pos_y * width * 2 + ((x + swap_selector) & 7) * 4;
	let byte_num = ((y >> 1) & 1) + ((x >> 2) & 2);

	block_location + column_location + byte_num
}

/// Converts swizzled 8 bpp pixel data to linear row-major order
pub fn unswizzle8(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SwizzleError> {
	check_dimensions_8(width, height)?;
	check_input_len(data, width * height)?;

	let mut out = vec![0; width * height];

	for y in 0..height {
		for x in 0..width {
			out[y * width + x] = data[swizzled_offset_8(x, y, width)];
		}
	}

	Ok(out)
}

/// Converts linear 8 bpp pixel data back to the swizzled layout.
/// This is the forward path used for same-size texture replacement.
pub fn swizzle8(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SwizzleError> {
	check_dimensions_8(width, height)?;
	check_input_len(data, width * height)?;

	let mut out = vec![0; width * height];

	for y in 0..height {
		for x in 0..width {
			out[swizzled_offset_8(x, y, width)] = data[y * width + x];
		}
	}

	Ok(out)
}

/// Expands nibble-packed 4 bpp data into one index value per byte,
/// low nibble first
pub fn unpack_nibbles(data: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(data.len() * 2);

	for byte in data.iter() {
		out.push(byte & 0xF);
		out.push((byte >> 4) & 0xF);
	}

	out
}

/// Packs pairs of index values back into nibble-packed 4 bpp bytes,
/// low nibble first
pub fn pack_nibbles(values: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(values.len() / 2);

	for pair in values.chunks_exact(2) {
		out.push((pair[1] << 4 | (pair[0] & 0xF)) & 0xFF);
	}

	out
}

/// Converts swizzled 4 bpp pixel data to linear order, one index per byte
pub fn unswizzle4_to_8(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SwizzleError> {
	check_input_len(data, width * height / 2)?;

	unswizzle8(&unpack_nibbles(&data[..width * height / 2]), width, height)
}

/// Converts swizzled 4 bpp pixel data to linear nibble-packed order
pub fn unswizzle4(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SwizzleError> {
	Ok(pack_nibbles(&unswizzle4_to_8(data, width, height)?))
}

/// Converts page-aware swizzled 4 bpp pixel data to linear nibble-packed
/// order without going through GS memory
pub fn unswizzle4bpp(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, SwizzleError> {
	check_dimensions_4(width, height)?;
	check_input_len(data, width * height / 2)?;

	let pages_horz = (width + 127) / 128;
	let pages_vert = (height + 127) / 128;

	let mut out = vec![0; width * height / 2];

	for y in 0..height {
		for x in 0..width {
			let index = y * width + x;

			let page_x = x & !0x7F;
			let page_y = y & !0x7F;
			let page_number = (page_y / 128) * pages_horz + page_x / 128;
			let page32_y = (page_number / pages_vert) * 32;
			let page32_x = (page_number % pages_vert) * 64;
			let page_location = page32_y * height * 2 + page32_x * 4;

			let loc_x = x & 0x7F;
			let loc_y = y & 0x7F;

			let block_location = ((loc_x & !0x1F) >> 1) * height + (loc_y & !0xF) * 2;
			let swap_selector = (((y + 2) >> 2) & 1) * 4;
			let pos_y = (((y & !3) >> 1) + (y & 1)) & 7;
			let column_location = pos_y * height * 2 + ((x + swap_selector) & 7) * 4;

			let byte_num = (x >> 3) & 3;
			let bits_set = (y >> 1) & 1;

			let pos = page_location + block_location + column_location + byte_num;
			let pen = if bits_set & 1 == 1 {
				(data[pos] >> 4) & 0xF
			} else {
				data[pos] & 0xF
			};

			let packed = out[index >> 1];
			out[index >> 1] = if index & 1 == 1 {
				(pen << 4) & 0xF0 | packed & 0xF
			} else {
				packed & 0xF0 | pen & 0xF
			};
		}
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ramp(len: usize) -> Vec<u8> {
		(0..len).map(|i| (i % 251) as u8).collect()
	}

	#[test]
	fn test_swizzle8_round_trip() {
		let linear = ramp(16 * 16);
		let swizzled = swizzle8(&linear, 16, 16).unwrap();
		assert_ne!(swizzled, linear);
		assert_eq!(unswizzle8(&swizzled, 16, 16).unwrap(), linear);

		let linear = ramp(64 * 32);
		let swizzled = swizzle8(&linear, 64, 32).unwrap();
		assert_eq!(unswizzle8(&swizzled, 64, 32).unwrap(), linear);
	}

	#[test]
	fn test_swizzle8_is_a_permutation() {
		// Every source byte must land somewhere: a constant buffer is a
		// fixed point of both directions.
		let flat = vec![0x5A; 32 * 16];
		assert_eq!(swizzle8(&flat, 32, 16).unwrap(), flat);
		assert_eq!(unswizzle8(&flat, 32, 16).unwrap(), flat);
	}

	#[test]
	fn test_unswizzle8_rejects_bad_dimensions() {
		assert_eq!(unswizzle8(&[0; 100], 10, 10), Err(SwizzleError::UnsupportedDimensions(10, 10)));
		assert_eq!(unswizzle8(&[], 0, 0), Err(SwizzleError::UnsupportedDimensions(0, 0)));
	}

	#[test]
	fn test_unswizzle8_rejects_short_buffer() {
		assert_eq!(
			unswizzle8(&[0; 100], 16, 16),
			Err(SwizzleError::BufferSize { need: 256, have: 100 })
		);
	}

	#[test]
	fn test_nibble_round_trip() {
		let packed = vec![0x21, 0x43, 0xF0];
		let unpacked = unpack_nibbles(&packed);
		assert_eq!(unpacked, vec![1, 2, 3, 4, 0, 0xF]);
		assert_eq!(pack_nibbles(&unpacked), packed);
	}

	#[test]
	fn test_unswizzle4_matches_expanded_path() {
		let packed: Vec<u8> = (0..32 * 16 / 2).map(|i| (i * 7 % 256) as u8).collect();
		let expanded = unswizzle4_to_8(&packed, 32, 16).unwrap();
		let repacked = unswizzle4(&packed, 32, 16).unwrap();
		assert_eq!(unpack_nibbles(&repacked), expanded);
	}

	#[test]
	fn test_unswizzle4bpp_rejects_bad_dimensions() {
		assert_eq!(
			unswizzle4bpp(&[0; 1024], 48, 16),
			Err(SwizzleError::UnsupportedDimensions(48, 16))
		);
	}
}
