//! Palette sub-record framing and application.
//!
//! The palette payload is stored in 256-byte chunks of which only a leading
//! run is meaningful; the split between data and padding is not declared
//! anywhere in the format and has to be recovered from the chunk contents.

use byteorder::{
	LE,
	ReadBytesExt
};

use sh3x_core::texture::Color;
use sh3x_textures_ps2::clut;

use crate::RecordError;

/// Size of the palette sub-record header
pub const PALETTE_HEADER_SIZE: usize = 0x30;

/// Chunk granularity of the palette payload
pub const CHUNK_SIZE: usize = 256;

/// Short chunk used when less than a full chunk remains
pub const TAIL_CHUNK_SIZE: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaletteHeader {
	pub header_offset: usize,
	pub data_size: u32,
	pub bypp: u8,
	pub entry_size: u8,
}

impl PaletteHeader {
	pub fn read(data: &[u8], offset: usize) -> Result<PaletteHeader, RecordError> {
		let raw = data.get(offset..offset + PALETTE_HEADER_SIZE)
			.ok_or(RecordError::Truncated { offset: offset })?;

		let mut buf = &raw[..];
		let data_size = buf.read_u32::<LE>()?;

		Ok(PaletteHeader {
			header_offset: offset,
			data_size: data_size,
			bypp: raw[12],
			entry_size: raw[14],
		})
	}

	/// Offset of the first palette payload byte
	pub fn payload_start(&self) -> usize {
		self.header_offset + PALETTE_HEADER_SIZE
	}
}

/// A recovered data/padding split for one palette chunk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaddingPattern {
	pub data_len: usize,
	pub padding_len: usize,
}

impl PaddingPattern {
	pub const fn new(data_len: usize, padding_len: usize) -> PaddingPattern {
		PaddingPattern {
			data_len: data_len,
			padding_len: padding_len,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Classification {
	Known(PaddingPattern),
	Unclassified,
}

/// Classifies one palette chunk by counting candidate alpha bytes (stride 4,
/// offset 3) equal to 0x80. Odd counts and near-miss counts that coincide
/// with a run of four zero bytes are ambiguous and left to the caller.
pub fn classify_chunk(chunk: &[u8]) -> Classification {
	let count = chunk.iter().skip(3).step_by(4).filter(|&&b| b == 0x80).count();
	let has_zero_run = chunk.windows(4).any(|w| w == [0, 0, 0, 0]);

	match count {
		16 => Classification::Known(PaddingPattern::new(64, 192)),
		48 => Classification::Known(PaddingPattern::new(192, 64)),
		8 => Classification::Known(PaddingPattern::new(32, 32)),
		32 => Classification::Known(PaddingPattern::new(128, 128)),
		30 | 31 if has_zero_run => Classification::Known(PaddingPattern::new(128, 128)),
		n if n % 2 == 1 && has_zero_run => Classification::Unclassified,
		38 => Classification::Known(PaddingPattern::new(160, 96)),
		_ => Classification::Unclassified,
	}
}

/// Strips interleaved padding from a raw palette payload, concatenating the
/// data portions in their original order.
///
/// `fallback` supplies the split for chunks the heuristic cannot classify;
/// without one such a chunk fails the record.
pub fn remove_padding(data: &[u8], fallback: Option<PaddingPattern>) -> Result<Vec<u8>, RecordError> {
	let mut out = vec![];
	let mut index = 0;

	while index < data.len() {
		let chunk_size = if index + CHUNK_SIZE <= data.len() {
			CHUNK_SIZE
		} else {
			TAIL_CHUNK_SIZE
		};
		let chunk = &data[index..data.len().min(index + chunk_size)];

		let pattern = match classify_chunk(chunk) {
			Classification::Known(pattern) => pattern,
			Classification::Unclassified => {
				fallback.ok_or(RecordError::UnclassifiedPadding { offset: index })?
			},
		};

		if pattern.data_len + pattern.padding_len == 0 {
			return Err(RecordError::UnclassifiedPadding { offset: index });
		}

		let data_len = pattern.data_len.min(data.len() - index);
		out.extend_from_slice(&data[index..index + data_len]);
		index += pattern.data_len + pattern.padding_len;
	}

	Ok(out)
}

/// Exchanges the two middle 8-entry runs of every 32-entry group, starting
/// at entry 8. The hardware rationale is undocumented; the ordering is
/// preserved exactly as observed.
pub fn sub_block_swap(palette: &mut [Color]) {
	const SWAP_DISTANCE: usize = 32;
	const SWAP_SIZE: usize = 8;

	let mut i = SWAP_SIZE;
	while i + SWAP_DISTANCE < palette.len() {
		if i + 2 * SWAP_SIZE > palette.len() {
			break;
		}

		for k in 0..SWAP_SIZE {
			palette.swap(i + k, i + SWAP_SIZE + k);
		}

		i += SWAP_DISTANCE;
	}
}

/// Decodes stripped palette bytes into display order.
///
/// `entry_size` is the meaningful byte count per storage chunk and `bypp`
/// the per-color byte stride; both come from the palette header.
pub fn decode_palette(stripped: &[u8], entry_size: u8, bypp: u8, offset: usize) -> Result<Vec<Color>, RecordError> {
	if entry_size == 0 || bypp == 0 || entry_size % bypp != 0 {
		return Err(RecordError::BadPaletteHeader { offset: offset });
	}

	let mut colors = clut::decode_colors(stripped);
	sub_block_swap(&mut colors);

	Ok(colors)
}

/// Looks every index up in a flat palette, producing RGBA bytes.
/// Out-of-range indices wrap around the palette length.
pub fn apply_palette(indices: &[u8], palette: &[Color]) -> Vec<u8> {
	let mut rgba = Vec::with_capacity(indices.len() * 4);

	for index in indices.iter() {
		let color = palette[(*index as usize) % palette.len()];
		rgba.extend_from_slice(&color.to_bytes());
	}

	rgba
}

/// Looks indices up through a multi-bank palette: banks hold `num_palettes`
/// colors each and the bank is selected per output column.
pub fn apply_palette_banked(indices: &[u8], width: usize, height: usize, palette: &[Color], num_palettes: usize, offset: usize) -> Result<Vec<u8>, RecordError> {
	if num_palettes == 0 || palette.len() % num_palettes != 0 {
		return Err(RecordError::BadPaletteHeader { offset: offset });
	}

	let bank_count = palette.len() / num_palettes;
	let mut rgba = Vec::with_capacity(width * height * 4);

	for y in 0..height {
		for x in 0..width {
			let index = indices[y * width + x] as usize;
			let bank = (x / num_palettes) % bank_count;
			let color = palette[bank * num_palettes + index % num_palettes];
			rgba.extend_from_slice(&color.to_bytes());
		}
	}

	Ok(rgba)
}

#[cfg(test)]
mod tests {
	use super::*;

	/// 256-byte chunk with `data_len` meaningful bytes whose alpha slots
	/// hold 0x80, padded with zeroes.
	fn chunk(data_len: usize) -> Vec<u8> {
		let mut out = vec![0; CHUNK_SIZE];
		for i in 0..data_len {
			out[i] = if i % 4 == 3 { 0x80 } else { (i % 64) as u8 + 1 };
		}
		out
	}

	#[test]
	fn test_classify_known_counts() {
		assert_eq!(classify_chunk(&chunk(64)), Classification::Known(PaddingPattern::new(64, 192)));
		assert_eq!(classify_chunk(&chunk(192)), Classification::Known(PaddingPattern::new(192, 64)));
		assert_eq!(classify_chunk(&chunk(32)), Classification::Known(PaddingPattern::new(32, 32)));
		assert_eq!(classify_chunk(&chunk(128)), Classification::Known(PaddingPattern::new(128, 128)));

		// The 160-byte layout was only ever observed with 38 opaque
		// entries out of 40.
		let mut c = chunk(160);
		c[3] = 0x70;
		c[7] = 0x70;
		assert_eq!(classify_chunk(&c), Classification::Known(PaddingPattern::new(160, 96)));
	}

	#[test]
	fn test_classify_near_miss_with_alignment() {
		// 30 alpha slots set plus a zero run elsewhere in the chunk.
		let mut c = chunk(120);
		assert!(c.windows(4).any(|w| w == [0, 0, 0, 0]));
		assert_eq!(classify_chunk(&c), Classification::Known(PaddingPattern::new(128, 128)));

		// An odd count with a zero run is ambiguous.
		c[3] = 0;
		assert_eq!(classify_chunk(&c), Classification::Unclassified);
	}

	#[test]
	fn test_classify_unknown_count() {
		assert_eq!(classify_chunk(&chunk(40)), Classification::Unclassified);
	}

	#[test]
	fn test_remove_padding_two_chunks() {
		let mut payload = chunk(64);
		payload.extend_from_slice(&chunk(64));
		assert_eq!(payload.len(), 512);

		let stripped = remove_padding(&payload, None).unwrap();
		assert_eq!(stripped.len(), 128);
		assert_eq!(&stripped[..64], &payload[..64]);
		assert_eq!(&stripped[64..], &payload[256..320]);
	}

	#[test]
	fn test_remove_padding_requires_fallback() {
		let payload = chunk(40);
		assert!(matches!(
			remove_padding(&payload, None),
			Err(RecordError::UnclassifiedPadding { offset: 0 })
		));

		let stripped = remove_padding(&payload, Some(PaddingPattern::new(40, 216))).unwrap();
		assert_eq!(stripped.len(), 40);
	}

	#[test]
	fn test_sub_block_swap() {
		let mut palette: Vec<Color> = (0..64)
			.map(|i| Color::from_rgba_bytes([i as u8, 0, 0, 0x80]))
			.collect();
		sub_block_swap(&mut palette);

		// Only the runs at 8..16 and 16..24 moved.
		assert_eq!(palette[0].red, 0);
		assert_eq!(palette[8].red, 16);
		assert_eq!(palette[16].red, 8);
		assert_eq!(palette[24].red, 24);
		assert_eq!(palette[40].red, 40);
		assert_eq!(palette[63].red, 63);
	}

	#[test]
	fn test_sub_block_swap_short_palette() {
		// 32 entries leave no full swap partner; nothing moves.
		let mut palette: Vec<Color> = (0..32)
			.map(|i| Color::from_rgba_bytes([i as u8, 0, 0, 0x80]))
			.collect();
		let original = palette.clone();
		sub_block_swap(&mut palette);
		assert_eq!(palette, original);
	}

	#[test]
	fn test_apply_palette_wraps_indices() {
		let palette = vec![
			Color::from_rgba_bytes([10, 0, 0, 0x80]),
			Color::from_rgba_bytes([20, 0, 0, 0x80]),
		];
		let rgba = apply_palette(&[0, 1, 2], &palette);
		assert_eq!(rgba[0], 10);
		assert_eq!(rgba[4], 20);
		assert_eq!(rgba[8], 10);
	}

	#[test]
	fn test_apply_palette_banked() {
		// Two banks of two colors; columns 0..2 use bank 0, 2..4 bank 1.
		let palette = vec![
			Color::from_rgba_bytes([1, 0, 0, 0x80]),
			Color::from_rgba_bytes([2, 0, 0, 0x80]),
			Color::from_rgba_bytes([3, 0, 0, 0x80]),
			Color::from_rgba_bytes([4, 0, 0, 0x80]),
		];
		let indices = [0, 1, 0, 1];
		let rgba = apply_palette_banked(&indices, 4, 1, &palette, 2, 0).unwrap();
		assert_eq!([rgba[0], rgba[4], rgba[8], rgba[12]], [1, 2, 3, 4]);

		assert!(matches!(
			apply_palette_banked(&indices, 4, 1, &palette, 3, 0),
			Err(RecordError::BadPaletteHeader { offset: 0 })
		));
	}

	#[test]
	fn test_decode_palette_guards() {
		assert!(matches!(
			decode_palette(&[0; 64], 0, 4, 7),
			Err(RecordError::BadPaletteHeader { offset: 7 })
		));
		assert!(matches!(
			decode_palette(&[0; 64], 64, 3, 0),
			Err(RecordError::BadPaletteHeader { offset: 0 })
		));

		let colors = decode_palette(&[1, 2, 3, 0x80], 64, 4, 0).unwrap();
		assert_eq!(colors.len(), 1);
	}
}
