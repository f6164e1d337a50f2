//! Signature-driven texture discovery for Silent Hill 3 packed data files.
//!
//! The packed files carry no directory: texture records are found by
//! scanning for their header signature, decoded, unswizzled out of the GS
//! tiled layout and paired with their recovered palette. A malformed record
//! is reported and skipped; it never aborts the scan of later records.

pub mod header;
pub mod palette;
pub mod scan;

use log::{
	info,
	warn
};

use std::io;
use thiserror::Error;

use sh3x_core::texture::{
	convert_bgra_to_rgba,
	Color,
	Texture
};

use sh3x_textures_ps2::{
	unswizzle,
	SwizzleError
};

use header::{
	MasterHeader,
	TextureHeader,
	PREFIX_SIZE
};

use palette::{
	PaddingPattern,
	PaletteHeader
};

#[derive(Debug, Error)]
pub enum RecordError {
	#[error("Palette header at {offset:#x} declares an unusable entry layout")]
	BadPaletteHeader {
		offset: usize,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error(transparent)]
	Swizzle(#[from] SwizzleError),
	#[error("Record at {offset:#x} extends past the end of the buffer")]
	Truncated {
		offset: usize,
	},
	#[error("Palette padding at {offset:#x} matches no known pattern")]
	UnclassifiedPadding {
		offset: usize,
	},
	#[error("Unsupported bit depth: {0}")]
	UnsupportedDepth(u8),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScanOptions {
	/// Data/padding split to use for palette chunks the classification
	/// heuristic cannot resolve. Without one, such records are skipped.
	pub padding_fallback: Option<PaddingPattern>,
}

/// A record that could not be decoded, with the reason it was skipped
#[derive(Debug)]
pub struct Skipped {
	pub offset: usize,
	pub reason: RecordError,
}

#[derive(Debug, Default)]
pub struct ScanReport {
	pub textures: Vec<DecodedTexture>,
	pub skipped: Vec<Skipped>,
}

/// A fully decoded texture: linear pixels plus the recovered palette.
///
/// For 4 and 8 bpp records `pixels` holds one palette index per byte; for
/// 32 bpp records it holds RGBA bytes and `palette` is `None`.
#[derive(Clone, Debug)]
pub struct DecodedTexture {
	pub header: TextureHeader,
	pub pixels: Vec<u8>,
	pub palette: Option<Vec<Color>>,
}

impl DecodedTexture {
	/// Flattens the texture into linear RGBA bytes
	pub fn rgba(&self) -> Vec<u8> {
		match self.palette {
			Some(ref palette) if !palette.is_empty() => palette::apply_palette(&self.pixels, palette),
			_ => self.pixels.clone(),
		}
	}

	/// Builds an indexed [`Texture`] view, if this record carries a palette
	pub fn to_texture(&self) -> Option<Texture> {
		let palette = self.palette.as_ref()?;

		let mut texture = Texture::new(self.header.width as usize, self.header.height as usize);
		texture.palette = palette.clone();
		texture.indices = self.pixels.iter().map(|i| *i as usize).collect();

		Some(texture)
	}
}

/// Scans a packed buffer for standalone texture records
pub fn scan(data: &[u8], options: &ScanOptions) -> ScanReport {
	let mut report = ScanReport::default();

	for offset in scan::Signatures::new(data, &scan::TEXTURE_HEADER_PATTERN) {
		match decode_record(data, offset, options) {
			Ok(texture) => report.textures.push(texture),
			Err(reason) => {
				warn!("skipping record at {:#x}: {}", offset, reason);
				report.skipped.push(Skipped {
					offset: offset,
					reason: reason,
				});
			},
		}
	}

	info!("scan finished: {} textures decoded, {} skipped", report.textures.len(), report.skipped.len());
	report
}

/// Scans a packed buffer for master records and decodes the texture runs
/// they announce. Master textures carry no palette sub-record.
pub fn scan_master(data: &[u8], _options: &ScanOptions) -> ScanReport {
	let mut report = ScanReport::default();

	for offset in scan::Signatures::new(data, &scan::MASTER_HEADER_PATTERN) {
		let master = match MasterHeader::read(data, offset) {
			Ok(master) => master,
			Err(reason) => {
				warn!("skipping master record at {:#x}: {}", offset, reason);
				report.skipped.push(Skipped {
					offset: offset,
					reason: reason,
				});
				continue;
			},
		};

		let mut cursor = offset + PREFIX_SIZE;

		for _ in 0..master.num_textures {
			match decode_master_entry(data, cursor) {
				Ok((texture, next)) => {
					cursor = next;
					report.textures.push(texture);
				},
				Err(reason) => {
					// The run is sequential; a bad entry orphans the rest.
					warn!("skipping master entry at {:#x}: {}", cursor, reason);
					report.skipped.push(Skipped {
						offset: cursor,
						reason: reason,
					});
					break;
				},
			}
		}
	}

	info!("master scan finished: {} textures decoded, {} skipped", report.textures.len(), report.skipped.len());
	report
}

fn pixel_data<'a>(data: &'a [u8], header: &TextureHeader) -> Result<&'a [u8], RecordError> {
	let start = header.data_start();
	let end = start.checked_add(header.data_size as usize)
		.filter(|end| *end <= data.len())
		.ok_or(RecordError::Truncated { offset: header.header_offset })?;

	Ok(&data[start..end])
}

fn decode_record(data: &[u8], offset: usize, options: &ScanOptions) -> Result<DecodedTexture, RecordError> {
	let header = TextureHeader::read(data, offset)?;
	let texels = pixel_data(data, &header)?;

	match header.bpp {
		32 => Ok(DecodedTexture {
			header: header,
			pixels: convert_bgra_to_rgba(texels),
			palette: None,
		}),
		4 | 8 => {
			let data_end = header.data_start() + header.data_size as usize;
			let palette = decode_record_palette(data, data_end, &header, options)?;
			let pixels = unswizzle(texels, header.width as usize, header.height as usize, header.bpp)?;

			Ok(DecodedTexture {
				header: header,
				pixels: pixels,
				palette: Some(palette),
			})
		},
		other => Err(RecordError::UnsupportedDepth(other)),
	}
}

fn decode_record_palette(data: &[u8], data_end: usize, header: &TextureHeader, options: &ScanOptions) -> Result<Vec<Color>, RecordError> {
	// The 112-byte header revision overlaps the palette header with the
	// last 0x20 bytes of pixel data.
	let pal_offset = data_end - header.variant.palette_overlap();
	let pal_header = PaletteHeader::read(data, pal_offset)?;

	let payload_start = pal_header.payload_start();
	let payload_end = payload_start.checked_add(pal_header.data_size as usize)
		.filter(|end| *end <= data.len())
		.ok_or(RecordError::Truncated { offset: pal_offset })?;

	let stripped = palette::remove_padding(&data[payload_start..payload_end], options.padding_fallback)
		.map_err(|e| match e {
			RecordError::UnclassifiedPadding { offset } => RecordError::UnclassifiedPadding {
				offset: payload_start + offset,
			},
			other => other,
		})?;

	palette::decode_palette(&stripped, pal_header.entry_size, pal_header.bypp, pal_offset)
}

fn decode_master_entry(data: &[u8], offset: usize) -> Result<(DecodedTexture, usize), RecordError> {
	let header = TextureHeader::read(data, offset)?;
	let texels = pixel_data(data, &header)?;
	let next = header.data_start() + header.data_size as usize;

	let pixels = match header.bpp {
		32 => convert_bgra_to_rgba(texels),
		4 | 8 => unswizzle(texels, header.width as usize, header.height as usize, header.bpp)?,
		other => return Err(RecordError::UnsupportedDepth(other)),
	};

	Ok((DecodedTexture {
		header: header,
		pixels: pixels,
		palette: None,
	}, next))
}
