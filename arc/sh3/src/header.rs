use byteorder::{
	BE,
	LE,
	ReadBytesExt
};

use log::warn;

use crate::RecordError;

/// Fixed prefix read before the header size is known
pub const PREFIX_SIZE: usize = 0x20;

/// Known texture header revisions, selected by the discriminator bytes at
/// offset 12 of the header prefix.
///
/// Each revision carries its own full header length; the 112-byte revision
/// additionally places the palette header 0x20 bytes before the end of the
/// pixel data instead of directly after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatVariant {
	Standard,
	Extended,
	Wide,
	Overlapped,
}

impl FormatVariant {
	/// Unknown discriminators map to [`FormatVariant::Standard`]; its
	/// 80-byte header length may be wrong for undiscovered revisions.
	pub fn from_discriminator(disc: [u8; 4]) -> FormatVariant {
		match disc {
			[0x20, 0x30, 0x00, 0x00] | [0x18, 0x30, 0x00, 0x00] | [0x08, 0x30, 0x00, 0x00] => FormatVariant::Extended,
			[0x18, 0x50, 0x00, 0x00] | [0x20, 0x50, 0x00, 0x00] => FormatVariant::Wide,
			[0x08, 0x20, 0x00, 0x00] => FormatVariant::Standard,
			[0x04, 0x20, 0x00, 0x00] => FormatVariant::Overlapped,
			other => {
				warn!("unknown header discriminator {:02x?}, assuming the 80 byte revision", other);
				FormatVariant::Standard
			},
		}
	}

	pub fn header_size(self) -> usize {
		match self {
			FormatVariant::Standard => 80,
			FormatVariant::Extended => 96,
			FormatVariant::Overlapped => 112,
			FormatVariant::Wide => 128,
		}
	}

	/// How far before the end of pixel data the palette header starts
	pub fn palette_overlap(self) -> usize {
		match self {
			FormatVariant::Overlapped => 0x20,
			_ => 0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureHeader {
	pub header_offset: usize,
	pub variant: FormatVariant,
	pub data_offset: u32,
	pub width: u16,
	pub height: u16,
	pub bpp: u8,
	pub data_size: u32,
	pub total_size: u32,
}

impl TextureHeader {
	/// Decodes the texture header at `offset`. On success the pixel data
	/// starts exactly at `offset + variant.header_size()`.
	pub fn read(data: &[u8], offset: usize) -> Result<TextureHeader, RecordError> {
		let prefix = data.get(offset..offset + PREFIX_SIZE)
			.ok_or(RecordError::Truncated { offset: offset })?;

		let mut disc = [0; 4];
		disc.copy_from_slice(&prefix[12..16]);
		let variant = FormatVariant::from_discriminator(disc);

		if data.len() < offset + variant.header_size() {
			return Err(RecordError::Truncated { offset: offset });
		}

		let mut buf = &prefix[4..];
		let data_offset = buf.read_u32::<LE>()?;
		let width = buf.read_u16::<LE>()?;
		let height = buf.read_u16::<LE>()?;
		let bpp = buf.read_u8()?;

		let mut buf = &prefix[16..];
		let data_size = buf.read_u32::<LE>()?;
		let total_size = buf.read_u32::<LE>()?;

		Ok(TextureHeader {
			header_offset: offset,
			variant: variant,
			data_offset: data_offset,
			width: width,
			height: height,
			bpp: bpp,
			data_size: data_size,
			total_size: total_size,
		})
	}

	/// Offset of the first pixel data byte
	pub fn data_start(&self) -> usize {
		self.header_offset + self.variant.header_size()
	}
}

/// Header of a master record: a counted, back-to-back run of textures
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MasterHeader {
	pub header_offset: usize,
	pub num_textures: u8,
	pub texture_offset: u32,
	pub texture_size: u32,
}

impl MasterHeader {
	pub fn read(data: &[u8], offset: usize) -> Result<MasterHeader, RecordError> {
		let prefix = data.get(offset..offset + PREFIX_SIZE)
			.ok_or(RecordError::Truncated { offset: offset })?;

		let mut buf = &prefix[8..];
		let texture_offset = buf.read_u32::<LE>()?;
		// The size field alone is stored big endian.
		let texture_size = buf.read_u32::<BE>()?;

		Ok(MasterHeader {
			header_offset: offset,
			num_textures: prefix[20],
			texture_offset: texture_offset,
			texture_size: texture_size,
		})
	}
}
