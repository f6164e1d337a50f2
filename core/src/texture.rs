use crate::scale7to8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
	pub alpha: u8,
}

impl Color {
	/// Decodes a raw little endian 32-bit GS pixel, rescaling the 7 bit alpha
	pub fn from_rgba32(raw: u32) -> Color {
		Color {
			red: (raw & 0xFF) as u8,
			green: ((raw >> 8) & 0xFF) as u8,
			blue: ((raw >> 16) & 0xFF) as u8,
			alpha: scale7to8(((raw >> 24) & 0xFF) as u8),
		}
	}

	/// Decodes an RGBA byte quadruplet as stored in a palette entry
	pub fn from_rgba_bytes(bytes: [u8; 4]) -> Color {
		Color {
			red: bytes[0],
			green: bytes[1],
			blue: bytes[2],
			alpha: scale7to8(bytes[3]),
		}
	}

	pub fn to_bytes(&self) -> [u8; 4] {
		[self.red, self.green, self.blue, self.alpha]
	}

	pub fn to_rgba8888(&self) -> u32 {
		(self.red as u32) << 24 | (self.green as u32) << 16 | (self.blue as u32) << 8 |
			self.alpha as u32
	}
}

#[derive(Clone, Debug)]
pub struct Texture {
	pub palette: Vec<Color>,
	pub indices: Vec<usize>,
	pub width: usize,
	pub height: usize,
}

impl Texture {
	pub fn new(width: usize, height: usize) -> Texture {
		Texture {
			palette: vec![],
			indices: vec![],
			width: width,
			height: height,
		}
	}

	/// Uses the palette and indices to build a pixel array
	pub fn pixels(&self) -> Vec<Color> {
		self.indices.iter().map(|i| self.palette[*i % self.palette.len()]).collect()
	}

	/// Flattens the texture into linear RGBA bytes
	pub fn rgba_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.indices.len() * 4);

		for pixel in self.pixels().iter() {
			out.extend_from_slice(&pixel.to_bytes());
		}

		out
	}
}

/// Swaps the red and blue channels of raw BGRA pixel data.
/// Trailing bytes that do not form a whole pixel are dropped.
pub fn convert_bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
	let mut rgba = Vec::with_capacity(bgra.len());

	for px in bgra.chunks_exact(4) {
		rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
	}

	rgba
}

/// Swaps the red and blue channels of raw RGBA pixel data.
/// Trailing bytes that do not form a whole pixel are dropped.
pub fn convert_rgba_to_bgra(rgba: &[u8]) -> Vec<u8> {
	convert_bgra_to_rgba(rgba)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_alpha_rescale() {
		assert_eq!(Color::from_rgba32(0x80000000).alpha, 255);
		assert_eq!(Color::from_rgba32(0x40000000).alpha, 128);
		assert_eq!(Color::from_rgba32(0x00000000).alpha, 0);
		assert_eq!(Color::from_rgba32(0xFF000000).alpha, 255);
	}

	#[test]
	fn test_from_rgba32_channels() {
		let c = Color::from_rgba32(0x80CCBBAA);
		assert_eq!(c, Color { red: 0xAA, green: 0xBB, blue: 0xCC, alpha: 255 });
	}

	#[test]
	fn test_bgra_round_trip() {
		let bgra = [1, 2, 3, 4, 5, 6, 7, 8];
		let rgba = convert_bgra_to_rgba(&bgra);
		assert_eq!(rgba, vec![3, 2, 1, 4, 7, 6, 5, 8]);
		assert_eq!(convert_rgba_to_bgra(&rgba), bgra.to_vec());
	}

	#[test]
	fn test_rgba_bytes() {
		let mut tex = Texture::new(2, 1);
		tex.palette = vec![Color::from_rgba_bytes([1, 2, 3, 0x80]), Color::from_rgba_bytes([4, 5, 6, 0x40])];
		tex.indices = vec![1, 0];
		assert_eq!(tex.rgba_bytes(), vec![4, 5, 6, 128, 1, 2, 3, 255]);
	}
}
