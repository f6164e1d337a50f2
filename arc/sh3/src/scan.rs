/// Marks the start of a texture record
pub const TEXTURE_HEADER_PATTERN: [u8; 9] = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Marks the start of a master record grouping several textures
pub const MASTER_HEADER_PATTERN: [u8; 12] = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00];

/// Lazy iterator over the offsets where a byte pattern occurs in a buffer.
///
/// Offsets come out in ascending order. The search resumes one byte past
/// each match start, so matches may overlap at the byte level. A pattern
/// that never occurs yields nothing; that is not an error.
pub struct Signatures<'a> {
	data: &'a [u8],
	pattern: &'a [u8],
	pos: usize,
}

impl<'a> Signatures<'a> {
	pub fn new(data: &'a [u8], pattern: &'a [u8]) -> Signatures<'a> {
		Signatures {
			data: data,
			pattern: pattern,
			pos: 0,
		}
	}
}

impl<'a> Iterator for Signatures<'a> {
	type Item = usize;

	fn next(&mut self) -> Option<usize> {
		if self.pattern.is_empty() {
			return None;
		}

		while self.pos + self.pattern.len() <= self.data.len() {
			let start = self.pos;
			self.pos += 1;

			if &self.data[start..start + self.pattern.len()] == self.pattern {
				return Some(start);
			}
		}

		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_overlapping_matches() {
		let mut data = vec![0x11; 100];
		for offset in [10, 50, 59] {
			data[offset..offset + 9].copy_from_slice(&TEXTURE_HEADER_PATTERN);
		}

		let offsets: Vec<usize> = Signatures::new(&data, &TEXTURE_HEADER_PATTERN).collect();
		assert_eq!(offsets, vec![10, 50, 59]);
	}

	#[test]
	fn test_no_match_is_empty() {
		let data = vec![0x11; 64];
		assert_eq!(Signatures::new(&data, &TEXTURE_HEADER_PATTERN).count(), 0);
	}

	#[test]
	fn test_pattern_longer_than_buffer() {
		assert_eq!(Signatures::new(&[0xFF; 4], &TEXTURE_HEADER_PATTERN).count(), 0);
	}

	#[test]
	fn test_restartable() {
		let mut data = vec![0x22; 40];
		data[5..14].copy_from_slice(&TEXTURE_HEADER_PATTERN);
		data[20..29].copy_from_slice(&TEXTURE_HEADER_PATTERN);

		let mut sigs = Signatures::new(&data, &TEXTURE_HEADER_PATTERN);
		assert_eq!(sigs.next(), Some(5));
		assert_eq!(sigs.next(), Some(20));
		assert_eq!(sigs.next(), None);
	}
}
