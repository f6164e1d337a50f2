pub mod clut;
pub mod gs;
pub mod simple;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SwizzleError {
	#[error("Pixel buffer too small: need {need} bytes, have {have}")]
	BufferSize {
		need: usize,
		have: usize,
	},
	#[error("Unsupported bit depth: {0}")]
	UnsupportedDepth(u8),
	#[error("{0}x{1} violates the tiling granularity")]
	UnsupportedDimensions(usize, usize),
}

/// Converts swizzled indexed pixel data to linear row-major order.
///
/// Output is always one byte per pixel: 4 bpp input is expanded to one
/// index value per byte on the way through.
pub fn unswizzle(data: &[u8], width: usize, height: usize, bpp: u8) -> Result<Vec<u8>, SwizzleError> {
	match bpp {
		8 => simple::unswizzle8(data, width, height),
		4 => simple::unswizzle4_to_8(data, width, height),
		other => Err(SwizzleError::UnsupportedDepth(other)),
	}
}

fn check_dimensions_8(width: usize, height: usize) -> Result<(), SwizzleError> {
	if width == 0 || height == 0 || width % 16 != 0 || height % 4 != 0 {
		return Err(SwizzleError::UnsupportedDimensions(width, height));
	}

	Ok(())
}

fn check_dimensions_4(width: usize, height: usize) -> Result<(), SwizzleError> {
	let width_ok = width != 0 && if width < 128 {
		width % 32 == 0
	} else {
		width % 128 == 0
	};
	let height_ok = height != 0 && if height < 128 {
		height % 16 == 0
	} else {
		height % 128 == 0
	};

	if !width_ok || !height_ok {
		return Err(SwizzleError::UnsupportedDimensions(width, height));
	}

	Ok(())
}

fn check_input_len(data: &[u8], need: usize) -> Result<(), SwizzleError> {
	if data.len() < need {
		return Err(SwizzleError::BufferSize {
			need: need,
			have: data.len(),
		});
	}

	Ok(())
}
