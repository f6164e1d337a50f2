pub mod texture;

/// Scales a 7 bit GS alpha value to 8 bits.
///
/// The GS treats 0x80 as fully opaque, so the value is doubled and clamped
/// rather than bit-replicated.
pub const fn scale7to8(a: u8) -> u8 {
	let doubled = (a as u16) * 2;
	if doubled > 255 {
		255
	} else {
		doubled as u8
	}
}
