//! Packed BCD conversion for the time/date registers

const FLAG_BIT: u8 = 0x80;
const HOUR_12_BIT: u8 = 0x80;

pub const CENTURY: u16 = 2000;

// 0..=99 is proper BCD; 100..=159 puts the hundreds into the high nibble
// (0xa0..0xf9), which `decode_year` reads back
pub fn encode(value: u8) -> u8 {
	((value / 10) << 4) | (value % 10)
}

fn nibbles(value: u8) -> u8 {
	(value & 0xf) + 10 * ((value >> 4) & 0xf)
}

// bit 7 is a flag in seconds (clock halt), not part of the value
pub fn decode(value: u8) -> u8 {
	nibbles(value & !FLAG_BIT)
}

pub fn decode_year(value: u8) -> u16 {
	CENTURY + nibbles(value) as u16
}

// 12-hour mode keeps a single "tens" bit in bit 5 which is worth 12 here;
// 24-hour mode has two tens bits (5:4)
pub fn decode_hour(value: u8) -> u8 {
	if 0 != value & HOUR_12_BIT {
		(value & 0xf) + 12 * ((value >> 5) & 0x1)
	} else {
		(value & 0xf) + 10 * ((value >> 4) & 0x3)
	}
}
