use std::fmt;
use std::str;

const OUTPUT_LEVEL:   u8 = 0x80;
const SQUARE_WAVE:    u8 = 0x10;
const RATE_MASK:      u8 = 0x03;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum SquareWaveRate {
	Hz1,
	Hz4096,
	Hz8192,
	Hz32768,
}

impl SquareWaveRate {
	pub fn from_bits(v: u8) -> Self {
		match v & RATE_MASK {
			0b00 => SquareWaveRate::Hz1,
			0b01 => SquareWaveRate::Hz4096,
			0b10 => SquareWaveRate::Hz8192,
			0b11 => SquareWaveRate::Hz32768,
			_ => unreachable!(),
		}
	}

	pub fn from_u8(v: u8) -> Option<Self> {
		if v > RATE_MASK {
			None
		} else {
			Some(Self::from_bits(v))
		}
	}

	pub fn bits(self) -> u8 {
		match self {
			SquareWaveRate::Hz1 => 0b00,
			SquareWaveRate::Hz4096 => 0b01,
			SquareWaveRate::Hz8192 => 0b10,
			SquareWaveRate::Hz32768 => 0b11,
		}
	}

	pub fn frequency(self) -> u32 {
		match self {
			SquareWaveRate::Hz1 => 1,
			SquareWaveRate::Hz4096 => 4096,
			SquareWaveRate::Hz8192 => 8192,
			SquareWaveRate::Hz32768 => 32768,
		}
	}
}

impl fmt::Display for SquareWaveRate {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} Hz", self.frequency())
	}
}

impl str::FromStr for SquareWaveRate {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let rate = match s.to_ascii_lowercase().as_str() {
			"0" | "1hz" => SquareWaveRate::Hz1,
			"1" | "4khz" | "4096hz" => SquareWaveRate::Hz4096,
			"2" | "8khz" | "8192hz" => SquareWaveRate::Hz8192,
			"3" | "32khz" | "32768hz" => SquareWaveRate::Hz32768,
			_ => bail!("invalid square wave rate: {:?} (expected 0-3, 1hz, 4khz, 8khz or 32khz)", s),
		};
		Ok(rate)
	}
}

/// Control register (0x07)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Control(pub u8);

impl Control {
	// level of the SQW/OUT pin while the square wave is disabled
	pub fn is_output_level(&self) -> bool {
		0 != self.0 & OUTPUT_LEVEL
	}
	pub fn set_output_level(&mut self, enabled: bool) -> &mut Self {
		self.set_flag(OUTPUT_LEVEL, enabled)
	}

	pub fn is_square_wave(&self) -> bool {
		0 != self.0 & SQUARE_WAVE
	}
	pub fn set_square_wave(&mut self, enabled: bool) -> &mut Self {
		self.set_flag(SQUARE_WAVE, enabled)
	}

	pub fn rate(&self) -> SquareWaveRate {
		SquareWaveRate::from_bits(self.0)
	}
	pub fn set_rate(&mut self, rate: SquareWaveRate) -> &mut Self {
		self.0 = (self.0 & !RATE_MASK) | rate.bits();
		self
	}

	fn set_flag(&mut self, flag: u8, enabled: bool) -> &mut Self {
		if enabled {
			self.0 |= flag;
		} else {
			self.0 &= !flag;
		}
		self
	}
}

impl fmt::Display for Control {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl fmt::Debug for Control {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x} (rate: {}", self.0, self.rate())?;
		if self.is_output_level() { write!(f, " [OUT]")?; }
		if self.is_square_wave() { write!(f, " [SQWE]")?; }
		write!(f, ")")
	}
}
