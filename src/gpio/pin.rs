use std::fmt;
use std::str;

// BCM2835 has 54 GPIO lines
pub const PIN_COUNT: u8 = 54;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GpioPin(pub u8);

impl GpioPin {
	// function select: 10 pins per register, 3 bits each
	pub fn fsel_offset(&self) -> usize {
		4 * (self.0 as usize / 10)
	}

	pub fn fsel_shift(&self) -> u32 {
		3 * (self.0 as u32 % 10)
	}

	// set/clear/level: 32 pins per register
	pub fn bank_offset(&self) -> usize {
		4 * (self.0 as usize / 32)
	}

	pub fn mask(&self) -> u32 {
		1u32 << (self.0 % 32)
	}
}

impl fmt::Display for GpioPin {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "GPIO{}", self.0)
	}
}

impl str::FromStr for GpioPin {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let digits = match s.get(..4) {
			Some(prefix) if prefix.eq_ignore_ascii_case("gpio") => &s[4..],
			_ => s,
		};

		ensure!(!digits.is_empty() && digits.len() <= 2, "invalid GPIO pin: {:?}", s);

		let pin = with_context!(("invalid GPIO pin: {}", s),
			Ok(digits.parse::<u8>()?)
		)?;

		ensure!(pin < PIN_COUNT, "invalid GPIO pin: {} (too big)", pin);

		Ok(GpioPin(pin))
	}
}

#[cfg(test)]
mod test {
	use super::GpioPin;

	fn check_pin(pin: u8, repr: &str) {
		match repr.parse::<GpioPin>() {
			Err(e) => panic!("{} failed to parse as GpioPin: {}", repr, e),
			Ok(p) => assert_eq!(GpioPin(pin), p, "failed validing parsed {}", repr),
		}
	}

	fn check_pin_canonical(pin: u8, repr: &str) {
		check_pin(pin, repr);
		assert_eq!(GpioPin(pin).to_string(), repr, "failed stringifying pin {}", pin);
	}

	fn check_invalid_pin(repr: &str) {
		assert!(repr.parse::<GpioPin>().is_err(), "{:?} must not be a valid GPIO pin", repr);
	}

	#[test]
	fn parse_pin() {
		check_pin(0, "0");
		check_pin(2, "02");
		check_pin(3, "gpio3");
		check_pin_canonical(0, "GPIO0");
		check_pin_canonical(17, "GPIO17");
		check_pin_canonical(53, "GPIO53");
		check_invalid_pin("");
		check_invalid_pin("GPIO");
		check_invalid_pin("GPIO-1");
		check_invalid_pin("54");
		check_invalid_pin("100");
		check_invalid_pin("x1");
		check_invalid_pin("1.0");
	}

	#[test]
	fn register_layout() {
		let p = GpioPin(17);
		assert_eq!(p.fsel_offset(), 0x04);
		assert_eq!(p.fsel_shift(), 21);
		assert_eq!(p.bank_offset(), 0x00);
		assert_eq!(p.mask(), 1 << 17);

		let p = GpioPin(33);
		assert_eq!(p.fsel_offset(), 0x0c);
		assert_eq!(p.fsel_shift(), 9);
		assert_eq!(p.bank_offset(), 0x04);
		assert_eq!(p.mask(), 1 << 1);
	}
}
