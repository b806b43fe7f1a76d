/* BCM2835 ARM Peripherals, chapter 6 "General Purpose I/O" */

use crate::wire::{
	Direction,
	Hardware,
	Line,
	Timing,
};

use super::GpioPin;
use super::mapped::{
	Mapped,
	inner_open,
};

const GPIOMEM_PATH: &str = "/dev/gpiomem";
const GPIOMEM_LEN: usize = 4096;

const GPFSEL0: usize = 0x00;
const GPSET0:  usize = 0x1c;
const GPCLR0:  usize = 0x28;
const GPLEV0:  usize = 0x34;

const FSEL_MASK:   u32 = 0b111;
const FSEL_INPUT:  u32 = 0b000;
const FSEL_OUTPUT: u32 = 0b001;

struct Bcm2835Lines {
	regs: Mapped,
	clock: GpioPin,
	data: GpioPin,
	timing: Timing,
}

impl Bcm2835Lines {
	fn pin(&self, line: Line) -> GpioPin {
		match line {
			Line::Clock => self.clock,
			Line::Data => self.data,
		}
	}
}

impl Hardware for Bcm2835Lines {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		let pin = self.pin(line);
		let function = match direction {
			Direction::Input => FSEL_INPUT,
			Direction::Output => FSEL_OUTPUT,
		};
		let offset = GPFSEL0 + pin.fsel_offset();
		let fsel = self.regs.read_dword(offset);
		let fsel = (fsel & !(FSEL_MASK << pin.fsel_shift())) | (function << pin.fsel_shift());
		self.regs.write_dword(offset, fsel);
	}

	// an input pin keeps the written level for when it becomes an output
	fn set_level(&mut self, line: Line, high: bool) {
		let pin = self.pin(line);
		let base = if high { GPSET0 } else { GPCLR0 };
		self.regs.write_dword(base + pin.bank_offset(), pin.mask());
	}

	fn read_level(&mut self, line: Line) -> bool {
		let pin = self.pin(line);
		0 != self.regs.read_dword(GPLEV0 + pin.bank_offset()) & pin.mask()
	}

	fn timing(&self) -> Timing {
		self.timing
	}
}

impl Drop for Bcm2835Lines {
	fn drop(&mut self) {
		// leave both lines to the pull-ups
		self.set_direction(Line::Data, Direction::Input);
		self.set_direction(Line::Clock, Direction::Input);
	}
}

pub fn open_gpiomem(clock: GpioPin, data: GpioPin, timing: Timing) -> crate::AResult<impl Hardware> {
	ensure!(clock != data, "clock and data need separate pins (both {})", clock);

	let regs = with_context!(("couldn't map {}", GPIOMEM_PATH), {
		Ok(inner_open(GPIOMEM_PATH, GPIOMEM_LEN)?)
	})?;
	debug!("mapped {} bytes of {}; clock {}, data {}, {:?}", regs.len(), GPIOMEM_PATH, clock, data, timing);

	Ok(Bcm2835Lines {
		regs,
		clock,
		data,
		timing,
	})
}
