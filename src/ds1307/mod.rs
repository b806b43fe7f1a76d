/* Datasheet: https://www.analog.com/media/en/technical-documentation/data-sheets/DS1307.pdf */

mod bcd;
mod control;
mod snapshot;

pub use self::bcd::{
	decode,
	decode_hour,
	decode_year,
	encode,
};

pub use self::control::{
	Control,
	SquareWaveRate,
};

pub use self::snapshot::{
	ClockSnapshot,
	SCRATCH_SIZE,
	ScratchRegion,
};

use crate::wire::{
	BusOperations,
	Direction,
	Hardware,
	Line,
};

// 7-bit address; 0xd0 / 0xd1 on the wire
pub const DEVICE_ADDRESS: u8 = 0x68;

const CLOCK_HALT: u8 = 0x80;

// last year the register decodes back to (0xf9)
const LAST_YEAR: u16 = bcd::CENTURY + 159;

/// Address inside the battery backed RAM, always below `SCRATCH_SIZE`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ScratchAddress(u8);

impl ScratchAddress {
	pub fn new(address: u8) -> Option<Self> {
		if (address as usize) < SCRATCH_SIZE {
			Some(ScratchAddress(address))
		} else {
			None
		}
	}

	pub fn get(self) -> u8 {
		self.0
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Register {
	Seconds,
	Minutes,
	Hours,
	DayOfWeek,
	Date,
	Month,
	Year,
	Control,
	Scratch(ScratchAddress),
}

impl Register {
	pub const SCRATCH_BASE: u8 = 0x08;

	// `None` for addresses outside the RAM
	pub fn scratch(address: u8) -> Option<Self> {
		ScratchAddress::new(address).map(Register::Scratch)
	}

	pub fn offset(self) -> u8 {
		match self {
			Register::Seconds => 0x00,
			Register::Minutes => 0x01,
			Register::Hours => 0x02,
			Register::DayOfWeek => 0x03,
			Register::Date => 0x04,
			Register::Month => 0x05,
			Register::Year => 0x06,
			Register::Control => 0x07,
			Register::Scratch(address) => Self::SCRATCH_BASE + address.get(),
		}
	}
}

/// DS1307 on a software two-wire bus
///
/// Invalid arguments to the write operations don't produce errors: the
/// write is skipped (and logged). Errors only come from the bus.
pub struct Ds1307<H: Hardware> {
	hardware: H,
}

impl<H: Hardware> Ds1307<H> {
	pub fn new(mut hardware: H) -> Self {
		hardware.set_level(Line::Clock, true);
		hardware.set_direction(Line::Clock, Direction::Output);
		hardware.set_direction(Line::Data, Direction::Input);
		Ds1307 { hardware }
	}

	pub fn bus(&mut self) -> &mut H {
		&mut self.hardware
	}

	pub fn into_bus(self) -> H {
		self.hardware
	}

	fn read(&mut self, register: Register) -> crate::AResult<u8> {
		self.hardware.read_register(DEVICE_ADDRESS, register.offset())
	}

	fn write(&mut self, register: Register, value: u8) -> crate::AResult<()> {
		self.hardware.write_register(DEVICE_ADDRESS, register.offset(), value)
	}

	fn modify<F>(&mut self, register: Register, f: F) -> crate::AResult<()>
	where
		F: FnOnce(u8) -> u8,
	{
		let value = self.read(register)?;
		self.write(register, f(value))
	}

	pub fn read_snapshot(&mut self) -> crate::AResult<ClockSnapshot> {
		// seconds .. year, control
		let mut raw = [0u8; 8];
		self.hardware.read_registers(DEVICE_ADDRESS, Register::Seconds.offset(), &mut raw)?;

		let snapshot = ClockSnapshot {
			second: decode(raw[0]),
			minute: decode(raw[1]),
			hour: decode_hour(raw[2]),
			day_of_week: raw[3],
			date: decode(raw[4]),
			month: decode(raw[5]),
			year: decode_year(raw[6]),
		};
		if let Err(e) = snapshot.validate() {
			warn!("clock registers {:02x?} decode to invalid time {}: {}", &raw[..7], snapshot, e);
		}
		Ok(snapshot)
	}

	pub fn write_time(&mut self, hour: u8, minute: u8, second: u8) -> crate::AResult<()> {
		if hour >= 24 || minute >= 60 || second >= 60 {
			warn!("ignoring invalid time {:02}:{:02}:{:02}", hour, minute, second);
			return Ok(());
		}
		// writing the seconds register also clears the halt flag
		self.write(Register::Hours, encode(hour))?;
		self.write(Register::Minutes, encode(minute))?;
		self.write(Register::Seconds, encode(second))
	}

	pub fn write_date(&mut self, date: u8, month: u8, year: u16) -> crate::AResult<()> {
		if date < 1 || date > 31 || month < 1 || month > 12 || year < 2000 || year >= 3000 {
			warn!("ignoring invalid date {:04}-{:02}-{:02}", year, month, date);
			return Ok(());
		}
		if year > LAST_YEAR {
			warn!("year {} doesn't fit the year register, it won't read back", year);
		}
		self.write(Register::Year, encode((year - bcd::CENTURY) as u8))?;
		self.write(Register::Month, encode(month))?;
		self.write(Register::Date, encode(date))
	}

	pub fn write_day_of_week(&mut self, day_of_week: u8) -> crate::AResult<()> {
		if day_of_week < 1 || day_of_week > 7 {
			warn!("ignoring invalid day of week {}", day_of_week);
			return Ok(());
		}
		self.write(Register::DayOfWeek, day_of_week)
	}

	// all fields checked before anything is written
	pub fn write_snapshot(&mut self, snapshot: &ClockSnapshot) -> crate::AResult<()> {
		if let Err(e) = snapshot.validate() {
			warn!("ignoring invalid time {}: {}", snapshot, e);
			return Ok(());
		}
		self.write_time(snapshot.hour, snapshot.minute, snapshot.second)?;
		self.write_date(snapshot.date, snapshot.month, snapshot.year)?;
		self.write_day_of_week(snapshot.day_of_week)
	}

	pub fn set_halt(&mut self, enabled: bool) -> crate::AResult<()> {
		self.modify(Register::Seconds, |seconds| {
			if enabled {
				seconds | CLOCK_HALT
			} else {
				seconds & !CLOCK_HALT
			}
		})
	}

	pub fn is_halted(&mut self) -> crate::AResult<bool> {
		Ok(0 != self.read(Register::Seconds)? & CLOCK_HALT)
	}

	pub fn read_control(&mut self) -> crate::AResult<Control> {
		Ok(Control(self.read(Register::Control)?))
	}

	pub fn set_output_level(&mut self, enabled: bool) -> crate::AResult<()> {
		self.modify(Register::Control, |c| Control(c).set_output_level(enabled).0)
	}

	pub fn set_square_wave_enabled(&mut self, enabled: bool) -> crate::AResult<()> {
		self.modify(Register::Control, |c| Control(c).set_square_wave(enabled).0)
	}

	pub fn set_square_wave_rate(&mut self, rate: SquareWaveRate) -> crate::AResult<()> {
		self.modify(Register::Control, |c| Control(c).set_rate(rate).0)
	}

	pub fn read_scratch_byte(&mut self, address: u8) -> crate::AResult<u8> {
		match Register::scratch(address) {
			Some(register) => self.read(register),
			None => {
				warn!("scratch address {} out of range, reading as 0", address);
				Ok(0)
			},
		}
	}

	pub fn write_scratch_byte(&mut self, address: u8, value: u8) -> crate::AResult<()> {
		match Register::scratch(address) {
			Some(register) => self.write(register, value),
			None => {
				warn!("scratch address {} out of range, ignoring write", address);
				Ok(())
			},
		}
	}

	pub fn read_scratch_region(&mut self) -> crate::AResult<ScratchRegion> {
		let mut region = ScratchRegion::default();
		self.hardware.read_registers(DEVICE_ADDRESS, Register::SCRATCH_BASE, &mut region.cells)?;
		Ok(region)
	}

	pub fn write_scratch_region(&mut self, region: &ScratchRegion) -> crate::AResult<()> {
		self.hardware.write_registers(DEVICE_ADDRESS, Register::SCRATCH_BASE, &region.cells)
	}
}
