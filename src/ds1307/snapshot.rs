use chrono::{
	Datelike,
	Timelike,
};
use std::fmt;
use std::ops::{
	Deref,
	DerefMut,
};

pub const SCRATCH_SIZE: usize = 56;

/// Time and date as read from the clock registers
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ClockSnapshot {
	pub year: u16,
	pub month: u8,
	pub date: u8,
	pub hour: u8,
	pub minute: u8,
	pub second: u8,
	/// 1..=7, meaning is up to the user (1 = monday by convention)
	pub day_of_week: u8,
}

impl ClockSnapshot {
	// day of week counts from monday = 1
	pub fn from_datetime<T: Datelike + Timelike>(t: &T) -> Self {
		ClockSnapshot {
			year: t.year() as u16,
			month: t.month() as u8,
			date: t.day() as u8,
			hour: t.hour() as u8,
			minute: t.minute() as u8,
			second: t.second() as u8,
			day_of_week: t.weekday().number_from_monday() as u8,
		}
	}

	pub fn validate(&self) -> crate::AResult<()> {
		ensure!(self.hour < 24, "hour out of range: {}", self.hour);
		ensure!(self.minute < 60, "minute out of range: {}", self.minute);
		ensure!(self.second < 60, "second out of range: {}", self.second);
		ensure!(self.date >= 1 && self.date <= 31, "date out of range: {}", self.date);
		ensure!(self.month >= 1 && self.month <= 12, "month out of range: {}", self.month);
		ensure!(self.year >= 2000 && self.year < 3000, "year out of range: {}", self.year);
		ensure!(self.day_of_week >= 1 && self.day_of_week <= 7, "day of week out of range: {}", self.day_of_week);
		Ok(())
	}
}

// used until the clock is read for the first time
impl Default for ClockSnapshot {
	fn default() -> Self {
		ClockSnapshot {
			year: 2010,
			month: 1,
			date: 1,
			hour: 0,
			minute: 0,
			second: 0,
			day_of_week: 5,
		}
	}
}

impl fmt::Display for ClockSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
			self.year,
			self.month,
			self.date,
			self.hour,
			self.minute,
			self.second,
		)
	}
}

/// Battery backed RAM (registers 0x08..0x3f)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchRegion {
	pub cells: [u8; SCRATCH_SIZE],
}

impl Default for ScratchRegion {
	fn default() -> Self {
		ScratchRegion {
			cells: [0u8; SCRATCH_SIZE],
		}
	}
}

impl From<[u8; SCRATCH_SIZE]> for ScratchRegion {
	fn from(cells: [u8; SCRATCH_SIZE]) -> Self {
		ScratchRegion { cells }
	}
}

impl Deref for ScratchRegion {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		&self.cells
	}
}

impl DerefMut for ScratchRegion {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.cells
	}
}

impl fmt::Debug for ScratchRegion {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_list().entries(self.cells.iter()).finish()
	}
}
