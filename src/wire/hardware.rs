use failure::Fail;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

// 100 kHz standard mode: 10µs per full clock cycle
const CLOCK_EDGE: Duration = Duration::from_micros(5);
const ACK_POLLS: u32 = 10_000;

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Line {
	Clock,
	Data,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	// released; external pull-up keeps the line high unless the device pulls it down
	Input,
	Output,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timing {
	/// minimum time between two line changes
	pub clock_edge: Duration,
	/// how often to sample the data line while waiting for an ACK; `None`
	/// waits forever
	pub ack_polls: Option<u32>,
}

impl Default for Timing {
	fn default() -> Self {
		Timing {
			clock_edge: CLOCK_EDGE,
			ack_polls: Some(ACK_POLLS),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum BusError {
	#[fail(display = "device not responding: no ACK after {} polls", polls)]
	NoAcknowledge {
		polls: u32,
	},
}

/// Line driver for the two bus lines
pub trait Hardware {
	// switching to output drives the last level set for the line
	fn set_direction(&mut self, line: Line, direction: Direction);
	fn set_level(&mut self, line: Line, high: bool);
	fn read_level(&mut self, line: Line) -> bool;

	fn timing(&self) -> Timing {
		Timing::default()
	}

	// delay for (at least) one clock edge
	fn delay(&mut self) {
		reliable_sleep(self.timing().clock_edge);
	}
}

impl<'a, H: ?Sized + Hardware> Hardware for &'a mut H {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		H::set_direction(*self, line, direction)
	}
	fn set_level(&mut self, line: Line, high: bool) {
		H::set_level(*self, line, high)
	}
	fn read_level(&mut self, line: Line) -> bool {
		H::read_level(*self, line)
	}
	fn timing(&self) -> Timing {
		H::timing(&**self)
	}
	fn delay(&mut self) {
		H::delay(*self)
	}
}
