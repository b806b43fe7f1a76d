//! Line-level software model of a DS1307 on the bus
//!
//! Reacts to every line change the way the chip would: START/STOP
//! detection while clock is high, sampling on rising clock edges and
//! driving data on falling edges.

use super::{
	Direction,
	Hardware,
	Line,
	Timing,
};

pub const ADDRESS: u8 = 0x68;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Start,
	Stop,
	Address(u8),
	// data byte received after the register pointer was set
	Written(u8),
	Pointer(u8),
	// ACK (true) / NACK (false) sent by the bus master after a read byte
	MasterAck(bool),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
	Idle,
	Receive { byte: u8, bits: u8 },
	Acknowledge,
	Transmit { byte: u8, sent: u8 },
	MasterAck,
}

#[derive(Clone, Copy, Debug)]
struct Pin {
	direction: Direction,
	level: bool,
}

impl Pin {
	fn released() -> Self {
		Pin {
			direction: Direction::Input,
			level: false,
		}
	}

	fn line(&self) -> bool {
		match self.direction {
			Direction::Input => true,
			Direction::Output => self.level,
		}
	}
}

pub struct SimulatedChip {
	clock: Pin,
	data: Pin,
	scl: bool,
	sda: bool,
	chip_sda: bool,
	phase: Phase,
	addressed: bool,
	reading: bool,
	pointer_set: bool,
	pointer: u8,
	master_ack: bool,
	pub present: bool,
	pub registers: [u8; 64],
	pub events: Vec<Event>,
}

impl SimulatedChip {
	pub fn new() -> Self {
		SimulatedChip {
			clock: Pin::released(),
			data: Pin::released(),
			scl: true,
			sda: true,
			chip_sda: true,
			phase: Phase::Idle,
			addressed: false,
			reading: false,
			pointer_set: false,
			pointer: 0,
			master_ack: false,
			present: true,
			registers: [0u8; 64],
			events: Vec::new(),
		}
	}

	pub fn absent() -> Self {
		SimulatedChip {
			present: false,
			..SimulatedChip::new()
		}
	}

	pub fn with_registers(registers: &[(u8, u8)]) -> Self {
		let mut chip = SimulatedChip::new();
		for &(register, value) in registers {
			chip.registers[register as usize] = value;
		}
		chip
	}

	pub fn master_acks(&self) -> Vec<bool> {
		self.events.iter().filter_map(|e| match *e {
			Event::MasterAck(ack) => Some(ack),
			_ => None,
		}).collect()
	}

	pub fn written(&self) -> Vec<u8> {
		self.events.iter().filter_map(|e| match *e {
			Event::Written(b) => Some(b),
			_ => None,
		}).collect()
	}

	// both lines released and high
	pub fn is_idle(&self) -> bool {
		self.scl && self.sda && self.data.direction == Direction::Input
	}

	fn next_transmit_byte(&mut self) {
		let byte = self.registers[self.pointer as usize];
		self.pointer = (self.pointer + 1) & 0x3f;
		self.chip_sda = 0 != byte & 0x80;
		self.phase = Phase::Transmit { byte, sent: 0 };
	}

	fn received_byte(&mut self, byte: u8) {
		if !self.addressed {
			self.events.push(Event::Address(byte));
			if self.present && byte >> 1 == ADDRESS {
				self.addressed = true;
				self.reading = 0 != byte & 1;
				self.chip_sda = false;
				self.phase = Phase::Acknowledge;
			} else {
				self.phase = Phase::Idle;
			}
			return;
		}
		if !self.pointer_set {
			self.events.push(Event::Pointer(byte));
			self.pointer = byte & 0x3f;
			self.pointer_set = true;
		} else {
			self.events.push(Event::Written(byte));
			self.registers[self.pointer as usize] = byte;
			self.pointer = (self.pointer + 1) & 0x3f;
		}
		self.chip_sda = false;
		self.phase = Phase::Acknowledge;
	}

	fn rising(&mut self, sda: bool) {
		match self.phase {
			Phase::Receive { byte, bits } => {
				self.phase = Phase::Receive {
					byte: (byte << 1) | (sda as u8),
					bits: bits + 1,
				};
			},
			Phase::MasterAck => {
				self.master_ack = !sda;
				self.events.push(Event::MasterAck(!sda));
			},
			_ => (),
		}
	}

	fn falling(&mut self) {
		match self.phase {
			Phase::Receive { byte, bits: 8 } => self.received_byte(byte),
			Phase::Acknowledge => {
				self.chip_sda = true;
				if self.reading {
					self.next_transmit_byte();
				} else {
					self.phase = Phase::Receive { byte: 0, bits: 0 };
				}
			},
			Phase::Transmit { byte, sent } => {
				let sent = sent + 1;
				if sent == 8 {
					self.chip_sda = true;
					self.phase = Phase::MasterAck;
				} else {
					self.chip_sda = 0 != byte & (0x80 >> sent);
					self.phase = Phase::Transmit { byte, sent };
				}
			},
			Phase::MasterAck => {
				if self.master_ack {
					self.next_transmit_byte();
				} else {
					self.phase = Phase::Idle;
				}
			},
			_ => (),
		}
	}

	fn update(&mut self) {
		let scl = self.clock.line();
		let sda = self.data.line() && self.chip_sda;

		if self.scl && scl {
			if self.sda && !sda {
				self.events.push(Event::Start);
				self.phase = Phase::Receive { byte: 0, bits: 0 };
				self.addressed = false;
				self.pointer_set = false;
				self.chip_sda = true;
			} else if !self.sda && sda {
				self.events.push(Event::Stop);
				self.phase = Phase::Idle;
				self.chip_sda = true;
			}
		} else if !self.scl && scl {
			self.rising(sda);
		} else if self.scl && !scl {
			self.falling();
		}

		self.scl = scl;
		self.sda = self.data.line() && self.chip_sda;
	}

	fn pin(&mut self, line: Line) -> &mut Pin {
		match line {
			Line::Clock => &mut self.clock,
			Line::Data => &mut self.data,
		}
	}
}

impl Hardware for SimulatedChip {
	fn set_direction(&mut self, line: Line, direction: Direction) {
		self.pin(line).direction = direction;
		self.update();
	}

	fn set_level(&mut self, line: Line, high: bool) {
		self.pin(line).level = high;
		self.update();
	}

	fn read_level(&mut self, line: Line) -> bool {
		match line {
			Line::Clock => self.scl,
			Line::Data => self.sda,
		}
	}

	fn timing(&self) -> Timing {
		Timing {
			ack_polls: Some(16),
			..Timing::default()
		}
	}

	fn delay(&mut self) {
	}
}
