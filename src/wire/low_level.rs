use std::ops::{
	Deref,
	DerefMut,
};

use super::{
	BusError,
	Direction,
	Hardware,
	Line,
};

pub struct Transaction<'a, H: ?Sized+LowLevel+'a>(&'a mut H);

impl<'a, H: ?Sized+LowLevel> Transaction<'a, H> {
	// the device transmits after acknowledging a read address; from here on
	// every byte must be followed by ACK or NACK from our side
	pub fn start_receive(self) -> ReadTransaction<'a, H> {
		ReadTransaction(self)
	}
}

impl<'a, H: ?Sized+LowLevel> Drop for Transaction<'a, H> {
	fn drop(&mut self) {
		self.0._send_stop();
	}
}

impl<'a, H: ?Sized+LowLevel> Deref for Transaction<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<'a, H: ?Sized+LowLevel> DerefMut for Transaction<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

pub struct ReadTransaction<'a, H: ?Sized+LowLevel+'a>(Transaction<'a, H>);

impl<'a, H: ?Sized+LowLevel> ReadTransaction<'a, H> {
	// read byte and tell device whether we want another one
	pub fn receive_byte(&mut self, more: bool) -> u8 {
		let value = self.read_byte();
		if more {
			self.send_ack();
		} else {
			self.send_nack();
		}
		value
	}
}

impl<'a, H: ?Sized+LowLevel> Deref for ReadTransaction<'a, H> {
	type Target = H;

	fn deref(&self) -> &Self::Target {
		&(self.0).0
	}
}

impl<'a, H: ?Sized+LowLevel> DerefMut for ReadTransaction<'a, H> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut (self.0).0
	}
}

trait InternalLowLevel: Hardware {
	// set level while CLK is low, then switch to output; switching first
	// would drive a stale level
	fn drive_data(&mut self, high: bool) {
		self.set_level(Line::Data, high);
		self.set_direction(Line::Data, Direction::Output);
	}

	fn release_data(&mut self) {
		self.set_direction(Line::Data, Direction::Input);
	}

	// one full CLK pulse; CLK is low before and after
	fn clock_pulse(&mut self) {
		self.set_level(Line::Clock, true);
		self.delay(); // wait for device reading the pins
		self.set_level(Line::Clock, false);
		self.delay();
	}

	// data is expected to be driven already
	fn signal(&mut self, high: bool) {
		self.drive_data(high);
		self.delay(); // wait for pins to be stable
		self.clock_pulse();
	}

	// bus idle: both lines high; data falls while CLK is high
	fn _send_start(&mut self) {
		trace!("START");
		self.drive_data(true);
		self.set_level(Line::Clock, true);
		self.set_direction(Line::Clock, Direction::Output);
		self.delay();
		self.set_level(Line::Data, false);
		self.delay();
		self.set_level(Line::Clock, false);
		self.delay();
	}

	// data rises while CLK is high; leaves the bus idle
	fn _send_stop(&mut self) {
		trace!("STOP");
		self.drive_data(false);
		self.delay();
		self.set_level(Line::Clock, true);
		self.delay();
		self.set_level(Line::Data, true);
		self.delay();
		self.release_data();
	}
}

impl<H: Hardware+?Sized> InternalLowLevel for H {
}

pub trait LowLevel: Hardware {
	fn write_bit(&mut self, bit: bool) {
		self.signal(bit);
	}

	// release data, sample it while CLK is high
	fn read_bit(&mut self) -> bool {
		self.release_data();
		self.set_level(Line::Clock, true);
		self.delay();
		let bit = self.read_level(Line::Data);
		self.set_level(Line::Clock, false);
		self.delay();
		bit
	}

	fn write_byte(&mut self, value: u8) {
		for bit in (0..8).rev() {
			self.write_bit(0 != value & (1 << bit));
		}
	}

	fn read_byte(&mut self) -> u8 {
		let mut value = 0u8;
		for bit in (0..8).rev() {
			if self.read_bit() {
				value |= 1 << bit;
			}
		}
		value
	}

	fn send_ack(&mut self) {
		self.set_level(Line::Clock, false);
		self.signal(false);
		self.release_data();
	}

	fn send_nack(&mut self) {
		self.set_level(Line::Clock, false);
		self.signal(true);
		self.release_data();
	}

	// device pulls data low for the ninth clock pulse of a byte we wrote
	fn wait_for_ack(&mut self) -> crate::AResult<()> {
		self.release_data();
		self.set_level(Line::Clock, true);
		self.delay();
		let limit = self.timing().ack_polls;
		let mut polls = 0u32;
		while self.read_level(Line::Data) {
			polls += 1;
			if let Some(limit) = limit {
				if polls >= limit {
					self.set_level(Line::Clock, false);
					self.delay();
					return Err(BusError::NoAcknowledge { polls }.into());
				}
			}
			self.delay();
		}
		self.set_level(Line::Clock, false);
		self.delay();
		Ok(())
	}

	// START followed by the address byte (7-bit address and R/W bit)
	fn send_start(&mut self, address_byte: u8) {
		self._send_start();
		self.write_byte(address_byte);
	}

	fn send_stop(&mut self) {
		self._send_stop();
	}

	// STOP is sent when the transaction is dropped, even if the address
	// wasn't acknowledged
	fn start_transaction(&mut self, address_byte: u8) -> crate::AResult<Transaction<Self>> {
		self.send_start(address_byte);
		let mut tx = Transaction(self);
		tx.wait_for_ack()?;
		Ok(tx)
	}

	// write byte and wait for the device to acknowledge it
	fn send_byte(&mut self, value: u8) -> crate::AResult<()> {
		self.write_byte(value);
		self.wait_for_ack()
	}
}

impl<H: Hardware+?Sized> LowLevel for H {
}
