use super::{
	Hardware,
	LowLevel,
	low_level::ReadTransaction,
};

const READ: u8 = 0x01;
const WRITE: u8 = 0x00;

fn address_byte(address: u8, rw: u8) -> u8 {
	(address << 1) | rw
}

/// Sequential bytes from a burst read; the last byte is answered with NACK
pub struct Reader<'a, H: Hardware + ?Sized + 'a> {
	remaining: usize,
	transaction: ReadTransaction<'a, H>,
}

impl<'a, H: Hardware + ?Sized> Reader<'a, H> {
	pub fn remaining(&self) -> usize {
		self.remaining
	}
}

impl<'a, H: Hardware + ?Sized> Iterator for Reader<'a, H> {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		if 0 == self.remaining {
			return None;
		}
		self.remaining -= 1;
		Some(self.transaction.receive_byte(self.remaining > 0))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'a, H: Hardware + ?Sized> ExactSizeIterator for Reader<'a, H> {
}

impl<'a, H: Hardware + ?Sized> Drop for Reader<'a, H> {
	fn drop(&mut self) {
		// the device is still sending; it only lets go of the data line
		// after a NACK
		if self.remaining > 0 {
			self.remaining = 0;
			self.transaction.receive_byte(false);
		}
	}
}

pub trait BusOperations: LowLevel {
	// write transfer consisting only of the register pointer
	fn select_register(&mut self, address: u8, register: u8) -> crate::AResult<()> {
		let mut tx = self.start_transaction(address_byte(address, WRITE))?;
		tx.send_byte(register)
	}

	fn read_register(&mut self, address: u8, register: u8) -> crate::AResult<u8> {
		with_context!(("read register 0x{:02x}", register), {
			self.select_register(address, register)?;
			let mut tx = self.start_transaction(address_byte(address, READ))?.start_receive();
			let value = tx.receive_byte(false);
			debug!("register 0x{:02x} -> 0x{:02x}", register, value);
			Ok(value)
		})
	}

	fn write_register(&mut self, address: u8, register: u8, value: u8) -> crate::AResult<()> {
		with_context!(("write register 0x{:02x}", register), {
			debug!("register 0x{:02x} <- 0x{:02x}", register, value);
			let mut tx = self.start_transaction(address_byte(address, WRITE))?;
			tx.send_byte(register)?;
			tx.send_byte(value)
		})
	}

	// `count` must not be zero: a read address is always followed by at
	// least one byte from the device
	fn read_burst(&mut self, address: u8, register: u8, count: usize) -> crate::AResult<Reader<Self>> {
		ensure!(count > 0, "burst read needs at least one byte");
		self.select_register(address, register)?;
		let transaction = self.start_transaction(address_byte(address, READ))?.start_receive();

		Ok(Reader {
			remaining: count,
			transaction,
		})
	}

	fn read_registers(&mut self, address: u8, register: u8, target: &mut [u8]) -> crate::AResult<()> {
		with_context!(("burst read {} bytes from register 0x{:02x}", target.len(), register), {
			let reader = self.read_burst(address, register, target.len())?;
			for (t, value) in target.iter_mut().zip(reader) {
				*t = value;
			}
			debug!("registers 0x{:02x}.. -> {:02x?}", register, target);
			Ok(())
		})
	}

	fn write_registers(&mut self, address: u8, register: u8, data: &[u8]) -> crate::AResult<()> {
		with_context!(("burst write {} bytes to register 0x{:02x}", data.len(), register), {
			debug!("registers 0x{:02x}.. <- {:02x?}", register, data);
			let mut tx = self.start_transaction(address_byte(address, WRITE))?;
			tx.send_byte(register)?;
			for b in data {
				tx.send_byte(*b)?;
			}
			Ok(())
		})
	}
}

impl<H: Hardware + ?Sized> BusOperations for H {
}

#[cfg(test)]
mod test {
	use super::BusOperations;
	use crate::wire::BusError;
	use crate::wire::sim::{
		ADDRESS,
		Event,
		SimulatedChip,
	};

	fn check_no_acknowledge(e: &failure::Error) {
		match e.find_root_cause().downcast_ref::<BusError>() {
			Some(BusError::NoAcknowledge { polls }) => assert_eq!(*polls, 16),
			None => panic!("expected NoAcknowledge, got: {}", e),
		}
	}

	#[test]
	fn write_registers_framing() {
		let mut chip = SimulatedChip::new();
		chip.write_registers(ADDRESS, 0x10, &[0x01, 0x02, 0x03]).unwrap();

		assert_eq!(chip.events, vec![
			Event::Start,
			Event::Address(0xd0),
			Event::Pointer(0x10),
			Event::Written(0x01),
			Event::Written(0x02),
			Event::Written(0x03),
			Event::Stop,
		]);
		assert_eq!(&chip.registers[0x10..0x13], &[0x01, 0x02, 0x03]);
		assert!(chip.is_idle());
	}

	#[test]
	fn read_register_framing() {
		let mut chip = SimulatedChip::with_registers(&[(0x07, 0x93)]);
		assert_eq!(chip.read_register(ADDRESS, 0x07).unwrap(), 0x93);

		assert_eq!(chip.events, vec![
			Event::Start,
			Event::Address(0xd0),
			Event::Pointer(0x07),
			Event::Stop,
			Event::Start,
			Event::Address(0xd1),
			Event::MasterAck(false),
			Event::Stop,
		]);
		assert!(chip.is_idle());
	}

	#[test]
	fn burst_read_acknowledges_all_but_last() {
		let mut chip = SimulatedChip::new();
		for i in 0..8 {
			chip.registers[i] = 0xa0 | i as u8;
		}
		let mut buf = [0u8; 8];
		chip.read_registers(ADDRESS, 0, &mut buf).unwrap();

		assert_eq!(buf, [0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7]);
		assert_eq!(chip.master_acks(), vec![true, true, true, true, true, true, true, false]);
		assert!(chip.is_idle());
	}

	#[test]
	fn burst_read_wraps_register_pointer() {
		let mut chip = SimulatedChip::with_registers(&[(0x3f, 0x11), (0x00, 0x22)]);
		let mut buf = [0u8; 2];
		chip.read_registers(ADDRESS, 0x3f, &mut buf).unwrap();
		assert_eq!(buf, [0x11, 0x22]);
	}

	#[test]
	fn dropped_reader_terminates_transfer() {
		let mut chip = SimulatedChip::new();
		{
			let mut reader = chip.read_burst(ADDRESS, 0x08, 4).unwrap();
			assert_eq!(reader.next(), Some(0));
			assert_eq!(reader.remaining(), 3);
		}
		assert_eq!(chip.master_acks(), vec![true, false]);
		assert_eq!(chip.events.last(), Some(&Event::Stop));
		assert!(chip.is_idle());

		// bus still usable
		chip.write_registers(ADDRESS, 0x08, &[0x55]).unwrap();
		assert_eq!(chip.registers[0x08], 0x55);
	}

	#[test]
	fn empty_burst_read_rejected() {
		let mut chip = SimulatedChip::new();
		assert!(chip.read_burst(ADDRESS, 0, 0).is_err());
		assert!(chip.events.is_empty());
	}

	#[test]
	fn absent_device_times_out() {
		let mut chip = SimulatedChip::absent();
		let e = chip.read_register(ADDRESS, 0).unwrap_err();
		check_no_acknowledge(&e);
		assert!(e.to_string().starts_with("read register 0x00"), "unexpected message: {}", e);
		assert_eq!(chip.events, vec![Event::Start, Event::Address(0xd0), Event::Stop]);
		assert!(chip.is_idle());

		let e = chip.write_registers(ADDRESS, 0x08, &[1, 2]).unwrap_err();
		check_no_acknowledge(&e);
		assert!(chip.is_idle());
	}

	#[test]
	fn wrong_address_not_acknowledged() {
		let mut chip = SimulatedChip::new();
		let e = chip.write_register(0x50, 0x00, 0x12).unwrap_err();
		check_no_acknowledge(&e);
		assert_eq!(chip.registers[0], 0);
	}
}
