/// Software two-wire bus (I²C-style) driven over two GPIO lines
///
/// There is no bus controller: both lines are toggled by hand. The clock
/// line is always driven by us; the data line is driven for start/stop
/// conditions, written bits and acknowledges we send, and switched to input
/// (released, pulled up externally) whenever the device is supposed to talk.
///
/// Conditions (clock HIGH while data changes):
/// - START: data falls
/// - STOP: data rises
///
/// Data bits change while clock is LOW and are sampled on the rising clock
/// edge, most significant bit first. After each byte the receiver pulls data
/// LOW for one clock pulse (ACK) or leaves it HIGH (NACK).
///
/// Transfers:
/// - write: START, address+W, ACK, register, ACK, (data, ACK)*, STOP
/// - read: write transfer selecting the register, then START, address+R,
///   ACK, (data, ACK)* data, NACK, STOP

mod hardware;
mod low_level;
mod operations;

#[cfg(test)]
pub(crate) mod sim;

pub use self::hardware::{
	BusError,
	Direction,
	Hardware,
	Line,
	Timing,
	reliable_sleep,
};

pub use self::low_level::{
	LowLevel,
	ReadTransaction,
	Transaction,
};

pub use self::operations::{
	BusOperations,
	Reader,
};
