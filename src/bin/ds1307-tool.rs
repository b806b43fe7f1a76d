#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate ds1307_softwire;
use ds1307_softwire::*;

use std::io::{
	self,
	Read,
};
use std::process::exit;
use std::time::Duration;

use chrono::Utc;

use ds1307_softwire::ds1307::SquareWaveRate;
use ds1307_softwire::gpio::GpioPin;
use ds1307_softwire::wire::{
	Hardware,
	Timing,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

// decimal or 0x-prefixed hex
fn get_byte(matches: &clap::ArgMatches, name: &str) -> AResult<u8> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	let parsed = if param.starts_with("0x") || param.starts_with("0X") {
		u8::from_str_radix(&param[2..], 16)
	} else {
		param.parse::<u8>()
	};
	parsed.map_err(|e| format_err!("invalid paramater {}: {}", name, e))
}

fn get_switch(matches: &clap::ArgMatches, name: &str) -> AResult<bool> {
	match matches.value_of(name) {
		Some("on") | Some("1") | Some("true") => Ok(true),
		Some("off") | Some("0") | Some("false") => Ok(false),
		Some(v) => bail!("invalid paramater {}: {:?} (expected on or off)", name, v),
		None => bail!("missing parameter {}", name),
	}
}

fn timing(matches: &clap::ArgMatches) -> AResult<Timing> {
	let mut timing = Timing::default();
	if matches.is_present("ack_polls") {
		let polls: u32 = get_param(matches, "ack_polls")?;
		timing.ack_polls = if 0 == polls { None } else { Some(polls) };
	}
	if matches.is_present("edge_us") {
		let edge: u64 = get_param(matches, "edge_us")?;
		timing.clock_edge = Duration::from_micros(edge);
	}
	Ok(timing)
}

fn status<H: Hardware>(rtc: &mut Ds1307<H>) -> AResult<()> {
	let snapshot = rtc.read_snapshot()?;
	let halted = rtc.is_halted()?;
	let control = rtc.read_control()?;
	println!("time:        {}", snapshot);
	println!("day of week: {}", snapshot.day_of_week);
	println!("running:     {}", if halted { "no (halted)" } else { "yes" });
	println!("control:     {:?}", control);
	Ok(())
}

fn dump_ram<H: Hardware>(rtc: &mut Ds1307<H>) -> AResult<()> {
	let region = rtc.read_scratch_region()?;
	for (address, value) in region.iter().enumerate() {
		println!("@{:02x}: {:02x}", address, value);
	}
	Ok(())
}

fn load_ram<H: Hardware>(rtc: &mut Ds1307<H>) -> AResult<()> {
	let mut region = ScratchRegion::default();
	io::stdin().read_exact(&mut region.cells).map_err(|e| {
		format_err!("couldn't read {} bytes from stdin: {}", region.cells.len(), e)
	})?;
	rtc.write_scratch_region(&region)?;
	let verify = rtc.read_scratch_region()?;
	ensure!(verify == region, "Verify failed: RAM content differs after write");
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg clock: -c --clock +takes_value +required "GPIO pin for the clock line (SCL)")
		(@arg data: -d --data +takes_value +required "GPIO pin for the data line (SDA)")
		(@arg ack_polls: --ack_polls +takes_value "polls before giving up on ACK (0: wait forever)")
		(@arg edge_us: --edge_us +takes_value "microseconds per clock edge (default 5)")
		(@subcommand get =>
			(about: "show current time")
		)
		(@subcommand status =>
			(about: "show time, halt flag and control register")
		)
		(@subcommand set_time =>
			(about: "set time of day")
			(@arg HOUR: +required "hour (0-23)")
			(@arg MINUTE: +required "minute (0-59)")
			(@arg SECOND: +required "second (0-59)")
		)
		(@subcommand set_date =>
			(about: "set date")
			(@arg DATE: +required "day of month (1-31)")
			(@arg MONTH: +required "month (1-12)")
			(@arg YEAR: +required "year (2000-2999)")
		)
		(@subcommand set_dow =>
			(about: "set day of week")
			(@arg DOW: +required "day of week (1-7)")
		)
		(@subcommand set_now =>
			(about: "set time, date and day of week from system clock (UTC)")
		)
		(@subcommand halt =>
			(about: "stop or start the oscillator")
			(@arg STATE: +required "on (halted) or off (running)")
		)
		(@subcommand output =>
			(about: "SQW/OUT pin level while square wave is disabled")
			(@arg STATE: +required "on or off")
		)
		(@subcommand sqw =>
			(about: "enable square wave output")
			(@arg STATE: +required "on or off")
		)
		(@subcommand sqw_rate =>
			(about: "set square wave rate")
			(@arg RATE: +required "0-3, 1hz, 4khz, 8khz or 32khz")
		)
		(@subcommand peek =>
			(about: "read byte from RAM")
			(@arg ADDRESS: +required "RAM address (0-55)")
		)
		(@subcommand poke =>
			(about: "write byte to RAM")
			(@arg ADDRESS: +required "RAM address (0-55)")
			(@arg VALUE: +required "byte value")
		)
		(@subcommand dump_ram =>
			(about: "dump RAM")
		)
		(@subcommand load_ram =>
			(about: "write 56 bytes from stdin to RAM")
		)
	).get_matches();

	let clock: GpioPin = get_param(&matches, "clock")?;
	let data: GpioPin = get_param(&matches, "data")?;
	let lines = gpio::open_gpiomem(clock, data, timing(&matches)?)?;
	let mut rtc = Ds1307::new(lines);

	match matches.subcommand() {
		("get", _) => {
			let snapshot = rtc.read_snapshot()?;
			println!("{}", snapshot);
			Ok(())
		},
		("status", _) => {
			status(&mut rtc)
		},
		("set_time", Some(sub_m)) => {
			let hour = get_param(sub_m, "HOUR")?;
			let minute = get_param(sub_m, "MINUTE")?;
			let second = get_param(sub_m, "SECOND")?;
			rtc.write_time(hour, minute, second)
		},
		("set_date", Some(sub_m)) => {
			let date = get_param(sub_m, "DATE")?;
			let month = get_param(sub_m, "MONTH")?;
			let year = get_param(sub_m, "YEAR")?;
			rtc.write_date(date, month, year)
		},
		("set_dow", Some(sub_m)) => {
			rtc.write_day_of_week(get_param(sub_m, "DOW")?)
		},
		("set_now", _) => {
			let snapshot = ClockSnapshot::from_datetime(&Utc::now());
			info!("Setting clock to {} (day of week {})", snapshot, snapshot.day_of_week);
			rtc.write_snapshot(&snapshot)
		},
		("halt", Some(sub_m)) => {
			rtc.set_halt(get_switch(sub_m, "STATE")?)
		},
		("output", Some(sub_m)) => {
			rtc.set_output_level(get_switch(sub_m, "STATE")?)
		},
		("sqw", Some(sub_m)) => {
			rtc.set_square_wave_enabled(get_switch(sub_m, "STATE")?)
		},
		("sqw_rate", Some(sub_m)) => {
			let rate: SquareWaveRate = get_param(sub_m, "RATE")?;
			rtc.set_square_wave_rate(rate)
		},
		("peek", Some(sub_m)) => {
			let address = get_byte(sub_m, "ADDRESS")?;
			ensure!((address as usize) < ds1307::SCRATCH_SIZE, "RAM address out of range: {}", address);
			println!("@{:02x}: {:02x}", address, rtc.read_scratch_byte(address)?);
			Ok(())
		},
		("poke", Some(sub_m)) => {
			let address = get_byte(sub_m, "ADDRESS")?;
			ensure!((address as usize) < ds1307::SCRATCH_SIZE, "RAM address out of range: {}", address);
			rtc.write_scratch_byte(address, get_byte(sub_m, "VALUE")?)
		},
		("dump_ram", _) => {
			dump_ram(&mut rtc)
		},
		("load_ram", _) => {
			load_ram(&mut rtc)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
