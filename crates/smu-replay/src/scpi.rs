//! Keithley 2450 adapter: newline-terminated SCPI over a raw TCP socket.
//!
//! Everything instrument-specific lives here: command syntax, source range,
//! compliance limit, reset settle time. The rest of the program only sees
//! the [`SourceDriver`] capability set.

use replay_core::{DriverError, SourceDriver};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ScpiConfig {
    pub addr: String,
    pub io_timeout: Duration,
    /// Source range in amperes.
    pub source_range_amps: f64,
    /// Compliance (voltage limit) in volts.
    pub voltage_limit_v: f64,
    /// Settle time after `*RST` before further configuration.
    pub reset_settle: Duration,
}

impl Default for ScpiConfig {
    fn default() -> Self {
        Self {
            addr: "10.0.0.38:5025".to_string(),
            io_timeout: Duration::from_secs(10),
            source_range_amps: 1e-3,
            voltage_limit_v: 5.0,
            reset_settle: Duration::from_secs(1),
        }
    }
}

pub struct ScpiSource {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    config: ScpiConfig,
    output_on: bool,
}

impl ScpiSource {
    pub fn connect(config: ScpiConfig) -> Result<Self, DriverError> {
        let stream = TcpStream::connect(&config.addr)?;
        stream.set_read_timeout(Some(config.io_timeout))?;
        stream.set_write_timeout(Some(config.io_timeout))?;
        let reader = BufReader::new(stream.try_clone()?);
        info!(addr = %config.addr, "connected to instrument");
        Ok(Self {
            stream,
            reader,
            config,
            output_on: false,
        })
    }

    fn write_line(&mut self, command: &str) -> Result<(), DriverError> {
        debug!(command, "scpi write");
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        Ok(())
    }

    fn query(&mut self, command: &str) -> Result<String, DriverError> {
        self.write_line(command)?;
        let mut response = String::new();
        let n = self.reader.read_line(&mut response)?;
        if n == 0 {
            return Err(DriverError::Device(format!(
                "connection closed while waiting for response to {command}"
            )));
        }
        Ok(response.trim_end().to_string())
    }
}

impl SourceDriver for ScpiSource {
    fn configure(&mut self) -> Result<(), DriverError> {
        let identity = self.query("*IDN?")?;
        info!(instrument = %identity, "instrument identified");

        self.write_line(":SYST:CLE")?;
        self.write_line("*RST")?;
        thread::sleep(self.config.reset_settle);

        self.write_line(":SOUR:FUNC CURR")?;
        self.write_line(&format!(":SOUR:CURR:RANG {}", self.config.source_range_amps))?;
        self.write_line(&format!(":SOUR:CURR:VLIM {}", self.config.voltage_limit_v))?;
        self.write_line(":SENS:FUNC \"VOLT\"")?;

        self.write_line(":OUTP ON")?;
        self.output_on = true;
        Ok(())
    }

    fn apply(&mut self, amps: f64) -> Result<(), DriverError> {
        self.write_line(&format!(":SOUR:CURR {amps}"))
    }

    fn query_status(&mut self) -> Result<String, DriverError> {
        self.query(":SYST:ERR?")
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        // Run the whole sequence even if an early step fails; report the
        // first error afterwards.
        let abort = self.write_line(":ABORT");
        let output_off = if self.output_on {
            let res = self.write_line(":OUTP OFF");
            self.output_on = false;
            res
        } else {
            Ok(())
        };
        abort.and(output_off)
    }
}
