//! Command layer for SST25V serial flash on a bit-banged bus.
//!
//! Every instruction is a complete select → opcode → address → data →
//! deselect sequence; no addressing state is kept between calls.
use crate::bus::{Direction, FlashBus};
use crate::config::{Config, BLOCK_SIZE};
use crate::error::Error;
use crate::identification::Identification;
use bitflags::bitflags;
use core::fmt::{self, Debug};
use embedded_hal::digital::PinState;

pub struct Sst25v<B> {
    bus: B,
    config: Config,
}

impl<B> Debug for Sst25v<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sst25v")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Clone, Copy)]
pub(crate) enum Opcode {
    /// Write the 8-bit status register.
    WriteStatus = 0x01,
    ByteProgram = 0x02,
    Read = 0x03,
    /// Clear the write enable latch.
    WriteDisable = 0x04,
    /// Read the 8-bit status register.
    ReadStatus = 0x05,
    /// Set the write enable latch.
    WriteEnable = 0x06,
    ChipErase = 0x60,
    /// Read the JEDEC manufacturer/device ID.
    ReadJedecId = 0x9F,
    BlockErase = 0xD8,
}

bitflags! {
    /// Status register bits.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Status: u8 {
        /// Erase or write in progress.
        const BUSY = 1 << 0;
        /// Status of the **W**rite **E**nable **L**atch.
        const WEL = 1 << 1;
        /// The 4 block protection bits.
        const BP = 0b0011_1100;
        /// Auto address increment programming in progress.
        const AAI = 1 << 6;
        /// **B**lock **P**rotection **L**ock: makes `BP` read-only.
        const BPL = 1 << 7;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Status({=u8:#x})", self.bits())
    }
}

fn command_and_address(opcode: Opcode, addr: u32) -> [u8; 4] {
    [
        opcode as u8,
        (addr >> 16) as u8,
        (addr >> 8) as u8,
        addr as u8,
    ]
}

impl<B> Sst25v<B>
where
    B: FlashBus,
{
    /// Takes control of the bus pins and reports the initial status.
    pub fn init(bus: B, config: Config) -> Result<Self, Error<B::Error>> {
        if !config.is_valid() {
            return Err(Error::InvalidArgument);
        }
        let mut this = Self { bus, config };
        this.enable()?;
        let status = this.read_status()?;
        log_debug!("Initial status: {:?}", status);
        Ok(this)
    }

    /// Drives the bus as master: select inactive, clock idle low.
    pub fn enable(&mut self) -> Result<(), Error<B::Error>> {
        self.bus
            .set_direction(Direction::Master)
            .map_err(Error::Bus)?;
        self.bus.set_select(PinState::High).map_err(Error::Bus)?;
        self.bus.set_clock(PinState::Low).map_err(Error::Bus)?;
        Ok(())
    }

    /// Tri-states the bus so another master can use the flash.
    pub fn disable(&mut self) -> Result<(), Error<B::Error>> {
        self.bus
            .set_direction(Direction::Released)
            .map_err(Error::Bus)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Fails before any bus traffic if the range leaves the device.
    fn check_range(&self, addr: u32, len: usize) -> Result<(), Error<B::Error>> {
        if self.config.contains(addr, len) {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }

    /// Runs `f` between `select` and `deselect`. The deselect happens on
    /// every path, and a failure inside `f` wins over a deselect failure.
    fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut B) -> Result<R, Error<B::Error>>,
    ) -> Result<R, Error<B::Error>> {
        let result = self
            .bus
            .select()
            .map_err(Error::Bus)
            .and_then(|()| f(&mut self.bus));
        let deselected = self.bus.deselect().map_err(Error::Bus);
        let value = result?;
        deselected?;
        Ok(value)
    }

    /// Writes a command to the bus
    fn command(&mut self, bytes: &[u8]) -> Result<(), Error<B::Error>> {
        self.transaction(|bus| {
            for &byte in bytes {
                bus.send_byte(byte).map_err(Error::Bus)?;
            }
            Ok(())
        })
    }

    /// Writes a command to the bus and fills `response` with the bytes
    /// clocked out afterwards.
    fn command_with_response(
        &mut self,
        instruction: &[u8],
        response: &mut [u8],
    ) -> Result<(), Error<B::Error>> {
        self.transaction(|bus| {
            for &byte in instruction {
                bus.send_byte(byte).map_err(Error::Bus)?;
            }
            bus.receive_bytes(response).map_err(Error::Bus)
        })
    }

    /// Reads the status register.
    pub fn read_status(&mut self) -> Result<Status, Error<B::Error>> {
        let mut response = [0u8; 1];
        self.command_with_response(&[Opcode::ReadStatus as u8], &mut response)?;
        Ok(Status::from_bits_retain(response[0]))
    }

    pub fn is_busy(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_status()?.contains(Status::BUSY))
    }

    pub fn is_wel(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.read_status()?.contains(Status::WEL))
    }

    /// Blocks until the device is ready, watching the data-out line inside a
    /// single status transaction instead of re-reading the whole register.
    pub fn wait_until_ready(&mut self) -> Result<(), Error<B::Error>> {
        let poll = self.config.poll;
        self.transaction(|bus| {
            bus.send_byte(Opcode::ReadStatus as u8).map_err(Error::Bus)?;
            poll.poll(|| bus.read_data().map(|busy| !busy).map_err(Error::Bus))?;
            bus.receive_byte().map_err(Error::Bus)?;
            Ok(())
        })
    }

    /// Polls the full status register until BUSY clears.
    fn wait_done(&mut self) -> Result<(), Error<B::Error>> {
        let poll = self.config.poll;
        poll.poll(|| self.read_status().map(|status| !status.contains(Status::BUSY)))
    }

    /// Sets the write enable latch. Required before every program, erase and
    /// status write.
    pub fn write_enable(&mut self) -> Result<(), Error<B::Error>> {
        self.command(&[Opcode::WriteEnable as u8])
    }

    /// Clears the write enable latch.
    pub fn write_disable(&mut self) -> Result<(), Error<B::Error>> {
        self.command(&[Opcode::WriteDisable as u8])
    }

    /// Writes `value` to the status register (block protection bits).
    pub fn write_status(&mut self, value: u8) -> Result<(), Error<B::Error>> {
        self.wait_done()?;
        self.write_enable()?;
        self.command(&[Opcode::WriteStatus as u8, value])?;
        self.write_disable()
    }

    /// Reads flash contents into `buf`, starting at `addr`.
    ///
    /// The whole range must lie inside the configured capacity; nothing is
    /// sent otherwise.
    pub fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.check_range(addr, buf.len())?;
        log_trace!("read {} bytes at {:#x}", buf.len(), addr);
        self.command_with_response(&command_and_address(Opcode::Read, addr), buf)
    }

    /// Programs a single byte. The write enable latch is set first and left
    /// set afterwards; the caller waits for completion and disables writes.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), Error<B::Error>> {
        self.check_range(addr, 1)?;
        self.write_enable()?;
        let [opcode, a2, a1, a0] = command_and_address(Opcode::ByteProgram, addr);
        self.command(&[opcode, a2, a1, a0, value])
    }

    /// Programs `data` one byte at a time, waiting for each byte's internal
    /// write cycle, then clears the write enable latch.
    pub fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.check_range(addr, data.len())?;
        log_trace!("write {} bytes at {:#x}", data.len(), addr);
        self.wait_done()?;
        for (offset, &value) in (0u32..).zip(data) {
            self.write_byte(addr + offset, value)?;
            self.bus.delay_us(self.config.program_settle_us);
            self.wait_done()?;
        }
        self.write_disable()
    }

    /// Erases the 256-byte block containing `addr` to 0xFF and waits for the
    /// erase to finish.
    pub fn erase_block(&mut self, addr: u32) -> Result<(), Error<B::Error>> {
        self.check_range(addr, 1)?;
        log_trace!("erase block {:#x}", addr - addr % BLOCK_SIZE);
        self.wait_done()?;
        self.write_enable()?;
        let status = self.read_status()?;
        if !status.contains(Status::WEL) {
            log_warn!("WEL should be set: {:?}", status);
        }
        self.command(&command_and_address(Opcode::BlockErase, addr))?;
        self.wait_done()?;
        self.write_disable()
    }

    /// Sets the whole array to 0xFF and waits for the erase to finish.
    pub fn chip_erase(&mut self) -> Result<(), Error<B::Error>> {
        self.wait_done()?;
        self.write_enable()?;
        self.command(&[Opcode::ChipErase as u8])?;
        self.wait_done()?;
        self.write_disable()
    }

    /// Reads the JEDEC manufacturer/device identification.
    pub fn read_jedec_id(&mut self) -> Result<Identification, Error<B::Error>> {
        // Room for a couple of continuation codes ahead of the 3-byte ID
        let mut buf = [0u8; 6];
        self.command_with_response(&[Opcode::ReadJedecId as u8], &mut buf)?;
        Ok(Identification::from_jedec_id(&buf))
    }
}
