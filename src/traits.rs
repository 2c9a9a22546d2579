use crate::bus::FlashBus;
use crate::comms::Sst25v;
use crate::error::Error;

/// Operations a flash chip driver offers to code that does not care which
/// chip or bus it is talking to.
pub trait HardwareFlashDevice {
    type Error;

    /// Reads flash contents into `buf`, starting at `addr`.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Sets the erase block containing `addr` to the erased state of all 1s
    /// (FFh) and returns once the device is ready again.
    fn erase_block(&mut self, addr: u32) -> Result<(), Self::Error>;

    /// Programs `data` at previously erased (FFh) locations starting at
    /// `addr`.
    fn program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Sets all memory within the device to the erased state of all 1s (FFh).
    fn chip_erase(&mut self) -> Result<(), Self::Error>;
}

impl<B> HardwareFlashDevice for Sst25v<B>
where
    B: FlashBus,
{
    type Error = Error<B::Error>;

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.read_block(addr, buf)
    }

    fn erase_block(&mut self, addr: u32) -> Result<(), Self::Error> {
        Sst25v::erase_block(self, addr)
    }

    fn program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error> {
        self.write_block(addr, data)
    }

    fn chip_erase(&mut self) -> Result<(), Self::Error> {
        Sst25v::chip_erase(self)
    }
}
