use core::fmt;

/// JEDEC continuation code, repeated once per manufacturer bank.
const CONTINUATION_CODE: u8 = 0x7F;

/// Manufacturer ID assigned to SST (now Microchip).
pub const SST_MANUFACTURER_ID: u8 = 0xBF;

/// JEDEC identification returned by the Read-ID (9Fh) instruction.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identification {
    /// Number of continuation codes preceding the manufacturer ID.
    bank: u8,
    manufacturer: u8,
    device: u16,
}

impl Identification {
    /// Builds an identification from the raw bytes clocked out after 9Fh.
    ///
    /// Leading continuation codes select the manufacturer bank. Missing
    /// trailing bytes read as zero.
    pub fn from_jedec_id(buf: &[u8]) -> Self {
        let bank = buf
            .iter()
            .take_while(|&&byte| byte == CONTINUATION_CODE)
            .count();
        let rest = &buf[bank..];
        let byte = |i: usize| rest.get(i).copied().unwrap_or(0);
        Self {
            bank: bank as u8,
            manufacturer: byte(0),
            device: u16::from_be_bytes([byte(1), byte(2)]),
        }
    }

    pub fn bank(&self) -> u8 {
        self.bank
    }

    pub fn manufacturer_id(&self) -> u8 {
        self.manufacturer
    }

    /// Memory type in the high byte, capacity code in the low byte.
    pub fn device_id(&self) -> u16 {
        self.device
    }

    pub fn is_sst(&self) -> bool {
        self.bank == 0 && self.manufacturer == SST_MANUFACTURER_ID
    }
}

impl fmt::Debug for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Identification(bank {}, manufacturer {:#04x}, device {:#06x})",
            self.bank, self.manufacturer, self.device
        )
    }
}
