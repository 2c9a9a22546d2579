use crate::error::Error;

/// Size of the SST25V array in bytes.
pub const FLASH_SIZE: u32 = 4_194_304;

/// Size of the erase granule addressed by the block erase command.
pub const BLOCK_SIZE: u32 = 256;

/// Largest capacity expressible with the 24-bit wire address.
pub const MAX_ADDRESSABLE: u32 = 1 << 24;

/// Bus timing used by [`GpioBus`](crate::bus::GpioBus).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Hold time after every clock edge, in nanoseconds.
    pub clock_delay_ns: u32,
    /// Settling time after chip-select transitions, in microseconds.
    pub select_delay_us: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            clock_delay_ns: 100,
            select_delay_us: 1,
        }
    }
}

/// How long to keep polling the device while it reports BUSY.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollPolicy {
    /// Give up with [`Error::DeviceTimeout`] after this many unsuccessful
    /// polls. Must be non-zero.
    Attempts(u32),
    /// Spin until the device becomes ready, however long that takes.
    Forever,
}

impl PollPolicy {
    /// Polls allowed by the default policy. [`Config::is_valid`] rejects
    /// `Attempts(0)`.
    pub const DEFAULT_ATTEMPTS: u32 = 100_000;

    /// Calls `ready` until it returns `true` or the policy is exhausted.
    pub(crate) fn poll<E>(
        self,
        mut ready: impl FnMut() -> Result<bool, Error<E>>,
    ) -> Result<(), Error<E>> {
        let mut attempts: u32 = 0;
        loop {
            if ready()? {
                return Ok(());
            }
            attempts = attempts.saturating_add(1);
            if let PollPolicy::Attempts(max) = self {
                if attempts >= max {
                    log_warn!("Flash still busy after {} polls", attempts);
                    return Err(Error::DeviceTimeout);
                }
            }
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::Attempts(Self::DEFAULT_ATTEMPTS)
    }
}

/// Driver configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Number of addressable bytes; must not exceed [`MAX_ADDRESSABLE`].
    pub capacity: u32,
    /// Delay between a byte program command and the first status poll.
    pub program_settle_us: u32,
    /// Bound applied to every busy wait.
    pub poll: PollPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: FLASH_SIZE,
            program_settle_us: 10,
            poll: PollPolicy::default(),
        }
    }
}

impl Config {
    pub fn is_valid(&self) -> bool {
        self.capacity != 0
            && self.capacity <= MAX_ADDRESSABLE
            && self.poll != PollPolicy::Attempts(0)
    }

    /// Whether `len` bytes starting at `addr` lie inside the device.
    pub fn contains(&self, addr: u32, len: usize) -> bool {
        let end = u64::from(addr) + len as u64;
        addr < self.capacity && end <= u64::from(self.capacity)
    }
}
