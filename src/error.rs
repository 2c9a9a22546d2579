use core::fmt::{self, Debug};

/// The error type used by this library.
///
/// This can encapsulate a failure of the underlying bus pins, and adds its
/// own protocol errors on top of that.
pub enum Error<E> {
    /// A pin of the bit-banged bus could not be driven or sampled.
    Bus(E),
    /// The device kept reporting BUSY until the poll policy gave up.
    DeviceTimeout,
    /// The address or length lies outside the device, or the configured
    /// capacity cannot be expressed with a 24-bit address.
    InvalidArgument,
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Bus(_bus) => defmt::write!(fmt, "Error::Bus"),
            Error::DeviceTimeout => defmt::write!(fmt, "Error::DeviceTimeout"),
            Error::InvalidArgument => defmt::write!(fmt, "Error::InvalidArgument"),
        }
    }
}

impl<E> Debug for Error<E>
where
    E: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(bus) => write!(f, "Error::Bus({:?})", bus),
            Error::DeviceTimeout => f.write_str("Error::DeviceTimeout"),
            Error::InvalidArgument => f.write_str("Error::InvalidArgument"),
        }
    }
}
