//! Bit-banged four-wire bus.
//!
//! The device latches data-in on the rising clock edge and shifts data-out
//! so that it can be sampled while the clock is high. The clock idles low and
//! chip-select is active low. All transfers are MSB first.
use crate::config::Timing;
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin, PinState};

/// Electrical mode of the bus pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Select, clock and data-in are driven by this controller.
    Master,
    /// The pins are tri-stated so another bus master can take over.
    Released,
}

/// Line-level access to the flash bus plus the primitives built on top of it.
///
/// Implementors only provide the raw line operations and delays; `select`,
/// `deselect` and the byte transfers are shared.
pub trait FlashBus {
    type Error;

    fn set_select(&mut self, state: PinState) -> Result<(), Self::Error>;
    fn set_clock(&mut self, state: PinState) -> Result<(), Self::Error>;
    fn set_data(&mut self, state: PinState) -> Result<(), Self::Error>;
    /// Samples the device's data-out line. `true` means high.
    fn read_data(&mut self) -> Result<bool, Self::Error>;
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Hold time after each clock edge.
    fn clock_delay(&mut self);
    /// Settling time around chip-select transitions.
    fn select_delay(&mut self);
    fn delay_us(&mut self, us: u32);

    /// Drives chip-select active. The clock is brought low first so the
    /// device sees a clean idle state.
    fn select(&mut self) -> Result<(), Self::Error> {
        self.set_clock(PinState::Low)?;
        self.set_select(PinState::Low)?;
        self.select_delay();
        Ok(())
    }

    /// Ends the transaction opened by [`select`](FlashBus::select).
    fn deselect(&mut self) -> Result<(), Self::Error> {
        self.set_select(PinState::High)?;
        self.set_clock(PinState::Low)?;
        self.select_delay();
        Ok(())
    }

    fn send_byte(&mut self, value: u8) -> Result<(), Self::Error> {
        for bit in (0..8).rev() {
            self.set_data(PinState::from(value & (1 << bit) != 0))?;
            self.set_clock(PinState::High)?;
            self.clock_delay();
            self.set_clock(PinState::Low)?;
            self.clock_delay();
        }
        Ok(())
    }

    /// Clocks in one byte. Must follow a send with the clock idle low.
    fn receive_byte(&mut self) -> Result<u8, Self::Error> {
        let mut value = 0u8;
        for _ in 0..8 {
            self.set_clock(PinState::High)?;
            self.clock_delay();
            value = (value << 1) | u8::from(self.read_data()?);
            self.set_clock(PinState::Low)?;
            self.clock_delay();
        }
        Ok(value)
    }

    /// Burst read following a read command's address phase.
    fn receive_bytes(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buf.iter_mut() {
            *byte = self.receive_byte()?;
        }
        Ok(())
    }
}

/// Switches the bus pins between driven and tri-stated.
///
/// Generic over the error type so it can share the pins' error.
pub trait DirectionControl<E> {
    fn set_direction(&mut self, direction: Direction) -> Result<(), E>;
}

/// For boards where the flash pins are never handed to another master.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDirectionControl;

impl<E> DirectionControl<E> for NoDirectionControl {
    fn set_direction(&mut self, _direction: Direction) -> Result<(), E> {
        Ok(())
    }
}

/// [`FlashBus`] over embedded-hal GPIO pins and a delay provider.
pub struct GpioBus<CS, CLK, DI, DO, DIR, D> {
    select: CS,
    clock: CLK,
    data_in: DI,
    data_out: DO,
    direction: DIR,
    delay: D,
    timing: Timing,
}

impl<CS, CLK, DI, DO, DIR, D> Debug for GpioBus<CS, CLK, DI, DO, DIR, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioBus")
            .field("timing", &self.timing)
            .finish()
    }
}

impl<CS, CLK, DI, DO, DIR, D> GpioBus<CS, CLK, DI, DO, DIR, D> {
    /// `data_in` is the device's SI pin (driven by us), `data_out` its SO pin.
    pub fn new(
        select: CS,
        clock: CLK,
        data_in: DI,
        data_out: DO,
        direction: DIR,
        delay: D,
        timing: Timing,
    ) -> Self {
        Self {
            select,
            clock,
            data_in,
            data_out,
            direction,
            delay,
            timing,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Gives the pins and delay back.
    pub fn free(self) -> (CS, CLK, DI, DO, DIR, D) {
        (
            self.select,
            self.clock,
            self.data_in,
            self.data_out,
            self.direction,
            self.delay,
        )
    }
}

impl<E, CS, CLK, DI, DO, DIR, D> FlashBus for GpioBus<CS, CLK, DI, DO, DIR, D>
where
    CS: OutputPin<Error = E>,
    CLK: OutputPin<Error = E>,
    DI: OutputPin<Error = E>,
    DO: InputPin<Error = E>,
    DIR: DirectionControl<E>,
    D: DelayNs,
{
    type Error = E;

    fn set_select(&mut self, state: PinState) -> Result<(), E> {
        self.select.set_state(state)
    }

    fn set_clock(&mut self, state: PinState) -> Result<(), E> {
        self.clock.set_state(state)
    }

    fn set_data(&mut self, state: PinState) -> Result<(), E> {
        self.data_in.set_state(state)
    }

    fn read_data(&mut self) -> Result<bool, E> {
        self.data_out.is_high()
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), E> {
        self.direction.set_direction(direction)
    }

    fn clock_delay(&mut self) {
        self.delay.delay_ns(self.timing.clock_delay_ns);
    }

    fn select_delay(&mut self) {
        self.delay.delay_us(self.timing.select_delay_us);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
