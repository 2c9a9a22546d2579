//! Driver for SST25V serial NOR flash wired to plain GPIO pins.
//!
//! The [`bus`] module bit-bangs the four-wire bus; [`Sst25v`] turns it into
//! device instructions.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod comms;
pub mod config;
pub mod error;
pub mod identification;
pub mod traits;

#[cfg(test)]
mod tests;

pub use bus::{Direction, DirectionControl, FlashBus, GpioBus, NoDirectionControl};
pub use comms::{Sst25v, Status};
pub use config::{Config, PollPolicy, Timing, BLOCK_SIZE, FLASH_SIZE};
pub use error::Error;
pub use identification::Identification;
pub use traits::HardwareFlashDevice;
