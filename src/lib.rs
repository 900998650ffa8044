//! # lifi-ook
//!
//! A portable, no_std Rust driver for one-byte-at-a-time Li-Fi links built from
//! a visible light source (LED) on the transmitting side and a photoresistor
//! (LDR) behind an ADC on the receiving side.
//!
//! This driver implements a software OOK (on-off keying) link using:
//! - `embedded-hal` traits for the light source pin and timing
//! - a crate-defined [`sampler::LightSensor`] trait for the intensity read
//! - duration-coded START/STOP markers to delimit each byte on the channel
//! - tick-driven state machines advanced at a fixed 10 ms sampling cadence
//! - optional tick sources using either timer interrupts or blocking delay
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support and replaces `heapless::Vec`s with
//! `std::vec::Vec`s |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` for tick timing |
//! | `timer-isr` (default) | Uses `critical_section::with` for tick timing |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Link protocol
//!
//! A byte is transmitted as a single frame with no side channel for
//! synchronization. Markers and data bits are told apart purely by how long
//! the light stays on:
//!
//! ```text
//! [START: 700 ms ON][100 ms OFF][8 data bits, 100 ms each, MSB first][100 ms OFF][STOP: 1000 ms ON]
//! ```
//!
//! The receiver classifies a sustained ON pulse as START when its measured
//! duration falls in 600–800 ms and as STOP in 900–1100 ms (bounds inclusive).
//! Anything else is rejected and the receiver resynchronizes from idle. Data
//! bits are sampled mid-slot, which tolerates edge jitter of up to roughly
//! half a bit period. There is no checksum; a byte only reaches the host when
//! both markers bracket it.
//!
//! ## Usage
//!
//! ```ignore
//! use lifi_ook::driver::{LifiRx, LifiTx};
//! use lifi_ook::sampler::LightSampler;
//!
//! let mut rx = LifiRx::new(LightSampler::new(sensor, 700));
//! loop {
//!     rx.tick()?; // Call every 10 ms
//!     if let Some(byte) = rx.take_byte() {
//!         // forward to the host transport
//!     }
//! }
//! ```
//!
//! Or, use the blocking loop helpers with a `DelayNs` implementation:
//!
//! ```ignore
//! lifi_ook::timer::run_rx_loop(&mut rx, &mut delay, &mut host)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Both ends must agree on the timing constants in [`consts`] or decoding
//!   fails; they act as an implicit wire protocol.
//! - The host transport is a seam, not something this crate owns: the
//!   transmitter pulls one raw byte at a time through an [`nb`]-style closure
//!   (typically a UART at 115200 8N1), and the receiver pushes two uppercase
//!   hex characters plus a newline per decoded byte.
//! - Only one driver instance per transducer should be active at a time in
//!   interrupt-driven mode.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

#[cfg(not(feature = "std"))]
pub use heapless;

#[macro_use]
mod fmt;

pub mod codec;
pub mod consts;
pub mod driver;
pub mod frame;
pub mod sampler;
pub mod timer;
