//! Link drivers orchestrating one byte per optical frame.
//!
//! This module provides the two top-level state machines of the link:
//! [`LifiRx`], which drives the frame synchronizer and bit decoder to turn
//! the sampled light state back into bytes, and [`LifiTx`], which holds an
//! `embedded-hal` output pin at the right level for the right number of
//! ticks to emit markers and data bits.
//!
//! Both drivers are advanced by calling [`tick()`](LifiRx::tick) once per
//! [`SAMPLE_INTERVAL_MS`](crate::consts::SAMPLE_INTERVAL_MS), from either a
//! timer ISR or a blocking delay loop (see [`crate::timer`]). Neither driver
//! ever blocks internally and neither has a cancellation path: a cycle that
//! has started runs to success, timeout, or the measurement ceiling, and the
//! next byte cycle never begins before the current one resolves.
//!
//! ## Failure model
//!
//! - A sensor read or pin write failure is a hardware fault: fatal,
//!   propagated out of `tick()` unchanged. The link cannot run without its
//!   transducer.
//! - Synchronization timeouts and out-of-window pulses are soft failures:
//!   counted, logged, and healed by settling back to idle. Nothing reaches
//!   the host transport for that cycle.
//! - A byte corrupted during the data phase while both markers survive is
//!   emitted as-is. There is no checksum; this gap is accepted by design.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use lifi_ook::driver::LifiTx;
//!
//! # let expected: Vec<PinTransaction> = [
//! #     PinState::Low,  // idle on construction
//! #     PinState::High, // START marker
//! #     PinState::Low,  // gap
//! #     PinState::Low, PinState::Low, PinState::Low, PinState::Low, // 0x00 payload
//! #     PinState::Low, PinState::Low, PinState::Low, PinState::Low,
//! #     PinState::Low,  // gap
//! #     PinState::High, // STOP marker
//! #     PinState::Low,  // idle
//! # ].iter().map(|&s| PinTransaction::set(s)).collect();
//! # let led = Pin::new(&expected);
//! let mut tx = LifiTx::new(led).unwrap();
//! assert!(tx.send(0x00));
//! while tx.is_busy() {
//!     tx.tick().unwrap(); // every 10 ms
//! }
//! assert_eq!(tx.tx_good, 1);
//! # tx.pin.done();
//! ```

use crate::codec::{BitDecoder, level_for};
use crate::consts::{
    BIT_PERIOD_MS, IDLE_RETRY_MS, SAMPLE_INTERVAL_MS, START_FRAME_MS, STOP_FRAME_MS,
};
use crate::frame::{FrameSync, SyncStatus};
use crate::sampler::{LightSampler, LightSensor};
use embedded_hal::digital::OutputPin;
use thiserror::Error;

#[cfg(not(feature = "std"))]
use crate::consts::RX_QUEUE_LEN;
#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Fatal link faults surfaced by the loop helpers in [`crate::timer`].
///
/// Soft failures (missed or malformed markers) never appear here; they are
/// absorbed by the idle retry loop and only visible in the drivers'
/// `rx_bad` counters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkError<T, H> {
    /// The light sensor or light source failed. No transducer, no link.
    #[error("transducer fault")]
    Transducer(T),
    /// The host transport failed while feeding or draining the link.
    #[error("host transport fault")]
    Host(H),
}

/// Receiver-side host transport: consumes one formatted frame per decoded
/// byte (see [`crate::codec::hex_frame`]).
///
/// Typically backed by a UART or, on hosted targets, standard output.
pub trait HostSink {
    /// Error raised by the underlying transport write.
    type Error;

    /// Writes one complete frame; partial writes are the implementer's
    /// problem to hide.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

/// Receive pipeline states, one byte per pass.
#[derive(Debug)]
enum RxState {
    /// Post-cycle settle delay before listening again.
    Settle { remaining_ms: u32 },
    /// Hunting for the START marker.
    AwaitStart(FrameSync),
    /// Inter-frame gap between START and the first bit slot.
    StartGap { remaining_ms: u32 },
    /// Decoding the 8 data bits.
    Payload(BitDecoder),
    /// Inter-frame gap between the last bit slot and STOP.
    StopGap { remaining_ms: u32, byte: u8 },
    /// Holding the decoded byte until STOP confirms the frame.
    AwaitStop { sync: FrameSync, byte: u8 },
}

/// Tick-driven Li-Fi receiver.
///
/// Owns the [`LightSampler`] exclusively; there is exactly one reader of the
/// sensor, on a single thread of control, so no locking exists anywhere in
/// the pipeline. All per-frame state is re-derived each cycle, which bounds
/// the blast radius of one corrupted frame to one byte.
///
/// Decoded bytes land in an internal queue only after their STOP marker is
/// confirmed; drain it with [`take_byte()`](LifiRx::take_byte). A cycle that
/// fails at any point queues nothing.
#[derive(Debug)]
pub struct LifiRx<S: LightSensor> {
    sampler: LightSampler<S>,
    state: RxState,
    /// Bytes decoded and confirmed, oldest first.
    #[cfg(feature = "std")]
    pending: Vec<u8>,
    /// Bytes decoded and confirmed, oldest first.
    #[cfg(not(feature = "std"))]
    pending: Vec<u8, RX_QUEUE_LEN>,
    /// Counter of fully bracketed, emitted bytes.
    pub rx_good: u16,
    /// Counter of cycles dropped for a rejected pulse or a missing STOP.
    pub rx_bad: u16,
}

impl<S: LightSensor> LifiRx<S> {
    /// Creates a receiver around `sampler`, armed and listening for START.
    pub fn new(sampler: LightSampler<S>) -> Self {
        Self {
            sampler,
            state: RxState::AwaitStart(FrameSync::start()),
            pending: Vec::new(),
            rx_good: 0,
            rx_bad: 0,
        }
    }

    /// Advances the receive state machine by one sampling tick.
    ///
    /// Call every [`SAMPLE_INTERVAL_MS`]. The sensor is only read in states
    /// that need the channel symbol; gap and settle states just consume
    /// time. A sensor fault aborts the tick and propagates unchanged.
    pub fn tick(&mut self) -> Result<(), S::Error> {
        let on = match self.state {
            RxState::AwaitStart(_) | RxState::Payload(_) | RxState::AwaitStop { .. } => {
                self.sampler.is_on()?
            }
            _ => false,
        };

        match &mut self.state {
            RxState::Settle { remaining_ms } => {
                *remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if *remaining_ms == 0 {
                    self.state = RxState::AwaitStart(FrameSync::start());
                }
            }
            RxState::AwaitStart(sync) => match sync.poll(on) {
                SyncStatus::Pending => {}
                SyncStatus::Detected => {
                    link_info!("START frame detected");
                    self.state = RxState::StartGap {
                        remaining_ms: BIT_PERIOD_MS,
                    };
                }
                SyncStatus::TimedOut => {
                    self.settle();
                }
                SyncStatus::OutOfWindow => {
                    link_warn!("pulse matched no START window");
                    self.rx_bad += 1;
                    self.settle();
                }
            },
            RxState::StartGap { remaining_ms } => {
                *remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if *remaining_ms == 0 {
                    self.state = RxState::Payload(BitDecoder::new());
                }
            }
            RxState::Payload(decoder) => {
                if let Some(byte) = decoder.poll(on) {
                    self.state = RxState::StopGap {
                        remaining_ms: BIT_PERIOD_MS,
                        byte,
                    };
                }
            }
            RxState::StopGap { remaining_ms, byte } => {
                let byte = *byte;
                *remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if *remaining_ms == 0 {
                    self.state = RxState::AwaitStop {
                        sync: FrameSync::stop(),
                        byte,
                    };
                }
            }
            RxState::AwaitStop { sync, byte } => {
                let byte = *byte;
                match sync.poll(on) {
                    SyncStatus::Pending => {}
                    SyncStatus::Detected => {
                        link_info!("received byte {:#x}", byte);
                        #[cfg(feature = "std")]
                        self.pending.push(byte);
                        // A full queue drops the byte; the host is not draining.
                        #[cfg(not(feature = "std"))]
                        let _ = self.pending.push(byte);
                        self.rx_good += 1;
                        self.settle();
                    }
                    SyncStatus::TimedOut | SyncStatus::OutOfWindow => {
                        link_warn!("no STOP marker; dropping byte");
                        self.rx_bad += 1;
                        self.settle();
                    }
                }
            }
        }
        Ok(())
    }

    fn settle(&mut self) {
        self.state = RxState::Settle {
            remaining_ms: IDLE_RETRY_MS,
        };
    }

    /// Removes and returns the oldest confirmed byte, if any.
    pub fn take_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Whether the receiver is currently inside a frame (START seen, STOP
    /// not yet resolved).
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, RxState::Settle { .. } | RxState::AwaitStart(_))
    }
}

/// Transmit pipeline states, one byte per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Idle,
    /// Byte accepted; the light comes ON at the next tick.
    Armed { byte: u8 },
    /// Holding the START marker.
    Start { byte: u8, remaining_ms: u32 },
    /// OFF gap between START and the first bit slot.
    StartGap { byte: u8, remaining_ms: u32 },
    /// Holding the current bit slot's level.
    Payload { byte: u8, bit: u8, remaining_ms: u32 },
    /// OFF gap between the last bit slot and STOP.
    StopGap { remaining_ms: u32 },
    /// Holding the STOP marker.
    Stop { remaining_ms: u32 },
}

/// Tick-driven Li-Fi transmitter.
///
/// Owns the light source pin exclusively. [`send()`](LifiTx::send) arms one
/// byte; [`tick()`](LifiTx::tick) then walks the frame: START marker, gap,
/// 8 data bits MSB first, gap, STOP marker, writing the pin once per segment
/// boundary. The light is OFF whenever the driver is idle.
#[derive(Debug)]
pub struct LifiTx<P: OutputPin> {
    /// Light source pin. ON = light = logical `1` on the channel.
    pub pin: P,
    state: TxState,
    /// Counter of fully transmitted frames.
    pub tx_good: u16,
}

impl<P: OutputPin> LifiTx<P> {
    /// Creates a transmitter around `pin`, driven LOW (light off, idle).
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?; // Ensure idle
        Ok(Self {
            pin,
            state: TxState::Idle,
            tx_good: 0,
        })
    }

    /// Arms one byte for transmission.
    ///
    /// Returns `false` without side effects while a frame is still in
    /// flight; the link is strictly one byte at a time, and retransmission
    /// is an application concern above it.
    pub fn send(&mut self, byte: u8) -> bool {
        if self.state != TxState::Idle {
            return false;
        }
        link_debug!("queued byte {:#x}", byte);
        self.state = TxState::Armed { byte };
        true
    }

    /// Whether a frame is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.state != TxState::Idle
    }

    /// Advances the transmit state machine by one sampling tick.
    ///
    /// Call every [`SAMPLE_INTERVAL_MS`]. A pin write failure aborts the
    /// tick and propagates unchanged; the frame is not resumed.
    pub fn tick(&mut self) -> Result<(), P::Error> {
        match self.state {
            TxState::Idle => {}
            TxState::Armed { byte } => {
                self.write_source(true)?;
                self.state = TxState::Start {
                    byte,
                    remaining_ms: START_FRAME_MS,
                };
            }
            TxState::Start { byte, remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if remaining_ms == 0 {
                    self.write_source(false)?;
                    self.state = TxState::StartGap {
                        byte,
                        remaining_ms: BIT_PERIOD_MS,
                    };
                } else {
                    self.state = TxState::Start { byte, remaining_ms };
                }
            }
            TxState::StartGap { byte, remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if remaining_ms == 0 {
                    self.write_source(level_for(byte, 0))?;
                    self.state = TxState::Payload {
                        byte,
                        bit: 0,
                        remaining_ms: BIT_PERIOD_MS,
                    };
                } else {
                    self.state = TxState::StartGap { byte, remaining_ms };
                }
            }
            TxState::Payload {
                byte,
                bit,
                remaining_ms,
            } => {
                let remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if remaining_ms > 0 {
                    self.state = TxState::Payload {
                        byte,
                        bit,
                        remaining_ms,
                    };
                } else if bit + 1 < 8 {
                    self.write_source(level_for(byte, bit + 1))?;
                    self.state = TxState::Payload {
                        byte,
                        bit: bit + 1,
                        remaining_ms: BIT_PERIOD_MS,
                    };
                } else {
                    self.write_source(false)?;
                    self.state = TxState::StopGap {
                        remaining_ms: BIT_PERIOD_MS,
                    };
                }
            }
            TxState::StopGap { remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if remaining_ms == 0 {
                    self.write_source(true)?;
                    self.state = TxState::Stop {
                        remaining_ms: STOP_FRAME_MS,
                    };
                } else {
                    self.state = TxState::StopGap { remaining_ms };
                }
            }
            TxState::Stop { remaining_ms } => {
                let remaining_ms = remaining_ms.saturating_sub(SAMPLE_INTERVAL_MS);
                if remaining_ms == 0 {
                    self.write_source(false)?;
                    self.tx_good += 1;
                    link_info!("transmission done");
                    self.state = TxState::Idle;
                } else {
                    self.state = TxState::Stop { remaining_ms };
                }
            }
        }
        Ok(())
    }

    fn write_source(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex_frame;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::rc::Rc;

    /// Light source double writing into a shared channel level.
    #[derive(Debug)]
    struct ChannelPin(Rc<Cell<bool>>);

    impl embedded_hal::digital::ErrorType for ChannelPin {
        type Error = Infallible;
    }

    impl OutputPin for ChannelPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    /// Photoresistor double reading the shared channel level.
    #[derive(Debug)]
    struct ChannelSensor(Rc<Cell<bool>>);

    impl LightSensor for ChannelSensor {
        type Error = Infallible;

        fn read_raw(&mut self) -> Result<u16, Infallible> {
            Ok(if self.0.get() { 1800 } else { 80 })
        }
    }

    fn rx_over(channel: &Rc<Cell<bool>>) -> LifiRx<ChannelSensor> {
        let sampler = LightSampler::new(ChannelSensor(Rc::clone(channel)), 700);
        LifiRx::new(sampler)
    }

    /// Replays a scripted channel into the receiver, one level per tick.
    fn run_script(rx: &mut LifiRx<ChannelSensor>, channel: &Rc<Cell<bool>>, script: &[bool]) {
        for &level in script {
            channel.set(level);
            rx.tick().unwrap();
        }
    }

    fn pulse(script: &mut Vec<bool>, level: bool, ticks: usize) {
        for _ in 0..ticks {
            script.push(level);
        }
    }

    #[test]
    fn round_trip_preserves_every_probed_byte() {
        let channel = Rc::new(Cell::new(false));
        let mut tx = LifiTx::new(ChannelPin(Rc::clone(&channel))).unwrap();
        let mut rx = rx_over(&channel);

        for (cycle, byte) in [0x00u8, 0xFF, 0xA5, 0x4B, 0x80, 0x01]
            .into_iter()
            .enumerate()
        {
            assert!(tx.send(byte));
            // One frame is 271 ticks; run past it plus the receiver's
            // 500 ms settle so the next cycle starts clean.
            for _ in 0..340 {
                tx.tick().unwrap();
                rx.tick().unwrap();
            }
            assert!(!tx.is_busy());
            assert_eq!(rx.take_byte(), Some(byte));
            assert_eq!(rx.take_byte(), None);
            assert_eq!(rx.rx_good, cycle as u16 + 1);
        }
        assert_eq!(tx.tx_good, 6);
        assert_eq!(rx.rx_bad, 0);
    }

    #[test]
    fn missing_stop_marker_emits_nothing() {
        let channel = Rc::new(Cell::new(false));
        let mut rx = rx_over(&channel);

        let mut script = Vec::new();
        pulse(&mut script, true, 70); // START pulse, 700 ms
        pulse(&mut script, false, 10); // gap
        pulse(&mut script, true, 80); // payload 0xFF
        pulse(&mut script, false, 10); // gap
        pulse(&mut script, false, 300); // STOP never arrives
        run_script(&mut rx, &channel, &script);

        assert_eq!(rx.take_byte(), None);
        assert_eq!(rx.rx_good, 0);
        assert_eq!(rx.rx_bad, 1);
    }

    #[test]
    fn out_of_window_pulse_is_discarded() {
        let channel = Rc::new(Cell::new(false));
        let mut rx = rx_over(&channel);

        let mut script = Vec::new();
        // 850 ms pulse: between the START and STOP windows.
        pulse(&mut script, true, 86);
        pulse(&mut script, false, 60);
        run_script(&mut rx, &channel, &script);

        assert_eq!(rx.take_byte(), None);
        assert_eq!(rx.rx_bad, 1);
        assert!(!rx.in_frame());
    }

    #[test]
    fn dark_channel_retries_idle_forever_without_output() {
        let channel = Rc::new(Cell::new(false));
        let mut rx = rx_over(&channel);

        // Two full START timeouts (10 s each) plus settle delays.
        let mut script = Vec::new();
        pulse(&mut script, false, 2200);
        run_script(&mut rx, &channel, &script);

        assert_eq!(rx.take_byte(), None);
        assert_eq!(rx.rx_good, 0);
        assert_eq!(rx.rx_bad, 0);
        assert!(!rx.in_frame());
    }

    #[test]
    fn corrupted_payload_bit_is_emitted_as_is() {
        // No checksum exists: flip one payload bit between valid markers and
        // the mangled byte still comes through.
        let channel = Rc::new(Cell::new(false));
        let mut rx = rx_over(&channel);

        let mut script = Vec::new();
        pulse(&mut script, true, 70); // START
        pulse(&mut script, false, 10);
        pulse(&mut script, true, 10); // bit 7 of 0x80...
        pulse(&mut script, false, 60); // bits 6..1 dark
        pulse(&mut script, true, 10); // ...noise sets bit 0: receiver sees 0x81
        pulse(&mut script, false, 10);
        pulse(&mut script, true, 100); // STOP
        pulse(&mut script, false, 20);
        run_script(&mut rx, &channel, &script);

        assert_eq!(rx.take_byte(), Some(0x81));
        assert_eq!(rx.rx_bad, 0);
    }

    #[test]
    fn transmit_writes_marker_and_bit_levels_in_order() {
        // 0xA5 = 10100101, MSB first on the wire.
        let expected: Vec<PinTransaction> = [
            PinState::Low,  // idle on construction
            PinState::High, // START
            PinState::Low,  // gap
            PinState::High, // bit 7
            PinState::Low,  // bit 6
            PinState::High, // bit 5
            PinState::Low,  // bit 4
            PinState::Low,  // bit 3
            PinState::High, // bit 2
            PinState::Low,  // bit 1
            PinState::High, // bit 0
            PinState::Low,  // gap
            PinState::High, // STOP
            PinState::Low,  // idle
        ]
        .iter()
        .map(|&s| PinTransaction::set(s))
        .collect();
        let pin = PinMock::new(&expected);

        let mut tx = LifiTx::new(pin).unwrap();
        assert!(tx.send(0xA5));
        assert!(tx.is_busy());

        // Armed tick + 700 ms + 100 ms + 800 ms + 100 ms + 1000 ms.
        for _ in 0..271 {
            tx.tick().unwrap();
        }

        assert!(!tx.is_busy());
        assert_eq!(tx.tx_good, 1);
        tx.pin.done();
    }

    #[test]
    fn send_refuses_while_frame_in_flight() {
        let channel = Rc::new(Cell::new(false));
        let mut tx = LifiTx::new(ChannelPin(Rc::clone(&channel))).unwrap();

        assert!(tx.send(0x10));
        assert!(!tx.send(0x20));
        for _ in 0..271 {
            tx.tick().unwrap();
        }
        assert!(tx.send(0x20));
    }

    #[test]
    fn hex_frames_for_emitted_bytes_match_host_format() {
        let channel = Rc::new(Cell::new(false));
        let mut tx = LifiTx::new(ChannelPin(Rc::clone(&channel))).unwrap();
        let mut rx = rx_over(&channel);

        assert!(tx.send(0x4B));
        for _ in 0..340 {
            tx.tick().unwrap();
            rx.tick().unwrap();
        }
        let byte = rx.take_byte().unwrap();
        assert_eq!(&hex_frame(byte), b"4B\n");
    }
}
