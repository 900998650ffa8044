//! Constants used across the Li-Fi link implementation.
//!
//! Every value here is compile-time fixed and shared by both ends of the
//! optical channel. Together with the MSB-first bit order they form the
//! entire wire protocol: there is no configuration file, no runtime
//! negotiation, and no adaptive calibration. A transmitter and receiver
//! built with different values simply cannot decode each other.
//!
//! ## Key Concepts
//!
//! - **Bit period**: the time slot allotted to one data bit on the channel.
//! - **Marker durations**: how long the transmitter holds the light ON for
//!   the START and STOP markers that bracket each byte.
//! - **Marker windows**: the inclusive duration ranges the receiver accepts
//!   when classifying a measured ON pulse as a marker. The windows must not
//!   overlap each other, and neither may overlap a plausible single-bit ON
//!   pulse, or marker and data become indistinguishable.
//! - **Sampling cadence**: the fixed 10 ms tick at which every receiver and
//!   transmitter state machine in this crate is advanced.

/// Duration of one data bit slot on the optical channel, in milliseconds.
pub const BIT_PERIOD_MS: u32 = 100;

/// How long the transmitter holds the light ON for a START marker.
pub const START_FRAME_MS: u32 = 700;

/// How long the transmitter holds the light ON for a STOP marker.
pub const STOP_FRAME_MS: u32 = 1000;

/// Lower bound (inclusive) of the receiver's START classification window.
pub const START_FRAME_MIN_MS: u32 = 600;

/// Upper bound (inclusive) of the receiver's START classification window.
pub const START_FRAME_MAX_MS: u32 = 800;

/// Lower bound (inclusive) of the receiver's STOP classification window.
pub const STOP_FRAME_MIN_MS: u32 = 900;

/// Upper bound (inclusive) of the receiver's STOP classification window.
pub const STOP_FRAME_MAX_MS: u32 = 1100;

/// Sampling cadence: the sensor is polled and every state machine is
/// advanced once per this interval.
pub const SAMPLE_INTERVAL_MS: u32 = 10;

/// Safety ceiling on any single ON-duration measurement. Guarantees the
/// measurement terminates even if the channel is stuck ON; a pulse this
/// long classifies as neither marker.
pub const MEASURE_CEILING_MS: u32 = 2000;

/// How long the receiver waits for the light to come ON before giving up
/// on a START marker and settling back to idle.
pub const START_TIMEOUT_MS: u32 = 10_000;

/// How long the receiver waits for the light to come ON before giving up
/// on a STOP marker and discarding the decoded byte.
pub const STOP_TIMEOUT_MS: u32 = 2_000;

/// Settle delay after any completed or failed receive cycle before the
/// receiver re-arms and listens for the next START marker.
pub const IDLE_RETRY_MS: u32 = 500;

/// Default ADC threshold separating light ON from light OFF. Constant for
/// the lifetime of a session.
pub const DEFAULT_LIGHT_THRESHOLD: u16 = 700;

/// Number of back-to-back raw sensor reads averaged into one stabilized
/// intensity reading, to suppress high-frequency sensor/ADC noise.
pub const SENSOR_OVERSAMPLE: u32 = 10;

/// Sampler ticks per data bit slot.
pub const TICKS_PER_BIT: u32 = BIT_PERIOD_MS / SAMPLE_INTERVAL_MS;

/// Number of data bits per frame. One byte, MSB first, no parity.
pub const BITS_PER_FRAME: u8 = 8;

/// Capacity of the receiver's decoded-byte queue in `no_std` builds.
pub const RX_QUEUE_LEN: usize = 8;

/// Byte rate of the host-side UART feeding the transmitter (8N1, no flow
/// control). Documentation of the interface contract; this crate never
/// opens the UART itself.
pub const HOST_BAUD_RATE: u32 = 115_200;

// The decoder can only tell markers from data by duration, so the bands
// must stay disjoint and well clear of a single-bit pulse.
const _: () = assert!(START_FRAME_MIN_MS > BIT_PERIOD_MS);
const _: () = assert!(STOP_FRAME_MIN_MS > START_FRAME_MAX_MS);
const _: () = assert!(START_FRAME_MS >= START_FRAME_MIN_MS && START_FRAME_MS <= START_FRAME_MAX_MS);
const _: () = assert!(STOP_FRAME_MS >= STOP_FRAME_MIN_MS && STOP_FRAME_MS <= STOP_FRAME_MAX_MS);
const _: () = assert!(STOP_FRAME_MAX_MS < MEASURE_CEILING_MS);
const _: () = assert!(BIT_PERIOD_MS % SAMPLE_INTERVAL_MS == 0);
