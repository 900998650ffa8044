//! Timer and tick-loop utilities for the Li-Fi drivers.
//!
//! Logic for setting up the sampling clock. This employs two approaches: an
//! interrupt service routine using `critical_section::with` (`timer-isr`
//! feature), or a busy-loop delay timer (`delay-loop` feature). Either way
//! the drivers are advanced once per [`crate::consts::SAMPLE_INTERVAL_MS`];
//! the 10 ms cadence is the only timing the link needs, all waiting above it
//! is counted in ticks, never blocked on.
//!
//! Contains helpers for polling- and ISR-based scheduling, including:
//! - `compute_ocr_value`: runtime OCR calculator
//! - `const_ocr_value`: compile-time OCR calculator
//! - `run_rx_loop` and `run_tx_loop`: blocking driver loops for `DelayNs`
//!   (feature `delay-loop`)
//! - `global_lifi_rx_tick` / `global_lifi_tx_tick` and the `tick_lifi_*!()`
//!   macros: interrupt-based tick callback wrappers (feature `timer-isr`)
//!
//! Common prescalers: (For use with `compute_ocr_value` and `const_ocr_value`)
//!
//! | PRESCALER | TIMER_COUNTS | Overflow Interval |
//! |-----------|--------------|-------------------|
//! |        64 |          250 |              1 ms |
//! |       256 |          125 |              2 ms |
//! |       256 |          250 |              4 ms |
//! |      1024 |          125 |              8 ms |
//! |      1024 |          250 |             16 ms |

use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// 10 data bits / second at 100 ms per bit
pub const BITS_PER_SECOND: u16 = 10;
/// (10 bits / second)^-1 == 0.1 seconds / bit
pub const SECONDS_PER_BIT: f32 = 0.1;
/// 100,000 microseconds / bit
pub const MICROSECONDS_PER_BIT: u32 = 100_000;
/// Sampling tick interval in microseconds (the 10 ms cadence)
pub const TICK_INTERVAL_US: u32 = 10_000;

/// Computes the OCR value for an AVR timer (CTC mode)
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 64, 256, 1024)
/// - `tick_us`: desired tick interval in microseconds (e.g., 10_000.0)
///
/// # Returns
/// - OCR value for OCRnA (rounds to nearest integer)
/// - Number of ticks per bit (for cross-checking against
///   [`crate::consts::TICKS_PER_BIT`])
pub fn compute_ocr_value(f_cpu: u32, prescaler: u32, tick_us: f32) -> (u16, u8) {
    let ticks_per_second: f32 = f_cpu as f32 / prescaler as f32;
    let counts_per_tick: f32 = ticks_per_second * (tick_us / 1_000_000.0);
    let ticks_per_bit: u8 = (MICROSECONDS_PER_BIT as f32 / tick_us) as u8;
    (round(counts_per_tick as f64) as u16, ticks_per_bit)
}

/// Compile-time OCR value calculator
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 64, 256, 1024)
/// - `tick_us`: desired tick interval in microseconds (e.g., 10_000)
///
/// # Returns
/// - OCR value for OCRnA (truncates; pick a prescaler that divides evenly)
/// - Number of ticks per bit
pub const fn const_ocr_value(f_cpu: u32, prescaler: u32, tick_us: u32) -> (u16, u8) {
    let counts_per_tick = (f_cpu / prescaler) as u64 * tick_us as u64 / 1_000_000;
    let ticks_per_bit = MICROSECONDS_PER_BIT / tick_us;
    (counts_per_tick as u16, ticks_per_bit as u8)
}

/// Ticks per bit for a given tick interval
///
/// # Arguments
/// - `tick_us`: desired tick interval in microseconds (e.g., 10_000.0)
pub fn ticks_per_bit(tick_us: f32) -> u8 {
    (MICROSECONDS_PER_BIT as f32 / tick_us) as u8
}

/// Compile-time ticks per bit for a given tick interval
///
/// # Arguments
/// - `tick_us`: desired tick interval in microseconds (e.g., 10_000)
pub const fn const_ticks_per_bit(tick_us: u32) -> u8 {
    (MICROSECONDS_PER_BIT / tick_us) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICKS_PER_BIT;

    #[test]
    fn ocr_for_sixteen_mhz_at_1024_prescale() {
        // 16 MHz / 1024 = 15625 counts/s; 10 ms tick = 156.25 counts.
        let (ocr, tpb) = compute_ocr_value(16_000_000, 1024, 10_000.0);
        assert_eq!(ocr, 156);
        assert_eq!(u32::from(tpb), TICKS_PER_BIT);

        let (const_ocr, const_tpb) = const_ocr_value(16_000_000, 1024, 10_000);
        assert_eq!(const_ocr, 156);
        assert_eq!(const_tpb, tpb);
    }

    #[test]
    fn ticks_per_bit_matches_wire_constants() {
        assert_eq!(ticks_per_bit(10_000.0), 10);
        assert_eq!(const_ticks_per_bit(10_000), 10);
    }
}
