//! Bit-level encode/decode for the 8 data bits of a frame.
//!
//! A byte travels MSB first: the first bit slot on the channel carries bit 7
//! and the last carries bit 0, so encoder and decoder agree on order by
//! construction. Each bit occupies one fixed [`BIT_PERIOD_MS`] slot; the
//! transmitter holds the light at the bit's level for the whole slot, and
//! the receiver latches its sample at mid-slot, tolerating edge jitter of up
//! to roughly half a bit period on either side.
//!
//! There is no parity and no checksum. A bit flipped by channel noise during
//! the data phase is undetectable here by design; the markers bracket the
//! byte, nothing validates its content.

use crate::consts::{BITS_PER_FRAME, TICKS_PER_BIT};

/// The level the transmitter holds during bit slot `index` of `byte`.
///
/// Slot 0 carries the most significant bit.
pub const fn level_for(byte: u8, index: u8) -> bool {
    (byte >> (BITS_PER_FRAME - 1 - index)) & 1 != 0
}

/// Walks a byte's bit slots in wire order, yielding the level to hold for
/// one full [`BIT_PERIOD_MS`] each.
///
/// ```
/// use lifi_ook::codec::BitEncoder;
///
/// let levels: Vec<bool> = BitEncoder::new(0xA5).collect();
/// assert_eq!(
///     levels,
///     [true, false, true, false, false, true, false, true]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct BitEncoder {
    byte: u8,
    index: u8,
}

impl BitEncoder {
    /// Encoder over the 8 bit slots of `byte`, MSB first.
    pub fn new(byte: u8) -> Self {
        Self { byte, index: 0 }
    }
}

impl Iterator for BitEncoder {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.index >= BITS_PER_FRAME {
            return None;
        }
        let level = level_for(self.byte, self.index);
        self.index += 1;
        Some(level)
    }
}

/// Tick-driven decoder for the 8-bit payload phase.
///
/// Feed the debounced light state into [`poll`](BitDecoder::poll) once per
/// sampling tick, starting at the first tick of the first bit slot. Within
/// each [`TICKS_PER_BIT`]-tick slot the state observed at the mid-slot tick
/// is latched as the bit value; the rest of the slot only consumes time.
/// After the eighth slot the reconstructed byte is returned, first bit in
/// bit position 7.
#[derive(Debug)]
pub struct BitDecoder {
    byte: u8,
    bits_done: u8,
    slot_tick: u32,
    latched: bool,
}

impl BitDecoder {
    /// Decoder positioned at the start of the first bit slot.
    pub fn new() -> Self {
        Self {
            byte: 0,
            bits_done: 0,
            slot_tick: 0,
            latched: false,
        }
    }

    /// Advances one sampling tick; returns the byte once all 8 slots closed.
    pub fn poll(&mut self, on: bool) -> Option<u8> {
        if self.slot_tick == TICKS_PER_BIT / 2 {
            self.latched = on;
        }
        self.slot_tick += 1;
        if self.slot_tick < TICKS_PER_BIT {
            return None;
        }
        self.slot_tick = 0;

        self.byte = (self.byte << 1) | u8::from(self.latched);
        self.bits_done += 1;
        link_debug!("bit {}: {}", self.bits_done, self.latched);
        if self.bits_done >= BITS_PER_FRAME {
            return Some(self.byte);
        }
        None
    }
}

impl Default for BitDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a decoded byte the way the receiver's host transport expects it:
/// two uppercase hexadecimal ASCII characters followed by a newline.
///
/// ```
/// use lifi_ook::codec::hex_frame;
///
/// assert_eq!(&hex_frame(0x4B), b"4B\n");
/// ```
pub fn hex_frame(byte: u8) -> [u8; 3] {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    [
        HEX[usize::from(byte >> 4)],
        HEX[usize::from(byte & 0x0F)],
        b'\n',
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Polls a full bit slot where the channel sits at `level` throughout.
    fn feed_slot(dec: &mut BitDecoder, level: bool) -> Option<u8> {
        let mut out = None;
        for _ in 0..TICKS_PER_BIT {
            let done = dec.poll(level);
            assert!(out.is_none());
            out = done;
        }
        out
    }

    #[test]
    fn encoder_walks_msb_first() {
        // 0xA5 = 10100101: bit 7 first, bit 0 (the trailing 1) last.
        let levels: Vec<bool> = BitEncoder::new(0xA5).collect();
        assert_eq!(
            levels,
            [true, false, true, false, false, true, false, true]
        );
        assert_eq!(BitEncoder::new(0x00).filter(|&b| b).count(), 0);
        assert_eq!(BitEncoder::new(0xFF).filter(|&b| b).count(), 8);
    }

    #[test]
    fn level_for_matches_encoder_order() {
        for (index, level) in BitEncoder::new(0x3C).enumerate() {
            assert_eq!(level_for(0x3C, index as u8), level);
        }
    }

    #[test]
    fn decoder_folds_bits_into_msb_first_byte() {
        let mut dec = BitDecoder::new();
        let mut result = None;
        for level in BitEncoder::new(0xA5) {
            result = feed_slot(&mut dec, level);
        }
        assert_eq!(result, Some(0xA5));
    }

    #[test]
    fn encode_then_decode_is_identity_for_all_bytes() {
        for byte in 0..=255u8 {
            let mut dec = BitDecoder::new();
            let mut result = None;
            for level in BitEncoder::new(byte) {
                result = feed_slot(&mut dec, level);
            }
            assert_eq!(result, Some(byte));
        }
    }

    #[test]
    fn mid_slot_latch_tolerates_edge_jitter() {
        // The channel only carries the correct level around mid-slot; the
        // edges of every slot read the opposite level.
        let byte = 0xC3;
        let mut dec = BitDecoder::new();
        let mut result = None;
        for level in BitEncoder::new(byte) {
            for tick in 0..TICKS_PER_BIT {
                let near_mid = tick >= 3 && tick <= 6;
                let seen = if near_mid { level } else { !level };
                assert!(result.is_none());
                result = dec.poll(seen);
            }
        }
        assert_eq!(result, Some(byte));
    }

    #[test]
    fn hex_frame_is_two_uppercase_digits_and_newline() {
        assert_eq!(&hex_frame(0x4B), b"4B\n");
        assert_eq!(&hex_frame(0x0A), b"0A\n");
        assert_eq!(&hex_frame(0x00), b"00\n");
        assert_eq!(&hex_frame(0xFF), b"FF\n");
    }
}
