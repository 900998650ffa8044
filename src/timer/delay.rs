use crate::codec::hex_frame;
use crate::consts::SAMPLE_INTERVAL_MS;
use crate::driver::{HostSink, LifiRx, LifiTx, LinkError};
use crate::sampler::LightSensor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use nb::block;

/// Runs the blocking receive loop: tick, drain, sleep, forever.
///
/// Each decoded byte is formatted as two uppercase hex characters plus a
/// newline and handed to `host`. Failed frames produce no output at all;
/// the loop only returns on a fatal fault.
///
/// # Arguments
/// - `rx`: A mutable reference to a [`LifiRx`] instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `host`: The host transport consuming formatted frames.
///
/// # Errors
/// - [`LinkError::Transducer`] if the light sensor fails
/// - [`LinkError::Host`] if the host transport write fails
///
/// # Notes
/// - This loop never returns successfully; it is intended for
///   single-purpose polling firmware.
/// - For more efficient or concurrent applications, prefer interrupt-driven
///   tick scheduling (see [`crate::timer`] with the `timer-isr` feature).
pub fn run_rx_loop<S, D, H>(
    rx: &mut LifiRx<S>,
    delay: &mut D,
    host: &mut H,
) -> Result<(), LinkError<S::Error, H::Error>>
where
    S: LightSensor,
    D: DelayNs,
    H: HostSink,
{
    loop {
        rx.tick().map_err(LinkError::Transducer)?;
        if let Some(byte) = rx.take_byte() {
            host.write_frame(&hex_frame(byte))
                .map_err(LinkError::Host)?;
        }
        delay.delay_ms(SAMPLE_INTERVAL_MS);
    }
}

/// Runs the blocking transmit loop: block for one host byte, send it, tick
/// the frame out, repeat forever.
///
/// `next_byte` is the host transport seam, typically a UART read at 115200
/// 8N1; `nb::Error::WouldBlock` results are spun on indefinitely, matching
/// the link's unbounded wait for input. Exactly one byte is consumed per
/// transmission cycle, and the cycle fully resolves before the next byte is
/// pulled.
///
/// # Arguments
/// - `tx`: A mutable reference to a [`LifiTx`] instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `next_byte`: Non-blocking one-byte read from the host transport.
///
/// # Errors
/// - [`LinkError::Transducer`] if the light source pin fails
/// - [`LinkError::Host`] if the host transport read fails
pub fn run_tx_loop<P, D, F, E>(
    tx: &mut LifiTx<P>,
    delay: &mut D,
    mut next_byte: F,
) -> Result<(), LinkError<P::Error, E>>
where
    P: OutputPin,
    D: DelayNs,
    F: FnMut() -> nb::Result<u8, E>,
{
    loop {
        let byte = block!(next_byte()).map_err(LinkError::Host)?;
        // The driver is idle here, so arming cannot be refused.
        let _ = tx.send(byte);
        while tx.is_busy() {
            tx.tick().map_err(LinkError::Transducer)?;
            delay.delay_ms(SAMPLE_INTERVAL_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use std::rc::Rc;

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

    #[test]
    fn tx_loop_drains_host_bytes_then_fails_over() {
        let channel = Rc::new(Cell::new(false));
        let mut tx = LifiTx::new(ChannelPin(Rc::clone(&channel))).unwrap();
        let mut delay = NoopDelay::new();

        // Two bytes, a WouldBlock in between, then a transport fault to
        // break out of the otherwise endless loop.
        let mut feed = vec![
            Err(nb::Error::Other("uart gone")),
            Ok(0x55),
            Err(nb::Error::WouldBlock),
            Ok(0xA1),
        ];
        let result = run_tx_loop(&mut tx, &mut delay, || feed.pop().unwrap());

        assert_eq!(result, Err(LinkError::Host("uart gone")));
        assert_eq!(tx.tx_good, 2);
        assert!(!tx.is_busy());
    }
}
