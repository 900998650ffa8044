use crate::driver::{LifiRx, LifiTx};
use crate::sampler::{LightSampler, LightSensor};
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// Used to initialize a global static [`LifiRx`] for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```ignore
/// use lifi_ook::driver::LifiRx;
/// use lifi_ook::timer::global_lifi_rx_init;
///
/// static LIFI_RX: Mutex<RefCell<Option<LifiRx<LdrAdc>>>> =
///     global_lifi_rx_init::<LdrAdc>();
/// ```
pub const fn global_lifi_rx_init<S: LightSensor>() -> Mutex<RefCell<Option<LifiRx<S>>>> {
    Mutex::new(RefCell::new(None))
}

/// Stores a freshly constructed receiver in the global static.
///
/// # Arguments
/// * The global static receiver slot
/// * The sampler owning the light sensor and threshold
pub fn global_lifi_rx_setup<S: LightSensor>(
    global_rx: &'static Mutex<RefCell<Option<LifiRx<S>>>>,
    sampler: LightSampler<S>,
) {
    critical_section::with(|cs| {
        let _ = global_rx.borrow(cs).replace(Some(LifiRx::new(sampler)));
    });
}

/// Advances the global receiver by one tick. Call from the 10 ms timer ISR.
///
/// A transducer fault is fatal for the link: the faulted driver is dropped
/// from the slot and further ticks become no-ops, so the failure is visible
/// to the main loop as a permanently empty slot.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn TIM2() {
///     global_lifi_rx_tick(&LIFI_RX);
/// }
/// ```
pub fn global_lifi_rx_tick<S: LightSensor>(
    global_rx: &'static Mutex<RefCell<Option<LifiRx<S>>>>,
) {
    critical_section::with(|cs| {
        let mut slot = global_rx.borrow(cs).borrow_mut();
        let faulted = match slot.as_mut() {
            Some(rx) => rx.tick().is_err(),
            None => false,
        };
        if faulted {
            *slot = None;
        }
    });
}

/// Removes and returns the oldest confirmed byte from the global receiver.
///
/// Call from the main loop to drain bytes decoded inside the ISR.
pub fn global_lifi_rx_take<S: LightSensor>(
    global_rx: &'static Mutex<RefCell<Option<LifiRx<S>>>>,
) -> Option<u8> {
    critical_section::with(|cs| {
        global_rx
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .and_then(|rx| rx.take_byte())
    })
}

/// Used to initialize a global static [`LifiTx`] for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
pub const fn global_lifi_tx_init<P: OutputPin>() -> Mutex<RefCell<Option<LifiTx<P>>>> {
    Mutex::new(RefCell::new(None))
}

/// Stores a freshly constructed transmitter in the global static.
///
/// The pin is driven low (light off) during construction; a pin that fails
/// already at setup leaves the slot empty.
pub fn global_lifi_tx_setup<P: OutputPin>(
    global_tx: &'static Mutex<RefCell<Option<LifiTx<P>>>>,
    pin: P,
) {
    critical_section::with(|cs| {
        let _ = global_tx.borrow(cs).replace(LifiTx::new(pin).ok());
    });
}

/// Arms one byte on the global transmitter from the main loop.
///
/// Returns `false` if the slot is empty or a frame is still in flight.
pub fn global_lifi_tx_send<P: OutputPin>(
    global_tx: &'static Mutex<RefCell<Option<LifiTx<P>>>>,
    byte: u8,
) -> bool {
    critical_section::with(|cs| {
        global_tx
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .is_some_and(|tx| tx.send(byte))
    })
}

/// Advances the global transmitter by one tick. Call from the 10 ms timer ISR.
///
/// As with the receiver, a pin fault drops the driver from the slot.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn TIM2() {
///     global_lifi_tx_tick(&LIFI_TX);
/// }
/// ```
pub fn global_lifi_tx_tick<P: OutputPin>(
    global_tx: &'static Mutex<RefCell<Option<LifiTx<P>>>>,
) {
    critical_section::with(|cs| {
        let mut slot = global_tx.borrow(cs).borrow_mut();
        let faulted = match slot.as_mut() {
            Some(tx) => tx.tick().is_err(),
            None => false,
        };
        if faulted {
            *slot = None;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Must be `Send` so the driver can live in the shared static slot.
    #[derive(Debug)]
    struct LevelPin(Arc<AtomicBool>);

    impl embedded_hal::digital::ErrorType for LevelPin {
        type Error = Infallible;
    }

    impl OutputPin for LevelPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.store(false, Ordering::Relaxed);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    // Statics shared across all tests in this module, so keep to one test
    // exercising the whole lifecycle.
    static TX_SLOT: Mutex<RefCell<Option<LifiTx<LevelPin>>>> = global_lifi_tx_init::<LevelPin>();

    #[test]
    fn global_tx_lifecycle_ticks_a_frame_out() {
        let channel = Arc::new(AtomicBool::new(false));

        assert!(!global_lifi_tx_send(&TX_SLOT, 0x11)); // empty slot
        global_lifi_tx_setup(&TX_SLOT, LevelPin(Arc::clone(&channel)));
        assert!(global_lifi_tx_send(&TX_SLOT, 0x11));
        assert!(!global_lifi_tx_send(&TX_SLOT, 0x22)); // in flight

        for _ in 0..271 {
            global_lifi_tx_tick(&TX_SLOT);
        }

        critical_section::with(|cs| {
            let slot = TX_SLOT.borrow(cs).borrow();
            let tx = slot.as_ref().unwrap();
            assert!(!tx.is_busy());
            assert_eq!(tx.tx_good, 1);
        });
        assert!(!channel.load(Ordering::Relaxed));
    }
}
