/// Declares a static global `LIFI_RX` instance protected by a
/// `critical_section` mutex.
///
/// This macro creates a `static` singleton suitable for interrupt-based
/// environments, where both the main thread and an ISR need to safely
/// access the shared receiver state.
///
/// # Arguments
/// - `$sensor`: The concrete type of the light sensor (must implement
///   [`crate::sampler::LightSensor`])
///
/// # Example
/// ```ignore
/// init_lifi_rx!(LdrAdc);
/// ```
#[macro_export]
macro_rules! init_lifi_rx {
    ( $sensor:ty ) => {
        pub static LIFI_RX: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::LifiRx<$sensor>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Initializes the global `LIFI_RX` singleton with a new receiver built
/// around the given sampler.
///
/// # Example
/// ```ignore
/// fn main() {
///     setup_lifi_rx!(LightSampler::new(adc, DEFAULT_LIGHT_THRESHOLD));
/// }
/// ```
///
/// # Notes
/// - Requires `init_lifi_rx!` to have been used earlier.
#[macro_export]
macro_rules! setup_lifi_rx {
    ( $sampler:expr ) => {
        $crate::timer::global_lifi_rx_setup(&LIFI_RX, $sampler)
    };
}

/// Advances the global `LIFI_RX` by one tick, if it has been initialized.
///
/// Invoke from the 10 ms timer ISR.
///
/// # Example
/// ```ignore
/// #[interrupt]
/// fn TIM2() {
///     tick_lifi_rx!();
/// }
/// ```
#[macro_export]
macro_rules! tick_lifi_rx {
    () => {
        $crate::timer::global_lifi_rx_tick(&LIFI_RX)
    };
}

/// Declares a static global `LIFI_TX` instance protected by a
/// `critical_section` mutex.
///
/// # Arguments
/// - `$pin`: The concrete type of the light source pin (must implement
///   `embedded_hal::digital::OutputPin`)
///
/// # Example
/// ```ignore
/// init_lifi_tx!(Led);
/// ```
#[macro_export]
macro_rules! init_lifi_tx {
    ( $pin:ty ) => {
        pub static LIFI_TX: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::LifiTx<$pin>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Initializes the global `LIFI_TX` singleton around the given pin.
///
/// # Notes
/// - Requires `init_lifi_tx!` to have been used earlier.
/// - The pin is driven low (light off) during setup.
#[macro_export]
macro_rules! setup_lifi_tx {
    ( $pin:expr ) => {
        $crate::timer::global_lifi_tx_setup(&LIFI_TX, $pin)
    };
}

/// Advances the global `LIFI_TX` by one tick, if it has been initialized.
///
/// Invoke from the 10 ms timer ISR.
#[macro_export]
macro_rules! tick_lifi_tx {
    () => {
        $crate::timer::global_lifi_tx_tick(&LIFI_TX)
    };
}
