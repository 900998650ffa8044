//! Internal logging shims dispatching to `log` or `defmt`.
//!
//! The link never requires a logger; with neither feature enabled these
//! macros expand to nothing. Keep format strings to hints both backends
//! understand (`{}`, `{:#x}`).
#![allow(unused_macros)]

#[cfg(feature = "defmt-0-3")]
macro_rules! link_debug {
    ($($arg:tt)*) => {
        defmt::debug!($($arg)*)
    };
}

#[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
macro_rules! link_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
macro_rules! link_debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "defmt-0-3")]
macro_rules! link_info {
    ($($arg:tt)*) => {
        defmt::info!($($arg)*)
    };
}

#[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
macro_rules! link_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
macro_rules! link_info {
    ($($arg:tt)*) => {{}};
}

#[cfg(feature = "defmt-0-3")]
macro_rules! link_warn {
    ($($arg:tt)*) => {
        defmt::warn!($($arg)*)
    };
}

#[cfg(all(feature = "log", not(feature = "defmt-0-3")))]
macro_rules! link_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
macro_rules! link_warn {
    ($($arg:tt)*) => {{}};
}
