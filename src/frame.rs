//! START/STOP marker detection for the receiver.
//!
//! The link has no dedicated synchronization channel. Frame boundaries are
//! carried in-band as long light-ON pulses, told apart from data bits and
//! from each other purely by duration: a pulse measuring 600–800 ms is a
//! START marker, 900–1100 ms is a STOP marker, anything else is noise. Both
//! windows are inclusive on both ends, so a duration exactly at a boundary
//! is accepted.
//!
//! Detection is a two-step measurement built from two primitives: wait for
//! the light to come ON (bounded by a timeout), then accumulate how long it
//! stays ON (bounded by a safety ceiling so the measurement terminates even
//! on a stuck channel). [`FrameSync`] runs both steps as an explicit state
//! machine advanced once per sampling tick, so the receiver never blocks
//! inside a measurement; the caller owns the tick cadence.
//!
//! Every failure here is soft. The caller resynchronizes by settling back
//! to idle and re-arming; there is no partial recovery of a broken frame.

use crate::consts::{
    MEASURE_CEILING_MS, SAMPLE_INTERVAL_MS, START_FRAME_MAX_MS, START_FRAME_MIN_MS,
    START_TIMEOUT_MS, STOP_FRAME_MAX_MS, STOP_FRAME_MIN_MS, STOP_TIMEOUT_MS,
};

/// Inclusive duration band used to classify a sustained ON pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    /// Shortest accepted pulse, in milliseconds.
    pub min_ms: u32,
    /// Longest accepted pulse, in milliseconds.
    pub max_ms: u32,
}

impl FrameWindow {
    /// Whether `duration_ms` falls inside the window, bounds included.
    pub const fn contains(&self, duration_ms: u32) -> bool {
        duration_ms >= self.min_ms && duration_ms <= self.max_ms
    }
}

/// The START marker acceptance window.
pub const START_WINDOW: FrameWindow = FrameWindow {
    min_ms: START_FRAME_MIN_MS,
    max_ms: START_FRAME_MAX_MS,
};

/// The STOP marker acceptance window.
pub const STOP_WINDOW: FrameWindow = FrameWindow {
    min_ms: STOP_FRAME_MIN_MS,
    max_ms: STOP_FRAME_MAX_MS,
};

/// A frame marker recovered from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Opens a frame; 700 ms nominal ON pulse.
    Start,
    /// Closes a frame; 1000 ms nominal ON pulse.
    Stop,
}

/// Classifies a measured ON pulse against both marker windows.
///
/// Returns `None` for any duration that lands between or outside the bands,
/// including a plausible data bit. The windows are disjoint by construction
/// (asserted in [`crate::consts`]), so the answer is never ambiguous.
pub fn classify_pulse(duration_ms: u32) -> Option<Marker> {
    if START_WINDOW.contains(duration_ms) {
        Some(Marker::Start)
    } else if STOP_WINDOW.contains(duration_ms) {
        Some(Marker::Stop)
    } else {
        None
    }
}

/// Outcome of advancing a [`FrameSync`] by one sampling tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Still waiting or still measuring; poll again next tick.
    Pending,
    /// A pulse was measured and fell inside the expected window.
    Detected,
    /// The light never came ON within the configured timeout.
    TimedOut,
    /// A pulse was measured but its duration matched no expected marker.
    OutOfWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncPhase {
    /// Waiting for the light to come ON.
    WaitOn,
    /// Light is ON; accumulating the pulse duration.
    Measure,
}

/// Tick-driven detector for one expected marker.
///
/// Construct with [`FrameSync::start`] or [`FrameSync::stop`], then feed the
/// debounced light state into [`poll`](FrameSync::poll) once per
/// [`SAMPLE_INTERVAL_MS`]. Once a terminal status is returned the detector
/// is spent; build a fresh one for the next marker.
#[derive(Debug)]
pub struct FrameSync {
    window: FrameWindow,
    wait_timeout_ms: u32,
    phase: SyncPhase,
    elapsed_ms: u32,
    on_ms: u32,
}

impl FrameSync {
    /// Detector for the START marker: waits up to 10 s for the light to come
    /// ON, then measures against the START window.
    pub fn start() -> Self {
        Self::new(START_WINDOW, START_TIMEOUT_MS)
    }

    /// Detector for the STOP marker: waits up to 2 s for the light to come
    /// ON, then measures against the STOP window.
    pub fn stop() -> Self {
        Self::new(STOP_WINDOW, STOP_TIMEOUT_MS)
    }

    fn new(window: FrameWindow, wait_timeout_ms: u32) -> Self {
        Self {
            window,
            wait_timeout_ms,
            phase: SyncPhase::WaitOn,
            elapsed_ms: 0,
            on_ms: 0,
        }
    }

    /// Advances the detector by one sampling tick.
    ///
    /// `on` is the current debounced light state. The duration accumulated
    /// while the light stays ON is capped at [`MEASURE_CEILING_MS`]; a pulse
    /// that long is classified (and rejected) without waiting for the
    /// falling edge, which bounds every wait in the receiver.
    pub fn poll(&mut self, on: bool) -> SyncStatus {
        match self.phase {
            SyncPhase::WaitOn => {
                if on {
                    self.phase = SyncPhase::Measure;
                    self.on_ms = 0;
                    return SyncStatus::Pending;
                }
                self.elapsed_ms += SAMPLE_INTERVAL_MS;
                if self.elapsed_ms >= self.wait_timeout_ms {
                    link_warn!("timeout waiting for light ON");
                    return SyncStatus::TimedOut;
                }
                SyncStatus::Pending
            }
            SyncPhase::Measure => {
                if on {
                    self.on_ms += SAMPLE_INTERVAL_MS;
                    if self.on_ms > MEASURE_CEILING_MS {
                        // Stuck channel; classify what we have and stop.
                        return self.classify();
                    }
                    return SyncStatus::Pending;
                }
                self.classify()
            }
        }
    }

    fn classify(&self) -> SyncStatus {
        link_debug!("light ON duration: {} ms", self.on_ms);
        if self.window.contains(self.on_ms) {
            SyncStatus::Detected
        } else {
            SyncStatus::OutOfWindow
        }
    }
}
