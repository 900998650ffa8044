//! Threshold-based light-state sampling.
//!
//! This module converts a raw, noisy intensity reading from a photoresistor
//! into the binary channel symbol the rest of the link works with: light ON
//! or light OFF. It provides the [`LightSensor`] trait as the ADC seam and
//! the [`LightSampler`] wrapper that owns the sensor together with the fixed
//! session threshold.
//!
//! `embedded-hal` 1.0 carries no ADC trait, so the seam is defined here the
//! same way digital pins are abstracted elsewhere in this crate: a minimal
//! fallible read with an associated error type, implemented once per target
//! HAL.
//!
//! A failed hardware read is fatal. No sensor means no link, so the error
//! propagates out of every sampling call unchanged; there is no retry or
//! recovery path at this layer.

use crate::consts::SENSOR_OVERSAMPLE;

/// Analog light intensity source, typically an LDR behind an ADC channel.
///
/// Implementations return the raw converter reading; scaling and threshold
/// comparison are the sampler's job.
pub trait LightSensor {
    /// Error raised by the underlying hardware read.
    type Error;

    /// Performs one raw intensity conversion.
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

/// Owns a [`LightSensor`] plus the fixed ON/OFF threshold for one session.
///
/// The threshold is constant for the sampler's lifetime; there is no
/// adaptive calibration anywhere in the link. Construct the sampler once at
/// startup with scoped ownership of the sensor handle and pass it into the
/// receive driver.
#[derive(Debug)]
pub struct LightSampler<S: LightSensor> {
    sensor: S,
    threshold: u16,
}

impl<S: LightSensor> LightSampler<S> {
    /// Creates a sampler around `sensor` with the given intensity threshold.
    ///
    /// Readings strictly above `threshold` count as light ON. See
    /// [`crate::consts::DEFAULT_LIGHT_THRESHOLD`] for the stock value.
    pub fn new(sensor: S, threshold: u16) -> Self {
        Self { sensor, threshold }
    }

    /// The on/off threshold this sampler was built with.
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Returns a stabilized intensity reading.
    ///
    /// Averages [`SENSOR_OVERSAMPLE`] back-to-back raw conversions to
    /// suppress high-frequency sensor and ADC noise. Accumulation is done in
    /// `u32` so a run of full-scale readings cannot overflow.
    pub fn read_intensity(&mut self) -> Result<u16, S::Error> {
        let mut sum: u32 = 0;
        for _ in 0..SENSOR_OVERSAMPLE {
            sum += u32::from(self.sensor.read_raw()?);
        }
        Ok((sum / SENSOR_OVERSAMPLE) as u16)
    }

    /// Samples the channel symbol: `true` iff the stabilized intensity is
    /// strictly above the threshold.
    pub fn is_on(&mut self) -> Result<bool, S::Error> {
        Ok(self.read_intensity()? > self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed script of raw readings, then repeats the last one.
    #[derive(Debug)]
    struct ScriptedSensor {
        readings: Vec<u16>,
        cursor: usize,
        fail_after: Option<usize>,
    }

    impl ScriptedSensor {
        fn new(readings: &[u16]) -> Self {
            Self {
                readings: readings.to_vec(),
                cursor: 0,
                fail_after: None,
            }
        }
    }

    impl LightSensor for ScriptedSensor {
        type Error = &'static str;

        fn read_raw(&mut self) -> Result<u16, Self::Error> {
            if let Some(limit) = self.fail_after {
                if self.cursor >= limit {
                    return Err("adc read failed");
                }
            }
            let idx = self.cursor.min(self.readings.len() - 1);
            self.cursor += 1;
            Ok(self.readings[idx])
        }
    }

    #[test]
    fn read_intensity_averages_ten_samples() {
        // Nine readings of 600 and one of 1600 average to 700.
        let mut script = vec![600u16; 9];
        script.push(1600);
        let mut sampler = LightSampler::new(ScriptedSensor::new(&script), 700);

        assert_eq!(sampler.read_intensity().unwrap(), 700);
    }

    #[test]
    fn is_on_requires_strictly_above_threshold() {
        let mut at_threshold = LightSampler::new(ScriptedSensor::new(&[700]), 700);
        assert!(!at_threshold.is_on().unwrap());

        let mut above = LightSampler::new(ScriptedSensor::new(&[701]), 700);
        assert!(above.is_on().unwrap());

        let mut dark = LightSampler::new(ScriptedSensor::new(&[12]), 700);
        assert!(!dark.is_on().unwrap());
    }

    #[test]
    fn hardware_fault_propagates_unchanged() {
        let mut sensor = ScriptedSensor::new(&[800]);
        sensor.fail_after = Some(4);
        let mut sampler = LightSampler::new(sensor, 700);

        // The fault hits mid-average; the whole read fails.
        assert_eq!(sampler.read_intensity(), Err("adc read failed"));
        assert_eq!(sampler.is_on(), Err("adc read failed"));
    }

    #[test]
    fn averaging_smooths_single_sample_noise() {
        // One spurious full-scale spike in an otherwise dark channel must
        // not flip the symbol to ON.
        let mut script = vec![50u16; 9];
        script.insert(3, 4095);
        let mut sampler = LightSampler::new(ScriptedSensor::new(&script), 700);

        assert!(!sampler.is_on().unwrap());
    }
}
