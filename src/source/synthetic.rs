use super::DepthSource;
use crate::depth::{RawDepthSample, Resolution, Timestamp};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a tilted plane in front of the sensor with per-pixel noise and
/// random confidence. Deterministic for a given seed.
pub struct SyntheticSource {
    rng: StdRng,
    resolution: Resolution,
    remaining: usize,
    next_timestamp: Timestamp,
    timestamp_step: Timestamp,
    near_mm: f32,
    far_mm: f32,
    noise_mm: f32,
}

impl SyntheticSource {
    pub fn new(resolution: Resolution, frames: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            resolution,
            remaining: frames,
            next_timestamp: 0,
            // roughly 30 fps in milliseconds
            timestamp_step: 33,
            near_mm: 800.0,
            far_mm: 2500.0,
            noise_mm: 15.0,
        }
    }

    pub fn with_timestamp_step(mut self, step: Timestamp) -> Self {
        self.timestamp_step = step;
        self
    }

    pub fn with_depth_range(mut self, near_mm: f32, far_mm: f32) -> Self {
        self.near_mm = near_mm;
        self.far_mm = far_mm;
        self
    }

    pub fn with_noise(mut self, noise_mm: f32) -> Self {
        self.noise_mm = noise_mm;
        self
    }

    fn generate(&mut self) -> RawDepthSample {
        let Resolution { width, height } = self.resolution;
        let mut depth = Vec::with_capacity(self.resolution.pixel_count());
        let mut confidence = Vec::with_capacity(self.resolution.pixel_count());

        for y in 0..height {
            let t = if height > 1 {
                y as f32 / (height - 1) as f32
            } else {
                0.0
            };
            let plane_mm = self.far_mm + (self.near_mm - self.far_mm) * t;

            for _ in 0..width {
                let noise = if self.noise_mm > 0.0 {
                    self.rng.gen_range(-self.noise_mm..=self.noise_mm)
                } else {
                    0.0
                };
                depth.push((plane_mm + noise).clamp(0.0, u16::MAX as f32) as u16);
                confidence.push(self.rng.gen::<u8>());
            }
        }

        let timestamp = self.next_timestamp;
        self.next_timestamp += self.timestamp_step;

        RawDepthSample::new(depth, confidence, timestamp, width, height)
    }
}

impl DepthSource for SyntheticSource {
    fn next_sample(&mut self) -> Result<Option<RawDepthSample>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(self.generate()))
    }
}
