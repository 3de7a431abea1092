use glam::UVec2;

/// Amplitude of the dither applied to fitted pixels; roughly one step of an
/// 8-bit quantizer, which is enough to break banding on smooth gradients.
pub const DITHER_AMPLITUDE: f32 = 1.0 / 256.0;

#[derive(Copy, Clone)]
pub struct Noise {
    state: u32,
}

impl Noise {
    pub fn new(seed: u32, id: UVec2) -> Self {
        Self {
            state: seed
                ^ 48619u32.wrapping_mul(id.x)
                ^ 95461u32.wrapping_mul(id.y),
        }
    }

    /// Generates a uniform sample in range `<0.0, 1.0>`.
    pub fn sample(&mut self) -> f32 {
        (self.sample_int() as f32) / (u32::MAX as f32)
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(747796405).wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }

    /// Generates a zero-centered dither offset.
    pub fn sample_dither(&mut self) -> f32 {
        (self.sample() - 0.5) * DITHER_AMPLITUDE
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn sample_stays_in_range() {
        let mut noise = Noise::new(0xcafebabe, uvec2(12, 34));

        for _ in 0..1024 {
            let sample = noise.sample();

            assert!(sample >= 0.0 && sample <= 1.0);
        }
    }

    #[test]
    fn sample_dither_stays_in_range() {
        let mut noise = Noise::new(0x12345678, uvec2(7, 9));

        for _ in 0..1024 {
            let dither = noise.sample_dither();

            assert!(dither.abs() <= DITHER_AMPLITUDE / 2.0 + f32::EPSILON);
        }
    }

    #[test]
    fn neighbouring_pixels_decorrelate() {
        let a = Noise::new(123, uvec2(10, 10)).sample_int();
        let b = Noise::new(123, uvec2(11, 10)).sample_int();
        let c = Noise::new(123, uvec2(10, 11)).sample_int();

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
