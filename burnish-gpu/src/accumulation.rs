use glam::{vec4, Vec3, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::F32Ext;

/// Upper bound for the per-pixel sample counter.
///
/// Capping the counter keeps the blend factor bounded away from zero, so the
/// history can still adapt when the scene changes slowly but steadily.
pub const MAX_SPP: f32 = 255.0;

/// Blend-factor floor for the pre-fit accumulation of raw samples.
pub const ACCUM_MIN_ALPHA: f32 = 0.2;

/// Blend-factor floor for the post-fit accumulation of fitted colors.
pub const FIT_MIN_ALPHA: f32 = 0.1;

/// Weight of the current frame in the final stabilization blend.
pub const TAA_ALPHA: f32 = 0.2;

/// Guard added to albedo before demodulating, so that black albedo doesn't
/// blow radiance up to infinity.
pub const ALBEDO_EPSILON: f32 = 1e-3;

/// Returns the blend factor for an exponential moving average over `spp`
/// accumulated samples.
///
/// `spp` counts the current frame too, so `spp == 1.0` (a fresh history, e.g.
/// right after a disocclusion) yields `1.0` and the average restarts from the
/// current frame alone.
pub fn accumulation_alpha(spp: f32, min_alpha: f32) -> f32 {
    (1.0 / spp.max(1.0)).max(min_alpha)
}

/// Splits radiance into irradiance-like signal by dividing out the surface's
/// albedo; the regression filter is much happier without albedo's texture
/// detail in its input.
pub fn demodulate(radiance: Vec3, albedo: Vec3) -> Vec3 {
    radiance / (albedo + ALBEDO_EPSILON)
}

/// See: [`demodulate()`].
pub fn remodulate(radiance: Vec3, albedo: Vec3) -> Vec3 {
    radiance * (albedo + ALBEDO_EPSILON)
}

/// Temporally accumulated radiance together with its sample counter.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct AccumulatedSample {
    pub color: Vec3,
    pub spp: f32,
}

impl AccumulatedSample {
    pub fn serialize(&self) -> Vec4 {
        self.color.extend(self.spp)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self {
            color: d0.xyz(),
            spp: d0.w,
        }
    }
}

/// First and second moments of accumulated luminance; their difference
/// estimates the temporal variance of a pixel.
#[derive(Clone, Copy, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct LumaMoments {
    pub m1: f32,
    pub m2: f32,
}

impl LumaMoments {
    pub fn serialize(&self) -> Vec4 {
        vec4(self.m1, self.m2, 0.0, 0.0)
    }

    pub fn deserialize(d0: Vec4) -> Self {
        Self { m1: d0.x, m2: d0.y }
    }

    /// Returns the luminance's standard deviation relative to its mean,
    /// saturated to `<0.0, 1.0>`; used to pick between block sizes.
    pub fn relative_deviation(&self) -> f32 {
        let variance = (self.m2 - self.m1.sqr()).max(0.0);

        (variance.sqrt() / self.m1.max(ALBEDO_EPSILON)).saturate()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn accumulation_alpha_restarts_fresh_histories() {
        assert_eq!(1.0, accumulation_alpha(1.0, ACCUM_MIN_ALPHA));
        assert_eq!(1.0, accumulation_alpha(0.0, ACCUM_MIN_ALPHA));
    }

    #[test]
    fn accumulation_alpha_decays_monotonically_to_floor() {
        let mut prev = 1.0;
        let mut spp = 1.0;

        while spp <= MAX_SPP {
            let alpha = accumulation_alpha(spp, ACCUM_MIN_ALPHA);

            assert!(alpha <= prev);
            assert!(alpha >= ACCUM_MIN_ALPHA);

            prev = alpha;
            spp += 1.0;
        }

        assert_eq!(ACCUM_MIN_ALPHA, accumulation_alpha(MAX_SPP, ACCUM_MIN_ALPHA));
    }

    #[test]
    fn accumulation_alpha_matches_plain_average_early_on() {
        // Before the floor kicks in, blending with `1 / spp` reproduces the
        // arithmetic mean of the frames seen so far
        assert_relative_eq!(0.5, accumulation_alpha(2.0, 0.1));
        assert_relative_eq!(0.25, accumulation_alpha(4.0, 0.1));
    }

    #[test]
    fn demodulation_round_trip() {
        let radiance = vec3(1.0, 2.0, 3.0);
        let albedo = vec3(0.5, 0.25, 0.75);

        let target = remodulate(demodulate(radiance, albedo), albedo);

        assert_relative_eq!(target.x, radiance.x, epsilon = 1e-4);
        assert_relative_eq!(target.y, radiance.y, epsilon = 1e-4);
        assert_relative_eq!(target.z, radiance.z, epsilon = 1e-4);
    }

    #[test]
    fn demodulation_survives_black_albedo() {
        let target = demodulate(vec3(1.0, 1.0, 1.0), Vec3::ZERO);

        assert!(target.is_finite());
    }

    #[test]
    fn serialization() {
        let sample = AccumulatedSample {
            color: vec3(1.0, 2.0, 3.0),
            spp: 42.0,
        };

        let sample = AccumulatedSample::deserialize(sample.serialize());

        assert_eq!(vec3(1.0, 2.0, 3.0), sample.color);
        assert_eq!(42.0, sample.spp);

        let moments = LumaMoments { m1: 0.5, m2: 0.3 };
        let moments = LumaMoments::deserialize(moments.serialize());

        assert_eq!(0.5, moments.m1);
        assert_eq!(0.3, moments.m2);
    }

    #[test]
    fn relative_deviation() {
        let flat = LumaMoments { m1: 1.0, m2: 1.0 };
        assert_eq!(0.0, flat.relative_deviation());

        let noisy = LumaMoments { m1: 0.5, m2: 1.0 };
        assert!(noisy.relative_deviation() > 0.5);

        // Numerical drift can push m2 slightly below m1^2
        let drifted = LumaMoments {
            m1: 1.0,
            m2: 1.0 - 1e-6,
        };

        assert_eq!(0.0, drifted.relative_deviation());
    }
}
