use glam::{vec3, Vec3};

use super::{solve_normal_equations, TriMatrix, FEATURES, TRI_ENTRIES};

/// Number of f32 words a solved model occupies when it's broadcast through
/// workgroup memory: one coefficient per channel per feature, plus the block
/// mean used as the fallback.
pub const MODEL_WORDS: usize = 3 * FEATURES + 3;

/// Accumulator for one block's normal equations.
///
/// Inside the fitting kernel every lane owns one of these and feeds it the
/// pixels it gathered; the per-lane accumulators then get summed entry by
/// entry across the workgroup, which is sound because both the matrix and the
/// right-hand side are plain sums over pixels.
#[derive(Clone, Copy)]
pub struct BlockFit {
    matrix: TriMatrix,
    rhs: [Vec3; FEATURES],
}

impl BlockFit {
    pub fn new() -> Self {
        Self {
            matrix: TriMatrix::zeroed(),
            rhs: [Vec3::ZERO; FEATURES],
        }
    }

    /// Accumulates one pixel into the normal equations.
    pub fn add(&mut self, phi: &[f32; FEATURES], radiance: Vec3) {
        let mut i = 0;

        while i < FEATURES {
            let mut j = i;

            while j < FEATURES {
                self.matrix
                    .add_entry(TriMatrix::entry_idx(i, j), phi[i] * phi[j]);

                j += 1;
            }

            self.rhs[i] += radiance * phi[i];
            i += 1;
        }
    }

    /// Number of accumulated pixels; this is exactly the constant-term entry
    /// of the matrix, since the constant feature is 1 for every pixel.
    pub fn sample_count(&self) -> f32 {
        self.matrix.entry(0)
    }

    /// Mean radiance of the accumulated pixels.
    pub fn mean(&self) -> Vec3 {
        let count = self.sample_count();

        if count > 0.0 {
            self.rhs[0] / count
        } else {
            Vec3::ZERO
        }
    }

    pub fn matrix_entry(&self, idx: usize) -> f32 {
        self.matrix.entry(idx)
    }

    pub fn set_matrix_entry(&mut self, idx: usize, value: f32) {
        self.matrix.set_entry(idx, value);
    }

    pub fn rhs_entry(&self, idx: usize) -> Vec3 {
        self.rhs[idx]
    }

    pub fn set_rhs_entry(&mut self, idx: usize, value: Vec3) {
        self.rhs[idx] = value;
    }

    pub fn solve(mut self) -> FitModel {
        let mean = self.mean();

        solve_normal_equations(&mut self.matrix, &mut self.rhs);

        FitModel {
            coeffs: self.rhs,
            mean,
        }
    }
}

impl Default for BlockFit {
    fn default() -> Self {
        Self::new()
    }
}

/// A solved per-block regression model.
#[derive(Clone, Copy)]
pub struct FitModel {
    pub coeffs: [Vec3; FEATURES],
    pub mean: Vec3,
}

impl FitModel {
    /// Evaluates the model at one pixel's features.
    ///
    /// Negative predictions are clamped to zero (radiance can't be negative)
    /// and non-finite ones fall back to the block mean, so a degenerate block
    /// comes out uniformly colored rather than broken.
    pub fn eval(&self, phi: &[f32; FEATURES]) -> Vec3 {
        let mut color = Vec3::ZERO;
        let mut i = 0;

        while i < FEATURES {
            color += self.coeffs[i] * phi[i];
            i += 1;
        }

        let color = color.max(Vec3::ZERO);

        if color.is_finite() {
            color
        } else if self.mean.is_finite() {
            self.mean.max(Vec3::ZERO)
        } else {
            Vec3::ZERO
        }
    }

    pub fn to_words(&self, words: &mut [f32; MODEL_WORDS]) {
        let mut i = 0;

        while i < FEATURES {
            words[3 * i] = self.coeffs[i].x;
            words[3 * i + 1] = self.coeffs[i].y;
            words[3 * i + 2] = self.coeffs[i].z;
            i += 1;
        }

        words[3 * FEATURES] = self.mean.x;
        words[3 * FEATURES + 1] = self.mean.y;
        words[3 * FEATURES + 2] = self.mean.z;
    }

    pub fn from_words(words: &[f32; MODEL_WORDS]) -> Self {
        let mut coeffs = [Vec3::ZERO; FEATURES];
        let mut i = 0;

        while i < FEATURES {
            coeffs[i] =
                vec3(words[3 * i], words[3 * i + 1], words[3 * i + 2]);
            i += 1;
        }

        let mean = vec3(
            words[3 * FEATURES],
            words[3 * FEATURES + 1],
            words[3 * FEATURES + 2],
        );

        Self { coeffs, mean }
    }
}

/// Merges per-lane accumulators entry by entry; the kernel does the same
/// thing, only with a workgroup reduction instead of a serial loop.
pub fn merge_block_fits(partials: &[BlockFit]) -> BlockFit {
    let mut total = BlockFit::new();

    for partial in partials {
        let mut e = 0;

        while e < TRI_ENTRIES {
            total.set_matrix_entry(
                e,
                total.matrix_entry(e) + partial.matrix_entry(e),
            );

            e += 1;
        }

        let mut i = 0;

        while i < FEATURES {
            total.set_rhs_entry(i, total.rhs_entry(i) + partial.rhs_entry(i));
            i += 1;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{ivec2, vec2, vec3, IVec2};
    use rand::prelude::*;

    use super::super::BlockDomain;
    use super::*;
    use crate::{feature_basis, Surface};

    fn flat_surface() -> Surface {
        Surface {
            normal: vec3(0.0, 0.0, 1.0),
            depth: 10.0,
            material: 0,
        }
    }

    fn sloped_surface(pos: IVec2) -> Surface {
        Surface {
            normal: vec3(0.0, 0.0, 1.0),
            depth: 10.0 + 0.01 * (pos.x + pos.y) as f32,
            material: 0,
        }
    }

    #[test]
    fn fits_a_linear_gradient_exactly() {
        // Noise-free linear data lies in the basis' span, so the fit must
        // reproduce it up to float precision
        let domain = BlockDomain {
            origin: ivec2(0, 0),
            extent: 12.0,
            depth_min: 10.0,
            depth_max: 10.3,
        };

        let mut fit = BlockFit::new();

        for y in 0..12 {
            for x in 0..12 {
                let pos = ivec2(x, y);
                let surface = sloped_surface(pos);
                let phi = domain.features(pos, &surface);
                let value = Vec3::splat(0.2 + 0.5 * phi[1] + 0.1 * phi[2]);

                fit.add(&phi, value);
            }
        }

        let model = fit.solve();

        for y in 0..12 {
            for x in 0..12 {
                let pos = ivec2(x, y);
                let surface = sloped_surface(pos);
                let phi = domain.features(pos, &surface);
                let expected = 0.2 + 0.5 * phi[1] + 0.1 * phi[2];

                assert_relative_eq!(
                    expected,
                    model.eval(&phi).x,
                    epsilon = 1e-3
                );
            }
        }
    }

    #[test]
    fn constant_block_comes_out_constant() {
        let domain = BlockDomain {
            origin: ivec2(0, 0),
            extent: 8.0,
            depth_min: 10.0,
            depth_max: 10.0,
        };

        let mut fit = BlockFit::new();

        for y in 0..8 {
            for x in 0..8 {
                let pos = ivec2(x, y);
                let surface = flat_surface();

                fit.add(&domain.features(pos, &surface), Vec3::splat(0.75));
            }
        }

        let model = fit.solve();

        for y in 0..8 {
            for x in 0..8 {
                let pos = ivec2(x, y);
                let surface = flat_surface();

                assert_relative_eq!(
                    0.75,
                    model.eval(&domain.features(pos, &surface)).x,
                    epsilon = 1e-4
                );
            }
        }
    }

    #[test]
    fn smooths_noise_around_the_mean() {
        let mut rng = StdRng::seed_from_u64(5);

        let domain = BlockDomain {
            origin: ivec2(0, 0),
            extent: 16.0,
            depth_min: 10.0,
            depth_max: 10.0,
        };

        let mut fit = BlockFit::new();

        for y in 0..16 {
            for x in 0..16 {
                let pos = ivec2(x, y);
                let surface = flat_surface();

                let noise: f32 = rng.gen_range(-0.5..0.5);

                fit.add(
                    &domain.features(pos, &surface),
                    Vec3::splat(1.0 + noise),
                );
            }
        }

        let model = fit.solve();

        // The fitted surface has far less spread than the +-0.5 input noise
        for y in 0..16 {
            for x in 0..16 {
                let pos = ivec2(x, y);
                let surface = flat_surface();

                let value = model.eval(&domain.features(pos, &surface)).x;

                assert!((value - 1.0).abs() < 0.25);
            }
        }
    }

    #[test]
    fn flat_wall_filters_to_the_mean_regardless_of_noise() {
        // A 32x32 wall with constant features, each pixel carrying the
        // average of 16 noisy samples around a known mean; the fit has to
        // land near that mean no matter how loud the noise was
        let mu = 0.75;

        for sigma in [0.1, 0.4, 0.8] {
            let mut rng = StdRng::seed_from_u64(17);

            let domain = BlockDomain {
                origin: ivec2(0, 0),
                extent: 32.0,
                depth_min: 10.0,
                depth_max: 10.0,
            };

            let mut fit = BlockFit::new();

            for y in 0..32 {
                for x in 0..32 {
                    let mut pixel = 0.0;

                    for _ in 0..16 {
                        pixel += mu + rng.gen_range(-sigma..sigma);
                    }

                    fit.add(
                        &domain.features(ivec2(x, y), &flat_surface()),
                        Vec3::splat(pixel / 16.0),
                    );
                }
            }

            let model = fit.solve();

            for y in 0..32 {
                for x in 0..32 {
                    let value = model
                        .eval(&domain.features(ivec2(x, y), &flat_surface()))
                        .x;

                    assert!(
                        (value - mu).abs() < 0.1,
                        "sigma={sigma}: fitted {value} strays from {mu}",
                    );
                }
            }
        }
    }

    #[test]
    fn eval_clamps_negative_predictions() {
        let model = FitModel {
            coeffs: [Vec3::splat(-1.0); FEATURES],
            mean: Vec3::splat(0.5),
        };

        let phi = feature_basis(vec2(0.5, 0.5), vec3(0.0, 0.0, 1.0), 0.5);

        assert_eq!(Vec3::ZERO, model.eval(&phi));
    }

    #[test]
    fn eval_falls_back_to_the_mean() {
        let mut coeffs = [Vec3::ZERO; FEATURES];

        coeffs[0] = Vec3::splat(f32::NAN);

        let model = FitModel {
            coeffs,
            mean: Vec3::splat(0.5),
        };

        let phi = feature_basis(vec2(0.0, 0.0), vec3(0.0, 0.0, 1.0), 0.0);

        assert_eq!(Vec3::splat(0.5), model.eval(&phi));
    }

    #[test]
    fn empty_fit_stays_finite() {
        let model = BlockFit::new().solve();

        let phi = feature_basis(vec2(0.0, 0.0), vec3(0.0, 0.0, 1.0), 0.0);

        assert_eq!(Vec3::ZERO, model.eval(&phi));
    }

    #[test]
    fn merging_partials_matches_a_serial_fit() {
        let mut rng = StdRng::seed_from_u64(9);

        let domain = BlockDomain {
            origin: ivec2(0, 0),
            extent: 8.0,
            depth_min: 10.0,
            depth_max: 11.0,
        };

        let pixels: Vec<_> = (0..64)
            .map(|i| {
                let pos = ivec2(i % 8, i / 8);
                let surface = Surface {
                    normal: vec3(0.1, 0.2, 0.97).normalize(),
                    depth: rng.gen_range(10.0..11.0),
                    material: 0,
                };
                let radiance = Vec3::new(rng.gen(), rng.gen(), rng.gen());

                (pos, surface, radiance)
            })
            .collect();

        let mut serial = BlockFit::new();

        for (pos, surface, radiance) in &pixels {
            serial.add(&domain.features(*pos, surface), *radiance);
        }

        // Four "lanes", each accumulating a strided quarter of the pixels
        let mut lanes = [BlockFit::new(); 4];

        for (i, (pos, surface, radiance)) in pixels.iter().enumerate() {
            lanes[i % 4].add(&domain.features(*pos, surface), *radiance);
        }

        let merged = merge_block_fits(&lanes);

        for e in 0..TRI_ENTRIES {
            assert_relative_eq!(
                serial.matrix_entry(e),
                merged.matrix_entry(e),
                epsilon = 1e-3,
                max_relative = 1e-5
            );
        }

        for i in 0..FEATURES {
            assert_relative_eq!(
                serial.rhs_entry(i).x,
                merged.rhs_entry(i).x,
                epsilon = 1e-3,
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn model_words_round_trip() {
        let mut rng = StdRng::seed_from_u64(13);

        let mut coeffs = [Vec3::ZERO; FEATURES];

        for coeff in &mut coeffs {
            *coeff = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        }

        let model = FitModel {
            coeffs,
            mean: Vec3::new(0.1, 0.2, 0.3),
        };

        let mut words = [0.0; MODEL_WORDS];
        model.to_words(&mut words);

        let target = FitModel::from_words(&words);

        for i in 0..FEATURES {
            assert_eq!(model.coeffs[i], target.coeffs[i]);
        }

        assert_eq!(model.mean, target.mean);
    }
}
