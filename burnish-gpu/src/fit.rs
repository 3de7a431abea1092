mod kernel;
mod matrix;
mod model;
mod reduce;

use glam::{IVec2, Vec2, Vec3};

pub use self::kernel::*;
pub use self::matrix::*;
pub use self::model::*;
pub use self::reduce::*;
use crate::Surface;

/// Number of terms in the regression basis.
pub const FEATURES: usize = 11;

/// Guard for the depth normalization's denominator; keeps perfectly flat
/// blocks (depth_max == depth_min) from dividing by zero.
pub const DEPTH_RANGE_EPSILON: f32 = 1e-4;

/// Evaluates the regression basis at one pixel: a constant term, the block
/// coordinates, the surface normal, the normalized depth, and second-order
/// position and depth terms.
pub fn feature_basis(local: Vec2, normal: Vec3, depth: f32) -> [f32; FEATURES] {
    [
        1.0,
        local.x,
        local.y,
        normal.x,
        normal.y,
        normal.z,
        depth,
        local.x * local.x,
        local.y * local.y,
        local.x * local.y,
        depth * depth,
    ]
}

/// The screen-space window one block's regression runs over (the block plus
/// its halo), together with the depth range used to normalize the depth
/// feature into `<0.0, 1.0>`.
#[derive(Clone, Copy)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct BlockDomain {
    pub origin: IVec2,
    pub extent: f32,
    pub depth_min: f32,
    pub depth_max: f32,
}

impl BlockDomain {
    /// Evaluates the basis at given pixel, scaling positions into `<-1.0,
    /// 1.0>` over the window and depth into `<0.0, 1.0>` over the block's
    /// depth range.
    pub fn features(&self, pos: IVec2, surface: &Surface) -> [f32; FEATURES] {
        let local = (pos - self.origin).as_vec2() + 0.5;
        let local = local * (2.0 / self.extent) - 1.0;

        let depth = (surface.depth - self.depth_min)
            / (self.depth_max - self.depth_min).max(DEPTH_RANGE_EPSILON);

        feature_basis(local, surface.normal, depth)
    }
}

#[cfg(test)]
mod tests {
    use glam::{ivec2, vec3};

    use super::*;

    fn surface(depth: f32) -> Surface {
        Surface {
            normal: vec3(0.0, 0.0, 1.0),
            depth,
            material: 0,
        }
    }

    #[test]
    fn features_are_scaled_into_the_window() {
        let domain = BlockDomain {
            origin: ivec2(16, 16),
            extent: 12.0,
            depth_min: 10.0,
            depth_max: 20.0,
        };

        let phi = domain.features(ivec2(16, 16), &surface(10.0));

        assert_eq!(1.0, phi[0]);
        assert!(phi[1] > -1.0 && phi[1] < -0.9);
        assert!(phi[2] > -1.0 && phi[2] < -0.9);
        assert_eq!(0.0, phi[6]);

        let phi = domain.features(ivec2(27, 27), &surface(20.0));

        assert!(phi[1] > 0.9 && phi[1] < 1.0);
        assert!(phi[2] > 0.9 && phi[2] < 1.0);
        assert_eq!(1.0, phi[6]);
    }

    #[test]
    fn flat_depth_range_stays_finite() {
        let domain = BlockDomain {
            origin: ivec2(0, 0),
            extent: 12.0,
            depth_min: 5.0,
            depth_max: 5.0,
        };

        let phi = domain.features(ivec2(3, 4), &surface(5.0));

        assert!(phi.iter().all(|f| f.is_finite()));
        assert_eq!(0.0, phi[6]);
    }
}
