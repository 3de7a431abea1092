use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Mat4, UVec2, Vec4, Vec4Swizzles};

/// Full denoised image.
pub const CAMERA_MODE_IMAGE: u32 = 0;

/// Raw samples, straight from the renderer.
pub const CAMERA_MODE_SAMPLES: u32 = 1;

/// Temporally accumulated samples, before the regression filter.
pub const CAMERA_MODE_ACCUMULATION: u32 = 2;

/// Reprojection confidence, as a grayscale image.
pub const CAMERA_MODE_CONFIDENCE: u32 = 3;

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Camera {
    pub projection_view: Mat4,
    pub screen: Vec4,
    pub data: Vec4,
}

impl Camera {
    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    /// Mirrors given point back into the screen; used to fetch neighbours of
    /// pixels that lay close to the screen's edges.
    pub fn contain(&self, mut pos: IVec2) -> UVec2 {
        let screen_size = self.screen.xy().as_ivec2();

        if pos.x < 0 {
            pos.x = -pos.x;
        }

        if pos.y < 0 {
            pos.y = -pos.y;
        }

        if pos.x >= screen_size.x {
            pos.x = 2 * (screen_size.x - 1) - pos.x;
        }

        if pos.y >= screen_size.y {
            pos.y = 2 * (screen_size.y - 1) - pos.y;
        }

        pos.as_uvec2()
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }

    pub fn mode(&self) -> u32 {
        self.data.x.to_bits()
    }
}

#[cfg(test)]
mod tests {
    use glam::{ivec2, uvec2, vec4};

    use super::*;

    fn camera() -> Camera {
        Camera {
            projection_view: Mat4::IDENTITY,
            screen: vec4(320.0, 240.0, 0.0, 0.0),
            data: Vec4::ZERO,
        }
    }

    #[test]
    fn contains() {
        let target = camera();

        assert!(target.contains(ivec2(0, 0)));
        assert!(target.contains(ivec2(319, 239)));
        assert!(!target.contains(ivec2(-1, 0)));
        assert!(!target.contains(ivec2(0, -1)));
        assert!(!target.contains(ivec2(320, 0)));
        assert!(!target.contains(ivec2(0, 240)));
    }

    #[test]
    fn contain() {
        let target = camera();

        assert_eq!(uvec2(10, 20), target.contain(ivec2(10, 20)));
        assert_eq!(uvec2(3, 20), target.contain(ivec2(-3, 20)));
        assert_eq!(uvec2(318, 20), target.contain(ivec2(320, 20)));
        assert_eq!(uvec2(317, 20), target.contain(ivec2(321, 20)));
        assert_eq!(uvec2(10, 238), target.contain(ivec2(10, 240)));
        assert_eq!(uvec2(10, 237), target.contain(ivec2(10, 241)));
    }

    #[test]
    fn contain_stays_in_bounds() {
        let target = camera();

        for x in [-2, -1, 0, 319, 320, 321] {
            for y in [-2, -1, 0, 239, 240, 241] {
                let pos = target.contain(ivec2(x, y));

                assert!(
                    target.contains(pos.as_ivec2()),
                    "contain(({x}, {y})) = {pos:?} lays off-screen",
                );
            }
        }
    }
}
