use glam::{vec4, Mat4, UVec2};

use crate::gpu;

/// Host-side camera description; [`Camera::serialize()`] turns it into the
/// uniform the shaders read.
#[derive(Clone, Debug)]
pub struct Camera {
    pub mode: CameraMode,

    /// Render resolution; all of the per-pixel state is sized to it, so
    /// changing it rebuilds the camera's buffers (and resets its history).
    pub viewport: UVec2,

    /// World-to-clip transform of the current frame.
    pub projection_view: Mat4,
}

impl Camera {
    pub(crate) fn describe(&self) -> String {
        format!(
            "viewport={}x{}, mode={:?}",
            self.viewport.x, self.viewport.y, self.mode,
        )
    }

    /// Whether switching to `other` requires the camera's buffers and passes
    /// to be rebuilt from scratch.
    pub(crate) fn is_invalidated_by(&self, other: &Self) -> bool {
        self.viewport != other.viewport
    }

    pub(crate) fn serialize(&self) -> gpu::Camera {
        gpu::Camera {
            projection_view: self.projection_view,
            screen: vec4(
                self.viewport.x as f32,
                self.viewport.y as f32,
                0.0,
                0.0,
            ),
            data: vec4(
                f32::from_bits(self.mode.serialize()),
                0.0,
                0.0,
                0.0,
            ),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: Default::default(),
            viewport: UVec2::ONE,
            projection_view: Mat4::IDENTITY,
        }
    }
}

/// Selects what the composition pass puts on screen; everything but `Image`
/// is a debug view into the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// The denoised image.
    #[default]
    Image,

    /// Raw samples, straight from the renderer.
    Samples,

    /// Temporally accumulated samples, before the regression filter.
    Accumulation,

    /// Reprojection confidence, as a grayscale image.
    Confidence,
}

impl CameraMode {
    pub(crate) fn serialize(&self) -> u32 {
        match self {
            Self::Image => gpu::CAMERA_MODE_IMAGE,
            Self::Samples => gpu::CAMERA_MODE_SAMPLES,
            Self::Accumulation => gpu::CAMERA_MODE_ACCUMULATION,
            Self::Confidence => gpu::CAMERA_MODE_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn serialize() {
        let camera = Camera {
            mode: CameraMode::Confidence,
            viewport: uvec2(320, 240),
            projection_view: Mat4::IDENTITY,
        };

        let camera = camera.serialize();

        assert_eq!(uvec2(320, 240), camera.screen_size());
        assert_eq!(gpu::CAMERA_MODE_CONFIDENCE, camera.mode());
    }

    #[test]
    fn is_invalidated_by() {
        let camera = Camera {
            viewport: uvec2(320, 240),
            ..Default::default()
        };

        let resized = Camera {
            viewport: uvec2(640, 480),
            ..camera.clone()
        };

        let remoded = Camera {
            mode: CameraMode::Samples,
            ..camera.clone()
        };

        assert!(camera.is_invalidated_by(&resized));
        assert!(!camera.is_invalidated_by(&remoded));
    }
}
