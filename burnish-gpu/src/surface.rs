use glam::{UVec2, Vec3, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{Normal, TexRgba32, U32Ext};

#[derive(Clone, Copy)]
pub struct Surface {
    pub normal: Vec3,
    pub depth: f32,
    pub material: u32,
}

impl Surface {
    pub fn is_sky(&self) -> bool {
        self.depth == 0.0
    }

    /// Returns a score `<0.0, 1.0>` that determines the similarity of two
    /// given surfaces; used to validate reprojections and to gate pixels
    /// gathered from a block's halo.
    ///
    /// Sky never resembles anything, itself included - otherwise a zeroed
    /// g-buffer (e.g. right after a resize) could validate reprojections into
    /// equally zeroed history.
    pub fn evaluate_similarity_to(&self, other: &Self) -> f32 {
        if self.is_sky() || other.is_sky() {
            return 0.0;
        }

        if self.material != other.material {
            return 0.0;
        }

        let normal_score = self.normal.dot(other.normal).max(0.0);

        // TODO a continuous function here would be much, much better
        let depth_score = if self.depth < 35.0 && other.depth < 35.0 {
            1.0 - (self.depth - other.depth).abs().min(1.0)
        } else {
            1.0 - (self.depth.log2() - other.depth.log2()).abs().min(1.0)
        };

        normal_score * depth_score
    }
}

#[derive(Clone, Copy)]
pub struct SurfaceMap<'a> {
    tex: TexRgba32<'a>,
}

impl<'a> SurfaceMap<'a> {
    pub fn new(tex: TexRgba32<'a>) -> Self {
        Self { tex }
    }

    pub fn get(&self, screen_pos: UVec2) -> Surface {
        let d0 = self.tex.read(screen_pos);
        let [.., material] = d0.x.to_bits().to_bytes();

        Surface {
            normal: Normal::decode(d0.yz()),
            depth: d0.w,
            material,
        }
    }
}
