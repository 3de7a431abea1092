//! Common structs, algorithms etc. used by Burnish's shaders and host code.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod accumulation;
mod camera;
mod fit;
mod gbuffer;
mod noise;
mod normal;
mod passes;
mod reprojection;
mod stabilizer;
mod surface;
mod utils;

pub use self::accumulation::*;
pub use self::camera::*;
pub use self::fit::*;
pub use self::gbuffer::*;
pub use self::noise::*;
pub use self::normal::*;
pub use self::passes::*;
pub use self::reprojection::*;
pub use self::stabilizer::*;
pub use self::surface::*;
pub use self::utils::*;

pub mod prelude {
    pub use spirv_std::arch::IndexUnchecked;
    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image};

    pub use crate::*;
}

/// Shared-memory scratch a workgroup folds its partial reductions in; one
/// slot per lane.
///
/// For performance reasons, this is a per-workgroup shared-memory array
/// instead of a storage buffer; the fitting passes burn through a hundred
/// reductions per block, so the scratch is as hot as memory gets.
pub type FitScratch64<'a> = &'a mut [f32; 8 * 8];

/// Like [`FitScratch64`], for the passes that run 16x16 workgroups.
pub type FitScratch256<'a> = &'a mut [f32; 16 * 16];

/// Shared-memory slot the solved per-block model gets broadcast through; one
/// lane solves, everyone reads.
pub type FitModelSlot<'a> = &'a mut [f32; MODEL_WORDS];
