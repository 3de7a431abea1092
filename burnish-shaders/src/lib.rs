#![cfg_attr(target_arch = "spirv", no_std)]

pub mod block_fit;
pub mod fit_accumulation;
pub mod frame_composition;
pub mod frame_reprojection;
pub mod frame_stabilization;
pub mod scale_blend;
pub mod temporal_accumulation;
