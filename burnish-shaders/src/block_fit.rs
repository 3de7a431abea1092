//! This pass fits a least-squares model over each block of the screen and
//! replaces the block's pixels with the model's predictions; one workgroup
//! handles one block, cooperating through shared memory.
//!
//! The three entry points differ only in their block size; with the largest
//! blocks each lane covers four pixels instead of one.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn fit8(
    #[spirv(workgroup_id)] group_id: UVec3,
    #[spirv(local_invocation_index)] local_idx: u32,
    #[spirv(workgroup)] scratch: FitScratch64,
    #[spirv(workgroup)] model: FitModelSlot,
    #[spirv(push_constant)] params: &BlockFitPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] radiance: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 3)] output: TexRgba16,
) {
    FitKernel::new(
        camera,
        SurfaceMap::new(geometry_map),
        radiance,
        output,
        params,
    )
    .run(group_id.xy(), local_idx as usize, 8, scratch, model);
}

#[spirv(compute(threads(16, 16)))]
pub fn fit16(
    #[spirv(workgroup_id)] group_id: UVec3,
    #[spirv(local_invocation_index)] local_idx: u32,
    #[spirv(workgroup)] scratch: FitScratch256,
    #[spirv(workgroup)] model: FitModelSlot,
    #[spirv(push_constant)] params: &BlockFitPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] radiance: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 3)] output: TexRgba16,
) {
    FitKernel::new(
        camera,
        SurfaceMap::new(geometry_map),
        radiance,
        output,
        params,
    )
    .run(group_id.xy(), local_idx as usize, 16, scratch, model);
}

#[spirv(compute(threads(16, 16)))]
pub fn fit32(
    #[spirv(workgroup_id)] group_id: UVec3,
    #[spirv(local_invocation_index)] local_idx: u32,
    #[spirv(workgroup)] scratch: FitScratch256,
    #[spirv(workgroup)] model: FitModelSlot,
    #[spirv(push_constant)] params: &BlockFitPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] radiance: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 3)] output: TexRgba16,
) {
    FitKernel::new(
        camera,
        SurfaceMap::new(geometry_map),
        radiance,
        output,
        params,
    )
    .run(group_id.xy(), local_idx as usize, 32, scratch, model);
}
