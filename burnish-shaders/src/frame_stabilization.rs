//! This pass anti-aliases the composed frame by blending it with its own
//! reprojected history.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] reprojection_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] composed: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 0)] prev_output: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 1)] output: TexRgba16,
) {
    let screen_pos = global_id.xy();

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    TemporalStabilizer::new(
        camera,
        SurfaceMap::new(geometry_map),
        ReprojectionMap::new(reprojection_map),
        composed,
        prev_output,
        output,
    )
    .run(screen_pos);
}
