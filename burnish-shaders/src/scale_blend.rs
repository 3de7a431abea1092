//! This pass merges the three per-scale fits into one image: noisy areas lean
//! on the large blocks, which average more samples, while areas close to a
//! geometric edge lean on the small blocks, which hug the geometry better.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] moments: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 3)] fit8: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 4)] fit16: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 5)] fit32: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 6)] output: TexRgba16,
) {
    let screen_pos = global_id.xy();
    let surface_map = SurfaceMap::new(geometry_map);

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let surface = surface_map.get(screen_pos);

    let noise = LumaMoments::deserialize(moments.read(screen_pos))
        .relative_deviation();

    let similarity_at = |delta: IVec2| {
        surface_map
            .get(camera.contain(screen_pos.as_ivec2() + delta))
            .evaluate_similarity_to(&surface)
    };

    // The less similar our least similar neighbour, the stronger the edge
    // we're sitting on
    let edge = 1.0
        - similarity_at(ivec2(-1, 0))
            .min(similarity_at(ivec2(1, 0)))
            .min(similarity_at(ivec2(0, -1)))
            .min(similarity_at(ivec2(0, 1)));

    let color = lerp(
        fit16.read(screen_pos).xyz(),
        fit32.read(screen_pos).xyz(),
        noise,
    );

    let color = lerp(color, fit8.read(screen_pos).xyz(), edge);

    unsafe {
        output.write(screen_pos, color.extend(0.0));
    }
}
