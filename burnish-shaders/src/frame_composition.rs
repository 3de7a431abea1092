//! This pass assembles the displayable image: it multiplies the albedo back
//! in, merges the radiance planes and provides a couple of debug views into
//! the pipeline's guts.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &FrameCompositionPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] reprojection_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] samples_d0: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 4)] samples_d1: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 5)] colors_d0: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 6)] colors_d1: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 7)] history_d0: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 8)] history_d1: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 9)] output: TexRgba16,
) {
    let screen_pos = global_id.xy();
    let reprojection_map = ReprojectionMap::new(reprojection_map);

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let gbuffer = GBufferEntry::unpack(geometry_map.read(screen_pos));

    let raw_samples = |screen_pos: UVec2| {
        let d0 = samples_d0.read(screen_pos).xyz();

        if params.planes == 2 {
            d0 + samples_d1.read(screen_pos).xyz()
        } else {
            d0
        }
    };

    let color = match params.camera_mode {
        // CameraMode::Image
        0 => {
            // The sky doesn't get filtered, it just shines through
            if gbuffer.is_none() {
                raw_samples(screen_pos)
            } else {
                let d0 = history_d0.read(screen_pos).xyz();

                let color = if params.planes == 2 {
                    d0 + history_d1.read(screen_pos).xyz()
                } else {
                    d0
                };

                if params.demodulate == 1 {
                    remodulate(color, gbuffer.albedo)
                } else {
                    color
                }
            }
        }

        // CameraMode::Samples
        1 => raw_samples(screen_pos),

        // CameraMode::Accumulation
        2 => {
            let d0 = AccumulatedSample::deserialize(
                colors_d0.read(screen_pos),
            )
            .color;

            let color = if params.planes == 2 {
                d0 + AccumulatedSample::deserialize(
                    colors_d1.read(screen_pos),
                )
                .color
            } else {
                d0
            };

            if params.demodulate == 1 && gbuffer.is_some() {
                remodulate(color, gbuffer.albedo)
            } else {
                color
            }
        }

        // CameraMode::Confidence
        3 => Vec3::splat(reprojection_map.get(screen_pos).confidence),

        _ => Default::default(),
    };

    unsafe {
        output.write(screen_pos, color.extend(1.0));
    }
}
