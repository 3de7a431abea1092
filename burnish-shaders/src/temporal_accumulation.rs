//! This pass blends the current frame's noisy samples into the per-pixel
//! history, together with the luminance moments the scale-blending pass later
//! derives its noise estimate from.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &TemporalAccumulationPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] reprojection_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] samples: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 0)] prev_colors: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 1)] colors: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 2)] prev_moments: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 3)] moments: TexRgba16,
) {
    let screen_pos = global_id.xy();
    let reprojection_map = ReprojectionMap::new(reprojection_map);

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let gbuffer = GBufferEntry::unpack(geometry_map.read(screen_pos));
    let sample = samples.read(screen_pos).xyz();

    // Dividing the samples by albedo leaves just the illumination for the
    // filter to chew on; the composition pass multiplies it back in.
    //
    // Sky pixels carry no albedo, so they stay as they are.
    let sample = if params.demodulate == 1 && gbuffer.is_some() {
        demodulate(sample, gbuffer.albedo)
    } else {
        sample
    };

    let sample_luma = sample.luma();
    let reprojection = reprojection_map.get(screen_pos);

    let accumulated;
    let accumulated_moments;

    if reprojection.is_some() {
        let prev = AccumulatedSample::deserialize(BilinearFilter::reproject(
            reprojection,
            move |pos| (prev_colors.read(pos), 1.0),
        ));

        let prev_moments = LumaMoments::deserialize(BilinearFilter::reproject(
            reprojection,
            move |pos| (prev_moments.read(pos), 1.0),
        ));

        let spp = (prev.spp + 1.0).min(MAX_SPP);
        let alpha = accumulation_alpha(spp, ACCUM_MIN_ALPHA);

        accumulated = AccumulatedSample {
            color: lerp(prev.color, sample, alpha),
            spp,
        };

        accumulated_moments = LumaMoments {
            m1: lerp(prev_moments.m1, sample_luma, alpha),
            m2: lerp(prev_moments.m2, sample_luma.sqr(), alpha),
        };
    } else {
        accumulated = AccumulatedSample {
            color: sample,
            spp: 1.0,
        };

        accumulated_moments = LumaMoments {
            m1: sample_luma,
            m2: sample_luma.sqr(),
        };
    }

    unsafe {
        colors.write(screen_pos, accumulated.serialize());
        moments.write(screen_pos, accumulated_moments.serialize());
    }
}
