//! This pass blends the fitted image into its own history, on top of the
//! sample accumulation that already happened before the fit.
//!
//! The fit is stable where the scene is static, but each block re-solves its
//! model every frame, so the model's coefficients jitter a little with the
//! sampling noise; smoothing the predictions over time hides that.

use burnish_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
#[allow(clippy::too_many_arguments)]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] camera: &Camera,
    #[spirv(descriptor_set = 0, binding = 1)] geometry_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] reprojection_map: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 3)] colors: TexRgba16,
    #[spirv(descriptor_set = 0, binding = 4)] fitted: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 0)] prev_history: TexRgba16,
    #[spirv(descriptor_set = 1, binding = 1)] history: TexRgba16,
) {
    let screen_pos = global_id.xy();
    let surface_map = SurfaceMap::new(geometry_map);
    let reprojection_map = ReprojectionMap::new(reprojection_map);

    if !camera.contains(screen_pos.as_ivec2()) {
        return;
    }

    // -------------------------------------------------------------------------

    let fitted_color = fitted.read(screen_pos).xyz();

    if surface_map.get(screen_pos).is_sky() {
        unsafe {
            history.write(screen_pos, fitted_color.extend(0.0));
        }

        return;
    }

    let reprojection = reprojection_map.get(screen_pos);

    let color = if reprojection.is_some() {
        let prev = BilinearFilter::reproject(reprojection, move |pos| {
            (prev_history.read(pos), 1.0)
        })
        .xyz();

        // The sample counter got bumped earlier this frame, so a pixel that
        // just got disoccluded shows up here with one sample and resets its
        // history in one go
        let spp = AccumulatedSample::deserialize(colors.read(screen_pos)).spp;

        lerp(prev, fitted_color, accumulation_alpha(spp, FIT_MIN_ALPHA))
    } else {
        fitted_color
    };

    unsafe {
        history.write(screen_pos, color.extend(0.0));
    }
}
