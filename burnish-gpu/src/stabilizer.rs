use glam::{ivec2, UVec2, Vec4Swizzles};

use crate::{
    lerp, rgb_to_ycocg, ycocg_to_rgb, BilinearFilter, Camera, ReprojectionMap,
    SurfaceMap, TexRgba16, Vec3Ext, TAA_ALPHA,
};

/// Temporal anti-aliasing over the composed frame.
///
/// Blends each pixel with its reprojected history, clipping the history into
/// the current neighbourhood's color range first so that stale colors fade
/// out instead of ghosting; the blended frame doubles as the next frame's
/// history.
pub struct TemporalStabilizer<'a> {
    camera: &'a Camera,
    surfaces: SurfaceMap<'a>,
    reprojections: ReprojectionMap<'a>,
    input: TexRgba16<'a>,
    history: TexRgba16<'a>,
    output: TexRgba16<'a>,
}

impl<'a> TemporalStabilizer<'a> {
    /// How similar a neighbouring pixel's surface must be to ours for that
    /// neighbour to widen the color range we clip the history into; dissimilar
    /// neighbours would let colors from across a geometric edge leak in.
    pub const NEIGHBOUR_SIMILARITY: f32 = 0.33;

    pub fn new(
        camera: &'a Camera,
        surfaces: SurfaceMap<'a>,
        reprojections: ReprojectionMap<'a>,
        input: TexRgba16<'a>,
        history: TexRgba16<'a>,
        output: TexRgba16<'a>,
    ) -> Self {
        Self {
            camera,
            surfaces,
            reprojections,
            input,
            history,
            output,
        }
    }

    pub fn run(&self, screen_pos: UVec2) {
        let current = self.input.read(screen_pos).xyz();
        let reprojection = self.reprojections.get(screen_pos);

        if reprojection.is_none() {
            unsafe {
                self.output.write(screen_pos, current.extend(1.0));
            }

            return;
        }

        let history = BilinearFilter::reproject(reprojection, move |pos| {
            (self.history.read(pos), 1.0)
        })
        .xyz();

        let surface = self.surfaces.get(screen_pos);
        let center = rgb_to_ycocg(current);
        let mut aabb_min = center;
        let mut aabb_max = center;

        let mut dy = -1;

        while dy <= 1 {
            let mut dx = -1;

            while dx <= 1 {
                if dx != 0 || dy != 0 {
                    let pos = screen_pos.as_ivec2() + ivec2(dx, dy);

                    // Neighbours past the screen's edge or across a geometric
                    // edge fall back to our own color, i.e. they don't widen
                    // the range
                    let neighbour = if self.camera.contains(pos) {
                        let pos = pos.as_uvec2();

                        let similarity = self
                            .surfaces
                            .get(pos)
                            .evaluate_similarity_to(&surface);

                        if similarity >= Self::NEIGHBOUR_SIMILARITY {
                            rgb_to_ycocg(self.input.read(pos).xyz())
                        } else {
                            center
                        }
                    } else {
                        center
                    };

                    aabb_min = aabb_min.min(neighbour);
                    aabb_max = aabb_max.max(neighbour);
                }

                dx += 1;
            }

            dy += 1;
        }

        let history =
            ycocg_to_rgb(rgb_to_ycocg(history).clip(aabb_min, aabb_max));

        let color = lerp(history, current, TAA_ALPHA);

        unsafe {
            self.output.write(screen_pos, color.extend(1.0));
        }
    }
}
