use glam::{ivec2, vec3, IVec2, UVec2, Vec3, Vec4Swizzles};

use super::{
    workgroup_max, workgroup_min, workgroup_sum, workgroup_sync, BlockDomain,
    BlockFit, FitModel, FEATURES, MODEL_WORDS, TRI_ENTRIES,
};
use crate::{BlockFitPassParams, Camera, Noise, Surface, SurfaceMap, TexRgba16};

/// Fits one block's regression model and evaluates it; the whole workgroup
/// executes this cooperatively, one workgroup per block.
pub struct FitKernel<'a> {
    camera: &'a Camera,
    surfaces: SurfaceMap<'a>,
    radiance: TexRgba16<'a>,
    output: TexRgba16<'a>,
    params: &'a BlockFitPassParams,
}

impl<'a> FitKernel<'a> {
    /// How similar a halo pixel's surface must be to the block's anchor for
    /// the pixel to contribute to the fit; pixels inside the block itself are
    /// exempt, since the model gets evaluated at them no matter what.
    pub const HALO_SIMILARITY: f32 = 0.5;

    pub fn new(
        camera: &'a Camera,
        surfaces: SurfaceMap<'a>,
        radiance: TexRgba16<'a>,
        output: TexRgba16<'a>,
        params: &'a BlockFitPassParams,
    ) -> Self {
        Self {
            camera,
            surfaces,
            radiance,
            output,
            params,
        }
    }

    /// Runs the kernel for the block at `group_id`.
    ///
    /// All `LANES` lanes of the workgroup must call this; lanes split the
    /// gathered pixels between themselves by striding, accumulate per-lane
    /// partial sums, combine them through `scratch`, and then evaluate the
    /// solved model over the block, again by striding.
    ///
    /// `edge` doesn't have to match `LANES`; a lane simply gathers and
    /// evaluates more than one pixel when the block outgrows the workgroup.
    pub fn run<const LANES: usize>(
        &self,
        group_id: UVec2,
        lane: usize,
        edge: i32,
        scratch: &mut [f32; LANES],
        model_words: &mut [f32; MODEL_WORDS],
    ) {
        let halo = edge / 4;
        let block_origin = group_id.as_ivec2() * edge;
        let gather_origin = block_origin - IVec2::splat(halo);
        let gather_edge = edge + 2 * halo;
        let gather_area = gather_edge * gather_edge;

        let anchor = self
            .surfaces
            .get(self.camera.contain(block_origin + IVec2::splat(edge / 2)));

        // Find the depth range of the contributing pixels, so that the depth
        // feature can be normalized; lanes with no pixels publish identity
        // values
        let mut depth_min = f32::MAX;
        let mut depth_max: f32 = 0.0;

        let mut i = lane as i32;

        while i < gather_area {
            let pos = gather_origin + ivec2(i % gather_edge, i / gather_edge);

            if self.camera.contains(pos) {
                let surface = self.surfaces.get(pos.as_uvec2());

                if self.accepts(pos, &surface, &anchor, block_origin, edge) {
                    depth_min = depth_min.min(surface.depth);
                    depth_max = depth_max.max(surface.depth);
                }
            }

            i += LANES as i32;
        }

        let domain = BlockDomain {
            origin: gather_origin,
            extent: gather_edge as f32,
            depth_min: workgroup_min(scratch, lane, depth_min),
            depth_max: workgroup_max(scratch, lane, depth_max),
        };

        // Accumulate this lane's share of the normal equations
        let mut fit = BlockFit::new();
        let mut i = lane as i32;

        while i < gather_area {
            let pos = gather_origin + ivec2(i % gather_edge, i / gather_edge);

            if self.camera.contains(pos) {
                let surface = self.surfaces.get(pos.as_uvec2());

                if self.accepts(pos, &surface, &anchor, block_origin, edge) {
                    fit.add(
                        &domain.features(pos, &surface),
                        self.radiance.read(pos.as_uvec2()).xyz(),
                    );
                }
            }

            i += LANES as i32;
        }

        // Combine the per-lane equations, entry by entry
        let mut e = 0;

        while e < TRI_ENTRIES {
            let entry = workgroup_sum(scratch, lane, fit.matrix_entry(e));

            fit.set_matrix_entry(e, entry);
            e += 1;
        }

        let mut i = 0;

        while i < FEATURES {
            let rhs = fit.rhs_entry(i);

            fit.set_rhs_entry(
                i,
                vec3(
                    workgroup_sum(scratch, lane, rhs.x),
                    workgroup_sum(scratch, lane, rhs.y),
                    workgroup_sum(scratch, lane, rhs.z),
                ),
            );

            i += 1;
        }

        // Every lane holds the combined equations now, but solving them once
        // and broadcasting the model is cheaper than solving them everywhere
        if lane == 0 {
            fit.solve().to_words(model_words);
        }

        workgroup_sync();

        let model = FitModel::from_words(model_words);

        // Evaluate the model over the block; the halo only ever contributes
        // to the fit, it never gets written
        let mut i = lane as i32;

        while i < edge * edge {
            let pos = block_origin + ivec2(i % edge, i / edge);

            if self.camera.contains(pos) {
                let surface = self.surfaces.get(pos.as_uvec2());

                let color = if surface.is_sky() {
                    self.radiance.read(pos.as_uvec2()).xyz()
                } else {
                    let mut noise =
                        Noise::new(self.params.dither_seed(), pos.as_uvec2());

                    let color = model.eval(&domain.features(pos, &surface));

                    (color + Vec3::splat(noise.sample_dither()))
                        .max(Vec3::ZERO)
                };

                unsafe {
                    self.output.write(pos.as_uvec2(), color.extend(0.0));
                }
            }

            i += LANES as i32;
        }
    }

    fn accepts(
        &self,
        pos: IVec2,
        surface: &Surface,
        anchor: &Surface,
        block_origin: IVec2,
        edge: i32,
    ) -> bool {
        if surface.is_sky() {
            return false;
        }

        let in_block = pos.x >= block_origin.x
            && pos.y >= block_origin.y
            && pos.x < block_origin.x + edge
            && pos.y < block_origin.y + edge;

        in_block
            || surface.evaluate_similarity_to(anchor) >= Self::HALO_SIMILARITY
    }
}
