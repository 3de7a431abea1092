use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, CameraController, Engine,
};

/// Runs the per-block regression over every radiance plane, once per active
/// block size.
///
/// With a single block size the fit lands straight in the layer's `fitted`
/// texture; with the multi-scale blend each size writes its own texture and
/// the scale-blend pass merges them afterwards.
#[derive(Debug)]
pub struct BlockFitPass {
    jobs: Vec<BlockFitJob>,
}

#[derive(Debug)]
struct BlockFitJob {
    layer: u32,
    edge: u32,
    pass: CameraComputePass<gpu::BlockFitPassParams>,
}

impl BlockFitPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        let scale = engine.config().scale;
        let mut jobs = Vec::new();

        for (layer_idx, layer) in buffers.layers.iter().enumerate() {
            for (scale_idx, &edge) in scale.edges().iter().enumerate() {
                let shader = match edge {
                    8 => &engine.shaders.block_fit_fit8,
                    16 => &engine.shaders.block_fit_fit16,
                    _ => &engine.shaders.block_fit_fit32,
                };

                let output = if scale.is_blend() {
                    &layer.fits[scale_idx]
                } else {
                    &layer.fitted
                };

                let pass =
                    CameraComputePass::builder(format!("block_fit{edge}"))
                        .bind([
                            &buffers.camera,
                            &buffers.geometry_map.curr().bind_readable(),
                            &layer.colors.curr().bind_readable(),
                            &output.bind_writable(),
                        ])
                        .build(device, shader);

                jobs.push(BlockFitJob {
                    layer: layer_idx as u32,
                    edge,
                    pass,
                });
            }
        }

        Self { jobs }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        for job in &self.jobs {
            // One workgroup per block:
            let size = (camera.camera.viewport + job.edge - 1) / job.edge;

            let params = gpu::BlockFitPassParams {
                seed: camera.frame(),
                layer: job.layer,
            };

            job.pass.run(camera, encoder, size, params);
        }
    }
}
