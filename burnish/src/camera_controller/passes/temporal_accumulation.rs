use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, CameraController, Engine,
};

/// Blends each radiance plane's fresh samples into its accumulation history;
/// one dispatch per plane.
#[derive(Debug)]
pub struct TemporalAccumulationPass {
    passes: Vec<CameraComputePass<gpu::TemporalAccumulationPassParams>>,
    demodulate: bool,
}

impl TemporalAccumulationPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        let passes = buffers
            .layers
            .iter()
            .map(|layer| {
                CameraComputePass::builder("temporal_accumulation")
                    .bind([
                        &buffers.camera,
                        &buffers.geometry_map.curr().bind_readable(),
                        &buffers.reprojection_map.bind_readable(),
                        &layer.samples.bind_readable(),
                    ])
                    .bind([
                        &layer.colors.past().bind_readable(),
                        &layer.colors.curr().bind_writable(),
                        &layer.moments.past().bind_readable(),
                        &layer.moments.curr().bind_writable(),
                    ])
                    .build(device, &engine.shaders.temporal_accumulation)
            })
            .collect();

        Self {
            passes,
            demodulate: engine.config().layout.needs_demodulation(),
        }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        // This pass uses 8x8 warps:
        let size = (camera.camera.viewport + 7) / 8;

        let params = gpu::TemporalAccumulationPassParams {
            demodulate: self.demodulate as u32,
        };

        for pass in &self.passes {
            pass.run(camera, encoder, size, params);
        }
    }
}
