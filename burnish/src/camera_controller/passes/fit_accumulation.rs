use crate::{
    Camera, CameraBuffers, CameraComputePass, CameraController, Engine,
};

/// Blends each layer's fitted frame into the fit history; one dispatch per
/// plane.
#[derive(Debug)]
pub struct FitAccumulationPass {
    passes: Vec<CameraComputePass>,
}

impl FitAccumulationPass {
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
                CameraComputePass::builder("fit_accumulation")
                    .bind([
                        &buffers.camera,
                        &buffers.geometry_map.curr().bind_readable(),
                        &buffers.reprojection_map.bind_readable(),
                        &layer.colors.curr().bind_readable(),
                        &layer.fitted.bind_readable(),
                    ])
                    .bind([
                        &layer.history.past().bind_readable(),
                        &layer.history.curr().bind_writable(),
                    ])
                    .build(device, &engine.shaders.fit_accumulation)
            })
            .collect();

        Self { passes }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        // This pass uses 8x8 warps:
        let size = (camera.camera.viewport + 7) / 8;

        for pass in &self.passes {
            pass.run(camera, encoder, size, ());
        }
    }
}
