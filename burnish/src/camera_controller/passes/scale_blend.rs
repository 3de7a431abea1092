use crate::{
    Camera, CameraBuffers, CameraComputePass, CameraController, Engine,
};

/// Merges the per-scale fits into each layer's `fitted` texture; built empty
/// when a single block size is configured, since the fit then writes `fitted`
/// directly.
#[derive(Debug)]
pub struct ScaleBlendPass {
    passes: Vec<CameraComputePass>,
}

impl ScaleBlendPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        let passes = if engine.config().scale.is_blend() {
            buffers
                .layers
                .iter()
                .map(|layer| {
                    CameraComputePass::builder("scale_blend")
                        .bind([
                            &buffers.camera,
                            &buffers.geometry_map.curr().bind_readable(),
                            &layer.moments.curr().bind_readable(),
                            &layer.fits[0].bind_readable(),
                            &layer.fits[1].bind_readable(),
                            &layer.fits[2].bind_readable(),
                            &layer.fitted.bind_writable(),
                        ])
                        .build(device, &engine.shaders.scale_blend)
                })
                .collect()
        } else {
            Vec::new()
        };

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
