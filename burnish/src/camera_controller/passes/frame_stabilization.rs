use crate::{
    Camera, CameraBuffers, CameraComputePass, CameraController, DenoiserMode,
    Engine,
};

/// Anti-aliases the composed frame against its own reprojected history; not
/// built at all when denoising is disabled.
#[derive(Debug)]
pub struct FrameStabilizationPass {
    pass: Option<CameraComputePass>,
}

impl FrameStabilizationPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        if engine.config().mode == DenoiserMode::None {
            return Self { pass: None };
        }

        let pass = CameraComputePass::builder("frame_stabilization")
            .bind([
                &buffers.camera,
                &buffers.geometry_map.curr().bind_readable(),
                &buffers.reprojection_map.bind_readable(),
                &buffers.composed.bind_readable(),
            ])
            .bind([
                &buffers.output.past().bind_readable(),
                &buffers.output.curr().bind_writable(),
            ])
            .build(device, &engine.shaders.frame_stabilization);

        Self { pass: Some(pass) }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let Some(pass) = &self.pass else {
            return;
        };

        // This pass uses 8x8 warps:
        let size = (camera.camera.viewport + 7) / 8;

        pass.run(camera, encoder, size, ());
    }
}
