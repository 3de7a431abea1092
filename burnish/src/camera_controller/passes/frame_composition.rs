use crate::{
    gpu, Camera, CameraBuffers, CameraComputePass, CameraController,
    DenoiserMode, Engine,
};

/// Assembles the displayable frame: merges the radiance planes, multiplies
/// the albedo back in and serves the camera's debug views.
///
/// With denoising disabled this is the only pass that runs; it then writes
/// the raw samples straight into the output, skipping the stabilizer.
#[derive(Debug)]
pub struct FrameCompositionPass {
    pass: CameraComputePass<gpu::FrameCompositionPassParams>,
    planes: u32,
    demodulate: u32,
    passthrough: bool,
}

impl FrameCompositionPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        let config = engine.config();
        let passthrough = config.mode == DenoiserMode::None;

        let d0 = &buffers.layers[0];
        let d1 = buffers.layers.get(1).unwrap_or(d0);

        let builder = CameraComputePass::builder("frame_composition");

        let pass = if passthrough {
            builder
                .bind([
                    &buffers.camera,
                    &buffers.geometry_map.curr().bind_readable(),
                    &buffers.reprojection_map.bind_readable(),
                    &d0.samples.bind_readable(),
                    &d1.samples.bind_readable(),
                    &d0.colors.curr().bind_readable(),
                    &d1.colors.curr().bind_readable(),
                    &d0.history.curr().bind_readable(),
                    &d1.history.curr().bind_readable(),
                    &buffers.output.curr().bind_writable(),
                ])
                .build(device, &engine.shaders.frame_composition)
        } else {
            builder
                .bind([
                    &buffers.camera,
                    &buffers.geometry_map.curr().bind_readable(),
                    &buffers.reprojection_map.bind_readable(),
                    &d0.samples.bind_readable(),
                    &d1.samples.bind_readable(),
                    &d0.colors.curr().bind_readable(),
                    &d1.colors.curr().bind_readable(),
                    &d0.history.curr().bind_readable(),
                    &d1.history.curr().bind_readable(),
                    &buffers.composed.bind_writable(),
                ])
                .build(device, &engine.shaders.frame_composition)
        };

        Self {
            pass,
            planes: config.planes() as u32,
            demodulate: !passthrough as u32,
            passthrough,
        }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        // This pass uses 8x8 warps:
        let size = (camera.camera.viewport + 7) / 8;

        let camera_mode = if self.passthrough {
            gpu::CAMERA_MODE_SAMPLES
        } else {
            camera.camera.mode.serialize()
        };

        let params = gpu::FrameCompositionPassParams {
            camera_mode,
            planes: self.planes,
            demodulate: self.demodulate,
        };

        self.pass.run(camera, encoder, size, params);
    }
}
