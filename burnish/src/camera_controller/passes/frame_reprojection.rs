use crate::{
    Camera, CameraBuffers, CameraComputePass, CameraController, Engine,
};

#[derive(Debug)]
pub struct FrameReprojectionPass {
    pass: CameraComputePass,
}

impl FrameReprojectionPass {
    pub fn new(
        engine: &Engine,
        device: &wgpu::Device,
        _: &Camera,
        buffers: &CameraBuffers,
    ) -> Self {
        let pass = CameraComputePass::builder("frame_reprojection")
            .bind([
                &buffers.camera,
                &buffers.prev_camera,
                &buffers.geometry_map.curr().bind_readable(),
                &buffers.geometry_map.past().bind_readable(),
                &buffers.velocity_map.bind_readable(),
                &buffers.reprojection_map.bind_writable(),
            ])
            .build(device, &engine.shaders.frame_reprojection);

        Self { pass }
    }

    pub fn run(
        &self,
        camera: &CameraController,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        // This pass uses 8x8 warps:
        let size = (camera.camera.viewport + 7) / 8;

        self.pass.run(camera, encoder, size, ());
    }
}
