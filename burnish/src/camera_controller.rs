mod buffers;
mod pass;
mod passes;

use std::ops::DerefMut;

use log::{debug, info};

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
use crate::{Camera, DenoiserMode, Engine, Texture};

/// Per-camera state of the denoiser: the history buffers sized to the
/// camera's viewport, plus the compute passes wired to them.
#[derive(Debug)]
pub struct CameraController {
    camera: Camera,
    buffers: CameraBuffers,
    passes: CameraPasses,
    frame: u32,
}

impl CameraController {
    pub(crate) fn new(
        engine: &Engine,
        device: &wgpu::Device,
        camera: Camera,
    ) -> Self {
        info!("Creating camera: {}", camera.describe());

        let buffers = CameraBuffers::new(engine, device, &camera);
        let passes = CameraPasses::new(engine, device, &camera, &buffers);

        debug!("Camera created");

        Self {
            camera,
            buffers,
            passes,
            frame: 0,
        }
    }

    pub fn update(
        &mut self,
        engine: &Engine,
        device: &wgpu::Device,
        camera: Camera,
    ) {
        let needs_rebuilding = self.camera.is_invalidated_by(&camera);

        self.camera = camera;

        if needs_rebuilding {
            // Resizing reallocates all of the per-pixel state; the fresh
            // (zeroed) previous geometry then reads as sky, reprojection
            // rejects it everywhere and the temporal history restarts, same
            // as after a disocclusion
            self.rebuild_buffers(engine, device);
            self.rebuild_passes(engine, device);
        } else {
            *self.buffers.prev_camera.deref_mut() = *self.buffers.camera;
            *self.buffers.camera.deref_mut() = self.camera.serialize();
        }
    }

    fn rebuild_buffers(&mut self, engine: &Engine, device: &wgpu::Device) {
        debug!("Rebuilding buffers for camera: {}", self.camera.describe());

        self.buffers = CameraBuffers::new(engine, device, &self.camera);
    }

    fn rebuild_passes(&mut self, engine: &Engine, device: &wgpu::Device) {
        debug!("Rebuilding passes for camera: {}", self.camera.describe());

        self.passes =
            CameraPasses::new(engine, device, &self.camera, &self.buffers);
    }

    /// Bumps the frame counter - flipping the double-buffered resources - and
    /// uploads dirty uniforms; call once per frame, before the inputs are
    /// written.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.frame = self.frame.wrapping_add(1);
        self.buffers.camera.flush(queue);
        self.buffers.prev_camera.flush(queue);
    }

    /// Encodes this frame's denoising passes.
    ///
    /// The renderer must have written [`Self::geometry_map()`],
    /// [`Self::velocity_map()`] and [`Self::samples()`] for the current frame
    /// already; the result lands in [`Self::output()`].
    pub fn denoise(
        &self,
        engine: &Engine,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        #[cfg(feature = "metrics")]
        let tt = std::time::Instant::now();

        if engine.config().mode == DenoiserMode::None {
            self.passes.frame_composition.run(self, encoder);
        } else {
            self.passes.frame_reprojection.run(self, encoder);
            self.passes.temporal_accumulation.run(self, encoder);
            self.passes.block_fit.run(self, encoder);
            self.passes.scale_blend.run(self, encoder);
            self.passes.fit_accumulation.run(self, encoder);
            self.passes.frame_composition.run(self, encoder);
            self.passes.frame_stabilization.run(self, encoder);
        }

        #[cfg(feature = "metrics")]
        log::trace!(
            "denoise() took {}",
            humantime::format_duration(tt.elapsed()),
        );
    }

    /// Which of the double-buffered resources is "current" this frame.
    pub fn is_alternate(&self) -> bool {
        self.frame % 2 == 1
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Current frame's geometry attributes; written by the renderer between
    /// [`Self::flush()`] and [`Self::denoise()`].
    pub fn geometry_map(&self) -> &Texture {
        self.buffers.geometry_map.get(self.is_alternate())
    }

    /// Current frame's motion vectors, in screen pixels; written by the
    /// renderer.
    pub fn velocity_map(&self) -> &Texture {
        &self.buffers.velocity_map
    }

    /// Current frame's noisy radiance; written by the renderer, one texture
    /// per plane of the configured [`crate::RadianceLayout`].
    pub fn samples(&self, plane: usize) -> &Texture {
        &self.buffers.layers[plane].samples
    }

    /// The denoised frame, valid after [`Self::denoise()`]'s encoder has been
    /// submitted.
    pub fn output(&self) -> &Texture {
        self.buffers.output.get(self.is_alternate())
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        info!("Deleting camera: {}", self.camera.describe());
    }
}
