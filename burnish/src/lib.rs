//! Burnish is a real-time denoiser for low-sample-count path-traced images.
//!
//! Each frame the renderer hands over noisy radiance, a geometry buffer and
//! motion vectors; Burnish accumulates the samples temporally, fits a
//! least-squares model over fixed-size pixel blocks, optionally blends fits
//! of several block sizes, and anti-aliases the result against its own
//! history.
//!
//! ```no_run
//! # fn demo(device: &wgpu::Device, queue: &wgpu::Queue) {
//! use glam::uvec2;
//!
//! let engine = burnish::Engine::new(device, Default::default()).unwrap();
//!
//! let mut camera = engine.create_camera(
//!     device,
//!     burnish::Camera {
//!         viewport: uvec2(1280, 720),
//!         ..Default::default()
//!     },
//! );
//!
//! loop {
//!     camera.flush(queue);
//!
//!     // ... write camera.geometry_map(), camera.velocity_map() and
//!     // camera.samples(0) here ...
//!
//!     let mut encoder = device.create_command_encoder(&Default::default());
//!
//!     camera.denoise(&engine, &mut encoder);
//!     queue.submit([encoder.finish()]);
//!
//!     // ... display camera.output() ...
//! }
//! # }
//! ```

mod buffers;
mod camera;
mod camera_controller;
mod config;
mod shaders;

use log::info;

pub use burnish_gpu as gpu;

pub use self::buffers::*;
pub use self::camera::*;
pub use self::camera_controller::*;
pub use self::config::*;
pub(crate) use self::shaders::*;

pub struct Engine {
    shaders: Shaders,
    config: Config,
}

impl Engine {
    /// Loads the shaders and validates the configuration; the returned engine
    /// is immutable and shared by all cameras.
    ///
    /// This is the only place a configuration problem can surface - once the
    /// engine exists, every frame goes through.
    pub fn new(device: &wgpu::Device, config: Config) -> Result<Self, Error> {
        config.validate()?;

        info!("Initializing; config={config:?}");

        Ok(Self {
            shaders: Shaders::new(device),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn create_camera(
        &self,
        device: &wgpu::Device,
        camera: Camera,
    ) -> CameraController {
        CameraController::new(self, device, camera)
    }
}
