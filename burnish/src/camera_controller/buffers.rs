use log::debug;

use crate::{
    gpu, Camera, DoubleBuffered, Engine, MappedUniformBuffer, Texture,
};

/// Textures and uniforms backing one camera; all of them are sized to the
/// camera's viewport and live for as long as the viewport stays put.
#[derive(Debug)]
pub struct CameraBuffers {
    pub camera: MappedUniformBuffer<gpu::Camera>,
    pub prev_camera: MappedUniformBuffer<gpu::Camera>,

    /// Per-pixel geometry attributes ([`gpu::GBufferEntry`]); written by the
    /// renderer, double-buffered so that the previous frame's plane can
    /// validate reprojections.
    pub geometry_map: DoubleBuffered<Texture>,

    /// Per-pixel motion vectors, in screen pixels; written by the renderer.
    pub velocity_map: Texture,

    /// Per-pixel [`gpu::Reprojection`]; written by the reprojection pass,
    /// read by everything temporal.
    pub reprojection_map: Texture,

    /// Per-plane state; one entry for `Raw` / `Demodulated` radiance, two for
    /// `SplitDemodulated`.
    pub layers: Vec<LayerBuffers>,

    /// The composed (merged, remodulated) frame, before stabilization.
    pub composed: Texture,

    /// The stabilized frame; doubles as the anti-aliasing history.
    pub output: DoubleBuffered<Texture>,
}

/// Per-radiance-plane textures.
#[derive(Debug)]
pub struct LayerBuffers {
    /// This frame's noisy samples; written by the renderer.
    pub samples: Texture,

    /// Accumulated samples plus the per-pixel sample counter
    /// ([`gpu::AccumulatedSample`]).
    pub colors: DoubleBuffered<Texture>,

    /// Accumulated luminance moments ([`gpu::LumaMoments`]).
    pub moments: DoubleBuffered<Texture>,

    /// Per-scale fit outputs; empty unless the multi-scale blend is active,
    /// in which case there's one per block size, in ascending order.
    pub fits: Vec<Texture>,

    /// The (merged) fit of this frame.
    pub fitted: Texture,

    /// Temporally accumulated fits.
    pub history: DoubleBuffered<Texture>,
}

impl CameraBuffers {
    pub fn new(engine: &Engine, device: &wgpu::Device, camera: &Camera) -> Self {
        debug!("Initializing camera buffers");

        let config = engine.config();
        let size = camera.viewport;

        let camera_uniform = MappedUniformBuffer::new(
            device,
            "burnish_camera",
            camera.serialize(),
        );

        let prev_camera = MappedUniformBuffer::new(
            device,
            "burnish_prev_camera",
            camera.serialize(),
        );

        let geometry_map = DoubleBuffered::<Texture>::new(
            device,
            "burnish_geometry_map",
            size,
            wgpu::TextureFormat::Rgba32Float,
        );

        let velocity_map = Texture::new(
            device,
            "burnish_velocity_map",
            size,
            wgpu::TextureFormat::Rgba32Float,
        );

        let reprojection_map = Texture::new(
            device,
            "burnish_reprojection_map",
            size,
            wgpu::TextureFormat::Rgba32Float,
        );

        let layers = (0..config.planes())
            .map(|plane| LayerBuffers::new(engine, device, camera, plane))
            .collect();

        let composed = Texture::new(
            device,
            "burnish_composed",
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let output = DoubleBuffered::<Texture>::new(
            device,
            "burnish_output",
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        Self {
            camera: camera_uniform,
            prev_camera,
            geometry_map,
            velocity_map,
            reprojection_map,
            layers,
            composed,
            output,
        }
    }
}

impl LayerBuffers {
    fn new(
        engine: &Engine,
        device: &wgpu::Device,
        camera: &Camera,
        plane: usize,
    ) -> Self {
        let config = engine.config();
        let size = camera.viewport;

        let samples = Texture::new(
            device,
            format!("burnish_samples_d{plane}"),
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let colors = DoubleBuffered::<Texture>::new(
            device,
            format!("burnish_accum_colors_d{plane}"),
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let moments = DoubleBuffered::<Texture>::new(
            device,
            format!("burnish_accum_moments_d{plane}"),
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let fits = if config.scale.is_blend() {
            config
                .scale
                .edges()
                .iter()
                .map(|edge| {
                    Texture::new(
                        device,
                        format!("burnish_fit{edge}_d{plane}"),
                        size,
                        wgpu::TextureFormat::Rgba16Float,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        let fitted = Texture::new(
            device,
            format!("burnish_fitted_d{plane}"),
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        let history = DoubleBuffered::<Texture>::new(
            device,
            format!("burnish_fit_history_d{plane}"),
            size,
            wgpu::TextureFormat::Rgba16Float,
        );

        Self {
            samples,
            colors,
            moments,
            fits,
            fitted,
            history,
        }
    }
}
