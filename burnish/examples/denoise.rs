//! Headless demo: renders a synthetic noisy "wall with a painted square",
//! runs the denoiser over a couple of frames and writes the result into
//! `denoise.png`.
//!
//! Run with `cargo run --release --example denoise`.

use burnish::gpu::GBufferEntry;
use glam::{uvec2, vec3, Mat4, UVec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VIEWPORT: UVec2 = uvec2(256, 256);
const FRAMES: u32 = 32;

fn main() {
    pollster::block_on(run());
}

async fn run() {
    let instance = wgpu::Instance::default();

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: None,
        })
        .await
        .expect("no suitable adapter found");

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                features: wgpu::Features::PUSH_CONSTANTS
                    | wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES,
                limits: wgpu::Limits {
                    max_push_constant_size: 128,
                    ..Default::default()
                },
            },
            None,
        )
        .await
        .expect("no suitable device found");

    let engine =
        burnish::Engine::new(&device, Default::default()).unwrap();

    let mut camera = engine.create_camera(
        &device,
        burnish::Camera {
            viewport: VIEWPORT,
            projection_view: Mat4::IDENTITY,
            ..Default::default()
        },
    );

    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..FRAMES {
        camera.flush(&queue);

        write_geometry(&queue, &camera);
        write_velocities(&queue, &camera);
        write_samples(&queue, &camera, &mut rng);

        let mut encoder = device.create_command_encoder(&Default::default());

        camera.denoise(&engine, &mut encoder);
        queue.submit([encoder.finish()]);
    }

    let image = read_output(&device, &queue, &camera).await;

    image.save("denoise.png").unwrap();

    println!("saved denoise.png");
}

/// A flat wall facing the camera, gray except for a reddish square painted in
/// the middle; constant across frames, so the temporal history converges.
fn scene(pos: UVec2) -> GBufferEntry {
    let in_square = pos.x >= 96 && pos.x < 160 && pos.y >= 96 && pos.y < 160;

    let albedo = if in_square {
        vec3(0.8, 0.2, 0.2)
    } else {
        vec3(0.6, 0.6, 0.6)
    };

    GBufferEntry {
        albedo,
        material: if in_square { 1 } else { 0 },
        normal: vec3(0.0, 0.0, 1.0),
        depth: 10.0,
    }
}

/// Expected radiance of a pixel; the noisy samples scatter around this.
fn radiance(pos: UVec2) -> Vec3 {
    // A soft horizontal lighting gradient over the wall's albedo
    scene(pos).albedo * (0.25 + 0.75 * (pos.x as f32) / (VIEWPORT.x as f32))
}

fn write_geometry(queue: &wgpu::Queue, camera: &burnish::CameraController) {
    let mut data = Vec::with_capacity((VIEWPORT.x * VIEWPORT.y) as usize * 4);

    for y in 0..VIEWPORT.y {
        for x in 0..VIEWPORT.x {
            let texel = scene(uvec2(x, y)).pack();

            data.extend_from_slice(&texel.to_array());
        }
    }

    write_texture(queue, camera.geometry_map(), bytemuck::cast_slice(&data), 16);
}

fn write_velocities(queue: &wgpu::Queue, camera: &burnish::CameraController) {
    // The camera doesn't move, so everything reprojects onto itself
    let data =
        vec![0.0f32; (VIEWPORT.x * VIEWPORT.y) as usize * 4];

    write_texture(queue, camera.velocity_map(), bytemuck::cast_slice(&data), 16);
}

fn write_samples(
    queue: &wgpu::Queue,
    camera: &burnish::CameraController,
    rng: &mut StdRng,
) {
    let mut data = Vec::with_capacity((VIEWPORT.x * VIEWPORT.y) as usize * 4);

    for y in 0..VIEWPORT.y {
        for x in 0..VIEWPORT.x {
            let mean = radiance(uvec2(x, y));

            for c in 0..3 {
                let sample = mean[c] * rng.gen_range(0.0..2.0);

                data.push(f16_encode(sample));
            }

            data.push(f16_encode(1.0));
        }
    }

    write_texture(queue, camera.samples(0), bytemuck::cast_slice(&data), 8);
}

fn write_texture(
    queue: &wgpu::Queue,
    texture: &burnish::Texture,
    data: &[u8],
    texel_size: u32,
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: texture.tex(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(texel_size * VIEWPORT.x),
            rows_per_image: Some(VIEWPORT.y),
        },
        wgpu::Extent3d {
            width: VIEWPORT.x,
            height: VIEWPORT.y,
            depth_or_array_layers: 1,
        },
    );
}

async fn read_output(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    camera: &burnish::CameraController,
) -> image::RgbImage {
    // Rgba16Float, so 8 bytes per texel; 256*8 is already a multiple of the
    // 256-byte row alignment the copy requires
    let bytes_per_row = VIEWPORT.x * 8;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("burnish_readback"),
        size: (bytes_per_row * VIEWPORT.y) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&Default::default());

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: camera.output().tex(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(VIEWPORT.y),
            },
        },
        wgpu::Extent3d {
            width: VIEWPORT.x,
            height: VIEWPORT.y,
            depth_or_array_layers: 1,
        },
    );

    queue.submit([encoder.finish()]);

    let (tx, rx) = std::sync::mpsc::channel();

    buffer
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });

    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap().unwrap();

    let data = buffer.slice(..).get_mapped_range();
    let texels: &[u16] = bytemuck::cast_slice(&data);

    image::RgbImage::from_fn(VIEWPORT.x, VIEWPORT.y, |x, y| {
        let idx = ((y * VIEWPORT.x + x) * 4) as usize;

        let texel = |c: usize| {
            let value = f16_decode(texels[idx + c]);

            (value.clamp(0.0, 1.0) * 255.0) as u8
        };

        image::Rgb([texel(0), texel(1), texel(2)])
    })
}

// -----------------------------------------------------------------------------

fn f16_encode(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32 - 127 + 15;
    let frac = bits & 0x7f_ffff;

    if exp <= 0 {
        // Flushing subnormals to zero is fine at this precision
        sign
    } else if exp >= 31 {
        sign | 0x7c00
    } else {
        sign | ((exp as u16) << 10) | (frac >> 13) as u16
    }
}

fn f16_decode(value: u16) -> f32 {
    let sign = ((value as u32) & 0x8000) << 16;
    let exp = ((value >> 10) & 0x1f) as u32;
    let frac = ((value & 0x3ff) as u32) << 13;

    if exp == 0 {
        f32::from_bits(sign)
    } else if exp == 31 {
        f32::from_bits(sign | 0x7f80_0000 | frac)
    } else {
        f32::from_bits(sign | ((exp + 112) << 23) | frac)
    }
}
