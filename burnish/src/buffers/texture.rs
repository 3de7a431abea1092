use glam::UVec2;
use log::debug;

use crate::Bindable;

/// A render-resolution image bound to the compute passes as a storage
/// texture; the shaders read and write texels directly, no samplers involved.
#[derive(Debug)]
pub struct Texture {
    tex: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
}

impl Texture {
    pub fn new(
        device: &wgpu::Device,
        label: impl AsRef<str>,
        size: UVec2,
        format: wgpu::TextureFormat,
    ) -> Self {
        let label = label.as_ref();

        debug!("Allocating texture `{label}`; size={size:?} format={format:?}");

        assert!(size.x > 0);
        assert!(size.y > 0);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = tex.create_view(&Default::default());

        Self { tex, view, format }
    }

    pub fn tex(&self) -> &wgpu::Texture {
        &self.tex
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn bind_readable(&self) -> impl Bindable + '_ {
        TextureBinder {
            parent: self,
            access: wgpu::StorageTextureAccess::ReadOnly,
        }
    }

    pub fn bind_writable(&self) -> impl Bindable + '_ {
        TextureBinder {
            parent: self,
            access: wgpu::StorageTextureAccess::ReadWrite,
        }
    }
}

struct TextureBinder<'a> {
    parent: &'a Texture,
    access: wgpu::StorageTextureAccess,
}

impl Bindable for TextureBinder<'_> {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)> {
        let layout = wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: self.access,
                format: self.parent.format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        let resource = wgpu::BindingResource::TextureView(&self.parent.view);

        vec![(layout, resource)]
    }
}
