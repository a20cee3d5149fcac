//! Diffuse and specular texture bindings for meshes
//!
//! A mesh without a texture of either kind binds a 1x1 white texture in its
//! place, so untextured meshes draw with their vertex color.

use crate::{
    gfx::resources::texture_resource::{ImageData, TextureResource},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
    },
};

/// Shared layout for group 2 of the lit pipeline
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let filtering = wgpu::SamplerBindingType::Filtering;
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(filtering))
            .create(device, "Material Bind Group");

        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn layout_with_desc(&self) -> &BindGroupLayoutWithDesc {
        &self.bind_group_layout
    }
}

/// GPU textures of one mesh
pub struct MeshMaterial {
    pub diffuse: TextureResource,
    pub specular: TextureResource,
    bind_group: wgpu::BindGroup,
}

impl MeshMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
        diffuse: Option<&ImageData>,
        specular: Option<&ImageData>,
        label: &str,
    ) -> Self {
        let upload = |image: Option<&ImageData>, kind: &str| match image {
            Some(image) => {
                TextureResource::from_image(device, queue, image, &format!("{} {}", label, kind))
            }
            None => TextureResource::white(device, queue),
        };
        let diffuse = upload(diffuse, "diffuse");
        let specular = upload(specular, "specular");

        let bind_group = BindGroupBuilder::new(bindings.layout_with_desc())
            .texture(&diffuse.view)
            .sampler(&diffuse.sampler)
            .texture(&specular.view)
            .sampler(&specular.sampler)
            .create(device, label);

        Self {
            diffuse,
            specular,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
