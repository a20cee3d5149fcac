//! Global uniform bindings for camera, lights and shadow data
//!
//! Manages the per-frame uniform block shared by every object in the scene
//! together with the bind groups that expose it (and the shadow map) to the
//! lit and emissive pipelines. The depth-only pass gets its own, smaller
//! binding so the shadow map is never bound while it is being written.

use cgmath::{Deg, InnerSpace, Matrix4, Vector3};

use crate::{
    gfx::{
        camera::{camera_utils::convert_matrix4_to_array, FlyCamera},
        resources::TextureResource,
        scene::pool::{LightPool, MAX_POINT_LIGHTS},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// WGSL `DirLight`; every member is padded to a `vec4<f32>`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightUniform {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// WGSL `PointLight`; `attenuation` is `(constant, linear, quadratic, 0)`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
}

/// WGSL `SpotLight`; `cut_off` is `(cos inner, cos outer, 0, 0)`
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
    pub cut_off: [f32; 4],
}

/// Global uniform buffer content
///
/// MUST match `struct Globals` in the WGSL sources member for member; the
/// layout is checked against the shaders by `uniform_schema` when the
/// pipelines are built.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_space: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub dir_light: DirLightUniform,
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub spot_light: SpotLightUniform,
    pub point_light_count: u32,
    pub shininess: f32,
    pub shadow_bias: f32,
    pub shadow_texel_size: f32,
}
// 3 * 64 + 16 + 64 + 4 * 80 + 112 + 16 = 720 bytes

/// Fixed lighting parameters of the viewer
#[derive(Debug, Clone, Copy)]
pub struct LightingConfig {
    pub shininess: f32,
    pub dir_direction: Vector3<f32>,
    pub dir_ambient: f32,
    pub dir_diffuse: f32,
    pub dir_specular: f32,
    pub point_ambient: f32,
    /// Scales the light color for the diffuse term
    pub point_diffuse: f32,
    /// `(constant, linear, quadratic)`
    pub attenuation: Vector3<f32>,
    pub spot_cut_off: Deg<f32>,
    pub spot_outer_cut_off: Deg<f32>,
    pub spot_enabled: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            shininess: 32.0,
            dir_direction: Vector3::new(1.0, -1.0, 0.0),
            dir_ambient: 0.25,
            dir_diffuse: 0.4,
            dir_specular: 0.5,
            point_ambient: 0.05,
            point_diffuse: 0.8,
            attenuation: Vector3::new(1.0, 0.09, 0.032),
            spot_cut_off: Deg(12.5),
            spot_outer_cut_off: Deg(15.0),
            spot_enabled: true,
        }
    }
}

impl LightingConfig {
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_spotlight(mut self, enabled: bool) -> Self {
        self.spot_enabled = enabled;
        self
    }
}

fn splat(v: f32) -> [f32; 4] {
    [v, v, v, 0.0]
}

impl SceneUniforms {
    /// Assembles the uniform block for one frame
    ///
    /// Point light `i` is pool entry `i` (oldest first) and the count always
    /// equals the pool size. Unused array slots are zeroed.
    pub fn build(
        camera: &FlyCamera,
        lights: &LightPool,
        light_space: Matrix4<f32>,
        lighting: &LightingConfig,
        shadow_bias: f32,
        shadow_resolution: u32,
    ) -> Self {
        let mut point_lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
        let attenuation: [f32; 4] = lighting.attenuation.extend(0.0).into();

        for (slot, light) in point_lights.iter_mut().zip(lights.iter()) {
            *slot = PointLightUniform {
                position: light.position.extend(1.0).into(),
                ambient: splat(lighting.point_ambient),
                diffuse: (light.color * lighting.point_diffuse).extend(0.0).into(),
                specular: light.color.extend(0.0).into(),
                attenuation,
            };
        }

        let spot_strength = if lighting.spot_enabled { 1.0 } else { 0.0 };
        let spot_light = SpotLightUniform {
            position: camera.position.extend(1.0).into(),
            direction: camera.front().extend(0.0).into(),
            ambient: splat(0.0),
            diffuse: splat(spot_strength),
            specular: splat(spot_strength),
            attenuation,
            cut_off: [
                lighting.spot_cut_off.0.to_radians().cos(),
                lighting.spot_outer_cut_off.0.to_radians().cos(),
                0.0,
                0.0,
            ],
        };

        Self {
            view: convert_matrix4_to_array(camera.view_matrix()),
            projection: convert_matrix4_to_array(camera.projection_matrix()),
            light_space: convert_matrix4_to_array(light_space),
            view_position: camera.position.extend(1.0).into(),
            dir_light: DirLightUniform {
                direction: lighting.dir_direction.normalize().extend(0.0).into(),
                ambient: splat(lighting.dir_ambient),
                diffuse: splat(lighting.dir_diffuse),
                specular: splat(lighting.dir_specular),
            },
            point_lights,
            spot_light,
            point_light_count: lights.len() as u32,
            shininess: lighting.shininess,
            shadow_bias,
            shadow_texel_size: 1.0 / shadow_resolution.max(1) as f32,
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<SceneUniforms>;

/// Manages the bind group layout and bind group for global uniforms
///
/// Group 0 of the lit and emissive pipelines: the uniform block, the shadow
/// map and its comparison sampler.
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .next_binding_fragment(binding_types::depth_texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Comparison))
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Must be called again whenever the shadow map is recreated
    pub fn create_bind_group(
        &mut self,
        device: &wgpu::Device,
        ubo: &GlobalUBO,
        shadow_map: &TextureResource,
    ) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .texture(&shadow_map.view)
                .sampler(&shadow_map.sampler)
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// WGSL `ShadowGlobals` of the depth-only shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniforms {
    pub light_space: [[f32; 4]; 4],
}

pub type ShadowUBO = UniformBuffer<ShadowUniforms>;

/// Group 0 of the depth-only pipeline
pub struct ShadowBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl ShadowBindings {
    pub fn new(device: &wgpu::Device, ubo: &ShadowUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Shadow Globals Bind Group");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Shadow Globals Bind Group");

        Self {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::CameraSettings,
        scene::pool::PointLight,
    };
    use cgmath::{SquareMatrix, Zero};

    fn light(x: f32, color: Vector3<f32>) -> PointLight {
        PointLight {
            position: Vector3::new(x, 1.0, 0.0),
            color,
        }
    }

    fn build(lights: &LightPool) -> SceneUniforms {
        let camera = FlyCamera::new(Vector3::zero(), CameraSettings::default());
        SceneUniforms::build(
            &camera,
            lights,
            Matrix4::identity(),
            &LightingConfig::default(),
            0.005,
            1024,
        )
    }

    #[test]
    fn test_layout_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 80);
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 720);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn test_point_light_count_tracks_pool() {
        let mut lights = LightPool::new();
        assert_eq!(build(&lights).point_light_count, 0);

        for i in 0..(MAX_POINT_LIGHTS + 2) {
            lights.push(light(i as f32, Vector3::new(1.0, 1.0, 1.0)));
            let uniforms = build(&lights);
            assert_eq!(uniforms.point_light_count as usize, lights.len());
        }
    }

    #[test]
    fn test_point_lights_follow_pool_order() {
        let mut lights = LightPool::new();
        for i in 0..(MAX_POINT_LIGHTS + 1) {
            lights.push(light(i as f32, Vector3::new(1.0, 0.5, 0.0)));
        }

        let uniforms = build(&lights);
        for (slot, pooled) in uniforms.point_lights.iter().zip(lights.iter()) {
            assert_eq!(slot.position[0], pooled.position.x);
        }
        // Oldest entry was evicted, so slot 0 holds the second light
        assert_eq!(uniforms.point_lights[0].position[0], 1.0);
        assert_eq!(uniforms.point_lights[0].diffuse, [0.8, 0.4, 0.0, 0.0]);
        assert_eq!(uniforms.point_lights[0].attenuation, [1.0, 0.09, 0.032, 0.0]);
    }

    #[test]
    fn test_unused_slots_are_zeroed() {
        let mut lights = LightPool::new();
        lights.push(light(3.0, Vector3::new(1.0, 1.0, 1.0)));

        let uniforms = build(&lights);
        assert_eq!(uniforms.point_lights[1], PointLightUniform::default());
        assert_eq!(uniforms.point_lights[MAX_POINT_LIGHTS - 1], PointLightUniform::default());
    }

    #[test]
    fn test_spotlight_follows_camera() {
        let uniforms = build(&LightPool::new());
        let camera = FlyCamera::new(Vector3::zero(), CameraSettings::default());
        let front = camera.front();

        assert_eq!(uniforms.spot_light.direction, [front.x, front.y, front.z, 0.0]);
        assert!((uniforms.spot_light.cut_off[0] - 12.5f32.to_radians().cos()).abs() < 1e-6);
        assert!(uniforms.spot_light.cut_off[0] > uniforms.spot_light.cut_off[1]);
        assert!((uniforms.shadow_texel_size - 1.0 / 1024.0).abs() < 1e-9);
    }
}
