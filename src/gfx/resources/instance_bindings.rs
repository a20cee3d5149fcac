//! Per-draw transform and color uniforms
//!
//! Every drawable (loaded model, spawned cube slot, light marker slot) owns one
//! [`InstanceSlot`]. Slots for the pools are preallocated to pool capacity, so
//! spawning never allocates GPU memory.

use cgmath::{Matrix, Matrix4, SquareMatrix, Vector3};

use crate::{
    gfx::camera::camera_utils::convert_matrix4_to_array,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// WGSL `Instance`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, keeps normals correct under non-uniform scale
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceUniform {
    /// `translate(position) * scale(scale)`
    pub fn from_position_scale(
        position: Vector3<f32>,
        scale: Vector3<f32>,
        color: Vector3<f32>,
    ) -> Self {
        let model = Matrix4::from_translation(position)
            * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z);
        Self::from_matrix(model, color)
    }

    pub fn from_matrix(model: Matrix4<f32>, color: Vector3<f32>) -> Self {
        // A zero scale axis has no inverse; fall back to the model matrix itself
        let normal = model.invert().map(|m| m.transpose()).unwrap_or(model);
        Self {
            model: convert_matrix4_to_array(model),
            normal: convert_matrix4_to_array(normal),
            color: color.extend(1.0).into(),
        }
    }
}

impl Default for InstanceUniform {
    fn default() -> Self {
        Self::from_matrix(Matrix4::identity(), Vector3::new(1.0, 1.0, 1.0))
    }
}

/// Shared layout for group 1 of every pipeline
pub struct InstanceBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl InstanceBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Instance Bind Group");

        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn create_slot(&self, device: &wgpu::Device, label: &str) -> InstanceSlot {
        let ubo = UniformBuffer::new_with_data(device, &InstanceUniform::default());
        let bind_group = BindGroupBuilder::new(&self.bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, label);

        InstanceSlot { ubo, bind_group }
    }
}

/// One uniform buffer plus the bind group that exposes it
pub struct InstanceSlot {
    ubo: UniformBuffer<InstanceUniform>,
    bind_group: wgpu::BindGroup,
}

impl InstanceSlot {
    pub fn update(&mut self, queue: &wgpu::Queue, content: InstanceUniform) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_translate_then_scale() {
        let uniform = InstanceUniform::from_position_scale(
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(1.0, 0.0, 0.0),
        );
        let model = Matrix4::from(uniform.model);
        let p = model * Vector4::new(1.0, 1.0, 1.0, 1.0);

        assert_eq!(p, Vector4::new(3.0, 4.0, 5.0, 1.0));
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_scale_keeps_normal_matrix_finite() {
        let uniform = InstanceUniform::from_position_scale(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        assert!(uniform.normal.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_size_matches_wgsl_struct() {
        assert_eq!(std::mem::size_of::<InstanceUniform>(), 144);
    }
}
