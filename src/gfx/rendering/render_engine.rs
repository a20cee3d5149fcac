//! WGPU-based rendering engine for the Spectra viewer
//!
//! Every frame is recorded on one command encoder in a fixed order: a
//! depth-only pass from the shadow caster into the off-screen shadow map, the
//! lit color pass that samples it, then the optional UI overlay. The encoder
//! is submitted once, so the shadow map is complete before it is read.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use cgmath::Vector3;

use crate::{
    config::ViewerConfig,
    error::RenderError,
    gfx::{
        resources::{
            global_bindings::{
                GlobalBindings, GlobalUBO, SceneUniforms, ShadowBindings,
                ShadowUBO, ShadowUniforms,
            },
            instance_bindings::{InstanceBindings, InstanceSlot, InstanceUniform},
            material::MaterialBindings,
            texture_resource::TextureResource,
            uniform_schema::{globals_schema, shadow_schema},
        },
        scene::{
            object::DrawModel,
            pool::{PointLight, SpawnedObject, MAX_OBJECTS, MAX_POINT_LIGHTS},
            scene::Scene,
        },
    },
};

use super::{
    pipeline_manager::{PipelineConfig, PipelineManager},
    shaders,
    shadow::ShadowSettings,
};

const LIT_PIPELINE: &str = "Lit";
const LIGHT_CUBE_PIPELINE: &str = "LightCube";
const SHADOW_PIPELINE: &str = "Shadow";

/// Tint of click-spawned cubes
const SPAWNED_OBJECT_COLOR: Vector3<f32> = Vector3::new(0.9, 0.75, 0.55);
const WHITE: Vector3<f32> = Vector3::new(1.0, 1.0, 1.0);
/// Spawned cubes keep the unit size of the shared cube mesh
const UNIT_SCALE: Vector3<f32> = Vector3::new(1.0, 1.0, 1.0);

fn spawned_object_instance(object: &SpawnedObject) -> InstanceUniform {
    InstanceUniform::from_position_scale(object.position, UNIT_SCALE, SPAWNED_OBJECT_COLOR)
}

/// Light markers are drawn in their light's color at the marker scale
fn light_marker_instance(light: &PointLight, marker_scale: f32) -> InstanceUniform {
    InstanceUniform::from_position_scale(
        light.position,
        Vector3::new(marker_scale, marker_scale, marker_scale),
        light.color,
    )
}

/// Core rendering engine managing GPU resources and draw calls
///
/// Per-draw uniform slots for the object and light pools are allocated up
/// front at pool capacity; model slots are added when a model first appears.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    // Shadow mapping resources
    shadow_map: TextureResource,
    shadow_ubo: ShadowUBO,
    shadow_bindings: ShadowBindings,
    shadow_settings: ShadowSettings,

    material_bindings: MaterialBindings,
    instance_bindings: InstanceBindings,
    model_slots: Vec<InstanceSlot>,
    ground_slot: InstanceSlot,
    object_slots: Vec<InstanceSlot>,
    light_slots: Vec<InstanceSlot>,

    clear_color: wgpu::Color,
    shadow_debug: bool,
    frame_count: u64,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Compiles and validates every bundled shader and builds all pipelines.
    /// Any failure here is fatal for the viewer.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        viewer: &ViewerConfig,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let shadow_settings = viewer.shadow;
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_settings.resolution);

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo, &shadow_map);

        let shadow_ubo = ShadowUBO::new_with_data(
            &device,
            &ShadowUniforms {
                light_space: shadow_settings.light_space_matrix().into(),
            },
        );
        let shadow_bindings = ShadowBindings::new(&device, &shadow_ubo);

        let material_bindings = MaterialBindings::new(&device);
        let instance_bindings = InstanceBindings::new(&device);

        let object_slots = (0..MAX_OBJECTS)
            .map(|i| instance_bindings.create_slot(&device, &format!("Object Slot {}", i)))
            .collect();
        let light_slots = (0..MAX_POINT_LIGHTS)
            .map(|i| instance_bindings.create_slot(&device, &format!("Light Slot {}", i)))
            .collect();
        let ground_slot = instance_bindings.create_slot(&device, "Ground Slot");

        // Wrap device and queue in Arc for pipeline manager
        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("scene", shaders::SCENE, &globals_schema())?;
        pipeline_manager.load_shader("light_cube", shaders::LIGHT_CUBE, &globals_schema())?;
        pipeline_manager.load_shader("shadow_depth", shaders::SHADOW_DEPTH, &shadow_schema())?;

        // Both faces cast shadows so thin geometry does not leak light
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow_depth")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(
                    shadow_settings.depth_bias_constant,
                    shadow_settings.depth_bias_slope,
                )
                .with_bind_group_layouts(vec![
                    shadow_bindings.bind_group_layout().clone(),
                    instance_bindings.bind_group_layout().clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            LIT_PIPELINE,
            PipelineConfig::default()
                .with_label("LIT")
                .with_shader("scene")
                .with_color_format(format)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    instance_bindings.bind_group_layout().clone(),
                    material_bindings.bind_group_layout().clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            LIGHT_CUBE_PIPELINE,
            PipelineConfig::default()
                .with_label("LIGHT CUBE")
                .with_shader("light_cube")
                .with_color_format(format)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    instance_bindings.bind_group_layout().clone(),
                ]),
        );

        pipeline_manager.create_all_pipelines()?;

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            shadow_map,
            shadow_ubo,
            shadow_bindings,
            shadow_settings,
            material_bindings,
            instance_bindings,
            model_slots: Vec::new(),
            ground_slot,
            object_slots,
            light_slots,
            clear_color: viewer.clear_color,
            shadow_debug: viewer.shadow_debug,
            frame_count: 0,
        })
    }

    /// Uploads the per-frame uniforms for the current scene state
    ///
    /// Must be called before [`RenderEngine::render_frame`] every frame.
    pub fn update(&mut self, scene: &Scene) {
        let camera = &scene.camera_manager.camera;
        let light_space = self.shadow_settings.light_space_matrix();

        self.global_ubo.update_content(
            &self.queue,
            SceneUniforms::build(
                camera,
                scene.lights(),
                light_space,
                &scene.lighting,
                self.shadow_settings.compare_bias,
                self.shadow_settings.resolution,
            ),
        );
        self.shadow_ubo.update_content(
            &self.queue,
            ShadowUniforms {
                light_space: light_space.into(),
            },
        );

        while self.model_slots.len() < scene.models.len() {
            let label = format!("Model Slot {}", self.model_slots.len());
            self.model_slots
                .push(self.instance_bindings.create_slot(&self.device, &label));
        }
        for (slot, model) in self.model_slots.iter_mut().zip(&scene.models) {
            slot.update(&self.queue, InstanceUniform::from_matrix(model.transform(), WHITE));
        }

        if let Some(ground) = scene.ground() {
            self.ground_slot.update(
                &self.queue,
                InstanceUniform::from_matrix(ground.transform(), WHITE),
            );
        }

        for (slot, object) in self.object_slots.iter_mut().zip(scene.objects()) {
            slot.update(&self.queue, spawned_object_instance(object));
        }

        let marker = scene.light_marker_scale();
        for (slot, light) in self.light_slots.iter_mut().zip(scene.lights()) {
            slot.update(&self.queue, light_marker_instance(light, marker));
        }
    }

    /// Draws every mesh of the scene with the currently bound pipeline
    ///
    /// Group 1 is rebound per draw; group 2 is bound per mesh when `textured`.
    fn draw_scene_geometry<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        scene: &'a Scene,
        textured: bool,
        include_light_markers: bool,
    ) -> u32 {
        let mut draws = 0;

        for (slot, model) in self.model_slots.iter().zip(&scene.models) {
            if !model.visible {
                continue;
            }
            pass.set_bind_group(1, slot.bind_group(), &[]);
            if textured {
                pass.draw_model_textured(model, 2);
            } else {
                pass.draw_model(model);
            }
            draws += 1;
        }

        if let Some(ground) = scene.ground() {
            pass.set_bind_group(1, self.ground_slot.bind_group(), &[]);
            if textured {
                pass.draw_model_textured(ground, 2);
            } else {
                pass.draw_model(ground);
            }
            draws += 1;
        }

        for (slot, _) in self.object_slots.iter().zip(scene.objects()) {
            pass.set_bind_group(1, slot.bind_group(), &[]);
            if textured {
                pass.draw_mesh_textured(scene.cube_mesh(), 2);
            } else {
                pass.draw_mesh(scene.cube_mesh());
            }
            draws += 1;
        }

        if include_light_markers {
            draws += self.draw_light_markers(pass, scene);
        }

        draws
    }

    fn draw_light_markers<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, scene: &'a Scene) -> u32 {
        let mut draws = 0;
        for (slot, _) in self.light_slots.iter().zip(scene.lights()) {
            pass.set_bind_group(1, slot.bind_group(), &[]);
            pass.draw_mesh(scene.light_mesh());
            draws += 1;
        }
        draws
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame is skipped;
    /// running out of memory is returned as an error.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(err) => {
                log::warn!("skipping frame: {}", err);
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Depth from the shadow caster
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let size = self.shadow_settings.resolution as f32;
            shadow_pass.set_viewport(0.0, 0.0, size, size, 0.0, 1.0);

            if let Some(shadow_pipeline) = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE) {
                shadow_pass.set_pipeline(shadow_pipeline);
                shadow_pass.set_bind_group(0, self.shadow_bindings.bind_group(), &[]);

                let casters = self.draw_scene_geometry(&mut shadow_pass, scene, false, true);
                if self.shadow_debug {
                    log::info!(
                        "frame {}: shadow pass drew {} casters into {}x{} map",
                        self.frame_count,
                        casters,
                        self.shadow_settings.resolution,
                        self.shadow_settings.resolution
                    );
                }
            }
        }

        // PASS 2: Lit scene sampling the shadow map
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, globals, &[]);

                if let Some(pipeline) = self.pipeline_manager.get_pipeline(LIT_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    self.draw_scene_geometry(&mut render_pass, scene, true, false);
                }

                if let Some(pipeline) = self.pipeline_manager.get_pipeline(LIGHT_CUBE_PIPELINE) {
                    render_pass.set_pipeline(pipeline);
                    self.draw_light_markers(&mut render_pass, scene);
                }
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.frame_count += 1;
        Ok(())
    }

    /// Convenience method for rendering without UI
    pub fn render_frame_simple(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.render_frame(
            scene,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        )
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// A zero-area size (minimized window) is ignored. The shadow map keeps its
    /// fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used for creating compatible render targets and UI systems
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Layout every mesh material is created against
    pub fn material_bindings(&self) -> &MaterialBindings {
        &self.material_bindings
    }

    pub fn shadow_settings(&self) -> &ShadowSettings {
        &self.shadow_settings
    }

    pub fn set_shadow_debug(&mut self, enabled: bool) {
        self.shadow_debug = enabled;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Switches between vsync and immediate-style presentation
    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = if enable {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self.surface.configure(&self.device, &self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix4, Vector4};

    #[test]
    fn test_spawned_cube_keeps_unit_size() {
        let object = SpawnedObject {
            position: Vector3::new(1.0, 2.0, 3.0),
        };
        let instance = spawned_object_instance(&object);
        let model = Matrix4::from(instance.model);

        // Opposite corners of the unit cube stay one unit apart
        let a = model * Vector4::new(-0.5, -0.5, -0.5, 1.0);
        let b = model * Vector4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(b - a, Vector4::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(model * Vector4::new(0.0, 0.0, 0.0, 1.0), Vector4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(instance.color, [0.9, 0.75, 0.55, 1.0]);
    }

    #[test]
    fn test_light_marker_uses_light_color_and_marker_scale() {
        let light = PointLight {
            position: Vector3::new(0.0, 4.0, 0.0),
            color: Vector3::new(0.2, 0.6, 1.0),
        };
        let instance = light_marker_instance(&light, 0.25);
        let model = Matrix4::from(instance.model);

        assert_eq!(model.x.x, 0.25);
        assert_eq!(model.y.y, 0.25);
        assert_eq!(model.z.z, 0.25);
        assert_eq!(instance.color, [0.2, 0.6, 1.0, 1.0]);
    }
}
