use std::path::Path;

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::ViewerConfig,
    error::AssetError,
    gfx::{
        bounds::BoundingBox,
        camera::camera_utils::CameraManager,
        geometry::{generate_cube, generate_plane},
        picking::Unprojector,
        resources::{global_bindings::LightingConfig, material::MaterialBindings},
    },
};

use super::{
    object::{Mesh, Model},
    pool::{LightPool, ObjectPool, PointLight, SpawnedObject},
};

/// Interactive scene state
///
/// The single owner of the camera, the loaded models and the spawn pools.
/// Input handlers mutate it, the renderer only reads it.
pub struct Scene {
    pub camera_manager: CameraManager,
    pub models: Vec<Model>,
    ground: Option<Model>,
    objects: ObjectPool,
    lights: LightPool,
    pub unprojector: Unprojector,
    /// Lighting parameters read by the renderer every frame
    pub lighting: LightingConfig,
    cube_mesh: Mesh,
    light_mesh: Mesh,
    light_marker_scale: f32,
    follow_target: Option<usize>,
    rng: StdRng,
}

impl Scene {
    /// Creates an empty scene around the given camera
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            models: Vec::new(),
            ground: None,
            objects: ObjectPool::new(),
            lights: LightPool::new(),
            unprojector: Unprojector::default(),
            lighting: LightingConfig::default(),
            cube_mesh: Mesh::from_geometry("spawn cube", &generate_cube()),
            light_mesh: Mesh::from_geometry("light marker", &generate_cube()),
            light_marker_scale: 0.2,
            follow_target: None,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut camera_manager =
            CameraManager::from_settings(config.camera_position, config.camera);
        let (width, height) = config.window_size;
        camera_manager.camera.set_viewport_dimensions(width, height);

        let mut scene = Self::new(camera_manager);
        scene.unprojector.set_ndc_depth(config.ndc_depth);
        scene.lighting = config.lighting;
        scene.set_light_marker_scale(config.light_marker_scale);
        if config.ground_plane {
            scene.ground = Some(
                Model::new(
                    "ground",
                    vec![Mesh::from_geometry("ground", &generate_plane(40.0, 40.0, 1, 1))],
                )
                .with_position(Vector3::new(0.0, -1.0, 0.0)),
            );
        }
        scene
    }

    /// Replaces the random source used for light colors
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn add_model(&mut self, model: Model) -> usize {
        log::info!("added model '{}'", model.name);
        self.models.push(model);
        self.models.len() - 1
    }

    pub fn load_model(&mut self, path: &Path) -> Result<usize, AssetError> {
        let model = Model::load_obj(path)?;
        Ok(self.add_model(model))
    }

    /// Places a cube under the cursor, evicting the oldest one when full
    pub fn spawn_object_at(&mut self, screen: (f32, f32)) -> Option<Vector3<f32>> {
        let Some(position) = self
            .unprojector
            .unproject_from_camera(screen, &self.camera_manager.camera)
        else {
            log::warn!("could not place object at {:?}", screen);
            return None;
        };

        if let Some(evicted) = self.objects.push(SpawnedObject { position }) {
            log::debug!("evicted object at {:?}", evicted.position);
        }
        log::info!("spawned object at {:?} ({}/{})", position, self.objects.len(), self.objects.capacity());
        Some(position)
    }

    /// Places a point light under the cursor, evicting the oldest one when full
    pub fn spawn_light_at(
        &mut self,
        screen: (f32, f32),
        color: Vector3<f32>,
    ) -> Option<Vector3<f32>> {
        let Some(position) = self
            .unprojector
            .unproject_from_camera(screen, &self.camera_manager.camera)
        else {
            log::warn!("could not place light at {:?}", screen);
            return None;
        };

        if let Some(evicted) = self.lights.push(PointLight { position, color }) {
            log::debug!("evicted light at {:?}", evicted.position);
        }
        log::info!("spawned light at {:?} ({}/{})", position, self.lights.len(), self.lights.capacity());
        Some(position)
    }

    pub fn spawn_light_with_random_color(&mut self, screen: (f32, f32)) -> Option<Vector3<f32>> {
        let color = self.random_light_color();
        self.spawn_light_at(screen, color)
    }

    /// Saturated enough to stay visible against the dark background
    pub fn random_light_color(&mut self) -> Vector3<f32> {
        Vector3::new(
            self.rng.random_range(0.2..=1.0),
            self.rng.random_range(0.2..=1.0),
            self.rng.random_range(0.2..=1.0),
        )
    }

    pub fn objects(&self) -> &ObjectPool {
        &self.objects
    }

    pub fn lights(&self) -> &LightPool {
        &self.lights
    }

    /// Empties both pools
    pub fn clear_spawned(&mut self) {
        self.objects.clear();
        self.lights.clear();
        log::info!("cleared spawned objects and lights");
    }

    /// Integrates held movement keys and the follow routine for one frame
    ///
    /// Following tracks the model's position, not the centre of its bounds.
    pub fn update(&mut self, delta_time: f32) {
        let target = self
            .follow_target
            .and_then(|index| self.models.get(index))
            .filter(|model| model.visible)
            .map(|model| model.position);

        if let Some(target) = target {
            self.camera_manager.camera.follow_target(target, delta_time);
        }
        self.camera_manager.update(delta_time);
    }

    /// Sets a model's absolute scale; returns `false` for an unknown index
    pub fn set_model_scale(&mut self, index: usize, scale: Vector3<f32>) -> bool {
        match self.models.get_mut(index) {
            Some(model) => {
                model.set_scale(scale);
                true
            }
            None => false,
        }
    }

    /// Union of every visible model in world space
    pub fn scene_bounds(&self) -> BoundingBox {
        let boxes: Vec<BoundingBox> = self
            .models
            .iter()
            .filter(|model| model.visible)
            .map(|model| model.world_bounds())
            .collect();
        BoundingBox::union_of(boxes.iter())
    }

    /// Starts or stops following the first model
    ///
    /// Returns whether following is active afterwards.
    pub fn toggle_follow(&mut self) -> bool {
        self.follow_target = match self.follow_target {
            Some(_) => None,
            None if !self.models.is_empty() => Some(0),
            None => {
                log::warn!("no model to follow");
                None
            }
        };
        self.follow_target.is_some()
    }

    pub fn follow_target(&self) -> Option<usize> {
        self.follow_target
    }

    pub fn ground(&self) -> Option<&Model> {
        self.ground.as_ref()
    }

    pub fn cube_mesh(&self) -> &Mesh {
        &self.cube_mesh
    }

    pub fn light_mesh(&self) -> &Mesh {
        &self.light_mesh
    }

    pub fn light_marker_scale(&self) -> f32 {
        self.light_marker_scale
    }

    pub fn set_light_marker_scale(&mut self, scale: f32) {
        self.light_marker_scale = scale;
        self.light_mesh.set_scale(Vector3::new(scale, scale, scale));
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera_manager.camera.set_viewport_dimensions(width, height);
    }

    /// Uploads every mesh that does not have GPU buffers yet
    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
    ) {
        for model in self.models.iter_mut().chain(self.ground.iter_mut()) {
            if model.meshes().iter().any(|mesh| !mesh.is_uploaded()) {
                model.init_gpu_resources(device, queue, bindings);
            }
        }
        for mesh in [&mut self.cube_mesh, &mut self.light_mesh] {
            if !mesh.is_uploaded() {
                mesh.init_gpu_resources(device, queue, bindings);
            }
        }
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            model_count: self.models.len(),
            object_count: self.objects.len(),
            light_count: self.lights.len(),
            total_triangles: self.models.iter().map(|m| m.triangle_count()).sum(),
            total_vertices: self.models.iter().map(|m| m.vertex_count()).sum(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub model_count: usize,
    pub object_count: usize,
    pub light_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
}
