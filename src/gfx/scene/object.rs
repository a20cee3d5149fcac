use std::{collections::HashMap, ops::Range, path::Path};

use cgmath::{Matrix4, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    error::AssetError,
    gfx::{
        bounds::{BoundingBox, ScaledBounds},
        geometry::GeometryData,
        resources::{
            material::{MaterialBindings, MeshMaterial},
            texture_resource::ImageData,
        },
    },
};

use super::vertex::Vertex3D;

struct MeshGpuResources {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    material: MeshMaterial,
}

/// Triangle mesh with optional diffuse and specular textures
///
/// Bounds are computed once from the vertex positions; scale changes are
/// recomputed from that cached box.
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    diffuse: Option<ImageData>,
    specular: Option<ImageData>,
    bounds: ScaledBounds,
    gpu_resources: Option<MeshGpuResources>,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let bounds = BoundingBox::compute_from_points(
            vertices.iter().map(|v| Vector3::from(v.position)),
        );

        Self {
            name: name.to_string(),
            vertices,
            indices,
            diffuse: None,
            specular: None,
            bounds: ScaledBounds::new(bounds),
            gpu_resources: None,
        }
    }

    pub fn from_geometry(name: &str, geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(name, vertices, indices)
    }

    pub fn with_textures(mut self, diffuse: Option<ImageData>, specular: Option<ImageData>) -> Self {
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Area-weighted vertex normals for meshes that ship without them
    pub fn calculate_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }

            let v0 = Vector3::from(positions[i0]);
            let edge1 = Vector3::from(positions[i1]) - v0;
            let edge2 = Vector3::from(positions[i2]) - v0;
            let face_normal = edge1.cross(edge2);

            for index in [i0, i1, i2] {
                normals[index] += face_normal;
            }
        }

        normals
            .into_iter()
            .map(|n| {
                let length = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
                if length > 0.0 {
                    (n / length).into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect()
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn has_diffuse(&self) -> bool {
        self.diffuse.is_some()
    }

    pub fn has_specular(&self) -> bool {
        self.specular.is_some()
    }

    /// Object-space scale, applied to the cached unscaled box
    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.bounds.set_scale(scale);
    }

    pub fn bounds(&self) -> &BoundingBox {
        self.bounds.current()
    }

    pub fn unscaled_bounds(&self) -> &BoundingBox {
        self.bounds.unscaled()
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu_resources.is_some()
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
    ) {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let material = MeshMaterial::new(
            device,
            queue,
            bindings,
            self.diffuse.as_ref(),
            self.specular.as_ref(),
            &self.name,
        );

        log::debug!(
            "uploaded mesh '{}': {} vertices, {} indices",
            self.name,
            self.vertices.len(),
            self.indices.len()
        );

        self.gpu_resources = Some(MeshGpuResources {
            vertex_buffer,
            index_buffer,
            material,
        });
    }

    pub fn material_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|gpu| gpu.material.bind_group())
    }
}

/// A loaded model: meshes sharing one translate-then-scale transform
pub struct Model {
    pub name: String,
    meshes: Vec<Mesh>,
    pub position: Vector3<f32>,
    pub visible: bool,
    bounds: ScaledBounds,
}

impl Model {
    pub fn new(name: &str, meshes: Vec<Mesh>) -> Self {
        let bounds = BoundingBox::union_of(meshes.iter().map(|m| m.unscaled_bounds()));
        Self {
            name: name.to_string(),
            meshes,
            position: Vector3::new(0.0, 0.0, 0.0),
            visible: true,
            bounds: ScaledBounds::new(bounds),
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.set_scale(scale);
        self
    }

    /// Imports a Wavefront OBJ with its MTL textures
    ///
    /// Faces are triangulated and indexed with a single index buffer. Texture
    /// paths are resolved relative to the OBJ file; a texture that fails to
    /// decode is logged and the mesh falls back to the white texture.
    pub fn load_obj(path: &Path) -> Result<Self, AssetError> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| AssetError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let materials = materials.unwrap_or_else(|err| {
            log::warn!("no usable MTL for {}: {}", path.display(), err);
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut texture_cache: HashMap<String, Option<ImageData>> = HashMap::new();
        let mut load_texture = |name: Option<&String>| -> Option<ImageData> {
            let name = name.filter(|n| !n.is_empty())?;
            texture_cache
                .entry(name.clone())
                .or_insert_with(|| match ImageData::load(&base_dir.join(name)) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        log::warn!("{}", err);
                        None
                    }
                })
                .clone()
        };

        let mut meshes = Vec::with_capacity(models.len());
        for model in &models {
            let mesh = &model.mesh;
            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            } else {
                log::debug!("mesh '{}' has no normals, computing them", model.name);
                Mesh::calculate_normals(&positions, &mesh.indices)
            };

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, position)| Vertex3D {
                    position: *position,
                    normal: normals[i],
                    color: if mesh.vertex_color.len() == mesh.positions.len() {
                        [
                            mesh.vertex_color[i * 3],
                            mesh.vertex_color[i * 3 + 1],
                            mesh.vertex_color[i * 3 + 2],
                        ]
                    } else {
                        [1.0, 1.0, 1.0]
                    },
                    uv: if mesh.texcoords.len() >= (i + 1) * 2 {
                        [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                    } else {
                        [0.0, 0.0]
                    },
                })
                .collect();

            let material = mesh.material_id.and_then(|id| materials.get(id));
            let diffuse = material.and_then(|m| load_texture(m.diffuse_texture.as_ref()));
            let specular = material.and_then(|m| load_texture(m.specular_texture.as_ref()));

            meshes.push(
                Mesh::new(&model.name, vertices, mesh.indices.clone())
                    .with_textures(diffuse, specular),
            );
        }

        if meshes.is_empty() {
            return Err(AssetError::EmptyModel(path.to_path_buf()));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        let model = Self::new(&name, meshes);

        log::info!(
            "loaded model '{}': {} meshes, {} triangles, bounds {:?}..{:?}",
            model.name,
            model.meshes.len(),
            model.triangle_count(),
            model.bounds().min(),
            model.bounds().max()
        );

        Ok(model)
    }

    /// Sets the absolute scale of the model and every child mesh
    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        for mesh in &mut self.meshes {
            mesh.set_scale(scale);
        }
        self.bounds.set_scale(scale);
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.bounds.scale()
    }

    /// `translate(position) * scale(scale)`
    pub fn transform(&self) -> Matrix4<f32> {
        let s = self.scale();
        Matrix4::from_translation(self.position) * Matrix4::from_nonuniform_scale(s.x, s.y, s.z)
    }

    /// Scaled bounds in object space
    pub fn bounds(&self) -> &BoundingBox {
        self.bounds.current()
    }

    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds.current().translate(self.position)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
    ) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device, queue, bindings);
        }
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
    /// Binds each mesh's textures at `material_group` before drawing it
    fn draw_mesh_textured(&mut self, mesh: &'a Mesh, material_group: u32);
    fn draw_model(&mut self, model: &'a Model);
    fn draw_model_textured(&mut self, model: &'a Model, material_group: u32);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        // Skip meshes that were never uploaded
        let Some(gpu) = &mesh.gpu_resources else {
            return;
        };

        self.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        self.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count(), 0, instances);
    }

    fn draw_mesh_textured(&mut self, mesh: &'b Mesh, material_group: u32) {
        let Some(gpu) = &mesh.gpu_resources else {
            return;
        };

        self.set_bind_group(material_group, gpu.material.bind_group(), &[]);
        self.draw_mesh(mesh);
    }

    fn draw_model(&mut self, model: &'b Model) {
        for mesh in &model.meshes {
            self.draw_mesh(mesh);
        }
    }

    fn draw_model_textured(&mut self, model: &'b Model, material_group: u32) {
        for mesh in &model.meshes {
            self.draw_mesh_textured(mesh, material_group);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{generate_cube, generate_plane};
    use std::io::Write;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_cube_mesh_bounds() {
        let mesh = Mesh::from_geometry("cube", &generate_cube());
        let bounds = mesh.bounds();
        assert!(close(bounds.width(), 1.0));
        assert!(close(bounds.min_y(), -0.5));
        assert!(close(bounds.max_z(), 0.5));
    }

    #[test]
    fn test_model_bounds_are_union_of_meshes() {
        let cube = Mesh::from_geometry("cube", &generate_cube());
        let plane = Mesh::from_geometry("plane", &generate_plane(10.0, 4.0, 1, 1));
        let model = Model::new("pair", vec![cube, plane]);

        let bounds = model.bounds();
        assert!(close(bounds.min_x(), -5.0));
        assert!(close(bounds.max_x(), 5.0));
        assert!(close(bounds.min_z(), -2.0));
        assert!(close(bounds.max_y(), 0.5));
    }

    #[test]
    fn test_repeated_rescale_does_not_compound() {
        let mut model = Model::new("cube", vec![Mesh::from_geometry("cube", &generate_cube())]);

        model.set_scale(Vector3::new(2.0, 2.0, 2.0));
        model.set_scale(Vector3::new(2.0, 2.0, 2.0));
        model.set_scale(Vector3::new(2.0, 2.0, 2.0));

        assert!(close(model.bounds().width(), 2.0));
        assert!(close(model.meshes()[0].bounds().width(), 2.0));
        assert!(close(model.meshes()[0].unscaled_bounds().width(), 1.0));
    }

    #[test]
    fn test_world_bounds_follow_position() {
        let model = Model::new("cube", vec![Mesh::from_geometry("cube", &generate_cube())])
            .with_position(Vector3::new(3.0, 0.0, 0.0))
            .with_scale(Vector3::new(2.0, 1.0, 1.0));

        let world = model.world_bounds();
        assert!(close(world.min_x(), 2.0));
        assert!(close(world.max_x(), 4.0));
        assert!(close(world.center().x, 3.0));
    }

    #[test]
    fn test_transform_is_translate_then_scale() {
        let model = Model::new("cube", vec![Mesh::from_geometry("cube", &generate_cube())])
            .with_position(Vector3::new(1.0, 0.0, 0.0))
            .with_scale(Vector3::new(3.0, 3.0, 3.0));

        let p = model.transform() * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(close(p.x, 4.0));
    }

    #[test]
    fn test_calculate_normals_for_ccw_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = Mesh::calculate_normals(&positions, &[0, 1, 2]);

        for n in normals {
            assert!(close(n[2], 1.0));
        }
    }

    #[test]
    fn test_unused_vertex_gets_up_normal() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = Mesh::calculate_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_load_missing_obj_is_an_error() {
        let result = Model::load_obj(Path::new("no/such/model.obj"));
        assert!(matches!(result, Err(AssetError::Obj { .. })));
    }

    #[test]
    fn test_load_obj_without_normals_or_mtl() {
        let path = std::env::temp_dir().join(format!("spectra_quad_{}.obj", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "o quad\nv -1 0 -1\nv 1 0 -1\nv 1 0 1\nv -1 0 1\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 4/4 3/3 2/2"
        )
        .unwrap();
        drop(file);

        let model = Model::load_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.triangle_count(), 2);
        assert!(close(model.bounds().width(), 2.0));
        assert!(close(model.bounds().height(), 0.0));

        let mesh = &model.meshes()[0];
        assert!(!mesh.has_diffuse());
        assert!(mesh.vertices().iter().all(|v| close(v.normal[1].abs(), 1.0)));
    }
}
