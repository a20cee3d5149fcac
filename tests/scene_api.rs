//! Scene behavior that needs no GPU: spawning, pool eviction, bounds and
//! camera follow, driven through the public API.

use cgmath::{InnerSpace, Vector3};
use spectra::{
    gfx::{
        bounds::BoundingBox,
        geometry::{generate_cube, generate_plane},
        scene::{Mesh, Model, Scene, MAX_OBJECTS, MAX_POINT_LIGHTS},
    },
    ViewerConfig,
};

fn test_scene() -> Scene {
    let config = ViewerConfig::default()
        .with_window_size(800, 600)
        .with_ground_plane(false);
    Scene::from_config(&config).with_rng_seed(7)
}

fn cube_model(name: &str) -> Model {
    Model::new(name, vec![Mesh::from_geometry(name, &generate_cube())])
}

#[test]
fn center_click_lands_along_view_direction() {
    let mut scene = test_scene();
    let position = scene
        .spawn_object_at((400.0, 300.0))
        .expect("center of a valid viewport unprojects");

    let camera = &scene.camera_manager.camera;
    let direction = (position - camera.position).normalize();
    assert!((direction - camera.front()).magnitude() < 1e-3);
}

#[test]
fn clicks_fill_pools_then_evict_oldest() {
    let mut scene = test_scene();

    let placed: Vec<Vector3<f32>> = (0..MAX_OBJECTS + 3)
        .filter_map(|i| scene.spawn_object_at((50.0 * i as f32, 300.0)))
        .collect();
    assert_eq!(placed.len(), MAX_OBJECTS + 3);
    assert_eq!(scene.objects().len(), MAX_OBJECTS);

    let oldest = scene.objects().get(0).expect("pool is full").position;
    let newest = scene.objects().newest().expect("pool is full").position;
    assert_eq!(oldest, placed[3]);
    assert_eq!(newest, placed[MAX_OBJECTS + 2]);

    for _ in 0..MAX_POINT_LIGHTS * 2 {
        scene.spawn_light_with_random_color((400.0, 300.0));
    }
    assert_eq!(scene.lights().len(), MAX_POINT_LIGHTS);
    assert!(scene.lights().is_full());
}

#[test]
fn light_colors_stay_in_visible_range() {
    let mut scene = test_scene();
    for _ in 0..32 {
        let c = scene.random_light_color();
        for component in [c.x, c.y, c.z] {
            assert!((0.2..=1.0).contains(&component));
        }
    }
}

#[test]
fn scene_bounds_follow_model_scale_and_position() {
    let mut scene = test_scene();
    let cube = scene.add_model(cube_model("cube").with_position(Vector3::new(5.0, 0.0, 0.0)));
    scene.add_model(Model::new(
        "plane",
        vec![Mesh::from_geometry("plane", &generate_plane(2.0, 2.0, 1, 1))],
    ));

    assert!(scene.set_model_scale(cube, Vector3::new(2.0, 2.0, 2.0)));
    let bounds = scene.scene_bounds();
    assert!((bounds.max_x() - 6.0).abs() < 1e-5);
    assert!((bounds.min_x() + 1.0).abs() < 1e-5);
    assert!((bounds.height() - 2.0).abs() < 1e-5);

    assert!(!scene.set_model_scale(42, Vector3::new(1.0, 1.0, 1.0)));
}

#[test]
fn empty_bounds_union_is_zero_box() {
    let bounds = BoundingBox::union_of(std::iter::empty());
    assert_eq!(bounds, BoundingBox::zero());
}

#[test]
fn follow_pulls_camera_toward_model() {
    let mut scene = test_scene();
    scene.add_model(cube_model("target").with_position(Vector3::new(0.0, 0.0, -20.0)));
    assert!(scene.toggle_follow());

    let start = scene.camera_manager.camera.position;
    for _ in 0..10 {
        scene.update(1.0 / 60.0);
    }
    let end = scene.camera_manager.camera.position;
    assert!(end.z < start.z);

    assert!(!scene.toggle_follow());
    assert_eq!(scene.follow_target(), None);
}

#[test]
fn statistics_count_spawned_entities() {
    let mut scene = test_scene();
    scene.add_model(cube_model("cube"));
    scene.spawn_object_at((400.0, 300.0));
    scene.spawn_light_with_random_color((400.0, 300.0));

    let stats = scene.get_statistics();
    assert_eq!(stats.model_count, 1);
    assert_eq!(stats.object_count, 1);
    assert_eq!(stats.light_count, 1);
    assert_eq!(stats.total_triangles, 12);
}

#[test]
fn package_readme_is_present() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("README.md");
    let readme = std::fs::read_to_string(&path).expect("README.md referenced by Cargo.toml");
    assert!(readme.contains("# Spectra"));
    assert!(readme.contains("spectra::run"));
}
