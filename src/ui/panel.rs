//! Default UI panels for the Spectra viewer
//!
//! The inspector shows the camera, the spawn pools and the loaded models, and
//! lets the user rescale models, tune the placement depth and reset the pools.

use cgmath::Vector3;

use crate::gfx::{
    resources::LightingConfig,
    scene::{scene::Scene, Model},
};

/// Selection and edit state that survives between frames
#[derive(Debug, Clone, Default)]
pub struct InspectorState {
    pub selected_model: Option<usize>,
    /// Edit all three scale axes together
    pub uniform_scale: bool,
}

impl InspectorState {
    pub fn new() -> Self {
        Self {
            selected_model: None,
            uniform_scale: true,
        }
    }
}

/// Main inspector window
pub fn scene_inspector_panel(
    ui: &imgui::Ui,
    scene: &mut Scene,
    state: &mut InspectorState,
) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_width = (display_size[0] * 0.25).clamp(320.0, 460.0);

    ui.window("Spectra")
        .size([panel_width, display_size[1] * 0.7], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            ui.text(format!("{:.1} fps", ui.io().framerate));
            ui.separator();
            render_camera_section(ui, scene);
            render_spawn_section(ui, scene);
            render_lighting_section(ui, &mut scene.lighting);
            render_model_section(ui, scene, state);
            render_controls_help(ui);
        });
}

fn render_camera_section(ui: &imgui::Ui, scene: &mut Scene) {
    if !ui.collapsing_header("Camera", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    let camera = &mut scene.camera_manager.camera;
    let p = camera.position;
    ui.text(format!("Position  {:.2} {:.2} {:.2}", p.x, p.y, p.z));
    ui.text(format!(
        "Yaw {:.1}  Pitch {:.1}  FOV {:.1}",
        camera.yaw(),
        camera.pitch(),
        camera.zoom()
    ));
    ui.slider("Speed", 0.5, 30.0, &mut camera.movement_speed);
    ui.slider("Sensitivity", 0.01, 0.5, &mut camera.mouse_sensitivity);

    let following = scene.follow_target().is_some();
    let label = if following { "Stop following" } else { "Follow first model" };
    if ui.button(label) {
        scene.toggle_follow();
    }
    ui.spacing();
}

fn render_spawn_section(ui: &imgui::Ui, scene: &mut Scene) {
    if !ui.collapsing_header("Spawning", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    let mut depth = scene.unprojector.ndc_depth();
    if ui.slider("Placement depth", 0.5, 0.999, &mut depth) {
        scene.unprojector.set_ndc_depth(depth);
    }

    let objects = scene.objects();
    let lights = scene.lights();
    ui.text(format!("Cubes   {}/{}", objects.len(), objects.capacity()));
    ui.text(format!("Lights  {}/{}", lights.len(), lights.capacity()));

    for (i, light) in lights.iter().enumerate() {
        let c = light.color;
        ui.text_colored(
            [c.x, c.y, c.z, 1.0],
            format!(
                "  light {} at {:.1} {:.1} {:.1}",
                i, light.position.x, light.position.y, light.position.z
            ),
        );
    }

    if ui.button("Clear cubes and lights") {
        scene.clear_spawned();
    }
    ui.spacing();
}

fn render_lighting_section(ui: &imgui::Ui, lighting: &mut LightingConfig) {
    if !ui.collapsing_header("Lighting", imgui::TreeNodeFlags::empty()) {
        return;
    }

    ui.slider("Shininess", 1.0, 256.0, &mut lighting.shininess);
    ui.slider("Sun ambient", 0.0, 1.0, &mut lighting.dir_ambient);
    ui.slider("Sun diffuse", 0.0, 1.0, &mut lighting.dir_diffuse);
    ui.checkbox("Flashlight", &mut lighting.spot_enabled);
    ui.spacing();
}

fn render_model_section(ui: &imgui::Ui, scene: &mut Scene, state: &mut InspectorState) {
    if !ui.collapsing_header("Models", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    if scene.models.is_empty() {
        render_empty_state(ui);
        return;
    }

    ui.child_window("model_list")
        .size([0.0, 100.0])
        .border(true)
        .build(|| {
            for (i, model) in scene.models.iter().enumerate() {
                let is_selected = state.selected_model == Some(i);
                if ui
                    .selectable_config(&model.name)
                    .selected(is_selected)
                    .build()
                {
                    state.selected_model = Some(i);
                }
            }
        });

    let Some(index) = state.selected_model.filter(|i| *i < scene.models.len()) else {
        return;
    };

    let model = &mut scene.models[index];
    let mut position: [f32; 3] = model.position.into();
    if ui.slider_config("Position", -20.0, 20.0).build_array(&mut position) {
        model.position = position.into();
    }
    ui.checkbox("Visible", &mut model.visible);

    ui.checkbox("Uniform scale", &mut state.uniform_scale);
    let mut scale: [f32; 3] = model.scale().into();
    let changed = if state.uniform_scale {
        let changed = ui.slider("Scale", 0.05, 10.0, &mut scale[0]);
        scale = [scale[0]; 3];
        changed
    } else {
        ui.slider_config("Scale xyz", 0.05, 10.0).build_array(&mut scale)
    };
    if changed {
        scene.set_model_scale(index, Vector3::from(scale));
    }

    render_model_info(ui, &scene.models[index]);
}

fn render_model_info(ui: &imgui::Ui, model: &Model) {
    let bounds = model.world_bounds();
    let c = bounds.center();

    ui.columns(2, "model_stats", false);
    ui.text("Meshes");
    ui.next_column();
    ui.text(format!("{}", model.meshes().len()));
    ui.next_column();
    ui.text("Triangles");
    ui.next_column();
    ui.text(format!("{}", model.triangle_count()));
    ui.next_column();
    ui.text("Size");
    ui.next_column();
    ui.text(format!(
        "{:.2} x {:.2} x {:.2}",
        bounds.width(),
        bounds.height(),
        bounds.depth()
    ));
    ui.next_column();
    ui.text("Center");
    ui.next_column();
    ui.text(format!("{:.2} {:.2} {:.2}", c.x, c.y, c.z));
    ui.columns(1, "", false);
}

fn render_controls_help(ui: &imgui::Ui) {
    if ui.collapsing_header("Controls", imgui::TreeNodeFlags::empty()) {
        ui.text("WASD / arrows   move");
        ui.text("Right mouse     look around");
        ui.text("Scroll          zoom");
        ui.text("Left click      spawn cube");
        ui.text("Shift + click   spawn light");
        ui.text("F               follow model");
        ui.text("Esc             quit");
    }
}

/// Renders empty state when no models are loaded
fn render_empty_state(ui: &imgui::Ui) {
    ui.text("No models loaded");
    ui.text("Run: spectra path/to/model.obj");
}
