use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::ViewerConfig,
    error::AppError,
    gfx::{rendering::RenderEngine, scene::Scene},
    ui::{scene_inspector_panel, InspectorState, UiManager},
};

/// The viewer application: a winit event loop driving one [`Scene`]
pub struct SpectraApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    inspector: InspectorState,
    cursor_position: (f32, f32),
    modifiers: ModifiersState,
    last_frame: Instant,
    fatal_error: Option<AppError>,
}

impl SpectraApp {
    /// Create a new viewer with default settings
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(ViewerConfig::default())
    }

    /// Builds the scene and loads the configured model
    ///
    /// The window and GPU are created later, when the event loop resumes.
    pub fn with_config(config: ViewerConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::new()?;

        let mut scene = Scene::from_config(&config);
        if let Some(path) = &config.model_path {
            scene.load_model(path)?;
        }

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                inspector: InspectorState::new(),
                cursor_position: (0.0, 0.0),
                modifiers: ModifiersState::empty(),
                last_frame: Instant::now(),
                fatal_error: None,
            },
        })
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.app_state.scene
    }

    /// Runs until the window closes, Escape is pressed, or a fatal error occurs
    pub fn run(mut self) -> Result<(), AppError> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{}", err);
        self.fatal_error = Some(err);
        event_loop.exit();
    }

    fn create_window_and_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(PhysicalSize::new(width, height)),
            )?,
        );
        let (width, height) = window.inner_size().into();

        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            &self.config,
        ))?;

        self.scene.set_viewport(width, height);
        self.scene.init_gpu_resources(
            renderer.device(),
            renderer.queue(),
            renderer.material_bindings(),
        );

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed && !event.repeat;
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) if pressed => event_loop.exit(),
            PhysicalKey::Code(KeyCode::KeyF) if pressed => {
                let following = self.scene.toggle_follow();
                log::info!("follow camera {}", if following { "on" } else { "off" });
            }
            _ => self.scene.camera_manager.process_keyboard_event(event),
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Right => self.scene.camera_manager.process_mouse_button(state),
            MouseButton::Left if pressed && self.modifiers.shift_key() => {
                self.scene.spawn_light_with_random_color(self.cursor_position);
            }
            MouseButton::Left if pressed => {
                self.scene.spawn_object_at(self.cursor_position);
            }
            MouseButton::Middle if pressed => {
                self.scene.spawn_light_with_random_color(self.cursor_position);
            }
            _ => {}
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.scene.set_viewport(width, height);
        if let Some(render_engine) = self.render_engine.as_mut() {
            render_engine.resize(width, height);
        }
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            ui_manager.update_display_size(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window: &Window) {
        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        // The UI edits the scene before it is borrowed for rendering
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let scene = &mut self.scene;
            let inspector = &mut self.inspector;
            ui_manager.update_logic(window, |ui| {
                scene_inspector_panel(ui, scene, inspector);
            });
        }

        self.scene.update(delta_time);

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        render_engine.update(&self.scene);

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame(
                &self.scene,
                Some(|device: &wgpu::Device,
                      queue: &wgpu::Queue,
                      encoder: &mut wgpu::CommandEncoder,
                      view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view);
                }),
            ),
            None => render_engine.render_frame_simple(&self.scene),
        };

        if let Err(err) = result {
            self.fail(event_loop, AppError::Render(err));
        }
    }
}

/// Events the scene sees even when the UI captured them, or keys stick
fn always_forwarded(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::ModifiersChanged(_) | WindowEvent::Focused(_)
    ) || matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                state: ElementState::Released,
                ..
            },
            ..
        } | WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        }
    )
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.create_window_and_renderer(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) && !always_forwarded(&event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scene.camera_manager.process_scroll(&delta)
            }
            WindowEvent::Focused(false) => self.scene.camera_manager.controller.release_all(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.handle_resize(width, height)
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop, &window),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if self.ui_manager.as_ref().is_some_and(|ui| ui.wants_input()) {
            return;
        }

        if let DeviceEvent::MouseMotion { delta } = event {
            self.scene.camera_manager.process_mouse_motion(delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::DeviceId;

    #[test]
    fn test_releases_are_always_forwarded() {
        let release = WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Released,
            button: MouseButton::Right,
        };
        let press = WindowEvent::MouseInput {
            device_id: DeviceId::dummy(),
            state: ElementState::Pressed,
            button: MouseButton::Right,
        };

        assert!(always_forwarded(&release));
        assert!(always_forwarded(&WindowEvent::Focused(false)));
        assert!(!always_forwarded(&press));
        assert!(!always_forwarded(&WindowEvent::CloseRequested));
    }
}
