/*
 * Application Module
 *
 * The nannou model for the sandbox: configuration, the active module, the
 * camera and the egui panel. Modules advance on a fixed timestep; the frame
 * loop accumulates real time and runs as many module steps as fit. While
 * paused, modules still get one tick per frame so hover queries and debug
 * counters stay live.
 */

use std::time::{Duration, Instant};

use log::{error, info, warn};
use nannou::prelude::*;
use nannou_egui::Egui;

use crate::camera::Camera;
use crate::debug::DebugInfo;
use crate::input::{key_pressed, mouse_moved, mouse_pressed, mouse_released, mouse_wheel, raw_window_event};
use crate::modules::{FrameContext, ModuleKind, SandboxModule};
use crate::params::{Config, SandboxConfig, CONFIG_PATH};
use crate::renderer::view;
use crate::ui;

// Cap on catch-up steps after a long frame
const MAX_STEPS_PER_FRAME: usize = 5;

pub struct Model {
    pub config: SandboxConfig,
    pub module: Box<dyn SandboxModule>,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    // Fixed timestep state
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
    pub start_time: Instant,
}

fn step_size(config: &SandboxConfig) -> Duration {
    Duration::from_secs_f32(1.0 / config.fixed_physics_fps.max(1.0))
}

pub fn model(app: &App) -> Model {
    // 80% of the primary monitor, or a fixed size when there is none
    let (window_width, window_height) = match app.primary_monitor() {
        Some(monitor) => {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        }
        None => {
            warn!("no primary monitor, using a default window size");
            (1280.0, 800.0)
        }
    };

    let window_id = app
        .new_window()
        .title("Spatial Sandbox")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .mouse_wheel(mouse_wheel)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .unwrap_or_else(|err| {
            error!("failed to create window: {}", err);
            std::process::exit(1);
        });

    let egui = match app.window(window_id) {
        Some(window) => Egui::from_window(&window),
        None => {
            error!("window {:?} disappeared after creation", window_id);
            std::process::exit(1);
        }
    };

    let config = SandboxConfig::load_or_default(CONFIG_PATH);
    let module = config.active_module.create(&config);
    let now = Instant::now();

    Model {
        physics_step_size: step_size(&config),
        module,
        config,
        egui,
        debug_info: DebugInfo::default(),
        camera: Camera::new(),
        mouse_position: Vec2::ZERO,
        physics_accumulator: Duration::ZERO,
        last_update_time: now,
        start_time: now,
    }
}

/// Replace the active module with a fresh instance of `kind`.
pub fn switch_module(model: &mut Model, kind: ModuleKind) {
    model.config.active_module = kind;
    model.module = kind.create(&model.config);
    model.camera.reset();
    model.debug_info = DebugInfo::default();
    model.physics_accumulator = Duration::ZERO;
}

pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;
    model.debug_info.begin_frame();

    let actions = ui::update_ui(&mut model.egui, &mut model.config, &model.debug_info, &model.camera);

    if actions.changes.module_changed {
        let kind = model.config.active_module;
        switch_module(model, kind);
    } else if actions.reset_module || actions.changes.population_changed {
        model.module.reset(&model.config);
    }
    if actions.changes.any_changed {
        model.physics_step_size = step_size(&model.config);
    }
    if actions.reset_camera {
        model.camera.reset();
    }
    if actions.save_config {
        match model.config.save_to_file(CONFIG_PATH) {
            Ok(()) => info!("saved config to {}", CONFIG_PATH),
            Err(err) => error!("failed to save config: {}", err),
        }
    }

    let now = Instant::now();
    let frame_time = now.duration_since(model.last_update_time);
    model.last_update_time = now;

    let window_rect = app.window_rect();
    let ctx = FrameContext {
        config: &model.config,
        mouse: model.camera.screen_to_world_point(model.mouse_position, window_rect),
        view: model.camera.visible_area(window_rect),
        time: now.duration_since(model.start_time).as_secs_f32(),
    };

    if model.config.pause_simulation {
        model.physics_accumulator = Duration::ZERO;
        model.module.update(&ctx, &mut model.debug_info);
        return;
    }

    model.physics_accumulator += frame_time;
    let mut steps = 0;
    while model.physics_accumulator >= model.physics_step_size {
        if steps == MAX_STEPS_PER_FRAME {
            // Too far behind; drop the backlog rather than spiral
            model.physics_accumulator = Duration::ZERO;
            break;
        }
        model.module.update(&ctx, &mut model.debug_info);
        model.physics_accumulator -= model.physics_step_size;
        steps += 1;
    }
    model.debug_info.physics_updates_per_frame = steps;
}
