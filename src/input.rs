/*
 * Input Module
 *
 * Window event handlers. Clicks go to the active module first; modules that
 * don't use the click (and allow it) get camera panning instead. Keys that
 * the shell doesn't claim are forwarded to the module.
 *
 * Shell keys: Tab cycles modules, P pauses, D toggles debug drawing,
 * C recentres the camera.
 */

use log::info;
use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use crate::app::{switch_module, Model};

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let new_pos = Vec2::new(pos.x, pos.y);

    if model.camera.is_dragging {
        model.camera.drag(new_pos);
    }

    model.mouse_position = new_pos;
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left {
        return;
    }
    // Clicks on the control panel belong to egui
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let world = model.camera.screen_to_world_point(model.mouse_position, app.window_rect());
    let consumed = model.module.mouse_pressed(world, &model.config);
    if !consumed && model.config.active_module.camera_drag() {
        model.camera.start_drag(model.mouse_position);
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }
    let window_rect = app.window_rect();
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            model.camera.zoom(vec2(x, y), model.mouse_position, window_rect);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            model.camera.zoom(vec2(pos.x as f32, pos.y as f32) * 0.01, model.mouse_position, window_rect);
        }
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::Tab => {
            let next = model.config.active_module.next();
            switch_module(model, next);
        }
        Key::P => {
            model.config.pause_simulation = !model.config.pause_simulation;
            info!("simulation {}", if model.config.pause_simulation { "paused" } else { "resumed" });
        }
        Key::D => model.config.show_debug = !model.config.show_debug,
        Key::C => model.camera.reset(),
        _ => model.module.key_pressed(key, &model.config),
    }
}

// Pass raw events through to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
