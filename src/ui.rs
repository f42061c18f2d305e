/*
 * UI Module
 *
 * egui control panel: module selector, per-module parameter sections and the
 * global toggles. Change detection goes through the snapshot kept on
 * SandboxConfig; the caller decides what to rebuild from the result.
 */

use nannou::geom;
use nannou_egui::{egui, Egui};

use crate::camera::Camera;
use crate::debug::DebugInfo;
use crate::modules::ModuleKind;
use crate::params::{
    BirdParams, BoidParams, NoiseParams, ParamChanges, QuadtreeParams, QueryShape, SandboxConfig, TreeParams,
};

/// Buttons pressed this frame plus what the sliders changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiActions {
    pub reset_module: bool,
    pub reset_camera: bool,
    pub save_config: bool,
    pub changes: ParamChanges,
}

pub fn update_ui(egui: &mut Egui, config: &mut SandboxConfig, debug_info: &DebugInfo, camera: &Camera) -> UiActions {
    let mut actions = UiActions::default();

    config.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Sandbox Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            egui::ComboBox::from_label("Module")
                .selected_text(config.active_module.label())
                .show_ui(ui, |ui| {
                    for kind in ModuleKind::ALL {
                        ui.selectable_value(&mut config.active_module, kind, kind.label());
                    }
                });

            if ui.button("Reset Module").clicked() {
                actions.reset_module = true;
            }

            match config.active_module {
                ModuleKind::Boids => boid_controls(ui, config),
                ModuleKind::QuadtreeDemo => quadtree_controls(ui, &mut config.quadtree),
                ModuleKind::Bird => bird_controls(ui, &mut config.bird),
                ModuleKind::NoiseField => noise_controls(ui, &mut config.noise),
                ModuleKind::FractalTree => tree_controls(ui, &mut config.tree),
                ModuleKind::SatDemo => {
                    ui.label("Move the mouse to steer the pentagon");
                    ui.label("Space: toggle collision resolution");
                }
            }

            if config.active_module.camera_drag() {
                ui.collapsing("Camera Controls", |ui| {
                    ui.label("Zoom: mouse wheel or trackpad pinch");
                    ui.label("Pan: click and drag");
                    if ui.button("Reset Camera").clicked() {
                        actions.reset_camera = true;
                    }
                    ui.label(format!("Zoom Level: {:.2}x", camera.zoom));
                    ui.label(format!("Camera Position: ({:.0}, {:.0})", camera.position.x, camera.position.y));
                });
            }

            ui.collapsing("Performance", |ui| {
                ui.add(
                    egui::Slider::new(&mut config.fixed_physics_fps, SandboxConfig::get_physics_fps_range())
                        .text("Physics FPS"),
                );
                ui.separator();
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Physics steps this frame: {}", debug_info.physics_updates_per_frame));
                ui.label(format!(
                    "Entities: {} ({} visible)",
                    debug_info.entity_count, debug_info.visible_entities
                ));
            });

            ui.separator();
            ui.checkbox(&mut config.show_debug, "Show Debug Info");
            ui.checkbox(&mut config.pause_simulation, "Pause Simulation");
            if ui.button("Save Config").clicked() {
                actions.save_config = true;
            }
        });

    actions.changes = config.detect_changes();
    actions
}

fn boid_controls(ui: &mut egui::Ui, config: &mut SandboxConfig) {
    let SandboxConfig {
        boids: params,
        quadtree,
        world_size,
        ..
    } = config;
    ui.collapsing("Boid Parameters", |ui| {
        ui.add(egui::Slider::new(&mut params.num_boids, BoidParams::get_num_boids_range()).text("Number of Boids"));
        ui.add(egui::Slider::new(&mut params.max_speed, BoidParams::get_max_speed_range()).text("Max Speed"));
    });

    ui.collapsing("Flocking Behavior", |ui| {
        ui.add(egui::Slider::new(&mut params.separation_weight, BoidParams::get_weight_range()).text("Separation Weight"));
        ui.add(egui::Slider::new(&mut params.alignment_weight, BoidParams::get_weight_range()).text("Alignment Weight"));
        ui.add(egui::Slider::new(&mut params.cohesion_weight, BoidParams::get_weight_range()).text("Cohesion Weight"));
        ui.add(egui::Slider::new(&mut params.separation_radius, BoidParams::get_radius_range()).text("Separation Radius"));
        ui.add(egui::Slider::new(&mut params.alignment_radius, BoidParams::get_radius_range()).text("Alignment Radius"));
        ui.add(egui::Slider::new(&mut params.cohesion_radius, BoidParams::get_radius_range()).text("Cohesion Radius"));
    });

    ui.collapsing("Performance Tuning", |ui| {
        ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
        ui.checkbox(&mut params.enable_quadtree, "Enable Quadtree");
        ui.checkbox(&mut params.enable_frustum_culling, "Enable Frustum Culling");
        ui.checkbox(&mut quadtree.show_nodes, "Show Quadtree Nodes");
        ui.add(egui::Slider::new(&mut quadtree.capacity, QuadtreeParams::get_capacity_range()).text("Node Capacity"));
        ui.add(egui::Slider::new(world_size, SandboxConfig::get_world_size_range()).text("World Size"));
    });
}

fn quadtree_controls(ui: &mut egui::Ui, params: &mut QuadtreeParams) {
    ui.collapsing("Quadtree", |ui| {
        ui.add(egui::Slider::new(&mut params.demo_points, QuadtreeParams::get_demo_points_range()).text("Points"));
        ui.add(egui::Slider::new(&mut params.capacity, QuadtreeParams::get_capacity_range()).text("Node Capacity"));
        ui.add(
            egui::Slider::new(&mut params.max_divisions, QuadtreeParams::get_max_divisions_range()).text("Max Divisions"),
        );
        ui.add(egui::Slider::new(&mut params.drift_speed, 0.0..=5.0).text("Drift Speed"));
        ui.checkbox(&mut params.show_nodes, "Show Nodes");
    });

    ui.collapsing("Query", |ui| {
        ui.horizontal(|ui| {
            ui.radio_value(&mut params.query_shape, QueryShape::Circle, "Circle");
            ui.radio_value(&mut params.query_shape, QueryShape::Rect, "Rect");
        });
        ui.add(egui::Slider::new(&mut params.query_size, QuadtreeParams::get_query_size_range()).text("Query Size"));
        ui.label("Click: spawn a cluster, Delete: remove hits");
    });
}

fn bird_controls(ui: &mut egui::Ui, params: &mut BirdParams) {
    ui.collapsing("Bird", |ui| {
        ui.add(egui::Slider::new(&mut params.gravity, BirdParams::get_gravity_range()).text("Gravity"));
        ui.add(egui::Slider::new(&mut params.flap_strength, BirdParams::get_flap_range()).text("Flap Strength"));
        ui.add(egui::Slider::new(&mut params.pipe_gap, BirdParams::get_gap_range()).text("Pipe Gap"));
        ui.add(egui::Slider::new(&mut params.pipe_speed, BirdParams::get_pipe_speed_range()).text("Pipe Speed"));
        ui.checkbox(&mut params.show_hitboxes, "Show Hitboxes");
    });
}

fn noise_controls(ui: &mut egui::Ui, params: &mut NoiseParams) {
    ui.collapsing("Noise Field", |ui| {
        ui.add(
            egui::Slider::new(&mut params.particle_count, NoiseParams::get_particle_count_range()).text("Particles"),
        );
        ui.add(egui::Slider::new(&mut params.scale, NoiseParams::get_scale_range()).text("Noise Scale"));
        ui.add(egui::Slider::new(&mut params.speed, NoiseParams::get_speed_range()).text("Speed"));
        ui.add(egui::DragValue::new(&mut params.seed).prefix("Seed: "));
        ui.checkbox(&mut params.show_field, "Show Field");
    });
}

fn tree_controls(ui: &mut egui::Ui, params: &mut TreeParams) {
    ui.collapsing("Fractal Tree", |ui| {
        ui.add(egui::Slider::new(&mut params.depth, TreeParams::get_depth_range()).text("Depth"));
        ui.add(egui::Slider::new(&mut params.branch_angle, TreeParams::get_angle_range()).text("Branch Angle"));
        ui.add(egui::Slider::new(&mut params.shrink, TreeParams::get_shrink_range()).text("Shrink"));
        ui.add(egui::Slider::new(&mut params.sway, TreeParams::get_sway_range()).text("Sway"));
    });
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: geom::Rect, camera_zoom: f32) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 320.0;

    let mut lines = debug_info.lines();
    lines.push(format!("Zoom: {:.2}x", camera_zoom));

    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.left() + panel_width / 2.0;
    let panel_y = window_rect.bottom() + panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    // nannou centres text on its position, so each line gets a fixed-width box
    let text_x = window_rect.left() + margin + (panel_width - margin * 2.0) / 2.0;
    let text_y = window_rect.bottom() + panel_height - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);
        draw.text(text)
            .x_y(text_x, y)
            .w(panel_width - margin * 2.0)
            .left_justify()
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
