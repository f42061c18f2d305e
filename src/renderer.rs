/*
 * Renderer Module
 *
 * `view` draws the active module, the debug overlay and the egui panel.
 * Modules draw in world coordinates through `WorldDraw`, which applies the
 * camera transform and also serves as the quadtree's `DrawSurface`.
 */

use log::error;
use nannou::prelude::*;

use crate::app::Model;
use crate::camera::Camera;
use crate::quadtree::DrawSurface;
use crate::shapes::{self, Line, Polygon};
use crate::ui;
use crate::vector::Point;

pub struct WorldDraw<'a> {
    draw: &'a Draw,
    camera: &'a Camera,
    window_rect: Rect,
}

impl<'a> WorldDraw<'a> {
    pub fn new(draw: &'a Draw, camera: &'a Camera, window_rect: Rect) -> Self {
        Self { draw, camera, window_rect }
    }

    pub fn draw(&self) -> &Draw {
        self.draw
    }

    pub fn zoom(&self) -> f32 {
        self.camera.zoom
    }

    pub fn window_rect(&self) -> Rect {
        self.window_rect
    }

    pub fn to_screen(&self, p: Point) -> Vec2 {
        self.camera.world_to_screen(p.into(), self.window_rect)
    }

    pub fn outline_rect(&self, rect: &shapes::Rect, color: Rgba, weight: f32) {
        let center = self.to_screen(rect.center());
        self.draw
            .rect()
            .xy(center)
            .w_h(rect.w * self.zoom(), rect.h * self.zoom())
            .no_fill()
            .stroke_weight(weight)
            .stroke(color);
    }

    pub fn fill_rect(&self, rect: &shapes::Rect, color: Rgba) {
        let center = self.to_screen(rect.center());
        self.draw
            .rect()
            .xy(center)
            .w_h(rect.w * self.zoom(), rect.h * self.zoom())
            .color(color);
    }

    pub fn fill_polygon(&self, polygon: &Polygon, color: Rgba) {
        let points: Vec<Vec2> = polygon.vertices().iter().map(|&v| self.to_screen(v)).collect();
        self.draw.polygon().color(color).points(points);
    }

    pub fn outline_polygon(&self, polygon: &Polygon, color: Rgba, weight: f32) {
        let points: Vec<Vec2> = polygon.vertices().iter().map(|&v| self.to_screen(v)).collect();
        self.draw.polyline().weight(weight).color(color).points_closed(points);
    }

    pub fn circle(&self, center: Point, radius: f32, color: Rgba) {
        self.draw
            .ellipse()
            .xy(self.to_screen(center))
            .radius(radius * self.zoom())
            .color(color);
    }

    pub fn ring(&self, center: Point, radius: f32, color: Rgba, weight: f32) {
        self.draw
            .ellipse()
            .xy(self.to_screen(center))
            .radius(radius * self.zoom())
            .no_fill()
            .stroke(color)
            .stroke_weight(weight);
    }

    pub fn line(&self, line: &Line, color: Rgba, weight: f32) {
        self.draw
            .line()
            .start(self.to_screen(line.a))
            .end(self.to_screen(line.b))
            .color(color)
            .stroke_weight(weight);
    }

    pub fn arrow(&self, from: Point, to: Point, color: Rgba, weight: f32) {
        self.draw
            .arrow()
            .start(self.to_screen(from))
            .end(self.to_screen(to))
            .color(color)
            .stroke_weight(weight);
    }

    pub fn text(&self, text: &str, at: Point, color: Rgba, size: u32) {
        self.draw.text(text).xy(self.to_screen(at)).color(color).font_size(size);
    }
}

// Shallow nodes are drawn brighter than deep ones
pub fn depth_color(depth: u32) -> Rgba {
    let fade = 1.0 / (1.0 + depth as f32 * 0.35);
    rgba(0.3, 0.8 * fade + 0.2, 0.4, 0.25 + 0.5 * fade)
}

impl DrawSurface for WorldDraw<'_> {
    fn stroke_rect(&mut self, bounds: &shapes::Rect, depth: u32) {
        self.outline_rect(bounds, depth_color(depth), 1.0);
    }
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let mut canvas = WorldDraw::new(&draw, &model.camera, window_rect);
    model.module.draw(&mut canvas, &model.config);

    if model.config.show_debug {
        ui::draw_debug_info(&draw, &model.debug_info, window_rect, model.camera.zoom);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!("failed to render frame: {:?}", err);
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!("failed to render ui: {:?}", err);
    }
}
