/*
 * Camera Module
 *
 * Pan and zoom over world space. Screen coordinates are nannou's window
 * coordinates (origin at the window centre, y up); world coordinates are
 * what every module simulates in.
 */

use nannou::prelude::*;

use crate::shapes;
use crate::vector::{pt, Point};

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.05,
            max_zoom: 5.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Back to the origin at 1x, used when switching modules
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.zoom = 1.0;
        self.end_drag();
    }

    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    pub fn screen_to_world_point(&self, point: Vec2, window_rect: Rect) -> Point {
        self.screen_to_world(point, window_rect).into()
    }

    /// World-space rectangle covered by the window.
    pub fn visible_area(&self, window_rect: Rect) -> shapes::Rect {
        let bottom_left = self.screen_to_world(vec2(window_rect.left(), window_rect.bottom()), window_rect);
        let top_right = self.screen_to_world(vec2(window_rect.right(), window_rect.top()), window_rect);
        shapes::Rect::from_corners(pt(bottom_left.x, bottom_left.y), pt(top_right.x, top_right.y))
    }

    // Zoom around the cursor so the world point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;
        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);
        self.position += cursor_world_before - cursor_world_after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
