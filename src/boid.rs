/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each boid follows three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * The rules themselves live in `physics`; a boid only integrates forces and
 * wraps around the world.
 */

use std::f32::consts::TAU;

use nannou::prelude::*;
use rand::Rng;

use crate::entity::{EntityId, Identified, Positioned};
use crate::renderer::WorldDraw;
use crate::vector::{pt, Point, Vector};
use crate::BOID_SIZE;

#[derive(Debug, Clone)]
pub struct Boid {
    pub id: EntityId,
    pub position: Point,
    pub velocity: Vector,
    pub acceleration: Vector,
    pub max_speed: f32,
    pub max_force: f32,
    pub color: Rgb<u8>,
}

impl Boid {
    pub fn new<R: Rng>(id: EntityId, x: f32, y: f32, rng: &mut R) -> Self {
        // Random initial heading
        let velocity = Vector::from_angle(rng.gen_range(0.0..TAU)) * 2.0;

        Self {
            id,
            position: pt(x, y),
            velocity,
            acceleration: Vector::ZERO,
            max_speed: 4.0,
            max_force: 0.1,
            color: rgb(220, 220, 220),
        }
    }

    // Spawn at a uniformly random spot in a world of `world_size` centred on the origin
    pub fn random<R: Rng>(id: EntityId, world_size: f32, rng: &mut R) -> Self {
        let half_world = world_size / 2.0;
        let x = rng.gen_range(-half_world..half_world);
        let y = rng.gen_range(-half_world..half_world);
        Self::new(id, x, y, rng)
    }

    pub fn apply_force(&mut self, force: Vector) {
        self.acceleration += force;
    }

    // Update the boid's position based on its velocity and acceleration
    pub fn update(&mut self) {
        self.velocity = (self.velocity + self.acceleration).limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vector::ZERO;
    }

    // Wrap the boid around the world edges. The result always lies in the
    // half-open range [-half, half) so it stays inside the quadtree bounds.
    pub fn wrap_edges(&mut self, world_size: f32) {
        self.position.x = wrap_coordinate(self.position.x, world_size);
        self.position.y = wrap_coordinate(self.position.y, world_size);
    }

    pub fn draw(&self, canvas: &WorldDraw) {
        let screen_pos = canvas.to_screen(self.position);
        let scaled_size = BOID_SIZE * canvas.zoom();

        let points = [
            pt2(scaled_size, 0.0),
            pt2(-scaled_size, scaled_size / 2.0),
            pt2(-scaled_size, -scaled_size / 2.0),
        ];

        canvas
            .draw()
            .polygon()
            .color(self.color)
            .points(points)
            .xy(screen_pos)
            .rotate(self.velocity.heading());
    }
}

fn wrap_coordinate(value: f32, world_size: f32) -> f32 {
    let half = world_size / 2.0;
    let wrapped = (value + half).rem_euclid(world_size) - half;
    // rem_euclid can round up to exactly world_size for tiny negatives
    if wrapped >= half {
        -half
    } else {
        wrapped
    }
}

impl Positioned for Boid {
    fn position(&self) -> Point {
        self.position
    }
}

impl Identified for Boid {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn update_limits_speed_and_clears_acceleration() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boid = Boid::new(0, 0.0, 0.0, &mut rng);
        boid.apply_force(Vector::new(100.0, 0.0));
        boid.update();
        assert_relative_eq!(boid.velocity.length(), boid.max_speed, epsilon = 1e-4);
        assert_eq!(boid.acceleration, Vector::ZERO);
    }

    #[test]
    fn wrapping_stays_in_half_open_world() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut boid = Boid::new(0, 0.0, 0.0, &mut rng);
        for &(x, y) in &[(50.0, 0.0), (-51.0, 49.0), (120.0, -50.0), (-1e-9, 0.0)] {
            boid.position = pt(x, y);
            boid.wrap_edges(100.0);
            assert!(boid.position.x >= -50.0 && boid.position.x < 50.0, "{:?}", boid.position);
            assert!(boid.position.y >= -50.0 && boid.position.y < 50.0, "{:?}", boid.position);
        }
        boid.position = pt(51.0, 0.0);
        boid.wrap_edges(100.0);
        assert_relative_eq!(boid.position.x, -49.0, epsilon = 1e-4);
    }

    #[test]
    fn random_boids_spawn_inside_world() {
        let mut rng = StdRng::seed_from_u64(3);
        for id in 0..100 {
            let boid = Boid::random(id, 400.0, &mut rng);
            assert!(boid.position.x.abs() <= 200.0 && boid.position.y.abs() <= 200.0);
            assert_relative_eq!(boid.velocity.length(), 2.0, epsilon = 1e-4);
        }
    }
}
