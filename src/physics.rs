/*
 * Physics Module
 *
 * Flocking step for the boids: separation, alignment and cohesion computed
 * in a single pass over each boid's neighbours, then integrated and wrapped.
 *
 * Neighbours come from circle queries against a quadtree that was built from
 * the positions at the start of the step. The world wraps, so a boid near an
 * edge also queries copies of its perception circle shifted by one world
 * width; offsets between boids are always taken the short way round.
 *
 * The force pass can run on rayon in chunks. The tree and the position
 * snapshot are only read during the pass.
 */

use rand::Rng;
use rayon::prelude::*;

use crate::boid::Boid;
use crate::debug::DebugInfo;
use crate::entity::{EntityRef, Positioned};
use crate::params::BoidParams;
use crate::quadtree::{QuadTree, QueryStats};
use crate::shapes::Circle;
use crate::vector::{Point, Vector};

/// Per-step constants derived from the parameters.
#[derive(Debug, Clone, Copy)]
pub struct FlockRules {
    pub sep_radius_sq: f32,
    pub align_radius_sq: f32,
    pub cohesion_radius_sq: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub perception_radius: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub world_size: f32,
}

impl FlockRules {
    pub fn new(params: &BoidParams, world_size: f32) -> Self {
        Self {
            sep_radius_sq: params.separation_radius * params.separation_radius,
            align_radius_sq: params.alignment_radius * params.alignment_radius,
            cohesion_radius_sq: params.cohesion_radius * params.cohesion_radius,
            separation_weight: params.separation_weight,
            alignment_weight: params.alignment_weight,
            cohesion_weight: params.cohesion_weight,
            perception_radius: params.perception_radius(),
            max_speed: params.max_speed,
            max_force: params.max_force,
            world_size,
        }
    }
}

// Position and velocity of a boid at the start of the step
#[derive(Debug, Clone, Copy)]
struct Neighbour {
    position: Point,
    velocity: Vector,
}

/// Shortest vector from `to` to `from` in a square world of side
/// `world_size` that wraps on both axes.
pub fn wrapped_offset(from: Point, to: Point, world_size: f32) -> Vector {
    let half_world = world_size / 2.0;
    let mut d = from - to;
    if d.x.abs() > half_world {
        d.x -= world_size.copysign(d.x);
    }
    if d.y.abs() > half_world {
        d.y -= world_size.copysign(d.y);
    }
    d
}

/// The perception circle around `center`, plus a copy shifted across every
/// world edge it pokes out of.
pub fn wrapped_query_circles(center: Point, radius: f32, world_size: f32) -> Vec<Circle> {
    let half_world = world_size / 2.0;
    let shifts = |c: f32| -> [Option<f32>; 2] {
        [
            Some(0.0),
            if c + radius >= half_world {
                Some(-world_size)
            } else if c - radius < -half_world {
                Some(world_size)
            } else {
                None
            },
        ]
    };

    let mut circles = Vec::with_capacity(4);
    for dx in shifts(center.x).into_iter().flatten() {
        for dy in shifts(center.y).into_iter().flatten() {
            circles.push(Circle::new(center.x + dx, center.y + dy, radius));
        }
    }
    circles
}

// Running sums for the three rules
#[derive(Debug, Default)]
struct Accumulator {
    separation: Vector,
    sep_count: usize,
    alignment: Vector,
    align_count: usize,
    cohesion: Vector,
    cohesion_count: usize,
}

impl Accumulator {
    fn add(&mut self, position: Point, other: &Neighbour, rules: &FlockRules) {
        // Offset pointing from the neighbour to us
        let away = wrapped_offset(position, other.position, rules.world_size);
        let d_squared = away.length_squared();
        // Skip ourselves and exact overlaps
        if d_squared <= 0.0 {
            return;
        }

        if d_squared < rules.sep_radius_sq {
            // Weight by distance (closer boids have more influence)
            self.separation += away / d_squared;
            self.sep_count += 1;
        }

        if d_squared < rules.align_radius_sq {
            self.alignment += other.velocity;
            self.align_count += 1;
        }

        if d_squared < rules.cohesion_radius_sq {
            self.cohesion -= away;
            self.cohesion_count += 1;
        }
    }

    // Reynolds steering: desired velocity at full speed minus current velocity
    fn steer(desired: Vector, velocity: Vector, rules: &FlockRules) -> Vector {
        match desired.try_normalize() {
            Some(direction) => (direction * rules.max_speed - velocity).limit(rules.max_force),
            None => Vector::ZERO,
        }
    }

    fn force(&self, velocity: Vector, rules: &FlockRules) -> Vector {
        let mut combined = Vector::ZERO;
        if self.sep_count > 0 {
            combined += Self::steer(self.separation / self.sep_count as f32, velocity, rules) * rules.separation_weight;
        }
        if self.align_count > 0 {
            combined += Self::steer(self.alignment / self.align_count as f32, velocity, rules) * rules.alignment_weight;
        }
        if self.cohesion_count > 0 {
            // Average offset to the neighbours is the direction to their centre
            combined += Self::steer(self.cohesion / self.cohesion_count as f32, velocity, rules) * rules.cohesion_weight;
        }
        combined
    }
}

fn gather_with_tree(
    tree: &QuadTree<EntityRef>,
    snapshot: &[Neighbour],
    position: Point,
    rules: &FlockRules,
    stats: &mut QueryStats,
) -> Accumulator {
    let mut acc = Accumulator::default();
    for circle in wrapped_query_circles(position, rules.perception_radius, rules.world_size) {
        // Tree ids are indices into the snapshot
        tree.visit(&circle, stats, |e| {
            if let Some(other) = snapshot.get(e.id as usize) {
                acc.add(position, other, rules);
            }
        });
    }
    acc
}

fn gather_brute_force(snapshot: &[Neighbour], position: Point, rules: &FlockRules) -> Accumulator {
    let mut acc = Accumulator::default();
    for other in snapshot {
        acc.add(position, other, rules);
    }
    acc
}

fn integrate(
    boid: &mut Boid,
    tree: Option<&QuadTree<EntityRef>>,
    snapshot: &[Neighbour],
    rules: &FlockRules,
    stats: &mut QueryStats,
) {
    let acc = match tree {
        Some(tree) => gather_with_tree(tree, snapshot, boid.position, rules, stats),
        None => gather_brute_force(snapshot, boid.position, rules),
    };

    boid.max_speed = rules.max_speed;
    boid.max_force = rules.max_force;
    boid.apply_force(acc.force(boid.velocity, rules));
    boid.update();
    boid.wrap_edges(rules.world_size);
}

/// Advance every boid by one step.
///
/// `tree` must index the boids' current positions with `id == index`;
/// without one, neighbours are found by scanning the whole flock.
pub fn step_flock(
    boids: &mut [Boid],
    tree: Option<&QuadTree<EntityRef>>,
    params: &BoidParams,
    world_size: f32,
    debug: &mut DebugInfo,
) {
    let rules = FlockRules::new(params, world_size);
    let snapshot: Vec<Neighbour> = boids
        .iter()
        .map(|b| Neighbour { position: b.position, velocity: b.velocity })
        .collect();

    let stats = if params.enable_parallel && !boids.is_empty() {
        // Chunks instead of per-boid tasks keep scheduling overhead down
        let chunk_size = std::cmp::max(boids.len() / rayon::current_num_threads(), 1);
        debug.chunk_size = Some(chunk_size);

        boids
            .par_chunks_mut(chunk_size)
            .map(|chunk| {
                let mut stats = QueryStats::default();
                for boid in chunk {
                    integrate(boid, tree, &snapshot, &rules, &mut stats);
                }
                stats
            })
            .reduce(QueryStats::default, |mut a, b| {
                a.merge(&b);
                a
            })
    } else {
        debug.chunk_size = None;
        let mut stats = QueryStats::default();
        for boid in boids.iter_mut() {
            integrate(boid, tree, &snapshot, &rules, &mut stats);
        }
        stats
    };

    debug.query_stats.merge(&stats);
}

/// Re-index the flock. Returns how many boids were stored.
pub fn rebuild_index(tree: &mut QuadTree<EntityRef>, boids: &[Boid]) -> usize {
    tree.rebuild(boids.iter().enumerate().map(|(i, b)| EntityRef::new(i as u64, b.position())))
}

// Grow or shrink the flock to `params.num_boids`, keeping id == index
pub fn reset_boids<R: Rng>(boids: &mut Vec<Boid>, params: &BoidParams, world_size: f32, rng: &mut R) {
    let mut next_id = boids.len() as u64;
    boids.resize_with(params.num_boids, || {
        let boid = Boid::random(next_id, world_size, rng);
        next_id += 1;
        boid
    });

    for boid in boids.iter_mut() {
        boid.max_speed = params.max_speed;
        boid.max_force = params.max_force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rect;
    use crate::vector::{pt, vector};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world_tree(world_size: f32) -> QuadTree<EntityRef> {
        let half = world_size / 2.0;
        QuadTree::new(Rect::new(-half, -half, world_size, world_size), 4, 8).unwrap()
    }

    fn still_boid(id: u64, x: f32, y: f32) -> Boid {
        let mut rng = StdRng::seed_from_u64(id);
        let mut boid = Boid::new(id, x, y, &mut rng);
        boid.velocity = Vector::ZERO;
        boid
    }

    #[test]
    fn offset_takes_the_short_way_round() {
        let d = wrapped_offset(pt(-95.0, 0.0), pt(95.0, 0.0), 200.0);
        assert_relative_eq!(d.x, 10.0);
        let d = wrapped_offset(pt(0.0, 90.0), pt(0.0, -90.0), 200.0);
        assert_relative_eq!(d.y, -20.0);
        let d = wrapped_offset(pt(10.0, 10.0), pt(0.0, 0.0), 200.0);
        assert_eq!(d, vector(10.0, 10.0));
    }

    #[test]
    fn query_circles_cover_edges_and_corners() {
        assert_eq!(wrapped_query_circles(pt(0.0, 0.0), 10.0, 200.0).len(), 1);
        assert_eq!(wrapped_query_circles(pt(95.0, 0.0), 10.0, 200.0).len(), 2);
        let corner = wrapped_query_circles(pt(-95.0, -95.0), 10.0, 200.0);
        assert_eq!(corner.len(), 4);
        assert!(corner.iter().any(|c| c.center() == pt(105.0, 105.0)));
    }

    #[test]
    fn separation_pushes_close_boids_apart() {
        let mut boids = vec![still_boid(0, 0.0, 0.0), still_boid(1, 5.0, 0.0)];
        let params = BoidParams {
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            enable_parallel: false,
            ..Default::default()
        };
        let mut tree = world_tree(1000.0);
        rebuild_index(&mut tree, &boids);
        step_flock(&mut boids, Some(&tree), &params, 1000.0, &mut DebugInfo::default());
        assert!(boids[0].velocity.x < 0.0);
        assert!(boids[1].velocity.x > 0.0);
    }

    #[test]
    fn neighbours_are_found_across_the_seam() {
        let mut boids = vec![still_boid(0, -98.0, 0.0), still_boid(1, 97.0, 0.0)];
        let params = BoidParams {
            alignment_weight: 0.0,
            separation_weight: 0.0,
            enable_parallel: false,
            ..Default::default()
        };
        let mut tree = world_tree(200.0);
        rebuild_index(&mut tree, &boids);
        step_flock(&mut boids, Some(&tree), &params, 200.0, &mut DebugInfo::default());
        // Cohesion pulls them together through the wrapped edge
        assert!(boids[0].velocity.x < 0.0);
        assert!(boids[1].velocity.x > 0.0);
    }

    #[test]
    fn tree_and_brute_force_agree() {
        let mut rng = StdRng::seed_from_u64(9);
        let params = BoidParams {
            num_boids: 300,
            enable_parallel: false,
            ..Default::default()
        };
        let mut with_tree = Vec::new();
        reset_boids(&mut with_tree, &params, 600.0, &mut rng);
        let mut brute = with_tree.clone();

        let mut tree = world_tree(600.0);
        for _ in 0..5 {
            assert_eq!(rebuild_index(&mut tree, &with_tree), with_tree.len());
            step_flock(&mut with_tree, Some(&tree), &params, 600.0, &mut DebugInfo::default());
            step_flock(&mut brute, None, &params, 600.0, &mut DebugInfo::default());
        }
        for (a, b) in with_tree.iter().zip(&brute) {
            assert_relative_eq!(a.position.x, b.position.x, epsilon = 1e-2);
            assert_relative_eq!(a.position.y, b.position.y, epsilon = 1e-2);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut params = BoidParams {
            num_boids: 200,
            ..Default::default()
        };
        let mut parallel = Vec::new();
        reset_boids(&mut parallel, &params, 500.0, &mut rng);
        let mut sequential = parallel.clone();
        let mut tree = world_tree(500.0);

        let mut debug = DebugInfo::default();
        rebuild_index(&mut tree, &parallel);
        params.enable_parallel = true;
        step_flock(&mut parallel, Some(&tree), &params, 500.0, &mut debug);
        assert!(debug.chunk_size.is_some());
        params.enable_parallel = false;
        step_flock(&mut sequential, Some(&tree), &params, 500.0, &mut debug);

        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn reset_keeps_ids_matching_indices() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut boids = Vec::new();
        let mut params = BoidParams {
            num_boids: 10,
            ..Default::default()
        };
        reset_boids(&mut boids, &params, 100.0, &mut rng);
        params.num_boids = 25;
        reset_boids(&mut boids, &params, 100.0, &mut rng);
        params.num_boids = 7;
        reset_boids(&mut boids, &params, 100.0, &mut rng);
        assert_eq!(boids.len(), 7);
        assert!(boids.iter().enumerate().all(|(i, b)| b.id == i as u64));
    }
}
