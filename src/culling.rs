/*
 * Culling Module
 *
 * Frustum culling for the flock: which boids fall inside the visible world
 * rectangle and need drawing. With a quadtree the lookup is a single rect
 * query; without one every boid is tested.
 */

use crate::boid::Boid;
use crate::entity::EntityRef;
use crate::quadtree::{QuadTree, QueryStats};
use crate::shapes::Rect;

/// Indices of the boids inside `visible_area`, in no particular order.
pub fn get_visible_boids(
    boids: &[Boid],
    tree: Option<&QuadTree<EntityRef>>,
    visible_area: &Rect,
    stats: &mut QueryStats,
) -> Vec<usize> {
    match tree {
        Some(tree) => cull_with_quadtree(tree, visible_area, stats),
        None => cull_brute_force(boids, visible_area),
    }
}

pub fn cull_brute_force(boids: &[Boid], visible_area: &Rect) -> Vec<usize> {
    boids
        .iter()
        .enumerate()
        .filter(|(_, boid)| visible_area.contains(boid.position))
        .map(|(i, _)| i)
        .collect()
}

pub fn cull_with_quadtree(tree: &QuadTree<EntityRef>, visible_area: &Rect, stats: &mut QueryStats) -> Vec<usize> {
    let mut visible_indices = Vec::new();
    tree.visit(visible_area, stats, |e| visible_indices.push(e.id as usize));
    visible_indices
}

/// Share of the flock that was culled, as a percentage.
pub fn culling_efficiency(visible: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        (1.0 - visible as f32 / total as f32) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{rebuild_index, reset_boids};
    use crate::params::BoidParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn quadtree_culling_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let params = BoidParams {
            num_boids: 1000,
            ..Default::default()
        };
        let mut boids = Vec::new();
        reset_boids(&mut boids, &params, 2000.0, &mut rng);
        let mut tree = QuadTree::new(Rect::new(-1000.0, -1000.0, 2000.0, 2000.0), 8, 8).unwrap();
        rebuild_index(&mut tree, &boids);

        let view = Rect::new(-300.0, -120.0, 640.0, 480.0);
        let mut stats = QueryStats::default();
        let mut from_tree = get_visible_boids(&boids, Some(&tree), &view, &mut stats);
        let mut brute = get_visible_boids(&boids, None, &view, &mut stats);
        from_tree.sort_unstable();
        brute.sort_unstable();
        assert_eq!(from_tree, brute);
        assert!(!brute.is_empty());
        assert!(stats.entities_tested < boids.len());
    }

    #[test]
    fn efficiency_handles_empty_flock() {
        assert_eq!(culling_efficiency(0, 0), 0.0);
        assert_eq!(culling_efficiency(25, 100), 75.0);
    }
}
