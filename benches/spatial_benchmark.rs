/*
 * Spatial Benchmarks
 *
 * Measures the pieces the sandbox leans on every frame: rebuilding the
 * quadtree, range queries against a linear scan, a full flock step with and
 * without the tree, and the SAT narrow phase.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use spatial_sandbox::boid::Boid;
use spatial_sandbox::params::BoidParams;
use spatial_sandbox::physics;
use spatial_sandbox::sat;
use spatial_sandbox::shapes::Shape;
use spatial_sandbox::{pt, Circle, DebugInfo, EntityRef, Polygon, QuadTree, Rect};

const WORLD_SIZE: f32 = 5000.0;

fn world() -> Rect {
    let half = WORLD_SIZE / 2.0;
    Rect::new(-half, -half, WORLD_SIZE, WORLD_SIZE)
}

fn random_entities(rng: &mut StdRng, n: usize) -> Vec<EntityRef> {
    let half = WORLD_SIZE / 2.0;
    (0..n as u64)
        .map(|id| EntityRef::new(id, pt(rng.gen_range(-half..half), rng.gen_range(-half..half))))
        .collect()
}

fn bench_tree_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_rebuild");

    for num_entities in [100, 1000, 5000, 20000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_entities), num_entities, |b, &n| {
            let mut rng = StdRng::seed_from_u64(42);
            let entities = random_entities(&mut rng, n);
            let mut tree = QuadTree::new(world(), 8, 8).unwrap();

            b.iter(|| black_box(tree.rebuild(entities.iter().copied())));
        });
    }

    group.finish();
}

fn bench_range_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_query");

    for num_entities in [1000, 5000, 20000].iter() {
        let mut rng = StdRng::seed_from_u64(7);
        let entities = random_entities(&mut rng, *num_entities);
        let mut tree = QuadTree::new(world(), 8, 8).unwrap();
        tree.rebuild(entities.iter().copied());
        let query = Circle::at(pt(100.0, -200.0), 150.0);

        group.bench_with_input(BenchmarkId::new("quadtree", num_entities), &query, |b, q| {
            b.iter(|| black_box(tree.query(q).len()));
        });

        group.bench_with_input(BenchmarkId::new("linear_scan", num_entities), &query, |b, q| {
            b.iter(|| black_box(entities.iter().filter(|e| q.contains(e.position)).count()));
        });
    }

    group.finish();
}

fn bench_flock_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("flock_step");

    for num_boids in [500, 2000].iter() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut params = BoidParams {
            num_boids: *num_boids,
            ..Default::default()
        };
        let mut boids = Vec::new();
        physics::reset_boids(&mut boids, &params, WORLD_SIZE, &mut rng);
        let mut tree = QuadTree::new(world(), 8, 8).unwrap();

        for (label, parallel) in [("serial", false), ("parallel", true)] {
            params.enable_parallel = parallel;
            group.bench_with_input(BenchmarkId::new(format!("quadtree_{}", label), num_boids), &params, |b, p| {
                let mut flock: Vec<Boid> = boids.clone();
                let mut debug = DebugInfo::default();
                b.iter(|| {
                    physics::rebuild_index(&mut tree, &flock);
                    physics::step_flock(&mut flock, Some(&tree), p, WORLD_SIZE, &mut debug);
                });
            });
        }

        params.enable_parallel = false;
        group.bench_with_input(BenchmarkId::new("brute_force", num_boids), &params, |b, p| {
            let mut flock: Vec<Boid> = boids.clone();
            let mut debug = DebugInfo::default();
            b.iter(|| physics::step_flock(&mut flock, None, p, WORLD_SIZE, &mut debug));
        });
    }

    group.finish();
}

fn bench_sat(c: &mut Criterion) {
    let mut group = c.benchmark_group("sat");

    let a = Polygon::regular(pt(0.0, 0.0), 50.0, 8, 0.1).unwrap();
    let overlapping = Polygon::regular(pt(40.0, 10.0), 45.0, 6, 0.4).unwrap();
    let distant = Polygon::regular(pt(500.0, 0.0), 45.0, 6, 0.4).unwrap();

    group.bench_function("overlapping", |b| {
        b.iter(|| black_box(sat::check_polygon_polygon(black_box(&a), black_box(&overlapping))));
    });
    group.bench_function("aabb_rejected", |b| {
        b.iter(|| black_box(sat::check_polygon_polygon(black_box(&a), black_box(&distant))));
    });
    group.bench_function("exact_intersection", |b| {
        b.iter(|| black_box(a.intersects_polygon(black_box(&overlapping))));
    });

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_tree_rebuild, bench_range_query, bench_flock_step, bench_sat
}
criterion_main!(benches);
