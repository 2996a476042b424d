//! # Planner Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sim_lib::grid_map::{Direction, GridMap};

fn planner_benchmark(c: &mut Criterion) {
    // ---- Build a large map with a few long walls ----

    let mut map = GridMap::new_open(100, 100, 40.0).unwrap();

    for y in (10..90).step_by(20) {
        for x in 0..90 {
            map.delete_connection((x, y), Direction::N).unwrap();
        }
    }
    for y in (20..100).step_by(20) {
        for x in 10..100 {
            map.delete_connection((x, y), Direction::N).unwrap();
        }
    }

    let start = (0, 0);
    let goal = (99, 99);

    c.bench_function("GridMap::fill_cost_field", |b| {
        b.iter(|| {
            map.fill_cost_field(black_box(start), black_box(goal));
        })
    });

    c.bench_function("GridMap::plan_path", |b| {
        b.iter(|| map.plan_path(black_box(start), black_box(goal)))
    });

    c.bench_function("GridMap::plan_path_bfs", |b| {
        b.iter(|| map.plan_path_bfs(black_box(start), black_box(goal)))
    });

    // Fully walled map so every removed wall has to be restored
    c.bench_function("GridMap::replan", |b| {
        b.iter(|| {
            let mut walled = GridMap::new_open(30, 30, 40.0).unwrap();
            for x in 0..30 {
                walled.delete_connection((x, 14), Direction::N).unwrap();
            }
            walled.replan(black_box((0, 0)), black_box((29, 29)))
        })
    });
}

criterion_group!(benches, planner_benchmark);
criterion_main!(benches);
