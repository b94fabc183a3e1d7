use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;
use twenty48_rules::engine::{self as GameEngine, classify_status, count_empty, Direction, Grid};

fn warm() { GameEngine::new(); }

fn corpus() -> Vec<Grid> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut grids = vec![Grid::EMPTY];
    let mut g = Grid::new_game(&mut rng);
    grids.push(g);
    // Walk a fixed move cycle to get a spread of densities
    for (i, dir) in Direction::ALL.iter().cycle().take(40).enumerate() {
        let next = g.shift(*dir);
        if next != g {
            match next.spawn(1, &mut rng) {
                Ok(spawned) => g = spawned,
                Err(_) => break,
            }
        }
        if i % 2 == 0 { grids.push(g); }
    }
    grids
}

fn bench_shift(c: &mut Criterion) {
    warm();
    for dir in Direction::ALL {
        c.bench_function(&format!("shift/{dir:?}").to_lowercase(), |bch| {
            let grids = corpus();
            bch.iter(|| {
                let mut acc = 0u64;
                for &g in &grids { acc ^= g.shift(dir).raw(); }
                black_box(acc)
            })
        });
    }
}

fn bench_spawn(c: &mut Criterion) {
    warm();
    c.bench_function("grid/spawn_fill", |bch| {
        bch.iter_batched(
            || (Grid::EMPTY, StdRng::seed_from_u64(7)),
            |(mut g, mut rng)| {
                while let Ok(next) = g.spawn(1, &mut rng) { g = next; }
                black_box(g)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("grid/new_game", |bch| {
        bch.iter_batched(
            || StdRng::seed_from_u64(9),
            |mut rng| black_box(Grid::new_game(&mut rng)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_queries(c: &mut Criterion) {
    warm();
    c.bench_function("query/classify_status", |bch| {
        let grids = corpus();
        bch.iter(|| {
            let mut acc = 0usize;
            for &g in &grids { acc += classify_status(g) as usize; }
            black_box(acc)
        })
    });
    c.bench_function("query/count_empty", |bch| {
        let grids = corpus();
        bch.iter(|| {
            let mut acc = 0usize;
            for &g in &grids { acc ^= count_empty(g); }
            black_box(acc)
        })
    });
}

criterion_group!(engine_ops, bench_shift, bench_spawn, bench_queries);
criterion_main!(engine_ops);
