use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use coup_env::{Coup, GameConfig};

fn complete_game(num_players: usize, seed: u64) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut config = GameConfig::for_players(num_players);
    config.render_mode = None;

    let mut coup = black_box(Coup::new(config, seed).unwrap());
    for _ in 0..1000 {
        let legal: Vec<usize> = coup.action_mask()
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| ok)
            .map(|(idx, _)| idx)
            .collect();

        let random_index = legal[rng.gen_range(0..legal.len())];
        coup.step(random_index).unwrap();

        if coup.is_done() {
            break;
        }
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_game");
    for num_players in 3..=6usize {
        let mut seed = 0;
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| {
                seed += 1;
                complete_game(num_players, seed)
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
