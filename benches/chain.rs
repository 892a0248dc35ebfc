use criterion::{Criterion, black_box, criterion_group, criterion_main};
use logit_mh::{ChainEnsemble, CovarianceWalk, IsotropicWalk, LogitPosterior, MetropolisChain};
use ndarray::{Array1, Array2};
use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;

fn synthetic_posterior(n: usize, p: usize) -> LogitPosterior {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let std_norm = Normal::standard();
    let x = Array2::from_shape_fn((n, p), |(_, j)| {
        if j == 0 { 1.0 } else { std_norm.sample(&mut rng) }
    });
    let y = Array1::from_shape_fn(n, |_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
    LogitPosterior::new(x, y, 100.0).unwrap()
}

fn bench_isotropic_chain(c: &mut Criterion) {
    let posterior = synthetic_posterior(1_000, 4);
    c.bench_function("isotropic_chain_5k_steps", |bencher| {
        bencher.iter(|| {
            let chain = MetropolisChain::new(
                &posterior,
                IsotropicWalk::new(0.1, 4),
                vec![0.0; 4],
                42,
            )
            .unwrap();
            black_box(chain.run(5_000));
        });
    });
}

fn bench_covariance_chain(c: &mut Criterion) {
    let posterior = synthetic_posterior(1_000, 4);
    let proposal = CovarianceWalk::from_design(1.5, posterior.design()).unwrap();
    c.bench_function("covariance_chain_5k_steps", |bencher| {
        bencher.iter(|| {
            let chain =
                MetropolisChain::new(&posterior, proposal.clone(), vec![0.0; 4], 42).unwrap();
            black_box(chain.run(5_000));
        });
    });
}

fn bench_ensemble(c: &mut Criterion) {
    let posterior = synthetic_posterior(1_000, 4);
    let inits: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64 - 1.5; 4]).collect();
    c.bench_function("ensemble_4_chains_5k_steps", |bencher| {
        bencher.iter(|| {
            let ensemble = ChainEnsemble::new(&posterior, IsotropicWalk::new(0.1, 4), 42);
            black_box(ensemble.run(&inits, 5_000).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_isotropic_chain,
    bench_covariance_chain,
    bench_ensemble
);
criterion_main!(benches);
