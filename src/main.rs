use std::{env, error::Error, fs};

use log::info;
use ndarray::{ArrayD, IxDyn};
use ndarray_rand::RandomExt;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use virtual_adversarial::{
    VatConfig,
    arch::{Sequential, activations::ActFn, layers::Dense},
    compute_vat,
    noise::GaussianNoise,
};

const SEED: u64 = 42;
const BATCH: usize = 8;
const FEATURES: usize = 16;
const CLASSES: usize = 4;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            info!("loading configuration from {path}");
            VatConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => VatConfig::default(),
    };

    let mut rng = StdRng::seed_from_u64(SEED);
    let scorer = Sequential::new([
        Dense::random((FEATURES, 32), Some(ActFn::tanh()), &mut rng),
        Dense::random((32, CLASSES), None, &mut rng),
    ])?;
    let x: ArrayD<f32> =
        ArrayD::random_using(IxDyn(&[BATCH, FEATURES]), StandardNormal, &mut rng);

    let mut noise = GaussianNoise::seeded(SEED);
    let output = compute_vat(x.view(), &scorer, None, &config, &mut noise)?;

    info!("configuration: {config:?}");
    println!("vat loss: {}", output.loss);
    for (i, divergence) in output.divergences.iter().enumerate() {
        println!("example {i}: divergence {divergence}");
    }

    let grads = scorer.backward((&x + &output.perturbation).view(), output.scores_grad.view())?;
    println!(
        "parameter gradient norm: {}",
        grads.params.iter().map(|g| g * g).sum::<f32>().sqrt()
    );

    Ok(())
}
