use ndarray::{Array, Array2, ArrayD, Axis, Ix2, IxDyn, array};
use ndarray_rand::RandomExt;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use virtual_adversarial::{
    VatConfig, VatErr, VatOutput, VatParams, Weight,
    arch::{Linear, Scorer, Sequential, activations::ActFn, layers::Dense},
    compute_vat,
    noise::{FixedNoise, GaussianNoise, NoiseGen},
    numeric::{normalize, per_example_norm, softmax},
};

const BATCH: usize = 4;
const CLASSES: usize = 2;
const EXAMPLE_SHAPE: [usize; 2] = [2, 3];

fn features() -> usize {
    EXAMPLE_SHAPE.iter().product()
}

fn batch(rng: &mut StdRng) -> ArrayD<f32> {
    let shape = [BATCH, EXAMPLE_SHAPE[0], EXAMPLE_SHAPE[1]];
    Array::random_using(IxDyn(&shape), StandardNormal, rng) * 0.5_f32
}

fn config(params: VatParams) -> VatConfig {
    VatConfig::new(params).unwrap()
}

fn run(
    x: &ArrayD<f32>,
    scorer: &Linear,
    approx_scorer: Option<&dyn Scorer>,
    config: &VatConfig,
    seed: u64,
) -> VatOutput {
    let mut noise = GaussianNoise::seeded(seed);
    compute_vat(x.view(), scorer, approx_scorer, config, &mut noise).unwrap()
}

fn assert_close(got: f32, want: f32, tol: f32) {
    assert!(
        (got - want).abs() <= tol * want.abs().max(1.),
        "got {got}, expected {want}"
    );
}

#[test]
fn end_to_end_linear_scorer() {
    let mut rng = StdRng::seed_from_u64(2024);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);
    let config = VatConfig::default();

    let output = run(&x, &scorer, None, &config, 7);

    assert!(output.loss.is_finite());
    assert!(output.loss >= 0.);
    assert_eq!(output.perturbation.shape(), &[BATCH, 2, 3]);
    assert_eq!(output.divergences.len(), BATCH);
    assert_eq!(output.scores_grad.dim(), (BATCH, CLASSES));

    for norm in per_example_norm(output.perturbation.view()).unwrap() {
        assert_close(norm, config.epsilon(), 1e-4);
    }
}

#[test]
fn more_approximation_steps_keep_shape_and_finiteness() {
    let mut rng = StdRng::seed_from_u64(99);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);

    for num_approximation in [1, 5] {
        let config = config(VatParams {
            num_approximation,
            ..Default::default()
        });
        let output = run(&x, &scorer, None, &config, 3);

        assert_eq!(output.perturbation.shape(), x.shape());
        assert!(output.loss.is_finite());
        assert!(output.loss >= 0.);
    }
}

#[test]
fn explicit_same_scorer_is_bit_identical_to_default() {
    let mut rng = StdRng::seed_from_u64(5);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);
    let config = VatConfig::default();

    let omitted = run(&x, &scorer, None, &config, 11);
    let explicit = run(&x, &scorer, Some(&scorer), &config, 11);

    assert_eq!(omitted.loss.to_bits(), explicit.loss.to_bits());
    assert_eq!(omitted.perturbation, explicit.perturbation);
    assert_eq!(omitted.divergences, explicit.divergences);
    assert_eq!(omitted.scores_grad, explicit.scores_grad);

    // an identical copy is another object, so the clean distribution is recomputed, but the
    // result must not change
    let copy = scorer.clone();
    let recomputed = run(&x, &scorer, Some(&copy), &config, 11);
    assert_eq!(omitted.loss.to_bits(), recomputed.loss.to_bits());
}

#[test]
fn distinct_approx_scorer_only_drives_the_search() {
    let mut rng = StdRng::seed_from_u64(17);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let approx_scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);
    let config = VatConfig::default();

    let output = run(&x, &scorer, Some(&approx_scorer), &config, 23);

    let reference = softmax(scorer.scores(x.view()).unwrap().view());
    let probe = &x + &output.perturbation;
    let probs = softmax(scorer.scores(probe.view()).unwrap().view());
    let expected = -(&reference * &probs.mapv(f32::ln)).sum() / BATCH as f32;

    assert_close(output.loss, expected, 1e-5);
}

#[test]
fn uniform_weight_is_plain_mean() {
    let mut rng = StdRng::seed_from_u64(8);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);

    let scalar = run(&x, &scorer, None, &VatConfig::default(), 1);
    assert_close(scalar.loss, scalar.divergences.mean().unwrap(), 1e-6);

    let per_example = config(VatParams {
        weight: Weight::PerExample(vec![1.; BATCH]),
        ..Default::default()
    });
    let vector = run(&x, &scorer, None, &per_example, 1);
    assert_eq!(scalar.loss.to_bits(), vector.loss.to_bits());
}

#[test]
fn weights_select_examples() {
    let mut rng = StdRng::seed_from_u64(12);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);

    let unweighted = run(&x, &scorer, None, &VatConfig::default(), 4);
    let weighted = run(
        &x,
        &scorer,
        None,
        &config(VatParams {
            weight: vec![2., 0., 0., 0.].into(),
            ..Default::default()
        }),
        4,
    );

    assert_close(weighted.divergences[0], 2. * unweighted.divergences[0], 1e-5);
    assert_close(weighted.loss, unweighted.divergences[0], 1e-5);
    assert!(weighted.divergences.iter().skip(1).all(|&d| d == 0.));
}

#[test]
fn all_zero_weight_is_finite() {
    let mut rng = StdRng::seed_from_u64(31);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);

    let output = run(
        &x,
        &scorer,
        None,
        &config(VatParams {
            weight: Weight::Scalar(0.),
            ..Default::default()
        }),
        2,
    );

    assert!(output.loss.is_finite());
    assert_eq!(output.loss, 0.);
    assert!(output.scores_grad.iter().all(|g| g.is_finite()));
}

#[test]
fn perturbation_follows_closed_form_direction() {
    let w = array![[0.9_f32, -0.4], [0.3, 0.6], [-0.8, 0.2]];
    let scorer = Linear::without_bias(w.clone());
    let x = array![[0.2_f32, -0.1, 0.4], [-0.6, 0.3, 0.0]];
    let noise = array![[1.0_f32, 0.5, -0.5], [0.2, -1.0, 0.3]];

    let xi = 1e-2;
    let epsilon = 1.5;
    let config = config(VatParams {
        xi,
        epsilon,
        ..Default::default()
    });

    let mut noise_gen = FixedNoise::new(noise.clone().into_dyn());
    let output = compute_vat(x.view().into_dyn(), &scorer, None, &config, &mut noise_gen).unwrap();

    let probe = xi * normalize(noise.view().into_dyn(), 1e-30).unwrap();
    let probe = probe.into_dimensionality::<Ix2>().unwrap();
    let q = softmax(x.dot(&w).view());
    let s = softmax((&x + &probe).dot(&w).view());
    let direction = normalize((&s - &q).dot(&w.t()).view().into_dyn(), 1e-30).unwrap();

    for (got, want) in output.perturbation.iter().zip(direction.iter()) {
        assert!((got - epsilon * want).abs() < 1e-3, "got {got}, expected {}", epsilon * want);
    }
}

#[test]
fn scores_grad_is_probability_gap_over_batch() {
    let mut rng = StdRng::seed_from_u64(77);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);

    let output = run(&x, &scorer, None, &VatConfig::default(), 9);

    let reference = softmax(scorer.scores(x.view()).unwrap().view());
    let probe = &x + &output.perturbation;
    let probs = softmax(scorer.scores(probe.view()).unwrap().view());
    let expected: Array2<f32> = (&probs - &reference) / BATCH as f32;

    for (got, want) in output.scores_grad.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-6);
    }
    for row in output.scores_grad.axis_iter(Axis(0)) {
        assert!(row.sum().abs() < 1e-6);
    }
}

#[test]
fn sequential_scorer_end_to_end() {
    let mut rng = StdRng::seed_from_u64(1);
    let scorer = Sequential::new([
        Dense::random((features(), 8), Some(ActFn::tanh()), &mut rng),
        Dense::random((8, 3), None, &mut rng),
    ])
    .unwrap();
    let x = batch(&mut rng);
    let config = config(VatParams {
        xi: 1e-3,
        num_approximation: 2,
        ..Default::default()
    });

    let mut noise = GaussianNoise::seeded(13);
    let output = compute_vat(x.view(), &scorer, None, &config, &mut noise).unwrap();

    assert!(output.loss.is_finite() && output.loss >= 0.);
    for norm in per_example_norm(output.perturbation.view()).unwrap() {
        assert_close(norm, config.epsilon(), 1e-4);
    }

    let grads = scorer
        .backward((&x + &output.perturbation).view(), output.scores_grad.view())
        .unwrap();
    assert_eq!(grads.params.len(), scorer.size());
}

#[test]
fn trait_object_scorer_is_accepted() {
    let mut rng = StdRng::seed_from_u64(6);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);
    let config = VatConfig::default();

    let concrete = run(&x, &scorer, None, &config, 21);

    let erased: &dyn Scorer = &scorer;
    let mut noise = GaussianNoise::seeded(21);
    let output = compute_vat(x.view(), erased, Some(erased), &config, &mut noise).unwrap();

    assert_eq!(concrete.loss.to_bits(), output.loss.to_bits());
    assert_eq!(concrete.perturbation, output.perturbation);
}

#[test]
fn invalid_calls_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let scorer = Linear::random(features(), CLASSES, &mut rng);
    let x = batch(&mut rng);
    let mut noise = GaussianNoise::seeded(0);

    let wrong_weights = config(VatParams {
        weight: vec![1.; BATCH + 1].into(),
        ..Default::default()
    });
    assert!(matches!(
        compute_vat(x.view(), &scorer, None, &wrong_weights, &mut noise),
        Err(VatErr::WeightMismatch {
            got: 5,
            expected: BATCH
        })
    ));

    let flat = Array::zeros(IxDyn(&[features()]));
    assert!(matches!(
        compute_vat(flat.view(), &scorer, None, &VatConfig::default(), &mut noise),
        Err(VatErr::ShapeMismatch { .. })
    ));

    struct Misshapen;

    impl NoiseGen for Misshapen {
        fn sample(&mut self, _shape: &[usize]) -> virtual_adversarial::Result<ArrayD<f32>> {
            Ok(Array::zeros(IxDyn(&[3, 5])))
        }
    }

    let square = Linear::random(6, CLASSES, &mut rng);
    assert!(matches!(
        compute_vat(
            Array::zeros(IxDyn(&[4, 6])).view(),
            &square,
            None,
            &VatConfig::default(),
            &mut Misshapen
        ),
        Err(VatErr::ShapeMismatch { what: "noise", .. })
    ));

    let narrow = Linear::random(features() - 1, CLASSES, &mut rng);
    assert!(matches!(
        compute_vat(x.view(), &scorer, Some(&narrow), &VatConfig::default(), &mut noise),
        Err(VatErr::ShapeMismatch { .. })
    ));

    assert!(matches!(
        VatConfig::new(VatParams {
            num_approximation: 0,
            ..Default::default()
        }),
        Err(VatErr::InvalidConfig { .. })
    ));
}
