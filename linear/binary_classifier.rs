use super::{Progress, TrainOptions};
use itertools::izip;
use marlin_dataset::Label;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use rand::Rng;

/// The swap count for an epoch is drawn uniformly from `[0, MIN_SHUFFLES + nrows / 2)`.
const MIN_SHUFFLES: usize = 100;

/// A `BinaryClassifier` predicts the sign of the dot product of its weight vector with a feature vector whose position 0 holds the constant 1.0 bias feature, so `weights[0]` acts as an intercept.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryClassifier {
	pub weights: Array1<f32>,
	/// the total log likelihood of the training set after each epoch
	pub losses: Vec<f32>,
}

impl BinaryClassifier {
	/// Train a classifier starting from a zero weight vector. The training matrix is taken by value because its rows are reshuffled in place between epochs, with labels permuted identically.
	pub fn train(
		mut features: Array2<f32>,
		mut labels: Vec<Label>,
		options: &TrainOptions,
		rng: &mut impl Rng,
		update_progress: &mut dyn FnMut(Progress),
	) -> BinaryClassifier {
		let mut model = BinaryClassifier {
			weights: Array1::zeros(features.ncols()),
			losses: vec![],
		};
		// the learning rate and step counter carry across epochs within one training run
		let mut learning_rate = options.learning_rate;
		let mut step = 0;
		for epoch in 0..options.max_epochs {
			if epoch > 0 {
				shuffle_rows(&mut features, &mut labels, rng);
			}
			for (example, label) in izip!(features.axis_iter(Axis(0)), labels.iter()) {
				learning_rate = decay_learning_rate(learning_rate, step, options.variance);
				step += 1;
				model.weights = compute_sgd_step(
					&model.weights,
					example,
					*label,
					learning_rate,
					options.variance,
				);
			}
			let log_likelihood = total_log_likelihood(features.view(), &labels, &model.weights);
			model.losses.push(log_likelihood);
			update_progress(Progress {
				epoch,
				log_likelihood,
			});
		}
		model
	}

	/// Predict a label for each row of `features`, whose position 0 must hold the bias feature. A dot product of exactly zero classifies positive.
	pub fn predict(&self, features: ArrayView2<f32>) -> Vec<Label> {
		features
			.axis_iter(Axis(0))
			.map(|example| {
				if example.dot(&self.weights) >= 0.0 {
					Label::Positive
				} else {
					Label::Negative
				}
			})
			.collect()
	}
}

/// Advance the learning rate by one step of the decay schedule: `rate / (1 + rate * step / variance)`. The decay compounds, because the rate passed in is the one the previous step produced.
pub fn decay_learning_rate(learning_rate: f32, step: usize, variance: f32) -> f32 {
	learning_rate / (1.0 + learning_rate * step.to_f32().unwrap() / variance)
}

/// Compute one stochastic gradient descent step on the regularized negative log likelihood: `w ← w − rate · (sigmoid_term · x + (2 / variance) · w)` where `sigmoid_term = −label / (1 + exp(label · dot(w, x)))`.
pub fn compute_sgd_step(
	weights: &Array1<f32>,
	example: ArrayView1<f32>,
	label: Label,
	learning_rate: f32,
	variance: f32,
) -> Array1<f32> {
	let label = label.value();
	let sigmoid_term = -label / (1.0 + (label * weights.dot(&example)).exp());
	let gradient = &example * sigmoid_term + weights * (2.0 / variance);
	weights - &(gradient * learning_rate)
}

/// Compute the total log likelihood `Σ −ln(1 + exp(−label · dot(w, x)))` of `weights` over a dataset. Training pushes this toward zero; it is reported after each epoch as a convergence diagnostic.
pub fn total_log_likelihood(
	features: ArrayView2<f32>,
	labels: &[Label],
	weights: &Array1<f32>,
) -> f32 {
	izip!(features.axis_iter(Axis(0)), labels.iter())
		.map(|(example, label)| -(1.0 + (-label.value() * weights.dot(&example)).exp()).ln())
		.sum()
}

/// Shuffle the rows of `features` and `labels` identically by performing a randomly drawn number of random pairwise swaps. Drawing the same position twice is a no-op.
fn shuffle_rows(features: &mut Array2<f32>, labels: &mut [Label], rng: &mut impl Rng) {
	let nrows = labels.len();
	let n_swaps = rng.gen_range(0, MIN_SHUFFLES + nrows / 2);
	for _ in 0..n_swaps {
		let a = rng.gen_range(0, nrows);
		let b = rng.gen_range(0, nrows);
		if a != b {
			for column_index in 0..features.ncols() {
				features.swap([a, column_index], [b, column_index]);
			}
			labels.swap(a, b);
		}
	}
}

#[test]
fn test_decay_learning_rate() {
	assert_eq!(decay_learning_rate(1.0, 0, 1.0), 1.0);
	assert_eq!(decay_learning_rate(1.0, 1, 1.0), 0.5);
	assert!((decay_learning_rate(0.5, 2, 0.5) - 0.5 / 3.0).abs() < 1e-6);
}

#[test]
fn test_compute_sgd_step() {
	// with zero weights the sigmoid term is -label / 2 and the regularization term vanishes
	let weights = ndarray::arr1(&[0.0, 0.0]);
	let example = ndarray::arr1(&[1.0, 2.0]);
	let weights = compute_sgd_step(&weights, example.view(), Label::Positive, 0.5, 2.0);
	assert!((weights[0] - 0.25).abs() < 1e-6);
	assert!((weights[1] - 0.5).abs() < 1e-6);
	// with nonzero weights the regularization term pulls the weights toward zero
	let weights = ndarray::arr1(&[1.0, 0.0]);
	let example = ndarray::arr1(&[1.0, 0.0]);
	let weights = compute_sgd_step(&weights, example.view(), Label::Negative, 0.1, 1.0);
	let sigmoid_term = 1.0 / (1.0 + (-1.0f32).exp());
	assert!((weights[0] - (1.0 - 0.1 * (sigmoid_term + 2.0))).abs() < 1e-6);
	assert!((weights[1] - 0.0).abs() < 1e-6);
}

#[test]
fn test_total_log_likelihood_at_zero_weights() {
	let features = ndarray::arr2(&[[1.0, 2.0], [1.0, -1.0], [1.0, 0.0]]);
	let labels = vec![Label::Positive, Label::Negative, Label::Positive];
	let weights = ndarray::arr1(&[0.0, 0.0]);
	let log_likelihood = total_log_likelihood(features.view(), &labels, &weights);
	assert!((log_likelihood - 3.0 * -(2.0f32.ln())).abs() < 1e-6);
}

#[test]
fn test_shuffle_rows_preserves_pairs() {
	use rand::SeedableRng;
	let mut features = ndarray::Array2::zeros((10, 2));
	let mut labels = Vec::new();
	for row_index in 0..10 {
		features[[row_index, 0]] = 1.0;
		features[[row_index, 1]] = row_index.to_f32().unwrap();
		labels.push(if row_index % 2 == 0 {
			Label::Positive
		} else {
			Label::Negative
		});
	}
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0);
	shuffle_rows(&mut features, &mut labels, &mut rng);
	// every row keeps its label and every row is still present exactly once
	let mut row_keys = Vec::new();
	for (example, label) in izip!(features.axis_iter(Axis(0)), labels.iter()) {
		let key = example[1].to_usize().unwrap();
		assert_eq!(
			*label,
			if key % 2 == 0 {
				Label::Positive
			} else {
				Label::Negative
			},
		);
		row_keys.push(key);
	}
	row_keys.sort_unstable();
	assert_eq!(row_keys, (0..10).collect::<Vec<usize>>());
}

#[test]
fn test_tie_classifies_positive() {
	let model = BinaryClassifier {
		weights: ndarray::arr1(&[0.0, 0.0]),
		losses: vec![],
	};
	let features = ndarray::arr2(&[[1.0, -5.0]]);
	assert_eq!(model.predict(features.view()), vec![Label::Positive]);
}

#[test]
fn test_train_separable() {
	use rand::SeedableRng;
	let features = ndarray::arr2(&[[1.0, 2.0], [1.0, -2.0], [1.0, 3.0], [1.0, -3.0]]);
	let labels = vec![
		Label::Positive,
		Label::Negative,
		Label::Positive,
		Label::Negative,
	];
	let options = TrainOptions {
		learning_rate: 0.1,
		variance: 1000.0,
		max_epochs: 20,
	};
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0);
	let model = BinaryClassifier::train(
		features.clone(),
		labels.clone(),
		&options,
		&mut rng,
		&mut |_| {},
	);
	assert_eq!(model.losses.len(), 20);
	// the log likelihood is negative and training moves it toward zero
	assert!(model.losses.last().unwrap() > model.losses.first().unwrap());
	assert_eq!(model.predict(features.view()), labels);
}

#[test]
fn test_train_is_reproducible() {
	use rand::SeedableRng;
	let features = ndarray::arr2(&[[1.0, 2.0], [1.0, -2.0], [1.0, 3.0], [1.0, -3.0]]);
	let labels = vec![
		Label::Positive,
		Label::Negative,
		Label::Positive,
		Label::Negative,
	];
	let options = TrainOptions::default();
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(25);
	let left = BinaryClassifier::train(
		features.clone(),
		labels.clone(),
		&options,
		&mut rng,
		&mut |_| {},
	);
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(25);
	let right = BinaryClassifier::train(features, labels, &options, &mut rng, &mut |_| {});
	assert_eq!(left, right);
}
