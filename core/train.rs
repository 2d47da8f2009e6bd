use crate::{
	config::Config,
	cross_validation::{split_into_folds, training_data_for_fold},
	grid::{self, GridItem},
	progress::Progress,
};
use anyhow::{format_err, Context, Result};
use marlin_dataset::Label;
use marlin_linear::{BinaryClassifier, TrainOptions};
use marlin_metrics::{Accuracy, Mean, StreamingMetric};
use ndarray::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use std::path::Path;

/// The default number of cross validation folds.
const DEFAULT_FOLDS: usize = 5;
/// The default number of epochs each fold trains.
const DEFAULT_EPOCHS: usize = 20;
/// The default seed for the shared random number generator. Two runs with the same seed, input files, and grid produce the same model.
const DEFAULT_SEED: u64 = 0;

/// A trained `Model`: the best weight vector the grid search found, the hyperparameters that produced it, and its accuracies.
#[derive(Debug, serde::Serialize)]
pub struct Model {
	pub weights: Vec<f32>,
	pub learning_rate: f32,
	pub variance: f32,
	pub cross_validation_accuracy: f32,
	pub test_accuracy: f32,
}

impl Model {
	/// Write this model to the file at `path` as json.
	pub fn to_file(&self, path: &Path) -> Result<()> {
		let file = std::fs::File::create(path)
			.with_context(|| format!("failed to create {}", path.display()))?;
		serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
		Ok(())
	}
}

/// Train a model: load the data files, search the hyperparameter grid with k-fold cross validation, and evaluate the best weight vector on the test set.
pub fn train(
	training_path: &Path,
	testing_path: &Path,
	config_path: Option<&Path>,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<Model> {
	// load the config from the config file, if provided
	let config = load_config(config_path)?;

	// load the training and testing data, which fixes the shared feature width
	update_progress(Progress::Loading);
	let dataset = marlin_dataset::load(training_path, testing_path)?;

	let n_folds = config
		.as_ref()
		.and_then(|config| config.folds)
		.unwrap_or(DEFAULT_FOLDS);
	let max_epochs = config
		.as_ref()
		.and_then(|config| config.epochs)
		.unwrap_or(DEFAULT_EPOCHS);
	let seed = config
		.as_ref()
		.and_then(|config| config.seed)
		.unwrap_or(DEFAULT_SEED);
	let grid = grid::compute_hyperparameter_grid(&config);

	// one seeded generator drives both fold sampling and epoch shuffling
	let mut rng = Xoshiro256Plus::seed_from_u64(seed);

	let best = fit(
		dataset.train.features.view(),
		&dataset.train.labels,
		&grid,
		n_folds,
		max_epochs,
		&mut rng,
		update_progress,
	)?;

	// evaluate the best weights on the test set
	update_progress(Progress::Testing);
	let predictions = best.model.predict(dataset.test.features.view());
	let test_accuracy = compute_accuracy(&dataset.test.labels, &predictions);

	Ok(Model {
		weights: best.model.weights.to_vec(),
		learning_rate: best.grid_item.learning_rate,
		variance: best.grid_item.variance,
		cross_validation_accuracy: best.accuracy,
		test_accuracy,
	})
}

/// This is the output of [`fit`](fn.fit.html): the winning grid cell, the weight vector its final fold trained, and its average cross validation accuracy.
#[derive(Debug)]
pub struct FitOutput {
	pub model: BinaryClassifier,
	pub grid_item: GridItem,
	pub accuracy: f32,
}

/// Search the hyperparameter grid. Every grid cell runs a fresh k-fold split of the training data; each fold trains a zero-initialized classifier on the other folds and scores accuracy on the held-out fold. The cell with the highest average fold accuracy wins. The comparison is strict, so the first of two equally accurate cells is kept.
pub fn fit(
	features: ArrayView2<f32>,
	labels: &[Label],
	grid: &[GridItem],
	n_folds: usize,
	max_epochs: usize,
	rng: &mut impl Rng,
	update_progress: &mut dyn FnMut(Progress),
) -> Result<FitOutput> {
	if grid.is_empty() {
		return Err(format_err!("the hyperparameter grid is empty"));
	}
	if n_folds < 2 || n_folds > labels.len() {
		return Err(format_err!(
			"the fold count must be at least 2 and at most the number of training rows, but it is {} and there are {} training rows",
			n_folds,
			labels.len(),
		));
	}
	let mut best: Option<FitOutput> = None;
	for grid_item in grid.iter() {
		let options = TrainOptions {
			learning_rate: grid_item.learning_rate,
			variance: grid_item.variance,
			max_epochs,
		};
		let folds = split_into_folds(n_folds, features, labels, rng);
		let mut fold_accuracies = Mean::new();
		let mut cell_model = None;
		for fold_index in 0..folds.len() {
			let (training_features, training_labels) = training_data_for_fold(&folds, fold_index);
			let model = BinaryClassifier::train(
				training_features,
				training_labels,
				&options,
				rng,
				&mut |progress| {
					update_progress(Progress::Training {
						learning_rate: grid_item.learning_rate,
						variance: grid_item.variance,
						fold: fold_index,
						progress,
					})
				},
			);
			let held_out = &folds[fold_index];
			let predictions = model.predict(held_out.features.view());
			fold_accuracies.update(compute_accuracy(&held_out.labels, &predictions));
			cell_model = Some(model);
		}
		let accuracy = fold_accuracies.finalize().unwrap();
		update_progress(Progress::GridCell {
			learning_rate: grid_item.learning_rate,
			variance: grid_item.variance,
			accuracy,
		});
		let improved = match best.as_ref() {
			None => true,
			Some(best) => accuracy > best.accuracy,
		};
		if improved {
			best = Some(FitOutput {
				model: cell_model.unwrap(),
				grid_item: *grid_item,
				accuracy,
			});
		}
	}
	Ok(best.unwrap())
}

/// Score predictions against their true labels. The slices must have the same length; a mismatch is a defect in fold construction or feature width computation, not valid input.
fn compute_accuracy(labels: &[Label], predictions: &[Label]) -> f32 {
	assert_eq!(labels.len(), predictions.len());
	let mut accuracy = Accuracy::new();
	for (label, prediction) in labels.iter().zip(predictions.iter()) {
		accuracy.update((*label, *prediction));
	}
	accuracy.finalize().unwrap()
}

fn load_config(config_path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(config_path) = config_path {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_yaml::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(Some(config))
	} else {
		Ok(None)
	}
}

#[cfg(test)]
fn test_dataset() -> (Array2<f32>, Vec<Label>) {
	let features = ndarray::arr2(&[
		[1.0, 2.0],
		[1.0, -2.0],
		[1.0, 3.0],
		[1.0, -3.0],
		[1.0, 4.0],
		[1.0, -4.0],
	]);
	let labels = vec![
		Label::Positive,
		Label::Negative,
		Label::Positive,
		Label::Negative,
		Label::Positive,
		Label::Negative,
	];
	(features, labels)
}

#[test]
fn test_fit_single_cell() {
	let (features, labels) = test_dataset();
	let grid = vec![GridItem {
		learning_rate: 0.1,
		variance: 1000.0,
	}];
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	let output = fit(features.view(), &labels, &grid, 2, 20, &mut rng, &mut |_| {}).unwrap();
	assert_eq!(output.grid_item, grid[0]);
	assert!(output.accuracy >= 0.0 && output.accuracy <= 1.0);
	assert_eq!(output.model.weights.len(), 2);
}

#[test]
fn test_fit_rejects_degenerate_folds() {
	let (features, labels) = test_dataset();
	let grid = vec![GridItem {
		learning_rate: 0.1,
		variance: 1.0,
	}];
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	assert!(fit(features.view(), &labels, &grid, 1, 20, &mut rng, &mut |_| {}).is_err());
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	assert!(fit(features.view(), &labels, &grid, 7, 20, &mut rng, &mut |_| {}).is_err());
}

#[test]
fn test_fit_keeps_first_of_equal_cells() {
	// with every label positive and every feature non-negative, the weights can never go negative, so every cell scores accuracy 1.0 and the first must win
	let features = ndarray::arr2(&[
		[1.0, 1.0],
		[1.0, 2.0],
		[1.0, 3.0],
		[1.0, 4.0],
		[1.0, 5.0],
		[1.0, 6.0],
	]);
	let labels = vec![Label::Positive; 6];
	let grid = vec![
		GridItem {
			learning_rate: 0.1,
			variance: 1000.0,
		},
		GridItem {
			learning_rate: 0.2,
			variance: 1000.0,
		},
	];
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	let output = fit(features.view(), &labels, &grid, 2, 5, &mut rng, &mut |_| {}).unwrap();
	assert_eq!(output.accuracy, 1.0);
	assert_eq!(output.grid_item, grid[0]);
}

#[test]
fn test_fit_is_reproducible() {
	let (features, labels) = test_dataset();
	let grid = vec![
		GridItem {
			learning_rate: 0.1,
			variance: 1.0,
		},
		GridItem {
			learning_rate: 0.01,
			variance: 0.01,
		},
	];
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	let left = fit(features.view(), &labels, &grid, 3, 10, &mut rng, &mut |_| {}).unwrap();
	let mut rng = Xoshiro256Plus::seed_from_u64(0);
	let right = fit(features.view(), &labels, &grid, 3, 10, &mut rng, &mut |_| {}).unwrap();
	assert_eq!(left.model.weights, right.model.weights);
	assert_eq!(left.grid_item, right.grid_item);
	assert_eq!(left.accuracy, right.accuracy);
}
