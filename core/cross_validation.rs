use marlin_dataset::Label;
use ndarray::prelude::*;
use rand::Rng;

/// A `Fold` is one partition of a k-way cross validation split.
#[derive(Debug)]
pub struct Fold {
	pub features: Array2<f32>,
	pub labels: Vec<Label>,
}

/// Split a dataset into `n_folds` folds by sampling rows without replacement: each of the first `n_folds - 1` folds draws `nrows / n_folds` rows uniformly from the remaining pool, and the last fold absorbs whatever remains. The folds partition the dataset exactly, with no row duplicated or dropped.
pub fn split_into_folds(
	n_folds: usize,
	features: ArrayView2<f32>,
	labels: &[Label],
	rng: &mut impl Rng,
) -> Vec<Fold> {
	let nrows = labels.len();
	let rows_per_fold = nrows / n_folds;
	let mut pool: Vec<usize> = (0..nrows).collect();
	let mut folds = Vec::with_capacity(n_folds);
	for _ in 0..n_folds - 1 {
		let mut row_indexes = Vec::with_capacity(rows_per_fold);
		for _ in 0..rows_per_fold {
			row_indexes.push(pool.remove(rng.gen_range(0, pool.len())));
		}
		folds.push(make_fold(&row_indexes, features, labels));
	}
	folds.push(make_fold(&pool, features, labels));
	folds
}

fn make_fold(row_indexes: &[usize], features: ArrayView2<f32>, labels: &[Label]) -> Fold {
	Fold {
		features: features.select(Axis(0), row_indexes),
		labels: row_indexes.iter().map(|index| labels[*index]).collect(),
	}
}

/// Concatenate every fold except the one at `fold_index` into one training dataset, in fold order.
pub fn training_data_for_fold(folds: &[Fold], fold_index: usize) -> (Array2<f32>, Vec<Label>) {
	let ncols = folds[fold_index].features.ncols();
	let nrows = folds
		.iter()
		.enumerate()
		.filter(|(index, _)| *index != fold_index)
		.map(|(_, fold)| fold.labels.len())
		.sum();
	let mut features = Array2::zeros((nrows, ncols));
	let mut labels = Vec::with_capacity(nrows);
	let mut row_index = 0;
	for (index, fold) in folds.iter().enumerate() {
		if index == fold_index {
			continue;
		}
		features
			.slice_mut(s![row_index..row_index + fold.features.nrows(), ..])
			.assign(&fold.features);
		labels.extend(fold.labels.iter().copied());
		row_index += fold.features.nrows();
	}
	(features, labels)
}

#[cfg(test)]
fn test_dataset(nrows: usize) -> (Array2<f32>, Vec<Label>) {
	let mut features = Array2::zeros((nrows, 2));
	let mut labels = Vec::with_capacity(nrows);
	for row_index in 0..nrows {
		features[[row_index, 0]] = 1.0;
		features[[row_index, 1]] = row_index as f32;
		labels.push(if row_index % 2 == 0 {
			Label::Positive
		} else {
			Label::Negative
		});
	}
	(features, labels)
}

#[test]
fn test_fold_partition() {
	use rand::SeedableRng;
	let (features, labels) = test_dataset(10);
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0);
	let folds = split_into_folds(3, features.view(), &labels, &mut rng);
	// the first folds hold floor(10 / 3) rows each and the last absorbs the remainder
	assert_eq!(
		folds.iter().map(|fold| fold.labels.len()).collect::<Vec<usize>>(),
		vec![3, 3, 4],
	);
	// the folds partition the rows exactly, and every row keeps its label
	let mut row_keys = Vec::new();
	for fold in folds.iter() {
		for (example, label) in fold.features.axis_iter(Axis(0)).zip(fold.labels.iter()) {
			let key = example[1] as usize;
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
	}
	row_keys.sort_unstable();
	assert_eq!(row_keys, (0..10).collect::<Vec<usize>>());
}

#[test]
fn test_fold_sizes_when_even() {
	use rand::SeedableRng;
	let (features, labels) = test_dataset(9);
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0);
	let folds = split_into_folds(3, features.view(), &labels, &mut rng);
	assert_eq!(
		folds.iter().map(|fold| fold.labels.len()).collect::<Vec<usize>>(),
		vec![3, 3, 3],
	);
}

#[test]
fn test_training_data_for_fold() {
	use rand::SeedableRng;
	let (features, labels) = test_dataset(10);
	let mut rng = rand_xoshiro::Xoshiro256Plus::seed_from_u64(0);
	let folds = split_into_folds(5, features.view(), &labels, &mut rng);
	let (training_features, training_labels) = training_data_for_fold(&folds, 2);
	assert_eq!(training_features.nrows(), 8);
	assert_eq!(training_labels.len(), 8);
	// the training rows are the complement of the held out fold
	let mut row_keys: Vec<usize> = training_features
		.axis_iter(Axis(0))
		.map(|example| example[1] as usize)
		.collect();
	row_keys.extend(
		folds[2]
			.features
			.axis_iter(Axis(0))
			.map(|example| example[1] as usize),
	);
	row_keys.sort_unstable();
	assert_eq!(row_keys, (0..10).collect::<Vec<usize>>());
}
