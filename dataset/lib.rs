/*!
This crate loads data files in the sparse labeled-feature format, where each non-blank line is `<label> <index>:<value> ...` with strictly ascending 1-based feature indices, into a dense feature matrix and a parallel list of binary labels. The vector width is fixed by the maximum feature index across the training and testing files together, so rows from either file are directly comparable. Position 0 of every row is the constant 1.0 bias feature, so the first component of a weight vector acts as an intercept.
*/

use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A `Label` is one of the two classes a row can belong to. The signed value it carries participates directly in the gradient and log likelihood computations, which is why this is not a plain bool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Label {
	Negative,
	Positive,
}

impl Label {
	/// Return the signed value of this label, +1.0 for positive and -1.0 for negative.
	pub fn value(self) -> f32 {
		match self {
			Label::Positive => 1.0,
			Label::Negative => -1.0,
		}
	}
}

/// A `Dataset` holds a dense feature matrix and the label for each of its rows. It is immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
	pub features: Array2<f32>,
	pub labels: Vec<Label>,
}

impl Dataset {
	pub fn nrows(&self) -> usize {
		self.features.nrows()
	}
}

/// This is the output of [`load`](fn.load.html): the training and testing datasets, whose rows all have length `n_features`.
pub struct LoadOutput {
	pub train: Dataset,
	pub test: Dataset,
	pub n_features: usize,
}

/// An error encountered while loading a data file. Every variant is fatal, because no partial dataset is usable.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read {}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("{}:{}: invalid label \"{}\"", .path.display(), .line, .token)]
	InvalidLabel {
		path: PathBuf,
		line: usize,
		token: String,
	},
	#[error("{}:{}: invalid feature \"{}\"", .path.display(), .line, .token)]
	InvalidFeature {
		path: PathBuf,
		line: usize,
		token: String,
	},
	#[error("{}:{}: feature indices must be strictly ascending", .path.display(), .line)]
	FeatureIndexOrder { path: PathBuf, line: usize },
}

/// Load the training and testing files. The first pass over both files finds the maximum feature index, which fixes the shared vector width. The second pass expands each row into a dense vector of that width.
pub fn load(training_path: &Path, testing_path: &Path) -> Result<LoadOutput, LoadError> {
	let training_lines = read_lines(training_path)?;
	let testing_lines = read_lines(testing_path)?;
	let max_index = usize::max(
		max_feature_index(&training_lines, training_path)?,
		max_feature_index(&testing_lines, testing_path)?,
	);
	let n_features = max_index + 1;
	let train = parse_dataset(&training_lines, n_features, training_path)?;
	let test = parse_dataset(&testing_lines, n_features, testing_path)?;
	Ok(LoadOutput {
		train,
		test,
		n_features,
	})
}

/// Read the non-blank lines of the file at `path`.
fn read_lines(path: &Path) -> Result<Vec<String>, LoadError> {
	let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
		path: path.to_owned(),
		source,
	})?;
	Ok(contents
		.lines()
		.map(|line| line.trim())
		.filter(|line| !line.is_empty())
		.map(|line| line.to_owned())
		.collect())
}

/// Find the largest feature index in `lines`. Because feature indices ascend within a row, it is in the last token of one of the rows. A row with only a label token has no feature indices and contributes nothing.
fn max_feature_index(lines: &[String], path: &Path) -> Result<usize, LoadError> {
	let mut max_index = 0;
	for (line_index, line) in lines.iter().enumerate() {
		let mut tokens = line.split_whitespace();
		tokens.next();
		if let Some(token) = tokens.last() {
			let index = token
				.splitn(2, ':')
				.next()
				.unwrap()
				.parse::<usize>()
				.map_err(|_| LoadError::InvalidFeature {
					path: path.to_owned(),
					line: line_index + 1,
					token: token.to_owned(),
				})?;
			max_index = usize::max(max_index, index);
		}
	}
	Ok(max_index)
}

/// Expand each line into a dense row of length `n_features` whose position 0 is the 1.0 bias feature and whose other positions are 0.0 except where the line lists an `index:value` pair.
fn parse_dataset(
	lines: &[String],
	n_features: usize,
	path: &Path,
) -> Result<Dataset, LoadError> {
	let mut features = Array2::zeros((lines.len(), n_features));
	let mut labels = Vec::with_capacity(lines.len());
	for (line_index, line) in lines.iter().enumerate() {
		let mut row = features.row_mut(line_index);
		row[0] = 1.0;
		let mut tokens = line.split_whitespace();
		// lines are non-blank, so there is always a label token
		let label_token = tokens.next().unwrap();
		let label: i64 = label_token.parse().map_err(|_| LoadError::InvalidLabel {
			path: path.to_owned(),
			line: line_index + 1,
			token: label_token.to_owned(),
		})?;
		labels.push(if label == 1 {
			Label::Positive
		} else {
			Label::Negative
		});
		let mut previous_index = 0;
		for token in tokens {
			let (index, value) =
				parse_feature_token(token).ok_or_else(|| LoadError::InvalidFeature {
					path: path.to_owned(),
					line: line_index + 1,
					token: token.to_owned(),
				})?;
			if index <= previous_index || index >= n_features {
				return Err(LoadError::FeatureIndexOrder {
					path: path.to_owned(),
					line: line_index + 1,
				});
			}
			previous_index = index;
			row[index] = value.to_f32().unwrap();
		}
	}
	Ok(Dataset { features, labels })
}

/// Split an `index:value` token into its integer components.
fn parse_feature_token(token: &str) -> Option<(usize, i32)> {
	let mut components = token.splitn(2, ':');
	let index = components.next()?.parse().ok()?;
	let value = components.next()?.parse().ok()?;
	Some((index, value))
}

#[test]
fn test_parse_dataset() {
	let lines = vec!["1 1:3 3:5".to_owned()];
	let dataset = parse_dataset(&lines, 5, Path::new("test")).unwrap();
	assert_eq!(dataset.features, ndarray::arr2(&[[1.0, 3.0, 0.0, 5.0, 0.0]]));
	assert_eq!(dataset.labels, vec![Label::Positive]);
}

#[test]
fn test_label_mapping() {
	let lines = vec![
		"1 1:1".to_owned(),
		"0 1:1".to_owned(),
		"-1 1:1".to_owned(),
		"2 1:1".to_owned(),
	];
	let dataset = parse_dataset(&lines, 2, Path::new("test")).unwrap();
	assert_eq!(
		dataset.labels,
		vec![
			Label::Positive,
			Label::Negative,
			Label::Negative,
			Label::Negative,
		],
	);
}

#[test]
fn test_bias_only_row() {
	let lines = vec!["1".to_owned()];
	let dataset = parse_dataset(&lines, 3, Path::new("test")).unwrap();
	assert_eq!(dataset.features, ndarray::arr2(&[[1.0, 0.0, 0.0]]));
}

#[test]
fn test_max_feature_index() {
	let lines = vec!["1 1:3 4:2".to_owned(), "0 2:1".to_owned()];
	assert_eq!(max_feature_index(&lines, Path::new("test")).unwrap(), 4);
	let lines = vec!["1".to_owned()];
	assert_eq!(max_feature_index(&lines, Path::new("test")).unwrap(), 0);
}

#[test]
fn test_shared_width() {
	// the width comes from whichever file holds the largest index
	let training_lines = vec!["1 1:2".to_owned()];
	let testing_lines = vec!["0 3:1".to_owned()];
	let max_index = usize::max(
		max_feature_index(&training_lines, Path::new("train")).unwrap(),
		max_feature_index(&testing_lines, Path::new("test")).unwrap(),
	);
	let train = parse_dataset(&training_lines, max_index + 1, Path::new("train")).unwrap();
	let test = parse_dataset(&testing_lines, max_index + 1, Path::new("test")).unwrap();
	assert_eq!(train.features, ndarray::arr2(&[[1.0, 2.0, 0.0, 0.0]]));
	assert_eq!(test.features, ndarray::arr2(&[[1.0, 0.0, 0.0, 1.0]]));
}

#[test]
fn test_feature_index_order_error() {
	let lines = vec!["1 3:1 2:1".to_owned()];
	let error = parse_dataset(&lines, 4, Path::new("test")).unwrap_err();
	assert!(matches!(error, LoadError::FeatureIndexOrder { line: 1, .. }));
	let lines = vec!["1 2:1 2:1".to_owned()];
	let error = parse_dataset(&lines, 3, Path::new("test")).unwrap_err();
	assert!(matches!(error, LoadError::FeatureIndexOrder { line: 1, .. }));
}

#[test]
fn test_invalid_label_error() {
	let lines = vec!["x 1:1".to_owned()];
	let error = parse_dataset(&lines, 2, Path::new("test")).unwrap_err();
	assert!(matches!(error, LoadError::InvalidLabel { line: 1, .. }));
}

#[test]
fn test_invalid_feature_error() {
	let lines = vec!["1 1:x".to_owned()];
	let error = parse_dataset(&lines, 2, Path::new("test")).unwrap_err();
	assert!(matches!(error, LoadError::InvalidFeature { line: 1, .. }));
	let lines = vec!["1 1".to_owned()];
	let error = parse_dataset(&lines, 2, Path::new("test")).unwrap_err();
	assert!(matches!(error, LoadError::InvalidFeature { line: 1, .. }));
}
