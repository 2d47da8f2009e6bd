use crate::config::Config;
use itertools::iproduct;

/// A `GridItem` is a description of a single entry in the hyperparameter grid: the learning rate and variance value to cross validate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridItem {
	pub learning_rate: f32,
	pub variance: f32,
}

const DEFAULT_LEARNING_RATE_VALUES: [f32; 11] = [
	1.0, 1e-1, 1e-2, 1e-3, 1e-4, 1e-5, 1e-6, 1e-7, 1e-8, 1e-9, 1e-10,
];
// the default variance values are the squares of the default learning rate values
const DEFAULT_VARIANCE_VALUES: [f32; 11] = [
	1.0, 1e-2, 1e-4, 1e-6, 1e-8, 1e-10, 1e-12, 1e-14, 1e-16, 1e-18, 1e-20,
];

/// Compute the hyperparameter grid, with learning rates as the outer loop and variance values as the inner loop. Grid order matters: cells consume the shared random number stream in this order, and the first of two equally accurate cells wins.
pub fn compute_hyperparameter_grid(config: &Option<Config>) -> Vec<GridItem> {
	let learning_rates = config
		.as_ref()
		.and_then(|config| config.learning_rates.clone())
		.unwrap_or_else(|| DEFAULT_LEARNING_RATE_VALUES.to_vec());
	let variances = config
		.as_ref()
		.and_then(|config| config.variances.clone())
		.unwrap_or_else(|| DEFAULT_VARIANCE_VALUES.to_vec());
	iproduct!(learning_rates.iter(), variances.iter())
		.map(|(&learning_rate, &variance)| GridItem {
			learning_rate,
			variance,
		})
		.collect()
}

#[test]
fn test_default_grid() {
	let grid = compute_hyperparameter_grid(&None);
	assert_eq!(grid.len(), 121);
	// learning rates are the outer loop
	assert_eq!(
		grid[0],
		GridItem {
			learning_rate: 1.0,
			variance: 1.0,
		},
	);
	assert_eq!(
		grid[1],
		GridItem {
			learning_rate: 1.0,
			variance: 1e-2,
		},
	);
	assert_eq!(
		grid[11],
		GridItem {
			learning_rate: 1e-1,
			variance: 1.0,
		},
	);
}

#[test]
fn test_config_grid() {
	let config = Config {
		learning_rates: Some(vec![0.5]),
		variances: Some(vec![2.0, 4.0]),
		..Default::default()
	};
	let grid = compute_hyperparameter_grid(&Some(config));
	assert_eq!(
		grid,
		vec![
			GridItem {
				learning_rate: 0.5,
				variance: 2.0,
			},
			GridItem {
				learning_rate: 0.5,
				variance: 4.0,
			},
		],
	);
}
