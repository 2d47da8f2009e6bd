/*!
This module defines the `Config` struct, which is used to configure training a model with [`train`](../fn.train.html).
*/

/// Every field is optional; a missing field falls back to its default.
#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	/// the number of epochs each fold trains
	pub epochs: Option<usize>,
	/// the number of cross validation folds
	pub folds: Option<usize>,
	/// the learning rate values of the hyperparameter grid
	pub learning_rates: Option<Vec<f32>>,
	/// the variance values of the hyperparameter grid
	pub variances: Option<Vec<f32>>,
	/// the seed for the random number generator
	pub seed: Option<u64>,
}
