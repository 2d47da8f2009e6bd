/*!
This crate is an implementation of a binary classifier trained as a regularized logistic regression with stochastic gradient descent. Training makes one pass over the examples per epoch in a randomly reshuffled order, with a learning rate that decays as a function of the step count and the regularization variance. The numeric core is exposed as pure value-returning functions, [`compute_sgd_step`](fn.compute_sgd_step.html) and [`decay_learning_rate`](fn.decay_learning_rate.html), so each piece can be tested in isolation.
*/

mod binary_classifier;

pub use self::binary_classifier::{
	compute_sgd_step, decay_learning_rate, total_log_likelihood, BinaryClassifier,
};

/// These are the options passed to `BinaryClassifier::train`.
#[derive(Clone, Debug)]
pub struct TrainOptions {
	/// This is the learning rate at the start of training. It decays after every step as `rate / (1 + rate * step / variance)`.
	pub learning_rate: f32,
	/// This is the variance hyperparameter. Its inverse scales the regularization: the gradient includes a `(2 / variance) * w` term, so a small variance means strong regularization.
	pub variance: f32,
	/// This is the number of epochs to train.
	pub max_epochs: usize,
}

impl Default for TrainOptions {
	fn default() -> Self {
		Self {
			learning_rate: 0.1,
			variance: 1.0,
			max_epochs: 20,
		}
	}
}

/// This is the training progress reported after each epoch.
#[derive(Clone, Debug)]
pub struct Progress {
	pub epoch: usize,
	/// the total log likelihood of the training set after this epoch
	pub log_likelihood: f32,
}
