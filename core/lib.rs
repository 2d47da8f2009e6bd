/*!
This crate implements the [`train`](fn.train.html) entry point: load the training and testing files, search a learning rate × variance hyperparameter grid with k-fold cross validation, and evaluate the best weight vector the search found on the test set.
*/

mod config;
mod cross_validation;
mod grid;
mod progress;
mod train;

pub use self::config::Config;
pub use self::grid::{compute_hyperparameter_grid, GridItem};
pub use self::progress::Progress;
pub use self::train::{fit, train, FitOutput, Model};
