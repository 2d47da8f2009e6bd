/// `Progress` values are reported through the callback passed to [`train`](../fn.train.html) as training advances. The caller owns the sink, so diagnostics can go to a log file, a terminal, or nowhere.
#[derive(Debug)]
pub enum Progress {
	/// reading and parsing the data files
	Loading,
	/// one fold of one grid cell finished an epoch
	Training {
		learning_rate: f32,
		variance: f32,
		fold: usize,
		progress: marlin_linear::Progress,
	},
	/// cross validation finished for one grid cell
	GridCell {
		learning_rate: f32,
		variance: f32,
		accuracy: f32,
	},
	/// evaluating the best weights on the test set
	Testing,
}
