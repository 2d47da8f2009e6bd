use super::StreamingMetric;
use num_traits::ToPrimitive;

/// The streaming mean of a sequence of values.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	n: u64,
	sum: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = f32;
	type Output = Option<f32>;

	fn update(&mut self, input: Self::Input) {
		self.n += 1;
		self.sum += input.to_f64().unwrap();
	}

	fn merge(&mut self, other: Self) {
		self.n += other.n;
		self.sum += other.sum;
	}

	/// The mean of zero values is undefined, so `finalize()` returns `None` if `update()` was never called.
	fn finalize(self) -> Option<f32> {
		if self.n == 0 {
			None
		} else {
			Some((self.sum / self.n.to_f64().unwrap()).to_f32().unwrap())
		}
	}
}

#[test]
fn test_mean() {
	let mut mean = Mean::new();
	assert_eq!(mean.clone().finalize(), None);
	mean.update(1.0);
	mean.update(0.0);
	mean.update(0.5);
	assert_eq!(mean.finalize(), Some(0.5));
}

#[test]
fn test_merge() {
	let mut left = Mean::new();
	left.update(1.0);
	let mut right = Mean::new();
	right.update(0.0);
	left.merge(right);
	assert_eq!(left.finalize(), Some(0.5));
}
