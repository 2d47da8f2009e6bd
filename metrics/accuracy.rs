use super::{mean::Mean, StreamingMetric};
use marlin_dataset::Label;

/// The accuracy is the proportion of examples where predicted == label. It is always a fraction in [0, 1].
#[derive(Default)]
pub struct Accuracy(Mean);

impl Accuracy {
	pub fn new() -> Self {
		Self::default()
	}
}

impl StreamingMetric<'_> for Accuracy {
	type Input = (Label, Label);
	type Output = Option<f32>;

	fn update(&mut self, value: Self::Input) {
		self.0.update(if value.0 == value.1 { 1.0 } else { 0.0 })
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Option<f32> {
		self.0.finalize()
	}
}

#[test]
fn test_accuracy() {
	let labels = vec![Label::Positive, Label::Negative, Label::Positive];
	let predictions = vec![Label::Positive, Label::Positive, Label::Positive];
	let mut accuracy = Accuracy::new();
	for (label, prediction) in labels.iter().zip(predictions.iter()) {
		accuracy.update((*label, *prediction));
	}
	let accuracy = accuracy.finalize().unwrap();
	assert!((accuracy - 2.0 / 3.0).abs() < f32::EPSILON);
}

#[test]
fn test_accuracy_bounds() {
	let labels = vec![Label::Positive, Label::Negative, Label::Negative];
	let mut same = Accuracy::new();
	let mut inverted = Accuracy::new();
	for label in labels.iter() {
		same.update((*label, *label));
		let inverse = match label {
			Label::Positive => Label::Negative,
			Label::Negative => Label::Positive,
		};
		inverted.update((*label, inverse));
	}
	assert_eq!(same.finalize(), Some(1.0));
	assert_eq!(inverted.finalize(), Some(0.0));
}
