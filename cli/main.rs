//! This module contains the main entrypoint to the marlin cli.

use anyhow::{Context, Result};
use clap::Clap;
use colored::Colorize;
use marlin_core::Progress;
use std::{io::Write, path::PathBuf};

#[derive(Clap)]
#[clap(
	about = "Train a logistic regression classifier and report its test accuracy.",
	setting = clap::AppSettings::DisableHelpSubcommand,
)]
enum Options {
	#[clap(name = "train")]
	Train(Box<TrainOptions>),
}

#[derive(Clap, Debug)]
#[clap(about = "train a classifier")]
#[clap(
	long_about = "train a classifier from a pair of sparse labeled-feature files and report its accuracy on the testing file"
)]
struct TrainOptions {
	#[clap(long, about = "the path to the file used for training")]
	file_train: PathBuf,
	#[clap(long, about = "the path to the file used for testing")]
	file_test: PathBuf,
	#[clap(short, long, about = "the path to a config file")]
	config: Option<PathBuf>,
	#[clap(short, long, about = "the path to write the trained model to")]
	output: Option<PathBuf>,
	#[clap(
		long,
		about = "the path to write diagnostic lines to",
		default_value = "train.log"
	)]
	log: PathBuf,
}

fn main() {
	let options = Options::parse();
	let result = match options {
		Options::Train(options) => cli_train(*options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_train(options: TrainOptions) -> Result<()> {
	let log_file = std::fs::File::create(&options.log)
		.with_context(|| format!("failed to create log file {}", options.log.display()))?;
	let mut log = std::io::BufWriter::new(log_file);
	let model = marlin_core::train(
		&options.file_train,
		&options.file_test,
		options.config.as_deref(),
		&mut |progress| write_progress(&mut log, progress),
	)?;
	log.flush()?;

	// write the model to the output path, if one was provided
	if let Some(output_path) = options.output.as_ref() {
		model.to_file(output_path)?;
		eprintln!("Your model was written to {}.", output_path.display());
	}

	// report the accuracy of the best weight vector on the test set
	println!("Accuracy: {}", model.test_accuracy);

	Ok(())
}

/// Write one diagnostic line per progress event. A failed diagnostic write never aborts training.
fn write_progress(log: &mut impl Write, progress: Progress) {
	match progress {
		Progress::Loading => writeln!(log, "loading data"),
		Progress::Training {
			learning_rate,
			variance,
			fold,
			progress,
		} => writeln!(
			log,
			"log likelihood for learning rate {}, variance {}, fold {}, epoch {} is {}",
			learning_rate, variance, fold, progress.epoch, progress.log_likelihood,
		),
		Progress::GridCell {
			learning_rate,
			variance,
			accuracy,
		} => writeln!(
			log,
			"learning rate {}, variance {}, average accuracy {}",
			learning_rate, variance, accuracy,
		),
		Progress::Testing => writeln!(log, "evaluating on the test data"),
	}
	.ok();
}
