use crate::bio::extract::{extract_sequences, InputFormat};
use crate::cli::Context;
use crate::core::batch::BatchRunner;
use crate::core::paths::{resolve_models_dir, MODELS_DIR_ENV};
use crate::core::predictor::{Predictor, Threshold};
use crate::model::ModelLoader;
use crate::report::{format_confidence, OutputType, ReportGenerator, ReportOptions, Tally};
use crate::BgcError;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Input kind: a single protein sequence, or a FASTA, GenBank or CSV file
    #[arg(short = 'f', long, alias = "option", value_enum)]
    pub format: InputFormat,

    /// Protein sequence (single) or input file path
    #[arg(short, long)]
    pub input: String,

    /// Minimum confidence for a class to be reported (default 0.5)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Output rendering (console by default)
    #[arg(long, alias = "output_type", value_enum)]
    pub output_type: Option<OutputType>,

    /// Output file path, required for csv, txt and json
    #[arg(short, long, alias = "output_file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Directory holding the pretrained models (default: ./models)
    #[arg(short, long, env = MODELS_DIR_ENV, value_name = "DIR")]
    pub models: Option<PathBuf>,
}

/// Everything `predict` needs, checked before any model is touched
#[derive(Debug)]
pub struct PredictPlan {
    pub output_type: OutputType,
    pub output_file: Option<PathBuf>,
    pub threshold: Threshold,
}

impl PredictArgs {
    pub fn plan(&self, ctx: &Context) -> Result<PredictPlan, BgcError> {
        let output_type = self.output_type.unwrap_or(ctx.config.output.format);
        if output_type.needs_file() && self.output_file.is_none() {
            return Err(BgcError::Usage(format!(
                "--output-file is required for {} output (csv, txt and json write to a file)",
                output_type
            )));
        }

        let threshold = Threshold::new(self.threshold.unwrap_or(ctx.config.prediction.threshold))?;

        Ok(PredictPlan {
            output_type,
            output_file: self.output_file.clone(),
            threshold,
        })
    }
}

pub fn run(args: PredictArgs, ctx: &Context) -> anyhow::Result<()> {
    use crate::cli::output::*;
    use crate::utils::progress::{create_progress_bar, create_spinner};

    let plan = args.plan(ctx)?;
    let to_file = plan.output_type.needs_file();
    let show_progress = to_file && !ctx.quiet;

    let sequences = extract_sequences(&args.input, args.format)?;
    tracing::info!("Extracted {} sequences from {} input", sequences.len(), args.format);

    let models_dir = resolve_models_dir(args.models.as_ref(), ctx.config.models.dir.as_deref());
    let loader = ModelLoader::from_dir(&models_dir, ctx.config.models.artifact_names());

    // Load on this thread before any worker starts
    let spinner = show_progress.then(|| create_spinner(&format!("Loading models from {}...", models_dir.display())));
    let bundle = loader.load()?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let predictor = Predictor::new(bundle).with_threshold(plan.threshold);
    let mut runner = BatchRunner::new(ctx.threads);
    if show_progress && sequences.len() > 1 {
        runner = runner.with_progress(create_progress_bar(sequences.len() as u64, "Predicting"));
    }
    let results = runner.run(&predictor, &sequences)?;

    let generator = ReportGenerator::new(ReportOptions {
        output_type: plan.output_type,
        unassigned_label: ctx.config.prediction.unassigned_label.clone(),
    });
    let tally = Tally::from_results(&results);

    match &plan.output_file {
        Some(path) if to_file => {
            generator.write(path, &results)?;
            success(&format!("Results saved to {}", path.display()));
            if !ctx.quiet {
                tree_section(
                    "Summary",
                    vec![
                        ("Sequences", format_number(results.len())),
                        ("Assigned", format_number(tally.assigned)),
                        ("Unassigned", format_number(tally.unassigned)),
                        ("Failed", format_number(tally.failed)),
                        ("Threshold", format_confidence(plan.threshold.value())),
                    ],
                    true,
                );
            }
        }
        _ => {
            let rendered = generator.generate(&results)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(rendered.as_bytes())?;
            handle.flush()?;
        }
    }

    if tally.failed > 0 {
        warning(&format!(
            "{} of {} sequences could not be classified",
            tally.failed,
            results.len()
        ));
    }

    Ok(())
}
