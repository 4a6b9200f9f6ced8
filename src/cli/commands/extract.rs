use crate::bio::extract::{extract_sequences, InputFormat};
use crate::bio::fasta::{write_fasta, write_fasta_to_writer};
use crate::cli::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input kind: a single protein sequence, or a FASTA, GenBank or CSV file
    #[arg(short = 'f', long, alias = "option", value_enum)]
    pub format: InputFormat,

    /// Protein sequence (single) or input file path
    #[arg(short, long)]
    pub input: String,

    /// Write FASTA here instead of stdout (.gz compresses)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    use crate::cli::output::*;

    let sequences = extract_sequences(&args.input, args.format)?;
    tracing::info!("Extracted {} sequences from {} input", sequences.len(), args.format);

    match &args.output {
        Some(path) => {
            write_fasta(path, &sequences)?;
            if !ctx.quiet {
                success(&format!(
                    "Wrote {} sequences to {}",
                    format_number(sequences.len()),
                    path.display()
                ));
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_fasta_to_writer(&mut handle, &sequences)?;
        }
    }

    Ok(())
}
