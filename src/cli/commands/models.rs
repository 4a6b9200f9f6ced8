use crate::cli::Context;
use crate::core::paths::{resolve_models_dir, MODELS_DIR_ENV};
use crate::model::ModelLoader;
use clap::Args;
use comfy_table::Cell;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Directory holding the pretrained models (default: ./models)
    #[arg(short, long, env = MODELS_DIR_ENV, value_name = "DIR")]
    pub models: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ModelsArgs, ctx: &Context) -> anyhow::Result<()> {
    use crate::cli::output::*;

    let dir = resolve_models_dir(args.models.as_ref(), ctx.config.models.dir.as_deref());
    let loader = ModelLoader::from_dir(&dir, ctx.config.models.artifact_names());

    let artifacts = loader.artifact_checksums()?;
    let bundle = loader.load()?;
    let summary = bundle.summary();

    if args.json {
        let doc = json!({
            "directory": dir.display().to_string(),
            "artifacts": artifacts,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    section_header(&format!("Models in {}", dir.display()));

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Role"),
        header_cell("File"),
        header_cell("Size"),
        header_cell("SHA-256"),
    ]);
    for artifact in &artifacts {
        table.add_row(vec![
            Cell::new(artifact.role),
            Cell::new(&artifact.location),
            Cell::new(format_size(artifact.size)),
            Cell::new(&artifact.sha256[..16]),
        ]);
    }
    println!("{}", table);
    println!();

    tree_section(
        "Pipeline",
        vec![
            (
                "Embedding",
                format!(
                    "{} residues, {} dimensions",
                    summary.vocabulary_size, summary.embedding_dimension
                ),
            ),
            ("Reducer", summary.reducer.clone()),
            ("Classifier", summary.classifier.clone()),
        ],
        false,
    );
    tree_section(
        "Classes",
        summary
            .classes
            .iter()
            .enumerate()
            .map(|(i, class)| (class.as_str(), format!("index {}", i)))
            .collect(),
        true,
    );

    Ok(())
}
