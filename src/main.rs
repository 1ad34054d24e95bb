// src/main.rs
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use docform_extractor::document::client;
use docform_extractor::extractors::{catalog, Catalog, EngineConfig, ExtractionResult, Extractor};
use docform_extractor::storage::StorageManager;
use docform_extractor::utils::error::{ConfigError, ConvertError, StorageError};
use docform_extractor::utils::{self, AppError};

/// Command Line Interface for the document form extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document to read: a .json block list, converter HTML, or any file the converter accepts
    #[arg(short, long)]
    input: PathBuf,

    /// External converter endpoint receiving raw document bytes
    #[arg(long, env = "DOCFORM_CONVERTER_URL")]
    converter_url: Option<String>,

    /// JSON catalog of field sets (defaults to the built-in catalog)
    #[arg(short, long)]
    field_sets: Option<PathBuf>,

    /// Field-set id to extract; repeat for several (default: all)
    #[arg(short, long)]
    target: Vec<String>,

    /// Output directory for extraction results
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save converted blocks and an annotated HTML view
    #[arg(short, long)]
    debug: bool,

    /// Blocks inspected after a heading anchor
    #[arg(long)]
    max_window: Option<usize>,

    /// Paragraphs collected into a strict section
    #[arg(long)]
    max_paragraphs: Option<usize>,

    /// Paragraphs kept in scan mode
    #[arg(long)]
    scan_top_k: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(if args.debug { "debug" } else { "info" });
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Engine configuration: defaults < environment < command line
    let mut config = EngineConfig::from_env()?;
    if let Some(window) = args.max_window {
        config.max_window = window;
    }
    if let Some(paragraphs) = args.max_paragraphs {
        config.max_paragraphs = paragraphs;
    }
    if let Some(top_k) = args.scan_top_k {
        config.scan_top_k = top_k;
    }
    config.validate()?;

    // 4. Field sets
    let catalog = match &args.field_sets {
        Some(path) => Catalog::load(path)?,
        None => catalog::builtin()?,
    };

    let targets: Vec<String> = if args.target.is_empty() {
        catalog.iter().map(|field_set| field_set.id.clone()).collect()
    } else {
        args.target.clone()
    };
    if let Some(unknown) = targets.iter().find(|target| catalog.get(target).is_none()) {
        return Err(ConfigError::UnknownTarget(unknown.clone()).into());
    }

    // 5. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;
    let document_name = args
        .input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string();

    // 6. Convert the document
    let document = match client::load_document(&args.input, args.converter_url.as_deref()).await {
        Ok(document) => document,
        // An unreadable input file is our problem, not the document's
        Err(ConvertError::Io(e)) => return Err(AppError::Io(e)),
        Err(e) => {
            tracing::error!("Conversion of {} failed: {}", args.input.display(), e);
            let results: Vec<(String, ExtractionResult)> = targets
                .iter()
                .map(|target| (target.clone(), ExtractionResult::conversion_failed(target, &e)))
                .collect();
            return finish(&storage, &document_name, results);
        }
    };
    tracing::info!("Converted {} into {} blocks", args.input.display(), document.len());

    if args.debug {
        storage.save_blocks(&document_name, &document)?;
    }

    // 7. Run the extractions; each target is independent
    let document = Arc::new(document);
    let extractor = Arc::new(Extractor::new(catalog, config));

    let handles: Vec<_> = targets
        .iter()
        .map(|target| {
            let document = Arc::clone(&document);
            let extractor = Arc::clone(&extractor);
            let target = target.clone();
            tokio::task::spawn_blocking(move || extractor.extract(&document, &target))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (target, handle) in targets.iter().zip(handles) {
        let result = handle.await.map_err(|e| AppError::Task(e.to_string()))??;
        results.push((target.clone(), result));
    }

    if args.debug {
        let debug_path = storage.document_dir(&document_name)?.join("annotated.html");
        if let Err(e) = utils::html_debug::save_annotated_blocks(&document, &results, &debug_path) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        }
    }

    finish(&storage, &document_name, results)
}

/// Persists every result and prints them as one JSON object keyed by target.
fn finish(
    storage: &StorageManager,
    document_name: &str,
    results: Vec<(String, ExtractionResult)>,
) -> Result<(), AppError> {
    let mut found_count = 0;

    for (_, result) in &results {
        storage.save_result(document_name, result)?;
        storage.save_result_metadata(document_name, result)?;
        if result.found {
            found_count += 1;
        } else {
            tracing::warn!("'{}' not found: {:?}", result.target, result.errors);
        }
    }

    tracing::info!("Extraction finished. Found: {}, Not found: {}", found_count, results.len() - found_count);

    let keyed: BTreeMap<String, ExtractionResult> = results.into_iter().collect();
    let json = serde_json::to_string_pretty(&keyed)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    println!("{}", json);

    Ok(())
}
