//! `folio`: format pages, print render plans, and hash media.

mod args;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use folio_assets::{canonical_path, hash_bytes, kind_for_extension};
use folio_layout::{compute_plan, LayoutOptions};
use folio_markup::{parse, serialize_page, DocumentStore, FileStore};

use crate::args::*;

fn main() -> Result<ExitCode> {
    let args = CliArguments::parse();

    let _ = {
        use log::LevelFilter::*;

        env_logger::builder()
            .filter_level(Warn)
            .filter_module("folio", Info)
            .parse_default_env()
            .try_init()
    };

    match args.command {
        Commands::Fmt(args) => fmt_main(args),
        Commands::Plan(args) => plan_main(args),
        Commands::Hash(args) => hash_main(args),
    }
}

fn fmt_main(args: FmtArgs) -> Result<ExitCode> {
    let store = FileStore::new(&args.root, &args.page)?;
    let original = store
        .load()
        .with_context(|| format!("reading {}", store.path().display()))?;

    let doc = parse(&original);
    let root = args.script_root.unwrap_or_else(|| store.root_prefix());
    let formatted = serialize_page(&doc, &root);

    if formatted == original {
        log::info!("{} is canonical", store.path().display());
        return Ok(ExitCode::SUCCESS);
    }
    if args.check {
        println!("{}: not canonical", store.path().display());
        return Ok(ExitCode::FAILURE);
    }

    store
        .save(&formatted)
        .with_context(|| format!("writing {}", store.path().display()))?;
    log::info!("formatted {}", store.path().display());
    Ok(ExitCode::SUCCESS)
}

fn load_options(config: Option<&Path>) -> Result<LayoutOptions> {
    let Some(path) = config else {
        return Ok(LayoutOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing layout options in {}", path.display()))
}

fn plan_main(args: PlanArgs) -> Result<ExitCode> {
    let mut options = load_options(args.config.as_deref())?;
    if args.viewport.is_some() {
        options.viewport_width_px = args.viewport;
    }

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let doc = parse(&text);
    let plan = compute_plan(&doc, &options);
    log::info!(
        "{} galleries in {}",
        plan.galleries().count(),
        args.file.display()
    );

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(ExitCode::SUCCESS)
}

fn hash_main(args: HashArgs) -> Result<ExitCode> {
    let mut status = ExitCode::SUCCESS;
    for file in &args.files {
        let ext = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let Some(kind) = kind_for_extension(ext) else {
            log::warn!("skipping {}: not an image or video", file.display());
            status = ExitCode::FAILURE;
            continue;
        };
        let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
        let id = hash_bytes(&bytes);
        println!("{id}  {}  {}", canonical_path(&id, kind), file.display());
    }
    Ok(status)
}
