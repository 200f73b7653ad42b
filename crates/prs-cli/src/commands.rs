//! Command implementations wiring CLI arguments to the pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use prs_ingest::{read_raw_table, resolve_headers};
use prs_map::{MappingEngine, SynonymBook, TemplateStore, read_synonym_file};
use prs_model::schema::default_contract;
use prs_model::{OutcomeRecord, ReshapeConfig, SchemaContract, Template};

use prs_cli::pipeline::{FilePipeline, process_batch, process_combined, process_file};
use prs_cli::router::OutcomeSinks;
use prs_cli::types::BatchResult;

use crate::cli::{
    BatchArgs, CombineArgs, CommonArgs, ContractArgs, MapArgs, ProcessArgs, ReshapeArgs,
    StoreArgs,
};
use crate::summary::{print_contract, print_mapping, print_templates};

fn load_contract(path: Option<&PathBuf>) -> Result<SchemaContract> {
    match path {
        Some(path) => SchemaContract::load(path)
            .with_context(|| format!("load contract from {}", path.display())),
        None => Ok(default_contract()),
    }
}

fn learned_synonyms_path(templates_dir: &Path) -> PathBuf {
    templates_dir.join("synonyms.learned.json")
}

fn build_synonyms(contract: &SchemaContract, common: &CommonArgs) -> Result<SynonymBook> {
    let mut book = SynonymBook::from_contract(contract);
    if let Some(path) = &common.synonyms {
        let shared = read_synonym_file(path)?;
        book = book.with_shared_layer(&shared);
    }
    let learned = read_synonym_file(&learned_synonyms_path(&common.templates_dir))?;
    Ok(book.with_learned_layer(&learned))
}

fn load_template(common: &CommonArgs) -> Result<Option<Template>> {
    let Some(provider) = &common.template else {
        return Ok(None);
    };
    let store = TemplateStore::new(&common.templates_dir)?;
    match store.load(provider)? {
        Some(template) => Ok(Some(template)),
        None => bail!("template not found for provider: {provider}"),
    }
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// Template settings first, CLI flags layered on top.
fn resolve_reshape(template: Option<&Template>, args: &ReshapeArgs) -> ReshapeConfig {
    let mut reshape = template
        .map(|template| template.reshape.clone())
        .unwrap_or_default();
    if args.unpivot {
        reshape.unpivot = true;
    }
    if let Some(group_by) = &args.group_by {
        reshape.group_by = split_fields(group_by);
    }
    if let Some(dedupe_on) = &args.dedupe_on {
        reshape.dedupe_on = split_fields(dedupe_on);
    }
    if args.drop_empty_rows {
        reshape.drop_empty_rows = true;
    }
    if args.strip_thousands {
        reshape.strip_thousands = true;
    }
    if args.sparse_threshold.is_some() {
        reshape.drop_sparse_threshold = args.sparse_threshold;
    }
    reshape
}

pub fn run_process(args: &ProcessArgs) -> Result<OutcomeRecord> {
    let contract = load_contract(args.common.contract.as_ref())?;
    let synonyms = build_synonyms(&contract, &args.common)?;
    let template = load_template(&args.common)?;
    let reshape = resolve_reshape(template.as_ref(), &args.reshape);

    let pipeline = FilePipeline {
        contract: &contract,
        synonyms: &synonyms,
        template: template.as_ref(),
        reshape,
        provider: args.common.provider.clone(),
        header_row: args.common.header_row,
        sinks: OutcomeSinks {
            output_dir: &args.output_dir,
            quarantine_dir: &args.quarantine_dir,
        },
    };
    Ok(process_file(&args.file, &pipeline))
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchResult> {
    let contract = load_contract(args.common.contract.as_ref())?;
    let synonyms = build_synonyms(&contract, &args.common)?;
    let template = load_template(&args.common)?;
    let reshape = resolve_reshape(template.as_ref(), &args.reshape);

    let pipeline = FilePipeline {
        contract: &contract,
        synonyms: &synonyms,
        template: template.as_ref(),
        reshape,
        provider: args.common.provider.clone(),
        header_row: args.common.header_row,
        sinks: OutcomeSinks {
            output_dir: &args.output_dir,
            quarantine_dir: &args.quarantine_dir,
        },
    };
    process_batch(&args.directory, &pipeline)
}

pub fn run_combine(args: &CombineArgs) -> Result<OutcomeRecord> {
    let contract = load_contract(args.common.contract.as_ref())?;
    let synonyms = build_synonyms(&contract, &args.common)?;
    let template = load_template(&args.common)?;
    let reshape = resolve_reshape(template.as_ref(), &args.reshape);

    let pipeline = FilePipeline {
        contract: &contract,
        synonyms: &synonyms,
        template: template.as_ref(),
        reshape,
        provider: args.common.provider.clone(),
        header_row: args.common.header_row,
        sinks: OutcomeSinks {
            output_dir: &args.output_dir,
            quarantine_dir: &args.quarantine_dir,
        },
    };
    Ok(process_combined(&args.files, &args.output_name, &pipeline))
}

pub fn run_map(args: &MapArgs) -> Result<()> {
    let contract = load_contract(args.common.contract.as_ref())?;
    let synonyms = build_synonyms(&contract, &args.common)?;
    let template = load_template(&args.common)?;

    let raw = read_raw_table(&args.file)?;
    let spec = resolve_headers(
        &raw,
        &prs_ingest::HeaderOptions {
            header_row: args
                .common
                .header_row
                .or_else(|| template.as_ref().and_then(|t| t.header_row)),
            scan_window: None,
        },
    )
    .with_context(|| format!("resolve headers for {}", args.file.display()))?;

    let engine = MappingEngine::new(&contract, synonyms);
    let mapping = engine.suggest(&spec.labels, template.as_ref());
    print_mapping(&mapping);

    if let Some(provider) = &args.save_template {
        let reshape = resolve_reshape(template.as_ref(), &args.reshape);
        let confirmed = Template::new(provider.clone(), mapping, reshape)
            .with_header_row(args.common.header_row);
        let store = TemplateStore::new(&args.common.templates_dir)?;
        let (path, learned) = store.save_and_learn(
            &confirmed,
            &learned_synonyms_path(&args.common.templates_dir),
        )?;
        println!("Template saved to {}", path.display());
        if learned > 0 {
            println!("Learned {learned} new synonym(s).");
        }
    }
    Ok(())
}

pub fn run_templates(args: &StoreArgs) -> Result<()> {
    let store = TemplateStore::new(&args.templates_dir)?;
    let templates = store.list()?;
    print_templates(&templates);
    Ok(())
}

pub fn run_schema(args: &ContractArgs) -> Result<()> {
    let contract = load_contract(args.contract.as_ref())?;
    print_contract(&contract);
    Ok(())
}
