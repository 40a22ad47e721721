use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Value};
use tracing::debug;

use bdb_blocks::SignedBeaconBlock;
use bdb_config::ChainConfig;
use bdb_db::{block_schemas, validate_bucket_table, Bucket, SchemaRegistry};
use bdb_types::bytes::{from_hex, to_hex};
use bdb_types::{compute_start_slot_at_epoch, FAR_FUTURE_EPOCH};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Config(ConfigCommand::Check(args)) => cmd_config_check(args, format),
        Command::Buckets => cmd_buckets(format),
        Command::Block(BlockCommand::Inspect(args)) => cmd_block_inspect(args, format),
    }
}

fn load_config(path: Option<&Path>, minimal: bool) -> anyhow::Result<ChainConfig> {
    match path {
        Some(path) => ChainConfig::load(path)
            .with_context(|| format!("failed to load chain config {}", path.display())),
        None if minimal => Ok(ChainConfig::minimal()),
        None => Ok(ChainConfig::mainnet()),
    }
}

fn block_registry(config: ChainConfig) -> anyhow::Result<SchemaRegistry<SignedBeaconBlock>> {
    Ok(SchemaRegistry::new(Arc::new(config), block_schemas())?)
}

// ---- config check ----

fn schedule_report(config: &ChainConfig) -> Value {
    let forks: Vec<Value> = config
        .forks()
        .entries()
        .iter()
        .map(|e| {
            let scheduled = e.epoch != FAR_FUTURE_EPOCH;
            json!({
                "fork": e.version.as_str(),
                "epoch": scheduled.then_some(e.epoch),
                "start_slot": scheduled
                    .then(|| compute_start_slot_at_epoch(e.epoch, config.slots_per_epoch())),
            })
        })
        .collect();
    json!({
        "slots_per_epoch": config.slots_per_epoch(),
        "forks": forks,
    })
}

fn cmd_config_check(args: ConfigCheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.path.as_deref(), args.minimal)?;
    let registry = block_registry(config)?;
    let config = registry.config();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&schedule_report(config))?);
        return Ok(());
    }

    println!("{} Chain config valid", "✓".green().bold());
    println!("  Slots per epoch: {}", config.slots_per_epoch().to_string().bold());
    for entry in config.forks().entries() {
        if entry.epoch == FAR_FUTURE_EPOCH {
            println!("  {:<10} {}", entry.version.as_str().yellow(), "unscheduled".dimmed());
        } else {
            let slot = compute_start_slot_at_epoch(entry.epoch, config.slots_per_epoch());
            println!(
                "  {:<10} epoch {} (slot {})",
                entry.version.as_str().yellow(),
                entry.epoch.to_string().bold(),
                slot
            );
        }
    }
    Ok(())
}

// ---- buckets ----

fn cmd_buckets(format: OutputFormat) -> anyhow::Result<()> {
    validate_bucket_table(&Bucket::ALL)?;

    if format == OutputFormat::Json {
        let buckets: Vec<Value> = Bucket::ALL
            .iter()
            .map(|b| json!({ "name": b.as_str(), "prefix": to_hex(&b.prefix()) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    for bucket in Bucket::ALL {
        println!("  {}  {}", to_hex(&bucket.prefix()).cyan(), bucket.as_str());
    }
    println!("{} {} buckets, prefixes unique", "✓".green().bold(), Bucket::ALL.len());
    Ok(())
}

// ---- block inspect ----

fn block_report(
    registry: &SchemaRegistry<SignedBeaconBlock>,
    bytes: &[u8],
) -> anyhow::Result<Value> {
    let schema = registry.resolve_for_decode(bytes)?;
    let block = registry
        .decode(bytes)
        .with_context(|| format!("bytes do not decode as a {} block", schema.fork))?;
    let body = &block.message.body;
    Ok(json!({
        "fork": schema.fork.as_str(),
        "slot": block.slot(),
        "epoch": registry.config().epoch_at_slot(block.slot()),
        "block_root": block.block_root().to_hex(),
        "parent_root": block.message.parent_root.to_hex(),
        "state_root": block.message.state_root.to_hex(),
        "proposer_index": block.message.proposer_index,
        "voluntary_exits": body.voluntary_exits().len(),
        "sync_participants": body
            .sync_aggregate()
            .map(|s| s.sync_committee_bits.num_participants()),
        "transactions": body.execution_payload().map(|p| p.transactions.len()),
        "size": bytes.len(),
    }))
}

fn cmd_block_inspect(args: BlockInspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let registry = block_registry(load_config(args.config.as_deref(), false)?)?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let bytes = from_hex(text.trim())?;
    debug!(file = %args.file.display(), len = bytes.len(), "inspecting block");

    let report = block_report(&registry, &bytes)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Block {}", report["block_root"].as_str().unwrap_or_default().yellow().bold());
    for key in ["fork", "slot", "epoch", "proposer_index", "parent_root", "state_root"] {
        println!("  {:<16} {}", key, plain(&report[key]));
    }
    println!("  {:<16} {}", "voluntary_exits", plain(&report["voluntary_exits"]));
    for key in ["sync_participants", "transactions"] {
        if !report[key].is_null() {
            println!("  {:<16} {}", key, plain(&report[key]));
        }
    }
    println!("  {:<16} {} bytes", "size", plain(&report["size"]));
    Ok(())
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
