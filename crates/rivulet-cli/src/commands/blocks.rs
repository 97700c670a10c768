//! Block listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use rivulet_blocks::standard_catalog;
use rivulet_core::{BlockDescriptor, BlockGroup, ParamDefault, SignalType};

#[derive(Args)]
pub struct BlocksArgs {
    /// Show details for a specific block
    #[arg(value_name = "BLOCK")]
    block: Option<String>,

    /// Only list blocks of this group (generators, filters, ...)
    #[arg(short, long)]
    group: Option<String>,
}

fn port(signal: Option<SignalType>) -> &'static str {
    signal.map_or("-", SignalType::name)
}

fn default_text(default: ParamDefault) -> String {
    match default {
        ParamDefault::Number(v) => v.to_string(),
        ParamDefault::Bool(v) => v.to_string(),
        ParamDefault::Text(v) if v.is_empty() => "\"\"".to_string(),
        ParamDefault::Text(v) => v.to_string(),
    }
}

fn print_details(block: &BlockDescriptor) {
    println!("{} ({})", block.name, block.id);
    println!("{}", "=".repeat(block.name.len() + block.id.len() + 3));
    println!();
    println!("{}", block.description);
    println!();
    println!("  Group:  {}", block.group);
    println!(
        "  Ports:  {} -> {}",
        port(block.signals.input),
        port(block.signals.output)
    );
    println!();

    if block.param_fields.is_empty() {
        println!("No parameters.");
        return;
    }

    println!("Parameters:");
    println!();
    println!("  {:20}  {:12}  {:10}  {}", "Name", "Default", "Unit", "Range");
    println!("  {:20}  {:12}  {:10}  {}", "----", "-------", "----", "-----");
    for field in block.param_fields {
        let range = match (field.min, field.max) {
            (Some(min), Some(max)) => format!("{min} .. {max}"),
            _ => "-".to_string(),
        };
        println!(
            "  {:20}  {:12}  {:10}  {}",
            field.name,
            default_text(field.default),
            field.unit,
            range
        );
    }
}

pub fn run(args: BlocksArgs) -> anyhow::Result<()> {
    let catalog = standard_catalog();

    if let Some(id) = &args.block {
        let block = catalog
            .get(id)
            .or_else(|| catalog.iter().find(|b| b.name.eq_ignore_ascii_case(id)))
            .ok_or_else(|| anyhow::anyhow!("Unknown block: {id}"))?;
        print_details(block);
        return Ok(());
    }

    let groups: Vec<BlockGroup> = match &args.group {
        Some(g) => vec![
            BlockGroup::from_id(g).ok_or_else(|| anyhow::anyhow!("Unknown group: {g}"))?,
        ],
        None => BlockGroup::ALL.to_vec(),
    };

    println!("Available Blocks");
    println!("================");
    for group in groups {
        println!();
        println!("{group}:");
        for block in catalog.blocks_in_group(group) {
            println!("  {:20} - {}", block.id, block.description);
        }
    }
    println!();
    println!("Use 'rivulet blocks <id>' for detailed parameter info.");
    Ok(())
}
