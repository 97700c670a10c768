//! Graph compile command.

use std::collections::BTreeMap;

use clap::Args;
use rivulet_blocks::standard_catalog;
use serde_json::json;

use super::common::{check_document, compile_document, load_graph};

#[derive(Args)]
pub struct CompileArgs {
    /// Graph file (JSON) or saved graph name
    #[arg(value_name = "GRAPH")]
    graph: String,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let catalog = standard_catalog();
    let (path, document) = load_graph(&args.graph)?;
    check_document(&document, &catalog)?;
    let compiled = compile_document(&document, &catalog)?;
    let graph = &compiled.graph;
    let stats = compiled.stats;

    if args.json {
        let dependencies: BTreeMap<_, _> = graph.dependencies.iter().collect();
        let plan = json!({
            "executionOrder": graph.order_ids(),
            "sourceNodes": graph.source_nodes,
            "sinkNodes": graph.sink_nodes,
            "dependencies": dependencies,
            "stats": {
                "nodeCount": stats.node_count,
                "edgeCount": stats.edge_count,
                "sourceCount": stats.source_count,
                "sinkCount": stats.sink_count,
            },
        });
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Compiled {}", path.display());
    println!();
    println!("Execution order:");
    for (i, node) in graph.execution_order.iter().enumerate() {
        let deps = &graph.dependencies[&node.id];
        if deps.is_empty() {
            println!("  {:3}. {} [{}]", i + 1, node.id, node.block_type);
        } else {
            println!(
                "  {:3}. {} [{}] <- {}",
                i + 1,
                node.id,
                node.block_type,
                deps.join(", ")
            );
        }
    }
    println!();
    println!("Sources: {}", graph.source_nodes.join(", "));
    println!("Sinks:   {}", graph.sink_nodes.join(", "));
    println!(
        "Stats:   {} nodes, {} edges, {} sources, {} sinks",
        stats.node_count, stats.edge_count, stats.source_count, stats.sink_count
    );
    Ok(())
}
