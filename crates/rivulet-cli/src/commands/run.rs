//! Graph execution command.

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::Args;
use rivulet_blocks::standard_catalog;
use rivulet_config::{EngineSettings, GraphDocument, default_settings_path};
use rivulet_core::{CycleDriver, Engine, SampleSource, Signal, StopReason};
use rivulet_io::{WavSource, WavSpec, write_wav};

use super::common::{check_document, compile_document, load_graph, resolve_relative};

#[derive(Args)]
pub struct RunArgs {
    /// Graph file (JSON) or saved graph name
    #[arg(value_name = "GRAPH")]
    graph: String,

    /// Settings file (TOML); defaults to the user settings file if present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of cycles to run (0 runs until Ctrl+C)
    #[arg(short, long)]
    cycles: Option<u64>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Samples per cycle
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Write each real-valued sink's samples to DIR/<node>.wav
    #[arg(short, long, value_name = "DIR")]
    export_dir: Option<PathBuf>,
}

fn load_settings(args: &RunArgs) -> anyhow::Result<EngineSettings> {
    let mut settings = match &args.settings {
        Some(path) => EngineSettings::load(path)?,
        None => {
            let path = default_settings_path();
            if path.is_file() {
                EngineSettings::load(&path)?
            } else {
                EngineSettings::default()
            }
        }
    };
    if let Some(cycles) = args.cycles {
        settings.cycles = cycles;
    }
    if let Some(rate) = args.sample_rate {
        settings.sample_rate = rate;
    }
    if let Some(size) = args.buffer_size {
        settings.buffer_size = size;
    }
    settings.validate()?;
    Ok(settings)
}

/// Attaches a decoded WAV file to every `file-player` node with a `path`.
fn attach_sources(
    engine: &mut Engine,
    document: &GraphDocument,
    graph_path: &Path,
    sample_rate: u32,
) -> anyhow::Result<()> {
    for node in document.nodes_of_type("file-player") {
        let Some(stored) = node.params.text("path").filter(|p| !p.is_empty()) else {
            continue;
        };
        let path = resolve_relative(graph_path, stored);
        let source = WavSource::open(&path)
            .with_context(|| format!("opening audio for node '{}'", node.id))?;
        if source.sample_rate() as u32 != sample_rate {
            tracing::warn!(
                "{} is {} Hz but the engine runs at {} Hz; playing without resampling",
                path.display(),
                source.sample_rate(),
                sample_rate
            );
        }
        println!(
            "  {} <- {} ({:.2}s)",
            node.id,
            path.display(),
            source.duration_secs()
        );
        engine.attach_source(&node.id, Box::new(source))?;
    }
    Ok(())
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let catalog = standard_catalog();
    let (graph_path, document) = load_graph(&args.graph)?;
    check_document(&document, &catalog)?;
    let compiled = compile_document(&document, &catalog)?;

    println!("Running {}", graph_path.display());
    println!("  Sample rate: {} Hz", settings.sample_rate);
    println!("  Buffer size: {} samples", settings.buffer_size);
    match settings.cycle_limit() {
        Some(n) => println!("  Cycles:      {n}"),
        None => println!("  Cycles:      until Ctrl+C"),
    }

    let mut engine = Engine::new(catalog);
    engine.initialize(compiled.graph, settings.engine_config())?;
    attach_sources(&mut engine, &document, &graph_path, settings.sample_rate)?;

    let driver = CycleDriver::new();
    let cancel = driver.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        cancel.store(true, Ordering::SeqCst);
    })?;

    let exporting = args.export_dir.is_some();
    let mut recorded: BTreeMap<String, Vec<f32>> = BTreeMap::new();
    engine.start();
    let report = driver.run(&mut engine, settings.cycle_limit(), |_, sinks| {
        if exporting {
            for (id, sink) in sinks {
                if let Signal::Real(samples) = &sink.data {
                    recorded.entry(id.clone()).or_default().extend_from_slice(samples);
                }
            }
        }
        ControlFlow::Continue(())
    })?;
    engine.stop();

    let stats = engine.stats();
    println!();
    println!(
        "Done: {} cycles ({}), {} samples per node",
        report.cycles,
        match report.reason {
            StopReason::Completed => "completed",
            StopReason::Cancelled => "cancelled",
            StopReason::EngineStopped => "engine stopped",
            StopReason::Callback => "stopped",
        },
        stats.total_samples
    );
    println!("  Last cycle: {:?}", stats.execution_time);

    if let Some(dir) = &args.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;
        let spec = WavSpec {
            sample_rate: settings.sample_rate,
            ..Default::default()
        };
        for (id, samples) in &recorded {
            let path = dir.join(format!("{id}.wav"));
            write_wav(&path, samples, spec)?;
            println!("  Exported {} ({} samples)", path.display(), samples.len());
        }
    }

    Ok(())
}
