//! Helpers shared by the graph commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rivulet_config::{GraphDocument, ValidationError, find_graph, validate_document};
use rivulet_core::{Catalog, Compilation, compile};

/// Resolves `name` as a file path or a saved graph name and loads it.
pub fn load_graph(name: &str) -> anyhow::Result<(PathBuf, GraphDocument)> {
    let path = find_graph(name).ok_or_else(|| anyhow::anyhow!("graph not found: {name}"))?;
    let document = GraphDocument::load(&path)
        .with_context(|| format!("loading graph {}", path.display()))?;
    Ok((path, document))
}

/// Checks nodes against the catalog.
///
/// Unknown block types only warn, since the engine degrades them to
/// passthrough. Invalid parameters are fatal.
pub fn check_document(document: &GraphDocument, catalog: &Catalog) -> anyhow::Result<()> {
    let Err(err) = validate_document(document, catalog) else {
        return Ok(());
    };
    let errors = match err {
        ValidationError::Multiple(errors) => errors,
        single => vec![single],
    };

    let mut fatal = 0;
    for error in &errors {
        if matches!(error, ValidationError::UnknownBlock { .. }) {
            tracing::warn!("{error}");
        } else {
            eprintln!("error: {error}");
            fatal += 1;
        }
    }
    if fatal > 0 {
        anyhow::bail!("{fatal} node(s) have invalid parameters");
    }
    Ok(())
}

/// Compiles the document, printing every compile error on failure.
pub fn compile_document(
    document: &GraphDocument,
    catalog: &Catalog,
) -> anyhow::Result<Compilation> {
    compile(catalog, &document.nodes, &document.edges).map_err(|errors| {
        for error in &errors {
            eprintln!("error[{}]: {error}", error.code());
        }
        anyhow::anyhow!("graph failed to compile with {} error(s)", errors.len())
    })
}

/// Resolves a path stored in a graph relative to the graph file.
pub fn resolve_relative(graph_path: &Path, stored: &str) -> PathBuf {
    let stored = Path::new(stored);
    if stored.is_absolute() {
        return stored.to_path_buf();
    }
    graph_path
        .parent()
        .map(|dir| dir.join(stored))
        .unwrap_or_else(|| stored.to_path_buf())
}
