//! Property-based tests for the graph compiler.
//!
//! Random DAGs are generated as forward edges over a hidden ranking, then the
//! node list is shuffled so the compiler never sees them pre-sorted.

use proptest::prelude::*;
use rivulet_core::{
    BlockDescriptor, BlockGroup, Catalog, EdgeDescriptor, NodeDescriptor, ProcessContext,
    ProcessError, Signal, SignalType, Signals, compile,
};

fn pass(ctx: &mut ProcessContext<'_>) -> Result<Signal, ProcessError> {
    Ok(Signal::Real(ctx.first_real_or_silence()?))
}

fn catalog() -> Catalog {
    let mut c = Catalog::new();
    for (id, signals) in [
        ("fx", Signals::transform(SignalType::Real, SignalType::Real)),
        ("iq", Signals::transform(SignalType::Real, SignalType::Complex)),
    ] {
        c.register(BlockDescriptor {
            id,
            name: id,
            icon: id,
            group: BlockGroup::Transforms,
            description: "",
            signals,
            param_fields: &[],
            validate: None,
            process: pass,
        })
        .unwrap();
    }
    c.freeze();
    c
}

/// `(node ids in shuffled input order, edges between ranks i < j)`.
fn dag() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
    (1usize..30).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let mask = prop::collection::vec(prop::bool::weighted(0.15), pairs.len());
        let order = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (order, mask).prop_map(move |(order, mask)| {
            let edges = pairs
                .iter()
                .zip(mask)
                .filter(|(_, keep)| *keep)
                .map(|(&p, _)| p)
                .collect();
            (order, edges)
        })
    })
}

fn records(order: &[usize], edges: &[(usize, usize)]) -> (Vec<NodeDescriptor>, Vec<EdgeDescriptor>) {
    let nodes = order
        .iter()
        .map(|i| NodeDescriptor::new(format!("n{i}"), "fx"))
        .collect();
    let edges = edges
        .iter()
        .enumerate()
        .map(|(k, (a, b))| EdgeDescriptor::new(format!("e{k}"), format!("n{a}"), format!("n{b}")))
        .collect();
    (nodes, edges)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every acyclic, well-typed graph compiles to a topological order.
    #[test]
    fn acyclic_graphs_compile_in_topological_order((order, edges) in dag()) {
        let catalog = catalog();
        let (nodes, edges) = records(&order, &edges);
        let compiled = compile(&catalog, &nodes, &edges).unwrap();
        let ids = compiled.graph.order_ids();
        prop_assert_eq!(ids.len(), nodes.len());

        let pos = |id: &str| ids.iter().position(|&x| x == id).unwrap();
        for edge in &edges {
            prop_assert!(pos(&edge.source) < pos(&edge.target));
        }

        for id in &compiled.graph.source_nodes {
            prop_assert!(compiled.graph.dependencies[id].is_empty());
        }
        for id in &compiled.graph.sink_nodes {
            prop_assert!(compiled.graph.outputs[id].is_empty());
        }
        prop_assert_eq!(compiled.stats.edge_count, edges.len());
    }

    /// Adding a self-loop anywhere makes compilation fail with a cycle.
    #[test]
    fn self_loop_always_detected((order, edges) in dag(), pick in any::<prop::sample::Index>()) {
        let catalog = catalog();
        let (nodes, mut edges) = records(&order, &edges);
        let id = nodes[pick.index(nodes.len())].id.clone();
        edges.push(EdgeDescriptor::new("loop", id.clone(), id));
        let err = compile(&catalog, &nodes, &edges).unwrap_err();
        prop_assert!(err.has_code("CYCLE_DETECTED"));
    }

    /// Closing a chain back onto its head is always a cycle.
    #[test]
    fn back_edge_over_chain_detected(len in 2usize..20, (order, extra) in dag()) {
        let catalog = catalog();
        let (mut nodes, mut edges) = records(&order, &extra);
        for i in 0..len {
            nodes.push(NodeDescriptor::new(format!("c{i}"), "fx"));
        }
        for i in 1..len {
            edges.push(EdgeDescriptor::new(format!("c{i}"), format!("c{}", i - 1), format!("c{i}")));
        }
        edges.push(EdgeDescriptor::new("back", format!("c{}", len - 1), "c0"));
        let err = compile(&catalog, &nodes, &edges).unwrap_err();
        prop_assert_eq!(err.len(), 1);
        prop_assert_eq!(err.errors()[0].code(), "CYCLE_DETECTED");
    }

    /// A complex-to-real edge is rejected regardless of the rest of the graph.
    #[test]
    fn type_mismatch_independent_of_shape((order, edges) in dag(), pick in any::<prop::sample::Index>()) {
        let catalog = catalog();
        let (mut nodes, mut edges) = records(&order, &edges);
        let target = nodes[pick.index(nodes.len())].id.clone();
        nodes.push(NodeDescriptor::new("analytic", "iq"));
        edges.push(EdgeDescriptor::new("bad", "analytic", target));
        let err = compile(&catalog, &nodes, &edges).unwrap_err();
        prop_assert!(err.has_code("TYPE_MISMATCH"));
    }
}
