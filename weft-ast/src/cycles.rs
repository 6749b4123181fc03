//! Reference-cycle detection over a token tree.
//!
//! The reference graph has one node per token and one edge per local alias
//! whose target exists in the tree. Tarjan's strongly-connected-components
//! algorithm finds every cycle in a single pass and, as a side effect of its
//! emission order, yields a topological order when the graph is acyclic.

use std::ops::ControlFlow;

use indexmap::IndexMap;
use serde::Serialize;
use tokenweft_core::TokenPath;

use crate::node::GroupNode;
use crate::reference::TokenReference;
use crate::traverse::visit_tokens;

/// The outcome of a cycle check.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Whether any self-loop or multi-token cycle exists.
    pub has_cycles: bool,
    /// The member paths of every strongly connected component that forms a
    /// cycle.
    pub cycles: Vec<Vec<TokenPath>>,
    /// An order in which every token appears after everything it references.
    /// `None` when cycles exist: no safe order exists.
    pub topological_order: Option<Vec<TokenPath>>,
}

/// Run cycle detection over every token in the tree.
pub fn detect_cycles(root: &GroupNode) -> CycleReport {
    let graph = ReferenceGraph::build(root);
    let sccs = graph.strongly_connected_components();

    let mut cycles = Vec::new();
    for scc in &sccs {
        let is_cycle = scc.len() > 1 || graph.has_self_loop(scc[0]);
        if is_cycle {
            cycles.push(scc.iter().map(|&node| graph.path(node).clone()).collect());
        }
    }

    let topological_order = if cycles.is_empty() {
        // Tarjan emits a component only once everything it reaches has been
        // emitted, so with singleton components the emission order already
        // places every token after its dependencies.
        Some(
            sccs.iter()
                .flatten()
                .map(|&node| graph.path(node).clone())
                .collect(),
        )
    } else {
        None
    };

    CycleReport {
        has_cycles: !cycles.is_empty(),
        cycles,
        topological_order,
    }
}

/// The alias graph in index form: node ids are positions in `paths`.
struct ReferenceGraph {
    paths: Vec<TokenPath>,
    edges: Vec<Vec<usize>>,
}

impl ReferenceGraph {
    fn build(root: &GroupNode) -> Self {
        let mut ids: IndexMap<&TokenPath, usize> = IndexMap::new();
        let _: ControlFlow<()> = visit_tokens(root, &mut |token| {
            let next = ids.len();
            ids.insert(&token.path, next);
            ControlFlow::Continue(())
        });

        let mut edges = vec![Vec::new(); ids.len()];
        let _: ControlFlow<()> = visit_tokens(root, &mut |token| {
            let source = ids[&token.path];
            for reference in &token.references {
                let TokenReference::Alias { path } = reference else {
                    continue;
                };
                // Targets that are not tokens in this tree are the
                // resolver's missing-target errors, not graph edges.
                if let Some(&target) = ids.get(path) {
                    edges[source].push(target);
                }
            }
            ControlFlow::Continue(())
        });

        Self {
            paths: ids.into_keys().cloned().collect(),
            edges,
        }
    }

    fn path(&self, node: usize) -> &TokenPath {
        &self.paths[node]
    }

    fn has_self_loop(&self, node: usize) -> bool {
        self.edges[node].contains(&node)
    }

    /// Tarjan's algorithm. Components are returned in emission order:
    /// every component is emitted after all components it has edges into.
    fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        let mut state = TarjanState {
            graph: self,
            index: vec![None; self.paths.len()],
            lowlink: vec![0; self.paths.len()],
            on_stack: vec![false; self.paths.len()],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        };
        for node in 0..self.paths.len() {
            if state.index[node].is_none() {
                state.connect(node);
            }
        }
        state.components
    }
}

struct TarjanState<'a> {
    graph: &'a ReferenceGraph,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl TarjanState<'_> {
    fn connect(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        for i in 0..self.graph.edges[node].len() {
            let target = self.graph.edges[node][i];
            match self.index[target] {
                None => {
                    self.connect(target);
                    self.lowlink[node] = self.lowlink[node].min(self.lowlink[target]);
                }
                Some(target_index) if self.on_stack[target] => {
                    self.lowlink[node] = self.lowlink[node].min(target_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.lowlink[node]) == self.index[node] {
            let mut component = Vec::new();
            loop {
                let member = self.stack.pop().expect("stack holds the component root");
                self.on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
