//! Dead Function Pass (Pass 2) - Drop functions nothing can call.
//!
//! The pass builds a call graph over every function that has a body, plus
//! one root node standing for the global initializers. Calls are matched
//! conservatively by unqualified name and argument count, so a call that
//! could reach a function under any namespace or overload keeps it alive.
//!
//! Removal runs to a fixed point: dropping a function can leave its own
//! callees without callers. The number of rounds is capped by
//! [`CompilerOptions::max_dead_code_iterations`](crate::CompilerOptions).
//!
//! Always kept:
//! - entry, catch and exported functions
//! - methods (dispatch goes through their type)
//! - builtins (they have no body)

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use rustc_hash::FxHashMap;
use slate_core::Note;
use slate_ir::walk::{self, Visitor};
use slate_ir::{Block, Expr};

use crate::context::CompilationContext;
use crate::expr::construct::INIT;
use crate::passes::registration::GlobalDecl;
use crate::symbols::FunctionId;

/// A call graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// Global initializer code
    Root,
    Function(FunctionId),
}

/// Output of the dead function pass.
#[derive(Debug, Default)]
pub struct DeadCodeOutput {
    /// Rounds that ran.
    pub iterations: usize,
    /// Removed functions in removal order.
    pub removed: Vec<FunctionId>,
}

/// Collects `(name, argument count)` for every call in a tree.
#[derive(Default)]
struct CallCollector<'ast> {
    calls: Vec<(&'ast str, usize)>,
}

impl<'ast> Visitor<'ast> for CallCollector<'ast> {
    fn visit_expr(&mut self, expr: &Expr<'ast>) {
        match expr {
            Expr::Call(call) => self.calls.push((call.name.name, call.args.len())),
            Expr::New(new) => self.calls.push((INIT, new.args.len())),
            _ => {}
        }
        walk::walk_expr(self, expr);
    }
}

/// Pass 2: dead function elimination.
pub struct DeadCodePass<'a, 'ast> {
    ctx: &'a mut CompilationContext<'ast>,
    graph: StableDiGraph<Node, ()>,
    nodes: FxHashMap<FunctionId, NodeIndex>,
}

impl<'a, 'ast> DeadCodePass<'a, 'ast> {
    /// Create a new pass.
    pub fn new(ctx: &'a mut CompilationContext<'ast>) -> Self {
        Self {
            ctx,
            graph: StableDiGraph::new(),
            nodes: FxHashMap::default(),
        }
    }

    /// Build the call graph, remove unreachable functions when enabled and
    /// store every surviving function's reference count.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, globals: &[GlobalDecl<'ast>]) -> DeadCodeOutput {
        self.build_graph(globals);

        let mut output = DeadCodeOutput::default();
        if self.ctx.options.eliminates_dead_functions() {
            while output.iterations < self.ctx.options.max_dead_code_iterations {
                output.iterations += 1;
                let dead = self.unreferenced();
                tracing::debug!(
                    iteration = output.iterations,
                    removed = dead.len(),
                    "dead function round"
                );
                if dead.is_empty() {
                    break;
                }
                for id in dead {
                    self.remove(id);
                    output.removed.push(id);
                }
            }
        }

        let counts: Vec<(FunctionId, usize)> = self
            .nodes
            .iter()
            .map(|(id, node)| (*id, self.callers(*node)))
            .collect();
        for (id, count) in counts {
            self.ctx.symbols.function_mut(id).reference_count = count;
        }
        output
    }

    fn build_graph(&mut self, globals: &[GlobalDecl<'ast>]) {
        let mut by_name: FxHashMap<(&'ast str, usize), Vec<FunctionId>> = FxHashMap::default();
        let mut bodies: Vec<(FunctionId, &'ast Block<'ast>)> = Vec::new();

        for id in self.ctx.symbols.function_ids() {
            let Some(decl) = self.ctx.symbols.decl(id) else {
                continue;
            };
            if self.ctx.symbols.function(id).builtin.is_some() {
                continue;
            }
            let node = self.graph.add_node(Node::Function(id));
            self.nodes.insert(id, node);
            by_name
                .entry((decl.name.name, decl.params.len()))
                .or_default()
                .push(id);
            bodies.push((id, &decl.body));
        }

        let root = self.graph.add_node(Node::Root);
        let mut collector = CallCollector::default();
        for global in globals {
            if let Some(init) = &global.decl.init {
                collector.visit_expr(init);
            }
        }
        self.add_edges(root, &collector.calls, &by_name);

        for (id, body) in bodies {
            let mut collector = CallCollector::default();
            walk::walk_block(&mut collector, body);
            if let Some(&node) = self.nodes.get(&id) {
                self.add_edges(node, &collector.calls, &by_name);
            }
        }
    }

    fn add_edges(
        &mut self,
        from: NodeIndex,
        calls: &[(&'ast str, usize)],
        by_name: &FxHashMap<(&'ast str, usize), Vec<FunctionId>>,
    ) {
        for key in calls {
            for callee in by_name.get(key).into_iter().flatten() {
                if let Some(&to) = self.nodes.get(callee) {
                    self.graph.add_edge(from, to, ());
                }
            }
        }
    }

    /// Call sites reaching `node` from other live nodes.
    fn callers(&self, node: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .filter(|caller| *caller != node)
            .count()
    }

    fn unreferenced(&self) -> Vec<FunctionId> {
        let mut dead: Vec<FunctionId> = self
            .nodes
            .iter()
            .filter(|(id, node)| {
                let function = self.ctx.symbols.function(**id);
                !function.attributes.is_root() && !function.is_method() && self.callers(**node) == 0
            })
            .map(|(id, _)| *id)
            .collect();
        dead.sort();
        dead
    }

    fn remove(&mut self, id: FunctionId) {
        if let Some(node) = self.nodes.remove(&id) {
            self.graph.remove_node(node);
        }
        let function = self.ctx.symbols.function(id);
        let file = function.source_file.clone();
        let note = Note::UnusedFunction {
            signature: function.readable.clone(),
            span: function.span,
        };
        self.ctx.symbols.eliminate(id);
        self.ctx.set_file(&file);
        self.ctx.note(note);
        tracing::trace!(function = ?id, "eliminated");
    }
}
