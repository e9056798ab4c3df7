//! Dependency graph for pipeline execution ordering.
//!
//! Pipelines declare at most one `after` and one `before` relation. Both
//! are turned into precedence edges (`source` runs before `target`):
//!
//! - `P after Q` records P in `after[Q]` and adds the edge `Q -> P`
//! - `P before Q` records P in `before[Q]` and adds the edge `P -> Q`

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::error::{LabflowError, Result};
use crate::pipeline::Pipeline;

/// Precedence relations between pipelines.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Pipeline names in discovery order.
    names: Vec<String>,
    /// Name to discovery index.
    index: HashMap<String, usize>,
    /// `after[target]`: names that must run after `target`.
    after: HashMap<String, Vec<String>>,
    /// `before[target]`: names that must run before `target`.
    before: HashMap<String, Vec<String>>,
    /// `successors[i]`: indices that must run after `i`.
    successors: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph from pipelines in discovery order.
    pub fn build(pipelines: &[Pipeline]) -> Self {
        Self::from_declarations(
            pipelines
                .iter()
                .map(|p| (p.name.as_str(), p.after.as_deref(), p.before.as_deref())),
        )
    }

    /// Build the graph from `(name, after, before)` declarations in discovery order.
    ///
    /// Declarations naming an unknown pipeline are logged and ignored.
    pub fn from_declarations<'a, I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>, Option<&'a str>)>,
    {
        let declarations: Vec<_> = declarations.into_iter().collect();

        let mut graph = DependencyGraph::default();
        for (name, _, _) in &declarations {
            if graph.index.contains_key(*name) {
                continue;
            }
            graph.index.insert(name.to_string(), graph.names.len());
            graph.names.push(name.to_string());
        }
        graph.successors = vec![Vec::new(); graph.names.len()];

        for (name, after, before) in &declarations {
            if let Some(target) = after {
                graph
                    .after
                    .entry(target.to_string())
                    .or_default()
                    .push(name.to_string());
                graph.add_edge(target, name);
            }
            if let Some(target) = before {
                graph
                    .before
                    .entry(target.to_string())
                    .or_default()
                    .push(name.to_string());
                graph.add_edge(name, target);
            }
        }

        graph
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            let unknown = if self.index.contains_key(source) { target } else { source };
            warn!("Ignoring dependency on unknown pipeline '{}'", unknown);
            return;
        };
        if !self.successors[from].contains(&to) {
            self.successors[from].push(to);
        }
    }

    /// Names that must run after `target`.
    pub fn after_of(&self, target: &str) -> &[String] {
        self.after.get(target).map_or(&[], Vec::as_slice)
    }

    /// Names that must run before `target`.
    pub fn before_of(&self, target: &str) -> &[String] {
        self.before.get(target).map_or(&[], Vec::as_slice)
    }

    /// Check if a pipeline exists in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get the number of pipelines in the graph.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The path starts and ends with the same name.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            node: usize,
            graph: &DependencyGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[node] = State::Visiting;
            path.push(node);

            for &next in &graph.successors[node] {
                match state[next] {
                    State::Visiting => {
                        let start = path.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|&n| graph.names[n].clone()).collect();
                        cycle.push(graph.names[next].clone());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(next, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[node] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.names.len()];
        let mut path = Vec::new();
        for node in 0..self.names.len() {
            if state[node] == State::Unvisited {
                if let Some(cycle) = dfs(node, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    /// Returns pipeline names in execution order.
    ///
    /// Kahn's algorithm; among ready pipelines the one discovered first is
    /// always taken next, so unrelated pipelines keep their discovery order.
    /// Returns an error if a cycle is detected.
    pub fn execution_order(&self) -> Result<Vec<String>> {
        if let Some(cycle) = self.find_cycle() {
            return Err(LabflowError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }

        let mut in_degree = vec![0usize; self.names.len()];
        for successors in &self.successors {
            for &next in successors {
                in_degree[next] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(node, _)| node)
            .collect();

        let mut order = Vec::with_capacity(self.names.len());
        while let Some(node) = ready.pop_first() {
            order.push(self.names[node].clone());
            for &next in &self.successors[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.insert(next);
                }
            }
        }

        // Unreachable after find_cycle, kept so a bug never yields a partial order.
        if order.len() != self.names.len() {
            let remaining: Vec<_> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, &d)| d > 0)
                .map(|(n, _)| self.names[n].clone())
                .collect();
            return Err(LabflowError::CircularDependency {
                cycle: remaining.join(" -> "),
            });
        }

        Ok(order)
    }
}
