use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Summary of dependency graph structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Directed graph of tables where an edge `parent -> child` means the child
/// draws values from the parent.
///
/// Nodes keep their insertion order, which is used to break ties when
/// ordering tables.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: BTreeMap<String, usize>,
    children: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::default();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    pub fn add_node(&mut self, node: impl Into<String>) -> usize {
        let node = node.into();
        if let Some(idx) = self.index.get(&node) {
            return *idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        self.children.push(BTreeSet::new());
        idx
    }

    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let parent_idx = self.node_index(parent)?;
        let child_idx = self.node_index(child)?;
        self.children[parent_idx].insert(child_idx);
        Ok(())
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.nodes.len(),
            edges: self.children.iter().map(|targets| targets.len()).sum(),
        }
    }

    /// Order nodes so that every parent precedes its children.
    ///
    /// Among nodes whose parents are already placed, the earliest inserted
    /// node goes first. Returns the nodes left on a cycle on failure.
    pub fn toposort(&self) -> std::result::Result<Vec<String>, Vec<String>> {
        let mut indegree = vec![0_usize; self.nodes.len()];
        for targets in &self.children {
            for target in targets {
                indegree[*target] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = indegree
            .iter()
            .enumerate()
            .filter_map(|(idx, count)| if *count == 0 { Some(idx) } else { None })
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(self.nodes[node].clone());

            for target in &self.children[node] {
                let count = &mut indegree[*target];
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.insert(*target);
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            let cycle_nodes = indegree
                .into_iter()
                .enumerate()
                .filter_map(|(idx, count)| {
                    if count > 0 {
                        Some(self.nodes[idx].clone())
                    } else {
                        None
                    }
                })
                .collect();
            Err(cycle_nodes)
        }
    }

    fn node_index(&self, node: &str) -> Result<usize> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| Error::InvalidSchema(format!("unknown table in dependency graph: {node}")))
    }
}
