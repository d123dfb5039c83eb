//! # Patch Dependency Graph
//!
//! Builds a directed graph over patch names from each patch's `depends_on`
//! set and renders it either in Graphviz DOT format or as an indented tree
//! for the terminal. The graph is descriptive: it never influences apply
//! order, and cycles are valid input that both renderers handle.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::io::{self, Write};

use ptree::{Style, TreeItem};

/// Directed graph of "depends on" edges between patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Patch names in series order.
    nodes: Vec<String>,
    /// `(dependent, dependency)` pairs, grouped by dependent in series order.
    edges: Vec<(String, String)>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a patch node and its outgoing "depends on" edges.
    pub fn add_patch<'a>(&mut self, name: &str, depends_on: impl IntoIterator<Item = &'a String>) {
        self.nodes.push(name.to_string());
        for dep in depends_on {
            self.edges.push((name.to_string(), dep.clone()));
        }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    /// Direct dependencies of `name`.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(from, _)| from == name)
            .map(|(_, to)| to.as_str())
            .collect()
    }

    /// Renders the graph in DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph patches {\n");
        for node in &self.nodes {
            out.push_str(&format!("    {};\n", quote(node)));
        }
        for (from, to) in &self.edges {
            out.push_str(&format!("    {} -> {};\n", quote(from), quote(to)));
        }
        out.push_str("}\n");
        out
    }

    /// Patches that no other patch depends on, in series order.
    pub fn tips(&self) -> Vec<&str> {
        let depended: BTreeSet<&str> = self.edges.iter().map(|(_, to)| to.as_str()).collect();
        self.nodes
            .iter()
            .map(String::as_str)
            .filter(|node| !depended.contains(node))
            .collect()
    }

    /// Builds a tree rooted at the tips, each patch listing its dependencies
    /// as children. Each patch is expanded only where it first appears; later
    /// occurrences are leaves marked `(see above)`, or `(cycle)` when the
    /// patch is on the current path. Patches only reachable through a cycle
    /// become extra roots so every patch appears.
    pub fn to_tree(&self) -> TreeNode {
        let mut reached = HashSet::new();
        let mut children = Vec::new();
        let roots = self
            .tips()
            .into_iter()
            .chain(self.nodes.iter().map(String::as_str));
        for root in roots {
            if reached.contains(root) {
                continue;
            }
            children.push(self.build_node(root, &mut HashSet::new(), &mut reached));
        }
        TreeNode {
            label: "patches".to_string(),
            children,
        }
    }

    fn build_node<'a>(
        &'a self,
        name: &'a str,
        path: &mut HashSet<&'a str>,
        reached: &mut HashSet<&'a str>,
    ) -> TreeNode {
        if !path.insert(name) {
            return TreeNode {
                label: format!("{} (cycle)", name),
                children: Vec::new(),
            };
        }
        if !reached.insert(name) {
            path.remove(name);
            return TreeNode {
                label: format!("{} (see above)", name),
                children: Vec::new(),
            };
        }
        let children = self
            .dependencies_of(name)
            .into_iter()
            .map(|dep| self.build_node(dep, path, reached))
            .collect();
        path.remove(name);
        TreeNode {
            label: name.to_string(),
            children,
        }
    }

    /// Writes the tree rendering to `out`.
    pub fn write_tree<W: Write>(&self, out: W) -> io::Result<()> {
        ptree::write_tree(&self.to_tree(), out)
    }
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Tree node structure for ptree visualization
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
