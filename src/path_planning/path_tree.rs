//! Parent-linked exploration tree used to rebuild paths
//!
//! Nodes are stored in an arena; each node knows its parent index and the
//! indices of its children. Lookups go through an exact-value key map, so
//! callers must hand back the literal configuration they inserted, never a
//! recomputed approximation of it.

use std::collections::HashMap;

use crate::common::{Configuration, RrtError, RrtResult};

#[derive(Debug, Clone)]
struct PathNode<C> {
    config: C,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Exploration tree rooted at the planner's start configuration
#[derive(Debug, Clone)]
pub struct PathTree<C: Configuration> {
    nodes: Vec<PathNode<C>>,
    index: HashMap<C::Key, usize>,
}

impl<C: Configuration> PathTree<C> {
    pub fn new(root: C) -> Self {
        let mut index = HashMap::new();
        index.insert(root.key(), 0);
        PathTree {
            nodes: vec![PathNode {
                config: root,
                parent: None,
                children: Vec::new(),
            }],
            index,
        }
    }

    pub fn root(&self) -> C {
        self.nodes[0].config
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, config: &C) -> bool {
        self.index.contains_key(&config.key())
    }

    /// Record the edge `parent` → `child`.
    ///
    /// `parent` must already be in the tree. Re-inserting a configuration
    /// creates a new node and moves its key to that node.
    pub fn add_edge(&mut self, parent: &C, child: C) -> RrtResult<usize> {
        let parent_index = self.lookup(parent)?;
        let child_index = self.nodes.len();

        self.nodes.push(PathNode {
            config: child,
            parent: Some(parent_index),
            children: Vec::new(),
        });
        self.nodes[parent_index].children.push(child_index);
        self.index.insert(child.key(), child_index);

        Ok(child_index)
    }

    /// Configurations from the root down to `config`, both included
    pub fn path_to(&self, config: &C) -> RrtResult<Vec<C>> {
        let mut path = Vec::new();
        let mut current = Some(self.lookup(config)?);

        while let Some(index) = current {
            let node = &self.nodes[index];
            path.push(node.config);
            current = node.parent;
        }

        path.reverse();
        Ok(path)
    }

    pub fn parent_of(&self, config: &C) -> RrtResult<Option<C>> {
        let index = self.lookup(config)?;
        Ok(self.nodes[index].parent.map(|p| self.nodes[p].config))
    }

    pub fn children_of(&self, config: &C) -> RrtResult<Vec<C>> {
        let index = self.lookup(config)?;
        Ok(self.nodes[index]
            .children
            .iter()
            .map(|&c| self.nodes[c].config)
            .collect())
    }

    /// Every parent → child edge, in insertion order of the children
    pub fn edges(&self) -> impl Iterator<Item = (C, C)> + '_ {
        self.nodes
            .iter()
            .filter_map(move |n| n.parent.map(|p| (self.nodes[p].config, n.config)))
    }

    fn lookup(&self, config: &C) -> RrtResult<usize> {
        self.index.get(&config.key()).copied().ok_or_else(|| {
            RrtError::TreeStructure(format!("configuration {:?} is not in the tree", config))
        })
    }
}
