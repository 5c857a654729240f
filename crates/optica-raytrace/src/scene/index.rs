//! Arena index over a built scene graph.
//!
//! Nodes own their children; upward links and name lookup live here as
//! plain indices so the tree itself never holds back-references.

use std::collections::HashMap;

use super::object::SceneObject;

/// Position of a node in a [`SceneIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What the index knows about one node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    /// Node name.
    pub name: String,
    /// Parent node; `None` for the root.
    pub parent: Option<NodeId>,
    /// Child positions from the root down to this node, in
    /// [`SceneObject::children`] order.
    pub path: Vec<usize>,
}

/// Pre-order arena of every node in a scene graph.
#[derive(Debug, Clone, Default)]
pub struct SceneIndex {
    nodes: Vec<NodeInfo>,
    by_name: HashMap<String, Vec<NodeId>>,
}

impl SceneIndex {
    /// Index the tree rooted at `root`.
    pub fn build(root: &SceneObject) -> Self {
        let mut index = Self::default();
        index.visit(root, None, Vec::new());
        index
    }

    fn visit(&mut self, object: &SceneObject, parent: Option<NodeId>, path: Vec<usize>) {
        let id = NodeId(self.nodes.len());
        self.by_name.entry(object.name().to_string()).or_default().push(id);
        self.nodes.push(NodeInfo {
            name: object.name().to_string(),
            parent,
            path: path.clone(),
        });
        for (i, child) in object.children().into_iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            self.visit(child, Some(id), child_path);
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in pre-order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Information about a node.
    pub fn get(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(id.0)
    }

    /// Every node carrying `name`.
    pub fn find(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The node `id` inside the tree this index was built from.
    pub fn resolve<'r>(&self, root: &'r SceneObject, id: NodeId) -> Option<&'r SceneObject> {
        let info = self.get(id)?;
        info.path
            .iter()
            .try_fold(root, |node, &i| node.child(i))
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).and_then(|n| n.parent), move |p| {
            self.get(*p).and_then(|n| n.parent)
        })
    }

    /// Slash-separated names from the root down to `id`.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter_map(|a| self.get(a).map(|n| n.name.as_str()))
            .collect();
        names.reverse();
        if let Some(n) = self.get(id) {
            names.push(&n.name);
        }
        names.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Container, Difference, Primitive};
    use crate::surface::Emissive;
    use crate::Colour;
    use optica_geom::Sphere;
    use std::sync::Arc;

    fn ball(name: &str) -> Primitive {
        Primitive::new(name, Sphere::new(1.0), Arc::new(Emissive::new(Colour::WHITE)))
    }

    fn tree() -> SceneObject {
        Container::new("root")
            .with(ball("sun"))
            .with(
                Container::new("group").with(
                    Difference::new("bitten")
                        .with_positive(ball("apple"))
                        .with_negative(ball("bite")),
                ),
            )
            .into()
    }

    #[test]
    fn test_preorder_and_parents() {
        let root = tree();
        let index = SceneIndex::build(&root);
        let names: Vec<&str> = index.ids().map(|id| index.get(id).unwrap().name.as_str()).collect();
        assert_eq!(names, vec!["root", "sun", "group", "bitten", "apple", "bite"]);
        let bite = index.find("bite")[0];
        assert_eq!(index.qualified_name(bite), "root/group/bitten/bite");
        assert_eq!(index.ancestors(bite).count(), 3);
    }

    #[test]
    fn test_resolve_by_path() {
        let root = tree();
        let index = SceneIndex::build(&root);
        for id in index.ids() {
            let node = index.resolve(&root, id).unwrap();
            assert_eq!(node.name(), index.get(id).unwrap().name);
        }
        let apple = index.find("apple")[0];
        assert!(index.resolve(&root, apple).unwrap().as_primitive().is_some());
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let root: SceneObject = Container::new("root").with(ball("twin")).with(ball("twin")).into();
        let index = SceneIndex::build(&root);
        assert_eq!(index.find("twin").len(), 2);
        assert!(index.find("nobody").is_empty());
    }
}
