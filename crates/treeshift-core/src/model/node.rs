use serde::{Deserialize, Serialize};

use super::content::ContentInfo;
use super::sort::{SortField, SortOrder};

pub type LocationId = i64;

/// Node - one location in the content tree
///
/// `path`, `depth` and `position` are derived from the parent chain by the
/// node store. The executor never writes them; they change only through
/// move and swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: LocationId,
    pub remote_id: String,
    /// None only for the tree root
    pub parent_id: Option<LocationId>,
    /// Ancestor chain including the node itself, e.g. `/1/2/42/`
    pub path: String,
    /// Root is depth 0
    pub depth: u32,
    pub priority: i32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub hidden: bool,
    /// 1-based index among siblings ordered by priority, then id
    pub position: u32,
    pub content_id: i64,
    pub content_info: ContentInfo,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Ids along the path, root first, ending with this node
    pub fn path_ids(&self) -> Vec<LocationId> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect()
    }

    /// True if `ancestor_id` is on this node's path (the node itself included)
    pub fn is_in_subtree_of(&self, ancestor_id: LocationId) -> bool {
        self.path.contains(&format!("/{}/", ancestor_id))
    }
}

/// Ordered result of matching or mutating nodes
///
/// Order is the matcher's iteration order and survives mutation: handlers
/// rebuild the sequence rather than patching it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSet(Vec<Node>);

impl NodeSet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Node> {
        self.0.first()
    }

    pub fn ids(&self) -> Vec<LocationId> {
        self.0.iter().map(|n| n.id).collect()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.0
    }
}

impl From<Vec<Node>> for NodeSet {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NodeSet {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: LocationId, path: &str) -> Node {
        Node {
            id,
            remote_id: format!("loc-{}", id),
            parent_id: None,
            path: path.to_string(),
            depth: 0,
            priority: 0,
            sort_field: SortField::Name,
            sort_order: SortOrder::Asc,
            hidden: false,
            position: 1,
            content_id: 1,
            content_info: ContentInfo::new(1, "c-1", "Root", 1),
        }
    }

    #[test]
    fn test_path_ids() {
        let n = node(42, "/1/2/42/");
        assert_eq!(n.path_ids(), vec![1, 2, 42]);
        assert!(n.is_in_subtree_of(2));
        assert!(n.is_in_subtree_of(42));
        assert!(!n.is_in_subtree_of(4));
    }

    #[test]
    fn test_subtree_check_does_not_match_prefix_digits() {
        let n = node(120, "/1/120/");
        assert!(!n.is_in_subtree_of(12));
    }

    #[test]
    fn test_node_set_preserves_order() {
        let set: NodeSet = vec![node(3, "/1/3/"), node(2, "/1/2/")].into_iter().collect();
        assert_eq!(set.ids(), vec![3, 2]);
        assert_eq!(set.first().map(|n| n.id), Some(3));
    }
}
