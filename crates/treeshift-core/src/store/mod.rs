//! Tree mutation seam
//!
//! `NodeStore` is the only way the executor changes the tree. Path, depth and
//! position are the store's responsibility.

pub mod memory;

use crate::errors::Result;
use crate::matcher::{ContentMatcher, NodeMatcher};
use crate::model::{LocationId, Node, SortField, SortOrder};

pub use memory::{MemoryRepository, Mutation};

/// Parameters for a new location
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCreateStruct {
    pub parent_id: LocationId,
    pub hidden: Option<bool>,
    pub priority: Option<i32>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl NodeCreateStruct {
    pub fn new(parent_id: LocationId) -> Self {
        Self {
            parent_id,
            hidden: None,
            priority: None,
            sort_field: None,
            sort_order: None,
        }
    }
}

/// Attribute changes for an existing location; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdateStruct {
    pub priority: Option<i32>,
    pub sort_field: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub remote_id: Option<String>,
}

/// Tree mutation API of the content repository
pub trait NodeStore {
    /// Place content `content_id` under a parent, returning the new location
    fn create_node(&mut self, content_id: i64, params: &NodeCreateStruct) -> Result<Node>;

    fn update_node(&mut self, node: &Node, params: &NodeUpdateStruct) -> Result<Node>;

    fn hide_node(&mut self, node: &Node) -> Result<Node>;

    fn unhide_node(&mut self, node: &Node) -> Result<Node>;

    /// Move `node` and its whole subtree under `new_parent`
    fn move_subtree(&mut self, node: &Node, new_parent: &Node) -> Result<()>;

    /// Exchange the tree positions of two locations; children stay attached
    /// to their own location
    fn swap_nodes(&mut self, a: &Node, b: &Node) -> Result<()>;

    /// Remove `node` and its subtree
    fn delete_node(&mut self, node: &Node) -> Result<()>;

    fn load_node(&self, id: LocationId) -> Result<Node>;
}

/// Content type metadata lookup
pub trait ContentTypeLookup {
    fn identifier_of(&self, content_type_id: i64) -> Result<String>;
}

/// Everything the executor needs from the repository
pub trait Repository: NodeStore + NodeMatcher + ContentMatcher + ContentTypeLookup {}

impl<T> Repository for T where T: NodeStore + NodeMatcher + ContentMatcher + ContentTypeLookup {}
