use std::collections::BTreeMap;

use uuid::Uuid;

use super::{ContentTypeLookup, NodeCreateStruct, NodeStore, NodeUpdateStruct};
use crate::errors::{Result, StepError};
use crate::matcher::criteria::{Criterion, MatchSubject, Scope};
use crate::matcher::{ContentMatcher, NodeKey, NodeMatcher};
use crate::model::{ContentInfo, ContentType, LocationId, MatchSpec, Node, NodeSet, SortField, SortOrder};

/// One mutating call recorded by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create {
        location_id: LocationId,
        parent_id: LocationId,
        content_id: i64,
    },
    Update {
        location_id: LocationId,
    },
    Hide {
        location_id: LocationId,
    },
    Unhide {
        location_id: LocationId,
    },
    Move {
        location_id: LocationId,
        new_parent_id: LocationId,
    },
    Swap {
        a: LocationId,
        b: LocationId,
    },
    Delete {
        location_id: LocationId,
    },
}

/// Stored location; derived attributes are computed on read
#[derive(Debug, Clone)]
struct LocationRecord {
    id: LocationId,
    remote_id: String,
    parent_id: Option<LocationId>,
    priority: i32,
    sort_field: SortField,
    sort_order: SortOrder,
    hidden: bool,
    content_id: i64,
}

/// In-memory content repository
///
/// Implements every collaborator seam the executor consumes. Every successful
/// mutating call is appended to a journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    locations: BTreeMap<LocationId, LocationRecord>,
    contents: BTreeMap<i64, ContentInfo>,
    content_types: BTreeMap<i64, ContentType>,
    next_location_id: LocationId,
    journal: Vec<Mutation>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- fixture setup (not journaled) -----

    pub fn insert_content_type(&mut self, id: i64, identifier: impl Into<String>) {
        self.content_types.insert(
            id,
            ContentType {
                id,
                identifier: identifier.into(),
            },
        );
    }

    pub fn insert_content(&mut self, content: ContentInfo) {
        self.contents.insert(content.id, content);
    }

    /// Seed a location with a fixed id and remote id `location-<id>`
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent or content is missing, `Persistence` if the
    /// id is taken or a second root is inserted.
    pub fn insert_location(
        &mut self,
        id: LocationId,
        parent_id: Option<LocationId>,
        content_id: i64,
    ) -> Result<Node> {
        if self.locations.contains_key(&id) {
            return Err(persistence(format!("location {} already exists", id)));
        }
        match parent_id {
            Some(pid) => {
                self.record(pid)?;
            }
            None if self.locations.values().any(|r| r.parent_id.is_none()) => {
                return Err(persistence("tree already has a root"));
            }
            None => {}
        }
        self.content(content_id)?;

        self.locations.insert(
            id,
            LocationRecord {
                id,
                remote_id: format!("location-{}", id),
                parent_id,
                priority: 0,
                sort_field: SortField::Name,
                sort_order: SortOrder::Asc,
                hidden: false,
                content_id,
            },
        );
        self.next_location_id = self.next_location_id.max(id + 1);
        self.claim_main_location(content_id, id);
        self.load_node(id)
    }

    // ----- inspection -----

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn contains_location(&self, id: LocationId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Direct children of `id` in position order
    pub fn children_of(&self, id: LocationId) -> Result<Vec<Node>> {
        self.sibling_ids(Some(id))
            .into_iter()
            .map(|child| self.load_node(child))
            .collect()
    }

    pub fn content_info(&self, id: i64) -> Option<&ContentInfo> {
        self.contents.get(&id)
    }

    // ----- internals -----

    fn record(&self, id: LocationId) -> Result<&LocationRecord> {
        self.locations.get(&id).ok_or_else(|| StepError::NotFound {
            entity: "location".to_string(),
            key: id.to_string(),
        })
    }

    fn record_mut(&mut self, id: LocationId) -> Result<&mut LocationRecord> {
        self.locations.get_mut(&id).ok_or_else(|| StepError::NotFound {
            entity: "location".to_string(),
            key: id.to_string(),
        })
    }

    fn content(&self, id: i64) -> Result<&ContentInfo> {
        self.contents.get(&id).ok_or_else(|| StepError::NotFound {
            entity: "content".to_string(),
            key: id.to_string(),
        })
    }

    fn claim_main_location(&mut self, content_id: i64, location_id: LocationId) {
        if let Some(content) = self.contents.get_mut(&content_id) {
            if content.main_location_id.is_none() {
                content.main_location_id = Some(location_id);
            }
        }
    }

    /// Ancestor chain root first, ending with `id`
    fn chain(&self, id: LocationId) -> Result<Vec<LocationId>> {
        let mut chain = vec![id];
        let mut current = self.record(id)?;
        while let Some(parent_id) = current.parent_id {
            if chain.len() > self.locations.len() {
                return Err(StepError::Internal {
                    message: format!("parent chain of location {} is cyclic", id),
                });
            }
            chain.push(parent_id);
            current = self.record(parent_id)?;
        }
        chain.reverse();
        Ok(chain)
    }

    fn sibling_ids(&self, parent_id: Option<LocationId>) -> Vec<LocationId> {
        let mut siblings: Vec<&LocationRecord> = self
            .locations
            .values()
            .filter(|r| r.parent_id == parent_id)
            .collect();
        siblings.sort_by_key(|r| (r.priority, r.id));
        siblings.into_iter().map(|r| r.id).collect()
    }

    fn is_descendant_or_self(&self, id: LocationId, ancestor_id: LocationId) -> Result<bool> {
        Ok(self.chain(id)?.contains(&ancestor_id))
    }

    fn subtree_ids(&self, root_id: LocationId) -> Result<Vec<LocationId>> {
        let mut ids = Vec::new();
        for id in self.locations.keys() {
            if self.is_descendant_or_self(*id, root_id)? {
                ids.push(*id);
            }
        }
        Ok(ids)
    }

    fn type_identifier(&self, content_type_id: i64) -> Option<&str> {
        self.content_types
            .get(&content_type_id)
            .map(|t| t.identifier.as_str())
    }

    fn remote_id_taken(&self, remote_id: &str, except: LocationId) -> bool {
        self.locations
            .values()
            .any(|r| r.id != except && r.remote_id == remote_id)
    }
}

fn persistence(message: impl Into<String>) -> StepError {
    StepError::Persistence {
        message: message.into(),
    }
}

fn illegal_move(location_id: LocationId, reason: impl Into<String>) -> StepError {
    StepError::IllegalMove {
        location_id,
        reason: reason.into(),
    }
}

impl NodeStore for MemoryRepository {
    fn create_node(&mut self, content_id: i64, params: &NodeCreateStruct) -> Result<Node> {
        self.record(params.parent_id)?;
        self.content(content_id)?;
        if self
            .locations
            .values()
            .any(|r| r.parent_id == Some(params.parent_id) && r.content_id == content_id)
        {
            return Err(persistence(format!(
                "content {} already has a location below {}",
                content_id, params.parent_id
            )));
        }

        let id = self.next_location_id.max(1);
        self.next_location_id = id + 1;
        self.locations.insert(
            id,
            LocationRecord {
                id,
                remote_id: Uuid::new_v4().simple().to_string(),
                parent_id: Some(params.parent_id),
                priority: params.priority.unwrap_or(0),
                sort_field: params.sort_field.unwrap_or(SortField::Name),
                sort_order: params.sort_order.unwrap_or(SortOrder::Asc),
                hidden: params.hidden.unwrap_or(false),
                content_id,
            },
        );
        self.claim_main_location(content_id, id);
        self.journal.push(Mutation::Create {
            location_id: id,
            parent_id: params.parent_id,
            content_id,
        });
        tracing::debug!(location_id = id, parent_id = params.parent_id, "location created");
        self.load_node(id)
    }

    fn update_node(&mut self, node: &Node, params: &NodeUpdateStruct) -> Result<Node> {
        if let Some(remote_id) = &params.remote_id {
            if self.remote_id_taken(remote_id, node.id) {
                return Err(persistence(format!(
                    "remote id {} is already used by another location",
                    remote_id
                )));
            }
        }
        let record = self.record_mut(node.id)?;
        if let Some(priority) = params.priority {
            record.priority = priority;
        }
        if let Some(sort_field) = params.sort_field {
            record.sort_field = sort_field;
        }
        if let Some(sort_order) = params.sort_order {
            record.sort_order = sort_order;
        }
        if let Some(remote_id) = &params.remote_id {
            record.remote_id = remote_id.clone();
        }
        self.journal.push(Mutation::Update {
            location_id: node.id,
        });
        tracing::debug!(location_id = node.id, "location updated");
        self.load_node(node.id)
    }

    fn hide_node(&mut self, node: &Node) -> Result<Node> {
        self.record_mut(node.id)?.hidden = true;
        self.journal.push(Mutation::Hide {
            location_id: node.id,
        });
        self.load_node(node.id)
    }

    fn unhide_node(&mut self, node: &Node) -> Result<Node> {
        self.record_mut(node.id)?.hidden = false;
        self.journal.push(Mutation::Unhide {
            location_id: node.id,
        });
        self.load_node(node.id)
    }

    fn move_subtree(&mut self, node: &Node, new_parent: &Node) -> Result<()> {
        if self.record(node.id)?.parent_id.is_none() {
            return Err(illegal_move(node.id, "the tree root cannot be moved"));
        }
        self.record(new_parent.id)?;
        if self.is_descendant_or_self(new_parent.id, node.id)? {
            return Err(illegal_move(
                node.id,
                format!("target parent {} is inside the moved subtree", new_parent.id),
            ));
        }

        self.record_mut(node.id)?.parent_id = Some(new_parent.id);
        self.journal.push(Mutation::Move {
            location_id: node.id,
            new_parent_id: new_parent.id,
        });
        tracing::debug!(location_id = node.id, new_parent_id = new_parent.id, "subtree moved");
        Ok(())
    }

    fn swap_nodes(&mut self, a: &Node, b: &Node) -> Result<()> {
        if a.id == b.id {
            return Err(illegal_move(a.id, "cannot swap a location with itself"));
        }
        let (a_parent, a_priority) = {
            let r = self.record(a.id)?;
            (r.parent_id, r.priority)
        };
        let (b_parent, b_priority) = {
            let r = self.record(b.id)?;
            (r.parent_id, r.priority)
        };
        if a_parent.is_none() || b_parent.is_none() {
            return Err(illegal_move(a.id, "the tree root cannot be swapped"));
        }
        if self.is_descendant_or_self(b.id, a.id)? || self.is_descendant_or_self(a.id, b.id)? {
            return Err(illegal_move(
                a.id,
                format!("locations {} and {} are in the same branch", a.id, b.id),
            ));
        }

        {
            let ra = self.record_mut(a.id)?;
            ra.parent_id = b_parent;
            ra.priority = b_priority;
        }
        {
            let rb = self.record_mut(b.id)?;
            rb.parent_id = a_parent;
            rb.priority = a_priority;
        }
        self.journal.push(Mutation::Swap { a: a.id, b: b.id });
        tracing::debug!(a = a.id, b = b.id, "locations swapped");
        Ok(())
    }

    fn delete_node(&mut self, node: &Node) -> Result<()> {
        if self.record(node.id)?.parent_id.is_none() {
            return Err(persistence("the tree root cannot be deleted"));
        }
        let doomed = self.subtree_ids(node.id)?;
        for id in &doomed {
            self.locations.remove(id);
        }

        // contents that lost their main location fall back to any remaining one
        let orphaned: Vec<i64> = self
            .contents
            .values()
            .filter(|c| c.main_location_id.is_some_and(|m| doomed.contains(&m)))
            .map(|c| c.id)
            .collect();
        for content_id in orphaned {
            let replacement = self
                .locations
                .values()
                .find(|r| r.content_id == content_id)
                .map(|r| r.id);
            if let Some(content) = self.contents.get_mut(&content_id) {
                content.main_location_id = replacement;
            }
        }

        self.journal.push(Mutation::Delete {
            location_id: node.id,
        });
        tracing::debug!(location_id = node.id, removed = doomed.len(), "subtree deleted");
        Ok(())
    }

    fn load_node(&self, id: LocationId) -> Result<Node> {
        let record = self.record(id)?;
        let chain = self.chain(id)?;
        let path = chain
            .iter()
            .fold(String::from("/"), |acc, part| format!("{}{}/", acc, part));
        let position = self
            .sibling_ids(record.parent_id)
            .iter()
            .position(|sibling| *sibling == id)
            .map(|p| p as u32 + 1)
            .unwrap_or(1);
        let content_info = self.content(record.content_id)?.clone();

        Ok(Node {
            id,
            remote_id: record.remote_id.clone(),
            parent_id: record.parent_id,
            path,
            depth: (chain.len() - 1) as u32,
            priority: record.priority,
            sort_field: record.sort_field,
            sort_order: record.sort_order,
            hidden: record.hidden,
            position,
            content_id: record.content_id,
            content_info,
        })
    }
}

struct NodeSubject<'a> {
    node: &'a Node,
    parent_remote_id: Option<String>,
    type_identifier: Option<&'a str>,
}

impl MatchSubject for NodeSubject<'_> {
    fn location_ids(&self) -> Vec<i64> {
        vec![self.node.id]
    }
    fn location_remote_ids(&self) -> Vec<String> {
        vec![self.node.remote_id.clone()]
    }
    fn parent_location_ids(&self) -> Vec<i64> {
        self.node.parent_id.into_iter().collect()
    }
    fn parent_location_remote_ids(&self) -> Vec<String> {
        self.parent_remote_id.iter().cloned().collect()
    }
    fn content_id(&self) -> i64 {
        self.node.content_id
    }
    fn content_remote_id(&self) -> &str {
        &self.node.content_info.remote_id
    }
    fn content_type_id(&self) -> i64 {
        self.node.content_info.content_type_id
    }
    fn content_type_identifier(&self) -> Option<&str> {
        self.type_identifier
    }
    fn paths(&self) -> Vec<String> {
        vec![self.node.path.clone()]
    }
    fn hidden(&self) -> Option<bool> {
        Some(self.node.hidden)
    }
}

struct ContentSubject<'a> {
    content: &'a ContentInfo,
    locations: Vec<Node>,
    type_identifier: Option<&'a str>,
}

impl MatchSubject for ContentSubject<'_> {
    fn location_ids(&self) -> Vec<i64> {
        self.locations.iter().map(|n| n.id).collect()
    }
    fn location_remote_ids(&self) -> Vec<String> {
        self.locations.iter().map(|n| n.remote_id.clone()).collect()
    }
    fn parent_location_ids(&self) -> Vec<i64> {
        self.locations.iter().filter_map(|n| n.parent_id).collect()
    }
    fn parent_location_remote_ids(&self) -> Vec<String> {
        Vec::new()
    }
    fn content_id(&self) -> i64 {
        self.content.id
    }
    fn content_remote_id(&self) -> &str {
        &self.content.remote_id
    }
    fn content_type_id(&self) -> i64 {
        self.content.content_type_id
    }
    fn content_type_identifier(&self) -> Option<&str> {
        self.type_identifier
    }
    fn paths(&self) -> Vec<String> {
        self.locations.iter().map(|n| n.path.clone()).collect()
    }
    fn hidden(&self) -> Option<bool> {
        None
    }
}

impl NodeMatcher for MemoryRepository {
    fn match_nodes(&self, criteria: &MatchSpec) -> Result<NodeSet> {
        let criterion = Criterion::parse(criteria, Scope::Node)?;
        let mut matched = Vec::new();
        for id in self.locations.keys() {
            let node = self.load_node(*id)?;
            let parent_remote_id = node
                .parent_id
                .and_then(|pid| self.locations.get(&pid))
                .map(|r| r.remote_id.clone());
            let subject = NodeSubject {
                node: &node,
                parent_remote_id,
                type_identifier: self.type_identifier(node.content_info.content_type_id),
            };
            if criterion.matches(&subject) {
                matched.push(node);
            }
        }
        Ok(NodeSet::new(matched))
    }

    fn match_one_by_key(&self, key: &NodeKey) -> Result<Node> {
        match key {
            NodeKey::Id(id) => self.load_node(*id),
            NodeKey::RemoteId(remote_id) => {
                let hits: Vec<LocationId> = self
                    .locations
                    .values()
                    .filter(|r| &r.remote_id == remote_id)
                    .map(|r| r.id)
                    .collect();
                match hits.as_slice() {
                    [] => Err(StepError::NotFound {
                        entity: "location".to_string(),
                        key: remote_id.clone(),
                    }),
                    [id] => self.load_node(*id),
                    _ => Err(StepError::AmbiguousKey {
                        key: remote_id.clone(),
                        matched: hits.len(),
                    }),
                }
            }
        }
    }
}

impl ContentMatcher for MemoryRepository {
    fn match_content(&self, criteria: &MatchSpec) -> Result<Vec<ContentInfo>> {
        let criterion = Criterion::parse(criteria, Scope::Content)?;
        let mut matched = Vec::new();
        for content in self.contents.values() {
            let locations = self
                .locations
                .values()
                .filter(|r| r.content_id == content.id)
                .map(|r| self.load_node(r.id))
                .collect::<Result<Vec<_>>>()?;
            let subject = ContentSubject {
                content,
                locations,
                type_identifier: self.type_identifier(content.content_type_id),
            };
            if criterion.matches(&subject) {
                matched.push(content.clone());
            }
        }
        Ok(matched)
    }
}

impl ContentTypeLookup for MemoryRepository {
    fn identifier_of(&self, content_type_id: i64) -> Result<String> {
        self.type_identifier(content_type_id)
            .map(str::to_string)
            .ok_or_else(|| StepError::NotFound {
                entity: "content type".to_string(),
                key: content_type_id.to_string(),
            })
    }
}
