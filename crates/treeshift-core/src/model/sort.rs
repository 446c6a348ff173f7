use serde::{Deserialize, Serialize};

/// Internal ordering code for a location's children
///
/// Discriminants are the repository's stored codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    Path = 1,
    Published = 2,
    Modified = 3,
    Section = 4,
    Depth = 5,
    ClassIdentifier = 6,
    ClassName = 7,
    Priority = 8,
    Name = 9,
    ModifiedSubnode = 10,
    NodeId = 11,
    ContentObjectId = 12,
}

impl SortField {
    pub const ALL: [SortField; 12] = [
        SortField::Path,
        SortField::Published,
        SortField::Modified,
        SortField::Section,
        SortField::Depth,
        SortField::ClassIdentifier,
        SortField::ClassName,
        SortField::Priority,
        SortField::Name,
        SortField::ModifiedSubnode,
        SortField::NodeId,
        SortField::ContentObjectId,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }
}

/// Internal ordering direction code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Desc = 0,
    Asc = 1,
}

impl SortOrder {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SortOrder::Desc),
            1 => Some(SortOrder::Asc),
            _ => None,
        }
    }
}
