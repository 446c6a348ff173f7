pub mod content;
pub mod node;
pub mod sort;
pub mod step;

pub use content::{ContentInfo, ContentType};
pub use node::{LocationId, Node, NodeSet};
pub use sort::{SortField, SortOrder};
pub use step::{MatchSpec, ReferenceDeclaration, StepAction, StepDescription, StepParameters};
