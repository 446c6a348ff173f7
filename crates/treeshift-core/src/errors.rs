use treeshift_core_types::RunId;
use thiserror::Error;

/// Result type alias using StepError
pub type Result<T> = std::result::Result<T, StepError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure a step can raise maps onto one of these kinds. Each kind has
/// a stable code that orchestrators can branch on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Step shape
    MissingParameter,
    InvalidParameter,
    ConflictingDirective,
    UnsupportedOperation,

    // Matching
    NotFound,
    AmbiguousKey,
    InvalidCondition,

    // References
    UnresolvedReference,
    DuplicateReference,
    UnsupportedReferenceAttribute,

    // Sort codec
    UnknownSortField,
    UnknownSortOrder,

    // Tree mutation
    IllegalMove,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MissingParameter => "ERR_MISSING_PARAMETER",
            ExErrorKind::InvalidParameter => "ERR_INVALID_PARAMETER",
            ExErrorKind::ConflictingDirective => "ERR_CONFLICTING_DIRECTIVE",
            ExErrorKind::UnsupportedOperation => "ERR_UNSUPPORTED_OPERATION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousKey => "ERR_AMBIGUOUS_KEY",
            ExErrorKind::InvalidCondition => "ERR_INVALID_CONDITION",
            ExErrorKind::UnresolvedReference => "ERR_UNRESOLVED_REFERENCE",
            ExErrorKind::DuplicateReference => "ERR_DUPLICATE_REFERENCE",
            ExErrorKind::UnsupportedReferenceAttribute => "ERR_UNSUPPORTED_REFERENCE_ATTRIBUTE",
            ExErrorKind::UnknownSortField => "ERR_UNKNOWN_SORT_FIELD",
            ExErrorKind::UnknownSortOrder => "ERR_UNKNOWN_SORT_ORDER",
            ExErrorKind::IllegalMove => "ERR_ILLEGAL_MOVE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the step context an orchestrator needs to
/// report which step failed and why.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    action: Option<String>,
    step_index: Option<usize>,
    entity_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            action: None,
            step_index: None,
            entity_id: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add step action context
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Add step index context
    pub fn with_step_index(mut self, index: usize) -> Self {
        self.step_index = Some(index);
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(index) = self.step_index {
            write!(f, " step #{}", index)?;
        }
        if let Some(action) = &self.action {
            write!(f, " ({})", action)?;
        }
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while normalizing, resolving or executing a step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    // ===== Step Shape Errors =====
    /// A required field is absent
    #[error("Missing parameter '{parameter}' for {action}: {reason}")]
    MissingParameter {
        action: String,
        parameter: String,
        reason: String,
    },

    /// A field is present but has the wrong shape or type
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Two mutually exclusive directives were both given
    #[error("Conflicting directives: {reason}")]
    ConflictingDirective { reason: String },

    /// References were declared but the operand holds more than one node
    #[error("Cannot set references for {action}: {matched} locations match, references require exactly one")]
    AmbiguousReferenceTarget { action: String, matched: usize },

    /// References were declared but the operand is empty
    #[error("Cannot set references for {action}: no location matched")]
    NoReferenceTarget { action: String },

    /// Structurally invalid combination of step fields
    #[error("Unsupported operation: {reason}")]
    UnsupportedOperation { reason: String },

    /// The step mode is not one this executor handles
    #[error("Unsupported action: {action}")]
    UnsupportedAction { action: String },

    /// The step type is not one this executor handles
    #[error("Unsupported step type: {step_type}")]
    UnsupportedStepType { step_type: String },

    // ===== Matching Errors =====
    /// Key or id resolved to nothing
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// A key that must be unique resolved to several entities
    #[error("Key {key} matches {matched} locations")]
    AmbiguousKey { key: String, matched: usize },

    /// Match specification names an unknown condition or carries a bad value
    #[error("Invalid match condition '{condition}': {reason}")]
    InvalidCondition { condition: String, reason: String },

    // ===== Reference Errors =====
    /// Token names a reference that was never bound
    #[error("Reference not set: {identifier}")]
    UnresolvedReference { identifier: String },

    /// Identifier was already bound earlier in the run
    #[error("Reference already set: {identifier}")]
    DuplicateReference { identifier: String },

    /// Reference declaration names an attribute with no extractor
    #[error("Setting references for attribute '{attribute}' is not supported")]
    UnsupportedReferenceAttribute { attribute: String },

    // ===== Sort Codec Errors =====
    #[error("Unknown sort field: {value}")]
    UnknownSortField { value: String },

    #[error("Unknown sort order: {value}")]
    UnknownSortOrder { value: String },

    // ===== Tree Mutation Errors =====
    /// Move or swap would break the tree (cycle, root relocation)
    #[error("Illegal move of location {location_id}: {reason}")]
    IllegalMove { location_id: i64, reason: String },

    /// Failure reported by the node store itself
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    // ===== Generic Errors =====
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StepError {
    /// Canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            StepError::MissingParameter { .. } => ExErrorKind::MissingParameter,
            StepError::InvalidParameter { .. } => ExErrorKind::InvalidParameter,
            StepError::ConflictingDirective { .. }
            | StepError::AmbiguousReferenceTarget { .. } => ExErrorKind::ConflictingDirective,
            StepError::NoReferenceTarget { .. } | StepError::NotFound { .. } => {
                ExErrorKind::NotFound
            }
            StepError::UnsupportedOperation { .. }
            | StepError::UnsupportedAction { .. }
            | StepError::UnsupportedStepType { .. } => ExErrorKind::UnsupportedOperation,
            StepError::AmbiguousKey { .. } => ExErrorKind::AmbiguousKey,
            StepError::InvalidCondition { .. } => ExErrorKind::InvalidCondition,
            StepError::UnresolvedReference { .. } => ExErrorKind::UnresolvedReference,
            StepError::DuplicateReference { .. } => ExErrorKind::DuplicateReference,
            StepError::UnsupportedReferenceAttribute { .. } => {
                ExErrorKind::UnsupportedReferenceAttribute
            }
            StepError::UnknownSortField { .. } => ExErrorKind::UnknownSortField,
            StepError::UnknownSortOrder { .. } => ExErrorKind::UnknownSortOrder,
            StepError::IllegalMove { .. } => ExErrorKind::IllegalMove,
            StepError::Persistence { .. } => ExErrorKind::Persistence,
            StepError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    pub(crate) fn missing(
        action: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        StepError::MissingParameter {
            action: action.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        StepError::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

/// Conversion from StepError to ExError
///
/// The message keeps the domain wording; entity ids are lifted into the
/// structured field where the variant has one.
impl From<StepError> for ExError {
    fn from(err: StepError) -> Self {
        let base = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            StepError::NotFound { key, .. } | StepError::AmbiguousKey { key, .. } => {
                base.with_entity_id(key)
            }
            StepError::UnresolvedReference { identifier }
            | StepError::DuplicateReference { identifier } => base.with_entity_id(identifier),
            StepError::IllegalMove { location_id, .. } => {
                base.with_entity_id(location_id.to_string())
            }
            StepError::AmbiguousReferenceTarget { action, .. }
            | StepError::NoReferenceTarget { action }
            | StepError::MissingParameter { action, .. } => base.with_action(action),
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_target_maps_to_conflicting_directive() {
        let err = StepError::AmbiguousReferenceTarget {
            action: "load".to_string(),
            matched: 3,
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::ConflictingDirective);
        assert_eq!(ex.action(), Some("load"));
        assert!(ex.message().contains("3 locations match"));
    }

    #[test]
    fn test_display_includes_step_context() {
        let ex = ExError::new(ExErrorKind::NotFound)
            .with_step_index(4)
            .with_action("update")
            .with_message("location not found: 99");
        assert_eq!(
            ex.to_string(),
            "[ERR_NOT_FOUND] step #4 (update): location not found: 99"
        );
    }

    #[test]
    fn test_unsupported_variants_share_kind() {
        let kinds = [
            StepError::UnsupportedAction {
                action: "copy".to_string(),
            }
            .kind(),
            StepError::UnsupportedStepType {
                step_type: "content".to_string(),
            }
            .kind(),
            StepError::UnsupportedOperation {
                reason: "x".to_string(),
            }
            .kind(),
        ];
        assert!(kinds
            .iter()
            .all(|k| *k == ExErrorKind::UnsupportedOperation));
    }
}
