//! Error types for tree mutation and document validation

use quire_common::{CodedError, ErrorCode, Namespace};
use serde_json::{json, Value};
use thiserror::Error;

use crate::BlockType;

/// Errors raised by the document tree and the validation pipeline.
///
/// Every operation validates before mutating, so an `Err` always means the
/// tree is unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    // --- insertion ---
    #[error("Block {block_id} already exists in the document")]
    BlockAlreadyExists { block_id: String },

    #[error("Block ID must be a non-empty string")]
    InvalidBlockId { parent_id: String },

    #[error("Block {block_id} appears more than once in its own subtree")]
    DuplicateOrCircularBlock { block_id: String },

    #[error("Parent block {parent_id} not found")]
    InvalidParentBlock { parent_id: String },

    #[error("Parent block {parent_id} of type {parent_type} cannot have children")]
    ParentBlockCannotHaveChildren {
        parent_id: String,
        parent_type: BlockType,
    },

    #[error("Cannot insert before the document root")]
    CannotInsertBeforeRoot,

    #[error("Cannot insert after the document root")]
    CannotInsertAfterRoot,

    #[error("Target block {target_id} not found")]
    TargetBlockNotFound { target_id: String },

    #[error("Parent {parent_id} of target block {target_id} not found")]
    ParentOfTargetNotFound { target_id: String, parent_id: String },

    #[error("Parent {parent_id} of target block {target_id} cannot have children")]
    ParentOfTargetCannotHaveChildren { target_id: String, parent_id: String },

    #[error("Target block {target_id} is not listed in the children of {parent_id}")]
    TargetNotInParentChildren { target_id: String, parent_id: String },

    // --- removal ---
    #[error("Cannot remove the document root")]
    CannotRemoveRoot,

    #[error("Block to remove {block_id} not found")]
    BlockToRemoveNotFound { block_id: String },

    #[error("Parent {parent_id} of block to remove {block_id} not found")]
    BlockToRemoveHasNoParent { block_id: String, parent_id: String },

    #[error("Parent {parent_id} of block to remove {block_id} cannot have children")]
    BlockToRemoveParentCannotHaveChildren { block_id: String, parent_id: String },

    #[error("Block {block_id} is not listed in the children of {parent_id}")]
    BlockNotInParentChildren { block_id: String, parent_id: String },

    // --- update ---
    #[error("Cannot update the document root")]
    CannotUpdateRoot,

    #[error("Block to update {block_id} not found")]
    BlockToUpdateNotFound { block_id: String },

    #[error("Parent {parent_id} of block to update {block_id} not found")]
    BlockToUpdateHasNoParent { block_id: String, parent_id: String },

    #[error("Parent {parent_id} of block to update {block_id} cannot have children")]
    BlockToUpdateParentCannotHaveChildren { block_id: String, parent_id: String },

    #[error("New block ID {new_id} collides with an existing block (updating {block_id})")]
    BlockIdConflict { block_id: String, new_id: String },

    #[error("Cannot preserve children: new block type {new_type} cannot have children")]
    CannotPreserveChildrenOnTarget { block_id: String, new_type: BlockType },

    #[error("Cannot preserve children: block {block_id} of type {old_type} has no children")]
    CannotPreserveFromChildlessSource { block_id: String, old_type: BlockType },

    #[error("Replace strategy needs container blocks on both sides ({old_type} -> {new_type})")]
    ReplaceStrategyNotApplicable {
        block_id: String,
        old_type: BlockType,
        new_type: BlockType,
    },

    #[error("Replace strategy: new block type {new_type} cannot have children")]
    ReplaceStrategyTargetCannotHaveChildren { block_id: String, new_type: BlockType },

    #[error("Replace strategy: block {block_id} of type {old_type} has no children")]
    ReplaceStrategySourceHasNoChildren { block_id: String, old_type: BlockType },

    #[error("Replace strategy: new block for {block_id} does not supply children")]
    ReplaceStrategyMissingNewChildren { block_id: String },

    // --- move ---
    #[error("Cannot move block {block_id} relative to itself")]
    CannotMoveBlockToItself { block_id: String },

    #[error("Cannot move the document root")]
    CannotMoveRoot,

    #[error("Cannot place a block before or after the document root")]
    CannotMoveRelativeToRoot { block_id: String },

    #[error("Block to move {block_id} not found")]
    BlockToMoveNotFound { block_id: String },

    #[error("Move target {target_id} not found")]
    MoveTargetNotFound { target_id: String },

    #[error("Move target {target_id} of type {target_type} cannot have children")]
    MoveTargetCannotHaveChildren {
        target_id: String,
        target_type: BlockType,
    },

    #[error("Cannot move block {block_id} into its own descendant {target_id}")]
    CannotMoveBlockToDescendant { block_id: String, target_id: String },

    // --- queries ---
    #[error("Block {block_id} not found")]
    BlockNotFound { block_id: String },

    // --- validation pipeline ---
    #[error("Invalid document JSON: {reason}")]
    InvalidDocumentJson { reason: String },

    #[error("Invalid document structure: {reason}")]
    InvalidDocumentStructure { reason: String },

    #[error("Document root ID must be \"root\", found {found:?}")]
    InvalidDocumentRootId { found: String },

    #[error("Parent block {parent_id} of block {block_id} not found")]
    ParentBlockNotFound { block_id: String, parent_id: String },

    #[error("Block {block_id} has parentId {found:?} but is a child of {expected}")]
    InvalidBlockParentId {
        block_id: String,
        expected: String,
        found: Option<String>,
    },

    #[error("Block {block_id} has invalid type {found}")]
    InvalidBlockType { block_id: String, found: String },

    #[error("Block {block_id} has invalid {block_type} data: {reason}")]
    InvalidBlockVariant {
        block_id: String,
        block_type: BlockType,
        reason: String,
    },

    #[error("Block {block_id} has invalid children: {reason}")]
    InvalidBlockChildren { block_id: String, reason: String },

    #[error("Document tree is inconsistent: {reason}")]
    InconsistentTree { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DocumentError {
    fn name(&self) -> &'static str {
        match self {
            DocumentError::BlockAlreadyExists { .. } => "BLOCK_ALREADY_EXISTS",
            DocumentError::InvalidBlockId { .. } => "INVALID_BLOCK_ID",
            DocumentError::DuplicateOrCircularBlock { .. } => "DUPLICATE_OR_CIRCULAR_BLOCK",
            DocumentError::InvalidParentBlock { .. } => "INVALID_PARENT_BLOCK",
            DocumentError::ParentBlockCannotHaveChildren { .. } => {
                "PARENT_BLOCK_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::CannotInsertBeforeRoot => "CANNOT_INSERT_BEFORE_ROOT",
            DocumentError::CannotInsertAfterRoot => "CANNOT_INSERT_AFTER_ROOT",
            DocumentError::TargetBlockNotFound { .. } => "TARGET_BLOCK_NOT_FOUND",
            DocumentError::ParentOfTargetNotFound { .. } => "PARENT_OF_TARGET_NOT_FOUND",
            DocumentError::ParentOfTargetCannotHaveChildren { .. } => {
                "PARENT_OF_TARGET_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::TargetNotInParentChildren { .. } => "TARGET_NOT_IN_PARENT_CHILDREN",
            DocumentError::CannotRemoveRoot => "CANNOT_REMOVE_ROOT",
            DocumentError::BlockToRemoveNotFound { .. } => "BLOCK_TO_REMOVE_NOT_FOUND",
            DocumentError::BlockToRemoveHasNoParent { .. } => "BLOCK_TO_REMOVE_HAS_NO_PARENT",
            DocumentError::BlockToRemoveParentCannotHaveChildren { .. } => {
                "BLOCK_TO_REMOVE_PARENT_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::BlockNotInParentChildren { .. } => "BLOCK_NOT_IN_PARENT_CHILDREN",
            DocumentError::CannotUpdateRoot => "CANNOT_UPDATE_ROOT",
            DocumentError::BlockToUpdateNotFound { .. } => "BLOCK_TO_UPDATE_NOT_FOUND",
            DocumentError::BlockToUpdateHasNoParent { .. } => "BLOCK_TO_UPDATE_HAS_NO_PARENT",
            DocumentError::BlockToUpdateParentCannotHaveChildren { .. } => {
                "BLOCK_TO_UPDATE_PARENT_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::BlockIdConflict { .. } => "BLOCK_ID_CONFLICT",
            DocumentError::CannotPreserveChildrenOnTarget { .. } => {
                "CANNOT_PRESERVE_CHILDREN_ON_TARGET"
            }
            DocumentError::CannotPreserveFromChildlessSource { .. } => {
                "CANNOT_PRESERVE_FROM_CHILDLESS_SOURCE"
            }
            DocumentError::ReplaceStrategyNotApplicable { .. } => "REPLACE_STRATEGY_NOT_APPLICABLE",
            DocumentError::ReplaceStrategyTargetCannotHaveChildren { .. } => {
                "REPLACE_STRATEGY_TARGET_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::ReplaceStrategySourceHasNoChildren { .. } => {
                "REPLACE_STRATEGY_SOURCE_HAS_NO_CHILDREN"
            }
            DocumentError::ReplaceStrategyMissingNewChildren { .. } => {
                "REPLACE_STRATEGY_MISSING_NEW_CHILDREN"
            }
            DocumentError::CannotMoveBlockToItself { .. } => "CANNOT_MOVE_BLOCK_TO_ITSELF",
            DocumentError::CannotMoveRoot => "CANNOT_MOVE_ROOT",
            DocumentError::CannotMoveRelativeToRoot { .. } => "CANNOT_MOVE_RELATIVE_TO_ROOT",
            DocumentError::BlockToMoveNotFound { .. } => "BLOCK_TO_MOVE_NOT_FOUND",
            DocumentError::MoveTargetNotFound { .. } => "MOVE_TARGET_NOT_FOUND",
            DocumentError::MoveTargetCannotHaveChildren { .. } => {
                "MOVE_TARGET_CANNOT_HAVE_CHILDREN"
            }
            DocumentError::CannotMoveBlockToDescendant { .. } => "CANNOT_MOVE_BLOCK_TO_DESCENDANT",
            DocumentError::BlockNotFound { .. } => "BLOCK_NOT_FOUND",
            DocumentError::InvalidDocumentJson { .. } => "INVALID_DOCUMENT_JSON",
            DocumentError::InvalidDocumentStructure { .. } => "INVALID_DOCUMENT_STRUCTURE",
            DocumentError::InvalidDocumentRootId { .. } => "INVALID_DOCUMENT_ROOT_ID",
            DocumentError::ParentBlockNotFound { .. } => "PARENT_BLOCK_NOT_FOUND",
            DocumentError::InvalidBlockParentId { .. } => "INVALID_BLOCK_PARENT_ID",
            DocumentError::InvalidBlockType { .. } => "INVALID_BLOCK_TYPE",
            DocumentError::InvalidBlockVariant { .. } => "INVALID_BLOCK_VARIANT",
            DocumentError::InvalidBlockChildren { .. } => "INVALID_BLOCK_CHILDREN",
            DocumentError::InconsistentTree { .. } => "INCONSISTENT_TREE",
            DocumentError::Serialization(_) => "SERIALIZATION",
        }
    }
}

impl CodedError for DocumentError {
    fn code(&self) -> ErrorCode {
        ErrorCode::new(Namespace::Document, self.name())
    }

    fn context(&self) -> Value {
        match self {
            DocumentError::BlockAlreadyExists { block_id }
            | DocumentError::DuplicateOrCircularBlock { block_id }
            | DocumentError::BlockToRemoveNotFound { block_id }
            | DocumentError::BlockToUpdateNotFound { block_id }
            | DocumentError::ReplaceStrategyMissingNewChildren { block_id }
            | DocumentError::CannotMoveBlockToItself { block_id }
            | DocumentError::CannotMoveRelativeToRoot { block_id }
            | DocumentError::BlockToMoveNotFound { block_id }
            | DocumentError::BlockNotFound { block_id } => json!({ "blockId": block_id }),

            DocumentError::InvalidBlockId { parent_id }
            | DocumentError::InvalidParentBlock { parent_id } => json!({ "parentId": parent_id }),

            DocumentError::ParentBlockCannotHaveChildren {
                parent_id,
                parent_type,
            } => json!({ "parentId": parent_id, "parentType": parent_type }),

            DocumentError::TargetBlockNotFound { target_id }
            | DocumentError::MoveTargetNotFound { target_id } => json!({ "targetId": target_id }),

            DocumentError::ParentOfTargetNotFound {
                target_id,
                parent_id,
            }
            | DocumentError::ParentOfTargetCannotHaveChildren {
                target_id,
                parent_id,
            }
            | DocumentError::TargetNotInParentChildren {
                target_id,
                parent_id,
            } => json!({ "targetId": target_id, "parentId": parent_id }),

            DocumentError::BlockToRemoveHasNoParent {
                block_id,
                parent_id,
            }
            | DocumentError::BlockToRemoveParentCannotHaveChildren {
                block_id,
                parent_id,
            }
            | DocumentError::BlockNotInParentChildren {
                block_id,
                parent_id,
            }
            | DocumentError::BlockToUpdateHasNoParent {
                block_id,
                parent_id,
            }
            | DocumentError::BlockToUpdateParentCannotHaveChildren {
                block_id,
                parent_id,
            }
            | DocumentError::ParentBlockNotFound {
                block_id,
                parent_id,
            } => json!({ "blockId": block_id, "parentId": parent_id }),

            DocumentError::BlockIdConflict { block_id, new_id } => {
                json!({ "blockId": block_id, "newId": new_id })
            }

            DocumentError::CannotPreserveChildrenOnTarget { block_id, new_type }
            | DocumentError::ReplaceStrategyTargetCannotHaveChildren { block_id, new_type } => {
                json!({ "blockId": block_id, "newType": new_type })
            }

            DocumentError::CannotPreserveFromChildlessSource { block_id, old_type }
            | DocumentError::ReplaceStrategySourceHasNoChildren { block_id, old_type } => {
                json!({ "blockId": block_id, "oldType": old_type })
            }

            DocumentError::ReplaceStrategyNotApplicable {
                block_id,
                old_type,
                new_type,
            } => json!({ "blockId": block_id, "oldType": old_type, "newType": new_type }),

            DocumentError::MoveTargetCannotHaveChildren {
                target_id,
                target_type,
            } => json!({ "targetId": target_id, "targetType": target_type }),

            DocumentError::CannotMoveBlockToDescendant {
                block_id,
                target_id,
            } => json!({ "blockId": block_id, "targetId": target_id }),

            DocumentError::InvalidDocumentRootId { found } => json!({ "found": found }),

            DocumentError::InvalidBlockParentId {
                block_id,
                expected,
                found,
            } => json!({ "blockId": block_id, "expected": expected, "found": found }),

            DocumentError::InvalidBlockType { block_id, found } => {
                json!({ "blockId": block_id, "found": found })
            }

            DocumentError::InvalidBlockVariant {
                block_id,
                block_type,
                reason,
            } => json!({ "blockId": block_id, "blockType": block_type, "reason": reason }),

            DocumentError::InvalidBlockChildren { block_id, reason } => {
                json!({ "blockId": block_id, "reason": reason })
            }

            DocumentError::InvalidDocumentJson { reason }
            | DocumentError::InvalidDocumentStructure { reason }
            | DocumentError::InconsistentTree { reason } => json!({ "reason": reason }),

            DocumentError::CannotInsertBeforeRoot
            | DocumentError::CannotInsertAfterRoot
            | DocumentError::CannotRemoveRoot
            | DocumentError::CannotUpdateRoot
            | DocumentError::CannotMoveRoot => json!({}),

            DocumentError::Serialization(reason) => json!({ "reason": reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_namespaced() {
        let err = DocumentError::InvalidParentBlock {
            parent_id: "p".to_string(),
        };
        assert_eq!(err.code().to_string(), "DOCUMENT:INVALID_PARENT_BLOCK");
        assert_eq!(err.context(), json!({ "parentId": "p" }));
    }

    #[test]
    fn test_context_uses_camel_case_keys() {
        let err = DocumentError::CannotMoveBlockToDescendant {
            block_id: "b".to_string(),
            target_id: "c".to_string(),
        };
        assert_eq!(err.context(), json!({ "blockId": "b", "targetId": "c" }));
        assert_eq!(err.to_string(), "Cannot move block b into its own descendant c");
    }
}
