//! Validation layer: hard errors and advisory warnings per feature and block.

mod block;
mod validate;

pub use block::{check_block_tokens, legal_faces, validate_block, BlockReport};
pub use validate::{feature_extent, validate_feature, validate_features, ValidationResult};
