//! Common types used throughout the index.

mod node_id;

pub use node_id::NodeId;

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Smallest order for which a split leaves both halves non-empty
pub const MIN_ORDER: usize = 3;

/// Default tree order (max children per internal node)
pub const DEFAULT_ORDER: usize = 4;

/// Tree configuration
///
/// The order `m` bounds every node to `m - 1` keys; an internal node holds
/// at most `m` children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Maximum children per internal node
    pub order: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

impl TreeConfig {
    /// Create a config with the given order (validated when the tree is built)
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    /// Check the order against [`MIN_ORDER`]
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER {
            return Err(IndexError::InvalidConfiguration {
                order: self.order,
                min: MIN_ORDER,
            });
        }
        Ok(())
    }

    /// Maximum keys a node may hold between operations
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Split point shared by leaf and internal splits
    pub(crate) fn split_index(&self) -> usize {
        self.order / 2
    }
}
