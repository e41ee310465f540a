//! Core types shared across the staged tree.

use std::sync::Arc;

/// Hash: Generic 256-bit hash value
pub type Hash = [u8; 32];

/// Content: Immutable, cheaply clonable file bytes
pub type Content = Arc<[u8]>;
