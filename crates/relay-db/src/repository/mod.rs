//! # Repository Module
//!
//! Data access implementations for the two sides of the sync loop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Responsibilities                          │
//! │                                                                         │
//! │  PageReader     ← Paginated reads of host-supplied SELECT queries      │
//! │  ShadowWriter   ← Transactional insert-or-replace into shadow tables   │
//! │                                                                         │
//! │  Both borrow a clone of the Store's pool; neither owns schema.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod page;
pub mod shadow;
