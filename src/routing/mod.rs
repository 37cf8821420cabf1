//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (classifier for the active backend)
//!     → table.rs (ordered rules for that backend)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: RouteCategory (Unclassified when nothing matched)
//!
//! Table Compilation (at startup):
//!     BackendVariant
//!     → Compile the variant's rules in declared order
//!     → Freeze as immutable PatternTable
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same category
//! - First match wins (declaration order)

pub mod category;
pub mod matcher;
pub mod router;
pub mod table;

pub use category::{BackendVariant, RouteCategory};
pub use router::{item_id_from_path, video_item_id_from_path, RouteClassifier};
pub use table::PatternTable;
