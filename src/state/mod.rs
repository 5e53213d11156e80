//! Review state (pure).
//!
//! All state transitions are pure functions testable without any I/O.

/// Reviewer approvals and the display rule.
pub mod approval;
/// Active highlight and request generations.
pub mod highlight;
/// QA navigation over rows.
pub mod navigation;
/// Reconciliation session reducers.
pub mod session;

// Re-export for convenience
pub use approval::{display_value, ApprovalMap, UNRESOLVED};
pub use highlight::{HighlightState, HighlightTicket, Settled};
pub use navigation::{focus_key, next_field, prev_field, FieldFocus, NavigationScope, QaNavigation};
pub use session::ReconciliationSession;
