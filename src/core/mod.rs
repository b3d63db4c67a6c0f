//! Core business logic - framework-agnostic consolidation, allocation, and
//! validation operations.

/// Fee allocation rule splitting a line's fee between collaborator and company
pub mod allocation;
/// The consolidation engine and the totals derivation routine
pub mod consolidation;
/// Per-summary exclusive-lock registry
pub mod locks;
/// Summary record queries and creation
pub mod rcc;
/// Detail record queries and insertion
pub mod rcc_detail;
/// Boundary validation for submitted detail lines
pub mod validate;
