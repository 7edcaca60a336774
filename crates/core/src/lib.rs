//! Core bookkeeping logic for Khata.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations
//! live here.
//!
//! # Modules
//!
//! - `ledger` - Per-customer ledger reconstruction and balance aggregation
//! - `allocation` - Payment-to-invoice allocation planning
//! - `invoice` - Invoice totals, numbering, and status derivation
//! - `payment` - Payment domain types
//! - `customer` - Customer lifecycle (soft delete)
//! - `statement` - Text statement rendering of a built ledger

pub mod allocation;
pub mod customer;
pub mod invoice;
pub mod ledger;
pub mod payment;
pub mod statement;
