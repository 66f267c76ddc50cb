//! Core types and utilities for the ASN.1 PER codec
//!
//! This crate provides the error type shared by every codec operation, the
//! backing containers behind all variable-length values, and the
//! constraint-carrying string types used to build protocol messages.

pub mod containers;
pub mod datatypes;
pub mod error;

pub use containers::{Array, BoundedArray, DynArray, ExtArray, Storage};
pub use error::{PerError, PerResult, ResultCode};
