//! # ABA Direct Entry
//!
//! Builds, validates and renders payment batches in the Australian Bankers'
//! Association Direct Entry format: fixed-width, 120 column, CRLF separated
//! records consumed by Australian banks.
//!
//! ## Design Principles
//!
//! - **Collected validation**: every field of the batch and of every
//!   transaction is checked and all violations are reported together
//! - **Validate before render**: a file can only be rendered from a
//!   [`ValidBatch`], so malformed records are never produced
//! - **Integer cents**: amounts are `i64` cents; dollar input is parsed with
//!   `rust_decimal`
//! - **Deterministic output**: records appear in insertion order and totals
//!   are recomputed on every render
//!
//! ## Example
//!
//! ```no_run
//! use aba_direct_entry::read_batch;
//! use std::fs::File;
//!
//! let batch = read_batch(File::open("header.csv")?, File::open("transactions.csv")?)?;
//! print!("{}", batch.render()?);
//! # Ok::<(), aba_direct_entry::AbaError>(())
//! ```

pub mod batch;
pub mod error;
pub mod input;
pub mod money;
pub mod transaction;
pub mod validation;

pub use batch::{Batch, BatchTotals, ValidBatch, LINE_TERMINATOR};
pub use error::{AbaError, Result};
pub use input::{read_batch, HeaderRow, TransactionRow};
pub use money::{AmountError, Cents};
pub use transaction::{Indicator, Transaction, TransactionCode, TransactionDefaults};
pub use validation::{
    FieldError, FieldValue, Format, Validate, ValidationErrors, Validator, Violation,
};
