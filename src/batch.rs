//! Batch header, detail collection and the two summary records.
//!
//! A [`Batch`] renders as a descriptive record (type `0`), its detail records
//! in insertion order, and a batch control record (type `7`), separated by
//! CRLF. Rendering is only reachable through [`Batch::validate`], so a file
//! is never produced from data that failed validation.

use crate::error::{AbaError, Result};
use crate::transaction::{text, Transaction, TransactionDefaults};
use crate::money::Cents;
use crate::validation::{FieldError, Format, Validate, ValidationErrors, Validator, Violation};
use chrono::NaiveDateTime;
use log::{debug, warn};
use once_cell::sync::Lazy;

/// Line terminator between records.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Width of the descriptive and batch control records.
pub const RECORD_WIDTH: usize = 120;

/// Digits available to each total in the batch control record.
const TOTAL_WIDTH: usize = 10;

/// Digits available to the item count in the batch control record.
const COUNT_WIDTH: usize = 6;

/// One ABA file: batch header fields plus ordered transactions.
///
/// # Example
///
/// ```
/// use aba_direct_entry::{Batch, TransactionCode};
/// use chrono::NaiveDate;
///
/// let mut batch = Batch::with(|b| {
///     b.bsb = Some("013-999".into());
///     b.account_number = Some("123456".into());
///     b.financial_institution = Some("ANZ".into());
///     b.user_name = Some("Acme".into());
///     b.user_id = Some("1234".into());
///     b.description = Some("Payroll".into());
///     b.name_of_remitter = Some("Acme".into());
///     b.process_at = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(9, 0, 0));
/// });
///
/// batch.add_transaction(|t| {
///     t.bsb = Some("342-342".into());
///     t.account_number = Some("3244654".into());
///     t.amount = Some(10000);
///     t.account_name = Some("John Doe".into());
///     t.transaction_code = Some(TransactionCode::ExternallyInitiatedCredit);
///     t.lodgement_reference = Some("R435564".into());
/// });
///
/// let output = batch.render().unwrap();
/// assert_eq!(output.split("\r\n").count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// BSB of the funds account, e.g. `013-999`.
    pub bsb: Option<String>,

    /// Funds account number.
    pub account_number: Option<String>,

    /// Three letter bank mnemonic, e.g. `ANZ`.
    pub financial_institution: Option<String>,

    /// Name of the user supplying the file.
    pub user_name: Option<String>,

    /// Direct Entry user ID.
    pub user_id: Option<String>,

    /// Description of the payments, e.g. `Payroll`.
    pub description: Option<String>,

    /// When the payments are to be processed.
    pub process_at: Option<NaiveDateTime>,

    /// Remitter name inherited by new transactions.
    pub name_of_remitter: Option<String>,

    transactions: Vec<Transaction>,
}

/// Aggregate amounts over every transaction in a batch, in signed cents.
///
/// Sums are kept in `i128` so no set of `i64` amounts can overflow them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    /// Sum of all amounts.
    pub net: i128,

    /// Sum of positive amounts. Never negative.
    pub credit: i128,

    /// Sum of negative amounts. Never positive.
    pub debit: i128,

    /// Number of transactions.
    pub count: usize,
}

static BATCH_VALIDATOR: Lazy<Validator<Batch>> = Lazy::new(|| {
    Validator::<Batch>::new()
        .presence("bsb", |b| &b.bsb)
        .presence("financial_institution", |b| &b.financial_institution)
        .presence("user_name", |b| &b.user_name)
        .presence("user_id", |b| &b.user_id)
        .presence("description", |b| &b.description)
        .presence("process_at", |b| &b.process_at)
        .format("bsb", |b| &b.bsb, Format::Bsb)
        .format("account_number", |b| &b.account_number, Format::MaxLength(9))
        .format(
            "financial_institution",
            |b| &b.financial_institution,
            Format::Length(3),
        )
        .format("user_name", |b| &b.user_name, Format::MaxLength(26))
        .format("user_id", |b| &b.user_id, Format::Numeric)
        .format("user_id", |b| &b.user_id, Format::MaxLength(6))
        .format("description", |b| &b.description, Format::MaxLength(12))
        .format("bsb", |b| &b.bsb, Format::Ascii)
        .format("account_number", |b| &b.account_number, Format::Ascii)
        .format(
            "financial_institution",
            |b| &b.financial_institution,
            Format::Ascii,
        )
        .format("user_name", |b| &b.user_name, Format::Ascii)
        .format("description", |b| &b.description, Format::Ascii)
});

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Batch::default()
    }

    /// Creates a batch and hands it to `setup` once before any transactions
    /// exist.
    pub fn with<F>(setup: F) -> Self
    where
        F: FnOnce(&mut Batch),
    {
        let mut batch = Batch::new();
        setup(&mut batch);
        batch
    }

    /// Appends a transaction configured by `configure`.
    ///
    /// The new transaction starts with the batch's current BSB, account
    /// number and remitter name as its trace details.
    pub fn add_transaction<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut Transaction),
    {
        let mut transaction = Transaction::new(self.transaction_defaults());
        configure(&mut transaction);

        debug!(
            "Adding transaction {}: ${} to {}",
            self.transactions.len(),
            Cents::new(transaction.amount()),
            text(&transaction.account_number)
        );
        self.transactions.push(transaction);
    }

    /// Transactions in the order they were added.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    fn transaction_defaults(&self) -> TransactionDefaults {
        TransactionDefaults {
            trace_bsb: self.bsb.clone(),
            trace_account_number: self.account_number.clone(),
            name_of_remitter: self.name_of_remitter.clone(),
        }
    }

    /// Computes net, credit and debit totals in a single pass.
    pub fn totals(&self) -> BatchTotals {
        let mut totals = BatchTotals {
            count: self.transactions.len(),
            ..BatchTotals::default()
        };

        for transaction in &self.transactions {
            let amount = i128::from(transaction.amount());
            totals.net += amount;
            if amount > 0 {
                totals.credit += amount;
            } else if amount < 0 {
                totals.debit += amount;
            }
        }

        totals
    }

    /// Totals and item count that would not fit their trailer columns.
    fn total_errors(&self) -> Vec<FieldError> {
        let totals = self.totals();
        let width = Format::MaxLength(TOTAL_WIDTH);
        let mut errors = Vec::new();

        for (field, value) in [
            ("net_total", totals.net),
            ("credit_total", totals.credit),
            ("debit_total", totals.debit),
        ] {
            if !width.matches(&value.unsigned_abs().to_string()) {
                errors.push(FieldError::new(field, Violation::Format(width)));
            }
        }

        let count_width = Format::MaxLength(COUNT_WIDTH);
        if !count_width.matches(&totals.count.to_string()) {
            errors.push(FieldError::new("item_count", Violation::Format(count_width)));
        }

        errors
    }

    /// Checks the batch and every transaction, returning a handle that can
    /// render the file.
    pub fn validate(&self) -> Result<ValidBatch<'_>> {
        let errors = self.errors();
        if !errors.is_empty() {
            warn!("Batch failed validation with {} error(s)", errors.len());
            return Err(AbaError::Invalid(ValidationErrors::from(errors)));
        }

        Ok(ValidBatch { batch: self })
    }

    /// Validates and renders the complete file.
    pub fn render(&self) -> Result<String> {
        Ok(self.validate()?.render())
    }
}

impl Validate for Batch {
    fn validator() -> &'static Validator<Self> {
        &BATCH_VALIDATOR
    }

    /// Header violations, then totals too wide for the trailer, then those
    /// of every transaction tagged with the transaction's position.
    fn errors(&self) -> Vec<FieldError> {
        let mut errors = Self::validator().evaluate(self);
        errors.extend(self.total_errors());

        for (index, transaction) in self.transactions.iter().enumerate() {
            errors.extend(
                transaction
                    .errors()
                    .into_iter()
                    .map(|e| e.in_transaction(index)),
            );
        }

        errors
    }
}

/// A batch that passed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidBatch<'a> {
    batch: &'a Batch,
}

impl ValidBatch<'_> {
    /// Renders the descriptive record, every detail record and the batch
    /// control record, joined by CRLF.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.batch.transactions.len() + 2);

        lines.push(self.descriptive_record());
        lines.extend(self.batch.transactions.iter().map(Transaction::render));
        lines.push(self.batch_control_record());

        debug!(
            "Rendered batch with {} transaction(s)",
            self.batch.transactions.len()
        );
        lines.join(LINE_TERMINATOR)
    }

    /// Type `0` record.
    pub fn descriptive_record(&self) -> String {
        let b = self.batch;
        let mut s = String::with_capacity(RECORD_WIDTH);

        s.push('0');
        s.push_str(&format!("{:<7}", text(&b.bsb)));
        s.push_str(&format!("{:<9}", text(&b.account_number)));
        s.push(' ');
        // Sequence number
        s.push_str("01");
        s.push_str(text(&b.financial_institution));
        s.push_str(&" ".repeat(7));
        s.push_str(&format!("{:<26}", text(&b.user_name)));
        s.push_str(&format!("{:0>6}", text(&b.user_id)));
        s.push_str(&format!("{:<12}", text(&b.description)));
        if let Some(process_at) = b.process_at {
            s.push_str(&process_at.format("%d%m%y%H%M").to_string());
        }
        s.push_str(&" ".repeat(36));

        s
    }

    /// Type `7` record.
    pub fn batch_control_record(&self) -> String {
        let totals = self.batch.totals();
        let mut s = String::with_capacity(RECORD_WIDTH);

        s.push('7');
        // BSB format filler
        s.push_str("999-999");
        s.push_str(&" ".repeat(12));
        s.push_str(&format!("{:0>10}", totals.net.unsigned_abs()));
        s.push_str(&format!("{:0>10}", totals.credit.unsigned_abs()));
        s.push_str(&format!("{:0>10}", totals.debit.unsigned_abs()));
        s.push_str(&" ".repeat(24));
        s.push_str(&format!("{:0>6}", totals.count));
        s.push_str(&" ".repeat(40));

        s
    }
}
