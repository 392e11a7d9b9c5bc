//! CSV input for the command line encoder.
//!
//! A batch is described by two CSV files: a header file with exactly one
//! data row of batch fields, and a transactions file with one row per
//! detail record. Amounts are written in dollars.

use crate::batch::Batch;
use crate::error::{AbaError, Result};
use crate::money::Cents;
use crate::transaction::{Indicator, Transaction, TransactionCode};
use crate::validation::FieldValue;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;
use std::io::Read;

/// Accepted layouts for `process_at`.
const PROCESS_AT_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Raw batch header row.
#[derive(Debug, Deserialize)]
pub struct HeaderRow {
    pub bsb: Option<String>,
    pub account_number: Option<String>,
    pub financial_institution: Option<String>,
    pub user_name: Option<String>,
    pub user_id: Option<String>,
    pub description: Option<String>,

    /// `YYYY-MM-DD HH:MM`
    pub process_at: Option<String>,

    #[serde(default)]
    pub name_of_remitter: Option<String>,
}

impl HeaderRow {
    /// Builds an empty batch from the header fields.
    pub fn into_batch(self, row: usize) -> Result<Batch> {
        let process_at = match non_blank(self.process_at) {
            Some(value) => Some(parse_process_at(&value).ok_or_else(|| {
                AbaError::InvalidRecord {
                    row,
                    message: format!("unrecognised process_at '{}'", value),
                }
            })?),
            None => None,
        };

        Ok(Batch::with(|b| {
            b.bsb = non_blank(self.bsb);
            b.account_number = non_blank(self.account_number);
            b.financial_institution = non_blank(self.financial_institution);
            b.user_name = non_blank(self.user_name);
            b.user_id = non_blank(self.user_id);
            b.description = non_blank(self.description);
            b.process_at = process_at;
            b.name_of_remitter = non_blank(self.name_of_remitter);
        }))
    }
}

/// Raw transaction row.
///
/// Trace details and remitter name are optional; when absent the batch's
/// values are kept.
#[derive(Debug, Deserialize)]
pub struct TransactionRow {
    pub bsb: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,

    /// Dollars, negative for debits.
    pub amount: Option<String>,

    pub transaction_code: Option<String>,
    pub lodgement_reference: Option<String>,

    #[serde(default)]
    pub indicator: Option<String>,

    /// Dollars.
    #[serde(default)]
    pub withholding_amount: Option<String>,

    #[serde(default)]
    pub trace_bsb: Option<String>,

    #[serde(default)]
    pub trace_account_number: Option<String>,

    #[serde(default)]
    pub name_of_remitter: Option<String>,
}

/// A transaction row with its typed fields parsed.
#[derive(Debug)]
pub struct ParsedRow {
    amount: Option<i64>,
    withholding_amount: Option<i64>,
    transaction_code: Option<TransactionCode>,
    indicator: Option<Indicator>,
    row: TransactionRow,
}

impl TransactionRow {
    /// Parses amounts and codes. Blank fields stay unset so validation can
    /// report them.
    pub fn parse(self, row: usize) -> Result<ParsedRow> {
        let invalid = |message: String| AbaError::InvalidRecord { row, message };

        let amount = parse_cents(&self.amount)
            .map_err(|e| invalid(format!("amount: {}", e)))?;
        let withholding_amount = parse_cents(&self.withholding_amount)
            .map_err(|e| invalid(format!("withholding_amount: {}", e)))?;
        let transaction_code =
            parse_field::<TransactionCode>(&self.transaction_code).map_err(invalid)?;
        let indicator = parse_field::<Indicator>(&self.indicator).map_err(invalid)?;

        Ok(ParsedRow {
            amount,
            withholding_amount,
            transaction_code,
            indicator,
            row: self,
        })
    }
}

impl ParsedRow {
    /// Copies the row onto a transaction created by the batch.
    pub fn apply(self, t: &mut Transaction) {
        let row = self.row;

        t.bsb = non_blank(row.bsb);
        t.account_number = non_blank(row.account_number);
        t.account_name = non_blank(row.account_name);
        t.lodgement_reference = non_blank(row.lodgement_reference);
        t.amount = self.amount;
        t.withholding_amount = self.withholding_amount;
        t.transaction_code = self.transaction_code;
        t.indicator = self.indicator;

        if let Some(trace_bsb) = non_blank(row.trace_bsb) {
            t.trace_bsb = Some(trace_bsb);
        }
        if let Some(trace_account_number) = non_blank(row.trace_account_number) {
            t.trace_account_number = Some(trace_account_number);
        }
        if let Some(name_of_remitter) = non_blank(row.name_of_remitter) {
            t.name_of_remitter = Some(name_of_remitter);
        }
    }
}

/// Reads the header file and the transactions file into a batch.
///
/// Rows are numbered from 2 in errors, counting the CSV header line as 1.
pub fn read_batch<H: Read, T: Read>(header: H, transactions: T) -> Result<Batch> {
    let mut header_reader = csv_reader(header);
    let header_row: HeaderRow = header_reader
        .deserialize::<HeaderRow>()
        .next()
        .ok_or(AbaError::MissingHeader)??;
    let mut batch = header_row.into_batch(2)?;

    let mut tx_reader = csv_reader(transactions);
    for (row_idx, result) in tx_reader.deserialize::<TransactionRow>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let parsed = result?.parse(row_num)?;
        batch.add_transaction(|t| parsed.apply(t));
    }

    debug!("Read batch with {} transaction(s)", batch.transactions().len());
    Ok(batch)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_blank())
}

fn parse_cents(value: &Option<String>) -> std::result::Result<Option<i64>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<Cents>()
            .map(|c| Some(c.get()))
            .map_err(|e| e.to_string()),
    }
}

fn parse_field<F>(value: &Option<String>) -> std::result::Result<Option<F>, String>
where
    F: std::str::FromStr<Err = String>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<F>().map(Some),
    }
}

fn parse_process_at(value: &str) -> Option<NaiveDateTime> {
    PROCESS_AT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
}
