//! Detail (type `1`) records: one payment or debit line item.

use crate::validation::{FieldValue, Format, Validate, Validator};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Direct Entry transaction codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionCode {
    /// 13: externally initiated debit.
    ExternallyInitiatedDebit,
    /// 50: externally initiated credit.
    ExternallyInitiatedCredit,
    /// 51: Australian Government security interest.
    AustralianGovernmentSecurityInterest,
    /// 52: family allowance.
    FamilyAllowance,
    /// 53: pay.
    Pay,
    /// 54: pension.
    Pension,
    /// 55: allotment.
    Allotment,
    /// 56: dividend.
    Dividend,
    /// 57: debenture or note interest.
    DebentureNoteInterest,
}

impl TransactionCode {
    /// The two-digit code written into the record.
    pub fn code(self) -> &'static str {
        match self {
            TransactionCode::ExternallyInitiatedDebit => "13",
            TransactionCode::ExternallyInitiatedCredit => "50",
            TransactionCode::AustralianGovernmentSecurityInterest => "51",
            TransactionCode::FamilyAllowance => "52",
            TransactionCode::Pay => "53",
            TransactionCode::Pension => "54",
            TransactionCode::Allotment => "55",
            TransactionCode::Dividend => "56",
            TransactionCode::DebentureNoteInterest => "57",
        }
    }

    /// Returns `true` for the debit code.
    pub fn is_debit(self) -> bool {
        self == TransactionCode::ExternallyInitiatedDebit
    }
}

impl FromStr for TransactionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "13" => Ok(TransactionCode::ExternallyInitiatedDebit),
            "50" => Ok(TransactionCode::ExternallyInitiatedCredit),
            "51" => Ok(TransactionCode::AustralianGovernmentSecurityInterest),
            "52" => Ok(TransactionCode::FamilyAllowance),
            "53" => Ok(TransactionCode::Pay),
            "54" => Ok(TransactionCode::Pension),
            "55" => Ok(TransactionCode::Allotment),
            "56" => Ok(TransactionCode::Dividend),
            "57" => Ok(TransactionCode::DebentureNoteInterest),
            other => Err(format!("unknown transaction code '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FieldValue for TransactionCode {
    fn is_blank(&self) -> bool {
        false
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code()))
    }
}

/// Withholding tax and detail-change indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// `N`: new or varied BSB/account number or name.
    NewOrVariedDetails,
    /// `W`: dividend paid to a non-resident.
    DividendToNonResident,
    /// `X`: interest paid to a non-resident.
    InterestToNonResident,
    /// `Y`: payment to an unnamed or unregistered payee.
    WithholdingTax,
}

impl Indicator {
    pub fn code(self) -> char {
        match self {
            Indicator::NewOrVariedDetails => 'N',
            Indicator::DividendToNonResident => 'W',
            Indicator::InterestToNonResident => 'X',
            Indicator::WithholdingTax => 'Y',
        }
    }
}

impl FromStr for Indicator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(Indicator::NewOrVariedDetails),
            "W" | "w" => Ok(Indicator::DividendToNonResident),
            "X" | "x" => Ok(Indicator::InterestToNonResident),
            "Y" | "y" => Ok(Indicator::WithholdingTax),
            other => Err(format!("unknown indicator '{}'", other)),
        }
    }
}

impl FieldValue for Indicator {
    fn is_blank(&self) -> bool {
        false
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.code().to_string()))
    }
}

/// Values a new transaction inherits from its batch.
///
/// Taken as a snapshot when the transaction is created; later changes to
/// the batch do not reach transactions that already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDefaults {
    pub trace_bsb: Option<String>,
    pub trace_account_number: Option<String>,
    pub name_of_remitter: Option<String>,
}

/// A single detail record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// BSB of the account to credit or debit, e.g. `013-999`.
    pub bsb: Option<String>,

    /// Account to credit or debit.
    pub account_number: Option<String>,

    pub indicator: Option<Indicator>,

    pub transaction_code: Option<TransactionCode>,

    /// Amount in cents. Positive credits the account, negative debits it.
    pub amount: Option<i64>,

    /// Title of the account to credit or debit.
    pub account_name: Option<String>,

    /// Reference shown on the recipient's statement.
    pub lodgement_reference: Option<String>,

    /// BSB the transaction is returned to if it cannot be processed.
    pub trace_bsb: Option<String>,

    pub trace_account_number: Option<String>,

    pub name_of_remitter: Option<String>,

    /// Withholding tax in cents.
    pub withholding_amount: Option<i64>,
}

/// Width of a rendered detail record.
pub const RECORD_WIDTH: usize = 120;

static TRANSACTION_VALIDATOR: Lazy<Validator<Transaction>> = Lazy::new(|| {
    Validator::<Transaction>::new()
        .presence("bsb", |t| &t.bsb)
        .presence("account_number", |t| &t.account_number)
        .presence("amount", |t| &t.amount)
        .presence("account_name", |t| &t.account_name)
        .presence("transaction_code", |t| &t.transaction_code)
        .presence("lodgement_reference", |t| &t.lodgement_reference)
        .presence("trace_bsb", |t| &t.trace_bsb)
        .presence("trace_account_number", |t| &t.trace_account_number)
        .presence("name_of_remitter", |t| &t.name_of_remitter)
        .format("bsb", |t| &t.bsb, Format::Bsb)
        .format("trace_bsb", |t| &t.trace_bsb, Format::Bsb)
        .format("account_number", |t| &t.account_number, Format::MaxLength(9))
        .format("amount", |t| &t.amount, Format::MaxLength(10))
        .format("account_name", |t| &t.account_name, Format::MaxLength(32))
        .format(
            "lodgement_reference",
            |t| &t.lodgement_reference,
            Format::MaxLength(18),
        )
        .format(
            "trace_account_number",
            |t| &t.trace_account_number,
            Format::MaxLength(9),
        )
        .format("name_of_remitter", |t| &t.name_of_remitter, Format::MaxLength(16))
        .format("withholding_amount", |t| &t.withholding_amount, Format::MaxLength(8))
        .format("account_number", |t| &t.account_number, Format::Ascii)
        .format("account_name", |t| &t.account_name, Format::Ascii)
        .format("lodgement_reference", |t| &t.lodgement_reference, Format::Ascii)
        .format("trace_account_number", |t| &t.trace_account_number, Format::Ascii)
        .format("name_of_remitter", |t| &t.name_of_remitter, Format::Ascii)
});

impl Transaction {
    /// Creates an empty transaction carrying the batch's trace details.
    pub fn new(defaults: TransactionDefaults) -> Self {
        Transaction {
            trace_bsb: defaults.trace_bsb,
            trace_account_number: defaults.trace_account_number,
            name_of_remitter: defaults.name_of_remitter,
            ..Transaction::default()
        }
    }

    /// Amount in cents, treating an unset amount as zero.
    pub fn amount(&self) -> i64 {
        self.amount.unwrap_or(0)
    }

    /// Renders the fixed-width detail record.
    ///
    /// No validation happens here. Blank or over-length fields produce a
    /// malformed record, so callers check [`Validate::is_valid`] first.
    pub fn render(&self) -> String {
        let mut s = String::with_capacity(RECORD_WIDTH);

        s.push('1');
        s.push_str(&format!("{:<7}", text(&self.bsb)));
        s.push_str(&format!("{:>9}", text(&self.account_number)));
        s.push(self.indicator.map_or(' ', Indicator::code));
        s.push_str(self.transaction_code.map_or("  ", TransactionCode::code));
        s.push_str(&format!("{:0>10}", self.amount().unsigned_abs()));
        s.push_str(&format!("{:<32}", text(&self.account_name)));
        s.push_str(&format!("{:<18}", text(&self.lodgement_reference)));
        s.push_str(&format!("{:<7}", text(&self.trace_bsb)));
        s.push_str(&format!("{:>9}", text(&self.trace_account_number)));
        s.push_str(&format!("{:<16}", text(&self.name_of_remitter)));
        s.push_str(&format!(
            "{:0>8}",
            self.withholding_amount.unwrap_or(0).unsigned_abs()
        ));

        s
    }
}

impl Validate for Transaction {
    fn validator() -> &'static Validator<Self> {
        &TRANSACTION_VALIDATOR
    }
}

pub(crate) fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
