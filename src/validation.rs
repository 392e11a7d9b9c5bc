//! Declarative field validation shared by batches and transaction records.
//!
//! Each record type declares its constraints once, as a [`Validator`], and
//! evaluates them against live values on demand. Evaluation never stops at
//! the first failure: every rule runs and every violation is collected.

use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::fmt;

/// A value that can be checked for presence and shape.
pub trait FieldValue {
    /// Returns `true` if the value counts as absent.
    ///
    /// `None`, empty strings and whitespace-only strings are all blank.
    fn is_blank(&self) -> bool;

    /// Text form used by format checks. `None` when the value is blank or
    /// has no checkable shape.
    fn text(&self) -> Option<Cow<'_, str>>;
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        if self.is_blank() {
            None
        } else {
            Some(Cow::Borrowed(self.as_str()))
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, FieldValue::is_blank)
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        self.as_ref().and_then(FieldValue::text)
    }
}

/// Amounts are checked by the digits they render as; the sign never appears
/// in a fixed-width amount field.
impl FieldValue for i64 {
    fn is_blank(&self) -> bool {
        false
    }

    fn text(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(self.unsigned_abs().to_string()))
    }
}

impl FieldValue for NaiveDateTime {
    fn is_blank(&self) -> bool {
        false
    }

    /// Dates have no text shape to check: they always render as the ten
    /// digits `DDMMYYHHmm`.
    fn text(&self) -> Option<Cow<'_, str>> {
        None
    }
}

/// Shape a present value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Bank/State/Branch number: three digits, a hyphen, three digits.
    Bsb,
    /// ASCII digits only.
    Numeric,
    /// At most this many characters.
    MaxLength(usize),
    /// Exactly this many characters.
    Length(usize),
    /// Printable ASCII only, so one character is one output column.
    Ascii,
}

impl Format {
    /// Returns `true` if `value` has this shape.
    pub fn matches(&self, value: &str) -> bool {
        match *self {
            Format::Bsb => {
                let bytes = value.as_bytes();
                bytes.len() == 7
                    && bytes[3] == b'-'
                    && bytes[..3].iter().all(u8::is_ascii_digit)
                    && bytes[4..].iter().all(u8::is_ascii_digit)
            }
            Format::Numeric => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            Format::MaxLength(max) => value.chars().count() <= max,
            Format::Length(len) => value.chars().count() == len,
            Format::Ascii => value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Bsb => write!(f, "expected DDD-DDD"),
            Format::Numeric => write!(f, "expected digits only"),
            Format::MaxLength(max) => write!(f, "expected at most {} characters", max),
            Format::Length(len) => write!(f, "expected exactly {} characters", len),
            Format::Ascii => write!(f, "expected printable ASCII"),
        }
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A required field is blank.
    Blank,
    /// A present field does not have the required shape.
    Format(Format),
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: &'static str,

    /// What was wrong with it.
    pub violation: Violation,

    /// Position of the owning transaction within its batch, if the field
    /// belongs to a transaction record rather than the batch header.
    pub transaction: Option<usize>,
}

impl FieldError {
    /// Creates an error for a batch-level field.
    pub fn new(field: &'static str, violation: Violation) -> Self {
        FieldError {
            field,
            violation,
            transaction: None,
        }
    }

    /// Tags the error with the index of the transaction it came from.
    pub fn in_transaction(mut self, index: usize) -> Self {
        self.transaction = Some(index);
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.transaction {
            write!(f, "transaction {}: ", index)?;
        }
        match self.violation {
            Violation::Blank => write!(f, "{} is empty", self.field),
            Violation::Format(format) => {
                write!(f, "{} format is incorrect ({})", self.field, format)
            }
        }
    }
}

/// Every violation found in a record and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Returns `true` if some error names `field`.
    pub fn contains(&self, field: &str, violation: Violation) -> bool {
        self.0
            .iter()
            .any(|e| e.field == field && e.violation == violation)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        ValidationErrors(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Reads one field out of a record.
pub type Accessor<T> = fn(&T) -> &dyn FieldValue;

#[derive(Clone, Copy)]
enum Check {
    Presence,
    Format(Format),
}

struct Rule<T> {
    field: &'static str,
    read: Accessor<T>,
    check: Check,
}

/// The set of constraints declared for one record type.
pub struct Validator<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Validator<T> {
    /// Creates a validator with no constraints.
    pub fn new() -> Self {
        Validator { rules: Vec::new() }
    }

    /// Requires `field` to be non-blank.
    pub fn presence(mut self, field: &'static str, read: Accessor<T>) -> Self {
        self.rules.push(Rule {
            field,
            read,
            check: Check::Presence,
        });
        self
    }

    /// Requires `field`, when present, to have the given shape.
    ///
    /// Blank values pass; pair with [`Validator::presence`] to require them.
    pub fn format(mut self, field: &'static str, read: Accessor<T>, format: Format) -> Self {
        self.rules.push(Rule {
            field,
            read,
            check: Check::Format(format),
        });
        self
    }

    /// Runs every rule against `target` and returns all failures in
    /// declaration order.
    pub fn evaluate(&self, target: &T) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for rule in &self.rules {
            let value = (rule.read)(target);
            match rule.check {
                Check::Presence => {
                    if value.is_blank() {
                        errors.push(FieldError::new(rule.field, Violation::Blank));
                    }
                }
                Check::Format(format) => {
                    if let Some(text) = value.text() {
                        if !format.matches(&text) {
                            errors.push(FieldError::new(rule.field, Violation::Format(format)));
                        }
                    }
                }
            }
        }

        errors
    }
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Records that carry declared field constraints.
pub trait Validate: Sized + 'static {
    /// The constraints declared for this record type.
    fn validator() -> &'static Validator<Self>;

    /// Every violation found in the current field values.
    fn errors(&self) -> Vec<FieldError> {
        Self::validator().evaluate(self)
    }

    /// Returns `true` if no constraint is violated.
    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}
