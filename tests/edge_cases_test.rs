//! Edge case tests for batch validation and rendering.
//!
//! These drive the library directly and check the rendered columns.

use aba_direct_entry::{
    AbaError, Batch, Format, TransactionCode, Validate, Violation, LINE_TERMINATOR,
};
use chrono::NaiveDate;

fn payroll_batch() -> Batch {
    Batch::with(|b| {
        b.bsb = Some("013-999".to_string());
        b.account_number = Some("123456".to_string());
        b.financial_institution = Some("ANZ".to_string());
        b.user_name = Some("Test User".to_string());
        b.user_id = Some("1".to_string());
        b.description = Some("Payroll".to_string());
        b.process_at = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(9, 0, 0));
        b.name_of_remitter = Some("Test User".to_string());
    })
}

fn add_payment(batch: &mut Batch, amount: i64, account_name: &str) {
    batch.add_transaction(|t| {
        t.bsb = Some("342-342".to_string());
        t.account_number = Some("3244654".to_string());
        t.amount = Some(amount);
        t.account_name = Some(account_name.to_string());
        t.transaction_code = Some(if amount < 0 {
            TransactionCode::ExternallyInitiatedDebit
        } else {
            TransactionCode::ExternallyInitiatedCredit
        });
        t.lodgement_reference = Some("R435564".to_string());
    });
}

fn lines(output: &str) -> Vec<&str> {
    output.split(LINE_TERMINATOR).collect()
}

// ==================== END TO END ====================

#[test]
fn test_single_credit_end_to_end() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 10000, "John Doe");

    let output = batch.render().unwrap();
    let lines = lines(&output);
    assert_eq!(lines.len(), 3);

    assert!(lines[0].starts_with("0013-999  123456   01ANZ"));
    assert!(lines[1].starts_with("1342-342"));
    assert!(lines[2].starts_with("7999-999"));

    let trailer = lines[2];
    assert_eq!(&trailer[20..30], "0000010000");
    assert_eq!(&trailer[30..40], "0000010000");
    assert_eq!(&trailer[40..50], "0000000000");
    assert_eq!(&trailer[74..80], "000001");
}

#[test]
fn test_every_record_is_120_columns() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 10000, "John Doe");
    add_payment(&mut batch, -999, "Jane Roe");

    let output = batch.render().unwrap();
    for line in lines(&output) {
        assert_eq!(line.len(), 120, "Wrong width: {:?}", line);
    }
}

#[test]
fn test_no_trailing_line_terminator() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 1, "John Doe");

    let output = batch.render().unwrap();
    assert!(!output.ends_with(LINE_TERMINATOR));
    assert_eq!(output.matches(LINE_TERMINATOR).count(), 2);
    assert!(!output.contains("\r\n\r\n"));
}

#[test]
fn test_empty_batch_has_no_blank_line() {
    let output = payroll_batch().render().unwrap();
    let lines = lines(&output);

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('0'));
    assert!(lines[1].starts_with('7'));
    assert_eq!(&lines[1][74..80], "000000");
}

// ==================== TOTALS ====================

#[test]
fn test_totals_reconcile_for_mixed_amounts() {
    let amount_sets: [&[i64]; 5] = [
        &[],
        &[0],
        &[100, 200, 300],
        &[-100, -200],
        &[5000, -7500, 1, -1, 0, 2499],
    ];

    for amounts in amount_sets {
        let mut batch = payroll_batch();
        for &amount in amounts {
            add_payment(&mut batch, amount, "Someone");
        }

        let totals = batch.totals();
        assert_eq!(totals.net, totals.credit + totals.debit);
        assert!(totals.credit >= 0);
        assert!(totals.debit <= 0);
        assert_eq!(totals.count, amounts.len());
        assert_eq!(totals.net, amounts.iter().map(|&a| i128::from(a)).sum::<i128>());
    }
}

#[test]
fn test_net_debit_renders_absolute_value() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 1000, "John Doe");
    add_payment(&mut batch, -3000, "Jane Roe");

    let output = batch.render().unwrap();
    let trailer = lines(&output)[2];
    assert_eq!(&trailer[20..30], "0000002000");
    assert_eq!(&trailer[30..40], "0000001000");
    assert_eq!(&trailer[40..50], "0000003000");
    assert_eq!(trailer.matches('-').count(), 1);
}

#[test]
fn test_largest_valid_totals_fill_trailer_exactly() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 9_999_999_999, "John Doe");
    add_payment(&mut batch, -9_999_999_999, "Jane Roe");

    let output = batch.render().unwrap();
    let trailer = lines(&output)[3];
    assert_eq!(trailer.len(), 120);
    assert_eq!(&trailer[20..50], "000000000099999999999999999999");
}

#[test]
fn test_overflowing_credit_total_blocks_render() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 9_999_999_999, "John Doe");
    add_payment(&mut batch, 9_999_999_999, "Jane Roe");

    match batch.render() {
        Err(AbaError::Invalid(errors)) => {
            assert!(errors.contains("credit_total", Violation::Format(Format::MaxLength(10))));
            assert!(errors.contains("net_total", Violation::Format(Format::MaxLength(10))));
            assert!(!errors.contains("debit_total", Violation::Format(Format::MaxLength(10))));
        }
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_zero_amount_counts_but_adds_nothing() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 0, "John Doe");

    let output = batch.render().unwrap();
    let trailer = lines(&output)[2];
    assert_eq!(&trailer[20..50], "0".repeat(30));
    assert_eq!(&trailer[74..80], "000001");
}

// ==================== ORDERING ====================

#[test]
fn test_transactions_render_in_insertion_order() {
    let mut batch = payroll_batch();
    let names = ["Charlie", "Alice", "Bob"];
    for (i, name) in names.iter().enumerate() {
        add_payment(&mut batch, (i as i64 + 1) * 100, name);
    }

    let output = batch.render().unwrap();
    let detail: Vec<&str> = lines(&output)[1..4].to_vec();
    for (line, name) in detail.iter().zip(names) {
        assert_eq!(line[30..62].trim_end(), name);
    }
}

// ==================== VALIDATION ====================

#[test]
fn test_missing_header_fields_are_all_reported() {
    let batch = Batch::new();
    let errors = batch.errors();

    for field in [
        "bsb",
        "financial_institution",
        "user_name",
        "user_id",
        "description",
        "process_at",
    ] {
        assert!(
            errors
                .iter()
                .any(|e| e.field == field && e.violation == Violation::Blank),
            "Missing presence error for {}",
            field
        );
    }
}

#[test]
fn test_bsb_shapes() {
    for (bsb, valid) in [
        ("013-999", true),
        ("12-3456", false),
        ("abc-def", false),
        ("013999", false),
        ("013-99a", false),
    ] {
        let mut batch = payroll_batch();
        batch.bsb = Some(bsb.to_string());
        assert_eq!(batch.is_valid(), valid, "bsb {}", bsb);
    }
}

#[test]
fn test_whitespace_only_field_is_blank() {
    let mut batch = payroll_batch();
    batch.user_name = Some("   ".to_string());

    match batch.render() {
        Err(AbaError::Invalid(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors.contains("user_name", Violation::Blank));
        }
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_over_length_values_fail_validation_instead_of_widening_records() {
    let mut batch = payroll_batch();
    batch.description = Some("Quarterly payroll run".to_string());
    batch.financial_institution = Some("ANZB".to_string());
    add_payment(&mut batch, 100, &"x".repeat(40));

    match batch.render() {
        Err(AbaError::Invalid(errors)) => {
            assert!(errors.contains("description", Violation::Format(Format::MaxLength(12))));
            assert!(errors.contains("financial_institution", Violation::Format(Format::Length(3))));
            let tx_error = errors
                .iter()
                .find(|e| e.field == "account_name")
                .expect("account_name error");
            assert_eq!(tx_error.transaction, Some(0));
        }
        other => panic!("Expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_non_ascii_text_would_widen_records() {
    let mut batch = payroll_batch();
    batch.user_name = Some("Zoë Müller".to_string());
    add_payment(&mut batch, 100, "Chloé");

    let errors = batch.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| e.violation == Violation::Format(Format::Ascii)));
    assert_eq!(errors[0].field, "user_name");
    assert_eq!(errors[1].transaction, Some(0));
}

#[test]
fn test_non_numeric_user_id() {
    let mut batch = payroll_batch();
    batch.user_id = Some("12AB".to_string());

    let errors = batch.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].violation, Violation::Format(Format::Numeric));
}

#[test]
fn test_user_id_is_zero_padded() {
    let mut batch = payroll_batch();
    batch.user_id = Some("4321".to_string());

    let output = batch.render().unwrap();
    assert_eq!(&lines(&output)[0][56..62], "004321");
}

#[test]
fn test_invalid_transaction_invalidates_batch() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 100, "John Doe");
    batch.add_transaction(|t| {
        t.bsb = Some("342342".to_string());
        t.amount = Some(5);
    });

    assert!(!batch.is_valid());
    let errors = batch.errors();
    assert!(errors.iter().all(|e| e.transaction == Some(1)));
    assert!(errors
        .iter()
        .any(|e| e.field == "bsb" && e.violation == Violation::Format(Format::Bsb)));
    assert!(errors
        .iter()
        .any(|e| e.field == "account_name" && e.violation == Violation::Blank));
}

#[test]
fn test_missing_batch_account_leaves_trace_account_blank() {
    let mut batch = payroll_batch();
    batch.account_number = None;
    add_payment(&mut batch, 100, "John Doe");

    let errors = batch.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "trace_account_number");
    assert_eq!(errors[0].transaction, Some(0));
}

#[test]
fn test_render_twice_is_identical() {
    let mut batch = payroll_batch();
    add_payment(&mut batch, 100, "John Doe");
    add_payment(&mut batch, -40, "Jane Roe");

    let first = batch.render().unwrap();
    let second = batch.render().unwrap();
    assert_eq!(first, second);
}
