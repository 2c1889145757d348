//! Integration tests for the aggregation semantics, driven through the public API

use claims::assert_matches;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sales_summary::{DepartmentTotal, Error, ParseError, PipelineOptions, summarize};

fn totals_of(input: &str) -> Vec<(String, Decimal)> {
    summarize(input.as_bytes(), PipelineOptions::default())
        .unwrap_or_else(|e| panic!("unexpected error: {e}"))
        .into_iter()
        .map(|DepartmentTotal { department, total_sales }| (department, total_sales))
        .collect()
}

#[test]
fn windows_line_endings() {
    let input = "A,2023-01-01,1.5\r\nB,2023-01-01,2\r\nA,2023-01-02,1.5\r\n";

    assert_eq!(
        totals_of(input),
        vec![("A".to_string(), dec!(3.0)), ("B".to_string(), dec!(2))]
    );
}

#[test]
fn header_row_is_skipped_by_default() {
    let input = "\
department,date,sales
Electronics,2023-01-01,10
Electronics,2023-01-02,5";

    assert_eq!(totals_of(input), vec![("Electronics".to_string(), dec!(15))]);
}

#[test]
fn exact_decimal_sums() {
    // 0.1 + 0.2 is exactly 0.3 for money amounts
    let input = "A,d,0.1\nA,d,0.2\n";
    assert_eq!(totals_of(input), vec![("A".to_string(), dec!(0.3))]);
}

#[rstest]
#[case::missing_field("A,d,1\nB,d\n", 2)]
#[case::extra_field("A,d,1,2\n", 1)]
#[case::non_numeric("A,d,1\nB,d,2\nC,d,abc\n", 3)]
#[case::empty_amount("A,d,\n", 1)]
#[case::empty_department(",d,1\n", 1)]
fn first_malformed_line_aborts(#[case] input: &str, #[case] expected_line: u64) {
    let err = summarize(input.as_bytes(), PipelineOptions::default()).unwrap_err();

    assert_matches!(err, Error::MalformedInput { line, .. } if line == expected_line);
}

#[test]
fn malformed_input_names_the_reason() {
    let err = summarize("A,d,ten\n".as_bytes(), PipelineOptions::default()).unwrap_err();

    assert_matches!(
        &err,
        Error::MalformedInput { reason: ParseError::InvalidAmount(raw), .. } if raw == "ten"
    );
    assert!(err.to_string().contains("line 1"), "{err}");
}

proptest! {
    #[test]
    fn totals_match_per_department_sums(
        rows in prop::collection::vec(("[A-Za-z][A-Za-z ]{0,8}", -100_000i64..100_000), 1..100),
    ) {
        let mut input = String::new();
        let mut expected: Vec<(String, Decimal)> = Vec::new();
        for (department, cents) in &rows {
            let amount = Decimal::new(*cents, 2);
            input.push_str(&format!("{department},2023-01-01,{amount}\n"));
            match expected.iter_mut().find(|(d, _)| d == department) {
                Some((_, total)) => *total += amount,
                None => expected.push((department.clone(), amount)),
            }
        }

        prop_assert_eq!(totals_of(&input), expected);
    }
}
