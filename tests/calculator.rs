use playground::services::calc::{evaluate, format_value, CalcError};

#[test]
fn test_basic_arithmetic() {
    assert_eq!(evaluate("2+2").unwrap(), 4.0);
    assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
    assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
    assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
    assert_eq!(evaluate("8 / 4 / 2").unwrap(), 1.0);
    assert_eq!(evaluate("7 / 2").unwrap(), 3.5);
    assert_eq!(evaluate("0.5 * 4").unwrap(), 2.0);
}

#[test]
fn test_unary_signs() {
    assert_eq!(evaluate("-(2 + 3)").unwrap(), -5.0);
    assert_eq!(evaluate("--4").unwrap(), 4.0);
    assert_eq!(evaluate("3 * -2").unwrap(), -6.0);
    assert_eq!(evaluate("+1").unwrap(), 1.0);
}

#[test]
fn test_rejects_anything_outside_arithmetic() {
    assert!(matches!(
        evaluate("__import__('os')"),
        Err(CalcError::UnexpectedChar { ch: '_', pos: 0 })
    ));
    assert!(matches!(evaluate("2 ** 3"), Err(CalcError::UnexpectedToken(_))));
    assert!(matches!(evaluate("abs(-1)"), Err(CalcError::UnexpectedChar { .. })));
}

#[test]
fn test_malformed_expressions() {
    assert_eq!(evaluate(""), Err(CalcError::Empty));
    assert_eq!(evaluate("   "), Err(CalcError::Empty));
    assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnexpectedEnd));
    assert_eq!(evaluate("1 +"), Err(CalcError::UnexpectedEnd));
    assert_eq!(evaluate("1 2"), Err(CalcError::UnexpectedToken(2)));
    assert_eq!(evaluate("1)"), Err(CalcError::UnexpectedToken(1)));
    assert!(matches!(evaluate("1..2"), Err(CalcError::InvalidNumber(_))));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(evaluate("1 / 0"), Err(CalcError::DivisionByZero));
    assert_eq!(evaluate("1 / (2 - 2)"), Err(CalcError::DivisionByZero));
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));

    let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
    assert_eq!(evaluate(&shallow).unwrap(), 1.0);
}

#[test]
fn test_format_value() {
    assert_eq!(format_value(4.0), "4");
    assert_eq!(format_value(-5.0), "-5");
    assert_eq!(format_value(3.5), "3.5");
    assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
}
