//! End-to-end scenarios exercised through the public registry surface,
//! the way the parser/resolver drives the core.

use exceval_fns::{evaluate, CellValue, ExcelError, ExcelErrorKind, StaticContext};
use serde_json::{json, Value};

fn to_cell(v: &Value) -> CellValue {
    match v {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        Value::Number(n) => CellValue::Number(n.as_f64().unwrap()),
        Value::String(s) => match ExcelErrorKind::parse(s) {
            Some(kind) if s.starts_with('#') => CellValue::Error(ExcelError::new(kind)),
            _ => CellValue::Text(s.clone()),
        },
        other => panic!("unsupported scenario value {other:?}"),
    }
}

fn run(name: &str, args: &[CellValue]) -> CellValue {
    evaluate(name, args, &StaticContext::default())
        .unwrap_or_else(|| panic!("{name} is not registered"))
}

fn check_table(table: Value) {
    for case in table.as_array().unwrap() {
        let name = case[0].as_str().unwrap();
        let args: Vec<CellValue> = case[1].as_array().unwrap().iter().map(to_cell).collect();
        let expected = to_cell(&case[2]);
        let got = run(name, &args);
        assert_eq!(got, expected, "{name}{args:?}");
    }
}

#[test]
fn exact_seed_scenarios() {
    check_table(json!([
        ["SUMSQ", [3, 4], 25.0],
        ["SUMSQ", [3, "#DIV/0!", 4], "#DIV/0!"],
        ["MULTINOMIAL", [2, 3, 4], 1260.0],
        ["MULTINOMIAL", [-1, 2], "#NUM!"],
        ["SERIESSUM", [2, 2, 1, 3], 12.0],
        ["ROUND", [2.5, 0], 3.0],
        ["ROUND", [-2.5, 0], -3.0],
        ["INT", [-8.9], -9.0],
        ["TRUNC", [-8.9], -8.0],
        ["MOD", [-10, 3], 2.0],
        ["MOD", [10, 0], "#DIV/0!"],
        ["DEC2HEX", [-1], "FFFFFFFFFF"],
        ["HEX2DEC", ["FF"], 255.0],
        ["BITLSHIFT", [5, 2], 20.0],
        ["BITLSHIFT", [20, -2], 5.0],
        ["CONVERT", [0, "C", "F"], 32.0],
        ["CONVERT", [32, "F", "C"], 0.0],
        ["CONVERT", [1, "m", "kg"], "#N/A"],
        ["COMPLEX", [3, 4], "3+4i"],
        ["IMDIV", ["1+i", "1-i"], "i"],
        ["IMDIV", ["1+i", "0+0i"], "#NUM!"],
        ["FIXED", [1234.567, 1], "1,234.6"],
        ["DOLLAR", [1234.567], "$1,234.57"],
        ["NUMBERVALUE", ["50%"], 0.5],
        ["NUMBERVALUE", ["1.234,56", ",", "."], 1234.56],
        [
            "REGEXREPLACE",
            ["555-123-4567", "(\\d{3})-(\\d{3})-(\\d{4})", "($1) $2-$3"],
            "(555) 123-4567"
        ],
        [
            "REGEXEXTRACT",
            ["user@example.com", "^([\\w\\.-]+)@([\\w\\.-]+)\\.(\\w+)$", 0, 2],
            "example"
        ]
    ]));
}

#[test]
fn financial_seed_scenarios() {
    let ctx = StaticContext::default();
    let pmt = match evaluate(
        "PMT",
        &[
            CellValue::Number(0.05 / 12.0),
            CellValue::Number(360.0),
            CellValue::Number(200_000.0),
        ],
        &ctx,
    )
    .unwrap()
    {
        CellValue::Number(v) => v,
        other => panic!("expected number, got {other:?}"),
    };
    assert!((pmt - (-1073.64)).abs() < 0.01, "pmt = {pmt}");

    let rate = match evaluate(
        "RATE",
        &[
            CellValue::Number(12.0),
            CellValue::Number(-1000.0),
            CellValue::Number(0.0),
            CellValue::Number(12_000.0),
        ],
        &ctx,
    )
    .unwrap()
    {
        CellValue::Number(v) => v,
        other => panic!("expected number, got {other:?}"),
    };
    assert!(rate.abs() < 1e-6, "rate = {rate}");

    let irr = match evaluate(
        "IRR",
        &[
            CellValue::Number(-10_000.0),
            CellValue::Number(3000.0),
            CellValue::Number(4200.0),
            CellValue::Number(6800.0),
        ],
        &ctx,
    )
    .unwrap()
    {
        CellValue::Number(v) => v,
        other => panic!("expected number, got {other:?}"),
    };
    assert!(irr > 0.10 && irr < 0.30, "irr = {irr}");
}

#[test]
fn business_day_seed_scenarios() {
    // 2024-01-01 is serial 45292; 2024-01-31 is 45322; 2024-01-15 is 45306.
    let ctx = StaticContext::default();
    let n = |x: f64| CellValue::Number(x);
    assert_eq!(
        evaluate("NETWORKDAYS", &[n(45292.0), n(45322.0)], &ctx).unwrap(),
        n(23.0)
    );
    assert_eq!(
        evaluate("NETWORKDAYS", &[n(45292.0), n(45322.0), n(45292.0)], &ctx).unwrap(),
        n(22.0)
    );
    assert_eq!(
        evaluate("WORKDAY", &[n(45292.0), n(10.0)], &ctx).unwrap(),
        n(45306.0)
    );
}

#[test]
fn xlookup_seed_scenarios() {
    let ctx = StaticContext::default();
    let n = |x: f64| CellValue::Number(x);
    let t = |s: &str| CellValue::text(s);

    // XLOOKUP(25, [10,20,30,40], [A,B,C,D], …, match_mode) with the
    // flat grammar's explicit length.
    let base = |match_mode: f64| {
        vec![
            n(25.0),
            n(4.0),
            n(10.0),
            n(20.0),
            n(30.0),
            n(40.0),
            t("A"),
            t("B"),
            t("C"),
            t("D"),
            CellValue::Empty, // if_not_found
            n(match_mode),
        ]
    };
    assert_eq!(evaluate("XLOOKUP", &base(1.0), &ctx).unwrap(), t("C"));
    assert_eq!(evaluate("XLOOKUP", &base(-1.0), &ctx).unwrap(), t("B"));

    let wildcard = vec![
        t("B*"),
        n(3.0),
        t("Apple"),
        t("Banana"),
        t("Cherry"),
        n(1.0),
        n(2.0),
        n(3.0),
        CellValue::Empty,
        n(2.0),
    ];
    assert_eq!(evaluate("XLOOKUP", &wildcard, &ctx).unwrap(), n(2.0));

    // Exact miss without if_not_found defaults to #N/A.
    let miss = vec![n(25.0), n(2.0), n(10.0), n(20.0), t("A"), t("B")];
    assert_eq!(
        evaluate("XLOOKUP", &miss, &ctx).unwrap(),
        CellValue::Error(ExcelError::new_na())
    );
}

#[test]
fn registry_surface() {
    // Case-insensitive resolution and the FORECAST.LINEAR alias.
    assert!(exceval_fns::function_registry::get("sum").is_some());
    assert!(exceval_fns::function_registry::get("FORECAST.LINEAR").is_some());
    assert!(exceval_fns::function_registry::get("NOT_A_FUNCTION").is_none());
    assert!(evaluate("NOT_A_FUNCTION", &[], &StaticContext::default()).is_none());
}
