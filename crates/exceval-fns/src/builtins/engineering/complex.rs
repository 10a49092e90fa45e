//! Complex numbers in text form: COMPLEX, the IM* accessors, arithmetic
//! and transcendentals.
//!
//! A complex value travels as text (`"3+4i"`, `"-j"`, `"2.5"`); the
//! imaginary suffix is `i` or `j` and must be consistent within a value
//! and across the operands of a binary function.

use super::super::utils::coerce_num;
use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};

#[derive(Debug, Clone, Copy)]
struct Complex {
    re: f64,
    im: f64,
    /// `None` for purely real inputs, which adopt the other operand's
    /// suffix (or `i`).
    suffix: Option<char>,
}

impl Complex {
    fn new(re: f64, im: f64, suffix: Option<char>) -> Self {
        Self { re, im, suffix }
    }

    fn modulus(&self) -> f64 {
        self.re.hypot(self.im)
    }
}

/// Resolve the output suffix of a binary operation; conflicting
/// explicit suffixes are `#VALUE!`.
fn merge_suffix(a: &Complex, b: &Complex) -> Result<Option<char>, ExcelError> {
    match (a.suffix, b.suffix) {
        (Some(x), Some(y)) if x != y => Err(ExcelError::new_value()),
        (Some(x), _) => Ok(Some(x)),
        (_, y) => Ok(y),
    }
}

fn coerce_complex_str(v: &CellValue) -> Result<String, ExcelError> {
    match v {
        CellValue::Text(s) => Ok(s.trim().to_string()),
        CellValue::Number(n) => Ok(exceval_common::value::format_number(*n)),
        CellValue::Empty => Ok("0".to_string()),
        CellValue::Error(e) => Err(e.clone()),
        _ => Err(ExcelError::new_value()),
    }
}

/// Parse `"a"`, `"bi"`, `"a±bi"` (or the `j` spellings) into parts.
/// Unparseable text is `#NUM!`.
fn parse_complex(v: &CellValue) -> Result<Complex, ExcelError> {
    let text = coerce_complex_str(v)?;
    if text.is_empty() {
        return Err(ExcelError::new_num());
    }

    // Purely real fast path.
    if let Ok(re) = text.parse::<f64>() {
        return Ok(Complex::new(re, 0.0, None));
    }

    let (body, suffix) = match text.chars().last() {
        Some(c @ ('i' | 'j')) => (&text[..text.len() - 1], c),
        _ => return Err(ExcelError::new_num()),
    };

    // Bare unit imaginaries: "i", "-i", "+i".
    match body {
        "" | "+" => return Ok(Complex::new(0.0, 1.0, Some(suffix))),
        "-" => return Ok(Complex::new(0.0, -1.0, Some(suffix))),
        _ => {}
    }

    // Find the last +/- separating real and imaginary parts, skipping
    // exponent signs ("1e-5+2i").
    let bytes = body.as_bytes();
    let mut split_pos = None;
    for i in (1..bytes.len()).rev() {
        let c = bytes[i] as char;
        if c == '+' || c == '-' {
            let prev = bytes[i - 1] as char;
            if prev == 'e' || prev == 'E' {
                continue;
            }
            split_pos = Some(i);
            break;
        }
    }

    match split_pos {
        Some(pos) => {
            let real_str = &body[..pos];
            let imag_str = &body[pos..];
            let re: f64 = real_str.parse().map_err(|_| ExcelError::new_num())?;
            let im: f64 = match imag_str {
                "+" => 1.0,
                "-" => -1.0,
                s => s.parse().map_err(|_| ExcelError::new_num())?,
            };
            Ok(Complex::new(re, im, Some(suffix)))
        }
        None => {
            // Pure imaginary: "5i", "-2.5j".
            let im: f64 = body.parse().map_err(|_| ExcelError::new_num())?;
            Ok(Complex::new(0.0, im, Some(suffix)))
        }
    }
}

/// Round away representation noise so `IMPRODUCT("1+i","1-i")` prints
/// `2` rather than `2.0000000000000004`.
fn clean_float(val: f64) -> f64 {
    let rounded = val.round();
    if (val - rounded).abs() < 1e-10 {
        rounded
    } else {
        val
    }
}

fn fmt_part(v: f64) -> String {
    exceval_common::value::format_number(v)
}

/// Canonical complex formatting: zero parts elided, unit imaginary
/// printed without the coefficient.
fn format_complex(z: &Complex) -> String {
    let re = clean_float(z.re);
    let im = clean_float(z.im);
    let suffix = z.suffix.unwrap_or('i');

    if re == 0.0 && im == 0.0 {
        return "0".to_string();
    }
    if im == 0.0 {
        return fmt_part(re);
    }

    let imag_str = if im == 1.0 {
        suffix.to_string()
    } else if im == -1.0 {
        format!("-{suffix}")
    } else {
        format!("{}{suffix}", fmt_part(im))
    };

    if re == 0.0 {
        return imag_str;
    }
    if im > 0.0 {
        format!("{}+{imag_str}", fmt_part(re))
    } else {
        format!("{}{imag_str}", fmt_part(re))
    }
}

fn complex_value(z: Complex) -> Result<CellValue, ExcelError> {
    if !z.re.is_finite() || !z.im.is_finite() {
        return Err(ExcelError::new_num());
    }
    Ok(CellValue::Text(format_complex(&z)))
}

/* ─────────────────────────── COMPLEX() ──────────────────────────── */

/// Builds complex text from real and imaginary coefficients; the
/// optional third argument selects the `i`/`j` suffix.
#[derive(Debug)]
pub struct ComplexFn;
impl Function for ComplexFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "COMPLEX"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let re = coerce_num(&args[0])?;
        let im = coerce_num(&args[1])?;
        let suffix = match args.get(2) {
            None | Some(CellValue::Empty) => 'i',
            Some(CellValue::Text(s)) => match s.as_str() {
                "i" => 'i',
                "j" => 'j',
                "" => 'i',
                _ => return Err(ExcelError::new_value()),
            },
            Some(_) => return Err(ExcelError::new_value()),
        };
        complex_value(Complex::new(re, im, Some(suffix)))
    }
}

/* ─────────────────── Accessors ─────────────────── */

#[derive(Debug)]
pub struct ImRealFn;
/// Real coefficient of a complex text value.
impl Function for ImRealFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMREAL"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(parse_complex(&args[0])?.re))
    }
}

#[derive(Debug)]
pub struct ImaginaryFn;
/// Imaginary coefficient of a complex text value.
impl Function for ImaginaryFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMAGINARY"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(parse_complex(&args[0])?.im))
    }
}

#[derive(Debug)]
pub struct ImConjugateFn;
impl Function for ImConjugateFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMCONJUGATE"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        complex_value(Complex::new(z.re, -z.im, z.suffix))
    }
}

#[derive(Debug)]
pub struct ImAbsFn;
/// Modulus √(a² + b²).
impl Function for ImAbsFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMABS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        Ok(CellValue::Number(parse_complex(&args[0])?.modulus()))
    }
}

#[derive(Debug)]
pub struct ImArgumentFn;
/// Argument atan2(b, a); the origin has no argument and returns
/// `#DIV/0!`.
impl Function for ImArgumentFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMARGUMENT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        if z.re == 0.0 && z.im == 0.0 {
            return Err(ExcelError::new_div());
        }
        Ok(CellValue::Number(z.im.atan2(z.re)))
    }
}

/* ─────────────────── Arithmetic ─────────────────── */

#[derive(Debug)]
pub struct ImSumFn;
/// Sum of any number of complex operands.
impl Function for ImSumFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "IMSUM"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let mut acc = Complex::new(0.0, 0.0, None);
        for v in args {
            let z = parse_complex(v)?;
            acc = Complex::new(acc.re + z.re, acc.im + z.im, merge_suffix(&acc, &z)?);
        }
        complex_value(acc)
    }
}

#[derive(Debug)]
pub struct ImSubFn;
impl Function for ImSubFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMSUB"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let a = parse_complex(&args[0])?;
        let b = parse_complex(&args[1])?;
        complex_value(Complex::new(
            a.re - b.re,
            a.im - b.im,
            merge_suffix(&a, &b)?,
        ))
    }
}

#[derive(Debug)]
pub struct ImProductFn;
/// Product of any number of complex operands.
impl Function for ImProductFn {
    func_caps!(PURE, REDUCTION);
    fn name(&self) -> &'static str {
        "IMPRODUCT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn variadic(&self) -> bool {
        true
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let mut acc = Complex::new(1.0, 0.0, None);
        for v in args {
            let z = parse_complex(v)?;
            acc = Complex::new(
                acc.re * z.re - acc.im * z.im,
                acc.re * z.im + acc.im * z.re,
                merge_suffix(&acc, &z)?,
            );
        }
        complex_value(acc)
    }
}

#[derive(Debug)]
pub struct ImDivFn;
/// Complex division; a zero divisor is `#NUM!`.
impl Function for ImDivFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMDIV"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let a = parse_complex(&args[0])?;
        let b = parse_complex(&args[1])?;
        let denom = b.re * b.re + b.im * b.im;
        if denom == 0.0 {
            return Err(ExcelError::new_num());
        }
        complex_value(Complex::new(
            (a.re * b.re + a.im * b.im) / denom,
            (a.im * b.re - a.re * b.im) / denom,
            merge_suffix(&a, &b)?,
        ))
    }
}

/* ─────────────────── Transcendentals ─────────────────── */

#[derive(Debug)]
pub struct ImExpFn;
/// e^z = e^a (cos b + i sin b).
impl Function for ImExpFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMEXP"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        let scale = z.re.exp();
        complex_value(Complex::new(
            scale * z.im.cos(),
            scale * z.im.sin(),
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImLnFn;
/// Principal natural log: ln|z| + i·atan2(b, a). ln 0 is `#NUM!`.
impl Function for ImLnFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMLN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        if z.re == 0.0 && z.im == 0.0 {
            return Err(ExcelError::new_num());
        }
        complex_value(Complex::new(
            z.modulus().ln(),
            z.im.atan2(z.re),
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImLog10Fn;
impl Function for ImLog10Fn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMLOG10"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        if z.re == 0.0 && z.im == 0.0 {
            return Err(ExcelError::new_num());
        }
        let ln10 = std::f64::consts::LN_10;
        complex_value(Complex::new(
            z.modulus().ln() / ln10,
            z.im.atan2(z.re) / ln10,
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImLog2Fn;
impl Function for ImLog2Fn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMLOG2"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        if z.re == 0.0 && z.im == 0.0 {
            return Err(ExcelError::new_num());
        }
        let ln2 = std::f64::consts::LN_2;
        complex_value(Complex::new(
            z.modulus().ln() / ln2,
            z.im.atan2(z.re) / ln2,
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImPowerFn;
/// z^p through polar form: r^p·(cos pθ + i sin pθ).
impl Function for ImPowerFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMPOWER"
    }
    fn min_args(&self) -> usize {
        2
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let z = parse_complex(&args[0])?;
        let p = coerce_num(&args[1])?;
        let r = z.modulus();
        if r == 0.0 {
            if p > 0.0 {
                return complex_value(Complex::new(0.0, 0.0, z.suffix));
            }
            return Err(ExcelError::new_num());
        }
        let theta = z.im.atan2(z.re);
        let scale = r.powf(p);
        complex_value(Complex::new(
            scale * (p * theta).cos(),
            scale * (p * theta).sin(),
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImSqrtFn;
/// Principal square root, the p = 0.5 polar power.
impl Function for ImSqrtFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMSQRT"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        let r = z.modulus().sqrt();
        let theta = z.im.atan2(z.re) / 2.0;
        complex_value(Complex::new(r * theta.cos(), r * theta.sin(), z.suffix))
    }
}

#[derive(Debug)]
pub struct ImSinFn;
/// sin z = sin a·cosh b + i cos a·sinh b.
impl Function for ImSinFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMSIN"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        complex_value(Complex::new(
            z.re.sin() * z.im.cosh(),
            z.re.cos() * z.im.sinh(),
            z.suffix,
        ))
    }
}

#[derive(Debug)]
pub struct ImCosFn;
/// cos z = cos a·cosh b − i sin a·sinh b.
impl Function for ImCosFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "IMCOS"
    }
    fn min_args(&self) -> usize {
        1
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        let z = parse_complex(&args[0])?;
        complex_value(Complex::new(
            z.re.cos() * z.im.cosh(),
            -(z.re.sin() * z.im.sinh()),
            z.suffix,
        ))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        ComplexFn,
        ImRealFn,
        ImaginaryFn,
        ImConjugateFn,
        ImAbsFn,
        ImArgumentFn,
        ImSumFn,
        ImSubFn,
        ImProductFn,
        ImDivFn,
        ImExpFn,
        ImLnFn,
        ImLog10Fn,
        ImLog2Fn,
        ImPowerFn,
        ImSqrtFn,
        ImSinFn,
        ImCosFn,
    );
}
