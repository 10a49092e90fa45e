//! CONVERT(value, from_unit, to_unit): a static directed graph over
//! unit families. Every non-temperature family has one canonical unit
//! and each unit declares a multiplicative factor to it; temperature is
//! affine and special-cased through Kelvin.

use super::super::utils::coerce_num;
use crate::args::first_error;
use crate::func_caps;
use crate::function::Function;
use crate::traits::FunctionContext;
use exceval_common::{CellValue, ExcelError};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum UnitCategory {
    Length,
    Mass,
    Time,
    Pressure,
    Energy,
    Power,
    Volume,
    Area,
    Temperature,
    Information,
    Speed,
    Force,
}

#[derive(Debug, Clone, Copy)]
struct UnitInfo {
    category: UnitCategory,
    /// Multiplicative factor to the family's canonical unit.
    /// Meaningless for temperature (affine, special-cased).
    to_base: f64,
    /// Whether SI prefixes attach to this unit token.
    allow_prefix: bool,
}

impl UnitInfo {
    const fn new(category: UnitCategory, to_base: f64, allow_prefix: bool) -> Self {
        Self {
            category,
            to_base,
            allow_prefix,
        }
    }
}

static UNITS: Lazy<FxHashMap<&'static str, UnitInfo>> = Lazy::new(|| {
    use UnitCategory::*;
    let mut m = FxHashMap::default();
    let mut add = |names: &[&'static str], info: UnitInfo| {
        for n in names {
            m.insert(*n, info);
        }
    };

    // Length (base: meter)
    add(&["m"], UnitInfo::new(Length, 1.0, true));
    add(&["mi"], UnitInfo::new(Length, 1609.344, false));
    add(&["Nmi"], UnitInfo::new(Length, 1852.0, false));
    add(&["in"], UnitInfo::new(Length, 0.0254, false));
    add(&["ft"], UnitInfo::new(Length, 0.3048, false));
    add(&["yd"], UnitInfo::new(Length, 0.9144, false));
    add(&["ang"], UnitInfo::new(Length, 1e-10, true));
    add(&["Pica", "pica"], UnitInfo::new(Length, 0.0254 / 72.0, false));

    // Mass (base: gram)
    add(&["g"], UnitInfo::new(Mass, 1.0, true));
    add(&["u"], UnitInfo::new(Mass, 1.660_538_782e-24, true));
    add(&["grain"], UnitInfo::new(Mass, 0.064_798_91, false));
    add(&["lbm"], UnitInfo::new(Mass, 453.592_37, false));
    add(&["ozm"], UnitInfo::new(Mass, 28.349_523_125, false));
    add(&["sg"], UnitInfo::new(Mass, 14_593.902_937_206_4, false));
    add(&["ton"], UnitInfo::new(Mass, 907_184.74, false));
    add(&["stone"], UnitInfo::new(Mass, 6350.293_18, false));

    // Time (base: second)
    add(&["sec", "s"], UnitInfo::new(Time, 1.0, true));
    add(&["mn", "min"], UnitInfo::new(Time, 60.0, false));
    add(&["hr"], UnitInfo::new(Time, 3600.0, false));
    add(&["day", "d"], UnitInfo::new(Time, 86_400.0, false));
    add(&["yr"], UnitInfo::new(Time, 31_557_600.0, false));

    // Pressure (base: pascal)
    add(&["Pa", "p"], UnitInfo::new(Pressure, 1.0, true));
    add(&["atm", "at"], UnitInfo::new(Pressure, 101_325.0, true));
    add(&["mmHg"], UnitInfo::new(Pressure, 133.322, false));
    add(&["psi"], UnitInfo::new(Pressure, 6894.757_293_168_36, false));
    add(&["Torr"], UnitInfo::new(Pressure, 101_325.0 / 760.0, false));

    // Energy (base: joule)
    add(&["J"], UnitInfo::new(Energy, 1.0, true));
    add(&["e"], UnitInfo::new(Energy, 1e-7, true)); // erg
    add(&["c"], UnitInfo::new(Energy, 4.184, true)); // thermodynamic calorie
    add(&["cal"], UnitInfo::new(Energy, 4.1868, true)); // IT calorie
    add(&["eV", "ev"], UnitInfo::new(Energy, 1.602_176_487e-19, true));
    add(&["Wh", "wh"], UnitInfo::new(Energy, 3600.0, true));
    add(&["BTU", "btu"], UnitInfo::new(Energy, 1055.055_852_62, false));
    add(&["flb"], UnitInfo::new(Energy, 1.355_817_948_331_400_4, false));
    add(&["HPh", "hh"], UnitInfo::new(Energy, 2_684_519.537_696_172_5, false));

    // Power (base: watt)
    add(&["W", "w"], UnitInfo::new(Power, 1.0, true));
    add(&["HP", "h"], UnitInfo::new(Power, 745.699_871_582_270_2, false));
    add(&["PS"], UnitInfo::new(Power, 735.498_75, false));

    // Volume (base: liter)
    add(&["l", "L", "lt"], UnitInfo::new(Volume, 1.0, true));
    add(&["tsp"], UnitInfo::new(Volume, 0.004_928_921_593_75, false));
    add(&["tbs"], UnitInfo::new(Volume, 0.014_786_764_781_25, false));
    add(&["oz"], UnitInfo::new(Volume, 0.029_573_529_562_5, false));
    add(&["cup"], UnitInfo::new(Volume, 0.236_588_236_5, false));
    add(&["pt", "us_pt"], UnitInfo::new(Volume, 0.473_176_473, false));
    add(&["uk_pt"], UnitInfo::new(Volume, 0.568_261_25, false));
    add(&["qt"], UnitInfo::new(Volume, 0.946_352_946, false));
    add(&["gal"], UnitInfo::new(Volume, 3.785_411_784, false));
    add(&["m3"], UnitInfo::new(Volume, 1000.0, false));
    add(&["barrel"], UnitInfo::new(Volume, 158.987_294_928, false));

    // Area (base: square meter)
    add(&["m2"], UnitInfo::new(Area, 1.0, false));
    add(&["ar"], UnitInfo::new(Area, 100.0, false));
    add(&["ha"], UnitInfo::new(Area, 10_000.0, false));
    add(&["us_acre"], UnitInfo::new(Area, 4046.872_609_874_252, false));
    add(&["uk_acre"], UnitInfo::new(Area, 4046.856_422_4, false));
    add(&["in2"], UnitInfo::new(Area, 0.000_645_16, false));
    add(&["ft2"], UnitInfo::new(Area, 0.092_903_04, false));
    add(&["yd2"], UnitInfo::new(Area, 0.836_127_36, false));
    add(&["mi2"], UnitInfo::new(Area, 2_589_988.110_336, false));

    // Temperature (affine, factors unused)
    add(&["C", "cel"], UnitInfo::new(Temperature, 0.0, false));
    add(&["F", "fah"], UnitInfo::new(Temperature, 0.0, false));
    add(&["K", "kel"], UnitInfo::new(Temperature, 0.0, false));
    add(&["Rank"], UnitInfo::new(Temperature, 0.0, false));
    add(&["Reau"], UnitInfo::new(Temperature, 0.0, false));

    // Information (base: bit); SI and binary prefixes both attach.
    add(&["bit"], UnitInfo::new(Information, 1.0, true));
    add(&["byte"], UnitInfo::new(Information, 8.0, true));

    // Speed (base: meter/second)
    add(&["m/s", "m/sec"], UnitInfo::new(Speed, 1.0, true));
    add(&["m/h", "m/hr"], UnitInfo::new(Speed, 1.0 / 3600.0, true));
    add(&["mph"], UnitInfo::new(Speed, 0.447_04, false));
    add(&["kn"], UnitInfo::new(Speed, 1852.0 / 3600.0, false));
    add(&["admkn"], UnitInfo::new(Speed, 0.514_773_333_333_333_4, false));

    // Force (base: newton)
    add(&["N"], UnitInfo::new(Force, 1.0, true));
    add(&["dyn", "dy"], UnitInfo::new(Force, 1e-5, true));
    add(&["lbf"], UnitInfo::new(Force, 4.448_221_615_260_5, false));
    add(&["pond"], UnitInfo::new(Force, 0.009_806_65, true));

    m
});

/// SI and binary multiplier prefixes, longest token first so `da` and
/// the binary pairs win over single-letter matches.
static PREFIXES: Lazy<Vec<(&'static str, f64)>> = Lazy::new(|| {
    vec![
        ("Yi", (1u128 << 80) as f64),
        ("Zi", (1u128 << 70) as f64),
        ("Ei", (1u64 << 60) as f64),
        ("Pi", (1u64 << 50) as f64),
        ("Ti", (1u64 << 40) as f64),
        ("Gi", (1u64 << 30) as f64),
        ("Mi", (1u64 << 20) as f64),
        ("ki", (1u64 << 10) as f64),
        ("da", 1e1),
        ("Y", 1e24),
        ("Z", 1e21),
        ("E", 1e18),
        ("P", 1e15),
        ("T", 1e12),
        ("G", 1e9),
        ("M", 1e6),
        ("k", 1e3),
        ("h", 1e2),
        ("d", 1e-1),
        ("c", 1e-2),
        ("m", 1e-3),
        ("u", 1e-6),
        ("n", 1e-9),
        ("p", 1e-12),
        ("f", 1e-15),
        ("a", 1e-18),
        ("z", 1e-21),
        ("y", 1e-24),
    ]
});

/// Resolve a unit token to (category, factor-to-base). Exact names win;
/// otherwise a multiplier prefix may be split off a prefix-capable
/// unit. Binary prefixes only attach to information units.
fn resolve_unit(token: &str) -> Option<(UnitCategory, f64)> {
    if let Some(info) = UNITS.get(token) {
        return Some((info.category, info.to_base));
    }
    for (prefix, factor) in PREFIXES.iter() {
        if let Some(rest) = token.strip_prefix(prefix) {
            if let Some(info) = UNITS.get(rest) {
                if !info.allow_prefix {
                    continue;
                }
                let binary = prefix.len() == 2 && prefix.ends_with('i');
                if binary && info.category != UnitCategory::Information {
                    continue;
                }
                return Some((info.category, factor * info.to_base));
            }
        }
    }
    None
}

fn temp_canonical(unit: &str) -> &'static str {
    match unit {
        "C" | "cel" => "C",
        "F" | "fah" => "F",
        "K" | "kel" => "K",
        "Rank" => "Rank",
        _ => "Reau",
    }
}

// Celsius is the affine hub so the common identities (0C = 32F and
// back) come out exact instead of picking up Kelvin round-off.
fn to_celsius(value: f64, unit: &str) -> f64 {
    match temp_canonical(unit) {
        "F" => (value - 32.0) * 5.0 / 9.0,
        "K" => value - 273.15,
        "Rank" => (value - 491.67) * 5.0 / 9.0,
        "Reau" => value * 1.25,
        _ => value,
    }
}

fn from_celsius(value: f64, unit: &str) -> f64 {
    match temp_canonical(unit) {
        "F" => value * 9.0 / 5.0 + 32.0,
        "K" => value + 273.15,
        "Rank" => value * 9.0 / 5.0 + 491.67,
        "Reau" => value * 0.8,
        _ => value,
    }
}

fn convert_units(value: f64, from: &str, to: &str) -> Result<f64, ExcelError> {
    let (from_cat, from_factor) = resolve_unit(from).ok_or_else(ExcelError::new_na)?;
    let (to_cat, to_factor) = resolve_unit(to).ok_or_else(ExcelError::new_na)?;

    if from_cat != to_cat {
        return Err(ExcelError::new_na());
    }
    if from_cat == UnitCategory::Temperature {
        if temp_canonical(from) == temp_canonical(to) {
            return Ok(value);
        }
        return Ok(from_celsius(to_celsius(value, from), to));
    }
    Ok(value * from_factor / to_factor)
}

/// Converts a numeric value from one supported unit to another.
///
/// # Remarks
/// - Unit arguments must be text; unknown tokens and cross-family
///   requests return `#N/A`.
/// - SI prefixes attach to prefix-capable units (`"km"`, `"ms"`,
///   `"MWh"`); binary prefixes only to `bit`/`byte`.
#[derive(Debug)]
pub struct ConvertFn;
impl Function for ConvertFn {
    func_caps!(PURE);
    fn name(&self) -> &'static str {
        "CONVERT"
    }
    fn min_args(&self) -> usize {
        3
    }
    fn eval(
        &self,
        args: &[CellValue],
        _ctx: &dyn FunctionContext,
    ) -> Result<CellValue, ExcelError> {
        if let Some(e) = first_error(args) {
            return Err(e);
        }
        let value = coerce_num(&args[0])?;
        let from_unit = match &args[1] {
            CellValue::Text(s) => s.clone(),
            _ => return Err(ExcelError::new_na()),
        };
        let to_unit = match &args[2] {
            CellValue::Text(s) => s.clone(),
            _ => return Err(ExcelError::new_na()),
        };
        let result = convert_units(value, &from_unit, &to_unit)?;
        crate::coercion::sanitize_numeric(result).map(CellValue::Number)
    }
}

pub fn register_builtins() {
    crate::register_functions!(ConvertFn);
}
