use std::fmt::{Display, Formatter, Result as FmtResult};

/// Initial value of a `static final` field, from its `ConstantValue` attribute
///
/// `Display` renders the value the way Java source would show it (numbers follow
/// `Double.toString` and friends, strings are double-quoted).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// Covers `int`, `short`, `char`, `byte`, and `boolean` fields
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Display for ConstantValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConstantValue::Integer(integer) => write!(f, "{}", integer),
            ConstantValue::Long(long) => write!(f, "{}", long),
            ConstantValue::Float(float) => f.write_str(&java_float(*float)),
            ConstantValue::Double(double) => f.write_str(&java_double(*double)),
            ConstantValue::String(string) => f.write_str(&quote_java_string(string)),
        }
    }
}

/// Wrap a string in double quotes, escaping only embedded double quotes
///
/// Backslashes and control characters are left alone (line breaks get escaped by whoever writes
/// the text out line by line).
pub fn quote_java_string(string: &str) -> String {
    format!("\"{}\"", string.replace('"', "\\\""))
}

/// Render a `double` like `Double.toString`
pub fn java_double(value: f64) -> String {
    java_decimal(value, format!("{:?}", value), format!("{:E}", value))
}

/// Render a `float` like `Float.toString`
pub fn java_float(value: f32) -> String {
    java_decimal(value as f64, format!("{:?}", value), format!("{:E}", value))
}

/// Java uses plain notation for magnitudes in `[10^-3, 10^7)` and computerized scientific
/// notation (with at least one digit after the point) outside of that.
fn java_decimal(value: f64, plain: String, scientific: String) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        let infinity = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return String::from(infinity);
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return plain;
    }

    match scientific.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => scientific,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn doubles() {
        assert_eq!(java_double(1.0), "1.0");
        assert_eq!(java_double(-0.0), "-0.0");
        assert_eq!(java_double(0.001), "0.001");
        assert_eq!(java_double(1234567.5), "1234567.5");
        assert_eq!(java_double(1e7), "1.0E7");
        assert_eq!(java_double(1.5e-5), "1.5E-5");
        assert_eq!(java_double(f64::NAN), "NaN");
        assert_eq!(java_double(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn floats() {
        assert_eq!(java_float(0.1), "0.1");
        assert_eq!(java_float(3e10), "3.0E10");
    }

    #[test]
    fn constant_values() {
        assert_eq!(ConstantValue::Integer(-3).to_string(), "-3");
        assert_eq!(ConstantValue::Long(1 << 40).to_string(), "1099511627776");
        assert_eq!(
            ConstantValue::String(String::from("say \"hi\"")).to_string(),
            "\"say \\\"hi\\\"\""
        );
    }
}
