//! Compile-time constant values
//!
//! A [`Value`] represents a value known at compile time, used for evaluating
//! static initializers. [`Value::Undefined`] stands in for unknown or
//! unrepresentable results; no operation here fails, it degrades.
//!
//! For arithmetic, the result's kind is promoted to a higher precision when
//! the value does not fit the original kind. Signedness is preserved
//! (promotion never flips signed to unsigned or back); any operation
//! involving a floating-point operand yields a floating-point result.

use std::cmp::Ordering;
use std::fmt;

use crate::frontend::lexer::Operator;
use crate::frontend::types::{Kind, TypeId};

/// A value representable in a Cobalt program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Undefined,
    Type(TypeId),
    Bool(bool),
    Int { x: i64, bits: u8 },
    Uint { x: u64, bits: u8 },
    Float { x: f64, bits: u8 },
}

impl Value {
    /// A signed integer value: 32 bits unless `x` needs all 64.
    pub fn make_int(x: i64) -> Value {
        if x < i32::MIN as i64 || x > i32::MAX as i64 {
            Value::Int { x, bits: 64 }
        } else {
            Value::Int { x, bits: 32 }
        }
    }

    /// An unsigned integer value: 32 bits unless `x` needs all 64.
    pub fn make_uint(x: u64) -> Value {
        if x > u32::MAX as u64 {
            Value::Uint { x, bits: 64 }
        } else {
            Value::Uint { x, bits: 32 }
        }
    }

    /// A floating-point value: 32 bits iff `x` round-trips through `f32`
    /// exactly.
    pub fn make_float(x: f64) -> Value {
        if x as f32 as f64 == x {
            Value::Float { x, bits: 32 }
        } else {
            Value::Float { x, bits: 64 }
        }
    }

    pub fn kind(&self) -> Kind {
        match *self {
            Value::Undefined => Kind::Undef,
            Value::Type(_) => Kind::Type,
            Value::Bool(_) => Kind::Bool,
            Value::Int { bits, .. } => match bits {
                8 => Kind::Int8,
                16 => Kind::Int16,
                32 => Kind::Int32,
                64 => Kind::Int64,
                _ => unreachable!("invalid int width {bits}"),
            },
            Value::Uint { bits, .. } => match bits {
                8 => Kind::Uint8,
                16 => Kind::Uint16,
                32 => Kind::Uint32,
                64 => Kind::Uint64,
                _ => unreachable!("invalid uint width {bits}"),
            },
            Value::Float { bits, .. } => match bits {
                32 => Kind::Float32,
                64 => Kind::Float64,
                _ => unreachable!("invalid float width {bits}"),
            },
        }
    }

    /// Applies a unary operator. Incompatible operator/kind combinations
    /// yield `Undefined`.
    pub fn unary(self, op: Operator) -> Value {
        use Operator::*;
        match self {
            Value::Bool(b) => match op {
                LNot => Value::Bool(!b),
                _ => Value::Undefined,
            },
            Value::Int { x, .. } => match op {
                Not => Value::make_int(!x),
                Inc => Value::make_int(x.wrapping_add(1)),
                Dec => Value::make_int(x.wrapping_sub(1)),
                Add => Value::make_int(x),
                Sub => Value::make_int(x.wrapping_neg()),
                _ => Value::Undefined,
            },
            Value::Uint { x, .. } => match op {
                Not => Value::make_uint(!x),
                Inc => Value::make_uint(x.wrapping_add(1)),
                Dec => Value::make_uint(x.wrapping_sub(1)),
                Add => Value::make_uint(x),
                Sub => Value::make_uint(x.wrapping_neg()),
                _ => Value::Undefined,
            },
            Value::Float { x, .. } => match op {
                Inc => Value::make_float(x + 1.0),
                Dec => Value::make_float(x - 1.0),
                Add => Value::make_float(x),
                Sub => Value::make_float(-x),
                _ => Value::Undefined,
            },
            _ => Value::Undefined,
        }
    }

    /// Applies a binary operator. Comparisons yield `Bool`; arithmetic
    /// promotes per the module rules; incompatible combinations yield
    /// `Undefined`.
    pub fn binary(self, op: Operator, w: Value) -> Value {
        match self {
            Value::Bool(b) => bool_binary(b, op, w),
            Value::Int { x, .. } => int_binary(x, op, w),
            Value::Uint { x, .. } => uint_binary(x, op, w),
            Value::Float { x, .. } => float_binary(x, op, w),
            _ => Value::Undefined,
        }
    }

    /// Converts to the given kind, sign- or zero-extending integers and
    /// rounding floats through `f32` when narrowing. Impossible conversions
    /// (including to the pointer-sized kinds, whose width is unknown here)
    /// yield `Undefined`.
    pub fn convert(self, to: Kind) -> Value {
        if to == self.kind() {
            return self;
        }

        match self {
            Value::Int { x, bits } => convert_int(x, bits, to),
            Value::Uint { x, bits } => convert_uint(x, bits, to),
            Value::Float { x, .. } => convert_float(x, to),
            // types and bools only convert to themselves
            _ => Value::Undefined,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Undefined => f.write_str("<undefined>"),
            Value::Type(_) => f.write_str("<type>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int { x, .. } => write!(f, "{x}"),
            Value::Uint { x, .. } => write!(f, "{x}"),
            Value::Float { x, bits: 32 } => write!(f, "{}", x as f32),
            Value::Float { x, .. } => write!(f, "{x}"),
        }
    }
}

// ============================================================================
// Booleans
// ============================================================================

fn bool_binary(v: bool, op: Operator, w: Value) -> Value {
    use Operator::*;
    let Value::Bool(w) = w else {
        return Value::Undefined;
    };
    match op {
        OrOr => Value::Bool(v || w),
        AndAnd => Value::Bool(v && w),
        Eql => Value::Bool(v == w),
        Neq => Value::Bool(v != w),
        _ => Value::Undefined,
    }
}

// ============================================================================
// Comparisons
// ============================================================================

fn is_comparison(op: Operator) -> bool {
    use Operator::*;
    matches!(op, Eql | Neq | Lss | Leq | Gtr | Geq)
}

/// Maps a total ordering to the outcome of a comparison operator. `Neq` is
/// by construction the negation of `Eql`.
fn ord_to_bool(ord: Ordering, op: Operator) -> Value {
    use Operator::*;
    let b = match op {
        Eql => ord == Ordering::Equal,
        Neq => ord != Ordering::Equal,
        Lss => ord == Ordering::Less,
        Leq => ord != Ordering::Greater,
        Gtr => ord == Ordering::Greater,
        Geq => ord != Ordering::Less,
        _ => return Value::Undefined,
    };
    Value::Bool(b)
}

/// The mathematical ordering of a signed and an unsigned integer.
fn int_uint_ord(v: i64, w: u64) -> Ordering {
    if v < 0 {
        Ordering::Less
    } else {
        (v as u64).cmp(&w)
    }
}

/// Compares two floats with native IEEE semantics (`NaN != NaN` is true).
fn float_float_cmp(v: f64, w: f64, op: Operator) -> Value {
    use Operator::*;
    let b = match op {
        Eql => v == w,
        Neq => v != w,
        Lss => v < w,
        Leq => v <= w,
        Gtr => v > w,
        Geq => v >= w,
        _ => return Value::Undefined,
    };
    Value::Bool(b)
}

/// Compares a signed integer with a float. A non-finite float compares
/// false under every operator; an exactly-integral float compares as an
/// integer, anything else as floats.
fn int_float_cmp(v: i64, w: f64, op: Operator) -> Value {
    if w.is_infinite() || w.is_nan() {
        return Value::Bool(false);
    }
    if float_can_i64(w) {
        ord_to_bool(v.cmp(&(w as i64)), op)
    } else {
        ord_to_bool(total_finite_ord(v as f64, w), op)
    }
}

/// Compares an unsigned integer with a float, same regime as
/// [`int_float_cmp`].
fn uint_float_cmp(v: u64, w: f64, op: Operator) -> Value {
    if w.is_infinite() || w.is_nan() {
        return Value::Bool(false);
    }
    if float_can_u64(w) {
        ord_to_bool(v.cmp(&(w as u64)), op)
    } else {
        ord_to_bool(total_finite_ord(v as f64, w), op)
    }
}

/// Ordering of two finite floats.
fn total_finite_ord(v: f64, w: f64) -> Ordering {
    v.partial_cmp(&w).unwrap_or(Ordering::Equal)
}

fn int_compare(v: i64, op: Operator, w: Value) -> Value {
    match w {
        Value::Int { x: w, .. } => ord_to_bool(v.cmp(&w), op),
        Value::Uint { x: w, .. } => ord_to_bool(int_uint_ord(v, w), op),
        Value::Float { x: w, .. } => int_float_cmp(v, w, op),
        _ => Value::Undefined,
    }
}

fn uint_compare(v: u64, op: Operator, w: Value) -> Value {
    match w {
        Value::Int { x: w, .. } => ord_to_bool(int_uint_ord(w, v).reverse(), op),
        Value::Uint { x: w, .. } => ord_to_bool(v.cmp(&w), op),
        Value::Float { x: w, .. } => uint_float_cmp(v, w, op),
        _ => Value::Undefined,
    }
}

fn float_compare(v: f64, op: Operator, w: Value) -> Value {
    match w {
        Value::Int { x: w, .. } => {
            if v.is_infinite() || v.is_nan() {
                return Value::Bool(false);
            }
            if float_can_i64(v) {
                ord_to_bool((v as i64).cmp(&w), op)
            } else {
                ord_to_bool(total_finite_ord(v, w as f64), op)
            }
        }
        Value::Uint { x: w, .. } => {
            if v.is_infinite() || v.is_nan() {
                return Value::Bool(false);
            }
            if float_can_u64(v) {
                ord_to_bool((v as u64).cmp(&w), op)
            } else {
                ord_to_bool(total_finite_ord(v, w as f64), op)
            }
        }
        Value::Float { x: w, .. } => float_float_cmp(v, w, op),
        _ => Value::Undefined,
    }
}

// ============================================================================
// Integer arithmetic
// ============================================================================

// Shifts follow the source-language semantics: a shift count at or beyond
// the width yields zero (or the sign fill for an arithmetic right shift).

fn shl_i(x: i64, n: u64) -> i64 {
    if n >= 64 {
        0
    } else {
        x.wrapping_shl(n as u32)
    }
}

fn shr_i(x: i64, n: u64) -> i64 {
    if n >= 64 {
        x >> 63
    } else {
        x >> n
    }
}

fn shl_u(x: u64, n: u64) -> u64 {
    if n >= 64 {
        0
    } else {
        x.wrapping_shl(n as u32)
    }
}

fn shr_u(x: u64, n: u64) -> u64 {
    if n >= 64 {
        0
    } else {
        x >> n
    }
}

fn int_binary(v: i64, op: Operator, w: Value) -> Value {
    use Operator::*;

    if is_comparison(op) {
        return int_compare(v, op, w);
    }

    match (op, w) {
        (Add, Value::Int { x: w, .. }) => Value::make_int(v.wrapping_add(w)),
        (Add, Value::Uint { x: w, .. }) => Value::make_int(v.wrapping_add(w as i64)),
        (Add, Value::Float { x: w, .. }) => Value::make_float(v as f64 + w),

        (Sub, Value::Int { x: w, .. }) => Value::make_int(v.wrapping_sub(w)),
        (Sub, Value::Uint { x: w, .. }) => Value::make_int(v.wrapping_sub(w as i64)),
        (Sub, Value::Float { x: w, .. }) => Value::make_float(v as f64 - w),

        (Or, Value::Int { x: w, .. }) => Value::make_int(v | w),
        (Or, Value::Uint { x: w, .. }) => Value::make_int(v | w as i64),

        (Xor, Value::Int { x: w, .. }) => Value::make_int(v ^ w),
        (Xor, Value::Uint { x: w, .. }) => Value::make_int(v ^ w as i64),

        (Mul, Value::Int { x: w, .. }) => Value::make_int(v.wrapping_mul(w)),
        (Mul, Value::Uint { x: w, .. }) => Value::make_int(v.wrapping_mul(w as i64)),
        (Mul, Value::Float { x: w, .. }) => Value::make_float(v as f64 * w),

        (Div, Value::Int { x: 0, .. }) => Value::Undefined,
        (Div, Value::Int { x: w, .. }) => Value::make_int(v.wrapping_div(w)),
        (Div, Value::Uint { x: 0, .. }) => Value::Undefined,
        (Div, Value::Uint { x: w, .. }) => Value::make_int(v.wrapping_div(w as i64)),
        (Div, Value::Float { x: w, .. }) if w == 0.0 => Value::Undefined,
        (Div, Value::Float { x: w, .. }) => Value::make_float(v as f64 / w),

        (Rem, Value::Int { x: 0, .. }) => Value::Undefined,
        (Rem, Value::Int { x: w, .. }) => Value::make_int(v.wrapping_rem(w)),
        (Rem, Value::Uint { x: 0, .. }) => Value::Undefined,
        (Rem, Value::Uint { x: w, .. }) => Value::make_int(v.wrapping_rem(w as i64)),

        (And, Value::Int { x: w, .. }) => Value::make_int(v & w),
        (And, Value::Uint { x: w, .. }) => Value::make_int(v & w as i64),

        // a negative signed shift count is undefined
        (Shl, Value::Int { x: w, .. }) if w < 0 => Value::Undefined,
        (Shl, Value::Int { x: w, .. }) => Value::make_int(shl_i(v, w as u64)),
        (Shl, Value::Uint { x: w, .. }) => Value::make_int(shl_i(v, w)),

        (Shr, Value::Int { x: w, .. }) if w < 0 => Value::Undefined,
        (Shr, Value::Int { x: w, .. }) => Value::make_int(shr_i(v, w as u64)),
        (Shr, Value::Uint { x: w, .. }) => Value::make_int(shr_i(v, w)),

        _ => Value::Undefined,
    }
}

fn uint_binary(v: u64, op: Operator, w: Value) -> Value {
    use Operator::*;

    if is_comparison(op) {
        return uint_compare(v, op, w);
    }

    match (op, w) {
        (Add, Value::Int { x: w, .. }) => Value::make_uint(v.wrapping_add(w as u64)),
        (Add, Value::Uint { x: w, .. }) => Value::make_uint(v.wrapping_add(w)),
        (Add, Value::Float { x: w, .. }) => Value::make_float(v as f64 + w),

        (Sub, Value::Int { x: w, .. }) => Value::make_uint(v.wrapping_sub(w as u64)),
        (Sub, Value::Uint { x: w, .. }) => Value::make_uint(v.wrapping_sub(w)),
        (Sub, Value::Float { x: w, .. }) => Value::make_float(v as f64 - w),

        (Or, Value::Int { x: w, .. }) => Value::make_uint(v | w as u64),
        (Or, Value::Uint { x: w, .. }) => Value::make_uint(v | w),

        (Xor, Value::Int { x: w, .. }) => Value::make_uint(v ^ w as u64),
        (Xor, Value::Uint { x: w, .. }) => Value::make_uint(v ^ w),

        (Mul, Value::Int { x: w, .. }) => Value::make_uint(v.wrapping_mul(w as u64)),
        (Mul, Value::Uint { x: w, .. }) => Value::make_uint(v.wrapping_mul(w)),
        (Mul, Value::Float { x: w, .. }) => Value::make_float(v as f64 * w),

        (Div, Value::Int { x: 0, .. }) => Value::Undefined,
        (Div, Value::Int { x: w, .. }) => Value::make_uint(v.wrapping_div(w as u64)),
        (Div, Value::Uint { x: 0, .. }) => Value::Undefined,
        (Div, Value::Uint { x: w, .. }) => Value::make_uint(v.wrapping_div(w)),
        (Div, Value::Float { x: w, .. }) if w == 0.0 => Value::Undefined,
        (Div, Value::Float { x: w, .. }) => Value::make_float(v as f64 / w),

        (Rem, Value::Int { x: 0, .. }) => Value::Undefined,
        (Rem, Value::Int { x: w, .. }) => Value::make_uint(v.wrapping_rem(w as u64)),
        (Rem, Value::Uint { x: 0, .. }) => Value::Undefined,
        (Rem, Value::Uint { x: w, .. }) => Value::make_uint(v.wrapping_rem(w)),

        (And, Value::Int { x: w, .. }) => Value::make_uint(v & w as u64),
        (And, Value::Uint { x: w, .. }) => Value::make_uint(v & w),

        (Shl, Value::Int { x: w, .. }) if w < 0 => Value::Undefined,
        (Shl, Value::Int { x: w, .. }) => Value::make_uint(shl_u(v, w as u64)),
        (Shl, Value::Uint { x: w, .. }) => Value::make_uint(shl_u(v, w)),

        (Shr, Value::Int { x: w, .. }) if w < 0 => Value::Undefined,
        (Shr, Value::Int { x: w, .. }) => Value::make_uint(shr_u(v, w as u64)),
        (Shr, Value::Uint { x: w, .. }) => Value::make_uint(shr_u(v, w)),

        _ => Value::Undefined,
    }
}

// ============================================================================
// Floating-point arithmetic
// ============================================================================

fn float_binary(v: f64, op: Operator, w: Value) -> Value {
    use Operator::*;

    if is_comparison(op) {
        return float_compare(v, op, w);
    }

    match (op, w) {
        (Add, Value::Int { x: w, .. }) => Value::make_float(v + w as f64),
        (Add, Value::Uint { x: w, .. }) => Value::make_float(v + w as f64),
        (Add, Value::Float { x: w, .. }) => Value::make_float(v + w),

        (Sub, Value::Int { x: w, .. }) => Value::make_float(v - w as f64),
        (Sub, Value::Uint { x: w, .. }) => Value::make_float(v - w as f64),
        (Sub, Value::Float { x: w, .. }) => Value::make_float(v - w),

        (Mul, Value::Int { x: w, .. }) => Value::make_float(v * w as f64),
        (Mul, Value::Uint { x: w, .. }) => Value::make_float(v * w as f64),
        (Mul, Value::Float { x: w, .. }) => Value::make_float(v * w),

        (Div, Value::Int { x: 0, .. }) => Value::Undefined,
        (Div, Value::Int { x: w, .. }) => Value::make_float(v / w as f64),
        (Div, Value::Uint { x: 0, .. }) => Value::Undefined,
        (Div, Value::Uint { x: w, .. }) => Value::make_float(v / w as f64),
        (Div, Value::Float { x: w, .. }) if w == 0.0 => Value::Undefined,
        (Div, Value::Float { x: w, .. }) => Value::make_float(v / w),

        _ => Value::Undefined,
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// The width of a sized numeric kind. The pointer-sized kinds have no width
/// known to the value domain.
fn kind_bits(kind: Kind) -> Option<u8> {
    match kind {
        Kind::Int8 | Kind::Uint8 => Some(8),
        Kind::Int16 | Kind::Uint16 => Some(16),
        Kind::Int32 | Kind::Uint32 | Kind::Float32 => Some(32),
        Kind::Int64 | Kind::Uint64 | Kind::Float64 => Some(64),
        _ => None,
    }
}

/// Sign-extends the low `n` bits of `x`.
fn sext(x: i64, n: u8) -> i64 {
    let s = 64 - u32::from(n);
    (x << s) >> s
}

/// Zero-extends (masks) the low `n` bits of `x`.
fn zext(x: u64, n: u8) -> u64 {
    if n >= 64 {
        x
    } else {
        x & ((1u64 << n) - 1)
    }
}

fn convert_int(x: i64, bits: u8, to: Kind) -> Value {
    let Some(n) = kind_bits(to) else {
        return Value::Undefined;
    };

    if to.is_signed() {
        if n > bits {
            Value::Int { x: sext(x, bits), bits: n }
        } else {
            Value::Int { x: sext(x, n), bits: n }
        }
    } else if to.is_unsigned() {
        if n > bits {
            Value::Uint { x: sext(x, bits) as u64, bits: n }
        } else {
            Value::Uint { x: zext(x as u64, n), bits: n }
        }
    } else if to.is_float() {
        if n == 32 {
            Value::Float { x: x as f32 as f64, bits: 32 }
        } else {
            Value::Float { x: x as f64, bits: 64 }
        }
    } else {
        Value::Undefined
    }
}

fn convert_uint(x: u64, bits: u8, to: Kind) -> Value {
    let Some(n) = kind_bits(to) else {
        return Value::Undefined;
    };

    if to.is_signed() {
        if n > bits {
            Value::Int { x: zext(x, bits) as i64, bits: n }
        } else {
            Value::Int { x: sext(x as i64, n), bits: n }
        }
    } else if to.is_unsigned() {
        if n > bits {
            Value::Uint { x: zext(x, bits), bits: n }
        } else {
            Value::Uint { x: zext(x, n), bits: n }
        }
    } else if to.is_float() {
        if n == 32 {
            Value::Float { x: x as f32 as f64, bits: 32 }
        } else {
            Value::Float { x: x as f64, bits: 64 }
        }
    } else {
        Value::Undefined
    }
}

fn convert_float(x: f64, to: Kind) -> Value {
    let Some(n) = kind_bits(to) else {
        return Value::Undefined;
    };

    if to.is_signed() {
        Value::Int { x: sext(x as i64, n), bits: n }
    } else if to.is_unsigned() {
        Value::Uint { x: zext(x as u64, n), bits: n }
    } else if to.is_float() {
        if n == 32 {
            Value::Float { x: x as f32 as f64, bits: 32 }
        } else {
            Value::Float { x, bits: 64 }
        }
    } else {
        Value::Undefined
    }
}

fn float_can_i64(f: f64) -> bool {
    f == f.trunc() && f >= i64::MIN as f64 && f <= i64::MAX as f64
}

fn float_can_u64(f: f64) -> bool {
    f == f.trunc() && f >= 0.0 && f <= u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use Operator::*;

    fn int(x: i64) -> Value {
        Value::make_int(x)
    }

    fn uint(x: u64) -> Value {
        Value::make_uint(x)
    }

    fn float(x: f64) -> Value {
        Value::make_float(x)
    }

    #[test]
    fn make_int_width() {
        assert_eq!(int(0).kind(), Kind::Int32);
        assert_eq!(int(i32::MAX as i64).kind(), Kind::Int32);
        assert_eq!(int(i32::MIN as i64).kind(), Kind::Int32);
        assert_eq!(int(i32::MAX as i64 + 1).kind(), Kind::Int64);
        assert_eq!(int(i32::MIN as i64 - 1).kind(), Kind::Int64);
    }

    #[test]
    fn make_uint_width() {
        assert_eq!(uint(0).kind(), Kind::Uint32);
        assert_eq!(uint(u32::MAX as u64).kind(), Kind::Uint32);
        assert_eq!(uint(u32::MAX as u64 + 1).kind(), Kind::Uint64);
    }

    #[test]
    fn make_float_width() {
        assert_eq!(float(1.5).kind(), Kind::Float32);
        assert_eq!(float(0.0).kind(), Kind::Float32);
        // 0.1 is not exactly representable in f32
        assert_eq!(float(0.1).kind(), Kind::Float64);
        assert_eq!(float(1e300).kind(), Kind::Float64);
    }

    #[test]
    fn unary_ops() {
        assert_eq!(Value::Bool(true).unary(LNot), Value::Bool(false));
        assert_eq!(int(5).unary(Sub), int(-5));
        assert_eq!(int(5).unary(Add), int(5));
        assert_eq!(int(5).unary(Not), int(!5));
        assert_eq!(int(5).unary(Inc), int(6));
        assert_eq!(int(5).unary(Dec), int(4));
        assert_eq!(uint(5).unary(Inc), uint(6));
        assert_eq!(float(1.5).unary(Sub), float(-1.5));
        assert_eq!(float(1.5).unary(Inc), float(2.5));
    }

    #[test]
    fn unsupported_unary_is_undefined() {
        assert_eq!(Value::Bool(true).unary(Sub), Value::Undefined);
        assert_eq!(int(5).unary(LNot), Value::Undefined);
        assert_eq!(float(1.0).unary(Not), Value::Undefined);
        assert_eq!(Value::Undefined.unary(Sub), Value::Undefined);
        assert_eq!(Value::Type(0).unary(Sub), Value::Undefined);
    }

    #[test]
    fn bool_logic() {
        let (t, f) = (Value::Bool(true), Value::Bool(false));
        assert_eq!(t.binary(OrOr, f), t);
        assert_eq!(t.binary(AndAnd, f), f);
        assert_eq!(t.binary(Eql, t), t);
        assert_eq!(t.binary(Neq, t), f);
        assert_eq!(t.binary(Add, t), Value::Undefined);
        assert_eq!(t.binary(Eql, int(1)), Value::Undefined);
    }

    #[test]
    fn int_arithmetic_promotes() {
        assert_eq!(int(1).binary(Add, int(2)), int(3));
        // overflow past 32 bits widens
        assert_eq!(
            int(i32::MAX as i64).binary(Add, int(1)),
            Value::Int { x: i32::MAX as i64 + 1, bits: 64 }
        );
        // int op uint stays signed
        assert_eq!(int(10).binary(Sub, uint(3)), int(7));
        // int op float goes float
        assert_eq!(int(1).binary(Add, float(0.5)), float(1.5));
        // uint op int stays unsigned
        assert_eq!(uint(10).binary(Add, int(3)), uint(13));
        // float op anything stays float
        assert_eq!(float(0.5).binary(Mul, int(4)), float(2.0));
    }

    #[test]
    fn division_and_remainder_by_zero() {
        assert_eq!(int(1).binary(Div, int(0)), Value::Undefined);
        assert_eq!(int(1).binary(Rem, int(0)), Value::Undefined);
        assert_eq!(uint(1).binary(Div, uint(0)), Value::Undefined);
        assert_eq!(uint(1).binary(Rem, int(0)), Value::Undefined);
        assert_eq!(float(1.0).binary(Div, float(0.0)), Value::Undefined);
        assert_eq!(float(1.0).binary(Div, int(0)), Value::Undefined);
        assert_eq!(int(7).binary(Div, int(2)), int(3));
        assert_eq!(int(7).binary(Rem, int(2)), int(1));
    }

    #[test]
    fn float_remainder_is_undefined() {
        assert_eq!(float(7.0).binary(Rem, float(2.0)), Value::Undefined);
        assert_eq!(int(7).binary(Rem, float(2.0)), Value::Undefined);
    }

    #[test]
    fn shifts() {
        assert_eq!(int(1).binary(Shl, int(4)), int(16));
        assert_eq!(int(16).binary(Shr, int(4)), int(1));
        assert_eq!(uint(1).binary(Shl, uint(4)), uint(16));
        // negative signed shift counts are undefined
        assert_eq!(int(1).binary(Shl, int(-1)), Value::Undefined);
        assert_eq!(int(1).binary(Shr, int(-1)), Value::Undefined);
        assert_eq!(uint(1).binary(Shl, int(-1)), Value::Undefined);
        // shift counts at or past the width drain to zero / sign fill
        assert_eq!(int(1).binary(Shl, int(64)), int(0));
        assert_eq!(int(-1).binary(Shr, uint(100)), int(-1));
        assert_eq!(uint(1).binary(Shl, uint(64)), uint(0));
        assert_eq!(uint(u64::MAX).binary(Shr, uint(100)), uint(0));
    }

    #[test]
    fn mixed_sign_comparisons() {
        // -1 < any unsigned value
        assert_eq!(int(-1).binary(Lss, uint(0)), Value::Bool(true));
        assert_eq!(int(-1).binary(Leq, uint(0)), Value::Bool(true));
        assert_eq!(int(-1).binary(Eql, uint(u64::MAX)), Value::Bool(false));
        assert_eq!(int(-1).binary(Gtr, uint(0)), Value::Bool(false));
        // and the mirror image
        assert_eq!(uint(0).binary(Gtr, int(-1)), Value::Bool(true));
        assert_eq!(uint(0).binary(Geq, int(-1)), Value::Bool(true));
        assert_eq!(uint(0).binary(Lss, int(-1)), Value::Bool(false));
        // equal magnitudes agree
        assert_eq!(int(7).binary(Eql, uint(7)), Value::Bool(true));
        assert_eq!(int(7).binary(Leq, uint(7)), Value::Bool(true));
        assert_eq!(int(7).binary(Geq, uint(7)), Value::Bool(true));
        assert_eq!(uint(7).binary(Eql, int(7)), Value::Bool(true));
    }

    #[test]
    fn neq_is_negation_of_eql() {
        let pairs: [(Value, Value); 6] = [
            (int(1), int(1)),
            (int(1), int(2)),
            (uint(5), uint(5)),
            (uint(5), int(-5)),
            (int(-1), uint(u64::MAX)),
            (float(2.0), int(2)),
        ];
        for (v, w) in pairs {
            let eql = v.binary(Eql, w);
            let neq = v.binary(Neq, w);
            match (eql, neq) {
                (Value::Bool(e), Value::Bool(n)) => assert_eq!(e, !n, "{v:?} vs {w:?}"),
                other => panic!("non-bool comparison result: {other:?}"),
            }
        }
    }

    #[test]
    fn int_float_comparisons() {
        // 1.5 == 1 is false, not a truncating comparison
        assert_eq!(float(1.5).binary(Eql, int(1)), Value::Bool(false));
        assert_eq!(float(1.5).binary(Gtr, int(1)), Value::Bool(true));
        assert_eq!(int(1).binary(Lss, float(1.5)), Value::Bool(true));
        assert_eq!(float(2.0).binary(Eql, int(2)), Value::Bool(true));
        assert_eq!(uint(3).binary(Leq, float(3.0)), Value::Bool(true));
    }

    #[test]
    fn non_finite_floats_compare_false() {
        for op in [Eql, Neq, Lss, Leq, Gtr, Geq] {
            assert_eq!(int(1).binary(op, float(f64::NAN)), Value::Bool(false));
            assert_eq!(int(1).binary(op, float(f64::INFINITY)), Value::Bool(false));
            assert_eq!(
                uint(1).binary(op, float(f64::NEG_INFINITY)),
                Value::Bool(false)
            );
            assert_eq!(float(f64::NAN).binary(op, int(1)), Value::Bool(false));
        }
        // float-to-float keeps IEEE semantics
        assert_eq!(
            float(f64::NAN).binary(Neq, float(f64::NAN)),
            Value::Bool(true)
        );
        assert_eq!(
            float(f64::INFINITY).binary(Gtr, float(1.0)),
            Value::Bool(true)
        );
    }

    #[test]
    fn huge_float_compares_as_float() {
        // 1e300 is integral but far outside i64, so the comparison falls
        // back to floating point
        assert_eq!(int(1).binary(Lss, float(1e300)), Value::Bool(true));
        assert_eq!(float(1e300).binary(Gtr, uint(1)), Value::Bool(true));
    }

    #[test]
    fn convert_identity() {
        assert_eq!(int(5).convert(Kind::Int32), int(5));
        assert_eq!(Value::Bool(true).convert(Kind::Bool), Value::Bool(true));
        assert_eq!(Value::Type(3).convert(Kind::Type), Value::Type(3));
    }

    #[test]
    fn convert_narrowing_wraps() {
        // (-1 as uint8) wraps to 0xFF
        assert_eq!(
            int(-1).convert(Kind::Uint8),
            Value::Uint { x: 0xFF, bits: 8 }
        );
        assert_eq!(
            int(0x1_23).convert(Kind::Int8),
            Value::Int { x: 0x23, bits: 8 }
        );
        // sign extension on a narrowed negative pattern
        assert_eq!(
            int(0xFF).convert(Kind::Int8),
            Value::Int { x: -1, bits: 8 }
        );
    }

    #[test]
    fn convert_widening_extends() {
        let narrow = int(-1).convert(Kind::Int8);
        assert_eq!(narrow.convert(Kind::Int64), Value::Int { x: -1, bits: 64 });

        let unsigned = int(-1).convert(Kind::Uint8); // 0xFF
        assert_eq!(
            unsigned.convert(Kind::Uint64),
            Value::Uint { x: 0xFF, bits: 64 }
        );
        // widening a uint into a signed type zero-extends
        assert_eq!(
            unsigned.convert(Kind::Int64),
            Value::Int { x: 0xFF, bits: 64 }
        );
    }

    #[test]
    fn convert_to_float() {
        assert_eq!(int(1).convert(Kind::Float64), Value::Float { x: 1.0, bits: 64 });
        assert_eq!(
            uint(3).convert(Kind::Float32),
            Value::Float { x: 3.0, bits: 32 }
        );
        // narrowing to f32 rounds through f32
        let rounded = float(0.1).convert(Kind::Float32);
        assert_eq!(rounded, Value::Float { x: 0.1f32 as f64, bits: 32 });
    }

    #[test]
    fn convert_float_to_int_truncates() {
        assert_eq!(
            float(2.75).convert(Kind::Int32),
            Value::Int { x: 2, bits: 32 }
        );
        assert_eq!(
            float(2.75).convert(Kind::Uint8),
            Value::Uint { x: 2, bits: 8 }
        );
    }

    #[test]
    fn impossible_conversions() {
        assert_eq!(int(1).convert(Kind::Bool), Value::Undefined);
        assert_eq!(Value::Bool(true).convert(Kind::Int32), Value::Undefined);
        assert_eq!(Value::Type(0).convert(Kind::Int32), Value::Undefined);
        assert_eq!(int(1).convert(Kind::Void), Value::Undefined);
        assert_eq!(Value::Undefined.convert(Kind::Int32), Value::Undefined);
        // pointer-sized kinds have no width in the value domain
        assert_eq!(int(1).convert(Kind::Intptr), Value::Undefined);
        assert_eq!(uint(1).convert(Kind::Uintptr), Value::Undefined);
    }

    #[test]
    fn binary_result_kinds() {
        // every result is bool, a promoted numeric kind, or undefined
        let values = [int(-2), int(3), uint(7), float(1.5), Value::Bool(true)];
        let ops = [
            OrOr, AndAnd, Eql, Neq, Lss, Leq, Gtr, Geq, Add, Sub, Or, Xor, Mul, Div, Rem, And,
            Shl, Shr,
        ];
        for v in values {
            for w in values {
                for op in ops {
                    let kind = v.binary(op, w).kind();
                    assert!(
                        kind == Kind::Bool || kind == Kind::Undef || kind.is_numeric(),
                        "{v:?} {op:?} {w:?} -> {kind:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn display() {
        assert_eq!(Value::Undefined.to_string(), "<undefined>");
        assert_eq!(Value::Type(0).to_string(), "<type>");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(int(-7).to_string(), "-7");
        assert_eq!(uint(7).to_string(), "7");
        assert_eq!(float(1.5).to_string(), "1.5");
    }
}
