//! Total ordering, equality and hashing for [`Value`].
//!
//! Values order by kind rank first (null, boolean, number, string, array,
//! object). Integers and decimals share a rank and compare numerically.
//! Objects compare by their entries sorted by key, so two objects with the
//! same entries in a different insertion order are equal.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use super::{Object, Value};

/// 2^63 as an f64; the smallest decimal above every i64.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    /// Structural comparison with case-sensitive strings and keys.
    pub fn compare(&self, other: &Value) -> Ordering {
        compare_values(self, other, false)
    }

    /// Structural comparison where strings and object keys compare
    /// case-insensitively.
    pub fn compare_icase(&self, other: &Value) -> Ordering {
        compare_values(self, other, true)
    }
}

fn compare_values(a: &Value, b: &Value, icase: bool) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => compare_decimals(*x, *y),
        (Value::Integer(x), Value::Decimal(y)) => compare_integer_decimal(*x, *y),
        (Value::Decimal(x), Value::Integer(y)) => compare_integer_decimal(*y, *x).reverse(),
        _ => {
            let by_rank = a.kind().rank().cmp(&b.kind().rank());
            if by_rank != Ordering::Equal {
                return by_rank;
            }
            match (a, b) {
                (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
                (Value::String(x), Value::String(y)) => compare_strings(x, y, icase),
                (Value::Array(x), Value::Array(y)) => {
                    for (l, r) in x.iter().zip(y.iter()) {
                        let ord = compare_values(l, r, icase);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    x.len().cmp(&y.len())
                }
                (Value::Object(x), Value::Object(y)) => compare_objects(x, y, icase),
                _ => Ordering::Equal,
            }
        }
    }
}

fn compare_decimals(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

fn compare_integer_decimal(i: i64, d: f64) -> Ordering {
    if d.is_nan() {
        return (i as f64).total_cmp(&d);
    }
    if d >= TWO_POW_63 {
        return Ordering::Less;
    }
    if d < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let floor = d.floor();
    match i.cmp(&(floor as i64)) {
        Ordering::Equal if d > floor => Ordering::Less,
        ord => ord,
    }
}

fn compare_strings(x: &str, y: &str, icase: bool) -> Ordering {
    if icase {
        x.chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase))
    } else {
        x.cmp(y)
    }
}

fn sorted_entries(map: &Object, icase: bool) -> Vec<(&String, &Value)> {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|(ka, _), (kb, _)| compare_strings(ka, kb, icase).then_with(|| ka.cmp(kb)));
    entries
}

fn compare_objects(x: &Object, y: &Object, icase: bool) -> Ordering {
    let left = sorted_entries(x, icase);
    let right = sorted_entries(y, icase);
    for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
        let ord = compare_strings(ka, kb, icase).then_with(|| compare_values(va, vb, icase));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

/// Returns the decimal as an i64 when it holds an exact integer in range.
fn integral(d: f64) -> Option<i64> {
    if d.is_finite() && d.fract() == 0.0 && (-TWO_POW_63..TWO_POW_63).contains(&d) {
        Some(d as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Decimal(d) => match integral(*d) {
                Some(i) => i.hash(state),
                None => d.to_bits().hash(state),
            },
            Value::String(s) => s.hash(state),
            Value::Array(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
            Value::Object(map) => {
                // Entry hashes are combined commutatively so insertion order
                // does not affect the result.
                let combined = map.iter().fold(0u64, |acc, (k, v)| {
                    let mut h = FxHasher::default();
                    k.hash(&mut h);
                    v.hash(&mut h);
                    acc.wrapping_add(h.finish())
                });
                map.len().hash(state);
                combined.hash(state);
            }
        }
    }
}
