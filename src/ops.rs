// src/ops.rs
//
// Plain Rust behaviour behind every exported symbol. Nothing here touches raw
// pointers; the ffi module owns the boundary.

use std::cell::RefCell;
use std::cmp::Ordering;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use serde_json::{Number, Value};

use crate::error::{ExampleError, Result};

/// `n!` with checked arithmetic. `0! == 1`; anything past `20!` overflows `i64`.
pub fn factorial(n: i64) -> Result<i64> {
    if n < 0 {
        return Err(ExampleError::NegativeInput { what: "n", value: n });
    }
    (2..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .ok_or(ExampleError::Overflow { op: "factorial", n })
}

pub fn greet(name: &str) -> String {
    let name = if name.is_empty() { "World" } else { name };
    format!("Hello, {name}!")
}

/// `s` repeated `n` times. The buffer is reserved up front with a fallible
/// allocation so an oversized count is an error, not a process abort.
pub fn repeat_string(s: &str, n: i64) -> Result<String> {
    let count = usize::try_from(n).map_err(|_| ExampleError::NegativeInput {
        what: "count",
        value: n,
    })?;
    let len = s
        .len()
        .checked_mul(count)
        .ok_or(ExampleError::Overflow { op: "repeat_string", n })?;

    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|source| ExampleError::Alloc { bytes: len, source })?;
    for _ in 0..count {
        out.push_str(s);
    }
    Ok(out)
}

/// Uppercased message with a trailing `!`.
pub fn shout(msg: &str) -> String {
    format!("{}!", msg.to_uppercase())
}

thread_local! {
    static COIN: RefCell<ChaCha8Rng> = RefCell::new(ChaCha8Rng::from_os_rng());
}

/// Fair coin flip. Each thread draws from its own generator.
pub fn maybe() -> bool {
    COIN.with(|rng| rng.borrow_mut().next_u32() & 1 == 1)
}

/// Sorts a JSON array of numbers ascending and re-encodes it compactly.
///
/// Integers compare exactly (including values above `i64::MAX`), integers
/// against floats compare exactly too, and floats among themselves use IEEE
/// total order. Equal elements keep their
/// input order and their original textual form.
pub fn sort_json_array(json: &str) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(ExampleError::NotANumberArray {
            found: kind_of(&value).to_string(),
        });
    };

    let mut numbers = items
        .into_iter()
        .map(|item| match item {
            Value::Number(n) => Ok(n),
            other => Err(ExampleError::NotANumberArray {
                found: format!("an array containing {}", kind_of(&other)),
            }),
        })
        .collect::<Result<Vec<Number>>>()?;

    numbers.sort_by(compare_numbers);
    Ok(serde_json::to_string(&numbers)?)
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_int_float(x, as_float(b)),
        (None, Some(y)) => compare_int_float(y, as_float(a)).reverse(),
        (None, None) => as_float(a).total_cmp(&as_float(b)),
    }
}

/// Exact integer/float ordering; routing `x` through `f64` would lose
/// precision above 2^53 and break transitivity.
fn compare_int_float(x: i128, f: f64) -> Ordering {
    // i128::MIN is -2^127, exactly representable
    const BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f.is_nan() || f >= BOUND {
        return Ordering::Less;
    }
    if f < -BOUND {
        return Ordering::Greater;
    }
    let floor = f.floor();
    match x.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        other => other,
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

fn as_float(n: &Number) -> f64 {
    // every serde_json number without arbitrary_precision converts
    n.as_f64().unwrap_or(f64::NAN)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_of_first_ten() {
        let expected = [1, 2, 6, 24, 120, 720, 5040, 40320, 362880, 3628800];
        for (n, want) in (1..=10).zip(expected) {
            assert_eq!(factorial(n).unwrap(), want, "{n}!");
        }
    }

    #[test]
    fn factorial_edges() {
        assert_eq!(factorial(0).unwrap(), 1);
        assert_eq!(factorial(20).unwrap(), 2_432_902_008_176_640_000);
        assert!(matches!(factorial(21), Err(ExampleError::Overflow { n: 21, .. })));
        assert!(matches!(
            factorial(-3),
            Err(ExampleError::NegativeInput { value: -3, .. })
        ));
    }

    #[test]
    fn greet_includes_name() {
        assert_eq!(greet("World"), "Hello, World!");
        assert_eq!(greet("Ferris"), "Hello, Ferris!");
        assert_eq!(greet(""), "Hello, World!");
    }

    #[test]
    fn repeat_string_counts() {
        assert_eq!(repeat_string("ha", 3).unwrap(), "hahaha");
        assert_eq!(repeat_string("ha", 0).unwrap(), "");
        assert_eq!(repeat_string("", 1_000).unwrap(), "");
        assert!(repeat_string("ha", -1).is_err());
        assert!(matches!(
            repeat_string("hah", i64::MAX),
            Err(ExampleError::Overflow { .. })
        ));
    }

    #[test]
    fn repeat_string_unallocatable_count_is_an_error() {
        assert!(matches!(
            repeat_string("ha", 1 << 45),
            Err(ExampleError::Alloc { .. })
        ));
    }

    #[test]
    fn shout_uppercases() {
        assert_eq!(shout("hello from yamlscript"), "HELLO FROM YAMLSCRIPT!");
        assert_eq!(shout("straße"), "STRASSE!");
    }

    #[test]
    fn maybe_eventually_yields_both() {
        let flips: Vec<bool> = (0..256).map(|_| maybe()).collect();
        assert!(flips.contains(&true));
        assert!(flips.contains(&false));
    }

    #[test]
    fn sorts_integers() {
        assert_eq!(sort_json_array("[3,1,4,1,5,9,2,6]").unwrap(), "[1,1,2,3,4,5,6,9]");
        assert_eq!(sort_json_array("[]").unwrap(), "[]");
        assert_eq!(sort_json_array(" [ -2, 7 , -10 ] ").unwrap(), "[-10,-2,7]");
    }

    #[test]
    fn sorts_mixed_numbers() {
        assert_eq!(
            sort_json_array("[2.5,1,-0.5,18446744073709551615,3]").unwrap(),
            "[-0.5,1,2.5,3,18446744073709551615]"
        );
    }

    #[test]
    fn integers_beside_floats_above_two_pow_53_stay_ordered() {
        let sorted =
            sort_json_array("[9007199254740993,9007199254740992.0,9007199254740992]").unwrap();
        let values: Vec<Value> = serde_json::from_str(&sorted).unwrap();

        assert_eq!(values.len(), 3);
        assert!(values[0].is_f64(), "{sorted}");
        assert_eq!(values[1].as_i64(), Some(9_007_199_254_740_992), "{sorted}");
        assert_eq!(values[2].as_i64(), Some(9_007_199_254_740_993), "{sorted}");
    }

    #[test]
    fn integer_float_ties_break_on_fraction() {
        assert_eq!(compare_int_float(3, 3.0), Ordering::Equal);
        assert_eq!(compare_int_float(3, 3.5), Ordering::Less);
        assert_eq!(compare_int_float(-3, -3.5), Ordering::Greater);
        assert_eq!(compare_int_float(i128::from(u64::MAX), 1e300), Ordering::Less);
        assert_eq!(compare_int_float(i128::from(i64::MIN), -1e300), Ordering::Greater);
    }

    #[test]
    fn rejects_non_arrays() {
        assert!(matches!(
            sort_json_array("{\"a\":1}"),
            Err(ExampleError::NotANumberArray { .. })
        ));
        assert!(matches!(
            sort_json_array("[1,\"two\"]"),
            Err(ExampleError::NotANumberArray { .. })
        ));
        assert!(matches!(sort_json_array("[1,"), Err(ExampleError::Json(_))));
    }
}
