//! Composable value predicates for `filter_with`

use serde_json::Value;

/// Matches a JSON string equal to `expected`.
pub fn string_value(expected: &str) -> impl Fn(&Value) -> bool + Clone {
    let expected = expected.to_string();
    move |value| value.as_str() == Some(expected.as_str())
}

/// Inverts a predicate.
pub fn not<P>(predicate: P) -> impl Fn(&Value) -> bool + Clone
where
    P: Fn(&Value) -> bool + Clone,
{
    move |value| !predicate(value)
}

/// Matches when either predicate matches.
pub fn or<A, B>(a: A, b: B) -> impl Fn(&Value) -> bool + Clone
where
    A: Fn(&Value) -> bool + Clone,
    B: Fn(&Value) -> bool + Clone,
{
    move |value| a(value) || b(value)
}
