//! Dotted-path descent and array-flattening traversal
//!
//! Paths are dotted key lists (`"amount.numerator.value"`). The `contained*`
//! family descends through object keys only and never crosses arrays; use
//! `find_all` when a path segment may land on an array (`"entry.resource"`,
//! `"identifier"`), which flattens one level per array it encounters.

use serde_json::Value;

use crate::error::{Error, Result};

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn descend<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Navigation accessors over a parsed JSON node.
///
/// The `contained*` methods fail with [`Error::MissingField`] when the path is
/// absent; the `*_or_null` variants return `None` instead. A value that is
/// present but has the wrong JSON type always fails with
/// [`Error::TypeMismatch`], even in the `*_or_null` variants' strict
/// counterparts — `*_or_null` treats a type mismatch as absence, matching the
/// graceful-degradation contract of optional FHIR fields.
pub trait Contained {
    fn contained(&self, path: &str) -> Result<&Value>;
    fn contained_or_null(&self, path: &str) -> Option<&Value>;

    fn contained_str(&self, path: &str) -> Result<&str>;
    fn contained_str_or_null(&self, path: &str) -> Option<&str>;

    fn contained_int(&self, path: &str) -> Result<i64>;
    fn contained_int_or_null(&self, path: &str) -> Option<i64>;

    fn contained_f64(&self, path: &str) -> Result<f64>;
    fn contained_f64_or_null(&self, path: &str) -> Option<f64>;

    fn contained_bool(&self, path: &str) -> Result<bool>;
    fn contained_bool_or_null(&self, path: &str) -> Option<bool>;

    fn contained_array(&self, path: &str) -> Result<&Vec<Value>>;
    fn contained_array_or_null(&self, path: &str) -> Option<&Vec<Value>>;

    /// Lazy, restartable traversal of all nodes reachable by `path`,
    /// flattening one level per array encountered (including a terminal
    /// array). Yields nothing when the path is absent.
    fn find_all(&self, path: &str) -> FindAll<'_>;
}

impl Contained for Value {
    fn contained(&self, path: &str) -> Result<&Value> {
        descend(self, path).ok_or_else(|| Error::missing(path))
    }

    fn contained_or_null(&self, path: &str) -> Option<&Value> {
        descend(self, path)
    }

    fn contained_str(&self, path: &str) -> Result<&str> {
        self.contained(path)?
            .as_str()
            .ok_or_else(|| Error::mismatch(path, "string"))
    }

    fn contained_str_or_null(&self, path: &str) -> Option<&str> {
        descend(self, path)?.as_str()
    }

    fn contained_int(&self, path: &str) -> Result<i64> {
        self.contained(path)?
            .as_i64()
            .ok_or_else(|| Error::mismatch(path, "integer"))
    }

    fn contained_int_or_null(&self, path: &str) -> Option<i64> {
        descend(self, path)?.as_i64()
    }

    fn contained_f64(&self, path: &str) -> Result<f64> {
        self.contained(path)?
            .as_f64()
            .ok_or_else(|| Error::mismatch(path, "number"))
    }

    fn contained_f64_or_null(&self, path: &str) -> Option<f64> {
        descend(self, path)?.as_f64()
    }

    fn contained_bool(&self, path: &str) -> Result<bool> {
        self.contained(path)?
            .as_bool()
            .ok_or_else(|| Error::mismatch(path, "boolean"))
    }

    fn contained_bool_or_null(&self, path: &str) -> Option<bool> {
        descend(self, path)?.as_bool()
    }

    fn contained_array(&self, path: &str) -> Result<&Vec<Value>> {
        self.contained(path)?
            .as_array()
            .ok_or_else(|| Error::mismatch(path, "array"))
    }

    fn contained_array_or_null(&self, path: &str) -> Option<&Vec<Value>> {
        descend(self, path)?.as_array()
    }

    fn find_all(&self, path: &str) -> FindAll<'_> {
        FindAll::new(self, split_path(path))
    }
}

/// Iterator over all nodes reachable by a dotted path.
///
/// Document order is preserved. The iterator is finite (the tree is finite
/// and each step strictly descends) and cheap to clone, so a traversal can be
/// restarted by calling [`Contained::find_all`] again or by cloning.
#[derive(Clone)]
pub struct FindAll<'a> {
    // (node, index of the next path segment to apply)
    stack: Vec<(&'a Value, usize)>,
    segments: Vec<String>,
}

impl<'a> FindAll<'a> {
    pub(crate) fn new(root: &'a Value, segments: Vec<String>) -> Self {
        FindAll {
            stack: vec![(root, 0)],
            segments,
        }
    }
}

impl<'a> Iterator for FindAll<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        while let Some((node, idx)) = self.stack.pop() {
            if let Value::Array(items) = node {
                // Reverse push keeps document order on the LIFO stack.
                for item in items.iter().rev() {
                    self.stack.push((item, idx));
                }
                continue;
            }
            if idx == self.segments.len() {
                if node.is_null() {
                    continue;
                }
                return Some(node);
            }
            if let Some(child) = node.get(self.segments[idx].as_str()) {
                self.stack.push((child, idx + 1));
            }
        }
        None
    }
}

/// Narrow a node sequence to elements for which any value at `path`
/// satisfies `predicate`.
pub fn filter_with<'a, I, P>(
    iter: I,
    path: &str,
    predicate: P,
) -> impl Iterator<Item = &'a Value>
where
    I: Iterator<Item = &'a Value>,
    P: Fn(&Value) -> bool,
{
    let segments = split_path(path);
    iter.filter(move |node| {
        FindAll::new(node, segments.clone()).any(|value| predicate(value))
    })
}
