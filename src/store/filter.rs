//! Predicate filtering and pagination for record queries.
//!
//! Strict matching: exact equality, no type coercion, ordering only
//! between two numbers or two strings. A missing field never matches;
//! a null value never matches.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Default page size when the caller supplies none.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Comparison operator for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

/// One field condition. A filter is a list of predicates combined
/// with AND semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: FilterOp,
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq(value),
        }
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gt(value),
        }
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte(value),
        }
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lt(value),
        }
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte(value),
        }
    }
}

/// Offset/limit window over a filtered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Applies the window to an already-ordered result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect()
    }
}

/// True when the payload satisfies every predicate.
pub fn matches(data: &Map<String, Value>, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| matches_one(data, p))
}

fn matches_one(data: &Map<String, Value>, predicate: &Predicate) -> bool {
    let actual = match data.get(&predicate.field) {
        Some(v) if !v.is_null() => v,
        _ => return false,
    };

    match &predicate.op {
        FilterOp::Eq(expected) => actual == expected,
        FilterOp::Gt(bound) => ordered(actual, bound, Ordering::is_gt),
        FilterOp::Gte(bound) => ordered(actual, bound, Ordering::is_ge),
        FilterOp::Lt(bound) => ordered(actual, bound, Ordering::is_lt),
        FilterOp::Lte(bound) => ordered(actual, bound, Ordering::is_le),
    }
}

fn ordered(actual: &Value, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    compare(actual, bound).is_some_and(accept)
}

/// Ordering between two values of the same comparable kind. Numbers
/// compare numerically, strings lexicographically; everything else is
/// unordered.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            let (af, bf) = (a.as_f64()?, b.as_f64()?);
            af.partial_cmp(&bf)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_equality_is_exact() {
        let d = data(json!({ "name": "Alice", "age": 30 }));
        assert!(matches(&d, &[Predicate::eq("name", json!("Alice"))]));
        assert!(!matches(&d, &[Predicate::eq("name", json!("Bob"))]));
        // No coercion: "30" does not match 30.
        assert!(!matches(&d, &[Predicate::eq("age", json!("30"))]));
    }

    #[test]
    fn test_range_predicates() {
        let d = data(json!({ "age": 25 }));
        assert!(matches(&d, &[Predicate::gte("age", json!(25))]));
        assert!(matches(&d, &[Predicate::lte("age", json!(25))]));
        assert!(!matches(&d, &[Predicate::gt("age", json!(25))]));
        assert!(!matches(&d, &[Predicate::lt("age", json!(25))]));
    }

    #[test]
    fn test_string_ordering() {
        let d = data(json!({ "code": "B" }));
        assert!(matches(&d, &[Predicate::gt("code", json!("A"))]));
        assert!(!matches(&d, &[Predicate::gt("code", json!("C"))]));
    }

    #[test]
    fn test_and_semantics() {
        let d = data(json!({ "age": 25, "active": true }));
        let preds = vec![
            Predicate::gte("age", json!(18)),
            Predicate::eq("active", json!(true)),
        ];
        assert!(matches(&d, &preds));

        let preds = vec![
            Predicate::gte("age", json!(18)),
            Predicate::eq("active", json!(false)),
        ];
        assert!(!matches(&d, &preds));
    }

    #[test]
    fn test_missing_or_null_never_matches() {
        let d = data(json!({ "name": null }));
        assert!(!matches(&d, &[Predicate::eq("name", json!("Alice"))]));
        assert!(!matches(&d, &[Predicate::eq("absent", json!(1))]));
    }

    #[test]
    fn test_cross_kind_ordering_is_unordered() {
        let d = data(json!({ "age": 25 }));
        assert!(!matches(&d, &[Predicate::gt("age", json!("20"))]));
    }

    #[test]
    fn test_mixed_numeric_width_comparison() {
        let d = data(json!({ "score": 2 }));
        assert!(matches(&d, &[Predicate::gt("score", json!(1.5))]));
    }

    #[test]
    fn test_page_window() {
        let page = Page::new(2, 1);
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        assert_eq!(Page::default().limit, DEFAULT_PAGE_LIMIT);
    }
}
