//! Tables produced by the declaration parser and consumed by the recipe layer.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered key → value mapping of a `declare -A` variable.
pub type AssociativeArray = IndexMap<String, String>;

/// Variable name → value, in dump order. `None` is a declared-but-unset variable.
pub type Variables = IndexMap<String, Option<VariableValue>>;

/// Function name → raw body text between the outermost braces.
pub type Functions = IndexMap<String, String>;

/// The value of one shell variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    /// `declare -- name="value"`
    Scalar(String),
    /// `declare -a name=([0]="a" [2]="c")`
    Indexed(IndexedArray),
    /// `declare -A name=([key]="value" )`
    Associative(AssociativeArray),
}

impl VariableValue {
    /// The scalar value, or `None` for arrays.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            VariableValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Scalar(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Scalar(value)
    }
}

/// A bash indexed array. Unassigned indices below the highest assigned one
/// are holes (`None`), never removed entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexedArray(Vec<Option<String>>);

impl IndexedArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` at `index`, extending the array with holes as needed.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if index >= self.0.len() {
            self.0.resize(index + 1, None);
        }
        self.0[index] = Some(value.into());
    }

    /// Append a value after the last slot.
    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(Some(value.into()));
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|v| v.as_deref())
    }

    /// Number of slots, holes included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when some index below the length is unassigned.
    pub fn has_holes(&self) -> bool {
        self.0.iter().any(Option::is_none)
    }

    /// Assigned elements with their indices, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_deref().map(|v| (i, v)))
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for IndexedArray {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| Some(s.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_past_end_leaves_holes() {
        let mut arr = IndexedArray::new();
        arr.set(0, "a");
        arr.set(2, "c");
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get(1), None);
        assert!(arr.has_holes());
        assert_eq!(arr.slots(), &[Some("a".into()), None, Some("c".into())]);
    }

    #[test]
    fn out_of_order_assignment() {
        let mut arr = IndexedArray::new();
        arr.set(3, "d");
        arr.set(1, "b");
        assert_eq!(arr.iter().collect::<Vec<_>>(), vec![(1, "b"), (3, "d")]);
    }

    #[test]
    fn dense_array_has_no_holes() {
        let arr: IndexedArray = ["a", "b"].into_iter().collect();
        assert!(!arr.has_holes());
        assert_eq!(arr.get(1), Some("b"));
    }

    #[test]
    fn serializes_untagged() {
        let mut vars = Variables::new();
        vars.insert("pkgname".into(), Some("foo".into()));
        let mut arr = IndexedArray::new();
        arr.set(1, "b");
        vars.insert("arr".into(), Some(VariableValue::Indexed(arr)));
        vars.insert("unset".into(), None);
        let json = serde_json::to_string(&vars).unwrap();
        assert_eq!(json, r#"{"pkgname":"foo","arr":[null,"b"],"unset":null}"#);
    }
}
