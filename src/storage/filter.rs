use serde_json::Value;

use crate::types::ObjectId;

/// Query predicate over JSON documents. Paths are dotted field names.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
    And(Vec<Filter>),
    /// Matches when any element of the array at the path satisfies the inner filter.
    ElemMatch(String, Box<Filter>),
}

impl Filter {
    pub fn eq(path: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(path.to_string(), value.into())
    }

    pub fn by_id(id: ObjectId) -> Self {
        Filter::eq("_id", id.to_hex())
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn elem_match(path: &str, inner: Filter) -> Self {
        Filter::ElemMatch(path.to_string(), Box::new(inner))
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, expected) => match lookup(doc, path) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            },
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::ElemMatch(path, inner) => lookup(doc, path)
                .and_then(Value::as_array)
                .is_some_and(|elems| elems.iter().any(|e| e.is_object() && inner.matches(e))),
        }
    }
}

pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, key| value.get(key))
}

pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_matches_nested_paths() {
        let doc = json!({ "a": { "b": "x" }, "n": 3 });
        assert!(Filter::eq("a.b", "x").matches(&doc));
        assert!(Filter::eq("n", 3).matches(&doc));
        assert!(!Filter::eq("a.b", "y").matches(&doc));
    }

    #[test]
    fn eq_null_matches_missing_field() {
        let doc = json!({ "a": 1 });
        assert!(Filter::eq("missing", Value::Null).matches(&doc));
        assert!(!Filter::eq("missing", "x").matches(&doc));
    }

    #[test]
    fn elem_match_scans_embedded_arrays() {
        let doc = json!({
            "collection_lists": [
                { "list_name": "Wishlist" },
                { "list_name": "Test Collection" }
            ]
        });
        let hit = Filter::elem_match("collection_lists", Filter::eq("list_name", "Test Collection"));
        let miss = Filter::elem_match("collection_lists", Filter::eq("list_name", "Other"));
        assert!(hit.matches(&doc));
        assert!(!miss.matches(&doc));
        assert!(!hit.matches(&json!({ "collection_lists": "not an array" })));
    }

    #[test]
    fn elem_match_ignores_scalar_elements() {
        let doc = json!({ "tags": ["#test1", "#test2"] });
        assert!(!Filter::elem_match("tags", Filter::eq("list_name", Value::Null)).matches(&doc));
        assert!(!Filter::elem_match("tags", Filter::All).matches(&doc));
    }

    #[test]
    fn and_requires_every_clause() {
        let doc = json!({ "series_id": "s", "character_id": "c" });
        let both = Filter::and(vec![Filter::eq("series_id", "s"), Filter::eq("character_id", "c")]);
        let one = Filter::and(vec![Filter::eq("series_id", "s"), Filter::eq("character_id", "x")]);
        assert!(both.matches(&doc));
        assert!(!one.matches(&doc));
    }

    #[test]
    fn path_validation() {
        assert!(is_valid_path("collection_lists.list_name"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("a..b"));
        assert!(!is_valid_path("a'; DROP"));
    }
}
