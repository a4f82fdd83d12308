//! Derived form validity.

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use pagekit_core::reactive::{Computed, Observable};

use crate::field::{FieldEntry, is_form_valid};

/// Derive a flag that is `true` while every field in `fields` is valid.
///
/// The flag follows `fields`: any `set` or `update` on the list
/// re-evaluates it before returning, and receivers from
/// [`Computed::subscribe`] are notified. Evaluation stops at the first
/// failing field.
pub fn derive_validity(fields: &Observable<Vec<FieldEntry>>) -> Computed<bool> {
    Computed::from_observable(fields, |fields: &Vec<FieldEntry>| {
        let valid = is_form_valid(fields);
        trace!(fields = fields.len(), valid, "Evaluated form validity");
        valid
    })
}

/// Like [`derive_validity`], for field lists that arrive as raw JSON.
///
/// The flag is `false` when the value is not an array or any element is
/// not a well-formed field entry.
pub fn derive_validity_from_json(fields: &Observable<Value>) -> Computed<bool> {
    Computed::from_observable(fields, json_form_valid)
}

fn json_form_valid(value: &Value) -> bool {
    let Value::Array(items) = value else {
        trace!("Field list is not an array");
        return false;
    };
    items.iter().all(|item| {
        FieldEntry::deserialize(item)
            .map(|field| field.is_valid())
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use serde_json::json;

    fn digits() -> Pattern {
        Pattern::new(r"^\d+$").unwrap()
    }

    #[test]
    fn test_empty_list_is_valid() {
        let fields = Observable::new(Vec::new());
        assert!(derive_validity(&fields).get());
    }

    #[test]
    fn test_recomputes_on_list_change() {
        let fields = Observable::new(vec![FieldEntry::new("x")]);
        let valid = derive_validity(&fields);
        assert!(valid.get());

        fields.update(|list| list.push(FieldEntry::with_pattern("abc", digits())));
        assert!(!valid.get());

        fields.update(|list| list[1].value = "123".to_string());
        assert!(valid.get());

        fields.update(|list| list[0].value = "   ".to_string());
        assert!(!valid.get());
    }

    #[test]
    fn test_recomputes_on_pattern_change() {
        let fields = Observable::new(vec![FieldEntry::new("abc")]);
        let valid = derive_validity(&fields);
        assert!(valid.get());

        fields.update(|list| list[0].reg = Some(digits()));
        assert!(!valid.get());

        fields.update(|list| list[0].reg = None);
        assert!(valid.get());
    }

    #[test]
    fn test_evaluates_once_per_change() {
        let fields = Observable::new(vec![FieldEntry::new("x")]);
        let valid = derive_validity(&fields);

        assert!(valid.get());
        assert!(valid.get());
        assert_eq!(valid.version(), 1);

        fields.set(vec![FieldEntry::new(" ")]);
        assert_eq!(valid.version(), 2);
        assert!(!valid.is_dirty());
        assert!(!valid.get());
        assert_eq!(valid.version(), 2);
    }

    #[tokio::test]
    async fn test_subscriber_sees_new_flag() {
        let fields = Observable::new(vec![FieldEntry::new("42")]);
        let valid = derive_validity(&fields);
        let mut rx = valid.subscribe();
        assert!(*rx.borrow());

        fields.update(|list| list[0].reg = Some(Pattern::new("^[a-z]+$").unwrap()));
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());

        let writer = fields.clone();
        tokio::spawn(async move {
            writer.update(|list| list[0].value = "abc".to_string());
        });
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[test]
    fn test_json_non_array_is_invalid() {
        let fields = Observable::new(json!({ "value": "x" }));
        let valid = derive_validity_from_json(&fields);
        assert!(!valid.get());

        fields.set(json!(null));
        assert!(!valid.get());

        fields.set(json!([]));
        assert!(valid.get());
    }

    #[test]
    fn test_json_entries() {
        let fields = Observable::new(json!([
            { "value": "abc", "reg": "^\\d+$" }
        ]));
        let valid = derive_validity_from_json(&fields);
        assert!(!valid.get());

        fields.set(json!([{ "value": "x" }, { "value": "7", "reg": "/^\\d$/" }]));
        assert!(valid.get());

        fields.set(json!([{ "value": "x" }, { "reg": "^\\d+$" }]));
        assert!(!valid.get());
    }

    #[tokio::test]
    async fn test_follows_writes_from_another_task() {
        let fields = Observable::new(vec![FieldEntry::new("x")]);
        let valid = derive_validity(&fields);
        assert!(valid.get());

        let writer = fields.clone();
        tokio::spawn(async move {
            writer.set(vec![FieldEntry::new(" ")]);
        })
        .await
        .unwrap();

        assert!(!valid.get());
    }
}
