use crate::constants::pagination::{CURSOR_KEY, ITEM_KEYS};
use crate::errors::ToolError;
use serde_json::Value;

/// One listing response: items in server order plus the continuation cursor,
/// if the server signalled more pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_cursor: Option<String>,
}

/// Accepts `{"results": [...]}`, `{"items": [...]}`, `{"data": [...]}` (probed
/// in that order) or a bare array. An object with none of those keys is an
/// empty page.
pub fn normalize_page(body: &str) -> Result<Page, ToolError> {
    let payload: Value = serde_json::from_str(body).map_err(|err| ToolError::parse(body, err))?;
    match payload {
        Value::Object(mut map) => {
            let next_cursor = map.get(CURSOR_KEY).and_then(cursor_value);
            let items = ITEM_KEYS
                .iter()
                .find(|key| map.get(**key).map(Value::is_array).unwrap_or(false))
                .and_then(|key| map.remove(*key))
                .and_then(|value| match value {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default();
            Ok(Page { items, next_cursor })
        }
        Value::Array(items) => Ok(Page {
            items,
            next_cursor: None,
        }),
        other => Err(ToolError::parse(
            body,
            format!("expected a JSON object or array, found {}", json_kind(&other)),
        )),
    }
}

/// Absent, null and "" all mean there are no more pages.
fn cursor_value(raw: &Value) -> Option<String> {
    match raw {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
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
    use crate::errors::ToolErrorKind;
    use serde_json::json;

    fn ids(page: &Page) -> Vec<&str> {
        page.items
            .iter()
            .filter_map(|item| item.get("id").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn every_envelope_normalizes_to_the_same_items() {
        let items = r#"[{"id":"1","content":"a"},{"id":"2","content":"b"}]"#;
        for body in [
            format!(r#"{{"results":{}}}"#, items),
            format!(r#"{{"items":{}}}"#, items),
            format!(r#"{{"data":{}}}"#, items),
            items.to_string(),
        ] {
            let page = normalize_page(&body).expect("page");
            assert_eq!(ids(&page), vec!["1", "2"], "body: {}", body);
        }
    }

    #[test]
    fn results_wins_over_later_keys() {
        let page = normalize_page(
            r#"{"data":[{"id":"d"}],"items":[{"id":"i"}],"results":[{"id":"r"}]}"#,
        )
        .expect("page");
        assert_eq!(ids(&page), vec!["r"]);
    }

    #[test]
    fn non_array_key_falls_through_to_next_candidate() {
        let page = normalize_page(r#"{"results":null,"items":{"x":1},"data":[{"id":"d"}]}"#)
            .expect("page");
        assert_eq!(ids(&page), vec!["d"]);
    }

    #[test]
    fn cursor_terminators_are_equivalent() {
        for body in [
            r#"{"results":[]}"#,
            r#"{"results":[],"next_cursor":null}"#,
            r#"{"results":[],"next_cursor":""}"#,
        ] {
            assert_eq!(normalize_page(body).expect("page").next_cursor, None);
        }
        let page = normalize_page(r#"{"results":[],"next_cursor":"c2"}"#).expect("page");
        assert_eq!(page.next_cursor.as_deref(), Some("c2"));
    }

    #[test]
    fn unknown_object_shape_is_an_empty_page() {
        let page = normalize_page(r#"{"tasks":[{"id":"1"}]}"#).expect("page");
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn bare_array_never_has_a_cursor() {
        let page = normalize_page("[]").expect("page");
        assert_eq!(page, Page::default());
    }

    #[test]
    fn garbage_is_a_parse_error_with_the_body() {
        let err = normalize_page("<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Parse);
        assert!(err.message.contains("<html>Bad Gateway</html>"));

        let err = normalize_page("\"just a string\"").unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Parse);
        assert!(err.message.contains("a string"));
    }

    #[test]
    fn item_order_is_preserved() {
        let page = normalize_page(&json!({"results": [{"id":"3"},{"id":"1"},{"id":"2"}]}).to_string())
            .expect("page");
        assert_eq!(ids(&page), vec!["3", "1", "2"]);
    }
}
