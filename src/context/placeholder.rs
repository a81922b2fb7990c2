use crate::context::store::ScenarioContext;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Replace every `{{key}}` placeholder with the stored value's text form.
///
/// Placeholders whose key is missing (or holds a non-scalar value) are kept verbatim.
pub fn substitute(text: &str, context: &ScenarioContext) -> String {
    static VAR_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = VAR_REGEX
        .get_or_init(|| Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_.\-]*)\s*\}\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        context
            .display_value(&caps[1])
            .unwrap_or_else(|| caps[0].to_string())
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_simple() {
        let mut ctx = ScenarioContext::new();
        ctx.set("newUserId", json!(42));

        assert_eq!(substitute("/users/{{newUserId}}", &ctx), "/users/42");
        assert_eq!(substitute("/users/{{ newUserId }}", &ctx), "/users/42");
    }

    #[test]
    fn test_substitute_body() {
        let mut ctx = ScenarioContext::new();
        ctx.set("user_id", "12345".to_string());
        ctx.set("username", json!("test_user"));

        let body = substitute(r#"{"id": "{{user_id}}", "name": "{{username}}"}"#, &ctx);
        assert_eq!(body, r#"{"id": "12345", "name": "test_user"}"#);
    }

    #[test]
    fn test_missing_placeholder_kept() {
        let ctx = ScenarioContext::new();
        assert_eq!(substitute("Bearer {{token}}", &ctx), "Bearer {{token}}");
    }

    #[test]
    fn test_no_placeholders() {
        let ctx = ScenarioContext::new();
        assert_eq!(substitute("/posts?userId=1", &ctx), "/posts?userId=1");
    }
}
