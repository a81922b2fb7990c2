use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Replace `${VAR}` references with the value of the process environment variable.
///
/// Unknown variables are left untouched.
pub fn resolve_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        let env_name = &caps[1];
        std::env::var(env_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}

/// Name of the process variable that overrides a setting at runtime.
///
/// `api.base.url` -> `APICHECK_API_BASE_URL`
pub fn override_variable(key: &str) -> String {
    let mut name = String::from("APICHECK_");
    for c in key.chars() {
        match c {
            '.' | '-' => name.push('_'),
            c => name.push(c.to_ascii_uppercase()),
        }
    }
    name
}
