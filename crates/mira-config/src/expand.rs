//! Environment variable expansion for configuration strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

static BRACED_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// Unset variables without a default are an error naming `field`. Only the
/// braced form is expanded: a bare `$` (prompt text such as `$500` or
/// `$HOME`) is kept literally, including next to a `${VAR}` reference.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;
    for reference in BRACED_REF_RE.find_iter(value) {
        expanded.push_str(&value[last..reference.start()]);
        expanded.push_str(&expand_reference(reference.as_str(), field)?);
        last = reference.end();
    }
    expanded.push_str(&value[last..]);
    Ok(expanded)
}

fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}
