use unbundle::ModuleId;

/// Parse a module id argument.
///
/// Digits become numeric ids; anything else is a named id.
pub fn parse_module_id(s: &str) -> Result<ModuleId, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("Module id cannot be empty".to_string());
    }
    trimmed.parse().map_err(|e| format!("Invalid module id '{s}': {e}"))
}

/// Parse an `ID=VALUE` pair such as `4=./lib/util` or `12=react`.
pub fn parse_assignment(s: &str) -> Result<(ModuleId, String), String> {
    let Some((id, value)) = s.split_once('=') else {
        return Err(format!("Expected ID=VALUE, got '{s}'"));
    };
    if value.trim().is_empty() {
        return Err(format!("Missing value after '=' in '{s}'"));
    }
    Ok((parse_module_id(id)?, value.trim().to_string()))
}

/// Whether `name` can be used as an npm package name, scoped (`@scope/name`) or not.
pub fn is_package_name(name: &str) -> bool {
    let valid_segment = |segment: &str| {
        !segment.is_empty()
            && !segment.starts_with('.')
            && !segment.starts_with('_')
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
    };

    match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, rest)) => valid_segment(scope) && valid_segment(rest),
            None => false,
        },
        None => valid_segment(name),
    }
}
