//! AWS naming conventions of the serverless framework.
//!
//! These reproduce how the framework names a function's log group and the
//! logical id of that log group resource, so filters can reference it.

/// Physical name of a Lambda function's log group
pub fn log_group_name(function_name: &str) -> String {
    format!("/aws/lambda/{function_name}")
}

/// Upper-case the first character, leaving the rest untouched
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Function name made safe for use inside a logical id
pub fn normalized_function_name(function_name: &str) -> String {
    normalize_name(
        &function_name
            .replace('-', "Dash")
            .replace('_', "Underscore"),
    )
}

/// Logical id of the log group resource the framework creates for a function
pub fn log_group_logical_id(function_name: &str) -> String {
    format!("{}LogGroup", normalized_function_name(function_name))
}
