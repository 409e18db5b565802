use crate::utils::{format_duration, CheckResult, ErrorKind, Target};
use colored::*;
use serde::Serialize;

/// Renders `result` the way operators and scripts expect to read it.
///
/// The first line is always `SUCCESS: ...` or `FAILED: ...`; verbose output
/// adds `DEBUG:` lines.
pub fn render_human(result: &CheckResult, verbose: bool) -> String {
    let mut lines = Vec::new();

    let headline = match (&result.target, result.success) {
        (Target::Transport { host, .. }, true) => {
            format!("{} Port Connection Test Succesful for {}", "SUCCESS:".green().bold(), host)
        }
        (Target::Transport { host, .. }, false) => {
            format!("{} Port Connection Test Failed For {}", "FAILED:".red().bold(), host)
        }
        (Target::Http { url }, true) => {
            format!("{} HTTP Connection Test Passed For {}", "SUCCESS:".green().bold(), url)
        }
        (Target::Http { url }, false) => {
            format!("{} HTTP Connection Test Failed for {}", "FAILED:".red().bold(), url)
        }
    };
    lines.push(headline);

    if verbose {
        match &result.target {
            Target::Transport {
                protocol,
                host,
                port,
            } => {
                let error = result
                    .error
                    .as_ref()
                    .map_or_else(|| "None".to_string(), ToString::to_string);
                lines.push(format!("DEBUG: Protocol: {protocol}"));
                lines.push(format!("DEBUG: Host: {host}"));
                lines.push(format!("DEBUG: Port: {port}"));
                lines.push(format!("DEBUG: Error: {error}"));
            }
            Target::Http { .. } => {
                let info = result.details.as_deref().unwrap_or("None");
                let status = result
                    .status
                    .map_or_else(|| "None".to_string(), |s| s.to_string());
                let error_type = result
                    .error_kind()
                    .map_or_else(|| "None".to_string(), |k| k.to_string());
                lines.push(format!("DEBUG: Info: {info}"));
                lines.push(format!("DEBUG: Status Code: {status}"));
                lines.push(format!("DEBUG: Error Type: {error_type}"));
            }
        }
        lines.push(format!("DEBUG: Elapsed: {}", format_duration(result.duration)));
    }

    lines.join("\n")
}

pub fn print_human(result: &CheckResult, verbose: bool) {
    println!("{}", render_human(result, verbose));
}

#[derive(Serialize)]
struct JsonResult<'a> {
    check: &'static str,
    target: String,
    success: bool,
    status: Option<u16>,
    error_kind: Option<ErrorKind>,
    details: Option<&'a str>,
    error: Option<String>,
    duration_ms: u128,
}

pub fn render_json(result: &CheckResult) -> serde_json::Result<String> {
    let check = match result.target {
        Target::Transport { .. } => "port",
        Target::Http { .. } => "http",
    };

    let json_result = JsonResult {
        check,
        target: result.target.to_string(),
        success: result.success,
        status: result.status,
        error_kind: result.error_kind(),
        details: result.details.as_deref(),
        error: result.error.as_ref().map(ToString::to_string),
        duration_ms: result.duration.as_millis(),
    };

    serde_json::to_string_pretty(&json_result)
}

pub fn print_json(result: &CheckResult) {
    match render_json(result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            log::error!("Failed to serialize result as JSON: {e}");
            print_human(result, false);
        }
    }
}
