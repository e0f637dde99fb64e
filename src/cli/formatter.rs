//! Output formatting for the `query` command

use crate::api::ApiResponse;
use crate::resolve::{LocationInfo, ResolutionResult};

#[cfg(feature = "colored-output")]
use colored::Colorize;

/// Location as a compact string: `country region province city isp`
///
/// Empty parts are skipped, as is a part equal to the one before it
/// (ip2region often repeats the province as the city).
pub fn format_location(info: &LocationInfo) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in [&info.country, &info.region, &info.province, &info.city, &info.isp] {
        let part = part.as_str();
        if part.is_empty() || parts.last() == Some(&part) {
            continue;
        }
        parts.push(part);
    }

    parts.join(" ")
}

/// One output line: `addr -> location` or `addr -> [kind] detail`
pub fn format_text(address: &str, result: &ResolutionResult, use_color: bool) -> String {
    match result {
        ResolutionResult::Success(info) => {
            let location = format_location(info);
            format!("{} -> {}", address, paint(&location, Paint::Found, use_color))
        }
        ResolutionResult::Failure(kind, detail) => {
            let message = format!("[{}] {}", kind, detail);
            format!("{} -> {}", address, paint(&message, Paint::Failed, use_color))
        }
    }
}

/// One output line holding the response envelope
pub fn format_json(result: &ResolutionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ApiResponse::from(result.clone()))
}

enum Paint {
    Found,
    Failed,
}

fn paint(text: &str, style: Paint, use_color: bool) -> String {
    if use_color {
        colorize(text, style)
    } else {
        text.to_string()
    }
}

#[cfg(feature = "colored-output")]
fn colorize(text: &str, style: Paint) -> String {
    match style {
        Paint::Found => text.green().to_string(),
        Paint::Failed => text.red().to_string(),
    }
}

#[cfg(not(feature = "colored-output"))]
fn colorize(text: &str, _style: Paint) -> String {
    text.to_string()
}
