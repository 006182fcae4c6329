//! Report rendering
//!
//! Turns the collected errors into the JSON and HTML forms published as CI
//! outputs, and into the markdown step summary.

use crate::diagnostic::ValidationError;
use crate::error::Result;

pub const SUMMARY_HEADER: &str = "## xmllint Validation Report\n\n";
pub const SUCCESS_MESSAGE: &str = "Validation succeeded without errors.";

/// JSON array of all errors; paths become plain strings.
pub fn to_json(errors: &[ValidationError]) -> Result<String> {
    Ok(serde_json::to_string(errors)?)
}

/// Single-line HTML table with a fields row and a snippet row per error.
pub fn to_html(errors: &[ValidationError]) -> String {
    let mut html = String::from(
        "<table><thead><tr>\
         <th>Category</th><th>Error message</th><th>File path</th><th>Position</th>\
         </tr></thead><tbody>",
    );

    for error in errors {
        let (source, pointer) = error.snippet_lines();
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td><code>{}</code></td><td>{}</td></tr>\
             <tr><td colspan=\"4\"><pre>{}<br>{}</pre></td></tr>",
            error.category,
            escape_html(&error.message),
            escape_html(&error.file.to_string_lossy()),
            format_position(error),
            escape_html(source),
            escape_html(pointer),
        ));
    }

    html.push_str("</tbody></table>");
    html
}

/// Markdown for the job summary page.
pub fn summary(errors: &[ValidationError]) -> String {
    if errors.is_empty() {
        format!("{SUMMARY_HEADER}{SUCCESS_MESSAGE}")
    } else {
        format!("{SUMMARY_HEADER}{}", to_html(errors))
    }
}

/// `line:column`, counted from 1 for people reading the table
fn format_position(error: &ValidationError) -> String {
    format!("{}:{}", error.line + 1, error.column + 1)
}

/// Escape text for HTML element content. Newlines are encoded too, which
/// keeps the rendered table on a single line.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('\r', "&#13;")
        .replace('\n', "&#10;")
}
