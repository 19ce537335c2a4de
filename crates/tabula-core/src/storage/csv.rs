//! CSV import/export for the dense-array boundary.
//!
//! The parser is line-based and handles quoted fields with doubled-quote
//! escapes. Malformed input (an unterminated quoted field) fails the whole
//! parse with its line number so imports stay atomic.

use crate::error::{Result, TabulaError};

/// Parse CSV text into a dense array of fields.
pub fn parse_csv_content(content: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let fields = parse_csv_line(line).map_err(|message| TabulaError::Parse {
            line: line_idx + 1,
            message,
        })?;
        rows.push(fields);
    }
    Ok(rows)
}

/// Parse a single CSV line, handling quoted fields.
pub(crate) fn parse_csv_line(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Doubled quote is an escaped quote.
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    fields.push(finish_field(current, field_was_quoted));
                    current = String::new();
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(finish_field(current, field_was_quoted));
    Ok(fields)
}

/// Quoted fields keep their whitespace; bare fields are trimmed.
fn finish_field(field: String, was_quoted: bool) -> String {
    if was_quoted {
        field
    } else {
        field.trim().to_string()
    }
}

/// Render a dense array as CSV text.
pub fn write_csv_content(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|field| escape_csv_field(field)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Escape a field for CSV output.
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}
