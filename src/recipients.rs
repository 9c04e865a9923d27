//! Turns single / list / CSV recipient input into a capped batch of
//! normalized records.
//!
//! List mode rejects more than [`MAX_RECIPIENTS`] lines outright, while CSV
//! mode keeps the first [`MAX_RECIPIENTS`] valid rows and reports the rest
//! as a warning.

use std::{collections::HashMap, path::Path};

use tracing::debug;

use crate::{
    error::{RecipientWarning, ValidationError},
    models::recipient::{RecipientBatch, RecipientRecord, RecipientSource},
    templating::ordered_values,
};

pub const MAX_RECIPIENTS: usize = 10;

const LIST_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecipients {
    pub batch: RecipientBatch,
    pub warnings: Vec<RecipientWarning>,
}

/// Normalizes `source` with the country `prefix`.
///
/// Rows without their own extra values are filled from `variables`, rendered
/// in `ordered_variables` order, as long as the map holds at least one
/// entry.
pub fn normalize(
    source: &RecipientSource,
    prefix: &str,
    variables: Option<&HashMap<String, String>>,
    ordered_variables: &[String],
) -> Result<NormalizedRecipients, ValidationError> {
    let shared = variables
        .filter(|vars| !vars.is_empty())
        .map(|vars| ordered_values(ordered_variables, vars));

    let normalized = match source {
        RecipientSource::Single { number } => {
            let phone = single_phone(prefix, number).ok_or(ValidationError::MissingPhone)?;
            NormalizedRecipients {
                batch: RecipientBatch::Single { phone },
                warnings: Vec::new(),
            }
        }
        RecipientSource::List { text } => normalize_list(text, prefix, shared.as_deref())?,
        RecipientSource::Csv { text } => normalize_csv(text, prefix, shared.as_deref())?,
    };

    debug!(
        mode = %source.mode(),
        recipients = normalized.batch.len(),
        warnings = normalized.warnings.len(),
        "Recipients normalized"
    );

    Ok(normalized)
}

/// `+<prefix><digits>`, or `None` when either part is empty.
pub fn single_phone(prefix: &str, input: &str) -> Option<String> {
    let digits = digits_only(input);
    if prefix.is_empty() || digits.is_empty() {
        return None;
    }
    Some(format!("+{}{}", prefix, digits))
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// `;` wins over tab, tab over `,`.
pub fn detect_separator(line: &str) -> char {
    if line.contains(';') {
        ';'
    } else if line.contains('\t') {
        '\t'
    } else {
        ','
    }
}

/// Reads an uploaded CSV into memory as a whole.
///
/// Invalid UTF-8 (e.g. a Latin-1 spreadsheet export) is replaced, not
/// rejected.
pub async fn read_csv_file(path: impl AsRef<Path>) -> Result<RecipientSource, ValidationError> {
    let bytes = tokio::fs::read(path.as_ref())
        .await
        .map_err(|e| ValidationError::FileUnreadable(e.to_string()))?;

    Ok(RecipientSource::Csv {
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn normalize_list(
    text: &str,
    prefix: &str,
    shared: Option<&[String]>,
) -> Result<NormalizedRecipients, ValidationError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ValidationError::MissingPhone);
    }

    if lines.len() > MAX_RECIPIENTS {
        return Err(ValidationError::ListOverLimit {
            limit: MAX_RECIPIENTS,
            found: lines.len(),
        });
    }

    let records = collect_records(&lines, LIST_SEPARATOR, prefix, shared);
    if records.is_empty() {
        return Err(ValidationError::NoValidData);
    }

    Ok(NormalizedRecipients {
        batch: RecipientBatch::Bulk { records },
        warnings: Vec::new(),
    })
}

fn normalize_csv(
    text: &str,
    prefix: &str,
    shared: Option<&[String]>,
) -> Result<NormalizedRecipients, ValidationError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first_line) = lines.first() else {
        return Err(ValidationError::EmptyFile);
    };

    // A first line without any digit is a header.
    let start = if first_line.chars().any(|c| c.is_ascii_digit()) {
        0
    } else {
        1
    };
    let data_lines = &lines[start..];

    let Some(first_data_line) = data_lines.first() else {
        return Err(ValidationError::NoValidData);
    };

    let separator = detect_separator(first_data_line);
    let leading_field = first_data_line.split(separator).next().unwrap_or_default();
    if digits_only(leading_field).is_empty() {
        return Err(ValidationError::CsvLeadingNumber);
    }

    let records = collect_records(data_lines, separator, prefix, shared);
    if records.is_empty() {
        return Err(ValidationError::NoValidData);
    }

    let mut warnings = Vec::new();
    if data_lines.len() > MAX_RECIPIENTS {
        warnings.push(RecipientWarning::Truncated {
            total: data_lines.len(),
            used: records.len(),
        });
    }

    Ok(NormalizedRecipients {
        batch: RecipientBatch::Bulk { records },
        warnings,
    })
}

/// Parses lines in order, dropping rows without phone digits, and stops at
/// [`MAX_RECIPIENTS`] records.
fn collect_records(
    lines: &[&str],
    separator: char,
    prefix: &str,
    shared: Option<&[String]>,
) -> Vec<RecipientRecord> {
    lines
        .iter()
        .filter_map(|line| parse_row(line, separator, prefix, shared))
        .take(MAX_RECIPIENTS)
        .collect()
}

fn parse_row(
    line: &str,
    separator: char,
    prefix: &str,
    shared: Option<&[String]>,
) -> Option<RecipientRecord> {
    let mut fields = line.split(separator).map(str::trim);

    let digits = digits_only(fields.next().unwrap_or_default());
    if digits.is_empty() {
        return None;
    }

    let own: Vec<String> = fields.map(str::to_string).collect();
    let extras = if own.is_empty() {
        shared.map(<[String]>::to_vec).unwrap_or_default()
    } else {
        own
    };

    Some(RecipientRecord {
        phone: format!("{}{}", prefix, digits),
        extras,
    })
}
