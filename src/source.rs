use std::{fs, io::ErrorKind, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{AppError, AppResult, SchemaIssue},
    schema::{self, Shape},
};

const CONTEXT_RADIUS: usize = 80;

pub fn read_json<T: DeserializeOwned>(path: &Path, shape: &Shape) -> AppResult<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(AppError::InputNotFound { path: path.to_path_buf() });
        },
        Err(source) => return Err(AppError::Io { path: path.to_path_buf(), source }),
    };
    parse_json(path, &raw, shape)
}

pub fn read_optional_json<T: DeserializeOwned>(path: &Path, shape: &Shape) -> AppResult<Option<T>> {
    match read_json(path, shape) {
        Ok(value) => Ok(Some(value)),
        Err(AppError::InputNotFound { .. }) => {
            debug!(path = %path.display(), "optional input not present");
            Ok(None)
        },
        Err(err) => Err(err),
    }
}

pub fn parse_json<T: DeserializeOwned>(path: &Path, raw: &str, shape: &Shape) -> AppResult<T> {
    // Hand-edited files may start with a UTF-8 BOM.
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let value: serde_json::Value = serde_json::from_str(text).map_err(|err| {
        let offset = byte_offset(text, err.line(), err.column());
        AppError::Parse {
            path: path.to_path_buf(),
            offset,
            message: err.to_string(),
            context: error_context(text, offset),
        }
    })?;

    schema::validate(&value, shape)
        .map_err(|issues| AppError::Schema { path: path.to_path_buf(), issues })?;

    // Validation guarantees the shape; this only fails on out-of-range numbers.
    serde_json::from_value(value).map_err(|err| AppError::Schema {
        path: path.to_path_buf(),
        issues: vec![SchemaIssue {
            path: "$".to_string(),
            expected: "values within the supported range".to_string(),
            actual: err.to_string(),
        }],
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| AppError::Write { path: parent.to_path_buf(), source })?;
    }
    fs::write(path, body).map_err(|source| AppError::Write { path: path.to_path_buf(), source })
}

fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = text.split_inclusive('\n').take(line - 1).map(str::len).sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

fn error_context(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(CONTEXT_RADIUS);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + CONTEXT_RADIUS).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let snippet = &text[start..end];
    // The caret goes under the offending character of the line it sits on.
    let line_start = text[start..offset].rfind('\n').map(|i| start + i + 1).unwrap_or(start);
    let caret_pad = text[line_start..offset].chars().count();
    let line_end = text[offset..end].find('\n').map(|i| offset + i).unwrap_or(end);

    format!(
        "--- context ---\n{}\n{}^\n{}---------------",
        &text[start..line_end],
        " ".repeat(caret_pad),
        if line_end < end { format!("{}\n", &snippet[line_end - start + 1..]) } else { String::new() },
    )
}
