//! Parsing of judge replies into verdicts
//!
//! Model output is untrusted: it may be wrapped in markdown fences, preceded
//! by prose, keyed inconsistently or missing fields entirely. Anything that
//! cannot be mapped onto a complete verdict is a `MalformedResponse`.

use crate::error::{truncate_for_error, JudgeError, Result};
use rageval_core::Rating;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Verdict fields before they are tied back to document texts
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedVerdict {
    /// Label per retrieved document position (0-based)
    pub labels: BTreeMap<usize, bool>,
    pub rating: Rating,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    relevance_labels: Option<Value>,
    rating: Option<Value>,
    comment: Option<Value>,
}

/// Strip markdown code fences from LLM response.
fn strip_markdown_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        // Find the end of the opening fence (```json or ```)
        let after_fence = if let Some(newline_pos) = trimmed.find('\n') {
            &trimmed[newline_pos + 1..]
        } else {
            trimmed
                .strip_prefix("```json")
                .or_else(|| trimmed.strip_prefix("```"))
                .unwrap_or(trimmed)
        };

        // Find closing fence
        if let Some(close_pos) = after_fence.rfind("```") {
            after_fence[..close_pos].trim()
        } else {
            after_fence.trim()
        }
    } else {
        trimmed
    }
}

/// Extract the balanced object starting at a byte offset.
fn extract_balanced_at(content: &str, start_pos: usize) -> Option<&str> {
    let json_content = content.get(start_pos..)?;
    if !json_content.starts_with('{') {
        return None;
    }

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in json_content.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&json_content[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extract the first JSON object from a reply, ignoring fences and chatter.
pub(crate) fn extract_json_object(response: &str) -> Option<&str> {
    let content = strip_markdown_fences(response);

    content
        .match_indices('{')
        .filter_map(|(pos, _)| extract_balanced_at(content, pos))
        .find(|candidate| serde_json::from_str::<Value>(candidate).is_ok())
}

/// Parse a judge reply for `doc_count` retrieved documents.
pub(crate) fn parse_verdict(response: &str, doc_count: usize) -> Result<ParsedVerdict> {
    let json = extract_json_object(response).ok_or_else(|| {
        JudgeError::MalformedResponse(format!(
            "no JSON object in reply: {}",
            truncate_for_error(response)
        ))
    })?;

    let raw: RawVerdict = serde_json::from_str(json)
        .map_err(|e| JudgeError::MalformedResponse(format!("invalid verdict JSON: {e}")))?;

    let rating = match raw.rating {
        Some(Value::String(label)) => Rating::from_str(label.trim()).map_err(|_| {
            JudgeError::MalformedResponse(format!("unrecognised rating '{label}'"))
        })?,
        Some(other) => {
            return Err(JudgeError::MalformedResponse(format!(
                "rating must be a string, got {other}"
            )))
        }
        None => return Err(JudgeError::MalformedResponse("missing rating".to_string())),
    };

    let comment = match raw.comment {
        Some(Value::String(comment)) => comment.trim().to_string(),
        Some(Value::Null) | None => {
            return Err(JudgeError::MalformedResponse("missing comment".to_string()))
        }
        Some(other) => {
            return Err(JudgeError::MalformedResponse(format!(
                "comment must be a string, got {other}"
            )))
        }
    };

    let labels = parse_labels(raw.relevance_labels, doc_count)?;

    Ok(ParsedVerdict {
        labels,
        rating,
        comment,
    })
}

fn parse_labels(value: Option<Value>, doc_count: usize) -> Result<BTreeMap<usize, bool>> {
    let mut labels = BTreeMap::new();

    match value {
        Some(Value::Object(map)) => {
            for (key, value) in map {
                let Some(position) = document_number(&key) else {
                    warn!("Judge label key '{key}' has no document number, dropping");
                    continue;
                };
                if position == 0 || position > doc_count {
                    warn!("Judge labelled out-of-range document {position}, dropping");
                    continue;
                }
                labels.insert(position - 1, label_value(&value)?);
            }
        }
        Some(Value::Array(values)) => {
            if values.len() != doc_count {
                return Err(JudgeError::MalformedResponse(format!(
                    "expected {doc_count} labels, got {}",
                    values.len()
                )));
            }
            for (i, value) in values.iter().enumerate() {
                labels.insert(i, label_value(value)?);
            }
        }
        Some(other) => {
            return Err(JudgeError::MalformedResponse(format!(
                "relevance_labels must be an object or array, got {other}"
            )))
        }
        None if doc_count == 0 => {}
        None => {
            return Err(JudgeError::MalformedResponse(
                "missing relevance_labels".to_string(),
            ))
        }
    }

    if let Some(missing) = (0..doc_count).find(|i| !labels.contains_key(i)) {
        return Err(JudgeError::MalformedResponse(format!(
            "no relevance label for document {}",
            missing + 1
        )));
    }

    Ok(labels)
}

/// First run of ASCII digits in a key such as "3", "doc 3" or "文档 3"
fn document_number(key: &str) -> Option<usize> {
    let start = key.find(|c: char| c.is_ascii_digit())?;
    let digits: String = key[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn label_value(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "relevant" => Ok(true),
            "false" | "no" | "irrelevant" | "not relevant" => Ok(false),
            _ => Err(JudgeError::MalformedResponse(format!(
                "unrecognised relevance label '{s}'"
            ))),
        },
        other => Err(JudgeError::MalformedResponse(format!(
            "relevance label must be a boolean, got {other}"
        ))),
    }
}
