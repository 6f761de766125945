//! Prompt templates for the relevance judge

pub const RELEVANCE_JUDGE: &str = include_str!("../assets/prompts/relevance_judge.txt");

/// Substitute `{key}` placeholders in a single pass.
///
/// Substituted values are never rescanned, so documents that happen to
/// contain `{query}` or similar text are inserted verbatim.
pub fn format_prompt(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match replacement {
            Some((value, close)) => {
                result.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Render documents as a numbered list, truncating long ones
pub fn number_documents(docs: &[&str], max_chars: usize) -> String {
    if docs.is_empty() {
        return "(none)".to_string();
    }

    docs.iter()
        .enumerate()
        .map(|(i, doc)| format!("[{}] {}", i + 1, truncate_document(doc, max_chars)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_document(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prompt() {
        let template = "Hello {name}, you are {age} years old.";
        let vars = [("name", "Alice"), ("age", "30")];
        let result = format_prompt(template, &vars);
        assert_eq!(result, "Hello Alice, you are 30 years old.");
    }

    #[test]
    fn test_format_prompt_does_not_rescan_values() {
        let template = "Q: {query}\nD: {docs}";
        let vars = [("query", "what is {docs}?"), ("docs", "[1] salt")];
        let result = format_prompt(template, &vars);
        assert_eq!(result, "Q: what is {docs}?\nD: [1] salt");
    }

    #[test]
    fn test_format_prompt_keeps_unknown_braces() {
        let template = "{\"rating\": \"good\"} for {query}";
        let result = format_prompt(template, &[("query", "q")]);
        assert_eq!(result, "{\"rating\": \"good\"} for q");
    }

    #[test]
    #[allow(clippy::len_zero)] // const_is_empty conflicts with len_zero for const strings
    fn test_prompt_loads() {
        assert!(RELEVANCE_JUDGE.len() > 0);
        assert!(RELEVANCE_JUDGE.contains("{query}"));
        assert!(RELEVANCE_JUDGE.contains("{retrieved_docs}"));
    }

    #[test]
    fn test_number_documents_truncates_on_char_boundary() {
        let docs = ["高血压患者每日盐摄入量应控制在5克以下", "short"];
        let rendered = number_documents(&docs, 6);
        assert_eq!(rendered, "[1] 高血压...\n[2] short");
    }

    #[test]
    fn test_number_documents_empty() {
        assert_eq!(number_documents(&[], 100), "(none)");
    }
}
