//! JSON extraction from free-form model responses.
//!
//! Models frequently wrap their output in Markdown fences or prose.
//! Strategies are tried in order of specificity; the first structural
//! match wins even if its content later fails to parse, so a broken
//! ```` ```json ```` block is reported as malformed rather than rescued
//! by a looser strategy.

/// Candidate extraction strategies, most specific first.
const STRATEGIES: &[fn(&str) -> Option<String>] = &[fenced_json_block, any_fenced_block, brace_span];

/// Locate the JSON payload inside a model response. Returns `None` when
/// no strategy matches or the matched block is empty.
pub fn extract_json_block(response: &str) -> Option<String> {
    let text = STRATEGIES.iter().find_map(|strategy| strategy(response))?;
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A ```` ```json ```` fenced block.
fn fenced_json_block(response: &str) -> Option<String> {
    let start = response.find("```json")? + "```json".len();
    let rest = &response[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim().to_string())
}

/// Any fenced block (first fence pair).
fn any_fenced_block(response: &str) -> Option<String> {
    let start = response.find("```")? + 3;
    let rest = &response[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim().to_string())
}

/// The span from the first `{` to the last `}`.
fn brace_span(response: &str) -> Option<String> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end > start {
        Some(response[start..=end].to_string())
    } else {
        None
    }
}
