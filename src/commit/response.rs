//! Post-processing of raw LLM responses into commit messages.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::types::CommitType;

/// Messages shorter than this are rejected as truncated or empty.
const MIN_MESSAGE_LENGTH: usize = 10;

fn types_alternation() -> String {
    CommitType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

static CONVENTIONAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({})(\(.+\))?!?:", types_alternation()))
        .expect("subject pattern is valid")
});

static MESSAGE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[`\s]*({})[(!:]", types_alternation()))
        .expect("message start pattern is valid")
});

static OPTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\[?({})[(!:]", types_alternation()))
        .expect("option start pattern is valid")
});

static BRACKETED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\[({})\(", types_alternation())).expect("bracket pattern is valid")
});

static OPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Option \d+\]\s*").expect("label pattern is valid"));

static JUNK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(diff --git |@@\s|[+-]{3}\s[ab]/|index [0-9a-f]|```)")
        .expect("junk pattern is valid")
});

/// Check that `content` looks like a conventional commit message.
///
/// Returns a short reason on failure, suitable for a corrective re-prompt.
pub fn validate_commit_message(content: &str) -> Result<(), String> {
    let trimmed = content.trim();
    if trimmed.chars().count() < MIN_MESSAGE_LENGTH {
        return Err("Response too short".to_string());
    }

    let first_line = trimmed.lines().next().unwrap_or_default();
    if !CONVENTIONAL_SUBJECT.is_match(first_line) {
        let preview: String = first_line.chars().take(50).collect();
        return Err(format!("Missing conventional commit format. Got: {preview}"));
    }

    Ok(())
}

/// Strip preamble and trailing junk from a model response.
///
/// The message starts at the first line that opens with a commit type and ends
/// before the first line of echoed diff or code fence. Backticks around the
/// subject are removed.
pub fn clean_commit_message(text: &str) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines
        .iter()
        .position(|line| MESSAGE_START.is_match(line))
        .unwrap_or(0);
    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| JUNK_LINE.is_match(line))
        .map_or(lines.len(), |(i, _)| i);

    let Some(body) = lines.get(start..end) else {
        return String::new();
    };
    let joined = body.join("\n");
    let mut cleaned: Vec<String> = joined.trim_end().lines().map(str::to_string).collect();
    if let Some(subject) = cleaned.first_mut() {
        *subject = subject.trim_matches('`').trim().to_string();
    }
    cleaned.join("\n")
}

/// Split a multi-option response into cleaned messages.
///
/// Options are separated by `[Option N]` labels; when the model dropped the
/// labels, a new option starts at each line opening with a commit type. Falls
/// back to the whole cleaned response.
pub fn parse_options(response: &str) -> Vec<String> {
    let mut options: Vec<String> = OPTION_LABEL
        .split(response)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if options.len() <= 1 {
        options = split_on_type_lines(response.trim());
    }

    let cleaned: Vec<String> = options
        .iter()
        .map(|opt| strip_option_brackets(&clean_commit_message(opt)))
        .filter(|opt| !opt.is_empty())
        .collect();

    if cleaned.is_empty() {
        vec![clean_commit_message(response)]
    } else {
        cleaned
    }
}

fn split_on_type_lines(text: &str) -> Vec<String> {
    let mut parts: Vec<Vec<&str>> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if i == 0 || OPTION_START.is_match(line) {
            parts.push(vec![line]);
        } else if let Some(current) = parts.last_mut() {
            current.push(line);
        }
    }
    parts
        .into_iter()
        .map(|lines| lines.join("\n").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

fn strip_option_brackets(option: &str) -> String {
    let unbracketed = BRACKETED_TYPE.replace(option, "$1(");
    let mut lines: Vec<&str> = unbracketed.lines().collect();
    if let Some(subject) = lines.first().copied()
        && let Some(stripped) = subject.strip_suffix(']')
    {
        lines[0] = stripped;
    }
    lines.join("\n")
}

/// Append a ticket trailer such as `Refs: PROJ-123`.
pub fn append_ticket(message: &str, prefix: &str, ticket: &str) -> String {
    format!("{}\n\n{}: {}", message.trim_end(), prefix, ticket.trim().to_uppercase())
}
