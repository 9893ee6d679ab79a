//! Prompt assembly for commit message generation.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::commit::CommitType;
use crate::diff::ProcessedContext;

use super::config::{CommitStyle, PromptAssemblyConfig};
use super::tables::{bullet_range, examples_for, option_angle};

const ROLE_SECTION: &str = r#"You are a senior software engineer who has reviewed thousands of pull requests and written commit messages for large open-source projects. Commit messages are documentation for the next developer, often the author six months later asking "why did we do this?"

How you think about commit messages:
- The diff already shows WHAT changed. The message explains WHY.
- A good message saves a reviewer a long dig through history.
- Write for someone debugging a production incident late at night.
- Every word has to earn its place.

How you work:
1. Find the PRIMARY purpose of the change; there is usually one main thing
2. Decide the scope: the module, component, or area affected
3. Write a subject that completes "If applied, this commit will..."
4. Add bullets for impact, reasoning, or details that are not obvious from the diff

What you never do:
- Use vague verbs like "Update", "Change", or "Modify" without saying what
- Restate what the diff already makes obvious
- Write bullets that repeat the subject in other words
- Start bullets with "This commit..."
- Pad the body with filler bullets to reach a count

The scope in type(scope) is short (one word, two at most) and names one of:
- a module: auth, api, db, ui
- a feature area: login, checkout, search
- a component: Button, UserService, config"#;

const ANALYSIS_SECTION: &str = "<thinking>
Before writing, work out:
1. What is the PRIMARY change?
2. Which type fits best?
3. What is the scope?
4. What does a future developer most need to know?

DO NOT output this analysis. Use it internally, then output ONLY the commit message.
</thinking>";

const TRUNCATION_NOTE: &str =
    "[Note: Diff was truncated due to size. Focus on the file summary above for scope.]";

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("ANSI pattern is valid"));

/// Assemble the full prompt from processed diff context and user options.
///
/// Sections are joined by blank lines in a fixed order: role, format,
/// examples, changes, developer context, analysis, final instructions. Empty
/// sections are dropped. The same inputs always produce the same prompt.
pub fn assemble(context: &ProcessedContext, config: &PromptAssemblyConfig) -> String {
    let sections = [
        ROLE_SECTION.to_string(),
        format_section(config),
        examples_for(config.style, config.include_body).to_string(),
        changes_section(context),
        hint_section(config.hint.as_deref()),
        ANALYSIS_SECTION.to_string(),
        final_instructions(config),
    ];

    sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_section(config: &PromptAssemblyConfig) -> String {
    let max_len = config.max_subject_length;
    let (format_line, type_instruction) = match config.style {
        CommitStyle::Simple => (
            format!("subject line (imperative mood, max {max_len} chars)"),
            "Use a simple, direct subject line without type prefixes.".to_string(),
        ),
        CommitStyle::Conventional | CommitStyle::Detailed => (
            format!("type(scope): subject line (imperative mood, max {max_len} chars)"),
            type_instruction(config.forced_type),
        ),
    };

    let body = if config.include_body {
        body_rules(config)
    } else {
        "Do NOT include a body or bullet points. Subject line only.".to_string()
    };

    format!(
        "<format>\nWrite commit messages in this exact format:\n\n{format_line}\n\n{body}\n\n{type_instruction}\n</format>"
    )
}

fn type_instruction(forced: Option<CommitType>) -> String {
    match forced {
        Some(t) => format!("IMPORTANT: Use type '{t}' for this commit."),
        None => {
            let types = CommitType::ALL
                .iter()
                .map(|t| format!("  - {}: {}", t, t.description()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Choose the most appropriate type:\n{types}")
        }
    }
}

fn body_rules(config: &PromptAssemblyConfig) -> String {
    format!(
        "- bullet points explaining the changes\n\n{}\n\n\
         Each bullet should:\n\
         - Be a complete thought (10-20 words)\n\
         - Explain WHAT changed and WHY\n\
         - Mention specific files, components, or functions by name",
        bullet_instruction(config.file_count, config.style)
    )
}

/// Sentence telling the model how many bullets to write.
pub fn bullet_instruction(file_count: usize, style: CommitStyle) -> String {
    let prefix = if file_count >= 8 {
        "REQUIRED: Write exactly"
    } else {
        "Write"
    };
    let suffix = if file_count >= 15 {
        "for this large change"
    } else if file_count >= 4 {
        "for this change"
    } else {
        "for this small change"
    };
    format!(
        "{prefix} {} bullets {suffix} ({file_count} files).",
        bullet_range(file_count, style)
    )
}

fn changes_section(context: &ProcessedContext) -> String {
    let mut parts = vec![
        "<changes>".to_string(),
        format!("FILES CHANGED: {}", context.total_files),
        String::new(),
        sanitize_diff(&context.summary),
    ];

    if !context.detailed_diff.is_empty() {
        parts.push(String::new());
        parts.push("DIFF DETAILS:".to_string());
        parts.push(sanitize_diff(&context.detailed_diff));
    }

    if context.truncated {
        parts.push(String::new());
        parts.push(TRUNCATION_NOTE.to_string());
    }

    parts.push("</changes>".to_string());
    parts.join("\n")
}

fn hint_section(hint: Option<&str>) -> String {
    match hint.map(str::trim) {
        Some(hint) if !hint.is_empty() => format!(
            "<context>\nThe developer provided this context about the changes:\n\"{hint}\"\n\n\
             Use this to inform your message, but verify it matches what you see in the diff.\n</context>"
        ),
        _ => String::new(),
    }
}

fn final_instructions(config: &PromptAssemblyConfig) -> String {
    let format_example = match config.style {
        CommitStyle::Simple => "Subject line here",
        CommitStyle::Conventional | CommitStyle::Detailed => "type(scope): subject line",
    };

    if config.num_options > 1 {
        multi_option_instructions(config, format_example)
    } else {
        let body_rule = if config.include_body {
            "- Include bullet points in the body"
        } else {
            "- Do NOT include a body, subject line only"
        };
        format!(
            "<instructions>\nGenerate exactly ONE commit message.\n\nRules:\n\
             - Start directly with the {format_example} line\n\
             - No markdown formatting (no ```, no bold)\n\
             - No preamble like \"Here's a commit message:\"\n\
             - No explanation after the message\n\
             {body_rule}\n\
             - Just the raw commit message, ready to use\n</instructions>"
        )
    }
}

fn multi_option_instructions(config: &PromptAssemblyConfig, format_example: &str) -> String {
    let n = config.num_options;
    let labels: Vec<String> = (1..=n).map(|i| format!("[Option {i}]")).collect();

    let angles = (1..=n)
        .map(|i| format!("- Option {i}: Focus on {}", option_angle(i).focus))
        .collect::<Vec<_>>()
        .join("\n");

    let (approach, label_rule) = if n == 2 {
        (
            "Each option MUST take a meaningfully different approach, one technical and one about impact:".to_string(),
            "Include BOTH [Option 1] and [Option 2] labels exactly as shown".to_string(),
        )
    } else {
        (
            format!(
                "Each of the {n} options MUST take a distinct editorial angle. Rewording the same message does not count as a new option:"
            ),
            format!("Include ALL {n} labels ({}) exactly as shown", labels.join(", ")),
        )
    };

    let blocks = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let body = if config.include_body {
                format!("\n\n- bullet explaining {}", option_angle(i + 1).bullet)
            } else {
                String::new()
            };
            format!("{label}\n{format_example}{body}")
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "<instructions>\nGenerate exactly {n} SEPARATE commit message options.\n\n\
         {approach}\n{angles}\n\nFormat exactly like this:\n\n{blocks}\n\n\
         IMPORTANT:\n- {label_rule}\n- No markdown, no extra explanation, no preamble\n</instructions>"
    )
}

/// Remove control characters (other than newlines and tabs) and ANSI escape
/// sequences from diff text before it is embedded in the prompt.
pub fn sanitize_diff(text: &str) -> String {
    let without_ansi = ANSI_ESCAPE.replace_all(text, "");
    without_ansi
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_context(summary: &str, detailed: &str, truncated: bool) -> ProcessedContext {
        ProcessedContext {
            summary: summary.to_string(),
            detailed_diff: detailed.to_string(),
            total_files: 2,
            included_files: 1,
            filtered_files: 0,
            truncated,
            file_details: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_section_order() {
        let config = PromptAssemblyConfig {
            hint: Some("fixes the login race".to_string()),
            ..Default::default()
        };
        let prompt = assemble(&make_context("FILES CHANGED:", "+x", false), &config);

        let order = [
            "You are a senior software engineer",
            "<format>",
            "<examples>",
            "<changes>",
            "<context>",
            "<thinking>",
            "<instructions>",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|marker| prompt.find(marker).unwrap_or_else(|| panic!("missing {marker}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "sections out of order");
    }

    #[test]
    fn test_assemble_without_hint_has_no_context_block() {
        let prompt = assemble(&make_context("FILES CHANGED:", "", false), &PromptAssemblyConfig::default());
        assert!(!prompt.contains("<context>"));
        assert!(!prompt.contains("\n\n\n\n"));
    }

    #[test]
    fn test_blank_hint_is_treated_as_absent() {
        let config = PromptAssemblyConfig {
            hint: Some("   ".to_string()),
            ..Default::default()
        };
        let prompt = assemble(&make_context("FILES CHANGED:", "", false), &config);
        assert!(!prompt.contains("<context>"));
    }

    #[test]
    fn test_forced_type_replaces_vocabulary() {
        let config = PromptAssemblyConfig {
            forced_type: Some(CommitType::Fix),
            ..Default::default()
        };
        let section = format_section(&config);
        assert!(section.contains("IMPORTANT: Use type 'fix' for this commit."));
        assert!(!section.contains("Choose the most appropriate type"));
    }

    #[test]
    fn test_type_vocabulary_lists_every_type() {
        let section = format_section(&PromptAssemblyConfig::default());
        for t in CommitType::ALL {
            assert!(section.contains(&format!("  - {}: {}", t, t.description())));
        }
    }

    #[test]
    fn test_simple_style_has_no_type_prefix() {
        let config = PromptAssemblyConfig {
            style: CommitStyle::Simple,
            forced_type: Some(CommitType::Feat),
            ..Default::default()
        };
        let section = format_section(&config);
        assert!(section.contains("subject line (imperative mood, max 50 chars)"));
        assert!(section.contains("without type prefixes"));
        assert!(!section.contains("type(scope)"));
    }

    #[test]
    fn test_no_body_format() {
        let config = PromptAssemblyConfig {
            include_body: false,
            ..Default::default()
        };
        let section = format_section(&config);
        assert!(section.contains("Do NOT include a body or bullet points. Subject line only."));
        assert!(!section.contains("Each bullet should"));
    }

    #[test]
    fn test_bullet_instruction_wording() {
        assert_eq!(
            bullet_instruction(2, CommitStyle::Conventional),
            "Write 1-2 bullets for this small change (2 files)."
        );
        assert_eq!(
            bullet_instruction(5, CommitStyle::Conventional),
            "Write 3-4 bullets for this change (5 files)."
        );
        assert_eq!(
            bullet_instruction(10, CommitStyle::Detailed),
            "REQUIRED: Write exactly 5-6 bullets for this change (10 files)."
        );
        assert_eq!(
            bullet_instruction(20, CommitStyle::Conventional),
            "REQUIRED: Write exactly 5-6 bullets for this large change (20 files)."
        );
    }

    #[test]
    fn test_changes_section_with_truncation() {
        let section = changes_section(&make_context("FILES CHANGED:\n\n[Source]\n  a.rs (+1 -0)", "+x", true));
        assert!(section.starts_with("<changes>\nFILES CHANGED: 2\n\nFILES CHANGED:"));
        assert!(section.contains("\n\nDIFF DETAILS:\n+x"));
        assert!(section.contains(TRUNCATION_NOTE));
        assert!(section.ends_with("</changes>"));
    }

    #[test]
    fn test_changes_section_without_detail() {
        let section = changes_section(&make_context("FILES CHANGED:", "", false));
        assert!(!section.contains("DIFF DETAILS"));
        assert!(!section.contains("truncated"));
    }

    #[test]
    fn test_single_option_instructions() {
        let text = final_instructions(&PromptAssemblyConfig::default());
        assert!(text.contains("Generate exactly ONE commit message."));
        assert!(text.contains("- Include bullet points in the body"));
        assert!(!text.contains("[Option"));
    }

    #[test]
    fn test_two_option_instructions() {
        let config = PromptAssemblyConfig {
            num_options: 2,
            ..Default::default()
        };
        let text = final_instructions(&config);
        assert!(text.contains("Generate exactly 2 SEPARATE commit message options."));
        assert!(text.contains("one technical and one about impact"));
        assert!(text.contains("Include BOTH [Option 1] and [Option 2] labels exactly as shown"));
        assert!(text.contains("- bullet explaining implementation detail"));
        assert!(text.contains("- bullet explaining user-facing benefit"));
    }

    #[test]
    fn test_multi_option_without_body() {
        let config = PromptAssemblyConfig {
            num_options: 2,
            include_body: false,
            ..Default::default()
        };
        let text = final_instructions(&config);
        assert!(!text.contains("- bullet explaining"));
        assert!(text.contains("[Option 2]\ntype(scope): subject line"));
    }

    #[test]
    fn test_sanitize_diff_strips_control_and_ansi() {
        let dirty = "\x1b[31m+red\x1b[0m\tline\r\n\x07next";
        assert_eq!(sanitize_diff(dirty), "+red\tline\nnext");
    }
}
