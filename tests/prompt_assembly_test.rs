//! Integration tests for prompt assembly over processed diffs.

mod common;

use common::change_set;
use commit_msg_gen::commit::CommitType;
use commit_msg_gen::diff::{DiffProcessor, ProcessedContext, ProcessorConfig};
use commit_msg_gen::prompt::{CommitStyle, PromptAssemblyConfig, assemble};

fn context() -> ProcessedContext {
    let changes = change_set(&[
        ("src/auth/session.rs", 24, 6),
        ("tests/session_test.rs", 12, 0),
        ("Cargo.lock", 30, 30),
    ]);
    DiffProcessor::default().process(&changes)
}

fn config(num_options: usize) -> PromptAssemblyConfig {
    PromptAssemblyConfig {
        num_options,
        file_count: 3,
        ..Default::default()
    }
}

#[test]
fn test_no_hint_means_no_context_section() {
    let prompt = assemble(&context(), &config(1));

    assert!(!prompt.contains("<context>"));
    assert!(!prompt.contains("</context>"));
    assert!(!prompt.contains("The developer provided"));
}

#[test]
fn test_blank_hint_is_treated_as_absent() {
    let mut cfg = config(1);
    cfg.hint = Some("   \n".to_string());

    assert_eq!(assemble(&context(), &cfg), assemble(&context(), &config(1)));
}

#[test]
fn test_hint_is_placed_between_changes_and_analysis() {
    let mut cfg = config(1);
    cfg.hint = Some("session tokens were never refreshed".to_string());

    let prompt = assemble(&context(), &cfg);
    let changes = prompt.find("</changes>").unwrap();
    let hint = prompt.find("\"session tokens were never refreshed\"").unwrap();
    let thinking = prompt.find("<thinking>").unwrap();
    assert!(changes < hint && hint < thinking);
}

#[test]
fn test_three_options_have_three_labeled_blocks() {
    let prompt = assemble(&context(), &config(3));

    let label_lines: Vec<&str> = prompt
        .lines()
        .filter(|l| l.starts_with("[Option "))
        .collect();
    assert_eq!(label_lines, vec!["[Option 1]", "[Option 2]", "[Option 3]"]);
    assert!(!prompt.contains("[Option 4]"));
    assert!(prompt.contains("Generate exactly 3 SEPARATE commit message options"));
    assert!(prompt.contains("Include ALL 3 labels ([Option 1], [Option 2], [Option 3]) exactly as shown"));
}

#[test]
fn test_two_options_use_technical_and_impact_guidance() {
    let prompt = assemble(&context(), &config(2));

    assert!(prompt.contains("one technical and one about impact"));
    assert!(prompt.contains("Include BOTH [Option 1] and [Option 2] labels exactly as shown"));
}

#[test]
fn test_changes_section_reflects_processed_context() {
    let ctx = context();
    let prompt = assemble(&ctx, &config(1));

    assert!(prompt.contains("FILES CHANGED: 3"));
    assert!(prompt.contains(&ctx.summary));
    assert!(prompt.contains("DIFF DETAILS:"));
    assert!(prompt.contains("diff --git a/src/auth/session.rs b/src/auth/session.rs"));
    assert!(!prompt.contains("diff --git a/Cargo.lock"));
    assert!(!prompt.contains("[Note: Diff was truncated"));
}

#[test]
fn test_truncated_context_adds_note() {
    let changes = change_set(&[("src/a.rs", 80, 0), ("src/b.rs", 80, 0)]);
    let ctx = DiffProcessor::new(ProcessorConfig {
        max_tokens: 500,
        max_lines_per_file: 200,
    })
    .process(&changes);
    assert!(ctx.truncated);

    let prompt = assemble(&ctx, &config(1));
    assert!(prompt.contains("[Note: Diff was truncated due to size."));
}

#[test]
fn test_forced_type_and_simple_style() {
    let mut cfg = config(1);
    cfg.forced_type = Some(CommitType::Perf);
    let prompt = assemble(&context(), &cfg);
    assert!(prompt.contains("IMPORTANT: Use type 'perf' for this commit."));
    assert!(!prompt.contains("Choose the most appropriate type"));

    cfg.style = CommitStyle::Simple;
    let prompt = assemble(&context(), &cfg);
    assert!(prompt.contains("Use a simple, direct subject line without type prefixes."));
    assert!(!prompt.contains("IMPORTANT: Use type 'perf'"));
}

#[test]
fn test_no_body_instructions() {
    let mut cfg = config(1);
    cfg.include_body = false;
    let prompt = assemble(&context(), &cfg);

    assert!(prompt.contains("Do NOT include a body or bullet points. Subject line only."));
    assert!(!prompt.contains("bullets for this"));
}

#[test]
fn test_assembly_is_idempotent() {
    let ctx = context();
    let mut cfg = config(4);
    cfg.hint = Some("part of the auth cleanup".to_string());
    cfg.style = CommitStyle::Detailed;

    assert_eq!(assemble(&ctx, &cfg), assemble(&ctx, &cfg));
}
