//! Static prompt data and the lookups that select from it.

use super::config::CommitStyle;

/// Bullet-count ranges by minimum file count, largest threshold first.
pub const STANDARD_BULLETS: &[(usize, &str)] = &[(15, "5-6"), (8, "4-5"), (4, "3-4"), (0, "1-2")];

/// Bullet-count ranges for the detailed style.
pub const DETAILED_BULLETS: &[(usize, &str)] = &[(15, "6-8"), (8, "5-6"), (4, "4-5"), (0, "2-3")];

/// Bullet range for a change touching `file_count` files.
pub fn bullet_range(file_count: usize, style: CommitStyle) -> &'static str {
    let table = match style {
        CommitStyle::Detailed => DETAILED_BULLETS,
        CommitStyle::Conventional | CommitStyle::Simple => STANDARD_BULLETS,
    };
    table
        .iter()
        .find(|(threshold, _)| file_count >= *threshold)
        .or(table.last())
        .map_or("1-2", |&(_, range)| range)
}

/// An examples block for one (style, body) combination.
pub struct ExampleEntry {
    pub style: CommitStyle,
    pub include_body: bool,
    pub text: &'static str,
}

/// Examples are structural placeholders only, so the model has nothing
/// concrete to copy.
pub const EXAMPLES: &[ExampleEntry] = &[
    ExampleEntry {
        style: CommitStyle::Conventional,
        include_body: true,
        text: CONVENTIONAL_WITH_BODY,
    },
    ExampleEntry {
        style: CommitStyle::Conventional,
        include_body: false,
        text: "<examples>
Example 1: type(scope): <imperative summary of a fix>
Example 2: type(scope): <imperative summary of a new capability>
Example 3: type(scope): <imperative summary of a restructuring>
</examples>",
    },
    ExampleEntry {
        style: CommitStyle::Simple,
        include_body: true,
        text: "<examples>
Example 1 - Small change:
<Imperative summary of the single change>

- <why it was needed or what it prevents>

Example 2 - Focused feature:
<Imperative summary of the new capability>

- <the main behavior it adds>
- <a limit, default, or edge case worth knowing>
</examples>",
    },
    ExampleEntry {
        style: CommitStyle::Simple,
        include_body: false,
        text: "<examples>
Example 1: <Imperative summary of a fix>
Example 2: <Imperative summary of a new capability>
Example 3: <Imperative summary of a restructuring>
</examples>",
    },
    ExampleEntry {
        style: CommitStyle::Detailed,
        include_body: true,
        text: "<examples>
Example 1 - Fix with context:
type(scope): <imperative summary naming the component and the failure>

- <the behavior before and after the fix>
- <how callers or clients can detect the new behavior>
- <any logging, metrics, or monitoring added>

Example 2 - Feature with full detail:
type(scope): <imperative summary naming the capability and its mechanism>

- <the core behavior and its limits>
- <what the user sees when a limit is reached>
- <the infrastructure or component it relies on>
- <new configuration knobs and where they live>
</examples>",
    },
    ExampleEntry {
        style: CommitStyle::Detailed,
        include_body: false,
        text: "<examples>
Example 1: type(scope): <imperative summary naming the component and the failure>
Example 2: type(scope): <imperative summary naming the capability and its mechanism>
</examples>",
    },
];

const CONVENTIONAL_WITH_BODY: &str = "<examples>
Example 1 - Small change (1 bullet):
type(scope): <imperative summary of the single change>

- <why it was needed or what it prevents>

Example 2 - Focused feature (2 bullets):
type(scope): <imperative summary of the new capability>

- <the main behavior it adds>
- <a limit, default, or edge case worth knowing>

Example 3 - Wider restructuring (3 bullets):
type(scope): <imperative summary of what was reorganized>

- <what moved and where it lives now>
- <what duplication or coupling it removes>
- <what becomes easier to test or extend>
</examples>";

/// Used when no entry matches.
pub const FALLBACK_EXAMPLES: &str = CONVENTIONAL_WITH_BODY;

pub fn examples_for(style: CommitStyle, include_body: bool) -> &'static str {
    EXAMPLES
        .iter()
        .find(|e| e.style == style && e.include_body == include_body)
        .map_or(FALLBACK_EXAMPLES, |e| e.text)
}

/// Editorial angle for one option in a multi-option request.
pub struct OptionAngle {
    /// What the option should focus on.
    pub focus: &'static str,
    /// What its example bullet explains.
    pub bullet: &'static str,
}

pub const OPTION_ANGLES: &[OptionAngle] = &[
    OptionAngle {
        focus: "the TECHNICAL change (what was done to the code)",
        bullet: "implementation detail",
    },
    OptionAngle {
        focus: "the USER/BUSINESS impact (why it matters)",
        bullet: "user-facing benefit",
    },
    OptionAngle {
        focus: "the ARCHITECTURAL scope (which components are affected and how they relate)",
        bullet: "structural consequence",
    },
    OptionAngle {
        focus: "the RISK and follow-up (what could break, what to watch after merging)",
        bullet: "risk or migration note",
    },
];

/// Used once the angle table runs out.
pub static FALLBACK_ANGLE: OptionAngle = OptionAngle {
    focus: "an angle none of the other options takes",
    bullet: "distinct consequence",
};

/// Angle for the 1-based option `index`.
pub fn option_angle(index: usize) -> &'static OptionAngle {
    index
        .checked_sub(1)
        .and_then(|i| OPTION_ANGLES.get(i))
        .unwrap_or(&FALLBACK_ANGLE)
}
