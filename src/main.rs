//! cm - CLI entry point.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use dialoguer::{Editor, Input, Select};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use commit_msg_gen::commit::{CommitType, append_ticket, clean_commit_message, parse_options};
use commit_msg_gen::config::Config;
use commit_msg_gen::diff::{DiffProcessor, ProcessedContext};
use commit_msg_gen::git::{collect_staged, open_repository};
use commit_msg_gen::llm::{
    LlmClient, LlmResponse, OllamaClient, Provider, generate_commit_message, get_client,
};
use commit_msg_gen::prompt::{CommitStyle, PromptAssemblyConfig, assemble};

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 4;

/// Generate commit messages for staged changes using a local or hosted LLM.
#[derive(Parser, Debug)]
#[command(name = "cm")]
#[command(about = "Generate commit messages for staged changes using an LLM")]
#[command(version)]
struct Cli {
    /// Generate N alternatives to choose from (2-4, default 2)
    #[arg(short = 'c', long = "choose", value_name = "N", num_args = 0..=1, default_missing_value = "2")]
    choose: Option<usize>,

    /// Extra context for the model, e.g. "fixes the login race"
    #[arg(long)]
    hint: Option<String>,

    /// Force the commit type (feat, fix, refactor, ...)
    #[arg(short = 't', long = "type")]
    commit_type: Option<CommitType>,

    /// Ticket to append as a trailer, e.g. PROJ-123
    #[arg(short = 'j', long)]
    jira: Option<String>,

    /// Trailer prefix for --jira (defaults to the config value)
    #[arg(long)]
    ticket_prefix: Option<String>,

    /// Message style: conventional, simple, or detailed
    #[arg(short = 's', long)]
    style: Option<CommitStyle>,

    /// Subject line only, no bullet body
    #[arg(long)]
    no_body: bool,

    /// LLM provider: auto, ollama, or claude
    #[arg(short = 'p', long)]
    provider: Option<Provider>,

    /// Model name for the selected provider
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Pre-load the Ollama model into memory and exit
    #[arg(long)]
    warmup: bool,

    /// Token budget for the detailed diff
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Print the assembled prompt without calling a model
    #[arg(long)]
    dry_run: bool,

    /// Show prompt size, token usage, and timings
    #[arg(long)]
    verbose: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    display_config: bool,
}

impl Cli {
    /// Number of options requested, or 1 without `--choose`.
    fn num_options(&self) -> usize {
        self.choose
            .map(|n| n.clamp(MIN_OPTIONS, MAX_OPTIONS))
            .unwrap_or(1)
    }

    /// Layer CLI flags over the loaded configuration.
    fn apply_to(&self, config: &mut Config) {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if self.no_body {
            config.include_body = false;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(prefix) = &self.ticket_prefix {
            config.ticket_prefix = prefix.clone();
        }
    }
}

#[derive(Default)]
struct Timings {
    git: Duration,
    diff: Duration,
    prompt: Duration,
    generate: Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loaded = Config::load().context("Failed to load configuration")?;
    let mut config = loaded.config;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    if cli.display_config {
        match &loaded.path {
            Some(path) => println!("Config file: {}", path.display()),
            None => println!("Config file: (none, using defaults)"),
        }
        println!("{}", config.to_pretty_json());
        return Ok(());
    }

    if cli.warmup {
        return run_warmup(&config).await;
    }

    let stdout_is_tty = std::io::stdout().is_terminal();
    let interactive = stdout_is_tty && std::io::stdin().is_terminal();
    let mut timings = Timings::default();

    // Step 1: Collect staged changes
    let started = Instant::now();
    let repo = open_repository(".")
        .context("Not a git repository. Run cm from within a git repository.")?;
    let changes = collect_staged(&repo).context("Failed to read staged changes")?;
    timings.git = started.elapsed();

    if changes.is_empty() {
        eprintln!("No staged changes. Run 'git add' first.");
        std::process::exit(1);
    }

    // Step 2: Triage and budget the diff
    let started = Instant::now();
    let processor = DiffProcessor::new(config.processor_config());
    let processed = processor.process(&changes);
    timings.diff = started.elapsed();

    if stdout_is_tty && !cli.dry_run {
        print_file_list(&processed, config.max_file_display);
    }

    // Step 3: Assemble the prompt
    let started = Instant::now();
    let mut prompt_config = PromptAssemblyConfig {
        hint: cli.hint.clone(),
        forced_type: cli.commit_type,
        num_options: cli.num_options(),
        file_count: processed.total_files,
        style: config.style,
        include_body: config.include_body,
        max_subject_length: config.max_subject_length,
    };
    let mut prompt = assemble(&processed, &prompt_config);
    timings.prompt = started.elapsed();

    if cli.dry_run {
        println!("{prompt}");
        return Ok(());
    }

    // Step 4: Generate
    let client = get_client(config.provider, config.model.clone())
        .await
        .context("Failed to initialize LLM provider")?;
    let validate = config.style != CommitStyle::Simple && prompt_config.num_options <= 1;

    loop {
        if stdout_is_tty {
            println!(
                "Analyzing {} files using {}...",
                processed.total_files,
                client.name()
            );
        }

        let started = Instant::now();
        let response = generate_commit_message(client.as_ref(), &prompt, validate)
            .await
            .context("Failed to generate commit message")?;
        timings.generate = started.elapsed();

        if cli.verbose {
            print_verbose_stats(&prompt, &response, &timings);
        }

        let Some(message) = pick_message(&response, prompt_config.num_options, interactive)? else {
            println!("Cancelled.");
            return Ok(());
        };
        let message = match &cli.jira {
            Some(ticket) => append_ticket(&message, &config.ticket_prefix, ticket),
            None => message,
        };

        if !stdout_is_tty {
            println!("{message}");
            return Ok(());
        }

        println!("\n{message}\n");

        if !interactive {
            return Ok(());
        }

        match ask_next_action()? {
            NextAction::Accept => return Ok(()),
            NextAction::Edit => {
                if let Some(edited) = edit_message(&message) {
                    println!("\n{edited}\n");
                }
                return Ok(());
            }
            NextAction::Regenerate => {
                if let Some(hint) = ask_hint()? {
                    prompt_config.hint = Some(hint);
                }
                prompt = assemble(&processed, &prompt_config);
                println!("Regenerating...");
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "commit_msg_gen=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Pre-load the configured Ollama model.
async fn run_warmup(config: &Config) -> Result<()> {
    if config.provider == Provider::Claude {
        bail!("--warmup only works with Ollama (local models)");
    }

    let client = OllamaClient::connect(config.model.clone(), None)
        .await
        .context("Failed to connect to Ollama")?;

    if client.is_model_loaded().await {
        println!("Model {} is already loaded", client.model());
        return Ok(());
    }

    println!("Loading {}...", client.model());
    let started = Instant::now();
    client.warmup().await.context("Failed to load model")?;
    println!(
        "Ready in {:.1}s. Model will stay loaded for ~10 minutes",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Print the staged files being analyzed.
fn print_file_list(processed: &ProcessedContext, max_display: usize) {
    println!("Staged files:");
    for detail in processed.file_details.iter().take(max_display) {
        println!("  {} (+{} -{})", detail.path, detail.additions, detail.deletions);
    }
    let hidden = processed.file_details.len().saturating_sub(max_display);
    if hidden > 0 {
        println!("  ... and {hidden} more files");
    }
    if processed.filtered_files > 0 {
        println!("  ({} noise files filtered)", processed.filtered_files);
    }
    println!();
}

/// Turn the raw response into a single message.
///
/// Returns `None` when the user cancels the selection.
fn pick_message(response: &LlmResponse, num_options: usize, interactive: bool) -> Result<Option<String>> {
    if num_options <= 1 {
        return Ok(Some(clean_commit_message(response.content.trim())));
    }

    let options = parse_options(&response.content);
    if !interactive || options.len() == 1 {
        return Ok(options.into_iter().next());
    }

    let labels: Vec<String> = options
        .iter()
        .map(|o| o.lines().next().unwrap_or_default().to_string())
        .collect();
    let choice = Select::new()
        .with_prompt("Pick a commit message")
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("Selection failed")?;

    Ok(choice.and_then(|idx| options.into_iter().nth(idx)))
}

/// What to do with a generated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextAction {
    Accept,
    Edit,
    Regenerate,
}

/// Map the post-generation answer to an action. Anything unrecognized accepts.
fn parse_action(answer: &str) -> NextAction {
    match answer.trim().to_lowercase().as_str() {
        "e" | "edit" => NextAction::Edit,
        "r" | "regenerate" => NextAction::Regenerate,
        _ => NextAction::Accept,
    }
}

fn ask_next_action() -> Result<NextAction> {
    let answer: String = Input::new()
        .with_prompt("(e)dit, (r)egenerate, or Enter to accept")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read input")?;
    Ok(parse_action(&answer))
}

/// Ask for an optional hint before regenerating. Blank input means no new hint.
fn ask_hint() -> Result<Option<String>> {
    let hint: String = Input::new()
        .with_prompt("Hint (Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read input")?;
    Ok(non_blank(Some(hint)))
}

/// Open `message` in `$VISUAL`/`$EDITOR`.
///
/// Returns `None` when the editor fails, is closed without saving, or leaves
/// the message empty; the original message then stands.
fn edit_message(message: &str) -> Option<String> {
    match Editor::new().extension(".gitcommit").edit(message) {
        Ok(edited) => non_blank(edited),
        Err(e) => {
            warn!("Failed to open editor: {e}");
            None
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn print_verbose_stats(prompt: &str, response: &LlmResponse, timings: &Timings) {
    let chars = prompt.chars().count();
    println!();
    println!("  Prompt: ~{} tokens ({} chars)", chars / 4, chars);
    println!("  Response: {} tokens from {}", response.tokens_used, response.model);
    let secs = timings.generate.as_secs_f64();
    if response.tokens_used > 0 && secs > 0.0 {
        println!("  Speed: {:.1} tokens/sec", response.tokens_used as f64 / secs);
    }
    println!(
        "  Timings: git={:.2}s, diff={:.2}s, prompt={:.2}s, generate={:.2}s",
        timings.git.as_secs_f64(),
        timings.diff.as_secs_f64(),
        timings.prompt.as_secs_f64(),
        secs
    );
}
