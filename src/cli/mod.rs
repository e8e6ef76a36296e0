use crate::app_error::AppError;
use crate::config::{self, Config, DEFAULT_CONFIG_TEMPLATE, LoadError, Settings};
use crate::github;
use crate::output::{self, Format, Page, WorkflowRow};
use crate::report::{self, Document, Summary};
use crate::version;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Generator, generate};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

const DEFAULT_CONFIG_PATH: &str = "./wfdash.yml";

#[derive(Debug, Parser)]
#[command(
    name = "wfdash",
    version = version::VALUE,
    about = "Render the latest GitHub Actions workflow runs as a static dashboard",
    styles = clap_styles()
)]
struct Cli {
    #[arg(long = "no-color", global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Generate(GenerateArgs),
    Init(InitArgs),
    List(ListArgs),
    Validate(ValidateArgs),
    Version,
    Completion(CompletionArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// GitHub token sent as a bearer credential.
    #[arg(env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FormatChoice::Html)]
    format: FormatChoice,

    #[arg(long = "html-out")]
    html_out: Option<PathBuf>,

    #[arg(long = "markdown-out")]
    markdown_out: Option<PathBuf>,

    /// Overrides `dashboard.time_zone`, e.g. `America/New_York`, `-05:00`, `UTC` or `none`.
    #[arg(long = "time-zone", allow_hyphen_values = true)]
    time_zone: Option<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CompletionArgs {
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatChoice {
    Html,
    Markdown,
    Both,
}

impl FormatChoice {
    fn formats(self) -> &'static [Format] {
        match self {
            FormatChoice::Html => &[Format::Html],
            FormatChoice::Markdown => &[Format::Markdown],
            FormatChoice::Both => &[Format::Html, Format::Markdown],
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn clap_styles() -> Styles {
    Styles::plain()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Cyan.on_default())
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Cyan.on_default())
        .context(AnsiColor::White.on_default())
        .context_value(AnsiColor::Cyan.on_default())
}

pub fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    output::configure(cli.no_color);

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Init(args) => run_init(args),
        Commands::List(args) => run_list(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Version => {
            println!("{}", version::VALUE);
            Ok(())
        }
        Commands::Completion(args) => run_completion(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let token = args
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            AppError::usage("a GitHub token is required (argument or GITHUB_TOKEN)")
        })?;

    let cfg = load_config_or_builtin(args.config.as_deref())?;
    let mut settings = cfg.resolve().map_err(AppError::usage)?;
    if let Some(flag) = args.time_zone.as_deref() {
        settings.zone = config::resolve_zone(flag)
            .map_err(|e| AppError::usage(format!("--time-zone: {e}")))?;
    }

    let client = github::Client::new(&token, &settings.api_url, settings.timeout)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let page = Page {
        title: settings.title.clone(),
        stylesheet: settings.stylesheet.clone(),
    };

    let mut targets = Vec::new();
    for &format in args.format.formats() {
        let path = match format {
            Format::Html => args.html_out.clone(),
            Format::Markdown => args.markdown_out.clone(),
        }
        .unwrap_or_else(|| PathBuf::from(format.default_path()));
        targets.push((format, path));
    }

    let summary = write_documents(&targets, &client, &page, &settings)?;

    if args.json {
        #[derive(Serialize)]
        struct GenerateOutput {
            documents: Vec<String>,
            #[serde(flatten)]
            summary: Summary,
        }

        let payload = GenerateOutput {
            documents: targets
                .iter()
                .map(|(_, path)| path.display().to_string())
                .collect(),
            summary,
        };
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &payload)
            .map_err(|e| AppError::internal(format!("encode generate json: {e}")))?;
        writeln!(stdout).map_err(|e| AppError::internal(format!("write output: {e}")))?;
        return Ok(());
    }

    for (_, path) in &targets {
        println!("wrote {}", output::command(&path.display().to_string()));
    }
    println!(
        "{} rows, {} passing, {} need attention",
        output::number(&summary.rows.to_string()),
        output::success(&summary.succeeded.to_string()),
        output::warning(&summary.warnings.to_string()),
    );
    Ok(())
}

fn write_documents(
    targets: &[(Format, PathBuf)],
    fetcher: &impl github::RunFetcher,
    page: &Page,
    settings: &Settings,
) -> Result<Summary, AppError> {
    let mut documents = Vec::with_capacity(targets.len());
    for (format, path) in targets {
        let file = File::create(path)
            .map_err(|e| AppError::internal(format!("create {}: {e}", path.display())))?;
        documents.push(Document::new(*format, BufWriter::new(file)));
    }

    let total = settings.entries.len();
    let summary = report::generate(
        &mut documents,
        fetcher,
        page,
        &settings.entries,
        settings.zone,
        OffsetDateTime::now_utc,
        |idx, record| {
            // Progress is best-effort; a closed stderr must not stop the report.
            let _ = output::print_progress(io::stderr().lock(), idx + 1, total, record);
        },
    )?;

    Ok(summary)
}

fn run_init(args: InitArgs) -> Result<(), AppError> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if config_path.exists() && !args.force {
        return Err(AppError::usage(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| AppError::internal(format!("write {}: {e}", config_path.display())))?;

    println!(
        "created {}",
        output::command(&config_path.display().to_string())
    );
    Ok(())
}

fn run_list(args: ListArgs) -> Result<(), AppError> {
    let cfg = load_config_or_builtin(args.config.as_deref())?;

    #[derive(Serialize)]
    struct WorkflowJson {
        #[serde(skip_serializing_if = "String::is_empty")]
        group: String,
        owner: String,
        repo: String,
        workflow: String,
        url: String,
    }

    let items: Vec<WorkflowJson> = cfg
        .entries()
        .into_iter()
        .map(|entry| WorkflowJson {
            url: entry.workflow.web_url(),
            group: entry.group,
            owner: entry.workflow.owner,
            repo: entry.workflow.repo,
            workflow: entry.workflow.workflow,
        })
        .collect();

    if args.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &items)
            .map_err(|e| AppError::internal(format!("encode workflows json: {e}")))?;
        writeln!(stdout).map_err(|e| AppError::internal(format!("write output: {e}")))?;
        return Ok(());
    }

    let rows: Vec<WorkflowRow> = items
        .into_iter()
        .map(|item| WorkflowRow {
            group: item.group,
            repo: format!("{}/{}", item.owner, item.repo),
            workflow: item.workflow,
            url: item.url,
        })
        .collect();

    output::print_workflows(io::stdout().lock(), &rows)
        .map_err(|e| AppError::internal(format!("print workflows: {e}")))
}

fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    #[derive(Serialize)]
    struct Issue<'a> {
        field: &'a str,
        message: &'a str,
    }

    #[derive(Serialize)]
    struct ValidateOutput<'a> {
        valid: bool,
        config: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        workflows: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        issues: Option<Vec<Issue<'a>>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a str>,
    }

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config_path_text = config_path.display().to_string();

    let emit = |payload: &ValidateOutput<'_>| -> Result<(), AppError> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, payload)
            .map_err(|e| AppError::internal(format!("encode validate json: {e}")))?;
        writeln!(stdout).map_err(|e| AppError::internal(format!("write output: {e}")))
    };

    let cfg = match config::parse(&config_path) {
        Ok(cfg) => cfg,
        Err(err) => {
            let message = err.to_string();
            if args.json {
                emit(&ValidateOutput {
                    valid: false,
                    config: &config_path_text,
                    workflows: None,
                    issues: None,
                    error: Some(&message),
                })?;
            }
            return Err(AppError::usage(message));
        }
    };

    match config::validate(&cfg) {
        Ok(()) => {
            let count = cfg.entries().len();
            if args.json {
                emit(&ValidateOutput {
                    valid: true,
                    config: &config_path_text,
                    workflows: Some(count),
                    issues: None,
                    error: None,
                })?;
            } else {
                println!(
                    "valid {} ({} workflows)",
                    output::command(&config_path_text),
                    output::number(&count.to_string())
                );
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                let issues: Vec<Issue<'_>> = err
                    .issues
                    .iter()
                    .map(|issue| Issue {
                        field: &issue.field,
                        message: &issue.message,
                    })
                    .collect();
                emit(&ValidateOutput {
                    valid: false,
                    config: &config_path_text,
                    workflows: None,
                    issues: Some(issues),
                    error: Some(&err.to_string()),
                })?;
            }
            Err(AppError::usage(err.to_string()))
        }
    }
}

/// Uses the given config, else `./wfdash.yml` if present, else the built-in list.
fn load_config_or_builtin(explicit: Option<&Path>) -> Result<Config, AppError> {
    if let Some(path) = explicit {
        return load_config_classified(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        return load_config_classified(default_path);
    }

    config::builtin().map_err(AppError::internal)
}

fn load_config_classified(path: &Path) -> Result<Config, AppError> {
    config::load(path).map_err(|err| match err {
        LoadError::Read(_) if !err.is_not_found() => AppError::internal(err.to_string()),
        _ => AppError::usage(err.to_string()),
    })
}

fn run_completion(args: CompletionArgs) -> Result<(), AppError> {
    let mut cmd = Cli::command();
    let mut stdout = io::stdout().lock();

    match args.shell {
        Shell::Bash => generate_completion(clap_complete::shells::Bash, &mut cmd, &mut stdout),
        Shell::Zsh => generate_completion(clap_complete::shells::Zsh, &mut cmd, &mut stdout),
        Shell::Fish => generate_completion(clap_complete::shells::Fish, &mut cmd, &mut stdout),
        Shell::Powershell => {
            generate_completion(clap_complete::shells::PowerShell, &mut cmd, &mut stdout)
        }
    }
    .map_err(|e| AppError::internal(format!("generate completion: {e}")))
}

fn generate_completion<G: Generator>(
    generator: G,
    cmd: &mut clap::Command,
    writer: &mut impl Write,
) -> Result<(), io::Error> {
    generate(generator, cmd, "wfdash", writer);
    writer.flush()
}
