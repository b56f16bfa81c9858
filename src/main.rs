//! Purpose: `rollbook` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs commands, emits output.
//! Invariants: Commands emit stable stdout formats (human or JSON by command/flags).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: The binary never prompts; missing arguments are usage errors.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;

mod command_dispatch;

use rollbook::api::{
    Course, Error, ErrorKind, LoadStatus, LocalClient, RecordStore, Student, to_exit_code,
};
use rollbook::notice::{Notice, notice_json};
use rollbook::store_paths::{COURSES_FILE, STUDENTS_FILE, default_data_dir};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let data_dir = cli.dir.unwrap_or_else(default_data_dir);
    let color_mode = cli.color;

    let result = command_dispatch::dispatch_command(cli.command, data_dir, color_mode);

    result
        .map_err(add_io_hint)
        .map_err(add_invalid_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "rollbook",
    version,
    about = "Flat-file student and course records for the command line",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Records live in two delimited text files next to your data.

Mental model:
  - `student` / `course` manage the two record collections
  - `assign` links a course onto a student's course list
  - every mutation rewrites the backing file before returning
"#,
    after_help = r#"EXAMPLES
  $ rollbook student add --id S1 --name Ann --age 20 --roll-no R1 --grade A
  $ rollbook course add --id C1 --name Math
  $ rollbook assign S1 C1
  $ rollbook student list

LEARN MORE
  Backing files (in --dir, default: working directory):
    students.csv    student_id,name,age,roll_no,grade,courses
    courses.csv     course_id,course_name

  $ rollbook <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        help = "Data directory holding students.csv and courses.csv (default: working directory)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ListFormat {
    Human,
    Jsonl,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Manage student records",
        after_help = r#"EXAMPLES
  $ rollbook student add --id S1 --name Ann --age 20 --roll-no R1 --grade A
  $ rollbook student list
  $ rollbook student delete S1"#
    )]
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
    #[command(
        arg_required_else_help = true,
        about = "Manage course records",
        after_help = r#"EXAMPLES
  $ rollbook course add --id C1 --name Math
  $ rollbook course list
  $ rollbook course delete C1"#
    )]
    Course {
        #[command(subcommand)]
        command: CourseCommand,
    },
    #[command(
        about = "Assign a course to a student",
        long_about = "Appends the course's name to the student's course list and rewrites students.csv."
    )]
    Assign {
        #[arg(help = "Id of the student receiving the course")]
        student_id: String,
        #[arg(help = "Id of the course to assign")]
        course_id: String,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    #[command(about = "Add a student and persist the collection")]
    Add(StudentAddArgs),
    #[command(about = "List students in collection order")]
    List {
        #[arg(long, default_value = "human", value_enum, help = "Output format")]
        format: ListFormat,
    },
    #[command(about = "Delete the first student matching the id")]
    Delete {
        #[arg(help = "Id of the student to delete")]
        student_id: String,
    },
}

#[derive(Args)]
struct StudentAddArgs {
    #[arg(long, help = "Student id (unique by convention)")]
    id: String,
    #[arg(long, help = "Full name")]
    name: String,
    #[arg(long, help = "Age in years")]
    age: u32,
    #[arg(long, help = "Roll number")]
    roll_no: String,
    #[arg(long, help = "Grade letter")]
    grade: String,
}

#[derive(Subcommand)]
enum CourseCommand {
    #[command(about = "Add a course and persist the collection")]
    Add(CourseAddArgs),
    #[command(about = "List courses in collection order")]
    List {
        #[arg(long, default_value = "human", value_enum, help = "Output format")]
        format: ListFormat,
    },
    #[command(about = "Delete the first course matching the id")]
    Delete {
        #[arg(help = "Id of the course to delete")]
        course_id: String,
    },
}

#[derive(Args)]
struct CourseAddArgs {
    #[arg(long, help = "Course id (unique by convention)")]
    id: String,
    #[arg(long, help = "Course name")]
    name: String,
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check directory permissions or use --dir to a writable location.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_invalid_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Invalid || err.hint().is_some() {
        return err;
    }
    err.with_hint("A backing file holds a row this tool cannot parse. Fix the named row and retry.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn emit_json(value: serde_json::Value, _color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let json = if is_tty {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {} (file: {})", notice.message, notice.file);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn emit_load_notices(statuses: &[LoadStatus], cmd: &str, color_mode: ColorMode) {
    for status in statuses {
        let LoadStatus::Missing(path) = status else {
            continue;
        };
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let notice = Notice {
            kind: "missing-file".to_string(),
            time: notice_time_now().unwrap_or_else(|| "unknown".to_string()),
            cmd: cmd.to_string(),
            file: file.clone(),
            message: format!("{file} not found; starting with an empty collection"),
            details: Map::new(),
        };
        emit_notice(&notice, color_mode);
    }
}

fn emit_duplicate_notice(cmd: &str, file: &str, id_field: &str, id: &str, color_mode: ColorMode) {
    let mut details = Map::new();
    details.insert(id_field.to_string(), json!(id));
    let notice = Notice {
        kind: "duplicate-id".to_string(),
        time: notice_time_now().unwrap_or_else(|| "unknown".to_string()),
        cmd: cmd.to_string(),
        file: file.to_string(),
        message: format!("id {id} already exists; both records were kept"),
        details,
    };
    emit_notice(&notice, color_mode);
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Invalid => "invalid record data".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(row) = err.row() {
        inner.insert("row".to_string(), json!(row));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(row) = err.row() {
        lines.push(format!(
            "{} {row}",
            colorize_label("row:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    match usage {
        Some(usage) => format!("Usage: {usage}. Try `rollbook --help`."),
        None => "Try `rollbook --help`.".to_string(),
    }
}
