//! Human and JSON rendering for taskboard commands.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::notice::{Notice, NoticeKind};

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// A command's human-readable report: a headline, key facts, then the
/// notices and follow-ups the board produced.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }

    /// Route board notices: errors and warnings become warnings, info lines
    /// become details.
    pub fn push_notices(&mut self, notices: &[Notice]) {
        for notice in notices {
            let line = match &notice.task_id {
                Some(task) => format!("{task}: {}", notice.message),
                None => notice.message.clone(),
            };
            match notice.kind {
                NoticeKind::Info => self.push_detail(line),
                NoticeKind::Warning | NoticeKind::Error => self.push_warning(line),
            }
        }
    }
}

/// JSON report printed by `--json`, for both successful and failed runs.
#[derive(Debug, Serialize)]
struct Report<'a> {
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Failure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Failure {
    kind: &'static str,
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

fn success_report<'a, T: Serialize>(
    command: &'a str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<Report<'a>> {
    Ok(Report {
        command,
        status: "success",
        data: Some(serde_json::to_value(data)?),
        error: None,
        warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
        next_steps: human.map(|h| h.next_steps.clone()).unwrap_or_default(),
    })
}

fn error_report<'a>(command: &'a str, err: &Error) -> Report<'a> {
    Report {
        command,
        status: "error",
        data: None,
        error: Some(Failure {
            kind: error_kind(err),
            code: err.exit_code(),
            message: err.to_string(),
            details: err.details(),
        }),
        warnings: Vec::new(),
        next_steps: recovery_hints(err),
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let report = success_report(command, data, human)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&error_report(command, err))?);
        return Ok(());
    }

    eprintln!("error: {err}");
    for hint in recovery_hints(err) {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut text = output.header.clone();

    if !output.summary.is_empty() {
        text.push_str("\n\nSummary:");
        for (key, value) in &output.summary {
            if value.is_empty() {
                text.push_str(&format!("\n- {key}"));
            } else {
                text.push_str(&format!("\n- {key}: {value}"));
            }
        }
    }

    let sections = [
        ("Details", &output.details),
        ("Warnings", &output.warnings),
        ("Next steps", &output.next_steps),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        text.push_str(&format!("\n\n{title}:"));
        for item in items {
            text.push_str(&format!("\n- {item}"));
        }
    }

    text
}

/// First positional argument, used to label error reports before clap runs.
pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

fn infer_command_name(mut args: impl Iterator<Item = String>) -> String {
    while let Some(arg) = args.next() {
        if matches!(arg.as_str(), "--root" | "--store" | "--actor") {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "taskboard".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "policy_blocked",
        _ => "operation_failed",
    }
}

fn recovery_hints(err: &Error) -> Vec<String> {
    let hint = match err {
        Error::TaskNotFound(_) => "taskboard board --project <id>",
        Error::MutationInFlight(_) => "retry once the pending change settles",
        Error::PermissionDenied { .. } => "ask the project owner or the assignee to move it",
        Error::InvalidConfig(_) => "fix .taskboard.toml then retry",
        Error::LockFailed(_) => "retry; another process holds the store lock",
        _ => return Vec::new(),
    };
    vec![hint.to_string()]
}
