//! Diagnostic rendering for contract violations.
//!
//! Wraps every error family in a codespan diagnostic with a stable code,
//! labels into the member's declared text where a byte offset exists, and a
//! JSON form for editor integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use vow_parser::ExtractError;

use crate::error::CheckError;

/// Stable code for a diagnostic, e.g. `E3001`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code as a string.
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A renderable diagnostic.
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// A diagnostic with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// An error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// A warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// A note diagnostic.
    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Severity::Note, message)
    }

    /// Sets the stable code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Adds the primary label, a byte range into `file_id`.
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, range).with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Adds a secondary label for a related location.
    pub fn with_secondary_label(
        mut self,
        file_id: usize,
        range: Range<usize>,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::secondary(file_id, range).with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Adds a `help:` note.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Renders a [`CheckError`]. `file_id` refers to the member's declared
    /// text; errors that carry a byte offset label into it.
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        match error {
            AbstractProperty { source, member } => {
                Diagnostic::error(format!(
                    "Property '{member}' of '{source}' cannot be abstract"
                ))
                .with_code(error_code(error))
                .with_help("only methods, getters and setters can be abstract")
            }

            AbstractWithBody { source, member } => {
                Diagnostic::error(format!("Abstract member '{source}.{member}' has a body"))
                    .with_code(error_code(error))
                    .with_help("declare it with an empty body: {}")
            }

            AbstractCollision { source, member } => Diagnostic::error(format!(
                "'{source}.{member}' is declared both abstract and concrete"
            ))
            .with_code(error_code(error)),

            AbstractAbstractCollision { source, member } => Diagnostic::error(format!(
                "'{source}.{member}' is declared abstract more than once"
            ))
            .with_code(error_code(error)),

            DuplicateMember { source, member } => {
                Diagnostic::error(format!("'{source}.{member}' is declared more than once"))
                    .with_code(error_code(error))
            }

            MagicNotMethod { source, member } => {
                Diagnostic::error(format!("Magic member '{source}.{member}' must be a method"))
                    .with_code(error_code(error))
            }

            MagicArity {
                source,
                member,
                expected,
                found,
            } => Diagnostic::error(format!(
                "Magic method '{source}.{member}' must take exactly {expected} argument{}",
                if *expected == 1 { "" } else { "s" },
            ))
            .with_code(error_code(error))
            .with_note(format!("found {found}")),

            MissingAbstract { source, names } => {
                Diagnostic::error(format!("'{source}' never declares its abstract members"))
                    .with_code(error_code(error))
                    .with_note(format!("missing: {}", names.join(", ")))
            }

            UnusedDefinitions { path, keys } => {
                Diagnostic::error(format!("Unused definitions for '{path}'"))
                    .with_code(error_code(error))
                    .with_note(format!("unused keys: {}", keys.join(", ")))
                    .with_help("every definition entry must match a declared position")
            }

            Extract(extract) => Self::from_extract_error(extract, file_id, error_code(error)),

            MissingParameter {
                source,
                function,
                position,
            } => Diagnostic::error(format!(
                "Missing required argument {position} of '{source}.{function}'"
            ))
            .with_code(error_code(error)),

            MissingProperty {
                source,
                function,
                position,
                name,
            } => Diagnostic::error(format!(
                "Missing required property '{name}' at position {position} of '{source}.{function}'"
            ))
            .with_code(error_code(error)),

            NotValidParameter {
                source,
                function,
                position,
                expected,
                given,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "Argument {position} of '{source}.{function}' expects '{expected}', got '{given}'"
                ))
                .with_code(error_code(error));
                if given == "null" || given == "undefined" {
                    diag = diag.with_help("mark the position nullable with a leading ?");
                }
                diag
            }

            NotValidProperty {
                source,
                function,
                position,
                name,
                expected,
                given,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "Property '{name}' at position {position} of '{source}.{function}' \
                     expects '{expected}', got '{given}'"
                ))
                .with_code(error_code(error));
                if given == "null" || given == "undefined" {
                    diag = diag.with_help("mark the position nullable with a leading ?");
                }
                diag
            }

            NotValidReturn {
                source,
                function,
                expected,
                given,
            } => Diagnostic::error(format!(
                "'{source}.{function}' must return '{expected}', got '{given}'"
            ))
            .with_code(error_code(error)),

            NotIterable {
                source,
                function,
                position,
                given,
            } => Diagnostic::error(format!(
                "'{source}.{function}' expects an iterable at position {position}, got '{given}'"
            ))
            .with_code(error_code(error))
            .with_help("arrays, iterators and generator functions are iterable"),
        }
    }

    /// Declaration parse errors label the offending byte when one is known.
    fn from_extract_error(error: &ExtractError, file_id: usize, code: ErrorCode) -> Self {
        match error {
            ExtractError::UnclosedDelimiter { path, open, at } => {
                Diagnostic::error(format!("Unclosed '{open}' in declaration of '{path}'"))
                    .with_code(code)
                    .with_primary_label(file_id, *at..*at + 1, "opened here")
            }
            ExtractError::UnterminatedComment { path, at } => {
                Diagnostic::error(format!("Unterminated comment in declaration of '{path}'"))
                    .with_code(code)
                    .with_primary_label(file_id, *at..*at + 2, "comment opens here")
            }
            ExtractError::UnterminatedString { path, at } => {
                Diagnostic::error(format!("Unterminated string in declaration of '{path}'"))
                    .with_code(code)
                    .with_primary_label(file_id, *at..*at + 1, "string opens here")
            }
            other => Diagnostic::error(other.to_string()).with_code(code),
        }
    }

    /// Emits to stderr with colors.
    pub fn emit(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// The underlying codespan diagnostic, for custom rendering.
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// The JSON form, for editor integration.
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Stable code, e.g. `E3001`.
    pub code: Option<String>,
    /// Severity level.
    pub severity: String,
    /// Main message.
    pub message: String,
    /// Source locations.
    pub labels: Vec<JsonLabel>,
    /// Notes and help lines.
    pub notes: Vec<String>,
}

/// One label of a JSON diagnostic.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// Name the labeled text was registered under.
    pub file: String,
    /// Start line, 1-indexed.
    pub start_line: usize,
    /// Start column, 1-indexed.
    pub start_column: usize,
    /// End line, 1-indexed.
    pub end_line: usize,
    /// End column, 1-indexed.
    pub end_column: usize,
    /// Label message.
    pub message: Option<String>,
    /// `primary` or `secondary`.
    pub style: String,
}

impl JsonDiagnostic {
    /// Converts a [`Diagnostic`], resolving label offsets to line/column
    /// positions through `files`.
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file_id = label.file_id;
                let file_name = files.get(file_id).ok()?.name().to_string();
                let start = files.get(file_id).ok()?.location((), label.range.start).ok()?;
                let end = files.get(file_id).ok()?.location((), label.range.end).ok()?;
                Some(JsonLabel {
                    file: file_name,
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        codespan_reporting::diagnostic::LabelStyle::Primary => "primary",
                        codespan_reporting::diagnostic::LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// The stable code for a [`CheckError`].
///
/// `E1xxx` are declaration parse errors, `E2xxx` extraction rule
/// violations, `E3xxx` call-time violations.
pub fn error_code(error: &CheckError) -> ErrorCode {
    use CheckError::*;

    match error {
        Extract(extract) => match extract {
            ExtractError::MissingParameterList { .. } => ErrorCode("E1001"),
            ExtractError::UnclosedDelimiter { .. } => ErrorCode("E1002"),
            ExtractError::UnterminatedComment { .. } => ErrorCode("E1003"),
            ExtractError::UnterminatedString { .. } => ErrorCode("E1004"),
            ExtractError::EmptyParameter { .. } => ErrorCode("E1005"),
            ExtractError::BadParameterName { .. } => ErrorCode("E1006"),
            ExtractError::BadTypeExpression { .. } => ErrorCode("E1007"),
            ExtractError::BadPositionKey { .. } => ErrorCode("E1008"),
            ExtractError::DestructuredVariadic { .. } => ErrorCode("E1009"),
            ExtractError::AmbiguousDestructuredTyping { .. } => ErrorCode("E1010"),
            ExtractError::VariadicPropertyDefinition { .. } => ErrorCode("E1011"),
            ExtractError::DefaultEval { .. } => ErrorCode("E1012"),
            ExtractError::DefaultMismatch { .. } => ErrorCode("E1013"),
            ExtractError::Type(_) => ErrorCode("E1014"),
        },
        AbstractProperty { .. } => ErrorCode("E2001"),
        AbstractWithBody { .. } => ErrorCode("E2002"),
        AbstractCollision { .. } => ErrorCode("E2003"),
        AbstractAbstractCollision { .. } => ErrorCode("E2004"),
        DuplicateMember { .. } => ErrorCode("E2005"),
        MagicNotMethod { .. } => ErrorCode("E2006"),
        MagicArity { .. } => ErrorCode("E2007"),
        MissingAbstract { .. } => ErrorCode("E2008"),
        UnusedDefinitions { .. } => ErrorCode("E2009"),
        MissingParameter { .. } => ErrorCode("E3001"),
        MissingProperty { .. } => ErrorCode("E3002"),
        NotValidParameter { .. } => ErrorCode("E3003"),
        NotValidProperty { .. } => ErrorCode("E3004"),
        NotValidReturn { .. } => ErrorCode("E3005"),
        NotIterable { .. } => ErrorCode("E3006"),
    }
}

/// A single-entry file table holding one member's declared text.
pub fn create_files(name: impl Into<String>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(name.into(), source.into());
    files
}
