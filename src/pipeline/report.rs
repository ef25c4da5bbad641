//! Structured per-invocation diagnostics for the transform pipeline.
//!
//! The report is the pipeline's only logging dependency: it is created per
//! invocation and passed explicitly into the stages, so the transform
//! functions stay pure and independently testable. Callers decide what to
//! do with it - print it, count drops, or ignore it.

use std::fmt;

/// Everything the pipeline had to skip, drop, or fall back on.
#[derive(Clone, Debug, Default)]
pub struct TransformReport {
    /// All entries, in the order they were recorded.
    pub entries: Vec<ReportEntry>,
}

impl TransformReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry to the report.
    pub fn add(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count()
    }

    /// Returns the number of info notes in the report.
    pub fn info_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Info)
            .count()
    }

    /// Returns the number of annotations that were skipped or dropped.
    pub fn dropped_count(&self) -> usize {
        self.entries.iter().filter(|e| e.code.is_drop()).count()
    }

    /// Returns true if the whole image fell back to untransformed output.
    pub fn fell_back(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.code == EntryCode::PipelineFallback)
    }

    /// Returns true if nothing was recorded at all.
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "Transform completed: no annotations skipped or dropped");
        }

        writeln!(
            f,
            "Transform completed with {} warning(s), {} note(s), {} dropped annotation(s):",
            self.warning_count(),
            self.info_count(),
            self.dropped_count()
        )?;
        writeln!(f)?;

        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }

        Ok(())
    }
}

/// A single report entry.
#[derive(Clone, Debug)]
pub struct ReportEntry {
    /// The severity of the entry.
    pub severity: Severity,

    /// A stable code for the entry type.
    pub code: EntryCode,

    /// A human-readable description.
    pub message: String,

    /// Where in the invocation the entry occurred.
    pub context: EntryContext,
}

impl ReportEntry {
    /// Creates a new entry.
    pub fn new(
        severity: Severity,
        code: EntryCode,
        message: impl Into<String>,
        context: EntryContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new warning.
    pub fn warning(code: EntryCode, message: impl Into<String>, context: EntryContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }

    /// Creates a new info note.
    pub fn info(code: EntryCode, message: impl Into<String>, context: EntryContext) -> Self {
        Self::new(Severity::Info, code, message, context)
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a report entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A policy note that changed nothing about the output.
    Info,
    /// An annotation was skipped/dropped, or the output may diverge from
    /// the image-side pixels.
    Warning,
}

/// A stable code identifying the type of report entry.
///
/// Codes can be used for filtering or programmatic handling; tests match on
/// them instead of message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryCode {
    // Extraction
    /// An annotation carried no usable geometry at all.
    MissingGeometry,
    /// An annotation's geometry was present but unparseable or non-finite.
    MalformedGeometry,

    // Config ingestion
    /// A transform name in the config is not recognized.
    UnknownTransform,
    /// A legacy parameter spelling was rewritten to its canonical form.
    AliasCanonicalized,
    /// `fill_center_crop` is planned; its centering offset is not applied
    /// to coordinates and labels may desync from pixels for that stage.
    FillCenterCropOffsetSkipped,

    // Transform engine
    /// A box collapsed to zero or negative area and was dropped.
    DegenerateBox,
    /// A polygon fell below three distinct valid vertices and was dropped.
    DegeneratePolygon,
    /// A box landed entirely outside a crop window and was dropped.
    CroppedOut,

    // Orchestration
    /// The whole image fell back to untransformed coordinates.
    PipelineFallback,
}

impl EntryCode {
    /// Returns true if this code means one annotation produced no output.
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            EntryCode::MissingGeometry
                | EntryCode::MalformedGeometry
                | EntryCode::DegenerateBox
                | EntryCode::DegeneratePolygon
                | EntryCode::CroppedOut
        )
    }
}

/// Where in an invocation a report entry occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryContext {
    /// The transform configuration.
    Config,
    /// A specific annotation, by input index.
    Annotation { index: usize },
    /// The image-level invocation as a whole.
    Image,
}

impl fmt::Display for EntryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryContext::Config => write!(f, "config"),
            EntryContext::Annotation { index } => write!(f, "annotation {}", index),
            EntryContext::Image => write!(f, "image"),
        }
    }
}
