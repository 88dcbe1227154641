//! Check results and their plain-text rendering.

use std::fmt;
use std::io::Write;

use crate::Result;

const RULE: &str = "======================================";

/// Closing advice, printed after every run
pub const RECOMMENDATIONS: [&str; 5] = [
    "If Redis connection fails, check firewall settings",
    "Verify Redis server is running with: docker-compose ps",
    "If drop-in installation failed, try manually copying from plugin stubs",
    "To temporarily disable Redis cache, add: define('WP_REDIS_DISABLED', true);",
    "Run: wp cache flush to clear cache after fixing connection issues",
];

/// Outcome of a single finding, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    fn icon(&self) -> &'static str {
        match self {
            Status::Pass => "✅",
            Status::Warn => "⚠️",
            Status::Fail => "❌",
        }
    }
}

/// One reported line plus its indented details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub status: Status,
    pub message: String,
    pub details: Vec<String>,
}

impl Finding {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Status::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Status::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.status.icon(), self.message)?;
        for detail in &self.details {
            writeln!(f, "   {}", detail)?;
        }
        Ok(())
    }
}

/// The five checks, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Extensions,
    Plugin,
    DropIn,
    Connectivity,
    Configuration,
}

impl CheckKind {
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Extensions,
        CheckKind::Plugin,
        CheckKind::DropIn,
        CheckKind::Connectivity,
        CheckKind::Configuration,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            CheckKind::Extensions => "Checking PHP Redis extensions...",
            CheckKind::Plugin => "Checking Object Cache Pro installation...",
            CheckKind::DropIn => "Checking object-cache.php drop-in...",
            CheckKind::Connectivity => "Testing Redis connection...",
            CheckKind::Configuration => "Checking WP_REDIS configuration...",
        }
    }
}

/// Findings of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub kind: CheckKind,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            findings: Vec::new(),
        }
    }

    /// Worst status among the findings, `None` when nothing was reported
    pub fn outcome(&self) -> Option<Status> {
        self.findings.iter().map(|f| f.status).max()
    }

    pub fn has(&self, status: Status) -> bool {
        self.findings.iter().any(|f| f.status == status)
    }
}

/// Everything a run observed, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub checks: Vec<CheckReport>,
}

impl DiagnosticReport {
    pub fn check(&self, kind: CheckKind) -> Option<&CheckReport> {
        self.checks.iter().find(|c| c.kind == kind)
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.checks.iter().flat_map(|c| c.findings.iter())
    }

    pub fn count(&self, status: Status) -> usize {
        self.findings().filter(|f| f.status == status).count()
    }
}

/// Streams a run to a writer as it happens
pub struct Reporter<W: Write> {
    out: W,
    sections: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, sections: 0 }
    }

    pub fn banner(&mut self) -> Result<()> {
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out, "WordPress Redis Connection Diagnostic")?;
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn heading(&mut self, kind: CheckKind) -> Result<()> {
        if self.sections > 0 {
            writeln!(self.out)?;
        }
        self.sections += 1;
        writeln!(self.out, "{}", kind.heading())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn finding(&mut self, finding: &Finding) -> Result<()> {
        write!(self.out, "{}", finding)?;
        self.out.flush()?;
        Ok(())
    }

    /// Progress note without a status (e.g. "Activating plugin...")
    pub fn note(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "   {}", text)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn closing(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out, "Diagnostic Complete")?;
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out)?;
        writeln!(self.out, "Recommendations:")?;
        for (i, line) in RECOMMENDATIONS.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, line)?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
