//! The diagnostic runner.
//!
//! A run verifies the host precondition, resolves the installation layout,
//! queries the runtime once and then executes the five checks strictly in
//! order. A check never aborts the run: anything that goes wrong inside it
//! becomes a finding. Only the host precondition and failures to write the
//! output are returned as errors.

use std::io::Write;
use tracing::{debug, warn};

use crate::cache::CacheConnector;
use crate::config::Settings;
use crate::host::{Host, HostLayout};
use crate::probe::{CapabilityProbe, CapabilitySnapshot};
use crate::report::{CheckKind, CheckReport, DiagnosticReport, Finding, Reporter};
use crate::{Error, Result};

mod configuration;
mod connectivity;
mod dropin;
mod extensions;
mod plugin;

/// Everything a check may consult
pub(crate) struct Context<'a> {
    pub host: &'a dyn Host,
    pub connector: &'a dyn CacheConnector,
    pub layout: &'a HostLayout,
    pub capabilities: &'a CapabilitySnapshot,
    /// Why `capabilities` could not be queried, if it could not
    pub capability_error: Option<&'a str>,
    pub settings: &'a Settings,
}

/// Output of the check currently running: written immediately, kept for the report
pub(crate) struct Section<'a, W: Write> {
    reporter: &'a mut Reporter<W>,
    report: CheckReport,
}

impl<'a, W: Write> Section<'a, W> {
    fn new(kind: CheckKind, reporter: &'a mut Reporter<W>) -> Self {
        Self {
            reporter,
            report: CheckReport::new(kind),
        }
    }

    pub fn emit(&mut self, finding: Finding) -> Result<()> {
        self.reporter.finding(&finding)?;
        self.report.findings.push(finding);
        Ok(())
    }

    /// Progress line attached to the latest finding
    pub fn note(&mut self, text: &str) -> Result<()> {
        self.reporter.note(text)?;
        if let Some(last) = self.report.findings.last_mut() {
            last.details.push(text.to_string());
        }
        Ok(())
    }

    fn finish(self) -> CheckReport {
        self.report
    }
}

/// Runs the Redis object-cache diagnostic against one WordPress host
pub struct Diagnostic<H, P, C> {
    host: H,
    probe: P,
    connector: C,
    settings: Settings,
}

impl<H, P, C> Diagnostic<H, P, C>
where
    H: Host,
    P: CapabilityProbe,
    C: CacheConnector,
{
    pub fn new(host: H, probe: P, connector: C) -> Self {
        Self {
            host,
            probe,
            connector,
            settings: Settings::default(),
        }
    }

    /// Execute the run, streaming text to `out`.
    ///
    /// Returns [`Error::HostUnavailable`] without writing anything when no
    /// WordPress host is reachable.
    pub async fn run<W: Write>(&self, out: W) -> Result<DiagnosticReport> {
        if !self.host.has_capability().await {
            return Err(Error::HostUnavailable);
        }

        let layout = HostLayout::resolve(&self.host).await?;

        let mut reporter = Reporter::new(out);
        reporter.banner()?;

        let (capabilities, capability_error) = match self.probe.probe().await {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                warn!("Could not query PHP extensions: {}", e);
                (CapabilitySnapshot::default(), Some(e.to_string()))
            }
        };

        let ctx = Context {
            host: &self.host,
            connector: &self.connector,
            layout: &layout,
            capabilities: &capabilities,
            capability_error: capability_error.as_deref(),
            settings: &self.settings,
        };

        let mut report = DiagnosticReport::default();
        for kind in CheckKind::ALL {
            debug!("Running check {:?}", kind);
            reporter.heading(kind)?;

            let mut section = Section::new(kind, &mut reporter);
            match kind {
                CheckKind::Extensions => extensions::run(&ctx, &mut section)?,
                CheckKind::Plugin => plugin::run(&ctx, &mut section).await?,
                CheckKind::DropIn => dropin::run(&ctx, &mut section).await?,
                CheckKind::Connectivity => connectivity::run(&ctx, &mut section).await?,
                CheckKind::Configuration => configuration::run(&ctx, &mut section).await?,
            }
            report.checks.push(section.finish());
        }

        reporter.closing()?;
        Ok(report)
    }
}

/// `file_exists` semantics: anything that can be stat'ed
pub(crate) async fn path_exists(path: &std::path::Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}
