use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};
use wp_redis_doctor_core::{
    Diagnostic, Error, PhpExtensionProbe, RedisConnector, Status, WpCli, WpCliHost,
};

pub async fn run(wp_cli: PathBuf, path: Option<PathBuf>, allow_root: bool) -> Result<()> {
    let mut cli = WpCli::new(wp_cli).with_allow_root(allow_root);
    if let Some(path) = path {
        cli = cli.with_path(path);
    }
    debug!("Using {:?}", cli);

    let diagnostic = Diagnostic::new(
        WpCliHost::new(cli.clone()),
        PhpExtensionProbe::new(cli),
        RedisConnector::new(),
    );

    let stdout = std::io::stdout();
    match diagnostic.run(stdout.lock()).await {
        Ok(report) => {
            info!(
                "Diagnostic finished: {} passed, {} warnings, {} failed",
                report.count(Status::Pass),
                report.count(Status::Warn),
                report.count(Status::Fail)
            );
            Ok(())
        }
        Err(Error::HostUnavailable) => {
            println!("{}", Error::HostUnavailable);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
