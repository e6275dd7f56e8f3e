//! Run the checklist

use super::Session;
use clap::Args;
use secreview_core::{OutputFormat, OutputHandler};
use secreview_engine::{JsonOutputHandler, TextOutputHandler};

#[derive(Args)]
pub struct RunArgs {
    /// Only run checks in this namespace
    #[arg(short, long)]
    namespace: Option<String>,

    /// Leave passed checks out of the text report
    #[arg(long)]
    failures_only: bool,
}

pub fn run(session: &Session, args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = session.checklist.run_audit(args.namespace.as_deref());

    let handler: Box<dyn OutputHandler> = match format {
        OutputFormat::Text => {
            Box::new(TextOutputHandler::new(std::io::stdout()).with_passed(!args.failures_only))
        }
        OutputFormat::Json => Box::new(JsonOutputHandler::new(std::io::stdout())),
        OutputFormat::JsonPretty => {
            Box::new(JsonOutputHandler::new(std::io::stdout()).pretty(true))
        }
    };
    handler.handle(&report)?;

    // Exit with error code if any check failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
