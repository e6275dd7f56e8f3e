//! Explain a check

use super::{CheckArgs, Session};
use secreview_core::OutputFormat;

pub fn run(session: &Session, args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let check = session.check(&args)?;
    let help = check.help();

    match format {
        OutputFormat::Text => {
            println!("{}\n{}", help.title, "=".repeat(help.title.len()));
            for paragraph in &help.paragraphs {
                println!("\n{}", paragraph);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&help)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&help)?),
    }

    Ok(())
}
