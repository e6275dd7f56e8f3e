//! List registered checks

use super::Session;
use clap::Args;
use secreview_core::OutputFormat;
use secreview_engine::Checklist;

#[derive(Args)]
pub struct ListArgs {
    /// Only list checks in this namespace
    #[arg(short, long)]
    namespace: Option<String>,
}

pub fn run(session: &Session, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let checks = session.checklist.list_checks(args.namespace.as_deref());
    let groups = Checklist::group_by_namespace(&checks);

    match format {
        OutputFormat::Text => {
            for (namespace, checks) in &groups {
                println!("{}", namespace);
                for check in checks {
                    println!("  - {} ({})", check.title(), check.machine_title());
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value: serde_json::Map<String, serde_json::Value> = groups
                .iter()
                .map(|(namespace, checks)| {
                    let titles = checks.iter().map(|c| c.title().into()).collect();
                    (namespace.clone(), serde_json::Value::Array(titles))
                })
                .collect();
            let json = if format == OutputFormat::JsonPretty {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            println!("{}", json);
        }
    }

    Ok(())
}
