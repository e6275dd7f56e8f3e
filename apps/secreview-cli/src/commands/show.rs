//! Show the last stored result of a check

use super::{CheckArgs, Session};
use secreview_core::{Evaluation, OutputFormat};

pub fn run(session: &Session, args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let check = session.check(&args)?;

    let Some(last) = check.last_result()? else {
        println!("{} has not been run yet.", check.key());
        return Ok(());
    };

    let result = &last.result;
    let evaluation = check.evaluate(result);

    match format {
        OutputFormat::Text => {
            println!("{}", check.key());
            println!("Status: {} ({})", result.status, last.stored_at.to_rfc3339());
            println!("{}", check.message(result.status));

            if let Some(fault) = &result.fault {
                println!("Fault: {}", fault);
            }
            print!("{}", render_evaluation(&evaluation));

            let plain = check.evaluate_plain(result);
            if !plain.is_empty() {
                println!("\n{}", plain);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::json!({
                "check": result.check,
                "status": result.status,
                "stored_at": last.stored_at,
                "message": check.message(result.status),
                "findings": result.findings,
                "fault": result.fault,
                "evaluation": evaluation,
            });
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

/// Text form of an evaluation.
///
/// A paragraph that repeats a link's label is printed as that link.
fn render_evaluation(evaluation: &Evaluation) -> String {
    let mut output = String::new();
    let mut linked = vec![false; evaluation.links.len()];

    for paragraph in &evaluation.paragraphs {
        let link = evaluation
            .links
            .iter()
            .enumerate()
            .find(|(i, link)| !linked[*i] && link.label == *paragraph);

        match link {
            Some((i, link)) => {
                linked[i] = true;
                output.push_str(&format!("\n{} [{}]\n", link.label, link.target));
            }
            None => output.push_str(&format!("\n{}\n", paragraph)),
        }
    }
    for item in &evaluation.items {
        output.push_str(&format!("  - {}\n", item));
    }
    for (link, _) in evaluation.links.iter().zip(&linked).filter(|(_, done)| !**done) {
        output.push_str(&format!("  -> {} [{}]\n", link.label, link.target));
    }

    output
}
