use std::io::{self, BufRead, Write};

use crate::catalog::FeatureCatalog;
use crate::input::{TimeOfDay, parse_number};
use crate::model::Regressor;
use crate::report::ReportData;
use crate::report::text::{ACCURACY_CAVEAT, STUB_NOTE, render_input_echo, render_result_line};
use crate::wizard::{StepField, StepValue, WizardSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Back,
    Predict,
    Value,
}

fn classify(line: &str, at_final: bool) -> Command {
    match line {
        "q" | "quit" => Command::Quit,
        "b" | "back" => Command::Back,
        "p" | "predict" if at_final => Command::Predict,
        _ => Command::Value,
    }
}

/// Summary of an interactive session once it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub predictions: usize,
    pub failed_predictions: usize,
}

/// Drives `session` from line-based input until the user quits or input ends.
/// Prediction failures are printed and never end the session.
pub fn run_wizard<R: BufRead, W: Write>(
    session: &mut WizardSession,
    catalog: &FeatureCatalog,
    regressor: &Regressor,
    mut input: R,
    out: &mut W,
) -> io::Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    let mut line = String::new();

    if let Regressor::Stub { reason, .. } = regressor {
        writeln!(out, "Warning: {}. Using a stub model; results are placeholders.", reason)?;
    }

    loop {
        render_step(session, out)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let entry = line.trim();

        match classify(entry, session.is_final()) {
            Command::Quit => break,
            Command::Back => {
                if let Err(e) = session.retreat() {
                    writeln!(out, "! {}", e)?;
                }
            }
            Command::Predict => match session.predict(catalog, regressor) {
                Ok(prediction) => {
                    summary.predictions += 1;
                    let data = ReportData::new(&prediction, regressor);
                    writeln!(out, "{}", render_result_line(&data))?;
                    if data.is_stub() {
                        writeln!(out, "{}", STUB_NOTE)?;
                    }
                    writeln!(out, "{}", ACCURACY_CAVEAT)?;
                }
                Err(e) => {
                    summary.failed_predictions += 1;
                    tracing::warn!(error = %e, "prediction failed");
                    writeln!(out, "Prediction failed: {}", e)?;
                }
            },
            Command::Value => {
                if session.is_final() {
                    if !entry.is_empty() {
                        writeln!(out, "! unknown command {:?}; use 'p', 'b' or 'q'", entry)?;
                    }
                    continue;
                }
                match parse_step_value(session, entry) {
                    Ok(value) => {
                        if let Err(e) = session.advance(value) {
                            writeln!(out, "! {}", e)?;
                        }
                    }
                    Err(msg) => writeln!(out, "! {}", msg)?,
                }
            }
        }
    }

    Ok(summary)
}

fn render_step<W: Write>(session: &WizardSession, out: &mut W) -> io::Result<()> {
    let step = session.step();
    writeln!(out)?;
    writeln!(out, "[{}]", session.progress_label())?;
    writeln!(out, "== {} ==", step.title())?;
    match step.field() {
        Some(StepField::Time) => {
            let current = session.readings().time.unwrap_or_default();
            writeln!(
                out,
                "Enter the current time in 5-minute steps (HH:MM). Empty keeps {}.",
                current
            )?;
            writeln!(out, "'b' goes back, 'q' quits.")?;
        }
        Some(StepField::Reading(q)) => {
            let current = match session.readings().get(q) {
                Some(v) => v.to_string(),
                None => "not entered".to_string(),
            };
            writeln!(
                out,
                "Enter the current {} ({}). Empty keeps [{}], '-' clears.",
                q.label().to_lowercase(),
                q.unit(),
                current
            )?;
            writeln!(out, "'b' goes back, 'q' quits.")?;
        }
        None => {
            writeln!(out, "All inputs are complete. Review them and request a prediction.")?;
            write!(out, "{}", render_input_echo(session.readings()))?;
            writeln!(out, "'p' predicts, 'b' goes back, 'q' quits.")?;
        }
    }
    write!(out, "> ")
}

fn parse_step_value(session: &WizardSession, entry: &str) -> Result<StepValue, String> {
    match session.step().field() {
        Some(StepField::Time) => {
            if entry.is_empty() {
                return Ok(session
                    .committed()
                    .unwrap_or(StepValue::Time(TimeOfDay::default())));
            }
            entry
                .parse::<TimeOfDay>()
                .map(StepValue::Time)
                .map_err(|e| e.to_string())
        }
        Some(StepField::Reading(_)) => {
            if entry.is_empty() {
                return Ok(session.committed().unwrap_or(StepValue::Reading(None)));
            }
            if entry == "-" {
                return Ok(StepValue::Reading(None));
            }
            parse_number(entry)
                .map(|v| StepValue::Reading(Some(v)))
                .map_err(|e| e.to_string())
        }
        None => Err("no value expected at the final step".to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/wizard/prompt.rs"]
mod tests;
