use crate::catalog::Quantity;
use crate::input::Readings;
use crate::report::{ReportData, format_reading, format_yield};

pub const STUB_NOTE: &str =
    "Note: this result is provisional. Provide a trained model file for an actual estimate.";
pub const ACCURACY_CAVEAT: &str =
    "Caveat: the model was trained on limited data and its accuracy is limited.";

/// Human-readable echo of everything collected so far, one line per input.
pub fn render_input_echo(readings: &Readings) -> String {
    let mut out = String::new();
    let time = readings
        .time
        .map(|t| t.to_string())
        .unwrap_or_else(|| "not entered".to_string());
    out.push_str(&format!("Current time: {}\n", time));
    for quantity in Quantity::ALL {
        out.push_str(&format!(
            "{}: {}\n",
            quantity.label(),
            format_reading(readings.get(quantity), quantity.unit())
        ));
    }
    out
}

/// The single result line shown to the user; stub results are always labelled.
pub fn render_result_line(data: &ReportData<'_>) -> String {
    if data.is_stub() {
        format!("Stub model prediction: {}", format_yield(data.prediction.scaled))
    } else {
        format!("Predicted total yield: {}", format_yield(data.prediction.scaled))
    }
}

pub fn render_report_text(data: &ReportData<'_>) -> String {
    let mut out = String::new();

    out.push_str("Cucumber Total Yield Estimate\n");
    out.push_str("=============================\n\n");

    out.push_str("1. Inputs\n");
    out.push_str(&render_input_echo(&data.prediction.readings));
    out.push('\n');

    out.push_str("2. Model\n");
    out.push_str(&format!("Model mode: {}\n", data.prediction.mode.as_str()));
    out.push_str(&format!("Model source: {}\n", data.model_source));
    out.push('\n');

    out.push_str("3. Result\n");
    out.push_str(&render_result_line(data));
    out.push('\n');
    if data.is_stub() {
        out.push_str(STUB_NOTE);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(ACCURACY_CAVEAT);
    out.push('\n');

    out
}
