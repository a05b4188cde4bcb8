use serde::Serialize;

use crate::catalog::Quantity;
use crate::input::{Readings, TimeOfDay};
use crate::model::ModelMode;
use crate::pipeline::stage1_features::ValueSource;
use crate::report::{ReportData, YIELD_UNIT};

#[derive(Debug, Serialize)]
struct PredictionJson<'a> {
    tool: ToolJson<'a>,
    model: ModelJson<'a>,
    readings: ReadingsJson,
    features: Vec<FeatureJson>,
    result: ResultJson,
}

#[derive(Debug, Serialize)]
struct ToolJson<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct ModelJson<'a> {
    mode: ModelMode,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ReadingsJson {
    time: Option<TimeOfDay>,
    sunlight: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    co2: Option<f64>,
    accumulated_sunlight: Option<f64>,
}

impl From<&Readings> for ReadingsJson {
    fn from(r: &Readings) -> Self {
        Self {
            time: r.time,
            sunlight: r.get(Quantity::Sunlight),
            temperature: r.get(Quantity::Temperature),
            humidity: r.get(Quantity::Humidity),
            co2: r.get(Quantity::Co2),
            accumulated_sunlight: r.get(Quantity::AccumulatedSunlight),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeatureJson {
    name: String,
    value: f64,
    source: ValueSource,
}

#[derive(Debug, Serialize)]
struct ResultJson {
    raw: f64,
    scaled: f64,
    unit: &'static str,
}

pub fn render_prediction_json(data: &ReportData<'_>) -> Result<String, serde_json::Error> {
    let prediction = data.prediction;
    let doc = PredictionJson {
        tool: ToolJson {
            name: &data.tool_name,
            version: &data.tool_version,
        },
        model: ModelJson {
            mode: prediction.mode,
            source: &data.model_source,
            warning: data.stub_reason.as_deref(),
        },
        readings: ReadingsJson::from(&prediction.readings),
        features: prediction
            .features
            .iter()
            .map(|(key, value, source)| FeatureJson {
                name: key.to_string(),
                value,
                source,
            })
            .collect(),
        result: ResultJson {
            raw: prediction.raw,
            scaled: prediction.scaled,
            unit: YIELD_UNIT,
        },
    };
    serde_json::to_string_pretty(&doc)
}
