//! Rendering of computed trips.
//!
//! Three formats are supported: a human-readable text report, a JSON document
//! with per-component emissions, and a GeoJSON `FeatureCollection` of the
//! leg geometries for map display.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use tripcarbon_lib::{StepData, TripOutcome, TripResult};

use crate::terminal::{format_kg, format_km, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Geojson,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    trips: Vec<JsonTrip<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonTrip<'a> {
    name: &'a str,
    total_kg_co2_eq: f64,
    total_length_km: f64,
    steps: &'a [StepData],
}

impl<'a> From<&'a TripResult> for JsonTrip<'a> {
    fn from(trip: &'a TripResult) -> Self {
        Self {
            name: &trip.name,
            total_kg_co2_eq: trip.total_kg_co2_eq(),
            total_length_km: trip.total_length_km(),
            steps: &trip.steps,
        }
    }
}

/// Write `outcome` to `out` in the requested format.
pub fn render<W: Write>(
    out: &mut W,
    outcome: &TripOutcome,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(out, outcome, palette),
        OutputFormat::Json => {
            let report = JsonReport {
                trips: outcome.trips.iter().map(JsonTrip::from).collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)
        }
        OutputFormat::Geojson => {
            serde_json::to_writer_pretty(&mut *out, &outcome.to_feature_collection())?;
            writeln!(out)
        }
    }
}

/// Text report: one block per trip, the lowest total highlighted.
pub fn render_text<W: Write>(
    out: &mut W,
    outcome: &TripOutcome,
    palette: &ColorPalette,
) -> io::Result<()> {
    let lowest = outcome
        .trips
        .iter()
        .map(TripResult::total_kg_co2_eq)
        .fold(f64::INFINITY, f64::min);

    for (idx, trip) in outcome.trips.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        let total = trip.total_kg_co2_eq();
        let total_color = if outcome.trips.len() > 1 && total <= lowest {
            palette.green
        } else {
            palette.orange
        };
        writeln!(
            out,
            "{bold}{name}{reset}: {color}{total}{reset} {gray}over {length}{reset}",
            bold = palette.white_bold,
            name = trip.name,
            reset = palette.reset,
            color = total_color,
            total = format_kg(total),
            gray = palette.gray,
            length = format_km(trip.total_length_km()),
        )?;

        for (leg, step) in trip.steps.iter().enumerate() {
            render_step(out, leg + 1, step, palette)?;
        }
    }
    Ok(())
}

fn render_step<W: Write>(
    out: &mut W,
    leg: usize,
    step: &StepData,
    palette: &ColorPalette,
) -> io::Result<()> {
    writeln!(
        out,
        "  {leg}. {cyan}{mode}{reset} {gray}{length}{reset} {total}",
        cyan = palette.cyan,
        mode = step.transport_means,
        reset = palette.reset,
        gray = palette.gray,
        length = format_km(step.path_length),
        total = format_kg(step.total_kg_co2_eq()),
    )?;
    for component in &step.emissions {
        writeln!(
            out,
            "       {:<24} {}",
            component.name,
            format_kg(component.kg_co2_eq)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tripcarbon_lib::{EmissionComponent, TransportMode};

    use super::*;

    fn outcome() -> TripOutcome {
        let step = |mode, kg: f64| StepData {
            transport_means: mode,
            emissions: vec![EmissionComponent::new("Fuel", kg, 0.1, "#000000")],
            path_length: 100.0,
        };
        TripOutcome {
            trips: vec![
                TripResult {
                    name: "MAIN_TRIP".to_string(),
                    steps: vec![step(TransportMode::Car, 19.2)],
                },
                TripResult {
                    name: "DIRECT_TRAIN".to_string(),
                    steps: vec![step(TransportMode::Train, 1.2)],
                },
            ],
            geometries: Vec::new(),
        }
    }

    #[test]
    fn text_report_lists_trips_and_components() {
        let mut buf = Vec::new();
        render(&mut buf, &outcome(), OutputFormat::Text, &ColorPalette::plain()).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("MAIN_TRIP: 19.2 kgCO2e over 100 km"));
        assert!(text.contains("  1. Train 100 km 1.2 kgCO2e"));
        assert!(text.contains("Fuel"));
    }

    #[test]
    fn json_report_carries_totals() {
        let mut buf = Vec::new();
        render(&mut buf, &outcome(), OutputFormat::Json, &ColorPalette::plain()).expect("render");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["trips"][0]["name"], "MAIN_TRIP");
        assert_eq!(value["trips"][1]["total_kg_co2_eq"], 1.2);
        assert_eq!(value["trips"][0]["steps"][0]["transport_means"], "Car");
    }
}
