use anyhow::Result;
use std::io::Write;
use std::path::Path;
use voxmeter_engine::correlate;
use voxmeter_runtime::read_events;
use voxmeter_types::TurnRecord;

use crate::types::ExportFormat;

pub fn run(log: &Path, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let ingest = read_events(log)?;
    let turns = correlate(&ingest.events);

    let rendered = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&turns)? + "\n",
        ExportFormat::Csv => to_csv(&turns)?,
    };

    match output {
        Some(path) => std::fs::write(path, rendered)?,
        None => std::io::stdout().write_all(rendered.as_bytes())?,
    }

    Ok(())
}

fn to_csv(turns: &[TurnRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "turn_number",
        "total_wall_clock",
        "stt_ttfb",
        "turn_detector_ms",
        "llm_ttfb",
        "tts_ttfb",
        "llm_prompt_tokens",
        "llm_completion_tokens",
        "tts_characters",
    ])?;

    for turn in turns {
        writer.write_record([
            turn.turn_number.to_string(),
            opt_float(turn.total_wall_clock),
            opt_float(turn.stt_ttfb),
            opt_float(turn.turn_detector_ms),
            opt_float(turn.llm_ttfb),
            opt_float(turn.tts_ttfb),
            opt_count(turn.llm_prompt_tokens),
            opt_count(turn.llm_completion_tokens),
            opt_count(turn.tts_characters),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

fn opt_float(val: Option<f64>) -> String {
    val.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_count(val: Option<u64>) -> String {
    val.map(|v| v.to_string()).unwrap_or_default()
}
