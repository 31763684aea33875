use voxmeter_types::TurnRecord;

const HEADER: &str =
    "Turn | Total  | STT TTFB | Turn Det | LLM TTFB | TTS TTFB | LLM Tokens | TTS Chars";
const SEPARATOR: &str =
    "-----+--------+----------+----------+----------+----------+------------+----------";

/// Render the per-turn latency table plus a trailing averages row.
///
/// Returns `None` for an empty ledger: a session with no completed turn
/// produces no output, not an error. Never mutates its input.
pub fn render_report(turns: &[TurnRecord]) -> Option<String> {
    if turns.is_empty() {
        return None;
    }

    let plural = if turns.len() == 1 { "" } else { "s" };
    let mut lines = vec![
        String::new(),
        format!("=== LATENCY BREAKDOWN ({} turn{}) ===", turns.len(), plural),
        HEADER.to_string(),
        SEPARATOR.to_string(),
    ];

    for turn in turns {
        lines.push(format!(
            " {:>3} | {:>6} | {:>8} | {:>8} | {:>8} | {:>8} | {:>10} | {:>8}",
            turn.turn_number,
            fmt_s(turn.total_wall_clock),
            fmt_s(turn.stt_ttfb),
            fmt_ms(turn.turn_detector_ms),
            fmt_s(turn.llm_ttfb),
            fmt_s(turn.tts_ttfb),
            fmt_tokens(turn.llm_prompt_tokens, turn.llm_completion_tokens),
            fmt_count(turn.tts_characters),
        ));
    }

    lines.push(SEPARATOR.to_string());

    // Averages over turns where the field is present; absent values are
    // excluded from both numerator and denominator. Token and character
    // columns stay blank: a single-number average is not meaningful there.
    lines.push(format!(
        " {:>3} | {:>6} | {:>8} | {:>8} | {:>8} | {:>8} | {:>10} | {:>8}",
        "Avg",
        fmt_s(avg(turns.iter().map(|t| t.total_wall_clock))),
        fmt_s(avg(turns.iter().map(|t| t.stt_ttfb))),
        fmt_ms(avg(turns.iter().map(|t| t.turn_detector_ms))),
        fmt_s(avg(turns.iter().map(|t| t.llm_ttfb))),
        fmt_s(avg(turns.iter().map(|t| t.tts_ttfb))),
        "",
        "",
    ));

    Some(lines.join("\n"))
}

fn avg(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

fn fmt_s(val: Option<f64>) -> String {
    match val {
        Some(v) => format!("{:.3}s", v),
        None => "-".to_string(),
    }
}

fn fmt_ms(val: Option<f64>) -> String {
    match val {
        Some(v) => format!("{:.0}ms", v),
        None => "-".to_string(),
    }
}

fn fmt_tokens(prompt: Option<u64>, completion: Option<u64>) -> String {
    match (prompt, completion) {
        (Some(p), Some(c)) => format!("{}/{}", p, c),
        _ => "-".to_string(),
    }
}

fn fmt_count(val: Option<u64>) -> String {
    match val {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: u32) -> TurnRecord {
        TurnRecord::new(n)
    }

    #[test]
    fn test_empty_ledger_renders_nothing() {
        assert_eq!(render_report(&[]), None);
    }

    #[test]
    fn test_single_turn_table() {
        let mut t = turn(1);
        t.total_wall_clock = Some(1.6);
        t.stt_ttfb = Some(0.3);
        t.turn_detector_ms = Some(412.0);
        t.llm_ttfb = Some(0.8);
        t.tts_ttfb = Some(0.2);
        t.llm_prompt_tokens = Some(812);
        t.llm_completion_tokens = Some(64);
        t.tts_characters = Some(87);

        let report = render_report(&[t]).unwrap();
        assert!(report.contains("=== LATENCY BREAKDOWN (1 turn) ==="));
        assert!(report.contains("1.600s"));
        assert!(report.contains("0.300s"));
        assert!(report.contains("412ms"));
        assert!(report.contains("812/64"));
        assert!(report.contains("87"));
    }

    #[test]
    fn test_absent_fields_render_placeholder() {
        let mut t = turn(1);
        t.total_wall_clock = Some(2.0);

        let report = render_report(&[t]).unwrap();
        let row = report
            .lines()
            .find(|l| l.trim_start().starts_with('1'))
            .unwrap();
        assert!(row.contains('-'));
        assert!(row.contains("2.000s"));
    }

    #[test]
    fn test_averages_exclude_absent_values() {
        let mut a = turn(1);
        a.total_wall_clock = Some(1.0);
        a.stt_ttfb = Some(0.2);
        let mut b = turn(2);
        b.total_wall_clock = Some(3.0);
        // b has no stt sample: the average must stay 0.200, not halve.

        let report = render_report(&[a, b]).unwrap();
        let avg_row = report.lines().find(|l| l.contains("Avg")).unwrap();
        assert!(avg_row.contains("2.000s"));
        assert!(avg_row.contains("0.200s"));
    }

    #[test]
    fn test_plural_header() {
        let mut a = turn(1);
        a.total_wall_clock = Some(1.0);
        let mut b = turn(2);
        b.total_wall_clock = Some(2.0);

        let report = render_report(&[a, b]).unwrap();
        assert!(report.contains("(2 turns)"));
    }

    #[test]
    fn test_token_average_column_is_blank() {
        let mut t = turn(1);
        t.llm_prompt_tokens = Some(100);
        t.llm_completion_tokens = Some(50);
        t.total_wall_clock = Some(1.0);

        let report = render_report(&[t]).unwrap();
        let avg_row = report.lines().find(|l| l.contains("Avg")).unwrap();
        assert!(!avg_row.contains("100/50"));
    }
}
