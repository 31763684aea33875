use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use voxmeter_types::TurnRecord;

/// Print the latency table, bolding the banner line when color is allowed
/// and stdout is a terminal.
pub fn print_report(report: &str, color: bool) {
    let colorize = color && std::io::stdout().is_terminal();

    for line in report.lines() {
        if colorize && line.starts_with("=== ") {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
}

/// One-line summary printed the moment a turn closes in watch mode.
pub fn format_turn_line(turn: &TurnRecord) -> String {
    let mut parts = Vec::new();

    if let Some(v) = turn.stt_ttfb {
        parts.push(format!("stt {:.3}s", v));
    }
    if let Some(v) = turn.turn_detector_ms {
        parts.push(format!("turn-det {:.0}ms", v));
    }
    if let Some(v) = turn.llm_ttfb {
        parts.push(format!("llm {:.3}s", v));
    }
    if let Some(v) = turn.tts_ttfb {
        parts.push(format!("tts {:.3}s", v));
    }

    let total = turn
        .total_wall_clock
        .map(|v| format!("{:.3}s", v))
        .unwrap_or_else(|| "-".to_string());

    if parts.is_empty() {
        format!("turn {}: total {}", turn.turn_number, total)
    } else {
        format!(
            "turn {}: total {} ({})",
            turn.turn_number,
            total,
            parts.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_line_with_breakdown() {
        let mut turn = TurnRecord::new(2);
        turn.total_wall_clock = Some(1.6);
        turn.stt_ttfb = Some(0.3);
        turn.llm_ttfb = Some(0.8);

        let line = format_turn_line(&turn);
        assert_eq!(line, "turn 2: total 1.600s (stt 0.300s, llm 0.800s)");
    }

    #[test]
    fn test_turn_line_without_samples() {
        let mut turn = TurnRecord::new(1);
        turn.total_wall_clock = Some(0.9);

        assert_eq!(format_turn_line(&turn), "turn 1: total 0.900s");
    }
}
