use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use emberloot_sim::{SimulationReport, WaveStat};
use std::io::Write;
use std::time::Duration;

fn survival_label(rate: f64) -> colored::ColoredString {
    let text = format!("{rate:.1}%");
    if rate >= 75.0 {
        text.green()
    } else if rate >= 40.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn hp_band(wave: &WaveStat) -> String {
    format!(
        "{:.1}% avg ({:.1}% - {:.1}%)",
        wave.avg_hp_pct, wave.min_hp_pct, wave.max_hp_pct
    )
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &SimulationReport,
    base_seed: Option<u64>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;
    writeln!(
        out,
        "Node: {} {} ({} / {})",
        report.chapter_id,
        report.node_id.bold(),
        report.chapter_name,
        report.node_name
    )?;
    writeln!(
        out,
        "Runs: {}/{} ({:.1}% completed)",
        report.actual_runs, report.iterations, report.completion_rate
    )?;
    if let Some(seed) = base_seed {
        writeln!(out, "Seed: {seed}")?;
    }
    writeln!(out, "Win rate: {}", survival_label(report.overall_win_rate))?;
    writeln!(out, "Average turns: {:.1}", report.avg_turns)?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    writeln!(out, "{}", "🌊 Waves".bright_yellow().bold())?;
    writeln!(out, "{}", "--------".yellow())?;
    for wave in &report.wave_stats {
        writeln!(
            out,
            "{:>2}. {:<16} reached {:>6}  survived {:>7}  hp {}  raw {:.1}",
            wave.wave_index + 1,
            wave.wave_label,
            wave.runs_reached,
            survival_label(wave.survival_rate),
            hp_band(wave),
            wave.avg_hp_raw
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    writeln!(
        out,
        "# Emberloot Simulation: {} {}\n",
        report.chapter_id, report.node_id
    )?;
    writeln!(
        out,
        "_Generated {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    writeln!(out, "## Summary\n")?;
    writeln!(
        out,
        "- **Node**: {} / {}",
        report.chapter_name, report.node_name
    )?;
    writeln!(
        out,
        "- **Runs**: {}/{}",
        report.actual_runs, report.iterations
    )?;
    writeln!(out, "- **Win rate**: {:.1}%", report.overall_win_rate)?;
    writeln!(out, "- **Average turns**: {:.1}", report.avg_turns)?;
    writeln!(out, "- **Completion rate**: {:.1}%\n", report.completion_rate)?;

    writeln!(out, "## Waves\n")?;
    writeln!(
        out,
        "| # | Wave | Reached | Survival | Avg HP | Min HP | Max HP | Avg HP (raw) |"
    )?;
    writeln!(out, "|---|------|---------|----------|--------|--------|--------|--------------|")?;
    for wave in &report.wave_stats {
        writeln!(
            out,
            "| {} | {} | {} | {:.1}% | {:.1}% | {:.1}% | {:.1}% | {:.1} |",
            wave.wave_index + 1,
            wave.wave_label,
            wave.runs_reached,
            wave.survival_rate,
            wave.avg_hp_pct,
            wave.min_hp_pct,
            wave.max_hp_pct,
            wave.avg_hp_raw
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationReport {
        SimulationReport {
            chapter_id: "ch1".to_string(),
            chapter_name: "Ashen Outskirts".to_string(),
            node_id: "1-1".to_string(),
            node_name: "Charred Road".to_string(),
            iterations: 10,
            actual_runs: 9,
            overall_win_rate: 55.5,
            avg_turns: 12.25,
            wave_stats: vec![WaveStat {
                wave_id: "1-1-w1".to_string(),
                wave_label: "Wave 1".to_string(),
                wave_index: 0,
                runs_reached: 9,
                survival_rate: 88.9,
                avg_hp_pct: 61.0,
                min_hp_pct: 0.0,
                max_hp_pct: 92.5,
                avg_hp_raw: 61.0,
            }],
            completion_rate: 90.0,
        }
    }

    #[test]
    fn markdown_has_a_wave_table() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# Emberloot Simulation: ch1 1-1"));
        assert!(text.contains("| 1 | Wave 1 | 9 | 88.9% |"));
        assert!(text.contains("- **Runs**: 9/10"));
    }

    #[test]
    fn json_is_camel_case() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["actualRuns"], 9);
        assert_eq!(value["waveStats"][0]["waveLabel"], "Wave 1");
    }

    #[test]
    fn console_lists_every_wave() {
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &sample(), Some(7), Duration::from_millis(3)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Runs: 9/10"));
        assert!(text.contains("Seed: 7"));
        assert!(text.contains("Wave 1"));
    }
}
