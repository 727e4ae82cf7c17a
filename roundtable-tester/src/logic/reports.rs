use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

/// Wins per table size across every scenario result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableBalance {
    pub games: usize,
    pub good_wins: usize,
    pub evil_wins: usize,
}

impl TableBalance {
    #[must_use]
    pub fn good_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.good_wins as f64 / self.games as f64;
        rate * 100.0
    }
}

#[must_use]
pub fn table_balance(results: &[ScenarioResult]) -> BTreeMap<usize, TableBalance> {
    let mut balance: BTreeMap<usize, TableBalance> = BTreeMap::new();
    for result in results {
        let entry = balance.entry(result.players).or_default();
        entry.games += result.good_wins + result.evil_wins;
        entry.good_wins += result.good_wins;
        entry.evil_wins += result.evil_wins;
    }
    balance
}

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let passed = results.iter().filter(|r| r.passed).count();
    if results.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = passed as f64 / results.len() as f64;
    rate * 100.0
}

/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Logic Test Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(writer, "Total scenarios: {total_tests}")?;
    writeln!(writer, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(writer, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            writer,
            "{} {} ({} players, seed {}, {})",
            status,
            result.scenario_name.bold(),
            result.players,
            result.seed,
            result.strategy
        )?;
        writeln!(
            writer,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            writer,
            "   Wins: good {} / evil {}",
            result.good_wins, result.evil_wins
        )?;
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "   Failures:")?;
            for failure in &result.failures {
                writeln!(writer, "     • {}", failure.red())?;
            }
        }
        writeln!(writer)?;
    }

    let balance = table_balance(results);
    if !balance.is_empty() {
        writeln!(writer, "{}", "⚖️  Table Balance".bright_magenta().bold())?;
        writeln!(writer, "{}", "================".magenta())?;
        for (players, entry) in &balance {
            writeln!(
                writer,
                "{players:>2} players: {} games, good {} ({:.1}%), evil {}",
                entry.games,
                entry.good_wins,
                entry.good_rate(),
                entry.evil_wins
            )?;
        }
        writeln!(writer)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(writer, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            writer,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error when serialization or the writer fails.
pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

/// # Errors
///
/// Returns an error when the writer fails.
pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[ScenarioResult],
) -> Result<()> {
    writeln!(writer, "# Roundtable Logic Test Results\n")?;
    writeln!(
        writer,
        "_Generated {}_\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total scenarios**: {total_tests}")?;
    writeln!(writer, "- **Passed**: {passed_tests}")?;
    writeln!(writer, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(writer, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    let balance = table_balance(results);
    if !balance.is_empty() {
        writeln!(writer, "## Table Balance\n")?;
        writeln!(writer, "| Players | Games | Good wins | Evil wins | Good % |")?;
        writeln!(writer, "|---|---|---|---|---|")?;
        for (players, entry) in &balance {
            writeln!(
                writer,
                "| {players} | {} | {} | {} | {:.1} |",
                entry.games,
                entry.good_wins,
                entry.evil_wins,
                entry.good_rate()
            )?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };

        writeln!(
            writer,
            "### {} {} ({} players, seed {})\n",
            status, result.scenario_name, result.players, result.seed
        )?;
        writeln!(writer, "- **Strategy**: {}", result.strategy)?;
        writeln!(
            writer,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            writer,
            "- **Wins**: good {} / evil {}",
            result.good_wins, result.evil_wins
        )?;
        writeln!(writer, "- **Average time**: {:?}", result.average_duration)?;

        if !result.failures.is_empty() {
            writeln!(writer, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(writer, "  - {failure}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(players: usize, good: usize, evil: usize, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "Smoke".to_string(),
            strategy: "Random".to_string(),
            players,
            seed: 7,
            passed,
            iterations_run: good + evil,
            successful_iterations: if passed { good + evil } else { 0 },
            good_wins: good,
            evil_wins: evil,
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 1 broke".to_string()]
            },
            average_duration: Duration::from_micros(40),
            performance_data: vec![Duration::from_micros(40)],
        }
    }

    #[test]
    fn balance_groups_by_table_size() {
        let results = vec![result(5, 2, 1, true), result(5, 0, 3, true), result(8, 1, 1, true)];
        let balance = table_balance(&results);
        assert_eq!(
            balance[&5],
            TableBalance {
                games: 6,
                good_wins: 2,
                evil_wins: 4
            }
        );
        assert!((balance[&8].good_rate() - 50.0).abs() < f64::EPSILON);
        assert!(TableBalance::default().good_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn console_report_lists_failures_and_balance() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(
            &mut out,
            &[result(6, 1, 0, true), result(6, 0, 1, false)],
            Duration::from_millis(3),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("Iteration 1 broke"));
        assert!(text.contains("Table Balance"));
        assert!(text.contains("Fastest: Smoke"));
    }

    #[test]
    fn markdown_report_has_a_balance_table() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[result(10, 3, 1, true)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# Roundtable Logic Test Results"));
        assert!(text.contains("| 10 | 4 | 3 | 1 | 75.0 |"));
        assert!(text.contains("(10 players, seed 7)"));
    }

    #[test]
    fn json_report_is_an_array() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[result(7, 1, 1, true)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["players"], 7);
    }
}
