pub mod scenario;

use anyhow::{Result, bail};
use roundtable_game::is_supported_player_count;

pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse table sizes such as `5,7` or `5-10`. Order is kept, repeats dropped.
pub fn parse_player_counts(input: &str) -> Result<Vec<usize>> {
    let mut counts = Vec::new();
    for token in split_csv(input) {
        let range = match token.split_once('-') {
            Some((lo, hi)) => parse_count(lo)?..=parse_count(hi)?,
            None => {
                let count = parse_count(&token)?;
                count..=count
            }
        };
        if range.is_empty() {
            bail!("empty player range '{token}'");
        }
        for count in range {
            if !is_supported_player_count(count) {
                bail!("tables seat 5 to 10 players, got {count}");
            }
            if !counts.contains(&count) {
                counts.push(count);
            }
        }
    }
    if counts.is_empty() {
        bail!("no player counts given");
    }
    Ok(counts)
}

fn parse_count(token: &str) -> Result<usize> {
    token
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid player count '{}'", token.trim()))
}
