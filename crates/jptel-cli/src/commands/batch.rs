use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use jptel_core::{normalize_japan_phone_value, BatchItemDto, BatchReportDto, PhoneCheck};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Input file; stdin when omitted or `-`
    #[arg(long, short)]
    pub input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = InputFormat::Lines)]
    pub format: InputFormat,
    /// Stop at the first rejected entry
    #[arg(long)]
    pub fail_fast: bool,
    /// Check blank lines instead of skipping them
    #[arg(long)]
    pub keep_blank: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Lines,
    Json,
}

pub fn batch(ctx: &Context<'_>, args: BatchArgs) -> Result<()> {
    let source = read_source(args.input.as_deref())?;
    let fail_fast = args.fail_fast || ctx.config.batch.fail_fast;
    let skip_blank = ctx.config.batch.skip_blank && !args.keep_blank;

    let entries = match args.format {
        InputFormat::Lines => parse_lines(&source, skip_blank),
        InputFormat::Json => parse_json(&source)?,
    };
    let limit = ctx.config.batch.max_entries;
    if entries.len() > limit {
        return Err(invalid_input(format!(
            "batch has {} entries; limit is {}",
            entries.len(),
            limit
        )));
    }

    let report = check_entries(entries, fail_fast);

    if ctx.json {
        print_json(&report)?;
    } else {
        for item in &report.items {
            println!("{}", format_item(item));
        }
    }

    if report.failed > 0 {
        return Err(invalid_input(format!(
            "{} of {} entries rejected",
            report.failed,
            report.items.len()
        )));
    }
    Ok(())
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                return Err(not_found(format!("input file {}", path.display())));
            }
            debug!(path = %path.display(), "reading batch input");
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
        }
        _ => {
            debug!("reading batch input from stdin");
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .with_context(|| "read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_lines(source: &str, skip_blank: bool) -> Vec<(usize, Value)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !(skip_blank && line.trim().is_empty()))
        .map(|(idx, line)| (idx + 1, Value::String(line.to_string())))
        .collect()
}

fn parse_json(source: &str) -> Result<Vec<(usize, Value)>> {
    let values: Vec<Value> = serde_json::from_str(source)
        .map_err(|err| invalid_input(format!("batch input must be a JSON array: {err}")))?;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| (idx + 1, value))
        .collect())
}

fn check_entries(entries: Vec<(usize, Value)>, fail_fast: bool) -> BatchReportDto {
    let total = entries.len();
    let mut items = Vec::with_capacity(total);
    let mut ok = 0;
    let mut failed = 0;

    for (line, input) in entries {
        let result = normalize_japan_phone_value(&input);
        match &result {
            Ok(_) => ok += 1,
            Err(err) => {
                failed += 1;
                debug!(line, kind = err.kind(), "entry rejected");
            }
        }
        items.push(BatchItemDto {
            line,
            input,
            check: PhoneCheck::from(result),
        });
        if fail_fast && failed > 0 {
            if items.len() < total {
                warn!(line, remaining = total - items.len(), "stopping at first rejected entry");
            }
            break;
        }
    }

    BatchReportDto { items, ok, failed }
}

fn format_item(item: &BatchItemDto) -> String {
    match (&item.check.e164, &item.check.error) {
        (Some(e164), _) => format!("{}\t{}", item.line, e164),
        (None, Some(error)) => format!("{}\terror\t{}", item.line, error),
        (None, None) => format!("{}\terror", item.line),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_entries, format_item, parse_json, parse_lines};
    use serde_json::{json, Value};

    #[test]
    fn parse_lines_skips_blank_lines_and_keeps_numbers() {
        let entries = parse_lines("090-6501-3820\n\n  \nabc\n", true);
        assert_eq!(
            entries,
            vec![
                (1, Value::String("090-6501-3820".to_string())),
                (4, Value::String("abc".to_string())),
            ]
        );
    }

    #[test]
    fn parse_lines_can_keep_blank_lines() {
        let entries = parse_lines("090-6501-3820\r\n\r\n", false);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], (2, Value::String(String::new())));
    }

    #[test]
    fn parse_json_requires_array() {
        assert!(parse_json("{\"phone\": \"090\"}").is_err());
        let entries = parse_json("[\"09065013820\", 42]").expect("parse");
        assert_eq!(entries, vec![(1, json!("09065013820")), (2, json!(42))]);
    }

    #[test]
    fn check_entries_counts_results() {
        let report = check_entries(
            vec![(1, json!("09065013820")), (2, json!(42)), (3, json!("abc"))],
            false,
        );
        assert_eq!(report.ok, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.items[0].check.e164.as_deref(), Some("+819065013820"));
        assert_eq!(
            report.items[1].check.error.as_deref(),
            Some("Informe um telefone válido.")
        );
    }

    #[test]
    fn check_entries_stops_at_first_failure_when_fail_fast() {
        let report = check_entries(
            vec![(1, json!("123")), (2, json!("09065013820"))],
            true,
        );
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.ok, 0);
    }

    #[test]
    fn format_item_is_tab_separated() {
        let report = check_entries(vec![(7, json!("07012345678")), (8, json!(""))], false);
        assert_eq!(format_item(&report.items[0]), "7\t+817012345678");
        assert_eq!(
            format_item(&report.items[1]),
            "8\terror\tTelefone é obrigatório."
        );
    }
}
