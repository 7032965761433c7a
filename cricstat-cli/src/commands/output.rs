//! Rendering result tables as aligned text, CSV or JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use cricstat_db::{Cell, ResultTable};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::cli_types::{OutputArgs, OutputFormat};

/// Print a table to stdout or write it to `--out`.
pub(crate) fn emit(table: &ResultTable, args: &OutputArgs) -> Result<(), CliError> {
    match &args.out {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            write_table(table, args.output, &mut file, false)?;
            file.flush()?;
            log::info!(
                "Wrote {} row(s) to {}",
                table.len(),
                path.display().if_supports_color(Stdout, |t| t.cyan()),
            );
        }
        None => {
            {
                let mut stdout = io::stdout().lock();
                write_table(table, args.output, &mut stdout, true)?;
                stdout.flush()?;
            }
            if args.output == OutputFormat::Table {
                if table.is_empty() {
                    log::info!("{}", "No rows.".if_supports_color(Stdout, |t| t.dimmed()));
                } else {
                    log::info!(
                        "{}",
                        format!("{} row(s)", table.len()).if_supports_color(Stdout, |t| t.dimmed()),
                    );
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn write_table(
    table: &ResultTable,
    format: OutputFormat,
    out: &mut dyn Write,
    color: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Table => write_text(table, out, color)?,
        OutputFormat::Csv => write_csv(table, out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &table.records())?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_csv(table: &ResultTable, out: &mut dyn Write) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn is_numeric(cell: &Cell) -> bool {
    matches!(cell, Cell::Integer(_) | Cell::Real(_))
}

fn write_text(table: &ResultTable, out: &mut dyn Write, color: bool) -> io::Result<()> {
    if table.columns.is_empty() {
        return Ok(());
    }
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &rendered {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    let header = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c, w = w))
        .collect::<Vec<_>>()
        .join("  ");
    let header = header.trim_end();
    if color {
        writeln!(out, "{}", header.if_supports_color(Stdout, |t| t.bold()))?;
    } else {
        writeln!(out, "{}", header)?;
    }
    let rule = widths
        .iter()
        .map(|w| "\u{2500}".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", rule)?;

    for (cells, values) in table.rows.iter().zip(&rendered) {
        let line = values
            .iter()
            .zip(&widths)
            .zip(cells)
            .map(|((v, w), cell)| {
                if is_numeric(cell) {
                    format!("{:>w$}", v, w = w)
                } else {
                    format!("{:<w$}", v, w = w)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        let mut table = ResultTable::new(&["player", "runs", "average"]);
        table.rows.push(vec![
            Cell::from("Virat Kohli"),
            Cell::from(85i64),
            Cell::from(42.5),
        ]);
        table.rows.push(vec![Cell::from("Joe Root"), Cell::from(7i64), Cell::Null]);
        table
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_table(&sample(), format, &mut buf, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_aligns_columns() {
        let text = render(OutputFormat::Table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "player       runs  average");
        assert_eq!(lines[2], "Virat Kohli    85    42.50");
        assert_eq!(lines[3], "Joe Root        7");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let text = render(OutputFormat::Csv);
        assert_eq!(text, "player,runs,average\nVirat Kohli,85,42.50\nJoe Root,7,\n");
    }

    #[test]
    fn json_rows_are_objects() {
        let text = render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["player"], "Virat Kohli");
        assert_eq!(value[0]["runs"], 85);
        assert_eq!(value[1]["average"], serde_json::Value::Null);
    }

    #[test]
    fn out_file_receives_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("q.csv");
        let args = OutputArgs {
            output: OutputFormat::Csv,
            out: Some(path.clone()),
        };
        emit(&sample(), &args).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("player,runs,average\n"));
    }
}
