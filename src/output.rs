//! Terminal rendering of ranked query results

use crate::index::{QueryResults, SearchResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print every query with its ranked locations to stdout
pub fn print_results(results: &QueryResults, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_results(&mut stdout, results)
}

/// Write results to any color-aware writer.
///
/// Queries are headed in bold magenta, followed by one line per location
/// with its score and match count. Empty queries are skipped.
pub fn write_results<W: WriteColor>(out: &mut W, results: &QueryResults) -> io::Result<()> {
    let mut first = true;
    for (query, ranked) in results {
        if query.is_empty() {
            continue;
        }
        if !first {
            writeln!(out)?;
        }
        first = false;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(out, "{query}")?;
        out.reset()?;
        writeln!(out, " ({} {})", ranked.len(), plural(ranked.len(), "match", "matches"))?;

        for result in ranked {
            write_result(out, result)?;
        }
    }
    Ok(())
}

fn write_result<W: WriteColor>(out: &mut W, result: &SearchResult) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "  {:.8}", result.score)?;
    out.reset()?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    write!(out, " {:>5}", result.count)?;
    out.reset()?;

    writeln!(out, "  {}", result.location)
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
