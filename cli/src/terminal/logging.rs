use anyhow::Context;
use colored::*;
use switchwatch_common::logging::SUCCESS_TARGET;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Target of plain terminal output, printed without symbol or timestamp.
pub const PRINT_TARGET: &str = "switchwatch::print";

const VERBOSE_DIRECTIVES: &str = "info,switchwatch_cli=debug,switchwatch_core=debug";

type Paint = fn(ColoredString) -> ColoredString;

pub fn init(verbose: bool) -> anyhow::Result<()> {
    let filter: EnvFilter = if verbose {
        EnvFilter::new(VERBOSE_DIRECTIVES)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(SwitchwatchFormatter))
        .try_init()
        .context("initializing logging")
}

pub struct SwitchwatchFormatter;

impl<S, N> FormatEvent<S, N> for SwitchwatchFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let mut timestamp = String::new();
        SystemTime.format_time(&mut Writer::new(&mut timestamp))?;
        write!(writer, "{} ", timestamp.dimmed())?;

        let (symbol, paint): (&str, Paint) = symbol(meta.level(), meta.target());
        write!(writer, "{} ", paint(symbol.into()))?;

        // Only the innermost span: the phase a remediation event belongs to.
        if let Some(span) = ctx.lookup_current() {
            let extensions = span.extensions();
            if let Some(fields) = extensions.get::<FormattedFields<N>>()
                && !fields.is_empty()
            {
                write!(writer, "{} ", format!("{}{{{}}}", span.name(), fields).dimmed())?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn symbol(level: &Level, target: &str) -> (&'static str, Paint) {
    if target == SUCCESS_TARGET {
        return ("[+]", |s| s.bright_green().bold());
    }
    match *level {
        Level::TRACE => ("[ ]", |s| s.dimmed()),
        Level::DEBUG => ("[?]", |s| s.blue()),
        Level::INFO => ("[i]", |s| s.cyan()),
        Level::WARN => ("[*]", |s| s.yellow().bold()),
        Level::ERROR => ("[-]", |s| s.red().bold()),
    }
}
