//! Rich error reports.
//!
//! Errors that point into a raw input implement [`RichError`] and can be
//! rendered with [`write_rich_error`] as an annotated report of the input.

use std::borrow::Cow;

use crate::span::Span;

/// Errors with locations inside the input they came from
pub trait RichError: std::error::Error {
    /// Spans to highlight, with an optional message each
    fn labels(&self) -> Vec<(Span, Option<Cow<'static, str>>)> {
        vec![]
    }
    fn help(&self) -> Option<Cow<'static, str>> {
        None
    }
    fn code(&self) -> Option<&'static str> {
        None
    }
}

macro_rules! label {
    ($span:expr) => {
        (*$span, None)
    };
    ($span:expr, $message:expr) => {
        (*$span, Some($message.into()))
    };
}
pub(crate) use label;

macro_rules! help {
    () => {
        None
    };
    ($help:expr) => {
        Some($help.into())
    };
}
pub(crate) use help;

/// Writes a rich error report
///
/// `input` is the raw input the error was generated from and `title` is
/// shown as the name of the source in the report.
///
/// ```
/// # use number_with_units::{Converter, NumberWithUnits, error::write_rich_error};
/// let mut converter = Converter::bundled();
/// converter.register_currency_units().unwrap();
/// let input = "5 km $";
/// let err = NumberWithUnits::from_raw_input(input, &converter).unwrap_err();
/// let mut out = Vec::new();
/// write_rich_error(&err, "answer", input, false, &mut out).unwrap();
/// let out = String::from_utf8(out).unwrap();
/// assert!(out.contains("Currency units"));
/// ```
pub fn write_rich_error(
    error: &dyn RichError,
    title: &str,
    input: &str,
    color: bool,
    w: impl std::io::Write,
) -> std::io::Result<()> {
    use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};

    let labels: Vec<_> = error
        .labels()
        .into_iter()
        .map(|(span, message)| ((title, span.char_range(input)), message))
        .collect();
    let offset = labels
        .iter()
        .map(|((_, range), _)| range.start)
        .min()
        .unwrap_or_default();

    let mut report = Report::build(ReportKind::Error, title, offset)
        .with_config(ariadne::Config::default().with_color(color))
        .with_message(error);
    if let Some(code) = error.code() {
        report = report.with_code(code);
    }

    let mut colors = ColorGenerator::new();
    for (order, (span, message)) in labels.into_iter().enumerate() {
        let mut label = Label::new(span)
            .with_order(order as i32)
            .with_color(colors.next());
        if let Some(message) = message {
            label = label.with_message(message);
        }
        report = report.with_label(label);
    }

    if let Some(help) = error.help() {
        report = report.with_help(help);
    }

    report.finish().write((title, Source::from(input)), w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("Bad unit")]
    struct BadUnit(Span);

    impl RichError for BadUnit {
        fn labels(&self) -> Vec<(Span, Option<Cow<'static, str>>)> {
            vec![label!(&self.0, "this one")]
        }
        fn help(&self) -> Option<Cow<'static, str>> {
            help!("try another")
        }
        fn code(&self) -> Option<&'static str> {
            Some("test")
        }
    }

    #[test]
    fn report() {
        let mut out = Vec::new();
        write_rich_error(&BadUnit(Span::new(2, 5)), "input", "5 µm", false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[test] Error: Bad unit"));
        assert!(out.contains("input:1:3"));
        assert!(out.contains("this one"));
        assert!(out.contains("try another"));
    }
}
