use crate::span::Span;

/// A front-end diagnostic: a parse or lex error with a source location.
///
/// Lowering errors carry no spans (the AST may have been handed to us by an
/// external parser); those are reported through `error::CompileError` instead.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let mut report = Report::build(ReportKind::Error, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.start as usize..self.span.end as usize))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        let _ = report.finish().eprint((filename, Source::from(source)));
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("unexpected token".to_string(), Span::new(4, 7));
        assert_eq!(d.message, "unexpected token");
        assert_eq!(d.span.start, 4);
        assert_eq!(d.span.end, 7);
        assert!(d.help.is_none());
    }

    #[test]
    fn test_with_help() {
        let d = Diagnostic::error("unbalanced parenthesis".to_string(), Span::dummy())
            .with_help("close the compound node before end of input".to_string());
        assert_eq!(
            d.help.as_deref(),
            Some("close the compound node before end of input")
        );
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "set(x, )";
        let d = Diagnostic::error("expected a node".to_string(), Span::new(7, 8));
        d.render("test.cll", source);
    }
}
