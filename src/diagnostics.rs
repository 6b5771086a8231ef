//! Rendering of pipeline errors as source diagnostics.
//!
//! The error name becomes the diagnostic code and the tip the message of
//! the primary label, which points at the error position.

use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, NoColor, StandardStream, WriteColor},
        Config,
    },
};

use crate::errors::errors::{Error, ErrorTip};

pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    file_id: usize,
    config: Config,
}

impl DiagnosticReporter {
    pub fn new(name: &str, source: &str) -> Self {
        let mut files = SimpleFiles::new();
        let file_id = files.add(name.to_string(), source.to_string());

        DiagnosticReporter {
            files,
            file_id,
            config: Config::default(),
        }
    }

    pub fn to_diagnostic(&self, error: &Error) -> Diagnostic<usize> {
        let label = Label::primary(self.file_id, self.label_range(error));
        let label = match error.get_tip() {
            ErrorTip::None => label,
            tip => label.with_message(tip.to_string()),
        };

        Diagnostic::error()
            .with_message(error.to_string())
            .with_code(error.get_error_name())
            .with_labels(vec![label])
    }

    /// Writes the diagnostic for `error` to stderr.
    pub fn emit(&self, error: &Error) -> Result<(), codespan_reporting::files::Error> {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let mut lock = writer.lock();
        self.emit_to(&mut lock, error)
    }

    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        error: &Error,
    ) -> Result<(), codespan_reporting::files::Error> {
        term::emit(writer, &self.config, &self.files, &self.to_diagnostic(error))
    }

    /// Renders the diagnostic for `error` without colors.
    pub fn render(&self, error: &Error) -> Result<String, codespan_reporting::files::Error> {
        let mut buffer = NoColor::new(Vec::new());
        self.emit_to(&mut buffer, error)?;

        Ok(String::from_utf8_lossy(&buffer.into_inner()).into_owned())
    }

    // A one character range at the error position, kept inside the source
    // and on a char boundary.
    fn label_range(&self, error: &Error) -> std::ops::Range<usize> {
        let source = self
            .files
            .get(self.file_id)
            .map(|file| file.source().as_str())
            .unwrap_or_default();

        let mut start = (error.get_position().0 as usize).min(source.len());
        while !source.is_char_boundary(start) {
            start -= 1;
        }

        let end = source[start..]
            .chars()
            .next()
            .map_or(start, |ch| start + ch.len_utf8());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_source;

    #[test]
    fn test_render_type_error() {
        let source = "let age: number = 25;\nage = \"x\";\n";
        let error = check_source(source, "age.ts").unwrap_err();

        let rendered = DiagnosticReporter::new("age.ts", source)
            .render(&error)
            .unwrap();

        assert!(rendered.contains("error[TypeMatchError]"));
        assert!(rendered.contains("age.ts:2:"));
        assert!(rendered.contains("Type `string` is not assignable to type `number`"));
    }

    #[test]
    fn test_render_position_at_end_of_source() {
        let source = "let x = 1";
        let error = check_source(source, "eof.ts").unwrap_err();

        let rendered = DiagnosticReporter::new("eof.ts", source)
            .render(&error)
            .unwrap();

        assert!(rendered.contains("error[UnexpectedTokenDetailed]"));
    }

    #[test]
    fn test_diagnostic_without_tip_has_unlabelled_span() {
        let source = "let x = 1 # 2;";
        let error = check_source(source, "hash.ts").unwrap_err();
        let diagnostic = DiagnosticReporter::new("hash.ts", source).to_diagnostic(&error);

        assert_eq!(diagnostic.code.as_deref(), Some("UnrecognisedToken"));
        assert_eq!(diagnostic.labels[0].range, 10..11);
        assert!(diagnostic.labels[0].message.is_empty());
    }

    #[test]
    fn test_emit_to_writer_and_stderr() {
        let source = "function notNever(): never { }";
        let error = check_source(source, "never.ts").unwrap_err();
        let reporter = DiagnosticReporter::new("never.ts", source);

        let mut buffer = NoColor::new(Vec::new());
        reporter.emit_to(&mut buffer, &error).unwrap();
        let written = String::from_utf8(buffer.into_inner()).unwrap();

        assert!(written.contains("error[NeverFunctionReturns]"));
        assert!(reporter.emit(&error).is_ok());
    }
}
