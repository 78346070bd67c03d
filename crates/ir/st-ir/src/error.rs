//! Diagnostics for the type notation parser
//!
//! Note: the span and source fields are read by miette's `#[derive(Diagnostic)]`
//! expansion, which the unused-assignment lint cannot see through.

#![allow(unused_assignments)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Error produced while parsing a type
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum ParseError {
    /// A token that cannot appear here
    #[error("unexpected `{found}`, expected {expected}")]
    #[diagnostic(code(type_parser::unexpected_token))]
    UnexpectedToken {
        /// What was found
        found: String,
        /// What the parser was looking for
        expected: String,
        /// Location of the token
        #[label("unexpected here")]
        span: SourceSpan,
        /// Source text for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Input ended in the middle of a type
    #[error("unexpected end of input, expected {expected}")]
    #[diagnostic(code(type_parser::unexpected_end))]
    UnexpectedEnd {
        /// What the parser was looking for
        expected: String,
        /// End of the input
        #[label("input ends here")]
        span: SourceSpan,
        /// Source text for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// An identifier in type position that names no ground type
    #[error("unknown type `{name}`")]
    #[diagnostic(
        code(type_parser::unknown_type),
        help("ground types are UInt, SInt, Clock, Reset, AsyncReset and Analog")
    )]
    UnknownType {
        /// The identifier
        name: String,
        /// Location of the identifier
        #[label("not a type")]
        span: SourceSpan,
        /// Source text for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// An integer literal that does not fit
    #[error("integer `{text}` is out of range")]
    #[diagnostic(code(type_parser::integer_out_of_range))]
    IntegerOutOfRange {
        /// The literal text
        text: String,
        /// Location of the literal
        #[label("too large")]
        span: SourceSpan,
        /// Source text for context
        #[source_code]
        src: NamedSource<String>,
    },

    /// Two fields of one bundle share a name
    #[error("duplicate field `{name}`")]
    #[diagnostic(code(type_parser::duplicate_field))]
    DuplicateField {
        /// The repeated field name
        name: String,
        /// Location of the second occurrence
        #[label("already declared in this bundle")]
        span: SourceSpan,
        /// Source text for context
        #[source_code]
        src: NamedSource<String>,
    },
}

impl ParseError {
    /// Byte offset the error points at
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEnd { span, .. }
            | Self::UnknownType { span, .. }
            | Self::IntegerOutOfRange { span, .. }
            | Self::DuplicateField { span, .. } => span.offset(),
        }
    }
}
