// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `Error` struct and the `ErrorKind` enum, which are
//! used to represent errors that can occur in the library.

/// A macro for defining the `ErrorKind` enum, the `Display` implementation for
/// it, and the constructors for the `Error` struct.
macro_rules! ErrorKind {
    ($(
        ($kind:ident, $ctor:ident)
    ),*) => {
        /// The kind of error that occurred.
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum ErrorKind {
            $(
                $kind,
            )*
        }

        impl std::fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$kind => write!(f, "{}", stringify!($kind)),
                    )*
                }
            }
        }

        /// Constructors for [`Error`].
        impl Error {
            $(
                #[doc = concat!(
                    "Creates a new [`Error`] with the `",
                    stringify!($kind),
                    "` kind and the given description."
                )]
                pub(crate) fn $ctor(desc: impl Into<String>) -> crate::Error {
                    Self {
                        kind: ErrorKind::$kind,
                        desc: desc.into(),
                    }
                }
            )*
        }
    };
}

ErrorKind!(
    (ArrayDefinition, array_definition),
    (InvalidValue, invalid_value),
    (InvalidType, invalid_type),
    (Overflow, overflow),
    (RecordDoesNotExist, record_does_not_exist),
    (MultipleRecordsReturned, multiple_records_returned),
    (MissingNode, missing_node),
    (MissingBranch, missing_branch),
    (NoPathBetweenNodes, no_path_between_nodes),
    (InvalidGraph, invalid_graph),
    (NotImplemented, not_implemented),
    (Io, io),
    (Internal, internal)
);

impl ErrorKind {
    /// Returns true for the kinds raised by graph operations.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            Self::MissingNode | Self::MissingBranch | Self::NoPathBetweenNodes | Self::InvalidGraph
        )
    }
}

/// An error that can occur while building, querying or mutating record
/// arrays, graphs and grids.
#[derive(Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    desc: String,
}

impl Error {
    /// Returns the kind of the error, for callers that need to tell expected
    /// absence apart from programming errors.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human readable description of the error.
    pub fn description(&self) -> &str {
        &self.desc
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.desc)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string())
    }
}
