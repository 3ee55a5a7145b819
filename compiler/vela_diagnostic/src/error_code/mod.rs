//! Error codes for all Vela diagnostics.
//!
//! The first digit names the phase that produced the diagnostic.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: type errors
/// - E3xxx: lowering errors
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Type Errors (E2xxx)
    /// Type mismatch
    E2001,
    /// Unknown type name
    E2002,
    /// Unknown identifier
    E2003,
    /// Name already declared in this scope
    E2004,
    /// Overload with identical shape already declared
    E2005,
    /// No overload matches the call
    E2006,
    /// More than one overload matches the call
    E2007,
    /// Type does not conform to a standard
    E2008,
    /// Unknown field
    E2009,
    /// Unknown member (method or variant)
    E2010,
    /// Wrong number of generic arguments
    E2011,
    /// Generic type used without arguments
    E2012,
    /// Callee is not a function
    E2013,
    /// Declaration needs a type annotation
    E2014,
    /// Assignment to an immutable binding
    E2015,
    /// Expression cannot be assigned to
    E2016,
    /// Generic argument cannot be inferred
    E2017,
    /// Struct literal misses a field
    E2018,
    /// Operator applied to an unsupported operand type
    E2019,
    /// Constant initializer is not a literal
    E2020,
    /// Enum discriminant outside the byte range
    E2021,

    // Lowering Errors (E3xxx)
    /// Unresolved type reached lowering
    E3001,
    /// Layout requested for a type that has none
    E3002,

    // Internal Errors (E9xxx)
    /// Unbound type parameter during instantiation
    E9001,
    /// Resolution or instantiation limit exceeded
    E9002,
    /// Cyclic alias
    E9003,
    /// Inconsistent checker annotations
    E9004,
}

impl ErrorCode {
    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E2021 => "E2021",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::E9004 => "E9004",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
