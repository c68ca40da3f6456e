//! Abstract Syntax Tree types for the circuit DSL.
//!
//! Every node renders to a compact debug form through [`fmt::Display`].
//! The renderings are for diagnostics and REPL echo; they are not meant to
//! be parsed back.

use std::fmt;
use std::time::Duration;

use crate::DEFAULT_PROGRAM_NAME;

/// Complete AST representation of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Declared program name, `"unnamed"` if there was no declaration
    pub name: String,
    /// Include directives, in source order
    pub includes: Vec<Include>,
    /// Circuit definitions, in source order
    pub circuits: Vec<Circuit>,
}

impl Program {
    /// Create a new empty, unnamed program.
    pub fn new() -> Self {
        Self {
            name: DEFAULT_PROGRAM_NAME.to_string(),
            includes: Vec::new(),
            circuits: Vec::new(),
        }
    }

    /// Find a circuit by name.
    ///
    /// Names are not checked for uniqueness, so this returns the first match.
    pub fn circuit(&self, name: &str) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.name == name)
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

/// An unresolved reference to another source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Look the unit up by logical name rather than by file path
    pub by_name: bool,
    pub value: String,
}

/// A named, reusable block of statements with input and output registers.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub statements: Vec<Statement>,
}

/// A formal register name, or a whole macro group when `macro_group` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub macro_group: bool,
    pub name: String,
}

impl Parameter {
    /// A plain register parameter.
    pub fn register(name: impl Into<String>) -> Self {
        Self {
            macro_group: false,
            name: name.into(),
        }
    }

    /// A parameter standing for every register of a macro group.
    pub fn macro_group(name: impl Into<String>) -> Self {
        Self {
            macro_group: true,
            name: name.into(),
        }
    }
}

/// Parameters bind positionally, so their order matters.
pub type Parameters = Vec<Parameter>;

/// A statement inside a circuit or clock body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Names a group of registers, e.g. `%num (a0, a1, a2, a3);`
    Macro {
        name: String,
        registers: Parameters,
    },
    /// Invokes a circuit, e.g. `add (a, b, 0) -> (d, e);`
    Call {
        circuit: String,
        inputs: Vec<Expression>,
        outputs: Parameters,
    },
    /// Routes expressions straight into registers, e.g. `(0, x) -> (a, b);`
    Pipe {
        inputs: Vec<Expression>,
        outputs: Parameters,
    },
    /// Runs its body on a fixed interval, e.g. `clock 1 s %tick { !a -> a; }`
    Clock {
        delay: Duration,
        counter: Option<String>,
        body: Vec<Statement>,
    },
}

/// An expression evaluating to one or more bits.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Bit literal, `0` or `1`
    Bit(bool),
    /// Register name
    Identifier(String),
    Infix {
        left: Box<Expression>,
        operator: String,
        right: Box<Expression>,
    },
    Prefix {
        operator: String,
        right: Box<Expression>,
    },
    /// Expands to every register of a macro group, e.g. `%a`
    Macro(String),
}

impl Expression {
    /// Convenience constructor for an identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Convenience constructor for an infix expression.
    pub fn infix(left: Expression, operator: impl Into<String>, right: Expression) -> Self {
        Self::Infix {
            left: Box::new(left),
            operator: operator.into(),
            right: Box::new(right),
        }
    }

    /// Convenience constructor for a prefix expression.
    pub fn prefix(operator: impl Into<String>, right: Expression) -> Self {
        Self::Prefix {
            operator: operator.into(),
            right: Box::new(right),
        }
    }
}

// ============ Debug rendering ============

/// Write items separated by `sep`.
fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Render a duration using the largest unit that divides it exactly.
pub fn format_duration(delay: Duration) -> String {
    const UNITS: &[(u128, &str)] = &[
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "µs"),
    ];

    let nanos = delay.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    for &(size, unit) in UNITS {
        if nanos % size == 0 {
            return format!("{}{}", nanos / size, unit);
        }
    }
    format!("{}ns", nanos)
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, includes [", self.name)?;
        join(f, &self.includes, " ")?;
        f.write_str("]\n")?;
        join(f, &self.circuits, "\n")?;
        f.write_str("}")
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_name {
            write!(f, "name:{:?}", self.value)
        } else {
            write!(f, "{:?}", self.value)
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.name)?;
        join(f, &self.inputs, ", ")?;
        f.write_str(") -> (")?;
        join(f, &self.outputs, ", ")?;
        f.write_str(") {")?;
        join(f, &self.statements, "; ")?;
        f.write_str("}")
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.macro_group {
            write!(f, "%{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Macro { name, registers } => {
                write!(f, "<macro {} (", name)?;
                join(f, registers, ", ")?;
                f.write_str(")>")
            }
            Statement::Call {
                circuit,
                inputs,
                outputs,
            } => {
                write!(f, "<call {} (", circuit)?;
                join(f, inputs, ", ")?;
                f.write_str(") -> (")?;
                join(f, outputs, ", ")?;
                f.write_str(")>")
            }
            Statement::Pipe { inputs, outputs } => {
                f.write_str("<pipe (")?;
                join(f, inputs, ", ")?;
                f.write_str(") -> (")?;
                join(f, outputs, ", ")?;
                f.write_str(")>")
            }
            Statement::Clock {
                delay,
                counter,
                body,
            } => {
                write!(
                    f,
                    "<clock {} ({}) [",
                    format_duration(*delay),
                    counter.as_deref().unwrap_or("")
                )?;
                join(f, body, "; ")?;
                f.write_str("]>")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Bit(true) => f.write_str("<bit 1>"),
            Expression::Bit(false) => f.write_str("<bit 0>"),
            Expression::Identifier(name) => f.write_str(name),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::Prefix { operator, right } => write!(f, "{}{}", operator, right),
            Expression::Macro(name) => write!(f, "%{}", name),
        }
    }
}
