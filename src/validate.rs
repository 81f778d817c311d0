//! Validate Module for hmd
//!
//! Enforces the structural contract every script must satisfy before it is
//! deployed: exactly one `module.exports = function(context, args) { ... }`
//! statement and nothing else.

use oxc_ast::ast::{AssignmentTarget, Expression, Program, Statement};
use oxc_span::{GetSpan, Span};
use oxc_syntax::operator::AssignmentOperator;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const REQUIRED_SHAPE: &str =
    "A script must consist of exactly one module.exports = function(context, args) { ... } declaration";

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE LOCATION
// ═══════════════════════════════════════════════════════════════════════════════

/// 1-based line and column of a byte offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn from_offset(source: &str, offset: u32) -> Self {
        let offset = (offset as usize).min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32 + 1;
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Which parse failed. The raw source is parsed to read directives, again by
/// the minify pass when it runs, and the working text is parsed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Directives,
    Minify,
    Working,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStage::Directives => f.write_str("script source"),
            ParseStage::Minify => f.write_str("script for minification"),
            ParseStage::Working => f.write_str("transformed script"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeViolation {
    #[error("found {0} top-level statements")]
    StatementCount(usize),
    #[error("top-level statement is not an expression")]
    NotExpressionStatement,
    #[error("top-level expression is not an assignment")]
    NotAssignment,
    #[error("assignment must use `=`")]
    NotPlainAssignment,
    #[error("assignment target is not module.exports")]
    WrongTarget,
    #[error("assigned value is not a function expression")]
    NotFunctionExpression,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranspileError {
    #[error("failed to parse {stage}: {message}")]
    Parse { stage: ParseStage, message: String },

    #[error("invalid minify target {target}: {message}")]
    Target {
        target: &'static str,
        message: String,
    },

    #[error("{} ({reason} at {location})", REQUIRED_SHAPE)]
    InvalidShape {
        reason: ShapeViolation,
        location: SourceLocation,
    },
}

impl TranspileError {
    pub(crate) fn parse<E: fmt::Display>(stage: ParseStage, errors: &[E]) -> Self {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        TranspileError::Parse { stage, message }
    }

    fn shape(reason: ShapeViolation, source: &str, offset: u32) -> Self {
        TranspileError::InvalidShape {
            reason,
            location: SourceLocation::from_offset(source, offset),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHAPE VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Offsets of the validated wrapper, all against the working text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptShape {
    /// `module.exports = ` up to the function keyword.
    pub wrapper: Span,
    /// Offset of the function body's opening brace.
    pub body_start: u32,
}

/// Checks that `program` is a single `module.exports = function(...) {...}`.
pub fn validate_script(program: &Program<'_>, source: &str) -> Result<ScriptShape, TranspileError> {
    // "use strict" lands in `directives`, not `body`, but it is still a statement
    let statement_count = program.directives.len() + program.body.len();
    if statement_count != 1 || program.body.len() != 1 {
        let offset = program
            .body
            .get(1)
            .map(|s| s.span().start)
            .unwrap_or(program.span.start);
        return Err(TranspileError::shape(
            ShapeViolation::StatementCount(statement_count),
            source,
            offset,
        ));
    }

    let statement = &program.body[0];
    let Statement::ExpressionStatement(expr_stmt) = statement else {
        return Err(TranspileError::shape(
            ShapeViolation::NotExpressionStatement,
            source,
            statement.span().start,
        ));
    };

    let Expression::AssignmentExpression(assign) = &expr_stmt.expression else {
        return Err(TranspileError::shape(
            ShapeViolation::NotAssignment,
            source,
            expr_stmt.expression.span().start,
        ));
    };

    if assign.operator != AssignmentOperator::Assign {
        return Err(TranspileError::shape(
            ShapeViolation::NotPlainAssignment,
            source,
            assign.span.start,
        ));
    }

    if !is_module_exports(&assign.left) {
        return Err(TranspileError::shape(
            ShapeViolation::WrongTarget,
            source,
            assign.left.span().start,
        ));
    }

    let function = match &assign.right {
        Expression::FunctionExpression(function) => function,
        other => {
            return Err(TranspileError::shape(
                ShapeViolation::NotFunctionExpression,
                source,
                other.span().start,
            ))
        }
    };
    let Some(body) = &function.body else {
        return Err(TranspileError::shape(
            ShapeViolation::NotFunctionExpression,
            source,
            function.span.start,
        ));
    };

    Ok(ScriptShape {
        wrapper: Span::new(assign.left.span().start, function.span.start),
        body_start: body.span.start,
    })
}

fn is_module_exports(target: &AssignmentTarget<'_>) -> bool {
    let AssignmentTarget::StaticMemberExpression(member) = target else {
        return false;
    };
    match &member.object {
        Expression::Identifier(object) => {
            object.name == "module" && member.property.name == "exports"
        }
        _ => false,
    }
}
