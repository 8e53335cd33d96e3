//! Rich diagnostic error types for the noema engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly what went wrong
//! and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the noema engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum NoemaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Infer(#[from] InferError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("invalid arity for {kind}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(noema::store::invalid_arity),
        help(
            "Each link kind declares a required outgoing arity: Inheritance and \
             Similarity take exactly 2 targets, Evaluation takes a predicate plus \
             at least one argument, Link takes at least one target."
        )
    )]
    InvalidArity {
        kind: String,
        expected: String,
        actual: usize,
    },

    #[error("invalid truth value: strength {strength}, confidence {confidence}")]
    #[diagnostic(
        code(noema::store::invalid_truth_value),
        help("Both strength and confidence must lie in [0.0, 1.0] and be finite.")
    )]
    InvalidTruthValue { strength: f32, confidence: f32 },

    #[error("dangling reference: outgoing atom {target} does not exist")]
    #[diagnostic(
        code(noema::store::dangling_reference),
        help(
            "Links may only reference atoms already present in the store. \
             Add the target atom first, then the link."
        )
    )]
    DanglingReference { target: u64 },

    #[error("atom not found: {id}")]
    #[diagnostic(
        code(noema::store::not_found),
        help("The requested atom id does not exist in this store. Verify the id is correct.")
    )]
    NotFound { id: u64 },

    #[error("atom id space exhausted: cannot allocate more than u64::MAX atoms")]
    #[diagnostic(
        code(noema::store::exhausted),
        help(
            "The atom id space is exhausted. This requires 2^64 allocations — \
             if you see this error, check for an allocation loop."
        )
    )]
    IdExhausted,
}

// ---------------------------------------------------------------------------
// Pattern errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("invalid pattern: {message}")]
    #[diagnostic(
        code(noema::pattern::invalid),
        help(
            "Patterns are s-expressions: `(Inheritance (Concept \"Human\") $X)`. \
             Check for balanced parentheses, double-quoted names, and a valid \
             kind keyword at the head of each form."
        )
    )]
    Invalid { message: String },

    #[error("unknown kind keyword: {keyword}")]
    #[diagnostic(
        code(noema::pattern::unknown_kind),
        help(
            "Valid node kinds are Concept, Predicate, Variable; valid link kinds \
             are Inheritance, Similarity, Evaluation, Link."
        )
    )]
    UnknownKind { keyword: String },

    #[error("arity mismatch for {kind}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(noema::pattern::arity_mismatch),
        help(
            "The number of children in a link pattern must satisfy the link \
             kind's declared arity."
        )
    )]
    ArityMismatch {
        kind: String,
        expected: String,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Inference errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum InferError {
    #[error("unknown strategy: {name}")]
    #[diagnostic(
        code(noema::infer::unknown_strategy),
        help(
            "Valid strategies are: forward, backward, abductive, analogical, \
             probabilistic, temporal."
        )
    )]
    UnknownStrategy { name: String },

    #[error("no premises provided for forward chaining")]
    #[diagnostic(
        code(noema::infer::no_premises),
        help("Forward chaining requires at least one premise atom to start from.")
    )]
    NoPremises,

    #[error("probabilistic fact {atom} has no prior and no incoming dependency")]
    #[diagnostic(
        code(noema::infer::underivable_fact),
        help(
            "Every fact in a probabilistic query must either carry a prior \
             probability or be the conclusion of at least one dependency."
        )
    )]
    UnderivableFact { atom: u64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    #[diagnostic(
        code(noema::config::io),
        help("Check that the config file exists and is readable.")
    )]
    Io { path: String, message: String },

    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(noema::config::parse),
        help("The config file must be valid TOML. See the documented [infer] section.")
    )]
    Parse { message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(noema::config::invalid),
        help("Check the [infer] section: thresholds must lie in [0.0, 1.0] and bounds must be > 0.")
    )]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read knowledge base file {path}: {message}")]
    #[diagnostic(
        code(noema::load::io),
        help("Check that the file exists and is readable.")
    )]
    Io { path: String, message: String },

    #[error("failed to parse knowledge base JSON: {message}")]
    #[diagnostic(
        code(noema::load::json),
        help("The knowledge base file must be valid JSON matching the KbFile schema.")
    )]
    Json { message: String },

    #[error("unresolved atom reference: {name}")]
    #[diagnostic(
        code(noema::load::unresolved),
        help(
            "Link specs reference other atoms by name. Every referenced name \
             must appear as a node or an earlier named link in the file."
        )
    )]
    Unresolved { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),
}

/// Convenience alias for functions returning noema results.
pub type NoemaResult<T> = std::result::Result<T, NoemaError>;
