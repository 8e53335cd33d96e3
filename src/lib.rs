//! # noema
//!
//! A hypergraph knowledge store with a pattern unification engine and a
//! multi-strategy inference engine.
//!
//! Knowledge lives in an [`store::AtomStore`]: typed nodes (concepts,
//! predicates) and typed links (inheritance, similarity, evaluation)
//! carrying probabilistic [`truth::TruthValue`]s. Queries are s-expression
//! patterns with `$X` variables, matched by unification. Six inference
//! strategies — forward, backward, abductive, analogical, probabilistic,
//! and temporal — share one parameter contract and report their bounds
//! explicitly.
//!
//! ```
//! use noema::atom::LinkKind;
//! use noema::engine::Engine;
//! use noema::truth::TruthValue;
//!
//! # fn main() -> noema::error::NoemaResult<()> {
//! let engine = Engine::new();
//! let socrates = engine.add_concept("Socrates", TruthValue::CERTAIN)?;
//! let human = engine.add_concept("Human", TruthValue::CERTAIN)?;
//! engine.add_link(
//!     LinkKind::Inheritance,
//!     vec![socrates, human],
//!     TruthValue::new(1.0, 0.95)?,
//! )?;
//!
//! let bindings = engine.match_pattern("(Inheritance $who (Concept \"Human\"))", 10)?;
//! assert_eq!(bindings[0].get("who"), Some(&socrates));
//! # Ok(())
//! # }
//! ```

pub mod atom;
pub mod config;
pub mod engine;
pub mod error;
pub mod infer;
pub mod load;
pub mod pattern;
pub mod rules;
pub mod store;
pub mod truth;

pub use engine::Engine;
pub use error::{NoemaError, NoemaResult};
