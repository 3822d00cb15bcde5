//! Deep structural equivalency for in-memory object graphs.
//!
//! A comparison walks a subject and an expectation side by side. Each node
//! is classified once (scalar, collection, dictionary or complex object),
//! compared with the matching strategy and descended into. Every difference
//! found along the way is collected, so one failing call reports all of
//! them at once, each annotated with its path (`Customers[2].Name`).
//!
//! ```
//! use equivalency::{assert_equivalent, Dict, types};
//!
//! let subject = Dict::new(types::string(), types::int()).with("C", 0).with("A", 0);
//! let expectation = Dict::new(types::string(), types::int()).with("A", 0).with("C", 0);
//! let report = assert_equivalent(subject, expectation, |o| o, "").unwrap();
//! assert!(report.is_empty());
//! ```
//!
//! Values are built from [`Value`] scalars and the shared [`Seq`], [`Dict`]
//! and [`Object`] handles, or converted from `serde_json` values.

mod classify;
mod collection_assertions;
mod deep_equal;
mod engine;
mod equivalency;
mod error;
pub mod format;
mod node;
mod options;
mod reporter;
mod tracker;
pub mod types;
mod value;

pub use equivalency_path::{Path, PathError, Segment};

pub use classify::{classify, dictionary_shape, Classification, DictionaryShape, Strategy};
pub use collection_assertions::CollectionAssertions;
pub use deep_equal::deep_equal;
pub use engine::{check_key_compatibility, KeyCompatibility, KeyIncompatibility};
pub use equivalency::{assert_equivalent, should_be_equivalent, Equivalency};
pub use error::{AssertionFailure, ComparerError, EquivalencyError, UsageError};
pub use format::describe;
pub use node::ComparisonNode;
pub use options::{
    ComparerFn, EnumEquivalence, EqualityRule, EquivalencyOptions, EquivalencyOptionsBuilder,
    MemberContext, MemberSelector, OptionsProfile, OrderingMode, SelectorFn,
};
pub use reporter::{because_clause, escape, FailureBatch, Mismatch, MismatchKind, MismatchList, Reporter};
pub use tracker::GraphTracker;
pub use types::{Type, TypeBuilder, TypeKind, TypeRef};
pub use value::{Dict, EnumValue, Object, Seq, Value};
