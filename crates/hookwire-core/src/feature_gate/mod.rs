//! # Hookwire Feature Gate
//!
//! Decides whether a feature module is told to activate. Predicates are pure
//! functions of the option store, evaluated fresh on every dispatch pass so a
//! changed option takes effect on the next plugin load.
//!
//! Documented defaults for missing values:
//!
//! - flag absent ⇒ `false`
//! - integer-coded option absent or unparsable ⇒ the predicate's own default
//! - string option absent ⇒ empty
pub mod predicate;

pub use predicate::{ConfigPredicate, IntTest};

use crate::storage::ConfigSource;

/// Whether a module guarded by `predicate` should run against `config`.
///
/// Total: never panics and never errors, whatever the store contains.
pub fn should_activate(predicate: &ConfigPredicate, config: &dyn ConfigSource) -> bool {
    predicate.evaluate(config)
}
