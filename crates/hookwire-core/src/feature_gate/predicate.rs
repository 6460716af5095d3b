use std::fmt;

use crate::storage::ConfigSource;

/// Comparison applied to an integer-coded option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntTest {
    Eq(i64),
    Ne(i64),
    Gt(i64),
    Ge(i64),
    Lt(i64),
    Le(i64),
}

impl IntTest {
    pub fn matches(&self, value: i64) -> bool {
        match *self {
            IntTest::Eq(rhs) => value == rhs,
            IntTest::Ne(rhs) => value != rhs,
            IntTest::Gt(rhs) => value > rhs,
            IntTest::Ge(rhs) => value >= rhs,
            IntTest::Lt(rhs) => value < rhs,
            IntTest::Le(rhs) => value <= rhs,
        }
    }
}

impl fmt::Display for IntTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntTest::Eq(rhs) => write!(f, "== {}", rhs),
            IntTest::Ne(rhs) => write!(f, "!= {}", rhs),
            IntTest::Gt(rhs) => write!(f, "> {}", rhs),
            IntTest::Ge(rhs) => write!(f, ">= {}", rhs),
            IntTest::Lt(rhs) => write!(f, "< {}", rhs),
            IntTest::Le(rhs) => write!(f, "<= {}", rhs),
        }
    }
}

/// Side-effect-free boolean expression over named options.
///
/// Evaluation never fails: every leaf reads through [`ConfigSource`], whose
/// accessors fall back to defaults for absent or malformed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPredicate {
    /// Unconditionally true
    Always,
    /// Boolean flag, absent reads as `false`
    Flag(String),
    /// Integer-coded option compared against a constant
    IntOption {
        key: String,
        default: i64,
        test: IntTest,
    },
    /// String option that is set and not empty
    NonEmpty(String),
    /// Conjunction; an empty list is true
    All(Vec<ConfigPredicate>),
    /// Disjunction; an empty list is false
    Any(Vec<ConfigPredicate>),
    Not(Box<ConfigPredicate>),
}

impl ConfigPredicate {
    pub fn flag(key: impl Into<String>) -> Self {
        ConfigPredicate::Flag(key.into())
    }

    pub fn int(key: impl Into<String>, default: i64, test: IntTest) -> Self {
        ConfigPredicate::IntOption {
            key: key.into(),
            default,
            test,
        }
    }

    pub fn non_empty(key: impl Into<String>) -> Self {
        ConfigPredicate::NonEmpty(key.into())
    }

    pub fn all(predicates: impl IntoIterator<Item = ConfigPredicate>) -> Self {
        ConfigPredicate::All(predicates.into_iter().collect())
    }

    pub fn any(predicates: impl IntoIterator<Item = ConfigPredicate>) -> Self {
        ConfigPredicate::Any(predicates.into_iter().collect())
    }

    pub fn negate(self) -> Self {
        ConfigPredicate::Not(Box::new(self))
    }

    /// Evaluate against the current option values
    pub fn evaluate(&self, config: &dyn ConfigSource) -> bool {
        match self {
            ConfigPredicate::Always => true,
            ConfigPredicate::Flag(key) => config.get_boolean(key),
            ConfigPredicate::IntOption { key, default, test } => {
                test.matches(config.get_string_as_int(key, *default))
            }
            ConfigPredicate::NonEmpty(key) => !config.get_string(key, "").is_empty(),
            ConfigPredicate::All(predicates) => predicates.iter().all(|p| p.evaluate(config)),
            ConfigPredicate::Any(predicates) => predicates.iter().any(|p| p.evaluate(config)),
            ConfigPredicate::Not(inner) => !inner.evaluate(config),
        }
    }

    /// Option keys this predicate reads, in evaluation order, without duplicates
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match self {
            ConfigPredicate::Always => {}
            ConfigPredicate::Flag(key)
            | ConfigPredicate::IntOption { key, .. }
            | ConfigPredicate::NonEmpty(key) => {
                if !keys.contains(&key.as_str()) {
                    keys.push(key.as_str());
                }
            }
            ConfigPredicate::All(predicates) | ConfigPredicate::Any(predicates) => {
                for p in predicates {
                    p.collect_keys(keys);
                }
            }
            ConfigPredicate::Not(inner) => inner.collect_keys(keys),
        }
    }
}

impl fmt::Display for ConfigPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[ConfigPredicate], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", sep)?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, ")")
        }

        match self {
            ConfigPredicate::Always => write!(f, "always"),
            ConfigPredicate::Flag(key) => write!(f, "{}", key),
            ConfigPredicate::IntOption { key, default, test } => {
                write!(f, "int({}, default {}) {}", key, default, test)
            }
            ConfigPredicate::NonEmpty(key) => write!(f, "non_empty({})", key),
            ConfigPredicate::All(items) if items.is_empty() => write!(f, "always"),
            ConfigPredicate::All(items) => join(f, items, "&&"),
            ConfigPredicate::Any(items) if items.is_empty() => write!(f, "never"),
            ConfigPredicate::Any(items) => join(f, items, "||"),
            ConfigPredicate::Not(inner) => write!(f, "!{}", inner),
        }
    }
}
