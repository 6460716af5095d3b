use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::feature_gate::{self, ConfigPredicate};
use crate::plugin_system::error::RoutingError;
use crate::plugin_system::traits::FeatureModule;
use crate::storage::ConfigSource;

/// Static pairing of a gate predicate with the module it guards
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    predicate: ConfigPredicate,
    module: Arc<dyn FeatureModule>,
}

impl ModuleDescriptor {
    /// Descriptor named after the module itself
    pub fn new(predicate: ConfigPredicate, module: Arc<dyn FeatureModule>) -> Self {
        let name = module.name().to_string();
        Self {
            name,
            predicate,
            module,
        }
    }

    /// Descriptor with a diagnostic name that differs from the module's own
    pub fn named(name: impl Into<String>, predicate: ConfigPredicate, module: Arc<dyn FeatureModule>) -> Self {
        Self {
            name: name.into(),
            predicate,
            module,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &ConfigPredicate {
        &self.predicate
    }

    pub fn module(&self) -> &Arc<dyn FeatureModule> {
        &self.module
    }

    pub fn should_activate(&self, config: &dyn ConfigSource) -> bool {
        feature_gate::should_activate(&self.predicate, config)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("predicate", &self.predicate)
            .finish_non_exhaustive()
    }
}

/// Which identity-keyed bucket a lookup landed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    /// A routed identity, named by its declared key
    Identity(String),
    /// No route matched; the fallback bucket applies
    Default,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Identity(key) => write!(f, "{}", key),
            Bucket::Default => write!(f, "default"),
        }
    }
}

/// Result of [`RoutingTable::lookup`]
#[derive(Debug, Clone)]
pub struct Route<'a> {
    pub bucket: Bucket,
    pub modules: &'a [ModuleDescriptor],
}

/// Identity key → ordered module list, plus the `always` list and the default
/// bucket for unmatched identities.
///
/// A key matches a route when it equals the routed class name, or when its
/// simple class name (the part after the last `.`) equals the route's simple
/// name. `VolumeDialogPlugin` and `miui.systemui.volume.VolumeDialogPlugin`
/// therefore land in the same bucket. Simple names shared by two routes are
/// ambiguous and only match exactly.
///
/// Built once at startup and never mutated afterwards, so it can be shared as
/// `Arc<RoutingTable>` across concurrent dispatch passes without locking.
#[derive(Debug)]
pub struct RoutingTable {
    always: Vec<ModuleDescriptor>,
    routes: HashMap<String, Vec<ModuleDescriptor>>,
    /// Route keys in declaration order
    order: Vec<String>,
    /// Unambiguous simple class name → route key
    simple_names: HashMap<String, String>,
    fallback: Vec<ModuleDescriptor>,
}

/// Class name without its package prefix
pub fn simple_class_name(identity_key: &str) -> &str {
    identity_key.rsplit('.').next().unwrap_or(identity_key)
}

impl RoutingTable {
    pub fn builder() -> RoutingTableBuilder {
        RoutingTableBuilder::default()
    }

    /// Modules run for every plugin load, before the identity bucket
    pub fn always(&self) -> &[ModuleDescriptor] {
        &self.always
    }

    /// Route for `identity_key`; anything unrouted (including the empty key)
    /// gets the default bucket. The bucket names the declared route key.
    pub fn lookup(&self, identity_key: &str) -> Route<'_> {
        match self.resolve(identity_key) {
            Some((key, modules)) => Route {
                bucket: Bucket::Identity(key.to_string()),
                modules,
            },
            None => Route {
                bucket: Bucket::Default,
                modules: &self.fallback,
            },
        }
    }

    fn resolve(&self, identity_key: &str) -> Option<(&str, &[ModuleDescriptor])> {
        if let Some((key, modules)) = self.routes.get_key_value(identity_key) {
            return Some((key.as_str(), modules.as_slice()));
        }
        let key = self.simple_names.get(simple_class_name(identity_key))?;
        self.routes
            .get_key_value(key.as_str())
            .map(|(key, modules)| (key.as_str(), modules.as_slice()))
    }

    pub fn default_bucket(&self) -> &[ModuleDescriptor] {
        &self.fallback
    }

    /// Routed identity keys in declaration order
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn is_routed(&self, identity_key: &str) -> bool {
        self.resolve(identity_key).is_some()
    }

    /// Total number of module descriptors across all buckets
    pub fn module_count(&self) -> usize {
        self.always.len() + self.fallback.len() + self.routes.values().map(Vec::len).sum::<usize>()
    }
}

/// Collects buckets and validates them into a [`RoutingTable`]
#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    always: Vec<ModuleDescriptor>,
    routes: Vec<(String, Vec<ModuleDescriptor>)>,
    fallback: Vec<ModuleDescriptor>,
}

impl RoutingTableBuilder {
    pub fn always(mut self, descriptor: ModuleDescriptor) -> Self {
        self.always.push(descriptor);
        self
    }

    /// Declare the bucket for one identity key
    pub fn route(
        mut self,
        identity_key: impl Into<String>,
        modules: impl IntoIterator<Item = ModuleDescriptor>,
    ) -> Self {
        self.routes.push((identity_key.into(), modules.into_iter().collect()));
        self
    }

    /// Append to the default bucket
    pub fn fallback(mut self, descriptor: ModuleDescriptor) -> Self {
        self.fallback.push(descriptor);
        self
    }

    pub fn build(self) -> Result<RoutingTable, RoutingError> {
        check_unique_modules("always", &self.always)?;
        check_unique_modules("default", &self.fallback)?;

        let mut routes = HashMap::with_capacity(self.routes.len());
        let mut order = Vec::with_capacity(self.routes.len());
        for (key, modules) in self.routes {
            if key.is_empty() {
                return Err(RoutingError::EmptyIdentity);
            }
            if routes.contains_key(&key) {
                return Err(RoutingError::DuplicateIdentity { key });
            }
            check_unique_modules(&key, &modules)?;
            order.push(key.clone());
            routes.insert(key, modules);
        }

        let simple_names = index_simple_names(&order);

        Ok(RoutingTable {
            always: self.always,
            routes,
            order,
            simple_names,
            fallback: self.fallback,
        })
    }
}

fn index_simple_names(keys: &[String]) -> HashMap<String, String> {
    let mut index: HashMap<String, Option<String>> = HashMap::new();
    for key in keys {
        let simple = simple_class_name(key);
        if simple.is_empty() {
            continue;
        }
        index
            .entry(simple.to_string())
            .and_modify(|slot| *slot = None)
            .or_insert_with(|| Some(key.clone()));
    }
    index
        .into_iter()
        .filter_map(|(simple, key)| key.map(|key| (simple, key)))
        .collect()
}

fn check_unique_modules(bucket: &str, modules: &[ModuleDescriptor]) -> Result<(), RoutingError> {
    let mut seen = HashSet::new();
    for descriptor in modules {
        if !seen.insert(descriptor.name()) {
            return Err(RoutingError::DuplicateModule {
                bucket: bucket.to_string(),
                module: descriptor.name().to_string(),
            });
        }
    }
    Ok(())
}
