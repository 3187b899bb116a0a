// Action registry: rename rules, schema validation and final name mapping

use crate::protocol::ToolSchema;
use crate::tools::adapter;
use indexmap::IndexMap;
use solana_mcp_core::{ActionDescriptor, Catalog, SchemaAdaptationError};
use std::sync::Arc;

/// Advertised name of the Orca single-sided whirlpool action before and
/// after shortening.
pub const ORCA_WHIRLPOOL_ACTION: &str = "CREATE_ORCA_SINGLE_SIDED_LIQUIDITY_WHIRLPOOL";
pub const ORCA_WHIRLPOOL_SHORT_NAME: &str = "CREATE_ORCA_WHIRLPOOL";

/// Which action names a rename rule applies to.
#[derive(Clone)]
pub enum NameMatcher {
    Exact(String),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NameMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == name,
            Self::Predicate(predicate) => predicate(name),
        }
    }
}

impl std::fmt::Debug for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Advertise actions matching `matcher` as `new_name`.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pub matcher: NameMatcher,
    pub new_name: String,
}

impl RenameRule {
    pub fn exact(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            matcher: NameMatcher::Exact(name.into()),
            new_name: new_name.into(),
        }
    }

    pub fn matching<F>(predicate: F, new_name: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: NameMatcher::Predicate(Arc::new(predicate)),
            new_name: new_name.into(),
        }
    }
}

/// Rules applied to the default catalog.
pub fn default_rename_rules() -> Vec<RenameRule> {
    vec![RenameRule::exact(
        ORCA_WHIRLPOOL_ACTION,
        ORCA_WHIRLPOOL_SHORT_NAME,
    )]
}

/// An action accepted into the registry, with its advertised schema.
#[derive(Debug, Clone)]
pub struct RegisteredAction {
    pub action: ActionDescriptor,
    pub input_schema: serde_json::Value,
}

impl RegisteredAction {
    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.action.name.clone(),
            description: self.action.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// Final registry: advertised name to action. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    actions: IndexMap<String, RegisteredAction>,
}

impl Registry {
    /// Get an action by advertised name
    pub fn get(&self, name: &str) -> Option<&RegisteredAction> {
        self.actions.get(name)
    }

    /// Check if an action exists
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// List all tool schemas, in registration order
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.actions.values().map(RegisteredAction::schema).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// An action left out of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAction {
    pub catalog_key: String,
    pub error: SchemaAdaptationError,
}

/// What happened while building the registry.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub skipped: Vec<SkippedAction>,
    /// `(catalog key, original name, new name)`
    pub renamed: Vec<(String, String, String)>,
    /// Final names written more than once; the last catalog entry won.
    pub overwritten: Vec<String>,
}

/// Builds the final registry from a raw catalog.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    rules: Vec<RenameRule>,
}

impl RegistryBuilder {
    pub fn new(rules: Vec<RenameRule>) -> Self {
        Self { rules }
    }

    /// Build the registry.
    ///
    /// Per catalog entry, in order: the first matching rename rule is
    /// applied, a non-empty schema is adapted (failures skip the action and
    /// are reported), and the action is inserted by final name with later
    /// entries replacing earlier ones. Never fails as a whole.
    pub fn build(&self, catalog: &Catalog) -> (Registry, BuildReport) {
        let mut actions = IndexMap::with_capacity(catalog.len());
        let mut report = BuildReport::default();

        for (key, descriptor) in catalog.iter() {
            let action = match self.rename(descriptor) {
                Some(renamed) => {
                    tracing::debug!(
                        catalog_key = key,
                        from = %descriptor.name,
                        to = %renamed.name,
                        "Renamed action"
                    );
                    report.renamed.push((
                        key.to_string(),
                        descriptor.name.clone(),
                        renamed.name.clone(),
                    ));
                    renamed
                }
                None => descriptor.clone(),
            };

            let registered = match Self::validate(action) {
                Ok(registered) => registered,
                Err(error) => {
                    tracing::warn!(
                        catalog_key = key,
                        field = %error.field,
                        "Skipping action {}: {}",
                        key,
                        error
                    );
                    report.skipped.push(SkippedAction {
                        catalog_key: key.to_string(),
                        error,
                    });
                    continue;
                }
            };

            let name = registered.action.name.clone();
            if actions.insert(name.clone(), registered).is_some() {
                tracing::debug!(name = %name, catalog_key = key, "Replaced earlier action");
                report.overwritten.push(name);
            }
        }

        tracing::info!(
            registered = actions.len(),
            skipped = report.skipped.len(),
            "Built action registry"
        );

        (Registry { actions }, report)
    }

    /// Renamed copy of `descriptor`, if a rule applies and changes its name.
    fn rename(&self, descriptor: &ActionDescriptor) -> Option<ActionDescriptor> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&descriptor.name))
            .filter(|rule| rule.new_name != descriptor.name)
            .map(|rule| descriptor.with_name(rule.new_name.clone()))
    }

    fn validate(action: ActionDescriptor) -> Result<RegisteredAction, SchemaAdaptationError> {
        let input_schema = adapter::adapt(&action.input_schema)?;
        Ok(RegisteredAction {
            action,
            input_schema,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(default_rename_rules())
    }
}

/// Build with the default rename rules.
pub fn build_registry(catalog: &Catalog) -> (Registry, BuildReport) {
    RegistryBuilder::default().build(catalog)
}
