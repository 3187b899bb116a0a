pub mod adapter;
mod registry;

pub use adapter::adapt;
pub use registry::{
    build_registry, default_rename_rules, BuildReport, NameMatcher, RegisteredAction, Registry,
    RegistryBuilder, RenameRule, SkippedAction, ORCA_WHIRLPOOL_ACTION, ORCA_WHIRLPOOL_SHORT_NAME,
};
