// Action catalog exposed through the MCP server

pub mod top_pools;

pub use top_pools::TopPoolsAction;

use crate::action::Catalog;
use std::sync::Arc;

/// Catalog served by default.
pub fn catalog() -> Catalog {
    Catalog::new().with(
        top_pools::CATALOG_KEY,
        TopPoolsAction::descriptor(Arc::new(TopPoolsAction::new())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contains_top_pools() {
        let catalog = catalog();
        let action = catalog.get(top_pools::CATALOG_KEY).unwrap();
        assert_eq!(action.name, top_pools::ACTION_NAME);
        assert!(action.input_schema.is_empty());
    }
}
