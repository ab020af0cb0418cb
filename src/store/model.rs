//! Product entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    /// Primary key, assigned by the store.
    pub id: i64,
    pub name: String,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Product::new(1, "A")).unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "name": "A" }));
    }
}
