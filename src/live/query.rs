use serde_json::Value;

/// The document collections the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Transactions,
    Budgets,
    Goals,
    Categories,
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Budgets => "budgets",
            Self::Goals => "goals",
            Self::Categories => "categories",
            Self::Settings => "settings",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "transactions" => Some(Self::Transactions),
            "budgets" => Some(Self::Budgets),
            "goals" => Some(Self::Goals),
            "categories" => Some(Self::Categories),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }
}

/// An equality predicate on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBy {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
}

/// A declarative live query: collection, equality predicates, sort order.
/// Results are always scoped to the subscribing user on top of this.
#[derive(Debug, Clone)]
pub struct LiveQuery {
    pub collection: Collection,
    pub filters: Vec<FieldFilter>,
    pub order: OrderBy,
}

impl LiveQuery {
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order: OrderBy::default(),
        }
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    /// Stable identity of the logical query, used to deduplicate
    /// subscriptions. Two queries with the same key race for the same
    /// slot; the newer one wins.
    pub fn key(&self) -> QueryKey {
        let mut parts: Vec<String> = self
            .filters
            .iter()
            .map(|f| format!("{}={}", f.field, f.value))
            .collect();
        parts.sort();
        QueryKey(format!(
            "{}?{}#{:?}",
            self.collection.as_str(),
            parts.join("&"),
            self.order
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Namespace the key under a subscriber scope (the auth session), so
    /// identical queries from different clients do not collide.
    pub fn scoped(self, scope: &str) -> Self {
        QueryKey(format!("{}:{}", scope, self.0))
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_key_ignores_filter_order() {
        let a = LiveQuery::collection(Collection::Transactions)
            .filter("category", "food")
            .filter("type", "expense");
        let b = LiveQuery::collection(Collection::Transactions)
            .filter("type", "expense")
            .filter("category", "food");
        assert_eq!(a.key(), b.key());

        let c = LiveQuery::collection(Collection::Budgets);
        assert_ne!(a.key(), c.key());
    }
}
