use sea_orm::sea_query::SimpleExpr;
use sea_orm::{Condition, Value};

/// Which rows an entity-store operation applies to.
///
/// A filter is either a structural match on named columns, one pre-built
/// predicate, or a sequence of predicates. All forms are AND-combined.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// Every row.
    #[default]
    All,
    /// Exact match on each named column. Names are checked against the
    /// entity's columns when the filter is applied.
    Fields(Vec<(String, Value)>),
    /// A single predicate, e.g. an `OR` of two column matches.
    Condition(Condition),
    /// Predicates that must all hold.
    Conditions(Vec<Condition>),
}

impl Filter {
    /// Match rows where `column = value`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Fields(vec![(column.into(), value.into())])
    }

    /// Match rows where every listed `column = value` pair holds.
    pub fn fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Fields(
            pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Self::Condition(condition)
    }
}

impl From<SimpleExpr> for Filter {
    fn from(expr: SimpleExpr) -> Self {
        Self::Condition(Condition::all().add(expr))
    }
}

impl From<Vec<Condition>> for Filter {
    fn from(conditions: Vec<Condition>) -> Self {
        Self::Conditions(conditions)
    }
}
