use crate::query::Dimension;
use crate::source::record::LogRecord;

/// Group-key shape for one query, fixed once at construction.
///
/// The requested dimension list maps onto one of four shapes; per-record
/// projection is then a plain match with no runtime list walking. Dimension
/// order is preserved because it decides the output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    User,
    App,
    UserApp,
    AppUser,
}

impl GroupBy {
    /// Select the shape for a validated, duplicate-free dimension list.
    pub fn from_dimensions(dimensions: &[Dimension]) -> Self {
        match dimensions {
            [Dimension::User] => GroupBy::User,
            [Dimension::App] => GroupBy::App,
            [Dimension::User, Dimension::App] => GroupBy::UserApp,
            [Dimension::App, Dimension::User] => GroupBy::AppUser,
            other => unreachable!("invalid dimension list {:?} passed validation", other),
        }
    }

    /// Project a record onto this query's group key.
    pub fn project(&self, record: &LogRecord) -> GroupKey {
        match self {
            GroupBy::User => GroupKey::User(record.user.clone()),
            GroupBy::App => GroupKey::App(record.app.clone()),
            GroupBy::UserApp => GroupKey::UserApp(record.user.clone(), record.app.clone()),
            GroupBy::AppUser => GroupKey::AppUser(record.app.clone(), record.user.clone()),
        }
    }

    /// Output column names, in dimension order.
    pub fn column_names(&self) -> &'static [&'static str] {
        match self {
            GroupBy::User => &["user"],
            GroupBy::App => &["app"],
            GroupBy::UserApp => &["user", "app"],
            GroupBy::AppUser => &["app", "user"],
        }
    }
}

/// Ordered tuple of the dimension values selected by the query. Ordering is
/// structural, so sorting aggregate keys yields lexicographic output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    User(String),
    App(String),
    UserApp(String, String),
    AppUser(String, String),
}

impl GroupKey {
    /// Component values in output column order.
    pub fn components(&self) -> Vec<&str> {
        match self {
            GroupKey::User(u) => vec![u],
            GroupKey::App(a) => vec![a],
            GroupKey::UserApp(u, a) => vec![u, a],
            GroupKey::AppUser(a, u) => vec![a, u],
        }
    }
}
