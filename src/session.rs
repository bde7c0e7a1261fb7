//! Which storage target the debug session is looking at.
//!
//! There is exactly one session per server. It is shared by every connection
//! and only changed by `getTableList`, so two clients browsing different
//! databases at the same time will see each other's selection. The dispatcher
//! keeps it behind a single mutex and holds that lock for a whole operation.

use std::fmt;

use crate::storage::Database;

pub enum Target {
    /// Nothing selected yet.
    Closed,
    /// A database file is open.
    Relational {
        name: String,
        database: Box<dyn Database>,
    },
    /// The preference stores are selected; no database is open.
    Preferences,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Closed => f.write_str("Closed"),
            Target::Relational { name, .. } => f.debug_tuple("Relational").field(name).finish(),
            Target::Preferences => f.write_str("Preferences"),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    target: Target,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            target: Target::Closed,
        }
    }

    #[cfg(test)]
    pub(crate) fn target(&self) -> &Target {
        &self.target
    }

    /// Switch to a freshly opened database; the previous one is closed.
    pub fn open_relational(&mut self, name: String, database: Box<dyn Database>) {
        self.target = Target::Relational { name, database };
    }

    /// Switch to the preference stores, closing any open database.
    pub fn select_preferences(&mut self) {
        self.target = Target::Preferences;
    }

    /// Name of the selected database file, if any.
    pub fn selected_target(&self) -> Option<&str> {
        match &self.target {
            Target::Relational { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn database(&self) -> Option<&dyn Database> {
        match &self.target {
            Target::Relational { database, .. } => Some(database.as_ref()),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        self.database().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteDatabase;

    fn memory_db() -> Box<dyn Database> {
        Box::new(SqliteDatabase::new(rusqlite::Connection::open_in_memory().unwrap()))
    }

    #[test]
    fn starts_closed() {
        let session = Session::new();
        assert!(matches!(session.target(), Target::Closed));
        assert!(!session.is_open());
        assert_eq!(session.selected_target(), None);
    }

    #[test]
    fn transitions_follow_the_last_selection() {
        let mut session = Session::new();
        session.open_relational("a.db".into(), memory_db());
        assert!(session.is_open());
        assert_eq!(session.selected_target(), Some("a.db"));

        session.select_preferences();
        assert!(matches!(session.target(), Target::Preferences));
        assert!(!session.is_open());
        assert_eq!(session.selected_target(), None);

        session.open_relational("b.db".into(), memory_db());
        assert_eq!(session.selected_target(), Some("b.db"));
        assert_eq!(format!("{:?}", session.target()), "Relational(\"b.db\")");
    }
}
