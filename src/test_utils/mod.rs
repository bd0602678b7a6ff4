#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Date;

use crate::{
    category::Category,
    db::initialize,
    expense::Expense,
    money::Cents,
    password::PasswordHash,
    stores::sqlite::SQLiteExpenseStore,
    user::{UserID, create_user},
};

/// An in-memory database with two registered users.
pub(crate) struct TestDb {
    pub store: SQLiteExpenseStore,
    pub alice: UserID,
    pub bob: UserID,
}

impl TestDb {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let alice = create_user("alice", PasswordHash::new_unchecked("hunter2"), &conn)
            .unwrap()
            .id;
        let bob = create_user("bob", PasswordHash::new_unchecked("hunter3"), &conn)
            .unwrap()
            .id;

        Self {
            store: SQLiteExpenseStore::new(Arc::new(Mutex::new(conn))),
            alice,
            bob,
        }
    }
}

/// An unsaved expense, skipping validation.
pub(crate) fn expense(
    user_id: UserID,
    date: Date,
    category: Category,
    cents: i64,
    description: &str,
) -> Expense {
    Expense {
        id: None,
        user_id,
        date,
        category,
        amount: Cents::new(cents),
        description: description.to_owned(),
    }
}
