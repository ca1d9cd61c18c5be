//! External delivery channels for ledger events.

pub mod email;
