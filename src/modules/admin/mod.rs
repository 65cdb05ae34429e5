//! Administrative accounts: admin login, account management and the role and
//! permission catalogs.
//!
//! Every management operation re-reads the acting account from the database
//! and asks the decision engine in [`everato_auth::policy`] before touching
//! anything. Mutations run in a single transaction that holds a share lock on
//! the actor and an update lock on the target until commit.

pub mod controller;
pub mod router;
pub mod service;
