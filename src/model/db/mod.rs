//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs are serialised as MongoDB `ObjectId`s.
//! - Field names are PascalCase, matching the documents of existing deployments.

mod group;
pub use group::{Group, GroupCore, NewGroup};

mod poll;
pub use poll::{NewPoll, Poll, PollCore, Question};

mod user;
pub use user::{NewUser, User, UserCore};
