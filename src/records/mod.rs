//! Record management: the create, edit and delete operations around the
//! engine, each run as one transaction with its permission and capacity
//! checks inside.

pub mod users;
pub mod limits;
pub mod projects;
pub mod tasks;
pub mod subtasks;
pub mod dailies;
