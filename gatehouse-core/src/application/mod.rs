//! The account and admin flows: shape validation, collaborator sequencing
//! and the outcome each form submission produces.

pub mod accounts;
pub mod admin;
pub mod bootstrap;
pub mod forms;
pub mod outcome;

pub use accounts::AccountFlow;
pub use admin::AdminFlow;
pub use bootstrap::BootstrapService;
pub use forms::{
    AssignRoleInput, CreateRoleInput, CreateUserInput, FieldError, LoginInput, RegisterInput,
};
pub use outcome::{AssignRoleChoices, Directory, FlowOutcome, Notice, SessionChange};
