//! The identity subsystem: the credential store and session authenticator
//! collaborators, plus their default implementations.

pub mod crypto;
pub mod manager;
pub mod model;
pub mod outcome;
pub mod policy;
pub mod repository;
pub mod session;
pub mod store;

pub use crypto::{AuthCrypto, AuthCryptoError};
pub use manager::IdentityManager;
pub use model::{Role, User, UserRoles, is_valid_email, normalize};
pub use outcome::{FailureCode, IdentityFailure, IdentityResult};
pub use policy::PasswordPolicy;
pub use repository::IdentityRepository;
pub use session::{
    SessionAuthenticator, SessionConfig, SessionManager, SessionTicket, SignInResult,
};
pub use store::CredentialStore;

#[cfg(any(test, feature = "test-utils"))]
pub use {session::MockSessionAuthenticator, store::MockCredentialStore};
