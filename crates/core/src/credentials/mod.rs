//! Credentials module - the active key/secret pair and saved profiles.

mod credentials_model;
mod credentials_service;
mod credentials_traits;

#[cfg(test)]
mod credentials_service_tests;

pub use credentials_model::{CredentialProfile, Credentials, NewProfile};
pub use credentials_service::CredentialsService;
pub use credentials_traits::CredentialsServiceTrait;
