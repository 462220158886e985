use super::{CredentialProfile, Credentials, NewProfile};
use crate::errors::Result;

/// Owner of the active credential set and the saved profiles.
pub trait CredentialsServiceTrait: Send + Sync {
    /// Snapshot of the active credentials.
    fn active(&self) -> Credentials;

    /// Replace the active credentials (trimmed) and persist them.
    fn save(&self, credentials: Credentials) -> Result<Credentials>;

    /// Turn the proxy on for the active credentials and persist the flag.
    /// Returns the updated credentials.
    fn enable_proxy(&self) -> Result<Credentials>;

    /// Re-read the active credentials from the store.
    fn reload(&self) -> Result<Credentials>;

    fn list_profiles(&self) -> Result<Vec<CredentialProfile>>;

    fn create_profile(&self, new_profile: NewProfile) -> Result<CredentialProfile>;

    /// Make the profile's credentials the active set.
    fn select_profile(&self, profile_id: &str) -> Result<Credentials>;

    fn delete_profile(&self, profile_id: &str) -> Result<()>;
}
