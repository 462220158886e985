use std::sync::{Arc, RwLock};

use chrono::Utc;
use log::{debug, info};
use uuid::Uuid;

use super::{CredentialProfile, Credentials, CredentialsServiceTrait, NewProfile};
use crate::constants::{
    APP_KEY_KEY, APP_SECRET_KEY, DEFAULT_PROXY_URL, PROFILES_KEY, PROXY_URL_KEY, USE_PROXY_KEY,
};
use crate::errors::{Error, Result, StorageError, ValidationError};
use crate::settings::{read_json, write_json, SettingsStore};

pub struct CredentialsService {
    store: Arc<dyn SettingsStore>,
    active: RwLock<Credentials>,
}

impl CredentialsService {
    /// Create the service, loading the active credentials from `store`.
    pub fn new(store: Arc<dyn SettingsStore>) -> Result<Self> {
        let active = load_credentials(store.as_ref())?;
        Ok(Self {
            store,
            active: RwLock::new(active),
        })
    }

    fn set_active(&self, credentials: Credentials) -> Result<()> {
        let mut guard = self
            .active
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        *guard = credentials;
        Ok(())
    }

    fn persist(&self, credentials: &Credentials) -> Result<()> {
        self.store.set(APP_KEY_KEY, &credentials.app_key)?;
        self.store.set(APP_SECRET_KEY, &credentials.app_secret)?;
        self.store
            .set(USE_PROXY_KEY, &credentials.use_proxy.to_string())?;
        self.store.set(PROXY_URL_KEY, &credentials.proxy_url)?;
        Ok(())
    }

    fn load_profiles(&self) -> Result<Vec<CredentialProfile>> {
        Ok(read_json(self.store.as_ref(), PROFILES_KEY)?.unwrap_or_default())
    }
}

impl CredentialsServiceTrait for CredentialsService {
    fn active(&self) -> Credentials {
        match self.active.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, credentials: Credentials) -> Result<Credentials> {
        let credentials = credentials.trimmed();
        self.persist(&credentials)?;
        self.set_active(credentials.clone())?;
        debug!(
            "[Credentials] Saved active credentials (proxy: {})",
            credentials.use_proxy
        );
        Ok(credentials)
    }

    fn enable_proxy(&self) -> Result<Credentials> {
        let mut guard = self
            .active
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        guard.use_proxy = true;
        self.store.set(USE_PROXY_KEY, "true")?;
        info!("[Credentials] Proxy tunnel enabled for active credentials");
        Ok(guard.clone())
    }

    fn reload(&self) -> Result<Credentials> {
        let credentials = load_credentials(self.store.as_ref())?;
        self.set_active(credentials.clone())?;
        Ok(credentials)
    }

    fn list_profiles(&self) -> Result<Vec<CredentialProfile>> {
        self.load_profiles()
    }

    fn create_profile(&self, new_profile: NewProfile) -> Result<CredentialProfile> {
        let name = new_profile.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }

        let credentials = new_profile
            .credentials
            .unwrap_or_else(|| self.active())
            .trimmed();
        if credentials.app_key.is_empty() {
            return Err(ValidationError::MissingField("appKey".to_string()).into());
        }
        if credentials.app_secret.is_empty() {
            return Err(ValidationError::MissingField("appSecret".to_string()).into());
        }

        let profile = CredentialProfile {
            id: Uuid::new_v4().simple().to_string(),
            name,
            created_at: Utc::now(),
            credentials,
        };

        let mut profiles = self.load_profiles()?;
        profiles.push(profile.clone());
        write_json(self.store.as_ref(), PROFILES_KEY, &profiles)?;

        info!("[Credentials] Created profile '{}'", profile.name);
        Ok(profile)
    }

    fn select_profile(&self, profile_id: &str) -> Result<Credentials> {
        let profile = self
            .load_profiles()?
            .into_iter()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| Error::ProfileNotFound(profile_id.to_string()))?;

        info!("[Credentials] Selected profile '{}'", profile.name);
        self.save(profile.credentials)
    }

    fn delete_profile(&self, profile_id: &str) -> Result<()> {
        let mut profiles = self.load_profiles()?;
        let before = profiles.len();
        profiles.retain(|p| p.id != profile_id);
        if profiles.len() == before {
            return Err(Error::ProfileNotFound(profile_id.to_string()));
        }
        write_json(self.store.as_ref(), PROFILES_KEY, &profiles)
    }
}

/// Builds the active credentials from their individual persisted keys.
///
/// A missing proxy flag means "on"; a missing or blank proxy URL falls back
/// to the default tunnel.
fn load_credentials(store: &dyn SettingsStore) -> Result<Credentials> {
    let app_key = store.get(APP_KEY_KEY)?.unwrap_or_default();
    let app_secret = store.get(APP_SECRET_KEY)?.unwrap_or_default();
    let use_proxy = match store.get(USE_PROXY_KEY)? {
        None => true,
        Some(flag) => flag.trim() == "true",
    };
    let proxy_url = store
        .get(PROXY_URL_KEY)?
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());

    Ok(Credentials {
        app_key,
        app_secret,
        use_proxy,
        proxy_url,
    })
}
