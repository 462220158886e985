use std::sync::Arc;

use crate::constants::{
    APP_KEY_KEY, APP_SECRET_KEY, DEFAULT_PROXY_URL, PROFILES_KEY, PROXY_URL_KEY, USE_PROXY_KEY,
};
use crate::credentials::{Credentials, CredentialsService, CredentialsServiceTrait, NewProfile};
use crate::errors::{Error, ValidationError};
use crate::settings::{InMemorySettingsStore, SettingsStore};

fn service_with_store() -> (CredentialsService, Arc<InMemorySettingsStore>) {
    let store = Arc::new(InMemorySettingsStore::new());
    let service = CredentialsService::new(store.clone()).unwrap();
    (service, store)
}

#[test]
fn empty_store_yields_defaults() {
    let (service, _) = service_with_store();
    let active = service.active();
    assert_eq!(active.app_key, "");
    assert!(active.use_proxy);
    assert_eq!(active.proxy_url, DEFAULT_PROXY_URL);
}

#[test]
fn loads_persisted_fields() {
    let store = Arc::new(InMemorySettingsStore::new());
    store.set(APP_KEY_KEY, "123").unwrap();
    store.set(APP_SECRET_KEY, "abc").unwrap();
    store.set(USE_PROXY_KEY, "false").unwrap();
    store.set(PROXY_URL_KEY, "").unwrap();

    let service = CredentialsService::new(store).unwrap();
    let active = service.active();
    assert_eq!(active.app_key, "123");
    assert_eq!(active.app_secret, "abc");
    assert!(!active.use_proxy);
    assert_eq!(active.proxy_url, DEFAULT_PROXY_URL);
}

#[test]
fn save_trims_and_persists() {
    let (service, store) = service_with_store();
    let saved = service
        .save(Credentials::new("  key ", " secret\n").with_proxy(false, "https://p.example/"))
        .unwrap();

    assert_eq!(saved.app_key, "key");
    assert_eq!(store.get(APP_KEY_KEY).unwrap().as_deref(), Some("key"));
    assert_eq!(store.get(APP_SECRET_KEY).unwrap().as_deref(), Some("secret"));
    assert_eq!(store.get(USE_PROXY_KEY).unwrap().as_deref(), Some("false"));
    assert_eq!(
        store.get(PROXY_URL_KEY).unwrap().as_deref(),
        Some("https://p.example/")
    );
    assert_eq!(service.active(), saved);
}

#[test]
fn enable_proxy_updates_memory_and_store() {
    let (service, store) = service_with_store();
    service
        .save(Credentials::new("key", "secret").with_proxy(false, "https://p.example"))
        .unwrap();

    let updated = service.enable_proxy().unwrap();
    assert!(updated.use_proxy);
    assert!(service.active().use_proxy);
    assert_eq!(store.get(USE_PROXY_KEY).unwrap().as_deref(), Some("true"));
    assert_eq!(service.reload().unwrap(), updated);
}

#[test]
fn create_profile_captures_active_credentials() {
    let (service, store) = service_with_store();
    service.save(Credentials::new("key", "secret")).unwrap();

    let profile = service
        .create_profile(NewProfile {
            name: " Matriz ".into(),
            credentials: None,
        })
        .unwrap();

    assert_eq!(profile.name, "Matriz");
    assert_eq!(profile.credentials.app_key, "key");
    assert!(!profile.id.is_empty());
    assert!(store.get(PROFILES_KEY).unwrap().is_some());
    assert_eq!(service.list_profiles().unwrap(), vec![profile]);
}

#[test]
fn create_profile_rejects_missing_fields() {
    let (service, _) = service_with_store();

    let err = service
        .create_profile(NewProfile {
            name: "".into(),
            credentials: Some(Credentials::new("k", "s")),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(ref f)) if f == "name"
    ));

    let err = service
        .create_profile(NewProfile {
            name: "Filial".into(),
            credentials: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(ref f)) if f == "appKey"
    ));
}

#[test]
fn select_profile_replaces_active_credentials() {
    let (service, store) = service_with_store();
    let profile = service
        .create_profile(NewProfile {
            name: "Filial".into(),
            credentials: Some(Credentials::new("k2", "s2").with_proxy(false, "")),
        })
        .unwrap();

    let active = service.select_profile(&profile.id).unwrap();
    assert_eq!(active.app_key, "k2");
    assert!(!active.use_proxy);
    assert_eq!(store.get(APP_KEY_KEY).unwrap().as_deref(), Some("k2"));
}

#[test]
fn delete_profile_removes_only_that_profile() {
    let (service, _) = service_with_store();
    let first = service
        .create_profile(NewProfile {
            name: "A".into(),
            credentials: Some(Credentials::new("k1", "s1")),
        })
        .unwrap();
    let second = service
        .create_profile(NewProfile {
            name: "B".into(),
            credentials: Some(Credentials::new("k2", "s2")),
        })
        .unwrap();

    service.delete_profile(&first.id).unwrap();
    assert_eq!(service.list_profiles().unwrap(), vec![second]);

    let err = service.delete_profile(&first.id).unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(_)));
}

#[test]
fn select_unknown_profile_fails() {
    let (service, _) = service_with_store();
    let err = service.select_profile("missing").unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(ref id) if id == "missing"));
}
