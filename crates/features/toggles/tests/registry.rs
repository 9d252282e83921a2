use campus_domain::config::TogglesConfig;
use campus_toggles::third_party_auth::{
    ENABLE_MULTIPLE_SSO_ACCOUNTS_ASSOCIATION_TO_SAML_USER as SSO, NAMESPACE,
};
use campus_toggles::{SwitchRegistry, ToggleError, Toggles, UseCase, init, install};
use serial_test::serial;

const SSO_NAME: &str = "third_party_auth.enable_multiple_sso_accounts_association_to_saml_user";

#[test]
fn sso_switch_is_declared_as_annotated() {
    assert_eq!(SSO.full_name(), SSO_NAME);
    assert_eq!(SSO.namespace, NAMESPACE);
    assert_eq!(NAMESPACE.log_prefix, "ThirdPartyAuth: ");
    assert!(!SSO.metadata.default);
    assert_eq!(SSO.metadata.use_cases, &[UseCase::Temporary]);
    assert_eq!(SSO.metadata.creation_date, "2021-01-29");
    assert_eq!(SSO.metadata.target_removal_date, Some("2021-04-31"));
    assert_eq!(SSO.metadata.tickets, &["ENT-4034"]);
    assert!(SSO.metadata.description.starts_with("If enabled than learner should not be prompted"));
    assert!(SSO.metadata.description.ends_with("linked to the same IdP."));
}

#[test]
fn install_registers_defaults_off() {
    let registry = SwitchRegistry::new();
    install(&registry, &TogglesConfig::default()).unwrap();

    assert!(!registry.is_enabled(SSO_NAME));
    let rows = registry.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, SSO_NAME);
}

#[test]
fn install_applies_overrides() {
    let registry = SwitchRegistry::new();
    let mut config = TogglesConfig::default();
    config.overrides.insert(SSO_NAME.to_owned(), true);

    install(&registry, &config).unwrap();
    assert!(registry.is_enabled(SSO_NAME));
}

#[test]
fn install_rejects_unknown_override() {
    let registry = SwitchRegistry::new();
    let mut config = TogglesConfig::default();
    config.overrides.insert("third_party_auth.nope".to_owned(), true);

    let err = install(&registry, &config).unwrap_err();
    assert!(matches!(err, ToggleError::Unknown { .. }));
    assert!(err.to_string().contains("toggles.overrides"));
}

#[test]
fn installing_twice_is_harmless() {
    let registry = SwitchRegistry::new();
    install(&registry, &TogglesConfig::default()).unwrap();
    install(&registry, &TogglesConfig::default()).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
#[serial]
fn global_switch_follows_overrides() {
    let slice = init(&TogglesConfig::default()).unwrap();
    let toggles = slice.downcast_ref::<Toggles>().expect("toggles slice");

    assert!(!SSO.is_enabled());
    toggles.registry.set_override(SSO_NAME, true).unwrap();
    assert!(SSO.is_enabled());
    toggles.registry.clear_override(SSO_NAME).unwrap();
    assert!(!SSO.is_enabled());
}
