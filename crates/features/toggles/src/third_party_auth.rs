//! Switches for third-party (SSO) authentication.

use crate::switch::{Switch, SwitchMetadata, SwitchNamespace, UseCase};

pub const NAMESPACE: SwitchNamespace = SwitchNamespace::new("third_party_auth", "ThirdPartyAuth: ");

/// Lets a learner arriving over SAML, already linked to the enterprise
/// customer of the same IdP, skip the password prompt when associating
/// further SSO accounts.
pub static ENABLE_MULTIPLE_SSO_ACCOUNTS_ASSOCIATION_TO_SAML_USER: Switch = Switch::new(
    NAMESPACE,
    "enable_multiple_sso_accounts_association_to_saml_user",
    module_path!(),
    SwitchMetadata {
        description: "If enabled than learner should not be prompted for their edX password \
                      arriving via SAML and already linked to the enterprise customer linked to \
                      the same IdP.",
        default: false,
        use_cases: &[UseCase::Temporary],
        creation_date: "2021-01-29",
        target_removal_date: Some("2021-04-31"),
        tickets: &["ENT-4034"],
    },
);

/// Every switch declared in this namespace.
pub static SWITCHES: &[&Switch] = &[&ENABLE_MULTIPLE_SSO_ACCOUNTS_ASSOCIATION_TO_SAML_USER];
