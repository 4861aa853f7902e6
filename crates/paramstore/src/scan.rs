//! Field binding discovery.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::group::{FieldBinding, ParamsGroup};

/// How fields without a binding are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingPolicy {
    /// Every field must be bound; an unbound field fails the load.
    #[default]
    Strict,
    /// Unbound fields are skipped: never retrieved, never assigned.
    Permissive,
}

impl BindingPolicy {
    /// Returns the policy name as used in configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }
}

impl std::str::FromStr for BindingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            _ => Err(format!("expected 'strict' or 'permissive', got '{s}'")),
        }
    }
}

/// Returns the bindings the loader will retrieve and assign.
///
/// Bindings are returned in declaration order. Under
/// [`BindingPolicy::Strict`] the first unbound field fails the scan with
/// [`ParamsError::MissingBinding`]; under [`BindingPolicy::Permissive`]
/// unbound fields are left out.
pub fn scan_bindings(
    group: &dyn ParamsGroup,
    binding_key: &str,
    policy: BindingPolicy,
) -> Result<Vec<FieldBinding>, ParamsError> {
    let bindings = group.field_bindings(binding_key);

    match policy {
        BindingPolicy::Strict => {
            if let Some(unbound) = bindings.iter().find(|b| !b.is_bound()) {
                return Err(ParamsError::missing_binding(unbound.field.clone()));
            }
            Ok(bindings)
        }
        BindingPolicy::Permissive => Ok(bindings
            .into_iter()
            .filter(FieldBinding::is_bound)
            .collect()),
    }
}
