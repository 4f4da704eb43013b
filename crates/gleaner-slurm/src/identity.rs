//! User identity resolution.
//!
//! A report only tells us the name a user goes by on the reporting
//! cluster. The cluster's configuration declares which namespace that
//! name belongs to; the other namespaces are filled in later by a
//! different ingestion pass with its own source of truth.

use gleaner_core::UserNamespace;
use serde::{Deserialize, Serialize};

/// Known usernames for one user across namespaces.
///
/// Lives in the user-owned partition: scrapes may fill absent fields
/// at insert time but never rewrite present ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Cluster-local account name.
    pub cluster_username: Option<String>,
    /// Institutional email-derived username.
    pub email_username: Option<String>,
    /// External-partner account name.
    pub partner_username: Option<String>,
}

impl UserIdentity {
    /// Resolve the one namespace this scrape is certain about.
    ///
    /// Exactly one field is written; the rest stay None for later
    /// reconciliation. No guessing beyond the declared mapping.
    pub fn resolve(local_username: Option<&str>, namespace: UserNamespace) -> Self {
        let mut identity = Self::default();
        let Some(username) = local_username else {
            return identity;
        };
        let username = Some(username.to_string());
        match namespace {
            UserNamespace::Cluster => identity.cluster_username = username,
            UserNamespace::Email => identity.email_username = username,
            UserNamespace::Partner => identity.partner_username = username,
        }
        identity
    }

    /// Fill absent fields from another identity source.
    ///
    /// A namespace field that already holds a value is never
    /// overwritten, whichever source got there first.
    pub fn merge_from(&mut self, other: &Self) {
        if self.cluster_username.is_none() {
            self.cluster_username = other.cluster_username.clone();
        }
        if self.email_username.is_none() {
            self.email_username = other.email_username.clone();
        }
        if self.partner_username.is_none() {
            self.partner_username = other.partner_username.clone();
        }
    }
}
