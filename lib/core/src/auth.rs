//! Actor and role model shared by all modules.
//!
//! The role set is a closed enumeration — business modules match on
//! concrete roles rather than interpreting permission strings. The
//! binary's JWT middleware builds an [`Actor`] from validated claims and
//! stores it in request extensions; handlers extract it from there.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Closed set of user roles in the garment workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Business owner — full access.
    Owner,
    /// Head of production — creates batches, assigns tasks, confirms results.
    KepalaProduksi,
    /// Cutting worker.
    Pemotong,
    /// Sewing worker.
    Penjahit,
    /// Finishing worker.
    Finishing,
    /// Head of warehouse — verifies incoming deliveries.
    KepalaGudang,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::KepalaProduksi => "KEPALA_PRODUKSI",
            Self::Pemotong => "PEMOTONG",
            Self::Penjahit => "PENJAHIT",
            Self::Finishing => "FINISHING",
            Self::KepalaGudang => "KEPALA_GUDANG",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OWNER" => Some(Self::Owner),
            "KEPALA_PRODUKSI" => Some(Self::KepalaProduksi),
            "PEMOTONG" => Some(Self::Pemotong),
            "PENJAHIT" => Some(Self::Penjahit),
            "FINISHING" => Some(Self::Finishing),
            "KEPALA_GUDANG" => Some(Self::KepalaGudang),
            _ => None,
        }
    }

    /// Roles allowed to manage batches: assign tasks, confirm cutting
    /// results, complete batches.
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Self::Owner | Self::KepalaProduksi)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user acting on a request.
///
/// Built by the JWT middleware from validated claims and inserted into
/// request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// User id (JWT `sub`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// The actor's role.
    pub role: Role,
}

impl Actor {
    /// Require one of the given roles. 403 otherwise.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "Peran {} tidak diizinkan untuk aksi ini / role {} is not allowed for this action",
                self.role, self.role
            )))
        }
    }

    /// Require a supervisor role (OWNER or KEPALA_PRODUKSI). 403 otherwise.
    pub fn require_supervisor(&self) -> Result<(), ServiceError> {
        if self.role.is_supervisor() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "Hanya pemilik atau kepala produksi yang boleh melakukan aksi ini / \
                 only the owner or head of production may perform this action (role: {})",
                self.role
            )))
        }
    }
}
