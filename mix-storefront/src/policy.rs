//! Access policy
//!
//! Every admin gate in the crate goes through `is_admin`; there is no
//! second place that reads the role.

use shared::models::{Profile, Role};

/// Whether this profile may use the admin surfaces
pub fn is_admin(profile: &Profile) -> bool {
    profile.role == Role::Admin
}
