// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Group member identifier.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one light inside a [`LightGroup`](crate::device::LightGroup).
///
/// Ids are assigned when a light joins a group and are never reused, so an
/// error event can be traced back to the bulb that produced it even after
/// the group has been rebuilt by a reconnect.
///
/// # Examples
///
/// ```
/// use lightgrid::event::DeviceId;
///
/// let id = DeviceId::new();
/// assert_ne!(id, DeviceId::new());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Creates a new unique id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = self.0.simple().to_string();
        write!(f, "DeviceId({}...)", &full[..8])
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DeviceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..64).map(|_| DeviceId::new()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn uuid_round_trip() {
        let uuid = Uuid::new_v4();
        assert_eq!(DeviceId::from_uuid(uuid).as_uuid(), uuid);
        assert_eq!(DeviceId::from(uuid), DeviceId::from_uuid(uuid));
    }

    #[test]
    fn debug_is_shortened() {
        let uuid = Uuid::parse_str("a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8").unwrap();
        let id = DeviceId::from_uuid(uuid);
        assert_eq!(format!("{id:?}"), "DeviceId(a1a2a3a4...)");
        assert_eq!(id.to_string(), "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8");
    }

    #[test]
    fn serializes_as_plain_string() {
        let uuid = Uuid::parse_str("a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8").unwrap();
        let json = serde_json::to_string(&DeviceId::from_uuid(uuid)).unwrap();
        assert_eq!(json, "\"a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8\"");
    }
}
