use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::media::MediaKind;
use crate::models::permission::PermissionState;
use crate::traits::permission_provider::{PermissionCallback, PermissionProvider};

#[derive(Default)]
struct PermissionTable {
    statuses: HashMap<MediaKind, PermissionState>,
    answers: HashMap<MediaKind, bool>,
    pending: Vec<(MediaKind, PermissionCallback)>,
    requests: HashMap<MediaKind, u32>,
}

/// Scripted permission subsystem.
///
/// Statuses start out undetermined. Prompts are either answered
/// immediately (`answer_prompts`) or parked until `resolve` is called,
/// possibly from another thread. Clones share the same table.
#[derive(Clone, Default)]
pub struct HeadlessPermissions {
    inner: Arc<Mutex<PermissionTable>>,
}

impl HeadlessPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind already authorized.
    pub fn granted() -> Self {
        let permissions = Self::new();
        permissions.set_status(MediaKind::Video, PermissionState::Authorized);
        permissions.set_status(MediaKind::Audio, PermissionState::Authorized);
        permissions
    }

    pub fn set_status(&self, kind: MediaKind, state: PermissionState) {
        self.inner.lock().statuses.insert(kind, state);
    }

    /// Answer future prompts for `kind` immediately, on the requesting thread.
    pub fn answer_prompts(&self, kind: MediaKind, granted: bool) {
        self.inner.lock().answers.insert(kind, granted);
    }

    /// Answer the oldest parked prompt for `kind`. Returns false if none is parked.
    pub fn resolve(&self, kind: MediaKind, granted: bool) -> bool {
        let completion = {
            let mut table = self.inner.lock();
            let Some(index) = table.pending.iter().position(|(k, _)| *k == kind) else {
                return false;
            };
            table.statuses.insert(kind, PermissionState::from_grant(granted));
            table.pending.remove(index).1
        };
        completion(granted);
        true
    }

    /// Number of prompts issued for `kind`.
    pub fn request_count(&self, kind: MediaKind) -> u32 {
        self.inner.lock().requests.get(&kind).copied().unwrap_or(0)
    }
}

impl PermissionProvider for HeadlessPermissions {
    fn authorization_status(&self, kind: MediaKind) -> PermissionState {
        self.inner.lock().statuses.get(&kind).copied().unwrap_or_default()
    }

    fn request_access(&self, kind: MediaKind, completion: PermissionCallback) {
        let answer = {
            let mut table = self.inner.lock();
            *table.requests.entry(kind).or_insert(0) += 1;
            match table.answers.get(&kind).copied() {
                Some(granted) => {
                    table.statuses.insert(kind, PermissionState::from_grant(granted));
                    Some(granted)
                }
                None => {
                    table.pending.push((kind, completion));
                    return;
                }
            }
        };
        if let Some(granted) = answer {
            completion(granted);
        }
    }
}
