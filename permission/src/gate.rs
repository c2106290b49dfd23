use std::collections::{BTreeMap, BTreeSet};

use log::{error, info, warn};

use crate::{Permission, PermissionError, PermissionStatus, SdkVersion};

/// Access to the platform permission model.
#[allow(async_fn_in_trait)]
pub trait PermissionBackend {
    /// Query the current status of one permission without prompting.
    fn check(&self, permission: Permission) -> PermissionStatus;

    /// Show one consent prompt for the whole batch and wait for the answer.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the prompt could not be shown or was
    /// torn down before the user answered.
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> Result<BTreeMap<Permission, bool>, PermissionError>;
}

/// Receives one call per capability the user refused.
pub trait DenialSink {
    /// Surface a denied capability to the user.
    fn denied(&self, permission: Permission);
}

impl DenialSink for () {
    fn denied(&self, _permission: Permission) {}
}

impl<F: Fn(Permission)> DenialSink for F {
    fn denied(&self, permission: Permission) {
        self(permission);
    }
}

/// Result of one pass through the gate.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct GateOutcome {
    statuses: BTreeMap<Permission, PermissionStatus>,
    all_granted: bool,
}

impl GateOutcome {
    /// Build an outcome from final statuses.
    #[must_use]
    pub fn from_statuses(statuses: BTreeMap<Permission, PermissionStatus>) -> Self {
        let all_granted = statuses.values().all(|s| s.is_granted());
        Self {
            statuses,
            all_granted,
        }
    }

    /// An outcome in which every given capability is granted.
    #[must_use]
    pub fn granted<I: IntoIterator<Item = Permission>>(permissions: I) -> Self {
        Self::from_statuses(
            permissions
                .into_iter()
                .map(|p| (p, PermissionStatus::Granted))
                .collect(),
        )
    }

    /// Whether `permission` was part of the request and ended up granted.
    #[must_use]
    pub fn is_granted(&self, permission: Permission) -> bool {
        self.statuses
            .get(&permission)
            .is_some_and(|status| status.is_granted())
    }

    /// Whether every required capability ended up granted.
    #[must_use]
    pub const fn all_granted(&self) -> bool {
        self.all_granted
    }

    /// Final status per required capability.
    #[must_use]
    pub const fn statuses(&self) -> &BTreeMap<Permission, PermissionStatus> {
        &self.statuses
    }

    /// Capabilities that ended up not granted.
    pub fn denied(&self) -> impl Iterator<Item = Permission> + '_ {
        self.statuses
            .iter()
            .filter(|(_, status)| !status.is_granted())
            .map(|(&p, _)| p)
    }
}

/// Capabilities the report needs on `os_version`.
#[must_use]
pub fn required_capabilities(os_version: SdkVersion) -> BTreeSet<Permission> {
    let mut required = BTreeSet::from([
        Permission::AccessFineLocation,
        Permission::AccessCoarseLocation,
        Permission::AccessNetworkState,
        Permission::AccessWifiState,
        Permission::ReadPhoneState,
    ]);

    if os_version >= SdkVersion::TIRAMISU {
        required.insert(Permission::ReadMediaImages);
        required.insert(Permission::ReadMediaVideo);
    }

    required
}

/// The subset of `capabilities` the backend does not report as granted.
pub fn missing<B: PermissionBackend + ?Sized>(
    backend: &B,
    capabilities: &BTreeSet<Permission>,
) -> BTreeSet<Permission> {
    capabilities
        .iter()
        .copied()
        .filter(|&p| !backend.check(p).is_granted())
        .collect()
}

/// Prompt once for every capability in `missing`.
///
/// An empty set never reaches the backend.
///
/// # Errors
/// Propagates the backend's [`PermissionError`].
pub async fn request<B: PermissionBackend + ?Sized>(
    backend: &B,
    missing: &BTreeSet<Permission>,
) -> Result<BTreeMap<Permission, bool>, PermissionError> {
    if missing.is_empty() {
        return Ok(BTreeMap::new());
    }

    let batch: Vec<Permission> = missing.iter().copied().collect();
    backend.request(&batch).await
}

/// True iff every answer is a grant. Vacuously true for no answers.
#[must_use]
pub fn all_granted(results: &BTreeMap<Permission, bool>) -> bool {
    results.values().all(|&granted| granted)
}

/// Run the whole gate: check, prompt for what is missing, report denials.
///
/// Never fails. A backend error during the prompt (including a prompt torn
/// down with its Activity) counts as a denial of everything that was
/// missing, but the sink is only told about answers the user gave.
pub async fn resolve<B, S>(backend: &B, sink: &S, required: &BTreeSet<Permission>) -> GateOutcome
where
    B: PermissionBackend + ?Sized,
    S: DenialSink + ?Sized,
{
    let missing = missing(backend, required);
    let mut statuses: BTreeMap<Permission, PermissionStatus> = required
        .iter()
        .map(|&p| (p, PermissionStatus::Granted))
        .collect();

    if missing.is_empty() {
        info!("All {} permissions already granted", required.len());
        return GateOutcome::from_statuses(statuses);
    }

    info!(
        "Requesting permissions: {}",
        missing
            .iter()
            .map(|p| p.manifest_name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let (results, answered) = match request(backend, &missing).await {
        Ok(results) => (results, true),
        Err(e) => {
            error!("Permission request failed: {e}");
            (BTreeMap::new(), false)
        }
    };

    for &permission in &missing {
        let granted = results.get(&permission).copied().unwrap_or(false);
        statuses.insert(permission, granted.into());
        if !granted {
            warn!("Permission denied: {permission}");
            if answered {
                sink.denied(permission);
            }
        }
    }

    GateOutcome::from_statuses(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct StubBackend {
        granted: BTreeSet<Permission>,
        answers: BTreeMap<Permission, bool>,
        fail: bool,
        checks: Cell<usize>,
        prompts: RefCell<Vec<Vec<Permission>>>,
    }

    impl PermissionBackend for StubBackend {
        fn check(&self, permission: Permission) -> PermissionStatus {
            self.checks.set(self.checks.get() + 1);
            if self.granted.contains(&permission) {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            }
        }

        async fn request(
            &self,
            permissions: &[Permission],
        ) -> Result<BTreeMap<Permission, bool>, PermissionError> {
            self.prompts.borrow_mut().push(permissions.to_vec());
            if self.fail {
                return Err(PermissionError::Dismissed);
            }
            Ok(permissions
                .iter()
                .map(|&p| (p, self.answers.get(&p).copied().unwrap_or(false)))
                .collect())
        }
    }

    #[test]
    fn base_set_before_tiramisu() {
        let required = required_capabilities(SdkVersion(32));
        assert_eq!(required.len(), 5);
        assert!(required.contains(&Permission::ReadPhoneState));
        assert!(!required.contains(&Permission::ReadMediaImages));
    }

    #[test]
    fn media_permissions_from_tiramisu() {
        let required = required_capabilities(SdkVersion::TIRAMISU);
        assert_eq!(required.len(), 7);
        assert!(required.contains(&Permission::ReadMediaImages));
        assert!(required.contains(&Permission::ReadMediaVideo));
    }

    #[test]
    fn missing_is_exactly_the_ungranted_subset() {
        let backend = StubBackend {
            granted: BTreeSet::from([Permission::AccessNetworkState, Permission::ReadMediaVideo]),
            ..StubBackend::default()
        };
        let required = required_capabilities(SdkVersion(34));

        let missing = missing(&backend, &required);

        let expected: BTreeSet<_> = required
            .iter()
            .copied()
            .filter(|p| !backend.granted.contains(p))
            .collect();
        assert_eq!(missing, expected);
        assert_eq!(backend.checks.get(), required.len());
    }

    #[test]
    fn all_granted_is_a_conjunction() {
        assert!(all_granted(&BTreeMap::new()));
        assert!(all_granted(&BTreeMap::from([
            (Permission::AccessWifiState, true),
            (Permission::ReadPhoneState, true),
        ])));
        assert!(!all_granted(&BTreeMap::from([
            (Permission::AccessWifiState, true),
            (Permission::ReadPhoneState, false),
        ])));
    }

    #[tokio::test]
    async fn empty_request_never_prompts() {
        let backend = StubBackend::default();
        let results = request(&backend, &BTreeSet::new()).await.unwrap();
        assert!(results.is_empty());
        assert!(backend.prompts.borrow().is_empty());
    }

    #[tokio::test]
    async fn resolve_skips_prompt_when_nothing_is_missing() {
        let required = required_capabilities(SdkVersion(30));
        let backend = StubBackend {
            granted: required.clone(),
            ..StubBackend::default()
        };

        let outcome = resolve(&backend, &(), &required).await;

        assert!(outcome.all_granted());
        assert!(backend.prompts.borrow().is_empty());
        assert!(required.iter().all(|&p| outcome.is_granted(p)));
    }

    #[tokio::test]
    async fn resolve_batches_missing_and_reports_each_denial() {
        let required = required_capabilities(SdkVersion(30));
        let backend = StubBackend {
            granted: BTreeSet::from([Permission::AccessNetworkState]),
            answers: BTreeMap::from([
                (Permission::AccessFineLocation, true),
                (Permission::AccessCoarseLocation, true),
                (Permission::AccessWifiState, true),
                (Permission::ReadPhoneState, false),
            ]),
            ..StubBackend::default()
        };
        let denials = RefCell::new(Vec::new());
        let sink = |p: Permission| denials.borrow_mut().push(p);

        let outcome = resolve(&backend, &sink, &required).await;

        assert_eq!(backend.prompts.borrow().len(), 1);
        assert_eq!(backend.prompts.borrow()[0].len(), 4);
        assert_eq!(*denials.borrow(), vec![Permission::ReadPhoneState]);
        assert!(!outcome.all_granted());
        assert!(outcome.is_granted(Permission::AccessNetworkState));
        assert!(outcome.is_granted(Permission::AccessWifiState));
        assert!(!outcome.is_granted(Permission::ReadPhoneState));
        assert_eq!(outcome.denied().collect::<Vec<_>>(), vec![Permission::ReadPhoneState]);
    }

    #[tokio::test]
    async fn abandoned_prompt_denies_silently() {
        let required = required_capabilities(SdkVersion(33));
        let backend = StubBackend {
            granted: BTreeSet::from([Permission::AccessNetworkState]),
            fail: true,
            ..StubBackend::default()
        };
        let count = Cell::new(0);
        let sink = |_: Permission| count.set(count.get() + 1);

        let outcome = resolve(&backend, &sink, &required).await;

        assert_eq!(count.get(), 0);
        assert_eq!(outcome.denied().count(), required.len() - 1);
        assert!(!outcome.all_granted());
        assert!(outcome.is_granted(Permission::AccessNetworkState));
    }

    #[test]
    fn outcome_for_unrequested_permission_is_not_granted() {
        let outcome = GateOutcome::granted([Permission::AccessWifiState]);
        assert!(outcome.all_granted());
        assert!(!outcome.is_granted(Permission::ReadPhoneState));
    }
}
