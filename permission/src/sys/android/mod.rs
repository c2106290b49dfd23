//! Android permission implementation using JNI.
//!
//! Checks go straight to `Context.checkSelfPermission`. Prompts are delegated
//! to the host Activity, which must implement
//! `requestNativePermissions(String[])`, run `requestPermissions` on its UI
//! thread and forward `onRequestPermissionsResult` to
//! [`on_request_permissions_result`].

use std::collections::BTreeMap;
use std::sync::{Mutex, OnceLock};

use async_channel::Sender;
use jni::objects::{GlobalRef, JIntArray, JObject, JObjectArray, JString, JValue};
use jni::sys::jint;
use jni::{JNIEnv, JavaVM};
use log::{debug, warn};

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: jint = 0;
/// `PackageManager.PERMISSION_DENIED`.
const PERMISSION_DENIED: jint = -1;

type Answers = BTreeMap<Permission, bool>;

/// Sender half of the prompt currently waiting for the user.
static PENDING: OnceLock<Mutex<Option<Sender<Answers>>>> = OnceLock::new();

fn pending() -> &'static Mutex<Option<Sender<Answers>>> {
    PENDING.get_or_init(|| Mutex::new(None))
}

fn jni_error(e: jni::errors::Error) -> PermissionError {
    PermissionError::Platform(e.to_string())
}

/// Permission backend bound to the host Activity.
pub struct AndroidBackend {
    vm: JavaVM,
    activity: GlobalRef,
}

impl std::fmt::Debug for AndroidBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidBackend").finish_non_exhaustive()
    }
}

impl AndroidBackend {
    /// Bind the backend to `activity`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the JVM handle or a global reference
    /// cannot be obtained.
    pub fn new(env: &JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self, PermissionError> {
        let vm = env.get_java_vm().map_err(jni_error)?;
        let activity = env.new_global_ref(activity).map_err(jni_error)?;
        Ok(Self { vm, activity })
    }

    fn with_env<T, F>(&self, action: F) -> Result<T, PermissionError>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread().map_err(jni_error)?;
        let result = action(&mut *env, self.activity.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        result.map_err(jni_error)
    }

    fn launch(&self, permissions: &[Permission]) -> Result<(), PermissionError> {
        self.with_env(|env, activity| {
            let len = jint::try_from(permissions.len()).unwrap_or(jint::MAX);
            let names = env.new_object_array(len, "java/lang/String", JObject::null())?;
            for (index, permission) in (0..len).zip(permissions) {
                let name = env.new_string(permission.manifest_name())?;
                env.set_object_array_element(&names, index, name)?;
            }
            env.call_method(
                activity,
                "requestNativePermissions",
                "([Ljava/lang/String;)V",
                &[JValue::Object(&names)],
            )?;
            Ok(())
        })
    }
}

impl PermissionBackend for AndroidBackend {
    fn check(&self, permission: Permission) -> PermissionStatus {
        let result = self.with_env(|env, activity| {
            let name = env.new_string(permission.manifest_name())?;
            env.call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&name)],
            )?
            .i()
        });

        match result {
            Ok(PERMISSION_GRANTED) => PermissionStatus::Granted,
            Ok(PERMISSION_DENIED) => PermissionStatus::Denied,
            Ok(other) => {
                warn!("checkSelfPermission({permission}) returned {other}");
                PermissionStatus::NotDetermined
            }
            Err(e) => {
                warn!("checkSelfPermission({permission}) failed: {e}");
                PermissionStatus::NotDetermined
            }
        }
    }

    async fn request(&self, permissions: &[Permission]) -> Result<Answers, PermissionError> {
        let (tx, rx) = async_channel::bounded(1);
        {
            let mut slot = pending()
                .lock()
                .map_err(|_| PermissionError::Platform("pending prompt lock poisoned".into()))?;
            if slot.is_some() {
                return Err(PermissionError::RequestInFlight);
            }
            *slot = Some(tx);
        }

        if let Err(e) = self.launch(permissions) {
            if let Ok(mut slot) = pending().lock() {
                slot.take();
            }
            return Err(e);
        }

        debug!("Waiting for the user to answer {} permissions", permissions.len());
        rx.recv().await.map_err(|_| PermissionError::Dismissed)
    }
}

/// Deliver the host Activity's `onRequestPermissionsResult` to the waiting
/// prompt.
///
/// An interrupted prompt arrives as empty arrays; every capability that was
/// asked for then counts as denied.
///
/// # Errors
/// Returns a [`PermissionError`] if the arrays cannot be read or no prompt
/// is waiting.
pub fn on_request_permissions_result(
    env: &mut JNIEnv<'_>,
    permissions: &JObjectArray<'_>,
    grants: &JIntArray<'_>,
) -> Result<(), PermissionError> {
    let len = env.get_array_length(permissions).map_err(jni_error)?;
    let mut results = vec![0; usize::try_from(len).unwrap_or_default()];
    env.get_int_array_region(grants, 0, &mut results)
        .map_err(jni_error)?;

    let mut answers = Answers::new();
    for (index, grant) in (0..len).zip(results) {
        let element = env
            .get_object_array_element(permissions, index)
            .map_err(jni_error)?;
        let name: String = env
            .get_string(&JString::from(element))
            .map_err(jni_error)?
            .into();
        match Permission::from_manifest_name(&name) {
            Some(permission) => {
                answers.insert(permission, grant == PERMISSION_GRANTED);
            }
            None => debug!("Ignoring result for unknown permission {name}"),
        }
    }

    let sender = pending()
        .lock()
        .map_err(|_| PermissionError::Platform("pending prompt lock poisoned".into()))?
        .take()
        .ok_or_else(|| PermissionError::Platform("no permission prompt in flight".into()))?;

    sender
        .try_send(answers)
        .map_err(|_| PermissionError::Dismissed)
}

/// Abandon the prompt in flight, if any; its caller sees
/// [`PermissionError::Dismissed`].
pub fn cancel_pending() {
    if let Ok(mut slot) = pending().lock() {
        slot.take();
    }
}
