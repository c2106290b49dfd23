//! Android toast implementation using JNI.
//!
//! `android.widget.Toast` must be created on a Looper thread, so the toast is
//! handed to the host Activity's `showNativeToast(String, int)`, which posts
//! it to the UI thread.

use jni::objects::{GlobalRef, JObject, JValue};
use jni::sys::jint;
use jni::{JNIEnv, JavaVM};

use crate::{NotificationError, Toast, ToastLength, Toaster};

/// `Toast.LENGTH_SHORT`.
const LENGTH_SHORT: jint = 0;
/// `Toast.LENGTH_LONG`.
const LENGTH_LONG: jint = 1;

/// Shows toasts through the host Activity.
pub struct AndroidToaster {
    vm: JavaVM,
    activity: GlobalRef,
}

impl std::fmt::Debug for AndroidToaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidToaster").finish_non_exhaustive()
    }
}

impl AndroidToaster {
    /// Bind the toaster to `activity`.
    ///
    /// # Errors
    /// Returns a [`NotificationError`] if the JVM handle or a global
    /// reference cannot be obtained.
    pub fn new(env: &JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self, NotificationError> {
        let vm = env
            .get_java_vm()
            .map_err(|e| NotificationError::Platform(format!("get_java_vm: {e}")))?;
        let activity = env
            .new_global_ref(activity)
            .map_err(|e| NotificationError::Platform(format!("new_global_ref: {e}")))?;
        Ok(Self { vm, activity })
    }
}

impl Toaster for AndroidToaster {
    fn show(&self, toast: &Toast) -> Result<(), NotificationError> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| NotificationError::Platform(format!("attach_current_thread: {e}")))?;
        show_on(&mut env, self.activity.as_obj(), toast)
    }
}

/// Hand `toast` to `activity.showNativeToast(String, int)`.
///
/// # Errors
/// Returns a [`NotificationError`] if the call fails; a pending Java
/// exception is cleared first.
pub fn show_on(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    toast: &Toast,
) -> Result<(), NotificationError> {
    let length = match toast.display_length() {
        ToastLength::Short => LENGTH_SHORT,
        ToastLength::Long => LENGTH_LONG,
    };
    let message = env
        .new_string(toast.message())
        .map_err(|e| NotificationError::Platform(format!("new_string: {e}")))?;

    let result = env.call_method(
        activity,
        "showNativeToast",
        "(Ljava/lang/String;I)V",
        &[JValue::Object(&message), JValue::Int(length)],
    );
    if result.is_err() && env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    result
        .map(|_| ())
        .map_err(|e| NotificationError::Platform(format!("showNativeToast: {e}")))
}
