//! JNI entry points for `com.msa.mobileinfo.NativeBridge`.
//!
//! The host Activity calls `nativeInit` once, then `nativeStart(this, extended)`
//! from every `onCreate`, and `nativeOnDestroy(isFinishing())` from
//! `onDestroy`. Permission answers must be forwarded with
//! `nativeOnPermissionsResult`.
//!
//! The gate and the report run once per process on the `mobileinfo-report`
//! worker thread. A recreated Activity is attached to the run in flight, or
//! gets the finished report right away.
//!
//! `onDeviceReport(String)` is called on the worker thread (or, for a report
//! that is already built, inside `nativeStart`); the host must post to its UI
//! thread with `runOnUiThread` before touching views. `showNativeToast` is
//! called from the worker thread too.

#![allow(non_snake_case)]

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;

use jni::objects::{GlobalRef, JClass, JIntArray, JObject, JObjectArray, JValue};
use jni::sys::jboolean;
use jni::{JNIEnv, JavaVM};
use log::{LevelFilter, debug, error, info, warn};

use crate::App;
use crate::notification::sys::android::show_on;
use crate::notification::{NotificationError, Toast, Toaster};
use crate::permission::PermissionError;
use crate::permission::sys::{NativeBackend, android as permission_android};
use crate::report::ReportOptions;
use crate::session::{Attach, RunToken, Session};
use crate::system::sys::NativePlatform;

static VM: OnceLock<JavaVM> = OnceLock::new();
static SESSION: Mutex<Session<GlobalRef>> = Mutex::new(Session::new());

fn session() -> MutexGuard<'static, Session<GlobalRef>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, thiserror::Error)]
enum BridgeError {
    #[error("JNI: {0}")]
    Jni(#[from] jni::errors::Error),
    #[error("permission backend: {0}")]
    Permission(#[from] PermissionError),
    #[error("worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("nativeStart has not run yet")]
    NotInitialized,
}

/// Toasts go to whichever Activity is attached when they are shown.
struct HostToaster;

impl Toaster for HostToaster {
    fn show(&self, toast: &Toast) -> Result<(), NotificationError> {
        let Some(host) = session().host().cloned() else {
            debug!("No Activity attached, dropping toast: {}", toast.message());
            return Ok(());
        };
        let vm = VM
            .get()
            .ok_or_else(|| NotificationError::Platform("JavaVM not captured".into()))?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| NotificationError::Platform(format!("attach_current_thread: {e}")))?;
        show_on(&mut env, host.as_obj(), toast)
    }
}

/// Install the logger.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_msa_mobileinfo_NativeBridge_nativeInit(
    _env: JNIEnv,
    _class: JClass,
) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("mobileinfo"),
    );
    info!("mobileinfo native library loaded");
}

/// Attach `activity`: start the run, join the one in flight, or deliver the
/// finished report.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_msa_mobileinfo_NativeBridge_nativeStart(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
    extended: jboolean,
) {
    let options = ReportOptions {
        extended: extended != 0,
    };
    if let Err(e) = start(&mut env, &activity, options) {
        error!("Could not start report: {e}");
    }
}

/// Forward `Activity.onRequestPermissionsResult` to the waiting gate.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_msa_mobileinfo_NativeBridge_nativeOnPermissionsResult(
    mut env: JNIEnv,
    _class: JClass,
    permissions: JObjectArray,
    grants: JIntArray,
) {
    if let Err(e) = permission_android::on_request_permissions_result(&mut env, &permissions, &grants)
    {
        warn!("Dropped permission result: {e}");
    }
}

/// The Activity is being destroyed. A configuration change keeps the run
/// going for the next Activity; a finishing Activity abandons it.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_msa_mobileinfo_NativeBridge_nativeOnDestroy(
    _env: JNIEnv,
    _class: JClass,
    finishing: jboolean,
) {
    if finishing != 0 {
        info!("Activity finishing, abandoning the report");
        session().reset();
        permission_android::cancel_pending();
    } else {
        debug!("Activity recreated, keeping the report run");
        session().detach();
    }
}

fn start(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    options: ReportOptions,
) -> Result<(), BridgeError> {
    if VM.get().is_none() {
        let _ = VM.set(env.get_java_vm()?);
    }
    let host = env.new_global_ref(activity)?;

    let next = session().attach(host);
    match next {
        Attach::Launch(token) => launch(env, activity, options, token).inspect_err(|_| {
            session().reset();
        }),
        Attach::Wait => {
            info!("Report in progress, it will be delivered to this Activity");
            Ok(())
        }
        Attach::Deliver(text) => show_report(env, activity, &text),
    }
}

fn launch(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    options: ReportOptions,
    token: RunToken,
) -> Result<(), BridgeError> {
    // Accessors outlive this Activity, so they read through the app context.
    let context = env
        .call_method(
            activity,
            "getApplicationContext",
            "()Landroid/content/Context;",
            &[],
        )?
        .l()?;
    let platform = NativePlatform::new(env, &context)?;
    let backend = NativeBackend::new(env, activity)?;

    thread::Builder::new()
        .name("mobileinfo-report".into())
        .spawn(move || {
            let mut app = App::new(platform, backend, HostToaster).options(options);
            if let Err(e) = pollster::block_on(app.start()) {
                warn!("{e}");
                return;
            }
            let Some(text) = app.report().map(ToString::to_string) else {
                return;
            };
            let host = session().finish(token, text.clone()).cloned();
            match host {
                Some(host) => {
                    if let Err(e) = deliver(&host, &text) {
                        error!("Could not deliver report: {e}");
                    }
                }
                None => info!("No Activity attached, report kept for the next one"),
            }
        })?;
    Ok(())
}

fn deliver(host: &GlobalRef, text: &str) -> Result<(), BridgeError> {
    let vm = VM.get().ok_or(BridgeError::NotInitialized)?;
    let mut env = vm.attach_current_thread()?;
    show_report(&mut env, host.as_obj(), text)
}

fn show_report(env: &mut JNIEnv<'_>, host: &JObject<'_>, text: &str) -> Result<(), BridgeError> {
    let text = env.new_string(text)?;
    env.call_method(
        host,
        "onDeviceReport",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&text)],
    )?;
    Ok(())
}
