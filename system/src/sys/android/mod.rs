use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use log::debug;

use crate::{
    AppVersion, BatteryStatus, ConnectionType, Degraded, DeviceIdentity, LocaleInfo, Platform,
    Probe, StorageStats, Telephony, WifiConnection,
};

const TRANSPORT_CELLULAR: i32 = 0;
const TRANSPORT_WIFI: i32 = 1;
const BATTERY_PROPERTY_CAPACITY: i32 = 4;
const LOCATION_MODE_OFF: i32 = 0;

const BUILD: &str = "android/os/Build";
const BUILD_VERSION: &str = "android/os/Build$VERSION";
const SETTINGS_GLOBAL: &str = "android/provider/Settings$Global";
const SETTINGS_SECURE: &str = "android/provider/Settings$Secure";

impl From<jni::errors::Error> for Degraded {
    fn from(e: jni::errors::Error) -> Self {
        Self::Failed(e.to_string())
    }
}

/// Platform accessors backed by Android framework services via JNI.
pub struct AndroidPlatform {
    vm: JavaVM,
    context: GlobalRef,
}

impl std::fmt::Debug for AndroidPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidPlatform").finish_non_exhaustive()
    }
}

impl AndroidPlatform {
    /// Bind the accessors to an Android `Context`.
    ///
    /// # Errors
    /// Returns a JNI error if the JVM handle or a global reference cannot be
    /// obtained.
    pub fn new(env: &JNIEnv<'_>, context: &JObject<'_>) -> jni::errors::Result<Self> {
        let vm = env.get_java_vm()?;
        let context = env.new_global_ref(context)?;
        Ok(Self { vm, context })
    }

    /// Run `action` on an attached thread.
    ///
    /// A Java exception left pending by the action is cleared and mapped by
    /// [`Degraded::from_exception`].
    fn with_env<T, F>(&self, action: F) -> Probe<T>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Probe<T>,
    {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| Degraded::Failed(format!("attach_current_thread: {e}")))?;
        let result = action(&mut *env, self.context.as_obj());
        match take_exception(&mut *env) {
            Some(message) if result.is_err() => {
                debug!("Java exception: {message}");
                Err(Degraded::from_exception(message))
            }
            _ => result,
        }
    }
}

fn take_exception(env: &mut JNIEnv<'_>) -> Option<String> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let throwable = env.exception_occurred();
    let _ = env.exception_clear();
    let throwable = throwable.ok()?;
    let text = env
        .call_method(&throwable, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    java_string(env, text).ok().flatten()
}

fn java_string(env: &mut JNIEnv<'_>, value: JObject<'_>) -> Probe<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(&JString::from(value))?.into()))
}

fn string_method(env: &mut JNIEnv<'_>, target: &JObject<'_>, name: &str) -> Probe<String> {
    let value = env
        .call_method(target, name, "()Ljava/lang/String;", &[])?
        .l()?;
    java_string(env, value)?.ok_or_else(|| Degraded::unavailable(format!("{name} returned null")))
}

fn static_string_field(env: &mut JNIEnv<'_>, class: &str, field: &str) -> Probe<String> {
    let value = env
        .get_static_field(class, field, "Ljava/lang/String;")?
        .l()?;
    java_string(env, value)?.ok_or_else(|| Degraded::unavailable(format!("{field} is null")))
}

fn system_service<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
    name: &str,
) -> Probe<JObject<'local>> {
    let jname = env.new_string(name)?;
    let service = env
        .call_method(
            context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&jname)],
        )?
        .l()?;
    if service.is_null() {
        return Err(Degraded::unavailable(format!("{name} service")));
    }
    Ok(service)
}

fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Probe<JObject<'local>> {
    Ok(env
        .call_method(
            context,
            "getContentResolver",
            "()Landroid/content/ContentResolver;",
            &[],
        )?
        .l()?)
}

/// `Settings.<table>.getInt(resolver, name, default)`.
fn settings_int(
    env: &mut JNIEnv<'_>,
    context: &JObject<'_>,
    table: &str,
    name: &str,
    default: i32,
) -> Probe<i32> {
    let resolver = content_resolver(env, context)?;
    let jname = env.new_string(name)?;
    Ok(env
        .call_static_method(
            table,
            "getInt",
            "(Landroid/content/ContentResolver;Ljava/lang/String;I)I",
            &[
                JValue::Object(&resolver),
                JValue::Object(&jname),
                JValue::Int(default),
            ],
        )?
        .i()?)
}

impl Platform for AndroidPlatform {
    fn connection_type(&self) -> Probe<ConnectionType> {
        self.with_env(|env, ctx| {
            let manager = system_service(env, ctx, "connectivity")?;
            let network = env
                .call_method(&manager, "getActiveNetwork", "()Landroid/net/Network;", &[])?
                .l()?;
            if network.is_null() {
                return Ok(ConnectionType::None);
            }
            let capabilities = env
                .call_method(
                    &manager,
                    "getNetworkCapabilities",
                    "(Landroid/net/Network;)Landroid/net/NetworkCapabilities;",
                    &[JValue::Object(&network)],
                )?
                .l()?;
            if capabilities.is_null() {
                return Ok(ConnectionType::None);
            }

            let mut has_transport = |transport: i32| -> Probe<bool> {
                Ok(env
                    .call_method(
                        &capabilities,
                        "hasTransport",
                        "(I)Z",
                        &[JValue::Int(transport)],
                    )?
                    .z()?)
            };

            if has_transport(TRANSPORT_WIFI)? {
                Ok(ConnectionType::Wifi)
            } else if has_transport(TRANSPORT_CELLULAR)? {
                Ok(ConnectionType::Cellular)
            } else {
                Ok(ConnectionType::Other)
            }
        })
    }

    fn wifi_connection(&self) -> Probe<WifiConnection> {
        self.with_env(|env, ctx| {
            let app = env
                .call_method(
                    ctx,
                    "getApplicationContext",
                    "()Landroid/content/Context;",
                    &[],
                )?
                .l()?;
            let manager = system_service(env, &app, "wifi")?;
            let info = env
                .call_method(
                    &manager,
                    "getConnectionInfo",
                    "()Landroid/net/wifi/WifiInfo;",
                    &[],
                )?
                .l()?;
            if info.is_null() {
                return Err(Degraded::unavailable("no Wi-Fi connection"));
            }
            // networkId is -1 while not associated.
            let network_id = env.call_method(&info, "getNetworkId", "()I", &[])?.i()?;
            if network_id == -1 {
                return Err(Degraded::unavailable("no Wi-Fi connection"));
            }
            let ssid = string_method(env, &info, "getSSID")?;
            let signal_strength = env.call_method(&info, "getRssi", "()I", &[])?.i()?;
            Ok(WifiConnection {
                ssid,
                signal_strength,
            })
        })
    }

    fn battery(&self) -> Probe<BatteryStatus> {
        self.with_env(|env, ctx| {
            let manager = system_service(env, ctx, "batterymanager")?;
            let level = env
                .call_method(
                    &manager,
                    "getIntProperty",
                    "(I)I",
                    &[JValue::Int(BATTERY_PROPERTY_CAPACITY)],
                )?
                .i()?;
            let charging = env.call_method(&manager, "isCharging", "()Z", &[])?.z()?;
            BatteryStatus::from_capacity(i64::from(level), charging)
        })
    }

    fn storage(&self) -> Probe<StorageStats> {
        self.with_env(|env, _ctx| {
            let dir = env
                .call_static_method(
                    "android/os/Environment",
                    "getExternalStorageDirectory",
                    "()Ljava/io/File;",
                    &[],
                )?
                .l()?;
            if dir.is_null() {
                return Err(Degraded::unavailable("external storage"));
            }
            let free = env.call_method(&dir, "getFreeSpace", "()J", &[])?.j()?;
            let total = env.call_method(&dir, "getTotalSpace", "()J", &[])?.j()?;
            Ok(StorageStats {
                free_bytes: u64::try_from(free).unwrap_or_default(),
                total_bytes: u64::try_from(total).unwrap_or_default(),
            })
        })
    }

    fn telephony(&self) -> Probe<Telephony> {
        self.with_env(|env, ctx| {
            let manager = system_service(env, ctx, "phone")?;
            let mut read_string = |name: &str| {
                string_method(env, &manager, name).map_err(|e| {
                    take_exception(env).map_or(e, Degraded::from_exception)
                })
            };
            let carrier = read_string("getNetworkOperatorName");
            let sim_operator = read_string("getSimOperator");
            let sim_country = read_string("getSimCountryIso");

            // READ_PHONE_STATE is enforced here from API 30.
            let network_type = env
                .call_method(&manager, "getNetworkType", "()I", &[])
                .and_then(|v| v.i())
                .map_err(|e| {
                    take_exception(env).map_or_else(|| Degraded::from(e), Degraded::from_exception)
                });

            Ok(Telephony {
                carrier,
                sim_operator,
                sim_country,
                network_type,
            })
        })
    }

    fn imei(&self) -> Probe<String> {
        // Device identifiers are limited to privileged apps since Android 10.
        Err(Degraded::unavailable("IMEI is restricted"))
    }

    fn phone_number(&self) -> Probe<String> {
        Err(Degraded::unavailable("line number is restricted"))
    }

    fn android_id(&self) -> Probe<String> {
        self.with_env(|env, ctx| {
            let resolver = content_resolver(env, ctx)?;
            let name = env.new_string("android_id")?;
            let value = env
                .call_static_method(
                    SETTINGS_SECURE,
                    "getString",
                    "(Landroid/content/ContentResolver;Ljava/lang/String;)Ljava/lang/String;",
                    &[JValue::Object(&resolver), JValue::Object(&name)],
                )?
                .l()?;
            java_string(env, value)?.ok_or_else(|| Degraded::unavailable("ANDROID_ID unset"))
        })
    }

    fn locale(&self) -> Probe<LocaleInfo> {
        self.with_env(|env, _ctx| {
            let locale = env
                .call_static_method("java/util/Locale", "getDefault", "()Ljava/util/Locale;", &[])?
                .l()?;
            Ok(LocaleInfo {
                language: string_method(env, &locale, "getLanguage")?,
                country: string_method(env, &locale, "getCountry")?,
            })
        })
    }

    fn airplane_mode_flag(&self) -> Probe<i32> {
        self.with_env(|env, ctx| settings_int(env, ctx, SETTINGS_GLOBAL, "airplane_mode_on", 0))
    }

    fn location_mode(&self) -> Probe<i32> {
        self.with_env(|env, ctx| {
            settings_int(env, ctx, SETTINGS_SECURE, "location_mode", LOCATION_MODE_OFF)
        })
    }

    fn hardware(&self) -> Probe<String> {
        self.with_env(|env, _ctx| static_string_field(env, BUILD, "HARDWARE"))
    }

    fn device_identity(&self) -> Probe<DeviceIdentity> {
        self.with_env(|env, _ctx| {
            Ok(DeviceIdentity {
                model: static_string_field(env, BUILD, "MODEL")?,
                manufacturer: static_string_field(env, BUILD, "MANUFACTURER")?,
                brand: static_string_field(env, BUILD, "BRAND")?,
                device: static_string_field(env, BUILD, "DEVICE")?,
                product: static_string_field(env, BUILD, "PRODUCT")?,
                os_release: static_string_field(env, BUILD_VERSION, "RELEASE")?,
            })
        })
    }

    fn sdk_level(&self) -> Probe<u32> {
        self.with_env(|env, _ctx| {
            let level = env.get_static_field(BUILD_VERSION, "SDK_INT", "I")?.i()?;
            u32::try_from(level).map_err(|_| Degraded::Failed(format!("invalid SDK_INT {level}")))
        })
    }

    fn serial(&self) -> Probe<String> {
        self.with_env(|env, _ctx| {
            let value = env
                .call_static_method(BUILD, "getSerial", "()Ljava/lang/String;", &[])?
                .l()?;
            java_string(env, value)?.ok_or_else(|| Degraded::unavailable("serial unset"))
        })
    }

    fn app_version(&self) -> Probe<AppVersion> {
        self.with_env(|env, ctx| {
            let manager = env
                .call_method(
                    ctx,
                    "getPackageManager",
                    "()Landroid/content/pm/PackageManager;",
                    &[],
                )?
                .l()?;
            let package = env
                .call_method(ctx, "getPackageName", "()Ljava/lang/String;", &[])?
                .l()?;
            let info = env
                .call_method(
                    &manager,
                    "getPackageInfo",
                    "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
                    &[JValue::Object(&package), JValue::Int(0)],
                )?
                .l()?;
            let code = env.call_method(&info, "getLongVersionCode", "()J", &[])?.j()?;
            let name = env
                .get_field(&info, "versionName", "Ljava/lang/String;")?
                .l()?;
            Ok(AppVersion {
                code,
                name: java_string(env, name)?.unwrap_or_default(),
            })
        })
    }
}
