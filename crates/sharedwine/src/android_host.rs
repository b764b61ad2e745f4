//! JNI surface for `org.winehq.wine.sharedwine`.
//!
//! The Java side declares:
//!
//! ```java
//! public static native void initializeWine(String root, String cmdline);
//! ```
//!
//! and libwine exports the matching `wine_init(String[] cmdline, String[] env)` native, which
//! is called here from the loader thread with the class the host registered.

#![cfg(target_os = "android")]

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString};
use jni::sys::{jobjectArray, jsize, jstring};
use jni::{JNIEnv, JavaVM};

use crate::config::LaunchConfig;
use crate::dispatch::initialize_wine;
use crate::error::LaunchError;
use crate::locale::Locale;
use crate::native::{ensure_loaded, WineEntry};
use crate::plan::LaunchPlan;
use crate::utils::logger::Logger;

pub const JNI_WINE_INIT_SYMBOL: &str = "Java_org_winehq_wine_sharedwine_wine_1init";

type JniWineInitFn =
    unsafe extern "system" fn(*mut jni::sys::JNIEnv, jni::sys::jclass, jobjectArray, jobjectArray) -> jstring;

fn jni_err(e: jni::errors::Error) -> LaunchError {
    LaunchError::Jni(e.to_string())
}

/// Calls libwine's JNI `wine_init` on the current (loader) thread.
pub struct JniWineEntry {
    vm: JavaVM,
    class: GlobalRef,
}

impl WineEntry for JniWineEntry {
    fn init(&self, plan: &LaunchPlan) -> crate::error::Result<String> {
        let library = ensure_loaded(&plan.layout.library())?;
        // SAFETY: the symbol is the JNI implementation of `String wine_init(String[], String[])`.
        let wine_init: JniWineInitFn = unsafe { library.symbol(JNI_WINE_INIT_SYMBOL)? };

        let mut env = self.vm.attach_current_thread().map_err(jni_err)?;
        let argv = string_array(&mut env, &plan.argv).map_err(jni_err)?;
        let envp = string_array(&mut env, &plan.environment.flatten()).map_err(jni_err)?;

        log::info!("calling {} with {:?}", JNI_WINE_INIT_SYMBOL, plan.argv);
        // SAFETY: env is attached to this thread; class is a live global ref; both arrays are
        // live local refs owned by this frame.
        let ret = unsafe { wine_init(env.get_raw(), self.class.as_obj().as_raw(), argv.as_raw(), envp.as_raw()) };
        if ret.is_null() {
            return Ok(String::new());
        }

        // SAFETY: a non-null return is a local String reference.
        let ret = unsafe { JString::from_raw(ret) };
        let diagnostic: String = env.get_string(&ret).map_err(jni_err)?.into();
        Ok(diagnostic)
    }
}

fn string_array<'local>(env: &mut JNIEnv<'local>, items: &[String]) -> jni::errors::Result<JObjectArray<'local>> {
    let arr = env.new_object_array(items.len() as jsize, "java/lang/String", JObject::null())?;
    for (i, item) in items.iter().enumerate() {
        let s = env.new_string(item)?;
        env.set_object_array_element(&arr, i as jsize, &s)?;
        env.delete_local_ref(s)?;
    }
    Ok(arr)
}

fn java_string_method(env: &mut JNIEnv, obj: &JObject, name: &str) -> Result<String> {
    let value = env.call_method(obj, name, "()Ljava/lang/String;", &[])?.l()?;
    let value = JString::from(value);
    Ok(env.get_string(&value)?.into())
}

/// `Locale.getDefault()` of the running VM.
fn java_default_locale(env: &mut JNIEnv) -> Result<Locale> {
    let locale = env
        .call_static_method("java/util/Locale", "getDefault", "()Ljava/util/Locale;", &[])?
        .l()?;
    let language = java_string_method(env, &locale, "getLanguage")?;
    let country = java_string_method(env, &locale, "getCountry")?;
    Ok(Locale::new(&language, &country))
}

fn initialize(env: &mut JNIEnv, class: &JClass, root: &JString, cmdline: &JString) -> Result<()> {
    if root.is_null() {
        bail!("root is null");
    }
    let root: String = env.get_string(root).context("root is not a valid string")?.into();
    let cmdline = if cmdline.is_null() {
        None
    } else {
        Some(String::from(env.get_string(cmdline).context("cmdline is not a valid string")?))
    };

    let mut config = LaunchConfig::from_env(root, cmdline);
    config.locale = Some(java_default_locale(env)?);

    let entry = JniWineEntry { vm: env.get_java_vm()?, class: env.new_global_ref(class)? };
    initialize_wine(config, Arc::new(entry));
    Ok(())
}

#[no_mangle]
pub extern "system" fn Java_org_winehq_wine_sharedwine_initializeWine<'local>(
    mut env: JNIEnv<'local>,
    class: JClass<'local>,
    root: JString<'local>,
    cmdline: JString<'local>,
) {
    Logger::init_logging(None);

    let res = std::panic::catch_unwind(AssertUnwindSafe(|| initialize(&mut env, &class, &root, &cmdline)));
    match res {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("initializeWine: {e:?}"),
        Err(_) => log::error!("initializeWine: panicked"),
    }
}
