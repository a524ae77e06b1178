//! Initial context from the environment.
//!
//! | Variable                | Values                                   |
//! |-------------------------|------------------------------------------|
//! | `TENSOR_DEFAULT_DEVICE` | `cpu`, `cuda` (`gpu`)                    |
//! | `TENSOR_DEFAULT_DTYPE`  | `float` (`f32`), `double` (`f64`)        |
//! | `TENSOR_DEBUG`          | `1`/`true`/`yes`/`on`, `0`/`false`/`no`/`off` |
//!
//! The variables are read once per process. Unset or empty variables keep the built-in value
//! ([`Context::new`]: CPU, single precision, debug off); values that fail to parse are logged and
//! ignored. A set variable replaces the built-in start state for every thread, so a process that
//! must start with debug off should leave `TENSOR_DEBUG` unset.

use std::{env, sync::OnceLock};

use super::Context;
use crate::device::Device;

pub const DEVICE_VAR: &str = "TENSOR_DEFAULT_DEVICE";
pub const DTYPE_VAR: &str = "TENSOR_DEFAULT_DTYPE";
pub const DEBUG_VAR: &str = "TENSOR_DEBUG";

static INITIAL: OnceLock<Context> = OnceLock::new();

pub(super) fn initial() -> Context {
    *INITIAL.get_or_init(|| {
        let context = from_env();
        log::debug!("initial context: {context}");
        context
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builds a context from the built-in one, overridden by whatever `lookup` returns for the variables.
#[cfg_attr(feature = "trace", tracing::instrument(level = "debug", skip_all))]
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Context {
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let mut context = Context::new();

    if let Some(value) = var(DEVICE_VAR) {
        match value.parse::<Device>() {
            Ok(device) => context = context.with_device(device),
            Err(err) => log::warn!("ignoring {DEVICE_VAR}: {err}"),
        }
    }

    if let Some(value) = var(DTYPE_VAR) {
        match value.parse().and_then(|dtype| context.try_with_dtype(dtype)) {
            Ok(with_dtype) => context = with_dtype,
            Err(err) => log::warn!("ignoring {DTYPE_VAR}: {err}"),
        }
    }

    if let Some(value) = var(DEBUG_VAR) {
        match parse_bool(&value) {
            Some(debug) => context = context.with_debug(debug),
            None => log::warn!("ignoring {DEBUG_VAR}: `{value}` is not a boolean"),
        }
    }

    context
}

/// Builds a context from the process environment, read afresh.
#[inline]
pub fn from_env() -> Context {
    from_lookup(|key| env::var(key).ok())
}
