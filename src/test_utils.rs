use std::env;
use std::sync::Mutex;

pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

pub(crate) struct EnvVarGuard {
    key: String,
    prev: Option<String>,
}

fn set_env(key: &str, value: Option<&str>) -> Option<String> {
    let prev = env::var(key).ok();
    if let Some(value) = value {
        unsafe {
            env::set_var(key, value);
        }
    } else {
        unsafe {
            env::remove_var(key);
        }
    }
    prev
}

pub(crate) fn set_env_guard(key: &str, value: Option<&str>) -> EnvVarGuard {
    EnvVarGuard {
        key: key.to_string(),
        prev: set_env(key, value),
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let prev = self.prev.take();
        set_env(&self.key, prev.as_deref());
    }
}
