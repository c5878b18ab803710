//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`].
//!
//! | Namespace  | Key      | Contents                                  |
//! |------------|----------|-------------------------------------------|
//! | `motorsrv` | `syscfg` | [`SystemConfig`] as JSON                  |
//! | `wifi`     | `config` | `ssid=...` / `password=...` lines         |
//!
//! Stored configs are validated on load and on save.  Namespace and key
//! names are limited to 15 bytes by NVS.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::{SystemConfig, WifiCredentials};
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const CONFIG_NAMESPACE: &str = "motorsrv";
const CONFIG_KEY: &str = "syscfg";
const WIFI_NAMESPACE: &str = "wifi";
const WIFI_KEY: &str = "config";

const MAX_BLOB_SIZE: usize = 2048;
const NVS_NAME_MAX: usize = 15;

/// NUL-terminated copy of an NVS namespace or key.
fn c_name(name: &str) -> Result<[u8; NVS_NAME_MAX + 1], StorageError> {
    if name.is_empty() || name.len() > NVS_NAME_MAX || name.as_bytes().contains(&0) {
        return Err(StorageError::IoError);
    }
    let mut buf = [0u8; NVS_NAME_MAX + 1];
    buf[..name.len()].copy_from_slice(name.as_bytes());
    Ok(buf)
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the single main-task context before any
            // concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> Result<String, StorageError> {
        c_name(namespace)?;
        c_name(key)?;
        Ok(format!("{}::{}", namespace, key))
    }

    /// Open an NVS namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = c_name(namespace).map_err(|_| ESP_ERR_NVS_INVALID_NAME as i32)?;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Whole blob under `namespace/key`, bounded by [`MAX_BLOB_SIZE`].
    fn read_blob(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut buf = vec![0u8; MAX_BLOB_SIZE];
        let len = self.read(namespace, key, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Wi-Fi credentials stored by the provisioning tool, if any.
    pub fn load_wifi_credentials(&self) -> Result<WifiCredentials, ConfigError> {
        let bytes = self.read_blob(WIFI_NAMESPACE, WIFI_KEY)?;
        let text = core::str::from_utf8(&bytes).map_err(|_| ConfigError::Corrupted)?;
        WifiCredentials::parse(text)
    }

    pub fn store_wifi_credentials(&mut self, creds: &WifiCredentials) -> Result<(), ConfigError> {
        let text = format!("ssid={}\npassword={}\n", creds.ssid, creds.password);
        self.write(WIFI_NAMESPACE, WIFI_KEY, text.as_bytes())?;
        info!("NvsAdapter: WiFi credentials saved (SSID='{}')", creds.ssid);
        Ok(())
    }

    /// Stored credentials, else `fallback`, which is persisted so later
    /// boots find it in NVS.
    pub fn wifi_credentials_or(
        &mut self,
        fallback: Option<WifiCredentials>,
    ) -> Option<WifiCredentials> {
        if let Ok(creds) = self.load_wifi_credentials() {
            return Some(creds);
        }
        let creds = fallback?;
        if let Err(e) = self.store_wifi_credentials(&creds) {
            warn!("NvsAdapter: could not persist WiFi credentials ({})", e);
        }
        Some(creds)
    }
}

impl ConfigPort for NvsAdapter {
    /// Stored config, or defaults when nothing has been saved yet.
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = match self.read_blob(CONFIG_NAMESPACE, CONFIG_KEY) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("NvsAdapter: config read failed ({})", e);
                return Err(e.into());
            }
        };
        let cfg: SystemConfig =
            serde_json::from_slice(&bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = serde_json::to_vec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::ValidationFailed("config exceeds NVS blob size"));
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY)?;
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            // `save` takes &self, so the blob write goes through the handle
            // directly rather than StoragePort::write.
            let key = c_name(CONFIG_KEY)?;
            let result = Self::with_nvs_handle(CONFIG_NAMESPACE, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(handle, key.as_ptr() as *const _, bytes.as_ptr() as *const _, bytes.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = c_name(key)?;
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(handle, key.as_ptr() as *const _, buf.as_mut_ptr() as *mut _, &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(size)
            });
            match result {
                Ok(size) => Ok(size),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = c_name(key)?;
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(handle, key.as_ptr() as *const _, data.as_ptr() as *const _, data.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => Ok(()),
                Err(e) if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE => Err(StorageError::Full),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key)?;
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = c_name(key)?;
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key.as_ptr() as *const _) };
                if ret != ESP_OK && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            Self::composite_key(namespace, key)
                .map(|composite| self.store.borrow().contains_key(&composite))
                .unwrap_or(false)
        }

        #[cfg(target_os = "espidf")]
        {
            let Ok(key) = c_name(key) else {
                return false;
            };
            Self::with_nvs_handle(namespace, false, |handle| {
                let ret = unsafe { nvs_find_key(handle, key.as_ptr() as *const _, core::ptr::null_mut()) };
                Ok(ret == ESP_OK)
            })
            .unwrap_or(false)
        }
    }
}
