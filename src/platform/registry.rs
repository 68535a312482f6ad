//! Per-user registry backend for persisted settings
//!
//! Values live as REG_BINARY under a subkey of HKEY_CURRENT_USER. Each call
//! opens the key, performs its reads or writes and closes it again.

use windows::core::{Error as WindowsError, PCWSTR};
use windows::Win32::Foundation::ERROR_FILE_NOT_FOUND;
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_BINARY, REG_OPTION_NON_VOLATILE,
    REG_VALUE_TYPE, RegCloseKey, RegCreateKeyExW, RegOpenKeyExW, RegQueryValueExW,
    RegSetValueExW,
};

use crate::config::{SettingsStore, StoreError};
use crate::platform::windows::to_wide;

/// Open registry key, closed on drop
struct KeyGuard(HKEY);

impl Drop for KeyGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// Settings store rooted at `HKEY_CURRENT_USER\<subkey>`
#[derive(Debug, Clone)]
pub struct RegistryStore {
    subkey: String,
}

impl RegistryStore {
    pub fn new(subkey: &str) -> Self {
        Self {
            subkey: subkey.to_string(),
        }
    }

    fn open_for_read(&self) -> Result<KeyGuard, StoreError> {
        let subkey = to_wide(&self.subkey);
        let mut key = HKEY::default();
        unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(subkey.as_ptr()),
                0,
                KEY_READ,
                &mut key,
            )
        }
        .map_err(|err| {
            if is_not_found(&err) {
                StoreError::NotFound {
                    name: self.subkey.clone(),
                }
            } else {
                self.open_failed(&err)
            }
        })?;

        Ok(KeyGuard(key))
    }

    fn open_for_write(&self) -> Result<KeyGuard, StoreError> {
        let subkey = to_wide(&self.subkey);
        let mut key = HKEY::default();
        unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(subkey.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_WRITE,
                None,
                &mut key,
                None,
            )
        }
        .map_err(|err| self.open_failed(&err))?;

        Ok(KeyGuard(key))
    }

    fn open_failed(&self, err: &WindowsError) -> StoreError {
        StoreError::OpenFailed {
            key: self.subkey.clone(),
            code: err.code().0,
        }
    }
}

fn is_not_found(err: &WindowsError) -> bool {
    err.code() == ERROR_FILE_NOT_FOUND.to_hresult()
}

fn read_failed(name: &str, err: &WindowsError) -> StoreError {
    if is_not_found(err) {
        StoreError::NotFound {
            name: name.to_string(),
        }
    } else {
        StoreError::ReadFailed {
            name: name.to_string(),
            code: err.code().0,
        }
    }
}

impl SettingsStore for RegistryStore {
    fn read_binary(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let key = self.open_for_read()?;
        let value_name = to_wide(name);

        // First call sizes the buffer
        let mut value_type = REG_VALUE_TYPE::default();
        let mut size = 0u32;
        unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&mut value_type),
                None,
                Some(&mut size),
            )
        }
        .map_err(|err| read_failed(name, &err))?;

        if value_type != REG_BINARY {
            return Err(StoreError::ReadFailed {
                name: name.to_string(),
                code: -1,
            });
        }

        let mut data = vec![0u8; size as usize];
        unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(value_name.as_ptr()),
                None,
                None,
                Some(data.as_mut_ptr()),
                Some(&mut size),
            )
        }
        .map_err(|err| read_failed(name, &err))?;

        data.truncate(size as usize);
        Ok(data)
    }

    fn write_binary(&mut self, values: &[(&str, &[u8])]) -> Result<(), StoreError> {
        let key = self.open_for_write()?;

        for &(name, bytes) in values {
            let value_name = to_wide(name);
            unsafe {
                RegSetValueExW(
                    key.0,
                    PCWSTR(value_name.as_ptr()),
                    0,
                    REG_BINARY,
                    Some(bytes),
                )
            }
            .map_err(|err| StoreError::WriteFailed {
                name: name.to_string(),
                code: err.code().0,
            })?;
        }

        Ok(())
    }
}
