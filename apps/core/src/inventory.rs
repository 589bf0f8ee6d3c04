use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{compare_versions, App};

/// Registry hive a scan scope lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

impl Hive {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LocalMachine => "HKLM",
            Self::CurrentUser => "HKCU",
        }
    }
}

/// One (hive, subpath) pair the scanner walks. The table covers both
/// machine-wide and per-user scopes and both architecture views; adding a
/// scope means adding a row here, not touching scan logic.
#[derive(Debug, Clone, Copy)]
pub struct ScanScope {
    pub hive: Hive,
    pub subpath: &'static str,
}

pub const SCAN_SCOPES: [ScanScope; 4] = [
    ScanScope {
        hive: Hive::LocalMachine,
        subpath: r"Software\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    },
    ScanScope {
        hive: Hive::LocalMachine,
        subpath: r"Software\Microsoft\Windows\CurrentVersion\Uninstall",
    },
    ScanScope {
        hive: Hive::CurrentUser,
        subpath: r"Software\Microsoft\Windows\CurrentVersion\Uninstall",
    },
    ScanScope {
        hive: Hive::CurrentUser,
        subpath: r"Software\Wow6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    },
];

/// Builds a fresh inventory from the uninstall registry. Best-effort all the
/// way down: scopes or records that cannot be read are skipped, and an empty
/// result is a valid scan.
pub fn scan() -> Vec<App> {
    #[cfg(target_os = "windows")]
    {
        dedupe_by_highest_version(windows::collect_records())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Vec::new()
    }
}

/// Collapses raw records to at most one per DisplayName, keeping the record
/// with the strictly higher version. When versions compare equal the record
/// already held wins, unless it lacks an InstallLocation and the newcomer
/// has one. Output is sorted ascending by DisplayName.
pub fn dedupe_by_highest_version(records: Vec<App>) -> Vec<App> {
    let mut by_name: HashMap<String, App> = HashMap::new();

    for record in records {
        match by_name.get(&record.display_name) {
            None => {
                by_name.insert(record.display_name.clone(), record);
            }
            Some(held) => {
                let keep_newcomer =
                    match compare_versions(&record.display_version, &held.display_version) {
                        Ordering::Greater => true,
                        Ordering::Equal => {
                            held.install_location.trim().is_empty()
                                && !record.install_location.trim().is_empty()
                        }
                        Ordering::Less => false,
                    };
                if keep_newcomer {
                    by_name.insert(record.display_name.clone(), record);
                }
            }
        }
    }

    let mut apps: Vec<App> = by_name.into_values().collect();
    apps.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    apps
}

/// Case-insensitive substring match over DisplayName. Returns every hit;
/// disambiguation is the caller's problem.
pub fn find_matches<'a>(apps: &'a [App], query: &str) -> Vec<&'a App> {
    let needle = query.to_lowercase();
    apps.iter()
        .filter(|app| app.display_name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(target_os = "windows")]
mod windows {
    use super::{ScanScope, SCAN_SCOPES};
    use crate::logging;
    use crate::model::App;

    use windows_sys::Win32::Foundation::{ERROR_NO_MORE_ITEMS, ERROR_SUCCESS};
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegEnumKeyExW, RegOpenKeyExW, RegQueryInfoKeyW, RegQueryValueExW,
        HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, REG_DWORD, REG_EXPAND_SZ, REG_SZ,
    };

    impl super::Hive {
        fn root(&self) -> HKEY {
            match self {
                Self::LocalMachine => HKEY_LOCAL_MACHINE,
                Self::CurrentUser => HKEY_CURRENT_USER,
            }
        }
    }

    pub(super) fn collect_records() -> Vec<App> {
        let mut records = Vec::new();
        for scope in SCAN_SCOPES {
            collect_scope(&scope, &mut records);
        }
        records
    }

    fn collect_scope(scope: &ScanScope, out: &mut Vec<App>) {
        let mut scope_key: HKEY = std::ptr::null_mut();
        let subpath_wide = to_wide(scope.subpath);
        let open_status = unsafe {
            RegOpenKeyExW(
                scope.hive.root(),
                subpath_wide.as_ptr(),
                0,
                KEY_READ,
                &mut scope_key,
            )
        };
        if open_status != ERROR_SUCCESS {
            logging::warn(&format!(
                "scan: skipping scope {}\\{} (code {open_status})",
                scope.hive.label(),
                scope.subpath
            ));
            return;
        }

        let mut subkey_count = 0_u32;
        let mut max_subkey_len = 0_u32;
        let info_status = unsafe {
            RegQueryInfoKeyW(
                scope_key,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut subkey_count,
                &mut max_subkey_len,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if info_status != ERROR_SUCCESS {
            unsafe {
                RegCloseKey(scope_key);
            }
            return;
        }

        let mut name_buffer = vec![0_u16; max_subkey_len as usize + 2];
        for index in 0..subkey_count {
            let mut name_len = max_subkey_len + 1;
            let enum_status = unsafe {
                RegEnumKeyExW(
                    scope_key,
                    index,
                    name_buffer.as_mut_ptr(),
                    &mut name_len,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                )
            };
            if enum_status == ERROR_NO_MORE_ITEMS {
                break;
            }
            if enum_status != ERROR_SUCCESS {
                continue;
            }

            let record_name = String::from_utf16_lossy(&name_buffer[..name_len as usize]);
            if let Some(app) = read_record(scope, scope_key, &record_name) {
                out.push(app);
            }
        }

        unsafe {
            RegCloseKey(scope_key);
        }
    }

    fn read_record(scope: &ScanScope, scope_key: HKEY, record_name: &str) -> Option<App> {
        let record_wide = to_wide(record_name);
        let mut record_key: HKEY = std::ptr::null_mut();
        let open_status = unsafe {
            RegOpenKeyExW(
                scope_key,
                record_wide.as_ptr(),
                0,
                KEY_READ,
                &mut record_key,
            )
        };
        if open_status != ERROR_SUCCESS {
            return None;
        }

        let app = build_record(scope, record_key, record_name);
        unsafe {
            RegCloseKey(record_key);
        }
        app
    }

    fn build_record(scope: &ScanScope, key: HKEY, record_name: &str) -> Option<App> {
        if read_u32_value(key, "SystemComponent") == Some(1) {
            return None;
        }

        let display_name = read_string_value(key, "DisplayName")?;
        let uninstall_string = read_string_value(key, "UninstallString")?;

        Some(App {
            display_name: display_name.trim().to_string(),
            display_version: read_string_value(key, "DisplayVersion").unwrap_or_default(),
            publisher: read_string_value(key, "Publisher").unwrap_or_default(),
            install_date: read_string_value(key, "InstallDate").unwrap_or_default(),
            uninstall_string,
            install_location: read_string_value(key, "InstallLocation").unwrap_or_default(),
            display_icon: read_string_value(key, "DisplayIcon").unwrap_or_default(),
            registry_key: format!(
                "{}\\{}\\{}",
                scope.hive.label(),
                scope.subpath,
                record_name
            ),
            estimated_size: read_u32_value(key, "EstimatedSize").unwrap_or(0),
        })
    }

    fn read_string_value(key: HKEY, value_name: &str) -> Option<String> {
        let value_name_wide = to_wide(value_name);
        let mut value_type = 0_u32;
        let mut size = 0_u32;
        let probe_status = unsafe {
            RegQueryValueExW(
                key,
                value_name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                std::ptr::null_mut(),
                &mut size,
            )
        };
        if probe_status != ERROR_SUCCESS || size == 0 {
            return None;
        }
        if value_type != REG_SZ && value_type != REG_EXPAND_SZ {
            return None;
        }

        let mut buffer = vec![0_u8; size as usize];
        let read_status = unsafe {
            RegQueryValueExW(
                key,
                value_name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                buffer.as_mut_ptr(),
                &mut size,
            )
        };
        if read_status != ERROR_SUCCESS {
            return None;
        }

        let mut wide: Vec<u16> = buffer
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        while wide.last().copied() == Some(0) {
            wide.pop();
        }
        let value = String::from_utf16_lossy(&wide).trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn read_u32_value(key: HKEY, value_name: &str) -> Option<u32> {
        let value_name_wide = to_wide(value_name);
        let mut value_type = 0_u32;
        let mut size = std::mem::size_of::<u32>() as u32;
        let mut value = 0_u32;
        let status = unsafe {
            RegQueryValueExW(
                key,
                value_name_wide.as_ptr(),
                std::ptr::null(),
                &mut value_type,
                &mut value as *mut u32 as *mut u8,
                &mut size,
            )
        };
        if status != ERROR_SUCCESS || value_type != REG_DWORD {
            return None;
        }
        Some(value)
    }

    fn to_wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }
}
