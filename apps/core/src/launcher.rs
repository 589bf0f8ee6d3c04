use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    EmptyPath,
    Cancelled,
    Failed(u32),
    Unsupported,
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "uninstaller path is empty"),
            Self::Cancelled => write!(f, "elevation prompt was declined"),
            Self::Failed(code) => write!(f, "process creation failed (code {code})"),
            Self::Unsupported => write!(f, "elevated launch is only supported on Windows"),
        }
    }
}

impl std::error::Error for LaunchError {}

/// Starts `path` elevated with the given argument tokens and returns the new
/// process id without waiting for exit. Tokens are joined with single spaces;
/// any quoting the parser preserved goes through verbatim.
pub fn launch_elevated(path: &str, args: &[String]) -> Result<u32, LaunchError> {
    if path.trim().is_empty() {
        return Err(LaunchError::EmptyPath);
    }

    #[cfg(target_os = "windows")]
    {
        windows::shell_execute_elevated(path, &args.join(" "))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = args;
        Err(LaunchError::Unsupported)
    }
}

#[cfg(target_os = "windows")]
mod windows {
    use super::LaunchError;

    use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, ERROR_CANCELLED};
    use windows_sys::Win32::System::Threading::GetProcessId;
    use windows_sys::Win32::UI::Shell::{
        ShellExecuteExW, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW,
    };
    use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    pub(super) fn shell_execute_elevated(
        path: &str,
        parameters: &str,
    ) -> Result<u32, LaunchError> {
        let verb_wide = to_wide("runas");
        let path_wide = to_wide(path);
        let parameters_wide = to_wide(parameters);
        let parameters_ptr = if parameters.trim().is_empty() {
            std::ptr::null()
        } else {
            parameters_wide.as_ptr()
        };

        let mut info: SHELLEXECUTEINFOW = unsafe { std::mem::zeroed() };
        info.cbSize = std::mem::size_of::<SHELLEXECUTEINFOW>() as u32;
        info.fMask = SEE_MASK_NOCLOSEPROCESS;
        info.lpVerb = verb_wide.as_ptr();
        info.lpFile = path_wide.as_ptr();
        info.lpParameters = parameters_ptr;
        info.nShow = SW_SHOWNORMAL;

        let created = unsafe { ShellExecuteExW(&mut info) };
        if created == 0 {
            let code = unsafe { GetLastError() };
            if code == ERROR_CANCELLED {
                return Err(LaunchError::Cancelled);
            }
            return Err(LaunchError::Failed(code));
        }

        if info.hProcess.is_null() {
            return Err(LaunchError::Failed(0));
        }

        let pid = unsafe { GetProcessId(info.hProcess) };
        unsafe {
            CloseHandle(info.hProcess);
        }
        if pid == 0 {
            return Err(LaunchError::Failed(0));
        }
        Ok(pid)
    }

    fn to_wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }
}
