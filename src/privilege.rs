/// Source of the "are we already elevated" answer checked before any scan runs.
pub trait PrivilegeProbe: Send + Sync {
    fn is_elevated(&self) -> bool;
}

/// Asks the operating system about the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPrivilege;

impl PrivilegeProbe for SystemPrivilege {
    fn is_elevated(&self) -> bool {
        is_root()
    }
}

/// Fixed answer, for headless callers that have already checked.
#[derive(Debug, Clone, Copy)]
pub struct AssumePrivilege(pub bool);

impl PrivilegeProbe for AssumePrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(windows)]
    {
        use std::mem;
        use std::ptr;
        use winapi::shared::minwindef::{DWORD, FALSE};
        use winapi::um::processthreadsapi::{GetCurrentProcess, OpenProcessToken};
        use winapi::um::securitybaseapi::GetTokenInformation;
        use winapi::um::winnt::{TokenElevation, TOKEN_QUERY};

        unsafe {
            let mut token_handle = ptr::null_mut();
            if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token_handle) == FALSE {
                return false;
            }

            let mut elevation: DWORD = 0;
            let mut return_length: DWORD = 0;
            let result = GetTokenInformation(
                token_handle,
                TokenElevation,
                &mut elevation as *mut _ as *mut _,
                mem::size_of::<DWORD>() as DWORD,
                &mut return_length,
            );
            winapi::um::handleapi::CloseHandle(token_handle);

            result != FALSE && elevation != 0
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumed_privilege() {
        assert!(AssumePrivilege(true).is_elevated());
        assert!(!AssumePrivilege(false).is_elevated());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_probe_matches_euid() {
        let euid_is_zero = unsafe { libc::geteuid() } == 0;
        assert_eq!(SystemPrivilege.is_elevated(), euid_is_zero);
    }
}
