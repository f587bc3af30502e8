//! Host operating system and architecture detection.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};

use super::matrix::Arch;

/// Set this to `<os>-<bits>` (such as `linux-64`, `windows-32`) to skip detection
/// and pretend to be running on another host.
pub const HOST_OVERRIDE_ENV: &str = "TDM_OVERRIDE_HOST";

/// Operating systems that dependencies are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
}

impl Os {
    /// Anything that is not Windows builds with the Linux profiles.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// The lowercase name used in profile file names and output directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            _ => bail!("unsupported operating system '{s}', expecting 'windows' or 'linux'"),
        }
    }
}

/// Facts about the machine the driver runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: Os,
    pub arch: Arch,
    /// Machine name as reported by the system, e.g. `x86_64`, `i686`, `aarch64`.
    pub machine: String,
}

impl HostInfo {
    pub fn new(os: Os, machine: impl Into<String>) -> Self {
        let machine = machine.into();
        Self {
            os,
            arch: Arch::from_machine(&machine),
            machine,
        }
    }

    /// Detect the current host, unless [`HOST_OVERRIDE_ENV`] is set.
    pub fn detect() -> Result<Self> {
        if let Ok(over) = env::var(HOST_OVERRIDE_ENV) {
            return Self::from_override(&over);
        }
        let machine = machine_name()
            .ok_or_else(|| anyhow!("unable to determine the architecture of current machine"))?;
        Ok(Self::new(Os::current(), machine))
    }

    /// Parse an `<os>-<bits>` host description.
    pub fn from_override(s: &str) -> Result<Self> {
        let (os, bits) = s.trim().split_once('-').ok_or_else(|| {
            anyhow!("invalid value '{s}' for {HOST_OVERRIDE_ENV}, expecting '<os>-<32|64>'")
        })?;
        let os: Os = os.parse()?;
        let machine = match bits {
            "64" => "x86_64",
            "32" => "i686",
            _ => bail!("invalid bitness '{bits}' in {HOST_OVERRIDE_ENV}, expecting '32' or '64'"),
        };
        Ok(Self::new(os, machine))
    }

    pub fn is_64bit(&self) -> bool {
        self.arch == Arch::X64
    }
}

#[cfg(windows)]
fn machine_name() -> Option<String> {
    use std::mem;

    /// Get the host architecture using `IsWow64Process2`. This function
    /// produces the most accurate results (supports detecting aarch64), but
    /// it is only available on Windows 10 1511+, so we use `GetProcAddress`
    /// to maintain backward compatibility with older Windows versions.
    fn arch_primary() -> Option<&'static str> {
        use windows_sys::core::s;
        use windows_sys::Win32::Foundation::{BOOL, HANDLE};
        use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};
        use windows_sys::Win32::System::Threading::GetCurrentProcess;

        const IMAGE_FILE_MACHINE_ARM64: u16 = 0xAA64;
        const IMAGE_FILE_MACHINE_AMD64: u16 = 0x8664;
        const IMAGE_FILE_MACHINE_I386: u16 = 0x014c;

        #[allow(non_snake_case)]
        let IsWow64Process2: unsafe extern "system" fn(HANDLE, *mut u16, *mut u16) -> BOOL = unsafe {
            let module = GetModuleHandleA(s!("kernel32.dll"));
            if module == 0 {
                return None;
            }
            mem::transmute(GetProcAddress(module, s!("IsWow64Process2"))?)
        };

        let mut _machine = 0;
        let mut native_machine = 0;
        unsafe {
            // cannot fail; handle does not need to be closed.
            let process = GetCurrentProcess();
            if IsWow64Process2(process, &mut _machine, &mut native_machine) == 0 {
                return None;
            }
        };
        match native_machine {
            IMAGE_FILE_MACHINE_AMD64 => Some("x86_64"),
            IMAGE_FILE_MACHINE_I386 => Some("i686"),
            IMAGE_FILE_MACHINE_ARM64 => Some("aarch64"),
            _ => None,
        }
    }

    /// Get the host architecture using `GetNativeSystemInfo`.
    /// Does not support detecting aarch64.
    fn arch_fallback() -> Option<&'static str> {
        use windows_sys::Win32::System::SystemInformation::GetNativeSystemInfo;

        const PROCESSOR_ARCHITECTURE_AMD64: u16 = 9;
        const PROCESSOR_ARCHITECTURE_INTEL: u16 = 0;

        let mut sys_info;
        unsafe {
            sys_info = mem::zeroed();
            GetNativeSystemInfo(&mut sys_info);
        }

        match unsafe { sys_info.Anonymous.Anonymous }.wProcessorArchitecture {
            PROCESSOR_ARCHITECTURE_AMD64 => Some("x86_64"),
            PROCESSOR_ARCHITECTURE_INTEL => Some("i686"),
            _ => None,
        }
    }

    arch_primary().or_else(arch_fallback).map(ToOwned::to_owned)
}

#[cfg(not(windows))]
fn machine_name() -> Option<String> {
    use std::ffi::CStr;
    use std::mem;

    let mut sys_info;
    let machine = unsafe {
        sys_info = mem::zeroed();
        if libc::uname(&mut sys_info) != 0 {
            return None;
        }
        CStr::from_ptr(sys_info.machine.as_ptr()).to_bytes()
    };

    Some(String::from_utf8_lossy(machine).into_owned())
}
