// src/constants.rs

pub const PROGRAM: &str = "zenstab";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Family code shared by Zen, Zen+ and Zen 2 parts (family 17h). Everything
/// this tool pokes at is family-specific, so other families are refused.
pub const ZEN_FAMILY: u32 = 0x17;
pub const AMD_VENDOR_ID: &str = "AuthenticAMD";

/// Kernel cpulist of the currently online logical cores.
pub const ONLINE_CPUS_PATH: &str = "/sys/devices/system/cpu/online";

/// Host-wide ASLR control. 0 turns randomization off; 2 randomizes mmap
/// base, stack, VDSO and brk.
pub const ASLR_SYSCTL_PATH: &str = "/proc/sys/kernel/randomize_va_space";
pub const ASLR_FULL_RANDOMIZATION: u32 = 2;
pub const ASLR_NO_RANDOMIZATION: u32 = 0;
