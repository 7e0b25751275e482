//! ABI layer for host introspection (`fossil_hostsys_*`).

use std::ffi::{CStr, c_char};
use std::ptr;

use fossil_core::hostsys::{FIELD_LIMIT, HostSystem};

use crate::util::write_c_buf;

pub const FOSSIL_HOSTSYS_FIELD_SIZE: usize = FIELD_LIMIT + 1;

/// Fixed-layout host record.
#[repr(C)]
#[allow(non_camel_case_types)]
pub struct fossil_hostsystem_t {
    pub os_name: [c_char; FOSSIL_HOSTSYS_FIELD_SIZE],
    pub os_version: [c_char; FOSSIL_HOSTSYS_FIELD_SIZE],
    pub cpu_model: [c_char; FOSSIL_HOSTSYS_FIELD_SIZE],
    pub cpu_cores: i32,
    pub total_memory: i64,
    pub free_memory: i64,
    pub is_big_endian: bool,
}

impl fossil_hostsystem_t {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            os_name: [0; FOSSIL_HOSTSYS_FIELD_SIZE],
            os_version: [0; FOSSIL_HOSTSYS_FIELD_SIZE],
            cpu_model: [0; FOSSIL_HOSTSYS_FIELD_SIZE],
            cpu_cores: 0,
            total_memory: 0,
            free_memory: 0,
            is_big_endian: false,
        }
    }

    fn fill(&mut self, host: &HostSystem) {
        *self = Self::zeroed();
        unsafe {
            write_c_buf(self.os_name.as_mut_ptr(), FOSSIL_HOSTSYS_FIELD_SIZE, host.os_name.as_bytes());
            write_c_buf(
                self.os_version.as_mut_ptr(),
                FOSSIL_HOSTSYS_FIELD_SIZE,
                host.os_version.as_bytes(),
            );
            write_c_buf(self.cpu_model.as_mut_ptr(), FOSSIL_HOSTSYS_FIELD_SIZE, host.cpu_model.as_bytes());
        }
        self.cpu_cores = i32::try_from(host.cpu_cores).unwrap_or(i32::MAX);
        self.total_memory = i64::try_from(host.total_memory_mb).unwrap_or(i64::MAX);
        self.free_memory = i64::try_from(host.free_memory_mb).unwrap_or(i64::MAX);
        self.is_big_endian = host.is_big_endian;
    }

    fn to_host(&self) -> HostSystem {
        let text = |field: &[c_char; FOSSIL_HOSTSYS_FIELD_SIZE]| {
            // The last byte is always NUL after `fill`; scan stops there at worst.
            unsafe { CStr::from_ptr(field.as_ptr()) }
                .to_string_lossy()
                .into_owned()
        };
        HostSystem {
            os_name: text(&self.os_name),
            os_version: text(&self.os_version),
            cpu_model: text(&self.cpu_model),
            cpu_cores: u32::try_from(self.cpu_cores).unwrap_or(0),
            total_memory_mb: u64::try_from(self.total_memory).unwrap_or(0),
            free_memory_mb: u64::try_from(self.free_memory).unwrap_or(0),
            is_big_endian: self.is_big_endian,
        }
    }
}

/// Fill `info` with the running host's description. Returns false on null
/// `info` or when the host cannot be probed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_hostsys_get(info: *mut fossil_hostsystem_t) -> bool {
    if info.is_null() {
        return false;
    }
    match HostSystem::query() {
        Ok(host) => {
            unsafe { (*info).fill(&host) };
            true
        }
        Err(_) => false,
    }
}

/// Print the six-line host report to stdout.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_hostsys_print(info: *const fossil_hostsystem_t) {
    if info.is_null() {
        return;
    }
    let mut record = unsafe { ptr::read(info) };
    // Force termination so a caller-built record cannot be over-read.
    for field in [&mut record.os_name, &mut record.os_version, &mut record.cpu_model] {
        field[FOSSIL_HOSTSYS_FIELD_SIZE - 1] = 0;
    }
    print!("{}", record.to_host());
}

/// Static `"Big Endian"` / `"Little Endian"` string for `info`, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fossil_hostsys_endian(info: *const fossil_hostsystem_t) -> *const c_char {
    if info.is_null() {
        return ptr::null();
    }
    if unsafe { (*info).is_big_endian } {
        c"Big Endian".as_ptr()
    } else {
        c"Little Endian".as_ptr()
    }
}
