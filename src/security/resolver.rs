//! Owner and DACL extraction (spec.md section 4.2).
//!
//! Grounded on two pack references that already call these exact Win32
//! functions through the `windows` crate: the probe-then-fetch
//! `GetFileSecurityW` dance and the `GetAce`/`ACCESS_ALLOWED_ACE` DACL walk
//! from `examples/other_examples/03830c6a_vpopescu-ark-mcp__src-utility.rs.rs`,
//! and the `LookupAccountSidW` two-call size/resolve pattern from
//! `examples/other_examples/1877da82_cristivlas-shmy__src-utils.rs.rs`. The
//! `GetNamedSecurityInfoW` managed fallback is grounded on the same
//! `vpopescu-ark-mcp` file and on
//! `examples/other_examples/66e1a0ac_Devolutions-devolutions-gateway__crates-win-api-wrappers-src-security-acl.rs.rs`.

use std::collections::HashMap;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use tracing::{debug, warn};
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{HLOCAL, PSID};
use windows::Win32::Security::Authorization::{
    ConvertSidToStringSidW, GetNamedSecurityInfoW, SE_FILE_OBJECT,
};
use windows::Win32::Security::{
    GetAce, GetSecurityDescriptorDacl, GetSecurityDescriptorOwner, LookupAccountSidW,
    ACCESS_ALLOWED_ACE, ACE_HEADER, ACL, DACL_SECURITY_INFORMATION, OWNER_SECURITY_INFORMATION,
    PSECURITY_DESCRIPTOR, SID_NAME_USE,
};
use windows::Win32::Storage::FileSystem::GetFileSecurityW;
use windows::Win32::System::Memory::LocalFree;

use crate::entry::EntryKind;
use crate::error::EntryError;
use crate::options::Options;
use crate::security::rights::mask_to_names;
use crate::security::sid_cache::SidCache;

const ACCESS_ALLOWED_ACE_TYPE: u8 = 0x0;
/// `INHERITED_ACE`, winnt.h.
const INHERITED_ACE_FLAG: u8 = 0x10;

/// Resolves the owner principal and DACL for one entry. Holds the
/// process-wide [`SidCache`] shared across every worker in a walk.
pub struct SecurityResolver {
    sid_cache: SidCache,
}

impl Default for SecurityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityResolver {
    #[must_use]
    pub fn new() -> Self {
        Self { sid_cache: SidCache::new() }
    }

    #[must_use]
    pub fn with_cache(sid_cache: SidCache) -> Self {
        Self { sid_cache }
    }

    #[must_use]
    pub fn cache(&self) -> &SidCache {
        &self.sid_cache
    }

    /// spec.md section 4.2 `resolve`: owner (if requested) and the full DACL.
    pub fn resolve(
        &self,
        path: &Path,
        kind: EntryKind,
        options: &Options,
    ) -> Result<(String, HashMap<String, String>), EntryError> {
        let _ = kind; // extraction does not branch on file vs directory.

        let acl = self.resolve_acl(path, options)?;
        let owner = if options.resolve_owner() {
            self.resolve_owner(path, options)?
        } else {
            String::new()
        };

        Ok((owner, acl))
    }

    fn resolve_owner(&self, path: &Path, options: &Options) -> Result<String, EntryError> {
        if options.use_native_owner() {
            match self.native_owner(path) {
                Ok(owner) => return Ok(owner),
                Err(err) if err.allows_managed_fallback() => {
                    warn!(path = %path.display(), "native owner lookup failed, falling back to managed path");
                }
                Err(err) => return Err(err),
            }
        }
        self.managed_owner(path)
    }

    /// *Native path* (spec.md section 4.2): `GetFileSecurityW` for
    /// `OWNER_SECURITY_INFORMATION`, then `GetSecurityDescriptorOwner`.
    fn native_owner(&self, path: &Path) -> Result<String, EntryError> {
        let buffer = fetch_security_descriptor(path, OWNER_SECURITY_INFORMATION)
            .map_err(|_| EntryError::SecurityError)?;

        let mut owner_sid = PSID::default();
        let mut owner_defaulted = windows::Win32::Foundation::BOOL(0);
        // SAFETY: `buffer` holds a security descriptor just filled by
        // `GetFileSecurityW` requesting owner information.
        unsafe {
            GetSecurityDescriptorOwner(
                PSECURITY_DESCRIPTOR(buffer.as_ptr() as *mut _),
                &mut owner_sid,
                &mut owner_defaulted,
            )
        }
        .map_err(|_| EntryError::SecurityError)?;

        let sid_string = sid_to_string(owner_sid)?;
        Ok(self.translate_sid(&sid_string, owner_sid))
    }

    /// *Managed path* (spec.md section 4.2 and `SPEC_FULL.md` section F):
    /// `GetNamedSecurityInfoW` requested by path, owner information only.
    fn managed_owner(&self, path: &Path) -> Result<String, EntryError> {
        let wide = to_wide_null(path);
        let mut owner_sid = PSID::default();
        let mut sd = PSECURITY_DESCRIPTOR::default();

        // SAFETY: FFI call; `sd` receives an OS-allocated descriptor freed below.
        let status = unsafe {
            GetNamedSecurityInfoW(
                PCWSTR(wide.as_ptr()),
                SE_FILE_OBJECT,
                OWNER_SECURITY_INFORMATION,
                Some(&mut owner_sid),
                None,
                None,
                None,
                &mut sd,
            )
        };

        if status.0 != 0 {
            return Err(EntryError::from_win32(status.0));
        }

        let sid_string = sid_to_string(owner_sid);
        // SAFETY: `sd` was allocated by the successful `GetNamedSecurityInfoW`
        // call above.
        unsafe {
            let _ = LocalFree(Some(HLOCAL(sd.0)));
        }

        Ok(self.translate_sid(&sid_string?, owner_sid))
    }

    /// ACL extraction "ALWAYS runs when entry emission is requested"
    /// (spec.md section 4.2).
    fn resolve_acl(&self, path: &Path, options: &Options) -> Result<HashMap<String, String>, EntryError> {
        let buffer = fetch_security_descriptor(path, DACL_SECURITY_INFORMATION)
            .map_err(|err| EntryError::from_win32(win32_code(&err)))?;

        let mut dacl_present = windows::Win32::Foundation::BOOL(0);
        let mut dacl: *mut ACL = std::ptr::null_mut();
        let mut dacl_defaulted = windows::Win32::Foundation::BOOL(0);
        // SAFETY: `buffer` holds a security descriptor just filled by
        // `GetFileSecurityW` requesting DACL information.
        unsafe {
            GetSecurityDescriptorDacl(
                PSECURITY_DESCRIPTOR(buffer.as_ptr() as *mut _),
                &mut dacl_present,
                &mut dacl,
                &mut dacl_defaulted,
            )
        }
        .map_err(|_| EntryError::SecurityError)?;

        let mut acl = HashMap::new();
        if !dacl_present.as_bool() || dacl.is_null() {
            return Ok(acl);
        }

        // SAFETY: `dacl` was populated by `GetSecurityDescriptorDacl` above
        // and stays valid for as long as `buffer` is alive.
        let ace_count = unsafe { (*dacl).AceCount };
        for index in 0..u32::from(ace_count) {
            let mut ace_ptr: *mut core::ffi::c_void = std::ptr::null_mut();
            // SAFETY: `index` is bounded by `ace_count`, read from the same DACL.
            if unsafe { GetAce(dacl, index, &mut ace_ptr) }.is_err() {
                continue;
            }

            // SAFETY: `ace_ptr` was populated by the successful `GetAce` call above.
            let header = unsafe { *ace_ptr.cast::<ACE_HEADER>() };
            if header.AceType != ACCESS_ALLOWED_ACE_TYPE {
                continue;
            }
            if !options.include_inherited() && header.AceFlags & INHERITED_ACE_FLAG != 0 {
                continue;
            }

            // SAFETY: an `ACCESS_ALLOWED_ACE_TYPE` header guarantees the ACE
            // layout matches `ACCESS_ALLOWED_ACE`.
            let ace = unsafe { &*ace_ptr.cast::<ACCESS_ALLOWED_ACE>() };
            let sid = PSID(std::ptr::addr_of!(ace.SidStart).cast_mut().cast());
            let Ok(sid_string) = sid_to_string(sid) else { continue };
            let identity = self.translate_sid(&sid_string, sid);
            acl.insert(identity, mask_to_names(ace.Mask));
        }

        Ok(acl)
    }

    /// spec.md section 4.2 `translate_sid`.
    fn translate_sid(&self, sid_string: &str, psid: PSID) -> String {
        if let Some(cached) = self.sid_cache.get(sid_string) {
            return cached;
        }

        let name = lookup_account_name(psid).unwrap_or_else(|| {
            debug!(sid = sid_string, "account lookup failed, memoizing raw SID");
            sid_string.to_owned()
        });
        self.sid_cache.insert(sid_string.to_owned(), name.clone());
        name
    }
}

fn lookup_account_name(psid: PSID) -> Option<String> {
    let mut name_len = 0u32;
    let mut domain_len = 0u32;
    let mut sid_use = SID_NAME_USE::default();

    // SAFETY: a probing call with null output buffers, valid per the API contract.
    unsafe {
        let _ = LookupAccountSidW(
            PCWSTR::null(),
            psid,
            PWSTR::null(),
            &mut name_len,
            PWSTR::null(),
            &mut domain_len,
            &mut sid_use,
        );
    }
    if name_len == 0 {
        return None;
    }

    let mut name = vec![0u16; name_len as usize];
    let mut domain = vec![0u16; domain_len as usize];
    // SAFETY: `name`/`domain` are sized from the probe call above.
    let ok = unsafe {
        LookupAccountSidW(
            PCWSTR::null(),
            psid,
            PWSTR(name.as_mut_ptr()),
            &mut name_len,
            PWSTR(domain.as_mut_ptr()),
            &mut domain_len,
            &mut sid_use,
        )
    }
    .is_ok();

    if !ok {
        return None;
    }

    let name = String::from_utf16_lossy(&name[..name_len as usize]);
    if domain_len > 0 {
        let domain = String::from_utf16_lossy(&domain[..domain_len as usize]);
        Some(format!("{domain}\\{name}"))
    } else {
        Some(name)
    }
}

fn sid_to_string(psid: PSID) -> Result<String, EntryError> {
    let mut raw = PWSTR::null();
    // SAFETY: `psid` points into a still-live security descriptor buffer.
    unsafe { ConvertSidToStringSidW(psid, &mut raw) }.map_err(|_| EntryError::SecurityError)?;

    // SAFETY: `raw` was allocated by the call above and is freed on every
    // path below, including the error path.
    let text = unsafe { raw.to_string() }.map_err(|_| EntryError::SecurityError);
    unsafe {
        let _ = LocalFree(Some(HLOCAL(raw.0.cast())));
    }
    text
}

fn fetch_security_descriptor(
    path: &Path,
    info: windows::Win32::Security::OBJECT_SECURITY_INFORMATION,
) -> windows::core::Result<Vec<u8>> {
    let wide = to_wide_null(path);
    let mut needed = 0u32;

    // SAFETY: probing call; no descriptor buffer is touched since
    // `psecuritydescriptor` is `None`.
    let probe = unsafe { GetFileSecurityW(PCWSTR(wide.as_ptr()), info, None, 0, &mut needed) };
    if probe.is_err() && needed == 0 {
        return probe.map(|()| Vec::new());
    }

    let mut buffer = vec![0u8; needed as usize];
    // SAFETY: `buffer` is sized exactly to `needed`, reported by the probe above.
    unsafe {
        GetFileSecurityW(
            PCWSTR(wide.as_ptr()),
            info,
            Some(PSECURITY_DESCRIPTOR(buffer.as_mut_ptr().cast())),
            needed,
            &mut needed,
        )
    }?;

    Ok(buffer)
}

fn win32_code(err: &windows::core::Error) -> u32 {
    (err.code().0 as u32) & 0xFFFF
}

fn to_wide_null(path: &Path) -> Vec<u16> {
    let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    wide.push(0);
    wide
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_code_masks_to_low_word() {
        // HRESULT_FROM_WIN32(ERROR_ACCESS_DENIED) = 0x80070005
        let hresult = windows::core::HRESULT(0x8007_0005_u32 as i32);
        let err = windows::core::Error::from_hresult(hresult);
        assert_eq!(win32_code(&err), 5);
    }
}
