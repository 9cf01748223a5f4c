//! Secret holders for the master password, derived blocks and cipher keys.
//!
//! Nothing derived by PASH is ever persisted, so the only exposure window is
//! process memory. The wrappers here:
//! - zero their contents on drop via [`zeroize`]
//! - `mlock` their pages on a best-effort basis (Unix only)
//! - print `***` instead of their contents in `Debug`/`Display`

use crate::error::CryptoError;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Page locking
// ---------------------------------------------------------------------------

/// RAII guard over an `mlock`'d region; unlocks on drop.
pub struct LockedRegion {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: The pointer is only handed to mlock/munlock, which are thread-safe.
// The bytes themselves are owned and accessed through SecretBuffer/SecretBytes.
unsafe impl Send for LockedRegion {}
unsafe impl Sync for LockedRegion {}

impl LockedRegion {
    /// Lock `len` bytes at `ptr`. A failed `mlock` leaves the region
    /// unlocked without reporting an error.
    #[must_use]
    pub(crate) fn try_lock(ptr: *const u8, len: usize) -> Self {
        let locked = platform::try_mlock(ptr, len);
        Self { ptr, len, locked }
    }

    const fn unlocked() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            locked: false,
        }
    }

    /// Returns `true` if the region is currently locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if self.locked {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer: variable length (master password, plaintext)
// ---------------------------------------------------------------------------

/// Variable-length secret, e.g. the UTF-8 bytes of a master password.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    lock: LockedRegion,
}

impl SecretBuffer {
    /// Copy `data` into a new locked allocation.
    ///
    /// The caller remains responsible for zeroizing its own copy.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if memory allocation fails.
    pub fn new(data: &[u8]) -> Result<Self, CryptoError> {
        let inner: SecretSlice<u8> = data.to_vec().into();
        let exposed = inner.expose_secret();
        let lock = LockedRegion::try_lock(exposed.as_ptr(), exposed.len());
        Ok(Self { inner, lock })
    }

    /// Copy the UTF-8 bytes of `text`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if memory allocation fails.
    pub fn from_text(text: &str) -> Result<Self, CryptoError> {
        Self::new(text.as_bytes())
    }

    /// Borrow the secret bytes for a single cryptographic operation.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Returns `true` if no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the allocation is `mlock`'d.
    #[must_use]
    pub const fn is_mlocked(&self) -> bool {
        self.lock.is_locked()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ---------------------------------------------------------------------------
// SecretBytes<N>: fixed size (256-bit blocks, sub-keys)
// ---------------------------------------------------------------------------

/// Fixed-size secret such as one 256-bit key block.
///
/// The lock is taken at construction time. Moving the value (into a cache
/// map, out of a function) leaves the lock on the old address; `munlock`
/// on a stale address is harmless and zeroize-on-drop does not depend on it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
    #[zeroize(skip)]
    lock: LockedRegion,
}

impl<const N: usize> SecretBytes<N> {
    /// Take ownership of `data`.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut s = Self {
            bytes: data,
            lock: LockedRegion::unlocked(),
        };
        s.lock = LockedRegion::try_lock(s.bytes.as_ptr(), N);
        s
    }

    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

// ---------------------------------------------------------------------------
// Platform-specific implementations
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any pointer/length pair; an invalid range
        // makes the kernel return ENOMEM, which we report as "not locked".
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock failure is non-critical.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }
}

#[cfg(not(unix))]
mod platform {
    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
