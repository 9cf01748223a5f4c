//! Per-request derivation state: the identity inputs plus block caches.

use std::collections::HashMap;
use std::fmt;

use crate::error::CryptoError;
use crate::kdf::{combined_salt, derive_block, DerivationOptions, DerivationStrategy};
use crate::keystream::BlockSource;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::primitives::{normalize, BLOCK_LEN};

type BlockCache = HashMap<u32, SecretBytes<BLOCK_LEN>>;

/// The four identity inputs of one derivation and the blocks computed so far.
///
/// User, service and color are normalized on construction; the master
/// password is kept byte-for-byte. Caches only grow, and every cached value
/// is a pure function of its index, so a context can be dropped or reused at
/// any point without invalidating anything.
pub struct DerivationContext {
    master: SecretBuffer,
    user: String,
    service: String,
    color: String,
    options: DerivationOptions,
    blocks: BlockCache,
    // Chained strategy only: outputs of the user and service stages.
    user_stage: BlockCache,
    service_stage: BlockCache,
}

impl DerivationContext {
    /// Context with the default options (combined salt, 10 000 iterations).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the master password cannot be
    /// copied into secret memory.
    pub fn new(
        master_password: &str,
        user: &str,
        service: &str,
        color: &str,
    ) -> Result<Self, CryptoError> {
        Self::with_options(master_password, user, service, color, DerivationOptions::default())
    }

    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` for invalid `options` and
    /// `CryptoError::SecureMemory` if the master password cannot be copied.
    pub fn with_options(
        master_password: &str,
        user: &str,
        service: &str,
        color: &str,
        options: DerivationOptions,
    ) -> Result<Self, CryptoError> {
        Self::from_master_bytes(master_password.as_bytes(), user, service, color, options)
    }

    pub(crate) fn from_master_bytes(
        master_password: &[u8],
        user: &str,
        service: &str,
        color: &str,
        options: DerivationOptions,
    ) -> Result<Self, CryptoError> {
        options.params.validate()?;
        Ok(Self {
            master: SecretBuffer::new(master_password)?,
            user: normalize(user),
            service: normalize(service),
            color: normalize(color),
            options,
            blocks: HashMap::new(),
            user_stage: HashMap::new(),
            service_stage: HashMap::new(),
        })
    }

    /// Normalized user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Normalized service name.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Normalized color tag.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub const fn options(&self) -> DerivationOptions {
        self.options
    }

    /// Number of final blocks currently cached.
    #[must_use]
    pub fn cached_blocks(&self) -> usize {
        self.blocks.len()
    }

    fn compute(&mut self, index: u32) -> Result<SecretBytes<BLOCK_LEN>, CryptoError> {
        let params = self.options.params;
        match self.options.strategy {
            DerivationStrategy::Combined => {
                let salt = combined_salt(&self.user, &self.service, &self.color);
                derive_block(self.master.expose(), &salt, index, &params)
            }
            DerivationStrategy::Chained => {
                let user_key = cached(&mut self.user_stage, index, || {
                    derive_block(self.master.expose(), self.user.as_bytes(), index, &params)
                })?;
                let service_key = cached(&mut self.service_stage, index, || {
                    derive_block(user_key, self.service.as_bytes(), index, &params)
                })?;
                derive_block(service_key, self.color.as_bytes(), index, &params)
            }
        }
    }
}

/// Look `index` up in `cache`, computing and inserting it on a miss.
fn cached<'a, F>(
    cache: &'a mut BlockCache,
    index: u32,
    compute: F,
) -> Result<&'a [u8; BLOCK_LEN], CryptoError>
where
    F: FnOnce() -> Result<SecretBytes<BLOCK_LEN>, CryptoError>,
{
    if !cache.contains_key(&index) {
        cache.insert(index, compute()?);
    }
    cache
        .get(&index)
        .map(SecretBytes::expose)
        .ok_or_else(|| CryptoError::KeyDerivation(format!("block {index} missing from cache")))
}

impl BlockSource for DerivationContext {
    fn block(&mut self, index: u32) -> Result<&[u8; BLOCK_LEN], CryptoError> {
        if !self.blocks.contains_key(&index) {
            let block = self.compute(index)?;
            self.blocks.insert(index, block);
        }
        self.blocks
            .get(&index)
            .map(SecretBytes::expose)
            .ok_or_else(|| CryptoError::KeyDerivation(format!("block {index} missing from cache")))
    }
}

impl fmt::Debug for DerivationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationContext")
            .field("master", &self.master)
            .field("user", &self.user)
            .field("service", &self.service)
            .field("color", &self.color)
            .field("options", &self.options)
            .field("cached_blocks", &self.blocks.len())
            .finish()
    }
}
