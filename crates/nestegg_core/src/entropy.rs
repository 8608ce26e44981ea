//! Reproducible seed generation from an external byte stream.
//!
//! Every stochastic object in a run asks the [`EntropySource`] for one
//! generator when it is constructed. Seed `i` comes from the SHA-256 digest
//! of a 32-byte window at `(i / 4) * 32 + offset`; four consecutive calls
//! share a window and take disjoint 8-byte slices of its digest.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::{Digest, Sha256};

use crate::error::EntropyError;

const WINDOW: usize = 32;
const SEEDS_PER_WINDOW: u64 = (WINDOW / 8) as u64;

/// Default byte stream, present on most Unix systems.
pub const DEFAULT_ENTROPY_PATH: &str = "/usr/share/dict/words";

/// Byte offset between consecutive Monte Carlo runs.
pub const DEFAULT_OFFSET_STRIDE: u64 = 1789;

pub trait ByteStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ByteStream for T {}

/// Where a run's entropy comes from. Each run opens its own handle, so
/// parallel runs never share a file cursor.
#[derive(Debug, Clone)]
pub enum EntropyStream {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl Default for EntropyStream {
    fn default() -> Self {
        EntropyStream::File(PathBuf::from(DEFAULT_ENTROPY_PATH))
    }
}

impl EntropyStream {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        EntropyStream::Memory(bytes.into())
    }

    pub fn open(&self, offset: u64) -> Result<EntropySource, EntropyError> {
        let stream: Box<dyn ByteStream> = match self {
            EntropyStream::File(path) => {
                let file = File::open(path).map_err(|source| EntropyError::Open {
                    path: path.clone(),
                    source,
                })?;
                Box::new(file)
            }
            EntropyStream::Memory(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        };
        EntropySource::new(stream, offset)
    }
}

pub struct EntropySource {
    stream: Box<dyn ByteStream>,
    len: u64,
    offset: u64,
    next_index: u64,
}

impl std::fmt::Debug for EntropySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropySource")
            .field("len", &self.len)
            .field("offset", &self.offset)
            .field("next_index", &self.next_index)
            .finish()
    }
}

impl EntropySource {
    pub fn new(mut stream: Box<dyn ByteStream>, offset: u64) -> Result<Self, EntropyError> {
        let len = stream.seek(SeekFrom::End(0))?;
        if len == 0 {
            return Err(EntropyError::Empty);
        }
        Ok(Self {
            stream,
            len,
            offset,
            next_index: 0,
        })
    }

    /// Number of seeds handed out so far.
    pub fn seeds_drawn(&self) -> u64 {
        self.next_index
    }

    /// The seed for call index `index`. Does not advance the call counter.
    pub fn seed_at(&mut self, index: u64) -> Result<u64, EntropyError> {
        let window = self.read_window((index / SEEDS_PER_WINDOW) * WINDOW as u64)?;
        let digest = Sha256::digest(window);
        let start = (index % SEEDS_PER_WINDOW) as usize * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[start..start + 8]);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Seeds a generator from the next call index.
    pub fn next_rng(&mut self) -> Result<SmallRng, EntropyError> {
        let seed = self.seed_at(self.next_index)?;
        self.next_index += 1;
        Ok(SmallRng::seed_from_u64(seed))
    }

    fn read_window(&mut self, relative: u64) -> Result<[u8; WINDOW], EntropyError> {
        let mut buf = [0u8; WINDOW];
        let mut pos = (relative + self.offset) % self.len;
        let mut filled = 0;
        // Streams shorter than a window wrap as many times as needed.
        while filled < WINDOW {
            self.stream.seek(SeekFrom::Start(pos))?;
            let n = self.stream.read(&mut buf[filled..])?;
            if n == 0 {
                pos = 0;
                continue;
            }
            filled += n;
            pos = (pos + n as u64) % self.len;
        }
        Ok(buf)
    }
}
