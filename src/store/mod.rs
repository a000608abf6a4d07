pub mod client;
pub mod codec;
pub mod commit;
pub mod engine;
pub mod key;

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::SecretString;

pub use key::{KdfParams, KeyDeriver, StoreKey};

/// First header entry of every store; identifies the file format.
pub const HEADER_SENTINEL: &str = "HK PASSWORD MANAGER FILE";

/// Suffix of the file a mutation is written to before it is committed.
pub const SHADOW_SUFFIX: &str = ".new";

/// Path of the shadow file that `StorePrimitive::mutate` writes for `path`.
pub fn shadow_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(SHADOW_SUFFIX);
    PathBuf::from(name)
}

/// Opaque failure code reported by a store primitive.
///
/// The controller never interprets the number; it only carries it to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const OPEN_FAILED: ErrorCode = ErrorCode(1);
    pub const MALFORMED: ErrorCode = ErrorCode(2);
    /// Wrong key, not a store file, truncated or tampered. Deliberately one code.
    pub const UNREADABLE: ErrorCode = ErrorCode(3);
    pub const WRITE_FAILED: ErrorCode = ErrorCode(4);
    pub const RANDOM_UNAVAILABLE: ErrorCode = ErrorCode(5);
    pub const NOT_FOUND: ErrorCode = ErrorCode(6);
    pub const DUPLICATE_ACCOUNT: ErrorCode = ErrorCode(10);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type PrimitiveResult<T> = std::result::Result<T, ErrorCode>;

/// One account entry.
pub struct Record {
    pub account: String,
    pub username: String,
    pub password: SecretString,
}

impl Record {
    pub fn new(
        account: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("account", &self.account)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A change requested from the primitive. Records are addressed by account name.
#[derive(Debug, Clone, Copy)]
pub enum Mutation<'a> {
    Add(&'a Record),
    Modify(&'a Record),
    Delete(&'a str),
}

impl Mutation<'_> {
    pub fn account(&self) -> &str {
        match self {
            Mutation::Add(record) | Mutation::Modify(record) => &record.account,
            Mutation::Delete(account) => account,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add",
            Mutation::Modify(_) => "modify",
            Mutation::Delete(_) => "delete",
        }
    }
}

/// Boundary to the encrypted-file engine. The controller talks only to this trait.
///
/// Text crossing the boundary is delimiter-joined, see [`codec`]. `mutate` never
/// touches the file at `path`; it writes the complete new store to
/// [`shadow_path`]`(path)` and leaves committing to the caller.
pub trait StorePrimitive {
    fn create_store(&self, path: &Path, key: &StoreKey) -> PrimitiveResult<()>;
    /// Index 0 is the header, index `n >= 1` is the n-th record.
    fn read_record(&self, path: &Path, key: &StoreKey, index: usize) -> PrimitiveResult<String>;
    fn mutate(&self, mutation: Mutation<'_>, path: &Path, key: &StoreKey) -> PrimitiveResult<()>;
}
