use std::path::Path;

use secrecy::SecretString;
use zeroize::Zeroizing;

use super::{codec, ErrorCode, Mutation, Record, StoreKey, StorePrimitive};
use crate::error::StoreError;
use crate::header::Header;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Typed access to a [`StorePrimitive`]: decodes its delimited text and maps
/// its codes into [`StoreError::Primitive`].
#[derive(Debug, Default, Clone)]
pub struct StoreClient<P> {
    primitive: P,
}

impl<P: StorePrimitive> StoreClient<P> {
    pub fn new(primitive: P) -> Self {
        Self { primitive }
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn create(&self, path: &Path, key: &StoreKey) -> Result<()> {
        self.primitive.create_store(path, key)?;
        Ok(())
    }

    pub fn read_header(&self, path: &Path, key: &StoreKey) -> Result<Header> {
        let raw = Zeroizing::new(self.primitive.read_record(path, key, 0)?);
        Header::from_entries(codec::split(&raw)).ok_or(StoreError::Primitive(ErrorCode::UNREADABLE))
    }

    /// Read the record at 1-based header `position`.
    pub fn read_record(&self, path: &Path, key: &StoreKey, position: usize) -> Result<Record> {
        if position == 0 {
            return Err(StoreError::InvalidInput(
                "record positions start at 1".into(),
            ));
        }
        let raw = Zeroizing::new(self.primitive.read_record(path, key, position)?);
        let mut fields = codec::split(&raw).into_iter();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(account), Some(username), Some(password), None) => Ok(Record {
                account,
                username,
                password: SecretString::new(password),
            }),
            _ => Err(StoreError::Primitive(ErrorCode::MALFORMED)),
        }
    }

    pub fn mutate(&self, mutation: Mutation<'_>, path: &Path, key: &StoreKey) -> Result<()> {
        self.primitive.mutate(mutation, path, key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{engine::SealedFileEngine, HEADER_SENTINEL};
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    /// Serves canned text for every read.
    struct CannedPrimitive {
        reply: std::result::Result<String, ErrorCode>,
    }

    impl CannedPrimitive {
        fn new(reply: std::result::Result<&str, ErrorCode>) -> Self {
            Self {
                reply: reply.map(str::to_string),
            }
        }
    }

    impl StorePrimitive for CannedPrimitive {
        fn create_store(&self, _: &Path, _: &StoreKey) -> std::result::Result<(), ErrorCode> {
            Ok(())
        }
        fn read_record(
            &self,
            _: &Path,
            _: &StoreKey,
            _: usize,
        ) -> std::result::Result<String, ErrorCode> {
            self.reply.clone()
        }
        fn mutate(
            &self,
            _: Mutation<'_>,
            _: &Path,
            _: &StoreKey,
        ) -> std::result::Result<(), ErrorCode> {
            Err(ErrorCode::WRITE_FAILED)
        }
    }

    fn key() -> StoreKey {
        StoreKey::from_bytes([7; 32])
    }

    #[test]
    fn test_header_requires_sentinel() {
        let client = StoreClient::new(CannedPrimitive::new(Ok("not|a|header")));
        let err = client.read_header(Path::new("x"), &key()).unwrap_err();
        assert!(matches!(err, StoreError::Primitive(ErrorCode::UNREADABLE)));
    }

    #[test]
    fn test_header_decoded() {
        let raw = format!("{}|bank|mail", HEADER_SENTINEL);
        let client = StoreClient::new(CannedPrimitive::new(Ok(&raw)));
        let header = client.read_header(Path::new("x"), &key()).unwrap();
        assert_eq!(header.names(), ["bank", "mail"]);
    }

    #[test]
    fn test_record_field_count_checked() {
        let client = StoreClient::new(CannedPrimitive::new(Ok("bank|alice")));
        let err = client.read_record(Path::new("x"), &key(), 1).unwrap_err();
        assert!(matches!(err, StoreError::Primitive(ErrorCode::MALFORMED)));

        let client = StoreClient::new(CannedPrimitive::new(Ok("bank|alice|pw|extra")));
        let err = client.read_record(Path::new("x"), &key(), 1).unwrap_err();
        assert!(matches!(err, StoreError::Primitive(ErrorCode::MALFORMED)));
    }

    #[test]
    fn test_position_zero_is_not_a_record() {
        let client = StoreClient::new(CannedPrimitive::new(Ok("a|b|c")));
        let err = client.read_record(Path::new("x"), &key(), 0).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_codes_pass_through_verbatim() {
        let client = StoreClient::new(CannedPrimitive::new(Err(ErrorCode::new(42))));
        let err = client.read_header(Path::new("x"), &key()).unwrap_err();
        assert!(matches!(err, StoreError::Primitive(code) if code.get() == 42));

        let bank = Record::new("bank", "alice", SecretString::new("pw".into()));
        let err = client
            .mutate(Mutation::Add(&bank), Path::new("x"), &key())
            .unwrap_err();
        assert!(matches!(err, StoreError::Primitive(ErrorCode::WRITE_FAILED)));
    }

    #[test]
    fn test_reads_through_engine() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store");
        let client = StoreClient::new(SealedFileEngine);
        client.create(&path, &key()).unwrap();

        let bank = Record::new("bank", "alice", SecretString::new("s3cret".into()));
        client.mutate(Mutation::Add(&bank), &path, &key()).unwrap();
        std::fs::rename(crate::store::shadow_path(&path), &path).unwrap();

        let record = client.read_record(&path, &key(), 1).unwrap();
        assert_eq!(record.account, "bank");
        assert_eq!(record.username, "alice");
        assert_eq!(record.password.expose_secret(), "s3cret");
    }
}
