//! The store-access controller: one open store, its key, its header cache and
//! the account-list view.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::error::StoreError;
use crate::header::{Header, HeaderCache};
use crate::store::client::StoreClient;
use crate::store::commit::{Commit, RenameCommit};
use crate::store::engine::SealedFileEngine;
use crate::store::{shadow_path, ErrorCode, KeyDeriver, Mutation, Record, StoreKey, StorePrimitive};
use crate::view::{self, ViewState, DEFAULT_PAGE_SIZE};

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Unopened,
    Ready,
}

/// A store whose key is known but whose header has not been read yet.
struct PendingSession {
    path: PathBuf,
    key: StoreKey,
}

impl PendingSession {
    fn open<P: StorePrimitive>(self, client: &StoreClient<P>) -> Result<Session> {
        let mut cache = HeaderCache::default();
        cache.refresh(client, &self.path, &self.key)?;
        Ok(Session {
            path: self.path,
            key: self.key,
            cache,
        })
    }
}

/// An open store. Dropping it zeroizes the key.
struct Session {
    path: PathBuf,
    key: StoreKey,
    cache: HeaderCache,
}

/// Owns at most one open store and serializes every operation on it.
pub struct StoreController<P = SealedFileEngine, C = RenameCommit> {
    client: StoreClient<P>,
    committer: C,
    deriver: KeyDeriver,
    session: Option<Session>,
    view: ViewState,
}

impl StoreController {
    pub fn new() -> Self {
        Self::with_components(SealedFileEngine, RenameCommit, KeyDeriver::default())
    }
}

impl Default for StoreController {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StorePrimitive, C: Commit> StoreController<P, C> {
    pub fn with_components(primitive: P, committer: C, deriver: KeyDeriver) -> Self {
        Self {
            client: StoreClient::new(primitive),
            committer,
            deriver,
            session: None,
            view: ViewState::new(DEFAULT_PAGE_SIZE),
        }
    }

    /// Page size is fixed per controller; set it before opening a store.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.view = ViewState::new(page_size);
        self
    }

    pub fn state(&self) -> StoreState {
        match self.session {
            Some(_) => StoreState::Ready,
            None => StoreState::Unopened,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path.as_path())
    }

    pub fn header(&self) -> Option<&Header> {
        self.session.as_ref().map(|s| s.cache.header())
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> usize {
        self.view.page()
    }

    /// Create a new store at `path` and open it.
    ///
    /// Overwrites an existing file. On failure the controller keeps whatever
    /// store it had open before.
    pub fn create_store(&mut self, path: impl Into<PathBuf>, passphrase: &SecretString) -> Result<()> {
        let path = path.into();
        let key = self.derive(passphrase)?;
        let existed = path.exists();

        if let Err(e) = self.client.create(&path, &key) {
            if !existed && path.exists() {
                if let Err(cleanup) = std::fs::remove_file(&path) {
                    log::warn!("failed to remove partial store file {}: {}", path.display(), cleanup);
                }
            }
            return Err(e);
        }
        log::info!("created store {}", path.display());

        let session = PendingSession { path, key }.open(&self.client)?;
        self.install(session);
        Ok(())
    }

    /// Open an existing store. A wrong passphrase and an invalid file fail the same way.
    pub fn open_store(&mut self, path: impl Into<PathBuf>, passphrase: &SecretString) -> Result<()> {
        let path = path.into();
        let key = self.derive(passphrase)?;
        let session = PendingSession { path, key }.open(&self.client)?;
        log::info!(
            "opened store {} ({} records)",
            session.path.display(),
            session.cache.header().len()
        );
        self.install(session);
        Ok(())
    }

    /// Forget the open store. The key is zeroized.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("closed store {}", session.path.display());
        }
        self.view.reset();
    }

    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        validate_record(record)?;
        self.apply(Mutation::Add(record))
    }

    /// Replace username and password of the record named `record.account`.
    pub fn modify_record(&mut self, record: &Record) -> Result<()> {
        validate_record(record)?;
        self.apply(Mutation::Modify(record))
    }

    pub fn delete_record(&mut self, account: &str) -> Result<()> {
        if account.is_empty() {
            return Err(StoreError::InvalidInput("account must not be empty".into()));
        }
        self.apply(Mutation::Delete(account))
    }

    /// Read the record shown at `display_row` (0-based) of the current page.
    pub fn select_record(&self, display_row: usize) -> Result<Record> {
        let session = self.ready()?;
        let header = fresh_header(session)?;
        let position = self.view.resolve(header, display_row).ok_or_else(|| {
            StoreError::InvalidInput(format!("row {} is not on the current page", display_row))
        })?;

        let record = self.client.read_record(&session.path, &session.key, position)?;
        if header.get(position) != Some(record.account.as_str()) {
            return Err(StoreError::Primitive(ErrorCode::MALFORMED));
        }
        Ok(record)
    }

    /// Names visible on the current page.
    pub fn visible(&self) -> Result<Vec<String>> {
        let session = self.ready()?;
        Ok(view::project(fresh_header(session)?, &self.view))
    }

    pub fn search(&mut self, text: &str) -> Result<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(not_open)?;
        self.view.search(session.cache.header(), text);
        Ok(())
    }

    pub fn clear_search(&mut self) {
        self.view.clear_search();
    }

    pub fn page_left(&mut self) {
        self.view.page_left();
    }

    pub fn page_right(&mut self) {
        self.view.page_right();
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.view.go_to_page(page);
    }

    /// Re-read the header, e.g. after a `CacheStale` error.
    pub fn reload(&mut self) -> Result<()> {
        let Self {
            client,
            session,
            view,
            ..
        } = self;
        let session = session.as_mut().ok_or_else(not_open)?;
        session.cache.refresh(client, &session.path, &session.key)?;
        view.refilter(session.cache.header());
        Ok(())
    }

    /// A shadow file left behind by an earlier failed commit, if any.
    pub fn pending_shadow(&self) -> Option<PathBuf> {
        let shadow = shadow_path(&self.session.as_ref()?.path);
        shadow.exists().then_some(shadow)
    }

    fn derive(&self, passphrase: &SecretString) -> Result<StoreKey> {
        if passphrase.expose_secret().is_empty() {
            return Err(StoreError::InvalidInput(
                "store password must not be empty".into(),
            ));
        }
        self.deriver.derive(passphrase)
    }

    fn install(&mut self, session: Session) {
        self.session = Some(session);
        self.view.reset();
        if let Some(shadow) = self.pending_shadow() {
            log::warn!(
                "found {} from an earlier uncommitted change",
                shadow.display()
            );
        }
    }

    fn ready(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(not_open)
    }

    /// mutate, then commit, then refresh. Stops at the first failure.
    fn apply(&mut self, mutation: Mutation<'_>) -> Result<()> {
        let Self {
            client,
            committer,
            session,
            view,
            ..
        } = self;
        let session = session.as_mut().ok_or_else(not_open)?;

        client.mutate(mutation, &session.path, &session.key)?;
        committer.commit(&session.path)?;

        if let Err(e) = session.cache.refresh(client, &session.path, &session.key) {
            log::warn!("store updated but header reload failed: {}", e);
            session.cache.mark_stale();
            return Err(StoreError::CacheStale(Some(Box::new(e))));
        }
        view.refilter(session.cache.header());
        log::info!(
            "applied {} of '{}' ({} records)",
            mutation.name(),
            mutation.account(),
            session.cache.header().len()
        );
        Ok(())
    }
}

fn not_open() -> StoreError {
    StoreError::InvalidInput("no password store is open".into())
}

fn fresh_header(session: &Session) -> Result<&Header> {
    if session.cache.is_stale() {
        return Err(StoreError::CacheStale(None));
    }
    Ok(session.cache.header())
}

fn validate_record(record: &Record) -> Result<()> {
    if record.account.is_empty()
        || record.username.is_empty()
        || record.password.expose_secret().is_empty()
    {
        return Err(StoreError::InvalidInput(
            "account, username and password are all required".into(),
        ));
    }
    Ok(())
}
