//! Sealed-frame store engine (AES-256-GCM).
//!
//! File layout: an 8-byte magic marker followed by frames. Each frame is a
//! big-endian `u32` body length and a body of `nonce(12) || ciphertext`.
//! Frame 0 holds the header, frame `n` holds record `n` in header order.
//!
//! Frame plaintext is a big-endian `u32` payload length, the payload, and
//! random padding up to a multiple of [`PAD_BLOCK`] bytes.

use std::fs;
use std::io::Write;
use std::path::Path;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use super::{
    codec, shadow_path, ErrorCode, Mutation, PrimitiveResult, StoreKey, StorePrimitive,
    HEADER_SENTINEL,
};

const FILE_MAGIC: &[u8; 8] = b"HKPSWD\x00\x01";
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const LEN_PREFIX: usize = 4;
pub const PAD_BLOCK: usize = 64;

/// The default [`StorePrimitive`]: one encrypted file per store.
#[derive(Debug, Default, Clone, Copy)]
pub struct SealedFileEngine;

impl StorePrimitive for SealedFileEngine {
    fn create_store(&self, path: &Path, key: &StoreKey) -> PrimitiveResult<()> {
        let header = Zeroizing::new(codec::join(&[HEADER_SENTINEL]));
        let frame = seal(key, header.as_bytes())?;

        let mut out = Vec::with_capacity(FILE_MAGIC.len() + LEN_PREFIX + frame.len());
        out.extend_from_slice(FILE_MAGIC);
        push_frame(&mut out, &frame)?;

        // Built beside the target so an existing store survives a failed write.
        let shadow = shadow_path(path);
        if let Err(code) = write_file_secure(&shadow, &out) {
            discard(&shadow);
            return Err(code);
        }
        if let Err(e) = fs::rename(&shadow, path) {
            log::debug!("failed to move {} into place: {}", shadow.display(), e);
            discard(&shadow);
            return Err(ErrorCode::WRITE_FAILED);
        }
        log::debug!("created empty store file {}", path.display());
        Ok(())
    }

    fn read_record(&self, path: &Path, key: &StoreKey, index: usize) -> PrimitiveResult<String> {
        let bytes = read_file(path)?;
        let frames = split_frames(&bytes)?;
        let body = frames.get(index).ok_or(ErrorCode::NOT_FOUND)?;
        let payload = open(key, body)?;
        Ok(String::clone(&payload))
    }

    fn mutate(&self, mutation: Mutation<'_>, path: &Path, key: &StoreKey) -> PrimitiveResult<()> {
        let bytes = read_file(path)?;
        let frames = split_frames(&bytes)?;
        let mut names = codec::split(&open(key, frames[0])?);
        if names.first().map(String::as_str) != Some(HEADER_SENTINEL) {
            return Err(ErrorCode::UNREADABLE);
        }
        if names.len() != frames.len() {
            // Header and record frames disagree; refuse to build on top of it.
            return Err(ErrorCode::MALFORMED);
        }

        let account = mutation.account();
        let position = names.iter().skip(1).position(|n| n == account).map(|p| p + 1);

        let mut out = Vec::with_capacity(bytes.len() + PAD_BLOCK * 2);
        out.extend_from_slice(FILE_MAGIC);

        match mutation {
            Mutation::Add(record) => {
                if position.is_some() {
                    return Err(ErrorCode::DUPLICATE_ACCOUNT);
                }
                names.push(record.account.clone());
                let header = Zeroizing::new(codec::join(&names));
                push_frame(&mut out, &seal(key, header.as_bytes())?)?;
                for body in &frames[1..] {
                    push_frame(&mut out, body)?;
                }
                let fields = Zeroizing::new(codec::join(&[
                    record.account.as_str(),
                    record.username.as_str(),
                    record.password.expose_secret().as_str(),
                ]));
                push_frame(&mut out, &seal(key, fields.as_bytes())?)?;
            }
            Mutation::Modify(record) => {
                let position = position.ok_or(ErrorCode::NOT_FOUND)?;
                let current = open(key, frames[position])?;
                let current = codec::split(&current);
                if current.first().map(String::as_str) != Some(account) {
                    return Err(ErrorCode::MALFORMED);
                }
                let fields = Zeroizing::new(codec::join(&[
                    record.account.as_str(),
                    record.username.as_str(),
                    record.password.expose_secret().as_str(),
                ]));
                let replacement = seal(key, fields.as_bytes())?;
                for (i, body) in frames.iter().enumerate() {
                    if i == position {
                        push_frame(&mut out, &replacement)?;
                    } else {
                        push_frame(&mut out, body)?;
                    }
                }
            }
            Mutation::Delete(_) => {
                let position = position.ok_or(ErrorCode::NOT_FOUND)?;
                names.remove(position);
                let header = Zeroizing::new(codec::join(&names));
                push_frame(&mut out, &seal(key, header.as_bytes())?)?;
                for (i, body) in frames.iter().enumerate().skip(1) {
                    if i != position {
                        push_frame(&mut out, body)?;
                    }
                }
            }
        }

        let shadow = shadow_path(path);
        write_file_secure(&shadow, &out)?;
        log::debug!(
            "{}: wrote {} frames to {}",
            mutation.name(),
            names.len(),
            shadow.display()
        );
        Ok(())
    }
}

/// Encrypt one frame payload, returning the frame body.
fn seal(key: &StoreKey, payload: &[u8]) -> PrimitiveResult<Vec<u8>> {
    let payload_len = u32::try_from(payload.len()).map_err(|_| ErrorCode::WRITE_FAILED)?;
    let unpadded = LEN_PREFIX + payload.len();
    let padded = unpadded.div_ceil(PAD_BLOCK) * PAD_BLOCK;

    let mut plaintext = Zeroizing::new(Vec::with_capacity(padded));
    plaintext.extend_from_slice(&payload_len.to_be_bytes());
    plaintext.extend_from_slice(payload);
    let mut padding = vec![0u8; padded - unpadded];
    OsRng
        .try_fill_bytes(&mut padding)
        .map_err(|_| ErrorCode::RANDOM_UNAVAILABLE)?;
    plaintext.extend_from_slice(&padding);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|_| ErrorCode::RANDOM_UNAVAILABLE)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|_| ErrorCode::WRITE_FAILED)?;

    let mut body = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    body.extend_from_slice(&nonce_bytes);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Decrypt a frame body and return its payload text.
fn open(key: &StoreKey, body: &[u8]) -> PrimitiveResult<Zeroizing<String>> {
    if body.len() < NONCE_LEN + TAG_LEN {
        return Err(ErrorCode::UNREADABLE);
    }
    let (nonce_bytes, ciphertext) = body.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| ErrorCode::UNREADABLE)?,
    );

    if plaintext.len() < LEN_PREFIX {
        return Err(ErrorCode::UNREADABLE);
    }
    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(&plaintext[..LEN_PREFIX]);
    let payload_len = u32::from_be_bytes(len_bytes) as usize;
    let payload = plaintext
        .get(LEN_PREFIX..LEN_PREFIX + payload_len)
        .ok_or(ErrorCode::UNREADABLE)?;

    let text = std::str::from_utf8(payload).map_err(|_| ErrorCode::UNREADABLE)?;
    Ok(Zeroizing::new(text.to_string()))
}

/// Split a store file into frame bodies. Always yields at least the header frame.
fn split_frames(bytes: &[u8]) -> PrimitiveResult<Vec<&[u8]>> {
    let mut rest = bytes
        .strip_prefix(FILE_MAGIC.as_slice())
        .ok_or(ErrorCode::UNREADABLE)?;

    let mut frames = Vec::new();
    while !rest.is_empty() {
        if rest.len() < LEN_PREFIX {
            return Err(ErrorCode::UNREADABLE);
        }
        let (len_bytes, tail) = rest.split_at(LEN_PREFIX);
        let mut len = [0u8; LEN_PREFIX];
        len.copy_from_slice(len_bytes);
        let len = u32::from_be_bytes(len) as usize;
        if tail.len() < len {
            return Err(ErrorCode::UNREADABLE);
        }
        let (body, tail) = tail.split_at(len);
        frames.push(body);
        rest = tail;
    }

    if frames.is_empty() {
        return Err(ErrorCode::UNREADABLE);
    }
    Ok(frames)
}

fn push_frame(out: &mut Vec<u8>, body: &[u8]) -> PrimitiveResult<()> {
    let len = u32::try_from(body.len()).map_err(|_| ErrorCode::WRITE_FAILED)?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
    Ok(())
}

fn read_file(path: &Path) -> PrimitiveResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        log::debug!("failed to read {}: {}", path.display(), e);
        ErrorCode::OPEN_FAILED
    })
}

fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("failed to remove {}: {}", path.display(), e);
        }
    }
}

/// Write `contents` to `path` (owner-only on Unix) and fsync it.
fn write_file_secure(path: &Path, contents: &[u8]) -> PrimitiveResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let result = options.open(path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    result.map_err(|e| {
        log::debug!("failed to write {}: {}", path.display(), e);
        ErrorCode::WRITE_FAILED
    })
}
