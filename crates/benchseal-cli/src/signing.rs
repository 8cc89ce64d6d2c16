//! # Signing Subcommands
//!
//! Ed25519 key generation, digest signing, and signature verification.
//!
//! Signatures cover the 32 raw bytes of a content digest. The key file holds
//! the 32-byte seed as hex and is read into zeroizing buffers.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use zeroize::Zeroizing;

use benchseal_core::{hex, ContentDigest};
use benchseal_crypto::{Ed25519KeyPair, SignatureScheme, SignatureVerifier};

/// Arguments for `benchseal keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// File to write the hex-encoded private seed to. Must not exist.
    #[arg(long)]
    pub out: PathBuf,
}

/// Arguments for `benchseal sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Private seed file written by `keygen`.
    #[arg(long)]
    pub key: PathBuf,
    /// Hex-encoded SHA-256 content digest.
    #[arg(long)]
    pub digest: String,
}

/// Arguments for `benchseal verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Hex-encoded SHA-256 content digest.
    #[arg(long)]
    pub digest: String,
    /// Hex-encoded 64-byte signature.
    #[arg(long)]
    pub signature: String,
    /// Hex-encoded 32-byte public key.
    #[arg(long)]
    pub public_key: String,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let kp = Ed25519KeyPair::generate();
    write_seed(&args.out, &kp)?;

    println!("OK: generated Ed25519 key pair");
    println!("  Private seed: {}", args.out.display());
    println!("  Public key:   {}", kp.public_key().to_hex());
    Ok(0)
}

pub fn run_sign(args: &SignArgs) -> Result<u8> {
    let kp = load_key(&args.key)?;
    let digest = parse_digest(&args.digest)?;
    println!("{}", kp.sign_digest(&digest).to_hex());
    Ok(0)
}

pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let digest = parse_digest(&args.digest)?;
    let scheme = SignatureScheme::Ed25519.as_str();

    match SignatureVerifier::new().check(
        &digest,
        args.signature.trim(),
        args.public_key.trim(),
        scheme,
        scheme,
    ) {
        Ok(()) => {
            println!("OK: signature is valid for digest {}", digest.to_hex());
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e}");
            Ok(1)
        }
    }
}

/// Read an Ed25519 key pair from a seed file.
pub fn load_key(path: &Path) -> Result<Ed25519KeyPair> {
    let contents = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file: {}", path.display()))?,
    );
    Ed25519KeyPair::from_seed_hex(&contents)
        .with_context(|| format!("invalid key file: {}", path.display()))
}

pub(crate) fn parse_digest(s: &str) -> Result<ContentDigest> {
    ContentDigest::from_hex(s.trim()).with_context(|| format!("invalid digest: {s}"))
}

fn write_seed(path: &Path, kp: &Ed25519KeyPair) -> Result<()> {
    if path.exists() {
        bail!("refusing to overwrite existing file: {}", path.display());
    }

    let seed = kp.seed();
    let mut encoded = Zeroizing::new(hex::encode(seed.as_slice()));
    encoded.push('\n');

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create key file: {}", path.display()))?;
    file.write_all(encoded.as_bytes())
        .with_context(|| format!("failed to write key file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote private seed");
    Ok(())
}
