//! # Content Subcommands
//!
//! `address`, `commit` and `reveal`: compute identifiers for a payload file
//! and print entries in the exact shape `POST /v1/submissions` accepts.
//!
//! A file is read as a text payload (its exact UTF-8 bytes) unless `--json`
//! is given, in which case it is parsed and hashed in canonical JSON form.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use benchseal_core::{
    address_of, CommitOnlyEntry, CommitmentRef, ContentEnvelope, ContentKind, ContentRef, Payload,
    RevealedEntry, SigningFields,
};
use benchseal_crypto::SignatureScheme;

use crate::signing::load_key;

/// Arguments for `benchseal address`.
#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Payload file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Treat the file as JSON rather than text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `benchseal commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Payload file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Item kind: prompt, response or score.
    #[arg(long)]
    pub kind: ContentKind,
    /// Treat the file as JSON rather than text.
    #[arg(long)]
    pub json: bool,
    /// Sign the entry with this private seed file.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Arguments for `benchseal reveal`.
#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Payload file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Item kind: prompt, response or score.
    #[arg(long)]
    pub kind: ContentKind,
    /// Treat the file as JSON rather than text.
    #[arg(long)]
    pub json: bool,
    /// Sign the entry with this private seed file.
    #[arg(long)]
    pub key: Option<PathBuf>,
    /// Reference the earlier commitment of the same content.
    #[arg(long)]
    pub prior: bool,
}

/// Output of `benchseal commit`.
#[derive(Debug, Serialize)]
pub struct CommitOutput {
    /// Body item for `POST /v1/commitments`.
    pub commitment: CommitmentRef,
    /// Entry for a later `POST /v1/submissions` batch.
    pub entry: ContentEnvelope,
}

pub fn run_address(args: &AddressArgs) -> Result<u8> {
    let payload = read_payload(&args.file, args.json)?;
    let content = address_of(&payload)
        .with_context(|| format!("failed to canonicalize {}", args.file.display()))?;

    println!("digest:          {}", content.digest.to_hex());
    println!("content_address: {}", content.content_address);
    println!("codec:           {}", content.content_address.codec().as_str());
    Ok(0)
}

pub fn run_commit(args: &CommitArgs) -> Result<u8> {
    let payload = read_payload(&args.file, args.json)?;
    let output = build_commit(&payload, args.kind, args.key.as_deref())?;
    print_json(&output)?;
    Ok(0)
}

pub fn run_reveal(args: &RevealArgs) -> Result<u8> {
    let payload = read_payload(&args.file, args.json)?;
    let entry = build_reveal(payload, args.kind, args.key.as_deref(), args.prior)?;
    print_json(&entry)?;
    Ok(0)
}

/// Load a payload file.
pub fn read_payload(path: &Path, json: bool) -> Result<Payload> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file: {}", path.display()))?;
    if json {
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("invalid JSON in {}", path.display()))?;
        Ok(Payload::Json(value))
    } else {
        Ok(Payload::Text(contents))
    }
}

/// Commitment reference and commit-only entry for `payload`.
pub fn build_commit(payload: &Payload, kind: ContentKind, key: Option<&Path>) -> Result<CommitOutput> {
    let content = address_of(payload).context("failed to canonicalize payload")?;
    tracing::info!(kind = %kind, address = %content.content_address, "built commitment");
    let commitment = content.to_commitment_ref();
    let entry = ContentEnvelope::CommitOnly(CommitOnlyEntry {
        kind,
        reference: commitment.clone(),
        signing: signing_fields(&content, key)?,
    });
    Ok(CommitOutput { commitment, entry })
}

/// Revealed entry for `payload`, self-reporting its identifiers.
pub fn build_reveal(
    payload: Payload,
    kind: ContentKind,
    key: Option<&Path>,
    prior: bool,
) -> Result<ContentEnvelope> {
    let content = address_of(&payload).context("failed to canonicalize payload")?;
    tracing::info!(kind = %kind, address = %content.content_address, prior, "built reveal");
    let commitment = content.to_commitment_ref();
    Ok(ContentEnvelope::Revealed(RevealedEntry {
        kind,
        payload,
        digest: Some(commitment.digest.clone()),
        content_address: Some(commitment.content_address.clone()),
        extended: None,
        prior_commitment: prior.then_some(commitment),
        signing: signing_fields(&content, key)?,
    }))
}

fn signing_fields(content: &ContentRef, key: Option<&Path>) -> Result<SigningFields> {
    let Some(path) = key else {
        return Ok(SigningFields::default());
    };
    let kp = load_key(path)?;
    let scheme = SignatureScheme::Ed25519.as_str().to_string();
    Ok(SigningFields {
        signature: Some(kp.sign_digest(&content.digest).to_hex()),
        public_key: Some(kp.public_key().to_hex()),
        signature_algorithm: Some(scheme.clone()),
        key_algorithm: Some(scheme),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{run_keygen, KeygenArgs};
    use benchseal_crypto::SignatureVerifier;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn keyfile(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("contributor.key");
        run_keygen(&KeygenArgs { out: path.clone() }).unwrap();
        path
    }

    #[test]
    fn text_file_is_hashed_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let with_newline = write(&dir, "a.txt", "What is 2+2?\n");
        let without = write(&dir, "b.txt", "What is 2+2?");

        let a = address_of(&read_payload(&with_newline, false).unwrap()).unwrap();
        let b = address_of(&read_payload(&without, false).unwrap()).unwrap();
        assert_ne!(a, b);
        assert_eq!(b, address_of(&Payload::text("What is 2+2?")).unwrap());
    }

    #[test]
    fn json_file_ignores_key_order_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.json", "{\"b\": 1,\n \"a\": [true, null]}");
        let b = write(&dir, "b.json", "{\"a\":[true,null],\"b\":1}");

        let a = address_of(&read_payload(&a, true).unwrap()).unwrap();
        let b = address_of(&read_payload(&b, true).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.json", "{not json");
        let err = read_payload(&path, true).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn missing_payload_file_is_an_error() {
        let err = read_payload(Path::new("/nonexistent/prompt.txt"), false).unwrap_err();
        assert!(err.to_string().contains("failed to read payload file"));
    }

    #[test]
    fn commit_output_matches_wire_shape() {
        let payload = Payload::text("What is 2+2?");
        let output = build_commit(&payload, ContentKind::Prompt, None).unwrap();
        let expected = address_of(&payload).unwrap().to_commitment_ref();
        assert_eq!(output.commitment, expected);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["entry"]["variant"], "commit_only");
        assert_eq!(json["entry"]["kind"], "prompt");
        assert_eq!(json["entry"]["digest"], expected.digest.as_str());
        assert_eq!(
            json["entry"]["content_address"],
            expected.content_address.as_str()
        );
        assert!(json["entry"].get("signature").is_none());

        let entry: ContentEnvelope = serde_json::from_value(json["entry"].clone()).unwrap();
        assert_eq!(entry, output.entry);
    }

    #[test]
    fn reveal_without_prior_is_direct() {
        let entry = build_reveal(Payload::text("4"), ContentKind::Response, None, false).unwrap();
        let ContentEnvelope::Revealed(revealed) = entry else {
            panic!("expected a revealed entry");
        };
        assert!(revealed.prior_commitment.is_none());
        let expected = address_of(&Payload::text("4")).unwrap().to_commitment_ref();
        assert_eq!(revealed.digest.as_deref(), Some(expected.digest.as_str()));
    }

    #[test]
    fn reveal_with_prior_references_own_commitment() {
        let payload = Payload::text("What is 2+2?");
        let commit = build_commit(&payload, ContentKind::Prompt, None).unwrap();
        let entry = build_reveal(payload, ContentKind::Prompt, None, true).unwrap();
        let ContentEnvelope::Revealed(revealed) = entry else {
            panic!("expected a revealed entry");
        };
        assert_eq!(revealed.prior_commitment, Some(commit.commitment));
    }

    #[test]
    fn signed_entries_verify() {
        let dir = tempfile::tempdir().unwrap();
        let key = keyfile(&dir);
        let payload = Payload::Json(serde_json::json!({"score": 7, "rubric": "accuracy"}));
        let content = address_of(&payload).unwrap();

        let commit = build_commit(&payload, ContentKind::Score, Some(&key)).unwrap();
        let reveal = build_reveal(payload, ContentKind::Score, Some(&key), true).unwrap();

        let verifier = SignatureVerifier::new();
        for entry in [&commit.entry, &reveal] {
            assert!(entry.signing().is_signed());
            verifier
                .check_fields(&content.digest, entry.signing())
                .expect("signature should verify");
        }
    }

    #[test]
    fn signing_with_missing_key_fails() {
        let err = build_commit(
            &Payload::text("x"),
            ContentKind::Prompt,
            Some(Path::new("/nonexistent/key")),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read key file"));
    }
}
