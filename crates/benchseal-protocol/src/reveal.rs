//! # Reveal Verification
//!
//! Decides whether disclosed content may be accepted. [`RevealVerifier::verify`]
//! is a pure function of the uploader, the entry and the registration the
//! entry's prior reference resolved to. Checks run in a fixed order and the
//! first failure wins:
//!
//! 1. Recompute `(digest, content_address)` for the payload and the extended
//!    payload; any self-reported identifier that differs is `HASH_MISMATCH`.
//! 2. With a prior reference: a malformed reference is `MALFORMED_PAYLOAD`,
//!    an unregistered one is `UNKNOWN_COMMITMENT`, and a registration whose
//!    pair differs from the recomputed one is `HASH_MISMATCH`.
//! 3. With a prior reference: the uploader must be the committer or hold an
//!    override role, else `UNAUTHORIZED_REVEAL`.
//! 4. A present signature must verify over the recomputed digest, else
//!    `INVALID_SIGNATURE`.
//!
//! A reveal without a prior reference is a direct reveal: it skips 2 and 3,
//! and [`RevealVerifier::verify_against`] registers its identifiers. If the
//! content is already registered to someone else, the direct reveal is held
//! to the same authorization rule as step 3; leaving out the prior reference
//! does not lift another committer's embargo.

use std::collections::BTreeSet;
use std::str::FromStr;

use benchseal_core::{
    address_of, ContentRef, IdentityError, Payload, RegistrationId, Rejection, RevealedEntry, Role,
    Uploader,
};
use benchseal_crypto::SignatureVerifier;
use benchseal_registry::{HashRegistry, Registration};
use subtle::ConstantTimeEq;

use crate::error::VerifyError;

/// Roles allowed to reveal content committed by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealPolicy {
    override_roles: BTreeSet<Role>,
}

impl RevealPolicy {
    pub fn new(override_roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            override_roles: override_roles.into_iter().collect(),
        }
    }

    /// A policy under which only committers may reveal.
    pub fn committers_only() -> Self {
        Self {
            override_roles: BTreeSet::new(),
        }
    }

    pub fn allows_override(&self, role: Role) -> bool {
        self.override_roles.contains(&role)
    }

    pub fn override_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.override_roles.iter().copied()
    }
}

impl Default for RevealPolicy {
    fn default() -> Self {
        Self::new([Role::Admin])
    }
}

/// Parses a comma-separated role list such as `admin,reviewer`. An empty or
/// blank string yields [`RevealPolicy::committers_only`].
impl FromStr for RevealPolicy {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(Role::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            override_roles: roles,
        })
    }
}

/// Identifiers established for an accepted reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedReveal {
    /// Recomputed identifiers of the payload.
    pub content: ContentRef,
    /// Recomputed identifiers of the extended payload, if any.
    pub extended: Option<ContentRef>,
    /// The disclosed commitment. `None` for a direct reveal.
    pub prior: Option<Registration>,
    /// The registration backing a direct reveal's payload, set by
    /// [`RevealVerifier::verify_against`].
    pub backing: Option<Registration>,
    /// Whether the reveal was authorized by role rather than ownership.
    pub by_override: bool,
}

impl VerifiedReveal {
    pub fn is_direct(&self) -> bool {
        self.prior.is_none()
    }

    /// The registration this reveal disclosed or now rests on.
    pub fn registration_id(&self) -> Option<RegistrationId> {
        self.prior.as_ref().or(self.backing.as_ref()).map(|r| r.id)
    }
}

/// Verifier for revealed entries.
#[derive(Debug, Clone, Default)]
pub struct RevealVerifier {
    policy: RevealPolicy,
    signatures: SignatureVerifier,
}

impl RevealVerifier {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            policy,
            signatures: SignatureVerifier::new(),
        }
    }

    pub fn policy(&self) -> &RevealPolicy {
        &self.policy
    }

    /// Decide a reveal given the registration its prior reference resolved
    /// to. `claimed` is ignored for direct reveals.
    pub fn verify(
        &self,
        uploader: &Uploader,
        entry: &RevealedEntry,
        claimed: Option<&Registration>,
    ) -> Result<VerifiedReveal, Rejection> {
        let content = recompute(
            &entry.payload,
            entry.digest.as_deref(),
            entry.content_address.as_deref(),
            "payload",
        )?;
        let extended = entry
            .extended
            .as_ref()
            .map(|ext| {
                recompute(
                    &ext.payload,
                    ext.digest.as_deref(),
                    ext.content_address.as_deref(),
                    "extended payload",
                )
            })
            .transpose()?;

        let mut by_override = false;
        let prior = match &entry.prior_commitment {
            None => None,
            Some(raw) => {
                let reference = raw
                    .parse()
                    .map_err(|e| Rejection::malformed(format!("prior commitment: {e}")))?;
                let registration = claimed
                    .filter(|r| r.matches(&reference))
                    .ok_or_else(|| {
                        Rejection::unknown_commitment(format!(
                            "no registration for {}",
                            reference.content_address
                        ))
                    })?;

                let digest_eq: bool = content.digest.as_bytes()[..]
                    .ct_eq(&registration.digest.as_bytes()[..])
                    .into();
                if !digest_eq || content.content_address != registration.content_address {
                    return Err(Rejection::hash_mismatch(format!(
                        "revealed content {} does not match commitment {}",
                        content.content_address, registration.content_address
                    )));
                }

                if uploader.id != registration.committer_id {
                    if !self.policy.allows_override(uploader.role) {
                        return Err(Rejection::unauthorized(format!(
                            "{} is not the committer of {} and role '{}' cannot override",
                            uploader.id, registration.content_address, uploader.role
                        )));
                    }
                    by_override = true;
                }
                Some(registration.clone())
            }
        };

        self.signatures
            .check_fields(&content.digest, &entry.signing)
            .map_err(|e| Rejection::invalid_signature(e.to_string()))?;

        Ok(VerifiedReveal {
            content,
            extended,
            prior,
            backing: None,
            by_override,
        })
    }

    /// Resolve the prior reference in `registry`, verify, and register the
    /// identifiers of a direct reveal.
    ///
    /// A direct reveal of content registered to another uploader is
    /// `UNAUTHORIZED_REVEAL` unless the uploader holds an override role.
    pub async fn verify_against<R>(
        &self,
        registry: &R,
        uploader: &Uploader,
        entry: &RevealedEntry,
    ) -> Result<VerifiedReveal, VerifyError>
    where
        R: HashRegistry + ?Sized,
    {
        let claimed = match entry.prior_commitment.as_ref().map(|raw| raw.parse()) {
            Some(Ok(reference)) => registry.lookup(&reference).await?,
            _ => None,
        };
        let mut verified = self.verify(uploader, entry, claimed.as_ref())?;
        if !verified.is_direct() {
            return Ok(verified);
        }

        let mut backing = None;
        let mut by_override = false;
        let pairs = std::iter::once(&verified.content).chain(verified.extended.as_ref());
        for content in pairs {
            let registration = registry.register(content, &uploader.id).await?;
            if registration.committer_id != uploader.id {
                if !self.policy.allows_override(uploader.role) {
                    return Err(Rejection::unauthorized(format!(
                        "{} is registered to {}; {} cannot reveal it directly with role '{}'",
                        content.content_address,
                        registration.committer_id,
                        uploader.id,
                        uploader.role
                    ))
                    .into());
                }
                by_override = true;
            }
            backing.get_or_insert(registration);
        }
        verified.backing = backing;
        verified.by_override = by_override;
        Ok(verified)
    }
}

/// Recompute identifiers for `payload` and compare them with any
/// self-reported ones.
fn recompute(
    payload: &Payload,
    claimed_digest: Option<&str>,
    claimed_address: Option<&str>,
    what: &str,
) -> Result<ContentRef, Rejection> {
    let content =
        address_of(payload).map_err(|e| Rejection::malformed(format!("{what}: {e}")))?;

    if let Some(claimed) = claimed_digest {
        let recomputed = content.digest.to_hex();
        let eq: bool = claimed
            .to_ascii_lowercase()
            .as_bytes()
            .ct_eq(recomputed.as_bytes())
            .into();
        if !eq {
            return Err(Rejection::hash_mismatch(format!(
                "{what} digest {claimed} does not match recomputed {recomputed}"
            )));
        }
    }
    if let Some(claimed) = claimed_address {
        if claimed != content.content_address.as_str() {
            return Err(Rejection::hash_mismatch(format!(
                "{what} content address {claimed} does not match recomputed {}",
                content.content_address
            )));
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchseal_core::{SigningFields, UploaderId, VerificationOutcome};
    use benchseal_crypto::Ed25519KeyPair;

    fn uploader(id: &str, role: Role) -> Uploader {
        Uploader::new(UploaderId::new(id).unwrap(), role)
    }

    fn reveal(text: &str) -> RevealedEntry {
        RevealedEntry {
            kind: benchseal_core::ContentKind::Prompt,
            payload: Payload::text(text),
            digest: None,
            content_address: None,
            extended: None,
            prior_commitment: None,
            signing: SigningFields::default(),
        }
    }

    fn committed(text: &str, committer: &str) -> Registration {
        let content = address_of(&Payload::text(text)).unwrap();
        Registration::new(&content, &UploaderId::new(committer).unwrap())
    }

    fn revealing(text: &str, registration: &Registration) -> RevealedEntry {
        RevealedEntry {
            prior_commitment: Some(registration.content_ref().to_commitment_ref()),
            ..reveal(text)
        }
    }

    fn outcome(r: Result<VerifiedReveal, Rejection>) -> VerificationOutcome {
        match r {
            Ok(_) => VerificationOutcome::Accepted,
            Err(rej) => rej.outcome,
        }
    }

    #[test]
    fn policy_parsing() {
        let p: RevealPolicy = "admin, reviewer".parse().unwrap();
        assert!(p.allows_override(Role::Admin));
        assert!(p.allows_override(Role::Reviewer));
        assert!(!p.allows_override(Role::Contributor));
        assert_eq!(" ".parse::<RevealPolicy>().unwrap(), RevealPolicy::committers_only());
        assert!("admin,owner".parse::<RevealPolicy>().is_err());
        assert_eq!(RevealPolicy::default(), RevealPolicy::new([Role::Admin]));
    }

    #[test]
    fn committer_reveal_accepted() {
        let reg = committed("What is 2+2?", "alice");
        let v = RevealVerifier::default()
            .verify(
                &uploader("alice", Role::Contributor),
                &revealing("What is 2+2?", &reg),
                Some(&reg),
            )
            .unwrap();
        assert_eq!(v.prior.as_ref().map(|r| r.id), Some(reg.id));
        assert!(!v.by_override);
    }

    #[test]
    fn tampered_reveal_is_hash_mismatch() {
        let reg = committed("What is 2+2?", "alice");
        let r = RevealVerifier::default().verify(
            &uploader("alice", Role::Contributor),
            &revealing("What is 2+3?", &reg),
            Some(&reg),
        );
        assert_eq!(outcome(r), VerificationOutcome::HashMismatch);
    }

    #[test]
    fn self_reported_digest_checked() {
        let mut e = reveal("What is 2+2?");
        e.digest = Some("52CB6B5E4A038AF1756708F98AFB718A08C75B87B2F03DBEE4DD9C8139C15C5E".into());
        let u = uploader("alice", Role::Contributor);
        assert!(RevealVerifier::default().verify(&u, &e, None).is_ok());

        e.digest = Some("f574924a4d93e5f1f0f6eb831c6cbd762a6e210ab84c3802fcb069986bcf1c6a".into());
        assert_eq!(
            outcome(RevealVerifier::default().verify(&u, &e, None)),
            VerificationOutcome::HashMismatch
        );
    }

    #[test]
    fn self_reported_extended_address_checked() {
        let mut e = reveal("4");
        e.extended = Some(benchseal_core::ExtendedPayload {
            payload: Payload::text("The answer is 4."),
            digest: None,
            content_address: Some(
                "bafkreicsznvv4sqdrlyxkzyi7gfpw4mkbddvxb5s6a635zg5tsattqk4ly".into(),
            ),
        });
        let r = RevealVerifier::default().verify(&uploader("a", Role::Contributor), &e, None);
        assert_eq!(outcome(r), VerificationOutcome::HashMismatch);
    }

    #[test]
    fn missing_registration_is_unknown_commitment() {
        let reg = committed("What is 2+2?", "alice");
        let r = RevealVerifier::default().verify(
            &uploader("alice", Role::Contributor),
            &revealing("What is 2+2?", &reg),
            None,
        );
        assert_eq!(outcome(r), VerificationOutcome::UnknownCommitment);
    }

    #[test]
    fn malformed_prior_reference() {
        let mut e = reveal("x");
        e.prior_commitment = Some(benchseal_core::CommitmentRef {
            digest: "00".into(),
            content_address: "Qm123".into(),
        });
        let r = RevealVerifier::default().verify(&uploader("a", Role::Contributor), &e, None);
        assert_eq!(outcome(r), VerificationOutcome::MalformedPayload);
    }

    #[test]
    fn non_committer_rejected_unless_override_role() {
        let reg = committed("What is 2+2?", "alice");
        let entry = revealing("What is 2+2?", &reg);
        let verifier = RevealVerifier::default();

        let bob = verifier.verify(&uploader("bob", Role::Contributor), &entry, Some(&reg));
        assert_eq!(outcome(bob), VerificationOutcome::UnauthorizedReveal);

        let reviewer = verifier.verify(&uploader("rita", Role::Reviewer), &entry, Some(&reg));
        assert_eq!(outcome(reviewer), VerificationOutcome::UnauthorizedReveal);

        let admin = verifier
            .verify(&uploader("root", Role::Admin), &entry, Some(&reg))
            .unwrap();
        assert!(admin.by_override);

        let strict = RevealVerifier::new(RevealPolicy::committers_only());
        let r = strict.verify(&uploader("root", Role::Admin), &entry, Some(&reg));
        assert_eq!(outcome(r), VerificationOutcome::UnauthorizedReveal);
    }

    #[tokio::test]
    async fn direct_reveal_of_anothers_registration_needs_authorization() {
        use benchseal_registry::{MemorySubmissionStore, SubmissionStore, SubmissionTx};

        let store = MemorySubmissionStore::new();
        let alice = uploader("alice", Role::Contributor);
        let content = address_of(&Payload::text("What is 2+2?")).unwrap();
        let tx = store.begin().await.unwrap();
        let reg = tx.register(&content, &alice.id).await.unwrap();
        tx.commit().await.unwrap();

        let mut entry = reveal("What is 2+2?");
        entry.digest = Some(content.digest.to_hex());
        entry.content_address = Some(content.content_address.to_string());

        let verifier = RevealVerifier::default();
        let tx = store.begin().await.unwrap();
        let bob = verifier
            .verify_against(&*tx, &uploader("bob", Role::Contributor), &entry)
            .await;
        assert!(matches!(
            bob,
            Err(VerifyError::Rejected(ref r)) if r.outcome == VerificationOutcome::UnauthorizedReveal
        ));

        let own = verifier.verify_against(&*tx, &alice, &entry).await.unwrap();
        assert_eq!(own.registration_id(), Some(reg.id));
        assert!(!own.by_override);

        let admin = verifier
            .verify_against(&*tx, &uploader("root", Role::Admin), &entry)
            .await
            .unwrap();
        assert_eq!(admin.registration_id(), Some(reg.id));
        assert!(admin.by_override);
    }

    #[test]
    fn hash_mismatch_reported_before_authorization() {
        let reg = committed("What is 2+2?", "alice");
        let r = RevealVerifier::default().verify(
            &uploader("mallory", Role::Contributor),
            &revealing("What is 2+3?", &reg),
            Some(&reg),
        );
        assert_eq!(outcome(r), VerificationOutcome::HashMismatch);
    }

    #[test]
    fn signature_checked_over_recomputed_digest() {
        let kp = Ed25519KeyPair::generate();
        let mut e = reveal("What is 2+2?");
        let digest = address_of(&e.payload).unwrap().digest;
        e.signing = SigningFields {
            signature: Some(kp.sign_digest(&digest).to_hex()),
            public_key: Some(kp.public_key().to_hex()),
            signature_algorithm: Some("ed25519".into()),
            key_algorithm: Some("ed25519".into()),
        };
        let u = uploader("alice", Role::Contributor);
        assert!(RevealVerifier::default().verify(&u, &e, None).is_ok());

        e.payload = Payload::text("What is 2+3?");
        assert_eq!(
            outcome(RevealVerifier::default().verify(&u, &e, None)),
            VerificationOutcome::InvalidSignature
        );
    }

    #[test]
    fn float_json_payload_is_malformed() {
        let mut e = reveal("");
        e.payload = Payload::Json(serde_json::json!({"score": 0.5}));
        let r = RevealVerifier::default().verify(&uploader("a", Role::Contributor), &e, None);
        assert_eq!(outcome(r), VerificationOutcome::MalformedPayload);
    }
}
