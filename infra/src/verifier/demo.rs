//! Demo credential verifier
//!
//! Accepts one configured password, one authenticator code, a set of
//! single-use recovery codes, and whatever one-time codes the issuing gateway
//! has stored. Secrets are only held hashed: the password with bcrypt, the
//! other codes as SHA-256 digests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use tracing::{error, info, warn};

use vc_core::{normalize_recovery_code, Channel, CredentialVerifierTrait, VerifyResponse};
use vc_shared::mask_identifier;

use crate::config::DemoSecrets;
use crate::store::{digest_code, OtpCheck, OtpStore};
use crate::InfrastructureError;

pub struct DemoCredentialVerifier {
    password_hash: String,
    totp_digest: String,
    recovery_digests: Mutex<HashSet<String>>,
    otp_store: Arc<OtpStore>,
}

impl DemoCredentialVerifier {
    /// Hash `secrets` and build a verifier backed by `otp_store`
    ///
    /// # Returns
    ///
    /// * `Ok(DemoCredentialVerifier)` - Verifier holding only hashed secrets
    /// * `Err(InfrastructureError)` - If the password could not be hashed
    pub fn from_secrets(
        secrets: &DemoSecrets,
        bcrypt_cost: u32,
        otp_store: Arc<OtpStore>,
    ) -> Result<Self, InfrastructureError> {
        let password_hash = bcrypt::hash(&secrets.password, bcrypt_cost)?;
        let recovery_digests = secrets
            .recovery_codes
            .iter()
            .map(|code| digest_code(&normalize_recovery_code(code)))
            .collect();

        Ok(Self {
            password_hash,
            totp_digest: digest_code(secrets.totp_code.trim()),
            recovery_digests: Mutex::new(recovery_digests),
            otp_store,
        })
    }

    /// Recovery codes not used yet
    pub fn remaining_recovery_codes(&self) -> usize {
        self.recovery_digests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    async fn verify_password(&self, secret: &str) -> VerifyResponse {
        let secret = secret.to_string();
        let hash = self.password_hash.clone();

        match tokio::task::spawn_blocking(move || bcrypt::verify(secret, &hash)).await {
            Ok(Ok(true)) => VerifyResponse::Accept,
            Ok(Ok(false)) => VerifyResponse::Reject,
            Ok(Err(e)) => {
                error!(error = %e, "Password hash check failed");
                VerifyResponse::TransportError(format!("Password check failed: {}", e))
            }
            Err(e) => {
                error!(error = %e, "Password check task failed");
                VerifyResponse::TransportError(format!("Password check task failed: {}", e))
            }
        }
    }

    fn verify_totp(&self, secret: &str) -> VerifyResponse {
        let provided = digest_code(secret);
        if constant_time_eq(self.totp_digest.as_bytes(), provided.as_bytes()) {
            VerifyResponse::Accept
        } else {
            VerifyResponse::Reject
        }
    }

    fn verify_recovery_code(&self, secret: &str) -> VerifyResponse {
        let provided = digest_code(&normalize_recovery_code(secret));
        let mut digests = self
            .recovery_digests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let matched = digests
            .iter()
            .find(|digest| constant_time_eq(digest.as_bytes(), provided.as_bytes()))
            .cloned();

        match matched {
            Some(digest) => {
                digests.remove(&digest);
                info!(
                    remaining = digests.len(),
                    event = "recovery_code_consumed",
                    "Recovery code accepted and consumed"
                );
                VerifyResponse::Accept
            }
            None => VerifyResponse::Reject,
        }
    }

    fn verify_one_time_code(
        &self,
        channel: Channel,
        identifier: &str,
        secret: &str,
    ) -> VerifyResponse {
        match self.otp_store.verify(channel, identifier, secret) {
            OtpCheck::Valid => VerifyResponse::Accept,
            OtpCheck::Mismatch | OtpCheck::Expired | OtpCheck::Missing => VerifyResponse::Reject,
        }
    }
}

#[async_trait]
impl CredentialVerifierTrait for DemoCredentialVerifier {
    async fn verify_secret(
        &self,
        channel: Channel,
        identifier: &str,
        secret: &str,
    ) -> VerifyResponse {
        let response = match channel {
            Channel::Password => self.verify_password(secret).await,
            Channel::Totp => self.verify_totp(secret),
            Channel::RecoveryCode => self.verify_recovery_code(secret),
            Channel::Sms | Channel::Whatsapp | Channel::EmailOtp => {
                self.verify_one_time_code(channel, identifier, secret)
            }
        };

        if response == VerifyResponse::Reject {
            warn!(
                channel = %channel,
                identifier = %mask_identifier(identifier),
                event = "verification_failed",
                "Demo verifier rejected secret"
            );
        }
        response
    }
}
