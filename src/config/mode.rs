use crate::utils::error::{DigestError, Result};
use crate::utils::validation::validate_email;
use std::fmt;

pub const DRY_RUN_VAR: &str = "DRY_RUN";
pub const CLIENT_ID_VAR: &str = "GMAIL_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GMAIL_CLIENT_SECRET";
pub const REFRESH_TOKEN_VAR: &str = "GMAIL_REFRESH_TOKEN";
pub const RECIPIENT_VAR: &str = "RECIPIENT_EMAIL";

#[derive(Clone, PartialEq, Eq)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for GmailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// How the rendered digest leaves the process. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    DryRun {
        output_path: String,
    },
    Live {
        credentials: GmailCredentials,
        recipient: String,
    },
}

impl ExecutionMode {
    /// Live mode fails here, before any network call, when a credential is absent.
    pub fn from_lookup<F>(lookup: F, output_path: &str) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(DRY_RUN_VAR).is_some_and(|v| is_truthy(&v)) {
            return Ok(ExecutionMode::DryRun {
                output_path: output_path.to_string(),
            });
        }

        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let client_id = value(CLIENT_ID_VAR);
        let client_secret = value(CLIENT_SECRET_VAR);
        let refresh_token = value(REFRESH_TOKEN_VAR);
        let recipient = value(RECIPIENT_VAR);

        let missing: Vec<&str> = [
            (CLIENT_ID_VAR, client_id.is_none()),
            (CLIENT_SECRET_VAR, client_secret.is_none()),
            (REFRESH_TOKEN_VAR, refresh_token.is_none()),
            (RECIPIENT_VAR, recipient.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(key, _)| key)
        .collect();

        match (client_id, client_secret, refresh_token, recipient) {
            (Some(client_id), Some(client_secret), Some(refresh_token), Some(recipient)) => {
                let recipient = recipient.trim().to_string();
                validate_email(RECIPIENT_VAR, &recipient)?;
                Ok(ExecutionMode::Live {
                    credentials: GmailCredentials {
                        client_id,
                        client_secret,
                        refresh_token,
                    },
                    recipient,
                })
            }
            _ => Err(DigestError::MissingConfigError {
                field: missing.join(", "),
            }),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionMode::DryRun { .. })
    }
}

pub fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
}
