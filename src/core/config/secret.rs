use std::{fs, io::Write, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Shared HMAC key for local development when no identity provider secret is configured.
/// Strict mode refuses to start without `SECRET_KEY`, so this never runs in production.
pub(super) fn dev_identity_secret() -> String {
    let path = dev_secret_path();

    if let Some(existing) = read_non_empty(&path) {
        return existing;
    }

    let generated = generate_secret();
    tracing::warn!(
        path = %path.display(),
        "SECRET_KEY not configured; using a generated development identity secret"
    );

    let created = fs::OpenOptions::new().write(true).create_new(true).open(&path);
    match created {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;

                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(error = %err, "Failed to restrict development secret file");
                }
            }

            if let Err(err) = file.write_all(generated.as_bytes()) {
                tracing::warn!(error = %err, "Failed to persist development secret");
            }
            generated
        }
        // Another process won the race; reuse its key so tokens stay verifiable.
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            read_non_empty(&path).unwrap_or(generated)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to create development secret file");
            generated
        }
    }
}

fn read_non_empty(path: &PathBuf) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; 48];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn dev_secret_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".dev_identity_secret")
}
