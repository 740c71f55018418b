use std::{env, fs};

use secrecy::SecretString;
use tracing::error;

/// Reads a secret either from the file named by `file_env_var_name` or,
/// failing that, directly from `env_var_name`.
///
/// The file form follows the `POSTGRES_PASSWORD_FILE` convention used with
/// container secrets. Trailing whitespace in the file is dropped.
pub fn get_secret(file_env_var_name: &str, env_var_name: &str) -> Option<SecretString> {
    get_secret_with(|key| env::var(key).ok(), file_env_var_name, env_var_name)
}

/// Same as [`get_secret`], resolving variables through `lookup`.
pub fn get_secret_with(
    lookup: impl Fn(&str) -> Option<String>,
    file_env_var_name: &str,
    env_var_name: &str,
) -> Option<SecretString> {
    if let Some(secret_file_path) = lookup(file_env_var_name) {
        match fs::read_to_string(&secret_file_path) {
            Ok(content) => Some(SecretString::from(content.trim().to_string())),
            Err(e) => {
                error!(%secret_file_path, ?e, "Error reading secret file");
                None
            }
        }
    } else {
        lookup(env_var_name).map(SecretString::from)
    }
}
