//! Password hashing and password policy.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_PASSWORD_LENGTH: usize = 6;

mod mixtape_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let argon2 = Argon2::default();
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = argon2
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let argon2 = Argon2::default();
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(argon2.verify_password(plain_pw, &password_hash).is_ok())
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MixtapeHasher {
    Argon2,
    /// Fast test-only hasher - DO NOT use in production!
    #[cfg(feature = "test-fast-hasher")]
    TestFast,
}

impl Default for MixtapeHasher {
    fn default() -> Self {
        #[cfg(feature = "test-fast-hasher")]
        return MixtapeHasher::TestFast;
        #[cfg(not(feature = "test-fast-hasher"))]
        return MixtapeHasher::Argon2;
    }
}

impl FromStr for MixtapeHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(MixtapeHasher::Argon2),
            #[cfg(feature = "test-fast-hasher")]
            "test_fast" => Ok(MixtapeHasher::TestFast),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl std::fmt::Display for MixtapeHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixtapeHasher::Argon2 => write!(f, "argon2"),
            #[cfg(feature = "test-fast-hasher")]
            MixtapeHasher::TestFast => write!(f, "test_fast"),
        }
    }
}

impl MixtapeHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            MixtapeHasher::Argon2 => mixtape_argon2::generate_b64_salt(),
            #[cfg(feature = "test-fast-hasher")]
            MixtapeHasher::TestFast => "test_salt".to_string(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            MixtapeHasher::Argon2 => mixtape_argon2::hash(plain, b64_salt),
            #[cfg(feature = "test-fast-hasher")]
            MixtapeHasher::TestFast => {
                let hex: String = plain.iter().map(|b| format!("{:02x}", b)).collect();
                Ok(format!("$testfast${}${}", b64_salt.as_ref(), hex))
            }
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: T, target_hash: T) -> Result<bool> {
        match self {
            MixtapeHasher::Argon2 => {
                mixtape_argon2::verify(plain_pw.as_ref().as_bytes(), target_hash)
            }
            #[cfg(feature = "test-fast-hasher")]
            MixtapeHasher::TestFast => {
                let expected = self.hash(plain_pw.as_ref().as_bytes(), "test_salt")?;
                Ok(expected == target_hash.as_ref())
            }
        }
    }
}

/// Salted password hash as persisted in the users file. The plaintext
/// password never reaches the disk.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredentials {
    pub hasher: MixtapeHasher,
    pub salt: String,
    pub hash: String,
}

impl PasswordCredentials {
    pub fn create(password: &str) -> Result<PasswordCredentials> {
        let hasher = MixtapeHasher::default();
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(PasswordCredentials { hasher, salt, hash })
    }

    pub fn verify(&self, password: &str) -> bool {
        self.hasher
            .verify(password, self.hash.as_str())
            .unwrap_or(false)
    }
}

/// Reasons a password is refused at registration, checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    TooShort,
    MissingLetter,
    MissingDigit,
    MissingSpecialCharacter,
}

impl std::fmt::Display for PasswordPolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordPolicyViolation::TooShort => write!(
                f,
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ),
            PasswordPolicyViolation::MissingLetter => {
                write!(f, "Password must contain at least one letter")
            }
            PasswordPolicyViolation::MissingDigit => {
                write!(f, "Password must contain at least one number")
            }
            PasswordPolicyViolation::MissingSpecialCharacter => {
                write!(f, "Password must contain at least one special character")
            }
        }
    }
}

/// Letters and digits are ASCII only; anything else counts as special.
pub fn check_password_policy(password: &str) -> Result<(), PasswordPolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyViolation::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(PasswordPolicyViolation::MissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyViolation::MissingDigit);
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PasswordPolicyViolation::MissingSpecialCharacter);
    }
    Ok(())
}
