//! Asymmetric keys for the three supported families.
//!
//! [`KeyPair`] is the private role and [`PublicKey`] the public role. Both are
//! closed tagged unions: every algorithm exposes the same capabilities (sign,
//! verify, export, derive the public half) and callers never branch on the
//! concrete algorithm themselves.
//!
//! | Family | Algorithms |
//! |--------|------------|
//! | `RSA`  | RSA with PKCS#1 v1.5 / SHA-256 signatures |
//! | `EC`   | ECDSA P-256, ECDSA P-384, Ed25519 |
//! | `DSA`  | DSA with SHA-256 signatures |

mod format;

pub use format::KeyFormat;

use std::fmt;
use std::str::FromStr;

use const_oid::ObjectIdentifier;
use const_oid::db::{rfc5912, rfc8410};
use der::Decode;
use pkcs8::pkcs5::pbes2;
use pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey,
    EncryptedPrivateKeyInfo, PrivateKeyInfo, SubjectPublicKeyInfoRef,
};
use rand_core::{OsRng, RngCore};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::{Result, SignError};
use crate::pem_utils;

/// RSA modulus size used when a key is generated for the `RSA` family.
pub const DEFAULT_RSA_BITS: usize = 2048;

/// PBKDF2 iteration count for encrypted PKCS#8 exports.
const PBKDF2_ITERATIONS: u32 = 2048;

/// The algorithm family of a key, as reported to clients and used to pick a loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFamily {
    Rsa,
    #[default]
    Ec,
    Dsa,
}

impl KeyFamily {
    /// Detects the family of a subject public key info from its algorithm OID.
    ///
    /// Returns `None` for algorithms outside the three supported families.
    pub fn detect(spki: &SubjectPublicKeyInfoOwned) -> Option<Self> {
        Self::from_algorithm(&spki.algorithm.oid)
    }

    /// Maps a public key algorithm OID to its family.
    pub fn from_algorithm(oid: &ObjectIdentifier) -> Option<Self> {
        match *oid {
            rfc5912::RSA_ENCRYPTION => Some(Self::Rsa),
            rfc5912::ID_EC_PUBLIC_KEY | rfc8410::ID_ED_25519 => Some(Self::Ec),
            rfc5912::ID_DSA => Some(Self::Dsa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Dsa => "DSA",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyFamily {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RSA" => Ok(Self::Rsa),
            "EC" => Ok(Self::Ec),
            "DSA" => Ok(Self::Dsa),
            other => Err(SignError::KeyLoad(format!("unknown key mode {other}"))),
        }
    }
}

/// A private key of any supported algorithm.
#[derive(Clone)]
pub enum KeyPair {
    Rsa(Box<RsaPrivateKey>),
    EcdsaP256(p256::ecdsa::SigningKey),
    EcdsaP384(p384::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
    Dsa(Box<dsa::SigningKey>),
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPair").field(&self.algorithm_name()).finish()
    }
}

impl KeyPair {
    /// Generates a key for `family`: RSA 2048, Ed25519 for EC, or DSA 2048/224.
    pub fn generate(family: KeyFamily) -> Result<Self> {
        match family {
            KeyFamily::Rsa => Self::generate_rsa(DEFAULT_RSA_BITS),
            KeyFamily::Ec => Ok(Self::generate_ed25519()),
            KeyFamily::Dsa => Ok(Self::generate_dsa()),
        }
    }

    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)?;
        Ok(KeyPair::Rsa(Box::new(private)))
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        KeyPair::EcdsaP256(p256::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        KeyPair::EcdsaP384(p384::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        KeyPair::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    /// Generate a DSA key pair over fresh 2048/224 domain parameters.
    ///
    /// Parameter generation searches for primes and is slow.
    pub fn generate_dsa() -> Self {
        let components = dsa::Components::generate(&mut OsRng, dsa::KeySize::DSA_2048_224);
        KeyPair::Dsa(Box::new(dsa::SigningKey::generate(&mut OsRng, components)))
    }

    /// Loads a private key and checks that it belongs to `family`.
    ///
    /// Accepts PEM (`PRIVATE KEY`, `ENCRYPTED PRIVATE KEY`, `RSA PRIVATE KEY`,
    /// `EC PRIVATE KEY`) or the same structures as bare DER. `passphrase` is
    /// required for encrypted PKCS#8.
    pub fn load(family: KeyFamily, bytes: &[u8], passphrase: Option<&str>) -> Result<Self> {
        let key = Self::decode(bytes, passphrase)?;
        if key.family() != family {
            return Err(SignError::KeyLoad(format!(
                "expected a {family} PrivateKey, found a {} key",
                key.family()
            )));
        }
        Ok(key)
    }

    /// Loads a private key of whatever family the material encodes.
    pub fn decode(bytes: &[u8], passphrase: Option<&str>) -> Result<Self> {
        if let Some(block) = pem_utils::parse_block(bytes).map_err(key_load)? {
            return match block.tag() {
                "PRIVATE KEY" => Self::from_pkcs8_der(block.contents()),
                "ENCRYPTED PRIVATE KEY" => {
                    Self::from_encrypted_pkcs8_der(block.contents(), passphrase)
                }
                "RSA PRIVATE KEY" => {
                    let key = RsaPrivateKey::from_pkcs1_der(block.contents()).map_err(key_load)?;
                    Ok(KeyPair::Rsa(Box::new(key)))
                }
                "EC PRIVATE KEY" => Self::from_sec1_der(block.contents()),
                "PUBLIC KEY" | "RSA PUBLIC KEY" => Err(public_given_as_private()),
                other => Err(SignError::KeyLoad(format!(
                    "unsupported PEM label {other}"
                ))),
            };
        }

        if format::is_openssh_line(bytes) {
            return Err(public_given_as_private());
        }

        if let Ok(key) = Self::from_pkcs8_der(bytes) {
            return Ok(key);
        }
        if EncryptedPrivateKeyInfo::try_from(bytes).is_ok() {
            return Self::from_encrypted_pkcs8_der(bytes, passphrase);
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs1_der(bytes) {
            return Ok(KeyPair::Rsa(Box::new(key)));
        }
        if let Ok(key) = Self::from_sec1_der(bytes) {
            return Ok(key);
        }
        if PublicKey::from_spki_der(bytes).is_ok() || RsaPublicKey::from_pkcs1_der(bytes).is_ok() {
            return Err(public_given_as_private());
        }
        Err(SignError::KeyLoad(
            "unrecognized private key encoding".to_string(),
        ))
    }

    /// Decodes an unencrypted PKCS#8 `PrivateKeyInfo`.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::try_from(der)?;
        match info.algorithm.oid {
            rfc5912::RSA_ENCRYPTION => Ok(KeyPair::Rsa(Box::new(
                RsaPrivateKey::from_pkcs8_der(der)?,
            ))),
            rfc5912::ID_EC_PUBLIC_KEY => match info.algorithm.parameters_oid()? {
                rfc5912::SECP_256_R_1 => Ok(KeyPair::EcdsaP256(
                    p256::ecdsa::SigningKey::from_pkcs8_der(der)?,
                )),
                rfc5912::SECP_384_R_1 => Ok(KeyPair::EcdsaP384(
                    p384::ecdsa::SigningKey::from_pkcs8_der(der)?,
                )),
                curve => Err(SignError::KeyLoad(format!(
                    "unsupported elliptic curve {curve}"
                ))),
            },
            rfc8410::ID_ED_25519 => Ok(KeyPair::Ed25519(
                ed25519_dalek::SigningKey::from_pkcs8_der(der)?,
            )),
            rfc5912::ID_DSA => Ok(KeyPair::Dsa(Box::new(dsa::SigningKey::from_pkcs8_der(
                der,
            )?))),
            other => Err(SignError::KeyLoad(format!(
                "unsupported private key algorithm {other}"
            ))),
        }
    }

    fn from_encrypted_pkcs8_der(der: &[u8], passphrase: Option<&str>) -> Result<Self> {
        let passphrase = passphrase.ok_or_else(|| {
            SignError::KeyLoad("the PrivateKey is encrypted and no passphrase was given".into())
        })?;
        let info = EncryptedPrivateKeyInfo::try_from(der)?;
        let document = info.decrypt(passphrase)?;
        Self::from_pkcs8_der(document.as_bytes())
    }

    fn from_sec1_der(der: &[u8]) -> Result<Self> {
        if let Ok(secret) = p256::SecretKey::from_sec1_der(der) {
            return Ok(KeyPair::EcdsaP256(secret.into()));
        }
        p384::SecretKey::from_sec1_der(der)
            .map(|secret| KeyPair::EcdsaP384(secret.into()))
            .map_err(|_| SignError::KeyLoad("unsupported SEC1 private key".to_string()))
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            KeyPair::Rsa(_) => KeyFamily::Rsa,
            KeyPair::EcdsaP256(_) | KeyPair::EcdsaP384(_) | KeyPair::Ed25519(_) => KeyFamily::Ec,
            KeyPair::Dsa(_) => KeyFamily::Dsa,
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        match self {
            KeyPair::Rsa(_) => "RSA",
            KeyPair::EcdsaP256(_) => "ECDSA P-256",
            KeyPair::EcdsaP384(_) => "ECDSA P-384",
            KeyPair::Ed25519(_) => "Ed25519",
            KeyPair::Dsa(_) => "DSA",
        }
    }

    /// Returns the public half of this key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            KeyPair::EcdsaP256(key) => PublicKey::EcdsaP256(*key.verifying_key()),
            KeyPair::EcdsaP384(key) => PublicKey::EcdsaP384(*key.verifying_key()),
            KeyPair::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            KeyPair::Dsa(key) => PublicKey::Dsa(key.verifying_key().clone()),
        }
    }

    /// The certificate signature algorithm this key produces.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa(_) => SignatureAlgorithm::Sha256WithRSA,
            KeyPair::EcdsaP256(_) => SignatureAlgorithm::Sha256WithECDSA,
            KeyPair::EcdsaP384(_) => SignatureAlgorithm::Sha384WithECDSA,
            KeyPair::Ed25519(_) => SignatureAlgorithm::Ed25519,
            KeyPair::Dsa(_) => SignatureAlgorithm::Sha256WithDSA,
        }
    }

    /// Signs `message`, returning the signature in its X.509 encoding
    /// (DER for ECDSA and DSA, raw bytes for RSA and Ed25519).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            KeyPair::Rsa(key) => {
                let signing_key =
                    rsa::pkcs1v15::SigningKey::<Sha256>::new(key.as_ref().clone());
                let signature = signing_key.try_sign(message).map_err(signing)?;
                Ok(signature.to_vec())
            }
            KeyPair::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = key.try_sign(message).map_err(signing)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384(key) => {
                let signature: p384::ecdsa::Signature = key.try_sign(message).map_err(signing)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::Ed25519(key) => {
                let signature = key.try_sign(message).map_err(signing)?;
                Ok(signature.to_bytes().to_vec())
            }
            KeyPair::Dsa(key) => {
                let signature: dsa::Signature = key.try_sign(message).map_err(signing)?;
                Ok(SignatureEncoding::to_vec(&signature))
            }
        }
    }

    /// PKCS#8 DER of the private key.
    pub fn to_pkcs8_der(&self) -> Result<pkcs8::SecretDocument> {
        let document = match self {
            KeyPair::Rsa(key) => key.to_pkcs8_der(),
            KeyPair::EcdsaP256(key) => key.to_pkcs8_der(),
            KeyPair::EcdsaP384(key) => key.to_pkcs8_der(),
            KeyPair::Ed25519(key) => key.to_pkcs8_der(),
            KeyPair::Dsa(key) => key.to_pkcs8_der(),
        };
        document.map_err(encoding)
    }

    /// Serializes the private key.
    ///
    /// `PKCS8` honours `passphrase` by producing an `ENCRYPTED PRIVATE KEY`
    /// (PBES2 with PBKDF2-SHA256 and AES-256-CBC). `PKCS1` is only defined for
    /// unencrypted RSA keys; `OpenSSH` and `XML` only exist for public keys.
    pub fn export(&self, format: KeyFormat, passphrase: Option<&str>) -> Result<String> {
        let passphrase = passphrase.filter(|p| !p.is_empty());
        match format {
            KeyFormat::Pkcs8 => {
                let document = self.to_pkcs8_der()?;
                let Some(passphrase) = passphrase else {
                    return Ok(pem_utils::der_to_pem(document.as_bytes(), "PRIVATE KEY"));
                };
                let info = PrivateKeyInfo::try_from(document.as_bytes()).map_err(encoding)?;
                let mut salt = [0u8; 16];
                let mut iv = [0u8; 16];
                OsRng.fill_bytes(&mut salt);
                OsRng.fill_bytes(&mut iv);
                let params =
                    pbes2::Parameters::pbkdf2_sha256_aes256cbc(PBKDF2_ITERATIONS, &salt, &iv)
                        .map_err(encoding)?;
                let encrypted = info
                    .encrypt_with_params(params, passphrase)
                    .map_err(encoding)?;
                Ok(pem_utils::der_to_pem(
                    encrypted.as_bytes(),
                    "ENCRYPTED PRIVATE KEY",
                ))
            }
            KeyFormat::Pkcs1 => match self {
                KeyPair::Rsa(_) if passphrase.is_some() => Err(SignError::UnsupportedFormat(
                    "encrypted PKCS1 private keys are not supported".to_string(),
                )),
                KeyPair::Rsa(key) => {
                    let document = key.to_pkcs1_der().map_err(encoding)?;
                    Ok(pem_utils::der_to_pem(document.as_bytes(), "RSA PRIVATE KEY"))
                }
                _ => Err(SignError::UnsupportedFormat(format!(
                    "PKCS1 is only defined for RSA keys, not {}",
                    self.algorithm_name()
                ))),
            },
            KeyFormat::OpenSsh | KeyFormat::Xml => Err(SignError::UnsupportedFormat(format!(
                "{format} export is only available for public keys"
            ))),
        }
    }
}

/// A public key of any supported algorithm.
#[derive(Clone, Debug, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
    Dsa(dsa::VerifyingKey),
}

impl From<&KeyPair> for PublicKey {
    fn from(key: &KeyPair) -> Self {
        key.public_key()
    }
}

impl PublicKey {
    /// Loads a public key and checks that it belongs to `family`.
    ///
    /// Accepts PEM (`PUBLIC KEY`, `RSA PUBLIC KEY`), one-line OpenSSH keys, or
    /// bare SPKI / PKCS#1 DER.
    pub fn load(family: KeyFamily, bytes: &[u8]) -> Result<Self> {
        let key = Self::decode(bytes)?;
        if key.family() != family {
            return Err(SignError::KeyLoad(format!(
                "expected a {family} PublicKey, found a {} key",
                key.family()
            )));
        }
        Ok(key)
    }

    /// Loads a public key of whatever family the material encodes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if let Some(block) = pem_utils::parse_block(bytes).map_err(key_load)? {
            return match block.tag() {
                "PUBLIC KEY" => Self::from_spki_der(block.contents()),
                "RSA PUBLIC KEY" => Ok(PublicKey::Rsa(
                    RsaPublicKey::from_pkcs1_der(block.contents()).map_err(key_load)?,
                )),
                tag if tag.ends_with("PRIVATE KEY") => Err(private_given_as_public()),
                other => Err(SignError::KeyLoad(format!(
                    "unsupported PEM label {other}"
                ))),
            };
        }

        if let Some(key) = format::from_openssh(bytes)? {
            return Ok(key);
        }
        if let Ok(key) = Self::from_spki_der(bytes) {
            return Ok(key);
        }
        if let Ok(key) = RsaPublicKey::from_pkcs1_der(bytes) {
            return Ok(PublicKey::Rsa(key));
        }
        if PrivateKeyInfo::try_from(bytes).is_ok()
            || EncryptedPrivateKeyInfo::try_from(bytes).is_ok()
            || RsaPrivateKey::from_pkcs1_der(bytes).is_ok()
        {
            return Err(private_given_as_public());
        }
        Err(SignError::KeyLoad(
            "unrecognized public key encoding".to_string(),
        ))
    }

    /// Decodes a DER `SubjectPublicKeyInfo`.
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::try_from(der)?;
        match spki.algorithm.oid {
            rfc5912::RSA_ENCRYPTION => Ok(PublicKey::Rsa(RsaPublicKey::from_public_key_der(der)?)),
            rfc5912::ID_EC_PUBLIC_KEY => match spki.algorithm.parameters_oid()? {
                rfc5912::SECP_256_R_1 => Ok(PublicKey::EcdsaP256(
                    p256::ecdsa::VerifyingKey::from_public_key_der(der)?,
                )),
                rfc5912::SECP_384_R_1 => Ok(PublicKey::EcdsaP384(
                    p384::ecdsa::VerifyingKey::from_public_key_der(der)?,
                )),
                curve => Err(SignError::KeyLoad(format!(
                    "unsupported elliptic curve {curve}"
                ))),
            },
            rfc8410::ID_ED_25519 => Ok(PublicKey::Ed25519(
                ed25519_dalek::VerifyingKey::from_public_key_der(der)?,
            )),
            rfc5912::ID_DSA => Ok(PublicKey::Dsa(dsa::VerifyingKey::from_public_key_der(der)?)),
            other => Err(SignError::KeyLoad(format!(
                "unsupported public key algorithm {other}"
            ))),
        }
    }

    /// Converts an X.509 subject public key info into a `PublicKey`.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let der = der::Encode::to_der(spki).map_err(encoding)?;
        Self::from_spki_der(&der)
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            PublicKey::Rsa(_) => KeyFamily::Rsa,
            PublicKey::EcdsaP256(_) | PublicKey::EcdsaP384(_) | PublicKey::Ed25519(_) => {
                KeyFamily::Ec
            }
            PublicKey::Dsa(_) => KeyFamily::Dsa,
        }
    }

    /// DER `SubjectPublicKeyInfo` of the key.
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            PublicKey::Rsa(key) => key.to_public_key_der(),
            PublicKey::EcdsaP256(key) => key.to_public_key_der(),
            PublicKey::EcdsaP384(key) => key.to_public_key_der(),
            PublicKey::Ed25519(key) => key.to_public_key_der(),
            PublicKey::Dsa(key) => key.to_public_key_der(),
        };
        Ok(document.map_err(encoding)?.as_bytes().to_vec())
    }

    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let der = self.to_spki_der()?;
        SubjectPublicKeyInfoOwned::from_der(&der).map_err(encoding)
    }

    /// SHA-1 over the subject public key bits, as used for key identifiers.
    pub fn key_identifier(&self) -> Result<Vec<u8>> {
        let spki = self.to_spki()?;
        Ok(Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec())
    }

    /// Serializes the public key.
    pub fn export(&self, format: KeyFormat) -> Result<String> {
        match format {
            KeyFormat::Pkcs8 => Ok(pem_utils::der_to_pem(&self.to_spki_der()?, "PUBLIC KEY")),
            KeyFormat::Pkcs1 => match self {
                PublicKey::Rsa(key) => {
                    let document = key.to_pkcs1_der().map_err(encoding)?;
                    Ok(pem_utils::der_to_pem(document.as_bytes(), "RSA PUBLIC KEY"))
                }
                _ => Err(SignError::UnsupportedFormat(
                    "PKCS1 is only defined for RSA keys".to_string(),
                )),
            },
            KeyFormat::OpenSsh => format::to_openssh(self),
            KeyFormat::Xml => format::to_xml(self),
        }
    }

    /// Verifies a signature produced by [`KeyPair::sign`].
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let outcome = match self {
            PublicKey::Rsa(key) => rsa::pkcs1v15::Signature::try_from(signature).and_then(|sig| {
                rsa::pkcs1v15::VerifyingKey::<Sha256>::new(key.clone()).verify(message, &sig)
            }),
            PublicKey::EcdsaP256(key) => p256::ecdsa::Signature::from_der(signature)
                .and_then(|sig| key.verify(message, &sig)),
            PublicKey::EcdsaP384(key) => p384::ecdsa::Signature::from_der(signature)
                .and_then(|sig| key.verify(message, &sig)),
            PublicKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .and_then(|sig| key.verify(message, &sig)),
            PublicKey::Dsa(key) => {
                dsa::Signature::try_from(signature).and_then(|sig| key.verify(message, &sig))
            }
        };
        outcome.map_err(|e| SignError::Verification(e.to_string()))
    }
}

fn key_load(err: impl fmt::Display) -> SignError {
    SignError::KeyLoad(err.to_string())
}

fn encoding(err: impl fmt::Display) -> SignError {
    SignError::EncodingError(err.to_string())
}

fn signing(err: impl fmt::Display) -> SignError {
    SignError::CertificateSigning(format!("signing failed: {err}"))
}

fn public_given_as_private() -> SignError {
    SignError::KeyLoad("expected a PrivateKey but the material is a PublicKey".to_string())
}

fn private_given_as_public() -> SignError {
    SignError::KeyLoad("expected a PublicKey but the material is a PrivateKey".to_string())
}
