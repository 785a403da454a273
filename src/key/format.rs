//! Textual public key encodings beyond PEM: OpenSSH one-liners and XML key values.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

use super::PublicKey;
use crate::error::{Result, SignError};

/// Serializations a key can be exported in. Names are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFormat {
    #[default]
    Pkcs8,
    Pkcs1,
    OpenSsh,
    Xml,
}

impl FromStr for KeyFormat {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PKCS8" => Ok(Self::Pkcs8),
            "PKCS1" => Ok(Self::Pkcs1),
            "OPENSSH" => Ok(Self::OpenSsh),
            "XML" => Ok(Self::Xml),
            _ => Err(SignError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pkcs8 => "PKCS8",
            Self::Pkcs1 => "PKCS1",
            Self::OpenSsh => "OpenSSH",
            Self::Xml => "XML",
        })
    }
}

const SSH_RSA: &str = "ssh-rsa";
const SSH_DSS: &str = "ssh-dss";
const SSH_ED25519: &str = "ssh-ed25519";
const SSH_NISTP256: &str = "ecdsa-sha2-nistp256";
const SSH_NISTP384: &str = "ecdsa-sha2-nistp384";

const SSH_ALGORITHMS: [&str; 5] = [SSH_RSA, SSH_DSS, SSH_ED25519, SSH_NISTP256, SSH_NISTP384];

/// RFC 4251 wire encoding.
#[derive(Default)]
struct SshWriter(Vec<u8>);

impl SshWriter {
    fn string(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.0.extend_from_slice(bytes);
        self
    }

    fn mpint(&mut self, value: &BigUint) -> &mut Self {
        let mut bytes = value.to_bytes_be();
        if bytes.iter().all(|b| *b == 0) {
            bytes.clear();
        } else if bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0);
        }
        self.string(&bytes)
    }
}

struct SshReader<'a>(&'a [u8]);

impl<'a> SshReader<'a> {
    fn string(&mut self) -> Result<&'a [u8]> {
        let Some((len, rest)) = self.0.split_first_chunk::<4>() else {
            return Err(malformed("truncated length"));
        };
        let len = u32::from_be_bytes(*len) as usize;
        if rest.len() < len {
            return Err(malformed("truncated field"));
        }
        let (value, rest) = rest.split_at(len);
        self.0 = rest;
        Ok(value)
    }

    fn mpint(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.string()?))
    }
}

fn malformed(what: &str) -> SignError {
    SignError::KeyLoad(format!("malformed OpenSSH PublicKey: {what}"))
}

/// Whether `input` looks like an OpenSSH public key line.
pub(crate) fn is_openssh_line(input: &[u8]) -> bool {
    std::str::from_utf8(input)
        .ok()
        .and_then(|text| text.split_whitespace().next())
        .is_some_and(|algorithm| SSH_ALGORITHMS.contains(&algorithm))
}

pub(crate) fn to_openssh(key: &PublicKey) -> Result<String> {
    let mut writer = SshWriter::default();
    let algorithm = match key {
        PublicKey::Rsa(key) => {
            writer.string(SSH_RSA.as_bytes()).mpint(key.e()).mpint(key.n());
            SSH_RSA
        }
        PublicKey::EcdsaP256(key) => {
            writer
                .string(SSH_NISTP256.as_bytes())
                .string(b"nistp256")
                .string(key.to_encoded_point(false).as_bytes());
            SSH_NISTP256
        }
        PublicKey::EcdsaP384(key) => {
            writer
                .string(SSH_NISTP384.as_bytes())
                .string(b"nistp384")
                .string(key.to_encoded_point(false).as_bytes());
            SSH_NISTP384
        }
        PublicKey::Ed25519(key) => {
            writer.string(SSH_ED25519.as_bytes()).string(key.as_bytes());
            SSH_ED25519
        }
        PublicKey::Dsa(key) => {
            let components = key.components();
            writer
                .string(SSH_DSS.as_bytes())
                .mpint(components.p())
                .mpint(components.q())
                .mpint(components.g())
                .mpint(key.y());
            SSH_DSS
        }
    };
    Ok(format!("{algorithm} {}", STANDARD.encode(&writer.0)))
}

/// Parses an OpenSSH public key line. Returns `Ok(None)` when `input` is not one.
pub(crate) fn from_openssh(input: &[u8]) -> Result<Option<PublicKey>> {
    if !is_openssh_line(input) {
        return Ok(None);
    }
    let text = std::str::from_utf8(input).map_err(|e| malformed(&e.to_string()))?;
    let mut fields = text.split_whitespace();
    let algorithm = fields.next().unwrap_or_default();
    let blob = fields
        .next()
        .ok_or_else(|| malformed("missing key data"))?;
    let blob = STANDARD
        .decode(blob)
        .map_err(|e| malformed(&e.to_string()))?;

    let mut reader = SshReader(&blob);
    if reader.string()? != algorithm.as_bytes() {
        return Err(malformed("algorithm name mismatch"));
    }

    let key = match algorithm {
        SSH_RSA => {
            let e = reader.mpint()?;
            let n = reader.mpint()?;
            PublicKey::Rsa(RsaPublicKey::new(n, e)?)
        }
        SSH_NISTP256 => {
            reader.string()?;
            let point = reader.string()?;
            PublicKey::EcdsaP256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| malformed(&e.to_string()))?,
            )
        }
        SSH_NISTP384 => {
            reader.string()?;
            let point = reader.string()?;
            PublicKey::EcdsaP384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                    .map_err(|e| malformed(&e.to_string()))?,
            )
        }
        SSH_ED25519 => {
            let bytes: &[u8; 32] = reader
                .string()?
                .try_into()
                .map_err(|_| malformed("Ed25519 keys are 32 bytes"))?;
            PublicKey::Ed25519(
                ed25519_dalek::VerifyingKey::from_bytes(bytes)
                    .map_err(|e| malformed(&e.to_string()))?,
            )
        }
        _ => {
            let (p, q, g, y) = (reader.mpint()?, reader.mpint()?, reader.mpint()?, reader.mpint()?);
            let components = dsa::Components::from_components(p, q, g)
                .map_err(|_| malformed("invalid DSA parameters"))?;
            PublicKey::Dsa(
                dsa::VerifyingKey::from_components(components, y)
                    .map_err(|_| malformed("invalid DSA public value"))?,
            )
        }
    };
    Ok(Some(key))
}

/// XML key value as used by .NET (`RSAKeyValue` / `DSAKeyValue`).
pub(crate) fn to_xml(key: &PublicKey) -> Result<String> {
    let b64 = |n: &BigUint| STANDARD.encode(n.to_bytes_be());
    match key {
        PublicKey::Rsa(key) => Ok(format!(
            "<RSAKeyValue>\n  <Modulus>{}</Modulus>\n  <Exponent>{}</Exponent>\n</RSAKeyValue>",
            b64(key.n()),
            b64(key.e())
        )),
        PublicKey::Dsa(key) => {
            let components = key.components();
            Ok(format!(
                "<DSAKeyValue>\n  <P>{}</P>\n  <Q>{}</Q>\n  <G>{}</G>\n  <Y>{}</Y>\n</DSAKeyValue>",
                b64(components.p()),
                b64(components.q()),
                b64(components.g()),
                b64(key.y())
            ))
        }
        _ => Err(SignError::UnsupportedFormat(
            "XML is only defined for RSA and DSA keys".to_string(),
        )),
    }
}
