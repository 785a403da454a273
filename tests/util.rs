#![allow(dead_code)]

use time::OffsetDateTime;
use x509sign::cert::Certificate;
use x509sign::cert::params::{DistinguishedName, Validity};
use x509sign::key::{KeyFamily, KeyPair};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reads a key from `tests/fixtures`.
pub fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

pub fn fixture_key(name: &str) -> KeyPair {
    KeyPair::decode(&fixture(name), None).unwrap()
}

pub fn rsa_key() -> KeyPair {
    KeyPair::load(KeyFamily::Rsa, &fixture("rsa.pem"), None).unwrap()
}

pub fn dn(attributes: &[(&str, &str)]) -> DistinguishedName {
    DistinguishedName::from_attributes(attributes.iter().copied()).unwrap()
}

pub fn generate_ca_cert() -> (Certificate, KeyPair) {
    let ca_key = KeyPair::generate_ecdsa_p256();
    let subject = dn(&[("commonName", "myca.local")]);
    let cert = Certificate::new_self_signed(&ca_key, &subject, &Validity::for_days(30)).unwrap();
    (cert, ca_key)
}

/// Whole hours from now until `at`.
pub fn hours_until(at: OffsetDateTime) -> i64 {
    ((at - OffsetDateTime::now_utc()).as_seconds_f64() / 3600.0).round() as i64
}

pub const SUPER_EXTENSION: &str = r#"[["super", "2.16.840.1.101.3.4.2.99", {
    "type": 16,
    "children": {
        "cool": {"type": 1},
        "level": {"type": 2},
        "name": {"type": 4}
    }
}]]"#;

pub const APPLICATION_ISSUER_DN: [(&str, &str); 7] = [
    ("countryName", "US"),
    ("stateOrProvinceName", "NY"),
    ("localityName", "New York"),
    ("organizationName", "Any Organization"),
    ("organizationalUnitName", "Some Department"),
    ("commonName", "Dream Team"),
    ("emailAddress", "dreamteam@any.org"),
];

/// A client application holding its own signing key, which asks the
/// signature server to re-sign the certificates it produces.
pub struct Application {
    pub key: KeyPair,
    pub issuer: x509sign::issuer::Issuer,
    pub level: i64,
}

impl Application {
    pub fn new() -> Self {
        let mut issuer = x509sign::issuer::Issuer::default();
        issuer.load_extensions_json(SUPER_EXTENSION).unwrap();
        Self {
            key: rsa_key(),
            issuer,
            level: 73,
        }
    }

    /// A certificate for `user_name` carrying the `super` extension, issued
    /// for `subject_key` and signed by the application key.
    pub fn generate_certificate(
        &self,
        subject_key: &x509sign::key::PublicKey,
        user_name: &str,
    ) -> Certificate {
        let params = x509sign::cert::params::CertificateParams::builder()
            .issuer(dn(&APPLICATION_ISSUER_DN))
            .subject(dn(&[("commonName", user_name)]))
            .serial_number("42")
            .not_before("-1 second".parse().unwrap())
            .not_after("1 day".parse().unwrap())
            .extensions(vec![x509sign::cert::params::ExtensionRequest::json(
                "super",
                serde_json::json!({"cool": true, "level": self.level, "name": user_name}),
            )])
            .build();
        self.issuer
            .issue(&self.key, subject_key, &params)
            .unwrap()
    }
}
