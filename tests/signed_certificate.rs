mod util;

use serde_json::{Value, json};
use x509sign::cert::Certificate;
use x509sign::config::ServerConfig;
use x509sign::error::SignError;
use x509sign::handler::{RequestHandler, SignedCertificateHandler};
use x509sign::key::{KeyFormat, KeyPair};

fn user_key() -> KeyPair {
    KeyPair::generate_ed25519()
}

fn config() -> ServerConfig {
    ServerConfig::builder()
        .extensions(util::SUPER_EXTENSION)
        .build()
}

fn handle(server_key: &KeyPair, config: &ServerConfig, input: Value) -> Result<Value, SignError> {
    SignedCertificateHandler.handle(server_key, config, input.as_object().unwrap())
}

#[test]
fn test_handle_resigns_certificate() {
    util::init_logging();
    let server_key = util::fixture_key("p256.pem");
    let user = user_key();
    let application = util::Application::new();
    let certificate = application
        .generate_certificate(&server_key.public_key(), "Alan")
        .to_pem()
        .unwrap();

    let result = handle(
        &server_key,
        &config(),
        json!({
            "certificate": certificate,
            "clientPublicKey": user.public_key().export(KeyFormat::Pkcs8).unwrap(),
        }),
    )
    .unwrap();
    let result = result.as_str().unwrap();
    assert_ne!(result, certificate);

    let resigned = Certificate::from_pem(result).unwrap();
    resigned.verify(&server_key.public_key()).unwrap();
    assert_eq!(util::hours_until(resigned.not_after().unwrap()), 24);
    assert_eq!(resigned.issuer(), util::dn(&util::APPLICATION_ISSUER_DN));
    assert_eq!(resigned.subject(), util::dn(&[("commonName", "Alan")]));
    assert_eq!(resigned.serial_number(), "42");
    assert_eq!(resigned.public_key().unwrap(), user.public_key());
}

#[test]
fn test_handle_keeps_registered_extension_value() {
    let server_key = util::fixture_key("p256.pem");
    let mut application = util::Application::new();
    application.level = 12;
    let certificate = application.generate_certificate(&server_key.public_key(), "Alan");

    let result = handle(
        &server_key,
        &config(),
        json!({
            "certificate": certificate.to_pem().unwrap(),
            "clientPublicKey": user_key().public_key().export(KeyFormat::Pkcs8).unwrap(),
        }),
    )
    .unwrap();

    let resigned = Certificate::from_pem(result.as_str().unwrap()).unwrap();
    let value = resigned
        .extension_value(application.issuer.registry(), "super")
        .unwrap()
        .unwrap();
    assert_eq!(value, json!({"cool": true, "level": 12, "name": "Alan"}));
}

#[test]
fn test_handle_incorrect_certificate() {
    let server_key = util::fixture_key("p256.pem");
    let err = handle(
        &server_key,
        &ServerConfig::default(),
        json!({
            "certificate": "foobar",
            "clientPublicKey": user_key().public_key().export(KeyFormat::Pkcs8).unwrap(),
        }),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Unable to sign the CSR.");
}

#[test]
fn test_handle_certificate_data() {
    let server_key = util::rsa_key();
    let user = user_key();

    let result = handle(
        &server_key,
        &config(),
        json!({
            "clientPublicKey": user.public_key().export(KeyFormat::Pkcs8).unwrap(),
            "certificateData": {
                "serialNumber": 9256,
                "issuerDN": {"commonName": "Signature Server", "organizationName": "Proton"},
                "subjectDN": {"commonName": "Bob"},
                "notBefore": "-1 day",
                "notAfter": "+5 days",
                "extensions": {
                    "super": {"cool": false, "level": 1, "name": "Bob"},
                    "unknown-extension": "ignored"
                }
            },
            "extensions": {
                "super": {"value": {"cool": true, "level": 2, "name": "Bob"}, "critical": true}
            }
        }),
    )
    .unwrap();

    let issued = Certificate::from_pem(result.as_str().unwrap()).unwrap();
    issued.verify(&server_key.public_key()).unwrap();
    assert_eq!(
        issued.issuer(),
        util::dn(&[("commonName", "Signature Server"), ("organizationName", "Proton")])
    );
    assert_eq!(issued.subject().get("CN"), Some("Bob".to_string()));
    assert_eq!(issued.serial_number(), "9256");
    assert_eq!(util::hours_until(issued.not_after().unwrap()), 120);

    let application = util::Application::new();
    let registry = application.issuer.registry();
    let oid = registry.oid("super").unwrap();
    assert!(issued.extension(&oid).unwrap().critical);
    assert_eq!(
        issued.extension_value(registry, "super").unwrap(),
        Some(json!({"cool": true, "level": 2, "name": "Bob"}))
    );
}

#[test]
fn test_handle_requires_one_certificate_source() {
    let server_key = util::fixture_key("p256.pem");
    let client = user_key().public_key().export(KeyFormat::Pkcs8).unwrap();

    let err = handle(&server_key, &config(), json!({"clientPublicKey": client})).unwrap_err();
    assert!(matches!(err, SignError::InvalidInput(_)), "{err}");

    let err = handle(&server_key, &config(), json!({"certificate": "foobar"})).unwrap_err();
    assert!(matches!(err, SignError::InvalidInput(_)), "{err}");
}

#[test]
fn test_handle_accepts_each_client_key_family() {
    let server_key = util::fixture_key("dsa.pem");
    let application = util::Application::new();
    let certificate = application
        .generate_certificate(&server_key.public_key(), "Alan")
        .to_pem()
        .unwrap();

    for (client, mode) in [
        (util::fixture_key("dsa.pem"), "DSA"),
        (util::rsa_key(), "RSA"),
        (util::fixture_key("p256.pem"), "EC"),
    ] {
        let client = client.public_key();
        let result = handle(
            &server_key,
            &config(),
            json!({
                "mode": mode,
                "certificate": certificate,
                "clientPublicKey": client.export(KeyFormat::Pkcs8).unwrap(),
            }),
        )
        .unwrap();

        let resigned = Certificate::from_pem(result.as_str().unwrap()).unwrap();
        resigned.verify(&server_key.public_key()).unwrap();
        assert_eq!(resigned.public_key().unwrap(), client);
        assert_eq!(resigned.subject(), util::dn(&[("commonName", "Alan")]));
    }
}

#[test]
fn test_handle_rejects_out_of_range_validity() {
    let server_key = util::fixture_key("p256.pem");
    let client = user_key().public_key().export(KeyFormat::Pkcs8).unwrap();
    for not_after in ["+100000000 days", "+9223372036854775807 weeks", "next tuesday"] {
        let err = handle(
            &server_key,
            &config(),
            json!({
                "clientPublicKey": client,
                "certificateData": {
                    "issuerDN": {"CN": "a"},
                    "subjectDN": {"CN": "b"},
                    "notAfter": not_after
                }
            }),
        )
        .unwrap_err();
        assert!(
            matches!(err, SignError::InvalidInput(_) | SignError::CertificateSigning(_)),
            "{not_after}: {err}"
        );
    }
}

#[test]
fn test_handle_rejects_client_key_of_another_family() {
    let server_key = util::fixture_key("p256.pem");
    let client = util::rsa_key().public_key().export(KeyFormat::Pkcs8).unwrap();
    let err = handle(
        &server_key,
        &config(),
        json!({
            "mode": "EC",
            "clientPublicKey": client,
            "certificateData": {"issuerDN": {"CN": "a"}, "subjectDN": {"CN": "b"}}
        }),
    )
    .unwrap_err();
    assert!(matches!(err, SignError::KeyLoad(_)), "{err}");
}
