use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use x509sign::cert::Certificate;
use x509sign::cert::params::{DistinguishedName, Validity};
use x509sign::config::{self, Settings};
use x509sign::key::{KeyFamily, KeyFormat, KeyPair};
use x509sign::server::Server;

const DEFAULT_CA_DN: [(&str, &str); 7] = [
    ("countryName", "CH"),
    ("stateOrProvinceName", "GE"),
    ("localityName", "Geneva"),
    ("organizationName", "ProtonVPN"),
    ("organizationalUnitName", "ProtonVPN Certificate Authority"),
    ("commonName", "ProtonVPN"),
    ("emailAddress", "proton@protonvpn.com"),
];

#[derive(Parser)]
#[clap(name = "x509sign", about = "Re-signs X.509 certificates for client public keys")]
struct Cli {
    /// Directory holding env.json and the CA bundle.
    #[clap(long, global = true, default_value = config::DEFAULT_STORAGE_DIR)]
    storage: PathBuf,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handles one batch request body and writes the JSON response to stdout.
    Handle {
        /// Read the request from this file instead of stdin.
        #[clap(long)]
        input: Option<PathBuf>,
    },
    /// Prints the server public key.
    PublicKey {
        #[clap(long, default_value = "PKCS8")]
        format: String,
    },
    /// Writes env.json and a self-signed CA certificate into the storage directory.
    Init {
        /// Key family: RSA, EC or DSA.
        #[clap(long, default_value = "EC")]
        mode: String,
        /// Private key file to load; a new key is generated when omitted.
        #[clap(long)]
        key: Option<PathBuf>,
        #[clap(long, env = config::SIGNATURE_PRIVATE_KEY_PASSPHRASE)]
        passphrase: Option<String>,
        /// Extension definitions as `[[identifier, oid, schema], ...]`.
        #[clap(long)]
        extensions: Option<String>,
        /// CA subject attributes as `attribute=value`, overriding the defaults.
        #[clap(long = "dn", value_parser = parse_dn_attribute)]
        dn: Vec<(String, String)>,
        /// Validity of the CA certificate in days.
        #[clap(long, default_value_t = 365, value_parser = clap::value_parser!(i64).range(1..=36_500))]
        days: i64,
    },
}

fn parse_dn_attribute(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(attribute, value)| (attribute.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected attribute=value, got {raw:?}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Handle { input } => {
            let server = Server::from_env(&cli.storage)?;
            let mut body = String::new();
            match input {
                Some(path) => {
                    body = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                }
                None => {
                    std::io::stdin().read_to_string(&mut body)?;
                }
            }
            let mut stdout = std::io::stdout().lock();
            server.handle_body(&body, &mut stdout)?;
            writeln!(stdout)?;
        }
        Commands::PublicKey { format } => {
            let server = Server::from_env(&cli.storage)?;
            let mut requests = Map::new();
            requests.insert("publicKey".to_string(), serde_json::json!({ "format": format }));
            let mut response = Vec::new();
            server.handle_requests(&requests, &mut response)?;

            let response: Value = serde_json::from_slice(&response)?;
            match response["publicKey"]["result"].as_str() {
                Some(key) => println!("{key}"),
                None => bail!(
                    "{}",
                    response["publicKey"]["error"].as_str().unwrap_or("unknown error")
                ),
            }
        }
        Commands::Init {
            mode,
            key,
            passphrase,
            extensions,
            dn,
            days,
        } => init(&cli.storage, &mode, key, passphrase, extensions, dn, days)?,
    }
    Ok(())
}

fn init(
    storage: &std::path::Path,
    mode: &str,
    key_file: Option<PathBuf>,
    passphrase: Option<String>,
    extensions: Option<String>,
    dn: Vec<(String, String)>,
    days: i64,
) -> anyhow::Result<()> {
    let family: KeyFamily = mode.parse()?;
    let private_key = match &key_file {
        Some(path) => {
            let material =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            KeyPair::load(family, &material, passphrase.as_deref())?
        }
        None => match family {
            KeyFamily::Ec => KeyPair::generate_ed25519(),
            other => KeyPair::generate(other)?,
        },
    };
    if let Some(definitions) = &extensions {
        x509sign::registry::definitions_from_json(definitions)?;
    }

    let mut settings = Settings::default();
    settings.set(
        config::SIGNATURE_PRIVATE_KEY,
        private_key.export(KeyFormat::Pkcs8, passphrase.as_deref())?,
    );
    settings.set(config::SIGNATURE_PRIVATE_KEY_MODE, family.as_str());
    settings.set(
        config::SIGNATURE_PRIVATE_KEY_PASSPHRASE,
        passphrase.unwrap_or_default(),
    );
    settings.set(config::EXTENSIONS, extensions.unwrap_or_default());
    let ca_path = storage.join("ca.pem");
    settings.set(config::CA_FILE, ca_path.display().to_string());
    settings.write_cache(storage)?;

    let mut attributes: Vec<(String, String)> = DEFAULT_CA_DN
        .iter()
        .map(|(attribute, value)| (attribute.to_string(), value.to_string()))
        .collect();
    for (attribute, value) in dn {
        match attributes.iter_mut().find(|(known, _)| *known == attribute) {
            Some(slot) => slot.1 = value,
            None => attributes.push((attribute, value)),
        }
    }
    let subject = DistinguishedName::from_attributes(attributes)?;

    let ca = Certificate::new_self_signed(&private_key, &subject, &Validity::for_days(days))?;
    std::fs::write(&ca_path, ca.to_pem()?)
        .with_context(|| format!("writing {}", ca_path.display()))?;
    log::info!("wrote CA certificate {}", ca_path.display());

    print!("{}", private_key.public_key().export(KeyFormat::Pkcs8)?);
    Ok(())
}
