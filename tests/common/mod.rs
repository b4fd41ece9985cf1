//! Shared test support: authoring synthetic OPVault directories.
//!
//! The library only reads vaults, so the integration suite carries its own
//! sealing side built from the same primitive crates. A [`VaultBuilder`]
//! produces a complete on-disk vault in a temporary directory: a
//! `profile.js` unlockable with [`MASTER_PASSWORD`], a `folders.js`, and
//! band files with fully sealed entries.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use aes::Aes256;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::{Digest, Sha256, Sha512};
use tempfile::TempDir;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Password every built vault unlocks with.
pub const MASTER_PASSWORD: &str = "freddy";

/// Low iteration count to keep the suite fast.
pub const ITERATIONS: u32 = 64;

pub const SALT: [u8; 16] = [0x51; 16];

/// A 32-byte key pair as raw halves, test-side counterpart of the
/// library's `KeyPair`.
pub type RawPair = ([u8; 32], [u8; 32]);

pub fn encrypt_cbc(key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    assert_eq!(plaintext.len() % 16, 0, "plaintext must be block aligned");
    let mut buf = plaintext.to_vec();
    let len = buf.len();
    Aes256CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .unwrap();
    buf
}

pub fn hmac_sha256(key: &[u8; 32], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).unwrap();
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Splits a 64-byte secret into `(enc, mac)` halves.
pub fn split(secret: &[u8; 64]) -> RawPair {
    let mut enc = [0u8; 32];
    let mut mac = [0u8; 32];
    enc.copy_from_slice(&secret[..32]);
    mac.copy_from_slice(&secret[32..]);
    (enc, mac)
}

/// SHA-512 of the material, split; how profile key material becomes keys.
pub fn sha512_split(material: &[u8]) -> RawPair {
    let digest: [u8; 64] = Sha512::digest(material).into();
    split(&digest)
}

/// PBKDF2-HMAC-SHA-512 over the NUL-terminated password.
pub fn derive_raw(password: &str, salt: &[u8], iterations: u32) -> [u8; 64] {
    let mut input = password.as_bytes().to_vec();
    input.push(0);

    let mut output = [0u8; 64];
    pbkdf2_hmac::<Sha512>(&input, salt, iterations, &mut output);
    output
}

/// Seals `content` into an `opdata01` blob under `pair`.
pub fn seal_opdata(content: &[u8], pair: &RawPair) -> Vec<u8> {
    let padding = match content.len() % 16 {
        0 => 16,
        rem => 16 - rem,
    };

    let mut plaintext = vec![0xA5u8; padding];
    plaintext.extend_from_slice(content);

    let iv = [0x1Cu8; 16];
    let ciphertext = encrypt_cbc(&pair.0, &iv, &plaintext);

    let mut blob = Vec::with_capacity(64 + ciphertext.len());
    blob.extend_from_slice(b"opdata01");
    blob.extend_from_slice(&(content.len() as u64).to_le_bytes());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    let tag = hmac_sha256(&pair.1, &blob);
    blob.extend_from_slice(&tag);
    blob
}

/// Seals a 64-byte item key into a raw `IV | ciphertext | HMAC` blob.
pub fn seal_itemkey(secret: &[u8; 64], pair: &RawPair) -> Vec<u8> {
    let iv = [0x9Du8; 16];
    let ciphertext = encrypt_cbc(&pair.0, &iv, secret);

    let mut blob = Vec::with_capacity(48 + ciphertext.len());
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    let tag = hmac_sha256(&pair.1, &blob);
    blob.extend_from_slice(&tag);
    blob
}

/// A synthetic vault on disk.
pub struct TestVault {
    dir: TempDir,
    pub master: RawPair,
    pub overview: RawPair,
}

impl TestVault {
    /// The vault root (the directory containing `default/`).
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn profile_path(&self) -> std::path::PathBuf {
        self.root().join("default").join("profile.js")
    }
}

/// Builds complete synthetic vault directories.
pub struct VaultBuilder {
    master_material: [u8; 64],
    overview_material: [u8; 64],
    folders: Vec<String>,
    bands: BTreeMap<char, Vec<String>>,
}

impl VaultBuilder {
    pub fn new() -> Self {
        let mut master_material = [0xD1u8; 64];
        master_material[0] = 0x01;
        let mut overview_material = [0xD2u8; 64];
        overview_material[0] = 0x02;

        VaultBuilder {
            master_material,
            overview_material,
            folders: Vec::new(),
            bands: BTreeMap::new(),
        }
    }

    pub fn master_pair(&self) -> RawPair {
        sha512_split(&self.master_material)
    }

    pub fn overview_pair(&self) -> RawPair {
        sha512_split(&self.overview_material)
    }

    /// The deterministic item key used for the entry with this UUID.
    pub fn item_secret(uuid: &str) -> [u8; 64] {
        Sha512::digest(uuid.as_bytes()).into()
    }

    pub fn add_folder(&mut self, uuid: &str, title: &str, smart: bool) -> &mut Self {
        let overview = format!("{{\"title\":{}}}", json_string(title));
        let sealed = BASE64.encode(seal_opdata(overview.as_bytes(), &self.overview_pair()));

        let smart_part = if smart { ",\"smart\":true" } else { "" };
        self.folders.push(format!(
            "\"{uuid}\":{{\"created\":1,\"overview\":\"{sealed}\",\"tx\":3,\
             \"updated\":2,\"uuid\":\"{uuid}\"{smart_part}}}"
        ));
        self
    }

    /// Adds a fully sealed entry. `extra` is spliced into the outer JSON
    /// object verbatim (e.g. `,"trashed":true`).
    pub fn add_entry(
        &mut self,
        uuid: &str,
        category: &str,
        overview: &str,
        details: &str,
        extra: &str,
    ) -> &mut Self {
        let item_secret = Self::item_secret(uuid);
        let item_pair = split(&item_secret);

        let k = BASE64.encode(seal_itemkey(&item_secret, &self.master_pair()));
        let d = BASE64.encode(seal_opdata(details.as_bytes(), &item_pair));
        let o = BASE64.encode(seal_opdata(overview.as_bytes(), &self.overview_pair()));

        let rendered = format!(
            "\"{uuid}\":{{\"category\":\"{category}\",\"created\":1,\
             \"d\":\"{d}\",\"k\":\"{k}\",\"o\":\"{o}\",\"tx\":3,\
             \"updated\":2,\"uuid\":\"{uuid}\"{extra}}}"
        );
        self.add_rendered_entry(band_of(uuid), rendered)
    }

    /// Adds a login entry; `password` of `None` leaves the designated
    /// password field out entirely.
    pub fn add_login(&mut self, uuid: &str, url: &str, password: Option<&str>) -> &mut Self {
        let overview = format!(
            "{{\"title\":\"Login\",\"url\":{}}}",
            json_string(url)
        );
        let details = match password {
            Some(password) => format!(
                "{{\"fields\":[{{\"designation\":\"password\",\"name\":\"password\",\
                 \"type\":\"P\",\"value\":{}}}]}}",
                json_string(password)
            ),
            None => "{\"fields\":[]}".to_string(),
        };
        self.add_entry(uuid, "001", &overview, &details, "")
    }

    /// Escape hatch for malformed-entry tests: the rendered fragment must
    /// be a `"uuid":{...}` JSON object member.
    pub fn add_rendered_entry(&mut self, band: char, rendered: String) -> &mut Self {
        self.bands.entry(band).or_default().push(rendered);
        self
    }

    /// Writes the vault to a temporary directory.
    pub fn build(&self) -> TestVault {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("default");
        fs::create_dir(&default).unwrap();

        let derived = split(&derive_raw(MASTER_PASSWORD, &SALT, ITERATIONS));
        let master_key = BASE64.encode(seal_opdata(&self.master_material, &derived));
        let overview_key = BASE64.encode(seal_opdata(&self.overview_material, &derived));

        let profile = format!(
            "var profile={{\"createdAt\":1386066169,\"iterations\":{ITERATIONS},\
             \"lastUpdatedBy\":\"Dropbox\",\"masterKey\":\"{master_key}\",\
             \"overviewKey\":\"{overview_key}\",\"profileName\":\"default\",\
             \"salt\":\"{}\",\"updatedAt\":1386085332,\
             \"uuid\":\"2B894A18997C4638BACC55F2D56A4890\"}};",
            BASE64.encode(SALT)
        );
        fs::write(default.join("profile.js"), profile).unwrap();

        let folders = format!("loadFolders({{{}}});", self.folders.join(","));
        fs::write(default.join("folders.js"), folders).unwrap();

        for (band, entries) in &self.bands {
            let body = format!("ld({{{}}});", entries.join(","));
            fs::write(default.join(format!("band_{band}.js")), body).unwrap();
        }

        TestVault {
            dir,
            master: self.master_pair(),
            overview: self.overview_pair(),
        }
    }
}

/// The band shard an entry lands in: the first character of its UUID.
pub fn band_of(uuid: &str) -> char {
    uuid.chars().next().unwrap().to_ascii_uppercase()
}

/// Minimal JSON string quoting for test fixtures.
pub fn json_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
