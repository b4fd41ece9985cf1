//! Vault entries and their decryption ladder.
//!
//! A band entry carries three encrypted payloads: `k`, the entry's item key
//! sealed under the profile's master pair; `o`, the overview (title, URLs,
//! tags) sealed under the overview pair; and `d`, the details (fields,
//! sections, notes) sealed under the item key itself. All three are
//! authenticated independently, so the outer `hmac` value is stored but not
//! re-verified.

use std::collections::BTreeMap;

use serde_json::Value;
use zeroize::Zeroizing;

use crate::crypto::KeyPair;
use crate::error::{Error, Result};
use crate::format::{self, itemkey, opdata, uuid::Uuid};
use crate::profile::Profile;

/// Entry category, a closed enumeration of the format's 3-digit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `001`
    Login,
    /// `002`
    CreditCard,
    /// `003`
    SecureNote,
    /// `004`
    Identity,
    /// `005`
    Password,
    /// `099` - a deleted entry's remaining stub
    Tombstone,
    /// `100`
    SoftwareLicense,
    /// `101`
    BankAccount,
    /// `102`
    Database,
    /// `103`
    DriverLicense,
    /// `104`
    OutdoorLicense,
    /// `105`
    Membership,
    /// `106`
    Passport,
    /// `107`
    Rewards,
    /// `108`
    SocialSecurityNumber,
    /// `109`
    Router,
    /// `110`
    Server,
    /// `111`
    Email,
}

impl Category {
    /// Maps a 3-digit category code to its variant.
    pub fn from_code(code: &str) -> Result<Category> {
        match code {
            "001" => Ok(Category::Login),
            "002" => Ok(Category::CreditCard),
            "003" => Ok(Category::SecureNote),
            "004" => Ok(Category::Identity),
            "005" => Ok(Category::Password),
            "099" => Ok(Category::Tombstone),
            "100" => Ok(Category::SoftwareLicense),
            "101" => Ok(Category::BankAccount),
            "102" => Ok(Category::Database),
            "103" => Ok(Category::DriverLicense),
            "104" => Ok(Category::OutdoorLicense),
            "105" => Ok(Category::Membership),
            "106" => Ok(Category::Passport),
            "107" => Ok(Category::Rewards),
            "108" => Ok(Category::SocialSecurityNumber),
            "109" => Ok(Category::Router),
            "110" => Ok(Category::Server),
            "111" => Ok(Category::Email),
            other => Err(Error::format(format!("unknown entry category {other:?}"))),
        }
    }

    /// The 3-digit code for this category.
    pub fn code(&self) -> &'static str {
        match self {
            Category::Login => "001",
            Category::CreditCard => "002",
            Category::SecureNote => "003",
            Category::Identity => "004",
            Category::Password => "005",
            Category::Tombstone => "099",
            Category::SoftwareLicense => "100",
            Category::BankAccount => "101",
            Category::Database => "102",
            Category::DriverLicense => "103",
            Category::OutdoorLicense => "104",
            Category::Membership => "105",
            Category::Passport => "106",
            Category::Rewards => "107",
            Category::SocialSecurityNumber => "108",
            Category::Router => "109",
            Category::Server => "110",
            Category::Email => "111",
        }
    }
}

/// A single form field from an entry's decrypted details.
#[derive(Debug, Clone, Default)]
pub struct Field {
    key: String,
    value: String,
    name: String,
    title: String,
    designation: String,
    kind: String,
    attributes: BTreeMap<String, String>,
}

impl Field {
    fn from_json(json: &Value) -> Result<Field> {
        let object = format::expect_object(json, "field")?;
        let mut field = Field::default();

        for (key, value) in object {
            match key.as_str() {
                "k" => field.key = format::expect_str(value, "field key")?.to_string(),
                "v" | "value" => field.value = json_to_text(value),
                "n" | "name" => field.name = format::expect_str(value, "field name")?.to_string(),
                "t" => field.title = format::expect_str(value, "field title")?.to_string(),
                "a" => {
                    let attrs = format::expect_object(value, "field attributes")?;
                    for (name, attr) in attrs {
                        field
                            .attributes
                            .insert(name.clone(), format::expect_str(attr, "field attribute")?.to_string());
                    }
                }
                "type" => field.kind = format::expect_str(value, "field type")?.to_string(),
                "designation" => {
                    field.designation =
                        format::expect_str(value, "field designation")?.to_string();
                }
                other => return Err(Error::format(format!("unknown key {other:?} in field"))),
            }
        }

        Ok(field)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The field value. String values are unquoted; any other JSON value
    /// keeps its JSON spelling.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The saved-form role of the field, e.g. `username` or `password`.
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// The field's declared type, e.g. `T` for text or `P` for password.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// A named group of fields from an entry's decrypted details.
#[derive(Debug, Clone, Default)]
pub struct Section {
    name: String,
    title: String,
    fields: Vec<Field>,
}

impl Section {
    fn from_json(json: &Value) -> Result<Section> {
        let object = format::expect_object(json, "section")?;
        let mut section = Section::default();

        for (key, value) in object {
            match key.as_str() {
                "name" => section.name = format::expect_str(value, "section name")?.to_string(),
                "title" => section.title = format::expect_str(value, "section title")?.to_string(),
                "fields" => {
                    for item in format::expect_array(value, "section fields")? {
                        section.fields.push(Field::from_json(item)?);
                    }
                }
                other => return Err(Error::format(format!("unknown key {other:?} in section"))),
            }
        }

        Ok(section)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// HTTP method of a captured login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormMethod {
    #[default]
    Get,
    Post,
}

/// Descriptor of the web form an entry was captured from.
#[derive(Debug, Clone, Default)]
pub struct Form {
    action: String,
    name: String,
    id: String,
    method: FormMethod,
}

impl Form {
    fn from_json(json: &Value) -> Result<Form> {
        let object = format::expect_object(json, "form")?;
        let mut form = Form::default();

        for (key, value) in object {
            match key.as_str() {
                "htmlAction" => form.action = format::expect_str(value, "form action")?.to_string(),
                "htmlName" => form.name = format::expect_str(value, "form name")?.to_string(),
                "htmlID" => form.id = format::expect_str(value, "form id")?.to_string(),
                "htmlMethod" => {
                    form.method = match format::expect_str(value, "form method")? {
                        "get" => FormMethod::Get,
                        "post" => FormMethod::Post,
                        other => {
                            return Err(Error::format(format!("unknown form method {other:?}")));
                        }
                    };
                }
                other => return Err(Error::format(format!("unknown key {other:?} in form"))),
            }
        }

        Ok(form)
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> FormMethod {
        self.method
    }
}

/// A previously used password and when it was replaced.
#[derive(Debug, Clone, Default)]
pub struct PasswordHistoryItem {
    value: String,
    time: i64,
}

impl PasswordHistoryItem {
    fn from_json(json: &Value) -> Result<PasswordHistoryItem> {
        let object = format::expect_object(json, "password history item")?;
        let mut item = PasswordHistoryItem::default();

        for (key, value) in object {
            match key.as_str() {
                "value" => {
                    item.value = format::expect_str(value, "password history value")?.to_string();
                }
                "time" => item.time = format::expect_i64(value, "password history time")?,
                other => {
                    return Err(Error::format(format!(
                        "unknown key {other:?} in password history item"
                    )));
                }
            }
        }

        Ok(item)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replacement time, seconds since the epoch.
    pub fn time(&self) -> i64 {
        self.time
    }
}

/// A fully decrypted vault entry.
///
/// Entries are immutable after construction; the [`Vault`](crate::Vault)
/// owns them in file traversal order.
#[derive(Debug)]
pub struct Entry {
    uuid: Uuid,
    folder_uuid: Option<Uuid>,
    category: Category,
    created_at: i64,
    updated_at: i64,
    tx: i64,
    trashed: bool,
    fave: Option<u32>,
    hmac: Option<[u8; 32]>,
    title: String,
    info: String,
    url: String,
    notes: String,
    urls: BTreeMap<String, String>,
    tags: Vec<String>,
    sections: Vec<Section>,
    fields: Vec<Field>,
    form: Option<Form>,
    password_history: Vec<PasswordHistoryItem>,
}

impl Entry {
    pub(crate) fn from_json(uuid: Uuid, json: &Value, profile: &Profile) -> Result<Entry> {
        let object = format::expect_object(json, "entry")?;
        let mut entry = Entry::blank(uuid);

        let mut details_blob: Option<Vec<u8>> = None;
        let mut item_key: Option<KeyPair> = None;

        for (key, value) in object {
            match key.as_str() {
                "category" => {
                    entry.category =
                        Category::from_code(format::expect_str(value, "entry category")?)?;
                }
                "created" => entry.created_at = format::expect_i64(value, "entry creation time")?,
                "updated" => {
                    entry.updated_at = format::expect_i64(value, "entry modification time")?;
                }
                "tx" => entry.tx = format::expect_i64(value, "entry transaction time")?,
                "uuid" => {
                    let inner = Uuid::parse(format::expect_str(value, "entry UUID")?)?;
                    if inner != uuid {
                        return Err(Error::format(
                            "entry internal and external UUIDs do not match",
                        ));
                    }
                }
                "d" => {
                    let encoded = format::expect_str(value, "entry details")?;
                    details_blob = Some(format::decode_base64(encoded, "entry details")?);
                }
                "k" => {
                    let encoded = format::expect_str(value, "entry key")?;
                    let blob = format::decode_base64(encoded, "entry key")?;
                    let material = Zeroizing::new(itemkey::decrypt(&blob, profile.master_key()?)?);
                    let secret: &[u8; 64] = material
                        .as_slice()
                        .try_into()
                        .map_err(|_| Error::format("entry key data is of incorrect size"))?;
                    item_key = Some(KeyPair::from_secret(secret));
                }
                "o" => {
                    let encoded = format::expect_str(value, "entry overview")?;
                    let blob = format::decode_base64(encoded, "entry overview")?;
                    let overview = opdata::decrypt(&blob, profile.overview_key()?)?;
                    let text = String::from_utf8(overview)
                        .map_err(|_| Error::format("entry overview is not valid UTF-8"))?;
                    entry.apply_overview(&text)?;
                }
                "hmac" => {
                    let encoded = format::expect_str(value, "entry HMAC")?;
                    let bytes = format::decode_base64(encoded, "entry HMAC")?;
                    let tag: [u8; 32] = bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| Error::format("entry HMAC is of incorrect size"))?;
                    // Stored for completeness; each encrypted payload
                    // carries its own MAC, so this outer tag is not
                    // re-verified.
                    entry.hmac = Some(tag);
                }
                "trashed" => entry.trashed = format::expect_bool(value, "entry trashed flag")?,
                "folder" => {
                    entry.folder_uuid =
                        Some(Uuid::parse(format::expect_str(value, "entry folder UUID")?)?);
                }
                "fave" => {
                    let ordinal = format::expect_i64(value, "entry fave ordinal")?;
                    entry.fave = Some(u32::try_from(ordinal).map_err(|_| {
                        Error::format("entry fave ordinal does not fit in 32 bits")
                    })?);
                }
                other => return Err(Error::format(format!("unknown key {other:?} in entry"))),
            }
        }

        let details_blob = details_blob.ok_or_else(|| Error::format("entry has no detail data"))?;
        let item_key = item_key.ok_or_else(|| Error::format("entry has no item key"))?;

        let details = opdata::decrypt(&details_blob, &item_key)?;
        let text = String::from_utf8(details)
            .map_err(|_| Error::format("entry details are not valid UTF-8"))?;
        entry.apply_details(&text)?;

        Ok(entry)
    }

    fn blank(uuid: Uuid) -> Entry {
        Entry {
            uuid,
            folder_uuid: None,
            category: Category::Login,
            created_at: 0,
            updated_at: 0,
            tx: 0,
            trashed: false,
            fave: None,
            hmac: None,
            title: String::new(),
            info: String::new(),
            url: String::new(),
            notes: String::new(),
            urls: BTreeMap::new(),
            tags: Vec::new(),
            sections: Vec::new(),
            fields: Vec::new(),
            form: None,
            password_history: Vec::new(),
        }
    }

    fn apply_overview(&mut self, overview: &str) -> Result<()> {
        let json: Value = serde_json::from_str(overview)
            .map_err(|_| Error::format("unable to parse JSON data in entry overview"))?;
        let object = format::expect_object(&json, "entry overview")?;

        for (key, value) in object {
            match key.as_str() {
                "title" => self.title = format::expect_str(value, "entry title")?.to_string(),
                "ps" => {
                    // Semantics unknown; type-checked and discarded.
                    format::expect_i64(value, "entry overview ps")?;
                }
                "tags" => {
                    for tag in format::expect_array(value, "entry tags")? {
                        self.tags.push(format::expect_str(tag, "entry tag")?.to_string());
                    }
                }
                "ainfo" => self.info = format::expect_str(value, "entry info")?.to_string(),
                "url" => self.url = format::expect_str(value, "entry URL")?.to_string(),
                "URLs" => {
                    for item in format::expect_array(value, "entry URL list")? {
                        let labeled = format::expect_object(item, "entry URL")?;
                        for (label, url) in labeled {
                            self.urls
                                .insert(label.clone(), format::expect_str(url, "entry URL")?.to_string());
                        }
                    }
                }
                other => {
                    return Err(Error::format(format!(
                        "unknown key {other:?} in entry overview"
                    )));
                }
            }
        }

        Ok(())
    }

    fn apply_details(&mut self, details: &str) -> Result<()> {
        let json: Value = serde_json::from_str(details)
            .map_err(|_| Error::format("unable to parse JSON data in entry details"))?;
        let object = format::expect_object(&json, "entry details")?;

        for (key, value) in object {
            match key.as_str() {
                "sections" => {
                    for item in format::expect_array(value, "entry sections")? {
                        self.sections.push(Section::from_json(item)?);
                    }
                }
                "fields" => {
                    for item in format::expect_array(value, "entry fields")? {
                        self.fields.push(Field::from_json(item)?);
                    }
                }
                "htmlForm" => self.form = Some(Form::from_json(value)?),
                "notesPlain" => self.notes = format::expect_str(value, "entry notes")?.to_string(),
                "passwordHistory" => {
                    for item in format::expect_array(value, "entry password history")? {
                        self.password_history.push(PasswordHistoryItem::from_json(item)?);
                    }
                }
                other => {
                    return Err(Error::format(format!(
                        "unknown key {other:?} in entry details"
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The containing folder, when the entry is filed in one.
    pub fn folder_uuid(&self) -> Option<Uuid> {
        self.folder_uuid
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Creation time, seconds since the epoch.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Modification time, seconds since the epoch.
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Last sync transaction time, seconds since the epoch.
    pub fn tx(&self) -> i64 {
        self.tx
    }

    /// Trashed entries stay in the catalog; this flag is their only mark.
    pub fn trashed(&self) -> bool {
        self.trashed
    }

    /// Favorite ordering ordinal, when the entry is marked as a favorite.
    pub fn fave(&self) -> Option<u32> {
        self.fave
    }

    /// The entry's outer HMAC, stored opaquely and never verified here.
    pub fn hmac(&self) -> Option<&[u8; 32]> {
        self.hmac.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The overview's `ainfo` line, usually the account name.
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Labeled alternate URLs from the overview.
    pub fn urls(&self) -> &BTreeMap<String, String> {
        &self.urls
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Top-level detail fields (saved login forms put credentials here).
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn form(&self) -> Option<&Form> {
        self.form.as_ref()
    }

    pub fn password_history(&self) -> &[PasswordHistoryItem] {
        &self.password_history
    }

    /// The field designated as the password, when one exists.
    pub fn password(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.designation == "password")
            .map(|field| field.value())
    }
}

// Field values are usually strings but the format allows any JSON value;
// non-strings keep their JSON spelling.
fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
