//! Request parameters: caller options merged over config defaults, then
//! filtered down to an operation's allow-list.
//!
//! # Design
//! `ParamKey` enumerates every name the API understands, so an allow-list is
//! a plain slice of keys and a misspelt parameter cannot be expressed. The
//! filtered set keeps allow-list order, which makes built requests stable and
//! easy to compare in tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::types::FileUpload;

/// A parameter name understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Url,
    File,
    Title,
    Async,
    Private,
    Token,
    Uuids,
    Uuid,
    Annotated,
    Editable,
    Downloadable,
    Name,
}

impl ParamKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Url => "url",
            ParamKey::File => "file",
            ParamKey::Title => "title",
            ParamKey::Async => "async",
            ParamKey::Private => "private",
            ParamKey::Token => "token",
            ParamKey::Uuids => "uuids",
            ParamKey::Uuid => "uuid",
            ParamKey::Annotated => "annotated",
            ParamKey::Editable => "editable",
            ParamKey::Downloadable => "downloadable",
            ParamKey::Name => "name",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Flag(bool),
    File(FileUpload),
}

impl ParamValue {
    /// Wire form of a non-file value. Flags render as `true` / `false`.
    pub fn as_wire(&self) -> Option<String> {
        match self {
            ParamValue::Text(text) => Some(text.clone()),
            ParamValue::Flag(flag) => Some(flag.to_string()),
            ParamValue::File(_) => None,
        }
    }
}

/// Per-call overrides. Unset fields fall back to the client's `Config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub token: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "async")]
    pub async_: Option<bool>,
    pub private: Option<bool>,
    pub annotated: Option<bool>,
    pub editable: Option<bool>,
    pub downloadable: Option<bool>,
    /// Display name of the session user.
    pub name: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn async_(mut self, value: bool) -> Self {
        self.async_ = Some(value);
        self
    }

    pub fn private(mut self, value: bool) -> Self {
        self.private = Some(value);
        self
    }

    pub fn annotated(mut self, value: bool) -> Self {
        self.annotated = Some(value);
        self
    }

    pub fn editable(mut self, value: bool) -> Self {
        self.editable = Some(value);
        self
    }

    pub fn downloadable(mut self, value: bool) -> Self {
        self.downloadable = Some(value);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An ordered parameter set with at most one value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(ParamKey, ParamValue)>,
}

impl Params {
    /// Merge `options` over `config`: every default is present, the caller
    /// wins on conflict, and option-only keys appear when set.
    pub fn merged(config: &Config, options: &Options) -> Self {
        let mut params = Params::default();
        params.set(
            ParamKey::Token,
            ParamValue::Text(options.token.clone().unwrap_or_else(|| config.token.clone())),
        );
        params.set(ParamKey::Async, ParamValue::Flag(options.async_.unwrap_or(config.async_)));
        params.set(ParamKey::Private, ParamValue::Flag(options.private.unwrap_or(config.private)));
        params.set(
            ParamKey::Annotated,
            ParamValue::Flag(options.annotated.unwrap_or(config.annotated)),
        );
        params.set(ParamKey::Editable, ParamValue::Flag(options.editable.unwrap_or(config.editable)));
        params.set(
            ParamKey::Downloadable,
            ParamValue::Flag(options.downloadable.unwrap_or(config.downloadable)),
        );
        if let Some(title) = &options.title {
            params.set(ParamKey::Title, ParamValue::Text(title.clone()));
        }
        if let Some(name) = &options.name {
            params.set(ParamKey::Name, ParamValue::Text(name.clone()));
        }
        params
    }

    /// Insert or replace the value for `key`.
    pub fn set(&mut self, key: ParamKey, value: ParamValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = ParamKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only keys in `allowed`, in allow-list order.
    pub fn restrict(mut self, allowed: &[ParamKey]) -> Self {
        let mut entries = Vec::with_capacity(allowed.len());
        for key in allowed {
            if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
                entries.push(self.entries.swap_remove(pos));
            }
        }
        Params { entries }
    }

    /// Split into wire fields and the file payload, if any.
    pub fn into_fields(self) -> (Vec<(String, String)>, Option<FileUpload>) {
        let mut fields = Vec::with_capacity(self.entries.len());
        let mut file = None;
        for (key, value) in self.entries {
            match value {
                ParamValue::File(upload) => file = Some(upload),
                other => {
                    if let Some(wire) = other.as_wire() {
                        fields.push((key.as_str().to_string(), wire));
                    }
                }
            }
        }
        (fields, file)
    }
}
