//! Mapping between CCP account properties and connection fields.

use crate::ccp::CcpError;
use serde_json::{Map, Value};

/// JSON object returned by the CCP for one vault object.
pub type RawVaultRecord = Map<String, Value>;

/// Semantic field a CCP property is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SvcAccount,
    Schema,
    Host,
    Extra,
    Password,
    Login,
    Port,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::SvcAccount => "svc_account",
            Field::Schema => "schema",
            Field::Host => "host",
            Field::Extra => "extra",
            Field::Password => "password",
            Field::Login => "login",
            Field::Port => "port",
        }
    }
}

/// CCP property name to connection field, in mapping order.
pub const FIELD_TABLE: [(&str, Field); 7] = [
    ("AccountDescription", Field::SvcAccount),
    ("ApplicationName", Field::Schema),
    ("Address", Field::Host),
    ("Comment", Field::Extra),
    ("Content", Field::Password),
    ("LogonDomain", Field::Login),
    ("Port", Field::Port),
];

/// Connection fields recovered from a single vault object.
///
/// `svc_account` is only set on records that still need service-account
/// resolution; records handed out by the resolver never carry it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub svc_account: Option<String>,
    pub schema: Option<String>,
    pub host: Option<String>,
    pub extra: Option<String>,
    pub password: Option<String>,
    pub login: Option<String>,
    pub port: Option<i64>,
}

impl CredentialRecord {
    /// Copy every recognized property of `raw`, coercing `Port` to a number.
    pub fn from_raw(raw: &RawVaultRecord) -> Result<Self, CcpError> {
        let mut record = CredentialRecord::default();
        for (property, field) in FIELD_TABLE {
            let Some(value) = raw.get(property).and_then(render_value) else {
                continue;
            };
            match field {
                Field::SvcAccount => record.svc_account = Some(value),
                Field::Schema => record.schema = Some(value),
                Field::Host => record.host = Some(value),
                Field::Extra => record.extra = Some(value),
                Field::Password => record.password = Some(value),
                Field::Login => record.login = Some(value),
                Field::Port => record.port = Some(parse_port(&value)?),
            }
        }
        Ok(record)
    }

    /// True when the object had none of the recognized properties.
    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Names of the fields that are set, in mapping order.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let slots = [
            (Field::SvcAccount, self.svc_account.is_some()),
            (Field::Schema, self.schema.is_some()),
            (Field::Host, self.host.is_some()),
            (Field::Extra, self.extra.is_some()),
            (Field::Password, self.password.is_some()),
            (Field::Login, self.login.is_some()),
            (Field::Port, self.port.is_some()),
        ];
        slots
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(field, _)| field.name())
            .collect()
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("svc_account", &self.svc_account)
            .field("schema", &self.schema)
            .field("host", &self.host)
            .field("extra", &self.extra)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("login", &self.login)
            .field("port", &self.port)
            .finish()
    }
}

/// String form of a property value. `null` counts as absent.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_port(value: &str) -> Result<i64, CcpError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| CcpError::InvalidPort(value.to_string()))
}
