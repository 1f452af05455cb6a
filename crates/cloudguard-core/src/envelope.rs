//! Response envelope codec.
//!
//! Every response body has the same wrapper:
//!
//! ```json
//! {"result": "success", "response": { ... }, "msg": null}
//! {"result": "error", "msg": "Invalid credentials", "err_code": "E_UNAUTH"}
//! ```
//!
//! The shape of `response` depends only on which operation was invoked, so decoding
//! happens in two phases. [`Envelope::parse`] reads the discriminant, message and
//! code and keeps the payload as an untyped document; [`Envelope::into_result`] then
//! projects the payload into whatever type the caller asks for.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

const STATUS_FIELD: &str = "result";
const PAYLOAD_FIELD: &str = "response";
const MESSAGE_FIELD: &str = "msg";
const CODE_FIELD: &str = "err_code";

/// Message used when an error envelope carries neither `msg` nor `err_code`.
pub const MISSING_MESSAGE: &str = "no message provided";

/// Envelope discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeStatus {
    /// The operation succeeded and `response` holds its payload
    Success,
    /// The operation was rejected and `msg` explains why
    Error,
}

impl EnvelopeStatus {
    /// Returns the wire marker.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl FromStr for EnvelopeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(Error::MalformedResponse(format!(
                "unknown envelope status `{other}`"
            ))),
        }
    }
}

impl fmt::Display for EnvelopeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed response envelope whose payload has not been typed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    status: EnvelopeStatus,
    message: Option<String>,
    code: Option<String>,
    payload: Value,
}

impl Envelope {
    /// Parse the envelope header from a raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the body is not JSON, is not an object,
    /// or lacks a recognised `result` discriminant.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|err| Error::MalformedResponse(format!("invalid JSON: {err}")))?;

        let Value::Object(mut fields) = root else {
            return Err(Error::MalformedResponse(
                "envelope is not a JSON object".to_string(),
            ));
        };

        let status = match fields.get(STATUS_FIELD) {
            Some(Value::String(marker)) => marker.parse::<EnvelopeStatus>()?,
            Some(other) => {
                return Err(Error::MalformedResponse(format!(
                    "envelope status must be a string, got {other}"
                )))
            }
            None => {
                return Err(Error::MalformedResponse(
                    "envelope has no `result` field".to_string(),
                ))
            }
        };

        Ok(Self {
            status,
            message: text_field(&fields, MESSAGE_FIELD),
            code: text_field(&fields, CODE_FIELD),
            payload: fields.remove(PAYLOAD_FIELD).unwrap_or(Value::Null),
        })
    }

    /// Envelope discriminant.
    #[must_use]
    pub const fn status(&self) -> EnvelopeStatus {
        self.status
    }

    /// Returns true when the discriminant is `success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Remote message, if one was sent.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Remote machine-readable error code, if one was sent.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Untyped payload; `null` when the envelope had none.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Project the payload into `T`, or turn an error envelope into an [`Error`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteRejected`] for error envelopes and
    /// [`Error::DecodeFailure`] when the payload does not fit `T`.
    pub fn into_result<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        match self.status {
            EnvelopeStatus::Error => {
                let message = self
                    .message
                    .or_else(|| self.code.clone())
                    .unwrap_or_else(|| MISSING_MESSAGE.to_string());
                Err(Error::rejected(self.code.as_deref(), message))
            }
            EnvelopeStatus::Success => serde_json::from_value(self.payload).map_err(|err| {
                Error::DecodeFailure(format!(
                    "response does not match `{}`: {err}",
                    std::any::type_name::<T>()
                ))
            }),
        }
    }
}

/// Decode a raw response body into `T`.
///
/// # Errors
///
/// See [`Envelope::parse`] and [`Envelope::into_result`].
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    Envelope::parse(bytes)?.into_result()
}

// Empty strings count as absent; non-string scalars are rendered as text.
fn text_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RejectionKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ZoneEntry {
        zone_id: String,
        zone_name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Zones {
        count: u32,
        objs: Vec<ZoneEntry>,
    }

    #[test]
    fn decodes_success_payload_into_requested_shape() {
        let body = br#"{
            "request": {"act": "zone_load_multi"},
            "result": "success",
            "msg": null,
            "response": {"count": 1, "objs": [{"zone_id": "1", "zone_name": "example.com"}]}
        }"#;

        let zones: Zones = decode(body).unwrap();
        assert_eq!(zones.count, 1);
        assert_eq!(
            zones.objs,
            vec![ZoneEntry {
                zone_id: "1".to_string(),
                zone_name: "example.com".to_string()
            }]
        );
    }

    #[test]
    fn error_envelope_is_rejected_with_classified_kind() {
        let body = br#"{"result": "error", "msg": "invalid credentials"}"#;
        let err = decode::<Zones>(body).unwrap_err();
        assert_eq!(
            err,
            Error::RemoteRejected {
                kind: RejectionKind::Unauthorized,
                message: "invalid credentials".to_string()
            }
        );
    }

    #[test]
    fn error_code_drives_classification() {
        let body = br#"{"result": "error", "msg": "Slow down", "err_code": "E_MAXAPI"}"#;
        let err = decode::<Value>(body).unwrap_err();
        assert_eq!(err.rejection_kind(), Some(RejectionKind::QuotaExceeded));
    }

    #[test]
    fn error_without_message_falls_back_to_code() {
        let body = br#"{"result": "error", "msg": "", "err_code": "E_INVLDINPUT"}"#;
        match decode::<Value>(body).unwrap_err() {
            Error::RemoteRejected { kind, message } => {
                assert_eq!(kind, RejectionKind::InvalidInput);
                assert_eq!(message, "E_INVLDINPUT");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let body = br#"{"result": "error"}"#;
        match decode::<Value>(body).unwrap_err() {
            Error::RemoteRejected { kind, message } => {
                assert_eq!(kind, RejectionKind::Unknown);
                assert_eq!(message, MISSING_MESSAGE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_is_decode_failure() {
        let body = br#"{"result": "success", "response": {"count": "many", "objs": []}}"#;
        let err = decode::<Zones>(body).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));

        let body = br#"{"result": "success", "response": {"objs": []}}"#;
        assert!(matches!(
            decode::<Zones>(body).unwrap_err(),
            Error::DecodeFailure(_)
        ));
    }

    #[test]
    fn truncated_json_is_malformed() {
        let body = br#"{"result": "success", "response": {"count": 1, "ob"#;
        assert!(matches!(
            decode::<Zones>(body).unwrap_err(),
            Error::MalformedResponse(_)
        ));
        assert!(matches!(
            decode::<Zones>(b"").unwrap_err(),
            Error::MalformedResponse(_)
        ));
        assert!(matches!(
            decode::<Zones>(b"<html>502 Bad Gateway</html>").unwrap_err(),
            Error::MalformedResponse(_)
        ));
    }

    #[test]
    fn envelope_structure_is_validated() {
        for body in [
            &b"[1, 2, 3]"[..],
            br#"{"response": {}}"#,
            br#"{"result": 1}"#,
            br#"{"result": "pending"}"#,
        ] {
            assert!(
                matches!(Envelope::parse(body), Err(Error::MalformedResponse(_))),
                "body {:?} should be malformed",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn missing_payload_decodes_as_null() {
        let envelope = Envelope::parse(br#"{"result": "success", "msg": null}"#).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.payload(), &Value::Null);
        assert!(envelope.message().is_none());

        let value: Value = envelope.into_result().unwrap();
        assert!(value.is_null());
        assert!(matches!(
            decode::<Zones>(br#"{"result": "success"}"#),
            Err(Error::DecodeFailure(_))
        ));
    }

    #[test]
    fn status_round_trips_through_display() {
        for status in [EnvelopeStatus::Success, EnvelopeStatus::Error] {
            assert_eq!(status.to_string().parse::<EnvelopeStatus>().unwrap(), status);
        }
    }
}
