use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sharefeed_manager::ConnectionStatus;
use sharefeed_types::{
    ConnectionSettings, ConnectionSettingsUpdate, RetrievalOptions, ShareDraft, ShareRecord,
    StorageMode,
};

use crate::error::{ServiceError, ServiceResult};

/// Wire names of the inbound verbs.
pub mod types {
    pub const GET_SHARES: &str = "GET_SHARES";
    pub const SHARE_ITEM: &str = "SHARE_ITEM";
    pub const GET_CONNECTION_STATUS: &str = "GET_CONNECTION_STATUS";
    pub const SET_STORAGE_MODE: &str = "SET_STORAGE_MODE";
    pub const RESET_CONNECTION: &str = "RESET_CONNECTION";
    pub const GET_SHARE: &str = "GET_SHARE";
    pub const DELETE_SHARE: &str = "DELETE_SHARE";
    pub const UPDATE_CONNECTION_SETTINGS: &str = "UPDATE_CONNECTION_SETTINGS";
}

/// An inbound request.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    GetShares(RetrievalOptions),
    ShareItem(ShareDraft),
    GetConnectionStatus,
    SetStorageMode(StorageMode),
    ResetConnection,
    GetShare { id: String },
    DeleteShare { id: String },
    UpdateConnectionSettings(ConnectionSettingsUpdate),
}

impl Message {
    /// The verb this message was sent as.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GetShares(_) => types::GET_SHARES,
            Self::ShareItem(_) => types::SHARE_ITEM,
            Self::GetConnectionStatus => types::GET_CONNECTION_STATUS,
            Self::SetStorageMode(_) => types::SET_STORAGE_MODE,
            Self::ResetConnection => types::RESET_CONNECTION,
            Self::GetShare { .. } => types::GET_SHARE,
            Self::DeleteShare { .. } => types::DELETE_SHARE,
            Self::UpdateConnectionSettings(_) => types::UPDATE_CONNECTION_SETTINGS,
        }
    }

    /// Parse `{"type": ..., "payload": ...}`.
    ///
    /// Id and mode payloads may be a bare string or an object with an `id`
    /// or `mode` field.
    pub fn from_value(value: Value) -> ServiceResult<Self> {
        let Value::Object(mut obj) = value else {
            return Err(ServiceError::InvalidMessage("message must be a JSON object".into()));
        };
        let kind = match obj.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(ServiceError::InvalidMessage("missing message type".into())),
        };
        let payload = obj.remove("payload").unwrap_or(Value::Null);

        match kind.as_str() {
            types::GET_SHARES => Ok(Self::GetShares(optional(payload, &kind)?)),
            types::SHARE_ITEM => Ok(Self::ShareItem(required(payload, &kind)?)),
            types::GET_CONNECTION_STATUS => Ok(Self::GetConnectionStatus),
            types::SET_STORAGE_MODE => {
                let raw = string_field(payload, "mode", &kind)?;
                let mode = raw
                    .parse()
                    .map_err(|e: sharefeed_types::TypeError| {
                        ServiceError::InvalidMessage(e.to_string())
                    })?;
                Ok(Self::SetStorageMode(mode))
            }
            types::RESET_CONNECTION => Ok(Self::ResetConnection),
            types::GET_SHARE => Ok(Self::GetShare {
                id: string_field(payload, "id", &kind)?,
            }),
            types::DELETE_SHARE => Ok(Self::DeleteShare {
                id: string_field(payload, "id", &kind)?,
            }),
            types::UPDATE_CONNECTION_SETTINGS => {
                Ok(Self::UpdateConnectionSettings(required(payload, &kind)?))
            }
            _ => Err(ServiceError::UnknownMessageType(kind)),
        }
    }
}

fn optional<T: DeserializeOwned + Default>(payload: Value, kind: &str) -> ServiceResult<T> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload)
        .map_err(|e| ServiceError::InvalidMessage(format!("{kind}: {e}")))
}

fn required<T: DeserializeOwned>(payload: Value, kind: &str) -> ServiceResult<T> {
    if payload.is_null() {
        return Err(ServiceError::InvalidMessage(format!("{kind} requires a payload")));
    }
    serde_json::from_value(payload)
        .map_err(|e| ServiceError::InvalidMessage(format!("{kind}: {e}")))
}

fn string_field(payload: Value, field: &str, kind: &str) -> ServiceResult<String> {
    match payload {
        Value::String(s) => Ok(s),
        Value::Object(mut obj) => match obj.remove(field) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(ServiceError::InvalidMessage(format!("{kind}: missing {field}"))),
        },
        _ => Err(ServiceError::InvalidMessage(format!("{kind}: missing {field}"))),
    }
}

/// An outbound reply.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    SharesResponse(Vec<ShareRecord>),
    ShareSuccess(ShareRecord),
    ShareResponse(Option<ShareRecord>),
    ConnectionStatus(ConnectionStatus),
    ConnectionSettings(ConnectionSettings),
    Ack,
    ShareError(String),
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ShareError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_shares_without_payload_has_no_filters() {
        let msg = Message::from_value(json!({"type": "GET_SHARES"})).unwrap();
        assert_eq!(msg, Message::GetShares(RetrievalOptions::all()));
    }

    #[test]
    fn get_shares_with_options() {
        let msg = Message::from_value(json!({
            "type": "GET_SHARES",
            "payload": {"feedId": "f1", "limit": 5, "after": 3000}
        }))
        .unwrap();
        assert_eq!(
            msg,
            Message::GetShares(RetrievalOptions::all().feed("f1").limit(5).after(3000))
        );
    }

    #[test]
    fn share_item_parses_draft() {
        let msg = Message::from_value(json!({
            "type": "SHARE_ITEM",
            "payload": {"url": "https://a.com", "title": "A", "tags": ["x"]}
        }))
        .unwrap();
        let Message::ShareItem(draft) = msg else {
            panic!("expected share item");
        };
        assert_eq!(draft.url, "https://a.com");
        assert_eq!(draft.tags, vec!["x".to_string()]);
    }

    #[test]
    fn share_item_requires_payload() {
        let err = Message::from_value(json!({"type": "SHARE_ITEM"})).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidMessage(_)));
    }

    #[test]
    fn mode_accepts_string_or_object() {
        let a = Message::from_value(json!({"type": "SET_STORAGE_MODE", "payload": "local"})).unwrap();
        let b = Message::from_value(json!({"type": "SET_STORAGE_MODE", "payload": {"mode": "holochain"}}))
            .unwrap();
        assert_eq!(a, Message::SetStorageMode(StorageMode::Local));
        assert_eq!(b, Message::SetStorageMode(StorageMode::Remote));
        assert!(Message::from_value(json!({"type": "SET_STORAGE_MODE", "payload": "cloud"})).is_err());
    }

    #[test]
    fn id_payloads() {
        let msg = Message::from_value(json!({"type": "DELETE_SHARE", "payload": {"id": "abc"}})).unwrap();
        assert_eq!(msg, Message::DeleteShare { id: "abc".into() });
        assert_eq!(msg.type_name(), types::DELETE_SHARE);
        let msg = Message::from_value(json!({"type": "GET_SHARE", "payload": "abc"})).unwrap();
        assert_eq!(msg, Message::GetShare { id: "abc".into() });
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Message::from_value(json!({"type": "EXPLODE"})).unwrap_err();
        assert_eq!(err.to_string(), "unknown message type: EXPLODE");
    }

    #[test]
    fn missing_type_is_invalid() {
        assert!(matches!(
            Message::from_value(json!({"payload": 1})),
            Err(ServiceError::InvalidMessage(_))
        ));
        assert!(matches!(
            Message::from_value(json!("GET_SHARES")),
            Err(ServiceError::InvalidMessage(_))
        ));
    }

    #[test]
    fn responses_serialize_with_type_and_payload() {
        assert_eq!(serde_json::to_value(Response::Ack).unwrap(), json!({"type": "ACK"}));
        assert_eq!(
            serde_json::to_value(Response::ShareError("nope".into())).unwrap(),
            json!({"type": "SHARE_ERROR", "payload": "nope"})
        );
        assert_eq!(
            serde_json::to_value(Response::ShareResponse(None)).unwrap(),
            json!({"type": "SHARE_RESPONSE", "payload": null})
        );
    }
}
