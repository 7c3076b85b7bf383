//! Claims codec: canonical JSON payloads, signing, and schema-checked decoding.

use crate::base64url;
use crate::claims::{
    AccountClaims, ClaimKind, ClaimSet, ClaimsCommon, OperatorClaims, UserClaims, VariantFields,
};
use crate::constants::{JWT_ALGORITHM, JWT_TYPE, JWT_VERSION};
use crate::error::{JwtError, Result};
use crate::keys;
use crate::token;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

type Object = Map<String, Value>;

#[derive(Serialize)]
struct Header {
    typ: &'static str,
    alg: &'static str,
}

/// Payload in wire key order: `jti, iat, iss, sub, name, exp, nats`.
#[derive(Serialize)]
struct Payload<'a> {
    jti: &'a str,
    iat: i64,
    iss: &'a str,
    sub: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    nats: NatsSection<'a>,
}

#[derive(Serialize)]
struct NatsSection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    signing_keys: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_account: Option<&'a str>,
}

/// Sign `claims` with `seed`.
///
/// Structural validation runs before any key material is touched. A fresh
/// `jti` is generated on every call, and `iat` defaults to now when unset.
pub(crate) fn encode<C: ClaimSet + ?Sized>(claims: &C, seed: &str) -> Result<String> {
    claims.validate()?;

    let kind = claims.kind();
    let common = claims.common();
    let issued_at = if common.issued_at > 0 {
        common.issued_at
    } else {
        Utc::now().timestamp()
    };

    // Re-check with the stamped iat so an already-past expiry can't produce
    // a token that fails to decode.
    let stamped = ClaimsCommon {
        issued_at,
        ..common.clone()
    };
    stamped.validate_as(kind)?;

    let jti = keys::generate_jti();
    let (signing_keys, issuer_account) = match claims.variant_fields() {
        VariantFields::SigningKeys(list) if !list.is_empty() => (Some(list), None),
        VariantFields::SigningKeys(_) => (None, None),
        VariantFields::IssuerAccount(account) => (None, account),
    };

    let payload = Payload {
        jti: &jti,
        iat: issued_at,
        iss: &common.issuer,
        sub: &common.subject,
        name: common.name.as_deref(),
        exp: (common.expires > 0).then_some(common.expires),
        nats: NatsSection {
            kind: kind.as_str(),
            version: JWT_VERSION,
            signing_keys,
            issuer_account,
        },
    };

    let header_json = serde_json::to_string(&Header {
        typ: JWT_TYPE,
        alg: JWT_ALGORITHM,
    })
    .map_err(|e| invalid_json("header", e))?;
    let payload_json = serde_json::to_string(&payload).map_err(|e| invalid_json("payload", e))?;

    let signing_input = token::join(
        &base64url::encode(header_json),
        &base64url::encode(payload_json),
    );
    let signature = keys::sign(seed, signing_input.as_bytes())?;

    debug!(kind = %kind, subject = %common.subject, jti = %jti, "encoded claims");

    Ok(token::assemble(&signing_input, &base64url::encode(signature)))
}

/// Decode an operator token.
pub fn decode_operator(token: &str) -> Result<OperatorClaims> {
    let raw = decode_raw(token, ClaimKind::Operator)?;
    let claims = OperatorClaims {
        signing_keys: optional_str_array(&raw.nats, "signing_keys", "nats.signing_keys")?
            .unwrap_or_default(),
        common: raw.common,
    };
    claims.validate()?;
    Ok(claims)
}

/// Decode an account token.
pub fn decode_account(token: &str) -> Result<AccountClaims> {
    let raw = decode_raw(token, ClaimKind::Account)?;
    let claims = AccountClaims {
        signing_keys: optional_str_array(&raw.nats, "signing_keys", "nats.signing_keys")?
            .unwrap_or_default(),
        common: raw.common,
    };
    claims.validate()?;
    Ok(claims)
}

/// Decode a user token.
pub fn decode_user(token: &str) -> Result<UserClaims> {
    let raw = decode_raw(token, ClaimKind::User)?;
    let claims = UserClaims {
        issuer_account: optional_str(&raw.nats, "issuer_account", "nats.issuer_account")?,
        common: raw.common,
    };
    claims.validate()?;
    Ok(claims)
}

/// Read `nats.type` without committing to a claim kind.
pub fn peek_kind(token: &str) -> Result<ClaimKind> {
    let parts = token::split(token)?;
    let payload = parse_object(parts.payload_b64, "payload")?;
    let nats = nats_object(&payload)?;
    required_str(nats, "type", "nats.type")?.parse()
}

/// Base64url-decode a segment and parse it as a JSON object.
pub(crate) fn parse_object(segment_b64: &str, segment: &'static str) -> Result<Object> {
    let bytes = base64url::decode(segment_b64)?;
    match serde_json::from_slice::<Value>(&bytes).map_err(|e| invalid_json(segment, e))? {
        Value::Object(map) => Ok(map),
        other => Err(JwtError::InvalidPayload {
            segment,
            reason: format!("expected a JSON object, found {}", json_type(&other)),
        }),
    }
}

/// Common fields plus the still-unparsed `nats` object.
struct RawClaims {
    common: ClaimsCommon,
    nats: Object,
}

fn decode_raw(token: &str, expected: ClaimKind) -> Result<RawClaims> {
    let parts = token::split(token)?;

    check_header(&parse_object(parts.header_b64, "header")?)?;

    let mut payload = parse_object(parts.payload_b64, "payload")?;
    let nats = nats_object(&payload)?;

    let found = required_str(nats, "type", "nats.type")?;
    if found != expected.as_str() {
        return Err(JwtError::TypeMismatch { expected, found });
    }

    match nats.get("version") {
        Some(v) if v.as_i64() == Some(JWT_VERSION) => {}
        Some(v) => return Err(JwtError::UnsupportedVersion(v.to_string())),
        None => return Err(JwtError::UnsupportedVersion("<missing>".to_string())),
    }

    let common = ClaimsCommon {
        subject: required_str(&payload, "sub", "sub")?,
        issuer: required_str(&payload, "iss", "iss")?,
        issued_at: required_i64(&payload, "iat", "iat")?,
        name: optional_str(&payload, "name", "name")?,
        expires: optional_i64(&payload, "exp", "exp")?.unwrap_or(0),
        jti: optional_str(&payload, "jti", "jti")?.unwrap_or_default(),
    };

    debug!(kind = %expected, subject = %common.subject, "decoded claims");

    let nats = match payload.remove("nats") {
        Some(Value::Object(map)) => map,
        _ => Object::new(),
    };

    Ok(RawClaims { common, nats })
}

fn check_header(header: &Object) -> Result<()> {
    match header.get("alg") {
        Some(Value::String(alg)) if alg == JWT_ALGORITHM => Ok(()),
        Some(Value::String(alg)) => Err(JwtError::UnsupportedAlgorithm(alg.clone())),
        Some(other) => Err(JwtError::UnsupportedAlgorithm(other.to_string())),
        None => Err(JwtError::UnsupportedAlgorithm("<missing>".to_string())),
    }
}

fn nats_object(payload: &Object) -> Result<&Object> {
    match present(payload, "nats") {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(JwtError::InvalidField {
            field: "nats",
            expected: "object",
        }),
        None => Err(JwtError::MissingField("nats")),
    }
}

/// A key that is present and not JSON `null`.
fn present<'a>(map: &'a Object, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn required_str(map: &Object, key: &str, field: &'static str) -> Result<String> {
    optional_str(map, key, field)?.ok_or(JwtError::MissingField(field))
}

fn optional_str(map: &Object, key: &str, field: &'static str) -> Result<Option<String>> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(JwtError::InvalidField {
            field,
            expected: "string",
        }),
    }
}

fn required_i64(map: &Object, key: &str, field: &'static str) -> Result<i64> {
    optional_i64(map, key, field)?.ok_or(JwtError::MissingField(field))
}

fn optional_i64(map: &Object, key: &str, field: &'static str) -> Result<Option<i64>> {
    match present(map, key) {
        None => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(JwtError::InvalidField {
            field,
            expected: "integer",
        }),
    }
}

fn optional_str_array(map: &Object, key: &str, field: &'static str) -> Result<Option<Vec<String>>> {
    let invalid = JwtError::InvalidField {
        field,
        expected: "array of strings",
    };
    match present(map, key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or(invalid),
        Some(_) => Err(invalid),
    }
}

fn invalid_json(segment: &'static str, err: serde_json::Error) -> JwtError {
    JwtError::InvalidPayload {
        segment,
        reason: err.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
