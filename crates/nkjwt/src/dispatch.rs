//! Kind-agnostic entry points: decode by embedded type, verify by embedded issuer.

use crate::base64url;
use crate::claims::{ClaimKind, Claims};
use crate::codec::{self, decode_account, decode_operator, decode_user};
use crate::error::{JwtError, Result};
use crate::keys;
use crate::token;
use serde_json::Value;
use tracing::debug;

/// Decode a token of any kind, routing on `nats.type`.
pub fn decode(token: &str) -> Result<Claims> {
    Ok(match codec::peek_kind(token)? {
        ClaimKind::Operator => Claims::Operator(decode_operator(token)?),
        ClaimKind::Account => Claims::Account(decode_account(token)?),
        ClaimKind::User => Claims::User(decode_user(token)?),
    })
}

/// Check the token's signature against the public key in its `iss` field.
///
/// Intended for untrusted input: every failure, including unparseable
/// tokens, yields `false`.
pub fn verify(token: &str) -> bool {
    match try_verify(token) {
        Ok(valid) => valid,
        Err(err) => {
            debug!(error = %err, "token verification failed");
            false
        }
    }
}

fn try_verify(token: &str) -> Result<bool> {
    let parts = token::split(token)?;
    let payload = codec::parse_object(parts.payload_b64, "payload")?;
    let issuer = match payload.get("iss") {
        Some(Value::String(iss)) => iss,
        Some(_) => {
            return Err(JwtError::InvalidField {
                field: "iss",
                expected: "string",
            });
        }
        None => return Err(JwtError::MissingField("iss")),
    };
    let signature = base64url::decode(parts.signature_b64)?;
    keys::verify(issuer, parts.signing_input.as_bytes(), &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{AccountClaims, ClaimSet, OperatorClaims, UserClaims};
    use crate::error::ErrorKind;
    use nkeys::KeyPair;

    fn seed(kp: &KeyPair) -> String {
        keys::seed_of(kp).unwrap()
    }

    fn operator_token() -> String {
        let kp = KeyPair::new_operator();
        OperatorClaims::new(kp.public_key()).encode(&seed(&kp)).unwrap()
    }

    #[test]
    fn test_decode_dispatches_on_type() {
        let op = KeyPair::new_operator();
        let acc = KeyPair::new_account();
        let usr = KeyPair::new_user();

        let op_jwt = OperatorClaims::new(op.public_key()).encode(&seed(&op)).unwrap();

        let mut account = AccountClaims::new(acc.public_key());
        account.set_issuer(op.public_key());
        let acc_jwt = account.encode(&seed(&op)).unwrap();

        let mut user = UserClaims::new(usr.public_key());
        user.set_issuer(acc.public_key());
        let usr_jwt = user.encode(&seed(&acc)).unwrap();

        assert_eq!(decode(&op_jwt).unwrap().kind(), ClaimKind::Operator);
        assert_eq!(decode(&acc_jwt).unwrap().kind(), ClaimKind::Account);
        let decoded = decode(&usr_jwt).unwrap();
        assert_eq!(decoded.kind(), ClaimKind::User);
        assert_eq!(decoded.subject(), usr.public_key());
    }

    #[test]
    fn test_decode_unknown_type() {
        let header = base64url::encode(r#"{"typ":"JWT","alg":"ed25519-nkey"}"#);
        let payload = base64url::encode(
            r#"{"jti":"x","iat":1,"iss":"OX","sub":"OX","nats":{"type":"server","version":2}}"#,
        );
        let err = decode(&format!("{header}.{payload}.c2ln")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownClaimType);
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode("header.payload").unwrap_err().kind(), ErrorKind::MalformedToken);
        assert_eq!(decode("a.b.c.d").unwrap_err().kind(), ErrorKind::MalformedToken);
        assert_eq!(decode("!!!.@@@.###").unwrap_err().kind(), ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_verify_valid_token() {
        assert!(verify(&operator_token()));
    }

    #[test]
    fn test_verify_detects_signature_tampering() {
        let jwt = operator_token();
        let sig_start = jwt.rfind('.').unwrap() + 1;

        for i in sig_start..jwt.len() {
            let mut bytes = jwt.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(!verify(&tampered), "flip at {i} still verified");
        }
    }

    #[test]
    fn test_verify_detects_payload_tampering() {
        let jwt = operator_token();
        let first_dot = jwt.find('.').unwrap();
        let mut bytes = jwt.into_bytes();
        let i = first_dot + 3;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        assert!(!verify(&String::from_utf8(bytes).unwrap()));
    }

    #[test]
    fn test_verify_wrong_signer() {
        let acc = KeyPair::new_account();
        let impostor = KeyPair::new_account();
        let mut user = UserClaims::new(KeyPair::new_user().public_key());
        user.set_issuer(acc.public_key());

        let jwt = user.encode(&seed(&impostor)).unwrap();
        assert!(decode(&jwt).is_ok());
        assert!(!verify(&jwt));
    }

    #[test]
    fn test_verify_never_panics_on_garbage() {
        for input in ["", ".", "..", "a.b", "a.b.c", "!!!.@@@.###", "eyJ9.eyJ9.eyJ9"] {
            assert!(!verify(input), "{input}");
        }
    }
}
