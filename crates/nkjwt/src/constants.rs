//! Wire-format constants.

/// Version carried in `nats.version`.
pub const JWT_VERSION: i64 = 2;

/// Header `alg` value.
pub const JWT_ALGORITHM: &str = "ed25519-nkey";

/// Header `typ` value.
pub const JWT_TYPE: &str = "JWT";

/// Tokens larger than this are rejected before any parsing (10 MiB).
pub const MAX_JWT_SIZE: usize = 10 * 1024 * 1024;

/// Random bytes in a `jti`.
pub const JTI_BYTES: usize = 16;

/// Length of an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Line width of the token block in a creds file.
pub const CREDS_LINE_WIDTH: usize = 64;
