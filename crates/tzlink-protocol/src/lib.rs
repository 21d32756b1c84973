//! Wire protocol shared by the tzlink daemon and its clients.
//!
//! A request travels as one encrypted envelope per TCP connection: a 16-byte
//! IV followed by AES-CBC ciphertext of a JSON payload. The daemon answers
//! with one envelope of the same shape and closes the connection.

pub mod cipher;
pub mod client;
pub mod message;
pub mod outcome;
pub mod request_type;

pub use cipher::{CipherError, IV_LEN, SharedKey, decrypt, encrypt};
pub use client::{Client, ClientError};
pub use message::{
    ProtocolError, RequestMessage, ResponseMessage, decode_response, encode_request,
    encode_response,
};
pub use outcome::{OutcomeCode, UnknownOutcomeCode};
pub use request_type::{REGISTRY_NAME, RequestKind};
