pub mod codec;
pub mod document;
pub mod errors;
pub mod models;
pub mod store;

pub use crate::codec::{decode_key, encode_key, parse_civil_datetime, render_timestamp};
pub use crate::document::{
    create_account, user_records, valid_credentials, validate_new_password,
    with_updated_records, DocumentStore, FileBacking, MemoryBacking, StorageBacking,
};
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{Document, Measurement, Meridian, RecordKey, UserAccount};
pub use crate::store::RecordMapping;
