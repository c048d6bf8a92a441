use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// A unique index violation, with the name of the index that rejected the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub index: Option<String>,
}

impl DuplicateKey {
    pub fn is_index(&self, name: &str) -> bool {
        self.index.as_deref() == Some(name)
    }
}

/// Returns the duplicate key details when `err` is a unique index violation.
///
/// Inserts report it as a write error, `findAndModify` as a command error;
/// both carry code 11000 and a message of the form
/// `E11000 duplicate key error collection: db.coll index: <name> dup key: {..}`.
pub fn duplicate_key(err: &Error) -> Option<DuplicateKey> {
    let message = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            &write.message
        }
        ErrorKind::Command(command) if command.code == DUPLICATE_KEY_CODE => &command.message,
        _ => return None,
    };

    Some(DuplicateKey {
        index: index_name(message),
    })
}

fn index_name(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("index: ")?;
    rest.split_whitespace().next().map(str::to_string)
}
