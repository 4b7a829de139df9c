use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator used to look a command up in a descriptor's command table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    Login,
    Fetch,
    Start,
    Stop,
    Pause,
    Remove,
    DeleteData,
    AddUri,
    AddFile,
}

impl CommandKind {
    pub const ALL: [CommandKind; 9] = [
        CommandKind::Login,
        CommandKind::Fetch,
        CommandKind::Start,
        CommandKind::Stop,
        CommandKind::Pause,
        CommandKind::Remove,
        CommandKind::DeleteData,
        CommandKind::AddUri,
        CommandKind::AddFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Login => "login",
            CommandKind::Fetch => "fetch",
            CommandKind::Start => "start",
            CommandKind::Stop => "stop",
            CommandKind::Pause => "pause",
            CommandKind::Remove => "remove",
            CommandKind::DeleteData => "deleteData",
            CommandKind::AddUri => "addUri",
            CommandKind::AddFile => "addFile",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which jobs a fetch asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchScope {
    All,
    Some(Vec<String>),
}

/// Backend-independent user intent.
///
/// Commands are immutable values: the pipeline consumes one per invocation
/// and emits a fresh command (for example a `Login` wrapper) when it needs
/// the caller to resend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { then: Box<Command> },
    Fetch(FetchScope),
    Start(Vec<String>),
    Stop(Vec<String>),
    Pause(Vec<String>),
    Remove(Vec<String>),
    DeleteData(Vec<String>),
    AddUri { uri: String, location: Option<String> },
    AddFile { bytes: Bytes, location: Option<String> },
}

impl Command {
    /// Wrap `then` so it is sent again after authenticating
    pub fn login(then: Command) -> Self {
        Command::Login {
            then: Box::new(then),
        }
    }

    pub fn fetch_all() -> Self {
        Command::Fetch(FetchScope::All)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Login { .. } => CommandKind::Login,
            Command::Fetch(_) => CommandKind::Fetch,
            Command::Start(_) => CommandKind::Start,
            Command::Stop(_) => CommandKind::Stop,
            Command::Pause(_) => CommandKind::Pause,
            Command::Remove(_) => CommandKind::Remove,
            Command::DeleteData(_) => CommandKind::DeleteData,
            Command::AddUri { .. } => CommandKind::AddUri,
            Command::AddFile { .. } => CommandKind::AddFile,
        }
    }

    /// Job ids available to `field`/`forEach` parameters, in caller order.
    ///
    /// A `Login` carries no ids of its own; its request only needs credentials.
    pub fn ids(&self) -> &[String] {
        match self {
            Command::Fetch(FetchScope::Some(ids))
            | Command::Start(ids)
            | Command::Stop(ids)
            | Command::Pause(ids)
            | Command::Remove(ids)
            | Command::DeleteData(ids) => ids,
            _ => &[],
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            Command::AddUri { uri, .. } => Some(uri),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Command::AddUri { location, .. } | Command::AddFile { location, .. } => {
                location.as_deref()
            }
            _ => None,
        }
    }

    pub fn file(&self) -> Option<&Bytes> {
        match self {
            Command::AddFile { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// True for `Login(then: Login(..))`, the one shape that could loop forever
    pub fn is_nested_login(&self) -> bool {
        matches!(self, Command::Login { then } if matches!(**then, Command::Login { .. }))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login { then } => write!(f, "login({then})"),
            Command::Fetch(FetchScope::All) => f.write_str("fetch(all)"),
            Command::AddUri { uri, .. } => write!(f, "addUri({uri})"),
            Command::AddFile { bytes, .. } => write!(f, "addFile({} bytes)", bytes.len()),
            other => write!(f, "{}({})", other.kind(), other.ids().join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_by_variant() {
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Command::Start(ids.clone()).ids(), ids.as_slice());
        assert_eq!(Command::Fetch(FetchScope::Some(ids.clone())).ids(), ids.as_slice());
        assert!(Command::fetch_all().ids().is_empty());
        assert!(Command::login(Command::Start(ids)).ids().is_empty());
    }

    #[test]
    fn test_nested_login_detection() {
        let single = Command::login(Command::fetch_all());
        let nested = Command::login(single.clone());

        assert!(!single.is_nested_login());
        assert!(nested.is_nested_login());
        assert!(!Command::fetch_all().is_nested_login());
    }

    #[test]
    fn test_payload_accessors() {
        let add = Command::AddUri {
            uri: "magnet:?xt=urn:btih:abc".to_string(),
            location: Some("/downloads".to_string()),
        };
        assert_eq!(add.uri(), Some("magnet:?xt=urn:btih:abc"));
        assert_eq!(add.location(), Some("/downloads"));
        assert!(add.file().is_none());

        let file = Command::AddFile {
            bytes: Bytes::from_static(b"d8:announce"),
            location: None,
        };
        assert_eq!(file.file().map(|b| b.len()), Some(11));
        assert!(file.location().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CommandKind::DeleteData.to_string(), "deleteData");
        assert_eq!(Command::fetch_all().kind(), CommandKind::Fetch);
        assert_eq!(CommandKind::ALL.len(), 9);
    }

    #[test]
    fn test_kind_deserializes_from_camel_case() {
        let kind: CommandKind = serde_json::from_str("\"addUri\"").unwrap();
        assert_eq!(kind, CommandKind::AddUri);
    }
}
