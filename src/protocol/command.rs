//! Command definitions
//!
//! Represents commands from clients.

/// Command types, one per name in the command table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    Set,
    Get,
    Del,
}

impl CommandType {
    /// Every supported command
    pub const ALL: [CommandType; 3] = [CommandType::Set, CommandType::Get, CommandType::Del];

    /// Wire name of the command (case-sensitive)
    pub fn name(self) -> &'static str {
        match self {
            CommandType::Set => "SET",
            CommandType::Get => "GET",
            CommandType::Del => "DEL",
        }
    }

    /// Number of arguments the command requires
    pub fn arity(self) -> usize {
        match self {
            CommandType::Set => 2,
            CommandType::Get | CommandType::Del => 1,
        }
    }

    /// Look up a command by its exact wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert or overwrite a key
    Set { key: String, value: String },

    /// Get a value by key
    Get { key: String },

    /// Delete a key
    Del { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Del { .. } => CommandType::Del,
        }
    }

    /// The key the command operates on
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. } | Command::Get { key } | Command::Del { key } => key,
        }
    }
}
