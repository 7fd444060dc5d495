//! Protocol Module
//!
//! Defines the text protocol for client-server communication.
//!
//! ## Request Format
//! ```text
//! <COMMAND> <arg> [<arg>]
//! ```
//! Tokens are separated by single spaces. There is no quoting or escaping,
//! so an argument can never contain a space. Each request is one write
//! and each response one write, with no terminator; see `codec` for
//! how reads are framed.
//!
//! ### Commands
//! - `SET key value` - 2 arguments
//! - `GET key`       - 1 argument
//! - `DEL key`       - 1 argument
//!
//! ## Response Format
//! ```text
//! [<kind>]
//! [<kind>] <payload>
//! ```
//!
//! ### Outcome Kinds
//! - `ok`             - payload is the value, if any
//! - `not_found`      - payload is the error message
//! - `parse_error`    - payload is the error message
//! - `internal_error` - payload is the error message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Kind, Response};
pub use codec::{
    parse_command, render_response,
    read_request, write_request,
    read_response, write_response,
};
