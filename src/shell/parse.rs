use thiserror::Error;

use crate::shell::command::{
    Command, CREATE_USAGE, DELETE_USAGE, DUMP_USAGE, READ_USAGE, RESIZE_USAGE, WRITE_USAGE,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command '{0}'. Type 'help' for command list.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("{what} must be an integer, got '{value}'")]
    Number { what: &'static str, value: String },
    #[error("Missing closing double quote in write data")]
    UnterminatedQuote,
}

/// 把一行输入解析成命令，关键字不区分大小写
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let (keyword, rest) = split_token(input.trim());
    let args: Vec<&str> = rest.split_ascii_whitespace().collect();

    match keyword.to_ascii_uppercase().as_str() {
        "HELP" => Ok(Command::Help),
        "LIST" | "LS" => Ok(Command::List),
        "STATUS" => Ok(Command::Status),
        "MAP" => Ok(Command::Map),
        "CHECK" => Ok(Command::Check),
        "CONFIG" => Ok(Command::Config),
        "FORMAT" => Ok(Command::Format),
        "EXIT" | "QUIT" => Ok(Command::Exit),
        "CREATE" => match args.as_slice() {
            [name, size] => Ok(Command::Create {
                name: name.to_string(),
                size: number("size", size)?,
            }),
            _ => Err(ParseError::Usage(CREATE_USAGE)),
        },
        "WRITE" => parse_write(rest),
        "READ" => match args.as_slice() {
            [name, offset, length] => Ok(Command::Read {
                name: name.to_string(),
                offset: number("offset", offset)?,
                length: number("length", length)?,
            }),
            _ => Err(ParseError::Usage(READ_USAGE)),
        },
        "DELETE" | "RM" => match args.as_slice() {
            [name] => Ok(Command::Delete(name.to_string())),
            _ => Err(ParseError::Usage(DELETE_USAGE)),
        },
        "RESIZE" | "REALLOC" => match args.as_slice() {
            [name, size] => Ok(Command::Resize {
                name: name.to_string(),
                size: number("size", size)?,
            }),
            _ => Err(ParseError::Usage(RESIZE_USAGE)),
        },
        "DUMP" => match args.as_slice() {
            [block] => Ok(Command::Dump(number("block", block)?)),
            _ => Err(ParseError::Usage(DUMP_USAGE)),
        },
        _ => Err(ParseError::Unknown(keyword.to_string())),
    }
}

// WRITE <name> <offset> "<data>"：引号内可以有空格，没有引号时取剩余整段
fn parse_write(rest: &str) -> Result<Command, ParseError> {
    let (name, rest) = split_token(rest);
    let (offset, rest) = split_token(rest);
    if name.is_empty() || offset.is_empty() {
        return Err(ParseError::Usage(WRITE_USAGE));
    }
    let offset = number("offset", offset)?;

    let data = match rest.strip_prefix('"') {
        Some(quoted) => match quoted.find('"') {
            Some(end) => &quoted[..end],
            None => return Err(ParseError::UnterminatedQuote),
        },
        None if rest.is_empty() => return Err(ParseError::Usage(WRITE_USAGE)),
        None => rest,
    };

    Ok(Command::Write {
        name: name.to_string(),
        offset,
        data: data.to_string(),
    })
}

fn split_token(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (input, ""),
    }
}

fn number(what: &'static str, value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| ParseError::Number {
        what,
        value: value.to_string(),
    })
}
