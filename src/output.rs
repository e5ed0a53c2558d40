use std::io::{self, Write};

use serde::Serialize;

use crate::aggregate::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print(output: &Output) -> io::Result<()> {
        Self::write(&mut io::stdout().lock(), output)
    }

    pub fn write<W: Write>(writer: &mut W, output: &Output) -> io::Result<()> {
        Self::write_json(writer, output)
    }

    fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// One line per deep-link, URL last so it can be cut out of an fzf selection.
pub struct TextOutput;

impl TextOutput {
    pub fn print(output: &Output) -> io::Result<()> {
        Self::write_errors(&mut io::stderr().lock(), output)?;
        Self::write_results(&mut io::stdout().lock(), output)
    }

    pub fn write_results<W: Write>(writer: &mut W, output: &Output) -> io::Result<()> {
        for value in &output.result {
            writeln!(
                writer,
                "{}: {} {}",
                value.account.name, value.profile.name, value.profile.url
            )?;
        }
        Ok(())
    }

    pub fn write_errors<W: Write>(writer: &mut W, output: &Output) -> io::Result<()> {
        for error in &output.errors {
            writeln!(writer, "{}: {}", error.account, error.response)?;
        }
        Ok(())
    }
}

pub fn print(output: &Output, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => TextOutput::print(output),
        OutputMode::Json => JsonOutput::print(output),
    }
}
