// Copyright 2023 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// Encode and decode DNS UPDATE messages
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and encode an UPDATE request
    Encode(EncodeArgs),

    /// Decode an UPDATE response
    Decode(DecodeArgs),
}

#[derive(Debug, Parser)]
pub struct EncodeArgs {
    /// The TOML file describing the request
    #[clap(value_name = "REQUEST.toml")]
    pub request: PathBuf,

    /// Write the raw message to a file instead of printing it as hex
    #[clap(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Disable name compression, whatever the request file says
    #[clap(long)]
    pub no_compression: bool,
}

#[derive(Debug, Parser)]
pub struct DecodeArgs {
    /// The file holding the response
    #[clap(value_name = "FILE")]
    pub file: PathBuf,

    /// Read the response as hexadecimal text rather than raw octets
    #[clap(long)]
    pub hex: bool,
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_accepts_output_and_compression_flags() {
        let args = Args::try_parse_from([
            "dnsupdate",
            "encode",
            "request.toml",
            "--output",
            "out.bin",
            "--no-compression",
        ])
        .unwrap();
        match args.command {
            Command::Encode(encode_args) => {
                assert_eq!(encode_args.request, PathBuf::from("request.toml"));
                assert_eq!(encode_args.output, Some(PathBuf::from("out.bin")));
                assert!(encode_args.no_compression);
            }
            _ => panic!("expected the encode command"),
        }
    }

    #[test]
    fn decode_requires_a_file() {
        assert!(Args::try_parse_from(["dnsupdate", "decode", "--hex"]).is_err());
        let args = Args::try_parse_from(["dnsupdate", "decode", "response.hex", "--hex"]).unwrap();
        assert!(matches!(args.command, Command::Decode(DecodeArgs { hex: true, .. })));
    }
}
