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

//! Implements the `encode` and `decode` commands.

use std::fmt::Write;
use std::fs;
use std::process;

use anyhow::{anyhow, Context, Result};
use env_logger::Env;
use log::{error, info};

use dnsupdate::message::{CompressionMode, Renderer};
use dnsupdate::update::{Mode, RrsetSection, UpdateMessage, UpdateSection};

use crate::args::{Args, Command, DecodeArgs, EncodeArgs};
use crate::config;

/// The largest DNS message that can be carried over TCP.
const MAX_MESSAGE_SIZE: usize = 65535;

/// Runs the command given by `args`.
pub fn run(args: Args) {
    env_logger::init_from_env(Env::new().default_filter_or("warn"));

    let result = match args.command {
        Command::Encode(encode_args) => encode(encode_args),
        Command::Decode(decode_args) => decode(decode_args),
    };
    if let Err(e) = result {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            let _ = write!(message, "\n[{}] {}", i + 1, cause);
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
}

////////////////////////////////////////////////////////////////////////
// ENCODING                                                           //
////////////////////////////////////////////////////////////////////////

fn encode(args: EncodeArgs) -> Result<()> {
    info!("Loading the request from {}.", args.request.display());
    let request = config::load_from_path(&args.request).context("failed to load the request")?;
    let compression = request.compression && !args.no_compression;
    let message = request
        .into_message()
        .context("failed to build the UPDATE message")?;

    let octets = encode_message(&message, compression)?;
    info!(
        "Encoded UPDATE request {} ({} octets).",
        message.id(),
        octets.len()
    );
    match args.output {
        Some(ref path) => fs::write(path, &octets)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", to_hex(&octets)),
    }
    Ok(())
}

fn encode_message(message: &UpdateMessage, compression: bool) -> Result<Vec<u8>> {
    let mut buf = vec![0; MAX_MESSAGE_SIZE];
    let mut renderer = Renderer::new(&mut buf, MAX_MESSAGE_SIZE)?;
    if !compression {
        renderer.set_compression_mode(CompressionMode::Disabled);
    }
    message
        .encode(&mut renderer)
        .context("failed to encode the UPDATE message")?;
    let len = renderer.finish();
    buf.truncate(len);
    Ok(buf)
}

fn to_hex(octets: &[u8]) -> String {
    let mut hex = String::with_capacity(2 * octets.len());
    for octet in octets {
        let _ = write!(hex, "{:02x}", octet);
    }
    hex
}

////////////////////////////////////////////////////////////////////////
// DECODING                                                           //
////////////////////////////////////////////////////////////////////////

fn decode(args: DecodeArgs) -> Result<()> {
    info!("Reading the response from {}.", args.file.display());
    let raw = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let octets = if args.hex {
        from_hex(&raw).context("failed to parse the response as hex")?
    } else {
        raw
    };

    let mut message = UpdateMessage::new(Mode::Parse);
    message
        .decode(&octets)
        .context("failed to decode the UPDATE message")?;
    print!("{}", summarize(&message));
    Ok(())
}

/// Converts hexadecimal text to octets. Whitespace is ignored.
fn from_hex(text: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(text).context("the input is not UTF-8")?;
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(anyhow!("odd number of hex digits"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).with_context(|| format!("invalid hex octet {:?}", pair))
        })
        .collect()
}

/// Renders a decoded message in a `dig`-like format.
fn summarize(message: &UpdateMessage) -> String {
    let mut text = format!(
        ";; ->>HEADER<<- opcode: UPDATE, status: {}, id: {}\n\
         ;; flags: qr; ZONE: {}, PREREQ: {}, UPDATE: {}, ADDITIONAL: {}\n",
        message.rcode(),
        message.id(),
        message.rr_count(UpdateSection::Zone),
        message.rr_count(UpdateSection::Prerequisite),
        message.rr_count(UpdateSection::Update),
        message.rr_count(UpdateSection::Additional),
    );
    if let Some(zone) = message.zone() {
        let _ = write!(text, "\n;; ZONE SECTION:\n;{}\n", zone);
    }
    for (title, section) in [
        ("PREREQUISITE", RrsetSection::Prerequisite),
        ("UPDATE", RrsetSection::Update),
        ("ADDITIONAL", RrsetSection::Additional),
    ] {
        let mut rrsets = message.rrsets(section).peekable();
        if rrsets.peek().is_some() {
            let _ = write!(text, "\n;; {} SECTION:\n", title);
            for rrset in rrsets {
                let _ = writeln!(text, "{}", rrset);
            }
        }
    }
    text
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use dnsupdate::class::Class;
    use dnsupdate::message::Rcode;
    use dnsupdate::rr::{Rrset, Ttl, Type};

    fn build_message() -> UpdateMessage {
        let mut message = UpdateMessage::new(Mode::Build);
        message.set_id(0x1234);
        message
            .set_zone("example.com.".parse().unwrap(), Class::IN)
            .unwrap();
        let mut rrset = Rrset::new(
            "www.example.com.".parse().unwrap(),
            Type::A,
            Class::IN,
            Ttl::from(300),
        );
        rrset.push_rdata(&config::parse_rdata(Class::IN, Type::A, "192.0.2.1").unwrap());
        message.add_rrset(RrsetSection::Update, rrset).unwrap();
        message
    }

    #[test]
    fn compression_can_be_disabled() {
        let message = build_message();
        let compressed = encode_message(&message, true).unwrap();
        let uncompressed = encode_message(&message, false).unwrap();
        // The owner shares example.com. with the zone.
        assert_eq!(uncompressed.len(), compressed.len() + 11);
        assert_eq!(compressed[..2], [0x12, 0x34]);
    }

    #[test]
    fn hex_conversion_works() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(from_hex(b"00 AB\n7f").unwrap(), [0x00, 0xab, 0x7f]);
        assert!(from_hex(b"abc").is_err());
        assert!(from_hex(b"zz").is_err());
    }

    #[test]
    fn summarize_shows_decoded_response() {
        let mut octets = encode_message(&build_message(), true).unwrap();
        // Turn the request into a YXDOMAIN response.
        octets[2] |= 0x80;
        octets[3] |= 6;
        let mut response = UpdateMessage::new(Mode::Parse);
        response.decode(&octets).unwrap();
        assert_eq!(response.rcode(), Rcode::YxDomain);

        let summary = summarize(&response);
        assert!(summary.starts_with(";; ->>HEADER<<- opcode: UPDATE, status: YXDOMAIN, id: 4660\n"));
        assert!(summary.contains("ZONE: 1, PREREQ: 0, UPDATE: 1, ADDITIONAL: 0"));
        assert!(summary.contains("\n;; ZONE SECTION:\n;example.com. IN SOA\n"));
        assert!(summary.contains("\n;; UPDATE SECTION:\nwww.example.com. 300 IN A \\# 4 c0000201\n"));
        assert!(!summary.contains("PREREQUISITE SECTION"));
    }
}
