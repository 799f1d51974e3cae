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

//! Implements the request description file read by `dnsupdate encode`.
//!
//! A request is a TOML document naming the zone to update and listing
//! the RRsets of the prerequisite, update, and additional sections:
//!
//! ```toml
//! id = 4660
//!
//! [zone]
//! name = "example.com."
//!
//! [[prerequisite]]
//! name = "www.example.com."
//! type = "A"
//! class = "NONE"
//!
//! [[update]]
//! name = "www.example.com."
//! type = "A"
//! ttl = 3600
//! rdata = ["192.0.2.1", "192.0.2.2"]
//! ```

use std::fmt::{self, Write};
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use log::Level::Debug;
use log::{debug, log_enabled, warn};
use paste::paste;
use serde::{de, Deserialize};

use dnsupdate::class::Class;
use dnsupdate::name::Name;
use dnsupdate::rr::rdata::{ipv6, srv, std13};
use dnsupdate::rr::{Rdata, Rrset, Ttl, Type};
use dnsupdate::update::{Mode, RrsetSection, UpdateMessage};

////////////////////////////////////////////////////////////////////////
// REQUEST LOADING                                                    //
////////////////////////////////////////////////////////////////////////

/// Loads the request description from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Request> {
    let raw_request =
        fs::read_to_string(path.as_ref()).context("failed to read the request file")?;
    let request: Request =
        toml::from_str(&raw_request).context("failed to parse the request file")?;
    log_request_summary(&request);
    Ok(request)
}

/// Summarizes the request in the log, if the debug log level is
/// enabled.
fn log_request_summary(request: &Request) {
    if !log_enabled!(Debug) {
        return;
    }

    let id = match request.id {
        Some(id) => id.to_string(),
        None => String::from("random"),
    };
    let mut message = format!(
        "Request loaded:\n\
         ID:          {}\n\
         Compression: {}\n\
         Zone:        {}/{}",
        id,
        if request.compression { "on" } else { "off" },
        request.zone.name.0,
        request.zone.class.0,
    );
    for (title, rrsets) in [
        ("Prerequisites", &request.prerequisite),
        ("Updates", &request.update),
        ("Additional", &request.additional),
    ] {
        let _ = write!(message, "\n{:<13}{}", format!("{}:", title), rrsets.len());
        for rrset in rrsets {
            let _ = write!(
                message,
                "\n  {}/{}/{} ({} RDATA)",
                rrset.name.0,
                rrset.class.0,
                rrset.rr_type.0,
                rrset.rdata.len(),
            );
        }
    }
    debug!("{}", message);
}

////////////////////////////////////////////////////////////////////////
// REQUEST FILE STRUCTURE                                             //
////////////////////////////////////////////////////////////////////////

/// The complete request file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub id: Option<u16>,
    #[serde(default = "default_compression")]
    pub compression: bool,
    pub zone: ZoneConfig,
    #[serde(default)]
    pub prerequisite: Vec<RrsetConfig>,
    #[serde(default)]
    pub update: Vec<RrsetConfig>,
    #[serde(default)]
    pub additional: Vec<RrsetConfig>,
}

fn default_compression() -> bool {
    true
}

/// The zone named by a request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub name: ConfigName,
    #[serde(default = "default_class")]
    pub class: ConfigClass,
}

/// A single RRset of a request. An empty `rdata` list describes an
/// RRset without RDATA, as used by most prerequisites and deletions.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RrsetConfig {
    pub name: ConfigName,
    #[serde(rename = "type")]
    pub rr_type: ConfigType,
    #[serde(default = "default_class")]
    pub class: ConfigClass,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub rdata: Vec<String>,
}

fn default_class() -> ConfigClass {
    ConfigClass(Class::IN)
}

impl Request {
    /// Builds the [`UpdateMessage`] this request describes.
    pub fn into_message(self) -> Result<UpdateMessage> {
        let mut message = UpdateMessage::new(Mode::Build);
        message.set_id(self.id.unwrap_or_else(UpdateMessage::generate_id));
        let (zone_name, zone_class) = (self.zone.name.0, self.zone.class.0);
        message.set_zone(zone_name.clone(), zone_class)?;

        for (section, rrset_configs) in [
            (RrsetSection::Prerequisite, self.prerequisite),
            (RrsetSection::Update, self.update),
            (RrsetSection::Additional, self.additional),
        ] {
            for rrset_config in rrset_configs {
                let rrset = rrset_config.into_rrset(&zone_name, zone_class).with_context(|| {
                    format!("invalid RRset in the {} section", section_name(section))
                })?;
                message.add_rrset(section, rrset)?;
            }
        }
        Ok(message)
    }
}

impl RrsetConfig {
    fn into_rrset(self, zone_name: &Name, zone_class: Class) -> Result<Rrset> {
        let owner = self.name.0;
        let (rr_type, class, ttl) = (self.rr_type.0, self.class.0, Ttl::from(self.ttl));
        if ttl.exceeds_signed_range() {
            warn!(
                "The TTL of {} {} {} is {}, which exceeds 2^31 - 1; many servers treat it as zero.",
                owner, class, rr_type, self.ttl,
            );
        }
        if !owner.eq_or_subdomain_of(zone_name) {
            warn!("{} is not within the zone {}.", owner, zone_name);
        }

        // Deleting a single RR (class NONE) uses the zone's RDATA format.
        let rdata_class = if class == Class::NONE { zone_class } else { class };
        let mut rrset = Rrset::new(owner, rr_type, class, ttl);
        for text in &self.rdata {
            let rdata = parse_rdata(rdata_class, rr_type, text)
                .with_context(|| format!("invalid RDATA for {} {}: {:?}", class, rr_type, text))?;
            rrset.push_rdata(&rdata);
        }
        Ok(rrset)
    }
}

fn section_name(section: RrsetSection) -> &'static str {
    match section {
        RrsetSection::Prerequisite => "prerequisite",
        RrsetSection::Update => "update",
        RrsetSection::Additional => "additional",
    }
}

////////////////////////////////////////////////////////////////////////
// RDATA TEXT FORMATS                                                 //
////////////////////////////////////////////////////////////////////////

/// Parses the textual RDATA `text` of a `class`/`rr_type` record.
///
/// The generic form `\# <length> <hex>` of [RFC 3597 § 5] is accepted
/// for every type. Otherwise, the types that `dnsupdate` understands
/// use their usual presentation formats (without quoting or escapes),
/// and everything else must use the generic form.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
pub fn parse_rdata(class: Class, rr_type: Type, text: &str) -> Result<Box<Rdata>> {
    let text = text.trim();
    if text.starts_with("\\#") {
        return text
            .parse()
            .map_err(|e| anyhow!("invalid generic RDATA: {}", e));
    }

    let mut fields = text.split_ascii_whitespace();
    let mut buf = Vec::new();
    match rr_type {
        Type::A if class == Class::IN => {
            std13::serialize_a(parse_field::<Ipv4Addr>(&mut fields, "IPv4 address")?, &mut buf);
        }
        Type::AAAA if class == Class::IN => {
            ipv6::serialize_aaaa(parse_field::<Ipv6Addr>(&mut fields, "IPv6 address")?, &mut buf);
        }
        Type::NS | Type::MD | Type::MF | Type::CNAME | Type::MB | Type::MG | Type::MR | Type::PTR => {
            std13::serialize_name(&parse_field::<Box<Name>>(&mut fields, "domain name")?, &mut buf);
        }
        Type::MX => {
            let preference = parse_field(&mut fields, "preference")?;
            let exchange: Box<Name> = parse_field(&mut fields, "exchange")?;
            std13::serialize_mx(preference, &exchange, &mut buf);
        }
        Type::SOA => {
            let mname: Box<Name> = parse_field(&mut fields, "MNAME")?;
            let rname: Box<Name> = parse_field(&mut fields, "RNAME")?;
            std13::serialize_soa(
                &mname,
                &rname,
                parse_field(&mut fields, "serial")?,
                parse_field(&mut fields, "refresh")?,
                parse_field(&mut fields, "retry")?,
                parse_field(&mut fields, "expire")?,
                parse_field(&mut fields, "minimum")?,
                &mut buf,
            );
        }
        Type::SRV if class == Class::IN => {
            let priority = parse_field(&mut fields, "priority")?;
            let weight = parse_field(&mut fields, "weight")?;
            let port = parse_field(&mut fields, "port")?;
            let target: Box<Name> = parse_field(&mut fields, "target")?;
            srv::serialize_srv(priority, weight, port, &target, &mut buf);
        }
        Type::DHCID => {
            // Base64 may be split across whitespace.
            let encoded: String = fields.by_ref().collect();
            buf = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .context("invalid base64")?;
        }
        _ => bail!(
            "{} {} RDATA must use the generic \\# form",
            class,
            rr_type,
        ),
    }

    if fields.next().is_some() {
        bail!("unexpected trailing fields");
    }
    Box::<Rdata>::try_from(buf).map_err(Into::into)
}

/// Parses the next whitespace-separated field of RDATA text.
fn parse_field<'a, T>(fields: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let field = fields
        .next()
        .ok_or_else(|| anyhow!("missing {}", what))?;
    field
        .parse()
        .map_err(|e| anyhow!("invalid {} {:?}: {}", what, field, e))
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER DNSUPDATE TYPES FOR SERDE                            //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`dnsupdate`], using its [`FromStr`] implementation.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $description:literal) => {
        /// A macro-generated deserializable wrapper over a [`dnsupdate`]
        /// type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse()
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Box<Name>, "domain name");
make_serde_wrapper!(ConfigClass, Class, "DNS class");
make_serde_wrapper!(ConfigType, Type, "RR type");

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use dnsupdate::update::UpdateSection;

    const REQUEST: &str = r#"
        id = 4660

        [zone]
        name = "example.com."

        [[prerequisite]]
        name = "www.example.com."
        type = "A"
        class = "NONE"

        [[update]]
        name = "www.example.com."
        type = "A"
        ttl = 3600
        rdata = ["192.0.2.1", "192.0.2.2"]

        [[update]]
        name = "mail.example.com."
        type = "MX"
        class = "ANY"
    "#;

    #[test]
    fn request_builds_message() {
        let request: Request = toml::from_str(REQUEST).unwrap();
        assert!(request.compression);
        let message = request.into_message().unwrap();
        assert_eq!(message.id(), 4660);
        let zone = message.zone().unwrap();
        assert_eq!(zone.name, "example.com.".parse().unwrap());
        assert_eq!(zone.class, Class::IN);
        assert_eq!(message.rr_count(UpdateSection::Zone), 1);
        assert_eq!(message.rr_count(UpdateSection::Prerequisite), 1);
        assert_eq!(message.rr_count(UpdateSection::Update), 3);
        assert_eq!(message.rr_count(UpdateSection::Additional), 0);

        let updates: Vec<&Rrset> = message.rrsets(RrsetSection::Update).collect();
        assert_eq!(updates[0].ttl, Ttl::from(3600));
        assert_eq!(
            updates[0].rdatas().map(Rdata::octets).collect::<Vec<_>>(),
            vec![&[192u8, 0, 2, 1][..], &[192u8, 0, 2, 2][..]],
        );
        assert_eq!(updates[1].class, Class::ANY);
        assert_eq!(updates[1].rdata_count(), 0);
    }

    #[test]
    fn request_deletes_single_rr_with_class_none() {
        let text = "[zone]\nname = \"example.com.\"\n\
                    [[update]]\nname = \"www.example.com.\"\ntype = \"A\"\n\
                    class = \"NONE\"\nrdata = [\"192.0.2.1\"]\n\
                    [[update]]\nname = \"www.example.com.\"\ntype = \"AAAA\"\n\
                    class = \"NONE\"\nrdata = [\"2001:db8::1\"]\n";
        let request: Request = toml::from_str(text).unwrap();
        let message = request.into_message().unwrap();
        let updates: Vec<&Rrset> = message.rrsets(RrsetSection::Update).collect();
        assert_eq!(updates[0].class, Class::NONE);
        assert_eq!(updates[0].ttl, Ttl::from(0));
        assert_eq!(
            updates[0].rdatas().map(Rdata::octets).collect::<Vec<_>>(),
            vec![&[192u8, 0, 2, 1][..]],
        );
        assert_eq!(updates[1].class, Class::NONE);
        assert_eq!(updates[1].rdatas().next().map(Rdata::len), Some(16));
    }

    #[test]
    fn request_rejects_unknown_fields() {
        let text = "[zone]\nname = \"example.com.\"\nbogus = 1\n";
        assert!(toml::from_str::<Request>(text).is_err());
    }

    #[test]
    fn request_rejects_invalid_names() {
        let text = "[zone]\nname = \"example..com.\"\n";
        assert!(toml::from_str::<Request>(text).is_err());
    }

    #[test]
    fn request_reports_invalid_rdata() {
        let text = "[zone]\nname = \"example.com.\"\n\
                    [[update]]\nname = \"example.com.\"\ntype = \"A\"\nrdata = [\"bogus\"]\n";
        let request: Request = toml::from_str(text).unwrap();
        assert!(request.into_message().is_err());
    }

    #[test]
    fn parse_rdata_handles_known_formats() {
        let exchange: Box<Name> = "mx.example.com.".parse().unwrap();
        let mut expected = vec![0, 10];
        expected.extend_from_slice(exchange.wire_repr());
        assert_eq!(
            parse_rdata(Class::IN, Type::MX, "10 mx.example.com.")
                .unwrap()
                .octets(),
            &expected[..],
        );

        let aaaa = parse_rdata(Class::IN, Type::AAAA, "2001:db8::1").unwrap();
        assert_eq!(aaaa.len(), 16);
        assert_eq!(aaaa.octets()[..2], [0x20, 0x01]);

        let mut expected = vec![0, 1, 0, 2, 0x01, 0xbb];
        expected.extend_from_slice(exchange.wire_repr());
        assert_eq!(
            parse_rdata(Class::IN, Type::SRV, "1 2 443 mx.example.com.")
                .unwrap()
                .octets(),
            &expected[..],
        );

        let soa = parse_rdata(
            Class::IN,
            Type::SOA,
            "ns.example.com. admin.example.com. 1 7200 3600 1209600 300",
        )
        .unwrap();
        assert_eq!(soa.len(), 16 + 19 + 20);
        assert_eq!(soa.octets()[35..39], [0, 0, 0, 1]);
    }

    #[test]
    fn parse_rdata_handles_dhcid_and_generic() {
        assert_eq!(
            parse_rdata(Class::IN, Type::DHCID, "AAIB y2/AuCccgoJbsaxcQc9TUapptP69l OjxfNuVAA2kjEA=")
                .unwrap()
                .len(),
            35,
        );
        assert_eq!(
            parse_rdata(Class::IN, Type::TXT, "\\# 3 026869").unwrap().octets(),
            b"\x02hi",
        );
        assert!(parse_rdata(Class::IN, Type::TXT, "hi").is_err());
    }

    #[test]
    fn parse_rdata_rejects_bad_field_counts() {
        assert!(parse_rdata(Class::IN, Type::A, "").is_err());
        assert!(parse_rdata(Class::IN, Type::A, "192.0.2.1 192.0.2.2").is_err());
        assert!(parse_rdata(Class::IN, Type::MX, "10").is_err());
        assert!(parse_rdata(Class::IN, Type::NS, "relative").is_err());
    }
}
