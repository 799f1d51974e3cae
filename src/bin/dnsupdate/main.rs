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

//! The `dnsupdate` command-line tool, which builds [RFC 2136] UPDATE
//! requests from TOML descriptions and decodes UPDATE responses.
//!
//! [RFC 2136]: https://datatracker.ietf.org/doc/html/rfc2136

mod args;
mod config;
mod run;

fn main() {
    run::run(args::parse());
}
