//
// Copyright (c) The netconfd Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

//! `ncxpath`: the CLI surface of the test harness (`spec.md` §6 "CLI
//! surface").

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::{App, Arg};

use netconf_xml::document::Document;
use netconf_xml::namespace::{self, Nsc};
use netconf_xpath::{canonicalize, eval, parse, EvalContext, Value};
use netconf_yang::loader;
use netconf_yang::YangSpec;

fn main() -> ExitCode {
    let matches = App::new("ncxpath")
        .version(clap::crate_version!())
        .about("Evaluates an XPath 1.0 expression against an XML configuration tree")
        .arg(Arg::with_name("file").short("f").long("file").takes_value(true))
        .arg(Arg::with_name("xpath").short("p").long("xpath").takes_value(true))
        .arg(Arg::with_name("initial").short("i").long("initial").takes_value(true))
        .arg(
            Arg::with_name("namespace")
                .short("n")
                .long("namespace")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(Arg::with_name("canonicalize").short("c").long("canonicalize"))
        .arg(Arg::with_name("yang").short("y").long("yang").takes_value(true))
        .get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("ncxpath: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), String> {
    let (xml_text, xpath_text) = read_inputs(matches)?;

    let (doc, root) = netconf_xml::parser::parse(&xml_text).map_err(|e| e.to_string())?;

    let mut nsc: Nsc = namespace::context_at(&doc, root);
    if let Some(values) = matches.values_of("namespace") {
        for entry in values {
            let (prefix, uri) = entry
                .split_once(':')
                .ok_or_else(|| format!("malformed -n value {entry:?}, expected prefix:uri"))?;
            nsc.insert(Some(prefix.to_string()), uri.to_string());
        }
    }

    let spec = match matches.value_of("yang") {
        Some(path) => Some(load_yang(path)?),
        None => None,
    };

    let mut context_node = root;
    if let Some(initial) = matches.value_of("initial") {
        let expr = parse(initial).map_err(|e| e.to_string())?;
        let ctx = EvalContext::new(&doc, context_node, &nsc);
        let value = eval(&expr, &ctx).map_err(|e| e.to_string())?;
        match value {
            Value::Nodeset(nodes) => {
                context_node = *nodes
                    .first()
                    .ok_or_else(|| "-i expression matched no nodes".to_string())?;
            }
            _ => return Err("-i expression did not evaluate to a nodeset".to_string()),
        }
    }

    let expr = parse(&xpath_text).map_err(|e| e.to_string())?;
    let (expr, nsc) = if matches.is_present("canonicalize") {
        let spec = spec
            .as_ref()
            .ok_or_else(|| "-c requires -y to supply the YANG module set".to_string())?;
        canonicalize(&expr, &nsc, spec).map_err(|e| e.to_string())?
    } else {
        (expr, nsc)
    };

    let ctx = EvalContext::new(&doc, context_node, &nsc);
    let value = eval(&expr, &ctx).map_err(|e| e.to_string())?;
    print_value(&doc, &value);
    Ok(())
}

fn read_inputs(matches: &clap::ArgMatches) -> Result<(String, String), String> {
    let xpath_arg = matches.value_of("xpath").map(str::to_string);
    let file_arg = matches.value_of("file");

    match (file_arg, xpath_arg) {
        (Some(path), Some(xpath)) => {
            let xml = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            Ok((xml, xpath))
        }
        (Some(path), None) => {
            let xml = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            let mut first_line = String::new();
            std::io::stdin()
                .read_line(&mut first_line)
                .map_err(|e| e.to_string())?;
            Ok((xml, first_line.trim_end().to_string()))
        }
        (None, Some(xpath)) => {
            let mut xml = String::new();
            std::io::stdin().read_to_string(&mut xml).map_err(|e| e.to_string())?;
            Ok((xml, xpath))
        }
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| e.to_string())?;
            let mut lines = buf.splitn(2, '\n');
            let xpath = lines.next().unwrap_or_default().trim_end().to_string();
            let xml = lines.next().unwrap_or_default().to_string();
            Ok((xml, xpath))
        }
    }
}

fn load_yang(path: &str) -> Result<YangSpec, String> {
    let path = Path::new(path);
    if path.is_dir() {
        loader::load_dir(path).map_err(|e| e.to_string())
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut spec = YangSpec::default();
        loader::load_str(&mut spec, &text).map_err(|e| e.to_string())?;
        Ok(spec)
    }
}

fn print_value(doc: &Document, value: &Value) {
    match value {
        Value::Nodeset(nodes) => {
            for node in nodes {
                println!(
                    "{}",
                    netconf_xml::encode::to_string(doc, *node, netconf_xml::encode::DEPTH_UNBOUNDED, true)
                );
            }
        }
        other => println!("{}", other.to_string_value(doc)),
    }
}
