use ctxhpsf::{
    CodecOptions, DocumentSummaryInformation, HpsfError, PropertySet, PropertySetKind,
    SummaryInformation,
};
use std::fs::File;
use std::io::{self, Read, Write};
use tracing_subscriber::prelude::*;

fn usage(me: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("{} <stream>", me);
    eprintln!("  Prints the property set stored in <stream>");
    eprintln!("{} <stream> --json", me);
    eprintln!("  Dumps the property set stored in <stream> as JSON");
    eprintln!("{} <stream> --rewrite <output>", me);
    eprintln!("  Parses <stream> and writes it back to <output>");
    eprintln!();
    eprintln!("Options are read from hpsf.toml and HPSF__* environment variables");
    std::process::exit(1);
}

fn print_sections(ps: &PropertySet) {
    println!(
        "Format {}, OS version {:08x}, CLSID {}",
        ps.format(),
        ps.os_version(),
        ps.class_id()
    );
    for (n, section) in ps.sections().iter().enumerate() {
        match section.format_id() {
            Some(fmtid) => println!("Section {n} ({fmtid}):"),
            None => println!("Section {n}:"),
        }
        if let Some(cp) = section.codepage() {
            println!("  Codepage: {cp}");
        }
        for p in section.properties() {
            match section.pid_name(p.id) {
                Some(name) => println!("  {name}: {}", p.value),
                None => println!("  0x{:08x}: {}", p.id, p.value),
            }
        }
    }
}

fn print_summary(si: &SummaryInformation) {
    println!("SummaryInformation:");
    for (name, get) in SummaryInformation::FIELDS {
        if let Some(v) = get(si) {
            println!("  {name}: {v}");
        }
    }
}

fn print_doc_summary(dsi: &DocumentSummaryInformation) {
    println!("DocumentSummaryInformation:");
    if let Some(company) = dsi.company() {
        println!("  company: {company}");
    }
    if let Some(manager) = dsi.manager() {
        println!("  manager: {manager}");
    }
    if let Some((major, minor)) = dsi.application_version() {
        println!("  application version: {major}.{minor}");
    }
    if let Some(hp) = dsi.headings_parts() {
        for (heading, parts) in hp {
            println!("  {heading}: {}", parts.join(", "));
        }
    }
    if let Some(custom) = dsi.custom_properties() {
        if !custom.is_pure() {
            println!("  Warning: the user defined properties are not uniquely named");
        }
        for (name, value) in custom.iter() {
            println!("  [custom] {name}: {value}");
        }
    }
}

fn main() -> Result<(), HpsfError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if !(2..=4).contains(&args.len())
        || (args.len() == 3 && args[2] != "--json")
        || (args.len() == 4 && args[2] != "--rewrite")
    {
        usage(&args[0]);
    }

    let options = CodecOptions::load().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        e
    })?;

    let fname = &args[1];
    let mut data = Vec::new();
    File::open(fname)
        .and_then(|mut f| f.read_to_end(&mut data))
        .map_err(|e| {
            eprintln!("Failed to read {}: {}", fname, e);
            HpsfError::Io(e)
        })?;
    if !PropertySet::is_property_set_stream(&data) {
        eprintln!("{} is not a property set stream", fname);
        std::process::exit(1);
    }
    let kind = PropertySetKind::from_bytes(&data, &options).map_err(|e| {
        eprintln!("Failed to parse {}: {}", fname, e);
        e
    })?;
    let ps = kind.property_set();

    let anomalies = ps.anomalies();
    if !anomalies.is_empty() {
        eprintln!("Warning: the following defects were encountered");
        for an in anomalies {
            eprintln!("  - {}", an);
        }
    }

    if args.len() == 2 {
        println!("{}", kind.name());
        print_sections(ps);
        match &kind {
            PropertySetKind::Summary(si) => print_summary(si),
            PropertySetKind::DocumentSummary(dsi) => print_doc_summary(dsi),
            PropertySetKind::Generic(_) => {}
        }
    } else if args[2] == "--json" {
        let json = serde_json::to_string_pretty(ps).map_err(|e| {
            eprintln!("Failed to serialize: {}", e);
            HpsfError::Io(e.into())
        })?;
        println!("{json}");
    } else {
        let out = ps.to_bytes().map_err(|e| {
            eprintln!("Failed to serialize: {}", e);
            e
        })?;
        let mut writer: Box<dyn Write> = match args[3].as_str() {
            "-" => Box::new(io::stdout()),
            outf => Box::new(File::create(outf).map_err(|e| {
                eprintln!("Failed to create output file: {e}");
                HpsfError::Io(e)
            })?),
        };
        writer.write_all(&out).map_err(|e| {
            eprintln!("Failed to write output file: {e}");
            HpsfError::Io(e)
        })?;
        if PropertySet::parse_with(&out, &options)? != *ps {
            eprintln!("Warning: the rewritten property set differs from the original");
        }
    }
    Ok(())
}
