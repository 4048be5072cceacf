//! # Formslate CLI
//!
//! Usage:
//!   formslate fields.json -d out/
//!   echo '{ "firstName": "Ann" }' | formslate
//!   formslate fields.json --config config.json
//!   formslate --example > fields.json
//!
//! The document is always written as `header-example.pdf` inside the output
//! directory (default: the current directory). Set `RUST_LOG=debug` to trace
//! the layout.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use formslate::model::FormConfig;
use formslate::pdf::PdfBackend;
use formslate::{Bootstrap, FieldValues, FormslateError, Generator};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_fields_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn run(args: &[String]) -> Result<(), FormslateError> {
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };
    let fields: FieldValues = serde_json::from_str(&input)?;

    let config = match flag_value(args, "--config") {
        Some(path) => serde_json::from_str::<FormConfig>(&fs::read_to_string(path)?)?,
        None => FormConfig::default(),
    };
    let output_dir = flag_value(args, "-d").unwrap_or(".");

    let mut bootstrap = Bootstrap::new();
    bootstrap.load_with(|| PdfBackend::load(output_dir))?;
    let generator = Generator::new(bootstrap, config);

    let name = generator.generate(&fields)?;
    eprintln!("✓ Written {}/{}", output_dir.trim_end_matches('/'), name);
    Ok(())
}

fn example_fields_json() -> &'static str {
    r##"{
  "firstName": "Ann",
  "lastName": "Lee",
  "middleInitial": "B",
  "dateOfBirth": "01/02/1980",
  "ssnLast4": "1234"
}
"##
}
