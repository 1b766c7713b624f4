use std::{env, path::PathBuf, process::ExitCode};

use openapi_zod::naming::NamingConvention;
use openapi_zod::{generate_from_path, graph::resolve_order, openapi::parse_document_from_path};
use openapi_zod::GeneratorConfig;

#[derive(Debug, Default)]
struct GenerateOptions {
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    schema_naming: Option<NamingConvention>,
    type_naming: Option<NamingConvention>,
    no_export_schema: bool,
    no_export_type: bool,
    warnings_json: bool,
}

impl GenerateOptions {
    /// Config file first, then flag overrides.
    fn resolve_config(&self) -> Result<GeneratorConfig, String> {
        let mut config = match &self.config_path {
            Some(path) => GeneratorConfig::from_path(path).map_err(|e| e.to_string())?,
            None => GeneratorConfig::default(),
        };
        if let Some(name) = self.schema_naming {
            config.schema.name = name;
        }
        if let Some(name) = self.type_naming {
            config.types.name = name;
        }
        if self.no_export_schema {
            config.schema.export = false;
        }
        if self.no_export_type {
            config.types.export = false;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    if args.len() < 3 {
        return Err("not enough arguments".to_string());
    }

    let command = args[1].as_str();
    let file = PathBuf::from(&args[2]);

    match command {
        "generate" => {
            let options = parse_generate_options(&args[3..])?;
            run_generate(&file, &options)
        }
        "order" => {
            if let Some(extra) = args.get(3) {
                return Err(format!("unknown option '{extra}'"));
            }
            run_order(&file)
        }
        _ => Err(format!("unknown command '{command}'")),
    }
}

fn run_generate(file: &PathBuf, options: &GenerateOptions) -> Result<(), String> {
    let config = options.resolve_config()?;
    let module = generate_from_path(file, &config).map_err(|e| e.to_string())?;
    if options.warnings_json {
        eprintln!("{}", module.warnings_json().map_err(|e| e.to_string())?);
    } else {
        for warning in &module.warnings {
            eprintln!("warning: {warning}");
        }
    }

    match &options.output {
        Some(path) => module
            .write_to(path)
            .map_err(|e| format!("failed to write output: {e}")),
        None => {
            print!("{}", module.code);
            Ok(())
        }
    }
}

fn run_order(file: &PathBuf) -> Result<(), String> {
    let document = parse_document_from_path(file).map_err(|e| e.to_string())?;
    for name in resolve_order(&document.schemas) {
        println!("{name}");
    }
    Ok(())
}

fn parse_generate_options(args: &[String]) -> Result<GenerateOptions, String> {
    let mut options = GenerateOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                options.config_path = Some(PathBuf::from(option_value(args, i, "--config")?));
                i += 2;
            }
            "--output" => {
                options.output = Some(PathBuf::from(option_value(args, i, "--output")?));
                i += 2;
            }
            "--schema-naming" => {
                options.schema_naming = Some(parse_naming(option_value(args, i, "--schema-naming")?)?);
                i += 2;
            }
            "--type-naming" => {
                options.type_naming = Some(parse_naming(option_value(args, i, "--type-naming")?)?);
                i += 2;
            }
            "--no-export-schema" => {
                options.no_export_schema = true;
                i += 1;
            }
            "--no-export-type" => {
                options.no_export_type = true;
                i += 1;
            }
            "--warnings-json" => {
                options.warnings_json = true;
                i += 1;
            }
            other => return Err(format!("unknown option '{other}'")),
        }
    }

    Ok(options)
}

fn option_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_naming(value: &str) -> Result<NamingConvention, String> {
    NamingConvention::parse(value).ok_or_else(|| {
        format!("invalid naming convention '{value}' (expected PascalCase or camelCase)")
    })
}

fn print_usage() {
    eprintln!("usage:");
    eprintln!("  openapi-zod generate <openapi.json> [--config <file>] [--output <file.ts>]");
    eprintln!("                       [--schema-naming PascalCase|camelCase] [--type-naming PascalCase|camelCase]");
    eprintln!("                       [--no-export-schema] [--no-export-type] [--warnings-json]");
    eprintln!("  openapi-zod order <openapi.json>");
    eprintln!();
    eprintln!("config file (JSON, all fields optional):");
    eprintln!("  {{ \"schema\": {{ \"name\": \"PascalCase\", \"export\": true }},");
    eprintln!("    \"type\": {{ \"name\": \"PascalCase\", \"export\": true }} }}");
}
