// todc: Tod compiler front end

use std::process::ExitCode;

use tod::config::{Config, USAGE};
use tod::driver::{compile, CompileError};
use tod::parser::tree::print_members;
use tod::semantic::print_symbols;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("TOD_LOG", "warn")).init();

    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let (driver, result) = compile(&config);
    let compilation = match result {
        Ok(compilation) => compilation,
        Err(CompileError::Diagnostic(diagnostic)) => {
            eprintln!("{}", diagnostic.render(driver.sources(), config.color));
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    if config.dump_tokens {
        for token in &compilation.tokens {
            println!(
                "{}:{}\t{:?}\t{}",
                token.span.start_line, token.span.start_column, token.kind, token.literal
            );
        }
    }
    if config.dump_ast {
        print!("{}", print_members(&compilation.members, config.color));
    }
    if config.dump_symbols {
        print!("{}", print_symbols(&compilation.program, config.color));
    }

    for diagnostic in &compilation.diagnostics {
        eprintln!("{}", diagnostic.render(driver.sources(), config.color));
    }

    if compilation.has_errors() {
        eprintln!("{} error(s) found", compilation.diagnostics.len());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
