use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use getopts::Options;

pub struct Args {
    pub years: Vec<i32>,
    pub include_weekends: bool,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "y",
        "years",
        "Comma separated years to fetch red days for [Default: prompt]",
        "YEARS",
    );
    opts.optflag(
        "w",
        "weekends",
        "Include red days falling on a Saturday or Sunday [Default: false]",
    );
    opts
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let Some(years) = matches.opt_str("years") else {
        let stdin = io::stdin();
        return match prompt(stdin.lock(), io::stdout()) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        };
    };

    let years = match parse_years(&years) {
        Ok(years) => years,
        Err(err) => {
            eprintln!("Provided value for option 'years' is invalid: {err}");
            process::exit(1);
        }
    };

    Args {
        years,
        include_weekends: matches.opt_present("weekends"),
    }
}

/// Ask for the years and the weekend choice interactively.
pub fn prompt<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<Args, String> {
    let mut ask = |question: &str| -> Result<String, String> {
        write!(output, "{question}").map_err(|err| err.to_string())?;
        output.flush().map_err(|err| err.to_string())?;

        let mut answer = String::new();
        input
            .read_line(&mut answer)
            .map_err(|err| err.to_string())?;
        Ok(answer.trim().to_string())
    };

    let years = ask("Years (separate with commas): ")?;
    let years = parse_years(&years).map_err(|err| format!("Invalid years: {err}"))?;

    let weekends = ask("Include Weekends (True/False): ")?;
    let include_weekends = parse_bool(&weekends)
        .ok_or_else(|| format!("Expected True or False, got `{weekends}`"))?;

    Ok(Args {
        years,
        include_weekends,
    })
}

/// Parse a comma separated year list. Blank items are skipped.
pub fn parse_years(s: &str) -> Result<Vec<i32>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(|year| year.parse::<i32>().map_err(|err| format!("`{year}`: {err}")))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
