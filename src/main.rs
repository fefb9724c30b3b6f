use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tokenbudget::{max_tokens, model, BpeEncoder, Msg, TokenBudget};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(PartialEq, Eq)]
enum Mode {
    Count,
    Encode,
    Decode,
    Chat,
}

struct Args {
    model: String,
    mode: Mode,
    budget: Option<usize>,
    keep: usize,
    filenames: bool,
    help: bool,
    version: bool,
    paths: Vec<String>,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut args = Args {
        model: model::DEFAULT_CHAT.to_string(),
        mode: Mode::Count,
        budget: None,
        keep: 0,
        filenames: false,
        help: false,
        version: false,
        paths: Vec::new(),
    };

    let value = |i: &mut usize, flag: &str| -> String {
        *i += 1;
        match argv.get(*i) {
            Some(v) => v.clone(),
            None => fail(format!("{} requires a value", flag)),
        }
    };
    let number = |s: String, flag: &str| -> usize {
        s.parse()
            .unwrap_or_else(|_| fail(format!("{} expects a number, got '{}'", flag, s)))
    };

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-V" | "--version" => args.version = true,
            "-h" | "--help" => args.help = true,
            "-f" | "--filenames" => args.filenames = true,
            "-e" | "--encode" => args.mode = Mode::Encode,
            "-d" | "--decode" => args.mode = Mode::Decode,
            "-c" | "--chat" => args.mode = Mode::Chat,
            "-m" | "--model" => args.model = value(&mut i, "--model"),
            "-b" | "--budget" => args.budget = Some(number(value(&mut i, "--budget"), "--budget")),
            "-k" | "--keep" => args.keep = number(value(&mut i, "--keep"), "--keep"),
            s if s.starts_with('-') => fail(format!("unknown option: {}", s)),
            _ => args.paths.push(argv[i].clone()),
        }
        i += 1;
    }
    args
}

fn print_help() {
    println!(
        "Usage: tokenbudget [options] [file...]\n\
         \n\
         Count GPT-3 BPE tokens in files or stdin.\n\
         \n\
         Options:\n\
         \x20 -m, --model <name>   Model, for context window reporting (default: {})\n\
         \x20 -e, --encode         Print token ids as a JSON array\n\
         \x20 -d, --decode         Read a JSON array of token ids and print the text\n\
         \x20 -c, --chat           Read a JSON array of {{role, content}} messages\n\
         \x20 -b, --budget <n>     With --chat, drop oldest messages to fit n tokens\n\
         \x20 -k, --keep <n>       With --budget, never drop the last n messages\n\
         \x20 -f, --filenames      Print file names even for a single file\n\
         \x20 -V, --version        Show version\n\
         \x20 -h, --help           Show this help\n\
         \n\
         When no files are given, reads from stdin. With several files, each\n\
         count is printed as `name: N`, followed by `TOTAL: N`.\n\
         \n\
         Tokenizer data is embedded at build time from TOKENBUDGET_DATA, or\n\
         loaded at runtime from the directory that variable names.",
        model::DEFAULT_CHAT
    );
}

struct Input {
    name: Option<String>,
    text: String,
}

impl Input {
    /// File name without its directory, as printed next to counts.
    fn label(&self) -> &str {
        match &self.name {
            Some(name) => Path::new(name)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(name.as_str()),
            None => "stdin",
        }
    }
}

fn read_inputs(paths: &[String]) -> Vec<Input> {
    if paths.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .unwrap_or_else(|e| fail(format!("reading stdin: {}", e)));
        return vec![Input { name: None, text }];
    }
    paths
        .iter()
        .map(|p| {
            if Path::new(p).is_dir() {
                fail(format!("{}: Is a directory", p));
            }
            let text = fs::read_to_string(p).unwrap_or_else(|e| fail(format!("{}: {}", p, e)));
            Input {
                name: Some(p.clone()),
                text,
            }
        })
        .collect()
}

/// One line per input, `name: N` when names are shown and a bare `N`
/// otherwise, then `TOTAL: N` when there is more than one input.
fn render_counts(rows: &[(&str, usize)], always_show_names: bool) -> String {
    let show_names = always_show_names || rows.len() > 1;
    let mut out = String::new();
    for (name, count) in rows {
        if show_names {
            out.push_str(&format!("{}: {}\n", name, count));
        } else {
            out.push_str(&format!("{}\n", count));
        }
    }
    if rows.len() > 1 {
        let total: usize = rows.iter().map(|(_, n)| n).sum();
        out.push_str(&format!("TOTAL: {}\n", total));
    }
    out
}

fn run_count(encoder: &BpeEncoder, inputs: &[Input], filenames: bool) {
    let count_one = |input: &Input| encoder.count_tokens(&input.text);
    let counts: Vec<usize> = if inputs.len() > 1 {
        inputs.par_iter().map(count_one).collect()
    } else {
        inputs.iter().map(count_one).collect()
    };
    let rows: Vec<(&str, usize)> = inputs.iter().map(Input::label).zip(counts).collect();
    print!("{}", render_counts(&rows, filenames));
}

fn run_encode(encoder: &BpeEncoder, inputs: &[Input]) {
    for input in inputs {
        let ids = encoder.encode(&input.text);
        match serde_json::to_string(&ids) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    }
}

fn run_decode(encoder: &BpeEncoder, inputs: &[Input]) {
    for input in inputs {
        let ids: Vec<u32> = serde_json::from_str(&input.text)
            .unwrap_or_else(|e| fail(format!("{}: expected a JSON array of ids: {}", input.label(), e)));
        match encoder.decode(&ids) {
            Ok(text) => print!("{}", text),
            Err(e) => fail(format!("{}: {}", input.label(), e)),
        }
    }
}

fn run_chat(budget: &TokenBudget, inputs: &[Input], args: &Args) {
    let limit = max_tokens(&args.model);
    let mut rows = Vec::new();
    for input in inputs {
        let chat: Vec<Msg> = serde_json::from_str(&input.text).unwrap_or_else(|e| {
            fail(format!("{}: expected a JSON array of messages: {}", input.label(), e))
        });

        let Some(max) = args.budget else {
            let count = budget.chat_token_count(&chat);
            if let Some(limit) = limit.filter(|&l| count > l) {
                eprintln!(
                    "{}: {} tokens exceeds the {} token window of {}",
                    input.label(),
                    count,
                    limit,
                    args.model
                );
            }
            rows.push((input.label(), count));
            continue;
        };

        let trimmed = budget.drop_history_if_needed(chat, args.keep, max);
        eprintln!(
            "{}: {} tokens after dropping {} message(s){}",
            input.label(),
            trimmed.tokens_used,
            trimmed.dropped,
            if trimmed.tokens_used > max { " (still over budget)" } else { "" }
        );
        match serde_json::to_string_pretty(&trimmed.messages) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
    }
    if !rows.is_empty() {
        print!("{}", render_counts(&rows, args.filenames));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args();

    if args.version {
        let data = if tokenbudget::data::is_embedded() {
            "embedded data"
        } else {
            "runtime data"
        };
        println!("tokenbudget {} ({})", VERSION, data);
        return;
    }
    if args.help {
        print_help();
        return;
    }
    if args.budget.is_some() && args.mode != Mode::Chat {
        fail("--budget only applies to --chat");
    }

    let encoder = tokenbudget::default_encoder().unwrap_or_else(|e| fail(e));
    let inputs = read_inputs(&args.paths);

    match args.mode {
        Mode::Count => run_count(encoder, &inputs, args.filenames),
        Mode::Encode => run_encode(encoder, &inputs),
        Mode::Decode => run_decode(encoder, &inputs),
        Mode::Chat => run_chat(&TokenBudget::new(encoder), &inputs, &args),
    }
}
