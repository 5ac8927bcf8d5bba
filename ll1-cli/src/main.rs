use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::{
    Error,
    WrapErr,
};
use itertools::Itertools;
use ll1::{
    analysis::{
        Analysis,
        AnalysisParameters,
    },
    ebnf,
    lex::Consume,
    Grammar,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
enum Args {
    /// Reads a grammar and checks that every referenced production is defined.
    Check { grammar: PathBuf },

    /// Prints the simplified productions of a grammar.
    Normalize { grammar: PathBuf },

    /// Prints terminals, names, FIRST sets and lexer guards for a start symbol.
    Analyze {
        grammar: PathBuf,

        #[structopt(short, long, default_value = "root")]
        start: String,

        /// Only analyze the start production, without following references.
        #[structopt(long)]
        shallow: bool,

        #[structopt(long, default_value = "symbol")]
        type_prefix: String,
    },
}

impl Args {
    pub fn run(self) -> Result<(), Error> {
        match self {
            Self::Check { grammar } => {
                let grammar = load_grammar(&grammar)?;
                grammar.check()?;
                println!("ok: {} productions", grammar.len());
            }
            Self::Normalize { grammar } => {
                let grammar = load_grammar(&grammar)?;
                print!("{grammar}");
            }
            Self::Analyze {
                grammar,
                start,
                shallow,
                type_prefix,
            } => {
                let grammar = load_grammar(&grammar)?;
                let parameters = AnalysisParameters {
                    start,
                    recursive: !shallow,
                    type_prefix,
                    ..Default::default()
                };
                let analysis = Analysis::new(&grammar, &parameters)?;
                print_analysis(&analysis);
            }
        }

        Ok(())
    }
}

fn load_grammar(path: &Path) -> Result<Grammar, Error> {
    tracing::info!("loading grammar from {}", path.display());
    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let ast = ebnf::parse(&source)?;
    Ok(Grammar::from_ebnf(&ast)?)
}

fn print_analysis(analysis: &Analysis) {
    println!("start: {}", analysis.start);
    println!("names: {}", analysis.names.iter().join(", "));

    println!();
    println!("terminals:");
    for info in &analysis.terminals {
        println!("  {} = {}", info.label, info.terminal);
        for case in &info.cases {
            let consume = match case.consume {
                Consume::Bytes(n) => format!("{n} byte(s)"),
                Consume::Rune => "1 rune".to_owned(),
            };
            println!("    if {} => {consume} // {}", case.guard, case.comment);
        }
    }

    println!();
    println!("first:");
    for (name, set) in analysis.first.iter() {
        println!("  {name}: {{{}}}", set.iter().join(", "));
    }

    if !analysis.lexemes.is_empty() {
        println!();
        println!("lexemes:");
        for lexeme in &analysis.lexemes {
            println!("  {} = {}", lexeme.name, lexeme.terminal);
            if let Some(code_points) = &lexeme.code_points {
                println!(
                    "    code points: {}",
                    code_points
                        .ranges()
                        .iter()
                        .map(|r| format!("{:?}..={:?}", r.start(), r.end()))
                        .join(" ")
                );
            }
        }
    }
}

fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::from_args();
    args.run()?;

    Ok(())
}
